mod harness;
use harness::compile_src;

use rand::Rng;

// ============================================================================
// Minimal property-based harness
// ============================================================================
// Generates random inputs, checks a property, and reports the counterexample
// on the first failure. No shrinking; the generated sources are small enough
// to read as-is.

struct Runner {
    iterations: usize,
}

impl Runner {
    fn new(iterations: usize) -> Runner {
        Runner { iterations }
    }

    fn run<T, G, P>(&self, mut generate: G, property: P)
    where
        T: std::fmt::Debug,
        G: FnMut(&mut rand::rngs::ThreadRng) -> T,
        P: Fn(&T) -> Result<(), String>,
    {
        let mut rng = rand::thread_rng();
        for i in 0..self.iterations {
            let input = generate(&mut rng);
            if let Err(msg) = property(&input) {
                panic!(
                    "\n=== Property failed ===\nIteration: {}\nInput: {:?}\nError: {}\n",
                    i + 1,
                    input,
                    msg
                );
            }
        }
    }
}

/// A random fully-parenthesized arithmetic tree over `+ - *` and its value.
/// Division is left out: the folder only collapses exact quotients.
fn gen_tree(rng: &mut rand::rngs::ThreadRng, depth: usize) -> (String, i64) {
    if depth == 0 || rng.gen_range(0..4) == 0 {
        let v: i64 = rng.gen_range(0..100);
        return (v.to_string(), v);
    }
    let (left, lv) = gen_tree(rng, depth - 1);
    let (right, rv) = gen_tree(rng, depth - 1);
    let (op, value) = match rng.gen_range(0..3) {
        0 => ('+', lv + rv),
        1 => ('-', lv - rv),
        _ => ('*', lv * rv),
    };
    (format!("({} {} {})", left, op, right), value)
}

#[test]
fn prop_constant_expressions_fold_to_their_value() {
    Runner::new(100).run(
        |rng| gen_tree(rng, 3),
        |(expr, expected)| {
            let src = format!("fn f() = {expr}");
            let ir = compile_src(&src);
            let wanted = format!("ret.i64 {expected}");
            if ir.contains(&wanted) {
                Ok(())
            } else {
                Err(format!("expected `{wanted}` in:\n{ir}"))
            }
        },
    );
}

#[test]
fn prop_lexing_the_same_source_twice_is_identical() {
    const FRAGMENTS: &[&str] = &[
        "fn", "val", "var", "if", "else", "elif", "x", "y", "count", "_tmp", "0", "7", "42",
        "(", ")", "{", "}", "[", "]", "+", "-", "*", "/", ",", ":", ";", "=", "==",
    ];

    Runner::new(50).run(
        |rng| {
            let len = rng.gen_range(0..40);
            let mut src = String::new();
            for _ in 0..len {
                src.push_str(FRAGMENTS[rng.gen_range(0..FRAGMENTS.len())]);
                match rng.gen_range(0..3) {
                    0 => src.push(' '),
                    1 => src.push('\n'),
                    _ => src.push_str("  "),
                }
            }
            src
        },
        |src| {
            let first = veld_core::lex_source(src);
            let second = veld_core::lex_source(src);
            if first == second {
                Ok(())
            } else {
                Err("token streams differ".to_string())
            }
        },
    );
}

#[test]
fn prop_pretty_printing_is_idempotent() {
    Runner::new(50).run(
        |rng| {
            let (expr, _) = gen_tree(rng, 3);
            format!("fn f(a, b) = {expr} + a * b")
        },
        |src| {
            let ctx = veld_core::parse_source("<prop>", src);
            if !ctx.good() {
                return Err(format!("parse failed: {:?}", ctx.diagnostics()));
            }
            for node in ctx.nodes() {
                if node.to_string() != node.to_string() {
                    return Err("printing is not deterministic".to_string());
                }
            }
            Ok(())
        },
    );
}
