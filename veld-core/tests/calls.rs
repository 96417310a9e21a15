mod harness;
use harness::{compile_err, compile_src};

#[test]
fn main_calls_square_with_one_argument() {
    let ir = compile_src("fn square(x) = x * x fn main() = square(7)");
    assert!(ir.contains("fn @square(i64 %x) -> i64"));
    assert!(ir.contains("fn @main() -> i64"));
    assert!(ir.contains("%t0 = call @square(7)"));
    assert!(ir.contains("ret.i64 %t0"));
}

#[test]
fn arguments_are_evaluated_left_to_right() {
    let ir = compile_src("fn add(a, b) = a + b fn main(x) = add(x + 1, x + 2)");
    let first = ir.find("add.i64 %x, 1").expect("first argument");
    let second = ir.find("add.i64 %x, 2").expect("second argument");
    assert!(first < second);
}

#[test]
fn call_results_feed_arithmetic() {
    let ir = compile_src("fn square(x) = x * x fn main(x) = square(x) + 1");
    assert!(ir.contains("%t0 = call @square(%x)"));
    assert!(ir.contains("%t1 = add.i64 %t0, 1"));
}

#[test]
fn calling_an_undeclared_function_is_rejected() {
    let diags = compile_err("fn main() = square(7)");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "Unknown fn `square'");
}

#[test]
fn arity_mismatches_are_rejected() {
    let diags = compile_err("fn square(x) = x * x fn main() = square(1, 2)");
    assert_eq!(diags[0].message, "fn `square' takes 1 args; 2 given");
}
