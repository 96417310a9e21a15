use veld_core::diagnostic::Diagnostic;
use veld_core::{compile, parse_source, CompileOptions, CoreError};

/// Compile source to textual IR, panicking on any diagnostic.
pub fn compile_src(src: &str) -> String {
    compile("<test>", src, CompileOptions::default())
        .expect("compile failure")
        .ir
}

/// Compile with explicit options.
#[allow(dead_code)]
pub fn compile_src_with_options(src: &str, options: CompileOptions) -> String {
    compile("<test>", src, options).expect("compile failure").ir
}

/// Compile source that is expected to be rejected; returns the diagnostics
/// in order of emission.
#[allow(dead_code)]
pub fn compile_err(src: &str) -> Vec<Diagnostic> {
    match compile("<test>", src, CompileOptions::default()) {
        Err(CoreError::Diagnostics(diags)) => diags,
        Ok(artifact) => panic!("expected rejection, compiled to:\n{}", artifact.ir),
        Err(other) => panic!("unexpected error: {other}"),
    }
}

/// Render the parsed AST one node per S-expression, the way the snapshot
/// harness consumes it.
#[allow(dead_code)]
pub fn render_ast(src: &str) -> String {
    let ctx = parse_source("<test>", src);
    assert!(ctx.good(), "parse failed: {:?}", ctx.diagnostics());
    let mut out = String::new();
    for node in ctx.nodes() {
        out.push_str(&node.to_string());
        out.push('\n');
    }
    out
}
