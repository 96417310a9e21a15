//! Pipeline driver.
//!
//! The driver owns stage ordering: lex-and-parse into a fresh context,
//! then — only when the context is still good — IR generation and
//! serialization. Partial entry points (`lex_source`, `parse_source`) exist
//! for tooling that wants to stop early and render tokens or the AST.

use alloc::string::String;
use alloc::vec::Vec;

use crate::codegen;
use crate::context::Context;
use crate::error::CoreError;
use crate::ir::{IrBuilder, ModuleBuilder};
use crate::lexer::{Lexer, Token};
use crate::parser;

#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    /// Run the local optimization passes on each emitted function.
    pub optimize: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions { optimize: true }
    }
}

/// The serialized IR module: the deliverable of a successful compilation.
#[derive(Debug, Clone)]
pub struct CompilationArtifact {
    pub ir: String,
}

pub fn compile(
    name: &str,
    source: &str,
    options: CompileOptions,
) -> Result<CompilationArtifact, CoreError> {
    let mut ctx = Context::new(name);
    parser::parse(Lexer::from_source(source), &mut ctx);
    if !ctx.good() {
        return Err(CoreError::from_diagnostics(ctx.take_diagnostics()));
    }

    let mut builder = ModuleBuilder::new(name);
    let nodes = ctx.take_nodes();
    codegen::generate(&nodes, &mut ctx, &mut builder, options);
    ctx.set_nodes(nodes);

    if !ctx.good() {
        return Err(CoreError::from_diagnostics(ctx.take_diagnostics()));
    }
    Ok(CompilationArtifact {
        ir: builder.emit_textual(),
    })
}

/// Lex the whole input, including the trailing `Eof` token.
pub fn lex_source(source: &str) -> Vec<Token> {
    Lexer::from_source(source).lex_all()
}

/// Run lexing and parsing only. The returned context holds the AST roots
/// and any diagnostics; callers render both themselves.
pub fn parse_source(name: &str, source: &str) -> Context {
    let mut ctx = Context::new(name);
    parser::parse(Lexer::from_source(source), &mut ctx);
    ctx
}
