//! Compilation context.
//!
//! One `Context` exists per source input. It aggregates the mutable state
//! the pipeline stages share: accumulated diagnostics, the parsed top-level
//! nodes, and the scope stack the IR generator binds names into. Errors are
//! append-only; the presence of any diagnostic makes the context "not good"
//! and later stages' output untrustworthy.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use crate::ast::Expr;
use crate::diagnostic::Diagnostic;
use crate::ir::Value;

/// A symbol-table frame mapping source names to IR values.
///
/// Duplicate declarations within one scope are last-write-wins; lookup of an
/// unknown name yields `None`.
#[derive(Debug, Default)]
pub struct Scope {
    values: BTreeMap<String, Value>,
}

impl Scope {
    pub fn bind(&mut self, name: String, value: Value) {
        self.values.insert(name, value);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }
}

pub struct Context {
    name: String,
    diagnostics: Vec<Diagnostic>,
    nodes: Vec<Expr>,
    scopes: Vec<Scope>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Context {
        Context {
            name: name.into(),
            diagnostics: Vec::new(),
            nodes: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn report_error(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        mem::take(&mut self.diagnostics)
    }

    /// True iff no stage has reported an error.
    pub fn good(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn push_node(&mut self, node: Expr) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[Expr] {
        &self.nodes
    }

    /// Detach the AST roots so a stage can walk them while reporting into
    /// this context; pair with [`Context::set_nodes`].
    pub fn take_nodes(&mut self) -> Vec<Expr> {
        mem::take(&mut self.nodes)
    }

    pub fn set_nodes(&mut self, nodes: Vec<Expr>) {
        self.nodes = nodes;
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Bind `name` in the topmost scope. A binding outside any scope is a
    /// generator bug and is dropped.
    pub fn bind(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bind(name, value);
        }
    }

    /// Look `name` up in the topmost scope only.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.scopes.last().and_then(|scope| scope.lookup(name))
    }
}
