//! Control-flow graph construction.
//!
//! A single post-parse visit partitions each function body into basic
//! blocks. Blocks split at control-flow boundaries only: function entry and
//! exit, and the arms of an `if`. Everything else — including an `if` buried
//! inside a binding initializer — is appended to the current block as one
//! expression. Empty blocks are collapsed away and successor edges are
//! redirected through them, so the returned partition contains only
//! non-empty blocks wired in visit order.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::ast::Expr;

/// A maximal straight-line run of expressions with its successor blocks
/// (indices into the partition returned by [`build`]).
#[derive(Debug)]
pub struct BasicBlock<'a> {
    pub exprs: Vec<&'a Expr>,
    pub succs: Vec<usize>,
}

/// Partition the top-level nodes into basic blocks.
///
/// The walk is read-only; running it twice over the same AST produces the
/// same partition.
pub fn build(roots: &[Expr]) -> Vec<BasicBlock<'_>> {
    let mut builder = CfgBuilder {
        blocks: Vec::new(),
        current: 0,
    };
    builder.open_block();
    for root in roots {
        match root {
            Expr::Function { body, .. } => builder.visit_function(body),
            other => builder.append(other),
        }
    }
    collapse(builder.blocks)
}

struct CfgBuilder<'a> {
    blocks: Vec<BasicBlock<'a>>,
    current: usize,
}

impl<'a> CfgBuilder<'a> {
    fn open_block(&mut self) -> usize {
        let index = self.blocks.len();
        self.blocks.push(BasicBlock {
            exprs: Vec::new(),
            succs: Vec::new(),
        });
        self.current = index;
        index
    }

    fn append(&mut self, expr: &'a Expr) {
        self.blocks[self.current].exprs.push(expr);
    }

    fn edge(&mut self, from: usize, to: usize) {
        self.blocks[from].succs.push(to);
    }

    fn visit_function(&mut self, body: &'a [Expr]) {
        self.open_block();
        for expr in body {
            self.visit(expr);
        }
        // Exit fence: nothing may fall through out of a function.
        self.open_block();
    }

    fn visit(&mut self, expr: &'a Expr) {
        match expr {
            Expr::If { cond, then, els } => {
                self.visit(cond);
                let cond_block = self.current;

                let then_head = self.open_block();
                for e in then {
                    self.visit(e);
                }
                let then_tail = self.current;

                let else_head = self.open_block();
                for e in els {
                    self.visit(e);
                }
                let else_tail = self.current;

                let merge = self.open_block();
                self.edge(cond_block, then_head);
                self.edge(cond_block, else_head);
                self.edge(then_tail, merge);
                self.edge(else_tail, merge);
            }
            Expr::Function { body, .. } => self.visit_function(body),
            _ => self.append(expr),
        }
    }
}

/// Drop empty blocks, forwarding edges through them. An empty block always
/// has at most one successor (its fallthrough), so following the chain
/// terminates at the first non-empty block or at a function exit.
fn collapse(blocks: Vec<BasicBlock<'_>>) -> Vec<BasicBlock<'_>> {
    let resolve = |start: usize| -> Option<usize> {
        let mut i = start;
        loop {
            if !blocks[i].exprs.is_empty() {
                return Some(i);
            }
            match blocks[i].succs.first() {
                Some(&next) => i = next,
                None => return None,
            }
        }
    };

    let mut remap = Vec::with_capacity(blocks.len());
    let mut kept = 0;
    for block in &blocks {
        if block.exprs.is_empty() {
            remap.push(None);
        } else {
            remap.push(Some(kept));
            kept += 1;
        }
    }

    let mut resolved: Vec<Vec<usize>> = Vec::with_capacity(kept);
    for (i, block) in blocks.iter().enumerate() {
        if remap[i].is_none() {
            continue;
        }
        let mut succs = Vec::new();
        for &s in &block.succs {
            if let Some(target) = resolve(s) {
                let target = remap[target].unwrap_or(0);
                if !succs.contains(&target) {
                    succs.push(target);
                }
            }
        }
        resolved.push(succs);
    }

    let mut out = Vec::with_capacity(kept);
    let mut next_succs = resolved.into_iter();
    for (i, block) in blocks.into_iter().enumerate() {
        if remap[i].is_none() {
            continue;
        }
        out.push(BasicBlock {
            exprs: block.exprs,
            succs: next_succs.next().unwrap_or_default(),
        });
    }
    out
}

/// Render a partition for inspection: one `bbN` header per block with its
/// successor list, expressions indented beneath.
pub fn render(blocks: &[BasicBlock<'_>]) -> String {
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        let _ = write!(out, "bb{}:", i);
        if !block.succs.is_empty() {
            out.push_str(" ->");
            for (n, succ) in block.succs.iter().enumerate() {
                if n > 0 {
                    out.push(',');
                }
                let _ = write!(out, " bb{}", succ);
            }
        }
        out.push('\n');
        for expr in &block.exprs {
            let text = alloc::format!("{}", expr);
            for line in text.split('\n') {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}
