//! IR generation.
//!
//! A tree walk over the parsed functions that emits into an [`IrBuilder`].
//! Every expression lowers to exactly one value; `None` is the error
//! sentinel and the diagnostic has already been reported when it appears.
//! The generator binds function arguments in a fresh scope on entry and the
//! scope is popped on every exit path.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::ast::{Expr, Prototype};
use crate::compiler::CompileOptions;
use crate::context::Context;
use crate::diagnostic::Diagnostic;
use crate::ir::{FuncId, IrBuilder, Value};

/// Lower every top-level function in `nodes` into `builder`, reporting
/// problems into `ctx`. The module is best-effort: a function that fails to
/// lower is skipped, later ones are still attempted.
pub fn generate<B: IrBuilder>(
    nodes: &[Expr],
    ctx: &mut Context,
    builder: &mut B,
    options: CompileOptions,
) {
    let mut gen = Codegen {
        ctx,
        builder,
        func: None,
        optimize: options.optimize,
    };
    for node in nodes {
        match node {
            Expr::Function { proto, body } => {
                gen.gen_function(proto, body);
            }
            _ => gen.ctx.report_error(Diagnostic::unknown(
                "top level expression is not a function",
                "",
            )),
        }
    }
}

struct Codegen<'a, B: IrBuilder> {
    ctx: &'a mut Context,
    builder: &'a mut B,
    /// The function currently being emitted; blocks for `if` lowering are
    /// appended here.
    func: Option<FuncId>,
    optimize: bool,
}

impl<B: IrBuilder> Codegen<'_, B> {
    fn gen_function(&mut self, proto: &Prototype, body: &[Expr]) -> Option<FuncId> {
        let func = match self.builder.function_by_name(&proto.name) {
            Some(func) => func,
            None => self.gen_prototype(proto),
        };
        if self.builder.function_is_defined(func) {
            self.ctx.report_error(Diagnostic::unknown(
                format!("fn `{}' cannot be redefined", proto.name),
                "",
            ));
            return None;
        }

        let entry = self.builder.append_block(func, "entry");
        self.builder.set_insert_point(entry);

        self.func = Some(func);
        self.ctx.push_scope();
        let result = self.gen_function_body(func, proto, body);
        self.ctx.pop_scope();
        self.func = None;
        result
    }

    fn gen_function_body(&mut self, func: FuncId, proto: &Prototype, body: &[Expr]) -> Option<FuncId> {
        for (i, param) in proto.params.iter().enumerate() {
            let value = self.builder.arg_value(func, i);
            self.ctx.bind(param.name.clone(), value);
        }

        let mut last = None;
        for expr in body {
            last = self.gen_expr(expr);
            if last.is_none() {
                return None;
            }
        }

        // The final expression is the function's result.
        self.builder.ret(last?);

        if let Err(err) = self.builder.verify_function(func) {
            self.ctx
                .report_error(Diagnostic::unknown(format!("{}", err), ""));
            return None;
        }
        if self.optimize {
            self.builder.run_local_optimizations(func);
        }
        Some(func)
    }

    /// Declare `(i64, …) -> i64` with the source name; IR arguments take the
    /// prototype's parameter names.
    fn gen_prototype(&mut self, proto: &Prototype) -> FuncId {
        let params: Vec<String> = proto.params.iter().map(|p| p.name.clone()).collect();
        self.builder.declare_function(&proto.name, &params)
    }

    fn gen_expr(&mut self, expr: &Expr) -> Option<Value> {
        match expr {
            Expr::Integer(value) => Some(self.builder.const_i64(*value)),
            Expr::Identifier(name) => self.gen_identifier(name),
            Expr::Binary { op, left, right } => self.gen_binary(*op, left, right),
            Expr::Call { name, args } => self.gen_call(name, args),
            Expr::If { cond, then, els } => self.gen_if(cond, then, els),
            Expr::Value {
                constant,
                name,
                init,
            } => self.gen_value(*constant, name, init),
            Expr::Assignment { .. } => {
                self.ctx
                    .report_error(Diagnostic::unknown("NOT IMPLEMENTED: assignment", ""));
                None
            }
            Expr::TupleAssignment { .. } => {
                self.ctx.report_error(Diagnostic::unknown(
                    "NOT IMPLEMENTED: tuple assignment",
                    "",
                ));
                None
            }
            Expr::Function { .. } | Expr::Prototype(_) | Expr::Parameter(_) => {
                self.ctx.report_error(Diagnostic::unknown(
                    "declaration in expression position",
                    "",
                ));
                None
            }
        }
    }

    fn gen_identifier(&mut self, name: &str) -> Option<Value> {
        match self.ctx.lookup(name) {
            Some(value) => Some(value),
            None => {
                self.ctx.report_error(Diagnostic::unknown(
                    format!("Unknown identifier `{}'", name),
                    "",
                ));
                None
            }
        }
    }

    fn gen_binary(&mut self, op: char, left: &Expr, right: &Expr) -> Option<Value> {
        let lhs = self.gen_expr(left)?;
        let rhs = self.gen_expr(right)?;
        match op {
            '+' => Some(self.builder.iadd(lhs, rhs)),
            '-' => Some(self.builder.isub(lhs, rhs)),
            '*' => Some(self.builder.imul(lhs, rhs)),
            '/' => Some(self.builder.sdiv(lhs, rhs)),
            other => {
                self.ctx.report_error(Diagnostic::unknown(
                    format!("Unknown binary operator `{}'", other),
                    "",
                ));
                None
            }
        }
    }

    fn gen_call(&mut self, name: &str, args: &[Expr]) -> Option<Value> {
        let Some(callee) = self.builder.function_by_name(name) else {
            self.ctx
                .report_error(Diagnostic::unknown(format!("Unknown fn `{}'", name), ""));
            return None;
        };

        let expected = self.builder.param_count(callee);
        if expected != args.len() {
            self.ctx.report_error(Diagnostic::unknown(
                format!(
                    "fn `{}' takes {} args; {} given",
                    name,
                    expected,
                    args.len()
                ),
                "",
            ));
            return None;
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.gen_expr(arg)?);
        }
        Some(self.builder.call(callee, values))
    }

    /// Lower `if` to a conditional branch over `cond == 1` with a φ-merge of
    /// the two arm values.
    fn gen_if(&mut self, cond: &Expr, then: &[Expr], els: &[Expr]) -> Option<Value> {
        let cond = self.gen_expr(cond)?;
        let one = self.builder.const_i64(1);
        let pred = self.builder.icmp_eq(cond, one);

        let Some(func) = self.func else {
            self.ctx
                .report_error(Diagnostic::unknown("if outside of a function", ""));
            return None;
        };
        let then_block = self.builder.append_block(func, "then");
        let else_block = self.builder.append_block(func, "else");
        let merge_block = self.builder.append_block(func, "merge");
        self.builder.cond_br(pred, then_block, else_block);

        self.builder.set_insert_point(then_block);
        let then_value = self.gen_arm(then)?;
        // Arm bodies may have opened nested blocks; the φ edge comes from
        // wherever the builder ended up.
        let then_end = self.builder.current_block().unwrap_or(then_block);
        self.builder.br(merge_block);

        self.builder.set_insert_point(else_block);
        let else_value = self.gen_arm(els)?;
        let else_end = self.builder.current_block().unwrap_or(else_block);
        self.builder.br(merge_block);

        self.builder.set_insert_point(merge_block);
        Some(self.builder.phi([(then_value, then_end), (else_value, else_end)]))
    }

    fn gen_arm(&mut self, body: &[Expr]) -> Option<Value> {
        if body.is_empty() {
            // An empty arm contributes zero so the merge φ stays well formed.
            return Some(self.builder.const_i64(0));
        }
        let mut last = None;
        for expr in body {
            last = self.gen_expr(expr);
            if last.is_none() {
                return None;
            }
        }
        last
    }

    fn gen_value(&mut self, constant: bool, name: &str, init: &Expr) -> Option<Value> {
        let value = self.gen_expr(init)?;
        if constant {
            self.ctx.bind(name.to_string(), value);
        }
        Some(value)
    }
}
