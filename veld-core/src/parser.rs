//! Recursive-descent parser for Veld.
//!
//! The parser consumes a one-token-lookahead lexer and pushes top-level
//! `fn` definitions into the compilation context. Binary expressions use
//! precedence climbing over the two operator tiers. On an unexpected token
//! the failing production reports one diagnostic and returns `None`; the
//! enclosing production either propagates the miss or skips ahead to the
//! closing brace of the current block. Nothing here throws.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::mem;

use crate::ast::{Expr, Parameter, Prototype};
use crate::context::Context;
use crate::diagnostic::Diagnostic;
use crate::lexer::{Keyword, Lex, Operator, Token};

/// Minimum precedence: accept any binary operator.
const NORMAL: u8 = 0;
/// `+` and `-`.
const ADDOP: u8 = 1;
/// `*` and `/`.
const MULOP: u8 = 2;

fn precedence(token: &Token) -> Option<u8> {
    match token.operator()? {
        Operator::Plus | Operator::Dash => Some(ADDOP),
        Operator::Star | Operator::Slash => Some(MULOP),
        _ => None,
    }
}

/// Parse the whole input, pushing declarations and errors into `ctx`.
pub fn parse<L: Lex>(lexer: L, ctx: &mut Context) {
    Parser::new(lexer, ctx).parse_top_level();
}

struct Parser<'c, L: Lex> {
    lexer: L,
    next: Token,
    ctx: &'c mut Context,
}

impl<'c, L: Lex> Parser<'c, L> {
    fn new(mut lexer: L, ctx: &'c mut Context) -> Parser<'c, L> {
        let next = lexer.lex();
        Parser { lexer, next, ctx }
    }

    fn peek(&self) -> &Token {
        &self.next
    }

    fn advance(&mut self) -> Token {
        let token = self.lexer.lex();
        mem::replace(&mut self.next, token)
    }

    fn unexpected(&mut self, token: &Token, explanation: &str) {
        self.ctx
            .report_error(Diagnostic::unexpected_token_with(token, explanation));
    }

    fn parse_top_level(&mut self) {
        loop {
            if self.peek().eof() {
                return;
            }
            if self.peek().is_keyword(Keyword::Fn) {
                if let Some(func) = self.parse_fn() {
                    self.ctx.push_node(func);
                }
            } else {
                let token = self.peek().clone();
                self.unexpected(&token, "Expected `fn'");
                return;
            }
        }
    }

    fn parse_fn(&mut self) -> Option<Expr> {
        let token = self.advance();
        if !token.is_keyword(Keyword::Fn) {
            self.unexpected(&token, "Expected `fn'");
            return None;
        }

        let proto = self.parse_prototype()?;

        let token = self.advance();
        if !token.is_operator(Operator::Equal) {
            self.unexpected(&token, "Expected fn `='");
            return None;
        }

        let body = self.gather_block();
        if body.is_empty() {
            self.ctx.report_error(Diagnostic::syntax(
                "Expected fn body",
                "a function body must produce a value",
            ));
            return None;
        }

        Some(Expr::Function { proto, body })
    }

    fn parse_prototype(&mut self) -> Option<Prototype> {
        let token = self.advance();
        let Some(name) = token.identifier() else {
            self.unexpected(&token, "Expected fn name");
            return None;
        };
        let name = name.to_string();

        let params = self.parse_parameters()?;
        Some(Prototype { name, params })
    }

    fn parse_parameters(&mut self) -> Option<Vec<Parameter>> {
        let token = self.advance();
        if !token.is_operator(Operator::LParen) {
            self.unexpected(&token, "Expected params `('");
            return None;
        }

        let mut params: Vec<Parameter> = Vec::new();
        if !self.peek().is_operator(Operator::RParen) {
            loop {
                let token = self.advance();
                let Some(name) = token.identifier() else {
                    self.unexpected(&token, "Expected param name");
                    return None;
                };
                if params.iter().any(|p| p.name == name) {
                    self.ctx.report_error(Diagnostic::syntax(
                        format!("Duplicate param `{}'", name),
                        "fn params must have distinct names",
                    ));
                    return None;
                }
                params.push(Parameter {
                    constant: false,
                    name: name.to_string(),
                });

                if self.peek().is_operator(Operator::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let token = self.advance();
        if !token.is_operator(Operator::RParen) {
            self.unexpected(&token, "Expected params `)'");
            return None;
        }
        Some(params)
    }

    /// Parse `{ stmt* }` or a single statement. Errors inside a braced block
    /// skip ahead to the closing brace so the caller can continue.
    fn gather_block(&mut self) -> Vec<Expr> {
        let mut body = Vec::new();

        if !self.peek().is_operator(Operator::LCurly) {
            if let Some(expr) = self.parse_stmt() {
                body.push(expr);
            }
            return body;
        }
        self.advance(); // eat '{'

        loop {
            if self.peek().is_operator(Operator::RCurly) {
                self.advance();
                break;
            }
            if self.peek().eof() {
                let token = self.peek().clone();
                self.unexpected(&token, "Expected block `}'");
                break;
            }
            match self.parse_stmt() {
                Some(expr) => body.push(expr),
                None => {
                    self.synchronize();
                    break;
                }
            }
        }
        body
    }

    /// Skip to just past the next `}`, or stop at EOF.
    fn synchronize(&mut self) {
        loop {
            if self.peek().eof() {
                return;
            }
            if self.advance().is_operator(Operator::RCurly) {
                return;
            }
        }
    }

    fn parse_stmt(&mut self) -> Option<Expr> {
        match self.peek().keyword() {
            Some(Keyword::Val) | Some(Keyword::Var) => self.parse_decl(),
            Some(Keyword::If) | Some(Keyword::Elif) => self.parse_if(),
            _ => self.parse_expr(),
        }
    }

    /// `val`/`var` declaration. One name with one initializer becomes a
    /// `Value`; several names with as many initializers become a
    /// `TupleAssignment` (rejected later by the generator).
    fn parse_decl(&mut self) -> Option<Expr> {
        let token = self.advance();
        let constant = match token.keyword() {
            Some(Keyword::Val) => true,
            Some(Keyword::Var) => false,
            _ => {
                self.unexpected(&token, "Expected `val' or `var'");
                return None;
            }
        };

        let mut names = Vec::new();
        loop {
            let token = self.advance();
            let Some(name) = token.identifier() else {
                self.unexpected(&token, "Expected binding name");
                return None;
            };
            names.push(name.to_string());

            if self.peek().is_operator(Operator::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let token = self.advance();
        if !token.is_operator(Operator::Equal) {
            self.unexpected(&token, "Expected `='");
            return None;
        }

        let mut inits = Vec::new();
        loop {
            inits.push(self.parse_expr()?);
            if self.peek().is_operator(Operator::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        if names.len() != inits.len() {
            self.ctx.report_error(Diagnostic::syntax(
                format!(
                    "num of declarations: {}; does not match initialization: {}",
                    names.len(),
                    inits.len()
                ),
                "",
            ));
            return None;
        }

        if names.len() == 1 {
            Some(Expr::Value {
                constant,
                name: names.remove(0),
                init: Box::new(inits.remove(0)),
            })
        } else {
            Some(Expr::TupleAssignment {
                left: names.into_iter().map(Expr::Identifier).collect(),
                right: inits,
            })
        }
    }

    /// `if`/`elif` expression. An `elif` chain becomes a nested `If` in the
    /// else arm; a plain `if` without `else` has an empty else sequence.
    fn parse_if(&mut self) -> Option<Expr> {
        let token = self.advance();
        if !token.is_keyword(Keyword::If) && !token.is_keyword(Keyword::Elif) {
            self.unexpected(&token, "Expected `if' or `elif'");
            return None;
        }

        let cond = self.parse_expr()?;
        let then = self.gather_block();

        let mut els = Vec::new();
        if self.peek().is_keyword(Keyword::Else) {
            self.advance();
            els = self.gather_block();
        } else if self.peek().is_keyword(Keyword::Elif) {
            if let Some(chained) = self.parse_if() {
                els.push(chained);
            }
        }

        Some(Expr::If {
            cond: Box::new(cond),
            then,
            els,
        })
    }

    fn parse_expr(&mut self) -> Option<Expr> {
        let lhs = self.parse_primary()?;
        self.parse_binary(NORMAL, lhs)
    }

    /// Precedence climbing: consume operators at or above `min_precedence`,
    /// parsing each right-hand side one tier up to keep the fold
    /// left-associative.
    fn parse_binary(&mut self, min_precedence: u8, mut lhs: Expr) -> Option<Expr> {
        while let Some(prec) = precedence(self.peek()) {
            if prec < min_precedence {
                break;
            }

            let op = match self.advance().operator() {
                Some(Operator::Plus) => '+',
                Some(Operator::Dash) => '-',
                Some(Operator::Star) => '*',
                _ => '/',
            };

            let rhs = self.parse_primary()?;
            let rhs = self.parse_binary(prec + 1, rhs)?;
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }
        Some(lhs)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        if self.peek().is_identifier() {
            let token = self.advance();
            let name = token.identifier().unwrap_or_default().to_string();
            return if self.peek().is_operator(Operator::LParen) {
                self.parse_call(name)
            } else {
                Some(Expr::Identifier(name))
            };
        }
        if self.peek().is_integer() {
            let token = self.advance();
            return Some(Expr::Integer(token.integer().unwrap_or_default()));
        }
        if self.peek().is_operator(Operator::LParen) {
            return self.parse_paren_expr();
        }

        let token = self.peek().clone();
        self.unexpected(&token, "Expected expression");
        None
    }

    fn parse_call(&mut self, name: String) -> Option<Expr> {
        self.advance(); // eat '(', guaranteed by the caller's lookahead

        let mut args = Vec::new();
        if self.peek().is_operator(Operator::RParen) {
            self.advance();
            return Some(Expr::Call { name, args });
        }

        loop {
            args.push(self.parse_expr()?);
            if self.peek().is_operator(Operator::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        let token = self.advance();
        if !token.is_operator(Operator::RParen) {
            self.unexpected(&token, "Expected call `)'");
            return None;
        }
        Some(Expr::Call { name, args })
    }

    fn parse_paren_expr(&mut self) -> Option<Expr> {
        self.advance(); // eat '('
        let expr = self.parse_expr()?;

        let token = self.advance();
        if !token.is_operator(Operator::RParen) {
            self.unexpected(&token, "Expected paren expr `)'");
            return None;
        }
        Some(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ErrorKind;
    use crate::lexer::Lexer;
    use alloc::string::ToString;
    use alloc::vec;

    fn parse_str(source: &str) -> (Vec<Expr>, Vec<Diagnostic>) {
        let mut ctx = Context::new("<test>");
        parse(Lexer::from_source(source), &mut ctx);
        let nodes = ctx.take_nodes();
        (nodes, ctx.take_diagnostics())
    }

    fn body_of(expr: &Expr) -> &[Expr] {
        match expr {
            Expr::Function { body, .. } => body,
            other => panic!("expected function, got {:?}", other),
        }
    }

    fn binary(op: char, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn empty_input_has_no_nodes_and_no_errors() {
        let (nodes, errors) = parse_str("");
        assert!(nodes.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn parses_a_single_function() {
        let (nodes, errors) = parse_str("fn square(x) = x * x");
        assert!(errors.is_empty());
        assert_eq!(nodes.len(), 1);
        assert_eq!(
            nodes[0],
            Expr::Function {
                proto: Prototype {
                    name: "square".to_string(),
                    params: vec![Parameter {
                        constant: false,
                        name: "x".to_string()
                    }],
                },
                body: vec![binary(
                    '*',
                    Expr::Identifier("x".to_string()),
                    Expr::Identifier("x".to_string())
                )],
            }
        );
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let (nodes, errors) = parse_str("fn f() = 1 + 2 * 3");
        assert!(errors.is_empty());
        assert_eq!(
            body_of(&nodes[0])[0],
            binary(
                '+',
                Expr::Integer(1),
                binary('*', Expr::Integer(2), Expr::Integer(3))
            )
        );

        let (nodes, _) = parse_str("fn f() = 1 * 2 + 3");
        assert_eq!(
            body_of(&nodes[0])[0],
            binary(
                '+',
                binary('*', Expr::Integer(1), Expr::Integer(2)),
                Expr::Integer(3)
            )
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        let (nodes, errors) = parse_str("fn f() = 1 - 2 - 3");
        assert!(errors.is_empty());
        assert_eq!(
            body_of(&nodes[0])[0],
            binary(
                '-',
                binary('-', Expr::Integer(1), Expr::Integer(2)),
                Expr::Integer(3)
            )
        );
    }

    #[test]
    fn parens_override_precedence() {
        let (nodes, errors) = parse_str("fn f() = (1 + 2) * 3");
        assert!(errors.is_empty());
        assert_eq!(
            body_of(&nodes[0])[0],
            binary(
                '*',
                binary('+', Expr::Integer(1), Expr::Integer(2)),
                Expr::Integer(3)
            )
        );
    }

    #[test]
    fn calls_take_comma_separated_arguments() {
        let (nodes, errors) = parse_str("fn f() = g(1, 2 + 3)");
        assert!(errors.is_empty());
        assert_eq!(
            body_of(&nodes[0])[0],
            Expr::Call {
                name: "g".to_string(),
                args: vec![
                    Expr::Integer(1),
                    binary('+', Expr::Integer(2), Expr::Integer(3))
                ],
            }
        );
    }

    #[test]
    fn empty_argument_lists_parse() {
        let (nodes, errors) = parse_str("fn f() = g()");
        assert!(errors.is_empty());
        assert_eq!(
            body_of(&nodes[0])[0],
            Expr::Call {
                name: "g".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn val_declaration_becomes_a_value_node() {
        let (nodes, errors) = parse_str("fn f(x) = { val y = x + 1 y * 2 }");
        assert!(errors.is_empty());
        let body = body_of(&nodes[0]);
        assert_eq!(body.len(), 2);
        assert_eq!(
            body[0],
            Expr::Value {
                constant: true,
                name: "y".to_string(),
                init: Box::new(binary(
                    '+',
                    Expr::Identifier("x".to_string()),
                    Expr::Integer(1)
                )),
            }
        );
    }

    #[test]
    fn var_declaration_is_not_constant() {
        let (nodes, errors) = parse_str("fn f() = { var y = 1 y }");
        assert!(errors.is_empty());
        assert!(matches!(
            &body_of(&nodes[0])[0],
            Expr::Value {
                constant: false,
                ..
            }
        ));
    }

    #[test]
    fn multi_name_declaration_becomes_tuple_assignment() {
        let (nodes, errors) = parse_str("fn f() = { val a, b = 1, 2 a }");
        assert!(errors.is_empty());
        assert_eq!(
            body_of(&nodes[0])[0],
            Expr::TupleAssignment {
                left: vec![
                    Expr::Identifier("a".to_string()),
                    Expr::Identifier("b".to_string())
                ],
                right: vec![Expr::Integer(1), Expr::Integer(2)],
            }
        );
    }

    #[test]
    fn mismatched_declaration_counts_are_a_syntax_error() {
        let (nodes, errors) = parse_str("fn f() = { val a, b = 1 a }");
        assert!(nodes.is_empty());
        assert!(errors
            .iter()
            .any(|e| e.kind == ErrorKind::Syntax && e.message.contains("num of declarations")));
    }

    #[test]
    fn plain_if_has_empty_else_arm() {
        let (nodes, errors) = parse_str("fn g(x) = if x { 1 }");
        assert!(errors.is_empty());
        match &body_of(&nodes[0])[0] {
            Expr::If { then, els, .. } => {
                assert_eq!(then.len(), 1);
                assert!(els.is_empty());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn elif_chain_nests_in_the_else_arm() {
        let (nodes, errors) = parse_str("fn h(x) = if x { 1 } elif x { 2 } else { 3 }");
        assert!(errors.is_empty());
        match &body_of(&nodes[0])[0] {
            Expr::If { els, .. } => {
                assert_eq!(els.len(), 1);
                match &els[0] {
                    Expr::If { then, els, .. } => {
                        assert_eq!(then[0], Expr::Integer(2));
                        assert_eq!(els[0], Expr::Integer(3));
                    }
                    other => panic!("expected nested if, got {:?}", other),
                }
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn bare_fn_reports_expected_fn_name() {
        let (nodes, errors) = parse_str("fn");
        assert!(nodes.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Syntax);
        assert_eq!(errors[0].explanation, "Expected fn name");
    }

    #[test]
    fn stray_top_level_token_stops_parsing() {
        let (nodes, errors) = parse_str("7 fn f() = 1");
        assert!(nodes.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].explanation, "Expected `fn'");
    }

    #[test]
    fn duplicate_params_are_rejected() {
        let (nodes, errors) = parse_str("fn f(a, a) = a");
        assert!(nodes.is_empty());
        assert!(errors.iter().any(|e| e.message.contains("Duplicate param")));
    }

    #[test]
    fn error_inside_a_block_synchronizes_at_the_brace() {
        let (nodes, errors) = parse_str("fn f() = { val = 1 } fn g() = 2");
        assert!(!errors.is_empty());
        // f is abandoned, g still parses.
        assert_eq!(nodes.len(), 1);
        assert!(matches!(&nodes[0], Expr::Function { proto, .. } if proto.name == "g"));
    }

    #[test]
    fn missing_close_brace_is_reported_at_eof() {
        let (_, errors) = parse_str("fn f() = { 1");
        assert!(errors.iter().any(|e| e.explanation == "Expected block `}'"));
    }

    #[test]
    fn invalid_token_surfaces_as_unexpected() {
        let (nodes, errors) = parse_str("fn f() = @");
        assert!(nodes.is_empty());
        assert!(!errors.is_empty());
        assert!(errors[0].message.starts_with("Unexpected (invalid"));
    }
}
