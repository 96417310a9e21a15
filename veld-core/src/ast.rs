//! Abstract syntax tree for Veld.
//!
//! The node family is a single closed enum; each node exclusively owns its
//! children and visitors borrow nodes rather than sharing ownership. The
//! pretty-printer emits the S-expression form compared by the snapshot
//! harness: the first child of a node sits on the header line, subsequent
//! siblings are aligned beneath it.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// A function formal. Parameters are `var` bindings today; the flag is kept
/// so `val` formals print and lower correctly once the grammar admits them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub constant: bool,
    pub name: String,
}

/// A function signature: name plus formals. Parameter names are distinct;
/// the parser enforces this before the node is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer(i64),
    Identifier(String),
    Binary {
        op: char,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Parameter(Parameter),
    Prototype(Prototype),
    /// A top-level definition. The body is non-empty and its final
    /// expression is the function's return value.
    Function {
        proto: Prototype,
        body: Vec<Expr>,
    },
    If {
        cond: Box<Expr>,
        then: Vec<Expr>,
        els: Vec<Expr>,
    },
    /// A local binding introduced by `val` or `var`.
    Value {
        constant: bool,
        name: String,
        init: Box<Expr>,
    },
    Assignment {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    TupleAssignment {
        left: Vec<Expr>,
        right: Vec<Expr>,
    },
}

fn pad(f: &mut fmt::Formatter<'_>, n: usize) -> fmt::Result {
    for _ in 0..n {
        f.write_str(" ")?;
    }
    Ok(())
}

/// Print `items` as a parenthesized group starting at column `col`: the
/// first item shares the opening line, the rest are aligned under it.
fn print_group(f: &mut fmt::Formatter<'_>, items: &[Expr], col: usize) -> fmt::Result {
    f.write_str("(")?;
    let mut first = true;
    for item in items {
        if first {
            first = false;
        } else {
            f.write_str("\n")?;
            pad(f, col + 1)?;
        }
        item.print(f, col + 1)?;
    }
    f.write_str(")")
}

impl Parameter {
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(param {} {})",
            if self.constant { "val" } else { "var" },
            self.name
        )
    }
}

impl Prototype {
    fn print(&self, f: &mut fmt::Formatter<'_>, col: usize) -> fmt::Result {
        write!(f, "(proto {}", self.name)?;
        if self.params.is_empty() {
            return f.write_str(" ())");
        }

        f.write_str("\n")?;
        pad(f, col + 7)?;
        f.write_str("(")?;
        let mut first = true;
        for param in &self.params {
            if first {
                first = false;
            } else {
                f.write_str("\n")?;
                pad(f, col + 8)?;
            }
            param.print(f)?;
        }
        f.write_str("))")
    }
}

impl Expr {
    /// Render this node starting at column `col`. The caller has already
    /// emitted any leading indentation.
    fn print(&self, f: &mut fmt::Formatter<'_>, col: usize) -> fmt::Result {
        match self {
            Expr::Integer(value) => write!(f, "(int {})", value),
            Expr::Identifier(name) => write!(f, "(id {})", name),
            Expr::Binary { op, left, right } => {
                write!(f, "({}", op)?;
                f.write_str("\n")?;
                pad(f, col + 1)?;
                left.print(f, col + 1)?;
                f.write_str("\n")?;
                pad(f, col + 1)?;
                right.print(f, col + 1)?;
                f.write_str(")")
            }
            Expr::Call { name, args } => {
                write!(f, "(call {}", name)?;
                if args.is_empty() {
                    return f.write_str(")");
                }
                // Arguments align under the first, right after the name.
                let arg_col = col + 7 + name.len();
                f.write_str(" ")?;
                let mut first = true;
                for arg in args {
                    if first {
                        first = false;
                    } else {
                        f.write_str("\n")?;
                        pad(f, arg_col)?;
                    }
                    arg.print(f, arg_col)?;
                }
                f.write_str(")")
            }
            Expr::Parameter(param) => param.print(f),
            Expr::Prototype(proto) => proto.print(f, col),
            Expr::Function { proto, body } => {
                f.write_str("(fn ")?;
                proto.print(f, col + 4)?;
                f.write_str("\n")?;
                pad(f, col + 4)?;
                print_group(f, body, col + 4)?;
                f.write_str(")")
            }
            Expr::If { cond, then, els } => {
                f.write_str("(if ")?;
                cond.print(f, col + 4)?;
                f.write_str("\n")?;
                pad(f, col + 4)?;
                print_group(f, then, col + 4)?;
                f.write_str("\n")?;
                pad(f, col + 4)?;
                print_group(f, els, col + 4)?;
                f.write_str(")")
            }
            Expr::Value {
                constant,
                name,
                init,
            } => {
                let kw = if *constant { "val" } else { "var" };
                write!(f, "({} {} ", kw, name)?;
                init.print(f, col + kw.len() + name.len() + 3)?;
                f.write_str(")")
            }
            Expr::Assignment { left, right } => {
                f.write_str("(asgn")?;
                f.write_str("\n")?;
                pad(f, col + 1)?;
                left.print(f, col + 1)?;
                f.write_str("\n")?;
                pad(f, col + 1)?;
                right.print(f, col + 1)?;
                f.write_str(")")
            }
            Expr::TupleAssignment { left, right } => {
                f.write_str("(tasgn ")?;
                print_group(f, left, col + 7)?;
                f.write_str("\n")?;
                pad(f, col + 7)?;
                print_group(f, right, col + 7)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print(f, 0)
    }
}
