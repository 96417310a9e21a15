//! IR instruction set.
//!
//! The set is deliberately small: the arithmetic the language surface can
//! express, an equality compare for branch conditions, calls, the three
//! terminators, and φ nodes for merging values after conditional control
//! flow. Every non-terminator produces exactly one value.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use super::function::Function;
use super::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Exact signed division: the quotient is assumed to have no remainder.
    Div,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => f.write_str("add"),
            BinaryOp::Sub => f.write_str("sub"),
            BinaryOp::Mul => f.write_str("mul"),
            BinaryOp::Div => f.write_str("div"),
        }
    }
}

/// Block operands are stored as indices into the owning function's block
/// list; labels are resolved at display time.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Binary {
        op: BinaryOp,
        result: u32,
        lhs: Value,
        rhs: Value,
    },
    /// Integer equality producing an `i1`.
    IcmpEq {
        result: u32,
        lhs: Value,
        rhs: Value,
    },
    Call {
        result: u32,
        callee: String,
        args: Vec<Value>,
    },
    /// Merge of values flowing in from two predecessor blocks.
    Phi {
        result: u32,
        incomings: Vec<(Value, u32)>,
    },
    Br {
        target: u32,
    },
    CondBr {
        cond: Value,
        then_block: u32,
        else_block: u32,
    },
    Ret {
        value: Value,
    },
}

impl Instruction {
    /// The value this instruction defines, if any.
    pub fn result(&self) -> Option<u32> {
        match self {
            Instruction::Binary { result, .. }
            | Instruction::IcmpEq { result, .. }
            | Instruction::Call { result, .. }
            | Instruction::Phi { result, .. } => Some(*result),
            Instruction::Br { .. } | Instruction::CondBr { .. } | Instruction::Ret { .. } => None,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Br { .. } | Instruction::CondBr { .. } | Instruction::Ret { .. }
        )
    }

    pub fn for_each_operand(&self, f: &mut dyn FnMut(Value)) {
        match self {
            Instruction::Binary { lhs, rhs, .. } | Instruction::IcmpEq { lhs, rhs, .. } => {
                f(*lhs);
                f(*rhs);
            }
            Instruction::Call { args, .. } => {
                for arg in args {
                    f(*arg);
                }
            }
            Instruction::Phi { incomings, .. } => {
                for (value, _) in incomings {
                    f(*value);
                }
            }
            Instruction::Br { .. } => {}
            Instruction::CondBr { cond, .. } => f(*cond),
            Instruction::Ret { value } => f(*value),
        }
    }

    pub fn for_each_operand_mut(&mut self, f: &mut dyn FnMut(&mut Value)) {
        match self {
            Instruction::Binary { lhs, rhs, .. } | Instruction::IcmpEq { lhs, rhs, .. } => {
                f(lhs);
                f(rhs);
            }
            Instruction::Call { args, .. } => {
                for arg in args {
                    f(arg);
                }
            }
            Instruction::Phi { incomings, .. } => {
                for (value, _) in incomings {
                    f(value);
                }
            }
            Instruction::Br { .. } => {}
            Instruction::CondBr { cond, .. } => f(cond),
            Instruction::Ret { value } => f(value),
        }
    }

    /// Render with the owning function supplying value names and block
    /// labels.
    pub fn fmt_with(&self, f: &mut fmt::Formatter<'_>, func: &Function) -> fmt::Result {
        match self {
            Instruction::Binary {
                op,
                result,
                lhs,
                rhs,
            } => write!(
                f,
                "%{} = {}.i64 {}, {}",
                func.value_name(*result),
                op,
                func.value_str(*lhs),
                func.value_str(*rhs)
            ),
            Instruction::IcmpEq { result, lhs, rhs } => write!(
                f,
                "%{} = icmp.eq.i64 {}, {}",
                func.value_name(*result),
                func.value_str(*lhs),
                func.value_str(*rhs)
            ),
            Instruction::Call {
                result,
                callee,
                args,
            } => {
                write!(f, "%{} = call @{}(", func.value_name(*result), callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(&func.value_str(*arg))?;
                }
                f.write_str(")")
            }
            Instruction::Phi { result, incomings } => {
                write!(f, "%{} = phi.i64", func.value_name(*result))?;
                for (i, (value, block)) in incomings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " [ {}, {} ]", func.value_str(*value), func.label(*block))?;
                }
                Ok(())
            }
            Instruction::Br { target } => write!(f, "br {}", func.label(*target)),
            Instruction::CondBr {
                cond,
                then_block,
                else_block,
            } => write!(
                f,
                "cbr {}, {}, {}",
                func.value_str(*cond),
                func.label(*then_block),
                func.label(*else_block)
            ),
            Instruction::Ret { value } => write!(f, "ret.i64 {}", func.value_str(*value)),
        }
    }
}
