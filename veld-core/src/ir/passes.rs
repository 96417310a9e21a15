//! Local optimization passes.
//!
//! Run per function after verification: constant folding of arithmetic and
//! compares, followed by removal of instructions whose results are never
//! used. Iterates to a fixed point so folded chains collapse completely.
//! Terminators and calls are always kept.

use alloc::collections::{BTreeMap, BTreeSet};

use super::function::Function;
use super::instruction::{BinaryOp, Instruction};
use super::types::Value;

pub fn run_local_optimizations(func: &mut Function) {
    loop {
        let consts = find_constant_results(func);
        let mut changed = substitute(func, &consts);
        changed |= remove_dead(func);
        if !changed {
            break;
        }
    }
}

fn resolve(value: Value, consts: &BTreeMap<u32, i64>) -> Value {
    match value {
        Value::Ref(r) => match consts.get(&r) {
            Some(c) => Value::Const(*c),
            None => value,
        },
        Value::Const(_) => value,
    }
}

fn find_constant_results(func: &Function) -> BTreeMap<u32, i64> {
    let mut consts = BTreeMap::new();
    for block in &func.blocks {
        for inst in &block.insts {
            match inst {
                Instruction::Binary {
                    op,
                    result,
                    lhs,
                    rhs,
                } => {
                    if let (Value::Const(a), Value::Const(b)) =
                        (resolve(*lhs, &consts), resolve(*rhs, &consts))
                    {
                        if let Some(value) = fold(*op, a, b) {
                            consts.insert(*result, value);
                        }
                    }
                }
                Instruction::IcmpEq { result, lhs, rhs } => {
                    if let (Value::Const(a), Value::Const(b)) =
                        (resolve(*lhs, &consts), resolve(*rhs, &consts))
                    {
                        consts.insert(*result, i64::from(a == b));
                    }
                }
                _ => {}
            }
        }
    }
    consts
}

fn fold(op: BinaryOp, a: i64, b: i64) -> Option<i64> {
    match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        // Exact division only: fold when the quotient has no remainder.
        BinaryOp::Div => {
            if a.checked_rem(b)? == 0 {
                a.checked_div(b)
            } else {
                None
            }
        }
    }
}

fn substitute(func: &mut Function, consts: &BTreeMap<u32, i64>) -> bool {
    let mut changed = false;
    for block in &mut func.blocks {
        for inst in &mut block.insts {
            inst.for_each_operand_mut(&mut |value| {
                if let Value::Ref(r) = value {
                    if let Some(c) = consts.get(r) {
                        *value = Value::Const(*c);
                        changed = true;
                    }
                }
            });
        }
    }
    changed
}

fn remove_dead(func: &mut Function) -> bool {
    let mut used = BTreeSet::new();
    for block in &func.blocks {
        for inst in &block.insts {
            inst.for_each_operand(&mut |value| {
                if let Value::Ref(r) = value {
                    used.insert(r);
                }
            });
        }
    }

    let mut changed = false;
    for block in &mut func.blocks {
        let before = block.insts.len();
        block.insts.retain(|inst| {
            if inst.is_terminator() || matches!(inst, Instruction::Call { .. }) {
                return true;
            }
            match inst.result() {
                Some(result) => used.contains(&result),
                None => true,
            }
        });
        changed |= block.insts.len() != before;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::function::Block;
    use crate::ir::types::Ty;
    use alloc::string::ToString;
    use alloc::vec;

    fn entry(insts: alloc::vec::Vec<Instruction>) -> Block {
        Block {
            label: "entry".to_string(),
            insts,
        }
    }

    #[test]
    fn folds_a_constant_chain_down_to_the_return() {
        let mut func = Function::new("f", &[]);
        let t0 = func.new_temp(Ty::I64);
        let t1 = func.new_temp(Ty::I64);
        func.blocks.push(entry(vec![
            Instruction::Binary {
                op: BinaryOp::Add,
                result: t0,
                lhs: Value::Const(1),
                rhs: Value::Const(2),
            },
            Instruction::Binary {
                op: BinaryOp::Mul,
                result: t1,
                lhs: Value::Ref(t0),
                rhs: Value::Const(3),
            },
            Instruction::Ret {
                value: Value::Ref(t1),
            },
        ]));

        run_local_optimizations(&mut func);

        assert_eq!(
            func.blocks[0].insts,
            vec![Instruction::Ret {
                value: Value::Const(9)
            }]
        );
    }

    #[test]
    fn inexact_division_is_not_folded() {
        assert_eq!(fold(BinaryOp::Div, 7, 2), None);
        assert_eq!(fold(BinaryOp::Div, 8, 2), Some(4));
        assert_eq!(fold(BinaryOp::Div, 1, 0), None);
        assert_eq!(fold(BinaryOp::Div, i64::MIN, -1), None);
    }

    #[test]
    fn calls_survive_even_when_unused() {
        let mut func = Function::new("f", &[]);
        let t0 = func.new_temp(Ty::I64);
        func.blocks.push(entry(vec![
            Instruction::Call {
                result: t0,
                callee: "g".to_string(),
                args: vec![],
            },
            Instruction::Ret {
                value: Value::Const(0),
            },
        ]));

        run_local_optimizations(&mut func);
        assert_eq!(func.blocks[0].insts.len(), 2);
    }

    #[test]
    fn unused_arithmetic_is_removed() {
        let mut func = Function::new("f", &["x".to_string()]);
        let t0 = func.new_temp(Ty::I64);
        func.blocks.push(entry(vec![
            Instruction::Binary {
                op: BinaryOp::Add,
                result: t0,
                lhs: func.arg(0),
                rhs: Value::Const(1),
            },
            Instruction::Ret {
                value: func.arg(0),
            },
        ]));

        run_local_optimizations(&mut func);
        assert_eq!(func.blocks[0].insts.len(), 1);
    }
}
