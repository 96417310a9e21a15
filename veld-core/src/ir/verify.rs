//! Structural verification of generated functions.
//!
//! The generator runs this on every function it finishes. Violations here
//! are compiler bugs, not user errors, so the messages name the broken
//! invariant directly.

use alloc::format;
use alloc::string::String;
use core::fmt;

use super::instruction::Instruction;
use super::module::Module;
use super::types::{FuncId, Ty, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrError {
    pub function: String,
    pub message: String,
}

impl fmt::Display for IrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "verification of @{} failed: {}", self.function, self.message)
    }
}

pub fn verify_function(module: &Module, id: FuncId) -> Result<(), IrError> {
    let func = module.get(id);
    let fail = |message: String| {
        Err(IrError {
            function: func.name.clone(),
            message,
        })
    };

    if !func.is_defined() {
        return fail(String::from("function has no body"));
    }

    for block in &func.blocks {
        let Some(last) = block.insts.last() else {
            return fail(format!("block {} is empty", block.label));
        };
        if !last.is_terminator() {
            return fail(format!("block {} does not end in a terminator", block.label));
        }

        let mut past_phis = false;
        for (i, inst) in block.insts.iter().enumerate() {
            if inst.is_terminator() && i + 1 != block.insts.len() {
                return fail(format!("terminator in the middle of block {}", block.label));
            }

            if let Instruction::Phi { incomings, .. } = inst {
                if past_phis {
                    return fail(format!("phi after non-phi in block {}", block.label));
                }
                if incomings.len() != 2 {
                    return fail(format!(
                        "phi in block {} has {} incoming edges",
                        block.label,
                        incomings.len()
                    ));
                }
                if incomings[0].1 == incomings[1].1 {
                    return fail(format!(
                        "phi in block {} names the same predecessor twice",
                        block.label
                    ));
                }
                for (_, pred) in incomings {
                    if *pred as usize >= func.blocks.len() {
                        return fail(format!("phi in block {} names a missing block", block.label));
                    }
                }
            } else {
                past_phis = true;
            }

            let mut operand_error = None;
            inst.for_each_operand(&mut |value| {
                if let Value::Ref(r) = value {
                    if r as usize >= func.value_count() {
                        operand_error = Some(format!(
                            "instruction in block {} references an undefined value",
                            block.label
                        ));
                    }
                }
            });
            if let Some(message) = operand_error {
                return fail(message);
            }

            match inst {
                Instruction::Call { callee, args, .. } => {
                    let Some(target) = module.function_by_name(callee) else {
                        return fail(format!("call to unknown function @{}", callee));
                    };
                    let expected = module.get(target).param_count();
                    if args.len() != expected {
                        return fail(format!(
                            "call to @{} passes {} arguments, expected {}",
                            callee,
                            args.len(),
                            expected
                        ));
                    }
                }
                Instruction::Br { target } => {
                    if *target as usize >= func.blocks.len() {
                        return fail(format!("branch in block {} targets a missing block", block.label));
                    }
                }
                Instruction::CondBr {
                    cond,
                    then_block,
                    else_block,
                } => {
                    for target in [then_block, else_block] {
                        if *target as usize >= func.blocks.len() {
                            return fail(format!(
                                "branch in block {} targets a missing block",
                                block.label
                            ));
                        }
                    }
                    let cond_ok = match cond {
                        Value::Const(c) => *c == 0 || *c == 1,
                        Value::Ref(_) => func.value_ty(*cond) == Ty::I1,
                    };
                    if !cond_ok {
                        return fail(format!(
                            "conditional branch in block {} has a non-i1 condition",
                            block.label
                        ));
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}
