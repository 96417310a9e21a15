//! IR functions and basic blocks.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use super::instruction::Instruction;
use super::types::{Ty, Value};

/// A name/type entry in a function's value table. Arguments occupy the first
/// slots, instruction results follow with fresh `tN` names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueInfo {
    pub name: String,
    pub ty: Ty,
}

/// A basic block: label plus straight-line instructions, terminator last.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: String,
    pub insts: Vec<Instruction>,
}

/// A function definition or declaration.
///
/// Every signature is `(i64, …) -> i64`; only the arity varies. A function
/// with no blocks is a declaration (external linkage, body elsewhere or not
/// yet emitted).
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub blocks: Vec<Block>,
    values: Vec<ValueInfo>,
    param_count: usize,
    next_temp: u32,
}

impl Function {
    pub(crate) fn new(name: &str, params: &[String]) -> Function {
        let values = params
            .iter()
            .map(|p| ValueInfo {
                name: p.clone(),
                ty: Ty::I64,
            })
            .collect::<Vec<_>>();
        Function {
            name: String::from(name),
            blocks: Vec::new(),
            param_count: values.len(),
            values,
            next_temp: 0,
        }
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn is_defined(&self) -> bool {
        !self.blocks.is_empty()
    }

    /// Handle for the `index`-th argument.
    pub fn arg(&self, index: usize) -> Value {
        Value::Ref(index as u32)
    }

    pub(crate) fn new_temp(&mut self, ty: Ty) -> u32 {
        let id = self.values.len() as u32;
        self.values.push(ValueInfo {
            name: format!("t{}", self.next_temp),
            ty,
        });
        self.next_temp += 1;
        id
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn value_name(&self, id: u32) -> &str {
        &self.values[id as usize].name
    }

    pub fn value_ty(&self, value: Value) -> Ty {
        match value {
            Value::Const(_) => Ty::I64,
            Value::Ref(id) => self.values[id as usize].ty,
        }
    }

    /// Operand spelling: constants print literally, references as `%name`.
    pub fn value_str(&self, value: Value) -> String {
        match value {
            Value::Const(c) => format!("{}", c),
            Value::Ref(id) => format!("%{}", self.values[id as usize].name),
        }
    }

    pub fn label(&self, block: u32) -> &str {
        &self.blocks[block as usize].label
    }

    fn fmt_signature(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}(", self.name)?;
        for i in 0..self.param_count {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "i64 %{}", self.values[i].name)?;
        }
        f.write_str(") -> i64")
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_defined() {
            f.write_str("decl ")?;
            self.fmt_signature(f)?;
            return f.write_str("\n");
        }

        f.write_str("fn ")?;
        self.fmt_signature(f)?;
        f.write_str(" {\n")?;
        for block in &self.blocks {
            writeln!(f, "{}:", block.label)?;
            for inst in &block.insts {
                f.write_str("  ")?;
                inst.fmt_with(f, self)?;
                f.write_str("\n")?;
            }
        }
        f.write_str("}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::instruction::BinaryOp;
    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn declaration_renders_signature_only() {
        let func = Function::new("twice", &["x".to_string()]);
        assert_eq!(format!("{}", func), "decl @twice(i64 %x) -> i64\n");
    }

    #[test]
    fn definition_renders_blocks_and_instructions() {
        let mut func = Function::new("inc", &["x".to_string()]);
        let result = func.new_temp(Ty::I64);
        func.blocks.push(Block {
            label: "entry".to_string(),
            insts: vec![
                Instruction::Binary {
                    op: BinaryOp::Add,
                    result,
                    lhs: func.arg(0),
                    rhs: Value::Const(1),
                },
                Instruction::Ret {
                    value: Value::Ref(result),
                },
            ],
        });
        assert_eq!(
            format!("{}", func),
            "fn @inc(i64 %x) -> i64 {\nentry:\n  %t0 = add.i64 %x, 1\n  ret.i64 %t0\n}\n"
        );
    }

    #[test]
    fn temps_get_sequential_names() {
        let mut func = Function::new("f", &[]);
        let t0 = func.new_temp(Ty::I64);
        assert_eq!(func.value_name(t0), "t0");
        let t1 = func.new_temp(Ty::I1);
        assert_eq!(func.value_name(t1), "t1");
    }
}
