//! Positional builder over an IR module.
//!
//! `ModuleBuilder` is the concrete implementation of the [`IrBuilder`]
//! interface the generator compiles against. It keeps an insert cursor
//! (function + block) and appends instructions there, minting fresh result
//! values as it goes. Block labels are uniqued within a function so nested
//! control flow can reuse the `then`/`else`/`merge` hints.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::function::{Block, Function};
use super::instruction::{BinaryOp, Instruction};
use super::module::Module;
use super::passes;
use super::types::{BlockId, FuncId, Ty, Value};
use super::verify::{self, IrError};
use super::IrBuilder;

pub struct ModuleBuilder {
    module: Module,
    cursor: Option<BlockId>,
}

impl ModuleBuilder {
    pub fn new(module_name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            module: Module::new(module_name),
            cursor: None,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn finish(self) -> Module {
        self.module
    }

    fn cursor(&self) -> BlockId {
        self.cursor.expect("builder has no insert point")
    }

    fn push(&mut self, inst: Instruction) {
        let at = self.cursor();
        self.module.get_mut(at.func).blocks[at.index as usize]
            .insts
            .push(inst);
    }

    fn push_with_result(&mut self, ty: Ty, make: impl FnOnce(u32) -> Instruction) -> Value {
        let at = self.cursor();
        let func = self.module.get_mut(at.func);
        let result = func.new_temp(ty);
        func.blocks[at.index as usize].insts.push(make(result));
        Value::Ref(result)
    }

    fn binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Value {
        self.push_with_result(Ty::I64, |result| Instruction::Binary {
            op,
            result,
            lhs,
            rhs,
        })
    }
}

fn unique_label(func: &Function, hint: &str) -> String {
    let taken = |label: &str| func.blocks.iter().any(|b| b.label == label);
    if !taken(hint) {
        return hint.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}{}", hint, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

impl IrBuilder for ModuleBuilder {
    fn const_i64(&mut self, value: i64) -> Value {
        Value::Const(value)
    }

    fn iadd(&mut self, lhs: Value, rhs: Value) -> Value {
        self.binary(BinaryOp::Add, lhs, rhs)
    }

    fn isub(&mut self, lhs: Value, rhs: Value) -> Value {
        self.binary(BinaryOp::Sub, lhs, rhs)
    }

    fn imul(&mut self, lhs: Value, rhs: Value) -> Value {
        self.binary(BinaryOp::Mul, lhs, rhs)
    }

    fn sdiv(&mut self, lhs: Value, rhs: Value) -> Value {
        self.binary(BinaryOp::Div, lhs, rhs)
    }

    fn icmp_eq(&mut self, lhs: Value, rhs: Value) -> Value {
        self.push_with_result(Ty::I1, |result| Instruction::IcmpEq { result, lhs, rhs })
    }

    fn declare_function(&mut self, name: &str, params: &[String]) -> FuncId {
        self.module.declare(name, params)
    }

    fn function_by_name(&self, name: &str) -> Option<FuncId> {
        self.module.function_by_name(name)
    }

    fn function_name(&self, func: FuncId) -> &str {
        &self.module.get(func).name
    }

    fn function_is_defined(&self, func: FuncId) -> bool {
        self.module.get(func).is_defined()
    }

    fn param_count(&self, func: FuncId) -> usize {
        self.module.get(func).param_count()
    }

    fn arg_value(&self, func: FuncId, index: usize) -> Value {
        self.module.get(func).arg(index)
    }

    fn append_block(&mut self, func: FuncId, hint: &str) -> BlockId {
        let function = self.module.get_mut(func);
        let label = unique_label(function, hint);
        let index = function.blocks.len() as u32;
        function.blocks.push(Block {
            label,
            insts: Vec::new(),
        });
        BlockId { func, index }
    }

    fn set_insert_point(&mut self, block: BlockId) {
        self.cursor = Some(block);
    }

    fn current_block(&self) -> Option<BlockId> {
        self.cursor
    }

    fn br(&mut self, target: BlockId) {
        self.push(Instruction::Br {
            target: target.index,
        });
    }

    fn cond_br(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) {
        self.push(Instruction::CondBr {
            cond,
            then_block: then_block.index,
            else_block: else_block.index,
        });
    }

    fn call(&mut self, callee: FuncId, args: Vec<Value>) -> Value {
        let callee = self.module.get(callee).name.clone();
        self.push_with_result(Ty::I64, |result| Instruction::Call {
            result,
            callee,
            args,
        })
    }

    fn ret(&mut self, value: Value) {
        self.push(Instruction::Ret { value });
    }

    fn phi(&mut self, incomings: [(Value, BlockId); 2]) -> Value {
        let incomings = incomings
            .iter()
            .map(|(value, block)| (*value, block.index))
            .collect::<Vec<_>>();
        self.push_with_result(Ty::I64, |result| Instruction::Phi { result, incomings })
    }

    fn verify_function(&self, func: FuncId) -> Result<(), IrError> {
        verify::verify_function(&self.module, func)
    }

    fn run_local_optimizations(&mut self, func: FuncId) {
        passes::run_local_optimizations(self.module.get_mut(func));
    }

    fn emit_textual(&self) -> String {
        format!("{}", self.module)
    }
}
