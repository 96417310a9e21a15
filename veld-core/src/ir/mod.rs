//! In-house SSA intermediate representation.
//!
//! The IR generator compiles against the [`IrBuilder`] interface below; the
//! rest of this module is the concrete block-structured SSA dialect that
//! backs it. A module holds functions in declaration order, a function holds
//! labeled basic blocks, and every non-terminator instruction produces one
//! typed value. The textual form (`Display` on [`Module`]) is the byte
//! stream handed to downstream tooling.

pub mod builder;
pub mod function;
pub mod instruction;
pub mod module;
pub mod passes;
pub mod types;
pub mod verify;

pub use builder::ModuleBuilder;
pub use function::{Block, Function};
pub use instruction::{BinaryOp, Instruction};
pub use module::Module;
pub use types::{BlockId, FuncId, Ty, Value};
pub use verify::IrError;

use alloc::string::String;
use alloc::vec::Vec;

/// The surface the IR generator depends on.
///
/// Any IR library able to express i64 arithmetic, calls, conditional
/// branches and φ-merges can sit behind this; [`ModuleBuilder`] is the
/// implementation shipped here. Handles (`FuncId`, `BlockId`, [`Value`]) are
/// cheap copies owned by the implementation.
pub trait IrBuilder {
    fn const_i64(&mut self, value: i64) -> Value;

    fn iadd(&mut self, lhs: Value, rhs: Value) -> Value;
    fn isub(&mut self, lhs: Value, rhs: Value) -> Value;
    fn imul(&mut self, lhs: Value, rhs: Value) -> Value;
    /// Exact signed division.
    fn sdiv(&mut self, lhs: Value, rhs: Value) -> Value;
    /// Integer equality; the result is an `i1`.
    fn icmp_eq(&mut self, lhs: Value, rhs: Value) -> Value;

    /// Declare `(i64, …) -> i64` with external linkage; the IR arguments are
    /// named after `params`.
    fn declare_function(&mut self, name: &str, params: &[String]) -> FuncId;
    fn function_by_name(&self, name: &str) -> Option<FuncId>;
    fn function_name(&self, func: FuncId) -> &str;
    fn function_is_defined(&self, func: FuncId) -> bool;
    fn param_count(&self, func: FuncId) -> usize;
    fn arg_value(&self, func: FuncId, index: usize) -> Value;

    fn append_block(&mut self, func: FuncId, hint: &str) -> BlockId;
    fn set_insert_point(&mut self, block: BlockId);
    fn current_block(&self) -> Option<BlockId>;

    fn br(&mut self, target: BlockId);
    fn cond_br(&mut self, cond: Value, then_block: BlockId, else_block: BlockId);
    fn call(&mut self, callee: FuncId, args: Vec<Value>) -> Value;
    fn ret(&mut self, value: Value);
    fn phi(&mut self, incomings: [(Value, BlockId); 2]) -> Value;

    fn verify_function(&self, func: FuncId) -> Result<(), IrError>;
    fn run_local_optimizations(&mut self, func: FuncId);

    /// Serialize the whole module to its textual form.
    fn emit_textual(&self) -> String;
}
