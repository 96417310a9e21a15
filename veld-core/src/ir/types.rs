//! Core identifier and value types for the IR.

use core::fmt;

/// Index of a function within its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncId(pub(crate) u32);

/// A basic block handle: the owning function plus the block's index inside
/// it. Handles stay valid for the lifetime of the module; blocks are never
/// removed, only appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockId {
    pub(crate) func: FuncId,
    pub(crate) index: u32,
}

impl BlockId {
    pub fn function(&self) -> FuncId {
        self.func
    }
}

/// An SSA value handle.
///
/// Constants are immediate — they never materialize as instructions — while
/// `Ref` indexes the defining function's value table (arguments first, then
/// instruction results). A `Value` is only meaningful within the function
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Const(i64),
    Ref(u32),
}

/// The two types the IR knows about: 64-bit integers and branch conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    I64,
    I1,
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::I64 => f.write_str("i64"),
            Ty::I1 => f.write_str("i1"),
        }
    }
}
