//! IR modules.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use super::function::Function;
use super::types::FuncId;

/// A complete IR module: the functions of one compilation, in declaration
/// order. Lookup is by source name; the order is preserved so the textual
/// form is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Module {
        Module {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub(crate) fn declare(&mut self, name: &str, params: &[String]) -> FuncId {
        let id = FuncId(self.functions.len() as u32);
        self.functions.push(Function::new(name, params));
        id
    }

    pub fn function_by_name(&self, name: &str) -> Option<FuncId> {
        self.functions
            .iter()
            .position(|f| f.name == name)
            .map(|i| FuncId(i as u32))
    }

    pub fn get(&self, id: FuncId) -> &Function {
        &self.functions[id.0 as usize]
    }

    pub(crate) fn get_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.0 as usize]
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, func) in self.functions.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn lookup_is_by_source_name() {
        let mut module = Module::new("m");
        let a = module.declare("a", &[]);
        let b = module.declare("b", &["x".to_string()]);
        assert_eq!(module.function_by_name("a"), Some(a));
        assert_eq!(module.function_by_name("b"), Some(b));
        assert_eq!(module.function_by_name("c"), None);
    }

    #[test]
    fn empty_module_prints_nothing() {
        let module = Module::new("m");
        assert_eq!(alloc::format!("{}", module), "");
    }
}
