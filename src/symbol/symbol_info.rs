// Tue Feb 10 2026 - Alex

use crate::hierarchy::FileId;
use crate::symbol::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Variable,
}

/// A named, addressed entity in the analyzed binary. Everything except the
/// address and raw name is optional and filled in by successive enrichment
/// passes; the call-graph and file references are rebuilt on every analysis
/// run and are not part of the persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub address: Address,
    pub name: String,
    pub display_name: Option<String>,
    pub size: Option<u64>,
    pub kind: Option<SymbolKind>,
    pub path: Option<String>,
    pub base_file: Option<String>,
    pub line: Option<u32>,
    pub asm: Vec<String>,
    pub stack_size: Option<u64>,
    pub stack_qualifiers: Vec<String>,
    #[serde(skip)]
    pub callers: Vec<Address>,
    #[serde(skip)]
    pub callees: Vec<Address>,
    #[serde(skip)]
    pub prev_function: Option<Address>,
    #[serde(skip)]
    pub next_function: Option<Address>,
    #[serde(skip)]
    pub called_from_other_file: bool,
    #[serde(skip)]
    pub calls_float_function: bool,
    #[serde(skip)]
    pub performs_indirect_call: bool,
    #[serde(skip)]
    pub file: Option<FileId>,
}

impl Symbol {
    pub fn new(address: Address, name: String) -> Self {
        Self {
            address,
            name,
            display_name: None,
            size: None,
            kind: None,
            path: None,
            base_file: None,
            line: None,
            asm: Vec::new(),
            stack_size: None,
            stack_qualifiers: Vec::new(),
            callers: Vec::new(),
            callees: Vec::new(),
            prev_function: None,
            next_function: None,
            called_from_other_file: false,
            calls_float_function: false,
            performs_indirect_call: false,
            file: None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, Some(SymbolKind::Function))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, Some(SymbolKind::Variable))
    }

    /// Sets the source location, deriving the base file name from the path.
    pub fn set_location(&mut self, path: &str, line: Option<u32>) {
        self.path = Some(path.to_string());
        self.base_file = Some(base_file_name(path).to_string());
        if line.is_some() {
            self.line = line;
        }
    }

    /// `path/name` when the symbol has a source file, otherwise the raw name.
    pub fn qualified_name(&self) -> String {
        match (&self.path, &self.base_file) {
            (Some(path), Some(_)) => format!("{}/{}", path, self.name),
            _ => self.name.clone(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(display_name) = &self.display_name {
            write!(f, "{} ({}) @ {}", display_name, self.name, self.address)
        } else {
            write!(f, "{} @ {}", self.name, self.address)
        }
    }
}

pub fn base_file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_location_derives_base_file() {
        let mut sym = Symbol::new(Address::new(0x550), "main".to_string());
        sym.set_location("/src/puncover.c", Some(25));
        assert_eq!(sym.base_file.as_deref(), Some("puncover.c"));
        assert_eq!(sym.line, Some(25));
    }

    #[test]
    fn test_qualified_name() {
        let mut sym = Symbol::new(Address::new(0x550), "main".to_string());
        assert_eq!(sym.qualified_name(), "main");
        sym.set_location("src/puncover.c", None);
        assert_eq!(sym.qualified_name(), "src/puncover.c/main");
    }
}
