// Tue Feb 10 2026 - Alex

use crate::symbol::{Address, Symbol, SymbolKind};
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::HashMap;

/// The central owned collection of symbol records, keyed by address in
/// discovery order. Discovery order is load-bearing: name lookups and
/// deepest-path tie-breaks resolve to the first-seen candidate.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: IndexMap<u64, Symbol>,
    by_name: Option<HashMap<String, Address>>,
    by_qualified_name: Option<HashMap<String, Address>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.symbols.clear();
        self.by_name = None;
        self.by_qualified_name = None;
    }

    /// Inserts or merges a symbol at `address`. The address is the identity:
    /// re-adding the same address merges attributes, and the first non-empty
    /// name wins. A conflicting name is tolerated, not an error.
    pub fn insert_symbol(&mut self, address: Address, name: &str) -> &mut Symbol {
        self.by_name = None;
        self.by_qualified_name = None;

        let sym = self
            .symbols
            .entry(address.as_u64())
            .or_insert_with(|| Symbol::new(address, name.to_string()));
        if sym.name.is_empty() {
            sym.name = name.to_string();
        } else if sym.name != name {
            log::debug!(
                "name for symbol at {} inconsistent (was '{}', now '{}')",
                address,
                sym.name,
                name
            );
        }
        sym
    }

    pub fn symbol_by_addr(&self, address: Address) -> Option<&Symbol> {
        self.symbols.get(&address.as_u64())
    }

    pub fn symbol_by_addr_mut(&mut self, address: Address) -> Option<&mut Symbol> {
        self.symbols.get_mut(&address.as_u64())
    }

    pub fn contains(&self, address: Address) -> bool {
        self.symbols.contains_key(&address.as_u64())
    }

    /// Looks a symbol up by exact qualified name (`path/name`) or by
    /// unqualified raw name, returning the first match in discovery order.
    pub fn symbol(&self, name: &str, qualified: bool) -> Option<&Symbol> {
        let index = if qualified {
            &self.by_qualified_name
        } else {
            &self.by_name
        };
        if let Some(index) = index {
            return index.get(name).and_then(|addr| self.symbol_by_addr(*addr));
        }
        self.symbols.values().find(|s| {
            if qualified {
                s.qualified_name() == name
            } else {
                s.name == name
            }
        })
    }

    /// Builds the name indexes eagerly; lookups fall back to a linear scan
    /// until this has run. First-seen symbols win duplicate names.
    pub fn build_name_index(&mut self) {
        let mut by_name = HashMap::new();
        let mut by_qualified_name = HashMap::new();
        for sym in self.symbols.values() {
            if !sym.name.is_empty() {
                by_name.entry(sym.name.clone()).or_insert(sym.address);
            }
            by_qualified_name
                .entry(sym.qualified_name())
                .or_insert(sym.address);
        }
        self.by_name = Some(by_name);
        self.by_qualified_name = Some(by_qualified_name);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Symbol> {
        self.symbols.values_mut()
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.symbols.values().map(|s| s.address).collect()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols sorted descending by size; ties keep discovery order.
    pub fn all_symbols(&self) -> Vec<&Symbol> {
        self.symbols
            .values()
            .sorted_by(|a, b| b.size.unwrap_or(0).cmp(&a.size.unwrap_or(0)))
            .collect()
    }

    pub fn all_functions(&self) -> Vec<&Symbol> {
        self.all_symbols()
            .into_iter()
            .filter(|s| s.is_function())
            .collect()
    }

    pub fn all_variables(&self) -> Vec<&Symbol> {
        self.all_symbols()
            .into_iter()
            .filter(|s| s.is_variable())
            .collect()
    }

    /// Links functions that are adjacent in memory: the function at
    /// `address + size` becomes `next_function`, and the inverse reference
    /// becomes `prev_function`.
    pub fn enhance_sibling_symbols(&mut self) {
        let functions: Vec<(Address, Option<u64>)> = self
            .symbols
            .values()
            .filter(|s| s.is_function())
            .map(|s| (s.address, s.size))
            .collect();

        for (addr, size) in &functions {
            let Some(size) = size else { continue };
            let next_addr = *addr + *size;
            let next_is_function = self
                .symbol_by_addr(next_addr)
                .map(|s| s.is_function())
                .unwrap_or(false);
            if next_is_function {
                if let Some(sym) = self.symbol_by_addr_mut(*addr) {
                    sym.next_function = Some(next_addr);
                }
            }
        }

        for (addr, _) in &functions {
            let next = self.symbol_by_addr(*addr).and_then(|s| s.next_function);
            if let Some(next_addr) = next {
                if let Some(next_sym) = self.symbol_by_addr_mut(next_addr) {
                    next_sym.prev_function = Some(*addr);
                }
            }
        }
    }
}
