// Thu Feb 12 2026 - Alex

use crate::symbol::{Address, SymbolTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Callees,
    Callers,
}

impl Direction {
    fn neighbors(self, table: &SymbolTable, addr: Address) -> Vec<Address> {
        match table.symbol_by_addr(addr) {
            Some(sym) => match self {
                Direction::Callees => sym.callees.clone(),
                Direction::Callers => sym.callers.clone(),
            },
            None => Vec::new(),
        }
    }
}

/// The heaviest acyclic chain through the call graph starting at one
/// function, with the summed worst-case stack bytes along it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallPath {
    pub total_stack: u64,
    pub addresses: Vec<Address>,
}

/// Memoized deepest-path search over the caller/callee edges.
///
/// The cache is only valid for one call-graph state; `reset` must run after
/// the graph is rebuilt. Cycles are cut per branch: a function already on
/// the current chain contributes nothing, so recursive chains terminate with
/// the acyclic prefix.
#[derive(Debug, Default)]
pub struct DeepestPaths {
    cache: HashMap<(u64, Direction), CallPath>,
}

impl DeepestPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Pre-seeds one cache entry. A seeded path stands in for the whole
    /// subtree below `addr`, e.g. a library function whose callees are not
    /// in the table. Cleared by `reset` like any computed entry.
    pub fn seed(&mut self, addr: Address, direction: Direction, path: CallPath) {
        self.cache.insert((addr.as_u64(), direction), path);
    }

    /// Deepest chain following callees, i.e. the worst-case stack a call
    /// into this function can accumulate.
    pub fn deepest_callee_path(&mut self, table: &SymbolTable, addr: Address) -> Option<CallPath> {
        let mut visited = Vec::new();
        self.deepest(table, addr, Direction::Callees, &mut visited)
    }

    /// Deepest chain following callers, i.e. the heaviest stack already in
    /// place when this function is entered.
    pub fn deepest_caller_path(&mut self, table: &SymbolTable, addr: Address) -> Option<CallPath> {
        let mut visited = Vec::new();
        self.deepest(table, addr, Direction::Callers, &mut visited)
    }

    /// Computes both directions for every function so later queries are
    /// cache hits.
    pub fn precompute(&mut self, table: &SymbolTable) {
        let functions: Vec<Address> = table
            .all_functions()
            .into_iter()
            .map(|s| s.address)
            .collect();
        for addr in functions {
            self.deepest_callee_path(table, addr);
            self.deepest_caller_path(table, addr);
        }
    }

    fn deepest(
        &mut self,
        table: &SymbolTable,
        addr: Address,
        direction: Direction,
        visited: &mut Vec<Address>,
    ) -> Option<CallPath> {
        if visited.contains(&addr) {
            return None;
        }
        if let Some(hit) = self.cache.get(&(addr.as_u64(), direction)) {
            return Some(hit.clone());
        }
        let sym = table.symbol_by_addr(addr)?;
        let own_stack = sym.stack_size.unwrap_or(0);

        visited.push(addr);
        let mut deepest: Option<CallPath> = None;
        for next in direction.neighbors(table, addr) {
            let Some(sub) = self.deepest(table, next, direction, visited) else {
                continue;
            };
            // strictly greater keeps the first-seen branch on ties
            let replaces = deepest
                .as_ref()
                .map(|d| sub.total_stack > d.total_stack)
                .unwrap_or(true);
            if replaces {
                deepest = Some(sub);
            }
        }
        visited.pop();

        let result = match deepest {
            Some(sub) => {
                let mut addresses = Vec::with_capacity(sub.addresses.len() + 1);
                addresses.push(addr);
                addresses.extend(sub.addresses);
                CallPath {
                    total_stack: own_stack + sub.total_stack,
                    addresses,
                }
            }
            None => CallPath {
                total_stack: own_stack,
                addresses: vec![addr],
            },
        };
        self.cache.insert((addr.as_u64(), direction), result.clone());
        Some(result)
    }
}
