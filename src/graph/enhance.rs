// Thu Feb 12 2026 - Alex

use crate::graph::{Arch, CallPatterns};
use crate::symbol::{Address, SymbolTable};
use once_cell::sync::Lazy;
use regex::Regex;

// 8e4:	f000 f824 	bl	930
//
// Disassembly listings produced without symbols leave the call target as a
// bare address; the annotation pass appends the `<name>` the call-graph
// scan expects.
static BARE_CALL_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*[0-9a-f]+:\s+[0-9a-f\s]{9}\s+bl\s+)([0-9a-f]+)\s*$").unwrap()
});

// Calls into any of these pull in the soft-float runtime.
static FLOAT_RUNTIME_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^__aeabi_(f.*|.*2f)|__addsf3$").unwrap());

/// Derives caller/callee edges and per-function flags from the stored
/// disassembly. All derived state is cleared and rebuilt on every run.
pub struct CallGraphEnhancer {
    patterns: CallPatterns,
}

impl CallGraphEnhancer {
    pub fn new(patterns: CallPatterns) -> Self {
        Self { patterns }
    }

    pub fn for_arch(arch: Arch) -> Self {
        Self::new(arch.call_patterns())
    }

    pub fn enhance(&self, table: &mut SymbolTable) {
        let functions: Vec<Address> = table
            .all_functions()
            .into_iter()
            .map(|s| s.address)
            .collect();

        for addr in &functions {
            if let Some(sym) = table.symbol_by_addr_mut(*addr) {
                sym.callers.clear();
                sym.callees.clear();
                sym.called_from_other_file = false;
                sym.performs_indirect_call = false;
            }
        }

        for addr in &functions {
            let lines = match table.symbol_by_addr(*addr) {
                Some(sym) => sym.asm.clone(),
                None => continue,
            };
            for line in &lines {
                self.scan_line(table, *addr, line);
            }
        }

        Self::enhance_float_flags(table);
    }

    /// Recognizes one call instruction and records the edge. Returns false
    /// for lines that are not resolvable calls.
    fn scan_line(&self, table: &mut SymbolTable, caller: Address, line: &str) -> bool {
        if let Some(indirect) = &self.patterns.indirect {
            if indirect.is_match(line) {
                if let Some(sym) = table.symbol_by_addr_mut(caller) {
                    sym.performs_indirect_call = true;
                }
                return false;
            }
        }

        // only annotated targets resolve to symbols
        if !line.contains('<') {
            return false;
        }
        let Some(caps) = self.patterns.call.captures(line) else {
            return false;
        };
        let target = caps["target"].trim();
        // a byte dump column matches the operand pattern but never a
        // single hex word
        if target.chars().any(char::is_whitespace) {
            return false;
        }
        let Some(callee) = Address::from_hex(target) else {
            return false;
        };
        if !table.contains(callee) {
            return false;
        }
        Self::add_function_call(table, caller, callee)
    }

    /// Records a directed edge, keeping callers/callees symmetric. Calls to
    /// self are dropped, duplicates are kept out, and a call whose endpoints
    /// sit in different source files marks the callee as externally called.
    pub fn add_function_call(table: &mut SymbolTable, caller: Address, callee: Address) -> bool {
        if caller == callee {
            return false;
        }

        let caller_file = match table.symbol_by_addr_mut(caller) {
            Some(sym) => {
                if !sym.callees.contains(&callee) {
                    sym.callees.push(callee);
                }
                sym.file
            }
            None => return false,
        };
        match table.symbol_by_addr_mut(callee) {
            Some(sym) => {
                if !sym.callers.contains(&caller) {
                    sym.callers.push(caller);
                }
                if let (Some(from), Some(to)) = (caller_file, sym.file) {
                    if from != to {
                        sym.called_from_other_file = true;
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Annotates bare `bl <address>` operands with the name of the symbol at
    /// that address. Must run before `enhance`, which only considers
    /// annotated lines.
    pub fn enhance_assembly(table: &mut SymbolTable) {
        let addresses = table.addresses();
        for addr in addresses {
            let lines = match table.symbol_by_addr(addr) {
                Some(sym) if !sym.asm.is_empty() => sym.asm.clone(),
                _ => continue,
            };
            let annotated: Vec<String> = lines
                .iter()
                .map(|line| Self::annotate_line(table, line))
                .collect();
            if let Some(sym) = table.symbol_by_addr_mut(addr) {
                sym.asm = annotated;
            }
        }
    }

    fn annotate_line(table: &SymbolTable, line: &str) -> String {
        let Some(caps) = BARE_CALL_TARGET.captures(line) else {
            return line.to_string();
        };
        let Some(target) = Address::from_hex(&caps[2]) else {
            return line.to_string();
        };
        match table.symbol_by_addr(target) {
            Some(sym) => format!("{}{} <{}>", &caps[1], &caps[2], sym.name),
            None => line.to_string(),
        }
    }

    /// A function touches floating point if any of its direct callees is a
    /// soft-float runtime routine.
    fn enhance_float_flags(table: &mut SymbolTable) {
        let float_functions: Vec<Address> = table
            .iter()
            .filter(|s| s.is_function() && FLOAT_RUNTIME_NAME.is_match(&s.name))
            .map(|s| s.address)
            .collect();

        let addresses = table.addresses();
        for addr in addresses {
            let calls_float = table
                .symbol_by_addr(addr)
                .map(|s| s.callees.iter().any(|c| float_functions.contains(c)))
                .unwrap_or(false);
            if let Some(sym) = table.symbol_by_addr_mut(addr) {
                sym.calls_float_function = calls_float;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolKind;

    fn function_with_asm(table: &mut SymbolTable, addr: u64, name: &str, asm: &[&str]) {
        let sym = table.insert_symbol(Address::new(addr), name);
        sym.kind = Some(SymbolKind::Function);
        sym.asm = asm.iter().map(|s| s.to_string()).collect();
    }

    #[test]
    fn test_enhance_builds_symmetric_edges() {
        let mut table = SymbolTable::new();
        function_with_asm(
            &mut table,
            0x8e0,
            "main",
            &[" 8e4:\tf000 f824 \tbl\t930 <app_log>"],
        );
        function_with_asm(&mut table, 0x930, "app_log", &[]);

        CallGraphEnhancer::for_arch(Arch::Arm).enhance(&mut table);

        let main = table.symbol_by_addr(Address::new(0x8e0)).unwrap();
        assert_eq!(main.callees, vec![Address::new(0x930)]);
        let app_log = table.symbol_by_addr(Address::new(0x930)).unwrap();
        assert_eq!(app_log.callers, vec![Address::new(0x8e0)]);
    }

    #[test]
    fn test_enhance_ignores_self_calls_and_duplicates() {
        let mut table = SymbolTable::new();
        function_with_asm(
            &mut table,
            0x8e0,
            "main",
            &[
                " 8e4:\tf000 f824 \tbl\t8e0 <main>",
                " 8e8:\tf000 f824 \tbl\t930 <app_log>",
                " 8ec:\tf000 f824 \tbl\t930 <app_log>",
            ],
        );
        function_with_asm(&mut table, 0x930, "app_log", &[]);

        CallGraphEnhancer::for_arch(Arch::Arm).enhance(&mut table);

        let main = table.symbol_by_addr(Address::new(0x8e0)).unwrap();
        assert_eq!(main.callees, vec![Address::new(0x930)]);
        assert!(main.callers.is_empty());
    }

    #[test]
    fn test_enhance_flags_indirect_calls() {
        let mut table = SymbolTable::new();
        function_with_asm(
            &mut table,
            0x8e0,
            "dispatch",
            &[" 805d83c:\t47b0      \tblx\tr6"],
        );

        CallGraphEnhancer::for_arch(Arch::Arm).enhance(&mut table);

        let dispatch = table.symbol_by_addr(Address::new(0x8e0)).unwrap();
        assert!(dispatch.performs_indirect_call);
        assert!(dispatch.callees.is_empty());
    }

    #[test]
    fn test_byte_dump_lines_are_not_calls() {
        let mut table = SymbolTable::new();
        function_with_asm(
            &mut table,
            0x8e0,
            "table_data",
            &[" 805bbac:\t2471 0805 b64b 0804 b3c9 0804 b459 0804     <odd name>"],
        );
        function_with_asm(&mut table, 0x2471, "unlucky", &[]);

        CallGraphEnhancer::for_arch(Arch::Arm).enhance(&mut table);

        let sym = table.symbol_by_addr(Address::new(0x8e0)).unwrap();
        assert!(sym.callees.is_empty());
    }

    #[test]
    fn test_cross_file_call_marks_callee() {
        let mut table = SymbolTable::new();
        function_with_asm(
            &mut table,
            0x8e0,
            "main",
            &[" 8e4:\tf000 f824 \tbl\t930 <app_log>"],
        );
        function_with_asm(&mut table, 0x930, "app_log", &[]);
        table.symbol_by_addr_mut(Address::new(0x8e0)).unwrap().file =
            Some(crate::hierarchy::FileId(0));
        table.symbol_by_addr_mut(Address::new(0x930)).unwrap().file =
            Some(crate::hierarchy::FileId(1));

        CallGraphEnhancer::for_arch(Arch::Arm).enhance(&mut table);

        assert!(
            table
                .symbol_by_addr(Address::new(0x930))
                .unwrap()
                .called_from_other_file
        );
        assert!(
            !table
                .symbol_by_addr(Address::new(0x8e0))
                .unwrap()
                .called_from_other_file
        );
    }

    #[test]
    fn test_enhance_assembly_annotates_bare_targets() {
        let mut table = SymbolTable::new();
        function_with_asm(
            &mut table,
            0x8e0,
            "main",
            &[" 8e4:\tf000 f824 \tbl\t930"],
        );
        function_with_asm(&mut table, 0x930, "app_log", &[]);

        CallGraphEnhancer::enhance_assembly(&mut table);

        let main = table.symbol_by_addr(Address::new(0x8e0)).unwrap();
        assert_eq!(main.asm[0], " 8e4:\tf000 f824 \tbl\t930 <app_log>");
    }

    #[test]
    fn test_float_runtime_callee_sets_flag() {
        let mut table = SymbolTable::new();
        function_with_asm(
            &mut table,
            0x8e0,
            "scale",
            &[" 8e4:\tf000 f824 \tbl\t930 <__aeabi_fmul>"],
        );
        function_with_asm(&mut table, 0x930, "__aeabi_fmul", &[]);

        CallGraphEnhancer::for_arch(Arch::Arm).enhance(&mut table);

        assert!(table.symbol_by_addr(Address::new(0x8e0)).unwrap().calls_float_function);
        assert!(!table.symbol_by_addr(Address::new(0x930)).unwrap().calls_float_function);
    }
}
