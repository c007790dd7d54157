// Tue Feb 10 2026 - Alex

use crate::symbol::{Address, SymbolKind, SymbolTable};
use once_cell::sync::Lazy;
use regex::Regex;

// 00000098 <pbl_table_addr>:
// 00000098 <pbl_table_addr.constprop.0>:
static FUNCTION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9a-f]{8})\s+<(\.?\w+)(\..*)?>:").unwrap());

// /Users/behrens/projects/puncover/build/../src/puncover.c:8
static SOURCE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(/[^:]+)(:(\d+))?").unwrap());

// 88a:	ebad 0d03 	sub.w	sp, sp, r3
static BYTE_DUMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[0-9a-f]+:\s+([0-9a-f\s]{9})").unwrap());

/// Line-oriented state machine over `objdump -dslw` style output. A
/// function-start line opens a block; everything up to the next start line
/// is the function body, except source references (captured once per block)
/// and blank lines.
pub struct DisassemblyParser;

impl DisassemblyParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a full disassembly text, returning the number of function
    /// symbols flushed into the table.
    pub fn parse(&self, table: &mut SymbolTable, text: &str) -> usize {
        let mut current: Option<OpenBlock> = None;
        let mut found = 0;

        for line in text.lines() {
            if let Some(caps) = FUNCTION_START.captures(line) {
                if let Some(block) = current.take() {
                    found += block.flush(table);
                }
                // compiler-generated disambiguators like `.constprop.0`
                // are stripped; group 2 is the plain name
                current = Address::from_hex(&caps[1]).map(|addr| OpenBlock {
                    address: addr,
                    name: caps[2].to_string(),
                    path: None,
                    line: None,
                    body: Vec::new(),
                });
                continue;
            }

            let Some(block) = current.as_mut() else {
                continue;
            };
            if let Some(caps) = SOURCE_REF.captures(line) {
                if block.path.is_none() {
                    block.path = Some(caps[1].to_string());
                    block.line = caps.get(3).and_then(|m| m.as_str().parse::<u32>().ok());
                }
            } else if !line.trim().is_empty() {
                block.body.push(line.to_string());
            }
        }

        if let Some(block) = current.take() {
            found += block.flush(table);
        }
        found
    }
}

impl Default for DisassemblyParser {
    fn default() -> Self {
        Self::new()
    }
}

struct OpenBlock {
    address: Address,
    name: String,
    path: Option<String>,
    line: Option<u32>,
    body: Vec<String>,
}

impl OpenBlock {
    fn flush(self, table: &mut SymbolTable) -> usize {
        let sym = table.insert_symbol(self.address, &self.name);
        if let Some(path) = &self.path {
            sym.set_location(path, self.line);
        }
        if !self.body.is_empty() {
            sym.asm = left_strip_from_list(self.body);
            sym.kind = Some(SymbolKind::Function);
        }
        1
    }
}

/// Strips the longest common leading-whitespace prefix from a block of lines.
pub fn left_strip_from_list(lines: Vec<String>) -> Vec<String> {
    let Some(first) = lines.first() else {
        return lines;
    };

    let mut prefix: String = first.chars().take_while(|c| c.is_whitespace()).collect();
    for line in &lines {
        while !line.starts_with(prefix.as_str()) {
            prefix.pop();
        }
    }

    lines
        .into_iter()
        .map(|line| line[prefix.len()..].to_string())
        .collect()
}

/// Number of opcode bytes encoded in one disassembly line's byte-dump column.
pub fn count_assembly_code_bytes(line: &str) -> u64 {
    match BYTE_DUMP.captures(line) {
        Some(caps) => caps[1].chars().filter(|c| c.is_ascii_hexdigit()).count() as u64 / 2,
        None => 0,
    }
}

/// Recomputes each function's size as the byte count of its disassembly,
/// which is more reliable than the symbol table for stripped-down builds.
pub fn enhance_function_sizes(table: &mut SymbolTable) {
    for sym in table.iter_mut() {
        if !sym.asm.is_empty() {
            sym.size = Some(sym.asm.iter().map(|l| count_assembly_code_bytes(l)).sum());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_strip_from_list() {
        let lines = vec!["  a".to_string(), "   b".to_string()];
        assert_eq!(left_strip_from_list(lines), vec!["a", " b"]);
    }

    #[test]
    fn test_parses_assembly() {
        let assembly = "\n\
00000098 <pbl_table_addr>:\n\
pbl_table_addr():\n\
  98:\ta8a8a8a8 \t.word\t0xa8a8a8a8\n\
\n\
0000009c <__aeabi_dmul>:\n\
__aeabi_dmul():\n\
  9c:\tb570      \tpush\t{r4, r5, r6, lr}\n";
        let mut table = SymbolTable::new();
        assert_eq!(2, DisassemblyParser::new().parse(&mut table, assembly));

        let dmul = table.symbol_by_addr(Address::new(0x9c)).unwrap();
        assert_eq!(dmul.name, "__aeabi_dmul");
        assert_eq!(dmul.kind, Some(SymbolKind::Function));
        let table_addr = table.symbol_by_addr(Address::new(0x98)).unwrap();
        assert_eq!(table_addr.name, "pbl_table_addr");
    }

    #[test]
    fn test_parses_assembly_strips_constprop_suffix() {
        let assembly = "\
000008a8 <uses_doubles2.constprop.0>:\n\
uses_doubles2():\n\
/Users/behrens/projects/puncover/build/../src/puncover.c:19\n\
\x208a8:\tb508      \tpush\t{r3, lr}\n";
        let mut table = SymbolTable::new();
        assert_eq!(1, DisassemblyParser::new().parse(&mut table, assembly));

        let sym = table.symbol_by_addr(Address::new(0x8a8)).unwrap();
        assert_eq!(sym.name, "uses_doubles2");
        assert_eq!(
            sym.path.as_deref(),
            Some("/Users/behrens/projects/puncover/build/../src/puncover.c")
        );
        assert_eq!(sym.base_file.as_deref(), Some("puncover.c"));
        assert_eq!(sym.line, Some(19));
        // the source reference is not part of the stored body
        assert_eq!(sym.asm, vec!["uses_doubles2():", " 8a8:\tb508      \tpush\t{r3, lr}"]);
    }

    #[test]
    fn test_parses_assembly_and_ignores_prologue_text() {
        let assembly = "\
firmware.elf:     file format elf32-littlearm\n\
\n\
Disassembly of section .text:\n\
\n\
00000930 <app_log>:\n\
$t():\n";
        let mut table = SymbolTable::new();
        assert_eq!(1, DisassemblyParser::new().parse(&mut table, assembly));
        assert!(table.contains(Address::new(0x930)));
    }

    #[test]
    fn test_count_bytes() {
        assert_eq!(0, count_assembly_code_bytes("dynamic_stack2():"));
        assert_eq!(2, count_assembly_code_bytes(" 88e:\t4668      \tmov\tr0, sp"));
        assert_eq!(4, count_assembly_code_bytes(" 88a:\tebad 0d03 \tsub.w\tsp, sp, r3"));
        assert_eq!(4, count_assembly_code_bytes("878:\t000001ba \t.word\t0x000001ba"));
    }

    #[test]
    fn test_enhance_function_size_from_assembly() {
        let mut table = SymbolTable::new();
        let sym = table.insert_symbol(Address::new(0x9c), "flip_sign");
        sym.kind = Some(SymbolKind::Function);
        sym.asm = vec![
            "$t():".to_string(),
            "  9c:\tf081 4100 \teor.w\tr1, r1, #2147483648\t; 0x80000000".to_string(),
            "  a0:\te002      \tb.n\ta8 <__adddf3>".to_string(),
            "  a2:\tbf00      \tnop".to_string(),
        ];

        enhance_function_sizes(&mut table);
        assert_eq!(table.symbol_by_addr(Address::new(0x9c)).unwrap().size, Some(8));
    }
}
