// Tue Feb 10 2026 - Alex

use crate::symbol::{Address, SymbolKind, SymbolTable};
use once_cell::sync::Lazy;
use regex::Regex;

// 00000550 00000034 T main	/Users/behrens/projects/puncover/build/../src/puncover.c:25
static SIZE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9a-f]{8})\s+([0-9a-f]{8})\s+(.)\s+(\w+)(\s+([^:]+):(\d+))?").unwrap()
});

/// Parses one `nm -Sl` style line into a symbol-table mutation. Lines that
/// do not carry the full address/size/type/name shape (external symbols,
/// section headers) are expected and rejected with `false`.
pub struct SizeReportParser;

impl SizeReportParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_line(&self, table: &mut SymbolTable, line: &str) -> bool {
        let Some(caps) = SIZE_LINE.captures(line) else {
            return false;
        };

        let address = match Address::from_hex(&caps[1]) {
            Some(addr) => addr,
            None => return false,
        };
        let size = match u64::from_str_radix(&caps[2], 16) {
            Ok(size) => size,
            Err(_) => return false,
        };
        let kind = symbol_kind_for_type_char(caps[3].chars().next().unwrap_or(' '));
        let name = caps[4].to_string();
        let location = caps.get(6).map(|path| {
            let line_no = caps.get(7).and_then(|m| m.as_str().parse::<u32>().ok());
            (path.as_str().to_string(), line_no)
        });

        let sym = table.insert_symbol(address, &name);
        sym.size = Some(size);
        if kind.is_some() {
            sym.kind = kind;
        }
        if let Some((path, line_no)) = location {
            sym.set_location(&path, line_no);
        }
        true
    }

    pub fn parse(&self, table: &mut SymbolTable, text: &str) -> usize {
        text.lines()
            .filter(|line| self.parse_line(table, line))
            .count()
    }
}

impl Default for SizeReportParser {
    fn default() -> Self {
        Self::new()
    }
}

fn symbol_kind_for_type_char(c: char) -> Option<SymbolKind> {
    match c.to_ascii_uppercase() {
        'T' | 'A' => Some(SymbolKind::Function),
        'D' | 'B' | 'R' => Some(SymbolKind::Variable),
        _ => None,
    }
}
