// Tue Feb 10 2026 - Alex

use crate::cpp::display_names_match;
use crate::symbol::{Address, SymbolTable};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use walkdir::WalkDir;

// puncover.c:8:43:dynamic_stack2	16	dynamic
// puncover.c:14:40:0	16	dynamic,bounded
// Print.cpp:34:8:virtual size_t Print::write(const uint8_t*, size_t)	24	static
//
// Field separators vary between toolchain versions (tabs vs. runs of
// spaces), and the signature itself may contain spaces, so the byte count
// and qualifiers are anchored to the end of the line.
static STACK_USAGE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?\.(?:c|cc|cpp|cxx|h|hpp)):(\d+):(\d+):(.+?)[ \t]+(\d+)[ \t]+([a-z,]+)[ \t]*$")
        .unwrap()
});

/// Attaches `-fstack-usage` report entries to already-parsed symbols.
pub struct StackUsageParser;

impl StackUsageParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_line(&self, table: &mut SymbolTable, line: &str) -> bool {
        let Some(caps) = STACK_USAGE_LINE.captures(line) else {
            return false;
        };

        let base_file = Path::new(&caps[1])
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| caps[1].to_string());
        let line_no: u32 = match caps[2].parse() {
            Ok(n) => n,
            Err(_) => return false,
        };
        let signature = caps[4].to_string();
        let stack_size: u64 = match caps[5].parse() {
            Ok(n) => n,
            Err(_) => return false,
        };
        let qualifiers: Vec<String> = caps[6].split(',').map(str::to_string).collect();

        self.attach(table, &base_file, line_no, &signature, stack_size, qualifiers)
    }

    /// Attribution: the first symbol in the reported file whose line number
    /// matches exactly wins; failing that, the first whose display name is
    /// structurally equivalent to the reported signature. The fallback exists
    /// because gcc's stack-usage line attribution and the linker's can
    /// disagree by one line for constructors and virtual methods.
    fn attach(
        &self,
        table: &mut SymbolTable,
        base_file: &str,
        line_no: u32,
        signature: &str,
        stack_size: u64,
        qualifiers: Vec<String>,
    ) -> bool {
        let mut fallback = None;
        for sym in table.iter() {
            if sym.base_file.as_deref() != Some(base_file) {
                continue;
            }
            if sym.line == Some(line_no) {
                fallback = Some(sym.address);
                break;
            }
            if fallback.is_none() {
                let name_matches = sym
                    .display_name
                    .as_deref()
                    .is_some_and(|d| display_names_match(d, signature));
                if name_matches {
                    fallback = Some(sym.address);
                }
            }
        }

        match fallback.and_then(|addr| table.symbol_by_addr_mut(addr)) {
            Some(sym) => {
                sym.stack_size = Some(stack_size);
                sym.stack_qualifiers = qualifiers;
                true
            }
            None => {
                log::warn!(
                    "no symbol found for stack usage entry {}:{}:{}",
                    base_file,
                    line_no,
                    signature
                );
                false
            }
        }
    }

    /// Walks `su_dir` recursively, feeding every line of every `*.su` file
    /// through the line parser. Returns the number of attributed entries.
    /// Stack usage data is optional by design; unreadable files are skipped
    /// with a warning.
    pub fn parse_su_dir(&self, table: &mut SymbolTable, su_dir: &Path) -> usize {
        let mut attached = 0;
        for entry in WalkDir::new(su_dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|e| e.to_str()) != Some("su") {
                continue;
            }
            match std::fs::read_to_string(entry.path()) {
                Ok(text) => {
                    for line in text.lines() {
                        if self.parse_line(table, line) {
                            attached += 1;
                        }
                    }
                }
                Err(err) => {
                    log::warn!("skipping unreadable {}: {}", entry.path().display(), err);
                }
            }
        }
        attached
    }
}

impl Default for StackUsageParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol_in_file(table: &mut SymbolTable, addr: u64, name: &str, base_file: &str, line: u32) {
        let sym = table.insert_symbol(Address::new(addr), name);
        sym.base_file = Some(base_file.to_string());
        sym.line = Some(line);
    }

    #[test]
    fn test_stack_usage_line_with_numeric_symbol_field() {
        let mut table = SymbolTable::new();
        symbol_in_file(&mut table, 0x123, "dynamic_stack", "puncover.c", 14);

        let parser = StackUsageParser::new();
        assert!(parser.parse_line(&mut table, "puncover.c:14:40:0\t16\tdynamic,bounded"));

        let sym = table.symbol_by_addr(Address::new(0x123)).unwrap();
        assert_eq!(sym.stack_size, Some(16));
        assert_eq!(sym.stack_qualifiers, vec!["dynamic", "bounded"]);
    }

    #[test]
    fn test_stack_usage_line_plain() {
        let mut table = SymbolTable::new();
        symbol_in_file(&mut table, 0x123, "dynamic_stack2", "puncover.c", 8);
        assert!(StackUsageParser::new()
            .parse_line(&mut table, "puncover.c:8:43:dynamic_stack2\t16\tdynamic"));
    }

    #[test]
    fn test_stack_usage_line_header_file() {
        let mut table = SymbolTable::new();
        symbol_in_file(&mut table, 0x123, "updateDisplayClip", "ILI9341_t3.h", 312);
        assert!(StackUsageParser::new().parse_line(
            &mut table,
            "ILI9341_t3.h:312:15:void ILI9341_t3::updateDisplayClip()\t16\tstatic"
        ));
    }

    #[test]
    fn test_stack_usage_line_cpp_correct_line() {
        let mut table = SymbolTable::new();
        symbol_in_file(&mut table, 0x123, "write", "Print.cpp", 34);

        let line = "Print.cpp:34:8:virtual size_t Print::write(const uint8_t*, size_t)\t24\tstatic";
        assert!(StackUsageParser::new().parse_line(&mut table, line));

        let sym = table.symbol_by_addr(Address::new(0x123)).unwrap();
        assert_eq!(sym.stack_size, Some(24));
        assert_eq!(sym.stack_qualifiers, vec!["static"]);
    }

    #[test]
    fn test_stack_usage_line_cpp_incorrect_line_falls_back_to_display_name() {
        let mut table = SymbolTable::new();
        symbol_in_file(&mut table, 0x123, "_ZN5Print5writeEPKhj", "Print.cpp", 35);
        table.symbol_by_addr_mut(Address::new(0x123)).unwrap().display_name =
            Some("virtual size_t Print::write(const uint8_t*, size_t)".to_string());

        let line = "Print.cpp:34:8:virtual size_t Print::write(const uint8_t*, size_t)\t24\tstatic";
        assert!(StackUsageParser::new().parse_line(&mut table, line));

        let sym = table.symbol_by_addr(Address::new(0x123)).unwrap();
        assert_eq!(sym.stack_size, Some(24));
    }

    #[test]
    fn test_stack_usage_line_cpp_constructor() {
        let mut table = SymbolTable::new();
        symbol_in_file(&mut table, 0x123, "String", "WString.cpp", 82);
        assert!(StackUsageParser::new().parse_line(
            &mut table,
            "WString.cpp:82:1:String::String(unsigned int, unsigned char)\t32\tstatic"
        ));
    }

    #[test]
    fn test_space_delimited_variant() {
        let mut table = SymbolTable::new();
        symbol_in_file(&mut table, 0x123, "dynamic_stack2", "puncover.c", 8);
        assert!(StackUsageParser::new()
            .parse_line(&mut table, "puncover.c:8:43:dynamic_stack2   16   dynamic"));
    }

    #[test]
    fn test_unattributable_line_is_tolerated() {
        let mut table = SymbolTable::new();
        symbol_in_file(&mut table, 0x123, "other", "other.c", 1);
        assert!(!StackUsageParser::new()
            .parse_line(&mut table, "puncover.c:8:43:dynamic_stack2\t16\tdynamic"));
    }

    #[test]
    fn test_malformed_line_is_rejected() {
        let mut table = SymbolTable::new();
        assert!(!StackUsageParser::new().parse_line(&mut table, "not a stack usage line"));
    }
}
