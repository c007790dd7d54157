// Mon Feb 16 2026 - Alex

use crate::graph::Arch;
use crate::symbol::SymbolTable;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Very long symbol lists can exceed the platform command line limit, so
/// c++filt is invoked in chunks.
pub const DEMANGLE_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("could not find {0}")]
    MissingTool(PathBuf),
    #[error("{tool} failed: {source}")]
    ToolFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// A GNU binutils installation addressed by its common tool prefix, e.g.
/// `/opt/gcc/bin/arm-none-eabi-`. A directory is accepted too and treated
/// as a prefix with no tool name part.
#[derive(Debug, Clone)]
pub struct Toolchain {
    base: String,
}

impl Toolchain {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        if Path::new(&base).is_dir() && !base.ends_with(std::path::MAIN_SEPARATOR) {
            base.push(std::path::MAIN_SEPARATOR);
        }
        Self { base }
    }

    pub fn arch(&self) -> Arch {
        Arch::from_toolchain_name(&self.base)
    }

    /// Absolute path of one tool of this toolchain. A missing tool is fatal:
    /// without binutils there is nothing to analyze.
    pub fn tool_path(&self, name: &str) -> Result<PathBuf, ToolchainError> {
        let mut path = format!("{}{}", self.base, name);
        if cfg!(windows) {
            path.push_str(".exe");
        }
        let path = PathBuf::from(path);
        if !path.is_file() {
            return Err(ToolchainError::MissingTool(path));
        }
        Ok(path)
    }

    fn tool_lines(
        &self,
        name: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<Vec<String>, ToolchainError> {
        let path = self.tool_path(name)?;
        let mut command = Command::new(&path);
        command.args(args);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        let output = command.output().map_err(|source| ToolchainError::ToolFailed {
            tool: name.to_string(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim_end().to_string())
            .collect())
    }

    /// `objdump -dslw`: disassembly with interleaved source locations, one
    /// instruction per line.
    pub fn assembly_lines(&self, elf_file: &Path) -> Result<Vec<String>, ToolchainError> {
        let name = elf_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| elf_file.to_string_lossy().into_owned());
        self.tool_lines("objdump", &["-dslw", &name], elf_file.parent())
    }

    /// `nm -Sl`: symbol sizes and source locations.
    pub fn size_lines(&self, elf_file: &Path) -> Result<Vec<String>, ToolchainError> {
        let name = elf_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| elf_file.to_string_lossy().into_owned());
        self.tool_lines("nm", &["-Sl", &name], elf_file.parent())
    }
}

/// Turns mangled linker names into human-readable ones. Names that are not
/// mangled must come back unchanged, one output per input, in order.
pub trait Demangler {
    fn demangle(&self, names: &[String]) -> Result<Vec<String>, ToolchainError>;
}

impl Demangler for Toolchain {
    fn demangle(&self, names: &[String]) -> Result<Vec<String>, ToolchainError> {
        let mut out = Vec::with_capacity(names.len());
        for chunk in names.chunks(DEMANGLE_CHUNK_SIZE) {
            let args: Vec<&str> = chunk.iter().map(String::as_str).collect();
            out.extend(self.tool_lines("c++filt", &args, None)?);
        }
        Ok(out)
    }
}

/// Fills in every symbol's display name from its raw name.
pub fn apply_display_names(
    table: &mut SymbolTable,
    demangler: &dyn Demangler,
) -> Result<(), ToolchainError> {
    let names: Vec<String> = table.iter().map(|s| s.name.clone()).collect();
    let demangled = demangler.demangle(&names)?;
    if demangled.len() != names.len() {
        log::warn!(
            "demangler returned {} names for {} symbols, skipping display names",
            demangled.len(),
            names.len()
        );
        return Ok(());
    }
    for (sym, display_name) in table.iter_mut().zip(demangled) {
        sym.display_name = Some(display_name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Address;

    struct FakeDemangler;

    impl Demangler for FakeDemangler {
        fn demangle(&self, names: &[String]) -> Result<Vec<String>, ToolchainError> {
            Ok(names
                .iter()
                .map(|n| {
                    if n == "_ZN5Print5writeEPKhj" {
                        "Print::write(unsigned char const*, unsigned int)".to_string()
                    } else {
                        n.clone()
                    }
                })
                .collect())
        }
    }

    #[test]
    fn test_missing_tool_is_an_error() {
        let toolchain = Toolchain::new("/nonexistent/arm-none-eabi-");
        assert!(matches!(
            toolchain.tool_path("objdump"),
            Err(ToolchainError::MissingTool(_))
        ));
    }

    #[test]
    fn test_arch_detection() {
        assert_eq!(Toolchain::new("/opt/arm-none-eabi-").arch(), Arch::Arm);
        assert_eq!(Toolchain::new("/opt/riscv32-unknown-elf-").arch(), Arch::RiscV);
    }

    #[test]
    fn test_apply_display_names() {
        let mut table = SymbolTable::new();
        table.insert_symbol(Address::new(0x100), "_ZN5Print5writeEPKhj");
        table.insert_symbol(Address::new(0x200), "main");

        apply_display_names(&mut table, &FakeDemangler).unwrap();

        assert_eq!(
            table
                .symbol_by_addr(Address::new(0x100))
                .unwrap()
                .display_name
                .as_deref(),
            Some("Print::write(unsigned char const*, unsigned int)")
        );
        assert_eq!(
            table
                .symbol_by_addr(Address::new(0x200))
                .unwrap()
                .display_name
                .as_deref(),
            Some("main")
        );
    }
}
