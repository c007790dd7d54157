// Mon Feb 16 2026 - Alex

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a build needs to know: where the ELF is, which toolchain
/// produced it, and where the optional inputs live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Common prefix of the binutils tools, e.g. `/opt/bin/arm-none-eabi-`.
    pub toolchain_base: String,
    pub elf_file: PathBuf,
    /// Root of the `-fstack-usage` output files. No stack sizes without it.
    pub su_dir: Option<PathBuf>,
    /// Prefix stripped from the source paths recorded in the debug info.
    pub src_root: Option<PathBuf>,
}

impl BuildConfig {
    pub fn new(toolchain_base: impl Into<String>, elf_file: impl Into<PathBuf>) -> Self {
        Self {
            toolchain_base: toolchain_base.into(),
            elf_file: elf_file.into(),
            su_dir: None,
            src_root: None,
        }
    }

    pub fn with_su_dir(mut self, su_dir: impl Into<PathBuf>) -> Self {
        self.su_dir = Some(su_dir.into());
        self
    }

    pub fn with_src_root(mut self, src_root: impl Into<PathBuf>) -> Self {
        self.src_root = Some(src_root.into());
        self
    }

    /// The configured source root, defaulting to two levels above the ELF
    /// (typical `project/build/firmware.elf` layouts resolve to `project`).
    pub fn effective_src_root(&self) -> Option<PathBuf> {
        self.src_root.clone().or_else(|| {
            self.elf_file
                .parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_src_root_defaults_to_grandparent_of_elf() {
        let config = BuildConfig::new("arm-none-eabi-", "/work/project/build/app.elf");
        assert_eq!(config.effective_src_root(), Some(PathBuf::from("/work/project")));
    }

    #[test]
    fn test_explicit_src_root_wins() {
        let config = BuildConfig::new("arm-none-eabi-", "/work/project/build/app.elf")
            .with_src_root("/work/src");
        assert_eq!(config.effective_src_root(), Some(PathBuf::from("/work/src")));
    }
}
