// Mon Feb 16 2026 - Alex

use crate::config::BuildConfig;
use crate::graph::{CallGraphEnhancer, CallPath, DeepestPaths};
use crate::hierarchy::{normalize_symbol_paths, FileTree};
use crate::parse::{enhance_function_sizes, DisassemblyParser, SizeReportParser, StackUsageParser};
use crate::snapshot::{Snapshot, SnapshotError};
use crate::symbol::{Address, SymbolTable};
use crate::toolchain::{apply_display_names, Demangler, Toolchain, ToolchainError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Owns one analysis run end to end: invokes the binutils tools, feeds the
/// parsers, runs the enrichment passes in order and pre-computes the call
/// trees. Tracks input mtimes so unchanged inputs skip the rebuild.
pub struct Builder {
    config: BuildConfig,
    toolchain: Toolchain,
    table: SymbolTable,
    tree: FileTree,
    call_paths: DeepestPaths,
    file_times: HashMap<PathBuf, Option<SystemTime>>,
}

impl Builder {
    pub fn new(config: BuildConfig) -> Self {
        let toolchain = Toolchain::new(config.toolchain_base.clone());
        let mut file_times = HashMap::new();
        file_times.insert(config.elf_file.clone(), None);
        Self {
            config,
            toolchain,
            table: SymbolTable::new(),
            tree: FileTree::new(),
            call_paths: DeepestPaths::new(),
            file_times,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.table
    }

    pub fn file_tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// True when any tracked input changed since the last build, or nothing
    /// was built yet. An unreadable input counts as changed and lets the
    /// build report the real error.
    pub fn needs_build(&self) -> bool {
        self.file_times.iter().any(|(path, stored)| {
            match (file_mtime(path), stored) {
                (Some(current), Some(recorded)) => current > *recorded,
                _ => true,
            }
        })
    }

    /// Runs a build when the inputs changed. Returns whether one ran.
    pub fn build_if_needed(&mut self) -> Result<bool, BuildError> {
        if !self.needs_build() {
            return Ok(false);
        }
        self.build()?;
        Ok(true)
    }

    /// Full pipeline: disassembly and size report in, enriched symbol table
    /// and pre-computed call trees out.
    pub fn build(&mut self) -> Result<(), BuildError> {
        let tracked: Vec<PathBuf> = self.file_times.keys().cloned().collect();
        for path in tracked {
            let mtime = file_mtime(&path);
            self.file_times.insert(path, mtime);
        }

        log::info!("parsing ELF at {}", self.config.elf_file.display());
        let assembly = self.toolchain.assembly_lines(&self.config.elf_file)?;
        let size_report = self.toolchain.size_lines(&self.config.elf_file)?;

        self.table.reset();
        DisassemblyParser::new().parse(&mut self.table, &assembly.join("\n"));
        let size_parser = SizeReportParser::new();
        for line in &size_report {
            size_parser.parse_line(&mut self.table, line);
        }

        let toolchain = self.toolchain.clone();
        self.enhance(&toolchain)?;

        if let Some(su_dir) = self.config.su_dir.clone() {
            log::info!("parsing stack usage reports under {}", su_dir.display());
            StackUsageParser::new().parse_su_dir(&mut self.table, &su_dir);
        }

        self.build_call_trees();
        Ok(())
    }

    /// Same pipeline on already-captured tool output, for builds where the
    /// toolchain is not around (tests, snapshot tooling).
    pub fn build_from_text(
        &mut self,
        assembly: &str,
        size_report: &str,
        demangler: &dyn Demangler,
    ) -> Result<(), BuildError> {
        self.table.reset();
        DisassemblyParser::new().parse(&mut self.table, assembly);
        let size_parser = SizeReportParser::new();
        for line in size_report.lines() {
            size_parser.parse_line(&mut self.table, line);
        }
        self.enhance(demangler)?;
        self.build_call_trees();
        Ok(())
    }

    // Pass order matters: paths must be normalized before folders derive
    // from them, assembly must be annotated before the call scan reads it,
    // and the file/folder float flags read the per-symbol flags the call
    // scan sets.
    fn enhance(&mut self, demangler: &dyn Demangler) -> Result<(), ToolchainError> {
        let src_root = self.config.effective_src_root();
        normalize_symbol_paths(&mut self.table, src_root.as_deref().and_then(Path::to_str));
        log::debug!("enhancing function sizes");
        enhance_function_sizes(&mut self.table);
        log::debug!("deriving folders");
        self.tree.derive(&mut self.table);
        self.tree.aggregate(&self.table);
        log::debug!("annotating assembly");
        CallGraphEnhancer::enhance_assembly(&mut self.table);
        log::debug!("building call graph");
        let enhancer = CallGraphEnhancer::for_arch(self.toolchain.arch());
        enhancer.enhance(&mut self.table);
        self.table.enhance_sibling_symbols();
        self.tree.aggregate_float_flags(&self.table);
        log::debug!("demangling symbol names");
        apply_display_names(&mut self.table, demangler)?;
        self.table.build_name_index();
        Ok(())
    }

    /// Re-runs both deepest-path directions for every function so later
    /// queries are cache hits.
    pub fn build_call_trees(&mut self) {
        self.call_paths.reset();
        self.call_paths.precompute(&self.table);
    }

    pub fn deepest_callee_tree(&mut self, addr: Address) -> Option<CallPath> {
        self.call_paths.deepest_callee_path(&self.table, addr)
    }

    pub fn deepest_caller_tree(&mut self, addr: Address) -> Option<CallPath> {
        self.call_paths.deepest_caller_path(&self.table, addr)
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        Snapshot::capture(&self.table)
            .with_toolchain(self.config.toolchain_base.clone())
            .save(path)
    }

    /// Replaces the symbol table with a persisted one and rebuilds all
    /// derived state. Display names come from the snapshot, so no toolchain
    /// is needed.
    pub fn restore_snapshot(&mut self, snapshot: Snapshot) {
        let arch = snapshot
            .toolchain
            .as_deref()
            .map(crate::graph::Arch::from_toolchain_name)
            .unwrap_or_else(|| self.toolchain.arch());
        self.table = snapshot.restore();
        self.tree.derive(&mut self.table);
        self.tree.aggregate(&self.table);
        let enhancer = CallGraphEnhancer::for_arch(arch);
        enhancer.enhance(&mut self.table);
        self.table.enhance_sibling_symbols();
        self.tree.aggregate_float_flags(&self.table);
        self.table.build_name_index();
        self.build_call_trees();
    }

    pub fn load_snapshot(&mut self, path: &Path) -> Result<(), BuildError> {
        let snapshot = Snapshot::load(path)?;
        self.restore_snapshot(snapshot);
        Ok(())
    }
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
