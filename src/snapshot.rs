// Mon Feb 16 2026 - Alex

use crate::symbol::{Symbol, SymbolTable};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Bump when the persisted symbol layout changes shape.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parsed symbols persisted as JSON, in discovery order. Only the parsed
/// attributes are stored; call-graph edges, sibling links and file
/// references are derived state and are rebuilt after a restore.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    /// Toolchain prefix the symbols came from, so a restore can pick the
    /// matching instruction patterns.
    #[serde(default)]
    pub toolchain: Option<String>,
    pub symbols: Vec<Symbol>,
}

impl Snapshot {
    pub fn capture(table: &SymbolTable) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            toolchain: None,
            symbols: table.iter().cloned().collect(),
        }
    }

    pub fn with_toolchain(mut self, toolchain: impl Into<String>) -> Self {
        self.toolchain = Some(toolchain.into());
        self
    }

    pub fn restore(self) -> SymbolTable {
        let mut table = SymbolTable::new();
        for sym in self.symbols {
            let slot = table.insert_symbol(sym.address, &sym.name);
            *slot = sym;
        }
        table
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}
