// Tue Feb 10 2026 - Alex

pub mod builder;
pub mod config;
pub mod cpp;
pub mod graph;
pub mod hierarchy;
pub mod parse;
pub mod snapshot;
pub mod symbol;
pub mod toolchain;

pub use builder::{BuildError, Builder};
pub use config::BuildConfig;
pub use graph::{Arch, CallGraphEnhancer, CallPath, DeepestPaths, Direction};
pub use hierarchy::{FileId, FileTree, FolderId};
pub use snapshot::{Snapshot, SnapshotError, SNAPSHOT_VERSION};
pub use symbol::{Address, Symbol, SymbolKind, SymbolTable};
pub use toolchain::{Demangler, Toolchain, ToolchainError};
