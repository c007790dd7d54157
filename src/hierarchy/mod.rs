// Thu Feb 12 2026 - Alex

pub mod path_norm;
pub mod tree;

pub use path_norm::{normalize_path, normalize_symbol_paths, strip_source_root};
pub use tree::{FileId, FileNode, FileTree, FolderId, FolderNode};
