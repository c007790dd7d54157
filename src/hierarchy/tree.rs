// Thu Feb 12 2026 - Alex

use crate::hierarchy::normalize_path;
use crate::symbol::{Address, SymbolTable};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeRef {
    File(FileId),
    Folder(FolderId),
}

#[derive(Debug, Clone)]
pub struct FileNode {
    pub path: String,
    pub name: String,
    pub folder: Option<FolderId>,
    pub symbols: Vec<Address>,
    pub functions: Vec<Address>,
    pub variables: Vec<Address>,
    pub calls_float_function: bool,
}

#[derive(Debug, Clone)]
pub struct FolderNode {
    pub path: String,
    pub name: String,
    pub folder: Option<FolderId>,
    pub files: Vec<FileId>,
    pub sub_folders: Vec<FolderId>,
    /// Display name with empty intermediate directories folded in, e.g.
    /// `middleware/drivers` for a `middleware` folder holding nothing but
    /// `drivers`.
    pub collapsed_name: String,
    pub collapsed_sub_folders: Vec<FolderId>,
    pub root: Option<FolderId>,
    pub calls_float_function: bool,
}

/// Source-file hierarchy reconstructed from the paths in the debug info.
///
/// Files and folders reference each other in both directions, so nodes live
/// in flat arenas and link by id. Ids stay valid until the next `derive`.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    files: Vec<FileNode>,
    folders: Vec<FolderNode>,
    by_path: HashMap<String, NodeRef>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.files.clear();
        self.folders.clear();
        self.by_path.clear();
    }

    pub fn file(&self, id: FileId) -> &FileNode {
        &self.files[id.0]
    }

    pub fn folder(&self, id: FolderId) -> &FolderNode {
        &self.folders[id.0]
    }

    pub fn all_files(&self) -> impl Iterator<Item = (FileId, &FileNode)> {
        self.files.iter().enumerate().map(|(i, f)| (FileId(i), f))
    }

    pub fn all_folders(&self) -> impl Iterator<Item = (FolderId, &FolderNode)> {
        self.folders.iter().enumerate().map(|(i, f)| (FolderId(i), f))
    }

    pub fn file_by_path(&self, path: &str) -> Option<FileId> {
        match self.by_path.get(path) {
            Some(NodeRef::File(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn folder_by_path(&self, path: &str) -> Option<FolderId> {
        match self.by_path.get(path) {
            Some(NodeRef::Folder(id)) => Some(*id),
            _ => None,
        }
    }

    /// Finds or creates the file node at `path`, creating parent folders up
    /// to the root. Repeated calls return the same id. Returns None when the
    /// path is empty or already names a folder.
    pub fn file_for_path(&mut self, path: &str) -> Option<FileId> {
        if path.is_empty() {
            return None;
        }
        if let Some(node) = self.by_path.get(path) {
            return match node {
                NodeRef::File(id) => Some(*id),
                NodeRef::Folder(_) => None,
            };
        }
        let folder = self.parent_folder(path);
        let id = FileId(self.files.len());
        self.files.push(FileNode {
            path: path.to_string(),
            name: base_name(path).to_string(),
            folder,
            symbols: Vec::new(),
            functions: Vec::new(),
            variables: Vec::new(),
            calls_float_function: false,
        });
        self.by_path.insert(path.to_string(), NodeRef::File(id));
        Some(id)
    }

    /// Folder analogue of `file_for_path`.
    pub fn folder_for_path(&mut self, path: &str) -> Option<FolderId> {
        if path.is_empty() {
            return None;
        }
        if let Some(node) = self.by_path.get(path) {
            return match node {
                NodeRef::Folder(id) => Some(*id),
                NodeRef::File(_) => None,
            };
        }
        let folder = self.parent_folder(path);
        let id = FolderId(self.folders.len());
        self.folders.push(FolderNode {
            path: path.to_string(),
            name: base_name(path).to_string(),
            folder,
            files: Vec::new(),
            sub_folders: Vec::new(),
            collapsed_name: base_name(path).to_string(),
            collapsed_sub_folders: Vec::new(),
            root: None,
            calls_float_function: false,
        });
        self.by_path.insert(path.to_string(), NodeRef::Folder(id));
        Some(id)
    }

    fn parent_folder(&mut self, path: &str) -> Option<FolderId> {
        let parent = parent_dir(path);
        if parent.is_empty() || parent == "/" {
            return None;
        }
        self.folder_for_path(parent)
    }

    /// Rebuilds the tree from the symbols' source paths. Symbols without a
    /// recorded path land in a synthetic `<unknown>/<unknown>` file so they
    /// still show up in the hierarchy.
    pub fn derive(&mut self, table: &mut SymbolTable) {
        self.reset();
        let addresses = table.addresses();
        for addr in addresses {
            let path = table
                .symbol_by_addr(addr)
                .and_then(|s| s.path.clone())
                .unwrap_or_else(|| "<unknown>/<unknown>".to_string());
            let path = normalize_path(&path);
            let file = self.file_for_path(&path);
            if let Some(id) = file {
                self.files[id.0].symbols.push(addr);
            }
            if let Some(sym) = table.symbol_by_addr_mut(addr) {
                sym.set_location(&path, None);
                sym.file = file;
            }
        }
    }

    /// Fills in the derived lists: per-file symbol partitions, parent/child
    /// links, collapsed names, sort orders and float flags. Runs after
    /// `derive` and after the call graph is built.
    pub fn aggregate(&mut self, table: &SymbolTable) {
        for id in 0..self.files.len() {
            let mut symbols = self.files[id].symbols.clone();
            symbols.sort_by_key(|a| {
                table
                    .symbol_by_addr(*a)
                    .map(|s| s.name.clone())
                    .unwrap_or_default()
            });
            let functions: Vec<Address> = symbols
                .iter()
                .copied()
                .filter(|a| table.symbol_by_addr(*a).is_some_and(|s| s.is_function()))
                .collect();
            let variables: Vec<Address> = symbols
                .iter()
                .copied()
                .filter(|a| table.symbol_by_addr(*a).is_some_and(|s| s.is_variable()))
                .collect();

            let node = &mut self.files[id];
            node.symbols = symbols;
            node.functions = functions;
            node.variables = variables;

            if let Some(parent) = self.files[id].folder {
                self.folders[parent.0].files.push(FileId(id));
            }
        }

        for id in 0..self.folders.len() {
            if let Some(parent) = self.folders[id].folder {
                self.folders[parent.0].sub_folders.push(FolderId(id));
            }

            let ancestors = self.ancestors(FolderId(id));
            self.folders[id].root = ancestors.last().copied();

            let has_files = !self.folders[id].files.is_empty();
            let mut collapsed = self.folders[id].name.clone();
            for ancestor in &ancestors {
                if has_files {
                    self.folders[ancestor.0].collapsed_sub_folders.push(FolderId(id));
                }
                if !self.folders[ancestor.0].files.is_empty() {
                    break;
                }
                collapsed = format!("{}/{}", self.folders[ancestor.0].name, collapsed);
            }
            self.folders[id].collapsed_name = collapsed;
        }

        for id in 0..self.folders.len() {
            let mut files = self.folders[id].files.clone();
            files.sort_by_key(|f| self.files[f.0].name.clone());
            let mut sub_folders = self.folders[id].sub_folders.clone();
            sub_folders.sort_by_key(|f| self.folders[f.0].name.clone());
            let mut collapsed = self.folders[id].collapsed_sub_folders.clone();
            collapsed.sort_by_key(|f| self.folders[f.0].collapsed_name.clone());

            let node = &mut self.folders[id];
            node.files = files;
            node.sub_folders = sub_folders;
            node.collapsed_sub_folders = collapsed;
        }
    }

    fn ancestors(&self, id: FolderId) -> Vec<FolderId> {
        let mut out = Vec::new();
        let mut current = self.folders[id.0].folder;
        while let Some(parent) = current {
            out.push(parent);
            current = self.folders[parent.0].folder;
        }
        out
    }

    /// Lifts the per-function float flags onto files and folders. Runs
    /// after the call graph has set the symbol flags.
    // Children are created after their parents, so a reverse pass sees every
    // sub-folder flag before the folder that contains it.
    pub fn aggregate_float_flags(&mut self, table: &SymbolTable) {
        for id in 0..self.files.len() {
            let flagged = self.files[id].functions.iter().any(|a| {
                table
                    .symbol_by_addr(*a)
                    .is_some_and(|s| s.calls_float_function)
            });
            self.files[id].calls_float_function = flagged;
        }
        for id in (0..self.folders.len()).rev() {
            let from_files = self.folders[id]
                .files
                .iter()
                .any(|f| self.files[f.0].calls_float_function);
            let from_folders = self.folders[id]
                .sub_folders
                .iter()
                .any(|f| self.folders[f.0].calls_float_function);
            self.folders[id].calls_float_function = from_files || from_folders;
        }
    }

    pub fn root_folders(&self) -> Vec<FolderId> {
        (0..self.folders.len())
            .map(FolderId)
            .filter(|id| self.folders[id.0].folder.is_none())
            .collect()
    }

    /// The roots of the collapsed view: the first folder with files along
    /// each branch, skipping empty intermediate directories.
    pub fn collapsed_root_folders(&self) -> Vec<FolderId> {
        let mut out = Vec::new();
        for root in self.root_folders() {
            self.non_empty_leafs(root, &mut out);
        }
        out
    }

    fn non_empty_leafs(&self, id: FolderId, out: &mut Vec<FolderId>) {
        if !self.folders[id.0].files.is_empty() {
            out.push(id);
        } else {
            for sub in &self.folders[id.0].sub_folders {
                self.non_empty_leafs(*sub, out);
            }
        }
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => "",
    }
}
