// Thu Feb 12 2026 - Alex

use crate::symbol::SymbolTable;

/// Lexical path normalization, independent of the local filesystem: debug
/// info records paths from the build machine, which may not exist here and
/// may use Windows separators. Collapses separators and `.`, resolves `..`
/// against preceding components, and keeps leading `..` components intact.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Makes `path` relative to `src_root` when it lives underneath it,
/// otherwise just drops a leading slash. Without a source root every
/// absolute path becomes root-relative.
pub fn strip_source_root(src_root: Option<&str>, path: &str) -> String {
    let root = src_root.map(normalize_path);
    if let Some(root) = &root {
        if let Some(rest) = path.strip_prefix(root.as_str()) {
            return rest.trim_start_matches('/').to_string();
        }
    }
    path.strip_prefix('/').unwrap_or(path).to_string()
}

/// Rewrites every symbol's recorded source path relative to `src_root`,
/// re-deriving the base file name.
pub fn normalize_symbol_paths(table: &mut SymbolTable, src_root: Option<&str>) {
    for sym in table.iter_mut() {
        if let Some(path) = sym.path.clone() {
            let stripped = strip_source_root(src_root, &normalize_path(&path));
            sym.set_location(&stripped, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Address;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("a//b/./c"), "a/b/c");
        assert_eq!(normalize_path("a/../b"), "b");
        assert_eq!(normalize_path("../a"), "../a");
        assert_eq!(normalize_path("/src/../lib/x.c"), "/lib/x.c");
        assert_eq!(normalize_path(""), ".");
    }

    #[test]
    fn test_normalize_path_windows_separators() {
        assert_eq!(normalize_path(r"C:\projects\fw\main.c"), "C:/projects/fw/main.c");
    }

    #[test]
    fn test_strip_source_root() {
        assert_eq!(
            strip_source_root(Some("/home/user/project"), "/home/user/project/src/main.c"),
            "src/main.c"
        );
        assert_eq!(strip_source_root(Some("/home/user/project"), "/lib/gcc/x.c"), "lib/gcc/x.c");
        assert_eq!(strip_source_root(None, "/src/main.c"), "src/main.c");
        assert_eq!(strip_source_root(None, "src/main.c"), "src/main.c");
    }

    #[test]
    fn test_normalize_symbol_paths() {
        let mut table = SymbolTable::new();
        let sym = table.insert_symbol(Address::new(0x550), "main");
        sym.set_location("/home/user/project/src/main.c", Some(25));

        normalize_symbol_paths(&mut table, Some("/home/user/project"));

        let sym = table.symbol_by_addr(Address::new(0x550)).unwrap();
        assert_eq!(sym.path.as_deref(), Some("src/main.c"));
        assert_eq!(sym.base_file.as_deref(), Some("main.c"));
        assert_eq!(sym.line, Some(25));
    }
}
