// Tue Feb 10 2026 - Alex

pub mod address;
pub mod symbol_info;
pub mod table;

pub use address::Address;
pub use symbol_info::{base_file_name, Symbol, SymbolKind};
pub use table::SymbolTable;
