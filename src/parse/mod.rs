// Tue Feb 10 2026 - Alex

pub mod disassembly;
pub mod size_report;
pub mod stack_usage;

pub use disassembly::{count_assembly_code_bytes, enhance_function_sizes, DisassemblyParser};
pub use size_report::SizeReportParser;
pub use stack_usage::StackUsageParser;
