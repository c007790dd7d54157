// Thu Feb 12 2026 - Alex

pub mod arch;
pub mod deepest;
pub mod enhance;

pub use arch::{Arch, CallPatterns};
pub use deepest::{CallPath, DeepestPaths, Direction};
pub use enhance::CallGraphEnhancer;
