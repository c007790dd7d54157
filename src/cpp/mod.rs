// Thu Feb 12 2026 - Alex

pub mod signature;

pub use signature::{canonical_signature, display_names_match, CanonicalSignature};
