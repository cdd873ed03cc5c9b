// All extraction functionality is in protokol-core
// This CLI acts as a thin wrapper around the core library

// Re-export core types for convenience
pub use protokol_core::*;
