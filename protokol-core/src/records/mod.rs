pub mod flattener;
pub mod serialization;
pub mod xlsx;

// Re-export for easy access
pub use flattener::RowFlattener;
pub use serialization::{save_rows, OutputFormat, RowSet, DEFAULT_OUTPUT};
