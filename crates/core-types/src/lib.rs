pub mod enums;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::UpsertOutcome;
pub use structs::{ExternalProduct, ImportSummary, NewProduct, Product};
