//! # Catalog Database Crate
//!
//! The local product store. It owns the SQLite connection lifecycle, the
//! schema, and every SQL statement the application runs.
//!
//! ## Public API
//!
//! - `connect` / `close`: open (creating the file if needed), ping, and drain
//!   the connection pool.
//! - `run_migrations`: applies the embedded migrations so the `products` table exists.
//! - `ProductRepository`: conflict-aware upsert for the importer plus the
//!   conventional create/read/update/delete/search operations.
//! - `ProductWriter`: the single write primitive the importer depends on.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{close, connect, connect_in_memory, ping, run_migrations};
pub use error::DbError;
pub use repository::{ProductRepository, ProductWriter};
pub use sqlx::SqlitePool;
