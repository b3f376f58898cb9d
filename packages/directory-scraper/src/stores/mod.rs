//! [`RecordStore`](crate::traits::RecordStore) implementations.
//!
//! - `MemoryStore` - in-memory, for tests and dry runs
//! - `PostgresStore` - JSONB documents in PostgreSQL

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
