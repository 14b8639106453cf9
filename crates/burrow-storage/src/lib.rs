//! Storage backends for the Burrow URL shortener.
//!
//! Three interchangeable implementations of [`UrlStorage`]:
//!
//! - [`MemoryStorage`]: a concurrent map, lost on restart.
//! - [`FileStorage`]: an append-only JSON-lines log.
//! - [`PostgresStorage`]: the `url_storage` table, with duplicate detection,
//!   user ownership and soft deletion.
//!
//! Storage never logs; every failure is returned to the caller.

pub mod file;
pub mod memory;
pub mod postgres;

pub use burrow_core::error::{Result, StorageError};
pub use burrow_core::{CallContext, ReadStorage, ShortenerRecord, UrlStorage};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
