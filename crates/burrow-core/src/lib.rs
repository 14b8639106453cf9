//! Core types and traits for the Burrow URL shortener.
//!
//! This crate provides the shared record type, the storage capability set
//! implemented by every backend, and the shortener contract consumed by
//! the HTTP gateway.

pub mod context;
pub mod error;
pub mod shortcode;
pub mod shortener;
pub mod storage;

pub use context::CallContext;
pub use error::{ShortenerError, StorageError};
pub use shortcode::ShortCode;
pub use shortener::{BatchItem, BatchShortened, ShortenParams, Shortener};
pub use storage::{ReadStorage, ShortenerRecord, UrlStorage};
