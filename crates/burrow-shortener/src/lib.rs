//! URL shortener service implementation.
//!
//! [`ShortenerService`] ties a storage backend and a short code generator
//! together behind the `Shortener` contract from `burrow_core`.

pub mod service;

pub use service::ShortenerService;
