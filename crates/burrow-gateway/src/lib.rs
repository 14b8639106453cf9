//! HTTP gateway for the Burrow URL shortener.
//!
//! Exposes the shortener over axum. The `gateway` binary wires a storage
//! backend, a generator and this router together.

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
