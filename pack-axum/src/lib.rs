//! pack-axum: Axum adapter for Pack.
//!
//! Mounts tenant-scoped content routes and the webhook routes, resolves the
//! tenant from the request credential and maps `PackError` to responses.

pub mod app;
pub mod params;
pub mod rest;
pub mod state;
pub mod webhooks;
mod error;

pub use app::AxumApp;
pub use error::PackAxumError;
pub use state::PackAxumState;
