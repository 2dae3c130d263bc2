//! dishboard/crates/api-adapters/src/lib.rs
//!
//! The HTTP surface: axum router, handlers, extractors, flash messaging
//! and the askama page templates. Handlers evaluate the capability engine
//! before touching a service; templates only interpolate prepared values.

pub mod flash;
pub mod templates;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod forms;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod router;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use router::build_router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
