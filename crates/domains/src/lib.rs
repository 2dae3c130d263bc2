//! dishboard/crates/domains/src/lib.rs
//!
//! The central domain logic and interface definitions for Dishboard:
//! models, the capability engine's vocabulary, the error taxonomy, and
//! the ports every adapter implements.

pub mod authz;
pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use authz::*;
pub use error::*;
pub use models::*;
pub use ports::*;
