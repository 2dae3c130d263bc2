//! dishboard/crates/services/src/lib.rs
//!
//! Orchestration between the web layer and the ports: capability
//! derivation, the post lifecycle and the account lifecycle. Services own
//! no state beyond shared handles to the ports they drive.

pub mod accounts;
pub mod authz;
pub mod posts;

pub use accounts::AccountService;
pub use posts::PostService;
