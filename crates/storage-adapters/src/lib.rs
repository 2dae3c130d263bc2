//! dishboard/crates/storage-adapters/src/lib.rs
//!
//! Implementations of the persistence ports. DashMap-backed in-memory
//! stores are always compiled and back development builds and the test
//! suites; Postgres adapters sit behind the `db-postgres` feature. Image
//! blobs live in memory or, with `media-local`, on the local filesystem.

pub mod media;
pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;
