//! SQLite backend for the capstone topic store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Every mutation is a single
//! `BEGIN IMMEDIATE` transaction on that thread.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteStore, StoreOptions};

#[cfg(test)]
mod tests;
