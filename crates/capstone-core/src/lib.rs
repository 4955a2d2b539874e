//! Core types and trait definitions for capstone topic administration.
//!
//! This crate has no HTTP or database dependencies.
//! It holds the topic state machine, the seat admission rules and the
//! `TopicStore` trait; storage backends and the API depend on it.

pub mod admission;
pub mod capacity;
pub mod error;
pub mod history;
pub mod lifecycle;
pub mod registration;
pub mod status;
pub mod store;
pub mod topic;
pub mod transition;

pub use error::{Error, ErrorCode, Result};
