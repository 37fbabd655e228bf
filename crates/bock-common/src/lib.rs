//! # bock-common
//!
//! Shared types for the Bock export tooling.
//!
//! This crate provides the error type used across all Bock crates, along with
//! the [`OperationContext`] helper for annotating runtime-client failures with
//! the operation that produced them.

#![warn(missing_docs)]

pub mod error;

pub use error::{BockError, BockResult, OperationContext};
