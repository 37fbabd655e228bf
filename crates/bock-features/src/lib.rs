//! # bock-features
//!
//! Version-gated feature flags for Bock build scripts.
//!
//! A build script declares its compatibility version on its first line:
//!
//! ```text
//! VERSION --use-copy-link --wait-block 0.6
//! ```
//!
//! This crate turns that line (plus any command-line overrides) into a
//! [`FeatureSet`]: the declared version and one boolean per recognized
//! [`Feature`]. Every feature belongs to a release; declaring that release or
//! later turns it on without naming the flag.

#![warn(missing_docs)]

pub mod registry;
mod set;
pub mod version;

pub use registry::{Feature, FeatureSet};
pub use version::Version;
