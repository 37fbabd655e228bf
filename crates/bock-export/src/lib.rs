//! # bock-export
//!
//! Exports the outputs of a Bock build into the local container runtime.
//!
//! - Multi-platform images: pick the per-platform image that stands for the
//!   parent name and tag it ([`manifest`])
//! - Embedded registry sync: pull, retag and clean up images concurrently
//!   ([`pull`])
//! - Image archives: load a tar into the runtime ([`load`])
//!
//! The runtime itself is reached through the [`ContainerFrontend`] trait;
//! [`ShellFrontend`] implements it on top of the `docker` or `podman` CLI.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod console;
pub mod exporter;
pub mod frontend;
pub mod load;
pub mod manifest;
pub mod platform;
pub mod pull;
pub mod shell;

pub use config::ExportConfig;
pub use console::{ConsoleLogger, TerminalConsole};
pub use exporter::Exporter;
pub use frontend::{ContainerFrontend, ImageTag};
pub use load::load_docker_tar;
pub use manifest::{Manifest, PlatformResolution, load_docker_manifest, resolve_default_platform};
pub use platform::Platform;
pub use pull::{PullMap, docker_pull_local_images};
pub use shell::ShellFrontend;
