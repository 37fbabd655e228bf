//! Common error types for the Bock ecosystem.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`BockError`].
pub type BockResult<T> = Result<T, BockError>;

/// Common errors across the Bock ecosystem.
#[derive(Error, Diagnostic, Debug)]
pub enum BockError {
    /// A feature flag name that is not in the registry.
    #[error("Unknown feature flag: {flag}")]
    #[diagnostic(
        code(bock::features::unknown_flag),
        help("Run `bock-export flags` to list the recognized feature flags")
    )]
    UnknownFeatureFlag {
        /// The offending token, as written.
        flag: String,
    },

    /// A compatibility version that is not `major.minor`.
    #[error("Invalid version: {value}")]
    #[diagnostic(
        code(bock::features::invalid_version),
        help("Versions are written as major.minor, for example 0.7")
    )]
    InvalidVersion {
        /// The invalid value.
        value: String,
    },

    /// A malformed `VERSION` directive line.
    #[error("Invalid VERSION directive `{line}`: {reason}")]
    #[diagnostic(
        code(bock::features::invalid_directive),
        help("Use the form `VERSION [--flag ...] major.minor`")
    )]
    InvalidVersionDirective {
        /// The directive line.
        line: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Invalid platform string.
    #[error("Invalid platform: {value}")]
    #[diagnostic(
        code(bock::platform::invalid),
        help("Use os/arch[/variant] (e.g. linux/arm64/v8), or one of: default, user, native")
    )]
    InvalidPlatform {
        /// The invalid value.
        value: String,
    },

    /// A multi-platform image with no per-platform images.
    #[error("no images in manifest list for {image}")]
    #[diagnostic(
        code(bock::manifest::no_platforms),
        help("This is a bug, please report it at https://github.com/bock-containers/bock/issues")
    )]
    NoPlatforms {
        /// The parent image name.
        image: String,
    },

    /// A container runtime operation failed.
    #[error("{operation}: {source}")]
    #[diagnostic(code(bock::runtime::operation))]
    RuntimeOperation {
        /// The operation that failed (e.g. "image pull").
        operation: String,
        /// The underlying failure.
        #[source]
        source: Box<BockError>,
    },

    /// A runtime CLI command exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    #[diagnostic(code(bock::runtime::command_failed))]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The operation was cancelled.
    #[error("operation cancelled")]
    #[diagnostic(code(bock::cancelled))]
    Cancelled,

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(bock::io))]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    #[diagnostic(code(bock::serialization))]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(bock::config))]
    Config {
        /// The error message.
        message: String,
    },

    /// Internal error (should not happen).
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(bock::internal),
        help("This is a bug, please report it at https://github.com/bock-containers/bock/issues")
    )]
    Internal {
        /// The error message.
        message: String,
    },
}

impl BockError {
    /// The operation this error was annotated with, if any.
    #[must_use]
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::RuntimeOperation { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// The innermost error, unwrapping any operation context.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut err = self;
        while let Self::RuntimeOperation { source, .. } = err {
            err = source;
        }
        err
    }
}

impl From<serde_json::Error> for BockError {
    fn from(err: serde_json::Error) -> Self {
        BockError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BockError {
    fn from(err: toml::de::Error) -> Self {
        BockError::Config {
            message: err.to_string(),
        }
    }
}

/// Annotates a failed result with the operation that produced it.
pub trait OperationContext<T> {
    /// Wrap the error, if any, as [`BockError::RuntimeOperation`].
    ///
    /// # Errors
    ///
    /// Returns the wrapped error when `self` is an error.
    fn context(self, operation: &str) -> BockResult<T>;
}

impl<T> OperationContext<T> for BockResult<T> {
    fn context(self, operation: &str) -> BockResult<T> {
        self.map_err(|source| BockError::RuntimeOperation {
            operation: operation.to_string(),
            source: Box::new(source),
        })
    }
}
