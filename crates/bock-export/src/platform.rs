//! Target platforms of per-platform build outputs.

use std::fmt;
use std::str::FromStr;

use bock_common::{BockError, BockResult};

/// The platform a build output was produced for.
///
/// Two sentinels stand in for platforms that are only known at build time:
/// [`Platform::Default`] is the tool's baseline target and [`Platform::User`]
/// is the invoking host's platform. Platforms compare by value, so an output
/// tagged `Explicit { linux, amd64 }` never equals `User`, even on an amd64
/// host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    /// The tool's baseline target platform.
    #[default]
    Default,
    /// The platform of the host invoking the build.
    User,
    /// The platform of the build backend.
    Native,
    /// An explicitly requested platform.
    Explicit {
        /// Operating system (e.g. "linux").
        os: String,
        /// Architecture (e.g. "arm64").
        architecture: String,
        /// Architecture variant (e.g. "v8").
        variant: Option<String>,
    },
}

impl Platform {
    /// An explicit `os/architecture` platform.
    #[must_use]
    pub fn explicit(os: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self::Explicit {
            os: os.into(),
            architecture: architecture.into(),
            variant: None,
        }
    }

    /// Parse a platform string.
    ///
    /// Accepts `default` (or the empty string), `user`, `native`, and
    /// `os/arch[/variant]`.
    ///
    /// # Errors
    ///
    /// Returns [`BockError::InvalidPlatform`] for anything else.
    pub fn parse(value: &str) -> BockResult<Self> {
        let value = value.trim();
        match value {
            "" | "default" => return Ok(Self::Default),
            "user" => return Ok(Self::User),
            "native" => return Ok(Self::Native),
            _ => {}
        }

        let parts: Vec<&str> = value.split('/').collect();
        let valid = parts
            .iter()
            .all(|p| !p.is_empty() && !p.contains(char::is_whitespace));

        match (valid, parts.as_slice()) {
            (true, [os, arch]) => Ok(Self::explicit(*os, *arch)),
            (true, [os, arch, variant]) => Ok(Self::Explicit {
                os: (*os).to_string(),
                architecture: (*arch).to_string(),
                variant: Some((*variant).to_string()),
            }),
            _ => Err(BockError::InvalidPlatform {
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for Platform {
    type Err = BockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::User => write!(f, "user"),
            Self::Native => write!(f, "native"),
            Self::Explicit {
                os,
                architecture,
                variant: None,
            } => write!(f, "{os}/{architecture}"),
            Self::Explicit {
                os,
                architecture,
                variant: Some(variant),
            } => write!(f, "{os}/{architecture}/{variant}"),
        }
    }
}
