//! Parsing, rendering and resolving feature sets.

use std::fmt;
use std::str::FromStr;

use bock_common::{BockError, BockResult};

use crate::registry::{Feature, FeatureSet};
use crate::version::Version;

const DIRECTIVE: &str = "VERSION";

impl FeatureSet {
    /// Version assumed for scripts without a `VERSION` directive.
    pub const DEFAULT_VERSION: Version = Version::new(0, 5);

    /// A feature set declaring `version` with every toggle off.
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            major: version.major,
            minor: version.minor,
            ..Self::default()
        }
    }

    /// The declared compatibility version.
    #[must_use]
    pub const fn version(&self) -> Version {
        Version::new(self.major, self.minor)
    }

    /// Whether the declared version is at least `major.minor`.
    #[must_use]
    pub fn version_at_least(&self, major: u32, minor: u32) -> bool {
        self.version() >= Version::new(major, minor)
    }

    /// The enabled features, ordered by flag name.
    #[must_use]
    pub fn enabled(&self) -> Vec<Feature> {
        let mut features: Vec<_> = Feature::ALL
            .iter()
            .copied()
            .filter(|&f| self.is_enabled(f))
            .collect();
        features.sort_unstable_by_key(|f| f.name());
        features
    }

    /// A copy of this set with `feature` turned on.
    #[must_use]
    pub fn with_feature(mut self, feature: Feature) -> Self {
        *self.toggle_mut(feature) = true;
        self
    }

    /// Apply a comma-separated list of flag names, returning the new set.
    ///
    /// Names may carry a leading `--` and surrounding whitespace. Empty
    /// entries are ignored, so `""` leaves the set unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BockError::UnknownFeatureFlag`] for the first name that is not
    /// in the registry.
    pub fn with_flag_overrides(&self, flags: &str) -> BockResult<Self> {
        let mut next = *self;
        for token in flags.split(',') {
            let token = token.trim();
            let name = token.strip_prefix("--").unwrap_or(token).trim();
            if name.is_empty() {
                continue;
            }
            let feature = Feature::from_name(name).ok_or_else(|| BockError::UnknownFeatureFlag {
                flag: token.to_string(),
            })?;
            *next.toggle_mut(feature) = true;
        }
        Ok(next)
    }

    /// Turn on every feature released at or before the declared version, then
    /// apply negative flags.
    #[must_use]
    pub fn resolve(&self) -> Self {
        let mut next = *self;
        let version = self.version();

        for &feature in Feature::ALL {
            if feature.release().is_some_and(|release| version >= release) {
                *next.toggle_mut(feature) = true;
            }
        }

        if next.no_use_registry_for_with_docker {
            next.use_registry_for_with_docker = false;
        }

        next
    }

    /// Render the `VERSION` directive for this set.
    ///
    /// Enabled flags are listed in flag-name order; when none is enabled only
    /// the version is written.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from(DIRECTIVE);
        for feature in self.enabled() {
            out.push_str(" --");
            out.push_str(feature.name());
        }
        out.push(' ');
        out.push_str(&self.version().to_string());
        out
    }

    /// Parse a `VERSION [--flag ...] major.minor` directive line.
    ///
    /// Only the flags named on the line are turned on; call [`Self::resolve`]
    /// for the version-implied ones.
    ///
    /// # Errors
    ///
    /// Returns [`BockError::InvalidVersionDirective`] for a malformed line,
    /// [`BockError::InvalidVersion`] for a bad version and
    /// [`BockError::UnknownFeatureFlag`] for an unrecognized flag.
    pub fn parse_directive(line: &str) -> BockResult<Self> {
        let invalid = |reason: &str| BockError::InvalidVersionDirective {
            line: line.trim().to_string(),
            reason: reason.to_string(),
        };

        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(DIRECTIVE) {
            return Err(invalid("expected the VERSION keyword"));
        }

        let mut flags = Vec::new();
        let mut version = None;
        for token in tokens {
            if version.is_some() {
                return Err(invalid("unexpected argument after the version"));
            }
            if token.starts_with("--") {
                flags.push(token);
            } else {
                version = Some(Version::parse(token)?);
            }
        }

        let version = version.ok_or_else(|| invalid("missing major.minor version"))?;
        Self::new(version).with_flag_overrides(&flags.join(","))
    }

    /// Build the feature set for a whole build script.
    ///
    /// The first line that is neither blank nor a comment is parsed as the
    /// `VERSION` directive when it starts with one; otherwise
    /// [`Self::DEFAULT_VERSION`] applies. `overrides` are applied on top and the
    /// result is resolved.
    ///
    /// # Errors
    ///
    /// Returns the directive parsing error or an unknown override.
    pub fn from_script(script: &str, overrides: &str) -> BockResult<Self> {
        let first = script
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'));

        let declared = match first {
            Some(line) if line.split_whitespace().next() == Some(DIRECTIVE) => {
                Self::parse_directive(line)?
            }
            _ => {
                tracing::warn!(
                    version = %Self::DEFAULT_VERSION,
                    "No VERSION directive found, using default"
                );
                Self::new(Self::DEFAULT_VERSION)
            }
        };

        Ok(declared.with_flag_overrides(overrides)?.resolve())
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for FeatureSet {
    type Err = BockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_directive(s)
    }
}

impl FromStr for Feature {
    type Err = BockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| BockError::UnknownFeatureFlag {
            flag: s.to_string(),
        })
    }
}
