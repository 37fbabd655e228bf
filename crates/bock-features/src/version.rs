//! Compatibility versions.

use std::fmt;
use std::str::FromStr;

use bock_common::{BockError, BockResult};
use serde::{Deserialize, Serialize};

/// A `major.minor` compatibility version.
///
/// Ordering is lexicographic: major first, then minor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Version {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl Version {
    /// Create a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a `major.minor` string.
    ///
    /// # Errors
    ///
    /// Returns [`BockError::InvalidVersion`] unless the input is exactly two
    /// dot-separated non-negative integers.
    pub fn parse(value: &str) -> BockResult<Self> {
        let invalid = || BockError::InvalidVersion {
            value: value.to_string(),
        };

        let (major, minor) = value.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: parse_component(major).ok_or_else(invalid)?,
            minor: parse_component(minor).ok_or_else(invalid)?,
        })
    }
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for Version {
    type Err = BockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        assert_eq!(Version::parse("0.7").unwrap(), Version::new(0, 7));
        assert_eq!(Version::parse(" 1.12 ").unwrap(), Version::new(1, 12));
    }

    #[test]
    fn parse_invalid() {
        for bad in ["", "1", "1.", ".1", "0.7.1", "v0.7", "-1.2", "a.b", "1.+2"] {
            let err = Version::parse(bad).unwrap_err();
            assert!(
                matches!(err, BockError::InvalidVersion { .. }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn ordering_is_major_then_minor() {
        assert!(Version::new(0, 9) < Version::new(1, 0));
        assert!(Version::new(1, 2) < Version::new(1, 10));
        assert_eq!(Version::new(1, 2).max(Version::new(1, 2)), Version::new(1, 2));
    }

    #[test]
    fn display() {
        assert_eq!(Version::new(0, 6).to_string(), "0.6");
    }
}
