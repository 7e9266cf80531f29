//! Cookbook versions and the version-string validator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SporkError;

/// Is `component` an optionally signed run of ASCII digits?
fn is_integer(component: &str) -> bool {
    let digits = component
        .strip_prefix(['+', '-'])
        .unwrap_or(component);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Check that `s` has exactly three dot-separated integer components.
///
/// A leading sign on a component is tolerated here; [`Version::from_str`]
/// still rejects negative components.
pub fn is_valid_version(s: &str) -> bool {
    let components: Vec<&str> = s.split('.').collect();
    components.len() == 3 && components.iter().all(|c| is_integer(c))
}

/// A three-component numeric version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version read from cookbook metadata.
    ///
    /// Metadata may carry a two-component version (`1.0`), which means
    /// patch level 0.
    pub fn from_metadata(s: &str) -> Result<Self, SporkError> {
        let trimmed = s.trim();
        if trimmed.split('.').count() == 2 {
            return format!("{trimmed}.0").parse();
        }
        trimmed.parse()
    }
}

impl FromStr for Version {
    type Err = SporkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SporkError::InvalidVersionFormat {
            version: s.to_string(),
        };
        if !is_valid_version(s) {
            return Err(invalid());
        }

        let parts = s
            .split('.')
            .map(str::parse::<u64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;
        Ok(Version::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
