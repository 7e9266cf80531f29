//! Equality-pinned version constraints.

use std::fmt;

use super::version::Version;

/// `= MAJOR.MINOR.PATCH`, the only constraint form promotion writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionConstraint {
    pub version: Version,
}

impl VersionConstraint {
    pub fn pinned(version: Version) -> Self {
        Self { version }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "= {}", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_equality_operator() {
        let c = VersionConstraint::pinned(Version::new(2, 3, 1));
        assert_eq!(c.to_string(), "= 2.3.1");
    }
}
