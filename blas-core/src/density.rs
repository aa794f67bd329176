//! Storage selector for constructed containers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BlasError;

/// Storage representation of a container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    #[default]
    Dense,
    Sparse,
}

impl Density {
    /// Recognize a density selector.
    ///
    /// Matching is exact and case-sensitive after trimming surrounding
    /// whitespace, so `" sparse "` is recognized but `"Sparse"` is not.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "dense" => Some(Density::Dense),
            "sparse" => Some(Density::Sparse),
            _ => None,
        }
    }

    /// Like [`Density::parse`], for positions where a selector is mandatory.
    pub fn select(s: &str) -> Result<Self, BlasError> {
        Self::parse(s).ok_or_else(|| BlasError::unknown_density(s))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Density::Dense => "dense",
            Density::Sparse => "sparse",
        }
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_but_is_case_sensitive() {
        assert_eq!(Density::parse("dense"), Some(Density::Dense));
        assert_eq!(Density::parse("  sparse\n"), Some(Density::Sparse));
        assert_eq!(Density::parse("Sparse"), None);
        assert_eq!(Density::parse("1,2;3,4"), None);
    }

    #[test]
    fn test_default_is_dense() {
        assert_eq!(Density::default(), Density::Dense);
    }

    #[test]
    fn test_select_rejects_unknown() {
        let err = Density::select("compressed").unwrap_err();
        assert_eq!(err.code, crate::codes::UNKNOWN_DENSITY);
    }
}
