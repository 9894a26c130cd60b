use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// A colon-delimited address: `entityId[:attr]*`.
///
/// A bare path (a single segment) names a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Parse a path. Segments are trimmed and must be non-empty.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let segments: Vec<String> = raw.split(':').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(String::is_empty) {
            return Err(CoreError::InvalidPath(raw.to_string()));
        }
        Ok(Self { segments })
    }

    /// The root entity id.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Attribute segments below the root.
    pub fn attrs(&self) -> &[String] {
        &self.segments[1..]
    }

    /// Whether the path is a single segment.
    pub fn is_bare(&self) -> bool {
        self.segments.len() == 1
    }
}

impl FromStr for Path {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_path() {
        let path = Path::parse("šálek-čaje:onSee:count").unwrap();
        assert_eq!(path.root(), "šálek-čaje");
        assert_eq!(path.attrs(), ["onSee", "count"]);
        assert!(!path.is_bare());
        assert_eq!(path.to_string(), "šálek-čaje:onSee:count");
    }

    #[test]
    fn parse_trims_segments() {
        let path: Path = " counter ".parse().unwrap();
        assert!(path.is_bare());
        assert_eq!(path.root(), "counter");
    }

    #[test]
    fn empty_segments_are_rejected() {
        assert!(Path::parse("").is_err());
        assert!(Path::parse("item::owner").is_err());
        assert!(Path::parse("item:").is_err());
    }
}
