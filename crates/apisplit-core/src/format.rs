use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OpenAPI specification generation a document is read and written as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecVersion {
    #[serde(rename = "2.0")]
    V2_0,
    #[default]
    #[serde(rename = "3.0")]
    V3_0,
}

impl SpecVersion {
    /// Whether a document's declared version string belongs to this generation.
    pub fn accepts(self, declared: &str) -> bool {
        match self {
            SpecVersion::V2_0 => declared == "2.0" || declared == "2",
            SpecVersion::V3_0 => declared.starts_with("3."),
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpecVersion::V2_0 => "2.0",
            SpecVersion::V3_0 => "3.0",
        })
    }
}

/// Text encoding of documents and fragment files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    #[default]
    Yaml,
}

impl Format {
    /// File extension (without the dot) used for every file of this format.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }

    /// Guess the format from a file name; `None` for unknown extensions.
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        })
    }
}

#[derive(Debug, Error)]
#[error("invalid {what}: {value:?} (expected {expected})")]
pub struct ParseEnumError {
    what: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for SpecVersion {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2" | "2.0" => Ok(SpecVersion::V2_0),
            "3" | "3.0" => Ok(SpecVersion::V3_0),
            other => Err(ParseEnumError {
                what: "spec version",
                value: other.to_string(),
                expected: "2.0 or 3.0",
            }),
        }
    }
}

impl FromStr for Format {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(ParseEnumError {
                what: "format",
                value: s.to_string(),
                expected: "json or yaml",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!("2".parse::<SpecVersion>().unwrap(), SpecVersion::V2_0);
        assert_eq!("3.0".parse::<SpecVersion>().unwrap(), SpecVersion::V3_0);
        assert!("3.1".parse::<SpecVersion>().is_err());
    }

    #[test]
    fn test_accepts_declared_version() {
        assert!(SpecVersion::V3_0.accepts("3.0.3"));
        assert!(SpecVersion::V3_0.accepts("3.1.0"));
        assert!(!SpecVersion::V3_0.accepts("2.0"));
        assert!(SpecVersion::V2_0.accepts("2.0"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("root.JSON")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("README")), None);
    }
}
