use std::path::PathBuf;

use thiserror::Error;

use crate::codec::Diagnostic;
use crate::registry::ComponentKind;

/// Failure to turn an in-memory value into YAML or JSON text.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to write YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the split and bundle engines.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to parse {}: {}", .path.display(), summarize(.diagnostics))]
    Parse {
        path: PathBuf,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("unsupported component kind: {kind} ({context})")]
    UnsupportedKind { kind: String, context: String },

    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("file name collision in {directory}: {key:?} maps to {filename}, already used by {existing:?}")]
    FilenameCollision {
        directory: String,
        key: String,
        filename: String,
        existing: String,
    },

    #[error("reference {location:?} escapes base directory {}", .base.display())]
    PathOutsideBase { base: PathBuf, location: String },

    #[error("duplicate {kind} key {key:?} in {}", .path.display())]
    DuplicateComponentKey {
        kind: ComponentKind,
        key: String,
        path: PathBuf,
    },

    #[error("circular reference through {}", .0.display())]
    CircularReference(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {what}: {source}")]
    Encode {
        what: String,
        #[source]
        source: EncodeError,
    },

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsupported(kind: impl ToString, context: impl Into<String>) -> Self {
        Error::UnsupportedKind {
            kind: kind.to_string(),
            context: context.into(),
        }
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "no diagnostics".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
