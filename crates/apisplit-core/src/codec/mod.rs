//! Element and document (de)serialization for every supported format and
//! spec version.
//!
//! All knowledge of how YAML and JSON are read and written lives here. Number
//! formatting, scalar styles and quoting are whatever `serde_yaml_ng` and
//! `serde_json` produce; only semantic equality survives a round trip.

mod diagnostic;
pub mod layout;

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

pub use diagnostic::{Diagnostic, Severity};

use crate::error::{EncodeError, Error, Result};
use crate::format::{Format, SpecVersion};
use crate::model::Document;
use crate::registry::{ComponentKind, section_for};

/// A parsed document together with everything found wrong on the way.
#[derive(Debug, Clone, Default)]
pub struct ReadResult {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReadResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            document: Document::default(),
            diagnostics: vec![diagnostic],
        }
    }
}

/// Parse a document or fragment.
///
/// Never fails: malformed input produces an empty document and error
/// diagnostics, leaving the caller to decide whether they are fatal.
pub fn deserialize(input: &[u8], version: SpecVersion, format: Format) -> ReadResult {
    let tree: Value = match format {
        Format::Json => match serde_json::from_slice(input) {
            Ok(tree) => tree,
            Err(err) => return ReadResult::failed(err.into()),
        },
        Format::Yaml => match serde_yaml_ng::from_slice(input) {
            Ok(tree) => tree,
            Err(err) => return ReadResult::failed(err.into()),
        },
    };

    let mut root = match tree {
        Value::Object(root) => root,
        Value::Null => {
            return ReadResult {
                document: Document::default(),
                diagnostics: vec![Diagnostic::warning("document is empty")],
            };
        }
        other => {
            return ReadResult::failed(Diagnostic::error(format!(
                "expected a mapping at the document root, found {}",
                type_label(&other)
            )));
        }
    };

    if version == SpecVersion::V2_0 {
        layout::lift_v2_sections(&mut root);
    }

    let document: Document = match serde_json::from_value(Value::Object(root)) {
        Ok(document) => document,
        Err(err) => return ReadResult::failed(err.into()),
    };

    let mut diagnostics = Vec::new();
    if let Some(declared) = document.declared_version() {
        if !version.accepts(declared) {
            diagnostics.push(Diagnostic::error(format!(
                "document declares version {declared}, but OpenAPI {version} was requested"
            )));
        }
    }
    ReadResult {
        document,
        diagnostics,
    }
}

/// Read and parse a file; only I/O problems are returned as errors.
pub fn read_file(path: &Path, version: SpecVersion, format: Format) -> Result<ReadResult> {
    let bytes = fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::io(path, err),
    })?;
    Ok(deserialize(&bytes, version, format))
}

/// Serialize a whole document.
pub fn serialize_document(document: &Document, version: SpecVersion, format: Format) -> Result<String> {
    let tree = serde_json::to_value(document).map_err(|err| encode_error("document", err))?;
    let Value::Object(mut root) = tree else {
        return Err(Error::unsupported("document", "did not serialize to a mapping"));
    };
    if version == SpecVersion::V2_0 {
        layout::lower_v2_sections(&mut root)?;
    }
    encode(&Value::Object(root), format, "document")
}

/// Serialize one element as a fragment document.
///
/// The element is wrapped in the section it came from (`paths`, a component
/// section, or its 2.0 equivalent) so the file stays a parseable partial
/// document that still records the element's key.
pub fn serialize_element<T: Serialize>(
    key: &str,
    kind: ComponentKind,
    element: &T,
    version: SpecVersion,
    format: Format,
) -> Result<String> {
    let what = format!("{kind} {key:?}");
    let value = serde_json::to_value(element).map_err(|err| encode_error(&what, err))?;

    let mut entry = Map::new();
    entry.insert(key.to_string(), value);

    let mut root = Map::new();
    match kind {
        ComponentKind::Path => {
            root.insert("paths".to_string(), Value::Object(entry));
        }
        ComponentKind::Tag => {
            return Err(Error::unsupported(kind, "tags are not split into files"));
        }
        _ => {
            let section = section_for(kind, version)?;
            match version {
                SpecVersion::V3_0 => {
                    let mut components = Map::new();
                    components.insert(section.to_string(), Value::Object(entry));
                    root.insert("components".to_string(), Value::Object(components));
                }
                SpecVersion::V2_0 => {
                    root.insert(section.to_string(), Value::Object(entry));
                }
            }
        }
    }
    encode(&Value::Object(root), format, &what)
}

fn encode(tree: &Value, format: Format, what: &str) -> Result<String> {
    match format {
        Format::Json => serde_json::to_string_pretty(tree)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|err| encode_error(what, err)),
        Format::Yaml => serde_yaml_ng::to_string(tree).map_err(|err| Error::Encode {
            what: what.to_string(),
            source: EncodeError::Yaml(err),
        }),
    }
}

fn encode_error(what: &str, err: serde_json::Error) -> Error {
    Error::Encode {
        what: what.to_string(),
        source: EncodeError::Json(err),
    }
}

fn type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
