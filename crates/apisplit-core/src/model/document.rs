use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::components::Components;
use super::path::PathEntry;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub version: String,

    /// Contact, license, terms of service and extensions, kept verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Tag definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A whole API description, or a fragment of one.
///
/// Fragment files written by the splitter deserialize into this same type;
/// they simply leave the version and info fields empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swagger: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,

    /// Servers, security, external docs, extensions and anything else the
    /// model does not name.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathEntry>,

    #[serde(default, skip_serializing_if = "Components::is_empty")]
    pub components: Components,
}

impl Document {
    /// The declared `openapi` or `swagger` version, if any.
    pub fn declared_version(&self) -> Option<&str> {
        self.openapi.as_deref().or(self.swagger.as_deref())
    }

    /// Number of path entries that are still reference stubs.
    pub fn stub_count(&self) -> usize {
        let paths = self.paths.values().filter(|p| p.is_stub()).count();
        let components = self
            .components
            .iter()
            .filter(|(_, _, entry)| entry.is_stub())
            .count();
        paths + components
    }
}
