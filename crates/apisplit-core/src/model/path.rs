use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::reference::ReferenceStub;

/// HTTP methods a path item may carry operations for.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// A path item, kept as an ordered map of its raw fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathItem {
    pub fields: IndexMap<String, Value>,
}

impl PathItem {
    /// Methods with an operation on this path, in document order.
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.fields
            .keys()
            .map(String::as_str)
            .filter(|key| HTTP_METHODS.contains(key))
    }

    pub fn operation(&self, method: &str) -> Option<&Value> {
        self.fields.get(method)
    }
}

/// An entry of the path table: either a reference stub or an inline item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathEntry {
    Stub(ReferenceStub),
    Item(PathItem),
}

impl PathEntry {
    pub fn is_stub(&self) -> bool {
        matches!(self, PathEntry::Stub(_))
    }
}
