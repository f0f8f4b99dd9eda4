use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::registry::{self, ComponentKind};

/// Placeholder left in a document in place of an element moved to its own
/// file.
///
/// `location` is relative to the directory of the file holding the stub. It
/// is written as a plain `$ref` so ordinary OpenAPI tooling can still follow
/// it; the extension keys carry the original key and the element kind.
/// Any other key makes the object an ordinary element instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceStub {
    #[serde(rename = "$ref")]
    pub location: String,

    #[serde(rename = "x-apisplit-id")]
    pub id: String,

    #[serde(rename = "x-apisplit-kind")]
    pub kind_tag: String,
}

impl ReferenceStub {
    pub fn new(id: impl Into<String>, kind: ComponentKind, location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            id: id.into(),
            kind_tag: kind.type_name().to_string(),
        }
    }

    /// The referenced element kind; fails for tags outside the registry.
    pub fn kind(&self) -> Result<ComponentKind> {
        registry::kind_from_tag(&self.kind_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_wire_shape() {
        let stub = ReferenceStub::new("Pet", ComponentKind::Schema, "schemas/Pet.yaml");
        let value = serde_json::to_value(&stub).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "$ref": "schemas/Pet.yaml",
                "x-apisplit-id": "Pet",
                "x-apisplit-kind": "Schema",
            })
        );
    }

    #[test]
    fn test_unknown_kind_tag() {
        let stub = ReferenceStub {
            location: "widgets/a.yaml".into(),
            id: "a".into(),
            kind_tag: "Widget".into(),
        };
        assert!(matches!(stub.kind(), Err(Error::UnsupportedKind { .. })));
    }
}
