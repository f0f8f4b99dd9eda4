//! The closed taxonomy of referenceable elements.
//!
//! Every directory name, document section key and type label used by the
//! splitter and the bundler comes from [`REGISTRY`]. The bundler finds files
//! through the directory name and merges them through the kind, so the two
//! must never be derived separately.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::SpecVersion;
use crate::model::Component;

/// Kind of element that can be moved out of a document into its own file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    Schema,
    Parameter,
    Example,
    Header,
    Response,
    RequestBody,
    Link,
    Callback,
    SecurityScheme,
    Path,
    Tag,
}

/// Static facts about one [`ComponentKind`].
#[derive(Debug, Clone, Copy)]
pub struct KindInfo {
    pub kind: ComponentKind,
    /// Label used in diagnostics and in reference stubs.
    pub type_name: &'static str,
    /// Subdirectory of the split output holding this kind's files.
    pub directory: Option<&'static str>,
    /// Key under `components` in a 3.x document.
    pub section: Option<&'static str>,
    /// Top-level key in a 2.0 document.
    pub v2_section: Option<&'static str>,
}

pub static REGISTRY: [KindInfo; 11] = [
    KindInfo {
        kind: ComponentKind::Schema,
        type_name: "Schema",
        directory: Some("schemas"),
        section: Some("schemas"),
        v2_section: Some("definitions"),
    },
    KindInfo {
        kind: ComponentKind::Parameter,
        type_name: "Parameter",
        directory: Some("parameters"),
        section: Some("parameters"),
        v2_section: Some("parameters"),
    },
    KindInfo {
        kind: ComponentKind::Example,
        type_name: "Example",
        directory: Some("examples"),
        section: Some("examples"),
        v2_section: None,
    },
    KindInfo {
        kind: ComponentKind::Header,
        type_name: "Header",
        directory: Some("headers"),
        section: Some("headers"),
        v2_section: None,
    },
    KindInfo {
        kind: ComponentKind::Response,
        type_name: "Response",
        directory: Some("responses"),
        section: Some("responses"),
        v2_section: Some("responses"),
    },
    KindInfo {
        kind: ComponentKind::RequestBody,
        type_name: "RequestBody",
        directory: Some("requestbodies"),
        section: Some("requestBodies"),
        v2_section: None,
    },
    KindInfo {
        kind: ComponentKind::Link,
        type_name: "Link",
        directory: Some("links"),
        section: Some("links"),
        v2_section: None,
    },
    KindInfo {
        kind: ComponentKind::Callback,
        type_name: "Callback",
        directory: Some("callbacks"),
        section: Some("callbacks"),
        v2_section: None,
    },
    KindInfo {
        kind: ComponentKind::SecurityScheme,
        type_name: "SecurityScheme",
        directory: Some("securityschemes"),
        section: Some("securitySchemes"),
        v2_section: Some("securityDefinitions"),
    },
    KindInfo {
        kind: ComponentKind::Path,
        type_name: "Path",
        directory: Some("paths"),
        section: None,
        v2_section: None,
    },
    KindInfo {
        kind: ComponentKind::Tag,
        type_name: "Tag",
        directory: None,
        section: None,
        v2_section: None,
    },
];

/// Component families in the order the splitter exports them.
pub const COMPONENT_FAMILIES: [ComponentKind; 9] = [
    ComponentKind::Schema,
    ComponentKind::Parameter,
    ComponentKind::Example,
    ComponentKind::Header,
    ComponentKind::Response,
    ComponentKind::Link,
    ComponentKind::Callback,
    ComponentKind::RequestBody,
    ComponentKind::SecurityScheme,
];

impl ComponentKind {
    pub fn info(self) -> &'static KindInfo {
        // The table is indexed by declaration order.
        &REGISTRY[self as usize]
    }

    pub fn type_name(self) -> &'static str {
        self.info().type_name
    }

    /// Whether documents of `version` have a home for this kind.
    pub fn supported_in(self, version: SpecVersion) -> bool {
        match (self, version) {
            (ComponentKind::Path | ComponentKind::Tag, _) => true,
            (_, SpecVersion::V3_0) => self.info().section.is_some(),
            (_, SpecVersion::V2_0) => self.info().v2_section.is_some(),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Directory name holding files of `kind`.
pub fn directory_for(kind: ComponentKind) -> Result<&'static str> {
    kind.info()
        .directory
        .ok_or_else(|| Error::unsupported(kind, "kind has no storage directory"))
}

/// Diagnostic label of `kind`.
pub fn type_name_for(kind: ComponentKind) -> &'static str {
    kind.type_name()
}

/// Document key holding the `kind` family for the given spec version.
pub fn section_for(kind: ComponentKind, version: SpecVersion) -> Result<&'static str> {
    let info = kind.info();
    let section = match version {
        SpecVersion::V3_0 => info.section,
        SpecVersion::V2_0 => info.v2_section,
    };
    section.ok_or_else(|| Error::unsupported(kind, format!("no component section in OpenAPI {version}")))
}

/// Classify a reference-stub kind tag.
pub fn kind_from_tag(tag: &str) -> Result<ComponentKind> {
    REGISTRY
        .iter()
        .find(|info| info.type_name == tag)
        .map(|info| info.kind)
        .ok_or_else(|| Error::unsupported(tag, "unknown reference kind tag"))
}

/// Classify a component value by its variant.
pub fn kind_from_instance(component: &Component) -> ComponentKind {
    component.kind()
}

/// Component families that `version` can express, in export order.
pub fn families_for(version: SpecVersion) -> impl Iterator<Item = ComponentKind> {
    COMPONENT_FAMILIES
        .into_iter()
        .filter(move |kind| kind.supported_in(version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_declaration_order() {
        for (i, info) in REGISTRY.iter().enumerate() {
            assert_eq!(info.kind as usize, i, "{} is out of place", info.type_name);
        }
    }

    #[test]
    fn test_directory_names() {
        assert_eq!(directory_for(ComponentKind::Path).unwrap(), "paths");
        assert_eq!(directory_for(ComponentKind::RequestBody).unwrap(), "requestbodies");
        assert_eq!(
            directory_for(ComponentKind::SecurityScheme).unwrap(),
            "securityschemes"
        );
    }

    #[test]
    fn test_tag_has_no_directory() {
        let err = directory_for(ComponentKind::Tag).unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind { .. }));
    }

    #[test]
    fn test_kind_from_tag_roundtrips_type_names() {
        for info in &REGISTRY {
            assert_eq!(kind_from_tag(info.type_name).unwrap(), info.kind);
        }
        assert!(matches!(
            kind_from_tag("Widget"),
            Err(Error::UnsupportedKind { .. })
        ));
    }

    #[test]
    fn test_v2_sections() {
        assert_eq!(
            section_for(ComponentKind::Schema, SpecVersion::V2_0).unwrap(),
            "definitions"
        );
        assert!(section_for(ComponentKind::Link, SpecVersion::V2_0).is_err());
        let v2: Vec<_> = families_for(SpecVersion::V2_0).collect();
        assert_eq!(
            v2,
            vec![
                ComponentKind::Schema,
                ComponentKind::Parameter,
                ComponentKind::Response,
                ComponentKind::SecurityScheme,
            ]
        );
    }

    #[test]
    fn test_kind_from_instance() {
        let component = Component::new(ComponentKind::Header, serde_json::json!({})).unwrap();
        assert_eq!(kind_from_instance(&component), ComponentKind::Header);
    }
}
