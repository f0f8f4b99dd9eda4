use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::reference::ReferenceStub;
use crate::error::{Error, Result};
use crate::registry::{self, COMPONENT_FAMILIES, ComponentKind};

/// A component table entry: a reference stub or the inline payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Referenced {
    Stub(ReferenceStub),
    Inline(Value),
}

impl Referenced {
    pub fn is_stub(&self) -> bool {
        matches!(self, Referenced::Stub(_))
    }
}

/// A component payload tagged with its kind.
///
/// The payload is opaque to this crate: it is carried as JSON and only ever
/// moved between documents and files.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Schema(Value),
    Parameter(Value),
    Example(Value),
    Header(Value),
    Response(Value),
    RequestBody(Value),
    Link(Value),
    Callback(Value),
    SecurityScheme(Value),
}

impl Component {
    pub fn new(kind: ComponentKind, value: Value) -> Result<Self> {
        Ok(match kind {
            ComponentKind::Schema => Component::Schema(value),
            ComponentKind::Parameter => Component::Parameter(value),
            ComponentKind::Example => Component::Example(value),
            ComponentKind::Header => Component::Header(value),
            ComponentKind::Response => Component::Response(value),
            ComponentKind::RequestBody => Component::RequestBody(value),
            ComponentKind::Link => Component::Link(value),
            ComponentKind::Callback => Component::Callback(value),
            ComponentKind::SecurityScheme => Component::SecurityScheme(value),
            ComponentKind::Path | ComponentKind::Tag => {
                return Err(Error::unsupported(kind, "not a component family"));
            }
        })
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Schema(_) => ComponentKind::Schema,
            Component::Parameter(_) => ComponentKind::Parameter,
            Component::Example(_) => ComponentKind::Example,
            Component::Header(_) => ComponentKind::Header,
            Component::Response(_) => ComponentKind::Response,
            Component::RequestBody(_) => ComponentKind::RequestBody,
            Component::Link(_) => ComponentKind::Link,
            Component::Callback(_) => ComponentKind::Callback,
            Component::SecurityScheme(_) => ComponentKind::SecurityScheme,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Component::Schema(v)
            | Component::Parameter(v)
            | Component::Example(v)
            | Component::Header(v)
            | Component::Response(v)
            | Component::RequestBody(v)
            | Component::Link(v)
            | Component::Callback(v)
            | Component::SecurityScheme(v) => v,
        }
    }
}

pub type Family = IndexMap<String, Referenced>;

/// Components object holding reusable definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: Family,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: Family,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: Family,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: Family,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: Family,

    #[serde(
        rename = "requestBodies",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub request_bodies: Family,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: Family,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: Family,

    #[serde(
        rename = "securitySchemes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_schemes: Family,

    /// Sections outside the registry (e.g. `pathItems`), kept verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Components {
    pub fn family(&self, kind: ComponentKind) -> Result<&Family> {
        Ok(match kind {
            ComponentKind::Schema => &self.schemas,
            ComponentKind::Parameter => &self.parameters,
            ComponentKind::Example => &self.examples,
            ComponentKind::Header => &self.headers,
            ComponentKind::Response => &self.responses,
            ComponentKind::RequestBody => &self.request_bodies,
            ComponentKind::Link => &self.links,
            ComponentKind::Callback => &self.callbacks,
            ComponentKind::SecurityScheme => &self.security_schemes,
            ComponentKind::Path | ComponentKind::Tag => {
                return Err(Error::unsupported(kind, "not a component family"));
            }
        })
    }

    pub fn family_mut(&mut self, kind: ComponentKind) -> Result<&mut Family> {
        Ok(match kind {
            ComponentKind::Schema => &mut self.schemas,
            ComponentKind::Parameter => &mut self.parameters,
            ComponentKind::Example => &mut self.examples,
            ComponentKind::Header => &mut self.headers,
            ComponentKind::Response => &mut self.responses,
            ComponentKind::RequestBody => &mut self.request_bodies,
            ComponentKind::Link => &mut self.links,
            ComponentKind::Callback => &mut self.callbacks,
            ComponentKind::SecurityScheme => &mut self.security_schemes,
            ComponentKind::Path | ComponentKind::Tag => {
                return Err(Error::unsupported(kind, "not a component family"));
            }
        })
    }

    /// Insert an inline component into the family matching its kind,
    /// returning the entry it replaced.
    pub fn insert(&mut self, name: impl Into<String>, component: Component) -> Option<Referenced> {
        let kind = registry::kind_from_instance(&component);
        // Component variants only exist for the nine families.
        self.family_mut(kind)
            .ok()?
            .insert(name.into(), Referenced::Inline(component.into_value()))
    }

    /// Remove every inline entry of `kind`, in table order.
    pub fn take_inline(&mut self, kind: ComponentKind) -> Result<Vec<(String, Component)>> {
        let family = std::mem::take(self.family_mut(kind)?);
        let mut taken = Vec::new();
        for (name, entry) in family {
            match entry {
                Referenced::Inline(value) => taken.push((name, Component::new(kind, value)?)),
                stub @ Referenced::Stub(_) => {
                    self.family_mut(kind)?.insert(name, stub);
                }
            }
        }
        Ok(taken)
    }

    /// All entries of the nine families as `(kind, name, entry)`.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentKind, &String, &Referenced)> {
        COMPONENT_FAMILIES.into_iter().flat_map(move |kind| {
            self.family(kind)
                .into_iter()
                .flat_map(move |family| family.iter().map(move |(name, entry)| (kind, name, entry)))
        })
    }

    pub fn len(&self) -> usize {
        COMPONENT_FAMILIES
            .into_iter()
            .filter_map(|kind| self.family(kind).ok())
            .map(IndexMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.extra.is_empty()
    }
}
