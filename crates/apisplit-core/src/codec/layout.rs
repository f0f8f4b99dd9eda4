//! Moves component families between the 3.x `components` object and the
//! 2.0 top-level sections, so the model only ever sees the 3.x layout.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::format::SpecVersion;
use crate::registry::{COMPONENT_FAMILIES, section_for};

/// Rewrite a 2.0 document tree into the 3.x component layout in place.
pub fn lift_v2_sections(root: &mut Map<String, Value>) {
    let mut components = Map::new();
    for kind in COMPONENT_FAMILIES {
        let (Ok(v2), Ok(v3)) = (
            section_for(kind, SpecVersion::V2_0),
            section_for(kind, SpecVersion::V3_0),
        ) else {
            continue;
        };
        if let Some(section) = root.shift_remove(v2) {
            components.insert(v3.to_string(), section);
        }
    }
    if !components.is_empty() {
        root.insert("components".to_string(), Value::Object(components));
    }
}

/// Rewrite a 3.x-layout tree back into 2.0 top-level sections.
///
/// Fails when the tree holds a family 2.0 cannot express.
pub fn lower_v2_sections(root: &mut Map<String, Value>) -> Result<()> {
    let Some(components) = root.shift_remove("components") else {
        return Ok(());
    };
    let Value::Object(mut components) = components else {
        return Err(Error::unsupported("components", "expected an object"));
    };
    for kind in COMPONENT_FAMILIES {
        let Ok(v3) = section_for(kind, SpecVersion::V3_0) else {
            continue;
        };
        let Some(section) = components.shift_remove(v3) else {
            continue;
        };
        let v2 = section_for(kind, SpecVersion::V2_0)?;
        root.insert(v2.to_string(), section);
    }
    if let Some(leftover) = components.keys().next() {
        return Err(Error::unsupported(
            leftover.clone(),
            "component section has no OpenAPI 2.0 equivalent",
        ));
    }
    Ok(())
}
