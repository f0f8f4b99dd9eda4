use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::registry::ComponentKind;

/// File stem used for the `/` path, whose flattened form would be empty.
pub const ROOT_PATH_STEM: &str = "_root";

/// Flatten a path template into a file name.
///
/// Examples:
/// - `/pets` → `pets.yaml`
/// - `/pets/{id}` → `pets_{id}.yaml`
/// - `/` → `_root.yaml`
pub fn normalize_path_key(key: &str, format: Format) -> Result<String> {
    if key.trim().is_empty() {
        return Err(Error::InvalidKey(key.to_string()));
    }
    let trimmed = key
        .strip_prefix('/')
        .or_else(|| key.strip_prefix('\\'))
        .unwrap_or(key);
    let stem = trimmed.replace(['/', '\\'], "_");
    let stem = if stem.is_empty() {
        ROOT_PATH_STEM.to_string()
    } else {
        stem
    };
    Ok(format!("{stem}.{}", format.extension()))
}

/// File name for a component; the name is used verbatim.
pub fn component_file_name(name: &str, format: Format) -> Result<String> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(Error::InvalidKey(name.to_string()));
    }
    Ok(format!("{name}.{}", format.extension()))
}

/// File name for any splittable element.
pub fn file_name_for(kind: ComponentKind, key: &str, format: Format) -> Result<String> {
    match kind {
        ComponentKind::Path => normalize_path_key(key, format),
        _ => component_file_name(key, format),
    }
}

/// File names already handed out within one output subdirectory.
///
/// Only identical names collide. Names differing in ASCII case alone are
/// both written; [`UsedNames::case_variant_of`] finds them so the caller can
/// warn that the directory will not survive a case-insensitive file system.
#[derive(Debug, Default)]
pub struct UsedNames {
    directory: String,
    claimed: HashMap<String, String>,
    folded: HashMap<String, String>,
}

impl UsedNames {
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            claimed: HashMap::new(),
            folded: HashMap::new(),
        }
    }

    /// Record `filename` as written for `key`, failing if another key
    /// already owns it.
    pub fn claim(&mut self, filename: &str, key: &str) -> Result<()> {
        if let Some(existing) = self.claimed.get(filename) {
            return Err(Error::FilenameCollision {
                directory: self.directory.clone(),
                key: key.to_string(),
                filename: filename.to_string(),
                existing: existing.clone(),
            });
        }
        self.claimed.insert(filename.to_string(), key.to_string());
        self.folded
            .entry(filename.to_ascii_lowercase())
            .or_insert_with(|| key.to_string());
        Ok(())
    }

    /// Key of an already claimed name equal to `filename` up to ASCII case.
    pub fn case_variant_of(&self, filename: &str) -> Option<&str> {
        if self.claimed.contains_key(filename) {
            return None;
        }
        self.folded
            .get(&filename.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
