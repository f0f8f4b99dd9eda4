//! Conversion between files on disk and the relative locations stored in
//! reference stubs.
//!
//! Locations are always written with `/` separators, whatever the platform,
//! and read back accepting both `/` and `\`, so a directory split on one
//! system bundles on another.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Location of `file` relative to `base`, with `/` separators.
pub fn relative_path(base: &Path, file: &Path) -> Result<String> {
    let outside = || Error::PathOutsideBase {
        base: base.to_path_buf(),
        location: file.display().to_string(),
    };
    let rest = file.strip_prefix(base).map_err(|_| outside())?;

    let mut parts = Vec::new();
    for component in rest.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return Err(outside()),
        }
    }
    if parts.is_empty() {
        return Err(outside());
    }
    Ok(parts.join("/"))
}

/// Absolute path of `location` against `base`.
///
/// `..` segments are allowed as long as they never climb above `base`.
pub fn resolve(base: &Path, location: &str) -> Result<PathBuf> {
    let outside = || Error::PathOutsideBase {
        base: base.to_path_buf(),
        location: location.to_string(),
    };
    if location.trim().is_empty() || is_absolute_like(location) {
        return Err(outside());
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in location.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop().ok_or_else(outside)?;
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(outside());
    }

    let mut resolved = base.to_path_buf();
    resolved.extend(segments);
    Ok(resolved)
}

/// Absolute path of `location` written in a file that lives in
/// `referencing_dir`, a directory at or below `base`.
///
/// The location may climb out of `referencing_dir`, but never out of `base`.
pub fn resolve_from(base: &Path, referencing_dir: &Path, location: &str) -> Result<PathBuf> {
    if referencing_dir == base {
        return resolve(base, location);
    }
    if is_absolute_like(location) {
        return Err(Error::PathOutsideBase {
            base: base.to_path_buf(),
            location: location.to_string(),
        });
    }
    let prefix = relative_path(base, referencing_dir)?;
    resolve(base, &format!("{prefix}/{location}"))
}

fn is_absolute_like(location: &str) -> bool {
    location.starts_with(['/', '\\']) || has_drive_prefix(location) || location.contains("://")
}

fn has_drive_prefix(location: &str) -> bool {
    let bytes = location.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let base = Path::new("out");
        let file = base.join("paths").join("get_by_id.yaml");
        assert_eq!(relative_path(base, &file).unwrap(), "paths/get_by_id.yaml");
    }

    #[test]
    fn test_relative_path_outside_base() {
        let err = relative_path(Path::new("out"), Path::new("elsewhere/a.yaml")).unwrap_err();
        assert!(matches!(err, Error::PathOutsideBase { .. }));
    }

    #[test]
    fn test_relative_path_of_base_itself() {
        assert!(relative_path(Path::new("out"), Path::new("out")).is_err());
    }

    #[test]
    fn test_resolve_accepts_both_separators() {
        let base = Path::new("/work/out");
        let expected = base.join("paths").join("pets.yaml");
        assert_eq!(resolve(base, "paths/pets.yaml").unwrap(), expected);
        assert_eq!(resolve(base, "paths\\pets.yaml").unwrap(), expected);
        assert_eq!(resolve(base, "./paths//pets.yaml").unwrap(), expected);
    }

    #[test]
    fn test_resolve_allows_inner_parent_segments() {
        let base = Path::new("/work/out");
        assert_eq!(
            resolve(base, "paths/../schemas/Pet.yaml").unwrap(),
            base.join("schemas").join("Pet.yaml")
        );
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let base = Path::new("/work/out");
        for location in [
            "../secrets.yaml",
            "paths/../../x.yaml",
            "/etc/passwd",
            "\\\\server\\share",
            "C:\\temp\\a.yaml",
            "https://example.com/a.yaml",
            "",
            ".",
        ] {
            assert!(
                matches!(resolve(base, location), Err(Error::PathOutsideBase { .. })),
                "{location:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_from_nested_fragment() {
        let base = Path::new("/work/out");
        let paths = base.join("paths");
        assert_eq!(
            resolve_from(base, &paths, "more/pets.yaml").unwrap(),
            paths.join("more").join("pets.yaml")
        );
        assert_eq!(
            resolve_from(base, &paths, "../users.yaml").unwrap(),
            base.join("users.yaml")
        );
        assert!(resolve_from(base, &paths, "../../x.yaml").is_err());
        assert!(resolve_from(base, &paths, "/x.yaml").is_err());
        assert_eq!(resolve_from(base, base, "a.yaml").unwrap(), base.join("a.yaml"));
    }

    #[test]
    fn test_roundtrip() {
        let base = Path::new("split");
        let file = base.join("requestbodies").join("NewPet.json");
        let location = relative_path(base, &file).unwrap();
        assert_eq!(resolve(base, &location).unwrap(), file);
    }
}
