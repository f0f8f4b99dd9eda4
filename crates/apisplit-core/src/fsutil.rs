use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::debug;
use tempfile::{Builder, NamedTempFile};

use crate::error::{Error, Result};

/// How often, and how patiently, a failed write is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            retries: 0,
            backoff: Duration::ZERO,
        }
    }
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))
}

/// Replace `path` with `content` without ever exposing a partial file.
///
/// The content goes to a temporary file in the same directory, which is then
/// renamed over the destination. A new file gets the mode `fs::write` would
/// give it; an existing one keeps its mode.
pub fn write_atomic(path: &Path, content: &[u8], policy: RetryPolicy) -> Result<()> {
    let mut attempt = 0;
    loop {
        match try_write(path, content) {
            Ok(()) => return Ok(()),
            Err(err) if attempt < policy.retries => {
                attempt += 1;
                debug!(
                    "write to {} failed ({err}), retry {attempt}/{}",
                    path.display(),
                    policy.retries
                );
                thread::sleep(policy.backoff);
            }
            Err(err) => return Err(Error::io(path, err)),
        }
    }
}

fn try_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = parent_dir(path);
    let mut tmp = temp_file_in(&dir)?;
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    #[allow(unused_mut)]
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // 0666 before the umask, as open(2) does for fs::write.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Files directly inside `dir` whose extension matches `ext`, sorted by name.
pub fn list_files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|err| Error::io(dir, err))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| Error::io(dir, err))?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.yaml");
        write_atomic(&path, b"first: 1\nsecond: 2\n", RetryPolicy::none()).unwrap();
        write_atomic(&path, b"x: 1\n", RetryPolicy::none()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x: 1\n");
        // No temporary files are left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_mode_matches_plain_write() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.yaml");
        let atomic = dir.path().join("atomic.yaml");
        fs::write(&plain, b"a: 1\n").unwrap();
        write_atomic(&atomic, b"a: 1\n", RetryPolicy::none()).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&atomic), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_file_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.yaml");
        fs::write(&path, b"a: 1\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        write_atomic(&path, b"a: 2\n", RetryPolicy::none()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a: 2\n");
    }

    #[test]
    fn test_write_into_missing_dir_fails_after_retries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("a.yaml");
        let policy = RetryPolicy {
            retries: 1,
            backoff: Duration::from_millis(1),
        };
        let err = write_atomic(&path, b"a: 1\n", policy).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_list_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.yaml", "a.yaml", "c.json", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.yaml")).unwrap();
        let files = list_files_with_extension(dir.path(), "yaml").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yaml"]);
    }
}
