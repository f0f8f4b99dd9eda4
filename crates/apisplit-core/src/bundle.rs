//! Recomposition of a split directory into one self-contained document.
//!
//! Path stubs in the root are followed to their fragment files (which may
//! hold several paths, or further path stubs). Component families are not
//! read through stubs: each family directory is scanned and every fragment in
//! it contributes the components of that family it contains. The resulting
//! component tables replace whatever the root held.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::codec::{self, Severity};
use crate::error::{Error, Result};
use crate::format::{Format, SpecVersion};
use crate::fsutil;
use crate::model::{Components, Document, PathEntry, ReferenceStub, Referenced};
use crate::oplog::{CancelFlag, OpLog};
use crate::registry::{self, COMPONENT_FAMILIES, ComponentKind};
use crate::report::{BundleOutcome, BundleReport};
use crate::resolver;
use crate::split::root_file_name;

/// What to do when two files provide the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Abort the bundle with [`Error::DuplicateComponentKey`].
    #[default]
    Fail,
    /// Keep the file read last, with a warning.
    LastWins,
}

#[derive(Debug, Clone, Default)]
pub struct BundleOptions {
    pub version: SpecVersion,
    pub format: Format,
    pub on_duplicate: DuplicatePolicy,
    pub cancel: CancelFlag,
}

/// Bundle `root`, whose stubs are relative to `base_dir`, with default options.
pub fn bundle(
    root: &Document,
    base_dir: &Path,
    version: SpecVersion,
    format: Format,
) -> Result<BundleOutcome> {
    Bundler::new(BundleOptions {
        version,
        format,
        ..BundleOptions::default()
    })
    .bundle(root, base_dir)
}

/// Find the root document of a split directory.
///
/// A file is returned as is. For a directory, `root.<ext>` is preferred,
/// then the first JSON or YAML file by name.
pub fn locate_root(path: &Path, format: Format) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if !path.is_dir() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let preferred = path.join(root_file_name(format));
    if preferred.is_file() {
        return Ok(preferred);
    }
    for ext in [Format::Yaml.extension(), "yml", Format::Json.extension()] {
        if let Some(first) = fsutil::list_files_with_extension(path, ext)?.into_iter().next() {
            return Ok(first);
        }
    }
    Err(Error::NotFound(path.to_path_buf()))
}

pub struct Bundler {
    options: BundleOptions,
}

/// Mutable state of one bundle run.
struct Run<'a> {
    base_dir: &'a Path,
    log: OpLog,
    loaded: Vec<PathBuf>,
    /// Path fragments currently being expanded, outermost first.
    chain: Vec<PathBuf>,
    /// Path fragments already merged; several stubs may share one file.
    expanded: HashSet<PathBuf>,
}

impl Bundler {
    pub fn new(options: BundleOptions) -> Self {
        Self { options }
    }

    /// Read the root document at `root_file` and bundle it.
    ///
    /// Parse errors in the root are fatal. A split directory holds a single
    /// format, so the root's extension overrides the configured one.
    pub fn bundle_file(&self, root_file: &Path) -> Result<BundleOutcome> {
        let format = Format::from_path(root_file).unwrap_or(self.options.format);
        if format != self.options.format {
            log::debug!(
                "{} is {format}, overriding the configured {}",
                root_file.display(),
                self.options.format
            );
            return Bundler::new(BundleOptions {
                format,
                ..self.options.clone()
            })
            .bundle_file(root_file);
        }
        let read = codec::read_file(root_file, self.options.version, self.options.format)?;
        if read.has_errors() {
            return Err(Error::Parse {
                path: root_file.to_path_buf(),
                diagnostics: read.diagnostics,
            });
        }
        let base_dir = match root_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut outcome = self.bundle(&read.document, base_dir)?;
        outcome.report.warnings.extend(
            read.diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Warning)
                .map(|d| format!("{}: {d}", root_file.display())),
        );
        Ok(outcome)
    }

    /// Resolve every stub of `root` against `base_dir`.
    pub fn bundle(&self, root: &Document, base_dir: &Path) -> Result<BundleOutcome> {
        let started = Instant::now();
        let mut run = Run {
            base_dir,
            log: OpLog::new("apisplit::bundle"),
            loaded: Vec::new(),
            chain: Vec::new(),
            expanded: HashSet::new(),
        };

        let mut document = Document {
            swagger: root.swagger.clone(),
            openapi: root.openapi.clone(),
            info: root.info.clone(),
            extra: root.extra.clone(),
            tags: root.tags.clone(),
            paths: IndexMap::with_capacity(root.paths.len()),
            components: Components {
                extra: root.components.extra.clone(),
                ..Components::default()
            },
        };

        for (key, entry) in &root.paths {
            self.options.cancel.check()?;
            match entry {
                PathEntry::Item(_) => {
                    self.merge_path(&mut document.paths, key, entry.clone(), base_dir, &mut run)?;
                }
                PathEntry::Stub(stub) => {
                    self.load_paths(stub, base_dir, &mut document.paths, &mut run)?;
                }
            }
        }
        run.log
            .info(&format!("Resolved {} API paths", document.paths.len()));

        for kind in COMPONENT_FAMILIES {
            for (name, entry) in root.components.family(kind)? {
                if let Referenced::Inline(_) = entry {
                    run.log.warn(format!(
                        "inline {kind} {name:?} in the root document was replaced by the {} directory",
                        registry::directory_for(kind)?
                    ));
                }
            }
            self.load_family(kind, &mut document.components, &mut run)?;
        }

        let (skipped, warnings) = run.log.finish();
        Ok(BundleOutcome {
            document,
            report: BundleReport {
                loaded_files: run.loaded,
                skipped,
                warnings,
                elapsed: started.elapsed(),
            },
        })
    }

    /// Expand a path stub found in a file living in `referencing_dir`.
    ///
    /// Every path of the target fragment is merged under its own key; the
    /// stub's id is informational only.
    fn load_paths(
        &self,
        stub: &ReferenceStub,
        referencing_dir: &Path,
        out: &mut IndexMap<String, PathEntry>,
        run: &mut Run<'_>,
    ) -> Result<()> {
        let kind = stub.kind()?;
        if kind != ComponentKind::Path {
            return Err(Error::unsupported(
                kind,
                format!("path {:?} must reference a Path fragment", stub.id),
            ));
        }
        let file = resolver::resolve_from(run.base_dir, referencing_dir, &stub.location)?;
        if run.chain.contains(&file) {
            return Err(Error::CircularReference(file));
        }
        if run.expanded.contains(&file) {
            run.log
                .debug(&format!("{} already merged for {:?}", file.display(), stub.id));
            return Ok(());
        }

        let read = codec::read_file(&file, self.options.version, self.options.format)?;
        if read.has_errors() {
            return Err(Error::Parse {
                path: file,
                diagnostics: read.diagnostics,
            });
        }
        for diagnostic in &read.diagnostics {
            run.log.warn(format!("{}: {diagnostic}", file.display()));
        }
        let fragment = read.document;
        if !fragment.components.is_empty() {
            run.log.warn(format!(
                "{}: components in a path fragment are ignored",
                file.display()
            ));
        }
        if fragment.paths.is_empty() {
            run.log
                .warn(format!("{}: path fragment holds no paths", file.display()));
        }

        run.log.debug(&format!(
            "Loaded {} path(s) for {:?} from {}",
            fragment.paths.len(),
            stub.id,
            file.display()
        ));
        run.loaded.push(file.clone());
        let fragment_dir = file.parent().unwrap_or(run.base_dir).to_path_buf();
        run.chain.push(file.clone());
        for (key, entry) in fragment.paths {
            match entry {
                PathEntry::Stub(inner) => self.load_paths(&inner, &fragment_dir, out, run)?,
                item @ PathEntry::Item(_) => self.merge_path(out, &key, item, &file, run)?,
            }
        }
        run.chain.pop();
        run.expanded.insert(file);
        Ok(())
    }

    fn merge_path(
        &self,
        out: &mut IndexMap<String, PathEntry>,
        key: &str,
        entry: PathEntry,
        source: &Path,
        run: &mut Run<'_>,
    ) -> Result<()> {
        if out.contains_key(key) {
            self.on_duplicate(ComponentKind::Path, key, source, run)?;
        }
        out.insert(key.to_string(), entry);
        Ok(())
    }

    /// Scan the directory of one component family and merge its files.
    fn load_family(
        &self,
        kind: ComponentKind,
        components: &mut Components,
        run: &mut Run<'_>,
    ) -> Result<()> {
        let dir = run.base_dir.join(registry::directory_for(kind)?);
        if !kind.supported_in(self.options.version) {
            if dir.is_dir() {
                run.log.warn(format!(
                    "{} ignored: OpenAPI {} has no {kind} section",
                    dir.display(),
                    self.options.version
                ));
            }
            return Ok(());
        }
        if !dir.is_dir() {
            run.log.debug(&format!("No {kind} directory, nothing to load"));
            return Ok(());
        }

        let files = fsutil::list_files_with_extension(&dir, self.options.format.extension())?;
        let other = match self.options.format {
            Format::Json => Format::Yaml,
            Format::Yaml => Format::Json,
        };
        let foreign = fsutil::list_files_with_extension(&dir, other.extension())?.len();
        if foreign > 0 {
            run.log.warn(format!(
                "{}: {foreign} {other} file(s) ignored, only {} files are bundled",
                dir.display(),
                self.options.format
            ));
        }
        let mut count = 0;
        for file in files {
            self.options.cancel.check()?;
            let label = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let read = match codec::read_file(&file, self.options.version, self.options.format) {
                Ok(read) => read,
                Err(err) => {
                    run.log.skip(kind, &label, err);
                    continue;
                }
            };
            if read.has_errors() {
                let err = Error::Parse {
                    path: file,
                    diagnostics: read.diagnostics,
                };
                run.log.skip(kind, &label, err);
                continue;
            }

            let mut fragment = read.document;
            // A file should hold exactly one component of its directory's
            // kind; anything else in it is reported and dropped.
            let found = fragment.components.take_inline(kind)?;
            if found.is_empty() {
                run.log
                    .warn(format!("{}: no inline {kind} found", file.display()));
            }
            if !fragment.components.is_empty() || !fragment.paths.is_empty() {
                run.log.warn(format!(
                    "{}: content other than inline {kind} entries is ignored",
                    file.display()
                ));
            }

            for (name, component) in found {
                if components.family(kind)?.contains_key(&name) {
                    self.on_duplicate(kind, &name, &file, run)?;
                }
                components.insert(name, component);
                count += 1;
            }
            run.loaded.push(file);
        }
        run.log.info(&format!("Loaded {count} {kind} item(s)"));
        Ok(())
    }

    fn on_duplicate(
        &self,
        kind: ComponentKind,
        key: &str,
        source: &Path,
        run: &mut Run<'_>,
    ) -> Result<()> {
        match self.options.on_duplicate {
            DuplicatePolicy::Fail => Err(Error::DuplicateComponentKey {
                kind,
                key: key.to_string(),
                path: source.to_path_buf(),
            }),
            DuplicatePolicy::LastWins => {
                run.log.warn(format!(
                    "duplicate {kind} {key:?}: {} replaces the earlier definition",
                    source.display()
                ));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_locate_root_prefers_root_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.yaml"), "openapi: 3.0.0\n").unwrap();
        fs::write(dir.path().join("root.yaml"), "openapi: 3.0.0\n").unwrap();
        assert_eq!(
            locate_root(dir.path(), Format::Yaml).unwrap(),
            dir.path().join("root.yaml")
        );
    }

    #[test]
    fn test_locate_root_falls_back_to_first_document() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        assert_eq!(
            locate_root(dir.path(), Format::Yaml).unwrap(),
            dir.path().join("a.json")
        );
    }

    #[test]
    fn test_locate_root_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate_root(&dir.path().join("nope"), Format::Yaml).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = locate_root(dir.path(), Format::Yaml).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_files_of_the_other_format_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("schemas")).unwrap();
        fs::write(
            dir.path().join("schemas").join("Pet.json"),
            r#"{"components": {"schemas": {"Pet": {"type": "object"}}}}"#,
        )
        .unwrap();
        let outcome = bundle(&Document::default(), dir.path(), SpecVersion::V3_0, Format::Yaml).unwrap();
        assert!(outcome.document.components.schemas.is_empty());
        assert_eq!(outcome.report.warnings.len(), 1);
        assert!(outcome.report.warnings[0].contains("ignored"));
    }

    #[test]
    fn test_path_stub_of_wrong_kind() {
        let dir = tempfile::tempdir().unwrap();
        let mut root = Document::default();
        root.paths.insert(
            "/pets".into(),
            PathEntry::Stub(ReferenceStub::new("/pets", ComponentKind::Schema, "schemas/Pet.yaml")),
        );
        let err = bundle(&root, dir.path(), SpecVersion::V3_0, Format::Yaml).unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind { .. }));
    }

    #[test]
    fn test_missing_path_fragment_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut root = Document::default();
        root.paths.insert(
            "/pets".into(),
            PathEntry::Stub(ReferenceStub::new("/pets", ComponentKind::Path, "paths/pets.yaml")),
        );
        let err = bundle(&root, dir.path(), SpecVersion::V3_0, Format::Yaml).unwrap_err();
        match err {
            Error::NotFound(path) => assert!(path.ends_with("paths/pets.yaml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
