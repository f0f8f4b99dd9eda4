//! Decomposition of one document into a directory of fragment files.
//!
//! Output layout:
//!
//! ```text
//! <out>/root.<ext>
//! <out>/paths/<flattened path>.<ext>
//! <out>/schemas/<name>.<ext>
//! <out>/<family directory>/<name>.<ext>
//! ```
//!
//! Every exported element is replaced in the written root by a
//! [`ReferenceStub`]. Elements that fail to export stay inline and are listed
//! in the report; the run as a whole is best-effort, not atomic.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use indexmap::IndexMap;
use serde::Serialize;

use crate::codec;
use crate::error::Result;
use crate::format::{Format, SpecVersion};
use crate::fsutil::{self, RetryPolicy};
use crate::model::{Components, Document, PathEntry, ReferenceStub, Referenced};
use crate::naming::{self, UsedNames};
use crate::oplog::{CancelFlag, OpLog};
use crate::registry::{self, COMPONENT_FAMILIES, ComponentKind};
use crate::report::{SplitReport, WrittenFile};
use crate::resolver;

/// Stem of the skeleton document written at the top of the output directory.
pub const ROOT_FILE_STEM: &str = "root";

/// File name of the skeleton document for `format`.
pub fn root_file_name(format: Format) -> String {
    format!("{ROOT_FILE_STEM}.{}", format.extension())
}

#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    pub version: SpecVersion,
    pub format: Format,
    pub retry: RetryPolicy,
    pub cancel: CancelFlag,
}

/// Split `document` into `output_dir` with default options.
pub fn split(
    document: &Document,
    output_dir: &Path,
    version: SpecVersion,
    format: Format,
) -> Result<SplitReport> {
    Splitter::new(SplitOptions {
        version,
        format,
        ..SplitOptions::default()
    })
    .split(document, output_dir)
}

pub struct Splitter {
    options: SplitOptions,
}

/// Mutable state of one split run.
struct Run<'a> {
    output_dir: &'a Path,
    log: OpLog,
    written: Vec<WrittenFile>,
    empty_families: Vec<ComponentKind>,
}

impl Splitter {
    pub fn new(options: SplitOptions) -> Self {
        Self { options }
    }

    /// Write every path and component of `document` to its own file under
    /// `output_dir`, then write the skeleton root.
    ///
    /// `document` is not modified; the skeleton is returned in the report.
    /// Must be given a fully inline document, not an already split one.
    pub fn split(&self, document: &Document, output_dir: &Path) -> Result<SplitReport> {
        let started = Instant::now();
        let mut run = Run {
            output_dir,
            log: OpLog::new("apisplit::split"),
            written: Vec::new(),
            empty_families: Vec::new(),
        };
        fsutil::ensure_dir(output_dir)?;

        let paths: Vec<_> = document
            .paths
            .iter()
            .filter_map(|(key, entry)| match entry {
                PathEntry::Item(item) => Some((key, item)),
                PathEntry::Stub(_) => None,
            })
            .collect();
        let mut path_stubs = self.export_family(ComponentKind::Path, &paths, &mut run)?;

        let mut component_stubs = HashMap::new();
        for kind in COMPONENT_FAMILIES {
            let family = document.components.family(kind)?;
            let items: Vec<_> = family
                .iter()
                .filter_map(|(name, entry)| match entry {
                    Referenced::Inline(value) => Some((name, value)),
                    Referenced::Stub(_) => None,
                })
                .collect();
            if !items.is_empty() && !kind.supported_in(self.options.version) {
                run.log.warn(format!(
                    "{} {kind} item(s) left inline: OpenAPI {} has no {kind} section",
                    items.len(),
                    self.options.version
                ));
                continue;
            }
            let stubs = self.export_family(kind, &items, &mut run)?;
            component_stubs.insert(kind, stubs);
        }

        let mut skeleton = Document {
            swagger: document.swagger.clone(),
            openapi: document.openapi.clone(),
            info: document.info.clone(),
            extra: document.extra.clone(),
            tags: document.tags.clone(),
            paths: IndexMap::with_capacity(document.paths.len()),
            components: Components {
                extra: document.components.extra.clone(),
                ..Components::default()
            },
        };
        for (key, entry) in &document.paths {
            let entry = match path_stubs.remove(key) {
                Some(stub) => PathEntry::Stub(stub),
                None => entry.clone(),
            };
            skeleton.paths.insert(key.clone(), entry);
        }
        for kind in COMPONENT_FAMILIES {
            let mut stubs = component_stubs.remove(&kind).unwrap_or_default();
            let target = skeleton.components.family_mut(kind)?;
            for (name, entry) in document.components.family(kind)? {
                let entry = match stubs.remove(name) {
                    Some(stub) => Referenced::Stub(stub),
                    None => entry.clone(),
                };
                target.insert(name.clone(), entry);
            }
        }

        let root_file = output_dir.join(root_file_name(self.options.format));
        let content = codec::serialize_document(&skeleton, self.options.version, self.options.format)?;
        fsutil::write_atomic(&root_file, content.as_bytes(), self.options.retry)?;
        run.log
            .info(&format!("Main document created at {}", root_file.display()));

        let (skipped, warnings) = run.log.finish();
        Ok(SplitReport {
            root_file,
            skeleton,
            written: run.written,
            skipped,
            warnings,
            empty_families: run.empty_families,
            elapsed: started.elapsed(),
        })
    }

    /// Export one family, returning a stub for each item that was written.
    fn export_family<T: Serialize>(
        &self,
        kind: ComponentKind,
        items: &[(&String, &T)],
        run: &mut Run<'_>,
    ) -> Result<HashMap<String, ReferenceStub>> {
        let mut stubs = HashMap::new();
        if items.is_empty() {
            run.log.info(&format!("No {kind} found, nothing exported"));
            run.empty_families.push(kind);
            return Ok(stubs);
        }

        let dir_name = registry::directory_for(kind)?;
        let dir = run.output_dir.join(dir_name);
        fsutil::ensure_dir(&dir)?;
        let mut used = UsedNames::new(dir_name);

        for (key, value) in items {
            self.options.cancel.check()?;
            match self.export_one(kind, key, *value, &dir, &mut used, run) {
                Ok(file) => {
                    stubs.insert(
                        (*key).clone(),
                        ReferenceStub::new(key.as_str(), kind, file.location.as_str()),
                    );
                    run.written.push(file);
                }
                Err(err) => run.log.skip(kind, key, err),
            }
        }

        run.log.info(&format!(
            "Export {kind} finished: {} of {} written",
            stubs.len(),
            items.len()
        ));
        Ok(stubs)
    }

    fn export_one<T: Serialize>(
        &self,
        kind: ComponentKind,
        key: &str,
        value: &T,
        dir: &Path,
        used: &mut UsedNames,
        run: &mut Run<'_>,
    ) -> Result<WrittenFile> {
        let filename = naming::file_name_for(kind, key, self.options.format)?;
        let variant = used.case_variant_of(&filename).map(str::to_string);
        used.claim(&filename, key)?;
        if let Some(other) = variant {
            run.log.warn(format!(
                "{kind} {key:?} is written to {filename}, which differs from the file of {other:?} \
                 only in case; the two merge on case-insensitive file systems"
            ));
        }
        let content =
            codec::serialize_element(key, kind, value, self.options.version, self.options.format)?;
        let path = dir.join(&filename);
        fsutil::write_atomic(&path, content.as_bytes(), self.options.retry)?;
        let location = resolver::relative_path(run.output_dir, &path)?;
        run.log
            .debug(&format!("Exported {kind} {key:?} to {}", path.display()));
        Ok(WrittenFile {
            kind,
            key: key.to_string(),
            path,
            location,
        })
    }
}
