use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::model::Document;
use crate::oplog::ItemIssue;
use crate::registry::ComponentKind;

/// Terminal status of a split or bundle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    SuccessWithWarnings,
    Failed,
}

impl Status {
    pub fn of<R: Report>(result: &Result<R>) -> Status {
        match result {
            Ok(report) if report.has_issues() => Status::SuccessWithWarnings,
            Ok(_) => Status::Success,
            Err(_) => Status::Failed,
        }
    }
}

pub trait Report {
    fn skipped(&self) -> &[ItemIssue];
    fn warnings(&self) -> &[String];

    fn has_issues(&self) -> bool {
        !self.skipped().is_empty() || !self.warnings().is_empty()
    }

    fn status(&self) -> Status {
        if self.has_issues() {
            Status::SuccessWithWarnings
        } else {
            Status::Success
        }
    }
}

/// A file written by the splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub kind: ComponentKind,
    pub key: String,
    pub path: PathBuf,
    /// Location recorded in the stub, relative to the output directory.
    pub location: String,
}

#[derive(Debug)]
pub struct SplitReport {
    pub root_file: PathBuf,
    /// The document as written to `root_file`.
    pub skeleton: Document,
    pub written: Vec<WrittenFile>,
    pub skipped: Vec<ItemIssue>,
    pub warnings: Vec<String>,
    /// Families that had nothing to export.
    pub empty_families: Vec<ComponentKind>,
    pub elapsed: Duration,
}

impl Report for SplitReport {
    fn skipped(&self) -> &[ItemIssue] {
        &self.skipped
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[derive(Debug, Default)]
pub struct BundleReport {
    pub loaded_files: Vec<PathBuf>,
    pub skipped: Vec<ItemIssue>,
    pub warnings: Vec<String>,
    pub elapsed: Duration,
}

impl Report for BundleReport {
    fn skipped(&self) -> &[ItemIssue] {
        &self.skipped
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// A bundled document and how it was assembled.
#[derive(Debug)]
pub struct BundleOutcome {
    pub document: Document,
    pub report: BundleReport,
}

impl Report for BundleOutcome {
    fn skipped(&self) -> &[ItemIssue] {
        &self.report.skipped
    }

    fn warnings(&self) -> &[String] {
        &self.report.warnings
    }
}
