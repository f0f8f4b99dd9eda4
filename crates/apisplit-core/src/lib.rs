//! Split a single-file OpenAPI document into a directory of fragment files
//! and bundle such a directory back into one document.

pub mod bundle;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod fsutil;
pub mod model;
pub mod naming;
pub mod oplog;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod split;

pub use bundle::{BundleOptions, Bundler, DuplicatePolicy, bundle, locate_root};
pub use codec::{Diagnostic, ReadResult, Severity};
pub use error::{Error, Result};
pub use format::{Format, SpecVersion};
pub use model::{Component, Components, Document, PathEntry, ReferenceStub, Referenced};
pub use oplog::CancelFlag;
pub use registry::ComponentKind;
pub use report::{BundleOutcome, BundleReport, Report, SplitReport, Status, WrittenFile};
pub use split::{SplitOptions, Splitter, split};
