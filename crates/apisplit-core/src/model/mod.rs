//! The shallow document model the split and bundle engines operate on.
//!
//! Only the structure that matters for splitting is typed: the path table,
//! the component families and the reference stubs. Element payloads stay
//! opaque JSON values.

pub mod components;
pub mod document;
pub mod path;
pub mod reference;

pub use components::{Component, Components, Family, Referenced};
pub use document::{Document, Info, Tag};
pub use path::{HTTP_METHODS, PathEntry, PathItem};
pub use reference::ReferenceStub;
