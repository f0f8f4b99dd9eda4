use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::registry::ComponentKind;

/// An element that was left out of a split or bundle, and why.
#[derive(Debug)]
pub struct ItemIssue {
    pub kind: ComponentKind,
    pub key: String,
    pub error: Error,
}

/// Log handle owned by one split or bundle run.
///
/// Messages go to the `log` facade under the run's target; skipped items and
/// warnings are also kept so they can be handed back in the report.
#[derive(Debug)]
pub struct OpLog {
    target: &'static str,
    skipped: Vec<ItemIssue>,
    warnings: Vec<String>,
}

impl OpLog {
    pub fn new(target: &'static str) -> Self {
        Self {
            target,
            skipped: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn info(&self, message: &str) {
        info!(target: self.target, "{message}");
    }

    pub fn debug(&self, message: &str) {
        debug!(target: self.target, "{message}");
    }

    pub fn warn(&mut self, message: String) {
        warn!(target: self.target, "{message}");
        self.warnings.push(message);
    }

    /// Record an element that could not be processed.
    pub fn skip(&mut self, kind: ComponentKind, key: &str, error: Error) {
        warn!(target: self.target, "skipped {kind} {key:?}: {error}");
        self.skipped.push(ItemIssue {
            kind,
            key: key.to_string(),
            error,
        });
    }

    pub fn finish(self) -> (Vec<ItemIssue>, Vec<String>) {
        (self.skipped, self.warnings)
    }
}

/// Cooperative cancellation shared between a caller and a running operation.
///
/// Checked between items, never in the middle of writing one.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_is_recorded() {
        let mut log = OpLog::new("apisplit::test");
        log.skip(ComponentKind::Schema, "Pet", Error::InvalidKey("Pet".into()));
        log.warn("odd file".to_string());
        let (skipped, warnings) = log.finish();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].key, "Pet");
        assert_eq!(warnings, vec!["odd file".to_string()]);
    }

    #[test]
    fn test_cancel_is_shared() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(flag.check().is_ok());
        other.cancel();
        assert!(matches!(flag.check(), Err(Error::Cancelled)));
    }
}
