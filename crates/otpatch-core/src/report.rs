//! Per-run patch results.
//!
//! Non-fatal outcomes (optional signature or property not present) are
//! collected here instead of being raised as errors, so a run can finish and
//! the caller can render everything that happened.

use std::path::PathBuf;

/// Result of applying one signature or property edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Pattern or marker found, bytes rewritten.
    Patched,
    /// The replacement is already in place; buffer untouched.
    AlreadyPatched,
    /// Neither pattern nor marker present in the buffer.
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Signature,
    Property,
}

#[derive(Debug, Clone)]
pub struct ItemReport {
    pub name: String,
    pub kind: ItemKind,
    pub outcome: PatchOutcome,
}

/// Everything a completed (or aborted) run produced.
#[derive(Debug, Clone, Default)]
pub struct PatchReport {
    pub items: Vec<ItemReport>,
    pub warnings: Vec<String>,
    pub backup_path: Option<PathBuf>,
}

impl PatchReport {
    pub fn record(&mut self, name: &str, kind: ItemKind, outcome: PatchOutcome) {
        self.items.push(ItemReport {
            name: name.to_string(),
            kind,
            outcome,
        });
    }

    pub fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Number of items that actually changed bytes.
    pub fn patched_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.outcome == PatchOutcome::Patched)
            .count()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
