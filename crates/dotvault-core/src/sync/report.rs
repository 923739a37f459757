//! Per-item outcomes and run summaries

use serde::{Deserialize, Serialize};

/// What happened to one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemAction {
    Pushed,
    Pulled,
    InSync,
    Skipped,
    Conflict,
    Failed,
}

impl ItemAction {
    /// Whether both sides hold the same content after this action
    pub fn is_converged(self) -> bool {
        matches!(self, Self::Pushed | Self::Pulled | Self::InSync)
    }
}

/// Result of processing one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub name: String,
    pub action: ItemAction,
    /// Human-readable detail
    pub message: String,
    /// Checksum of the converged content; set only for converged items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl ItemOutcome {
    fn new(name: &str, action: ItemAction, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            action,
            message: message.into(),
            checksum: None,
        }
    }

    pub fn pushed(name: &str, message: impl Into<String>, checksum: String) -> Self {
        Self::new(name, ItemAction::Pushed, message).with_checksum(checksum)
    }

    pub fn pulled(name: &str, message: impl Into<String>, checksum: String) -> Self {
        Self::new(name, ItemAction::Pulled, message).with_checksum(checksum)
    }

    pub fn in_sync(name: &str, checksum: String) -> Self {
        Self::new(name, ItemAction::InSync, "already in sync").with_checksum(checksum)
    }

    pub fn skipped(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, ItemAction::Skipped, message)
    }

    pub fn conflict(name: &str) -> Self {
        Self::new(
            name,
            ItemAction::Conflict,
            "local and vault both changed since last sync; use --force-local or --force-vault",
        )
    }

    pub fn failed(name: &str, message: impl Into<String>) -> Self {
        Self::new(name, ItemAction::Failed, message)
    }

    fn with_checksum(mut self, checksum: String) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

/// Tally of a sync, restore or push run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub outcomes: Vec<ItemOutcome>,
    pub pushed: usize,
    pub pulled: usize,
    pub in_sync: usize,
    pub conflicts: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Run-level failures after items were processed (e.g. backend sync)
    pub errors: Vec<String>,
    pub dry_run: bool,
    /// Direction was pinned by a force flag
    pub forced: bool,
}

impl SyncSummary {
    pub fn new(dry_run: bool, forced: bool) -> Self {
        Self {
            dry_run,
            forced,
            ..Self::default()
        }
    }

    /// Add an outcome to the tally.
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome.action {
            ItemAction::Pushed => self.pushed += 1,
            ItemAction::Pulled => self.pulled += 1,
            ItemAction::InSync => self.in_sync += 1,
            ItemAction::Skipped => self.skipped += 1,
            ItemAction::Conflict => self.conflicts += 1,
            ItemAction::Failed => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Whether anything was (or, in a dry run, would be) written
    pub fn mutated(&self) -> bool {
        self.pushed + self.pulled > 0
    }

    /// Exit status: failures, run errors, and unforced conflicts are errors.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors.is_empty() && (self.conflicts == 0 || self.forced)
    }
}
