//! Local drift check types
//!
//! Reports how the local copy of each item compares to its last-synced
//! baseline, without contacting the vault.

use serde::{Deserialize, Serialize};

/// Overall result of a drift check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    /// Every local file matches its baseline
    Healthy,
    /// Some required local files are absent
    Missing,
    /// Some local files changed since the last sync
    Drifted,
    /// A local file or the snapshot could not be read
    Broken,
}

/// An item that has drifted or is missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftItem {
    /// Item name
    pub item: String,
    /// Local path checked
    pub path: String,
    /// Human-readable description of the drift
    pub description: String,
}

impl DriftItem {
    pub fn new(item: &str, path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            item: item.to_string(),
            path: path.into(),
            description: description.into(),
        }
    }
}

/// Report from a drift check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub status: CheckStatus,
    pub drifted: Vec<DriftItem>,
    pub missing: Vec<DriftItem>,
    /// Names of items matching their baseline
    pub healthy: Vec<String>,
    /// Additional notes (never-synced items, read failures)
    pub messages: Vec<String>,
}

impl CheckReport {
    /// Create a healthy check report with no issues
    pub fn healthy() -> Self {
        Self {
            status: CheckStatus::Healthy,
            drifted: Vec::new(),
            missing: Vec::new(),
            healthy: Vec::new(),
            messages: Vec::new(),
        }
    }

    pub fn with_missing(missing: Vec<DriftItem>) -> Self {
        Self {
            status: CheckStatus::Missing,
            missing,
            ..Self::healthy()
        }
    }

    pub fn with_drifted(drifted: Vec<DriftItem>) -> Self {
        Self {
            status: CheckStatus::Drifted,
            drifted,
            ..Self::healthy()
        }
    }

    pub fn broken(message: String) -> Self {
        Self {
            status: CheckStatus::Broken,
            messages: vec![message],
            ..Self::healthy()
        }
    }

    /// Merge two check reports, combining their issues
    ///
    /// The resulting status is the "worst" of the two:
    /// Broken > Drifted > Missing > Healthy
    pub fn merge(mut self, other: CheckReport) -> Self {
        self.drifted.extend(other.drifted);
        self.missing.extend(other.missing);
        self.healthy.extend(other.healthy);
        self.messages.extend(other.messages);

        self.status = match (self.status, other.status) {
            (CheckStatus::Broken, _) | (_, CheckStatus::Broken) => CheckStatus::Broken,
            (CheckStatus::Drifted, _) | (_, CheckStatus::Drifted) => CheckStatus::Drifted,
            (CheckStatus::Missing, _) | (_, CheckStatus::Missing) => CheckStatus::Missing,
            (CheckStatus::Healthy, CheckStatus::Healthy) => CheckStatus::Healthy,
        };

        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == CheckStatus::Healthy
    }
}
