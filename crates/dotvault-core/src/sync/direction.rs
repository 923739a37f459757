//! Sync direction resolver
//!
//! Decides which side of an item is authoritative by comparing the local and
//! vault checksums against the last-synced baseline. Pure and deterministic.

use dotvault_fs::checksum::checksum_or_empty;
use serde::{Deserialize, Serialize};

/// Which way an item has to move to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Both sides already hold the same content
    InSync,
    /// Local is authoritative; write it to the vault
    Push,
    /// Vault is authoritative; write it locally
    Pull,
    /// Both sides changed; needs a force flag
    Conflict,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::InSync => "in-sync",
            Self::Push => "push",
            Self::Pull => "pull",
            Self::Conflict => "conflict",
        };
        f.write_str(label)
    }
}

/// Operator override pinning every item's direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceDirection {
    /// Local wins (push)
    Local,
    /// Vault wins (pull)
    Vault,
}

impl ForceDirection {
    pub fn direction(self) -> Direction {
        match self {
            Self::Local => Direction::Push,
            Self::Vault => Direction::Pull,
        }
    }
}

/// Resolve from content; absent content hashes to `""`.
///
/// Content is expected in canonical form for its item type.
pub fn resolve(local: Option<&str>, vault: Option<&str>, baseline: &str) -> Direction {
    resolve_checksums(&checksum_or_empty(local), &checksum_or_empty(vault), baseline)
}

/// Resolve from precomputed checksums, `""` meaning absent.
///
/// | baseline | local    | vault    | result   |
/// |----------|----------|----------|----------|
/// | any      | = vault  | = local  | InSync   |
/// | none     | absent   | present  | Pull     |
/// | none     | present  | absent   | Push     |
/// | none     | present  | present  | Conflict |
/// | set      | changed  | same     | Push     |
/// | set      | same     | changed  | Pull     |
/// | set      | changed  | changed  | Conflict |
pub fn resolve_checksums(local: &str, vault: &str, baseline: &str) -> Direction {
    if local == vault {
        return Direction::InSync;
    }

    if baseline.is_empty() {
        return match (local.is_empty(), vault.is_empty()) {
            (true, false) => Direction::Pull,
            (false, true) => Direction::Push,
            _ => Direction::Conflict,
        };
    }

    match (local != baseline, vault != baseline) {
        (true, false) => Direction::Push,
        (false, true) => Direction::Pull,
        (true, true) => Direction::Conflict,
        (false, false) => Direction::InSync,
    }
}
