//! SyncEngine implementation
//!
//! A run moves through fixed stages:
//!
//! ```text
//! Validating -> Authenticating -> PerItem{Resolving -> Executing}* -> Aggregating -> Persisting
//! ```
//!
//! Failures before the per-item stage abort the run with no mutation. Inside
//! it every item is independent: a failure or conflict on one item never
//! stops the others. The snapshot is written only once, after every item has
//! been processed.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dotvault_fs::checksum::checksum_or_empty;
use dotvault_fs::compute_content_checksum;

use crate::backend::{Backend, BackendRegistry, Session, SessionCache, with_deadline};
use crate::backup::BackupManager;
use crate::catalog::{Catalog, ItemType, ResolvedItem};
use crate::config::Settings;
use crate::snapshot::ChecksumSnapshot;
use crate::state::{self, JsonStateStore, StateStore};
use crate::transform::canonical_content;
use crate::{Error, Result};

use super::check::{CheckReport, DriftItem};
use super::direction::{Direction, ForceDirection, resolve_checksums};
use super::executor::{Executor, ItemError, read_local};
use super::report::{ItemAction, ItemOutcome, SyncSummary};

/// Options for `sync`
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// If true, resolve and report without writing anything.
    /// Messages are prefixed with "[dry-run] Would ..."
    pub dry_run: bool,
    /// Pin every item's direction, bypassing the resolver
    pub force: Option<ForceDirection>,
    /// Items to sync; empty means the syncable set
    pub items: Vec<String>,
    /// Sync every catalog item
    pub all: bool,
}

/// Options for `vault restore`
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    pub dry_run: bool,
    /// Overwrite local changes that were never synced
    pub force: bool,
}

/// Options for `vault push`
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    pub dry_run: bool,
    /// Overwrite vault changes that were never synced
    pub force: bool,
    /// Items to push; empty means the syncable set
    pub items: Vec<String>,
    /// Push every catalog item
    pub all: bool,
}

/// Per-item line of `vault status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStatus {
    pub name: String,
    pub item_type: ItemType,
    pub path: PathBuf,
    pub required: bool,
    pub local_present: bool,
    /// When the baseline was recorded; `None` if never synced
    pub synced_at: Option<DateTime<Utc>>,
    /// Number of backups taken for this item
    pub backups: usize,
}

/// Result of `vault status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub backend: String,
    pub last_push: Option<String>,
    pub last_pull: Option<String>,
    pub last_sync: Option<String>,
    pub items: Vec<ItemStatus>,
}

#[derive(Debug, Clone, Copy)]
enum Plan {
    /// Let the resolver decide, unless forced
    Resolve(Option<ForceDirection>),
    /// Every item moves this way
    Pinned(Direction),
}

/// What was found on both sides of one item
struct Observation<'i> {
    item: &'i ResolvedItem,
    /// Canonical local content
    local: std::result::Result<Option<String>, ItemError>,
    /// Raw vault note
    notes: std::result::Result<Option<String>, ItemError>,
}

/// Engine for synchronizing local files with a vault
///
/// The SyncEngine provides these operations:
/// - **sync**: resolve each item's direction and apply it
/// - **restore**: pull every catalog item from the vault
/// - **push**: write local items to the vault
/// - **check**: compare local files to their baselines without the vault
/// - **status**: report timestamps and baselines
pub struct SyncEngine {
    settings: Settings,
    catalog: Catalog,
    backend: Arc<dyn Backend>,
    state: Arc<dyn StateStore>,
    backups: BackupManager,
}

impl SyncEngine {
    pub fn new(
        settings: Settings,
        catalog: Catalog,
        backend: Arc<dyn Backend>,
        state: Arc<dyn StateStore>,
    ) -> Self {
        let backups = BackupManager::new(settings.backups_dir());
        Self {
            settings,
            catalog,
            backend,
            state,
            backups,
        }
    }

    /// Load the manifest, construct the configured backend, and open the
    /// state file, all from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or invalid, or if the
    /// backend name is not registered.
    pub fn from_settings(settings: Settings, registry: &BackendRegistry) -> Result<Self> {
        let catalog = Catalog::load(&settings.manifest_path)?;
        let backend: Arc<dyn Backend> = Arc::from(registry.create(&settings)?);
        let state = Arc::new(JsonStateStore::new(settings.state_path()));
        Ok(Self::new(settings, catalog, backend, state))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Resolve and apply each selected item.
    pub async fn sync(&self, options: &SyncOptions) -> Result<SyncSummary> {
        let items = self.select(&options.items, options.all)?;
        self.run(
            &items,
            Plan::Resolve(options.force),
            options.dry_run,
            options.force.is_some(),
        )
        .await
    }

    /// Pull every catalog item from the vault.
    ///
    /// # Errors
    ///
    /// `Error::UnsyncedLocalChanges` when a local file differs from its
    /// baseline and `force` is not set. Nothing is written in that case.
    pub async fn restore(&self, options: &RestoreOptions) -> Result<SyncSummary> {
        let items = self.select(&[], true)?;
        self.run(
            &items,
            Plan::Pinned(Direction::Pull),
            options.dry_run,
            options.force,
        )
        .await
    }

    /// Push the selected items to the vault.
    ///
    /// # Errors
    ///
    /// `Error::UnsyncedVaultChanges` when a vault entry differs from both its
    /// baseline and the local content and `force` is not set.
    pub async fn push(&self, options: &PushOptions) -> Result<SyncSummary> {
        let items = self.select(&options.items, options.all)?;
        self.run(
            &items,
            Plan::Pinned(Direction::Push),
            options.dry_run,
            options.force,
        )
        .await
    }

    /// Compare local files to their baselines. Never contacts the vault.
    pub fn check(&self) -> Result<CheckReport> {
        let snapshot = match ChecksumSnapshot::load(&self.settings.snapshot_path()) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                return Ok(CheckReport::broken(format!(
                    "Failed to load checksum snapshot: {}",
                    e
                )));
            }
        };

        let mut report = CheckReport::healthy();
        for item in self.resolve_all() {
            let name = item.name();
            let path = item.path.display().to_string();
            let baseline = snapshot.baseline(name);

            let entry = match read_local(&item) {
                Err(e) => CheckReport::broken(format!("{}: cannot read {}: {}", name, path, e)),
                Ok(None) if item.required() => CheckReport::with_missing(vec![DriftItem::new(
                    name,
                    path,
                    "Required file not found",
                )]),
                Ok(None) => {
                    let mut entry = CheckReport::healthy();
                    entry.messages.push(format!("{}: optional file not present", name));
                    entry
                }
                Ok(Some(_)) if baseline.is_empty() => {
                    let mut entry = CheckReport::healthy();
                    entry.messages.push(format!("{}: never synced", name));
                    entry
                }
                Ok(Some(content)) => {
                    let actual = compute_content_checksum(&content);
                    if actual == baseline {
                        let mut entry = CheckReport::healthy();
                        entry.healthy.push(name.to_string());
                        entry
                    } else {
                        CheckReport::with_drifted(vec![DriftItem::new(
                            name,
                            path,
                            "Changed since last sync",
                        )])
                    }
                }
            };
            report = report.merge(entry);
        }

        tracing::debug!(status = ?report.status, "check complete");
        Ok(report)
    }

    /// Backend, timestamps, and per-item baselines.
    pub fn status(&self) -> Result<StatusReport> {
        let snapshot = ChecksumSnapshot::load(&self.settings.snapshot_path())?;

        let mut items = Vec::new();
        for item in self.resolve_all() {
            let backups = self
                .backups
                .get_backup(item.name())?
                .map_or(0, |backup| backup.metadata.entries.len());
            items.push(ItemStatus {
                name: item.name().to_string(),
                item_type: item.item_type(),
                local_present: item.path.exists(),
                synced_at: snapshot.get(item.name()).map(|entry| entry.synced_at),
                required: item.required(),
                path: item.path,
                backups,
            });
        }

        Ok(StatusReport {
            backend: self.backend.name().to_string(),
            last_push: self.state.get(state::LAST_PUSH)?,
            last_pull: self.state.get(state::LAST_PULL)?,
            last_sync: self.state.get(state::LAST_SYNC)?,
            items,
        })
    }

    fn resolve_all(&self) -> Vec<ResolvedItem> {
        self.catalog
            .items()
            .map(|spec| spec.resolve(&self.settings.home))
            .collect()
    }

    fn select(&self, names: &[String], all: bool) -> Result<Vec<ResolvedItem>> {
        let specs = if all {
            self.catalog.items().collect()
        } else if names.is_empty() {
            self.catalog.syncable()
        } else {
            self.catalog.select(names)?
        };
        Ok(specs
            .into_iter()
            .map(|spec| spec.resolve(&self.settings.home))
            .collect())
    }

    async fn run(
        &self,
        items: &[ResolvedItem],
        plan: Plan,
        dry_run: bool,
        force: bool,
    ) -> Result<SyncSummary> {
        tracing::debug!(items = items.len(), ?plan, dry_run, force, "validating");
        let snapshot = ChecksumSnapshot::load(&self.settings.snapshot_path())?;

        if matches!(plan, Plan::Pinned(Direction::Pull)) && !force {
            let unsynced = unsynced_local_changes(items, &snapshot);
            if !unsynced.is_empty() {
                return Err(Error::UnsyncedLocalChanges { items: unsynced });
            }
        }

        tracing::debug!(backend = self.backend.name(), "authenticating");
        let session = self.open_session(dry_run).await?;

        let result = self
            .run_items(items, plan, snapshot, &session, dry_run, force)
            .await;

        let closed = with_deadline("close", self.settings.timeouts.item, self.backend.close()).await;
        if let Err(e) = closed {
            tracing::warn!(error = %e, "failed to close backend");
        }
        result
    }

    async fn open_session(&self, dry_run: bool) -> Result<Session> {
        let timeout = self.settings.timeouts.auth;
        let auth_error = |e: crate::backend::BackendError| Error::Auth {
            backend: self.backend.name().to_string(),
            reason: e.to_string(),
        };

        with_deadline("init", timeout, self.backend.init())
            .await
            .map_err(auth_error)?;

        let cache = SessionCache::new(self.settings.session_path());
        if let Some(session) = cache.load(self.backend.name())
            && self.still_authenticated(timeout).await
        {
            tracing::debug!("reusing cached session");
            return Ok(session);
        }

        let session = with_deadline("authenticate", timeout, self.backend.authenticate())
            .await
            .map_err(auth_error)?;

        if !dry_run && let Err(e) = cache.store(&session) {
            tracing::warn!(error = %e, "failed to cache session");
        }
        Ok(session)
    }

    /// A stalled `is_authenticated` counts as logged out.
    async fn still_authenticated(&self, timeout: std::time::Duration) -> bool {
        with_deadline("is_authenticated", timeout, async {
            Ok(self.backend.is_authenticated().await)
        })
        .await
        .unwrap_or(false)
    }

    async fn run_items(
        &self,
        items: &[ResolvedItem],
        plan: Plan,
        snapshot: ChecksumSnapshot,
        session: &Session,
        dry_run: bool,
        force: bool,
    ) -> Result<SyncSummary> {
        let executor = Executor::new(
            self.backend.as_ref(),
            session,
            self.settings.timeouts,
            &self.backups,
            dry_run,
        );

        let mut observations = Vec::with_capacity(items.len());
        for item in items {
            tracing::debug!(item = item.name(), "resolving");
            observations.push(Observation {
                item,
                local: read_local(item),
                notes: executor.fetch(item.name()).await,
            });
        }

        if matches!(plan, Plan::Pinned(Direction::Push)) && !force {
            let unsynced = unsynced_vault_changes(&observations, &snapshot);
            if !unsynced.is_empty() {
                return Err(Error::UnsyncedVaultChanges { items: unsynced });
            }
        }

        let mut summary = SyncSummary::new(dry_run, force);
        for observation in &observations {
            tracing::debug!(item = observation.item.name(), "executing");
            let outcome = execute(&executor, observation, plan, &snapshot, dry_run).await;
            match outcome.action {
                ItemAction::Failed => {
                    tracing::warn!(item = %outcome.name, message = %outcome.message, "item failed")
                }
                ItemAction::Conflict => {
                    tracing::warn!(item = %outcome.name, "item in conflict")
                }
                _ => tracing::debug!(item = %outcome.name, action = ?outcome.action, "item done"),
            }
            summary.record(outcome);
        }

        tracing::debug!(
            pushed = summary.pushed,
            pulled = summary.pulled,
            in_sync = summary.in_sync,
            conflicts = summary.conflicts,
            skipped = summary.skipped,
            failed = summary.failed,
            "aggregating"
        );

        if dry_run || !summary.mutated() {
            return Ok(summary);
        }

        if summary.pushed > 0
            && let Err(e) = with_deadline(
                "sync",
                self.settings.timeouts.sync,
                self.backend.sync(session),
            )
            .await
        {
            tracing::warn!(error = %e, "backend sync failed");
            summary.errors.push(format!("Backend sync failed: {}", e));
        }

        tracing::debug!("persisting");
        if let Err(e) = self.persist(items, &summary, snapshot) {
            tracing::warn!(error = %e, "failed to persist sync state");
            summary.errors.push(format!("Failed to persist sync state: {}", e));
        }
        Ok(summary)
    }

    fn persist(
        &self,
        items: &[ResolvedItem],
        summary: &SyncSummary,
        mut snapshot: ChecksumSnapshot,
    ) -> Result<()> {
        let now = Utc::now();
        for (item, outcome) in items.iter().zip(&summary.outcomes) {
            if outcome.action.is_converged()
                && let Some(checksum) = &outcome.checksum
            {
                snapshot.record(item.name(), checksum.as_str(), &item.path, now);
            }
        }
        snapshot.timestamp = now;
        snapshot.save(&self.settings.snapshot_path())?;

        let stamp = now.to_rfc3339();
        if summary.pushed > 0 {
            self.state.set(state::LAST_PUSH, &stamp)?;
        }
        if summary.pulled > 0 {
            self.state.set(state::LAST_PULL, &stamp)?;
        }
        self.state.set(state::LAST_SYNC, &stamp)?;
        self.state.set(state::BACKEND, self.backend.name())?;

        tracing::info!(items = snapshot.len(), "saved checksum snapshot");
        Ok(())
    }
}

/// Items whose local file changed since the baseline (restore guard).
fn unsynced_local_changes(items: &[ResolvedItem], snapshot: &ChecksumSnapshot) -> Vec<String> {
    items
        .iter()
        .filter(|item| {
            let baseline = snapshot.baseline(item.name());
            !baseline.is_empty()
                && matches!(
                    read_local(item),
                    Ok(Some(content)) if compute_content_checksum(&content) != baseline
                )
        })
        .map(|item| item.name().to_string())
        .collect()
}

/// Items whose vault entry differs from both baseline and local (push guard).
fn unsynced_vault_changes(observations: &[Observation<'_>], snapshot: &ChecksumSnapshot) -> Vec<String> {
    observations
        .iter()
        .filter(|observation| {
            let Ok(Some(notes)) = &observation.notes else {
                return false;
            };
            let vault = compute_content_checksum(&canonical_content(
                observation.item.item_type(),
                notes,
            ));
            let local = match &observation.local {
                Ok(local) => checksum_or_empty(local.as_deref()),
                Err(_) => String::new(),
            };
            vault != snapshot.baseline(observation.item.name()) && vault != local
        })
        .map(|observation| observation.item.name().to_string())
        .collect()
}

/// Outcome for an item missing on the side it would be copied from.
fn absent(item: &ResolvedItem, message: &str) -> ItemOutcome {
    if item.required() {
        ItemOutcome::failed(item.name(), format!("Required item {}", message))
    } else {
        ItemOutcome::skipped(item.name(), format!("Optional item {}", message))
    }
}

async fn execute(
    executor: &Executor<'_>,
    observation: &Observation<'_>,
    plan: Plan,
    snapshot: &ChecksumSnapshot,
    dry_run: bool,
) -> ItemOutcome {
    let item = observation.item;
    let name = item.name();

    let local = match &observation.local {
        Ok(local) => local.as_deref(),
        Err(e) => return ItemOutcome::failed(name, format!("Cannot read local file: {}", e)),
    };
    let notes = match &observation.notes {
        Ok(notes) => notes.as_deref(),
        Err(e) => return ItemOutcome::failed(name, format!("Vault lookup failed: {}", e)),
    };

    if local.is_none() && notes.is_none() {
        return absent(item, "is missing locally and in the vault");
    }

    let vault = notes.map(|notes| canonical_content(item.item_type(), notes));
    let local_checksum = checksum_or_empty(local);
    let vault_checksum = checksum_or_empty(vault.as_deref());
    if local_checksum == vault_checksum {
        return ItemOutcome::in_sync(name, local_checksum);
    }

    let direction = match plan {
        Plan::Resolve(Some(force)) => force.direction(),
        Plan::Resolve(None) => {
            resolve_checksums(&local_checksum, &vault_checksum, snapshot.baseline(name))
        }
        Plan::Pinned(direction) => direction,
    };
    tracing::debug!(item = name, %direction, "resolved");

    match direction {
        Direction::InSync => ItemOutcome::in_sync(name, local_checksum),
        Direction::Conflict => ItemOutcome::conflict(name),
        Direction::Push => {
            let Some(content) = local else {
                return absent(item, "not found locally");
            };
            match executor.push(item, content, notes.is_some()).await {
                Ok(checksum) if dry_run => {
                    ItemOutcome::pushed(name, "[dry-run] Would push to vault", checksum)
                }
                Ok(checksum) => ItemOutcome::pushed(name, "Pushed to vault", checksum),
                Err(e) => ItemOutcome::failed(name, format!("Push failed: {}", e)),
            }
        }
        Direction::Pull => {
            let Some(notes) = notes else {
                return absent(item, "not found in vault");
            };
            match executor.pull(item, notes) {
                Ok(checksum) if dry_run => ItemOutcome::pulled(
                    name,
                    format!("[dry-run] Would write {}", item.path.display()),
                    checksum,
                ),
                Ok(checksum) => {
                    ItemOutcome::pulled(name, format!("Wrote {}", item.path.display()), checksum)
                }
                Err(e) => ItemOutcome::failed(name, format!("Pull failed: {}", e)),
            }
        }
    }
}
