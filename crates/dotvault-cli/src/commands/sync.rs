//! Sync command implementation and shared summary output

use colored::Colorize;

use dotvault_core::{ForceDirection, ItemAction, SyncOptions, SyncSummary};

use super::context::{Context, runtime};
use crate::error::{CliError, Result};

/// Run the sync command
///
/// Resolves each item's direction against the last-synced baseline and
/// applies it.
pub fn run_sync(
    ctx: &Context,
    items: Vec<String>,
    dry_run: bool,
    force: Option<ForceDirection>,
    all: bool,
) -> Result<()> {
    let engine = ctx.engine()?;
    println!(
        "{} Synchronizing with vault '{}'{}...",
        "=>".blue().bold(),
        engine.backend_name().cyan(),
        dry_run_suffix(dry_run)
    );

    let options = SyncOptions {
        dry_run,
        force,
        items,
        all,
    };
    let summary = runtime()?.block_on(engine.sync(&options))?;
    report_summary(&summary, "Synchronization")
}

pub(crate) fn dry_run_suffix(dry_run: bool) -> String {
    if dry_run {
        format!(" {}", "(dry run)".yellow())
    } else {
        String::new()
    }
}

/// Print one line per item and the tally; fail if the run did not succeed.
pub(crate) fn report_summary(summary: &SyncSummary, label: &str) -> Result<()> {
    for outcome in &summary.outcomes {
        let marker = match outcome.action {
            ItemAction::Pushed => "^".green(),
            ItemAction::Pulled => "v".green(),
            ItemAction::InSync => "=".dimmed(),
            ItemAction::Skipped => "-".yellow(),
            ItemAction::Conflict => "!".red(),
            ItemAction::Failed => "x".red(),
        };
        let message = match outcome.action {
            ItemAction::InSync => outcome.message.dimmed(),
            ItemAction::Conflict | ItemAction::Failed => outcome.message.red(),
            _ => outcome.message.normal(),
        };
        println!("   {} {}: {}", marker, outcome.name.cyan(), message);
    }
    for error in &summary.errors {
        println!("   {} {}", "x".red(), error.red());
    }

    let tally = format!(
        "{} pushed, {} pulled, {} in sync, {} skipped, {} conflicts, {} failed",
        summary.pushed,
        summary.pulled,
        summary.in_sync,
        summary.skipped,
        summary.conflicts,
        summary.failed
    );
    println!();

    if summary.is_success() {
        println!("{} {} complete: {}", "OK".green().bold(), label, tally);
        return Ok(());
    }

    println!("{} {} incomplete: {}", "ERROR".red().bold(), label, tally);
    if summary.conflicts > 0 && !summary.forced {
        println!(
            "Resolve conflicts with {} or {}.",
            "dotvault sync --force-local".cyan(),
            "dotvault sync --force-vault".cyan()
        );
    }
    Err(CliError::user(format!(
        "{} did not complete ({} failed, {} conflicts)",
        label, summary.failed, summary.conflicts
    )))
}
