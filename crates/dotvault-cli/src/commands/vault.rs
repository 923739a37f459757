//! Vault subcommand implementations
//!
//! `restore` and `push` pin the sync direction; `check`, `validate` and
//! `status` only read.

use colored::Colorize;

use dotvault_core::{CheckStatus, PushOptions, RestoreOptions, validate_catalog};

use super::context::{Context, runtime};
use super::sync::{dry_run_suffix, report_summary};
use crate::error::{CliError, Result};

/// Run the restore command
///
/// Pulls every manifest item from the vault.
pub fn run_restore(ctx: &Context, force: bool, dry_run: bool) -> Result<()> {
    let engine = ctx.engine()?;
    println!(
        "{} Restoring {} items from vault '{}'{}...",
        "=>".blue().bold(),
        engine.catalog().len(),
        engine.backend_name().cyan(),
        dry_run_suffix(dry_run)
    );

    let summary = runtime()?.block_on(engine.restore(&RestoreOptions { dry_run, force }))?;
    report_summary(&summary, "Restore")
}

/// Run the push command
pub fn run_push(
    ctx: &Context,
    items: Vec<String>,
    force: bool,
    dry_run: bool,
    all: bool,
) -> Result<()> {
    let engine = ctx.engine()?;
    println!(
        "{} Pushing to vault '{}'{}...",
        "=>".blue().bold(),
        engine.backend_name().cyan(),
        dry_run_suffix(dry_run)
    );

    let options = PushOptions {
        dry_run,
        force,
        items,
        all,
    };
    let summary = runtime()?.block_on(engine.push(&options))?;
    report_summary(&summary, "Push")
}

/// Run the check command
///
/// Compares local files to the last-synced baselines without contacting the
/// vault.
pub fn run_check(ctx: &Context) -> Result<()> {
    println!("{} Checking local files for drift...", "=>".blue().bold());

    let engine = ctx.engine()?;
    let report = engine.check()?;

    for name in &report.healthy {
        println!("   {} {}", "=".dimmed(), name.cyan());
    }
    for message in &report.messages {
        println!("   {} {}", "-".dimmed(), message.dimmed());
    }

    match report.status {
        CheckStatus::Healthy => {
            println!("{} All local files match the last sync.", "OK".green().bold());
            return Ok(());
        }
        CheckStatus::Missing | CheckStatus::Drifted => {
            if !report.drifted.is_empty() {
                println!("{} Changed since last sync:", "DRIFTED".red().bold());
                for item in &report.drifted {
                    println!(
                        "   {} {} ({}): {}",
                        "!".red(),
                        item.item.cyan(),
                        item.path.dimmed(),
                        item.description
                    );
                }
            }
            if !report.missing.is_empty() {
                println!("{} Required files missing:", "MISSING".yellow().bold());
                for item in &report.missing {
                    println!(
                        "   {} {} ({}): {}",
                        "-".yellow(),
                        item.item.cyan(),
                        item.path.dimmed(),
                        item.description
                    );
                }
            }
            println!();
            println!("Run {} to reconcile.", "dotvault sync".cyan());
        }
        CheckStatus::Broken => {
            println!("{} Cannot check local state, see messages above.", "BROKEN".red().bold());
        }
    }

    Err(CliError::user(format!("Check failed: {:?}", report.status)))
}

/// Run the validate command
///
/// Parses the manifest and reports every problem found.
pub fn run_validate(ctx: &Context) -> Result<()> {
    let path = &ctx.settings.manifest_path;
    println!(
        "{} Validating manifest {}...",
        "=>".blue().bold(),
        path.display().to_string().cyan()
    );

    let report = validate_catalog(path);

    println!("   vault_items:    {}", report.counts.vault_items);
    println!("   ssh_keys:       {}", report.counts.ssh_keys);
    println!("   syncable_items: {}", report.counts.syncable_items);

    for warning in &report.warnings {
        println!("   {} {}", "WARN".yellow().bold(), warning);
    }
    for error in &report.errors {
        println!("   {} {}", "ERROR".red().bold(), error);
    }

    if report.is_valid() {
        println!("{} Manifest is valid.", "OK".green().bold());
        Ok(())
    } else {
        Err(CliError::user(format!(
            "Manifest has {} error(s)",
            report.errors.len()
        )))
    }
}

/// Run the status command
pub fn run_status(ctx: &Context) -> Result<()> {
    let engine = ctx.engine()?;
    let status = engine.status()?;

    let never = || "never".dimmed().to_string();
    println!("{}       {}", "Backend:".bold(), status.backend.cyan());
    println!("{}     {}", "Last sync:".bold(), status.last_sync.unwrap_or_else(never));
    println!("{}     {}", "Last push:".bold(), status.last_push.unwrap_or_else(never));
    println!("{}     {}", "Last pull:".bold(), status.last_pull.unwrap_or_else(never));
    println!();

    println!("{}", "Items:".bold());
    for item in &status.items {
        let synced = match item.synced_at {
            Some(at) => format!("synced {}", at.format("%Y-%m-%d %H:%M:%S UTC")).green(),
            None => "never synced".yellow(),
        };
        let local = if item.local_present {
            "present".normal()
        } else if item.required {
            "missing".red()
        } else {
            "absent".dimmed()
        };
        print!(
            "   {} [{}] {} ({}, {})",
            item.name.cyan(),
            item.item_type,
            item.path.display(),
            local,
            synced
        );
        if item.backups > 0 {
            print!(" {}", format!("{} backups", item.backups).dimmed());
        }
        println!();
    }

    Ok(())
}
