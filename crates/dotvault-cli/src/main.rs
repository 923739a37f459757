//! dotvault CLI
//!
//! Keeps local secret artifacts consistent with entries in a vault backend.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, VaultAction};
use commands::Context;
use dotvault_core::ForceDirection;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "dotvault", &mut std::io::stdout());
            Ok(())
        }
        Some(cmd) => {
            let ctx = Context::load(cli.config.as_deref(), cli.backend.as_deref())?;
            execute_command(&ctx, cmd)
        }
        None => {
            println!("{} Vault sync for dotfiles and secrets", "dotvault".green().bold());
            println!();
            println!("Run {} for available commands.", "dotvault --help".cyan());
            Ok(())
        }
    }
}

/// `RUST_LOG` filter on stderr; `--verbose` raises everything to DEBUG.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_ok() {
        tracing::debug!("Verbose mode enabled");
    }
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Sync {
            items,
            dry_run,
            force_local,
            force_vault,
            all,
        } => {
            let force = match (force_local, force_vault) {
                (true, _) => Some(ForceDirection::Local),
                (_, true) => Some(ForceDirection::Vault),
                _ => None,
            };
            commands::run_sync(ctx, items, dry_run, force, all)
        }
        Commands::Vault { action } => match action {
            VaultAction::Restore { force, dry_run } => commands::run_restore(ctx, force, dry_run),
            VaultAction::Push {
                items,
                force,
                dry_run,
                all,
            } => commands::run_push(ctx, items, force, dry_run, all),
            VaultAction::Check => commands::run_check(ctx),
            VaultAction::Validate => commands::run_validate(ctx),
            VaultAction::Status => commands::run_status(ctx),
        },
        Commands::Completions { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_user_displays_message() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn core_errors_pass_through() {
        let error: crate::error::CliError = dotvault_core::Error::UnknownItem {
            name: "Nope".to_string(),
        }
        .into();
        assert_eq!(error.to_string(), "Unknown item 'Nope'");
    }
}
