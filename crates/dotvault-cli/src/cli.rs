//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// dotvault - Keep SSH keys, credentials and dotfiles in sync with a secret vault
#[derive(Parser, Debug)]
#[command(name = "dotvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to ~/.config/dotvault/config.toml)
    #[arg(long, global = true, env = "DOTVAULT_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Vault backend to use, overriding the settings file
    #[arg(long, global = true, env = "DOTVAULT_BACKEND", value_name = "NAME")]
    pub backend: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Synchronize items in whichever direction changed
    ///
    /// Each item is compared against the checksum recorded at the last sync.
    /// Items changed on both sides are reported as conflicts and left alone
    /// unless a force flag picks a side.
    ///
    /// Examples:
    ///   dotvault sync                  # Sync the default item set
    ///   dotvault sync Git-Config       # Sync one item
    ///   dotvault sync --all --dry-run  # Preview every item
    ///   dotvault sync -l               # Local wins every conflict
    ///   dotvault sync -v               # Vault wins every conflict
    Sync {
        /// Items to sync (defaults to the manifest's syncable items)
        items: Vec<String>,

        /// Preview changes without applying them
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Push local content for every item, overriding the vault
        #[arg(short = 'l', long, conflicts_with = "force_vault")]
        force_local: bool,

        /// Pull vault content for every item, overriding local files
        #[arg(short = 'v', long)]
        force_vault: bool,

        /// Sync every item in the manifest
        #[arg(short, long, conflicts_with = "items")]
        all: bool,
    },

    /// Vault maintenance commands
    Vault {
        /// Vault action to perform
        #[command(subcommand)]
        action: VaultAction,
    },

    /// Generate shell completions
    ///
    /// Outputs completion script for your shell.
    ///
    /// Examples:
    ///   dotvault completions bash > ~/.local/share/bash-completion/completions/dotvault
    ///   dotvault completions zsh > ~/.zfunc/_dotvault
    ///   dotvault completions fish > ~/.config/fish/completions/dotvault.fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Vault subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum VaultAction {
    /// Pull every manifest item from the vault
    ///
    /// Refuses to run when a local file changed since the last sync.
    Restore {
        /// Overwrite local changes that were never synced
        #[arg(short, long)]
        force: bool,

        /// Preview changes without applying them
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Push local items to the vault
    ///
    /// Refuses to run when a vault entry changed since the last sync.
    Push {
        /// Items to push (defaults to the manifest's syncable items)
        items: Vec<String>,

        /// Overwrite vault changes that were never synced
        #[arg(short, long)]
        force: bool,

        /// Preview changes without applying them
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Push every item in the manifest
        #[arg(short, long, conflicts_with = "items")]
        all: bool,
    },

    /// Check local files for drift since the last sync (no vault access)
    Check,

    /// Validate the manifest without touching anything
    Validate,

    /// Show backend, last sync times, and per-item baselines
    Status,
}
