//! Command implementations for dotvault-cli

pub mod context;
pub mod sync;
pub mod vault;

pub use context::Context;
pub use sync::run_sync;
pub use vault::{run_check, run_push, run_restore, run_status, run_validate};
