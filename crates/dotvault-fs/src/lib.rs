//! Filesystem primitives for dotvault
//!
//! Provides home-relative path expansion, the canonical content checksum,
//! and atomic writes that apply a permission mode before the file becomes
//! visible at its final path.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{checksum_or_empty, compute_content_checksum};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::{PRIVATE_MODE, PUBLIC_MODE, expand_home, permission_for, validate_path_identifier};
