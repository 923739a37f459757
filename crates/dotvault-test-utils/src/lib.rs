//! Shared test utilities for the dotvault workspace.
//!
//! This crate provides standardised fixtures so the core and CLI suites set
//! up scratch homes the same way. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`home`]: [`TestHome`] builder for a temporary home directory with a
//!   manifest, settings file, and local vault

pub mod home;

pub use home::TestHome;
