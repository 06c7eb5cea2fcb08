//! Core domain types and traits for the deckhand deploy step.
//!
//! This crate contains:
//! - The error taxonomy shared by every stage
//! - A typed command builder and the command runner trait
//! - Deployer trait and release spec types (Helm)
//! - Release tracker trait (Sentry)
//! - Notifier trait and deployment outcome types (Slack)
//! - Source-control context of the triggering workflow run

pub mod command;
pub mod context;
pub mod deployer;
pub mod error;
pub mod notifier;
pub mod release;

pub use context::GitContext;
pub use error::{Error, Result};
