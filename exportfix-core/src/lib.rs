//! Embeddable core library for exportfix.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for calling from a
//! build hook or another host process.
//!
//! # Port traits
//!
//! All I/O the pipeline performs on behalf of the caller goes through [`ports`]:
//! - [`SceneSource`](ports::SceneSource) supplies the enabled scene list
//! - [`WritePort`](ports::WritePort) writes documents, backups and asset copies
//!
//! The [`adapters`] module provides filesystem-backed and in-memory implementations.
//!
//! # Entry points
//!
//! - [`on_post_export`](dispatch::on_post_export) runs the gated patch routine
//! - [`on_pre_export`](dispatch::on_pre_export) is the (no-op) pre-export hook

pub mod adapters;
pub mod dispatch;
pub mod gate;
pub mod pipeline;
pub mod ports;
pub mod scenes;
pub mod settings;

pub use dispatch::{HookInvocation, InvocationSource, on_post_export, on_pre_export};
pub use pipeline::PostExportOutcome;
pub use settings::{DirCopy, PostExportSettings};

// Re-export so embedders don't need the patcher crates directly.
pub use exportfix_pbx::ProjectEdit;
pub use exportfix_types::{BuildContext, PatchError, PatchErrorKind, Platform};
