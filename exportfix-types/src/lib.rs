//! Shared types for the exportfix workspace.
//!
//! # Design constraints
//! - The report types are serialized to disk; prefer adding optional fields over
//!   changing semantics.
//! - The error taxonomy is shared by every patcher so the pipeline can surface one
//!   failure kind to the calling build system.

pub mod context;
pub mod error;
pub mod io;
pub mod report;

pub use context::{BuildContext, Platform};
pub use error::{PatchError, PatchErrorKind, PatchResult};

/// Schema identifiers.
pub mod schema {
    pub const EXPORTFIX_REPORT_V1: &str = "exportfix.report.v1";
}
