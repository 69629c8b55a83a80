//! Clap-free settings for the post-export pipeline.

use camino::Utf8PathBuf;
use exportfix_pbx::ProjectEdit;
use serde::{Deserialize, Serialize};

/// Export-relative location of the shared scheme.
pub const SCHEME_PATH: &str = "Unity-iPhone.xcodeproj/xcshareddata/xcschemes/Unity-iPhone.xcscheme";

/// Export-relative location of the project descriptor.
pub const PROJECT_PATH: &str = "Unity-iPhone.xcodeproj/project.pbxproj";

/// A native asset directory copied into the export before the project is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirCopy {
    /// Relative to the engine project root (or absolute).
    pub from: Utf8PathBuf,
    /// Relative to the export path.
    pub to: Utf8PathBuf,
}

/// Settings for one post-export run.
#[derive(Debug, Clone)]
pub struct PostExportSettings {
    /// Engine project root; `DirCopy::from` is resolved against it.
    pub project_root: Utf8PathBuf,

    /// Build configuration forced on every `LaunchAction`.
    pub configuration: String,
    /// Target the project edits apply to.
    pub target: String,
    pub edits: Vec<ProjectEdit>,
    pub copies: Vec<DirCopy>,

    pub dry_run: bool,

    // Backups
    pub backup_enabled: bool,
    pub backup_suffix: String,
}

impl Default for PostExportSettings {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from("."),
            configuration: "Debug".to_string(),
            target: "Unity-iPhone".to_string(),
            edits: Vec::new(),
            copies: Vec::new(),
            dry_run: false,
            backup_enabled: true,
            backup_suffix: ".exportfix.bak".to_string(),
        }
    }
}
