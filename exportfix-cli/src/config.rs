//! Configuration file loading for exportfix.
//!
//! Discovers and loads `exportfix.toml` from the engine project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use exportfix_core::{DirCopy, PostExportSettings, ProjectEdit};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "exportfix.toml";

/// Top-level configuration from exportfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportfixConfig {
    /// What to patch.
    pub patch: PatchConfig,

    /// Backup settings.
    pub backups: BackupsConfig,

    /// Native asset directories copied into the export.
    pub copies: Vec<DirCopy>,

    /// Project edits, applied in order.
    pub edits: Vec<ProjectEdit>,
}

/// Patch section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Build configuration forced on every launch action.
    pub configuration: Option<String>,

    /// Target that receives the project edits.
    pub target: Option<String>,
}

/// Backups section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    /// Whether to back up documents before overwriting them.
    pub enabled: bool,

    /// Suffix for backup files.
    pub suffix: String,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            suffix: ".exportfix.bak".to_string(),
        }
    }
}

/// Discover the exportfix.toml config file in the project root.
pub fn discover_config(project_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse an exportfix.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<ExportfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<ExportfixConfig> {
    let config: ExportfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicit config path, or discover one in the project root, or
/// fall back to defaults.
pub fn load_or_default(
    explicit: Option<&Utf8Path>,
    project_root: &Utf8Path,
) -> anyhow::Result<ExportfixConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(project_root) {
        Some(path) => load_config(&path),
        None => Ok(ExportfixConfig::default()),
    }
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ExportfixConfig,
}

impl ConfigMerger {
    pub fn new(config: ExportfixConfig) -> Self {
        Self { config }
    }

    /// Merge with post-export CLI arguments into pipeline settings.
    ///
    /// `--configuration` overrides the file; `--no-backup` wins over
    /// `backups.enabled`.
    pub fn merge_post_export_args(
        self,
        project_root: &Utf8Path,
        cli_configuration: Option<&str>,
        dry_run: bool,
        no_backup: bool,
    ) -> PostExportSettings {
        let defaults = PostExportSettings::default();
        PostExportSettings {
            project_root: project_root.to_path_buf(),
            configuration: cli_configuration
                .map(str::to_string)
                .or(self.config.patch.configuration)
                .unwrap_or(defaults.configuration),
            target: self.config.patch.target.unwrap_or(defaults.target),
            edits: self.config.edits,
            copies: self.config.copies,
            dry_run,
            backup_enabled: self.config.backups.enabled && !no_backup,
            backup_suffix: self.config.backups.suffix,
        }
    }
}
