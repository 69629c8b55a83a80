//! The post-export routine shared by every hook.
//!
//! Both documents are patched in memory first. Nothing is written (no copies,
//! no backups, no documents) unless every step succeeded, and in dry-run mode
//! nothing is written at all.

use crate::gate;
use crate::ports::WritePort;
use crate::settings::{PROJECT_PATH, PostExportSettings, SCHEME_PATH};
use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use exportfix_pbx::ProjectDescriptor;
use exportfix_scheme::patch_scheme_str;
use exportfix_types::io::read_document;
use exportfix_types::report::{FileChange, GateVerdict};
use exportfix_types::{BuildContext, PatchResult};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

/// Outcome of `process_post_build`.
#[derive(Debug, Clone)]
pub struct PostExportOutcome {
    pub verdict: GateVerdict,
    pub dry_run: bool,
    /// `LaunchAction` elements whose configuration was set.
    pub launch_actions: usize,
    pub files: Vec<FileChange>,
    /// Unified diff of every changed document.
    pub patch: String,
    pub warnings: Vec<String>,
}

impl PostExportOutcome {
    fn skipped(verdict: GateVerdict, dry_run: bool) -> Self {
        Self {
            verdict,
            dry_run,
            launch_actions: 0,
            files: Vec::new(),
            patch: String::new(),
            warnings: Vec::new(),
        }
    }

    pub fn changed_files(&self) -> impl Iterator<Item = &FileChange> {
        self.files.iter().filter(|f| f.changed)
    }
}

/// A document staged in memory.
struct Staged {
    rel: &'static str,
    path: Utf8PathBuf,
    before: String,
    after: String,
}

/// Run the gated post-export routine for one build.
pub fn process_post_build(
    ctx: &BuildContext,
    settings: &PostExportSettings,
    writer: &dyn WritePort,
) -> PatchResult<PostExportOutcome> {
    let verdict = gate::evaluate(ctx);
    if !verdict.is_eligible() {
        info!(?verdict, platform = %ctx.platform, "export not eligible; nothing to do");
        return Ok(PostExportOutcome::skipped(verdict, settings.dry_run));
    }
    info!(export_path = %ctx.export_path, configuration = %settings.configuration, "processing export");

    let mut warnings = Vec::new();

    let scheme_path = ctx.export_path.join(SCHEME_PATH);
    let scheme_before = read_document(&scheme_path)?;
    let scheme = patch_scheme_str(&scheme_before, &settings.configuration)?;
    if scheme.is_noop() {
        warnings.push(format!("{SCHEME_PATH} has no LaunchAction"));
    }

    let project_path = ctx.export_path.join(PROJECT_PATH);
    let project_before = read_document(&project_path)?;
    let project_after = patch_project(&project_path, &project_before, settings, &mut warnings)?;

    let staged = [
        Staged {
            rel: SCHEME_PATH,
            path: scheme_path,
            before: scheme_before,
            after: scheme.contents,
        },
        Staged {
            rel: PROJECT_PATH,
            path: project_path,
            before: project_before,
            after: project_after,
        },
    ];

    copy_native_assets(ctx, settings, writer)?;

    let mut files = Vec::with_capacity(staged.len());
    for doc in &staged {
        let changed = doc.before != doc.after;
        let mut backup_path = None;
        if changed && !settings.dry_run {
            if settings.backup_enabled {
                let backup = Utf8PathBuf::from(format!("{}{}", doc.path, settings.backup_suffix));
                writer.copy_file(&doc.path, &backup)?;
                backup_path = Some(backup.to_string());
            }
            writer.write_file(&doc.path, doc.after.as_bytes())?;
            info!(path = doc.rel, "saved");
        }
        files.push(FileChange {
            path: doc.rel.to_string(),
            changed,
            sha256_before: sha256_hex(doc.before.as_bytes()),
            sha256_after: sha256_hex(doc.after.as_bytes()),
            backup_path,
        });
    }

    Ok(PostExportOutcome {
        verdict,
        dry_run: settings.dry_run,
        launch_actions: scheme.launch_actions,
        files,
        patch: render_patch(&staged),
        warnings,
    })
}

fn patch_project(
    path: &Utf8Path,
    text: &str,
    settings: &PostExportSettings,
    warnings: &mut Vec<String>,
) -> PatchResult<String> {
    let mut project = ProjectDescriptor::parse(text)?;
    if let Some(name) = project_name(path) {
        project = project.with_project_name(name);
    }

    let target = project.target_by_name(&settings.target)?;
    let configurations = project.configuration_names(&target)?;
    if !configurations.iter().any(|c| c == &settings.configuration) {
        let message = format!(
            "configuration \"{}\" is not defined for target \"{}\" (known: {})",
            settings.configuration,
            settings.target,
            configurations.join(", ")
        );
        warn!("{message}");
        warnings.push(message);
    }

    for edit in &settings.edits {
        debug!(%edit, "applying project edit");
        edit.apply(&mut project, &target)?;
    }
    project.validate()?;
    Ok(project.to_pbxproj())
}

/// `Foo` for `.../Foo.xcodeproj/project.pbxproj`.
fn project_name(path: &Utf8Path) -> Option<&str> {
    let dir = path.parent()?;
    (dir.extension() == Some("xcodeproj"))
        .then(|| dir.file_stem())
        .flatten()
}

fn copy_native_assets(
    ctx: &BuildContext,
    settings: &PostExportSettings,
    writer: &dyn WritePort,
) -> PatchResult<()> {
    for copy in &settings.copies {
        let from = settings.project_root.join(&copy.from);
        let to = ctx.export_path.join(&copy.to);
        if settings.dry_run {
            debug!(%from, %to, "dry run: skipping copy");
            continue;
        }
        writer.replace_dir(&from, &to)?;
        info!(%from, %to, "copied native assets");
    }
    Ok(())
}

fn render_patch(staged: &[Staged]) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for doc in staged {
        if doc.before == doc.after {
            continue;
        }
        out.push_str(&format!("diff --git a/{0} b/{0}\n", doc.rel));
        out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", doc.rel));

        let patch = diffy::create_patch(&doc.before, &doc.after);
        out.push_str(&formatter.fmt_patch(&patch).to_string());
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
