//! Build hook entry points.
//!
//! Two hooks exist for the post-export step: the cloud build service calls with
//! only an export path (the platform is implicitly iOS), the local editor calls
//! with an explicit platform. Both normalize into a [`BuildContext`] and run the
//! same routine exactly once. The caller picks the hook at run time.

use crate::gate::REQUIRED_PLATFORM;
use crate::pipeline::{PostExportOutcome, process_post_build};
use crate::ports::{SceneSource, WritePort};
use crate::settings::PostExportSettings;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use exportfix_types::report::{PatchReport, ReportError, ReportStatus, ToolInfo};
use exportfix_types::{BuildContext, PatchError, PatchResult, Platform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, info_span};

/// Which build system invoked the hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationSource {
    #[default]
    Editor,
    Cloud,
}

impl InvocationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            InvocationSource::Editor => "editor",
            InvocationSource::Cloud => "cloud",
        }
    }
}

impl fmt::Display for InvocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvocationSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "editor" => Ok(InvocationSource::Editor),
            "cloud" => Ok(InvocationSource::Cloud),
            other => Err(format!("unknown source '{other}' (expected editor or cloud)")),
        }
    }
}

/// One hook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookInvocation {
    Editor {
        platform: Platform,
        export_path: Utf8PathBuf,
    },
    Cloud {
        export_path: Utf8PathBuf,
    },
}

impl HookInvocation {
    pub fn source(&self) -> InvocationSource {
        match self {
            HookInvocation::Editor { .. } => InvocationSource::Editor,
            HookInvocation::Cloud { .. } => InvocationSource::Cloud,
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            HookInvocation::Editor { platform, .. } => *platform,
            HookInvocation::Cloud { .. } => Platform::Ios,
        }
    }

    pub fn export_path(&self) -> &Utf8Path {
        match self {
            HookInvocation::Editor { export_path, .. } | HookInvocation::Cloud { export_path } => {
                export_path
            }
        }
    }

    pub fn context(&self, active_scene_paths: Vec<String>) -> BuildContext {
        BuildContext::new(self.platform(), self.export_path(), active_scene_paths)
    }
}

/// Post-export hook. Loads the scene list (only for the platform that can be
/// patched) and runs the shared routine once.
pub fn on_post_export(
    invocation: &HookInvocation,
    scenes: &dyn SceneSource,
    settings: &PostExportSettings,
    writer: &dyn WritePort,
) -> PatchResult<PostExportOutcome> {
    let span = info_span!("post_export", source = %invocation.source());
    let _guard = span.enter();
    info!(
        platform = %invocation.platform(),
        export_path = %invocation.export_path(),
        "post-export hook started"
    );

    let active = if invocation.platform() == REQUIRED_PLATFORM {
        scenes.active_scenes()?
    } else {
        Vec::new()
    };
    let ctx = invocation.context(active);
    process_post_build(&ctx, settings, writer)
}

/// Pre-export hook. An extension point: it logs and changes nothing.
pub fn on_pre_export(invocation: &HookInvocation) -> PatchResult<()> {
    info!(
        source = %invocation.source(),
        platform = %invocation.platform(),
        export_path = %invocation.export_path(),
        "pre-export hook started"
    );
    Ok(())
}

/// Build the JSON report for a finished post-export call.
pub fn report_for(
    tool: ToolInfo,
    invocation: &HookInvocation,
    result: Result<&PostExportOutcome, &PatchError>,
) -> PatchReport {
    let mut report = PatchReport::new(
        tool,
        invocation.source().as_str(),
        invocation.platform(),
        invocation.export_path().as_str(),
    );
    match result {
        Ok(outcome) => {
            report.verdict = outcome.verdict;
            report.status = if outcome.verdict.is_eligible() {
                ReportStatus::Pass
            } else {
                ReportStatus::Skip
            };
            report.dry_run = outcome.dry_run;
            report.launch_actions = outcome.launch_actions as u64;
            report.files = outcome.files.clone();
            report.warnings = outcome.warnings.clone();
        }
        Err(err) => {
            report.status = ReportStatus::Fail;
            report.error = Some(ReportError {
                kind: err.kind(),
                message: err.to_string(),
            });
        }
    }
    report.run.ended_at = Some(Utc::now());
    report
}
