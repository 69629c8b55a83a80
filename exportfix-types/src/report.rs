use crate::context::Platform;
use crate::error::PatchErrorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// JSON report of one post-export invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,
    pub source: String,
    pub platform: Platform,
    pub export_path: String,
    pub verdict: GateVerdict,
    pub status: ReportStatus,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub launch_actions: u64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileChange>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportError>,
}

impl PatchReport {
    pub fn new(tool: ToolInfo, source: &str, platform: Platform, export_path: &str) -> Self {
        Self {
            schema: crate::schema::EXPORTFIX_REPORT_V1.to_string(),
            tool,
            run: RunInfo {
                started_at: Utc::now(),
                ended_at: None,
            },
            source: source.to_string(),
            platform,
            export_path: export_path.to_string(),
            verdict: GateVerdict::Eligible,
            status: ReportStatus::Pass,
            dry_run: false,
            launch_actions: 0,
            files: vec![],
            warnings: vec![],
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Outcome of the scene/platform gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateVerdict {
    Eligible,
    SkippedPlatform,
    SkippedScene,
}

impl GateVerdict {
    pub fn is_eligible(self) -> bool {
        matches!(self, GateVerdict::Eligible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pass,
    Skip,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub changed: bool,
    pub sha256_before: String,
    pub sha256_after: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportError {
    pub kind: PatchErrorKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_with_schema_and_snake_case() {
        let mut report = PatchReport::new(
            ToolInfo {
                name: "exportfix".to_string(),
                version: Some("0.1.0".to_string()),
            },
            "editor",
            Platform::Ios,
            "build/ios",
        );
        report.verdict = GateVerdict::SkippedScene;
        report.status = ReportStatus::Skip;

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["schema"], "exportfix.report.v1");
        assert_eq!(json["verdict"], "skipped_scene");
        assert_eq!(json["platform"], "ios");
        assert!(json.get("files").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let err = ReportError {
            kind: PatchErrorKind::NotFound,
            message: "target".to_string(),
        };
        let json = serde_json::to_value(&err).expect("serialize");
        assert_eq!(json["kind"], "not_found");
    }
}
