//! Reading the scene list from Unity's `EditorBuildSettings.asset`.
//!
//! The asset is YAML preceded by `%YAML`/`%TAG` directives and with `!u!` tags on
//! each document start. Those are stripped before handing the text to serde_yaml.

use exportfix_types::{PatchError, PatchResult};
use serde::Deserialize;

/// Asset location relative to the engine project root.
pub const EDITOR_BUILD_SETTINGS: &str = "ProjectSettings/EditorBuildSettings.asset";

const DOCUMENT: &str = "EditorBuildSettings.asset";

#[derive(Debug, Deserialize)]
struct Asset {
    #[serde(rename = "EditorBuildSettings")]
    settings: Settings,
}

#[derive(Debug, Deserialize)]
struct Settings {
    #[serde(rename = "m_Scenes", default)]
    scenes: Option<Vec<SceneEntry>>,
}

#[derive(Debug, Deserialize)]
struct SceneEntry {
    #[serde(default)]
    enabled: u8,
    #[serde(default)]
    path: String,
}

/// Paths of enabled scenes, in build order.
pub fn parse_editor_build_settings(text: &str) -> PatchResult<Vec<String>> {
    let cleaned = strip_unity_directives(text);
    let asset: Asset = serde_yaml::from_str(&cleaned)
        .map_err(|e| PatchError::malformed(DOCUMENT, e.to_string()))?;
    Ok(asset
        .settings
        .scenes
        .unwrap_or_default()
        .into_iter()
        .filter(|s| s.enabled != 0 && !s.path.is_empty())
        .map(|s| s.path)
        .collect())
}

fn strip_unity_directives(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if line.starts_with('%') {
            continue;
        }
        if line.starts_with("--- ") {
            out.push_str("---\n");
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use exportfix_types::PatchErrorKind;
    use pretty_assertions::assert_eq;

    const ASSET: &str = "%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!1045 &1
EditorBuildSettings:
  m_ObjectHideFlags: 0
  serializedVersion: 2
  m_Scenes:
  - enabled: 0
    path: Assets/Scenes/Menu.unity
    guid: 0123456789abcdef0123456789abcdef
  - enabled: 1
    path: Assets/Scenes/CounterScene.unity
    guid: fedcba9876543210fedcba9876543210
  - enabled: 1
    path: Assets/Scenes/Credits.unity
    guid: 00000000000000000000000000000001
  m_configObjects: {}
";

    #[test]
    fn returns_enabled_scenes_in_order() {
        assert_eq!(
            parse_editor_build_settings(ASSET).expect("parse"),
            vec![
                "Assets/Scenes/CounterScene.unity".to_string(),
                "Assets/Scenes/Credits.unity".to_string(),
            ]
        );
    }

    #[test]
    fn empty_scene_list() {
        let text = "%YAML 1.1\n--- !u!1045 &1\nEditorBuildSettings:\n  m_Scenes: []\n";
        assert!(parse_editor_build_settings(text).expect("parse").is_empty());
    }

    #[test]
    fn garbage_is_malformed() {
        let err = parse_editor_build_settings("not: [unity").unwrap_err();
        assert_eq!(err.kind(), PatchErrorKind::Malformed);
    }
}
