use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Export platform reported by the build system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Ios,
    Tvos,
    #[serde(rename = "visionos")]
    VisionOs,
    Android,
    StandaloneOsx,
    StandaloneWindows,
    StandaloneLinux,
    #[serde(rename = "webgl")]
    WebGl,
}

impl Platform {
    pub const ALL: [Platform; 8] = [
        Platform::Ios,
        Platform::Tvos,
        Platform::VisionOs,
        Platform::Android,
        Platform::StandaloneOsx,
        Platform::StandaloneWindows,
        Platform::StandaloneLinux,
        Platform::WebGl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Tvos => "tvos",
            Platform::VisionOs => "visionos",
            Platform::Android => "android",
            Platform::StandaloneOsx => "standalone-osx",
            Platform::StandaloneWindows => "standalone-windows",
            Platform::StandaloneLinux => "standalone-linux",
            Platform::WebGl => "webgl",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    /// Case-insensitive; `_` and `-` are interchangeable (`standalone_osx` works).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Platform::ALL.iter().map(|p| p.as_str()).collect();
                format!("unknown platform '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Inputs of one post-export invocation. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildContext {
    pub platform: Platform,
    pub export_path: Utf8PathBuf,
    /// Enabled scenes in build order.
    pub active_scene_paths: Vec<String>,
}

impl BuildContext {
    pub fn new(
        platform: Platform,
        export_path: impl Into<Utf8PathBuf>,
        active_scene_paths: Vec<String>,
    ) -> Self {
        Self {
            platform,
            export_path: export_path.into(),
            active_scene_paths,
        }
    }
}
