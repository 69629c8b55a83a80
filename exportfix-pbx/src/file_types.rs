//! File-type table: `lastKnownFileType` values and the build phase a file belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Build phase kinds this crate can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Sources,
    Frameworks,
    Resources,
    Headers,
}

impl PhaseKind {
    pub fn isa(self) -> &'static str {
        match self {
            PhaseKind::Sources => "PBXSourcesBuildPhase",
            PhaseKind::Frameworks => "PBXFrameworksBuildPhase",
            PhaseKind::Resources => "PBXResourcesBuildPhase",
            PhaseKind::Headers => "PBXHeadersBuildPhase",
        }
    }

    /// Phase for a file, decided by extension. Unknown files are resources.
    pub fn for_path(path: &str) -> PhaseKind {
        match extension(path).as_deref() {
            Some("m" | "mm" | "c" | "cc" | "cpp" | "cxx" | "swift" | "s") => PhaseKind::Sources,
            Some("framework" | "xcframework" | "a" | "tbd" | "dylib") => PhaseKind::Frameworks,
            Some("h" | "hpp" | "hh") => PhaseKind::Headers,
            _ => PhaseKind::Resources,
        }
    }
}

/// Default label Xcode gives a build phase without a `name`.
pub(crate) fn phase_label(isa: &str) -> &str {
    match isa {
        "PBXSourcesBuildPhase" => "Sources",
        "PBXFrameworksBuildPhase" => "Frameworks",
        "PBXResourcesBuildPhase" => "Resources",
        "PBXHeadersBuildPhase" => "Headers",
        "PBXCopyFilesBuildPhase" => "CopyFiles",
        "PBXShellScriptBuildPhase" => "ShellScript",
        other => other,
    }
}

/// `lastKnownFileType` for a path, if the extension is known.
pub fn file_type_for(path: &str) -> Option<&'static str> {
    let ty = match extension(path)?.as_str() {
        "m" => "sourcecode.c.objc",
        "mm" => "sourcecode.cpp.objcpp",
        "c" => "sourcecode.c.c",
        "cc" | "cpp" | "cxx" => "sourcecode.cpp.cpp",
        "swift" => "sourcecode.swift",
        "s" => "sourcecode.asm",
        "h" => "sourcecode.c.h",
        "hpp" | "hh" => "sourcecode.cpp.h",
        "framework" => "wrapper.framework",
        "xcframework" => "wrapper.xcframework",
        "a" => "archive.ar",
        "tbd" => "sourcecode.text-based-dylib-definition",
        "dylib" => "compiled.mach-o.dylib",
        "bundle" => "wrapper.plug-in",
        "plist" => "text.plist.xml",
        "strings" => "text.plist.strings",
        "json" => "text.json",
        "png" => "image.png",
        "jpg" | "jpeg" => "image.jpeg",
        "xcassets" => "folder.assetcatalog",
        "storyboard" => "file.storyboard",
        "xib" => "file.xib",
        "txt" => "text",
        _ => return None,
    };
    Some(ty)
}

fn extension(path: &str) -> Option<String> {
    let file = path.trim_end_matches('/').rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Last path component.
pub(crate) fn file_name(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

/// Where a file reference's path is resolved from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTree {
    /// Relative to the project directory.
    #[default]
    #[serde(rename = "SOURCE_ROOT", alias = "source")]
    Source,
    /// Relative to the enclosing group.
    #[serde(rename = "<group>", alias = "group")]
    Group,
    #[serde(rename = "<absolute>", alias = "absolute")]
    Absolute,
    #[serde(rename = "SDKROOT", alias = "sdk")]
    Sdk,
    #[serde(rename = "DEVELOPER_DIR", alias = "developer")]
    Developer,
    #[serde(rename = "BUILT_PRODUCTS_DIR", alias = "build")]
    Build,
}

impl SourceTree {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceTree::Source => "SOURCE_ROOT",
            SourceTree::Group => "<group>",
            SourceTree::Absolute => "<absolute>",
            SourceTree::Sdk => "SDKROOT",
            SourceTree::Developer => "DEVELOPER_DIR",
            SourceTree::Build => "BUILT_PRODUCTS_DIR",
        }
    }
}

impl fmt::Display for SourceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
