//! Declarative project edits, as listed in `exportfix.toml`.

use crate::file_types::SourceTree;
use crate::ids::TargetId;
use crate::project::ProjectDescriptor;
use exportfix_types::PatchResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One mutation of a target. Every variant is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ProjectEdit {
    /// Add a file (source, bundle, framework on disk) and attach it to the
    /// phase matching its type.
    AddFile {
        path: String,
        /// Location in the project navigator; defaults to `path`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project_path: Option<String>,
        #[serde(default)]
        source_tree: SourceTree,
    },
    /// Link a system framework or library.
    AddFramework {
        name: String,
        #[serde(default)]
        weak: bool,
    },
    SetBuildProperty {
        key: String,
        value: String,
    },
    AddBuildProperty {
        key: String,
        value: String,
    },
}

impl ProjectEdit {
    pub fn apply(&self, desc: &mut ProjectDescriptor, target: &TargetId) -> PatchResult<()> {
        match self {
            ProjectEdit::AddFile {
                path,
                project_path,
                source_tree,
            } => {
                let project_path = project_path.as_deref().unwrap_or(path);
                desc.add_file_reference(target, path, project_path, *source_tree)?;
            }
            ProjectEdit::AddFramework { name, weak } => {
                desc.add_framework(target, name, *weak)?;
            }
            ProjectEdit::SetBuildProperty { key, value } => {
                desc.set_build_property(target, key, value)?;
            }
            ProjectEdit::AddBuildProperty { key, value } => {
                desc.add_build_property(target, key, value)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ProjectEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectEdit::AddFile { path, .. } => write!(f, "add file {path}"),
            ProjectEdit::AddFramework { name, weak: true } => write!(f, "add weak framework {name}"),
            ProjectEdit::AddFramework { name, .. } => write!(f, "add framework {name}"),
            ProjectEdit::SetBuildProperty { key, value } => write!(f, "set {key} = {value}"),
            ProjectEdit::AddBuildProperty { key, value } => write!(f, "add {value} to {key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        edits: Vec<ProjectEdit>,
    }

    #[test]
    fn deserializes_tagged_edits_from_toml() {
        let parsed: Wrapper = toml::from_str(
            r#"
[[edits]]
op = "add_file"
path = "Frameworks/TestLib.bundle"
source_tree = "source"

[[edits]]
op = "add_framework"
name = "AssetsLibrary.framework"

[[edits]]
op = "set_build_property"
key = "FRAMEWORK_SEARCH_PATHS"
value = "$(inherited)"

[[edits]]
op = "add_build_property"
key = "OTHER_LDFLAGS"
value = "-ObjC"
"#,
        )
        .expect("parse edits");

        assert_eq!(
            parsed.edits,
            vec![
                ProjectEdit::AddFile {
                    path: "Frameworks/TestLib.bundle".to_string(),
                    project_path: None,
                    source_tree: SourceTree::Source,
                },
                ProjectEdit::AddFramework {
                    name: "AssetsLibrary.framework".to_string(),
                    weak: false,
                },
                ProjectEdit::SetBuildProperty {
                    key: "FRAMEWORK_SEARCH_PATHS".to_string(),
                    value: "$(inherited)".to_string(),
                },
                ProjectEdit::AddBuildProperty {
                    key: "OTHER_LDFLAGS".to_string(),
                    value: "-ObjC".to_string(),
                },
            ]
        );
    }

    #[test]
    fn source_tree_accepts_xcode_spelling() {
        let parsed: Wrapper = toml::from_str(
            r#"
[[edits]]
op = "add_file"
path = "x.m"
source_tree = "<group>"
"#,
        )
        .expect("parse");
        assert!(matches!(
            parsed.edits[0],
            ProjectEdit::AddFile {
                source_tree: SourceTree::Group,
                ..
            }
        ));
    }

    #[test]
    fn display_is_human_readable() {
        let edit = ProjectEdit::AddFramework {
            name: "GameKit.framework".to_string(),
            weak: true,
        };
        assert_eq!(edit.to_string(), "add weak framework GameKit.framework");
    }
}
