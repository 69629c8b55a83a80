#![no_main]

//! Applies arbitrary edit sequences to the fixture project. Edits may fail, but
//! a project that accepted them never holds a dangling reference.

use exportfix_pbx::{ProjectDescriptor, ProjectEdit, SourceTree};
use libfuzzer_sys::fuzz_target;

const FIXTURE: &str =
    include_str!("../../tests/fixtures/unity-export/Unity-iPhone.xcodeproj/project.pbxproj");

#[derive(Debug, arbitrary::Arbitrary)]
enum FuzzEdit {
    AddFile { path: String, project_path: Option<String> },
    AddFramework { name: String, weak: bool },
    SetBuildProperty { key: String, value: String },
    AddBuildProperty { key: String, value: String },
}

impl From<FuzzEdit> for ProjectEdit {
    fn from(edit: FuzzEdit) -> Self {
        match edit {
            FuzzEdit::AddFile { path, project_path } => ProjectEdit::AddFile {
                path,
                project_path,
                source_tree: SourceTree::default(),
            },
            FuzzEdit::AddFramework { name, weak } => ProjectEdit::AddFramework { name, weak },
            FuzzEdit::SetBuildProperty { key, value } => ProjectEdit::SetBuildProperty { key, value },
            FuzzEdit::AddBuildProperty { key, value } => ProjectEdit::AddBuildProperty { key, value },
        }
    }
}

fuzz_target!(|edits: Vec<FuzzEdit>| {
    let mut project = ProjectDescriptor::parse(FIXTURE).expect("fixture parses");
    let target = project.target_by_name("Unity-iPhone").expect("fixture target");

    for edit in edits {
        let _ = ProjectEdit::from(edit).apply(&mut project, &target);
    }

    assert!(project.dangling_references().is_empty());
    let text = project.to_pbxproj();
    ProjectDescriptor::parse(&text).expect("edited project must parse");
});
