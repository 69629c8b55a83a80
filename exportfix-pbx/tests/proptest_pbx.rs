//! Property-based tests for the project descriptor.
//!
//! Invariants checked:
//! - Roundtrip: parse(to_pbxproj(d)) == d, for arbitrary build setting values
//! - Idempotency: adding the same framework or build value twice changes nothing
//! - Union: set followed by add never duplicates a value
//! - No dangling references after any sequence of mutations

use exportfix_pbx::{PbxValue, ProjectDescriptor, SourceTree};
use proptest::prelude::*;

const UNITY_PROJECT: &str =
    include_str!("../../tests/fixtures/unity-export/Unity-iPhone.xcodeproj/project.pbxproj");

fn unity() -> ProjectDescriptor {
    ProjectDescriptor::parse(UNITY_PROJECT)
        .expect("parse fixture")
        .with_project_name("Unity-iPhone")
}

fn arb_setting_key() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[A-Z][A-Z0-9_]{0,16}").unwrap()
}

/// Any printable text, including quotes, backslashes and comment markers.
fn arb_setting_value() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex(r"[ -~]{0,24}").unwrap(),
        prop::string::string_regex(r"\PC{0,12}").unwrap(),
        Just("$(inherited)".to_string()),
        Just("a // b /* c */".to_string()),
        Just(String::new()),
    ]
}

/// A single build flag token, without whitespace.
fn arb_flag() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"-?[A-Za-z$()_/.]{1,16}").unwrap()
}

fn arb_framework() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[A-Z][A-Za-z]{0,12}")
        .unwrap()
        .prop_map(|name| format!("{name}.framework"))
}

proptest! {
    #[test]
    fn roundtrip_preserves_build_settings(
        settings in prop::collection::vec((arb_setting_key(), arb_setting_value()), 1..8)
    ) {
        let mut project = unity();
        let target = project.target_by_name("Unity-iPhone").unwrap();
        for (key, value) in &settings {
            project.set_build_property(&target, key, value).unwrap();
        }

        let text = project.to_pbxproj();
        let reparsed = ProjectDescriptor::parse(&text)
            .unwrap()
            .with_project_name("Unity-iPhone");
        prop_assert_eq!(&reparsed, &project, "roundtrip should preserve the graph");
        prop_assert_eq!(reparsed.to_pbxproj(), text, "serialization should be stable");
    }

    #[test]
    fn add_framework_is_idempotent(name in arb_framework(), weak in any::<bool>()) {
        let mut project = unity();
        let target = project.target_by_name("Unity-iPhone").unwrap();

        let first = project.add_framework(&target, &name, weak).unwrap();
        let snapshot = project.clone();
        let second = project.add_framework(&target, &name, weak).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(&project, &snapshot, "second add should be a no-op");
        prop_assert!(project.dangling_references().is_empty());
    }

    #[test]
    fn set_then_add_is_a_union(
        key in arb_setting_key(),
        base in arb_flag(),
        extras in prop::collection::vec(arb_flag(), 0..6),
    ) {
        let mut project = unity();
        let target = project.target_by_name("Unity-iPhone").unwrap();

        project.set_build_property(&target, &key, &base).unwrap();
        for extra in extras.iter().chain(extras.iter()) {
            project.add_build_property(&target, &key, extra).unwrap();
        }

        let mut expected: Vec<&str> = vec![base.as_str()];
        for extra in &extras {
            if !expected.contains(&extra.as_str()) {
                expected.push(extra);
            }
        }
        for config in ["Debug", "Release"] {
            let value = project
                .build_property(&target, config, &key)
                .unwrap()
                .map(PbxValue::strings)
                .unwrap_or_default();
            prop_assert_eq!(&value, &expected);
        }
    }

    #[test]
    fn mutations_never_dangle(
        frameworks in prop::collection::vec(arb_framework(), 0..4),
        files in prop::collection::vec(
            prop::string::string_regex(r"[A-Za-z]{1,8}/[A-Za-z]{1,8}\.(m|mm|h|png|bundle|framework)").unwrap(),
            0..4,
        ),
    ) {
        let mut project = unity();
        let target = project.target_by_name("Unity-iPhone").unwrap();
        for name in &frameworks {
            project.add_framework(&target, name, false).unwrap();
        }
        for path in &files {
            project
                .add_file_reference(&target, path, path, SourceTree::Source)
                .unwrap();
        }
        prop_assert!(project.validate().is_ok(), "{:?}", project.dangling_references());
    }
}
