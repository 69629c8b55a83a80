use camino::Utf8PathBuf;
use exportfix_scheme::{patch_scheme, patch_scheme_str};
use exportfix_types::PatchErrorKind;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

const UNITY_SCHEME: &str = include_str!(
    "../../tests/fixtures/unity-export/Unity-iPhone.xcodeproj/xcshareddata/xcschemes/Unity-iPhone.xcscheme"
);

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 path");
    (temp, root)
}

#[test]
fn unity_scheme_only_launch_action_changes() {
    let patch = patch_scheme_str(UNITY_SCHEME, "Debug").expect("patch");
    assert_eq!(patch.launch_actions, 1);

    let expected = UNITY_SCHEME.replacen(
        "   <LaunchAction\n      buildConfiguration = \"Release\"",
        "   <LaunchAction\n      buildConfiguration = \"Debug\"",
        1,
    );
    assert_ne!(expected, UNITY_SCHEME);
    assert_eq!(patch.contents, expected);
}

#[test]
fn patching_twice_is_stable() {
    let once = patch_scheme_str(UNITY_SCHEME, "Debug").expect("first");
    let twice = patch_scheme_str(&once.contents, "Debug").expect("second");
    assert_eq!(once.contents, twice.contents);
}

#[test]
fn writes_patched_scheme_back_to_disk() {
    let (_temp, root) = temp_root();
    let path = root.join("Unity-iPhone.xcscheme");
    fs::write(
        &path,
        "<Scheme>\n   <LaunchAction\n      launchStyle = \"0\">\n   </LaunchAction>\n</Scheme>\n",
    )
    .expect("write");

    let patch = patch_scheme(&path, "Debug").expect("patch");

    assert_eq!(patch.launch_actions, 1);
    let on_disk = fs::read_to_string(&path).expect("read");
    assert_eq!(on_disk, patch.contents);
    assert!(on_disk.contains("buildConfiguration = \"Debug\""));
}

#[test]
fn scheme_without_launch_action_is_untouched() {
    let (_temp, root) = temp_root();
    let path = root.join("Empty.xcscheme");
    let text = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Scheme\n   version = \"1.3\">\n</Scheme>\n";
    fs::write(&path, text).expect("write");

    let patch = patch_scheme(&path, "Debug").expect("patch");

    assert!(patch.is_noop());
    assert_eq!(fs::read_to_string(&path).expect("read"), text);
}

#[test]
fn missing_scheme_is_not_found() {
    let (_temp, root) = temp_root();
    let err = patch_scheme(&root.join("nope.xcscheme"), "Debug").unwrap_err();
    assert_eq!(err.kind(), PatchErrorKind::NotFound);
}

#[test]
fn malformed_scheme_is_left_on_disk() {
    let (_temp, root) = temp_root();
    let path = root.join("Broken.xcscheme");
    let text = "<Scheme>\n   <LaunchAction>\n</Scheme>\n";
    fs::write(&path, text).expect("write");

    let err = patch_scheme(&path, "Debug").unwrap_err();

    assert_eq!(err.kind(), PatchErrorKind::Malformed);
    assert_eq!(fs::read_to_string(&path).expect("read"), text);
}
