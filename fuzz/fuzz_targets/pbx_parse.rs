#![no_main]

//! Arbitrary text must either fail to parse or survive a serialize/parse cycle.

use exportfix_pbx::ProjectDescriptor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else { return };
    let Ok(project) = ProjectDescriptor::parse(s) else { return };

    let text = project.to_pbxproj();
    let reparsed = ProjectDescriptor::parse(&text).expect("serialized project must parse");
    assert_eq!(reparsed.to_pbxproj(), text);
});
