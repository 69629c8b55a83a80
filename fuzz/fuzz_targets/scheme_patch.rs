#![no_main]

use exportfix_scheme::patch_scheme_str;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, arbitrary::Arbitrary)]
struct FuzzInput {
    scheme: String,
    configuration: String,
}

fuzz_target!(|input: FuzzInput| {
    let Ok(first) = patch_scheme_str(&input.scheme, &input.configuration) else {
        return;
    };
    // Patching an already patched scheme is stable.
    let second = patch_scheme_str(&first.contents, &input.configuration)
        .expect("patched scheme must stay well-formed");
    assert_eq!(second.contents, first.contents);
    assert_eq!(second.launch_actions, first.launch_actions);
});
