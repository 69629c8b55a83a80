//! Patcher for Xcode `.xcscheme` files.
//!
//! The document is streamed with `quick-xml`: every event is re-emitted as read,
//! except the start tag of each `LaunchAction`, whose `buildConfiguration`
//! attribute is set in place. Whitespace, comments, attribute order and the
//! one-attribute-per-line layout Xcode uses all survive.

mod attrs;

use camino::Utf8Path;
use exportfix_types::io::{read_document, write_document};
use exportfix_types::{PatchError, PatchResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, info};

pub(crate) const DOCUMENT: &str = "xcscheme";

const LAUNCH_ACTION: &[u8] = b"LaunchAction";
const BUILD_CONFIGURATION: &str = "buildConfiguration";

/// Result of patching one scheme document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemePatch {
    /// Patched document text.
    pub contents: String,
    /// Number of `LaunchAction` elements whose configuration was set.
    pub launch_actions: usize,
}

impl SchemePatch {
    pub fn is_noop(&self) -> bool {
        self.launch_actions == 0
    }
}

/// Set `buildConfiguration` on every `LaunchAction` of the scheme at `path` and
/// write the result back.
///
/// A scheme without `LaunchAction` elements is left as it was.
pub fn patch_scheme(path: &Utf8Path, configuration: &str) -> PatchResult<SchemePatch> {
    let original = read_document(path)?;
    debug!(%path, bytes = original.len(), "loaded scheme");

    let patch = patch_scheme_str(&original, configuration)?;
    if patch.contents != original {
        write_document(path, &patch.contents)?;
        info!(%path, launch_actions = patch.launch_actions, "saved scheme");
    }
    Ok(patch)
}

/// Pure form of [`patch_scheme`].
pub fn patch_scheme_str(text: &str, configuration: &str) -> PatchResult<SchemePatch> {
    let mut reader = Reader::from_str(text);
    let mut writer = Writer::new(Vec::with_capacity(text.len() + 64));
    let mut depth = 0usize;
    let mut roots = 0usize;
    let mut launch_actions = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed_at(text, reader.error_position() as usize, &e.to_string()))?;

        let event = match event {
            Event::Eof => break,
            Event::Start(start) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
                Event::Start(patch_tag(start, configuration, &mut launch_actions)?)
            }
            Event::Empty(start) => {
                if depth == 0 {
                    roots += 1;
                }
                Event::Empty(patch_tag(start, configuration, &mut launch_actions)?)
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                Event::End(end)
            }
            Event::Text(text_event)
                if depth == 0 && !text_event.iter().all(u8::is_ascii_whitespace) =>
            {
                return Err(malformed_at(
                    text,
                    reader.buffer_position() as usize,
                    "text outside the root element",
                ));
            }
            Event::CData(_) if depth == 0 => {
                return Err(malformed_at(
                    text,
                    reader.buffer_position() as usize,
                    "CDATA outside the root element",
                ));
            }
            other => other,
        };

        if roots > 1 {
            return Err(malformed_at(
                text,
                reader.buffer_position() as usize,
                "more than one root element",
            ));
        }
        writer
            .write_event(event)
            .map_err(|e| PatchError::malformed(DOCUMENT, e.to_string()))?;
    }

    if depth > 0 {
        return Err(PatchError::malformed(
            DOCUMENT,
            format!("{depth} unclosed element(s) at end of document"),
        ));
    }
    if roots == 0 {
        return Err(PatchError::malformed(DOCUMENT, "no root element"));
    }

    let contents = String::from_utf8(writer.into_inner())
        .map_err(|e| PatchError::malformed(DOCUMENT, e.to_string()))?;
    if launch_actions == 0 {
        debug!("scheme has no LaunchAction; nothing to patch");
    }
    Ok(SchemePatch {
        contents,
        launch_actions,
    })
}

fn patch_tag<'a>(
    start: BytesStart<'a>,
    configuration: &str,
    launch_actions: &mut usize,
) -> PatchResult<BytesStart<'a>> {
    if start.name().as_ref() != LAUNCH_ACTION {
        return Ok(start);
    }
    let name_len = start.name().as_ref().len();
    let content = std::str::from_utf8(&start)
        .map_err(|e| PatchError::malformed(DOCUMENT, e.to_string()))?;
    let patched = attrs::set_attribute(content, name_len, BUILD_CONFIGURATION, configuration)
        .map_err(|message| PatchError::malformed(DOCUMENT, message))?;

    *launch_actions += 1;
    debug!(
        launch_action = *launch_actions,
        configuration, "set LaunchAction build configuration"
    );
    Ok(BytesStart::from_content(patched, name_len))
}

fn malformed_at(text: &str, offset: usize, message: &str) -> PatchError {
    let offset = offset.min(text.len());
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    PatchError::malformed(DOCUMENT, format!("line {line}, column {column}: {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exportfix_types::PatchErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn sets_missing_configuration() {
        let text = r#"<?xml version="1.0" encoding="UTF-8"?>
<Scheme version = "1.3">
   <LaunchAction
      launchStyle = "0">
   </LaunchAction>
</Scheme>
"#;
        let patch = patch_scheme_str(text, "Debug").expect("patch");
        assert_eq!(patch.launch_actions, 1);
        assert_eq!(
            patch.contents,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Scheme version = "1.3">
   <LaunchAction
      launchStyle = "0"
      buildConfiguration = "Debug">
   </LaunchAction>
</Scheme>
"#
        );
    }

    #[test]
    fn overwrites_existing_configuration() {
        let text = r#"<Scheme><LaunchAction buildConfiguration="Release" launchStyle="0"/></Scheme>"#;
        let patch = patch_scheme_str(text, "Debug").expect("patch");
        assert_eq!(
            patch.contents,
            r#"<Scheme><LaunchAction buildConfiguration="Debug" launchStyle="0"/></Scheme>"#
        );
    }

    #[test]
    fn patches_every_launch_action_at_any_depth() {
        let text = "<Scheme><LaunchAction/><Group><LaunchAction buildConfiguration=\"Release\"></LaunchAction></Group></Scheme>";
        let patch = patch_scheme_str(text, "Debug").expect("patch");
        assert_eq!(patch.launch_actions, 2);
        assert_eq!(
            patch.contents,
            "<Scheme><LaunchAction buildConfiguration=\"Debug\"/><Group><LaunchAction buildConfiguration=\"Debug\"></LaunchAction></Group></Scheme>"
        );
    }

    #[test]
    fn no_launch_action_is_a_noop() {
        let text = "<?xml version=\"1.0\"?>\n<!-- generated -->\n<Scheme>\n   <TestAction buildConfiguration = \"Release\"/>\n</Scheme>\n";
        let patch = patch_scheme_str(text, "Debug").expect("patch");
        assert!(patch.is_noop());
        assert_eq!(patch.contents, text);
    }

    #[test]
    fn other_actions_keep_their_configuration() {
        let text = "<Scheme><TestAction buildConfiguration=\"Release\"/><LaunchAction/></Scheme>";
        let patch = patch_scheme_str(text, "Debug").expect("patch");
        assert!(patch.contents.contains("<TestAction buildConfiguration=\"Release\"/>"));
    }

    #[test]
    fn unclosed_root_is_malformed() {
        let err = patch_scheme_str("<Scheme><LaunchAction/>", "Debug").unwrap_err();
        assert_eq!(err.kind(), PatchErrorKind::Malformed);
    }

    #[test]
    fn mismatched_end_tag_is_malformed() {
        let err = patch_scheme_str("<Scheme>\n<LaunchAction></Scheme>", "Debug").unwrap_err();
        assert_eq!(err.kind(), PatchErrorKind::Malformed);
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn empty_document_is_malformed() {
        for text in ["", "   \n", "not xml at all"] {
            let err = patch_scheme_str(text, "Debug").unwrap_err();
            assert_eq!(err.kind(), PatchErrorKind::Malformed, "{text:?}");
        }
    }

    #[test]
    fn second_root_is_malformed() {
        let err = patch_scheme_str("<Scheme/><Scheme/>", "Debug").unwrap_err();
        assert_eq!(err.kind(), PatchErrorKind::Malformed);
    }

    #[test]
    fn text_outside_root_is_malformed() {
        for text in [
            "<Scheme><LaunchAction/></Scheme>trailing garbage",
            "garbage<Scheme><LaunchAction/></Scheme>",
            "<Scheme/><![CDATA[x]]>",
        ] {
            let err = patch_scheme_str(text, "Debug").unwrap_err();
            assert_eq!(err.kind(), PatchErrorKind::Malformed, "{text:?}");
        }
    }

    #[test]
    fn whitespace_and_comments_outside_root_are_kept() {
        let text = "<?xml version=\"1.0\"?>\n<!-- top -->\n<Scheme><LaunchAction/></Scheme>\n\n";
        let patch = patch_scheme_str(text, "Debug").expect("patch");
        assert_eq!(
            patch.contents,
            "<?xml version=\"1.0\"?>\n<!-- top -->\n<Scheme><LaunchAction buildConfiguration=\"Debug\"/></Scheme>\n\n"
        );
    }

    #[test]
    fn broken_launch_action_attributes_are_malformed() {
        let err = patch_scheme_str("<Scheme><LaunchAction style=0/></Scheme>", "Debug").unwrap_err();
        assert_eq!(err.kind(), PatchErrorKind::Malformed);
    }
}
