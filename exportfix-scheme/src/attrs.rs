//! Raw attribute editing that keeps the original tag layout.
//!
//! Xcode writes one attribute per line with ` = ` between name and value. Going
//! through a parsed attribute list would lose that, so the tag content is scanned
//! by hand and only the value bytes of the target attribute are replaced.

use quick_xml::escape::escape;
use std::ops::Range;

/// Spans of one `name = "value"` pair inside a tag's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawAttr {
    /// Whitespace before the name.
    pub separator: Range<usize>,
    pub name: Range<usize>,
    /// From the end of the name up to and including the opening quote.
    pub assign: Range<usize>,
    /// Value between the quotes, still escaped.
    pub value: Range<usize>,
    pub quote: char,
}

/// Split tag content (`Name attr="v" ...`) into attribute spans.
/// `name_len` is the byte length of the element name.
pub(crate) fn scan(content: &str, name_len: usize) -> Result<Vec<RawAttr>, String> {
    let bytes = content.as_bytes();
    let mut pos = name_len;
    let mut attrs = Vec::new();

    loop {
        let sep_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos == bytes.len() {
            return Ok(attrs);
        }
        if pos == sep_start {
            return Err(format!("expected whitespace before attribute at offset {pos}"));
        }

        let name_start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'=' {
            pos += 1;
        }
        let name_end = pos;

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            return Err(format!(
                "attribute '{}' has no value",
                &content[name_start..name_end]
            ));
        }
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let quote = match bytes.get(pos) {
            Some(b'"') => '"',
            Some(b'\'') => '\'',
            _ => {
                return Err(format!(
                    "attribute '{}' value is not quoted",
                    &content[name_start..name_end]
                ));
            }
        };
        pos += 1;
        let value_start = pos;
        let Some(len) = content[value_start..].find(quote) else {
            return Err(format!(
                "attribute '{}' value is not terminated",
                &content[name_start..name_end]
            ));
        };
        pos = value_start + len;

        attrs.push(RawAttr {
            separator: sep_start..name_start,
            name: name_start..name_end,
            assign: name_end..value_start,
            value: value_start..pos,
            quote,
        });
        pos += 1;
    }
}

/// Set `name` to `value` in tag content, overwriting in place or appending a new
/// attribute laid out like the last existing one.
pub(crate) fn set_attribute(
    content: &str,
    name_len: usize,
    name: &str,
    value: &str,
) -> Result<String, String> {
    let attrs = scan(content, name_len)?;
    let escaped = escape(value);

    if let Some(existing) = attrs.iter().find(|a| &content[a.name.clone()] == name) {
        let mut out = String::with_capacity(content.len() + escaped.len());
        out.push_str(&content[..existing.value.start]);
        out.push_str(&escaped);
        out.push_str(&content[existing.value.end..]);
        return Ok(out);
    }

    let (insert_at, separator, assign) = match attrs.last() {
        Some(last) => {
            let assign = &content[last.assign.clone()];
            // Reuse the spacing around '=' but always open with a double quote.
            let assign = assign.trim_end_matches(last.quote);
            (
                last.value.end + 1,
                &content[last.separator.clone()],
                format!("{assign}\""),
            )
        }
        None => (name_len, " ", "=\"".to_string()),
    };

    let mut out = String::with_capacity(content.len() + name.len() + escaped.len() + 8);
    out.push_str(&content[..insert_at]);
    out.push_str(separator);
    out.push_str(name);
    out.push_str(&assign);
    out.push_str(&escaped);
    out.push('"');
    out.push_str(&content[insert_at..]);
    Ok(out)
}
