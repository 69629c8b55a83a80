//! Parser for the OpenStep-style property list used by `project.pbxproj`.
//!
//! Grammar:
//! - `{ key = value; ... }` dictionaries
//! - `( value, value, )` arrays (trailing comma allowed)
//! - `"quoted"` or bare strings, `<hex>` data
//! - `/* block */` and `// line` comments anywhere whitespace is allowed

use crate::value::{Dict, PbxValue};
use exportfix_types::PatchError;

pub(crate) const DOCUMENT: &str = "pbxproj";

/// Dictionaries and arrays nested deeper than this are rejected.
const MAX_DEPTH: usize = 128;

/// Parse a whole document. The top level must be a single dictionary.
pub fn parse_document(text: &str) -> Result<Dict, PatchError> {
    let mut parser = Parser::new(text);
    parser.skip_trivia()?;
    let root = match parser.peek() {
        Some(b'{') => parser.parse_dict()?,
        Some(_) => return Err(parser.error("expected '{' at top level")),
        None => return Err(parser.error("empty document")),
    };
    parser.skip_trivia()?;
    if parser.peek().is_some() {
        return Err(parser.error("trailing content after top-level dictionary"));
    }
    Ok(root)
}

/// Characters allowed in an unquoted string.
pub(crate) fn is_bare_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'$' | b'/' | b':' | b'.' | b'-' | b'+')
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        // A leading BOM is tolerated.
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn error(&self, message: &str) -> PatchError {
        let consumed = &self.src[..self.pos.min(self.src.len())];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed.rfind('\n').map_or(consumed.len(), |i| consumed.len() - i - 1) + 1;
        PatchError::malformed(DOCUMENT, format!("line {line}, column {column}: {message}"))
    }

    fn skip_trivia(&mut self) -> Result<(), PatchError> {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    let end = self.src[self.pos + 2..]
                        .find("*/")
                        .ok_or_else(|| self.error("unterminated block comment"))?;
                    self.pos += 2 + end + 2;
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'/') => {
                    match self.src[self.pos..].find('\n') {
                        Some(nl) => self.pos += nl + 1,
                        None => self.pos = self.bytes.len(),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn expect(&mut self, wanted: u8) -> Result<(), PatchError> {
        self.skip_trivia()?;
        if self.peek() == Some(wanted) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", wanted as char)))
        }
    }

    fn enter(&mut self) -> Result<(), PatchError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(&format!("nesting deeper than {MAX_DEPTH} levels")));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_value(&mut self) -> Result<PbxValue, PatchError> {
        self.skip_trivia()?;
        match self.peek() {
            Some(b'{') => Ok(PbxValue::Dict(self.parse_dict()?)),
            Some(b'(') => self.parse_array(),
            Some(b'<') => self.parse_data(),
            Some(b'"') | Some(b'\'') => Ok(PbxValue::String(self.parse_quoted()?)),
            Some(c) if is_bare_char(c) => Ok(PbxValue::String(self.parse_bare())),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_dict(&mut self) -> Result<Dict, PatchError> {
        self.expect(b'{')?;
        self.enter()?;
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b'}') {
                self.pos += 1;
                self.depth -= 1;
                return Ok(dict);
            }
            let key = match self.parse_value()? {
                PbxValue::String(s) => s,
                _ => return Err(self.error("dictionary keys must be strings")),
            };
            self.expect(b'=')?;
            let value = self.parse_value()?;
            self.expect(b';')?;
            // Last assignment wins, keeping the first position.
            dict.insert(key, value);
        }
    }

    fn parse_array(&mut self) -> Result<PbxValue, PatchError> {
        self.expect(b'(')?;
        self.enter()?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b')') {
                self.pos += 1;
                self.depth -= 1;
                return Ok(PbxValue::Array(items));
            }
            items.push(self.parse_value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {}
                _ => return Err(self.error("expected ',' or ')' in array")),
            }
        }
    }

    fn parse_data(&mut self) -> Result<PbxValue, PatchError> {
        self.expect(b'<')?;
        let end = self.src[self.pos..]
            .find('>')
            .ok_or_else(|| self.error("unterminated data literal"))?;
        let digits: String = self.src[self.pos..self.pos + end]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = hex::decode(&digits).map_err(|e| self.error(&format!("bad data literal: {e}")))?;
        self.pos += end + 1;
        Ok(PbxValue::Data(bytes))
    }

    fn parse_bare(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_bare_char) {
            self.pos += 1;
        }
        self.src[start..self.pos].to_string()
    }

    fn parse_quoted(&mut self) -> Result<String, PatchError> {
        let quote = self.bytes[self.pos];
        self.pos += 1;
        let mut out = String::new();
        loop {
            let rest = &self.src[self.pos..];
            let mut chars = rest.chars();
            let c = chars
                .next()
                .ok_or_else(|| self.error("unterminated quoted string"))?;
            self.pos += c.len_utf8();
            match c {
                c if c as u32 == quote as u32 => return Ok(out),
                '\\' => {
                    let esc = chars
                        .next()
                        .ok_or_else(|| self.error("unterminated escape sequence"))?;
                    self.pos += esc.len_utf8();
                    match esc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'U' | 'u' => {
                            let hex_digits = self
                                .src
                                .get(self.pos..self.pos + 4)
                                .ok_or_else(|| self.error("truncated unicode escape"))?;
                            let code = u32::from_str_radix(hex_digits, 16)
                                .ok()
                                .and_then(char::from_u32)
                                .ok_or_else(|| self.error("invalid unicode escape"))?;
                            out.push(code);
                            self.pos += 4;
                        }
                        other => out.push(other),
                    }
                }
                other => out.push(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exportfix_types::PatchErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_structures_and_skips_comments() {
        let text = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	/* a comment */
	list = (a, "b c", /* inline */ d, );
	inner = {key = "$(inherited)"; };
}
"#;
        let dict = parse_document(text).expect("parse");
        assert_eq!(dict["archiveVersion"], PbxValue::from("1"));
        assert_eq!(
            dict["list"],
            PbxValue::Array(vec!["a".into(), "b c".into(), "d".into()])
        );
        assert_eq!(
            dict["inner"].as_dict().expect("dict")["key"],
            PbxValue::from("$(inherited)")
        );
    }

    #[test]
    fn parses_escapes() {
        let dict = parse_document(r#"{ s = "a\"b\\c\nd\U00e9"; }"#).expect("parse");
        assert_eq!(dict["s"], PbxValue::from("a\"b\\c\nd\u{e9}"));
    }

    #[test]
    fn parses_data_literal() {
        let dict = parse_document("{ d = <0fA0 11>; }").expect("parse");
        assert_eq!(dict["d"], PbxValue::Data(vec![0x0f, 0xa0, 0x11]));
    }

    #[test]
    fn array_without_trailing_comma() {
        let dict = parse_document("{ a = (x, y); }").expect("parse");
        assert_eq!(dict["a"].strings(), vec!["x", "y"]);
    }

    #[test]
    fn reports_position_of_missing_semicolon() {
        let err = parse_document("{\n  a = b\n}").expect_err("missing ;");
        assert_eq!(err.kind(), PatchErrorKind::Malformed);
        let msg = err.to_string();
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("expected ';'"), "{msg}");
    }

    #[test]
    fn rejects_empty_and_trailing_input() {
        assert!(parse_document("").is_err());
        assert!(parse_document("// only a comment\n").is_err());
        assert!(parse_document("{ } extra").is_err());
        assert!(parse_document("( a )").is_err());
    }

    #[test]
    fn rejects_unterminated_constructs() {
        assert!(parse_document("{ a = \"open; }").is_err());
        assert!(parse_document("{ a = (b, c; }").is_err());
        assert!(parse_document("{ /* never closed ").is_err());
    }

    #[test]
    fn rejects_excessive_nesting() {
        let deep = format!("{{ a = {}{}; }}", "(".repeat(100_000), ")".repeat(100_000));
        let err = parse_document(&deep).unwrap_err();
        assert_eq!(err.kind(), PatchErrorKind::Malformed);
        assert!(err.to_string().contains("nesting deeper than"), "{err}");
    }

    #[test]
    fn accepts_nesting_up_to_the_limit() {
        let depth = MAX_DEPTH - 1;
        let text = format!("{{ a = {}{}; }}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_document(&text).is_ok());
    }
}
