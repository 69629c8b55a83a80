//! Xcode-style serializer.
//!
//! Output layout follows what Xcode itself writes: a UTF-8 marker line, objects
//! grouped into `/* Begin <isa> section */` blocks sorted by isa then identifier,
//! `isa` first inside each object, and `/* comment */` annotations after every
//! identifier that names an object.

use crate::value::{Dict, PbxValue, str_field};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

const HEADER: &str = "// !$*UTF8*$!";

/// Objects Xcode writes on a single line.
const INLINE_ISAS: &[&str] = &["PBXBuildFile", "PBXFileReference"];

/// Keys whose values look like identifiers but point outside this graph.
const UNANNOTATED_KEYS: &[&str] = &["isa", "remoteGlobalIDString"];

/// `root` is the top-level dictionary; its `objects` entry is written from `objects`.
pub(crate) fn write_document(
    root: &Dict,
    objects: &Dict,
    comments: &HashMap<String, String>,
) -> String {
    let mut w = Writer {
        out: String::with_capacity(16 * 1024),
        comments,
    };
    w.out.push_str(HEADER);
    w.out.push_str("\n{\n");
    for (key, value) in root {
        w.indent(1);
        w.string(key);
        w.out.push_str(" = ");
        if key == "objects" {
            w.objects(objects);
        } else {
            w.value(value, 1, key, false);
        }
        w.out.push_str(";\n");
    }
    w.out.push_str("}\n");
    w.out
}

struct Writer<'c> {
    out: String,
    comments: &'c HashMap<String, String>,
}

impl Writer<'_> {
    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push('\t');
        }
    }

    fn objects(&mut self, objects: &Dict) {
        let mut sections: BTreeMap<&str, Vec<(&String, &PbxValue)>> = BTreeMap::new();
        for (id, obj) in objects {
            let isa = obj.as_dict().and_then(|d| str_field(d, "isa")).unwrap_or("");
            sections.entry(isa).or_default().push((id, obj));
        }

        self.out.push_str("{\n");
        for (isa, mut entries) in sections {
            entries.sort_by(|a, b| a.0.cmp(b.0));
            self.out
                .push_str(&format!("\n/* Begin {} section */\n", comment_text(isa)));
            for (id, obj) in entries {
                self.indent(2);
                self.string(id);
                self.annotate(id);
                self.out.push_str(" = ");
                match obj {
                    PbxValue::Dict(dict) => self.object(dict, INLINE_ISAS.contains(&isa)),
                    other => self.value(other, 2, "", false),
                }
                self.out.push_str(";\n");
            }
            self.out
                .push_str(&format!("/* End {} section */\n", comment_text(isa)));
        }
        self.indent(1);
        self.out.push('}');
    }

    /// An object dictionary: `isa` first, remaining keys sorted.
    fn object(&mut self, dict: &Dict, inline: bool) {
        let mut keys: Vec<&String> = dict.keys().filter(|k| k.as_str() == "isa").collect();
        let mut rest: Vec<&String> = dict.keys().filter(|k| k.as_str() != "isa").collect();
        rest.sort();
        keys.extend(rest);
        self.dict_entries(dict, keys, 2, inline);
    }

    fn dict_entries(&mut self, dict: &Dict, keys: Vec<&String>, depth: usize, inline: bool) {
        if inline {
            self.out.push('{');
            for key in keys {
                self.string(key);
                self.out.push_str(" = ");
                self.value(&dict[key.as_str()], depth, key, true);
                self.out.push_str("; ");
            }
            self.out.push('}');
            return;
        }

        self.out.push_str("{\n");
        for key in keys {
            self.indent(depth + 1);
            self.string(key);
            self.out.push_str(" = ");
            self.value(&dict[key.as_str()], depth + 1, key, false);
            self.out.push_str(";\n");
        }
        self.indent(depth);
        self.out.push('}');
    }

    fn value(&mut self, value: &PbxValue, depth: usize, key: &str, inline: bool) {
        match value {
            PbxValue::String(s) => {
                self.string(s);
                if !UNANNOTATED_KEYS.contains(&key) {
                    self.annotate(s);
                }
            }
            PbxValue::Data(bytes) => {
                self.out.push('<');
                self.out.push_str(&hex::encode(bytes));
                self.out.push('>');
            }
            PbxValue::Array(items) if inline => {
                self.out.push('(');
                for item in items {
                    self.value(item, depth, key, true);
                    self.out.push_str(", ");
                }
                self.out.push(')');
            }
            PbxValue::Array(items) => {
                self.out.push_str("(\n");
                for item in items {
                    self.indent(depth + 1);
                    self.value(item, depth + 1, key, false);
                    self.out.push_str(",\n");
                }
                self.indent(depth);
                self.out.push(')');
            }
            PbxValue::Dict(dict) => {
                let keys: Vec<&String> = dict.keys().collect();
                self.dict_entries(dict, keys, depth, inline);
            }
        }
    }

    fn annotate(&mut self, id: &str) {
        if let Some(comment) = self.comments.get(id) {
            self.out.push_str(" /* ");
            self.out.push_str(&comment_text(comment));
            self.out.push_str(" */");
        }
    }

    fn string(&mut self, s: &str) {
        if !needs_quotes(s) {
            self.out.push_str(s);
            return;
        }
        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\t' => self.out.push_str("\\t"),
                '\r' => self.out.push_str("\\r"),
                other => self.out.push(other),
            }
        }
        self.out.push('"');
    }
}

/// Comments are never read back, so a `*/` inside one is simply broken up.
fn comment_text(s: &str) -> Cow<'_, str> {
    if s.contains("*/") {
        Cow::Owned(s.replace("*/", "* /"))
    } else {
        Cow::Borrowed(s)
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.contains("//")
        || s.contains("/*")
        || !s
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, b'_' | b'$' | b'/' | b':' | b'.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;
    use pretty_assertions::assert_eq;

    #[test]
    fn quoting_follows_xcode_rules() {
        assert!(!needs_quotes("wrapper.framework"));
        assert!(!needs_quotes("System/Library/Frameworks/UIKit.framework"));
        assert!(needs_quotes(""));
        assert!(needs_quotes("<group>"));
        assert!(needs_quotes("-ObjC"));
        assert!(needs_quotes("$(inherited)"));
        assert!(needs_quotes("Unity-iPhone"));
        assert!(needs_quotes("a b"));
        assert!(needs_quotes("a//b"));
    }

    #[test]
    fn writes_sections_and_annotations() {
        let mut root = parse_document(
            r#"{
	objects = {
		BBBB = {isa = PBXGroup; children = (AAAA, ); name = Frameworks; sourceTree = "<group>"; };
		AAAA = {path = UIKit.framework; isa = PBXFileReference; sourceTree = SDKROOT; };
	};
	rootObject = BBBB;
}"#,
        )
        .expect("parse");
        let mut comments = HashMap::new();
        comments.insert("AAAA".to_string(), "UIKit.framework".to_string());
        comments.insert("BBBB".to_string(), "Frameworks".to_string());

        let objects = match root.get_mut("objects") {
            Some(PbxValue::Dict(objects)) => std::mem::take(objects),
            _ => panic!("objects"),
        };
        let text = write_document(&root, &objects, &comments);
        let expected = r#"// !$*UTF8*$!
{
	objects = {

/* Begin PBXFileReference section */
		AAAA /* UIKit.framework */ = {isa = PBXFileReference; path = UIKit.framework; sourceTree = SDKROOT; };
/* End PBXFileReference section */

/* Begin PBXGroup section */
		BBBB /* Frameworks */ = {
			isa = PBXGroup;
			children = (
				AAAA /* UIKit.framework */,
			);
			name = Frameworks;
			sourceTree = "<group>";
		};
/* End PBXGroup section */
	};
	rootObject = BBBB /* Frameworks */;
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn escapes_round_trip() {
        let mut root = Dict::new();
        root.insert("s".to_string(), PbxValue::from("say \"hi\"\\\n"));
        root.insert("empty".to_string(), PbxValue::from(""));
        root.insert("list".to_string(), PbxValue::Array(vec![]));
        let text = write_document(&root, &Dict::new(), &HashMap::new());
        let back = parse_document(&text).expect("reparse");
        assert_eq!(back, root);
    }

    #[test]
    fn comment_terminators_in_labels_round_trip() {
        let mut root = parse_document(
            r#"{
	objects = {
		AAAA = {isa = PBXFileReference; path = "odd*/name.png"; sourceTree = "<group>"; };
		BBBB = {isa = "Odd*/Isa"; files = (AAAA, ); };
	};
	rootObject = BBBB;
}"#,
        )
        .expect("parse");
        let mut comments = HashMap::new();
        comments.insert("AAAA".to_string(), "odd*/name.png".to_string());

        let objects = match root.get_mut("objects") {
            Some(PbxValue::Dict(objects)) => std::mem::take(objects),
            _ => panic!("objects"),
        };
        let text = write_document(&root, &objects, &comments);
        assert!(text.contains("AAAA /* odd* /name.png */"));
        assert!(text.contains("/* Begin Odd* /Isa section */"));

        let back = parse_document(&text).expect("reparse");
        assert_eq!(back.get("objects"), Some(&PbxValue::Dict(objects)));
    }
}
