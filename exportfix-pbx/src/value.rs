//! Property-list values as they appear in a `.pbxproj` file.

use indexmap::IndexMap;

/// Insertion-ordered dictionary.
pub type Dict = IndexMap<String, PbxValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PbxValue {
    String(String),
    Array(Vec<PbxValue>),
    Dict(Dict),
    Data(Vec<u8>),
}

impl PbxValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PbxValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PbxValue]> {
        match self {
            PbxValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<PbxValue>> {
        match self {
            PbxValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            PbxValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            PbxValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Strings contained in an array value, skipping non-strings.
    pub fn strings(&self) -> Vec<&str> {
        match self {
            PbxValue::String(s) => vec![s.as_str()],
            PbxValue::Array(items) => items.iter().filter_map(PbxValue::as_str).collect(),
            _ => vec![],
        }
    }
}

impl From<&str> for PbxValue {
    fn from(s: &str) -> Self {
        PbxValue::String(s.to_string())
    }
}

impl From<String> for PbxValue {
    fn from(s: String) -> Self {
        PbxValue::String(s)
    }
}

impl From<Dict> for PbxValue {
    fn from(d: Dict) -> Self {
        PbxValue::Dict(d)
    }
}

impl From<Vec<PbxValue>> for PbxValue {
    fn from(items: Vec<PbxValue>) -> Self {
        PbxValue::Array(items)
    }
}

/// Fetch a string field from a dictionary.
pub fn str_field<'a>(dict: &'a Dict, key: &str) -> Option<&'a str> {
    dict.get(key).and_then(PbxValue::as_str)
}
