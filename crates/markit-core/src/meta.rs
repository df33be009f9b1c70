//! Attribute and metadata maps carried by tokens and nodes

use std::fmt;

use indexmap::IndexMap;

/// HTML attributes, unique keys in insertion order
pub type Attrs = IndexMap<String, String>;

/// Kind-specific metadata (heading level, fence info, link url, ...)
pub type Meta = IndexMap<String, MetaValue>;

/// A metadata value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<MetaValue>),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            MetaValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[MetaValue]> {
        match self {
            MetaValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Str(s) => f.write_str(s),
            MetaValue::Int(n) => write!(f, "{n}"),
            MetaValue::Bool(b) => write!(f, "{b}"),
            MetaValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Str(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Str(s)
    }
}

impl From<i64> for MetaValue {
    fn from(n: i64) -> Self {
        MetaValue::Int(n)
    }
}

impl From<usize> for MetaValue {
    fn from(n: usize) -> Self {
        MetaValue::Int(n as i64)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

impl<T: Into<MetaValue>> From<Vec<T>> for MetaValue {
    fn from(items: Vec<T>) -> Self {
        MetaValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Read a string entry, empty when absent
pub fn meta_str<'a>(meta: &'a Meta, key: &str) -> &'a str {
    meta.get(key).and_then(MetaValue::as_str).unwrap_or("")
}

/// Read an integer entry
pub fn meta_int(meta: &Meta, key: &str) -> Option<i64> {
    meta.get(key).and_then(MetaValue::as_int)
}

/// Read a boolean entry, false when absent
pub fn meta_bool(meta: &Meta, key: &str) -> bool {
    meta.get(key).and_then(MetaValue::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(MetaValue::from("text").to_string(), "text");
        assert_eq!(MetaValue::from(3usize).to_string(), "3");
        assert_eq!(MetaValue::from(true).to_string(), "true");
    }

    #[test]
    fn test_display_list() {
        let value = MetaValue::from(vec!["left", "none"]);
        assert_eq!(value.to_string(), "[left, none]");
        assert_eq!(MetaValue::List(vec![]).to_string(), "[]");
    }

    #[test]
    fn test_typed_readers() {
        let mut meta = Meta::new();
        meta.insert("level".into(), 2usize.into());
        meta.insert("tight".into(), true.into());
        assert_eq!(meta_int(&meta, "level"), Some(2));
        assert!(meta_bool(&meta, "tight"));
        assert_eq!(meta_str(&meta, "level"), "");
        assert_eq!(meta_str(&meta, "missing"), "");
    }
}
