//! Stored field values.
//!
//! A stored field is kept verbatim by the index, so it is the authoritative
//! source for a document's content. [`StoredValue`] mirrors the value types
//! an index can store:
//!
//! - **Text** - String data
//! - **Binary** - Raw byte data
//! - **Int** / **Long** - 32 and 64-bit signed integers
//! - **Float** / **Double** - 32 and 64-bit floating-point numbers
//!
//! ```
//! use palimpsest::index::stored::StoredValue;
//!
//! let text = StoredValue::Text("hello".to_string());
//! assert_eq!(text.as_text(), Some("hello"));
//!
//! let number = StoredValue::Long(42);
//! assert_eq!(number.to_display_string(), "42");
//! ```

use serde::{Deserialize, Serialize};

/// Represents a value kept verbatim in a document's stored fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoredValue {
    /// Text value
    Text(String),
    /// Binary data
    Binary(Vec<u8>),
    /// 32-bit integer value
    Int(i32),
    /// 64-bit integer value
    Long(i64),
    /// 32-bit floating point value
    Float(f32),
    /// 64-bit floating point value
    Double(f64),
}

impl StoredValue {
    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StoredValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as binary data, if possible.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            StoredValue::Binary(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, StoredValue::Binary(_))
    }

    /// Short type tag used by exporters.
    pub fn type_name(&self) -> &'static str {
        match self {
            StoredValue::Text(_) => "text",
            StoredValue::Binary(_) => "binary",
            StoredValue::Int(_) => "int",
            StoredValue::Long(_) => "long",
            StoredValue::Float(_) => "float",
            StoredValue::Double(_) => "double",
        }
    }

    /// Human-readable rendering. Binary data is rendered as lowercase hex.
    pub fn to_display_string(&self) -> String {
        match self {
            StoredValue::Text(s) => s.clone(),
            StoredValue::Binary(data) => data.iter().map(|b| format!("{b:02x}")).collect(),
            StoredValue::Int(v) => v.to_string(),
            StoredValue::Long(v) => v.to_string(),
            StoredValue::Float(v) => v.to_string(),
            StoredValue::Double(v) => v.to_string(),
        }
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Text(value.to_string())
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Text(value)
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Long(value)
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Double(value)
    }
}

/// A named stored value as returned by the host for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredField {
    pub name: String,
    pub value: StoredValue,
}

impl StoredField {
    pub fn new<S: Into<String>, V: Into<StoredValue>>(name: S, value: V) -> Self {
        StoredField {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings() {
        assert_eq!(StoredValue::Binary(vec![0x00, 0xab, 0x10]).to_display_string(), "00ab10");
        assert_eq!(StoredValue::Int(-5).to_display_string(), "-5");
        assert_eq!(StoredValue::Double(2.5).to_display_string(), "2.5");
        assert_eq!(StoredValue::from("x").type_name(), "text");
        assert!(StoredValue::Binary(vec![]).is_binary());
    }

    #[test]
    fn test_serde_roundtrip_shape() {
        let field = StoredField::new("year", 2024i64);
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"name":"year","value":{"Long":2024}}"#);
    }
}
