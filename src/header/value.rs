//! Typed header values and the parsed header record.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::constants::KEY_TYPE;
use crate::error::{CrismError, Result};

/// A single header value after type coercion.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Value made only of ASCII digits
    Int(i64),
    /// Value accepted by the float parser (signed, exponent, `inf`, `nan`)
    Float(f64),
    /// Anything else on a single line
    Str(String),
    /// Brace-delimited value, from the first `{` through the end of the
    /// closing line, with line breaks removed
    Composite(String),
}

impl HeaderValue {
    /// Integer value, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value as f64 (`Int` or `Float`).
    pub fn as_float(&self) -> Option<f64> {
        match self {
            HeaderValue::Int(v) => Some(*v as f64),
            HeaderValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// String value, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Raw composite text, if this is a `Composite`.
    pub fn as_composite(&self) -> Option<&str> {
        match self {
            HeaderValue::Composite(s) => Some(s),
            _ => None,
        }
    }

    /// Split a composite `{a, b, c}` value into its trimmed items.
    ///
    /// Text after the closing brace is ignored. Returns `None` for non-composite values.
    pub fn list_items(&self) -> Option<Vec<&str>> {
        let raw = self.as_composite()?;
        let inner = raw.strip_prefix('{').unwrap_or(raw);
        let inner = match inner.rfind('}') {
            Some(end) => &inner[..end],
            None => inner,
        };
        Some(
            inner
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .collect(),
        )
    }

    /// Short name of the value kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            HeaderValue::Int(_) => "integer",
            HeaderValue::Float(_) => "float",
            HeaderValue::Str(_) => "string",
            HeaderValue::Composite(_) => "composite",
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Int(v) => write!(f, "{}", v),
            // Debug keeps the fractional part so `3.0` does not come back as an integer
            HeaderValue::Float(v) => write!(f, "{:?}", v),
            HeaderValue::Str(s) | HeaderValue::Composite(s) => f.write_str(s),
        }
    }
}

/// Parsed header: field name to typed value.
///
/// Entries keep the order in which each key first appeared; a repeated key
/// overwrites the earlier value in place. The verbatim first line of the
/// header is stored under the `type` key and kept separately as the format
/// tag, so a later `type = ...` line replaces the field but not the tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderRecord {
    tag: Option<String>,
    entries: Vec<(String, HeaderValue)>,
}

impl HeaderRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if the key already existed.
    pub fn insert(&mut self, key: impl Into<String>, value: HeaderValue) -> Option<HeaderValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether the record contains a field.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of fields, including the `type` tag.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over fields in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Record the verbatim first line of the header, also as the `type` field.
    pub fn set_format_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        self.insert(KEY_TYPE, HeaderValue::Str(tag.clone()));
        self.tag = Some(tag);
    }

    /// The verbatim first line of the header.
    pub fn format_tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Get a required field.
    pub fn require(&self, key: &str) -> Result<&HeaderValue> {
        self.get(key).ok_or_else(|| CrismError::missing_field(key))
    }

    /// Get a required integer field.
    pub fn require_int(&self, key: &str) -> Result<i64> {
        self.require(key)?
            .as_int()
            .ok_or_else(|| CrismError::field_type(key, "an integer"))
    }

    /// Get a required single-line string field.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| CrismError::field_type(key, "a string"))
    }

    /// Parse a composite field as a list of floats.
    ///
    /// Returns `Ok(None)` when the field is absent.
    pub fn float_list(&self, key: &str) -> Result<Option<Vec<f64>>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let items = value
            .list_items()
            .ok_or_else(|| CrismError::field_type(key, "a {…} list"))?;
        items
            .iter()
            .map(|item| {
                item.parse::<f64>()
                    .map_err(|_| CrismError::field_type(key, "a list of numbers"))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Parse a composite field as a list of strings. Returns `None` when absent
    /// or not a composite.
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key)?
            .list_items()
            .map(|items| items.into_iter().map(str::to_string).collect())
    }

    /// Write the record back out in header syntax.
    ///
    /// The first line is the format tag; every other field becomes `key = value`.
    /// The `type` field is written only when a later line replaced the tag.
    pub fn to_header_string(&self) -> String {
        let tag = self.format_tag().unwrap_or_default();
        let mut out = String::new();
        out.push_str(tag);
        out.push('\n');
        for (key, value) in self.iter() {
            if key == KEY_TYPE && value.as_str() == Some(tag) {
                continue;
            }
            out.push_str(&format!("{} = {}\n", key, value));
        }
        out
    }

    /// Export the record as a JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for HeaderRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_last_wins_keeps_position() {
        let mut record = HeaderRecord::new();
        record.insert("samples", HeaderValue::Int(10));
        record.insert("lines", HeaderValue::Int(5));
        let previous = record.insert("samples", HeaderValue::Int(20));

        assert_eq!(previous, Some(HeaderValue::Int(10)));
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("samples"), Some(&HeaderValue::Int(20)));
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["samples", "lines"]);
    }

    #[test]
    fn test_require_errors() {
        let mut record = HeaderRecord::new();
        record.insert("samples", HeaderValue::Float(3.5));

        assert!(matches!(
            record.require_int("lines"),
            Err(CrismError::MissingField { .. })
        ));
        assert!(matches!(
            record.require_int("samples"),
            Err(CrismError::FieldType { .. })
        ));
    }

    #[test]
    fn test_list_items() {
        let value = HeaderValue::Composite("{ 1.0, 2.5,3.75 }".to_string());
        assert_eq!(value.list_items(), Some(vec!["1.0", "2.5", "3.75"]));

        let trailing = HeaderValue::Composite("{a, b} ;comment".to_string());
        assert_eq!(trailing.list_items(), Some(vec!["a", "b"]));

        assert_eq!(HeaderValue::Str("x".to_string()).list_items(), None);
    }

    #[test]
    fn test_float_list() {
        let mut record = HeaderRecord::new();
        record.insert(
            "wavelength",
            HeaderValue::Composite("{0.4, 0.5, 0.6}".to_string()),
        );
        record.insert("bad", HeaderValue::Composite("{0.4, abc}".to_string()));

        assert_eq!(
            record.float_list("wavelength").unwrap(),
            Some(vec![0.4, 0.5, 0.6])
        );
        assert_eq!(record.float_list("missing").unwrap(), None);
        assert!(record.float_list("bad").is_err());
    }

    #[test]
    fn test_float_display_keeps_fraction() {
        assert_eq!(HeaderValue::Float(3.0).to_string(), "3.0");
        assert_eq!(HeaderValue::Float(-0.25).to_string(), "-0.25");
        assert_eq!(HeaderValue::Int(42).to_string(), "42");
    }

    #[test]
    fn test_type_field_does_not_replace_tag() {
        let mut record = HeaderRecord::new();
        record.set_format_tag("ENVI");
        record.insert("samples", HeaderValue::Int(3));
        record.insert("type", HeaderValue::Int(5));

        assert_eq!(record.format_tag(), Some("ENVI"));
        assert_eq!(record.get("type"), Some(&HeaderValue::Int(5)));
        assert_eq!(record.to_header_string(), "ENVI\ntype = 5\nsamples = 3\n");
    }

    #[test]
    fn test_json_export() {
        let mut record = HeaderRecord::new();
        record.set_format_tag("ENVI");
        record.insert("samples", HeaderValue::Int(640));
        record.insert("reflectance scale factor", HeaderValue::Float(1.5));

        let json = record.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["type"], "ENVI");
        assert_eq!(parsed["samples"], 640);
        assert_eq!(parsed["reflectance scale factor"], 1.5);
    }
}
