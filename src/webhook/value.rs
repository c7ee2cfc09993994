//! Typed view of a decoded webhook document.

use std::collections::BTreeMap;

/// A node in a webhook document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    String(String),
    Mapping(BTreeMap<String, DocValue>),
    /// Numbers, booleans, null and arrays. Never rendered.
    Other(serde_json::Value),
}

impl DocValue {
    /// Decode a JSON body.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<serde_json::Value>(body).map(Self::from)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, DocValue>> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Short description of the node kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Mapping(_) => "mapping",
            Self::Other(serde_json::Value::Null) => "null",
            Self::Other(serde_json::Value::Bool(_)) => "boolean",
            Self::Other(serde_json::Value::Number(_)) => "number",
            Self::Other(_) => "array",
        }
    }
}

impl From<serde_json::Value> for DocValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
            other => Self::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_objects_become_mappings() {
        let doc = DocValue::from_json(br#"{"a":{"b":"c"},"n":1}"#).unwrap();
        let root = doc.as_mapping().unwrap();
        assert_eq!(root["a"].as_mapping().unwrap()["b"].as_str(), Some("c"));
        assert_eq!(root["n"].kind(), "number");
        assert_eq!(root["n"].as_str(), None);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(DocValue::from_json(b"{not json").is_err());
    }
}
