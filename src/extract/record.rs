//! Record structures produced by extraction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A constant or path/target value.
///
/// Untagged so that numeric constants stay numbers in the serialized
/// report instead of being stringified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Get the string contents, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// HTTP method attached to a produced or consumed record.
///
/// Registrations that do not pin a method (`@app.route`, `http.HandleFunc`,
/// bare `fetch`) report `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Unknown,
}

impl HttpMethod {
    /// Map a verb-like identifier (`get`, `POST`, `route`, ...) to a method.
    pub fn from_verb(verb: &str) -> Self {
        match verb.to_ascii_lowercase().as_str() {
            "get" => HttpMethod::Get,
            "post" => HttpMethod::Post,
            "put" => HttpMethod::Put,
            "delete" => HttpMethod::Delete,
            _ => HttpMethod::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One declared endpoint handler.
///
/// `path` may hold a symbolic constant name until the post-resolution pass
/// rewrites it; `None` means the registration had no reachable path argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducedApi {
    pub file: String,
    /// Handler function name. Only the structural extractor can see this;
    /// pattern extractors leave it null.
    pub function: Option<String>,
    pub method: HttpMethod,
    pub path: Option<Value>,
}

/// One outbound call to a recognized HTTP client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumedApi {
    pub file: String,
    pub method: HttpMethod,
    pub target: Option<Value>,
}

/// Everything one extractor found in one file.
///
/// Constants keep their in-file declaration order so that the scanner's
/// walk-order merge gives a reproducible last-write-wins.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub constants: Vec<(String, Value)>,
    pub produced: Vec<ProducedApi>,
    pub consumed: Vec<ConsumedApi>,
}

impl Extraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the file contributed nothing.
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty() && self.produced.is_empty() && self.consumed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_verb() {
        assert_eq!(HttpMethod::from_verb("get"), HttpMethod::Get);
        assert_eq!(HttpMethod::from_verb("POST"), HttpMethod::Post);
        assert_eq!(HttpMethod::from_verb("delete"), HttpMethod::Delete);
        assert_eq!(HttpMethod::from_verb("route"), HttpMethod::Unknown);
        assert_eq!(HttpMethod::from_verb("patch"), HttpMethod::Unknown);
    }

    #[test]
    fn test_method_serializes_uppercase() {
        let json = serde_json::to_string(&HttpMethod::Get).unwrap();
        assert_eq!(json, "\"GET\"");
        let json = serde_json::to_string(&HttpMethod::Unknown).unwrap();
        assert_eq!(json, "\"UNKNOWN\"");
    }

    #[test]
    fn test_value_untagged() {
        let v: Value = serde_json::from_str("42").unwrap();
        assert_eq!(v, Value::Int(42));
        let v: Value = serde_json::from_str("\"/v1/users\"").unwrap();
        assert_eq!(v, Value::Str("/v1/users".to_string()));
        assert_eq!(serde_json::to_string(&Value::Int(42)).unwrap(), "42");
    }
}
