// List response shape normalization
//
// Organization-wide Dashboard endpoints answer either with a bare JSON array
// or with an `{ "items": [...], "meta": {...} }` envelope, depending on the
// endpoint generation. The shape is resolved exactly once here; everything
// above the client only ever sees a `Vec<T>`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// A decoded page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    /// The page arrived as `{ "items": [...], "meta": {...} }`.
    Items(Vec<T>),
    /// The page arrived as a bare array.
    Bare(Vec<T>),
}

impl<T: DeserializeOwned> Listing<T> {
    /// Classify and decode a raw JSON page.
    ///
    /// Anything that is neither an array nor an object carrying an `items`
    /// array is logged and treated as an empty bare listing.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Array(_) => serde_json::from_value(value).map(Self::Bare),
            Value::Object(mut map) => match map.remove("items") {
                Some(items @ Value::Array(_)) => serde_json::from_value(items).map(Self::Items),
                _ => {
                    let keys: Vec<&String> = map.keys().collect();
                    warn!(?keys, "unrecognized list envelope, treating as empty");
                    Ok(Self::Bare(Vec::new()))
                }
            },
            other => {
                warn!(kind = json_kind(&other), "unrecognized list response, treating as empty");
                Ok(Self::Bare(Vec::new()))
            }
        }
    }
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Items(items) | Self::Bare(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Items(items) | Self::Bare(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
