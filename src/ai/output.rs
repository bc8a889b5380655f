//! Normalization of the model's output into a single result URL.
//!
//! The hosted model does not commit to one output shape: depending on the
//! model version it returns a bare URL, a file object carrying a `url`, or a
//! list of either.

use crate::{Error, Result};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// An object exposing a `url` attribute.
    UrlBearing { url: String },
    UrlString(String),
    ResultList(Vec<ModelOutput>),
    /// Any other JSON value; reported by its textual form.
    Other(Value),
}

impl From<Value> for ModelOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => {
                let url = map.get("url").and_then(Value::as_str).map(str::to_string);
                match url {
                    Some(url) => ModelOutput::UrlBearing { url },
                    None => ModelOutput::Other(Value::Object(map)),
                }
            }
            Value::String(s) => ModelOutput::UrlString(s),
            Value::Array(items) => {
                ModelOutput::ResultList(items.into_iter().map(ModelOutput::from).collect())
            }
            other => ModelOutput::Other(other),
        }
    }
}

impl ModelOutput {
    /// Resolve the output to the URL handed back to the caller.
    ///
    /// Only the first element of a list is considered. An empty list is the
    /// one shape that cannot produce a URL.
    pub fn into_url(self) -> Result<String> {
        match self {
            ModelOutput::ResultList(items) => match items.into_iter().next() {
                Some(first) => Ok(first.into_scalar_url()),
                None => Err(Error::NoOutput),
            },
            other => Ok(other.into_scalar_url()),
        }
    }

    fn into_scalar_url(self) -> String {
        match self {
            ModelOutput::UrlBearing { url } => url,
            ModelOutput::UrlString(url) => url,
            ModelOutput::ResultList(items) => {
                Value::Array(items.into_iter().map(ModelOutput::into_value).collect()).to_string()
            }
            ModelOutput::Other(value) => value.to_string(),
        }
    }

    fn into_value(self) -> Value {
        match self {
            ModelOutput::UrlBearing { url } => serde_json::json!({ "url": url }),
            ModelOutput::UrlString(s) => Value::String(s),
            ModelOutput::ResultList(items) => {
                Value::Array(items.into_iter().map(ModelOutput::into_value).collect())
            }
            ModelOutput::Other(value) => value,
        }
    }
}
