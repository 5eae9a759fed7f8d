use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Human-readable notification derived from one changed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Structured payload delivered alongside the visible text.
    pub data: Value,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>, data: Value) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data,
        }
    }

    /// Payload shape shared by every collection: `{ "type": kind, "doc": document }`.
    pub fn payload(kind: &str, doc: &Value) -> Value {
        json!({ "type": kind, "doc": doc })
    }

    /// Generic message used for unrecognized collections.
    pub fn generic(collection: &str, doc: &Value) -> Self {
        Self::new(
            "update",
            format!("Update in {}", collection),
            Self::payload(collection, doc),
        )
    }

    /// Fallback used when a document cannot be interpolated.
    pub fn degraded(collection: &str, doc: &Value) -> Self {
        Self::new(
            "error",
            format!("Update in {}", collection),
            Self::payload(collection, doc),
        )
    }
}
