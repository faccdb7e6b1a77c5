//! Wire format.
//!
//! Every message is a JSON object `{ "type": ..., "body": ..., "requestId"? }`.
//! The reserved types are listed as constants; providers add their own.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vista_digest::DigestRow;

/// Sent once by the surface when it can receive messages.
pub const READY: &str = "ready";
/// Correlated reply to a message that carried a `requestId`.
pub const RESPONSE: &str = "response";
pub const DIGEST: &str = "digest";
pub const STATE: &str = "state";
pub const INIT: &str = "init";
pub const RENDER_IN_VIEWER: &str = "render-in-viewer";
pub const OPEN_AS_TEXT: &str = "open-as-text";
pub const UPDATE_DEFAULT_OPEN_AS_TEXT: &str = "update-default-open-as-text";

/// One message in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "empty_body")]
    pub body: Value,
    #[serde(rename = "requestId", default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
}

pub(crate) fn empty_body() -> Value {
    Value::Object(Map::new())
}

impl Message {
    /// A message with an empty `{}` body.
    pub fn new(kind: impl Into<String>) -> Self {
        Self::with_body(kind, empty_body())
    }

    pub fn with_body(kind: impl Into<String>, body: Value) -> Self {
        Self {
            kind: kind.into(),
            body,
            request_id: None,
        }
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

/// Body of a [`DIGEST`] message: the whole digest so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestBody {
    pub digest: Vec<DigestRow>,
    #[serde(rename = "final")]
    pub finalized: bool,
}

/// Body of a [`STATE`] message: whether the view is the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBody {
    pub active: bool,
}

/// Body of an [`INIT`] message.
///
/// Both fields are omitted (`{}`) when there is nothing to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
}

/// Body of an [`UPDATE_DEFAULT_OPEN_AS_TEXT`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledBody {
    pub enabled: bool,
}

/// Body of a [`RESPONSE`] message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "requestId")]
    pub request_id: u64,
    #[serde(default)]
    pub body: Value,
}
