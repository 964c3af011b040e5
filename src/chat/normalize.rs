//! Best-effort normalization of webhook replies.
//!
//! The remote endpoint is an unversioned third-party workflow whose output
//! shape cannot be pinned down. Bodies are classified against an ordered
//! rule list and reduced to a single display string. This never fails: an
//! unrecognized body degrades to raw text or a fixed placeholder.

use serde_json::Value;

/// Shown when the endpoint answers success with an empty body.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "No response received";

/// Fields checked, in order, when the body is a JSON object. First present
/// wins.
const TEXT_FIELD_PRIORITY: [&str; 8] = [
    "response", "message", "text", "answer", "output", "result", "data", "value",
];

/// Fields that may carry a session identifier to echo on later sends.
const SESSION_ID_FIELDS: [&str; 3] = ["conversationId", "sessionId", "id"];

/// How a reply body was classified. Variants are listed in evaluation
/// order; the first matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// Empty or whitespace-only body.
    Empty,
    /// JSON-encoded string body.
    StringBody,
    /// JSON object carrying an `error` field.
    ErrorField,
    /// JSON object with one of the known text fields.
    KnownField,
    /// JSON object with exactly one (unrecognized) key.
    SingleKeyObject,
    /// JSON value with no extractable text; rendered as pretty JSON.
    OpaqueObject,
    /// Anything that is not JSON.
    PlainText,
}

/// A webhook reply reduced to displayable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedReply {
    pub text: String,
    /// Session identifier the reply carried, if any.
    pub conversation_id: Option<String>,
    pub shape: ReplyShape,
}

impl NormalizedReply {
    /// The remote reported an error of its own; `text` is its message.
    pub fn is_remote_error(&self) -> bool {
        self.shape == ReplyShape::ErrorField
    }
}

/// Reduces a raw reply body to a single display string.
///
/// JSON parsing is only attempted when `content_type` says so; a body that
/// fails to parse anyway is shown verbatim. Plain text passes through
/// unchanged apart from trimming, so normalizing already-normalized text is
/// a no-op.
pub fn normalize(body: &str, content_type: Option<&str>) -> NormalizedReply {
    if body.trim().is_empty() {
        return NormalizedReply {
            text: EMPTY_REPLY_PLACEHOLDER.to_string(),
            conversation_id: None,
            shape: ReplyShape::Empty,
        };
    }

    if is_json(content_type) {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            return normalize_json(&value);
        }
        // Content type lied; fall through to plain text.
    }

    NormalizedReply {
        text: body.trim().to_string(),
        conversation_id: None,
        shape: ReplyShape::PlainText,
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false)
}

fn normalize_json(value: &Value) -> NormalizedReply {
    let conversation_id = extract_conversation_id(value);
    let (text, shape) = match value {
        Value::String(s) => (s.clone(), ReplyShape::StringBody),
        Value::Object(map) => {
            if let Some(Value::String(err)) = map.get("error") {
                (err.clone(), ReplyShape::ErrorField)
            } else if let Some(found) = TEXT_FIELD_PRIORITY.iter().find_map(|field| map.get(*field))
            {
                (value_text(found), ReplyShape::KnownField)
            } else if let Some(only) = single_value(map) {
                (value_text(only), ReplyShape::SingleKeyObject)
            } else {
                (pretty(value), ReplyShape::OpaqueObject)
            }
        }
        other => (pretty(other), ReplyShape::OpaqueObject),
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return NormalizedReply {
            text: EMPTY_REPLY_PLACEHOLDER.to_string(),
            conversation_id,
            shape: ReplyShape::Empty,
        };
    }
    NormalizedReply {
        text,
        conversation_id,
        shape,
    }
}

fn extract_conversation_id(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    SESSION_ID_FIELDS
        .iter()
        .find_map(|field| match map.get(*field) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
}

fn single_value(map: &serde_json::Map<String, Value>) -> Option<&Value> {
    if map.len() == 1 {
        map.values().next()
    } else {
        None
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => pretty(other),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
