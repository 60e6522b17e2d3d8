//! # Response Decoder
//!
//! Maps a raw status + body into the success shapes (unit, single JSON
//! value, page of objects) or the error taxonomy. Server error bodies are
//! expected to carry `{code, message}`; the message text is surfaced
//! verbatim so callers see what the server said.

use serde_json::Value;

use crate::errors::{ClientError, ClientResult};
use crate::object::GenericObject;
use crate::pager::{Page, Pager};

/// A decoded success response
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// 2xx with an empty body, e.g. a successful DELETE
    Empty,
    /// 2xx with a JSON body
    Json(Value),
}

impl Decoded {
    /// The JSON value, if any
    pub fn into_json(self) -> Option<Value> {
        match self {
            Decoded::Empty => None,
            Decoded::Json(value) => Some(value),
        }
    }
}

/// Decode a raw response for the given resource path
pub fn decode(status: u16, path: &str, body: &[u8]) -> ClientResult<Decoded> {
    if (200..300).contains(&status) {
        if body.is_empty() {
            return Ok(Decoded::Empty);
        }
        return match serde_json::from_slice::<Value>(body) {
            Ok(value) => Ok(Decoded::Json(value)),
            // malformed body on a success status is a contract violation,
            // not a transient failure
            Err(e) => Err(ClientError::Decode {
                status,
                path: path.to_string(),
                message: format!("malformed JSON: {}", e),
            }),
        };
    }

    let message = error_message(body);
    tracing::warn!(status, path, message = message.as_deref().unwrap_or(""), "error response");
    Err(ClientError::from_status(status, path, message))
}

/// Extract the `message` from a `{code, message}` error body, falling back
/// to the raw text for non-JSON bodies
fn error_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| Some(value.to_string())),
        Err(_) => Some(String::from_utf8_lossy(body).into_owned()),
    }
}

/// Decode a JSON value as a single object
pub fn into_object(value: Value, path: &str) -> ClientResult<GenericObject> {
    GenericObject::from_value(value).map_err(|_| ClientError::Decode {
        status: 200,
        path: path.to_string(),
        message: "expected a single object".to_string(),
    })
}

/// Decode the objects in a JSON array, skipping non-object entries
pub fn items_from_list(values: &[Value]) -> Vec<GenericObject> {
    values
        .iter()
        .filter_map(|v| GenericObject::from_value(v.clone()).ok())
        .collect()
}

/// Decode a search/list response body into a `Page`, reading the items
/// from the given field and updating the pager's total and cursor.
/// A body without that field yields an empty page: partial results are
/// surfaced, never turned into an error.
pub fn into_page(value: &Value, at: &str, mut pager: Option<&mut Pager>) -> Page {
    let total = value.get("totalHits").and_then(Value::as_u64);
    let last_key = value
        .get("lastKey")
        .and_then(Value::as_str)
        .map(str::to_string);

    if let Some(pager) = pager.as_deref_mut() {
        if total.is_some() {
            pager.count = total;
        }
        if last_key.is_some() {
            pager.last_key = last_key.clone();
        }
    }

    let items = value
        .get(at)
        .and_then(Value::as_array)
        .map(|list| items_from_list(list))
        .unwrap_or_default();

    Page {
        items,
        total,
        last_key,
    }
}
