//! Batch operations: one request carrying multiple logical targets, with
//! independent per-item outcomes. The server may accept some items and
//! reject others, so results come back as one `Result` slot per input —
//! a rejected item never aborts its siblings.

use serde_json::Value;

use super::StrataClient;
use crate::errors::{ClientError, ClientResult};
use crate::object::GenericObject;
use crate::request::Operation;

/// Per-item outcomes of a batch call, aligned with the input order
pub type BatchResults = Vec<ClientResult<GenericObject>>;

const BATCH_PATH: &str = "_batch";

impl StrataClient {
    /// Save multiple objects in one request
    pub async fn create_all(&self, objects: &[GenericObject]) -> ClientResult<BatchResults> {
        if objects.is_empty() {
            return Ok(Vec::new());
        }
        let body = Value::Array(objects.iter().map(GenericObject::to_value).collect());
        let value = self.get_value(Operation::post(BATCH_PATH).body(body)).await?;
        Ok(batch_results(value, objects.len()))
    }

    /// Retrieve multiple objects by id in one request
    pub async fn read_all(&self, ids: &[&str]) -> ClientResult<BatchResults> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = ids
            .iter()
            .map(|id| ("ids".to_string(), id.to_string()))
            .collect();
        let value = self.get_value(Operation::get(BATCH_PATH).params(params)).await?;
        Ok(batch_results(value, ids.len()))
    }

    /// Update multiple objects in one request. Partial-field semantics per
    /// item, as with [`update`](Self::update).
    pub async fn update_all(&self, objects: &[GenericObject]) -> ClientResult<BatchResults> {
        if objects.is_empty() {
            return Ok(Vec::new());
        }
        let body = Value::Array(objects.iter().map(GenericObject::to_value).collect());
        let value = self.get_value(Operation::patch(BATCH_PATH).body(body)).await?;
        Ok(batch_results(value, objects.len()))
    }

    /// Delete multiple objects in one request. The backend returns no
    /// per-item body for batch deletes; like [`delete`](Self::delete) this
    /// is idempotent over already-absent ids.
    pub async fn delete_all(&self, ids: &[&str]) -> ClientResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let params = ids
            .iter()
            .map(|id| ("ids".to_string(), id.to_string()))
            .collect();
        self.invoke_delete(BATCH_PATH, params).await?;
        Ok(())
    }
}

/// Map a batch response array onto per-item results.
///
/// The response is expected to hold one slot per request item, in order:
/// a stored object for accepted items, `null` or a `{code, message}` error
/// body for rejected ones. Missing trailing slots count as rejections.
fn batch_results(value: Value, expected: usize) -> BatchResults {
    let empty = Vec::new();
    let slots = value.as_array().unwrap_or(&empty);
    (0..expected)
        .map(|i| match slots.get(i) {
            Some(Value::Null) | None => Err(ClientError::invalid_input(
                format!("/{}", BATCH_PATH),
                format!("item {} rejected by server", i),
            )),
            Some(slot) => {
                if let Some(code) = error_code(slot) {
                    let message = slot
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    Err(ClientError::from_status(
                        code,
                        &format!("/{}", BATCH_PATH),
                        message,
                    ))
                } else {
                    GenericObject::from_value(slot.clone())
                }
            }
        })
        .collect()
}

/// An error slot carries a numeric `code` and a `message`, and no object id
fn error_code(slot: &Value) -> Option<u16> {
    if slot.get("id").is_some() {
        return None;
    }
    let code = slot.get("code")?.as_u64()?;
    slot.get("message")?;
    u16::try_from(code).ok()
}
