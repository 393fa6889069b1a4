//! Response decoding with undocumented-field masking.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, ApiResult};

/// Fields the current-user payload carries but the API does not document.
/// Their shape has changed without notice and broken strict decoders, so
/// they are dropped before deserialization.
pub(crate) const MASKED_USER_FIELDS: &[&str] = &["pronounsHistory"];

/// Decodes a JSON body after removing the given top-level fields.
pub(crate) fn decode_masked<T: DeserializeOwned>(
    body: &str,
    masked_fields: &[&str],
) -> ApiResult<T> {
    let mut value: Value = serde_json::from_str(body)
        .map_err(|e| ApiError::parse(format!("invalid JSON response: {e}")))?;

    if let Value::Object(object) = &mut value {
        for field in masked_fields {
            object.remove(*field);
        }
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::parse(format!("unexpected response shape: {e}")))
}
