//! Shared field checks used by the registry and by every adapter constructor.
//!
//! Checks run presence first, then type, then format.

use serde_json::{Map, Value};

use crate::errors::EspError;

/// Returns the string under `field`, failing with `ParameterRequired` when it
/// is absent, null or empty and with `ParameterInvalid` when it is not a string.
///
/// ```
/// use esp_core::validate::require_str;
/// use serde_json::json;
///
/// let config = json!({ "apiKey": "key-123", "domain": {} });
/// let config = config.as_object().unwrap();
/// assert_eq!(require_str(config, "apiKey").unwrap(), "key-123");
/// assert_eq!(require_str(config, "region").unwrap_err().message(), "region is required.");
/// assert_eq!(require_str(config, "domain").unwrap_err().message(), "domain should be a string.");
/// ```
pub fn require_str<'a>(fields: &'a Map<String, Value>, field: &str) -> Result<&'a str, EspError> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(EspError::parameter_required(field)),
        Some(Value::String(value)) if value.is_empty() => Err(EspError::parameter_required(field)),
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(EspError::not_a_string(field)),
    }
}

/// Like [`require_str`] but absence is allowed.
pub fn optional_str<'a>(
    fields: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a str>, EspError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if value.is_empty() => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(EspError::not_a_string(field)),
    }
}

/// Format check: `value` must begin with `prefix`.
pub fn require_prefix(field: &str, value: &str, prefix: &str) -> Result<(), EspError> {
    if value.starts_with(prefix) {
        Ok(())
    } else {
        Err(EspError::parameter_invalid(format!(
            "{field} should start with {prefix}"
        )))
    }
}

/// Checks a lookup key supplied directly by the caller.
pub fn require_name(name: &str) -> Result<&str, EspError> {
    if name.trim().is_empty() {
        return Err(EspError::parameter_required("name"));
    }
    Ok(name)
}
