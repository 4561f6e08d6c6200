use serde_json::{Map, Value};

use crate::errors::EspError;
use crate::validate::{optional_str, require_str};

/// Validated registration settings for one provider instance.
///
/// `name` and `provider` are checked when the config is parsed; the remaining
/// vendor-specific fields are checked by the adapter constructor.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderConfig {
    name: String,
    provider: String,
    fields: Map<String, Value>,
}

impl ProviderConfig {
    /// Parses the loosely typed registration object.
    ///
    /// ```
    /// use esp_core::ProviderConfig;
    /// use serde_json::json;
    ///
    /// let config = ProviderConfig::from_value(&json!({
    ///     "name": "ironman",
    ///     "provider": "mailgun",
    ///     "apiKey": "key-123",
    /// }))
    /// .unwrap();
    /// assert_eq!(config.name(), "ironman");
    /// assert_eq!(config.provider(), "mailgun");
    /// assert_eq!(config.require_str("apiKey").unwrap(), "key-123");
    /// ```
    pub fn from_value(value: &Value) -> Result<Self, EspError> {
        let fields = value
            .as_object()
            .ok_or_else(EspError::invalid_configuration)?;
        let name = require_str(fields, "name")?.to_string();
        let provider = require_str(fields, "provider")?.to_string();
        Ok(Self {
            name,
            provider,
            fields: fields.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vendor kind tag, e.g. `mailgun`.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn require_str(&self, field: &str) -> Result<&str, EspError> {
        require_str(&self.fields, field)
    }

    pub fn optional_str(&self, field: &str) -> Result<Option<&str>, EspError> {
        optional_str(&self.fields, field)
    }

    /// Optional base URL override shared by every adapter.
    pub fn endpoint(&self) -> Result<Option<&str>, EspError> {
        self.optional_str("endpoint")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;

    #[test]
    fn rejects_non_objects() {
        for value in [json!(null), json!("x"), json!(9), json!([])] {
            let err = ProviderConfig::from_value(&value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ParameterInvalid);
            assert_eq!(err.message(), "Invalid configuration object passed.");
        }
    }

    #[test]
    fn name_is_checked_before_provider() {
        let err = ProviderConfig::from_value(&json!({})).unwrap_err();
        assert_eq!(err.message(), "name is required.");
        assert_eq!(err.code(), "PARAM_REQUIRED");

        let err = ProviderConfig::from_value(&json!({ "name": "xyz" })).unwrap_err();
        assert_eq!(err.message(), "provider is required.");

        let err = ProviderConfig::from_value(&json!({ "name": 4, "provider": 5 })).unwrap_err();
        assert_eq!(err.message(), "name should be a string.");
    }

    #[test]
    fn endpoint_is_optional() {
        let config =
            ProviderConfig::from_value(&json!({ "name": "a", "provider": "b" })).unwrap();
        assert_eq!(config.endpoint().unwrap(), None);

        let config = ProviderConfig::from_value(
            &json!({ "name": "a", "provider": "b", "endpoint": "mock://success" }),
        )
        .unwrap();
        assert_eq!(config.endpoint().unwrap(), Some("mock://success"));
    }
}
