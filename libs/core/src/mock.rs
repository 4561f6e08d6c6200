//! `mock://` endpoints let adapters run without touching the network.

use crate::errors::EspError;
use crate::traits::SendReceipt;

pub const MOCK_SCHEME: &str = "mock://";

/// Returns the scenario name when `endpoint` is a mock endpoint.
pub fn scenario(endpoint: &str) -> Option<&str> {
    endpoint.strip_prefix(MOCK_SCHEME)
}

/// Resolves a mock scenario for the provider registered as `name`.
///
/// ```
/// use esp_core::{mock, ErrorKind};
///
/// let receipt = mock::resolve("ironman", "success").unwrap();
/// assert_eq!(receipt.message_id.as_deref(), Some("mock-ironman"));
///
/// let err = mock::resolve("ironman", "inactive").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::ActivationRequired);
/// ```
pub fn resolve(name: &str, scenario: &str) -> Result<SendReceipt, EspError> {
    match scenario {
        "success" => Ok(SendReceipt::new(name, Some(format!("mock-{name}")))),
        "invalid-credentials" => Err(EspError::configuration_invalid(name)),
        "inactive" => Err(EspError::activation_required(name)),
        "rejected" => Err(EspError::rejected("mock rejected")),
        "unreachable" => Err(EspError::transport("mock unreachable")),
        other => Err(EspError::rejected(format!(
            "unknown mock scenario `{other}`"
        ))),
    }
}
