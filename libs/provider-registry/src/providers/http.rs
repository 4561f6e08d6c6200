use esp_core::EspError;
use serde_json::Value;

pub(crate) fn client(kind: &str) -> Result<reqwest::Client, EspError> {
    reqwest::Client::builder()
        .user_agent(concat!("esp-connector/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| {
            EspError::transport(format!("failed to create HTTP client for {kind}")).with_source(err)
        })
}

pub(crate) fn build_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Status and body text of a vendor response.
pub(crate) struct VendorResponse {
    pub status: u16,
    pub body: String,
}

pub(crate) async fn read(
    kind: &str,
    response: reqwest::Response,
) -> Result<VendorResponse, EspError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|err| {
        EspError::transport(format!("failed to read {kind} response body")).with_source(err)
    })?;
    Ok(VendorResponse { status, body })
}

pub(crate) fn network_error(kind: &str, err: reqwest::Error) -> EspError {
    EspError::transport(format!("failed to call {kind} API")).with_source(err)
}

pub(crate) fn server_error(status: u16, body: &str) -> EspError {
    EspError::transport(format!("status={status} body={body}"))
}

/// Top-level `message` string of a JSON error body.
pub(crate) fn vendor_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

pub(crate) fn mentions_activation(message: &str) -> bool {
    message.to_ascii_lowercase().contains("activat")
}
