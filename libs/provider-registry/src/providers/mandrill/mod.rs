use async_trait::async_trait;
use esp_core::{Email, EmailProvider, EspError, FromProviderConfig, ProviderConfig, SendReceipt, mock};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::http;

pub const KIND: &str = "mandrill";
const DEFAULT_ENDPOINT: &str = "https://mandrillapp.com/api/1.0";
const ACCEPTED_STATUSES: [&str; 3] = ["sent", "queued", "scheduled"];

/// Mandrill `messages/send` adapter.
pub struct MandrillProvider {
    name: String,
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl FromProviderConfig for MandrillProvider {
    fn from_config(config: &ProviderConfig) -> Result<Self, EspError> {
        let api_key = config.require_str("apiKey")?;
        let endpoint = config.endpoint()?.unwrap_or(DEFAULT_ENDPOINT);
        Ok(Self {
            name: config.name().to_string(),
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
            client: http::client(KIND)?,
        })
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct SendRequest<'a> {
    key: &'a str,
    message: Message<'a>,
}

#[derive(Debug, Serialize, PartialEq)]
struct Message<'a> {
    from_email: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    to: Vec<Recipient<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Serialize, PartialEq)]
struct Recipient<'a> {
    email: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

pub(crate) fn request<'a>(api_key: &'a str, email: &'a Email) -> SendRequest<'a> {
    let to = [("to", email.to()), ("cc", email.cc()), ("bcc", email.bcc())]
        .into_iter()
        .flat_map(|(kind, addresses)| {
            addresses.iter().map(move |address| Recipient {
                email: address.as_str(),
                kind,
            })
        })
        .collect();
    SendRequest {
        key: api_key,
        message: Message {
            from_email: email.from(),
            to,
            subject: non_empty(email.subject()),
            html: non_empty(email.html()),
            text: non_empty(email.text()),
        },
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    status: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct SendStatus {
    status: String,
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(default)]
    reject_reason: Option<String>,
}

/// Mandrill reports most failures in the body, often with a 500 status.
pub(crate) fn classify(name: &str, status: u16, body: &str) -> Result<SendReceipt, EspError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    match parsed {
        Some(value @ Value::Object(_)) => {
            let error: ErrorBody = serde_json::from_value(value).map_err(|err| {
                EspError::rejected("Incorrect Request.").with_source(err)
            })?;
            if error.status != "error" {
                return Err(EspError::rejected("Incorrect Request."));
            }
            Err(match error.name.as_deref() {
                Some("Invalid_Key") => EspError::configuration_invalid(name),
                Some("PaymentRequired") => EspError::activation_required(name),
                _ => EspError::rejected(
                    error
                        .message
                        .filter(|message| !message.is_empty())
                        .unwrap_or_else(|| "Incorrect Request.".to_string()),
                ),
            })
        }
        Some(value @ Value::Array(_)) => {
            let entries: Vec<SendStatus> = serde_json::from_value(value).map_err(|err| {
                EspError::rejected("Incorrect Request.").with_source(err)
            })?;
            if let Some(rejected) = entries
                .iter()
                .find(|entry| !ACCEPTED_STATUSES.contains(&entry.status.as_str()))
            {
                return Err(EspError::rejected(
                    rejected
                        .reject_reason
                        .clone()
                        .unwrap_or_else(|| rejected.status.clone()),
                ));
            }
            let id = entries.into_iter().find_map(|entry| entry.id);
            Ok(SendReceipt::new(name, id))
        }
        _ if status >= 500 => Err(http::server_error(status, body)),
        _ => Err(EspError::rejected("Incorrect Request.")),
    }
}

#[async_trait]
impl EmailProvider for MandrillProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        KIND
    }

    async fn send(&self, email: &Email) -> Result<SendReceipt, EspError> {
        if let Some(scenario) = mock::scenario(&self.endpoint) {
            return mock::resolve(&self.name, scenario);
        }

        let response = self
            .client
            .post(http::build_url(&self.endpoint, "messages/send.json"))
            .json(&request(&self.api_key, email))
            .send()
            .await
            .map_err(|err| http::network_error(KIND, err))?;
        let response = http::read(KIND, response).await?;
        classify(&self.name, response.status, &response.body)
    }
}
