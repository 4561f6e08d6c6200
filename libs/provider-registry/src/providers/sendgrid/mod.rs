use async_trait::async_trait;
use esp_core::{Email, EmailProvider, EspError, FromProviderConfig, ProviderConfig, SendReceipt, mock};
use serde::{Deserialize, Serialize};

use super::http;

pub const KIND: &str = "sendgrid";
const DEFAULT_ENDPOINT: &str = "https://api.sendgrid.com/v3";
const MESSAGE_ID_HEADER: &str = "x-message-id";

/// SendGrid v3 `mail/send` adapter.
pub struct SendGridProvider {
    name: String,
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl FromProviderConfig for SendGridProvider {
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

#[derive(Debug, Serialize)]
pub(crate) struct MailSend<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cc: Vec<Address<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bcc: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    mime: &'static str,
    value: &'a str,
}

fn addresses(list: &[String]) -> Vec<Address<'_>> {
    list.iter()
        .map(|email| Address {
            email: email.as_str(),
        })
        .collect()
}

pub(crate) fn mail_send(email: &Email) -> MailSend<'_> {
    let content = [("text/plain", email.text()), ("text/html", email.html())]
        .into_iter()
        .filter_map(|(mime, value)| {
            value
                .filter(|value| !value.is_empty())
                .map(|value| Content { mime, value })
        })
        .collect();
    MailSend {
        personalizations: [Personalization {
            to: addresses(email.to()),
            cc: addresses(email.cc()),
            bcc: addresses(email.bcc()),
        }],
        from: Address {
            email: email.from(),
        },
        subject: email.subject().filter(|subject| !subject.is_empty()),
        content,
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    message: Option<String>,
}

fn error_messages(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let messages: Vec<_> = parsed
        .errors
        .into_iter()
        .filter_map(|entry| entry.message)
        .filter(|message| !message.is_empty())
        .collect();
    (!messages.is_empty()).then(|| messages.join("; "))
}

pub(crate) fn classify(
    name: &str,
    status: u16,
    message_id: Option<String>,
    body: &str,
) -> Result<SendReceipt, EspError> {
    match status {
        200..=299 => Ok(SendReceipt::new(name, message_id)),
        401 => Err(EspError::configuration_invalid(name)),
        403 => match error_messages(body) {
            Some(message) if http::mentions_activation(&message) => {
                Err(EspError::activation_required(name))
            }
            _ => Err(EspError::configuration_invalid(name)),
        },
        400..=499 => Err(EspError::rejected(
            error_messages(body).unwrap_or_else(|| "Incorrect Request.".to_string()),
        )),
        _ => Err(http::server_error(status, body)),
    }
}

#[async_trait]
impl EmailProvider for SendGridProvider {
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
            .post(http::build_url(&self.endpoint, "mail/send"))
            .bearer_auth(&self.api_key)
            .json(&mail_send(email))
            .send()
            .await
            .map_err(|err| http::network_error(KIND, err))?;
        let message_id = response
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let response = http::read(KIND, response).await?;
        classify(&self.name, response.status, message_id, &response.body)
    }
}
