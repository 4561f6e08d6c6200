use async_trait::async_trait;
use esp_core::validate::require_prefix;
use esp_core::{Email, EmailProvider, EspError, FromProviderConfig, ProviderConfig, SendReceipt, mock};
use serde::Deserialize;

use super::http;

pub const KIND: &str = "mailgun";
const DEFAULT_ENDPOINT: &str = "https://api.mailgun.net";
const API_KEY_PREFIX: &str = "key-";

/// Mailgun messages API adapter.
pub struct MailgunProvider {
    name: String,
    api_key: String,
    domain: String,
    endpoint: String,
    client: reqwest::Client,
}

impl FromProviderConfig for MailgunProvider {
    fn from_config(config: &ProviderConfig) -> Result<Self, EspError> {
        let api_key = config.require_str("apiKey")?;
        let domain = config.require_str("domain")?;
        require_prefix("apiKey", api_key, API_KEY_PREFIX)?;
        let endpoint = config.endpoint()?.unwrap_or(DEFAULT_ENDPOINT);
        Ok(Self {
            name: config.name().to_string(),
            api_key: api_key.to_string(),
            domain: domain.to_string(),
            endpoint: endpoint.to_string(),
            client: http::client(KIND)?,
        })
    }
}

impl MailgunProvider {
    fn url(&self) -> String {
        http::build_url(&self.endpoint, &format!("v3/{}/messages", self.domain))
    }
}

fn bracketed(addresses: &[String]) -> String {
    addresses
        .iter()
        .map(|address| format!("<{address}>"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Form fields for the messages endpoint; empty fields are left out.
pub(crate) fn form_fields(email: &Email) -> Vec<(&'static str, String)> {
    let mut fields = vec![("from", format!("<{}>", email.from()))];
    for (key, addresses) in [("to", email.to()), ("cc", email.cc()), ("bcc", email.bcc())] {
        if !addresses.is_empty() {
            fields.push((key, bracketed(addresses)));
        }
    }
    for (key, value) in [
        ("subject", email.subject()),
        ("text", email.text()),
        ("html", email.html()),
    ] {
        if let Some(value) = value
            && !value.is_empty()
        {
            fields.push((key, value.to_string()));
        }
    }
    fields
}

#[derive(Deserialize)]
struct Accepted {
    id: Option<String>,
}

pub(crate) fn classify(name: &str, status: u16, body: &str) -> Result<SendReceipt, EspError> {
    match status {
        200..=299 => {
            let id = serde_json::from_str::<Accepted>(body)
                .ok()
                .and_then(|accepted| accepted.id);
            Ok(SendReceipt::new(name, id))
        }
        401 => Err(EspError::configuration_invalid(name)),
        400..=499 => {
            let message = http::vendor_message(body).unwrap_or_else(|| body.trim().to_string());
            if matches!(status, 400 | 403) && http::mentions_activation(&message) {
                return Err(EspError::activation_required(name));
            }
            if message.is_empty() {
                return Err(EspError::rejected("Incorrect Request."));
            }
            Err(EspError::rejected(message))
        }
        _ => Err(http::server_error(status, body)),
    }
}

#[async_trait]
impl EmailProvider for MailgunProvider {
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
            .post(self.url())
            .basic_auth("api", Some(&self.api_key))
            .form(&form_fields(email))
            .send()
            .await
            .map_err(|err| http::network_error(KIND, err))?;
        let response = http::read(KIND, response).await?;
        classify(&self.name, response.status, &response.body)
    }
}
