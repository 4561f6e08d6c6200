//! Shared fakes and fixtures for ESP connector tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use esp_core::{
    Email, EmailFields, EmailProvider, EspError, FromProviderConfig, ProviderConfig, SendReceipt,
    mock,
};
use serde_json::{Value, json};

pub const RECORDING_KIND: &str = "recording";

/// Shared log of `(provider name, email)` pairs seen by [`RecordingProvider`]s.
#[derive(Clone, Default)]
pub struct SentLog {
    inner: Arc<Mutex<Vec<(String, Email)>>>,
}

impl SentLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, provider: &str, email: &Email) {
        self.inner
            .lock()
            .expect("sent log lock poisoned")
            .push((provider.to_string(), email.clone()));
    }

    pub fn entries(&self) -> Vec<(String, Email)> {
        self.inner.lock().expect("sent log lock poisoned").clone()
    }

    pub fn count_for(&self, provider: &str) -> usize {
        self.entries()
            .iter()
            .filter(|(name, _)| name == provider)
            .count()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("sent log lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fake adapter that records every send and answers with a scripted outcome.
///
/// The optional `outcome` config field takes the same values as the `mock://`
/// scenarios and defaults to `success`. An optional `token` field exercises
/// the required-string checks.
pub struct RecordingProvider {
    name: String,
    outcome: String,
    log: SentLog,
}

impl RecordingProvider {
    pub fn with_log(config: &ProviderConfig, log: SentLog) -> Result<Self, EspError> {
        let outcome = config.optional_str("outcome")?.unwrap_or("success");
        if config.fields().contains_key("token") {
            config.require_str("token")?;
        }
        Ok(Self {
            name: config.name().to_string(),
            outcome: outcome.to_string(),
            log,
        })
    }

    /// Factory closure suitable for a provider catalog.
    pub fn factory(
        log: SentLog,
    ) -> impl Fn(&ProviderConfig) -> Result<Arc<dyn EmailProvider>, EspError> + Send + Sync + 'static
    {
        move |config| {
            let provider = RecordingProvider::with_log(config, log.clone())?;
            Ok(Arc::new(provider) as Arc<dyn EmailProvider>)
        }
    }
}

impl FromProviderConfig for RecordingProvider {
    fn from_config(config: &ProviderConfig) -> Result<Self, EspError> {
        Self::with_log(config, SentLog::new())
    }
}

#[async_trait]
impl EmailProvider for RecordingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        RECORDING_KIND
    }

    async fn send(&self, email: &Email) -> Result<SendReceipt, EspError> {
        self.log.push(&self.name, email);
        mock::resolve(&self.name, &self.outcome)
    }
}

/// Registration object for a recording provider.
pub fn recording_config(name: &str) -> Value {
    json!({ "name": name, "provider": RECORDING_KIND })
}

/// Registration object for a recording provider with a scripted outcome.
pub fn recording_config_with_outcome(name: &str, outcome: &str) -> Value {
    json!({ "name": name, "provider": RECORDING_KIND, "outcome": outcome })
}

/// Single-recipient message.
pub fn sample_email() -> Email {
    Email::new(EmailFields {
        from: "sender@example.com".into(),
        to: "recipient@example.com".into(),
        subject: Some("Hello from the connector".into()),
        text: Some("Congratulations, you just sent an email!".into()),
        ..Default::default()
    })
}

/// Message with two `to` recipients and one `cc`.
pub fn multi_recipient_email() -> Email {
    Email::new(EmailFields {
        from: "sender@example.com".into(),
        to: ["recipient@example.com", "recipient+1@example.com"].into(),
        cc: "recipient+2@example.com".into(),
        subject: Some("Hello from the connector".into()),
        text: Some("Congratulations, you just sent an email!".into()),
        html: Some("<p>Congratulations, you just sent an email!</p>".into()),
        ..Default::default()
    })
}

/// One config per built-in vendor, all pointed at `mock://success`.
pub fn mock_vendor_configs() -> Value {
    json!([
        {
            "name": "ironman",
            "provider": "mailgun",
            "apiKey": "key-imagined",
            "domain": "sandboxed.example.org",
            "endpoint": "mock://success"
        },
        {
            "name": "thor",
            "provider": "mandrill",
            "apiKey": "imagined",
            "endpoint": "mock://success"
        },
        {
            "name": "hawkeye",
            "provider": "sendgrid",
            "apiKey": "SG.imagined",
            "endpoint": "mock://success"
        },
        {
            "name": "captainamerica",
            "provider": "ses",
            "accessKeyId": "AKIAIMAGINED",
            "secretAccessKey": "imagined",
            "region": "us-east-1",
            "endpoint": "mock://success"
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use esp_core::ErrorKind;

    #[tokio::test]
    async fn records_and_answers_with_outcome() {
        let log = SentLog::new();
        let config =
            ProviderConfig::from_value(&recording_config_with_outcome("a", "inactive")).unwrap();
        let provider = RecordingProvider::with_log(&config, log.clone()).unwrap();

        let err = provider.send(&sample_email()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ActivationRequired);
        assert_eq!(log.count_for("a"), 1);
        assert_eq!(log.entries()[0].1, sample_email());
    }

    #[test]
    fn token_must_be_a_string_when_present() {
        let config = ProviderConfig::from_value(&json!({
            "name": "a",
            "provider": RECORDING_KIND,
            "token": 7
        }))
        .unwrap();
        let err = RecordingProvider::from_config(&config).err().unwrap();
        assert_eq!(err.message(), "token should be a string.");
    }
}
