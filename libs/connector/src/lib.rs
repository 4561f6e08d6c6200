//! Process-facing entry point for sending email through registered providers.
//!
//! ```no_run
//! use esp_connector::{Email, EmailFields};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), esp_connector::EspError> {
//! let mailer = esp_connector::global();
//! mailer.init(&json!([{
//!     "name": "ironman",
//!     "provider": "mailgun",
//!     "apiKey": "key-imagined",
//!     "domain": "sandboxed.example.org"
//! }]))?;
//!
//! let email = Email::new(EmailFields {
//!     from: "sender@example.com".into(),
//!     to: "recipient@example.com".into(),
//!     subject: Some("Hello".into()),
//!     text: Some("Hi there".into()),
//!     ..Default::default()
//! });
//! let receipt = mailer.send(&email)?.await?;
//! println!("sent via {}", receipt.provider);
//! # Ok(())
//! # }
//! ```

pub mod mailer;
pub mod settings;

use once_cell::sync::Lazy;

pub use esp_core::{
    AddressList, Email, EmailFields, ErrorCategory, ErrorKind, EspError, SendReceipt,
};
pub use esp_provider_registry::{Dispatch, ProviderCatalog, SendOutcome};
pub use mailer::Mailer;
pub use settings::{CONFIG_ENV, ConnectorSettings, SettingsError};

static GLOBAL: Lazy<Mailer> = Lazy::new(Mailer::new);

/// Process-wide mailer backed by the built-in catalog.
pub fn global() -> &'static Mailer {
    &GLOBAL
}
