use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ProviderConfig;
use crate::email::Email;
use crate::errors::EspError;

/// Result of a send accepted by the vendor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Registered name of the provider that handled the send.
    pub provider: String,
    #[serde(default)]
    pub message_id: Option<String>,
}

impl SendReceipt {
    pub fn new(provider: impl Into<String>, message_id: Option<String>) -> Self {
        Self {
            provider: provider.into(),
            message_id,
        }
    }
}

/// Synchronous, I/O-free construction of an adapter from its registration.
pub trait FromProviderConfig: Sized {
    fn from_config(config: &ProviderConfig) -> Result<Self, EspError>;
}

/// Capability every vendor adapter implements.
///
/// `send` reports every failure through its return value and never panics.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Registered instance name.
    fn name(&self) -> &str;

    /// Vendor kind tag.
    fn kind(&self) -> &str;

    async fn send(&self, email: &Email) -> Result<SendReceipt, EspError>;
}
