use std::sync::OnceLock;

use esp_core::{Email, EspError};
use esp_provider_registry::{Dispatch, ProviderCatalog, ProviderRegistry, SendOutcome};
use serde_json::Value;

/// One-time-initialized facade over a [`ProviderRegistry`].
///
/// Every operation other than [`Mailer::init`] fails with `NotInitialized`
/// until `init` has run. There is no way to reset a mailer.
pub struct Mailer {
    catalog: ProviderCatalog,
    registry: OnceLock<ProviderRegistry>,
}

impl Default for Mailer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailer {
    pub fn new() -> Self {
        Self::with_catalog(ProviderCatalog::builtin())
    }

    /// Mailer whose registry resolves `provider` kinds through `catalog`.
    pub fn with_catalog(catalog: ProviderCatalog) -> Self {
        Self {
            catalog,
            registry: OnceLock::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.get().is_some()
    }

    /// Creates the registry and registers `configs` in order.
    ///
    /// `configs` must be an array whose every element is an object. The first
    /// failing registration is returned; providers registered before it stay
    /// registered and the mailer counts as initialized.
    pub fn init(&self, configs: &Value) -> Result<(), EspError> {
        let configs = configs
            .as_array()
            .filter(|items| items.iter().all(Value::is_object))
            .ok_or_else(EspError::invalid_configuration)?;

        let mut created = false;
        let registry = self.registry.get_or_init(|| {
            created = true;
            ProviderRegistry::with_catalog(self.catalog.clone())
        });
        if !created {
            return Err(EspError::re_initialized());
        }

        tracing::info!(providers = configs.len(), "initializing mailer");
        for config in configs {
            registry.add_provider(config)?;
        }
        Ok(())
    }

    fn registry(&self) -> Result<&ProviderRegistry, EspError> {
        self.registry.get().ok_or_else(EspError::not_initialized)
    }

    pub fn add_provider(&self, config: &Value) -> Result<(), EspError> {
        self.registry()?.add_provider(config)
    }

    pub fn remove_provider(&self, name: &str) -> Result<bool, EspError> {
        Ok(self.registry()?.remove_provider(name))
    }

    pub fn send(&self, email: &Email) -> Result<Dispatch, EspError> {
        self.registry()?.send(email)
    }

    pub fn send_by_provider(&self, name: &str, email: &Email) -> Result<Dispatch, EspError> {
        self.registry()?.send_by_provider(name, email)
    }

    /// Callback form of [`Mailer::send`].
    ///
    /// Outside a Tokio runtime this returns a `Transport` error and the
    /// callback is never called.
    pub fn send_with<F>(&self, email: &Email, on_done: F) -> Result<(), EspError>
    where
        F: FnOnce(SendOutcome) + Send + 'static,
    {
        self.send(email)?.on_done(on_done)?;
        Ok(())
    }

    /// Callback form of [`Mailer::send_by_provider`]; see [`Mailer::send_with`].
    pub fn send_by_provider_with<F>(
        &self,
        name: &str,
        email: &Email,
        on_done: F,
    ) -> Result<(), EspError>
    where
        F: FnOnce(SendOutcome) + Send + 'static,
    {
        self.send_by_provider(name, email)?.on_done(on_done)?;
        Ok(())
    }

    /// Names of the registered providers, in dispatch order.
    pub fn provider_names(&self) -> Result<Vec<String>, EspError> {
        Ok(self.registry()?.names())
    }
}
