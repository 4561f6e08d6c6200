use std::sync::Arc;

use esp_core::{EmailProvider, EspError, FromProviderConfig, ProviderConfig};
use indexmap::IndexMap;

pub type ProviderFactory =
    Arc<dyn Fn(&ProviderConfig) -> Result<Arc<dyn EmailProvider>, EspError> + Send + Sync>;

/// Vendor kinds known to a registry, keyed by the `provider` config field.
#[derive(Clone, Default)]
pub struct ProviderCatalog {
    factories: IndexMap<String, ProviderFactory>,
}

impl ProviderCatalog {
    /// An empty catalog; every `provider` value is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every adapter compiled into this build.
    pub fn builtin() -> Self {
        #[allow(unused_mut)]
        let mut catalog = Self::new();
        #[cfg(feature = "mailgun")]
        catalog.register::<crate::providers::MailgunProvider>(crate::providers::mailgun::KIND);
        #[cfg(feature = "mandrill")]
        catalog.register::<crate::providers::MandrillProvider>(crate::providers::mandrill::KIND);
        #[cfg(feature = "sendgrid")]
        catalog.register::<crate::providers::SendGridProvider>(crate::providers::sendgrid::KIND);
        #[cfg(feature = "ses")]
        catalog.register::<crate::providers::SesProvider>(crate::providers::ses::KIND);
        catalog
    }

    pub fn register<P>(&mut self, kind: impl Into<String>)
    where
        P: EmailProvider + FromProviderConfig + 'static,
    {
        self.register_fn(kind, |config| {
            P::from_config(config).map(|provider| Arc::new(provider) as Arc<dyn EmailProvider>)
        });
    }

    pub fn register_fn<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&ProviderConfig) -> Result<Arc<dyn EmailProvider>, EspError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
    }

    pub fn with<P>(mut self, kind: impl Into<String>) -> Self
    where
        P: EmailProvider + FromProviderConfig + 'static,
    {
        self.register::<P>(kind);
        self
    }

    pub fn with_fn<F>(mut self, kind: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ProviderConfig) -> Result<Arc<dyn EmailProvider>, EspError> + Send + Sync + 'static,
    {
        self.register_fn(kind, factory);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Runs the constructor registered for `config.provider()`.
    pub fn build(&self, config: &ProviderConfig) -> Result<Arc<dyn EmailProvider>, EspError> {
        let factory = self
            .factories
            .get(config.provider())
            .ok_or_else(EspError::unknown_provider)?;
        factory(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esp_core::ErrorKind;
    use esp_testutil::{RecordingProvider, recording_config};
    use serde_json::json;

    #[test]
    fn builtin_lists_compiled_vendors() {
        let catalog = ProviderCatalog::builtin();
        let kinds: Vec<_> = catalog.kinds().collect();
        assert_eq!(kinds, ["mailgun", "mandrill", "sendgrid", "ses"]);
        assert!(!catalog.contains("xyz"));
    }

    #[test]
    fn unknown_kind_fails_to_build() {
        let catalog = ProviderCatalog::new();
        let config = ProviderConfig::from_value(&json!({ "name": "a", "provider": "xyz" })).unwrap();
        let err = catalog.build(&config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ParameterInvalid);
        assert_eq!(err.message(), "Unknown provider passed.");
    }

    #[test]
    fn registered_kind_builds_named_instance() {
        let catalog = ProviderCatalog::new().with::<RecordingProvider>("recording");
        let config = ProviderConfig::from_value(&recording_config("sparrow")).unwrap();
        let provider = catalog.build(&config).unwrap();
        assert_eq!(provider.name(), "sparrow");
        assert_eq!(provider.kind(), "recording");
    }
}
