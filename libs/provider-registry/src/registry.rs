use std::sync::{Arc, RwLock};

use esp_core::validate::require_name;
use esp_core::{Email, EmailProvider, EspError, ProviderConfig};
use indexmap::IndexMap;
use serde_json::Value;

use crate::catalog::ProviderCatalog;
use crate::dispatch::Dispatch;

/// Named provider instances in registration order.
///
/// The first registered provider is the default target of [`ProviderRegistry::send`].
pub struct ProviderRegistry {
    catalog: ProviderCatalog,
    entries: RwLock<IndexMap<String, Arc<dyn EmailProvider>>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_catalog(ProviderCatalog::builtin())
    }
}

impl ProviderRegistry {
    /// Registry that knows every built-in vendor.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: ProviderCatalog) -> Self {
        Self {
            catalog,
            entries: RwLock::new(IndexMap::new()),
        }
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// Validates `config` and registers the adapter it describes.
    ///
    /// Checks run in order: config shape, `name`, `provider`, known vendor
    /// kind, name uniqueness, then the adapter's own field checks. The adapter
    /// is built outside the lock; uniqueness is checked again under the write
    /// lock right before the insert.
    pub fn add_provider(&self, config: &Value) -> Result<(), EspError> {
        let config = ProviderConfig::from_value(config)?;
        if !self.catalog.contains(config.provider()) {
            return Err(EspError::unknown_provider());
        }
        if self.contains(config.name()) {
            return Err(EspError::name_taken(config.name()));
        }

        let provider = self.catalog.build(&config)?;
        let mut entries = self.entries.write().expect("provider registry lock poisoned");
        if entries.contains_key(config.name()) {
            return Err(EspError::name_taken(config.name()));
        }
        entries.insert(config.name().to_string(), provider);
        tracing::info!(
            provider = %config.name(),
            kind = %config.provider(),
            "email provider registered"
        );
        Ok(())
    }

    /// Removes the named provider; returns whether it was registered.
    pub fn remove_provider(&self, name: &str) -> bool {
        let removed = self
            .entries
            .write()
            .expect("provider registry lock poisoned")
            .shift_remove(name)
            .is_some();
        if removed {
            tracing::info!(provider = %name, "email provider removed");
        }
        removed
    }

    /// Routes `email` to the first registered provider.
    pub fn send(&self, email: &Email) -> Result<Dispatch, EspError> {
        let provider = self
            .entries
            .read()
            .expect("provider registry lock poisoned")
            .first()
            .map(|(_, provider)| Arc::clone(provider))
            .ok_or_else(EspError::no_provider_found)?;
        Ok(Dispatch::new(provider, email.clone()))
    }

    /// Routes `email` to the provider registered as `name`.
    pub fn send_by_provider(&self, name: &str, email: &Email) -> Result<Dispatch, EspError> {
        let name = require_name(name)?;
        let provider = self
            .provider(name)
            .ok_or_else(|| EspError::provider_not_found(name))?;
        Ok(Dispatch::new(provider, email.clone()))
    }

    pub fn provider(&self, name: &str) -> Option<Arc<dyn EmailProvider>> {
        self.entries
            .read()
            .expect("provider registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Registered names in dispatch order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .expect("provider registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .expect("provider registry lock poisoned")
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("provider registry lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esp_core::ErrorKind;
    use esp_testutil::{
        RECORDING_KIND, RecordingProvider, SentLog, recording_config, sample_email,
    };
    use serde_json::json;

    fn registry(log: &SentLog) -> ProviderRegistry {
        let catalog =
            ProviderCatalog::builtin().with_fn(RECORDING_KIND, RecordingProvider::factory(log.clone()));
        ProviderRegistry::with_catalog(catalog)
    }

    #[test]
    fn add_provider_validates_in_order() {
        let registry = registry(&SentLog::new());
        let cases = [
            (json!(null), ErrorKind::ParameterInvalid, "Invalid configuration object passed."),
            (json!({}), ErrorKind::ParameterRequired, "name is required."),
            (json!({ "name": "xyz" }), ErrorKind::ParameterRequired, "provider is required."),
            (
                json!({ "name": "xyz", "provider": "xyz" }),
                ErrorKind::ParameterInvalid,
                "Unknown provider passed.",
            ),
            (
                json!({ "name": "xyz", "provider": "mailgun" }),
                ErrorKind::ParameterRequired,
                "apiKey is required.",
            ),
        ];
        for (config, kind, message) in cases {
            let err = registry.add_provider(&config).unwrap_err();
            assert_eq!(err.kind(), kind, "{config}");
            assert_eq!(err.message(), message, "{config}");
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn adapters_are_built_without_holding_the_write_lock() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::{OnceLock, Weak};

        let slot: Arc<OnceLock<Weak<ProviderRegistry>>> = Arc::new(OnceLock::new());
        let readable = Arc::new(AtomicBool::new(false));
        let build = RecordingProvider::factory(SentLog::new());
        let catalog = ProviderCatalog::new().with_fn(RECORDING_KIND, {
            let slot = slot.clone();
            let readable = readable.clone();
            move |config: &ProviderConfig| {
                let registry = slot.get().and_then(Weak::upgrade);
                let free = registry.is_some_and(|registry| registry.entries.try_read().is_ok());
                readable.store(free, Ordering::SeqCst);
                build(config)
            }
        });
        let registry = Arc::new(ProviderRegistry::with_catalog(catalog));
        slot.set(Arc::downgrade(&registry)).unwrap();

        registry.add_provider(&recording_config("falcon")).unwrap();
        assert!(readable.load(Ordering::SeqCst));
        assert!(registry.contains("falcon"));
    }

    #[test]
    fn duplicate_name_is_rejected_before_adapter_checks() {
        let registry = registry(&SentLog::new());
        registry.add_provider(&recording_config("captainamerica")).unwrap();

        // the second config would also fail mandrill's apiKey check
        let err = registry
            .add_provider(&json!({ "name": "captainamerica", "provider": "mandrill" }))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterInvalid);
        assert_eq!(
            err.message(),
            "name `captainamerica` is already taken for a provider."
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removal_is_idempotent_and_keeps_order() {
        let registry = registry(&SentLog::new());
        for name in ["a", "b", "c"] {
            registry.add_provider(&recording_config(name)).unwrap();
        }
        assert!(registry.remove_provider("b"));
        assert!(!registry.remove_provider("b"));
        assert!(!registry.remove_provider("never"));
        assert_eq!(registry.names(), ["a", "c"]);
        assert!(!registry.contains("b"));
    }

    #[tokio::test]
    async fn send_uses_first_registered_provider() {
        let log = SentLog::new();
        let registry = registry(&log);
        for name in ["zulu", "alpha"] {
            registry.add_provider(&recording_config(name)).unwrap();
        }

        let dispatch = registry.send(&sample_email()).unwrap();
        assert_eq!(dispatch.provider(), "zulu");
        let receipt = dispatch.await.unwrap();
        assert_eq!(receipt.provider, "zulu");
        assert_eq!(log.count_for("zulu"), 1);
        assert_eq!(log.count_for("alpha"), 0);

        registry.remove_provider("zulu");
        let receipt = registry.send(&sample_email()).unwrap().await.unwrap();
        assert_eq!(receipt.provider, "alpha");
    }

    #[test]
    fn send_without_providers_fails() {
        let registry = registry(&SentLog::new());
        let err = registry.send(&sample_email()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoProviderFound);
        assert_eq!(err.code(), "NO_PROVIDER");
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn send_by_provider_checks_name_then_existence() {
        let registry = registry(&SentLog::new());
        let err = registry.send_by_provider("", &sample_email()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterRequired);
        assert_eq!(err.message(), "name is required.");

        let err = registry.send_by_provider("missing", &sample_email()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterInvalid);
        assert_eq!(err.message(), "No provider for `missing` is found.");
    }

    #[test]
    fn dispatch_does_not_hold_the_registry_lock() {
        let registry = registry(&SentLog::new());
        registry.add_provider(&recording_config("a")).unwrap();
        let pending = registry.send(&sample_email()).unwrap();
        // mutation while a dispatch is pending must not deadlock
        assert!(registry.remove_provider("a"));
        drop(pending);
    }
}
