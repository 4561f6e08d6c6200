//! Provider catalog, registry and dispatch for the ESP connector, plus the
//! built-in vendor adapters.

pub mod catalog;
pub mod dispatch;
pub mod providers;
pub mod registry;

pub use catalog::{ProviderCatalog, ProviderFactory};
pub use dispatch::{Dispatch, SendOutcome};
pub use registry::ProviderRegistry;
