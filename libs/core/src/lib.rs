//! Core types shared by the email registry, the facade and every vendor adapter.

pub mod config;
pub mod email;
pub mod errors;
pub mod mock;
pub mod traits;
pub mod validate;

pub use config::ProviderConfig;
pub use email::{AddressList, Email, EmailFields};
pub use errors::{ErrorCategory, ErrorKind, EspError};
pub use traits::{EmailProvider, FromProviderConfig, SendReceipt};
