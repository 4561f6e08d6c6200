use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Broad failure class; determines the nominal status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    BadRequest,
    Forbidden,
    InternalServerError,
}

impl ErrorCategory {
    /// Protocol-style status code for the category.
    pub fn status(&self) -> u16 {
        match self {
            ErrorCategory::BadRequest => 400,
            ErrorCategory::Forbidden => 401,
            ErrorCategory::InternalServerError => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::BadRequest => "bad_request",
            ErrorCategory::Forbidden => "forbidden",
            ErrorCategory::InternalServerError => "internal_server_error",
        }
    }
}

/// Specific discriminator within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParameterRequired,
    ParameterInvalid,
    /// Vendor rejected the message itself.
    Rejected,
    ConfigurationInvalid,
    ActivationRequired,
    NotInitialized,
    ReInitialized,
    NoProviderFound,
    /// Network failure or a vendor-side outage.
    Transport,
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::ParameterRequired | ErrorKind::ParameterInvalid | ErrorKind::Rejected => {
                ErrorCategory::BadRequest
            }
            ErrorKind::ConfigurationInvalid | ErrorKind::ActivationRequired => {
                ErrorCategory::Forbidden
            }
            ErrorKind::NotInitialized
            | ErrorKind::ReInitialized
            | ErrorKind::NoProviderFound
            | ErrorKind::Transport => ErrorCategory::InternalServerError,
        }
    }

    /// Machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::ParameterRequired => "PARAM_REQUIRED",
            ErrorKind::ParameterInvalid => "PARAM_INVALID",
            ErrorKind::Rejected => "BAD_REQUEST",
            ErrorKind::ConfigurationInvalid => "CONFIG_INVALID",
            ErrorKind::ActivationRequired => "ACTIVATION_REQUIRED",
            ErrorKind::NotInitialized => "NOT_INITIALIZED",
            ErrorKind::ReInitialized => "RE_INITIALIZED",
            ErrorKind::NoProviderFound => "NO_PROVIDER",
            ErrorKind::Transport => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Normalized failure reported by the registry, the facade and every adapter.
///
/// A value is queryable both by its [`ErrorCategory`] (status mapping) and by
/// its [`ErrorKind`] (programmatic branching).
///
/// ```
/// use esp_core::{EspError, ErrorCategory, ErrorKind};
///
/// let err = EspError::parameter_required("name");
/// assert_eq!(err.kind(), ErrorKind::ParameterRequired);
/// assert_eq!(err.category(), ErrorCategory::BadRequest);
/// assert_eq!(err.status(), 400);
/// assert_eq!(err.code(), "PARAM_REQUIRED");
/// assert_eq!(err.message(), "name is required.");
/// ```
#[derive(Debug)]
pub struct EspError {
    kind: ErrorKind,
    message: String,
    source: Option<anyhow::Error>,
}

impl EspError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn parameter_required(field: &str) -> Self {
        Self::new(ErrorKind::ParameterRequired, format!("{field} is required."))
    }

    pub fn parameter_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParameterInvalid, message)
    }

    pub fn not_a_string(field: &str) -> Self {
        Self::parameter_invalid(format!("{field} should be a string."))
    }

    pub fn invalid_configuration() -> Self {
        Self::parameter_invalid("Invalid configuration object passed.")
    }

    pub fn invalid_email() -> Self {
        Self::parameter_invalid("`email` should be of an object of prototype Email.")
    }

    pub fn name_taken(name: &str) -> Self {
        Self::parameter_invalid(format!("name `{name}` is already taken for a provider."))
    }

    pub fn unknown_provider() -> Self {
        Self::parameter_invalid("Unknown provider passed.")
    }

    pub fn provider_not_found(name: &str) -> Self {
        Self::parameter_invalid(format!("No provider for `{name}` is found."))
    }

    pub fn configuration_invalid(name: &str) -> Self {
        Self::new(
            ErrorKind::ConfigurationInvalid,
            format!("Configurations for [{name}] is forbidden."),
        )
    }

    pub fn activation_required(name: &str) -> Self {
        Self::new(
            ErrorKind::ActivationRequired,
            format!("Account not activated [{name}]."),
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorKind::NotInitialized,
            "EspConnector not initialized. Use init(config).",
        )
    }

    pub fn re_initialized() -> Self {
        Self::new(ErrorKind::ReInitialized, "Mailer Already initialized.")
    }

    pub fn no_provider_found() -> Self {
        Self::new(ErrorKind::NoProviderFound, "No Provider Found.")
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Rejected, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Attaches a source error for debugging purposes.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn status(&self) -> u16 {
        self.category().status()
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Display for EspError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message)
    }
}

impl Error for EspError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err.as_ref() as &(dyn Error + 'static))
    }
}
