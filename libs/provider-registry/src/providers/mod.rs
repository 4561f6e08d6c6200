#[cfg(any(feature = "mailgun", feature = "mandrill", feature = "sendgrid"))]
mod http;

#[cfg(feature = "mailgun")]
pub mod mailgun;

#[cfg(feature = "mandrill")]
pub mod mandrill;

#[cfg(feature = "sendgrid")]
pub mod sendgrid;

#[cfg(feature = "ses")]
pub mod ses;

#[cfg(feature = "mailgun")]
pub use mailgun::MailgunProvider;
#[cfg(feature = "mandrill")]
pub use mandrill::MandrillProvider;
#[cfg(feature = "sendgrid")]
pub use sendgrid::SendGridProvider;
#[cfg(feature = "ses")]
pub use ses::SesProvider;
