use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use esp_core::{Email, EmailProvider, EspError, SendReceipt};
use esp_telemetry::{DispatchOutcome, record_dispatch};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Outcome delivered once a dispatch completes.
pub type SendOutcome = Result<SendReceipt, EspError>;

/// A send that has been routed to an adapter but not yet completed.
///
/// The dispatch owns its adapter handle and its copy of the email, so it does
/// not borrow the registry. Await it, or hand it a completion callback with
/// [`Dispatch::on_done`].
#[must_use = "a dispatch does nothing unless awaited or given a callback"]
pub struct Dispatch {
    provider: String,
    kind: String,
    future: BoxFuture<'static, SendOutcome>,
}

impl Dispatch {
    pub(crate) fn new(provider: Arc<dyn EmailProvider>, email: Email) -> Self {
        let name = provider.name().to_string();
        let kind = provider.kind().to_string();
        let span = tracing::debug_span!(
            "esp.dispatch",
            provider = %name,
            kind = %kind,
            recipients = email.recipient_count()
        );
        let future = async move {
            tracing::debug!("sending email");
            let result = provider.send(&email).await;
            match &result {
                Ok(receipt) => {
                    tracing::debug!(message_id = ?receipt.message_id, "email accepted");
                    record_dispatch(provider.name(), provider.kind(), DispatchOutcome::Sent);
                }
                Err(err) => {
                    tracing::warn!(
                        code = err.code(),
                        status = err.status(),
                        error = %err.message(),
                        "email send failed"
                    );
                    record_dispatch(
                        provider.name(),
                        provider.kind(),
                        DispatchOutcome::Failed(err.code()),
                    );
                }
            }
            result
        }
        .instrument(span)
        .boxed();

        Self {
            provider: name,
            kind,
            future,
        }
    }

    /// Name of the provider the email was routed to.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Runs the dispatch on the current Tokio runtime and calls `on_done`
    /// exactly once with its outcome.
    ///
    /// Outside a Tokio runtime nothing is spawned, `on_done` is dropped
    /// without being called and a `Transport` error is returned.
    pub fn on_done<F>(self, on_done: F) -> Result<JoinHandle<()>, EspError>
    where
        F: FnOnce(SendOutcome) + Send + 'static,
    {
        let handle = Handle::try_current().map_err(|err| {
            EspError::transport("no async runtime available to run the send").with_source(err)
        })?;
        Ok(handle.spawn(async move {
            let outcome = self.await;
            on_done(outcome);
        }))
    }
}

impl Future for Dispatch {
    type Output = SendOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("provider", &self.provider)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
