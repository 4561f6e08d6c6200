pub const DISPATCH_COUNTER: &str = "esp_dispatch_total";

/// Outcome label recorded for each completed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Failed(&'static str),
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Sent => "sent",
            DispatchOutcome::Failed(code) => *code,
        }
    }
}

pub fn record_dispatch(provider: &str, kind: &str, outcome: DispatchOutcome) {
    ::metrics::counter!(
        DISPATCH_COUNTER,
        "provider" => provider.to_string(),
        "kind" => kind.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}
