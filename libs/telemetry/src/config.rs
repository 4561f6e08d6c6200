use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub json_logs: bool,
    pub default_filter: String,
}

impl TelemetryConfig {
    pub fn from_env(default_service_name: &str) -> Self {
        let service_name =
            env::var("ESP_SERVICE_NAME").unwrap_or_else(|_| default_service_name.to_string());
        let json_logs = env::var("LOG_FORMAT")
            .map(|v| parse_json_logs(&v))
            .unwrap_or(true);
        Self {
            service_name,
            json_logs,
            default_filter: "info".into(),
        }
    }
}

fn parse_json_logs(value: &str) -> bool {
    !matches!(value.to_lowercase().as_str(), "text" | "pretty" | "plain")
}
