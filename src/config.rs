use std::env;

use reqwest::Url;

use crate::error::{ClientResult, ReportError};

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub app_origin: String,
    pub environment: String,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
    pub otel_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "/api".to_string(),
            app_origin: "http://localhost:8000".to_string(),
            environment: "development".to_string(),
            otel_service_name: "research-report-client".to_string(),
            otel_exporter_endpoint: "http://localhost:4317".to_string(),
            otel_enabled: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            api_base_url: env::var("REPORT_API_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_base_url),
            app_origin: env::var("REPORT_APP_ORIGIN").unwrap_or(defaults.app_origin),
            environment: env::var("REPORT_ENVIRONMENT").unwrap_or(defaults.environment),
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or(defaults.otel_service_name),
            otel_exporter_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or(defaults.otel_exporter_endpoint),
            otel_enabled: env::var("OTEL_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.otel_enabled),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Resolves `{base}/research`. A relative base is taken as same-origin and
    /// joined onto `app_origin`.
    pub fn endpoint_url(&self) -> ClientResult<Url> {
        let base = self.api_base_url.trim().trim_end_matches('/');

        let absolute = if base.is_empty() || base.starts_with('/') {
            let origin = Url::parse(&self.app_origin).map_err(|e| {
                ReportError::Config(format!("invalid app origin {:?}: {e}", self.app_origin))
            })?;
            origin
                .join(if base.is_empty() { "/" } else { base })
                .map_err(|e| ReportError::Config(format!("invalid API base URL {base:?}: {e}")))?
        } else {
            Url::parse(base)
                .map_err(|e| ReportError::Config(format!("invalid API base URL {base:?}: {e}")))?
        };

        let joined = format!("{}/research", absolute.as_str().trim_end_matches('/'));
        Url::parse(&joined)
            .map_err(|e| ReportError::Config(format!("invalid endpoint URL {joined:?}: {e}")))
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
