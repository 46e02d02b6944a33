use std::env;
use url::Url;

/// Runtime configuration for the document Q&A API client.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - DOCQA_API_URL (default: http://localhost:8000/api)
    /// - DOCQA_HTTP_TIMEOUT_SECS (default: 30)
    /// - DOCQA_USER_AGENT (default: docqa-client/<version>)
    pub fn from_env() -> Result<Self, String> {
        let api_url = env::var("DOCQA_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".to_string());
        Url::parse(&api_url).map_err(|e| format!("Invalid DOCQA_API_URL: {}", e))?;

        let timeout_secs = env::var("DOCQA_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        let default_ua = format!(
            "docqa-client/{}",
            env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".into())
        );
        let user_agent = env::var("DOCQA_USER_AGENT").unwrap_or(default_ua);

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            user_agent,
            timeout_secs,
        })
    }
}
