use anyhow::{Context, Result};

const DEFAULT_WORKFLOW_USER: &str = "shift-admin";
const DEFAULT_GENERATION_NODE: &str = "llm";
const DEFAULT_WORKFLOW_TIMEOUT_SECS: u64 = 300;

/// Application configuration loaded from environment variables.
///
/// The workflow endpoint and key are optional at startup. A missing value is
/// reported per request as a configuration error so the calendar preview and
/// health routes keep working on a half-configured deployment.
#[derive(Debug, Clone)]
pub struct Config {
    pub workflow_api_url: Option<String>,
    pub workflow_api_key: Option<String>,
    pub workflow_user: String,
    /// `node_type` whose `node_finished` output carries the authoritative result.
    pub generation_node_type: String,
    pub workflow_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            workflow_api_url: optional_env("WORKFLOW_API_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            workflow_api_key: optional_env("WORKFLOW_API_KEY"),
            workflow_user: optional_env("WORKFLOW_USER")
                .unwrap_or_else(|| DEFAULT_WORKFLOW_USER.to_string()),
            generation_node_type: optional_env("WORKFLOW_GENERATION_NODE")
                .unwrap_or_else(|| DEFAULT_GENERATION_NODE.to_string()),
            workflow_timeout_secs: match optional_env("WORKFLOW_TIMEOUT_SECS") {
                Some(raw) => raw
                    .parse::<u64>()
                    .context("WORKFLOW_TIMEOUT_SECS must be a whole number of seconds")?,
                None => DEFAULT_WORKFLOW_TIMEOUT_SECS,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an env var, treating an empty or whitespace-only value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    /// Config pointing at a local fake workflow server.
    pub fn for_tests(workflow_api_url: Option<String>) -> Self {
        Config {
            workflow_api_url,
            workflow_api_key: Some("test-key".to_string()),
            workflow_user: DEFAULT_WORKFLOW_USER.to_string(),
            generation_node_type: DEFAULT_GENERATION_NODE.to_string(),
            workflow_timeout_secs: 5,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
