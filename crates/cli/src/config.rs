//! CLI-only settings. Backend settings live in
//! [`bazaryo_client::ClientConfig`].

use std::path::PathBuf;

const DEFAULT_SESSION_FILE: &str = ".bazaryo-session";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    /// Emit logs as JSON lines.
    pub log_json: bool,
    /// File that keeps the bearer token between invocations.
    pub session_file: PathBuf,
}

impl CliConfig {
    /// Read settings from the environment, loading `.env` first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            sentry_dsn: non_empty("SENTRY_DSN"),
            sentry_environment: non_empty("SENTRY_ENVIRONMENT"),
            log_json: non_empty("BAZARYO_LOG_JSON")
                .is_some_and(|value| !matches!(value.as_str(), "0" | "false")),
            session_file: non_empty("BAZARYO_SESSION_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> CliConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert!(config.sentry_dsn.is_none());
        assert!(!config.log_json);
        assert_eq!(config.session_file, PathBuf::from(".bazaryo-session"));
    }

    #[test]
    fn test_log_json_flag() {
        assert!(config(&[("BAZARYO_LOG_JSON", "1")]).log_json);
        assert!(!config(&[("BAZARYO_LOG_JSON", "false")]).log_json);
    }

    #[test]
    fn test_blank_dsn_is_ignored() {
        assert!(config(&[("SENTRY_DSN", "  ")]).sentry_dsn.is_none());
    }
}
