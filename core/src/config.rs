//! Session configuration.
//!
//! Defaults work for most callers. The struct deserializes with every field
//! optional so it can be embedded in a host application's config file, and
//! `from_env` reads the same knobs from the process environment.

use serde::Deserialize;

pub const ERROR_BODY_LIMIT_VAR: &str = "REST_ENGINE_ERROR_BODY_LIMIT";
pub const JSON_CONTENT_TYPE_VAR: &str = "REST_ENGINE_JSON_CONTENT_TYPE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of response body bytes echoed into a decode error.
    pub error_body_limit: usize,
    /// Add `content-type: application/json` to POST/PUT requests that do not
    /// set a content type themselves.
    pub json_content_type: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            error_body_limit: 1024,
            json_content_type: true,
        }
    }
}

impl SessionConfig {
    /// Read overrides from the environment. Unset or unparsable values keep
    /// the default.
    ///
    /// `Session::default()` uses this. Sessions over other transports take it
    /// through `Session::with_config`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(ERROR_BODY_LIMIT_VAR) {
            match raw.trim().parse() {
                Ok(limit) => config.error_body_limit = limit,
                Err(e) => tracing::warn!(var = ERROR_BODY_LIMIT_VAR, %raw, error = %e, "ignoring invalid value"),
            }
        }
        if let Some(raw) = lookup(JSON_CONTENT_TYPE_VAR) {
            match raw.trim().parse() {
                Ok(flag) => config.json_content_type = flag,
                Err(e) => tracing::warn!(var = JSON_CONTENT_TYPE_VAR, %raw, error = %e, "ignoring invalid value"),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn deserializes_partial_config() {
        let config: SessionConfig = serde_json::from_str(r#"{"error_body_limit": 64}"#).unwrap();
        assert_eq!(config.error_body_limit, 64);
        assert!(config.json_content_type);
    }

    #[test]
    fn env_overrides_defaults() {
        let config = SessionConfig::from_lookup(lookup(&[
            (ERROR_BODY_LIMIT_VAR, "256"),
            (JSON_CONTENT_TYPE_VAR, "false"),
        ]));
        assert_eq!(config.error_body_limit, 256);
        assert!(!config.json_content_type);
    }

    #[test]
    fn invalid_env_values_keep_defaults() {
        let config = SessionConfig::from_lookup(lookup(&[
            (ERROR_BODY_LIMIT_VAR, "lots"),
            (JSON_CONTENT_TYPE_VAR, "maybe"),
        ]));
        assert_eq!(config, SessionConfig::default());
    }
}
