use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub backend: BackendConfig,
    pub orchestrator: OrchestratorConfig,
    pub youtube: YouTubeConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis URL; the in-memory cache is used when unset.
    pub redis_url: Option<String>,
    pub key_prefix: String,
    pub ttl_days: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub model: String,
    pub base_url: String,
    pub api_key: Option<Secret<String>>,
    pub temperature: f32,
    /// Per-call HTTP timeout. Large inputs can take many minutes.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub max_attempts: u32,
    pub backoff_unit_ms: u64,
    /// Deadline for the whole retry loop, unbounded when unset.
    pub overall_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct YouTubeConfig {
    pub base_url: String,
    pub api_key: Option<Secret<String>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TelemetryConfig {
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            max_body_bytes: 32 * 1024 * 1024, // 32MB
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: "pagebrief:summary".into(),
            ttl_days: 90,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: None,
            temperature: 0.3,
            request_timeout_secs: 840, // 14 minutes
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit_ms: 1000,
            overall_timeout_secs: None,
        }
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://youtube.googleapis.com/youtube/v3".into(),
            api_key: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ttl_days * 24 * 60 * 60)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("PAGEBRIEF_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__SERVER__PORT=3000 to server.port
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut cfg: Self = s.try_deserialize()?;
        cfg.apply_legacy_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Fill unset fields from the plain environment variables used by
    /// earlier deployments (`GEMINI_API_KEY`, `MAX_RETRIES`, ...).
    pub fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.backend.api_key.is_none() {
            self.backend.api_key = lookup("GEMINI_API_KEY").map(Secret::new);
        }
        if let Some(model) = lookup("GOOGLE_GENAI_MODEL_ID").filter(|m| !m.is_empty()) {
            self.backend.model = model;
        }
        if self.youtube.api_key.is_none() {
            self.youtube.api_key = lookup("YOUTUBE_DATA_API_KEY").map(Secret::new);
        }
        if let Some(attempts) = lookup("MAX_RETRIES").and_then(|v| v.parse::<u32>().ok()) {
            if attempts > 0 {
                self.orchestrator.max_attempts = attempts;
            }
        }
        if self.cache.redis_url.is_none() {
            self.cache.redis_url = lookup("REDIS_URL");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.orchestrator.max_attempts, 3);
        assert_eq!(cfg.orchestrator.backoff_unit_ms, 1000);
        assert_eq!(cfg.cache.ttl().as_secs(), 90 * 24 * 3600);
        assert_eq!(cfg.backend.request_timeout_secs, 840);
        assert!(cfg.cache.redis_url.is_none());
    }

    #[test]
    fn test_legacy_env_fills_gaps() {
        let vars: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "g-key"),
            ("MAX_RETRIES", "5"),
            ("GOOGLE_GENAI_MODEL_ID", "gemini-1.5-pro"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        cfg.apply_legacy_env(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.orchestrator.max_attempts, 5);
        assert_eq!(cfg.backend.model, "gemini-1.5-pro");
        assert_eq!(
            cfg.backend.api_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("g-key")
        );
        assert!(cfg.youtube.api_key.is_none());
    }

    #[test]
    fn test_legacy_env_ignores_bad_retries() {
        let mut cfg = AppConfig::default();
        cfg.apply_legacy_env(|k| (k == "MAX_RETRIES").then(|| "zero".to_string()));
        assert_eq!(cfg.orchestrator.max_attempts, 3);

        cfg.apply_legacy_env(|k| (k == "MAX_RETRIES").then(|| "0".to_string()));
        assert_eq!(cfg.orchestrator.max_attempts, 3);
    }
}
