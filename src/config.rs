use std::path::PathBuf;
use std::time::Duration;

use crate::board::LanguageFilter;
use crate::error::AppError;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
pub const DEFAULT_CONVERT_PATH: &str = "/convert";
pub const DEFAULT_VOICE: &str = "en-US-AriaNeural";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: String,
    pub convert_path: String,
    pub timeout: Duration,
    pub default_voice: String,
    pub output_dir: PathBuf,
    /// Filter applied right after a catalog load.
    pub initial_filter: LanguageFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            convert_path: DEFAULT_CONVERT_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_voice: DEFAULT_VOICE.to_string(),
            output_dir: PathBuf::from("."),
            initial_filter: LanguageFilter::Multilingual,
        }
    }
}

impl Config {
    /// Configuration from `VOICE_DECK_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Config::default();

        if let Some(server) = lookup("VOICE_DECK_SERVER") {
            config.server = server;
        }
        if let Some(path) = lookup("VOICE_DECK_CONVERT_PATH") {
            config.convert_path = path;
        }
        if let Some(secs) = lookup("VOICE_DECK_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                AppError::Config(format!("VOICE_DECK_TIMEOUT_SECS must be a number, got '{}'", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(voice) = lookup("VOICE_DECK_DEFAULT_VOICE") {
            config.default_voice = voice;
        }
        if let Some(dir) = lookup("VOICE_DECK_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.timeout.is_zero() {
            return Err(AppError::Config("timeout must be greater than zero".into()));
        }
        if !self.convert_path.starts_with('/') {
            return Err(AppError::Config(format!(
                "convert path must start with '/', got '{}'",
                self.convert_path
            )));
        }
        if self.default_voice.trim().is_empty() {
            return Err(AppError::Config("default voice cannot be empty".into()));
        }
        reqwest::Url::parse(&self.server)
            .map_err(|e| AppError::Config(format!("invalid server URL '{}': {}", self.server, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server, DEFAULT_SERVER);
        assert_eq!(config.convert_path, "/convert");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.default_voice, "en-US-AriaNeural");
        assert_eq!(config.initial_filter, LanguageFilter::Multilingual);
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("VOICE_DECK_SERVER", "https://tts.example.com"),
            ("VOICE_DECK_CONVERT_PATH", "/"),
            ("VOICE_DECK_TIMEOUT_SECS", "5"),
            ("VOICE_DECK_OUTPUT_DIR", "/tmp/out"),
        ]))
        .unwrap();
        assert_eq!(config.server, "https://tts.example.com");
        assert_eq!(config.convert_path, "/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let err = Config::from_lookup(lookup(&[("VOICE_DECK_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = Config::from_lookup(lookup(&[("VOICE_DECK_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_bad_server_rejected() {
        let err = Config::from_lookup(lookup(&[("VOICE_DECK_SERVER", "not a url")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
