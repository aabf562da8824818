use reqwest::Url;

use crate::config::Config;
use crate::error::AppError;

const VOICES_PATH: &str = "/voices";
const CHALLENGE_PATH: &str = "/captcha";

/// Resolved URLs of the TTS service.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub voices: Url,
    pub convert: Url,
    pub challenge: Url,
}

impl Endpoints {
    pub fn new(server: &str, convert_path: &str) -> Result<Self, AppError> {
        let base = Url::parse(server)
            .map_err(|e| AppError::Config(format!("invalid server URL '{}': {}", server, e)))?;

        let join = |path: &str| {
            base.join(path)
                .map_err(|e| AppError::Config(format!("invalid path '{}': {}", path, e)))
        };

        Ok(Self {
            voices: join(VOICES_PATH)?,
            convert: join(convert_path)?,
            challenge: join(CHALLENGE_PATH)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(&config.server, &config.convert_path)
    }
}
