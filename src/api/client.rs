use reqwest::{multipart, Client, StatusCode};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{ChallengeImage, ConvertForm, Endpoints, ErrorBody};
use crate::catalog::VoiceGroups;
use crate::error::AppError;

const DEFAULT_CHALLENGE_MESSAGE: &str =
    "Captcha verification required. Please enter the characters shown in the image.";

/// Thin wrapper around the three endpoints of the TTS service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn fetch_voices(&self) -> Result<VoiceGroups, AppError> {
        tracing::debug!("GET {}", self.endpoints.voices);

        let response = self
            .http
            .get(self.endpoints.voices.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Voice list request failed: {}", e);
                AppError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Voice list request returned {}", status);
            return Err(AppError::Network(format!(
                "voice list request returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response.bytes().await?;
        let groups: VoiceGroups = serde_json::from_slice(&body)?;
        Ok(groups)
    }

    /// Submits a conversion and returns the audio payload.
    pub async fn post_convert(&self, form: &ConvertForm) -> Result<Vec<u8>, AppError> {
        tracing::debug!(
            "POST {} (voice={}, download={}, captcha={})",
            self.endpoints.convert,
            form.voice,
            form.download,
            form.captcha.is_some()
        );

        let mut body = multipart::Form::new()
            .text("text", form.text.clone())
            .text("voice", form.voice.clone())
            .text("download", form.download.to_string());
        if let Some(answer) = &form.captcha {
            body = body.text("captcha", answer.clone());
        }

        let response = self
            .http
            .post(self.endpoints.convert.clone())
            .multipart(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Conversion request failed: {}", e);
                AppError::from(e)
            })?;

        let status = response.status();
        let payload = response.bytes().await?;

        if status.is_success() {
            tracing::debug!("Received {} bytes of audio", payload.len());
            return Ok(payload.to_vec());
        }

        Err(classify_failure(status, &payload))
    }

    pub async fn fetch_challenge(&self) -> Result<ChallengeImage, AppError> {
        // Cache buster so every refresh yields a fresh image.
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        tracing::debug!("GET {}?t={}", self.endpoints.challenge, stamp);

        let response = self
            .http
            .get(self.endpoints.challenge.clone())
            .query(&[("t", stamp.to_string())])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Challenge request failed: {}", e);
                AppError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Challenge request returned {}", status);
            return Err(AppError::Network(format!(
                "challenge request returned HTTP {}",
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(ChallengeImage {
            bytes,
            content_type,
        })
    }
}

/// Maps a non-2xx conversion response onto the error taxonomy.
fn classify_failure(status: StatusCode, payload: &[u8]) -> AppError {
    match serde_json::from_slice::<ErrorBody>(payload) {
        Ok(body) if body.show_captcha => AppError::ChallengeRequired(
            body.error
                .unwrap_or_else(|| DEFAULT_CHALLENGE_MESSAGE.to_string()),
        ),
        Ok(body) => AppError::Server {
            status: status.as_u16(),
            message: body.error.unwrap_or_else(|| "Conversion failed".to_string()),
        },
        Err(_) => AppError::Unknown {
            status: status.as_u16(),
        },
    }
}
