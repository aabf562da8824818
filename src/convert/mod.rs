pub mod audio;

use std::path::PathBuf;
use std::sync::Mutex;

use crate::api::{ApiClient, ConvertForm};
use crate::error::AppError;
use crate::text::MAX_TEXT_CHARS;

pub use audio::{AudioOutput, MutedOutput};
#[cfg(feature = "audio-playback")]
pub use audio::RodioOutput;

pub const DOWNLOAD_FILE_NAME: &str = "speech.mp3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Played { bytes: usize },
    Downloaded { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Network,
    Server,
    Unknown,
}

/// Lifecycle of one conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversionState {
    #[default]
    Idle,
    Submitting,
    Succeeded(Delivery),
    Failed(FailureKind),
    ChallengeRequired(String),
}

impl ConversionState {
    fn settled(result: &Result<Delivery, AppError>) -> Self {
        match result {
            Ok(delivery) => ConversionState::Succeeded(delivery.clone()),
            Err(AppError::ChallengeRequired(msg)) => ConversionState::ChallengeRequired(msg.clone()),
            Err(AppError::Validation(_)) => ConversionState::Failed(FailureKind::Validation),
            Err(AppError::Server { .. }) => ConversionState::Failed(FailureKind::Server),
            Err(AppError::Network(_)) => ConversionState::Failed(FailureKind::Network),
            Err(_) => ConversionState::Failed(FailureKind::Unknown),
        }
    }
}

/// Resets the state to `Idle` if a submission is dropped before it settles.
struct SubmitGuard<'a> {
    state: &'a Mutex<ConversionState>,
    settled: bool,
}

impl SubmitGuard<'_> {
    fn settle(mut self, next: ConversionState) {
        *self.state.lock().unwrap() = next;
        self.settled = true;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("Conversion cancelled before it settled");
            *self.state.lock().unwrap() = ConversionState::Idle;
        }
    }
}

pub struct ConversionClient {
    api: ApiClient,
    output_dir: PathBuf,
    output: Mutex<Box<dyn AudioOutput>>,
    state: Mutex<ConversionState>,
}

impl ConversionClient {
    pub fn new(api: ApiClient, output_dir: PathBuf, output: Box<dyn AudioOutput>) -> Self {
        Self {
            api,
            output_dir,
            output: Mutex::new(output),
            state: Mutex::new(ConversionState::Idle),
        }
    }

    pub fn state(&self) -> ConversionState {
        self.state.lock().unwrap().clone()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(*self.state.lock().unwrap(), ConversionState::Submitting)
    }

    /// Returns a settled attempt to `Idle`. No effect while submitting.
    pub fn acknowledge(&self) {
        let mut state = self.state.lock().unwrap();
        if !matches!(*state, ConversionState::Submitting) {
            *state = ConversionState::Idle;
        }
    }

    pub async fn convert(
        &self,
        text: &str,
        voice: &str,
        download: bool,
    ) -> Result<Delivery, AppError> {
        self.submit(text, voice, download, None).await
    }

    /// Resubmits with the user's answer to a challenge.
    pub async fn convert_with_challenge(
        &self,
        text: &str,
        voice: &str,
        download: bool,
        answer: &str,
    ) -> Result<Delivery, AppError> {
        self.submit(text, voice, download, Some(answer.trim().to_string()))
            .await
    }

    /// Blocks until the clip handed to the audio output has finished.
    pub fn wait_for_playback(&self) {
        self.output.lock().unwrap().wait_until_done();
    }

    pub fn stop_playback(&self) {
        self.output.lock().unwrap().stop();
    }

    async fn submit(
        &self,
        text: &str,
        voice: &str,
        download: bool,
        captcha: Option<String>,
    ) -> Result<Delivery, AppError> {
        let guard = self.begin(text, voice)?;

        let form = ConvertForm {
            text: text.trim().to_string(),
            voice: voice.to_string(),
            download,
            captcha,
        };

        let result = match self.api.post_convert(&form).await {
            Ok(audio) => self.deliver(audio, download).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(delivery) => tracing::info!("Conversion with {} succeeded: {:?}", voice, delivery),
            Err(AppError::ChallengeRequired(_)) => {
                tracing::info!("Conversion with {} needs a challenge answer", voice)
            }
            Err(e) => tracing::warn!("Conversion with {} failed: {}", voice, e),
        }

        guard.settle(ConversionState::settled(&result));
        result
    }

    /// Moves to `Submitting`, or refuses without touching the network.
    fn begin(&self, text: &str, voice: &str) -> Result<SubmitGuard<'_>, AppError> {
        let mut state = self.state.lock().unwrap();

        if matches!(*state, ConversionState::Submitting) {
            return Err(AppError::Busy);
        }

        if let Err(e) = validate(text, voice) {
            *state = ConversionState::Failed(FailureKind::Validation);
            return Err(e);
        }

        *state = ConversionState::Submitting;
        Ok(SubmitGuard {
            state: &self.state,
            settled: false,
        })
    }

    async fn deliver(&self, audio: Vec<u8>, download: bool) -> Result<Delivery, AppError> {
        if download {
            tokio::fs::create_dir_all(&self.output_dir).await?;
            let path = self.output_dir.join(DOWNLOAD_FILE_NAME);
            tokio::fs::write(&path, &audio).await?;
            return Ok(Delivery::Downloaded { path });
        }

        let bytes = audio.len();
        self.output.lock().unwrap().play(audio)?;
        Ok(Delivery::Played { bytes })
    }
}

fn validate(text: &str, voice: &str) -> Result<(), AppError> {
    let text = text.trim();

    if text.is_empty() {
        return Err(AppError::Validation(
            "Please enter some text to convert".into(),
        ));
    }

    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::Validation(format!(
            "Text too long (max {} characters)",
            MAX_TEXT_CHARS
        )));
    }

    if voice.trim().is_empty() {
        return Err(AppError::Validation("Voice cannot be empty".into()));
    }

    Ok(())
}
