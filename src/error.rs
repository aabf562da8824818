use std::time::{Duration, Instant};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Challenge required: {0}")]
    ChallengeRequired(String),

    #[error("Unexpected server response ({status})")]
    Unknown { status: u16 },

    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    #[error("A conversion is already in progress")]
    Busy,

    #[error("Cancelled")]
    Cancelled,

    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Network("request timed out".to_string())
        } else {
            AppError::Network(e.to_string())
        }
    }
}

impl AppError {
    /// Only a challenge can be answered and resubmitted; everything else
    /// needs the user to trigger the action again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::ChallengeRequired(_))
    }

    pub fn banner(&self) -> StatusBanner {
        let (kind, code, message) = match self {
            AppError::Validation(msg) => (BannerKind::Error, "VALIDATION", msg.clone()),
            AppError::Network(msg) => (BannerKind::Error, "NETWORK_ERROR", msg.clone()),
            AppError::Server { message, .. } => {
                (BannerKind::Error, "SERVER_ERROR", message.clone())
            }
            AppError::ChallengeRequired(msg) => {
                (BannerKind::Challenge, "CHALLENGE_REQUIRED", msg.clone())
            }
            AppError::Unknown { .. } => (
                BannerKind::Error,
                "UNKNOWN_ERROR",
                "Conversion failed".to_string(),
            ),
            AppError::VoiceNotFound(v) => (
                BannerKind::Error,
                "VOICE_NOT_FOUND",
                format!("Voice '{}' not found", v),
            ),
            AppError::Busy => (
                BannerKind::Error,
                "BUSY",
                "Please wait for the current conversion to finish".to_string(),
            ),
            AppError::Cancelled => (BannerKind::Error, "CANCELLED", "Cancelled".to_string()),
            AppError::Playback(msg) => (BannerKind::Error, "PLAYBACK_ERROR", msg.clone()),
            AppError::Config(msg) => (BannerKind::Error, "CONFIG_ERROR", msg.clone()),
            AppError::Io(e) => (BannerKind::Error, "IO_ERROR", e.to_string()),
            AppError::Json(e) => (BannerKind::Error, "JSON_ERROR", e.to_string()),
        };

        tracing::error!("Action failed: {} - {}", code, message);

        StatusBanner::new(kind, code, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
    Challenge,
}

/// Transient status line shown after an action settles.
#[derive(Debug, Clone)]
pub struct StatusBanner {
    pub kind: BannerKind,
    pub code: String,
    pub message: String,
    shown_at: Instant,
    ttl: Duration,
}

impl StatusBanner {
    pub fn new(kind: BannerKind, code: &str, message: String) -> Self {
        let ttl = match kind {
            BannerKind::Challenge => Duration::from_secs(7),
            _ => Duration::from_secs(5),
        };

        Self {
            kind,
            code: code.to_string(),
            message,
            shown_at: Instant::now(),
            ttl,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(BannerKind::Success, "OK", message.into())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= self.ttl
    }
}
