pub mod client;
pub mod routes;

use serde::{Deserialize, Serialize};

pub use client::ApiClient;
pub use routes::Endpoints;

/// Fields of a conversion submission.
#[derive(Debug, Clone)]
pub struct ConvertForm {
    pub text: String,
    pub voice: String,
    pub download: bool,
    pub captcha: Option<String>,
}

/// Body the service sends back with a non-2xx conversion response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub show_captcha: bool,
}

#[derive(Debug, Clone)]
pub struct ChallengeImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ChallengeImage {
    /// File extension matching the content type, `png` when unsure.
    pub fn extension(&self) -> &'static str {
        match self.content_type.split(';').next().map(str::trim) {
            Some("image/jpeg") => "jpg",
            Some("image/gif") => "gif",
            Some("image/svg+xml") => "svg",
            _ => "png",
        }
    }
}
