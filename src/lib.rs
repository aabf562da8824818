//! Client side of an edge TTS web service: loads the voice catalog, lays it
//! out as filterable voice cards and turns text into speech that is either
//! played or saved as `speech.mp3`.

pub mod api;
pub mod app;
pub mod board;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod text;

pub use app::Session;
pub use config::Config;
pub use error::AppError;
