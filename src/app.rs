use std::path::{Path, PathBuf};

use crate::api::{ApiClient, ChallengeImage, Endpoints};
use crate::board::{
    featured_voices, preview_voices, render, showcase_cards, Card, CardRef, FilterState,
    LanguageFilter, LayoutVariant, RenderOptions, VoiceBoard,
};
use crate::catalog::{language_options, CatalogLoader, LanguageOption, VoiceGroups};
use crate::config::Config;
use crate::convert::{AudioOutput, ConversionClient, Delivery};
use crate::error::{AppError, StatusBanner};
use crate::text::SAMPLE_PROMPT;

/// Everything the front end knows at a given moment. Handlers take the
/// session explicitly instead of reaching for globals.
pub struct Session {
    config: Config,
    api: ApiClient,
    loader: CatalogLoader,
    converter: ConversionClient,
    catalog: Option<VoiceGroups>,
    board: VoiceBoard,
    featured: Vec<Card>,
    preview: Vec<Card>,
    languages: Vec<LanguageOption>,
    selected_voice: String,
    challenge_visible: bool,
    challenge_answer: Option<String>,
    challenge_image: Option<PathBuf>,
    banner: Option<StatusBanner>,
}

impl Session {
    pub fn new(config: Config, output: Box<dyn AudioOutput>) -> Result<Self, AppError> {
        config.validate()?;

        let endpoints = Endpoints::from_config(&config)?;
        let api = ApiClient::new(endpoints, config.timeout)?;
        let loader = CatalogLoader::new(api.clone());
        let converter = ConversionClient::new(api.clone(), config.output_dir.clone(), output);
        let selected_voice = config.default_voice.clone();

        Ok(Self {
            config,
            api,
            loader,
            converter,
            catalog: None,
            board: VoiceBoard::new(RenderOptions::default()),
            featured: Vec::new(),
            preview: Vec::new(),
            languages: Vec::new(),
            selected_voice,
            challenge_visible: false,
            challenge_answer: None,
            challenge_image: None,
            banner: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> Option<&VoiceGroups> {
        self.catalog.as_ref()
    }

    pub fn board(&self) -> &VoiceBoard {
        &self.board
    }

    pub fn featured(&self) -> &[Card] {
        &self.featured
    }

    pub fn preview(&self) -> &[Card] {
        &self.preview
    }

    pub fn languages(&self) -> &[LanguageOption] {
        &self.languages
    }

    pub fn selected_voice(&self) -> &str {
        &self.selected_voice
    }

    pub fn filter(&self) -> &FilterState {
        self.board.filter()
    }

    pub fn banner(&self) -> Option<&StatusBanner> {
        self.banner.as_ref()
    }

    pub fn challenge_visible(&self) -> bool {
        self.challenge_visible
    }

    /// Where the most recent challenge image was saved, if any.
    pub fn challenge_image(&self) -> Option<&Path> {
        self.challenge_image.as_deref()
    }

    pub fn converter(&self) -> &ConversionClient {
        &self.converter
    }

    /// Fetches the catalog and rebuilds every view of it. A failed fetch
    /// leaves the previous catalog and board in place.
    pub async fn refresh_catalog(&mut self) -> Result<(), AppError> {
        let groups = match self.loader.load().await {
            Ok(groups) => groups,
            Err(e) => {
                self.banner = Some(e.banner());
                return Err(e);
            }
        };

        render(&groups, &mut self.board, &self.selected_voice);

        let initial = match &self.config.initial_filter {
            // Nothing would be visible.
            LanguageFilter::Multilingual
                if groups.multilingual().map_or(true, |voices| voices.is_empty()) =>
            {
                LanguageFilter::All
            }
            other => other.clone(),
        };
        self.board.set_filter(FilterState::Language(initial));

        self.languages = language_options(&groups);
        self.featured = showcase_cards(&featured_voices(&groups), LayoutVariant::Featured);
        self.preview = showcase_cards(&preview_voices(&groups), LayoutVariant::Preview);
        self.catalog = Some(groups);

        Ok(())
    }

    pub fn filter_by_language(&mut self, code: &str) {
        self.board.filter_by_language(code);
    }

    pub fn filter_by_search(&mut self, term: &str) {
        self.board.filter_by_search(term);
    }

    pub fn click(&mut self, at: CardRef) -> Result<&str, AppError> {
        self.selected_voice = self.board.click(at)?;
        Ok(&self.selected_voice)
    }

    /// Selects `voice_id`. Once a catalog is loaded the voice must be on the
    /// board; before that any id is taken as is.
    pub fn select_voice(&mut self, voice_id: &str) -> Result<(), AppError> {
        if self.catalog.is_some() {
            self.board.select_voice(voice_id)?;
        }
        self.selected_voice = voice_id.to_string();
        Ok(())
    }

    /// Converts `text` with the selected voice.
    pub async fn convert(&mut self, text: &str, download: bool) -> Result<Delivery, AppError> {
        let voice = self.selected_voice.clone();
        self.convert_with_voice(text, &voice, download).await
    }

    /// Plays the fixed sample prompt with `voice_id`.
    pub async fn play_sample(&mut self, voice_id: &str) -> Result<Delivery, AppError> {
        self.convert_with_voice(SAMPLE_PROMPT, voice_id, false).await
    }

    /// Records the answer that the next submission carries.
    pub fn answer_challenge(&mut self, answer: &str) {
        self.challenge_visible = true;
        self.challenge_answer = Some(answer.to_string());
    }

    /// Records the answer to the visible challenge and resubmits.
    pub async fn submit_challenge(
        &mut self,
        answer: &str,
        text: &str,
        download: bool,
    ) -> Result<Delivery, AppError> {
        self.answer_challenge(answer);
        self.convert(text, download).await
    }

    /// Fetches a fresh challenge image and clears the previous answer.
    pub async fn refresh_challenge(&mut self) -> Result<ChallengeImage, AppError> {
        self.challenge_answer = None;
        self.api.fetch_challenge().await
    }

    /// Saves a fresh challenge image next to the downloads and returns its path.
    pub async fn save_challenge_image(&mut self) -> Result<PathBuf, AppError> {
        let image = self.refresh_challenge().await?;
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let path = self
            .config
            .output_dir
            .join(format!("captcha.{}", image.extension()));
        tokio::fs::write(&path, &image.bytes).await?;
        self.challenge_image = Some(path.clone());
        Ok(path)
    }

    async fn convert_with_voice(
        &mut self,
        text: &str,
        voice: &str,
        download: bool,
    ) -> Result<Delivery, AppError> {
        let answer = if self.challenge_visible {
            Some(self.challenge_answer.clone().unwrap_or_default())
        } else {
            None
        };

        let result = match &answer {
            Some(answer) => {
                self.converter
                    .convert_with_challenge(text, voice, download, answer)
                    .await
            }
            None => self.converter.convert(text, voice, download).await,
        };

        match &result {
            Ok(delivery) => {
                self.challenge_answer = None;
                self.banner = Some(StatusBanner::success(match delivery {
                    Delivery::Downloaded { .. } => "Audio downloaded successfully",
                    Delivery::Played { .. } => "Audio generated successfully",
                }));
            }
            Err(e) => {
                self.banner = Some(e.banner());
                if e.is_recoverable() {
                    self.challenge_visible = true;
                    // The old image is stale once the server rejected it.
                    self.challenge_image = None;
                    if let Err(fetch) = self.save_challenge_image().await {
                        tracing::warn!("Could not fetch a new challenge image: {}", fetch);
                    }
                }
            }
        }

        result
    }
}
