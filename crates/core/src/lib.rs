pub mod errors;
pub mod models;
pub mod providers;
pub mod sanitize;
pub mod services;

use models::{
    analytics::{PortfolioReport, PortfolioResult},
    chat::{ChatReply, ChatRequest},
    settings::Settings,
    upload::{ErrorResponse, UploadResponse},
};
use providers::{groq::GroqProvider, traits::ChatProvider};
use services::{
    analytics_service::AnalyticsService, chat_service::ChatService,
    import_service::ImportService, upload_service::UploadService,
};
use uuid::Uuid;

use errors::CoreError;

pub use sanitize::{sanitize, Sanitize};

/// Parse a holdings CSV and compute rows, totals, allocation groups and the
/// holdings map, using default settings.
///
/// The result still holds raw `f64`s; run it through [`sanitize`] before it
/// crosses any serialization boundary.
pub fn parse_and_aggregate(bytes: &[u8]) -> Result<PortfolioResult, CoreError> {
    parse_and_aggregate_with(bytes, &Settings::default())
}

/// [`parse_and_aggregate`] with explicit settings.
pub fn parse_and_aggregate_with(
    bytes: &[u8],
    settings: &Settings,
) -> Result<PortfolioResult, CoreError> {
    let rows = ImportService::new().import(bytes)?;
    Ok(AnalyticsService::with_top_equity_holdings(settings.top_equity_holdings).summarize(rows))
}

/// Main entry point for the Holdings Lens core library.
/// Bundles settings, the upload pipeline and the portfolio assistant.
///
/// Holds no portfolio state: every call works only on the data it is given.
#[must_use]
pub struct HoldingsLens {
    settings: Settings,
    upload_service: UploadService,
    chat_service: Option<ChatService>,
}

impl std::fmt::Debug for HoldingsLens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldingsLens")
            .field("settings", &self.settings)
            .field("chat_available", &self.chat_service.is_some())
            .finish()
    }
}

impl HoldingsLens {
    /// Build from settings. Chat is enabled only when an API key is configured.
    pub fn new(settings: Settings) -> Self {
        let chat_service = match GroqProvider::from_settings(&settings.chat) {
            Ok(provider) => Some(ChatService::with_currency_symbol(
                Box::new(provider),
                settings.currency_symbol.clone(),
            )),
            Err(e) => {
                log::info!("Portfolio assistant disabled: {e}");
                None
            }
        };
        Self::build(settings, chat_service)
    }

    /// Build from the environment (and `.env`, if present).
    pub fn from_env() -> Self {
        Self::new(Settings::from_env())
    }

    /// Build with a specific completion provider instead of the configured one.
    pub fn with_chat_provider(settings: Settings, provider: Box<dyn ChatProvider>) -> Self {
        let chat_service = ChatService::with_currency_symbol(
            provider,
            settings.currency_symbol.clone(),
        );
        Self::build(settings, Some(chat_service))
    }

    fn build(settings: Settings, chat_service: Option<ChatService>) -> Self {
        Self {
            upload_service: UploadService::new(&settings),
            settings,
            chat_service,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn chat_available(&self) -> bool {
        self.chat_service.is_some()
    }

    // ── Portfolio ───────────────────────────────────────────────────

    /// Parse, aggregate and sanitize a holdings file.
    pub fn analyze(&self, bytes: &[u8]) -> Result<PortfolioReport, CoreError> {
        parse_and_aggregate_with(bytes, &self.settings).map(Sanitize::sanitize)
    }

    /// Handle an uploaded file: validation, analysis, charts.
    /// Errors come back caller-safe, with detail only in the log.
    pub fn upload(
        &self,
        filename: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadResponse, ErrorResponse> {
        self.upload_service.respond(filename, bytes)
    }

    // ── Assistant ───────────────────────────────────────────────────

    /// Answer a question about the portfolio described in the request.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ErrorResponse> {
        match &self.chat_service {
            Some(service) => service.respond(request).await,
            None => {
                let reference = Uuid::new_v4();
                let error = CoreError::MissingApiKey;
                log::error!("[{reference}] Chat requested but unavailable: {error}");
                Err(ErrorResponse::from_error(&error, reference))
            }
        }
    }
}
