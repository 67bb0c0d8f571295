use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";
pub const DEFAULT_TOP_EQUITY_HOLDINGS: usize = 10;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_CHAT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Runtime configuration for the pipeline and its collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Symbol prefixed to amounts in the assistant's portfolio summary.
    pub currency_symbol: String,

    /// How many equity holdings the equity breakdown keeps.
    pub top_equity_holdings: usize,

    /// Uploads larger than this are rejected before parsing.
    pub max_upload_bytes: usize,

    pub chat: ChatSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            top_equity_holdings: DEFAULT_TOP_EQUITY_HOLDINGS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            chat: ChatSettings::default(),
        }
    }
}

/// Completion-service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Bearer token; chat is unavailable without one.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// OpenAI-compatible API root, without the trailing `/chat/completions`.
    pub base_url: String,

    pub model: String,

    pub temperature: f32,

    pub max_tokens: u32,

    pub timeout_secs: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from the process environment, reading a `.env` file first
    /// if one exists. Unset variables keep their defaults.
    ///
    /// Recognised variables: `GROQ_API_KEY`, `HOLDINGS_CHAT_MODEL`,
    /// `HOLDINGS_CHAT_BASE_URL`, `HOLDINGS_MAX_UPLOAD_BYTES`,
    /// `HOLDINGS_CURRENCY_SYMBOL`.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("Ignoring unreadable .env file: {e}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (the environment, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        settings.chat.api_key = non_empty("GROQ_API_KEY");
        if let Some(model) = non_empty("HOLDINGS_CHAT_MODEL") {
            settings.chat.model = model;
        }
        if let Some(url) = non_empty("HOLDINGS_CHAT_BASE_URL") {
            settings.chat.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(symbol) = non_empty("HOLDINGS_CURRENCY_SYMBOL") {
            settings.currency_symbol = symbol;
        }
        if let Some(raw) = non_empty("HOLDINGS_MAX_UPLOAD_BYTES") {
            match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => settings.max_upload_bytes = limit,
                _ => log::warn!(
                    "HOLDINGS_MAX_UPLOAD_BYTES={raw:?} is not a positive integer; using {}",
                    settings.max_upload_bytes
                ),
            }
        }

        settings
    }
}
