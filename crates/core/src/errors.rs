use thiserror::Error;

/// Generic text returned to callers for any pipeline failure whose detail must stay internal.
pub const PROCESSING_FAILED_MESSAGE: &str = "Error processing your portfolio file";

/// Generic text returned to callers when the completion service fails.
pub const ASSISTANT_UNAVAILABLE_MESSAGE: &str = "The assistant is unavailable right now";

/// Unified error type for the entire holdings-lens-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Schema / Data ───────────────────────────────────────────────
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Column '{column}' has non-numeric value '{value}' at row {row}")]
    DataType {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Instrument name is empty at row {row}")]
    EmptyInstrument { row: usize },

    // ── File structure ──────────────────────────────────────────────
    #[error("Malformed CSV: {0}")]
    Malformed(String),

    #[error("File is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("File contains no header row")]
    EmptyFile,

    // ── Upload validation ───────────────────────────────────────────
    #[error("No file uploaded")]
    NoFile,

    #[error("No selected file")]
    NoFilename,

    #[error("Invalid file type. Please upload a CSV file.")]
    InvalidFileType(String),

    #[error("File of {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    // ── Charts ──────────────────────────────────────────────────────
    #[error("Chart rendering failed: {0}")]
    Render(String),

    // ── Chat / Completion service ───────────────────────────────────
    #[error("{0}")]
    ValidationError(String),

    #[error("No API key configured for the completion service")]
    MissingApiKey,

    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// True for errors caused by the caller's input rather than by this process.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::MissingColumns(_)
                | CoreError::DataType { .. }
                | CoreError::EmptyInstrument { .. }
                | CoreError::NoFile
                | CoreError::NoFilename
                | CoreError::InvalidFileType(_)
                | CoreError::FileTooLarge { .. }
                | CoreError::ValidationError(_)
        )
    }

    /// HTTP-style status code for the transport layer.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::FileTooLarge { .. } => 413,
            CoreError::Api { .. } | CoreError::Network(_) | CoreError::MissingApiKey => 502,
            e if e.is_client_error() => 400,
            _ => 500,
        }
    }

    /// Message that is safe to hand back to the caller.
    ///
    /// Only variants whose text names nothing but column identifiers or the
    /// caller's own request are passed through; everything else collapses to a
    /// fixed generic message.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::MissingColumns(_)
            | CoreError::NoFile
            | CoreError::NoFilename
            | CoreError::InvalidFileType(_)
            | CoreError::FileTooLarge { .. }
            | CoreError::ValidationError(_) => self.to_string(),
            CoreError::Api { .. } | CoreError::Network(_) | CoreError::MissingApiKey => {
                ASSISTANT_UNAVAILABLE_MESSAGE.to_string()
            }
            _ => PROCESSING_FAILED_MESSAGE.to_string(),
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        match e.kind() {
            csv::ErrorKind::Utf8 { .. } => CoreError::Encoding(e.to_string()),
            _ => CoreError::Malformed(e.to_string()),
        }
    }
}

impl From<std::str::Utf8Error> for CoreError {
    fn from(e: std::str::Utf8Error) -> Self {
        CoreError::Encoding(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors often carry the full URL; strip the query so keys never leak.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
