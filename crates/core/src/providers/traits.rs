use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::chart::{EncodedChart, PieChart};
use crate::models::chat::ChatMessage;

/// An external chat-completion service.
///
/// Implementations forward a full conversation (system instruction, prior
/// turns, new question) and return the model's reply text verbatim.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ChatProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CoreError>;
}

/// Turns a pie chart description into an encoded image.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &PieChart) -> Result<EncodedChart, CoreError>;
}
