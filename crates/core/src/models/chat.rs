use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::analytics::{PortfolioReport, PortfolioTotals};

/// Role of a message sent to the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message in the shape completion APIs expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A prior turn as the client keeps it: who said it and what was said.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// `"user"` for the person; anything else is treated as the assistant
    pub sender: String,
    pub message: String,
}

impl ChatTurn {
    pub fn to_message(&self) -> ChatMessage {
        if self.sender == "user" {
            ChatMessage::user(self.message.clone())
        } else {
            ChatMessage::assistant(self.message.clone())
        }
    }
}

/// Portfolio aggregates injected into the assistant's instructions.
///
/// Clients send back what the upload returned, so every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioContext {
    #[serde(default)]
    pub totals: Option<PortfolioTotals<Option<f64>>>,

    #[serde(default)]
    pub holdings: BTreeMap<String, Option<f64>>,
}

impl PortfolioContext {
    /// True when there is something worth putting in the prompt.
    pub fn is_usable(&self) -> bool {
        self.totals.is_some() && !self.holdings.is_empty()
    }
}

impl From<&PortfolioReport> for PortfolioContext {
    fn from(report: &PortfolioReport) -> Self {
        Self {
            totals: Some(report.totals.clone()),
            holdings: report.holdings.clone(),
        }
    }
}

/// An incoming question about the portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,

    #[serde(default)]
    pub portfolio_data: Option<PortfolioContext>,
}

/// The assistant's answer, returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub success: bool,
    pub response: String,
}
