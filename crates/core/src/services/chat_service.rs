use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::chat::{ChatMessage, ChatReply, ChatRequest, PortfolioContext};
use crate::models::settings::DEFAULT_CURRENCY_SYMBOL;
use crate::models::upload::ErrorResponse;
use crate::providers::traits::ChatProvider;

/// Fixed instruction opening every conversation.
pub const ADVISOR_INSTRUCTIONS: &str = "You are an expert AI Stock Portfolio Advisor. Your role is to:
- Analyze stock portfolios
- Provide investment insights
- Offer market analysis
- Suggest portfolio improvements
- Explain stock market concepts

Rules:
1. ONLY answer stock market related questions
2. If portfolio data exists, use it for personalized advice
3. For non-stock questions, politely decline
4. Be concise but informative
5. Use markdown for formatting when helpful";

const NOT_AVAILABLE: &str = "n/a";

/// Format an amount with `,` thousands grouping and two decimals: `1234.5` → `1,234.50`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Answers questions about an uploaded portfolio through an external
/// completion service, with the computed aggregates injected as context.
pub struct ChatService {
    provider: Box<dyn ChatProvider>,
    currency_symbol: String,
}

impl ChatService {
    pub fn new(provider: Box<dyn ChatProvider>) -> Self {
        Self::with_currency_symbol(provider, DEFAULT_CURRENCY_SYMBOL)
    }

    pub fn with_currency_symbol(
        provider: Box<dyn ChatProvider>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            currency_symbol: currency_symbol.into(),
        }
    }

    fn money(&self, value: Option<f64>) -> String {
        match value {
            Some(v) if v.is_finite() => format!("{}{}", self.currency_symbol, format_amount(v)),
            _ => NOT_AVAILABLE.to_string(),
        }
    }

    /// System instruction, followed by a portfolio summary when the context
    /// carries both totals and holdings.
    pub fn build_system_prompt(&self, context: Option<&PortfolioContext>) -> String {
        let mut prompt = ADVISOR_INSTRUCTIONS.to_string();

        let Some(context) = context.filter(|c| c.is_usable()) else {
            return prompt;
        };
        let Some(totals) = &context.totals else {
            return prompt;
        };

        let pnl_percent = match totals.pnl_percent {
            Some(p) if p.is_finite() => format!("{p:.2}%"),
            _ => NOT_AVAILABLE.to_string(),
        };
        let holdings = context
            .holdings
            .iter()
            .map(|(instrument, invested)| format!("{instrument}: {}", self.money(*invested)))
            .collect::<Vec<_>>()
            .join(", ");

        prompt.push_str("\n\nCurrent Portfolio Summary:\n");
        prompt.push_str(&format!(
            "- Total Investment: {}\n",
            self.money(totals.total_investment)
        ));
        prompt.push_str(&format!("- Current Value: {}\n", self.money(totals.current_value)));
        prompt.push_str(&format!(
            "- P&L: {} ({pnl_percent})\n",
            self.money(totals.total_pnl)
        ));
        prompt.push_str("\nDetailed Holdings:\n");
        prompt.push_str(&holdings);

        prompt
    }

    /// Conversation sent to the provider: instruction, prior turns, new question.
    pub fn build_messages(&self, request: &ChatRequest) -> Result<Vec<ChatMessage>, CoreError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(CoreError::ValidationError("Message is required".into()));
        }

        let mut messages = Vec::with_capacity(request.chat_history.len() + 2);
        messages.push(ChatMessage::system(
            self.build_system_prompt(request.portfolio_data.as_ref()),
        ));
        messages.extend(request.chat_history.iter().map(|turn| turn.to_message()));
        messages.push(ChatMessage::user(message));
        Ok(messages)
    }

    /// Ask the provider and return its answer verbatim. No retries.
    pub async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, CoreError> {
        let messages = self.build_messages(request)?;
        log::debug!(
            "Sending {} messages to {}",
            messages.len(),
            self.provider.name()
        );

        let response = self.provider.complete(&messages).await?;
        Ok(ChatReply {
            success: true,
            response,
        })
    }

    /// Like [`ChatService::ask`], but failures come back as a caller-safe
    /// [`ErrorResponse`] with the full error logged under its reference.
    pub async fn respond(&self, request: &ChatRequest) -> Result<ChatReply, ErrorResponse> {
        self.ask(request).await.map_err(|e| {
            let reference = Uuid::new_v4();
            if e.is_client_error() {
                log::warn!("[{reference}] Rejected chat request: {e}");
            } else {
                log::error!("[{reference}] Chat error via {}: {e}", self.provider.name());
            }
            ErrorResponse::from_error(&e, reference)
        })
    }
}
