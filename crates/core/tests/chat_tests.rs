// ═══════════════════════════════════════════════════════════════════
// Chat Tests: prompt building, message ordering, provider failures
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use holdings_lens_core::errors::{CoreError, ASSISTANT_UNAVAILABLE_MESSAGE};
use holdings_lens_core::models::analytics::PortfolioTotals;
use holdings_lens_core::models::chat::{
    ChatMessage, ChatRequest, ChatRole, ChatTurn, PortfolioContext,
};
use holdings_lens_core::models::settings::{ChatSettings, Settings};
use holdings_lens_core::providers::groq::GroqProvider;
use holdings_lens_core::providers::traits::ChatProvider;
use holdings_lens_core::services::chat_service::{
    format_amount, ChatService, ADVISOR_INSTRUCTIONS,
};
use holdings_lens_core::HoldingsLens;

// ═══════════════════════════════════════════════════════════════════
// Mock Provider
// ═══════════════════════════════════════════════════════════════════

type Captured = Arc<Mutex<Vec<Vec<ChatMessage>>>>;

struct MockChatProvider {
    reply: Result<String, CoreError>,
    captured: Captured,
}

impl MockChatProvider {
    fn answering(reply: &str) -> (Self, Captured) {
        let captured = Captured::default();
        let provider = Self {
            reply: Ok(reply.to_string()),
            captured: captured.clone(),
        };
        (provider, captured)
    }

    fn failing(error: CoreError) -> (Self, Captured) {
        let captured = Captured::default();
        let provider = Self {
            reply: Err(error),
            captured: captured.clone(),
        };
        (provider, captured)
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    fn name(&self) -> &str {
        "MockChat"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CoreError> {
        self.captured.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(CoreError::Api { provider, message }) => Err(CoreError::Api {
                provider: provider.clone(),
                message: message.clone(),
            }),
            Err(other) => Err(CoreError::Network(other.to_string())),
        }
    }
}

fn sample_context() -> PortfolioContext {
    let mut holdings = BTreeMap::new();
    holdings.insert("AAPL".to_string(), Some(1000.0));
    holdings.insert("XYZ MUTUAL FUND".to_string(), Some(1000.0));
    PortfolioContext {
        totals: Some(PortfolioTotals {
            total_investment: Some(2000.0),
            current_value: Some(2400.0),
            total_pnl: Some(400.0),
            pnl_percent: Some(20.0),
        }),
        holdings,
    }
}

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        ..Default::default()
    }
}

// ── Amount formatting ───────────────────────────────────────────────

mod amounts {
    use super::*;

    #[test]
    fn grouping_and_decimals() {
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1_000_000.0), "1,000,000.00");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.0), "999.00");
    }

    #[test]
    fn negative_and_rounding() {
        assert_eq!(format_amount(-2500.75), "-2,500.75");
        assert_eq!(format_amount(999.999), "1,000.00");
    }

    #[test]
    fn non_finite_is_not_available() {
        assert_eq!(format_amount(f64::NAN), "n/a");
        assert_eq!(format_amount(f64::INFINITY), "n/a");
    }
}

// ── System prompt ───────────────────────────────────────────────────

mod prompt {
    use super::*;

    fn service() -> ChatService {
        let (provider, _) = MockChatProvider::answering("ok");
        ChatService::new(Box::new(provider))
    }

    #[test]
    fn bare_instructions_without_context() {
        assert_eq!(service().build_system_prompt(None), ADVISOR_INSTRUCTIONS);
    }

    #[test]
    fn summary_appended_with_context() {
        let prompt = service().build_system_prompt(Some(&sample_context()));
        let expected_tail = "\n\nCurrent Portfolio Summary:\n\
            - Total Investment: ₹2,000.00\n\
            - Current Value: ₹2,400.00\n\
            - P&L: ₹400.00 (20.00%)\n\
            \nDetailed Holdings:\n\
            AAPL: ₹1,000.00, XYZ MUTUAL FUND: ₹1,000.00";

        assert!(prompt.starts_with(ADVISOR_INSTRUCTIONS));
        assert_eq!(&prompt[ADVISOR_INSTRUCTIONS.len()..], expected_tail);
    }

    #[test]
    fn absent_percent_is_not_available() {
        let mut context = sample_context();
        if let Some(totals) = context.totals.as_mut() {
            totals.pnl_percent = None;
        }
        let prompt = service().build_system_prompt(Some(&context));
        assert!(prompt.contains("- P&L: ₹400.00 (n/a)"));
    }

    #[test]
    fn context_without_holdings_is_ignored() {
        let mut context = sample_context();
        context.holdings.clear();
        assert_eq!(
            service().build_system_prompt(Some(&context)),
            ADVISOR_INSTRUCTIONS
        );
    }

    #[test]
    fn custom_currency_symbol() {
        let (provider, _) = MockChatProvider::answering("ok");
        let service = ChatService::with_currency_symbol(Box::new(provider), "$");
        let prompt = service.build_system_prompt(Some(&sample_context()));
        assert!(prompt.contains("- Total Investment: $2,000.00"));
    }
}

// ── Conversation building ───────────────────────────────────────────

mod messages {
    use super::*;

    #[test]
    fn system_then_history_then_question() {
        let (provider, _) = MockChatProvider::answering("ok");
        let service = ChatService::new(Box::new(provider));
        let req = ChatRequest {
            message: "  Should I rebalance?  ".into(),
            chat_history: vec![
                ChatTurn { sender: "user".into(), message: "Hi".into() },
                ChatTurn { sender: "bot".into(), message: "Hello!".into() },
            ],
            portfolio_data: Some(sample_context()),
        };

        let messages = service.build_messages(&req).unwrap();
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert!(messages[0].content.contains("Current Portfolio Summary"));
        assert_eq!(messages[2].content, "Hello!");
        assert_eq!(messages[3].content, "Should I rebalance?");
    }

    #[test]
    fn blank_message_is_rejected() {
        let (provider, _) = MockChatProvider::answering("ok");
        let service = ChatService::new(Box::new(provider));
        let err = service.build_messages(&request("   ")).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(ref m) if m == "Message is required"));
    }

    #[test]
    fn request_deserializes_from_client_json() {
        let json = r#"{
            "message": "How diversified am I?",
            "chat_history": [{"sender": "user", "message": "hi"}],
            "portfolio_data": {
                "totals": {"total_investment": 2000.0, "current_value": 2400.0,
                           "total_pnl": 400.0, "pnl_percent": null},
                "holdings": {"AAPL": 1000.0, "GIFT": null}
            }
        }"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        let context = req.portfolio_data.unwrap();
        assert!(context.is_usable());
        assert_eq!(context.totals.unwrap().pnl_percent, None);
        assert_eq!(context.holdings["GIFT"], None);
        assert_eq!(req.chat_history.len(), 1);
    }

    #[test]
    fn message_only_request_deserializes() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(req.chat_history.is_empty());
        assert!(req.portfolio_data.is_none());
    }
}

// ── Provider round trip ─────────────────────────────────────────────

mod asking {
    use super::*;

    #[tokio::test]
    async fn reply_is_returned_verbatim() {
        let (provider, captured) = MockChatProvider::answering("**Diversify.**");
        let service = ChatService::new(Box::new(provider));

        let reply = service.ask(&request("Advice?")).await.unwrap();
        assert!(reply.success);
        assert_eq!(reply.response, "**Diversify.**");

        let calls = captured.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 2);
    }

    #[tokio::test]
    async fn blank_message_never_reaches_provider() {
        let (provider, captured) = MockChatProvider::answering("ok");
        let service = ChatService::new(Box::new(provider));

        let err = service.respond(&request("")).await.unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.error, "Message is required");
        assert!(captured.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_is_generic() {
        let (provider, captured) = MockChatProvider::failing(CoreError::Api {
            provider: "MockChat".into(),
            message: "HTTP 401: invalid api key".into(),
        });
        let service = ChatService::new(Box::new(provider));

        let err = service.respond(&request("Advice?")).await.unwrap_err();
        assert_eq!(err.status, 502);
        assert_eq!(err.error, ASSISTANT_UNAVAILABLE_MESSAGE);
        assert!(!err.error.contains("401"));
        assert_eq!(captured.lock().unwrap().len(), 1);
    }
}

// ── Facade ──────────────────────────────────────────────────────────

mod facade {
    use super::*;

    #[test]
    fn groq_requires_api_key() {
        let err = GroqProvider::from_settings(&ChatSettings::default()).unwrap_err();
        assert!(matches!(err, CoreError::MissingApiKey));
    }

    #[test]
    fn groq_builds_with_api_key() {
        let settings = ChatSettings {
            api_key: Some("gsk_test".into()),
            ..ChatSettings::default()
        };
        let provider = GroqProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.name(), "Groq");
        assert_eq!(provider.model(), settings.model);
    }

    #[tokio::test]
    async fn chat_unavailable_without_key() {
        let lens = HoldingsLens::new(Settings::default());
        assert!(!lens.chat_available());

        let err = lens.chat(&request("hello")).await.unwrap_err();
        assert_eq!(err.status, 502);
        assert_eq!(err.error, ASSISTANT_UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn injected_provider_answers() {
        let (provider, captured) = MockChatProvider::answering("Looks balanced.");
        let lens = HoldingsLens::with_chat_provider(Settings::default(), Box::new(provider));
        assert!(lens.chat_available());

        let report = lens
            .analyze(b"instrument,qty,avg cost,ltp\nAAPL,10,100,150\nXYZ MUTUAL FUND,5,200,180\n")
            .unwrap();
        let req = ChatRequest {
            message: "How am I doing?".into(),
            chat_history: Vec::new(),
            portfolio_data: Some(PortfolioContext::from(&report)),
        };

        let reply = lens.chat(&req).await.unwrap();
        assert_eq!(reply.response, "Looks balanced.");

        let calls = captured.lock().unwrap();
        assert!(calls[0][0].content.contains("- P&L: ₹400.00 (20.00%)"));
        assert!(calls[0][0].content.contains("AAPL: ₹1,000.00"));
    }
}
