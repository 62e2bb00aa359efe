//! # AI Responder
//!
//! The gateway asks an [`AiResponder`] for a reply whenever a customer writes into a session
//! that the AI still owns. The production responder talks to an LLM through rust-genai
//! (cargo feature `genai`) and supports multiple providers (DeepSeek, OpenAI, Anthropic,
//! Gemini). Without a configured provider the [`DisabledResponder`] is used and sessions
//! simply get no AI replies.
//!
//! Responders only produce text. Persisting and broadcasting the reply, and deciding whether
//! it is still wanted, stays with the gateway.

use async_trait::async_trait;
use lib_utils::sanitize_text;
use shared::ChatMessage;
use std::sync::Arc;
use tracing::{info, warn};

/// Longest reply forwarded to customers, in characters.
pub const MAX_RESPONSE_LENGTH: usize = 1000;

const DEFAULT_SYSTEM_PROMPT: &str = "You are the friendly shop assistant of an online store, \
    answering customers in the store's chat widget. \
    - Answer questions about products, orders, shipping and returns as well as you can \
    - Be concise (1-3 sentences) and polite \
    - If you are unsure, say so and offer to have a store team member follow up \
    - Never invent prices, stock levels or order details";

/// Prefixes models like to open with. Stripped before a reply reaches the customer.
const PREAMBLES: &[&str] = &[
    "As an AI assistant,",
    "As an AI,",
    "I'm an AI assistant,",
    "I'm an AI,",
    "As a language model,",
];

// region: --- Responder seam

/// Everything a responder gets for one turn.
#[derive(Debug, Clone)]
pub struct AiRequest {
    pub session_id: String,
    pub merchant_id: String,
    pub customer_name: String,
    /// The customer message being answered.
    pub message: String,
    /// Recent session messages, oldest first. Ends with `message` when it was persisted.
    pub history: Vec<ChatMessage>,
}

#[async_trait]
pub trait AiResponder: Send + Sync {
    async fn respond(&self, request: AiRequest) -> anyhow::Result<String>;

    /// Label used in logs.
    fn name(&self) -> &str {
        "ai"
    }
}

/// Responder used when no provider is configured. Every turn fails, so no reply is sent.
#[derive(Debug, Default)]
pub struct DisabledResponder;

#[async_trait]
impl AiResponder for DisabledResponder {
    async fn respond(&self, _request: AiRequest) -> anyhow::Result<String> {
        anyhow::bail!("AI chat is not enabled: no provider configured")
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

/// Pick the responder for this process from the environment.
pub fn responder_from_env() -> Arc<dyn AiResponder> {
    #[cfg(feature = "genai")]
    {
        if let Some(config) = BotConfig::from_env() {
            info!(
                provider = ?config.provider,
                model = %config.model,
                "[AI] Responder ready: {} ({:?}, model {})",
                config.name,
                config.provider,
                config.model
            );
            return Arc::new(GenAiResponder::new(config));
        }
    }

    if cfg!(feature = "genai") {
        warn!("[AI] No provider API key set, sessions will run without AI replies");
    } else {
        info!("[AI] Built without the 'genai' feature, sessions will run without AI replies");
    }
    Arc::new(DisabledResponder)
}

// endregion: --- Responder seam

// region: --- Provider configuration

/// AI Provider type
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AiProvider {
    /// DeepSeek (default)
    #[default]
    DeepSeek,
    /// OpenAI
    OpenAI,
    /// Anthropic
    Anthropic,
    /// Google Gemini
    Gemini,
}

impl AiProvider {
    /// Detection order when several keys are present.
    pub const ALL: [AiProvider; 4] = [
        AiProvider::DeepSeek,
        AiProvider::OpenAI,
        AiProvider::Anthropic,
        AiProvider::Gemini,
    ];

    /// Get the default model name for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::DeepSeek => "deepseek-chat",
            AiProvider::OpenAI => "gpt-4o-mini",
            AiProvider::Anthropic => "claude-3-haiku-20240307",
            AiProvider::Gemini => "gemini-2.0-flash",
        }
    }

    /// Get the environment variable name for the API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            AiProvider::DeepSeek => "DEEPSEEK_API_KEY",
            AiProvider::OpenAI => "OPENAI_API_KEY",
            AiProvider::Anthropic => "ANTHROPIC_API_KEY",
            AiProvider::Gemini => "GEMINI_API_KEY",
        }
    }
}

/// Bot configuration
#[derive(Clone, Debug)]
pub struct BotConfig {
    /// Display name used in logs
    pub name: String,
    pub provider: AiProvider,
    pub api_key: String,
    /// Model name (e.g., "deepseek-chat", "gpt-4o-mini")
    pub model: String,
    /// Maximum response length in tokens
    pub max_tokens: u32,
    /// Temperature for response generation
    pub temperature: f32,
    pub system_prompt: String,
}

impl BotConfig {
    /// Build the configuration for the first provider whose API key is set.
    ///
    /// Returns `None` when no key is available.
    pub fn from_env() -> Option<Self> {
        let (provider, api_key) = AiProvider::ALL.into_iter().find_map(|provider| {
            std::env::var(provider.api_key_env())
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(|key| (provider, key))
        })?;

        let model = std::env::var("AI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        let system_prompt = std::env::var("AI_SYSTEM_PROMPT")
            .unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string());

        let max_tokens = std::env::var("AI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(300);

        let temperature = std::env::var("AI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(0.7);

        Some(Self {
            name: "Store Assistant".to_string(),
            provider,
            api_key,
            model,
            max_tokens,
            temperature,
            system_prompt,
        })
    }

    /// System prompt for one session, naming the store and the customer.
    pub fn prompt_for(&self, request: &AiRequest) -> String {
        format!(
            "{}\n\nYou are answering on behalf of store '{}'. The customer's name is {}.",
            self.system_prompt, request.merchant_id, request.customer_name
        )
    }
}

// endregion: --- Provider configuration

// region: --- GenAI responder

/// Responder backed by rust-genai.
#[cfg(feature = "genai")]
pub struct GenAiResponder {
    config: BotConfig,
    client: genai::Client,
}

#[cfg(feature = "genai")]
impl GenAiResponder {
    pub fn new(config: BotConfig) -> Self {
        use genai::resolver::{AuthData, AuthResolver};

        // Build auth resolver for custom API key
        let api_key = config.api_key.clone();
        let auth_resolver = AuthResolver::from_resolver_fn(
            move |_model_iden| -> Result<Option<AuthData>, genai::resolver::Error> {
                Ok(Some(AuthData::from_single(api_key.clone())))
            },
        );

        let client = genai::Client::builder()
            .with_auth_resolver(auth_resolver)
            .build();

        Self { config, client }
    }
}

#[cfg(feature = "genai")]
#[async_trait]
impl AiResponder for GenAiResponder {
    async fn respond(&self, request: AiRequest) -> anyhow::Result<String> {
        use genai::chat::{ChatMessage as GenAiMessage, ChatOptions, ChatRequest};
        use shared::SenderType;

        let system_prompt = self.config.prompt_for(&request);
        let mut chat_req = ChatRequest::default().with_system(&system_prompt);

        // Store-side turns (merchant and AI) are the assistant's voice.
        for msg in &request.history {
            chat_req = match msg.sender_type {
                SenderType::Customer => chat_req.append_message(GenAiMessage::user(&msg.content)),
                SenderType::Merchant | SenderType::Ai => {
                    chat_req.append_message(GenAiMessage::assistant(&msg.content))
                }
            };
        }
        if request.history.is_empty() {
            chat_req = chat_req.append_message(GenAiMessage::user(&request.message));
        }

        let chat_options = ChatOptions::default()
            .with_temperature(self.config.temperature as f64)
            .with_max_tokens(self.config.max_tokens);

        tracing::debug!(
            session_id = %request.session_id,
            model = %self.config.model,
            "[AI] Calling provider"
        );
        let chat_res = self
            .client
            .exec_chat(&self.config.model, chat_req, Some(&chat_options))
            .await
            .map_err(|e| anyhow::anyhow!("AI API error: {:?}", e))?;

        let text = chat_res
            .first_text()
            .ok_or_else(|| anyhow::anyhow!("No response from AI"))?;

        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

// endregion: --- GenAI responder

// region: --- Reply post-processing

/// Clean up a raw model reply before it is stored.
///
/// Strips markup, control characters and "As an AI..." preambles, and cuts overly long
/// replies at a sentence or word boundary. Returns `None` if nothing usable is left.
pub fn clean_reply(raw: &str, max_chars: usize) -> Option<String> {
    let sanitized = sanitize_text(raw);
    let mut text = sanitized.as_str();
    while let Some(rest) = PREAMBLES.iter().find_map(|preamble| text.strip_prefix(preamble)) {
        text = rest.trim_start();
    }

    if text.is_empty() {
        return None;
    }

    let Some((limit, _)) = text.char_indices().nth(max_chars) else {
        return Some(text.to_string());
    };

    let head = &text[..limit];
    let cut = if let Some(cut_point) = head.rfind('.') {
        format!("{}...", &head[..=cut_point])
    } else if let Some(cut_point) = head.rfind(' ') {
        format!("{}...", &head[..cut_point])
    } else {
        format!("{}...", head)
    };

    Some(cut)
}

// endregion: --- Reply post-processing
