use tracing::info;

use super::completion::{CompletionProvider, CompletionRequest, ProviderError, PromptMessage};
use super::prompt::SystemPrompt;

pub const DOCUMENT_PREAMBLE: &str = "\n\nHere is a document for your review:\n";
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response.";

/// Sampling bounds applied to every completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplySettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ReplySettings {
    fn default() -> Self {
        Self { max_tokens: 1500, temperature: 0.7 }
    }
}

/// Combine the typed message with extracted document text, if any.
pub fn compose_user_input(message: &str, document: &str) -> String {
    if document.is_empty() {
        message.to_string()
    } else {
        format!("{}{}{}", message, DOCUMENT_PREAMBLE, document)
    }
}

pub fn build_request(
    prompt: &SystemPrompt,
    user_input: String,
    settings: ReplySettings,
) -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            PromptMessage::system(prompt.as_str()),
            PromptMessage::user(user_input),
        ],
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    }
}

/// Ask the provider once and return the trimmed reply, substituting a fixed
/// apology when the provider produced nothing.
pub async fn generate_reply(
    provider: &dyn CompletionProvider,
    prompt: &SystemPrompt,
    user_input: String,
    settings: ReplySettings,
) -> Result<String, ProviderError> {
    let input_chars = user_input.chars().count();
    let request = build_request(prompt, user_input, settings);

    let reply = provider
        .complete(request)
        .await?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    info!(input_chars, produced = reply.is_some(), "completion finished");
    Ok(reply.unwrap_or_else(|| FALLBACK_REPLY.to_string()))
}
