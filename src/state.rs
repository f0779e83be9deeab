// src/state.rs
use std::sync::Arc;

use crate::config::Config;
use crate::services::chatbot::ReplySettings;
use crate::services::completion::CompletionProvider;
use crate::services::prompt::SystemPrompt;
use crate::services::rate_limiter::RateLimiter;
use crate::services::uploads::UploadStore;

pub type SharedState = Arc<AppState>;

/// Everything a request handler needs, built once before the server binds.
pub struct AppState {
    pub prompt: SystemPrompt,
    pub provider: Arc<dyn CompletionProvider>,
    pub reply: ReplySettings,
    pub uploads: UploadStore,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(
        config: &Config,
        prompt: SystemPrompt,
        provider: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            prompt,
            provider,
            reply: ReplySettings {
                max_tokens: config.provider.max_tokens,
                temperature: config.provider.temperature,
            },
            uploads: UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes),
            limiter: RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window),
        }
    }
}
