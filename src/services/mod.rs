pub mod chatbot;
pub mod completion;
pub mod extractor;
pub mod prompt;
pub mod rate_limiter;
pub mod uploads;
