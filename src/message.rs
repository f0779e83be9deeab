// src/message.rs
use serde::{Deserialize, Serialize};

/// Successful reply from `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Multipart field names of the chat request.
pub const MESSAGE_FIELD: &str = "message";
pub const FILE_FIELD: &str = "file";
