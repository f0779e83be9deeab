use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use super::OutgoingChat;
use crate::message::{ChatResponse, ErrorResponse, FILE_FIELD, MESSAGE_FIELD};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {}", .message.as_deref().unwrap_or("no detail"))]
    Status { status: u16, message: Option<String> },
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver one chat request and return the assistant's reply text.
    async fn send(&self, request: OutgoingChat) -> Result<String, ClientError>;
}

/// Posts chat requests as `multipart/form-data` to a running backend.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: OutgoingChat) -> Result<String, ClientError> {
        let mut form = Form::new().text(MESSAGE_FIELD, request.message);
        if let Some(file) = request.file {
            let part = Part::bytes(file.data)
                .file_name(file.file_name)
                .mime_str("application/pdf")?;
            form = form.part(FILE_FIELD, part);
        }

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.json::<ErrorResponse>().await.ok().map(|e| e.error);
            return Err(ClientError::Status { status: status.as_u16(), message });
        }

        let body: ChatResponse = response.json().await?;
        Ok(body.message)
    }
}
