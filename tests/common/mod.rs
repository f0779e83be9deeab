#![allow(dead_code)]

use std::io::BufWriter;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use fee_chat::services::chatbot::ReplySettings;
use fee_chat::services::completion::{CompletionProvider, CompletionRequest, ProviderError};
use fee_chat::services::prompt::SystemPrompt;
use fee_chat::services::rate_limiter::RateLimiter;
use fee_chat::services::uploads::UploadStore;
use fee_chat::state::{AppState, SharedState};

pub const TEST_PROMPT: &str = "You are Fee, a reviewer.";
pub const BOUNDARY: &str = "fee-chat-test-boundary";

#[derive(Debug, Clone)]
pub enum Behavior {
    Reply(Option<String>),
    ApiError { status: u16, message: String },
    Garbled,
}

/// Provider stand-in that records every request it receives.
pub struct MockProvider {
    behavior: Behavior,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self { behavior, requests: Mutex::new(Vec::new()) })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Behavior::Reply(Some(text.to_string())))
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The user turn of the only request seen so far.
    pub fn user_input(&self) -> String {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one provider call");
        requests[0].messages[1].content.clone()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>, ProviderError> {
        self.requests.lock().unwrap().push(request);
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::ApiError { status, message } => Err(ProviderError::Api {
                status: *status,
                message: message.clone(),
                kind: None,
                code: None,
            }),
            Behavior::Garbled => Err(ProviderError::Decode("missing field `choices`".into())),
        }
    }
}

pub fn test_state(provider: Arc<MockProvider>, upload_dir: &Path) -> SharedState {
    test_state_with(provider, upload_dir, 1024 * 1024, 100)
}

pub fn test_state_with(
    provider: Arc<MockProvider>,
    upload_dir: &Path,
    max_upload_bytes: usize,
    max_requests: u32,
) -> SharedState {
    Arc::new(AppState {
        prompt: SystemPrompt::new(TEST_PROMPT),
        provider,
        reply: ReplySettings::default(),
        uploads: UploadStore::new(upload_dir, max_upload_bytes),
        limiter: RateLimiter::new(max_requests, Duration::from_secs(15 * 60)),
    })
}

/// Hand-built `multipart/form-data` body.
pub fn multipart_body(message: Option<&str>, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(message) = message {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"message\"\r\n\r\n{message}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                 Content-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn chat_request(message: Option<&str>, file: Option<(&str, &[u8])>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(message, file)))
        .unwrap()
}

pub fn from_ip(mut req: Request<Body>, addr: &str) -> Request<Body> {
    let addr: SocketAddr = addr.parse().unwrap();
    req.extensions_mut().insert(ConnectInfo(addr));
    req
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn upload_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// A one-page PDF with a single line of text.
pub fn text_pdf(text: &str) -> Vec<u8> {
    use printpdf::{BuiltinFont, Mm, PdfDocument};

    let (doc, page, layer) = PdfDocument::new("Fixture", Mm(210.0), Mm(297.0), "Layer 1");
    let current_layer = doc.get_page(page).get_layer(layer);
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).unwrap();
    let size: u8 = 24;
    current_layer.use_text(text, size.into(), Mm(20.0), Mm(270.0), &font);

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer).unwrap();
    writer.into_inner().unwrap()
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
