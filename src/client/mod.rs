//! Client-side conversation state.
//!
//! [`Transcript`] owns the visible message list and the input area. A send is a
//! two-step affair: [`Transcript::begin_send`] records the user's message and
//! hands back the request to issue, [`Transcript::complete`] records the reply.
//! While a reply is awaited further sends are refused, and replies carrying a
//! token from before a [`Transcript::clear`] are dropped.

mod transport;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use transport::{ChatTransport, ClientError, HttpTransport};

pub const FAILURE_REPLY: &str = "Sorry, something went wrong.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
}

/// A file picked by the user, held in memory until it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self { file_name, data })
    }
}

/// The payload of one chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingChat {
    pub message: String,
    pub file: Option<Attachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug)]
pub struct PendingSend {
    pub token: RequestToken,
    pub request: OutgoingChat,
}

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    input: String,
    attachment: Option<Attachment>,
    awaiting_reply: bool,
    generation: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Attach a file, replacing any previous one.
    pub fn attach(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
    }

    pub fn detach(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Whether a send would currently go out.
    pub fn can_send(&self) -> bool {
        !self.awaiting_reply && (!self.input.trim().is_empty() || self.attachment.is_some())
    }

    /// Record the user's message and take the request to issue. Returns `None`
    /// when there is nothing to send or a reply is still outstanding.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        if !self.can_send() {
            return None;
        }

        let message = std::mem::take(&mut self.input);
        let file = self.attachment.take();

        let shown = match &file {
            Some(file) if message.trim().is_empty() => format!("[{}]", file.file_name),
            _ => message.clone(),
        };
        self.messages.push(Message { sender: Sender::User, content: shown });

        self.awaiting_reply = true;
        self.generation += 1;

        Some(PendingSend {
            token: RequestToken(self.generation),
            request: OutgoingChat { message, file },
        })
    }

    /// Record the outcome of a request. Exactly one assistant message is
    /// appended for the current request; outcomes for stale tokens are ignored.
    pub fn complete(&mut self, token: RequestToken, outcome: Result<String, ClientError>) -> bool {
        if token.0 != self.generation || !self.awaiting_reply {
            tracing::debug!(token = token.0, "dropping stale reply");
            return false;
        }

        let content = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("chat request failed: {}", e);
                FAILURE_REPLY.to_string()
            }
        };
        self.messages.push(Message { sender: Sender::Assistant, content });
        self.awaiting_reply = false;
        true
    }

    /// Issue one request through `transport` and record its outcome. Returns
    /// `false` without touching the network when nothing could be sent.
    pub async fn send<T>(&mut self, transport: &T) -> bool
    where
        T: ChatTransport + ?Sized,
    {
        let Some(pending) = self.begin_send() else {
            return false;
        };
        let outcome = transport.send(pending.request).await;
        self.complete(pending.token, outcome);
        true
    }

    /// Start a new conversation. Replies to requests made before this call
    /// are discarded when they arrive.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.input.clear();
        self.attachment = None;
        self.awaiting_reply = false;
        self.generation += 1;
    }
}
