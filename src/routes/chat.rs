use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use tracing::{error, info};

use crate::{
    error::AppError,
    message::{ChatResponse, FILE_FIELD, MESSAGE_FIELD},
    services::{
        chatbot::{compose_user_input, generate_reply},
        extractor::extract_upload,
        uploads::StagedUpload,
    },
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let mut multipart = multipart?;

    let mut message = String::new();
    let mut upload: Option<StagedUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(MESSAGE_FIELD) => message = field.text().await?,
            // A second file replaces the first, whose guard deletes it.
            Some(FILE_FIELD) => upload = Some(state.uploads.stage(field).await?),
            _ => {}
        }
    }

    // The staged file is gone before the provider is contacted. Browsers send
    // an empty file part when nothing was chosen.
    let document = match upload {
        Some(upload) if !upload.is_empty() => extract_upload(&upload).await,
        _ => String::new(),
    };

    info!(
        message_chars = message.chars().count(),
        document_chars = document.chars().count(),
        "chat request"
    );

    let user_input = compose_user_input(&message, &document);
    let reply = generate_reply(state.provider.as_ref(), &state.prompt, user_input, state.reply)
        .await
        .inspect_err(|e| error!("completion failed: {}", e))?;

    Ok(Json(ChatResponse { message: reply }))
}
