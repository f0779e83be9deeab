// src/services/extractor.rs
use tracing::warn;

use super::uploads::StagedUpload;

/// Extract plain text from PDF bytes. Any failure, including a panic inside the
/// parser, yields an empty string so the chat can carry on with the typed text.
pub async fn extract_pdf_text(data: Vec<u8>) -> String {
    let bytes = data.len();

    // pdf-extract is CPU bound and has been known to panic on malformed input.
    let result = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&data).map_err(|e| format!("{:?}", e))
    })
    .await;

    match result {
        Ok(Ok(text)) => {
            let text = text.trim();
            if text.is_empty() {
                warn!(bytes, "PDF contained no extractable text");
            }
            text.to_string()
        }
        Ok(Err(e)) => {
            warn!(bytes, "failed to parse PDF: {}", e);
            String::new()
        }
        Err(e) => {
            warn!(bytes, "PDF parser aborted: {}", e);
            String::new()
        }
    }
}

/// Read a staged upload back from disk and extract its text.
pub async fn extract_upload(upload: &StagedUpload) -> String {
    match upload.read().await {
        Ok(data) => extract_pdf_text(data).await,
        Err(e) => {
            warn!(path = %upload.path().display(), "failed to read staged upload: {}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn garbage_yields_empty_text() {
        assert_eq!(extract_pdf_text(b"definitely not a pdf".to_vec()).await, "");
        assert_eq!(extract_pdf_text(Vec::new()).await, "");
    }

    #[tokio::test]
    async fn truncated_pdf_yields_empty_text() {
        let data = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog".to_vec();
        assert_eq!(extract_pdf_text(data).await, "");
    }
}
