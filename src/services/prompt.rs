// src/services/prompt.rs
use std::{
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
};

use regex::Regex;
use thiserror::Error;
use tracing::{error, info};

use crate::config::PromptSources;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("no prompt material could be loaded from {context:?} or {persona:?}")]
    Empty { context: PathBuf, persona: PathBuf },
}

/// The fixed system prompt, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt(Arc<str>);

impl SystemPrompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self(Arc::from(text.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Load the context and persona descriptions and combine them with the
/// reviewer instruction. Fails only when both sources are empty.
pub async fn build_system_prompt(sources: &PromptSources) -> Result<SystemPrompt, PromptError> {
    let context = load_markdown_file(&sources.context_path).await;
    let persona = load_markdown_file(&sources.persona_path).await;

    if context.is_empty() && persona.is_empty() {
        return Err(PromptError::Empty {
            context: sources.context_path.clone(),
            persona: sources.persona_path.clone(),
        });
    }

    let prompt = compose_system_prompt(
        &context,
        &persona,
        &sources.persona_name,
        &sources.review_domain,
    );
    info!(chars = prompt.len(), "system prompt ready");
    Ok(SystemPrompt::new(prompt))
}

pub fn compose_system_prompt(context: &str, persona: &str, name: &str, domain: &str) -> String {
    let instruction = format!(
        "You are {name}, a knowledgeable and insightful reviewer for {domain}. \
         You provide thoughtful analyses and reviews based on the provided documents \
         and your extensive understanding of {domain}."
    );

    [context, persona, instruction.as_str()]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Read a Markdown file as plain text. Unreadable files give an empty string.
pub async fn load_markdown_file(path: &Path) -> String {
    match tokio::fs::read_to_string(path).await {
        Ok(markdown) => markdown_to_text(&markdown),
        Err(e) => {
            error!(path = %path.display(), "failed to read prompt source: {}", e);
            String::new()
        }
    }
}

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("static markdown pattern"),
        replacement,
    }
}

// Order matters: block syntax first, then inline.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(r"(?m)^[ \t]*(?:```|~~~).*$", ""),
        rule(r"<[^>]+>", ""),
        rule(r"(?m)^[ \t]*(?:-{3,}|\*{3,}|_{3,})[ \t]*$", ""),
        rule(r"(?m)^[ \t]{0,3}#{1,6}[ \t]*", ""),
        rule(r"(?m)^[ \t]*>[ \t]?", ""),
        rule(r"(?m)^([ \t]*)(?:[-*+]|\d+[.)])[ \t]+", "$1"),
        rule(r"!\[([^\]]*)\]\([^)]*\)", "$1"),
        rule(r"\[([^\]]+)\]\([^)]*\)", "$1"),
        rule(r"\*\*([^*]+)\*\*", "$1"),
        rule(r"__([^_]+)__", "$1"),
        rule(r"\*([^*\n]+)\*", "$1"),
        rule(r"\b_([^_\n]+)_\b", "$1"),
        rule(r"`([^`]*)`", "$1"),
        rule(r"\n{3,}", "\n\n"),
    ]
});

/// Strip Markdown and HTML markup, keeping the readable text.
pub fn markdown_to_text(markdown: &str) -> String {
    let normalized = markdown.replace("\r\n", "\n");
    let text = RULES.iter().fold(normalized, |text, rule| {
        rule.pattern.replace_all(&text, rule.replacement).into_owned()
    });
    text.trim().to_string()
}
