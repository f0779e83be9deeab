use std::time::Duration;

use anyhow::Context;
use fee_chat::client::{Attachment, HttpTransport, Sender, Transcript};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

const HELP: &str = "Commands: /attach <file.pdf>, /detach, /clear, /quit. Anything else is sent.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let base_url =
        std::env::var("FEE_CHAT_URL").unwrap_or_else(|_| "http://localhost:5001".to_string());
    let persona = std::env::var("PERSONA_NAME").unwrap_or_else(|_| "Fee".to_string());

    let transport = HttpTransport::new(&base_url, Duration::from_secs(120))
        .context("failed to build HTTP client")?;
    let mut transcript = Transcript::new();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let banner = format!("Chat with {} ({})\n{}\n", persona, transport.endpoint(), HELP);
    stdout.write_all(banner.as_bytes()).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim_end();

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit", _) => break,
            ("/help", _) => stdout.write_all(format!("{}\n", HELP).as_bytes()).await?,
            ("/clear", _) => {
                transcript.clear();
                stdout.write_all(b"(new conversation)\n").await?;
            }
            ("/detach", _) => {
                if let Some(file) = transcript.detach() {
                    stdout.write_all(format!("(detached {})\n", file.file_name).as_bytes()).await?;
                }
            }
            ("/attach", path) if !path.is_empty() => match Attachment::from_path(path).await {
                Ok(file) => {
                    let note =
                        format!("(attached {}, {} bytes)\n", file.file_name, file.data.len());
                    stdout.write_all(note.as_bytes()).await?;
                    transcript.attach(file);
                }
                Err(e) => {
                    let note = format!("(cannot read {}: {})\n", path, e);
                    stdout.write_all(note.as_bytes()).await?;
                }
            },
            _ => {
                transcript.set_input(line);
                if !transcript.can_send() {
                    continue;
                }
                stdout.write_all(format!("{} is typing...\n", persona).as_bytes()).await?;
                stdout.flush().await?;

                transcript.send(&transport).await;
                if let Some(reply) = transcript
                    .messages()
                    .last()
                    .filter(|m| m.sender == Sender::Assistant)
                {
                    stdout.write_all(format!("{}: {}\n", persona, reply.content).as_bytes()).await?;
                }
            }
        }
    }

    Ok(())
}
