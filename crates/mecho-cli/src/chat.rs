//! Interactive mode: each stdin line is one chat message.
//!
//! Words of the form `image:<path-or-url>` become attached images; the rest
//! of the line is the message text.

use anyhow::{Context, Result};
use mecho_bot::{HandleResult, InboundMessage, MemeBot, Reply};
use mecho_fetch::Fetcher;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::source::image_source;

const IMAGE_PREFIX: &str = "image:";

pub async fn run<F: Fetcher>(bot: &MemeBot<F>, conversation: &str, user: &str) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let msg = parse_line(conversation, user, &line);
        match bot.handle(&msg).await {
            HandleResult::Handled(Reply::Text(text)) => println!("{}", text),
            HandleResult::Handled(Reply::Image(path)) => println!("[image] {}", path.display()),
            HandleResult::HandledWithError(text) => println!("[error] {}", text),
            HandleResult::NotHandled => {}
        }
    }

    Ok(())
}

fn parse_line(conversation: &str, user: &str, line: &str) -> InboundMessage {
    let mut words = Vec::new();
    let mut msg = InboundMessage::text(conversation, user, "");

    for word in line.split_whitespace() {
        match word.strip_prefix(IMAGE_PREFIX) {
            Some(src) if !src.is_empty() => msg = msg.with_image(image_source(src)),
            _ => words.push(word),
        }
    }

    msg.text = words.join(" ");
    msg
}
