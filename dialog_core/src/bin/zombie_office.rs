//! Console transport: play Zombie Office in a terminal.
//!
//! Reads one line per turn from stdin. A number picks the matching choice from
//! the last message; `quit` ends the game. With `ZOMBIE_OFFICE_OUTPUT=json`
//! every reply is written as one JSON line instead of plain text.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dialog_core::{BotConfig, DialogBot, InMemoryStateStore, MessagePart, OutboundMessage};

const CONVERSATION: &str = "console";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = match std::env::var("ZOMBIE_OFFICE_CONFIG") {
        Ok(path) => BotConfig::load(path)?,
        Err(_) => BotConfig::default(),
    }
    .apply_env();

    let registry = config.load_registry()?;
    let json = std::env::var("ZOMBIE_OFFICE_OUTPUT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    info!(title = registry.title(), spell_correction = config.spell_correction, json, "starting");

    let bot = DialogBot::from_config(registry, InMemoryStateStore::new(), &config)?;
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut last = bot.submit_turn(CONVERSATION, "").await;
    stdout.write_all(render(&last, json)?.as_bytes()).await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") {
            break;
        }

        let text = pick_choice(&last, line).unwrap_or_else(|| line.to_string());
        last = bot.submit_turn(CONVERSATION, &text).await;
        stdout.write_all(render(&last, json)?.as_bytes()).await?;
    }

    bot.end_conversation(CONVERSATION).await;
    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dialog_core=info,story_rules=info".into());
    let json = std::env::var("ZOMBIE_OFFICE_LOG_JSON").is_ok_and(|v| v == "1");

    // Logs go to stderr so they don't interleave with the story on stdout.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Map a numeric reply to the label of the matching choice.
fn pick_choice(message: &OutboundMessage, reply: &str) -> Option<String> {
    let index = reply.parse::<usize>().ok()?.checked_sub(1)?;
    message.parts.iter().rev().find_map(|part| match part {
        MessagePart::Choices { options, .. } => options.get(index).cloned(),
        MessagePart::Text { .. } => None,
    })
}

fn render(message: &OutboundMessage, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return Ok(format!("{}\n", message.to_json()?));
    }
    Ok(format!("\n{}\n> ", message.to_plain_text()))
}
