//! JOI Chat client
//!
//! Interactive terminal frontend for the chat widget: reads one line per
//! message, posts it to the configured endpoint, and renders the streamed
//! reply in place as it arrives. Ctrl-D quits.

use anyhow::Context;
use joi_chat::config::Config;
use joi_chat::transport::HttpChatTransport;
use joi_chat::widget::{ChatWidget, Surface, TerminalSurface};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the transcript on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    info!(endpoint = %config.client.endpoint, "Configuration loaded");

    // Fail fast on a bad endpoint instead of erroring on the first send
    let transport = HttpChatTransport::new(&config.client.endpoint)
        .context("chat endpoint configuration is invalid")?;

    let mut surface = TerminalSurface::stdout();
    println!("JOI - EVERYTHING YOU WANT TO SEE, EVERYTHING YOU WANT TO HEAR");
    println!("(Ctrl-D to quit)");
    surface.focus_input();

    let mut widget = ChatWidget::new(surface, transport);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        widget.submit(&line).await;
        if line.trim().is_empty() {
            // Blank input runs no cycle, so nothing re-prompted
            widget.surface_mut().focus_input();
        }
    }

    println!();
    info!("Session ended");
    Ok(())
}
