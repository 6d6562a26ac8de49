//! Bot server: receives chat lines from a transport, handles each one in its own task and
//! hands rendered replies back to the transport.
//!
//! Transports talk to the server through two unbounded channels:
//!
//! ```text
//! transport ──IncomingMessage──▶ BotServer::run ──spawn──▶ CommandProcessor::process
//!     ▲                                                            │
//!     └──────────────────────────OutgoingReply─────────────────────┘
//! ```
//!
//! Commands from different guilds (and from the same guild) run concurrently; the progress
//! store serializes their state file access. `run` returns when every sender is dropped or
//! on Ctrl-C, after the in-flight commands have finished.
use anyhow::Result;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::commands::CommandProcessor;
use super::render::Reply;
use crate::config::Config;
use crate::logutil::reply_preview;

/// One chat line from a guild.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub guild_id: u64,
    pub text: String,
}

/// Reply to an [`IncomingMessage`].
#[derive(Debug, Clone)]
pub struct OutgoingReply {
    pub guild_id: u64,
    pub reply: Reply,
}

pub struct BotServer {
    name: String,
    processor: Arc<CommandProcessor>,
    incoming_tx: Option<mpsc::UnboundedSender<IncomingMessage>>,
    incoming_rx: mpsc::UnboundedReceiver<IncomingMessage>,
    outgoing_tx: mpsc::UnboundedSender<OutgoingReply>,
    outgoing_rx: Option<mpsc::UnboundedReceiver<OutgoingReply>>,
}

impl BotServer {
    /// Load the catalog and open the progress store named by `config`.
    pub async fn new(config: Config) -> Result<Self> {
        let processor = CommandProcessor::from_config(&config)?;
        Ok(Self::with_processor(config.bot.name.clone(), Arc::new(processor)))
    }

    pub fn with_processor(name: String, processor: Arc<CommandProcessor>) -> Self {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        Self {
            name,
            processor,
            incoming_tx: Some(incoming_tx),
            incoming_rx,
            outgoing_tx,
            outgoing_rx: Some(outgoing_rx),
        }
    }

    pub fn processor(&self) -> &Arc<CommandProcessor> {
        &self.processor
    }

    /// Handle for feeding chat lines in. `None` once [`BotServer::close_input`] ran.
    pub fn sender(&self) -> Option<mpsc::UnboundedSender<IncomingMessage>> {
        self.incoming_tx.clone()
    }

    /// Drop the server's own sender so `run` ends once every transport sender is gone.
    pub fn close_input(&mut self) {
        self.incoming_tx = None;
    }

    /// Take the reply stream. Only the first call gets it.
    pub fn take_replies(&mut self) -> Option<mpsc::UnboundedReceiver<OutgoingReply>> {
        self.outgoing_rx.take()
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("{} listening for commands (prefix '{}')", self.name, self.processor.prefix());
        self.close_input();
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                msg = self.incoming_rx.recv() => {
                    match msg {
                        Some(msg) => {
                            let processor = Arc::clone(&self.processor);
                            let tx = self.outgoing_tx.clone();
                            in_flight.spawn(async move {
                                if let Some(reply) = processor.process(msg.guild_id, &msg.text).await {
                                    debug!("guild {} <- {}", msg.guild_id, reply_preview(&reply.to_plain_text()));
                                    if tx.send(OutgoingReply { guild_id: msg.guild_id, reply }).is_err() {
                                        warn!("reply for guild {} dropped: transport gone", msg.guild_id);
                                    }
                                }
                            });
                        }
                        None => {
                            debug!("all transports closed");
                            break;
                        }
                    }
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        warn!("command task failed: {}", e);
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                warn!("command task failed: {}", e);
            }
        }
        info!("{} stopped", self.name);
        Ok(())
    }
}

/// Split an `@<guild> <command>` console line. Lines without a valid `@<guild>` marker
/// belong to `default_guild`.
pub fn split_guild_marker(default_guild: u64, line: &str) -> (u64, &str) {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix('@') {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if let Ok(guild) = rest[..end].parse::<u64>() {
            return (guild, rest[end..].trim_start());
        }
    }
    (default_guild, line)
}

#[cfg(test)]
mod tests {
    use super::split_guild_marker;

    #[test]
    fn guild_marker_switches_guild() {
        assert_eq!(split_guild_marker(1, "@42 !bundle"), (42, "!bundle"));
        assert_eq!(split_guild_marker(1, "!bundle"), (1, "!bundle"));
        assert_eq!(split_guild_marker(1, "@someone hi"), (1, "@someone hi"));
    }
}
