//! # Bot Core Module
//!
//! Turns chat lines into replies.
//!
//! ## Components
//!
//! - [`parser`] - Prefix command parsing with quote-aware arguments
//! - [`commands`] - Command handlers over the catalog and the progress store
//! - [`render`] - Transport-neutral replies (plain text or embed cards)
//! - [`server`] - Channel-driven server loop used by transports
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  BotServer      │ ← One task per incoming line
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Command        │ ← Parse, dispatch, render
//! │  Processor      │
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  Catalog +      │ ← Read-only reference data
//! │  ProgressStore  │ ← Per-guild bundle checklist
//! └─────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stardew_savant::bot::CommandProcessor;
//! use stardew_savant::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let bot = CommandProcessor::from_config(&config)?;
//!     if let Some(reply) = bot.process(1234, "!bundle check \"Artisan Bundle\" Cherry").await {
//!         println!("{}", reply.to_plain_text());
//!     }
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod parser;
pub mod render;
pub mod server;

pub use commands::{CommandError, CommandProcessor};
pub use parser::{BotCommand, BundleCommand, CommandParser, ParsedCommand, Usage};
pub use render::{Embed, Field, Reply};
pub use server::{split_guild_marker, BotServer, IncomingMessage, OutgoingReply};
