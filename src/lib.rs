//! # StardewSavant - Stardew Valley Helper Bot
//!
//! StardewSavant answers chat commands about Stardew Valley reference data and keeps a shared,
//! per-guild checklist of Community Center bundle progress.
//!
//! ## Features
//!
//! - **Reference Lookups**: Villager gifts and birthdays, building and upgrade costs, fish and
//!   crop facts, festival calendars and per-season summaries.
//! - **Bundle Tracking**: Check and uncheck bundle items per guild, see room and overall
//!   completion, list incomplete bundles and find which bundles take an item.
//! - **Bundle-Aware Seasons**: `season <s> <category> bundle` narrows a season's crops, fish,
//!   forage and trees to what open bundles still need.
//! - **Durable State**: One JSON document, self-healing against the catalog, written atomically
//!   under a file lock; unreadable state is set aside rather than crashing the bot.
//! - **Async Design**: Built with Tokio; commands run concurrently while state updates are
//!   serialized.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stardew_savant::bot::BotServer;
//! use stardew_savant::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut server = BotServer::new(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`bot`] - Command parsing, handlers, reply rendering and the server loop
//! - [`catalog`] - Reference data documents and the bundle index
//! - [`progress`] - Per-guild bundle progress persistence
//! - [`query`] - Completion and remaining-item aggregations
//! - [`config`] - Configuration management
//! - [`validation`] - Argument validation and input sanitization
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Bot Server    │ ← Parsing, handlers, replies
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Query Layer   │ ← Completion, remaining items
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Catalog + Index │ ← Immutable reference data
//! │ Progress Store  │ ← Durable per-guild state
//! └─────────────────┘
//! ```
//!
//! The binary in `src/main.rs` runs the bot against a console transport.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod logutil;
pub mod metrics;
pub mod progress;
pub mod query;
pub mod validation;
