//! # Configuration Management Module
//!
//! Typed TOML configuration for the bot, with defaults for every section.
//!
//! ## Configuration Structure
//!
//! - [`BotConfig`] - Bot identity, command prefix and link targets
//! - [`CatalogConfig`] - Where the reference catalog documents live
//! - [`StorageConfig`] - Bundle progress state file settings
//! - [`LoggingConfig`] - Logging level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stardew_savant::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Prefix: {}", config.bot.prefix_char());
//!
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bot]
//! name = "StardewSavant"
//! command_prefix = "!"
//!
//! [catalog]
//! data_dir = "./data"
//!
//! [storage]
//! data_dir = "./state"
//! state_file = "bundles_state.json"
//! backup_corrupt_state = true
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every catalog file name has a default, so `[catalog]` usually only names the directory.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Command prefixes the bot accepts. Anything else falls back to `!`.
pub const ALLOWED_PREFIXES: [char; 6] = ['!', '^', '+', '$', '/', '>'];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub name: String,
    /// Single-character command prefix; must be one of [`ALLOWED_PREFIXES`].
    #[serde(default = "default_prefix")]
    pub command_prefix: String,
    /// Base URL used to build wiki links for lookups.
    #[serde(default = "default_wiki_base_url")]
    pub wiki_base_url: String,
    /// Image returned by the bare `junimo` command.
    #[serde(default = "default_junimo_image")]
    pub junimo_image: String,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_wiki_base_url() -> String {
    "https://stardewvalleywiki.com".to_string()
}

fn default_junimo_image() -> String {
    "https://stardewvalleywiki.com/mediawiki/images/5/57/Junimo.gif".to_string()
}

impl BotConfig {
    /// The configured prefix if it is allowed, otherwise `!`.
    pub fn prefix_char(&self) -> char {
        let mut chars = self.command_prefix.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if ALLOWED_PREFIXES.contains(&c) => c,
            _ => '!',
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub data_dir: String,
    #[serde(default = "default_townspeople")]
    pub townspeople: String,
    #[serde(default = "default_buildings")]
    pub buildings: String,
    #[serde(default = "default_events")]
    pub events: String,
    #[serde(default = "default_fish")]
    pub fish: String,
    #[serde(default = "default_seasons")]
    pub seasons: String,
    #[serde(default = "default_crops")]
    pub crops: String,
    #[serde(default = "default_community")]
    pub community: String,
    #[serde(default = "default_upgrades")]
    pub upgrades: String,
}

fn default_townspeople() -> String {
    "townspeople.json".into()
}
fn default_buildings() -> String {
    "building.json".into()
}
fn default_events() -> String {
    "events.json".into()
}
fn default_fish() -> String {
    "fish.json".into()
}
fn default_seasons() -> String {
    "seasons.json".into()
}
fn default_crops() -> String {
    "crops.json".into()
}
fn default_community() -> String {
    "communitycenter.json".into()
}
fn default_upgrades() -> String {
    "upgrades.json".into()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            townspeople: default_townspeople(),
            buildings: default_buildings(),
            events: default_events(),
            fish: default_fish(),
            seasons: default_seasons(),
            crops: default_crops(),
            community: default_community(),
            upgrades: default_upgrades(),
        }
    }
}

impl CatalogConfig {
    /// Point every document at `dir`, keeping the file names.
    pub fn in_dir(dir: impl Into<String>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    /// Move an unparsable state file aside (`<file>.corrupt-<timestamp>`) instead of
    /// silently overwriting it on the next save.
    #[serde(default = "default_backup_corrupt_state")]
    pub backup_corrupt_state: bool,
}

fn default_state_file() -> String {
    "bundles_state.json".to_string()
}

fn default_backup_corrupt_state() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./state".to_string(),
            state_file: default_state_file(),
            backup_corrupt_state: true,
        }
    }
}

impl StorageConfig {
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.state_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed level; unknown strings mean `info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bot: BotConfig {
                name: "StardewSavant".to_string(),
                command_prefix: default_prefix(),
                wiki_base_url: default_wiki_base_url(),
                junimo_image: default_junimo_image(),
            },
            catalog: CatalogConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("stardew-savant.log".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_fallbacks() {
        let mut bot = Config::default().bot;
        assert_eq!(bot.prefix_char(), '!');
        bot.command_prefix = "^".into();
        assert_eq!(bot.prefix_char(), '^');
        bot.command_prefix = "#".into();
        assert_eq!(bot.prefix_char(), '!');
        bot.command_prefix = "!!".into();
        assert_eq!(bot.prefix_char(), '!');
    }

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [bot]
            name = "Test"

            [catalog]
            data_dir = "/srv/catalog"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bot.prefix_char(), '!');
        assert_eq!(cfg.catalog.community, "communitycenter.json");
        assert_eq!(cfg.storage.state_file, "bundles_state.json");
        assert!(cfg.storage.backup_corrupt_state);
        assert_eq!(cfg.logging.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let serialized = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(back.bot.name, "StardewSavant");
        assert_eq!(back.storage.state_path(), PathBuf::from("./state").join("bundles_state.json"));
    }

    #[test]
    fn test_level_filter_parsing() {
        let logging = LoggingConfig {
            level: "debug".into(),
            file: None,
        };
        assert_eq!(logging.level_filter(), log::LevelFilter::Debug);
        let bogus = LoggingConfig {
            level: "chatty".into(),
            file: None,
        };
        assert_eq!(bogus.level_filter(), log::LevelFilter::Info);
    }
}
