//! Command handlers.
//!
//! [`CommandProcessor::process`] is the single entrypoint: it sanitizes and parses one chat
//! line, runs the matching handler for the guild it came from and returns the rendered
//! [`Reply`] (or `None` for ordinary chat). Reference lookups only read the shared
//! [`Catalog`]; bundle commands go through the [`ProgressStore`], which serializes every
//! read-modify-write of the state file.
//!
//! Lookup misses and bad arguments are answered with a short message. A failed state write
//! is logged at `error` and answered with an apology; success is never reported for it.
use anyhow::Result;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Instant;

use super::parser::{BotCommand, BundleCommand, CommandParser, ParsedCommand};
use super::render::{bullet_list, colors, Embed, Reply};
use crate::catalog::{Bundle, BundleIndex, BundleLocation, Catalog};
use crate::config::{BotConfig, Config};
use crate::logutil::escape_log;
use crate::metrics;
use crate::progress::{GuildProgress, ProgressError, ProgressStore};
use crate::query::{self, SeasonCategory};
use crate::validation::{self, ArgumentError};

/// Why a handler could not produce its normal reply.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// A catalog lookup missed; carries the message shown to the user.
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Progress(#[from] ProgressError),
}

impl CommandError {
    fn user_message(&self) -> String {
        match self {
            CommandError::NotFound(msg) => msg.clone(),
            CommandError::Argument(e) => e.to_string(),
            CommandError::Progress(ProgressError::BundleNotFound(_)) => {
                "Bundle not found. Tip: wrap bundle names with spaces in quotes.".to_string()
            }
            CommandError::Progress(e @ ProgressError::ItemNotFound { .. }) => format!("{}.", e),
            CommandError::Progress(_) => {
                "Sorry, I couldn't save bundle progress right now. Nothing was changed, please try again."
                    .to_string()
            }
        }
    }
}

type HandlerResult = std::result::Result<Reply, CommandError>;

pub struct CommandProcessor {
    catalog: Arc<Catalog>,
    index: Arc<BundleIndex>,
    store: Arc<ProgressStore>,
    parser: CommandParser,
    bot: BotConfig,
}

impl CommandProcessor {
    pub fn new(bot: BotConfig, catalog: Arc<Catalog>, index: Arc<BundleIndex>, store: Arc<ProgressStore>) -> Self {
        let parser = CommandParser::new(bot.prefix_char());
        Self {
            catalog,
            index,
            store,
            parser,
            bot,
        }
    }

    /// Load the catalog, build the bundle index and open the progress store named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = Arc::new(Catalog::load(&config.catalog)?);
        let index = Arc::new(BundleIndex::build(&catalog));
        let store = Arc::new(
            ProgressStore::new(config.storage.state_path(), Arc::clone(&catalog), Arc::clone(&index))
                .with_corrupt_backup(config.storage.backup_corrupt_state),
        );
        Ok(Self::new(config.bot.clone(), catalog, index, store))
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn index(&self) -> &Arc<BundleIndex> {
        &self.index
    }

    pub fn store(&self) -> &Arc<ProgressStore> {
        &self.store
    }

    pub fn prefix(&self) -> char {
        self.parser.prefix()
    }

    /// Handle one raw chat line from `guild_id`. `None` means the line was not a command.
    pub async fn process(&self, guild_id: u64, raw: &str) -> Option<Reply> {
        let started = Instant::now();
        let line = match validation::sanitize_command(raw) {
            Ok(line) => line,
            Err(e) => {
                if !raw.trim_start().starts_with(self.prefix()) {
                    return None;
                }
                metrics::inc_commands_rejected();
                return Some(Reply::text(e.to_string()));
            }
        };
        let reply = match self.parser.parse(&line) {
            ParsedCommand::NotCommand => return None,
            ParsedCommand::Unknown(name) => {
                debug!("guild {}: unknown command '{}'", guild_id, escape_log(&name));
                metrics::inc_commands_rejected();
                Reply::text(format!(
                    "Unknown command. Try `{}junimo help` for a list of commands.",
                    self.prefix()
                ))
            }
            ParsedCommand::Usage(usage) => {
                metrics::inc_commands_rejected();
                Reply::text(usage.text(self.prefix()))
            }
            ParsedCommand::Command(cmd) => {
                info!("guild {}: {}", guild_id, escape_log(&line));
                let result = self.handle(guild_id, &cmd).await;
                metrics::record_command(cmd.name(), result.is_err());
                metrics::inc_commands_handled();
                match result {
                    Ok(reply) => reply,
                    Err(e) => {
                        if let CommandError::Progress(pe) = &e {
                            if !pe.is_not_found() {
                                error!("guild {}: {} failed: {}", guild_id, cmd.name(), pe);
                            }
                        }
                        Reply::text(e.user_message())
                    }
                }
            }
        };
        metrics::observe_command_latency(started);
        Some(reply)
    }

    /// Run one parsed command for `guild_id`.
    pub async fn handle(&self, guild_id: u64, cmd: &BotCommand) -> HandlerResult {
        match cmd {
            BotCommand::Gift(name) => self.gift(name),
            BotCommand::Char(name) => self.profile(name),
            BotCommand::Build(name) => self.building(name),
            BotCommand::Events { season, day } => self.events(season, day.as_deref()),
            BotCommand::Fish(name) => self.fish(name),
            BotCommand::Season { season, args } => self.season(guild_id, season, args).await,
            BotCommand::Crop(name) => self.crop(name),
            BotCommand::Upgrade(name) => self.upgrade(name),
            BotCommand::Junimo => Ok(Reply::text(self.bot.junimo_image.clone())),
            BotCommand::JunimoHelp => Ok(Reply::text(self.help_text())),
            BotCommand::Bundle(b) => self.bundle(guild_id, b).await,
        }
    }

    fn wiki_link(&self, page: &str, fragment: Option<&str>) -> String {
        let mut url = format!(
            "{}/{}",
            self.bot.wiki_base_url.trim_end_matches('/'),
            urlencoding::encode(&page.replace(' ', "_"))
        );
        if let Some(f) = fragment {
            url.push('#');
            url.push_str(&urlencoding::encode(&f.replace(' ', "_")));
        }
        url
    }

    fn gift(&self, name: &str) -> HandlerResult {
        let wanted = validation::capitalize(name);
        let (key, person) = self
            .catalog
            .townspeople
            .get_ci(&wanted)
            .ok_or_else(|| CommandError::NotFound(format!("No data available for {}.", wanted)))?;
        Ok(Embed::new(format!("Gift Preferences for {}", key), colors::GIFT)
            .thumbnail(person.image.as_deref())
            .field("Loves", bullet_list(&person.loves), true)
            .field("Likes", bullet_list(&person.likes), true)
            .link("View All Gifts on Wiki", self.wiki_link("List of All Gifts", None))
            .into())
    }

    fn profile(&self, name: &str) -> HandlerResult {
        let wanted = validation::capitalize(name);
        let (key, person) = self
            .catalog
            .townspeople
            .get_ci(&wanted)
            .ok_or_else(|| CommandError::NotFound(format!("No data available for {}.", wanted)))?;
        Ok(Embed::new(format!("Profile for {}", key), colors::PROFILE)
            .thumbnail(person.image.as_deref())
            .field("Birthday", person.birthday.as_deref().unwrap_or_default(), false)
            .into())
    }

    fn building(&self, name: &str) -> HandlerResult {
        let wanted = validation::title_case(name);
        let (key, building) = self
            .catalog
            .buildings
            .get_ci(&wanted)
            .ok_or_else(|| CommandError::NotFound(format!("No data available for {}.", wanted)))?;
        Ok(Embed::new(format!("Cost for {}", key), colors::BUILDING)
            .thumbnail(building.image.as_deref())
            .field("Materials", bullet_list(&building.cost), false)
            .link(
                "View All Buildings on Wiki",
                self.wiki_link("Carpenter's Shop", Some("Farm Buildings")),
            )
            .into())
    }

    fn events(&self, season: &str, day: Option<&str>) -> HandlerResult {
        let wanted = validation::capitalize(season);
        let found = self.catalog.events.get_ci(&wanted);
        let Some(day) = day else {
            let (key, calendar) =
                found.ok_or_else(|| CommandError::NotFound("Please provide an existing season".to_string()))?;
            let mut days: Vec<(i64, &str, &Vec<String>)> = calendar
                .iter()
                .map(|(d, events)| (d.trim().parse::<i64>().unwrap_or(i64::MAX), d, events))
                .collect();
            days.sort_by_key(|(n, _, _)| *n);
            let lines: Vec<String> = days
                .iter()
                .flat_map(|(_, d, events)| events.iter().map(move |e| format!("- {}: {}", d, e)))
                .collect();
            let text = if lines.is_empty() { "No events".to_string() } else { lines.join("\n") };
            return Ok(Embed::new(format!("Happening in {}", key), colors::EVENTS)
                .field("Event(s)", text, false)
                .into());
        };
        let (key, calendar) =
            found.ok_or_else(|| CommandError::NotFound("No data available for this date.".to_string()))?;
        let n = validation::parse_day(day)?;
        let events = calendar
            .iter()
            .find(|(d, _)| d.trim().parse::<u8>().ok() == Some(n))
            .map(|(_, events)| events.as_slice())
            .unwrap_or_default();
        let text = if events.is_empty() { "No events".to_string() } else { bullet_list(events) };
        Ok(Embed::new(format!("Happening on {} {}", key, n), colors::EVENTS)
            .field("Event(s)", text, false)
            .into())
    }

    fn fish(&self, name: &str) -> HandlerResult {
        let (key, fish) = self
            .catalog
            .fish
            .get_ci(name)
            .ok_or_else(|| CommandError::NotFound(format!("I couldn't find fish named '{}'.", name.trim())))?;
        Ok(Embed::new(key, colors::FISH)
            .thumbnail(fish.image.as_deref())
            .field("Location", fish.location.as_deref().unwrap_or_default(), true)
            .field("Season", fish.season.as_deref().unwrap_or_default(), true)
            .field("Time", fish.time.as_deref().unwrap_or_default(), true)
            .field("Weather", fish.weather.as_deref().unwrap_or_default(), true)
            .field("Base Sell Price", fish.base_sell_price.as_deref().unwrap_or_default(), true)
            .field("Bundle", yes_no(fish.bundle), true)
            .into())
    }

    fn crop(&self, name: &str) -> HandlerResult {
        let (key, crop) = self
            .catalog
            .crops
            .get_ci(name)
            .ok_or_else(|| CommandError::NotFound(format!("I couldn't find crop named '{}'.", name.trim())))?;
        Ok(Embed::new(key, colors::CROP)
            .thumbnail(crop.image.as_deref())
            .field("Season", crop.season.as_deref().unwrap_or_default(), true)
            .field("Type", crop.crop_type.as_deref().unwrap_or_default(), true)
            .field("Growth Time", crop.growth_time.as_deref().unwrap_or_default(), true)
            .field("Max Harvests", crop.max_harvests.as_deref().unwrap_or_default(), true)
            .field("Seed Price", crop.seed_price.as_deref().unwrap_or_default(), true)
            .field("Base Sell Price", crop.base_sell_price.as_deref().unwrap_or_default(), true)
            .field("Bundle", yes_no(crop.bundle), true)
            .into())
    }

    fn upgrade(&self, name: &str) -> HandlerResult {
        let wanted = validation::title_case(name);
        let (key, upgrade) = self
            .catalog
            .upgrades
            .get_ci(&wanted)
            .ok_or_else(|| CommandError::NotFound(format!("I couldn't find an upgrade named '{}'.", wanted)))?;
        Ok(Embed::new(format!("Upgrade: {}", key), colors::UPGRADE)
            .thumbnail(upgrade.image.as_deref())
            .field("Cost", bullet_list(&upgrade.cost), false)
            .into())
    }

    async fn season(&self, guild_id: u64, season: &str, args: &[String]) -> HandlerResult {
        let parsed = validation::parse_season(season)?;
        let (name, guide) = self
            .catalog
            .seasons
            .get_ci(parsed.name())
            .ok_or_else(|| ArgumentError::UnknownSeason(season.to_string()))?;
        let sub = args.first().map(String::as_str);
        let want_bundle = if args.len() > 1 {
            args[1..].iter().any(|a| a == "bundle")
        } else {
            sub == Some("bundle")
        };
        let categories = query::season_category_lists(&self.catalog, name);

        if let Some(category) = sub.and_then(SeasonCategory::parse) {
            let mut items = categories.get(category).to_vec();
            if want_bundle {
                let remaining = self.remaining_items(guild_id).await?;
                items = query::filter_to_remaining(&items, &remaining);
            }
            let mut title = format!("{} {}", name, category.label());
            if want_bundle {
                title.push_str(" (Needed for Incomplete Bundles)");
            }
            return Ok(Embed::new(title, colors::SEASON)
                .field(category.label(), items.join(", "), false)
                .into());
        }

        if sub == Some("bundle") || want_bundle {
            let remaining = self.remaining_items(guild_id).await?;
            let filtered = categories.filtered(&remaining);
            let embed = SeasonCategory::ALL.iter().fold(
                Embed::new(format!("{} – Incomplete Bundle Targets", name), colors::SEASON_BUNDLE),
                |embed, c| embed.field(c.label(), filtered.get(*c).join(", "), false),
            );
            return Ok(embed.into());
        }

        let single: Vec<&str> = guide.crops.single_harvest.keys().collect();
        let multi: Vec<&str> = guide.crops.multi_harvest.keys().collect();
        let mut crop_lines = Vec::new();
        if !single.is_empty() {
            crop_lines.push(format!("Single: {}", single.join(", ")));
        }
        if !multi.is_empty() {
            crop_lines.push(format!("Multi: {}", multi.join(", ")));
        }
        Ok(Embed::new(format!("Season: {}", name), colors::SEASON)
            .field("Crops", crop_lines.join("\n"), false)
            .field("Foraging", categories.foraging.join(", "), false)
            .field("Fish", categories.fish.join(", "), false)
            .field("Trees", categories.trees.join(", "), false)
            .into())
    }

    async fn remaining_items(&self, guild_id: u64) -> Result<std::collections::HashSet<String>, ProgressError> {
        let guild = self.store.get_or_init_guild(guild_id).await?;
        Ok(query::remaining_items(&self.catalog, &guild))
    }

    fn help_text(&self) -> String {
        let p = self.prefix();
        let lines = [
            format!("**{}** commands:", self.bot.name),
            format!("`{p}gift <villager>` loved and liked gifts"),
            format!("`{p}char <villager>` villager profile"),
            format!("`{p}build <building>` construction materials"),
            format!("`{p}events <season> [day]` festivals and birthdays"),
            format!("`{p}fish <fish>` / `{p}crop <crop>` where, when and how much"),
            format!("`{p}season <season> [crops|fish|foraging|trees] [bundle]` what the season offers"),
            format!("`{p}upgrade <tool>` upgrade cost"),
            format!("`{p}bundle [room|bundle|item]` community center progress"),
            format!("`{p}bundle find <item>` bundles that take an item"),
            format!("`{p}bundle check \"Bundle Name\" Item` / `{p}bundle uncheck ...` record an item"),
            format!("`{p}bundle incomplete` bundles still open"),
            format!("`{p}bundle reset all` start over for this server"),
        ];
        lines.join("\n")
    }

    async fn bundle(&self, guild_id: u64, cmd: &BundleCommand) -> HandlerResult {
        match cmd {
            BundleCommand::Query(q) => {
                let guild = self.store.get_or_init_guild(guild_id).await?;
                let q = q.trim();
                if q.is_empty() {
                    return Ok(self.overview(&guild));
                }
                if let Some(reply) = self.room_or_bundle(&guild, q) {
                    return Ok(reply);
                }
                if let Some(reply) = self.item_lookup(q) {
                    return Ok(reply);
                }
                let p = self.prefix();
                Err(CommandError::NotFound(format!(
                    "No matching room, bundle, or item found. Try `{p}bundle`, `{p}bundle <room>`, `{p}bundle <bundle name>`, or `{p}bundle find <item>`."
                )))
            }
            BundleCommand::Find(item) => {
                self.store.get_or_init_guild(guild_id).await?;
                self.item_lookup(item.trim())
                    .ok_or_else(|| CommandError::NotFound(format!("No bundles use '{}'.", item.trim())))
            }
            BundleCommand::Status(q) => {
                let guild = self.store.get_or_init_guild(guild_id).await?;
                let q = q.trim();
                if q.is_empty() {
                    return Ok(self.overview(&guild));
                }
                self.room_or_bundle(&guild, q)
                    .ok_or_else(|| CommandError::NotFound("Not found. Use a room or bundle name.".to_string()))
            }
            BundleCommand::Check { bundle, item } => self.set_item(guild_id, bundle, item, true).await,
            BundleCommand::Uncheck { bundle, item } => self.set_item(guild_id, bundle, item, false).await,
            BundleCommand::Reset { scope } => {
                if !scope.trim().eq_ignore_ascii_case("all") {
                    return Err(ArgumentError::UnsupportedResetScope {
                        prefix: self.prefix(),
                        scope: scope.clone(),
                    }
                    .into());
                }
                self.store.reset_guild(guild_id).await?;
                Ok(Reply::text("All bundle progress reset for this server."))
            }
            BundleCommand::Incomplete => {
                let guild = self.store.get_or_init_guild(guild_id).await?;
                let pending = query::incomplete_bundles(&self.catalog, &guild);
                if pending.is_empty() {
                    return Ok(Reply::text("All bundles are complete. 🎉"));
                }
                let embed = pending.iter().fold(
                    Embed::new("Incomplete Bundles", colors::INCOMPLETE),
                    |embed, (room, bundles)| {
                        let lines: Vec<String> = bundles
                            .iter()
                            .map(|b| format!("- {}: ⬜ {}/{}", b.bundle, b.checked, b.amount))
                            .collect();
                        embed.field(room.as_str(), lines.join("\n"), false)
                    },
                );
                Ok(embed.into())
            }
        }
    }

    async fn set_item(&self, guild_id: u64, bundle: &str, item: &str, value: bool) -> HandlerResult {
        let location = self.store.set_item(guild_id, bundle, item, value).await?;
        let guild = self.store.get_or_init_guild(guild_id).await?;
        Ok(self.bundle_status(&guild, &location))
    }

    /// Room first, then bundle; `None` when `q` names neither.
    fn room_or_bundle(&self, guild: &GuildProgress, q: &str) -> Option<Reply> {
        if let Some(room) = self.catalog.community.canonical_key(q) {
            return Some(self.room_status(guild, room));
        }
        self.index
            .locate_bundle(q)
            .map(|location| self.bundle_status(guild, location))
    }

    fn item_lookup(&self, q: &str) -> Option<Reply> {
        let matches = self.index.bundles_for_item(q);
        if matches.is_empty() {
            return None;
        }
        let mut lines = vec![format!("**{}** appears in:", q)];
        lines.extend(matches.iter().map(|l| format!("- {} → {}", l.room, l.bundle)));
        Some(Reply::text(lines.join("\n")))
    }

    fn overview(&self, guild: &GuildProgress) -> Reply {
        self.catalog
            .community
            .keys()
            .fold(Embed::new("Community Center Progress", colors::BUNDLE), |embed, room| {
                let (completed, total) = query::completion_counts(&self.catalog, guild, room);
                embed.field(room, format!("{}/{} bundles completed", completed, total), false)
            })
            .into()
    }

    fn room_status(&self, guild: &GuildProgress, room: &str) -> Reply {
        let mut embed = Embed::new(format!("{} – Bundles", room), colors::BUNDLE);
        if let Some(room_def) = self.catalog.community.get(room) {
            for (name, bundle) in room_def.bundles.iter() {
                let status = if query::is_bundle_complete(guild, room, name, bundle) {
                    "✅ Completed".to_string()
                } else {
                    format!("⬜ {}/{}", query::bundle_checked_count(guild, room, name), bundle.amount)
                };
                embed = embed.field(name, status, false);
            }
        }
        embed.into()
    }

    fn bundle_status(&self, guild: &GuildProgress, location: &BundleLocation) -> Reply {
        let Some(bundle) = self.catalog.bundle(&location.room, &location.bundle) else {
            return Reply::text("Not found. Use a room or bundle name.");
        };
        render_bundle_status(guild, location, bundle)
    }
}

fn render_bundle_status(guild: &GuildProgress, location: &BundleLocation, bundle: &Bundle) -> Reply {
    let progress = query::bundle_progress(guild, &location.room, &location.bundle);
    let mut checked = 0usize;
    let lines: Vec<String> = bundle
        .item_names()
        .map(|item| {
            let done = progress.map(|p| p.is_checked(item)).unwrap_or(false);
            if done {
                checked += 1;
            }
            format!("{} {}", if done { "✅" } else { "⬜" }, item)
        })
        .collect();
    let status = match bundle.reward.as_deref() {
        Some(reward) => format!("Progress: {}/{} | Reward: {}", checked, bundle.amount, reward),
        None => format!("Progress: {}/{}", checked, bundle.amount),
    };
    Embed::new(format!("{} ({})", location.bundle, location.room), colors::BUNDLE)
        .thumbnail(bundle.image.as_deref())
        .field("Items", lines.join("\n"), false)
        .field("Status", status, false)
        .into()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
