//! Prefix command parser.
//!
//! Text is only treated as a command when it starts with the configured prefix (default
//! `!`). Arguments are whitespace separated, and double quotes (straight or curly) group
//! words into one argument, so `!bundle check "Artisan Bundle" Cherry` yields the bundle
//! name `Artisan Bundle` and the item `Cherry`. Command names match case-insensitively.
//!
//! The parser does no catalog lookups. Missing required arguments produce
//! [`ParsedCommand::Usage`], and unknown command names produce [`ParsedCommand::Unknown`].
use log::trace;

/// One recognised command with its raw arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Gift(String),
    Char(String),
    Build(String),
    Events { season: String, day: Option<String> },
    Fish(String),
    /// Season name plus the lowercased trailing arguments (`crops`, `bundle`, ...).
    Season { season: String, args: Vec<String> },
    Crop(String),
    Upgrade(String),
    Junimo,
    JunimoHelp,
    Bundle(BundleCommand),
}

impl BotCommand {
    /// Qualified command name used for metrics and logs.
    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Gift(_) => "gift",
            BotCommand::Char(_) => "char",
            BotCommand::Build(_) => "build",
            BotCommand::Events { .. } => "events",
            BotCommand::Fish(_) => "fish",
            BotCommand::Season { .. } => "season",
            BotCommand::Crop(_) => "crop",
            BotCommand::Upgrade(_) => "upgrade",
            BotCommand::Junimo => "junimo",
            BotCommand::JunimoHelp => "junimo help",
            BotCommand::Bundle(b) => b.name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleCommand {
    /// `bundle [query]`: overview when empty, else room, bundle, then item lookup.
    Query(String),
    Find(String),
    /// `bundle status [room|bundle]`; empty shows the overview.
    Status(String),
    Check { bundle: String, item: String },
    Uncheck { bundle: String, item: String },
    Reset { scope: String },
    Incomplete,
}

impl BundleCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BundleCommand::Query(_) => "bundle",
            BundleCommand::Find(_) => "bundle find",
            BundleCommand::Status(_) => "bundle status",
            BundleCommand::Check { .. } => "bundle check",
            BundleCommand::Uncheck { .. } => "bundle uncheck",
            BundleCommand::Reset { .. } => "bundle reset",
            BundleCommand::Incomplete => "bundle incomplete",
        }
    }
}

/// Commands whose required arguments can be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Gift,
    Char,
    Build,
    Events,
    Fish,
    Season,
    Crop,
    Upgrade,
    BundleFind,
    BundleCheck,
    BundleUncheck,
}

impl Usage {
    /// `(usage, example)` with `{p}` standing for the prefix.
    fn template(self) -> (&'static str, &'static str) {
        match self {
            Usage::Gift => ("{p}gift <villager>", "{p}gift Leah"),
            Usage::Char => ("{p}char <villager>", "{p}char Leah"),
            Usage::Build => ("{p}build <building>", "{p}build Big Barn"),
            Usage::Events => (
                "{p}events <spring|summer|fall|winter> [day]",
                "{p}events winter 3",
            ),
            Usage::Fish => ("{p}fish <fish name>", "{p}fish Midnight Carp"),
            Usage::Season => (
                "{p}season <spring|summer|fall|winter> [crops|fish|foraging|trees] [bundle]",
                "{p}season spring crops bundle",
            ),
            Usage::Crop => ("{p}crop <crop name>", "{p}crop Blueberry"),
            Usage::Upgrade => ("{p}upgrade <tool>", "{p}upgrade Iridium Pickaxe"),
            Usage::BundleFind => ("{p}bundle find <item>", "{p}bundle find Cherry"),
            Usage::BundleCheck => (
                "{p}bundle check \"Bundle Name\" Item Name",
                "{p}bundle check \"Artisan Bundle\" Cherry",
            ),
            Usage::BundleUncheck => (
                "{p}bundle uncheck \"Bundle Name\" Item Name",
                "{p}bundle uncheck \"Artisan Bundle\" Cherry",
            ),
        }
    }

    /// The message shown when the command is missing arguments.
    pub fn text(self, prefix: char) -> String {
        let p = prefix.to_string();
        let (usage, example) = self.template();
        format!(
            "I didn't understand your command, did you mean this?\nUsage: `{}`\nExample: `{}`",
            usage.replace("{p}", &p),
            example.replace("{p}", &p)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// Ordinary chat; the bot stays quiet.
    NotCommand,
    Command(BotCommand),
    Usage(Usage),
    /// Prefixed text naming no known command.
    Unknown(String),
}

fn closing_quote(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '“' => Some('”'),
        '„' => Some('“'),
        '«' => Some('»'),
        _ => None,
    }
}

/// Strip one pair of surrounding quotes, if the whole string is quoted.
fn unquote(s: &str) -> &str {
    let mut chars = s.chars();
    if let (Some(first), Some(last)) = (chars.next(), s.chars().last()) {
        if s.chars().count() >= 2 && closing_quote(first) == Some(last) {
            return &s[first.len_utf8()..s.len() - last.len_utf8()];
        }
    }
    s
}

/// Quote-aware cursor over the argument part of a command.
#[derive(Debug, Clone, Copy)]
pub struct ArgCursor<'a> {
    rest: &'a str,
}

impl<'a> ArgCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    /// Next argument. A quoted argument runs to its closing quote (or the end of input when
    /// unterminated); anything else runs to the next whitespace.
    pub fn next_arg(&mut self) -> Option<String> {
        let s = self.rest.trim_start();
        let first = match s.chars().next() {
            Some(c) => c,
            None => {
                self.rest = s;
                return None;
            }
        };
        if let Some(close) = closing_quote(first) {
            let body = &s[first.len_utf8()..];
            return match body.find(close) {
                Some(end) => {
                    self.rest = &body[end + close.len_utf8()..];
                    Some(body[..end].to_string())
                }
                None => {
                    self.rest = "";
                    Some(body.to_string())
                }
            };
        }
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        self.rest = &s[end..];
        Some(s[..end].to_string())
    }

    /// Everything not yet consumed, trimmed and unquoted. `None` when empty.
    pub fn rest(&mut self) -> Option<String> {
        let rest = unquote(self.rest.trim()).trim().to_string();
        self.rest = "";
        (!rest.is_empty()).then_some(rest)
    }

    /// Remaining arguments, each unquoted.
    pub fn remaining(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(arg) = self.next_arg() {
            out.push(arg);
        }
        out
    }

    /// Remaining arguments joined by single spaces. `None` when there are none.
    pub fn joined(&mut self) -> Option<String> {
        let joined = self.remaining().join(" ").trim().to_string();
        (!joined.is_empty()).then_some(joined)
    }
}

/// Command parser bound to one prefix character.
#[derive(Debug, Clone)]
pub struct CommandParser {
    prefix: char,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new('!')
    }
}

impl CommandParser {
    pub fn new(prefix: char) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    pub fn parse(&self, raw: &str) -> ParsedCommand {
        let trimmed = raw.trim();
        let Some(body) = trimmed.strip_prefix(self.prefix) else {
            return ParsedCommand::NotCommand;
        };
        let mut args = ArgCursor::new(body);
        let Some(name) = args.next_arg() else {
            return ParsedCommand::NotCommand;
        };
        let parsed = match name.to_lowercase().as_str() {
            "gift" => required(args.next_arg(), Usage::Gift, BotCommand::Gift),
            "char" => required(args.next_arg(), Usage::Char, BotCommand::Char),
            "build" => required(args.joined(), Usage::Build, BotCommand::Build),
            "fish" => required(args.joined(), Usage::Fish, BotCommand::Fish),
            "crop" => required(args.joined(), Usage::Crop, BotCommand::Crop),
            "upgrade" => required(args.joined(), Usage::Upgrade, BotCommand::Upgrade),
            "events" => match args.next_arg() {
                Some(season) => ParsedCommand::Command(BotCommand::Events {
                    season,
                    day: args.next_arg(),
                }),
                None => ParsedCommand::Usage(Usage::Events),
            },
            "season" => match args.next_arg() {
                Some(season) => ParsedCommand::Command(BotCommand::Season {
                    season,
                    args: args.remaining().into_iter().map(|a| a.to_lowercase()).collect(),
                }),
                None => ParsedCommand::Usage(Usage::Season),
            },
            "junimo" => match args.next_arg() {
                Some(sub) if sub.eq_ignore_ascii_case("help") => ParsedCommand::Command(BotCommand::JunimoHelp),
                _ => ParsedCommand::Command(BotCommand::Junimo),
            },
            "bundle" => parse_bundle(args),
            _ => ParsedCommand::Unknown(name),
        };
        trace!("Parsed {:?} from '{}'", parsed, crate::logutil::escape_log(raw));
        parsed
    }
}

fn required(arg: Option<String>, usage: Usage, make: fn(String) -> BotCommand) -> ParsedCommand {
    match arg {
        Some(a) => ParsedCommand::Command(make(a)),
        None => ParsedCommand::Usage(usage),
    }
}

fn parse_bundle(args: ArgCursor<'_>) -> ParsedCommand {
    let mut peek = args;
    let sub = peek.next_arg().map(|s| s.to_lowercase());
    let command = match sub.as_deref() {
        Some("find") => match peek.joined() {
            Some(item) => BundleCommand::Find(item),
            None => return ParsedCommand::Usage(Usage::BundleFind),
        },
        Some("status") => BundleCommand::Status(peek.joined().unwrap_or_default()),
        Some(verb @ ("check" | "uncheck")) => {
            let checking = verb == "check";
            let usage = if checking { Usage::BundleCheck } else { Usage::BundleUncheck };
            let Some(bundle) = peek.next_arg() else {
                return ParsedCommand::Usage(usage);
            };
            let Some(item) = peek.rest() else {
                return ParsedCommand::Usage(usage);
            };
            if checking {
                BundleCommand::Check { bundle, item }
            } else {
                BundleCommand::Uncheck { bundle, item }
            }
        }
        Some("reset") => BundleCommand::Reset {
            scope: peek.next_arg().unwrap_or_else(|| "all".to_string()),
        },
        Some("incomplete") => BundleCommand::Incomplete,
        _ => {
            let mut all = args;
            BundleCommand::Query(all.joined().unwrap_or_default())
        }
    };
    ParsedCommand::Command(BotCommand::Bundle(command))
}
