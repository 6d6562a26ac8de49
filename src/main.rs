//! Binary entrypoint for the StardewSavant CLI.
//!
//! Commands:
//! - `start [--guild <id>]` - run the bot on the console transport (one command per line,
//!   `@<id> <command>` answers for another guild)
//! - `ask --guild <id> <command...>` - run a single command and print the reply
//! - `init` - write a starter `config.toml` and create the state directory
//! - `status` - print catalog sizes, tracked guilds and counters
//!
//! See the library crate docs for module-level details: `stardew_savant::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use stardew_savant::bot::{split_guild_marker, BotServer, CommandProcessor, IncomingMessage};
use stardew_savant::config::Config;
use stardew_savant::metrics;

#[derive(Parser)]
#[command(name = "stardew-savant")]
#[command(about = "A Stardew Valley helper bot with shared community bundle tracking")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot, reading commands from stdin
    Start {
        /// Guild whose progress console commands use
        #[arg(short, long, default_value_t = 1)]
        guild: u64,
    },
    /// Run one command and print the reply
    Ask {
        #[arg(short, long, default_value_t = 1)]
        guild: u64,
        /// The command, with or without the prefix (e.g. `bundle check "Artisan Bundle" Cherry`)
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        command: Vec<String>,
    },
    /// Write a default configuration file
    Init,
    /// Show catalog and progress statistics
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { guild } => {
            let config = Config::load(&cli.config).await?;
            init_logging(Some(&config), cli.verbose);
            info!("Starting StardewSavant v{}", env!("CARGO_PKG_VERSION"));
            run_console(config, guild).await?;
        }
        Commands::Ask { guild, command } => {
            let config = Config::load(&cli.config).await?;
            init_logging(Some(&config), cli.verbose);
            let processor = CommandProcessor::from_config(&config)?;
            let mut line = command.join(" ");
            if !line.trim_start().starts_with(processor.prefix()) {
                line.insert(0, processor.prefix());
            }
            match processor.process(guild, &line).await {
                Some(reply) => println!("{}", reply.to_plain_text()),
                None => warn!("'{}' is not a command", line),
            }
        }
        Commands::Init => {
            init_logging(None, cli.verbose);
            info!("Initializing new StardewSavant configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            let cfg = Config::default();
            tokio::fs::create_dir_all(&cfg.storage.data_dir).await?;
            info!(
                "State directory {} ready; catalog documents are read from {}",
                cfg.storage.data_dir, cfg.catalog.data_dir
            );
        }
        Commands::Status => {
            let config = Config::load(&cli.config).await?;
            init_logging(Some(&config), cli.verbose);
            let processor = CommandProcessor::from_config(&config)?;
            let catalog = processor.catalog();
            println!("StardewSavant v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "Catalog: {} villagers, {} buildings, {} fish, {} crops, {} upgrades",
                catalog.townspeople.len(),
                catalog.buildings.len(),
                catalog.fish.len(),
                catalog.crops.len(),
                catalog.upgrades.len()
            );
            println!(
                "Bundles: {} rooms, {} bundles",
                catalog.community.len(),
                processor.index().bundle_count()
            );
            println!(
                "Progress: {} guild(s) tracked in {}",
                processor.store().guild_count().await,
                processor.store().path().display()
            );
            println!("Counters: {}", metrics::snapshot());
        }
    }

    Ok(())
}

/// Feed stdin lines to the server and print replies until stdin closes or Ctrl-C.
async fn run_console(config: Config, default_guild: u64) -> Result<()> {
    let processor = Arc::new(CommandProcessor::from_config(&config)?);
    let mut server = BotServer::with_processor(config.bot.name.clone(), processor);
    let Some(tx) = server.sender() else {
        anyhow::bail!("server input already closed");
    };
    let Some(mut replies) = server.take_replies() else {
        anyhow::bail!("reply stream already taken");
    };

    let printer = tokio::spawn(async move {
        while let Some(out) = replies.recv().await {
            println!("[guild {}]\n{}\n", out.guild_id, out.reply.to_plain_text());
        }
    });

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let (guild_id, text) = split_guild_marker(default_guild, &line);
                    if text.trim().is_empty() {
                        continue;
                    }
                    let msg = IncomingMessage {
                        guild_id,
                        text: text.to_string(),
                    };
                    if tx.send(msg).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("stdin read failed: {}", e);
                    break;
                }
            }
        }
    });

    server.run().await?;
    drop(server);
    let _ = printer.await;
    info!("Session counters: {}", metrics::snapshot());
    Ok(())
}

fn init_logging(config: Option<&Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // -v/-vv override the configured level
    let level = match verbosity {
        0 => config
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);

    let log_file = config
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| std::fs::OpenOptions::new().create(true).append(true).open(path).ok());

    match log_file {
        Some(f) => {
            let file = std::sync::Mutex::new(f);
            // Interactive sessions also see the log on the console
            let is_tty = atty::is(atty::Stream::Stderr);
            builder.format(move |fmt, record| {
                let line = format!(
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                );
                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                writeln!(
                    fmt,
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                )
            });
        }
    }
    let _ = builder.try_init();
}
