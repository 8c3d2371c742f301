//! Binary entrypoint for the citychain CLI.
//!
//! Commands:
//! - `play [--user <id>]` - play in the terminal; every stdin line is one chat message
//! - `init` - write a starter `config.toml`
//! - `resolve <text>` - show how a typed city resolves against the dictionary
//! - `scores` - print the persisted high-score table
//! - `status` - dictionary size, store locations and counters
//!
//! See the library crate docs for module-level details: `citychain::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use citychain::chat::GameServer;
use citychain::config::Config;
use citychain::game::fuzzy::FuzzyMatcher;
use citychain::game::normalize::normalize;
use citychain::game::CityDictionary;
use citychain::metrics;
use citychain::storage::{HighScoreStore, JsonHighScoreStore};
use citychain::trivia::HttpTrivia;

#[derive(Parser)]
#[command(name = "citychain")]
#[command(about = "The city word-chain game as a chat bot")]
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
    /// Play in the terminal
    Play {
        /// Player id used for sessions and high scores
        #[arg(short, long, default_value = "console")]
        user: String,
    },
    /// Write a default configuration file
    Init,
    /// Show how a typed city is matched against the dictionary
    Resolve {
        /// Text as a player would type it
        text: String,
    },
    /// Print the high-score table
    Scores,
    /// Show dictionary and store status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Init => None,
        _ => Some(load_config(&cli.config).await?),
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Init => {
            if Path::new(&cli.config).exists() {
                return Err(anyhow!("{} already exists; not overwriting", cli.config));
            }
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Play { user } => {
            let config = config.unwrap_or_default();
            info!("Starting citychain v{}", env!("CARGO_PKG_VERSION"));
            let server = GameServer::from_config(&config);
            if server.dictionary().is_empty() {
                warn!("City list is empty; moves will be refused until it is available");
            }
            println!("{}", server.handle(&user, "/help").await);
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                tokio::select! {
                    line = lines.next_line() => {
                        let Some(line) = line? else { break };
                        let reply = server.handle(&user, &line).await;
                        println!("{}", reply);
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Interrupted, leaving");
                        break;
                    }
                }
            }
            let snap = metrics::snapshot();
            info!(
                "Session summary: games started={} finished={} moves accepted={} rejected={}",
                snap.games_started,
                snap.games_finished(),
                snap.moves_accepted,
                snap.moves_rejected
            );
        }
        Commands::Resolve { text } => {
            let config = config.unwrap_or_default();
            let dict = load_dictionary(&config)?;
            let key = normalize(&text);
            println!("input: {}", text);
            println!("key:   {}", key);
            match FuzzyMatcher::new(&dict).resolve(&text, config.game.fuzzy_threshold) {
                Some(found) => {
                    println!(
                        "match: {} (score {}{})",
                        found.city.display,
                        found.score,
                        if found.corrected { ", corrected" } else { "" }
                    );
                    if dict.is_priority(&found.city.key) {
                        println!("       priority city");
                    }
                }
                None => println!(
                    "match: none at threshold {}",
                    config.game.fuzzy_threshold
                ),
            }
        }
        Commands::Scores => {
            let config = config.unwrap_or_default();
            let store = JsonHighScoreStore::new(&config.storage.data_dir);
            let table = store.table()?;
            if table.is_empty() {
                println!("No high scores yet ({}).", store.path().display());
            }
            for (rank, (user, entry)) in table.iter().enumerate() {
                println!(
                    "{:>3}. {:<24} {:>5}  {}",
                    rank + 1,
                    user,
                    entry.best,
                    entry.achieved_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Commands::Status => {
            let config = config.unwrap_or_default();
            let dict = CityDictionary::load_or_empty(
                Path::new(&config.game.cities_file),
                config.game.priority_file.as_deref().map(Path::new),
            );
            let scores = JsonHighScoreStore::new(&config.storage.data_dir);
            let trivia = HttpTrivia::new(config.trivia.clone());
            println!("citychain v{}", env!("CARGO_PKG_VERSION"));
            println!("Cities:          {} ({})", dict.len(), config.game.cities_file);
            println!("Priority cities: {}", dict.priority_len());
            println!("Fuzzy threshold: {}", config.game.fuzzy_threshold);
            println!("Sessions:        {}", config.storage.sessions_path().display());
            println!("High scores:     {}", scores.path().display());
            println!(
                "Trivia:          {}",
                if trivia.is_configured() {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            let snap = metrics::snapshot();
            println!(
                "Counters:        started={} won={} surrendered={} storage_failures={}",
                snap.games_started, snap.games_won, snap.games_surrendered, snap.storage_failures
            );
        }
    }

    Ok(())
}

/// A missing config file means defaults; a broken one is an error.
async fn load_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Config::load(path).await
    } else {
        Ok(Config::default())
    }
}

fn load_dictionary(config: &Config) -> Result<CityDictionary> {
    CityDictionary::load(
        Path::new(&config.game.cities_file),
        config.game.priority_file.as_deref().map(Path::new),
    )
    .map_err(|e| anyhow!("{}", e))
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let log_file = config.as_ref().and_then(|c| c.logging.file.clone());
    if let Some(file) = log_file {
        if let Ok(f) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file)
        {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Console echo only when attached to a terminal
            let is_tty = atty::is(atty::Stream::Stderr);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
            let _ = builder.try_init();
            return;
        }
    }
    builder.format(|fmt, record| {
        writeln!(
            fmt,
            "{} [{}] {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            record.level(),
            record.args()
        )
    });
    let _ = builder.try_init();
}
