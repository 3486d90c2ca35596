//! Binary entrypoint for the Habitquest CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml` and the data directory
//! - `create <id>` / `show <id>` / `list` - manage stored characters
//! - `gain-xp <id> <amount>` - award experience for a completed habit
//! - `heal <id> [--points N]` / `damage <id> [--points N]` - adjust HP
//! - `login <id>` - evaluate the daily streak at the current time
//! - `import <file>` - load characters from a JSON seed file
//!
//! See the library crate docs for module‑level details: `habitquest::`.
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{debug, info, warn};

use habitquest::config::Config;
use habitquest::metrics;
use habitquest::progression::{
    self, format_character_sheet, load_characters_from_json, CharacterRecord, CharacterStore,
    ProgressionError, StreakOutcome,
};

#[derive(Parser)]
#[command(name = "habitquest")]
#[command(about = "Character progression engine for habit tracking")]
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
    /// Write a default configuration file
    Init,
    /// Create a character with starting stats
    Create { id: String },
    /// Print a character sheet
    Show { id: String },
    /// List stored character ids
    List,
    /// Award experience for a completed habit
    GainXp { id: String, amount: u32 },
    /// Restore HP (capped at max HP)
    Heal {
        id: String,
        #[arg(short, long)]
        points: Option<u32>,
    },
    /// Remove HP (floored at zero)
    Damage {
        id: String,
        #[arg(short, long)]
        points: Option<u32>,
    },
    /// Record a login and update the daily streak
    Login { id: String },
    /// Import characters from a JSON array of seeds
    Import {
        path: String,
        /// Overwrite characters that already exist
        #[arg(long)]
        replace: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        init_logging(&None, cli.verbose);
        info!("Initializing new Habitquest configuration");
        Config::create_default(&cli.config).await?;
        let cfg = Config::load(&cli.config).await?;
        tokio::fs::create_dir_all(&cfg.storage.data_dir).await?;
        info!("Configuration file created at {}", cli.config);
        return Ok(());
    }

    let config = Config::load(&cli.config).await?;
    init_logging(&Some(config.clone()), cli.verbose);
    let db_path = config.storage.character_db_path();
    let store = CharacterStore::open(&db_path)
        .with_context(|| format!("Failed to open character store at {}", db_path))?;
    let engine = &config.engine;

    match cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Create { id } => {
            let record = CharacterRecord::new(&id, Utc::now());
            store.create_character(&record)?;
            info!("Created character {}", id);
            println!("{}", format_character_sheet(&record));
        }
        Commands::Show { id } => {
            let record = store.get_character(&id)?;
            println!("{}", format_character_sheet(&record));
        }
        Commands::List => {
            for id in store.list_character_ids()? {
                println!("{}", id);
            }
        }
        Commands::GainXp { id, amount } => {
            let committed = progression::award_experience(&store, &id, amount)?;
            let report = committed.outcome;
            if report.leveled_up() {
                println!(
                    "+{} XP. Level up! {} -> {}",
                    amount, report.previous_level, report.new_level
                );
            } else {
                println!(
                    "+{} XP ({}/{})",
                    amount, committed.record.current_xp, committed.record.xp_to_next_level
                );
            }
        }
        Commands::Heal { id, points } => {
            let points = points.unwrap_or(engine.default_heal_points);
            let change = progression::recover_hp(&store, &id, points)?.outcome;
            println!("HP {} -> {} / {}", change.before, change.after, change.max_hp);
        }
        Commands::Damage { id, points } => {
            let points = points.unwrap_or(engine.default_damage_points);
            let committed = progression::lose_hp(&store, &id, points)?;
            let change = committed.outcome;
            println!("HP {} -> {} / {}", change.before, change.after, change.max_hp);
            if committed.record.is_knocked_out() {
                println!("{} is knocked out.", id);
            }
        }
        Commands::Login { id } => {
            let now = Utc::now().with_timezone(&engine.calendar_offset()?);
            let committed =
                progression::check_daily_streak(&store, &id, &now, engine.future_login_policy)?;
            let message = match committed.outcome {
                StreakOutcome::Continued { streak } => format!("Streak continued: {} days", streak),
                StreakOutcome::Broken { previous } => {
                    format!("Streak of {} broken. Starting over at 1", previous)
                }
                StreakOutcome::SameDay { streak } => {
                    format!("Already checked in today. Streak {}", streak)
                }
                StreakOutcome::FutureLastLogin { streak } => {
                    format!("Clock mismatch; streak left at {}", streak)
                }
            };
            println!("{} (login #{})", message, committed.record.total_login_count);
        }
        Commands::Import { path, replace } => {
            let records = load_characters_from_json(&path, Utc::now())?;
            let mut imported = 0usize;
            for record in records {
                let result = if replace {
                    store.put_character(&record)
                } else {
                    store.create_character(&record)
                };
                match result {
                    Ok(()) => imported += 1,
                    Err(ProgressionError::AlreadyExists(what)) => {
                        warn!("Skipping {} (use --replace to overwrite)", what);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            info!("Imported {} characters from {}", imported, path);
            println!("Imported {} characters", imported);
        }
    }

    debug!("progression counters: {:?}", metrics::snapshot());
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Echo to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
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
    } else {
        builder.format(|fmt, record| {
            let ts = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
