// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consulta - a chat-driven lecturer consultation booking assistant.
//!
//! This is the binary entry point: an operator REPL over the booking engine
//! plus a few administration commands.

mod chat;
mod profile;
mod slots;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use consulta_config::model::ConsultaConfig;
use consulta_core::ConsultaError;
use consulta_core::StorageAdapter;
use consulta_core::traits::ProviderAdapter;
use consulta_core::types::parse_hhmm;
use consulta_storage::SqliteStorage;
use tracing::warn;

/// Consulta - book a consultation with a lecturer by chatting.
#[derive(Parser, Debug)]
#[command(name = "consulta", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with the booking assistant in an interactive REPL.
    Chat {
        /// Conversation context tag; selects the assistant persona.
        #[arg(long, default_value = "consultant")]
        context: String,
        /// Book as this user id. Omit to chat anonymously.
        #[arg(long)]
        user: Option<String>,
        /// Email address for booking confirmations.
        #[arg(long)]
        user_email: Option<String>,
    },
    /// Print the free slots of every lecturer on a date.
    Slots {
        /// Date as YYYY-MM-DD. Defaults to next Monday.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Manage lecturer availability profiles.
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    /// Manage Consulta configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Add a weekly availability window.
    Add {
        #[arg(long)]
        lecturer: String,
        /// Weekday name (monday, thứ 2, ...) or index 0 = Monday .. 6 = Sunday.
        #[arg(long, value_parser = profile::parse_weekday)]
        day: u8,
        /// Window start, HH:MM.
        #[arg(long, value_parser = parse_time)]
        start: NaiveTime,
        /// Window end, HH:MM.
        #[arg(long, value_parser = parse_time)]
        end: NaiveTime,
        /// Slot length in minutes.
        #[arg(long)]
        duration: Option<u32>,
        /// Bookings accepted per day.
        #[arg(long, default_value_t = consulta_core::types::DEFAULT_MAX_SLOTS_PER_DAY)]
        max_slots: u32,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List active profiles.
    List,
    /// Stop offering a date on a profile.
    Block {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Offer a previously blocked date again.
    Unblock {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Deactivate a profile.
    Disable {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load the configuration and report every problem found.
    Validate,
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    parse_hhmm(s).ok_or_else(|| format!("expected HH:MM, got `{s}`"))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => consulta_config::load_and_validate_path(path),
        None => consulta_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            consulta_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Chat {
            context,
            user,
            user_email,
        }) => chat::run_chat(config, context, chat::identity(user, user_email)).await,
        Some(Commands::Slots { date }) => slots::run_slots(config, date).await,
        Some(Commands::Profile { action }) => run_profile(config, action).await,
        Some(Commands::Config {
            action: ConfigCommand::Validate,
        }) => {
            println!(
                "configuration is valid (agent.name={}, database={})",
                config.agent.name, config.storage.database_path
            );
            Ok(())
        }
        None => {
            println!("consulta: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run_profile(config: ConsultaConfig, action: ProfileCommand) -> Result<(), ConsultaError> {
    let storage = open_storage(&config).await?;
    let outcome = match action {
        ProfileCommand::Add {
            lecturer,
            day,
            start,
            end,
            duration,
            max_slots,
            subject,
            location,
            notes,
        } => {
            let new = profile::NewProfile {
                lecturer,
                day_of_week: day,
                start,
                end,
                slot_duration_minutes: duration,
                max_slots_per_day: max_slots,
                subject,
                location,
                notes,
            };
            profile::add(&storage, new).await
        }
        ProfileCommand::List => profile::list(&storage).await,
        ProfileCommand::Block { id, date } => profile::block(&storage, id, date, true).await,
        ProfileCommand::Unblock { id, date } => profile::block(&storage, id, date, false).await,
        ProfileCommand::Disable { id } => profile::disable(&storage, id).await,
    };
    storage.close().await?;
    outcome
}

/// Open and migrate the configured database.
pub(crate) async fn open_storage(config: &ConsultaConfig) -> Result<Arc<SqliteStorage>, ConsultaError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

/// The Gemini provider, or `None` when it cannot be set up. The engine then
/// runs pattern-only NLU and fixed chat replies.
#[cfg(feature = "gemini")]
pub(crate) fn language_model(config: &ConsultaConfig) -> Option<Arc<dyn ProviderAdapter>> {
    match consulta_gemini::GeminiProvider::new(&config.gemini) {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            warn!(error = %e, "language model unavailable, continuing without it");
            None
        }
    }
}

#[cfg(not(feature = "gemini"))]
pub(crate) fn language_model(_config: &ConsultaConfig) -> Option<Arc<dyn ProviderAdapter>> {
    warn!("built without a language model adapter");
    None
}

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG` wins when set. Logs go to stderr so they never mix with the
/// REPL output.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("consulta={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
