use std::io::{self, Write};

use chrono::Local;
use clap::Parser;

use todoquest_core::date::parse_due;
use todoquest_core::quest::parse_tags;
use todoquest_core::{Action, QuestPatch, QuestQuery, Store};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::display::{
    DisplayMode, format_achievements, format_quest, format_stats, format_summary, supports_color,
};
use crate::error::{CliError, Result};
use crate::notify::TerminalNotifier;
use crate::storage::JsonStorage;

mod cli;
mod config;
mod display;
mod error;
mod notify;
mod storage;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Config::load()?;

    let storage = JsonStorage::new(cfg.state_path());
    let use_color = supports_color();
    let notifier = TerminalNotifier::new(cfg.desktop_notifications, use_color);
    let mut store = Store::open(storage, notifier, Local::now());

    match cli.command {
        Commands::Add { text } => {
            let text = text.join(" ");
            if store.dispatch(Action::Add(text), Local::now()).is_changed() {
                let quest = &store.state().quests[0];
                println!("  [{}] {}", quest.id.short(), quest.text);
            } else {
                return Err(CliError::validation("text", "Quest text must not be blank"));
            }
        }

        Commands::List {
            filter,
            sort,
            search,
            compact,
            detailed,
            no_color,
        } => {
            let filter = match filter {
                Some(f) => f.into(),
                None => cfg.filter()?,
            };
            let sort = match sort {
                Some(s) => s.into(),
                None => cfg.sort()?,
            };

            let now = Local::now();
            let state = store.state();
            let query = QuestQuery::new()
                .filter(filter)
                .sort_by(sort)
                .with_search(search);
            let quests = query.apply(&state.quests, now);

            let use_color = !no_color && use_color;
            if quests.is_empty() {
                println!("Nothing found. Maybe add a new quest?");
            } else {
                let mode = if compact {
                    DisplayMode::Compact
                } else if detailed {
                    DisplayMode::Detailed
                } else {
                    DisplayMode::Default
                };

                for quest in &quests {
                    println!("{}", format_quest(quest, mode, use_color, now));
                }
            }

            println!();
            println!(
                "{}",
                format_summary(
                    quests.len(),
                    state.active_count(),
                    state.overdue_count(now),
                    use_color
                )
            );
        }

        Commands::Edit {
            id,
            text,
            notes,
            priority,
            difficulty,
            due,
            tags,
        } => {
            let mut patch = QuestPatch {
                text,
                notes,
                priority: priority.map(Into::into),
                difficulty: difficulty.map(Into::into),
                due_at: None,
                tags: tags.as_deref().map(parse_tags),
            };
            if let Some(due) = due {
                patch.due_at = Some(parse_due(&due)?);
            }
            if patch.is_empty() {
                return Err(CliError::validation(
                    "edit",
                    "At least one of --text, --notes, --priority, --difficulty, --due or --tags must be provided",
                ));
            }

            let id = store.state().find_by_prefix(&id)?.id;
            store.dispatch(Action::Update(id, patch), Local::now());
        }

        Commands::Done { id } => {
            let id = store.state().find_by_prefix(&id)?.id;
            store.dispatch(Action::ToggleCompletion(id), Local::now());
        }

        Commands::Remove { id } => {
            let quest = store.state().find_by_prefix(&id)?;
            let (id, text) = (quest.id, quest.text.clone());
            store.dispatch(Action::Delete(id), Local::now());
            println!("  {}", text);
        }

        Commands::Undo => match store.state().undo_label().map(str::to_string) {
            Some(label) => {
                store.dispatch(Action::Undo, Local::now());
                println!("  ({})", label);
            }
            None => println!("Nothing to undo."),
        },

        Commands::Reset { force } => {
            if !force && !confirm("Replace all quests and progress with the demo state?")? {
                println!("Cancelled.");
                return Ok(());
            }
            store.dispatch(Action::ResetAll, Local::now());
        }

        Commands::Stats { no_color } => {
            println!("{}", format_stats(store.state(), !no_color && use_color, Local::now()));
        }

        Commands::Achievements { no_color } => {
            println!("{}", format_achievements(store.state(), !no_color && use_color));
        }

        Commands::Settings {
            name,
            color,
            sound,
            reduce_motion,
        } => {
            let state = store.state();
            let name = name.unwrap_or_else(|| state.profile.name.clone());
            let color = color.unwrap_or_else(|| state.profile.color.clone());
            let sound = sound.map(bool::from).unwrap_or(state.settings.sound);
            let reduce_motion = reduce_motion
                .map(bool::from)
                .unwrap_or(state.settings.reduce_motion);

            store.save_settings(&name, &color, sound, reduce_motion)?;

            let state = store.state();
            println!("  Name:          {}", state.profile.name);
            println!("  Accent color:  {}", state.profile.color);
            println!("  Sound:         {}", on_off(state.settings.sound));
            println!("  Reduce motion: {}", on_off(state.settings.reduce_motion));
        }

        Commands::FactoryReset { force } => {
            if !force && !confirm("Wipe everything? This cannot be undone.")? {
                println!("Cancelled.");
                return Ok(());
            }
            store.dispatch(Action::FactoryReset, Local::now());
            println!("Factory reset done.");
        }

        Commands::Recover { force } => {
            if !store.persistence().backup_exists() {
                return Err(CliError::storage("No backup file found"));
            }

            if !force && !confirm("Restore state from backup? Current state will be replaced.")? {
                println!("Cancelled.");
                return Ok(());
            }

            let recovered = store.persistence().recover()?;
            let count = recovered.quests.len();
            store.replace(recovered);
            println!("Recovered {} quests from backup.", count);
        }
    }

    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

/// Ask user for confirmation
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y")
}
