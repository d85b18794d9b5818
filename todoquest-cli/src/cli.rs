use clap::{Parser, Subcommand, ValueEnum};

use todoquest_core::{Difficulty, FilterMode, Priority, SortMode};

#[derive(Parser)]
#[command(name = "todoquest")]
#[command(about = concat!(
    " _____         _         ___                  _   \n",
    "|_   _|__   __| | ___   / _ \\ _   _  ___  ___| |_ \n",
    "  | |/ _ \\ / _` |/ _ \\ | | | | | | |/ _ \\/ __| __|\n",
    "  | | (_) | (_| | (_) || |_| | |_| |  __/\\__ \\ |_ \n",
    "  |_|\\___/ \\__,_|\\___/  \\__\\_\\\\__,_|\\___||___/\\__|\n",
    "~Farm XP, level up, get things done~"
))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(
    "v",
    env!("CARGO_PKG_VERSION"),
    "\nCodeName: ",
    env!("CODENAME")
))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FilterBy {
    All,
    Active,
    Done,
    Today,
    Overdue,
}

impl From<FilterBy> for FilterMode {
    fn from(value: FilterBy) -> Self {
        match value {
            FilterBy::All => FilterMode::All,
            FilterBy::Active => FilterMode::Active,
            FilterBy::Done => FilterMode::Done,
            FilterBy::Today => FilterMode::DueToday,
            FilterBy::Overdue => FilterMode::Overdue,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortBy {
    Smart,
    Due,
    Priority,
    Created,
}

impl From<SortBy> for SortMode {
    fn from(value: SortBy) -> Self {
        match value {
            SortBy::Smart => SortMode::Smart,
            SortBy::Due => SortMode::Due,
            SortBy::Priority => SortMode::Priority,
            SortBy::Created => SortMode::Created,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PriorityArg {
    Low,
    Normal,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Normal => Priority::Normal,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(value: Switch) -> Self {
        matches!(value, Switch::On)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Adds a quest
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Lists quests with filtering and sorting
    List {
        /// Which quests to show (defaults to the configured filter)
        #[arg(long, short = 'f', value_enum)]
        filter: Option<FilterBy>,
        /// Sort order (defaults to the configured sort)
        #[arg(long, value_enum)]
        sort: Option<SortBy>,
        /// Filter quests whose text, notes or tags contain the term (case-insensitive)
        #[arg(long, short = 's', value_name = "TERM")]
        search: Option<String>,
        /// Use compact one-line format
        #[arg(long, short = 'c')]
        compact: bool,
        /// Use detailed format with full info
        #[arg(long)]
        detailed: bool,
        /// Disable colors
        #[arg(long)]
        no_color: bool,
    },

    /// Edit a quest
    Edit {
        /// Quest id or unique id prefix
        id: String,
        /// New quest text
        #[arg(long, value_name = "TEXT")]
        text: Option<String>,
        /// Replace the notes
        #[arg(long, value_name = "NOTES")]
        notes: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,
        #[arg(long, value_enum)]
        difficulty: Option<DifficultyArg>,
        /// New due date (use 'none' to clear)
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        /// Comma separated tags, replaces the current tags
        #[arg(long, value_name = "TAGS")]
        tags: Option<String>,
    },

    /// Toggles quest completion, awarding XP when completed
    #[command(alias = "check")]
    Done {
        /// Quest id or unique id prefix
        id: String,
    },

    /// Removes a quest
    Remove {
        /// Quest id or unique id prefix
        id: String,
    },

    /// Reverts the last change
    Undo,

    /// Replaces all quests and progress with the demo state (undoable)
    Reset {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Shows level, XP and streak
    Stats {
        /// Disable colors
        #[arg(long)]
        no_color: bool,
    },

    /// Lists achievements
    Achievements {
        /// Disable colors
        #[arg(long)]
        no_color: bool,
    },

    /// Updates profile and settings
    Settings {
        /// Player name
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
        /// Accent color as #rrggbb
        #[arg(long, value_name = "COLOR")]
        color: Option<String>,
        /// XP award cue
        #[arg(long, value_enum)]
        sound: Option<Switch>,
        #[arg(long, value_enum)]
        reduce_motion: Option<Switch>,
    },

    /// Wipes everything without an undo step
    FactoryReset {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Recover the state from the backup file
    Recover {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}
