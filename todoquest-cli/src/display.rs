//! Quest display formatting module
//!
//! Handles colored output, the different list modes and the progression HUD.

use chrono::{DateTime, Local};
use colored::*;

use todoquest_core::date::{format_date_human, format_date_input};
use todoquest_core::{Achievement, AppState, Difficulty, Priority, Quest};

/// Tags shown inline before collapsing into "+N"
const INLINE_TAGS: usize = 4;
const BAR_WIDTH: usize = 24;

/// Display mode for quest list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayMode {
    /// Minimal one-line format
    Compact,
    /// Full info with formatted dates
    Detailed,
    /// Balanced view with clear status indicators (default)
    Default,
}

/// Check if terminal supports colors
pub fn supports_color() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn difficulty_badge(difficulty: Difficulty, use_color: bool) -> String {
    let badge = format!("{} · {} XP", difficulty, difficulty.base_xp());
    if !use_color {
        return badge;
    }
    match difficulty {
        Difficulty::Hard => badge.red().to_string(),
        Difficulty::Medium => badge.yellow().to_string(),
        Difficulty::Easy => badge.green().to_string(),
    }
}

fn priority_badge(priority: Priority, use_color: bool) -> String {
    let badge = priority.label().to_string();
    if !use_color {
        return badge;
    }
    match priority {
        Priority::High => badge.red().bold().to_string(),
        Priority::Normal => badge.magenta().to_string(),
        Priority::Low => badge.normal().to_string(),
    }
}

fn tags_inline(quest: &Quest, use_color: bool) -> String {
    if quest.tags.is_empty() {
        return String::new();
    }

    let mut shown: Vec<String> = quest
        .tags
        .iter()
        .take(INLINE_TAGS)
        .map(|t| {
            let tag = format!("#{}", t);
            if use_color { tag.magenta().to_string() } else { tag }
        })
        .collect();
    if quest.tags.len() > INLINE_TAGS {
        shown.push(format!("+{}", quest.tags.len() - INLINE_TAGS));
    }
    format!(" {}", shown.join(" "))
}

fn due_info(quest: &Quest, mode: DisplayMode, use_color: bool, now: DateTime<Local>) -> String {
    let Some(due) = quest.due_at else {
        return String::new();
    };

    let date = due.date_naive();
    let date_str = match mode {
        DisplayMode::Compact => format_date_human(date, false),
        _ => format_date_human(date, true),
    };
    let label = format!("(due {})", date_str);

    if !use_color {
        label
    } else if quest.done {
        label.green().to_string()
    } else if quest.is_overdue(now) {
        label.red().bold().to_string()
    } else if date.signed_duration_since(now.date_naive()).num_days() <= 1 {
        label.yellow().to_string()
    } else {
        label.normal().to_string()
    }
}

/// Format a quest for display
pub fn format_quest(quest: &Quest, mode: DisplayMode, use_color: bool, now: DateTime<Local>) -> String {
    let checkbox = if quest.done { "[✓]" } else { "[ ]" };
    let short_id = quest.id.short();

    let title = if use_color && quest.done {
        quest.text.green().strikethrough().to_string()
    } else {
        quest.text.clone()
    };
    let tags_str = tags_inline(quest, use_color);
    let due_str = due_info(quest, mode, use_color, now);

    match mode {
        DisplayMode::Compact => {
            format!("{} [{}] {}{}", checkbox, short_id, title, tags_str)
        }
        DisplayMode::Detailed => {
            let mut parts = vec![
                format!("{} [ID: {}]", checkbox, quest.id),
                format!("Title: {}", title),
                format!(
                    "Difficulty: {}  Priority: {}",
                    difficulty_badge(quest.difficulty, use_color),
                    priority_badge(quest.priority, use_color)
                ),
            ];

            match quest.due_at {
                Some(_) => parts.push(format!(
                    "Due: {} {}",
                    format_date_input(quest.due_at),
                    due_str
                )),
                None => parts.push("Due: (none)".to_string()),
            }

            if !quest.tags.is_empty() {
                let all_tags: Vec<String> = quest.tags.iter().map(|t| format!("#{}", t)).collect();
                parts.push(format!("Tags: {}", all_tags.join(" ")));
            }

            if !quest.notes.is_empty() {
                parts.push(format!("Notes: {}", quest.notes));
            }

            parts.push(format!("Created: {}", quest.created_at.format("%Y-%m-%d %H:%M")));
            match &quest.completed_at {
                Some(at) => parts.push(format!("Completed: {}", at.format("%Y-%m-%d %H:%M"))),
                None => parts.push("Status: Active".to_string()),
            }
            parts.join("\n  ")
        }
        DisplayMode::Default => {
            let id_str = if use_color {
                format!("[{}]", short_id).cyan().to_string()
            } else {
                format!("[{}]", short_id)
            };

            let mut line = format!(
                "{} {} {} [{}] [{}]{}",
                checkbox,
                id_str,
                title,
                difficulty_badge(quest.difficulty, use_color),
                priority_badge(quest.priority, use_color),
                tags_str
            );
            if !due_str.is_empty() {
                line.push(' ');
                line.push_str(&due_str);
            }
            if !quest.notes.is_empty() {
                line.push_str(&format!("\n      {}", quest.notes));
            }
            line
        }
    }
}

/// Format a summary line for the quest list
pub fn format_summary(shown: usize, active: usize, overdue: usize, use_color: bool) -> String {
    let mut parts = vec![format!("{} shown", shown), format!("{} active", active)];
    if overdue > 0 {
        let overdue = format!("{} overdue", overdue);
        parts.push(if use_color { overdue.red().to_string() } else { overdue });
    }

    format!("[{}]", parts.join(" | "))
}

/// Text progress bar, e.g. "[#####-----]"
pub fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Player HUD: name, title, level, XP progress and streak
pub fn format_stats(state: &AppState, use_color: bool, now: DateTime<Local>) -> String {
    let info = state.stats.level();
    let heading = format!(
        "{} the {} · Level {}",
        state.profile.name,
        state.profile.title(),
        info.level
    );
    let heading = if use_color { heading.bold().to_string() } else { heading };

    let last_day = state
        .stats
        .last_complete_day
        .map(|d| format_date_human(d, true))
        .unwrap_or_else(|| "never".to_string());

    [
        heading,
        format!(
            "XP to next level {} {}/{}",
            progress_bar(info.percent(), BAR_WIDTH),
            info.xp_into_level,
            info.xp_for_next
        ),
        format!("Total XP: {}", state.stats.total_xp),
        format!("Streak: {} day(s), last completion {}", state.stats.streak_days, last_day),
        format!("Completed: {} total, {} today", state.stats.total_completed, state.done_today_count(now)),
        format!("Active: {} · Overdue: {}", state.active_count(), state.overdue_count(now)),
        "First done today: +5 XP. Streak 3+: +5 XP. Streak 7+: +10 XP.".to_string(),
    ]
    .join("\n")
}

/// Achievement panel
pub fn format_achievements(state: &AppState, use_color: bool) -> String {
    let level = state.stats.level().level;
    let mut lines = vec![format!(
        "Unlocked: {}/{} · Level: {}",
        state.achievements.earned_count(level),
        Achievement::ALL.len(),
        level
    )];

    for achievement in Achievement::ALL {
        let unlocked = state.achievements.is_earned_at(achievement, level);
        let badge = match (unlocked, use_color) {
            (true, true) => "Unlocked".green().to_string(),
            (true, false) => "Unlocked".to_string(),
            (false, _) => "Locked".to_string(),
        };
        lines.push(format!(
            "  {:<18} {:<10} {}",
            achievement.title(),
            badge,
            achievement.description()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_format_quest_compact() {
        let quest = Quest::new("Test quest", now());

        let output = format_quest(&quest, DisplayMode::Compact, false, now());
        assert!(output.contains("[ ]"));
        assert!(output.contains(&quest.id.short()));
        assert!(output.contains("Test quest"));
    }

    #[test]
    fn test_format_quest_completed() {
        let mut quest = Quest::new("Done quest", now());
        quest.complete(now());

        let output = format_quest(&quest, DisplayMode::Default, false, now());
        assert!(output.contains("[✓]"));
        assert!(output.contains("easy · 10 XP"));
    }

    #[test]
    fn test_tags_collapse() {
        let tags = (1..=6).map(|i| format!("t{}", i)).collect();
        let quest = Quest::new("Tagged", now()).with_tags(tags);

        let output = format_quest(&quest, DisplayMode::Default, false, now());
        assert!(output.contains("#t4 +2"));
        assert!(!output.contains("#t5"));
    }

    #[test]
    fn test_detailed_shows_due() {
        let quest = Quest::new("Later", now()).with_due(Some(now() + TimeDelta::days(10)));

        let output = format_quest(&quest, DisplayMode::Detailed, false, now());
        assert!(output.contains("Due: 2026-03-20"));
    }

    #[test]
    fn test_format_summary() {
        let summary = format_summary(10, 5, 2, false);
        assert_eq!(summary, "[10 shown | 5 active | 2 overdue]");
        assert_eq!(format_summary(1, 1, 0, false), "[1 shown | 1 active]");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(50.0, 10), "[#####-----]");
        assert_eq!(progress_bar(250.0, 4), "[####]");
    }

    #[test]
    fn test_format_achievements() {
        let state = AppState::new(now());
        let output = format_achievements(&state, false);
        assert!(output.starts_with("Unlocked: 0/7 · Level: 1"));
        assert!(output.contains("First Blood"));
    }
}
