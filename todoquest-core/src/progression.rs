//! Progression engine
//!
//! Turns completions into XP, levels, streaks, achievements and titles.
//! Everything here is pure: the current instant is passed in by the caller.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Levels stop counting here; XP beyond the cap does not carry into a level
pub const MAX_LEVEL: u32 = 999;

/// Bonus for the first completion of a calendar day
pub const FIRST_OF_DAY_BONUS: u64 = 5;

/// XP needed to finish `level` and reach the next one
pub fn level_requirement(level: u32) -> u64 {
    100 + u64::from(level.saturating_sub(1)) * 25
}

/// Position inside the level curve for some amount of XP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: u32,
    pub xp_into_level: u64,
    pub xp_for_next: u64,
}

impl LevelInfo {
    /// Progress towards the next level as a percentage
    pub fn percent(&self) -> f64 {
        crate::date::progress_percent(self.xp_into_level, self.xp_for_next)
    }
}

/// Derive the level from total XP
pub fn level_from_xp(total_xp: u64) -> LevelInfo {
    let mut level = 1;
    let mut xp = total_xp;
    loop {
        let req = level_requirement(level);
        if xp < req {
            return LevelInfo {
                level,
                xp_into_level: xp,
                xp_for_next: req,
            };
        }
        xp -= req;
        level += 1;
        if level > MAX_LEVEL {
            return LevelInfo {
                level: MAX_LEVEL,
                xp_into_level: 0,
                xp_for_next: 1,
            };
        }
    }
}

/// Cumulative progression counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionStats {
    pub total_xp: u64,
    pub streak_days: u32,
    pub last_complete_day: Option<NaiveDate>,
    pub total_completed: u64,
}

impl ProgressionStats {
    pub fn level(&self) -> LevelInfo {
        level_from_xp(self.total_xp)
    }
}

/// The fixed set of achievements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Achievement {
    FirstDone,
    Streak3,
    Streak7,
    Completed10,
    Completed50,
    Level5,
    Level10,
}

impl Achievement {
    pub const ALL: [Achievement; 7] = [
        Achievement::FirstDone,
        Achievement::Streak3,
        Achievement::Streak7,
        Achievement::Completed10,
        Achievement::Completed50,
        Achievement::Level5,
        Achievement::Level10,
    ];

    /// Persistence key
    pub fn key(self) -> &'static str {
        match self {
            Achievement::FirstDone => "first_done",
            Achievement::Streak3 => "streak_3",
            Achievement::Streak7 => "streak_7",
            Achievement::Completed10 => "completed_10",
            Achievement::Completed50 => "completed_50",
            Achievement::Level5 => "level_5",
            Achievement::Level10 => "level_10",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstDone => "First Blood",
            Achievement::Streak3 => "On Fire",
            Achievement::Streak7 => "Unstoppable",
            Achievement::Completed10 => "Task Slayer",
            Achievement::Completed50 => "Productivity Boss",
            Achievement::Level5 => "Level 5",
            Achievement::Level10 => "Level 10",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::FirstDone => "Complete your first quest.",
            Achievement::Streak3 => "Keep a 3 day streak.",
            Achievement::Streak7 => "Keep a 7 day streak.",
            Achievement::Completed10 => "Complete 10 quests in total.",
            Achievement::Completed50 => "Complete 50 quests in total.",
            Achievement::Level5 => "Reach level 5.",
            Achievement::Level10 => "Reach level 10.",
        }
    }

    /// Level that satisfies a level achievement on its own
    fn level_threshold(self) -> Option<u32> {
        match self {
            Achievement::Level5 => Some(5),
            Achievement::Level10 => Some(10),
            _ => None,
        }
    }
}

/// Unlocked flags per achievement; flags can only be set, never cleared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementSet {
    first_done: bool,
    streak_3: bool,
    streak_7: bool,
    completed_10: bool,
    completed_50: bool,
    level_5: bool,
    level_10: bool,
}

impl AchievementSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag_mut(&mut self, achievement: Achievement) -> &mut bool {
        match achievement {
            Achievement::FirstDone => &mut self.first_done,
            Achievement::Streak3 => &mut self.streak_3,
            Achievement::Streak7 => &mut self.streak_7,
            Achievement::Completed10 => &mut self.completed_10,
            Achievement::Completed50 => &mut self.completed_50,
            Achievement::Level5 => &mut self.level_5,
            Achievement::Level10 => &mut self.level_10,
        }
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        match achievement {
            Achievement::FirstDone => self.first_done,
            Achievement::Streak3 => self.streak_3,
            Achievement::Streak7 => self.streak_7,
            Achievement::Completed10 => self.completed_10,
            Achievement::Completed50 => self.completed_50,
            Achievement::Level5 => self.level_5,
            Achievement::Level10 => self.level_10,
        }
    }

    /// Unlock an achievement, returning true if it was locked before
    pub fn unlock(&mut self, achievement: Achievement) -> bool {
        let flag = self.flag_mut(achievement);
        let newly = !*flag;
        *flag = true;
        newly
    }

    /// Union with another set
    pub fn merge(&mut self, other: &AchievementSet) {
        for achievement in Achievement::ALL {
            if other.is_unlocked(achievement) {
                self.unlock(achievement);
            }
        }
    }

    /// Unlocked for display: stored flag, or a level achievement the level already satisfies
    pub fn is_earned_at(&self, achievement: Achievement, level: u32) -> bool {
        self.is_unlocked(achievement)
            || achievement
                .level_threshold()
                .is_some_and(|threshold| level >= threshold)
    }

    /// Number of achievements shown as unlocked at `level`
    pub fn earned_count(&self, level: u32) -> usize {
        Achievement::ALL
            .iter()
            .filter(|a| self.is_earned_at(**a, level))
            .count()
    }
}

/// Profile title derived from the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Title {
    #[default]
    Rookie,
    Apprentice,
    Adventurer,
    Pro,
    Legend,
}

impl Title {
    pub fn for_level(level: u32) -> Self {
        match level {
            l if l >= 10 => Title::Legend,
            l if l >= 7 => Title::Pro,
            l if l >= 5 => Title::Adventurer,
            l if l >= 3 => Title::Apprentice,
            _ => Title::Rookie,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Title::Rookie => "Rookie",
            Title::Apprentice => "Apprentice",
            Title::Adventurer => "Adventurer",
            Title::Pro => "Pro",
            Title::Legend => "Legend",
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of awarding one completion
#[derive(Debug, Clone, PartialEq)]
pub struct Award {
    pub stats: ProgressionStats,
    pub base_xp: u64,
    pub streak_bonus: u64,
    pub first_of_day_bonus: u64,
    pub achievements: AchievementSet,
    /// Achievements unlocked by this award, in catalogue order
    pub newly_unlocked: Vec<Achievement>,
    pub title: Title,
}

impl Award {
    /// Total XP gained by this award
    pub fn gained(&self) -> u64 {
        self.base_xp + self.bonus()
    }

    pub fn bonus(&self) -> u64 {
        self.streak_bonus + self.first_of_day_bonus
    }

    /// Notification text, e.g. "+15 XP (base 10 + bonus 5)"
    pub fn message(&self) -> String {
        format!(
            "+{} XP (base {} + bonus {})",
            self.gained(),
            self.base_xp,
            self.bonus()
        )
    }
}

/// Streak bonus for a streak length
pub fn streak_bonus(streak_days: u32) -> u64 {
    match streak_days {
        d if d >= 7 => 10,
        d if d >= 3 => 5,
        _ => 0,
    }
}

/// Award one completion
///
/// `done_today_before` is the number of quests already completed today,
/// not counting the one being awarded.
pub fn award_completion(
    stats: &ProgressionStats,
    achievements: &AchievementSet,
    done_today_before: usize,
    base_xp: u64,
    now: DateTime<Local>,
) -> Award {
    let today = now.date_naive();
    let yesterday = today.pred_opt();

    let streak_days = match stats.last_complete_day {
        Some(day) if day == today => stats.streak_days,
        Some(day) if Some(day) == yesterday => stats.streak_days.saturating_add(1),
        _ => 1,
    };

    let streak_bonus = streak_bonus(streak_days);
    let first_of_day_bonus = if done_today_before == 0 {
        FIRST_OF_DAY_BONUS
    } else {
        0
    };
    let gained = base_xp + streak_bonus + first_of_day_bonus;

    let next = ProgressionStats {
        total_xp: stats.total_xp.saturating_add(gained),
        streak_days,
        last_complete_day: Some(today),
        total_completed: stats.total_completed.saturating_add(1),
    };

    let level = next.level().level;
    let mut unlocked = achievements.clone();
    let checks = [
        (Achievement::FirstDone, true),
        (Achievement::Streak3, streak_days >= 3),
        (Achievement::Streak7, streak_days >= 7),
        (Achievement::Completed10, next.total_completed >= 10),
        (Achievement::Completed50, next.total_completed >= 50),
        (Achievement::Level5, level >= 5),
        (Achievement::Level10, level >= 10),
    ];
    let newly_unlocked = checks
        .into_iter()
        .filter(|(_, earned)| *earned)
        .filter_map(|(achievement, _)| unlocked.unlock(achievement).then_some(achievement))
        .collect();

    Award {
        stats: next,
        base_xp,
        streak_bonus,
        first_of_day_bonus,
        achievements: unlocked,
        newly_unlocked,
        title: Title::for_level(level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_level_from_xp_boundaries() {
        assert_eq!(
            level_from_xp(0),
            LevelInfo { level: 1, xp_into_level: 0, xp_for_next: 100 }
        );
        assert_eq!(level_from_xp(99).level, 1);
        assert_eq!(
            level_from_xp(100),
            LevelInfo { level: 2, xp_into_level: 0, xp_for_next: 125 }
        );
        assert_eq!(level_from_xp(224).level, 2);
        assert_eq!(level_from_xp(225).level, 3);
    }

    #[test]
    fn test_level_from_xp_accounts_for_all_xp() {
        for total in (0..20_000).step_by(37) {
            let info = level_from_xp(total);
            assert!(info.xp_into_level < info.xp_for_next);

            let consumed: u64 = (1..info.level).map(level_requirement).sum();
            assert_eq!(consumed + info.xp_into_level, total);
            assert_eq!(info.xp_for_next, level_requirement(info.level));
        }
    }

    #[test]
    fn test_level_cap() {
        let info = level_from_xp(u64::MAX / 2);
        assert_eq!(info.level, MAX_LEVEL);
        assert!(info.xp_into_level < info.xp_for_next);
    }

    #[test]
    fn test_award_saturates_counters() {
        let stats = ProgressionStats {
            total_xp: u64::MAX - 3,
            streak_days: u32::MAX,
            last_complete_day: now().date_naive().pred_opt(),
            total_completed: u64::MAX,
        };
        let award = award_completion(&stats, &AchievementSet::new(), 0, 40, now());

        assert_eq!(award.stats.total_xp, u64::MAX);
        assert_eq!(award.stats.streak_days, u32::MAX);
        assert_eq!(award.stats.total_completed, u64::MAX);
        assert_eq!(award.stats.level().level, MAX_LEVEL);
    }

    #[test]
    fn test_first_completion_from_scratch() {
        let award = award_completion(
            &ProgressionStats::default(),
            &AchievementSet::new(),
            0,
            10,
            now(),
        );

        assert_eq!(award.gained(), 15);
        assert_eq!(award.stats.total_xp, 15);
        assert_eq!(award.stats.streak_days, 1);
        assert_eq!(award.stats.total_completed, 1);
        assert_eq!(award.stats.last_complete_day, Some(now().date_naive()));
        assert_eq!(award.stats.level().level, 1);
        assert_eq!(award.newly_unlocked, vec![Achievement::FirstDone]);
        assert_eq!(award.title, Title::Rookie);
        assert_eq!(award.message(), "+15 XP (base 10 + bonus 5)");
    }

    #[test]
    fn test_second_completion_same_day() {
        let first = award_completion(
            &ProgressionStats::default(),
            &AchievementSet::new(),
            0,
            10,
            now(),
        );
        let second = award_completion(&first.stats, &first.achievements, 1, 20, now());

        assert_eq!(second.stats.streak_days, 1);
        assert_eq!(second.first_of_day_bonus, 0);
        assert_eq!(second.gained(), 20);
        assert_eq!(second.stats.total_xp, 35);
        assert!(second.newly_unlocked.is_empty());
    }

    #[test]
    fn test_streak_continues_from_yesterday() {
        let stats = ProgressionStats {
            total_xp: 0,
            streak_days: 2,
            last_complete_day: Some((now() - TimeDelta::days(1)).date_naive()),
            total_completed: 2,
        };
        let award = award_completion(&stats, &AchievementSet::new(), 0, 10, now());

        assert_eq!(award.stats.streak_days, 3);
        assert_eq!(award.streak_bonus, 5);
        assert_eq!(award.gained(), 20);
        assert!(award.achievements.is_unlocked(Achievement::Streak3));
    }

    #[test]
    fn test_streak_resets_after_gap() {
        let stats = ProgressionStats {
            total_xp: 500,
            streak_days: 9,
            last_complete_day: Some((now() - TimeDelta::days(3)).date_naive()),
            total_completed: 30,
        };
        let award = award_completion(&stats, &AchievementSet::new(), 0, 40, now());

        assert_eq!(award.stats.streak_days, 1);
        assert_eq!(award.streak_bonus, 0);
    }

    #[test]
    fn test_long_streak_bonus() {
        assert_eq!(streak_bonus(2), 0);
        assert_eq!(streak_bonus(3), 5);
        assert_eq!(streak_bonus(6), 5);
        assert_eq!(streak_bonus(7), 10);
        assert_eq!(streak_bonus(30), 10);
    }

    #[test]
    fn test_level_achievements_and_title() {
        // Level 5 starts at 100 + 125 + 150 + 175 = 550 XP
        let stats = ProgressionStats {
            total_xp: 540,
            streak_days: 0,
            last_complete_day: None,
            total_completed: 9,
        };
        let award = award_completion(&stats, &AchievementSet::new(), 3, 10, now());

        assert_eq!(award.stats.level().level, 5);
        assert_eq!(award.title, Title::Adventurer);
        assert!(award.newly_unlocked.contains(&Achievement::Level5));
        assert!(award.newly_unlocked.contains(&Achievement::Completed10));
        assert!(!award.achievements.is_unlocked(Achievement::Level10));
    }

    #[test]
    fn test_achievements_never_relock() {
        let mut set = AchievementSet::new();
        assert!(set.unlock(Achievement::Streak7));
        assert!(!set.unlock(Achievement::Streak7));

        // A later award with a short streak keeps the flag
        let award = award_completion(&ProgressionStats::default(), &set, 0, 10, now());
        assert!(award.achievements.is_unlocked(Achievement::Streak7));

        let mut other = AchievementSet::new();
        other.merge(&award.achievements);
        assert!(other.is_unlocked(Achievement::Streak7));
        assert!(other.is_unlocked(Achievement::FirstDone));
    }

    #[test]
    fn test_earned_display_includes_level_achievements() {
        let set = AchievementSet::new();
        assert!(set.is_earned_at(Achievement::Level5, 6));
        assert!(!set.is_earned_at(Achievement::Level10, 6));
        assert!(!set.is_earned_at(Achievement::FirstDone, 20));
        assert_eq!(set.earned_count(12), 2);
    }

    #[test]
    fn test_title_thresholds() {
        assert_eq!(Title::for_level(1), Title::Rookie);
        assert_eq!(Title::for_level(3), Title::Apprentice);
        assert_eq!(Title::for_level(5), Title::Adventurer);
        assert_eq!(Title::for_level(7), Title::Pro);
        assert_eq!(Title::for_level(10), Title::Legend);
        assert_eq!(Title::for_level(999).to_string(), "Legend");
    }
}
