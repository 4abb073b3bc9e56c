//! Achievement progress driven by round settlements.
//!
//! Achievements are data: each [`AchievementRule`] pairs an id with a
//! [`Trigger`] and a target. The [`AchievementTracker`] watches settlements
//! and advances progress, unlocking each achievement at most once.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::account::Statistics;
use crate::result::Settlement;

/// What advances an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// +1 for every winning hand.
    HandWon,
    /// +1 for every settled round with a wager of at least this much.
    BetAtLeast(u64),
    /// Tracks the current win streak.
    WinStreak,
    /// +1 for every blackjack.
    Blackjack,
    /// +1 when both hands of a split win.
    SplitSweep,
    /// +1 for a winning round that began with less than `below` chips.
    Comeback {
        /// Balance threshold before the bet.
        below: u64,
    },
}

impl Trigger {
    /// Returns the new progress value after `settlement`.
    fn advance(self, progress: u64, settlement: &Settlement, stats: &Statistics) -> u64 {
        let gained = match self {
            Self::HandWon => settlement.hands_won() as u64,
            Self::BetAtLeast(threshold) => u64::from(settlement.wager >= threshold),
            Self::WinStreak => return progress.max(u64::from(stats.current_streak)),
            Self::Blackjack => settlement.blackjacks() as u64,
            Self::SplitSweep => u64::from(
                settlement.hands.len() == 2 && settlement.hands.iter().all(|h| h.outcome.is_win()),
            ),
            Self::Comeback { below } => {
                u64::from(settlement.opening_balance < below && settlement.net > 0)
            }
        };
        progress.saturating_add(gained)
    }
}

/// A named achievement and how to earn it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementRule {
    /// Stable identifier, used as the persistence key.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
    /// What advances progress.
    pub trigger: Trigger,
    /// Progress needed to unlock.
    pub target: u64,
}

/// The stock achievement table.
pub const DEFAULT_RULES: &[AchievementRule] = &[
    AchievementRule {
        id: "first_win",
        name: "First Win",
        description: "Win your first hand",
        trigger: Trigger::HandWon,
        target: 1,
    },
    AchievementRule {
        id: "high_roller",
        name: "High Roller",
        description: "Bet 500 chips or more on a single round",
        trigger: Trigger::BetAtLeast(500),
        target: 1,
    },
    AchievementRule {
        id: "winning_streak",
        name: "Winning Streak",
        description: "Win 3 hands in a row",
        trigger: Trigger::WinStreak,
        target: 3,
    },
    AchievementRule {
        id: "blackjack_master",
        name: "Blackjack Master",
        description: "Get 5 blackjacks",
        trigger: Trigger::Blackjack,
        target: 5,
    },
    AchievementRule {
        id: "split_success",
        name: "Split Success",
        description: "Win both hands after a split",
        trigger: Trigger::SplitSweep,
        target: 1,
    },
    AchievementRule {
        id: "comeback_kid",
        name: "Comeback Kid",
        description: "Win a round after dropping below 100 chips",
        trigger: Trigger::Comeback { below: 100 },
        target: 1,
    },
];

/// Persisted progress for one achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Rule identifier.
    pub id: String,
    /// Progress so far, never above `target`.
    pub progress: u64,
    /// Progress needed to unlock.
    pub target: u64,
    /// Set once `progress` reaches `target`; never cleared.
    pub unlocked: bool,
}

impl Achievement {
    fn fresh(rule: &AchievementRule) -> Self {
        Self {
            id: rule.id.into(),
            progress: 0,
            target: rule.target,
            unlocked: false,
        }
    }
}

/// Tracks achievement progress across rounds.
#[derive(Debug, Clone)]
pub struct AchievementTracker {
    rules: Vec<AchievementRule>,
    progress: Vec<Achievement>,
}

impl Default for AchievementTracker {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AchievementTracker {
    /// Creates a tracker over [`DEFAULT_RULES`].
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }

    /// Creates a tracker over `rules` with no progress.
    #[must_use]
    pub fn new(rules: Vec<AchievementRule>) -> Self {
        let progress = rules.iter().map(Achievement::fresh).collect();
        Self { rules, progress }
    }

    /// Merges saved progress into the tracker.
    ///
    /// Entries are matched by id. Each achievement keeps the larger of the two
    /// progress values and stays unlocked if either side unlocked it. Unknown
    /// ids are dropped and saved progress is clamped to the rule's current
    /// target. Nothing merged in here is reported as a new unlock.
    pub fn merge(&mut self, saved: &[Achievement]) {
        for (rule, entry) in self.rules.iter().zip(&mut self.progress) {
            if let Some(old) = saved.iter().find(|a| a.id == rule.id) {
                entry.progress = entry.progress.max(old.progress).min(rule.target);
                entry.unlocked = entry.unlocked || old.unlocked || entry.progress >= rule.target;
            }
        }
    }

    /// Advances every achievement with a finished round.
    ///
    /// `stats` must already include the round. Returns the rules unlocked by
    /// this round; an achievement that was already unlocked is never
    /// returned again.
    pub fn observe(&mut self, settlement: &Settlement, stats: &Statistics) -> Vec<AchievementRule> {
        let mut unlocked = Vec::new();

        for (rule, entry) in self.rules.iter().zip(&mut self.progress) {
            if entry.unlocked {
                continue;
            }
            entry.progress = rule
                .trigger
                .advance(entry.progress, settlement, stats)
                .min(rule.target);
            if entry.progress >= rule.target {
                entry.unlocked = true;
                info!(id = rule.id, "achievement unlocked");
                unlocked.push(*rule);
            }
        }

        unlocked
    }

    /// Current progress, in rule order.
    #[must_use]
    pub fn achievements(&self) -> &[Achievement] {
        &self.progress
    }

    /// Progress for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.progress.iter().find(|a| a.id == id)
    }

    /// The rules being tracked.
    #[must_use]
    pub fn rules(&self) -> &[AchievementRule] {
        &self.rules
    }
}
