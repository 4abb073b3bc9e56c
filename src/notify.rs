//! User-facing notifications.

use alloc::vec::Vec;

use crate::achievements::AchievementRule;
use crate::error::{BonusError, GameError, PersistenceError};
use crate::game::TableEvent;
use crate::sync::Shared;

/// Something worth showing the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A table event, in the order it happened. These double as sound and
    /// animation cues.
    Table(TableEvent),
    /// An achievement was unlocked for the first time.
    AchievementUnlocked(AchievementRule),
    /// An operation was rejected. Nothing changed.
    Rejected(GameError),
    /// A profile or snapshot could not be loaded or saved. Play continues on
    /// the in-memory state.
    PersistenceFailed(PersistenceError),
    /// The daily bonus was credited.
    DailyBonus {
        /// Chips credited.
        amount: u64,
    },
    /// The daily bonus was claimed too early.
    BonusUnavailable(BonusError),
}

/// Receives notifications. Delivery must not block the game.
pub trait NotificationSink {
    /// Delivers one notification.
    fn notify(&self, notification: Notification);
}

impl<T: NotificationSink + ?Sized> NotificationSink for &T {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// A sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl NotificationSink for Discard {
    fn notify(&self, _notification: Notification) {}
}

/// A sink that keeps notifications until they are taken.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Shared<Vec<Notification>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Shared::new(Vec::new()),
        }
    }

    /// Removes and returns everything logged so far.
    pub fn take(&self) -> Vec<Notification> {
        self.entries.with(core::mem::take)
    }

    /// Number of notifications waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.with(|entries| entries.len())
    }

    /// Returns whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.with(|entries| entries.is_empty())
    }
}

impl NotificationSink for EventLog {
    fn notify(&self, notification: Notification) {
        self.entries.with(|entries| entries.push(notification));
    }
}
