//! Profile and round persistence.
//!
//! The engine does not own a storage format. [`ProfileStore`] is the seam a
//! host implements over its own backend; [`MemoryStore`] keeps everything in
//! process and is what the tests and demos use.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

#[cfg(all(not(feature = "std"), feature = "alloc"))]
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
#[cfg(feature = "std")]
use std::collections::HashMap;
use tracing::debug;

use crate::account::{PlayerAccount, Statistics};
use crate::achievements::Achievement;
use crate::error::PersistenceError;
use crate::game::RoundSnapshot;
use crate::sync::Shared;

/// What a ledger entry was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// The daily login bonus.
    DailyBonus,
}

impl TransactionKind {
    /// Display text for the entry.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::DailyBonus => "Daily login bonus",
        }
    }
}

/// A chip credit made outside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// What the credit was for.
    pub kind: TransactionKind,
    /// Chips credited.
    pub amount: u64,
    /// Unix time (seconds) of the credit.
    pub at: u64,
}

/// Everything stored about a player between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Chips not in play.
    pub balance: u64,
    /// Lifetime statistics.
    pub stats: Statistics,
    /// Achievement progress.
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    /// Unix time of the last daily bonus claim.
    #[serde(default)]
    pub last_daily_bonus: Option<u64>,
    /// Credits made outside the table, oldest first.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Store revision this record was read at. Zero for a record that has
    /// never been saved.
    #[serde(default)]
    pub revision: u64,
}

impl ProfileRecord {
    /// A brand new profile holding `balance` chips.
    #[must_use]
    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    /// The `limit` most recent transactions, newest first.
    pub fn recent_transactions(&self, limit: usize) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().rev().take(limit)
    }

    /// Rebuilds the account this record describes.
    #[must_use]
    pub fn to_account(&self) -> PlayerAccount {
        PlayerAccount::from_parts(self.balance, self.stats, self.last_daily_bonus)
    }
}

/// Storage for player profiles and in-progress rounds.
///
/// Profile saves are compare-and-set on [`ProfileRecord::revision`]: a save
/// succeeds only if the stored revision still equals the one the record was
/// read at, and returns the new revision. Otherwise it fails with
/// [`PersistenceError::Conflict`] and the caller is expected to reload and
/// retry.
pub trait ProfileStore {
    /// Loads a profile, or `None` if the user has none yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, PersistenceError>;

    /// Saves a profile if nobody else has saved since it was read.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Conflict`] on a stale revision, or another
    /// error if the backend cannot be written.
    fn save_profile(&self, user_id: &str, record: &ProfileRecord) -> Result<u64, PersistenceError>;

    /// Loads the round in progress, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load_round_snapshot(&self, user_id: &str) -> Result<Option<RoundSnapshot>, PersistenceError>;

    /// Saves the round in progress, replacing any previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save_round_snapshot(
        &self,
        user_id: &str,
        snapshot: &RoundSnapshot,
    ) -> Result<(), PersistenceError>;
}

impl<T: ProfileStore + ?Sized> ProfileStore for &T {
    fn load_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, PersistenceError> {
        (**self).load_profile(user_id)
    }

    fn save_profile(&self, user_id: &str, record: &ProfileRecord) -> Result<u64, PersistenceError> {
        (**self).save_profile(user_id, record)
    }

    fn load_round_snapshot(&self, user_id: &str) -> Result<Option<RoundSnapshot>, PersistenceError> {
        (**self).load_round_snapshot(user_id)
    }

    fn save_round_snapshot(
        &self,
        user_id: &str,
        snapshot: &RoundSnapshot,
    ) -> Result<(), PersistenceError> {
        (**self).save_round_snapshot(user_id, snapshot)
    }
}

/// An in-process [`ProfileStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: Shared<HashMap<String, ProfileRecord>>,
    snapshots: Shared<HashMap<String, RoundSnapshot>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles.
    #[must_use]
    pub fn profile_count(&self) -> usize {
        self.profiles.with(|profiles| profiles.len())
    }
}

impl ProfileStore for MemoryStore {
    fn load_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, PersistenceError> {
        Ok(self.profiles.with(|profiles| profiles.get(user_id).cloned()))
    }

    fn save_profile(&self, user_id: &str, record: &ProfileRecord) -> Result<u64, PersistenceError> {
        let revision = self.profiles.with(|profiles| {
            let found = profiles.get(user_id).map_or(0, |stored| stored.revision);
            if found != record.revision {
                return Err(PersistenceError::Conflict {
                    expected: record.revision,
                    found,
                });
            }

            let revision = found + 1;
            profiles.insert(
                user_id.to_string(),
                ProfileRecord {
                    revision,
                    ..record.clone()
                },
            );
            Ok(revision)
        })?;
        debug!(user_id, revision, balance = record.balance, "profile saved");
        Ok(revision)
    }

    fn load_round_snapshot(&self, user_id: &str) -> Result<Option<RoundSnapshot>, PersistenceError> {
        Ok(self
            .snapshots
            .with(|snapshots| snapshots.get(user_id).cloned()))
    }

    fn save_round_snapshot(
        &self,
        user_id: &str,
        snapshot: &RoundSnapshot,
    ) -> Result<(), PersistenceError> {
        self.snapshots.with(|snapshots| {
            snapshots.insert(user_id.to_string(), snapshot.clone());
        });
        Ok(())
    }
}
