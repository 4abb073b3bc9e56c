//! One player's seat at a table, wired to storage and notifications.
//!
//! A [`Session`] owns the [`Table`], the [`PlayerAccount`] and the
//! [`AchievementTracker`]. After every operation it forwards the table's
//! events to the [`NotificationSink`], feeds settlements to the tracker and
//! writes the profile and round snapshot through the [`ProfileStore`].
//! Storage failures never interrupt play: they are logged, reported to the
//! sink, and the in-memory state stays authoritative.
//!
//! A save that loses a revision race is rebased onto the stored profile and
//! retried. Balance and counters carry their local change across, records
//! and achievement progress keep the larger side, and a daily bonus that was
//! already claimed elsewhere in the same interval is taken back.

use alloc::string::String;
use alloc::vec::Vec;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::account::PlayerAccount;
use crate::achievements::{Achievement, AchievementTracker};
use crate::card::Card;
use crate::error::{BonusError, GameError, PersistenceError, ShoeError};
use crate::game::{RoundState, Table, TableEvent};
use crate::notify::{Notification, NotificationSink};
use crate::options::{BankrollOptions, TableOptions};
use crate::persistence::{ProfileRecord, ProfileStore, Transaction, TransactionKind};

/// Times a conflicted profile save is retried after rebasing.
pub const SAVE_RETRIES: usize = 3;

/// A single player's game, persisted as it goes.
#[derive(Debug)]
pub struct Session<S, N, R = ChaCha8Rng> {
    user_id: String,
    store: S,
    sink: N,
    table: Table<R>,
    account: PlayerAccount,
    tracker: AchievementTracker,
    bankroll: BankrollOptions,
    /// The profile as last read from or written to the store.
    saved: ProfileRecord,
    /// Ledger entries not yet saved.
    pending: Vec<Transaction>,
}

impl<S: ProfileStore, N: NotificationSink> Session<S, N, ChaCha8Rng> {
    /// Opens a session for `user_id`, shuffling with a `ChaCha8Rng` seeded
    /// from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::InvalidDeckCount`] if `options.decks` is zero.
    pub fn open(
        user_id: impl Into<String>,
        store: S,
        sink: N,
        options: TableOptions,
        bankroll: BankrollOptions,
        seed: u64,
    ) -> Result<Self, ShoeError> {
        Self::open_with_rng(
            user_id,
            store,
            sink,
            options,
            bankroll,
            ChaCha8Rng::seed_from_u64(seed),
        )
    }
}

impl<S: ProfileStore, N: NotificationSink, R: Rng> Session<S, N, R> {
    /// Opens a session for `user_id`.
    ///
    /// Loads the profile, creating one with the starting balance if the user
    /// has none, then resumes any round in progress. If the profile cannot be
    /// loaded the session starts from a default profile and the failure is
    /// reported to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::InvalidDeckCount`] if `options.decks` is zero.
    pub fn open_with_rng(
        user_id: impl Into<String>,
        store: S,
        sink: N,
        options: TableOptions,
        bankroll: BankrollOptions,
        rng: R,
    ) -> Result<Self, ShoeError> {
        let user_id = user_id.into();

        let (record, created) = match store.load_profile(&user_id) {
            Ok(Some(record)) => (record, false),
            Ok(None) => (ProfileRecord::new(bankroll.starting_balance), true),
            Err(err) => {
                warn!(%user_id, %err, "profile load failed, using default profile");
                sink.notify(Notification::PersistenceFailed(err));
                (ProfileRecord::new(bankroll.starting_balance), false)
            }
        };

        let snapshot = match store.load_round_snapshot(&user_id) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(%user_id, %err, "round snapshot load failed");
                sink.notify(Notification::PersistenceFailed(err));
                None
            }
        };

        let table = match snapshot {
            Some(snapshot) => {
                info!(%user_id, state = %snapshot.round.state(), "resuming round");
                Table::resume_with_rng(options, rng, snapshot)
            }
            None => Table::with_rng(options, rng)?,
        };

        let mut tracker = AchievementTracker::with_defaults();
        tracker.merge(&record.achievements);

        let mut session = Self {
            user_id,
            store,
            sink,
            table,
            account: record.to_account(),
            tracker,
            bankroll,
            saved: record,
            pending: Vec::new(),
        };

        if created {
            info!(user_id = %session.user_id, balance = session.balance(), "new profile");
            session.save_profile_or_report();
        }

        Ok(session)
    }

    /// The player's id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The table.
    #[must_use]
    pub const fn table(&self) -> &Table<R> {
        &self.table
    }

    /// The player's account.
    #[must_use]
    pub const fn account(&self) -> &PlayerAccount {
        &self.account
    }

    /// Current round state.
    #[must_use]
    pub const fn state(&self) -> RoundState {
        self.table.state()
    }

    /// Chips not in play.
    #[must_use]
    pub const fn balance(&self) -> u64 {
        self.account.balance()
    }

    /// Achievement progress.
    #[must_use]
    pub fn achievements(&self) -> &[Achievement] {
        self.tracker.achievements()
    }

    /// The achievement tracker.
    #[must_use]
    pub const fn tracker(&self) -> &AchievementTracker {
        &self.tracker
    }

    /// The notification sink.
    #[must_use]
    pub const fn sink(&self) -> &N {
        &self.sink
    }

    /// The profile store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Store revision of the last profile read or written.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.saved.revision
    }

    /// Credits made outside the table, oldest first, including any not
    /// saved yet.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.saved.transactions.iter().chain(&self.pending)
    }

    /// See [`Table::place_bet`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn place_bet(&mut self, amount: u64) -> Result<u64, GameError> {
        self.run(|table, account| table.place_bet(account, amount))
    }

    /// See [`Table::clear_bet`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn clear_bet(&mut self) -> Result<u64, GameError> {
        self.run(Table::clear_bet)
    }

    /// See [`Table::start`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn start(&mut self) -> Result<RoundState, GameError> {
        self.run(Table::start)
    }

    /// See [`Table::resolve_insurance`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn resolve_insurance(&mut self, take: bool) -> Result<RoundState, GameError> {
        self.run(|table, account| table.resolve_insurance(account, take))
    }

    /// See [`Table::hit`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn hit(&mut self) -> Result<Card, GameError> {
        self.run(Table::hit)
    }

    /// See [`Table::stand`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn stand(&mut self) -> Result<RoundState, GameError> {
        self.run(Table::stand)
    }

    /// See [`Table::double_down`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn double_down(&mut self) -> Result<Card, GameError> {
        self.run(Table::double_down)
    }

    /// See [`Table::split`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn split(&mut self) -> Result<(), GameError> {
        self.run(Table::split)
    }

    /// See [`Table::resume_dealer`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn resume_dealer(&mut self) -> Result<RoundState, GameError> {
        self.run(Table::resume_dealer)
    }

    /// See [`Table::abandon`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn abandon(&mut self) -> Result<u64, GameError> {
        self.run(Table::abandon)
    }

    /// See [`Table::new_round`].
    ///
    /// # Errors
    ///
    /// Propagates the table's error; it is also reported to the sink.
    pub fn new_round(&mut self) -> Result<bool, GameError> {
        self.run(|table, _| table.new_round())
    }

    /// Claims the daily bonus at unix time `now` and saves the profile.
    ///
    /// # Errors
    ///
    /// Returns [`BonusError::NotYetAvailable`] if claimed too early, either
    /// by this session or by another writer whose claim reached the store
    /// first. Either way it is also reported to the sink.
    pub fn claim_daily_bonus(&mut self, now: u64) -> Result<u64, BonusError> {
        let amount = match self.account.claim_daily_bonus(now, &self.bankroll) {
            Ok(amount) => amount,
            Err(err) => {
                debug!(user_id = %self.user_id, %err, "daily bonus refused");
                self.sink.notify(Notification::BonusUnavailable(err));
                return Err(err);
            }
        };
        self.pending.push(Transaction {
            kind: TransactionKind::DailyBonus,
            amount,
            at: now,
        });

        if let Some(err) = self.save_profile_or_report() {
            return Err(err);
        }
        info!(user_id = %self.user_id, amount, "daily bonus claimed");
        self.sink.notify(Notification::DailyBonus { amount });
        Ok(amount)
    }

    fn run<T>(
        &mut self,
        op: impl FnOnce(&mut Table<R>, &mut PlayerAccount) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let outcome = op(&mut self.table, &mut self.account);

        if let Err(err) = &outcome {
            warn!(user_id = %self.user_id, %err, "operation rejected");
            self.sink.notify(Notification::Rejected(*err));
        }

        // A failed dealer draw can still leave committed events behind.
        let changed = self.publish_events();
        if outcome.is_ok() || changed {
            self.persist();
        }

        outcome
    }

    /// Forwards table events to the sink, feeding settlements to the
    /// achievement tracker. Returns whether there were any.
    fn publish_events(&mut self) -> bool {
        let events = self.table.drain_events();
        let any = !events.is_empty();

        for event in events {
            let unlocked = match &event {
                TableEvent::Settled(settlement) => {
                    self.tracker.observe(settlement, self.account.stats())
                }
                _ => Vec::new(),
            };
            self.sink.notify(Notification::Table(event));
            for rule in unlocked {
                self.sink.notify(Notification::AchievementUnlocked(rule));
            }
        }

        any
    }

    fn persist(&mut self) {
        self.save_profile_or_report();

        if let Err(err) = self
            .store
            .save_round_snapshot(&self.user_id, &self.table.snapshot())
        {
            warn!(user_id = %self.user_id, %err, "round snapshot save failed");
            self.sink.notify(Notification::PersistenceFailed(err));
        }
    }

    /// Saves the profile, reporting failures to the sink. Returns the
    /// refusal for a bonus claim revoked while rebasing.
    fn save_profile_or_report(&mut self) -> Option<BonusError> {
        let mut revoked = None;
        if let Err(err) = self.save_profile(&mut revoked) {
            warn!(user_id = %self.user_id, %err, "profile save failed");
            self.sink.notify(Notification::PersistenceFailed(err));
        }
        if let Some(err) = revoked {
            self.sink.notify(Notification::BonusUnavailable(err));
        }
        revoked
    }

    fn record(&self) -> ProfileRecord {
        ProfileRecord {
            balance: self.account.balance(),
            stats: *self.account.stats(),
            achievements: self.tracker.achievements().to_vec(),
            last_daily_bonus: self.account.last_daily_bonus(),
            transactions: self.transactions().copied().collect(),
            revision: self.saved.revision,
        }
    }

    /// Saves the profile, rebasing onto the stored one on conflict.
    fn save_profile(&mut self, revoked: &mut Option<BonusError>) -> Result<(), PersistenceError> {
        let mut retries = 0;
        loop {
            let record = self.record();
            match self.store.save_profile(&self.user_id, &record) {
                Ok(revision) => {
                    self.saved = ProfileRecord { revision, ..record };
                    self.pending.clear();
                    return Ok(());
                }
                Err(PersistenceError::Conflict { expected, found }) if retries < SAVE_RETRIES => {
                    retries += 1;
                    debug!(
                        user_id = %self.user_id,
                        expected,
                        found,
                        retries,
                        "profile conflict, rebasing"
                    );
                    let remote = self.store.load_profile(&self.user_id)?.unwrap_or_default();
                    if let Some(err) = self.rebase(remote) {
                        *revoked = Some(err);
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Replays everything changed since the last save on top of `remote`.
    ///
    /// Returns the refusal if a bonus claimed here collides with one that
    /// `remote` already holds.
    fn rebase(&mut self, remote: ProfileRecord) -> Option<BonusError> {
        let revoked = self.colliding_bonus(&remote);

        self.account.rebase(&self.saved.to_account(), &remote.to_account());
        self.tracker.merge(&remote.achievements);

        if let Some((claim, next_claim_at)) = revoked {
            warn!(
                user_id = %self.user_id,
                at = claim.at,
                next_claim_at,
                "daily bonus already claimed elsewhere, revoking"
            );
            self.account.revoke_bonus(claim.amount, remote.last_daily_bonus);
            self.pending.retain(|t| *t != claim);
        }

        self.saved = remote;
        revoked.map(|(_, next_claim_at)| BonusError::NotYetAvailable { next_claim_at })
    }

    /// A bonus claimed since the last save that falls within one interval of
    /// a claim `remote` gained in the meantime, with the time the remote
    /// claim allows the next one.
    fn colliding_bonus(&self, remote: &ProfileRecord) -> Option<(Transaction, u64)> {
        let theirs = remote
            .last_daily_bonus
            .filter(|_| remote.last_daily_bonus != self.saved.last_daily_bonus)?;
        let interval = self.bankroll.daily_bonus_interval_secs;

        self.pending
            .iter()
            .rev()
            .find(|t| t.kind == TransactionKind::DailyBonus && t.at.abs_diff(theirs) < interval)
            .map(|claim| (*claim, theirs.saturating_add(interval)))
    }
}
