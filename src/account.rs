//! Player balance and running statistics.

use serde::{Deserialize, Serialize};

use crate::error::{BonusError, GameError};
use crate::options::BankrollOptions;
use crate::result::{HandOutcome, Settlement};

/// Running counters for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Rounds dealt.
    pub hands_played: u64,
    /// Hands that paid a profit.
    pub hands_won: u64,
    /// Hands that lost their stake.
    pub hands_lost: u64,
    /// Natural blackjacks paid.
    pub blackjacks: u64,
    /// Largest single-hand profit.
    pub biggest_win: u64,
    /// Longest run of consecutive winning hands.
    pub longest_streak: u32,
    /// Current run of consecutive winning hands.
    pub current_streak: u32,
}

impl Statistics {
    /// Folds one hand outcome into the counters.
    pub fn record(&mut self, outcome: HandOutcome, profit: u64) {
        if outcome.is_win() {
            self.hands_won += 1;
            self.biggest_win = self.biggest_win.max(profit);
            self.current_streak += 1;
            self.longest_streak = self.longest_streak.max(self.current_streak);
            if outcome == HandOutcome::Blackjack {
                self.blackjacks += 1;
            }
        } else if outcome.is_loss() {
            self.hands_lost += 1;
            self.current_streak = 0;
        }
    }

    /// Replays the change from `base` to `self` on top of `onto`.
    ///
    /// Counters add up. Records keep the larger value. The current streak
    /// follows whichever side played since `base`, this one first.
    #[must_use]
    pub fn rebased(&self, base: &Self, onto: &Self) -> Self {
        let gained =
            |mine: u64, before: u64, theirs: u64| theirs.saturating_add(mine.saturating_sub(before));
        Self {
            hands_played: gained(self.hands_played, base.hands_played, onto.hands_played),
            hands_won: gained(self.hands_won, base.hands_won, onto.hands_won),
            hands_lost: gained(self.hands_lost, base.hands_lost, onto.hands_lost),
            blackjacks: gained(self.blackjacks, base.blackjacks, onto.blackjacks),
            biggest_win: self.biggest_win.max(onto.biggest_win),
            longest_streak: self.longest_streak.max(onto.longest_streak),
            current_streak: if self == base {
                onto.current_streak
            } else {
                self.current_streak
            },
        }
    }
}

/// A player's chips and statistics.
///
/// The balance only changes through table operations (escrow and settlement)
/// and the daily bonus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAccount {
    balance: u64,
    stats: Statistics,
    last_daily_bonus: Option<u64>,
}

impl PlayerAccount {
    /// Creates an account with the given balance and empty statistics.
    #[must_use]
    pub const fn new(balance: u64) -> Self {
        Self {
            balance,
            stats: Statistics {
                hands_played: 0,
                hands_won: 0,
                hands_lost: 0,
                blackjacks: 0,
                biggest_win: 0,
                longest_streak: 0,
                current_streak: 0,
            },
            last_daily_bonus: None,
        }
    }

    /// Rebuilds an account from persisted parts.
    #[must_use]
    pub const fn from_parts(balance: u64, stats: Statistics, last_daily_bonus: Option<u64>) -> Self {
        Self {
            balance,
            stats,
            last_daily_bonus,
        }
    }

    /// Spendable chips.
    #[must_use]
    pub const fn balance(&self) -> u64 {
        self.balance
    }

    /// Running statistics.
    #[must_use]
    pub const fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Unix time (seconds) of the last bonus claim.
    #[must_use]
    pub const fn last_daily_bonus(&self) -> Option<u64> {
        self.last_daily_bonus
    }

    /// Fails without side effects if `amount` exceeds the balance.
    pub(crate) const fn ensure_funds(&self, amount: u64) -> Result<(), GameError> {
        if self.balance < amount {
            return Err(GameError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        Ok(())
    }

    /// Moves chips out of the balance into escrow.
    pub(crate) const fn debit(&mut self, amount: u64) -> Result<(), GameError> {
        if let Err(err) = self.ensure_funds(amount) {
            return Err(err);
        }
        self.balance -= amount;
        Ok(())
    }

    pub(crate) const fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Moves this account onto `remote`, keeping the change made since
    /// `base`: the balance delta, the statistics and a newer bonus claim.
    pub(crate) fn rebase(&mut self, base: &Self, remote: &Self) {
        let balance = if self.balance >= base.balance {
            remote.balance.saturating_add(self.balance - base.balance)
        } else {
            remote.balance.saturating_sub(base.balance - self.balance)
        };
        let last_daily_bonus = if self.last_daily_bonus == base.last_daily_bonus {
            remote.last_daily_bonus
        } else {
            self.last_daily_bonus.max(remote.last_daily_bonus)
        };

        *self = Self {
            balance,
            stats: self.stats.rebased(&base.stats, &remote.stats),
            last_daily_bonus,
        };
    }

    /// Takes back a bonus credit that lost to a claim made elsewhere.
    pub(crate) const fn revoke_bonus(&mut self, amount: u64, last_daily_bonus: Option<u64>) {
        self.balance = self.balance.saturating_sub(amount);
        self.last_daily_bonus = last_daily_bonus;
    }

    pub(crate) const fn record_hand_played(&mut self) {
        self.stats.hands_played += 1;
    }

    /// Credits the payout and folds every hand into the statistics.
    ///
    /// Nothing in here can fail, so balance and statistics always move
    /// together.
    pub(crate) fn apply_settlement(&mut self, settlement: &Settlement) {
        self.credit(settlement.total_payout);
        for hand in &settlement.hands {
            self.stats.record(hand.outcome, hand.profit());
        }
    }

    /// Records `hands` forfeited hands as losses.
    pub(crate) fn record_forfeit(&mut self, hands: usize) {
        for _ in 0..hands {
            self.stats.record(HandOutcome::Lose, 0);
        }
    }

    /// Returns when the next bonus can be claimed, if not right away.
    #[must_use]
    pub const fn next_bonus_at(&self, options: &BankrollOptions) -> Option<u64> {
        match self.last_daily_bonus {
            Some(last) => Some(last.saturating_add(options.daily_bonus_interval_secs)),
            None => None,
        }
    }

    /// Claims the daily bonus at unix time `now`.
    ///
    /// Returns the credited amount.
    ///
    /// # Errors
    ///
    /// Returns [`BonusError::NotYetAvailable`] if the last claim is more
    /// recent than the configured interval.
    pub fn claim_daily_bonus(
        &mut self,
        now: u64,
        options: &BankrollOptions,
    ) -> Result<u64, BonusError> {
        if let Some(next_claim_at) = self.next_bonus_at(options) {
            if now < next_claim_at {
                return Err(BonusError::NotYetAvailable { next_claim_at });
            }
        }

        self.credit(options.daily_bonus);
        self.last_daily_bonus = Some(now);
        Ok(options.daily_bonus)
    }
}
