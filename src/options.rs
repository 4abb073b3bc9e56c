//! Table and bankroll configuration.

use serde::{Deserialize, Serialize};

use crate::hand::DEFAULT_CHARLIE_CARDS;

/// Rounding mode for payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Round up.
    Up,
    /// Round down.
    Down,
    /// Round to nearest.
    Nearest,
}

/// What to do when the shoe runs dry in the middle of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExhaustionPolicy {
    /// Rebuild the shoe from every card not on the table and keep dealing.
    #[default]
    Reshuffle,
    /// Report [`ShoeError::Exhausted`](crate::ShoeError::Exhausted) to the caller.
    Fail,
}

/// What happens to escrowed chips when a round is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AbandonPolicy {
    /// Return every escrowed chip to the balance.
    #[default]
    Refund,
    /// Keep the escrow and record each hand as lost.
    Forfeit,
}

/// Configuration options for a blackjack table.
///
/// Use the builder pattern to customize options:
///
/// ```
/// use bjtable::TableOptions;
///
/// let options = TableOptions::default()
///     .with_decks(8)
///     .with_charlie_cards(7)
///     .with_stand_on_soft_17(false);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Number of decks.
    pub decks: u8,
    /// Card count that makes an automatic charlie win.
    pub charlie_cards: usize,
    /// Blackjack profit ratio (typically 1.5).
    pub blackjack_pays: f64,
    /// Charlie profit ratio.
    pub charlie_pays: f64,
    /// Insurance profit ratio.
    pub insurance_pays: f64,
    /// Rounding mode for fractional payouts.
    pub rounding: RoundingMode,
    /// Whether dealer stands on soft 17.
    pub stand_on_soft_17: bool,
    /// Whether insurance is offered against an ace.
    pub offer_insurance: bool,
    /// Whether double down is allowed after split.
    pub double_after_split: bool,
    /// Deck penetration (fraction of the shoe played before reshuffle).
    /// 0 to disable reshuffling.
    pub penetration: f64,
    /// Behaviour when the shoe runs out mid-round.
    pub exhaustion: ExhaustionPolicy,
    /// Behaviour when a round is abandoned.
    pub abandon: AbandonPolicy,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            decks: 6,
            charlie_cards: DEFAULT_CHARLIE_CARDS,
            blackjack_pays: 1.5,
            charlie_pays: 2.0,
            insurance_pays: 2.0,
            rounding: RoundingMode::Down,
            stand_on_soft_17: true,
            offer_insurance: true,
            double_after_split: true,
            penetration: 0.75,
            exhaustion: ExhaustionPolicy::Reshuffle,
            abandon: AbandonPolicy::Refund,
        }
    }
}

impl TableOptions {
    /// Sets the number of decks.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::TableOptions;
    ///
    /// let options = TableOptions::default().with_decks(2);
    /// assert_eq!(options.decks, 2);
    /// ```
    #[must_use]
    pub const fn with_decks(mut self, decks: u8) -> Self {
        self.decks = decks;
        self
    }

    /// Sets the charlie card count.
    #[must_use]
    pub const fn with_charlie_cards(mut self, cards: usize) -> Self {
        self.charlie_cards = cards;
        self
    }

    /// Sets the blackjack profit ratio.
    #[must_use]
    pub const fn with_blackjack_pays(mut self, ratio: f64) -> Self {
        self.blackjack_pays = ratio;
        self
    }

    /// Sets the charlie profit ratio.
    #[must_use]
    pub const fn with_charlie_pays(mut self, ratio: f64) -> Self {
        self.charlie_pays = ratio;
        self
    }

    /// Sets the insurance profit ratio.
    #[must_use]
    pub const fn with_insurance_pays(mut self, ratio: f64) -> Self {
        self.insurance_pays = ratio;
        self
    }

    /// Sets the rounding mode for fractional payouts.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::{RoundingMode, TableOptions};
    ///
    /// let options = TableOptions::default().with_rounding(RoundingMode::Up);
    /// assert_eq!(options.rounding, RoundingMode::Up);
    /// ```
    #[must_use]
    pub const fn with_rounding(mut self, mode: RoundingMode) -> Self {
        self.rounding = mode;
        self
    }

    /// Sets whether dealer stands on soft 17.
    #[must_use]
    pub const fn with_stand_on_soft_17(mut self, stand: bool) -> Self {
        self.stand_on_soft_17 = stand;
        self
    }

    /// Sets whether insurance is offered.
    #[must_use]
    pub const fn with_insurance(mut self, offered: bool) -> Self {
        self.offer_insurance = offered;
        self
    }

    /// Sets whether double down is allowed after split.
    #[must_use]
    pub const fn with_double_after_split(mut self, allowed: bool) -> Self {
        self.double_after_split = allowed;
        self
    }

    /// Sets the deck penetration.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::TableOptions;
    ///
    /// let options = TableOptions::default().with_penetration(0.80);
    /// assert_eq!(options.penetration, 0.80);
    /// ```
    #[must_use]
    pub const fn with_penetration(mut self, penetration: f64) -> Self {
        self.penetration = penetration;
        self
    }

    /// Sets the exhaustion policy.
    #[must_use]
    pub const fn with_exhaustion(mut self, policy: ExhaustionPolicy) -> Self {
        self.exhaustion = policy;
        self
    }

    /// Sets the abandon policy.
    #[must_use]
    pub const fn with_abandon(mut self, policy: AbandonPolicy) -> Self {
        self.abandon = policy;
        self
    }
}

/// Starting chips and the daily bonus schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankrollOptions {
    /// Balance of a freshly created profile.
    pub starting_balance: u64,
    /// Chips credited by the daily bonus.
    pub daily_bonus: u64,
    /// Seconds between two bonus claims.
    pub daily_bonus_interval_secs: u64,
}

impl Default for BankrollOptions {
    fn default() -> Self {
        Self {
            starting_balance: 1000,
            daily_bonus: 500,
            daily_bonus_interval_secs: 24 * 60 * 60,
        }
    }
}

impl BankrollOptions {
    /// Sets the starting balance.
    #[must_use]
    pub const fn with_starting_balance(mut self, balance: u64) -> Self {
        self.starting_balance = balance;
        self
    }

    /// Sets the daily bonus amount.
    #[must_use]
    pub const fn with_daily_bonus(mut self, amount: u64) -> Self {
        self.daily_bonus = amount;
        self
    }

    /// Sets the interval between bonus claims.
    #[must_use]
    pub const fn with_daily_bonus_interval(mut self, secs: u64) -> Self {
        self.daily_bonus_interval_secs = secs;
        self
    }
}
