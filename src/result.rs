//! Settlement result types.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::game::HandSlot;

/// Result of a single hand after settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandOutcome {
    /// Natural blackjack against a dealer without one.
    Blackjack,
    /// Charlie card count reached without busting.
    Charlie,
    /// Player beat the dealer or the dealer busted.
    Win,
    /// Tie, bet returned.
    Push,
    /// Dealer finished higher.
    Lose,
    /// Player went over 21.
    Bust,
}

impl HandOutcome {
    /// Returns whether the outcome pays a profit.
    #[must_use]
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Blackjack | Self::Charlie | Self::Win)
    }

    /// Returns whether the bet was forfeited.
    #[must_use]
    pub const fn is_loss(self) -> bool {
        matches!(self, Self::Lose | Self::Bust)
    }
}

/// Result for a single hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResult {
    /// Which hand this is.
    pub slot: HandSlot,
    /// The outcome of the hand.
    pub outcome: HandOutcome,
    /// The bet amount for this hand (doubled bets included).
    pub bet: u64,
    /// Chips returned to the balance, stake included.
    pub payout: u64,
    /// The player's hand value.
    pub player_value: u8,
    /// Number of cards in the hand.
    pub cards: usize,
}

impl HandResult {
    /// Chips won on top of the stake, zero unless the hand won.
    #[must_use]
    pub const fn profit(&self) -> u64 {
        self.payout.saturating_sub(self.bet)
    }
}

/// Result of the insurance side bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceResult {
    /// Chips staked on insurance.
    pub stake: u64,
    /// Chips returned, stake included (zero when the dealer had no blackjack).
    pub payout: u64,
}

/// Result of a settled round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// One entry per hand in play, main hand first.
    pub hands: Vec<HandResult>,
    /// Insurance outcome, if insurance was taken.
    pub insurance: Option<InsuranceResult>,
    /// The dealer's final hand value.
    pub dealer_value: u8,
    /// Whether the dealer busted.
    pub dealer_bust: bool,
    /// Whether the dealer had blackjack.
    pub dealer_blackjack: bool,
    /// The opening wager on the main hand.
    pub wager: u64,
    /// Balance before the first chip of this round was bet.
    pub opening_balance: u64,
    /// Total chips returned to the balance.
    pub total_payout: u64,
    /// Net result (positive = profit, negative = loss).
    pub net: i64,
}

impl Settlement {
    /// Total chips that were at stake, insurance included.
    #[must_use]
    pub fn total_staked(&self) -> u64 {
        self.hands.iter().map(|h| h.bet).sum::<u64>() + self.insurance.map_or(0, |i| i.stake)
    }

    /// Number of winning hands.
    #[must_use]
    pub fn hands_won(&self) -> usize {
        self.hands.iter().filter(|h| h.outcome.is_win()).count()
    }

    /// Number of blackjack hands.
    #[must_use]
    pub fn blackjacks(&self) -> usize {
        self.hands
            .iter()
            .filter(|h| h.outcome == HandOutcome::Blackjack)
            .count()
    }
}
