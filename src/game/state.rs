//! Round state types.

use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::hand::{DealerHand, Hand};
use crate::result::Settlement;

/// Round state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    /// Accepting bets for the next round.
    Betting,
    /// Dealing initial cards.
    Dealing,
    /// Waiting for the insurance decision.
    InsurancePending,
    /// Waiting for player actions.
    PlayerTurn,
    /// Dealer plays out their hand.
    DealerTurn,
    /// Hands are being settled.
    Evaluating,
    /// Round is settled; start the next one with `new_round`.
    GameOver,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Betting => "betting",
            Self::Dealing => "dealing",
            Self::InsurancePending => "insurance pending",
            Self::PlayerTurn => "player turn",
            Self::DealerTurn => "dealer turn",
            Self::Evaluating => "evaluating",
            Self::GameOver => "game over",
        })
    }
}

/// Which of the player's hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSlot {
    /// The hand dealt at the start of the round.
    #[default]
    Main,
    /// The hand created by a split.
    Split,
}

impl HandSlot {
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Main => 0,
            Self::Split => 1,
        }
    }

    pub(crate) const fn from_index(index: usize) -> Self {
        if index == 0 { Self::Main } else { Self::Split }
    }
}

/// Where a dealt card landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    /// One of the player's hands.
    Player(HandSlot),
    /// The dealer.
    Dealer,
}

/// Everything that belongs to the round in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub(crate) state: RoundState,
    /// Chips bet during the betting phase.
    pub(crate) wager: u64,
    pub(crate) insurance: u64,
    /// Player hands, main hand first.
    pub(crate) hands: Vec<Hand>,
    pub(crate) dealer: DealerHand,
    pub(crate) active: HandSlot,
    pub(crate) opening_balance: u64,
    pub(crate) result: Option<Settlement>,
}

impl Round {
    pub(crate) const fn new() -> Self {
        Self {
            state: RoundState::Betting,
            wager: 0,
            insurance: 0,
            hands: Vec::new(),
            dealer: DealerHand::new(),
            active: HandSlot::Main,
            opening_balance: 0,
            result: None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> RoundState {
        self.state
    }

    /// The opening wager on the main hand.
    #[must_use]
    pub const fn wager(&self) -> u64 {
        self.wager
    }

    /// Chips in escrow on the player's hands (doubles and splits included).
    ///
    /// Zero once the round is settled.
    #[must_use]
    pub fn bet(&self) -> u64 {
        if self.state == RoundState::GameOver {
            return 0;
        }
        if self.hands.is_empty() {
            self.wager
        } else {
            self.hands.iter().map(Hand::bet).sum()
        }
    }

    /// Chips in escrow on insurance.
    #[must_use]
    pub const fn insurance(&self) -> u64 {
        if matches!(self.state, RoundState::GameOver) {
            0
        } else {
            self.insurance
        }
    }

    /// All chips in escrow.
    #[must_use]
    pub fn escrowed(&self) -> u64 {
        self.bet() + self.insurance()
    }

    /// The player's hands, main hand first.
    #[must_use]
    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    /// The main hand, once dealt.
    #[must_use]
    pub fn main_hand(&self) -> Option<&Hand> {
        self.hands.first()
    }

    /// The split hand, if the player split.
    #[must_use]
    pub fn split_hand(&self) -> Option<&Hand> {
        self.hands.get(1)
    }

    /// Returns the hand in `slot`.
    #[must_use]
    pub fn hand(&self, slot: HandSlot) -> Option<&Hand> {
        self.hands.get(slot.index())
    }

    pub(crate) fn hand_mut(&mut self, slot: HandSlot) -> Option<&mut Hand> {
        self.hands.get_mut(slot.index())
    }

    /// The dealer's hand.
    #[must_use]
    pub const fn dealer(&self) -> &DealerHand {
        &self.dealer
    }

    /// The hand the player is acting on.
    #[must_use]
    pub const fn active(&self) -> HandSlot {
        self.active
    }

    /// Balance before the first chip of this round was bet.
    #[must_use]
    pub const fn opening_balance(&self) -> u64 {
        self.opening_balance
    }

    /// The settlement, once the round is over.
    #[must_use]
    pub const fn result(&self) -> Option<&Settlement> {
        self.result.as_ref()
    }

    /// Every card currently on the table.
    #[must_use]
    pub fn cards_in_play(&self) -> Vec<Card> {
        self.hands
            .iter()
            .flat_map(|h| h.cards().iter().copied())
            .chain(self.dealer.cards().iter().copied())
            .collect()
    }

    pub(crate) fn slotted_hands(&self) -> Vec<(HandSlot, &Hand)> {
        self.hands
            .iter()
            .enumerate()
            .map(|(index, hand)| (HandSlot::from_index(index), hand))
            .collect()
    }
}

impl Default for Round {
    fn default() -> Self {
        Self::new()
    }
}
