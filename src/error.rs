//! Error types for table, shoe and persistence operations.

use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::RoundState;

/// Operations a caller can attempt on a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Add chips to the wager.
    PlaceBet,
    /// Return the wager to the balance.
    ClearBet,
    /// Deal the opening cards.
    Start,
    /// Take or decline insurance.
    Insurance,
    /// Draw a card.
    Hit,
    /// Keep the current hand.
    Stand,
    /// Double the wager and draw one card.
    DoubleDown,
    /// Split a pair.
    Split,
    /// Let the dealer continue drawing.
    DealerPlay,
    /// Start the next round.
    NewRound,
    /// Give up the current round.
    Abandon,
    /// Rebuild the shoe.
    Reshuffle,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PlaceBet => "place bet",
            Self::ClearBet => "clear bet",
            Self::Start => "start",
            Self::Insurance => "resolve insurance",
            Self::Hit => "hit",
            Self::Stand => "stand",
            Self::DoubleDown => "double down",
            Self::Split => "split",
            Self::DealerPlay => "play dealer",
            Self::NewRound => "start new round",
            Self::Abandon => "abandon",
            Self::Reshuffle => "reshuffle",
        })
    }
}

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// The round is in the wrong state for this operation.
    WrongState,
    /// Bet amount is zero.
    ZeroBet,
    /// No bet has been placed.
    NoBet,
    /// The hand must hold exactly two cards.
    NeedsTwoCards,
    /// The two cards do not share a point value.
    RanksDiffer,
    /// The round already has a split hand.
    AlreadySplit,
    /// Doubling a split hand is disabled at this table.
    DoubleAfterSplit,
    /// The active hand can no longer act.
    HandFinished,
    /// There is no round in progress.
    NothingToAbandon,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WrongState => "not allowed in this state",
            Self::ZeroBet => "bet amount is zero",
            Self::NoBet => "no bet placed",
            Self::NeedsTwoCards => "hand must hold exactly two cards",
            Self::RanksDiffer => "cards do not match",
            Self::AlreadySplit => "hand already split",
            Self::DoubleAfterSplit => "doubling after a split is disabled",
            Self::HandFinished => "hand is finished",
            Self::NothingToAbandon => "no round in progress",
        })
    }
}

/// Errors raised by the shoe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShoeError {
    /// A shoe needs at least one deck.
    #[error("deck count must be at least one")]
    InvalidDeckCount,
    /// No cards left to deal.
    #[error("shoe exhausted")]
    Exhausted,
}

/// Errors raised by table operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// The operation is illegal right now.
    #[error("cannot {action} while {state}: {reason}")]
    InvalidOperation {
        /// The attempted operation.
        action: Action,
        /// The state the round was in.
        state: RoundState,
        /// The violated precondition.
        reason: Reason,
    },
    /// The balance does not cover the wager.
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Chips the operation needs.
        required: u64,
        /// Chips currently available.
        available: u64,
    },
    /// The shoe could not supply a card.
    #[error(transparent)]
    Shoe(#[from] ShoeError),
}

impl GameError {
    /// Shorthand for an [`GameError::InvalidOperation`].
    #[must_use]
    pub const fn invalid(action: Action, state: RoundState, reason: Reason) -> Self {
        Self::InvalidOperation {
            action,
            state,
            reason,
        }
    }
}

/// Errors raised by a [`ProfileStore`](crate::persistence::ProfileStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// The backend could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The stored profile changed since it was read.
    #[error("profile revision conflict: expected {expected}, found {found}")]
    Conflict {
        /// Revision the writer based its update on.
        expected: u64,
        /// Revision currently stored.
        found: u64,
    },
}

/// Errors raised when claiming the daily bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BonusError {
    /// The bonus was claimed too recently.
    #[error("daily bonus available again at {next_claim_at}")]
    NotYetAvailable {
        /// Unix time (seconds) of the next possible claim.
        next_claim_at: u64,
    },
}
