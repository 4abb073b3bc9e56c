//! Discrete table events.
//!
//! Every event is recorded after the state change it describes has been
//! committed. Front ends can replay them at their own pace to drive card
//! animations and sounds.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::result::Settlement;

use super::state::{HandSlot, Seat};

/// Something that happened at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableEvent {
    /// Chips moved into the wager.
    BetPlaced {
        /// Chips added.
        amount: u64,
        /// Wager after the bet.
        total: u64,
    },
    /// The wager was returned.
    BetCleared {
        /// Chips refunded.
        refunded: u64,
    },
    /// A card was dealt. `card` is `None` for the face-down hole card.
    CardDealt {
        /// Receiving seat.
        seat: Seat,
        /// The card, if dealt face up.
        card: Option<Card>,
    },
    /// The dealer turned over the hole card.
    HoleRevealed {
        /// The hole card.
        card: Card,
    },
    /// The dealer shows an ace.
    InsuranceOffered,
    /// The insurance decision was made.
    InsuranceResolved {
        /// Chips staked (zero when declined).
        stake: u64,
    },
    /// The pair was split into two hands.
    Split {
        /// Chips added for the new hand.
        bet: u64,
    },
    /// A hand was doubled.
    Doubled {
        /// The doubled hand.
        slot: HandSlot,
        /// Hand bet after doubling.
        bet: u64,
    },
    /// Play moved to another hand.
    ActiveHandChanged {
        /// The hand now in play.
        slot: HandSlot,
    },
    /// The shoe was rebuilt.
    Reshuffled {
        /// Cards in the rebuilt shoe.
        remaining: usize,
    },
    /// The round was settled.
    Settled(Settlement),
    /// The round was given up.
    Abandoned {
        /// Chips returned to the balance.
        refunded: u64,
        /// Chips kept by the house.
        forfeited: u64,
    },
}
