//! A single-table blackjack engine with optional `no_std` support.
//!
//! [`Table`] runs the round state machine: betting, the opening deal,
//! insurance, hit/stand/double/split, dealer play and settlement. Chips live
//! in a [`PlayerAccount`] passed to each operation. [`Session`] wires a table
//! to an [`AchievementTracker`], a [`ProfileStore`] and a
//! [`NotificationSink`] for hosts that want persistence and notifications
//! handled for them.
//!
//! # Example
//!
//! ```
//! use bjtable::{PlayerAccount, RoundState, Table, TableOptions};
//!
//! let mut table = Table::new(TableOptions::default(), 42).unwrap();
//! let mut account = PlayerAccount::new(1000);
//!
//! table.place_bet(&mut account, 100).unwrap();
//! let state = table.start(&mut account).unwrap();
//! assert_ne!(state, RoundState::Betting);
//! assert_eq!(account.balance(), 900);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(all(not(feature = "std"), not(feature = "alloc")))]
compile_error!(
    "`std` is disabled but `alloc` feature is not enabled. Enable `alloc` or keep `std` enabled."
);

extern crate alloc;

pub mod account;
pub mod achievements;
pub mod card;
pub mod error;
pub mod game;
pub mod hand;
pub mod notify;
pub mod options;
pub mod payout;
pub mod persistence;
pub mod result;
pub mod session;
pub mod shoe;
mod sync;

pub use account::{PlayerAccount, Statistics};
pub use achievements::{Achievement, AchievementRule, AchievementTracker, DEFAULT_RULES, Trigger};
pub use card::{Card, DECK_SIZE, DealtCard, Rank, Suit};
pub use error::{Action, BonusError, GameError, PersistenceError, Reason, ShoeError};
pub use game::{HandSlot, Round, RoundSnapshot, RoundState, Seat, Table, TableEvent};
pub use hand::{DealerHand, Hand, HandStatus};
pub use notify::{Discard, EventLog, Notification, NotificationSink};
pub use options::{AbandonPolicy, BankrollOptions, ExhaustionPolicy, RoundingMode, TableOptions};
pub use persistence::{MemoryStore, ProfileRecord, ProfileStore, Transaction, TransactionKind};
pub use result::{HandOutcome, HandResult, InsuranceResult, Settlement};
pub use session::Session;
pub use shoe::Shoe;
