//! Round state machine for a single-player table.

use alloc::vec::Vec;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::account::PlayerAccount;
use crate::card::Card;
use crate::error::{Action, GameError, Reason, ShoeError};
use crate::options::{AbandonPolicy, ExhaustionPolicy, TableOptions};
use crate::shoe::Shoe;

mod actions;
mod bet;
mod dealer;
pub mod event;
mod insurance;
pub mod snapshot;
pub mod state;

pub use event::TableEvent;
pub use snapshot::RoundSnapshot;
pub use state::{HandSlot, Round, RoundState, Seat};

/// A blackjack table that runs one round at a time for one player.
///
/// The table owns the shoe and the round in progress. Chips live in a
/// [`PlayerAccount`] that the caller passes to every operation which moves
/// them, so the table never holds a balance of its own.
#[derive(Debug, Clone)]
pub struct Table<R = ChaCha8Rng> {
    /// Table rules.
    options: TableOptions,
    /// Cards left to deal.
    shoe: Shoe,
    /// Shuffle source.
    rng: R,
    /// The round in progress.
    round: Round,
    /// Events not yet drained by the caller.
    events: Vec<TableEvent>,
}

impl Table<ChaCha8Rng> {
    /// Creates a new table with a freshly shuffled shoe.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::InvalidDeckCount`] if `options.decks` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use bjtable::{Table, TableOptions};
    ///
    /// let table = Table::new(TableOptions::default(), 42).unwrap();
    /// assert_eq!(table.cards_remaining(), 312);
    /// ```
    pub fn new(options: TableOptions, seed: u64) -> Result<Self, ShoeError> {
        Self::with_rng(options, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Restores a table from a snapshot.
    #[must_use]
    pub fn resume(options: TableOptions, seed: u64, snapshot: RoundSnapshot) -> Self {
        Self::resume_with_rng(options, ChaCha8Rng::seed_from_u64(seed), snapshot)
    }
}

impl<R: Rng> Table<R> {
    /// Creates a new table that shuffles with `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::InvalidDeckCount`] if `options.decks` is zero.
    pub fn with_rng(options: TableOptions, mut rng: R) -> Result<Self, ShoeError> {
        let shoe = Shoe::build(options.decks, &mut rng)?;

        Ok(Self {
            options,
            shoe,
            rng,
            round: Round::new(),
            events: Vec::new(),
        })
    }

    /// Restores a table from a snapshot, shuffling future shoes with `rng`.
    #[must_use]
    pub fn resume_with_rng(options: TableOptions, rng: R, snapshot: RoundSnapshot) -> Self {
        Self {
            options,
            shoe: snapshot.shoe,
            rng,
            round: snapshot.round,
            events: Vec::new(),
        }
    }

    /// Table rules.
    #[must_use]
    pub const fn options(&self) -> &TableOptions {
        &self.options
    }

    /// The round in progress.
    #[must_use]
    pub const fn round(&self) -> &Round {
        &self.round
    }

    /// Returns the current round state.
    #[must_use]
    pub const fn state(&self) -> RoundState {
        self.round.state
    }

    /// Returns the number of cards remaining in the shoe.
    #[must_use]
    pub fn cards_remaining(&self) -> usize {
        self.shoe.remaining()
    }

    /// The shoe.
    #[must_use]
    pub const fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    /// Replaces the shoe, e.g. to restock after an exhaustion error or to
    /// replay a known card sequence.
    pub fn replace_shoe(&mut self, shoe: Shoe) {
        self.shoe = shoe;
    }

    /// Takes the events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        core::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: TableEvent) {
        self.events.push(event);
    }

    fn expect_state(&self, expected: RoundState, action: Action) -> Result<(), GameError> {
        if self.round.state != expected {
            return Err(GameError::invalid(
                action,
                self.round.state,
                Reason::WrongState,
            ));
        }
        Ok(())
    }

    fn invalid(&self, action: Action, reason: Reason) -> GameError {
        GameError::invalid(action, self.round.state, reason)
    }

    /// Draws a card, refilling the shoe if the policy allows it.
    fn draw(&mut self) -> Result<Card, GameError> {
        match self.shoe.draw() {
            Ok(card) => Ok(card),
            Err(ShoeError::Exhausted) if self.options.exhaustion == ExhaustionPolicy::Reshuffle => {
                let in_play = self.round.cards_in_play();
                self.shoe.refill_excluding(&in_play, &mut self.rng);
                warn!(
                    remaining = self.shoe.remaining(),
                    "shoe exhausted mid-round, refilled"
                );
                self.emit(TableEvent::Reshuffled {
                    remaining: self.shoe.remaining(),
                });
                Ok(self.shoe.draw()?)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns whether the shoe needs reshuffling based on penetration.
    ///
    /// If penetration is 0, always returns `false`.
    #[must_use]
    pub fn needs_reshuffle(&self) -> bool {
        if self.options.penetration <= 0.0 {
            return false;
        }
        self.shoe.dealt_ratio() >= self.options.penetration
    }

    /// Rebuilds and shuffles the full shoe.
    ///
    /// # Errors
    ///
    /// Returns an error unless the table is betting.
    pub fn reshuffle(&mut self) -> Result<(), GameError> {
        self.expect_state(RoundState::Betting, Action::Reshuffle)?;
        self.shoe.reshuffle(&mut self.rng);
        info!(remaining = self.shoe.remaining(), "shoe reshuffled");
        self.emit(TableEvent::Reshuffled {
            remaining: self.shoe.remaining(),
        });
        Ok(())
    }

    /// Clears the finished round and returns to betting.
    ///
    /// Reshuffles first when the shoe has passed its penetration. Returns
    /// `true` if a reshuffle was performed.
    ///
    /// # Errors
    ///
    /// Returns an error unless the round is over.
    pub fn new_round(&mut self) -> Result<bool, GameError> {
        self.expect_state(RoundState::GameOver, Action::NewRound)?;
        self.round = Round::new();

        if self.needs_reshuffle() {
            self.reshuffle()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Gives up the current round and returns to betting.
    ///
    /// During betting this simply returns the wager. Later on, the escrow is
    /// refunded or forfeited according to [`TableOptions::abandon`]; forfeited
    /// hands count as losses. Returns the refunded amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the round is already over.
    pub fn abandon(&mut self, account: &mut PlayerAccount) -> Result<u64, GameError> {
        match self.round.state {
            RoundState::GameOver => Err(self.invalid(Action::Abandon, Reason::NothingToAbandon)),
            RoundState::Betting => {
                let refunded = self.round.wager;
                account.credit(refunded);
                self.round = Round::new();
                if refunded > 0 {
                    self.emit(TableEvent::Abandoned {
                        refunded,
                        forfeited: 0,
                    });
                }
                Ok(refunded)
            }
            state => {
                let escrow = self.round.escrowed();
                let (refunded, forfeited) = match self.options.abandon {
                    AbandonPolicy::Refund => {
                        account.credit(escrow);
                        (escrow, 0)
                    }
                    AbandonPolicy::Forfeit => {
                        account.record_forfeit(self.round.hands.len().max(1));
                        (0, escrow)
                    }
                };
                info!(%state, refunded, forfeited, "round abandoned");
                self.round = Round::new();
                self.emit(TableEvent::Abandoned {
                    refunded,
                    forfeited,
                });
                debug!(remaining = self.shoe.remaining(), "table back to betting");
                Ok(refunded)
            }
        }
    }

    /// Captures the table so the round can be resumed later.
    #[must_use]
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            round: self.round.clone(),
            shoe: self.shoe.clone(),
        }
    }
}
