use rand::Rng;
use tracing::debug;

use crate::account::PlayerAccount;
use crate::error::{Action, GameError};

use super::{RoundState, Table, TableEvent};

impl<R: Rng> Table<R> {
    /// Returns whether insurance is currently being offered.
    #[must_use]
    pub const fn is_insurance_offered(&self) -> bool {
        matches!(self.round.state, RoundState::InsurancePending)
    }

    /// The stake insurance would cost: half the wager, rounded down.
    #[must_use]
    pub const fn insurance_cost(&self) -> u64 {
        self.round.wager / 2
    }

    /// Takes or declines insurance, then continues the round.
    ///
    /// Taking insurance moves half the wager (rounded down) into escrow. The
    /// side bet pays if the dealer turns out to hold blackjack. Afterwards a
    /// player blackjack settles at once and anything else moves to the
    /// player's turn. Returns the resulting state.
    ///
    /// # Errors
    ///
    /// Returns an error if insurance is not pending or the balance does not
    /// cover the stake. Nothing changes on error.
    pub fn resolve_insurance(
        &mut self,
        account: &mut PlayerAccount,
        take: bool,
    ) -> Result<RoundState, GameError> {
        self.expect_state(RoundState::InsurancePending, Action::Insurance)?;

        let stake = if take { self.insurance_cost() } else { 0 };
        account.debit(stake)?;
        self.round.insurance = stake;

        debug!(take, stake, "insurance resolved");
        self.emit(TableEvent::InsuranceResolved { stake });

        self.after_opening_deal(account)
    }
}
