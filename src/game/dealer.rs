use rand::Rng;
use tracing::{debug, info};

use crate::account::PlayerAccount;
use crate::error::{Action, GameError};
use crate::payout;

use super::{RoundState, Seat, Table, TableEvent};

/// The dealer stands on this total.
const DEALER_STANDS_AT: u8 = 17;

impl<R: Rng> Table<R> {
    /// Ends the player's turn.
    ///
    /// The dealer only draws when at least one hand is still waiting on the
    /// dealer's total. Busted and charlie hands are already decided.
    pub(super) fn finish_player_turn(&mut self, account: &mut PlayerAccount) -> Result<(), GameError> {
        let contested = self
            .round
            .hands
            .iter()
            .any(|hand| hand.status().awaits_dealer());

        if contested {
            self.round.state = RoundState::DealerTurn;
            self.reveal_hole();
            self.play_dealer(account)
        } else {
            self.reveal_and_settle(account);
            Ok(())
        }
    }

    /// Continues a dealer turn that stopped because the shoe ran dry.
    ///
    /// Under [`ExhaustionPolicy::Fail`](crate::ExhaustionPolicy::Fail) a dealer
    /// draw can fail and leave the round in [`RoundState::DealerTurn`]. After
    /// [`Table::replace_shoe`] this picks the dealer's turn back up.
    ///
    /// # Errors
    ///
    /// Returns an error unless it is the dealer's turn, or if the shoe still
    /// cannot cover the dealer's draws.
    pub fn resume_dealer(&mut self, account: &mut PlayerAccount) -> Result<RoundState, GameError> {
        self.expect_state(RoundState::DealerTurn, Action::DealerPlay)?;
        self.reveal_hole();
        self.play_dealer(account)?;
        Ok(self.round.state)
    }

    fn dealer_must_draw(&self) -> bool {
        let dealer = &self.round.dealer;
        let value = dealer.value();
        value < DEALER_STANDS_AT
            || (value == DEALER_STANDS_AT && dealer.is_soft() && !self.options.stand_on_soft_17)
    }

    fn play_dealer(&mut self, account: &mut PlayerAccount) -> Result<(), GameError> {
        while self.dealer_must_draw() {
            let card = self.draw()?;
            self.round.dealer.add_card(card);
            debug!(card = %card, value = self.round.dealer.value(), "dealer draws");
            self.emit(TableEvent::CardDealt {
                seat: Seat::Dealer,
                card: Some(card),
            });
        }

        self.settle(account);
        Ok(())
    }

    fn reveal_hole(&mut self) {
        if self.round.dealer.reveal_hole() {
            if let Some(card) = self.round.dealer.hole_card() {
                debug!(card = %card, "hole card revealed");
                self.emit(TableEvent::HoleRevealed { card });
            }
        }
    }

    /// Turns the hole card over and settles without any dealer draws.
    pub(super) fn reveal_and_settle(&mut self, account: &mut PlayerAccount) {
        self.reveal_hole();
        self.settle(account);
    }

    fn settle(&mut self, account: &mut PlayerAccount) {
        self.round.state = RoundState::Evaluating;

        let settlement = payout::settle(
            &self.round.slotted_hands(),
            &self.round.dealer,
            self.round.insurance,
            self.round.wager,
            self.round.opening_balance,
            &self.options,
        );
        account.apply_settlement(&settlement);

        info!(
            net = settlement.net,
            payout = settlement.total_payout,
            dealer = settlement.dealer_value,
            balance = account.balance(),
            "round settled"
        );

        self.round.result = Some(settlement.clone());
        self.emit(TableEvent::Settled(settlement));
        self.round.state = RoundState::GameOver;
    }
}
