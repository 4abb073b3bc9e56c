use rand::Rng;
use tracing::{debug, info};

use crate::account::PlayerAccount;
use crate::error::{Action, GameError, Reason, ShoeError};
use crate::hand::Hand;
use crate::options::ExhaustionPolicy;

use super::{HandSlot, RoundState, Seat, Table, TableEvent};

/// Cards needed for the opening deal.
const OPENING_CARDS: usize = 4;

impl<R: Rng> Table<R> {
    /// Places a bet, moving `amount` from the balance into escrow.
    ///
    /// Bets accumulate until the round starts. Returns the total wager.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is not betting, the amount is zero, or
    /// the balance does not cover it. Nothing changes on error.
    pub fn place_bet(&mut self, account: &mut PlayerAccount, amount: u64) -> Result<u64, GameError> {
        self.expect_state(RoundState::Betting, Action::PlaceBet)?;

        if amount == 0 {
            return Err(self.invalid(Action::PlaceBet, Reason::ZeroBet));
        }

        let before = account.balance();
        account.debit(amount)?;

        if self.round.wager == 0 {
            self.round.opening_balance = before;
        }
        self.round.wager += amount;

        debug!(amount, total = self.round.wager, "bet placed");
        self.emit(TableEvent::BetPlaced {
            amount,
            total: self.round.wager,
        });

        Ok(self.round.wager)
    }

    /// Returns the whole wager to the balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is not betting or nothing was bet.
    pub fn clear_bet(&mut self, account: &mut PlayerAccount) -> Result<u64, GameError> {
        self.expect_state(RoundState::Betting, Action::ClearBet)?;

        let refunded = self.round.wager;
        if refunded == 0 {
            return Err(self.invalid(Action::ClearBet, Reason::NoBet));
        }

        account.credit(refunded);
        self.round.wager = 0;
        self.round.opening_balance = 0;

        debug!(refunded, "bet cleared");
        self.emit(TableEvent::BetCleared { refunded });

        Ok(refunded)
    }

    fn deal_to(&mut self, seat: Seat, hidden: bool) -> Result<(), GameError> {
        let card = self.draw()?;
        match seat {
            Seat::Dealer => self.round.dealer.add_card(card),
            Seat::Player(slot) => {
                if let Some(hand) = self.round.hand_mut(slot) {
                    hand.add_card(card);
                }
            }
        }

        debug!(?seat, card = %card, hidden, "card dealt");
        self.emit(TableEvent::CardDealt {
            seat,
            card: (!hidden).then_some(card),
        });
        Ok(())
    }

    /// Deals the opening cards: player, dealer up card, player, dealer hole
    /// card.
    ///
    /// Goes to [`RoundState::InsurancePending`] when the dealer shows an ace
    /// and insurance is offered. Otherwise a player blackjack is settled at
    /// once and anything else moves to [`RoundState::PlayerTurn`]. Returns the
    /// state the round ends up in.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is not betting, nothing was bet, or the
    /// shoe cannot cover the deal under [`ExhaustionPolicy::Fail`].
    pub fn start(&mut self, account: &mut PlayerAccount) -> Result<RoundState, GameError> {
        self.expect_state(RoundState::Betting, Action::Start)?;

        if self.round.wager == 0 {
            return Err(self.invalid(Action::Start, Reason::NoBet));
        }

        if self.shoe.remaining() < OPENING_CARDS {
            if self.options.exhaustion == ExhaustionPolicy::Fail {
                return Err(ShoeError::Exhausted.into());
            }
            self.shoe.reshuffle(&mut self.rng);
            self.emit(TableEvent::Reshuffled {
                remaining: self.shoe.remaining(),
            });
        }

        self.round.state = RoundState::Dealing;
        self.round.hands.clear();
        self.round.hands.push(Hand::new(self.round.wager));
        self.round.dealer.clear();
        self.round.active = HandSlot::Main;

        let main = Seat::Player(HandSlot::Main);
        self.deal_to(main, false)?;
        self.deal_to(Seat::Dealer, false)?;
        self.deal_to(main, false)?;
        self.deal_to(Seat::Dealer, true)?;

        account.record_hand_played();
        info!(
            wager = self.round.wager,
            remaining = self.shoe.remaining(),
            "round started"
        );

        let ace_up = self.round.dealer.up_card().is_some_and(|c| c.is_ace());
        if ace_up && self.options.offer_insurance {
            self.round.state = RoundState::InsurancePending;
            self.emit(TableEvent::InsuranceOffered);
            return Ok(self.round.state);
        }

        self.after_opening_deal(account)
    }

    /// Settles a natural right away, otherwise hands control to the player.
    pub(super) fn after_opening_deal(
        &mut self,
        account: &mut PlayerAccount,
    ) -> Result<RoundState, GameError> {
        let natural = self.round.main_hand().is_some_and(Hand::is_natural);

        if natural {
            info!("player blackjack");
            self.reveal_and_settle(account);
        } else {
            self.round.state = RoundState::PlayerTurn;
        }

        Ok(self.round.state)
    }
}
