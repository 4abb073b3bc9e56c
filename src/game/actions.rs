use rand::Rng;
use tracing::debug;

use crate::account::PlayerAccount;
use crate::card::Card;
use crate::error::{Action, GameError, Reason};
use crate::hand::{Hand, HandStatus};

use super::{HandSlot, RoundState, Seat, Table, TableEvent};

impl<R: Rng> Table<R> {
    /// Checks that the player may act on the active hand and returns it.
    fn ensure_player_turn(&self, action: Action) -> Result<&Hand, GameError> {
        self.expect_state(RoundState::PlayerTurn, action)?;

        match self.round.hand(self.round.active) {
            Some(hand) if hand.status() == HandStatus::Active => Ok(hand),
            _ => Err(self.invalid(action, Reason::HandFinished)),
        }
    }

    /// Adds an already drawn card to the active hand.
    fn give_active(&mut self, card: Card) {
        let slot = self.round.active;
        if let Some(hand) = self.round.hand_mut(slot) {
            hand.add_card(card);
        }
        debug!(?slot, card = %card, "player card");
        self.emit(TableEvent::CardDealt {
            seat: Seat::Player(slot),
            card: Some(card),
        });
    }

    /// Marks the active hand bust or charlie if it has become one. Returns
    /// `true` when the hand is finished.
    fn close_if_done(&mut self) -> bool {
        let threshold = self.options.charlie_cards;
        let slot = self.round.active;
        let Some(hand) = self.round.hand_mut(slot) else {
            return false;
        };

        let status = if hand.is_bust() {
            HandStatus::Bust
        } else if hand.is_charlie(threshold) {
            HandStatus::Charlie
        } else {
            return false;
        };
        hand.set_status(status);
        debug!(?slot, ?status, "hand finished");
        true
    }

    /// Moves play on from a finished hand: to the split hand if there is one
    /// waiting, otherwise to the dealer.
    fn advance(&mut self, account: &mut PlayerAccount) -> Result<(), GameError> {
        if self.round.active == HandSlot::Main && self.round.split_hand().is_some() {
            self.round.active = HandSlot::Split;
            self.emit(TableEvent::ActiveHandChanged {
                slot: HandSlot::Split,
            });
            return Ok(());
        }
        self.finish_player_turn(account)
    }

    /// Draws a card into the active hand.
    ///
    /// A hand that busts or reaches the charlie card count is finished and
    /// play moves on.
    ///
    /// # Errors
    ///
    /// Returns an error outside the player's turn, or if the shoe is
    /// exhausted under [`ExhaustionPolicy::Fail`](crate::ExhaustionPolicy::Fail).
    pub fn hit(&mut self, account: &mut PlayerAccount) -> Result<Card, GameError> {
        self.ensure_player_turn(Action::Hit)?;

        let card = self.draw()?;
        self.give_active(card);

        if self.close_if_done() {
            self.advance(account)?;
        }
        Ok(card)
    }

    /// Keeps the active hand as it is and moves play on.
    ///
    /// # Errors
    ///
    /// Returns an error outside the player's turn.
    pub fn stand(&mut self, account: &mut PlayerAccount) -> Result<RoundState, GameError> {
        self.ensure_player_turn(Action::Stand)?;

        let slot = self.round.active;
        if let Some(hand) = self.round.hand_mut(slot) {
            hand.set_status(HandStatus::Stood);
        }
        debug!(?slot, "stand");

        self.advance(account)?;
        Ok(self.round.state)
    }

    /// Doubles the active hand's bet, draws exactly one card and finishes the
    /// hand.
    ///
    /// # Errors
    ///
    /// Returns an error outside the player's turn, if the hand does not hold
    /// exactly two cards, if it is a split hand and doubling after a split is
    /// off, or if the balance does not cover the extra bet. Nothing changes on
    /// error.
    pub fn double_down(&mut self, account: &mut PlayerAccount) -> Result<Card, GameError> {
        let hand = self.ensure_player_turn(Action::DoubleDown)?;

        if hand.len() != 2 {
            return Err(self.invalid(Action::DoubleDown, Reason::NeedsTwoCards));
        }
        if hand.is_from_split() && !self.options.double_after_split {
            return Err(self.invalid(Action::DoubleDown, Reason::DoubleAfterSplit));
        }
        let extra = hand.bet();
        account.ensure_funds(extra)?;

        let card = self.draw()?;
        account.debit(extra)?;

        let slot = self.round.active;
        if let Some(hand) = self.round.hand_mut(slot) {
            hand.double_bet();
        }
        self.give_active(card);

        if !self.close_if_done() {
            if let Some(hand) = self.round.hand_mut(slot) {
                hand.set_status(HandStatus::Doubled);
            }
        }

        let bet = self.round.hand(slot).map_or(0, Hand::bet);
        debug!(?slot, bet, "doubled");
        self.emit(TableEvent::Doubled { slot, bet });

        self.advance(account)?;
        Ok(card)
    }

    /// Splits a pair into two hands.
    ///
    /// The second card moves to a new hand carrying a bet equal to the
    /// original, and the original hand is dealt a replacement card. The new
    /// hand receives its second card when the player hits it. Only the
    /// opening hand can be split, once per round.
    ///
    /// # Errors
    ///
    /// Returns an error outside the player's turn, if the round was already
    /// split, if the hand is not a two-card pair of equal value, or if the
    /// balance does not cover the second bet. Nothing changes on error.
    pub fn split(&mut self, account: &mut PlayerAccount) -> Result<(), GameError> {
        let hand = self.ensure_player_turn(Action::Split)?;

        if self.round.active != HandSlot::Main || self.round.split_hand().is_some() {
            return Err(self.invalid(Action::Split, Reason::AlreadySplit));
        }
        if hand.len() != 2 {
            return Err(self.invalid(Action::Split, Reason::NeedsTwoCards));
        }
        if !hand.can_split() {
            return Err(self.invalid(Action::Split, Reason::RanksDiffer));
        }
        let bet = hand.bet();
        account.ensure_funds(bet)?;

        let replacement = self.draw()?;
        account.debit(bet)?;

        let moved = self.round.hand_mut(HandSlot::Main).and_then(|main| {
            let card = main.take_split_card()?;
            main.mark_split();
            Some(card)
        });
        if let Some(card) = moved {
            debug!(bet, moved = %card, "split");
            self.round.hands.push(Hand::from_split(card, bet));
        }
        self.emit(TableEvent::Split { bet });
        self.give_active(replacement);

        if self.close_if_done() {
            self.advance(account)?;
        }
        Ok(())
    }
}
