//! The multi-deck shoe cards are dealt from.

use alloc::vec::Vec;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::card::{Card, DECK_SIZE, DealtCard, Rank, Suit};
use crate::error::ShoeError;

/// A shuffled pool of one or more standard decks.
///
/// Cards are dealt from the back of the internal vector and never come back;
/// the only way to get more cards is to rebuild the shoe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shoe {
    cards: Vec<Card>,
    decks: u8,
}

fn fresh_cards(decks: u8) -> Vec<Card> {
    let mut cards = Vec::with_capacity(decks as usize * DECK_SIZE);

    for _ in 0..decks {
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(suit, rank));
            }
        }
    }

    cards
}

impl Shoe {
    /// Builds `decks` decks in suit × rank order and shuffles them.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::InvalidDeckCount`] if `decks` is zero.
    pub fn build<R: Rng + ?Sized>(decks: u8, rng: &mut R) -> Result<Self, ShoeError> {
        let mut shoe = Self::ordered(decks)?;
        shoe.cards.shuffle(rng);
        Ok(shoe)
    }

    /// Builds `decks` decks in suit × rank order without shuffling.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::InvalidDeckCount`] if `decks` is zero.
    pub fn ordered(decks: u8) -> Result<Self, ShoeError> {
        if decks == 0 {
            return Err(ShoeError::InvalidDeckCount);
        }

        Ok(Self {
            cards: fresh_cards(decks),
            decks,
        })
    }

    /// Builds a shoe that deals exactly `draws`, first element first.
    ///
    /// Useful for replaying a known sequence of cards.
    #[must_use]
    pub fn stacked(draws: &[Card]) -> Self {
        let mut cards = draws.to_vec();
        cards.reverse();
        let decks = draws.len().div_ceil(DECK_SIZE).clamp(1, u8::MAX as usize) as u8;
        Self { cards, decks }
    }

    /// Removes and returns the next card.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::Exhausted`] if the shoe is empty.
    pub fn draw(&mut self) -> Result<Card, ShoeError> {
        self.cards.pop().ok_or(ShoeError::Exhausted)
    }

    /// Removes the next card and wraps it for the table.
    ///
    /// # Errors
    ///
    /// Returns [`ShoeError::Exhausted`] if the shoe is empty.
    pub fn deal(&mut self, hidden: bool) -> Result<DealtCard, ShoeError> {
        let card = self.draw()?;
        Ok(DealtCard { card, hidden })
    }

    /// Number of cards left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Returns whether no cards are left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The remaining cards, last element dealt first.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of decks the shoe was built from.
    #[must_use]
    pub const fn deck_count(&self) -> u8 {
        self.decks
    }

    /// Number of cards in a full shoe.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.decks as usize * DECK_SIZE
    }

    /// Fraction of the shoe already dealt, between 0 and 1.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "f64 has sufficient precision for card counts"
    )]
    pub fn dealt_ratio(&self) -> f64 {
        let capacity = self.capacity();
        if capacity == 0 || self.remaining() >= capacity {
            return 0.0;
        }

        1.0 - (self.remaining() as f64 / capacity as f64)
    }

    /// Rebuilds the full shoe and shuffles it.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards = fresh_cards(self.decks);
        self.cards.shuffle(rng);
    }

    /// Rebuilds the shoe without the cards still on the table, then shuffles.
    ///
    /// Keeps each rank/suit combination within the multiplicity of the deck
    /// count while a round is in progress.
    pub fn refill_excluding<R: Rng + ?Sized>(&mut self, in_play: &[Card], rng: &mut R) {
        let mut cards = fresh_cards(self.decks);
        for card in in_play {
            if let Some(pos) = cards.iter().position(|c| c == card) {
                cards.swap_remove(pos);
            }
        }
        cards.shuffle(rng);
        self.cards = cards;
    }
}
