//! Settlement arithmetic.
//!
//! [`settle`] is pure: it reads the finished hands and produces a
//! [`Settlement`]. Applying it to an account happens in one step afterwards.

use alloc::vec::Vec;

use crate::game::HandSlot;
use crate::hand::{DealerHand, Hand};
use crate::options::{RoundingMode, TableOptions};
use crate::result::{HandOutcome, HandResult, InsuranceResult, Settlement};

#[cfg(feature = "std")]
fn round_amount(amount: f64, mode: RoundingMode) -> u64 {
    match mode {
        RoundingMode::Up => amount.ceil() as u64,
        RoundingMode::Down => amount.floor() as u64,
        RoundingMode::Nearest => amount.round() as u64,
    }
}

#[cfg(all(not(feature = "std"), feature = "alloc"))]
fn round_amount(amount: f64, mode: RoundingMode) -> u64 {
    match mode {
        RoundingMode::Up => libm::ceil(amount) as u64,
        RoundingMode::Down => libm::floor(amount) as u64,
        RoundingMode::Nearest => libm::round(amount) as u64,
    }
}

/// Profit for `stake` at `ratio`, rounded per `mode`.
#[must_use]
pub fn profit(stake: u64, ratio: f64, mode: RoundingMode) -> u64 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "f64 has sufficient precision for chip amounts"
    )]
    let raw = stake as f64 * ratio;
    round_amount(raw, mode)
}

/// Outcome and total return (stake included) of one player hand.
#[must_use]
pub fn hand_outcome(hand: &Hand, dealer: &DealerHand, options: &TableOptions) -> (HandOutcome, u64) {
    let bet = hand.bet();

    if hand.is_natural() {
        return if dealer.is_blackjack() {
            (HandOutcome::Push, bet)
        } else {
            let won = profit(bet, options.blackjack_pays, options.rounding);
            (HandOutcome::Blackjack, bet + won)
        };
    }

    if hand.is_bust() {
        return (HandOutcome::Bust, 0);
    }

    if hand.is_charlie(options.charlie_cards) {
        let won = profit(bet, options.charlie_pays, options.rounding);
        return (HandOutcome::Charlie, bet + won);
    }

    if dealer.is_bust() {
        return (HandOutcome::Win, bet * 2);
    }

    match hand.value().cmp(&dealer.value()) {
        core::cmp::Ordering::Greater => (HandOutcome::Win, bet * 2),
        core::cmp::Ordering::Less => (HandOutcome::Lose, 0),
        core::cmp::Ordering::Equal => (HandOutcome::Push, bet),
    }
}

/// Insurance result for `stake` against the dealer's final hand.
#[must_use]
pub fn insurance_outcome(stake: u64, dealer: &DealerHand, options: &TableOptions) -> InsuranceResult {
    let payout = if dealer.is_blackjack() {
        stake + profit(stake, options.insurance_pays, options.rounding)
    } else {
        0
    };
    InsuranceResult { stake, payout }
}

/// Settles every hand in `hands` against `dealer`.
///
/// `hands` pairs each hand with its slot, main hand first. Insurance is
/// settled only when `insurance` is non-zero.
#[must_use]
pub fn settle(
    hands: &[(HandSlot, &Hand)],
    dealer: &DealerHand,
    insurance: u64,
    wager: u64,
    opening_balance: u64,
    options: &TableOptions,
) -> Settlement {
    let dealer_value = dealer.value();
    let mut results = Vec::with_capacity(hands.len());
    let mut total_payout: u64 = 0;

    for &(slot, hand) in hands {
        let (outcome, payout) = hand_outcome(hand, dealer, options);
        total_payout += payout;
        results.push(HandResult {
            slot,
            outcome,
            bet: hand.bet(),
            payout,
            player_value: hand.value(),
            cards: hand.len(),
        });
    }

    let insurance = (insurance > 0).then(|| insurance_outcome(insurance, dealer, options));
    if let Some(side) = insurance {
        total_payout += side.payout;
    }

    let mut settlement = Settlement {
        hands: results,
        insurance,
        dealer_value,
        dealer_bust: dealer.is_bust(),
        dealer_blackjack: dealer.is_blackjack(),
        wager,
        opening_balance,
        total_payout,
        net: 0,
    };
    #[expect(clippy::cast_possible_wrap, reason = "chip totals fit in i64")]
    let net = total_payout as i64 - settlement.total_staked() as i64;
    settlement.net = net;
    settlement
}
