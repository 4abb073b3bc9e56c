//! Property tests for hand values and chip accounting.

use bjtable::hand::hand_value;
use bjtable::{
    Card, HandOutcome, HandSlot, PlayerAccount, Rank, RoundState, Suit, Table, TableOptions,
};
use proptest::prelude::*;

fn any_card() -> impl Strategy<Value = Card> {
    (0..Suit::ALL.len(), 0..Rank::ALL.len())
        .prop_map(|(suit, rank)| Card::new(Suit::ALL[suit], Rank::ALL[rank]))
}

/// Best total with each ace counted as 1 or 11.
fn best_total(cards: &[Card]) -> u32 {
    let hard: u32 = cards
        .iter()
        .map(|c| if c.is_ace() { 1 } else { u32::from(c.points()) })
        .sum();
    let aces = cards.iter().filter(|c| c.is_ace()).count() as u32;

    (0..=aces)
        .map(|high| hard + 10 * high)
        .filter(|total| *total <= 21)
        .max()
        .unwrap_or(hard)
}

fn play(table: &mut Table, account: &mut PlayerAccount, step: u8) {
    // Illegal moves are expected here; only their side effects matter.
    let _ = match step {
        0 => table.place_bet(account, 25).map(drop),
        1 => table.start(account).map(drop),
        2 | 3 => table.hit(account).map(drop),
        4 => table.stand(account).map(drop),
        5 => table.double_down(account).map(drop),
        6 => table.split(account).map(drop),
        7 => table.resolve_insurance(account, true).map(drop),
        8 => table.resolve_insurance(account, false).map(drop),
        _ => table.abandon(account).map(drop),
    };
}

proptest! {
    #[test]
    fn hand_value_is_best_total_under_22(cards in prop::collection::vec(any_card(), 0..12)) {
        prop_assert_eq!(u32::from(hand_value(&cards)), best_total(&cards));
    }

    #[test]
    fn chips_are_conserved(
        seed in any::<u64>(),
        steps in prop::collection::vec(0u8..10, 1..80),
    ) {
        let mut table = Table::new(TableOptions::default(), seed).unwrap();
        let mut account = PlayerAccount::new(1000);
        let mut total: u64 = 1000;

        for step in steps {
            play(&mut table, &mut account, step);

            if table.state() == RoundState::GameOver {
                let result = table.round().result().unwrap();
                total = total.checked_add_signed(result.net).unwrap();
                prop_assert_eq!(account.balance(), total);
                table.new_round().unwrap();
            } else {
                prop_assert_eq!(account.balance() + table.round().escrowed(), total);
            }
        }
    }

    #[test]
    fn settlements_follow_table_rules(
        seed in any::<u64>(),
        steps in prop::collection::vec(0u8..10, 1..80),
    ) {
        let mut table = Table::new(TableOptions::default(), seed).unwrap();
        let mut account = PlayerAccount::new(1000);

        for step in steps {
            play(&mut table, &mut account, step);
            if table.state() != RoundState::GameOver {
                continue;
            }

            let result = table.round().result().unwrap();
            let contested = result
                .hands
                .iter()
                .any(|h| {
                    matches!(
                        h.outcome,
                        HandOutcome::Win | HandOutcome::Lose | HandOutcome::Push
                    )
                });
            if contested {
                prop_assert!(result.dealer_value >= 17);
            }
            for hand in &result.hands {
                if hand.slot == HandSlot::Split {
                    prop_assert_ne!(hand.outcome, HandOutcome::Blackjack);
                }
                if hand.outcome == HandOutcome::Bust {
                    prop_assert_eq!(hand.payout, 0);
                }
            }
            prop_assert!(table.round().dealer().is_hole_revealed());
            table.new_round().unwrap();
        }
    }
}
