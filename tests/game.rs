//! Table integration tests.

use bjtable::hand::{hand_value, is_blackjack, is_bust, is_charlie, is_soft};
use bjtable::payout::profit;
use bjtable::{
    AbandonPolicy, Action, Card, DECK_SIZE, DealerHand, ExhaustionPolicy, GameError, Hand,
    HandOutcome, HandSlot, HandStatus, PlayerAccount, Rank, Reason, RoundSnapshot, RoundState,
    RoundingMode, Seat, Shoe, ShoeError, Suit, Table, TableEvent, TableOptions,
};

const fn card(suit: Suit, rank: Rank) -> Card {
    Card::new(suit, rank)
}

const fn spade(rank: Rank) -> Card {
    card(Suit::Spades, rank)
}

fn table_with(options: TableOptions, draws: &[Card]) -> Table {
    let mut table = Table::new(options, 7).unwrap();
    table.replace_shoe(Shoe::stacked(draws));
    table
}

fn no_insurance() -> TableOptions {
    TableOptions::default().with_insurance(false)
}

fn escrow_conserved(table: &Table, account: &PlayerAccount, total: u64) {
    assert_eq!(account.balance() + table.round().escrowed(), total);
}

#[test]
fn hand_values_count_aces_high_then_low() {
    assert_eq!(hand_value(&[spade(Rank::Ace), spade(Rank::King)]), 21);
    assert_eq!(hand_value(&[spade(Rank::Ace), spade(Rank::Ace)]), 12);
    assert_eq!(
        hand_value(&[spade(Rank::Ace), spade(Rank::Ace), spade(Rank::Nine)]),
        21
    );
    assert_eq!(
        hand_value(&[spade(Rank::King), spade(Rank::Queen), spade(Rank::Five)]),
        25
    );
    assert_eq!(hand_value(&[]), 0);

    assert!(is_soft(&[spade(Rank::Ace), spade(Rank::Six)]));
    assert!(!is_soft(&[spade(Rank::Ace), spade(Rank::Six), spade(Rank::Nine)]));
    assert!(is_blackjack(&[spade(Rank::Jack), spade(Rank::Ace)]));
    assert!(!is_blackjack(&[
        spade(Rank::Five),
        spade(Rank::Six),
        spade(Rank::King)
    ]));
    assert!(is_bust(&[spade(Rank::King), spade(Rank::Queen), spade(Rank::Two)]));

    let five_small = [
        spade(Rank::Two),
        spade(Rank::Three),
        spade(Rank::Two),
        spade(Rank::Four),
        spade(Rank::Two),
    ];
    assert!(is_charlie(&five_small, 5));
    assert!(!is_charlie(&five_small, 7));
}

#[test]
fn split_hand_twenty_one_is_not_natural() {
    let mut hand = Hand::from_split(spade(Rank::Ace), 10);
    hand.add_card(spade(Rank::King));
    assert!(hand.is_blackjack());
    assert!(!hand.is_natural());
    assert_eq!(hand.status(), HandStatus::Active);
}

#[test]
fn dealer_hand_hides_hole_card() {
    let mut dealer = DealerHand::new();
    dealer.add_card(spade(Rank::Ace));
    dealer.add_card(card(Suit::Clubs, Rank::Six));

    assert!(!dealer.is_hole_revealed());
    assert_eq!(dealer.visible_value(), 11);
    assert!(dealer.table_view()[1].hidden);
    assert!(dealer.table_view()[1].visible().is_none());

    assert!(dealer.reveal_hole());
    assert!(!dealer.reveal_hole());
    assert_eq!(dealer.visible_value(), 17);
    assert!(dealer.is_soft());
}

#[test]
fn payout_rounding_modes() {
    assert_eq!(profit(15, 1.5, RoundingMode::Down), 22);
    assert_eq!(profit(15, 1.5, RoundingMode::Up), 23);
    assert_eq!(profit(15, 1.5, RoundingMode::Nearest), 23);
    assert_eq!(profit(100, 1.5, RoundingMode::Down), 150);
}

#[test]
fn default_shoe_holds_six_decks() {
    let table = Table::new(TableOptions::default(), 1).unwrap();
    assert_eq!(table.cards_remaining(), 312);
    assert_eq!(table.shoe().capacity(), 6 * DECK_SIZE);
    assert_eq!(table.shoe().deck_count(), 6);

    let err = Table::new(TableOptions::default().with_decks(0), 1).unwrap_err();
    assert_eq!(err, ShoeError::InvalidDeckCount);
}

#[test]
fn shoe_holds_each_card_once_per_deck() {
    let shoe = Shoe::ordered(2).unwrap();
    let aces = shoe
        .cards()
        .iter()
        .filter(|c| **c == card(Suit::Hearts, Rank::Ace))
        .count();
    assert_eq!(aces, 2);
    assert_eq!(shoe.remaining(), 104);
}

#[test]
fn stacked_shoe_deals_in_order() {
    let mut shoe = Shoe::stacked(&[spade(Rank::Two), spade(Rank::Three)]);
    assert_eq!(shoe.draw().unwrap(), spade(Rank::Two));
    assert_eq!(shoe.draw().unwrap(), spade(Rank::Three));
    assert_eq!(shoe.draw().unwrap_err(), ShoeError::Exhausted);
}

#[test]
fn dealt_card_keeps_face_down_card() {
    let mut shoe = Shoe::stacked(&[spade(Rank::King), spade(Rank::Ace)]);

    let up = shoe.deal(false).unwrap();
    assert_eq!(up.visible(), Some(spade(Rank::King)));

    let down = shoe.deal(true).unwrap();
    assert!(down.hidden);
    assert_eq!(down.visible(), None);
    assert_eq!(down.card, spade(Rank::Ace));
    assert!(shoe.is_empty());
}

#[test]
fn bet_and_clear_round_trip() {
    let mut table = Table::new(TableOptions::default(), 1).unwrap();
    let mut account = PlayerAccount::new(1000);

    assert_eq!(table.place_bet(&mut account, 30).unwrap(), 30);
    assert_eq!(table.place_bet(&mut account, 20).unwrap(), 50);
    assert_eq!(account.balance(), 950);
    escrow_conserved(&table, &account, 1000);

    assert_eq!(table.clear_bet(&mut account).unwrap(), 50);
    assert_eq!(account.balance(), 1000);
    assert_eq!(table.round().bet(), 0);

    assert_eq!(
        table.clear_bet(&mut account).unwrap_err(),
        GameError::invalid(Action::ClearBet, RoundState::Betting, Reason::NoBet)
    );
}

#[test]
fn bet_rejections_leave_state_untouched() {
    let mut table = Table::new(TableOptions::default(), 1).unwrap();
    let mut account = PlayerAccount::new(50);

    assert_eq!(
        table.place_bet(&mut account, 100).unwrap_err(),
        GameError::InsufficientFunds {
            required: 100,
            available: 50
        }
    );
    assert_eq!(account.balance(), 50);
    assert_eq!(table.round().bet(), 0);
    assert_eq!(table.state(), RoundState::Betting);

    assert_eq!(
        table.place_bet(&mut account, 0).unwrap_err(),
        GameError::invalid(Action::PlaceBet, RoundState::Betting, Reason::ZeroBet)
    );
    assert_eq!(
        table.start(&mut account).unwrap_err(),
        GameError::invalid(Action::Start, RoundState::Betting, Reason::NoBet)
    );
}

#[test]
fn operations_rejected_in_wrong_state() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Five),
            spade(Rank::Nine),
            spade(Rank::Six),
            spade(Rank::Eight),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    assert_eq!(
        table.hit(&mut account).unwrap_err(),
        GameError::invalid(Action::Hit, RoundState::Betting, Reason::WrongState)
    );
    assert_eq!(
        table.new_round().unwrap_err(),
        GameError::invalid(Action::NewRound, RoundState::Betting, Reason::WrongState)
    );

    table.place_bet(&mut account, 100).unwrap();
    assert_eq!(table.start(&mut account).unwrap(), RoundState::PlayerTurn);

    assert_eq!(
        table.place_bet(&mut account, 10).unwrap_err(),
        GameError::invalid(Action::PlaceBet, RoundState::PlayerTurn, Reason::WrongState)
    );
    assert_eq!(
        table.resolve_insurance(&mut account, true).unwrap_err(),
        GameError::invalid(Action::Insurance, RoundState::PlayerTurn, Reason::WrongState)
    );
    assert_eq!(
        table.reshuffle().unwrap_err(),
        GameError::invalid(Action::Reshuffle, RoundState::PlayerTurn, Reason::WrongState)
    );
    assert_eq!(
        table.resume_dealer(&mut account).unwrap_err(),
        GameError::invalid(Action::DealerPlay, RoundState::PlayerTurn, Reason::WrongState)
    );
    assert_eq!(account.balance(), 900);
}

#[test]
fn start_emits_opening_deal_with_hidden_hole_card() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Five),
            spade(Rank::Nine),
            spade(Rank::Six),
            spade(Rank::Eight),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();

    let main = Seat::Player(HandSlot::Main);
    assert_eq!(
        table.drain_events(),
        vec![
            TableEvent::BetPlaced {
                amount: 100,
                total: 100
            },
            TableEvent::CardDealt {
                seat: main,
                card: Some(spade(Rank::Five))
            },
            TableEvent::CardDealt {
                seat: Seat::Dealer,
                card: Some(spade(Rank::Nine))
            },
            TableEvent::CardDealt {
                seat: main,
                card: Some(spade(Rank::Six))
            },
            TableEvent::CardDealt {
                seat: Seat::Dealer,
                card: None
            },
        ]
    );
    assert!(table.drain_events().is_empty());
    assert_eq!(account.stats().hands_played, 1);
}

#[test]
fn natural_blackjack_pays_three_to_two() {
    let mut table = table_with(
        TableOptions::default(),
        &[
            spade(Rank::Ace),
            spade(Rank::Nine),
            spade(Rank::King),
            spade(Rank::Seven),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    assert_eq!(table.start(&mut account).unwrap(), RoundState::GameOver);

    let result = table.round().result().unwrap();
    assert_eq!(result.hands[0].outcome, HandOutcome::Blackjack);
    assert_eq!(result.hands[0].payout, 250);
    assert_eq!(result.net, 150);
    assert_eq!(result.dealer_value, 16);
    assert_eq!(table.round().dealer().len(), 2);
    assert_eq!(account.balance(), 1150);
    assert_eq!(account.stats().blackjacks, 1);
    assert_eq!(account.stats().hands_won, 1);
    assert_eq!(account.stats().current_streak, 1);
    assert_eq!(account.stats().biggest_win, 150);
}

#[test]
fn natural_against_dealer_blackjack_pushes() {
    let mut table = table_with(
        TableOptions::default(),
        &[
            spade(Rank::Ace),
            spade(Rank::King),
            card(Suit::Hearts, Rank::King),
            card(Suit::Hearts, Rank::Ace),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    assert_eq!(table.start(&mut account).unwrap(), RoundState::GameOver);

    let result = table.round().result().unwrap();
    assert_eq!(result.hands[0].outcome, HandOutcome::Push);
    assert!(result.dealer_blackjack);
    assert_eq!(account.balance(), 1000);
}

#[test]
fn twenty_one_after_hit_pays_even_money() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Five),
            spade(Rank::Nine),
            spade(Rank::Six),
            spade(Rank::Eight),
            spade(Rank::King),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();

    assert_eq!(table.hit(&mut account).unwrap(), spade(Rank::King));
    assert_eq!(table.round().main_hand().unwrap().value(), 21);
    assert_eq!(table.state(), RoundState::PlayerTurn);

    assert_eq!(table.stand(&mut account).unwrap(), RoundState::GameOver);
    let result = table.round().result().unwrap();
    assert_eq!(result.hands[0].outcome, HandOutcome::Win);
    assert_eq!(result.hands[0].payout, 200);
    assert_eq!(result.dealer_value, 17);
    assert_eq!(account.balance(), 1100);
    assert_eq!(account.stats().blackjacks, 0);
}

#[test]
fn five_card_charlie_wins_without_dealer_draw() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Two),
            spade(Rank::Ten),
            spade(Rank::Three),
            spade(Rank::Nine),
            card(Suit::Hearts, Rank::Two),
            card(Suit::Clubs, Rank::Two),
            spade(Rank::Four),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    table.hit(&mut account).unwrap();
    table.hit(&mut account).unwrap();
    assert_eq!(table.state(), RoundState::PlayerTurn);
    table.hit(&mut account).unwrap();

    assert_eq!(table.state(), RoundState::GameOver);
    let result = table.round().result().unwrap();
    assert_eq!(result.hands[0].outcome, HandOutcome::Charlie);
    assert_eq!(result.hands[0].payout, 300);
    assert_eq!(result.dealer_value, 19);
    assert!(table.round().dealer().is_hole_revealed());
    assert_eq!(account.balance(), 1200);
}

#[test]
fn seven_card_charlie_variant() {
    let options = no_insurance().with_charlie_cards(7);
    let mut table = table_with(
        options,
        &[
            spade(Rank::Two),
            spade(Rank::Ten),
            spade(Rank::Three),
            spade(Rank::Nine),
            card(Suit::Hearts, Rank::Two),
            card(Suit::Clubs, Rank::Two),
            spade(Rank::Four),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    for _ in 0..3 {
        table.hit(&mut account).unwrap();
    }
    assert_eq!(table.state(), RoundState::PlayerTurn);
    assert_eq!(table.round().main_hand().unwrap().value(), 13);
}

#[test]
fn bust_loses_and_resets_streak() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Ten),
            spade(Rank::Nine),
            spade(Rank::Six),
            spade(Rank::Eight),
            spade(Rank::King),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    table.hit(&mut account).unwrap();

    assert_eq!(table.state(), RoundState::GameOver);
    let result = table.round().result().unwrap();
    assert_eq!(result.hands[0].outcome, HandOutcome::Bust);
    assert_eq!(table.round().dealer().len(), 2);
    assert_eq!(account.balance(), 900);
    assert_eq!(account.stats().hands_lost, 1);
    assert_eq!(account.stats().current_streak, 0);
}

#[test]
fn insurance_pays_when_dealer_has_blackjack() {
    let mut table = table_with(
        TableOptions::default(),
        &[
            spade(Rank::Ten),
            spade(Rank::Ace),
            spade(Rank::Nine),
            spade(Rank::King),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    assert_eq!(
        table.start(&mut account).unwrap(),
        RoundState::InsurancePending
    );
    assert!(table.is_insurance_offered());
    assert_eq!(table.insurance_cost(), 50);

    assert_eq!(
        table.resolve_insurance(&mut account, true).unwrap(),
        RoundState::PlayerTurn
    );
    assert_eq!(account.balance(), 850);
    assert_eq!(table.round().insurance(), 50);
    escrow_conserved(&table, &account, 1000);

    table.stand(&mut account).unwrap();
    let result = table.round().result().unwrap();
    assert_eq!(result.hands[0].outcome, HandOutcome::Lose);
    let insurance = result.insurance.unwrap();
    assert_eq!(insurance.stake, 50);
    assert_eq!(insurance.payout, 150);
    assert_eq!(result.total_staked(), 150);
    assert_eq!(result.net, 0);
    assert_eq!(account.balance(), 1000);
}

#[test]
fn declined_insurance_costs_nothing() {
    let mut table = table_with(
        TableOptions::default(),
        &[
            spade(Rank::Ten),
            spade(Rank::Ace),
            spade(Rank::Nine),
            spade(Rank::Seven),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    table.resolve_insurance(&mut account, false).unwrap();
    assert_eq!(account.balance(), 900);

    table.stand(&mut account).unwrap();
    let result = table.round().result().unwrap();
    assert!(result.insurance.is_none());
    assert_eq!(result.dealer_value, 18);
    assert_eq!(result.hands[0].outcome, HandOutcome::Win);
    assert_eq!(account.balance(), 1100);
}

#[test]
fn insurance_rejected_without_funds() {
    let mut table = table_with(
        TableOptions::default(),
        &[
            spade(Rank::Ten),
            spade(Rank::Ace),
            spade(Rank::Nine),
            spade(Rank::Seven),
        ],
    );
    let mut account = PlayerAccount::new(100);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    assert_eq!(
        table.resolve_insurance(&mut account, true).unwrap_err(),
        GameError::InsufficientFunds {
            required: 50,
            available: 0
        }
    );
    assert_eq!(table.state(), RoundState::InsurancePending);
    assert_eq!(table.round().insurance(), 0);
}

#[test]
fn double_down_draws_one_card_and_doubles_bet() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Six),
            spade(Rank::Nine),
            spade(Rank::Five),
            spade(Rank::Eight),
            spade(Rank::Ten),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();

    assert_eq!(table.double_down(&mut account).unwrap(), spade(Rank::Ten));
    assert_eq!(table.state(), RoundState::GameOver);

    let result = table.round().result().unwrap();
    assert_eq!(result.hands[0].bet, 200);
    assert_eq!(result.hands[0].outcome, HandOutcome::Win);
    assert_eq!(result.hands[0].payout, 400);
    assert_eq!(account.balance(), 1200);
}

#[test]
fn double_down_needs_two_cards_and_funds() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Two),
            spade(Rank::Nine),
            spade(Rank::Three),
            spade(Rank::Eight),
            spade(Rank::Four),
        ],
    );
    let mut account = PlayerAccount::new(150);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    assert_eq!(
        table.double_down(&mut account).unwrap_err(),
        GameError::InsufficientFunds {
            required: 100,
            available: 50
        }
    );

    table.hit(&mut account).unwrap();
    assert_eq!(
        table.double_down(&mut account).unwrap_err(),
        GameError::invalid(
            Action::DoubleDown,
            RoundState::PlayerTurn,
            Reason::NeedsTwoCards
        )
    );
    assert_eq!(table.round().main_hand().unwrap().bet(), 100);
    assert_eq!(account.balance(), 50);
}

#[test]
fn split_plays_both_hands_in_order() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Eight),
            spade(Rank::Six),
            card(Suit::Hearts, Rank::Eight),
            spade(Rank::Ten),
            spade(Rank::Three),
            spade(Rank::King),
            card(Suit::Hearts, Rank::Ten),
            spade(Rank::Nine),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    table.split(&mut account).unwrap();

    assert_eq!(account.balance(), 800);
    escrow_conserved(&table, &account, 1000);
    assert_eq!(table.round().active(), HandSlot::Main);
    assert_eq!(table.round().main_hand().unwrap().value(), 11);
    assert_eq!(table.round().split_hand().unwrap().len(), 1);

    // Double after split on the main hand.
    table.double_down(&mut account).unwrap();
    assert_eq!(table.round().main_hand().unwrap().status(), HandStatus::Doubled);
    assert_eq!(table.round().active(), HandSlot::Split);
    assert_eq!(account.balance(), 700);

    table.hit(&mut account).unwrap();
    assert_eq!(table.round().split_hand().unwrap().value(), 18);
    assert_eq!(table.stand(&mut account).unwrap(), RoundState::GameOver);

    let result = table.round().result().unwrap();
    assert!(result.dealer_bust);
    assert_eq!(result.hands.len(), 2);
    assert_eq!(result.hands[0].slot, HandSlot::Main);
    assert_eq!(result.hands[0].payout, 400);
    assert_eq!(result.hands[1].slot, HandSlot::Split);
    assert_eq!(result.hands[1].payout, 200);
    assert_eq!(account.balance(), 1300);
    assert_eq!(account.stats().hands_won, 2);
}

#[test]
fn split_twenty_one_pays_even_money() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Ace),
            spade(Rank::Nine),
            card(Suit::Hearts, Rank::Ace),
            spade(Rank::Seven),
            spade(Rank::King),
            card(Suit::Hearts, Rank::King),
            spade(Rank::Two),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    assert_eq!(table.start(&mut account).unwrap(), RoundState::PlayerTurn);
    table.split(&mut account).unwrap();
    table.stand(&mut account).unwrap();
    table.hit(&mut account).unwrap();
    table.stand(&mut account).unwrap();

    let result = table.round().result().unwrap();
    assert_eq!(result.dealer_value, 18);
    for hand in &result.hands {
        assert_eq!(hand.outcome, HandOutcome::Win);
        assert_eq!(hand.payout, 200);
    }
    assert_eq!(account.stats().blackjacks, 0);
    assert_eq!(account.balance(), 1200);
}

#[test]
fn split_rejections() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Eight),
            spade(Rank::Six),
            spade(Rank::Nine),
            spade(Rank::Ten),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    assert_eq!(
        table.split(&mut account).unwrap_err(),
        GameError::invalid(Action::Split, RoundState::PlayerTurn, Reason::RanksDiffer)
    );
    assert_eq!(account.balance(), 900);
    assert!(table.round().split_hand().is_none());
}

#[test]
fn split_once_per_round() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Eight),
            spade(Rank::Six),
            card(Suit::Hearts, Rank::Eight),
            spade(Rank::Ten),
            card(Suit::Clubs, Rank::Eight),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    table.split(&mut account).unwrap();
    assert_eq!(
        table.split(&mut account).unwrap_err(),
        GameError::invalid(Action::Split, RoundState::PlayerTurn, Reason::AlreadySplit)
    );
}

#[test]
fn no_double_after_split_when_disabled() {
    let mut table = table_with(
        no_insurance().with_double_after_split(false),
        &[
            spade(Rank::Eight),
            spade(Rank::Six),
            card(Suit::Hearts, Rank::Eight),
            spade(Rank::Ten),
            spade(Rank::Three),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    table.split(&mut account).unwrap();
    assert_eq!(
        table.double_down(&mut account).unwrap_err(),
        GameError::invalid(
            Action::DoubleDown,
            RoundState::PlayerTurn,
            Reason::DoubleAfterSplit
        )
    );
}

#[test]
fn dealer_soft_seventeen_rule() {
    let draws = [
        spade(Rank::Ten),
        spade(Rank::Six),
        spade(Rank::Nine),
        spade(Rank::Ace),
        spade(Rank::Two),
    ];
    let mut account = PlayerAccount::new(1000);

    let mut stands = table_with(no_insurance(), &draws);
    stands.place_bet(&mut account, 100).unwrap();
    stands.start(&mut account).unwrap();
    stands.stand(&mut account).unwrap();
    let result = stands.round().result().unwrap();
    assert_eq!(result.dealer_value, 17);
    assert_eq!(result.hands[0].outcome, HandOutcome::Win);

    let mut hits = table_with(no_insurance().with_stand_on_soft_17(false), &draws);
    hits.place_bet(&mut account, 100).unwrap();
    hits.start(&mut account).unwrap();
    hits.stand(&mut account).unwrap();
    let result = hits.round().result().unwrap();
    assert_eq!(result.dealer_value, 19);
    assert_eq!(result.hands[0].outcome, HandOutcome::Push);
}

#[test]
fn exhausted_shoe_refills_without_cards_on_table() {
    let mut table = table_with(
        no_insurance(),
        &[
            spade(Rank::Ten),
            spade(Rank::Six),
            spade(Rank::Eight),
            card(Suit::Hearts, Rank::Ten),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    table.drain_events();
    table.stand(&mut account).unwrap();

    assert_eq!(table.state(), RoundState::GameOver);
    assert!(
        table
            .drain_events()
            .contains(&TableEvent::Reshuffled { remaining: 48 })
    );
    let on_table = table.round().cards_in_play();
    let spade_tens = on_table
        .iter()
        .chain(table.shoe().cards())
        .filter(|c| **c == spade(Rank::Ten))
        .count();
    assert_eq!(spade_tens, 1);
}

#[test]
fn exhaustion_fails_without_mutation_under_fail_policy() {
    let options = no_insurance().with_exhaustion(ExhaustionPolicy::Fail);
    let mut table = table_with(options, &[spade(Rank::Five), spade(Rank::Nine)]);
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    assert_eq!(
        table.start(&mut account).unwrap_err(),
        GameError::Shoe(ShoeError::Exhausted)
    );
    assert_eq!(table.state(), RoundState::Betting);
    assert_eq!(account.balance(), 900);

    table.replace_shoe(Shoe::stacked(&[
        spade(Rank::Five),
        spade(Rank::Nine),
        spade(Rank::Six),
        spade(Rank::Eight),
    ]));
    table.start(&mut account).unwrap();
    assert_eq!(
        table.hit(&mut account).unwrap_err(),
        GameError::Shoe(ShoeError::Exhausted)
    );
    assert_eq!(table.round().main_hand().unwrap().len(), 2);
    assert_eq!(table.state(), RoundState::PlayerTurn);

    table.replace_shoe(Shoe::stacked(&[spade(Rank::King)]));
    assert_eq!(table.hit(&mut account).unwrap(), spade(Rank::King));
}

#[test]
fn dealer_turn_resumes_after_restock() {
    let options = no_insurance().with_exhaustion(ExhaustionPolicy::Fail);
    let mut table = table_with(
        options,
        &[
            spade(Rank::Ten),
            spade(Rank::Six),
            spade(Rank::Eight),
            card(Suit::Hearts, Rank::Ten),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    assert_eq!(
        table.stand(&mut account).unwrap_err(),
        GameError::Shoe(ShoeError::Exhausted)
    );
    assert_eq!(table.state(), RoundState::DealerTurn);
    escrow_conserved(&table, &account, 1000);

    table.replace_shoe(Shoe::stacked(&[spade(Rank::Five)]));
    assert_eq!(
        table.resume_dealer(&mut account).unwrap(),
        RoundState::GameOver
    );
    let result = table.round().result().unwrap();
    assert_eq!(result.dealer_value, 21);
    assert_eq!(result.hands[0].outcome, HandOutcome::Lose);
    assert_eq!(account.balance(), 900);
}

#[test]
fn abandon_refunds_escrow_by_default() {
    let mut table = table_with(
        TableOptions::default(),
        &[
            spade(Rank::Ten),
            spade(Rank::Ace),
            spade(Rank::Nine),
            spade(Rank::Seven),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    table.resolve_insurance(&mut account, true).unwrap();
    assert_eq!(account.balance(), 850);

    assert_eq!(table.abandon(&mut account).unwrap(), 150);
    assert_eq!(account.balance(), 1000);
    assert_eq!(table.state(), RoundState::Betting);
    assert_eq!(table.round().escrowed(), 0);
}

#[test]
fn abandon_forfeit_counts_a_loss() {
    let mut table = table_with(
        no_insurance().with_abandon(AbandonPolicy::Forfeit),
        &[
            spade(Rank::Ten),
            spade(Rank::Six),
            spade(Rank::Nine),
            spade(Rank::Seven),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();

    assert_eq!(table.abandon(&mut account).unwrap(), 0);
    assert_eq!(account.balance(), 900);
    assert_eq!(account.stats().hands_lost, 1);
    assert_eq!(
        table.drain_events().last(),
        Some(&TableEvent::Abandoned {
            refunded: 0,
            forfeited: 100
        })
    );
}

#[test]
fn nothing_to_abandon_after_settlement() {
    let mut table = table_with(
        TableOptions::default(),
        &[
            spade(Rank::Ace),
            spade(Rank::Nine),
            spade(Rank::King),
            spade(Rank::Seven),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    assert_eq!(
        table.abandon(&mut account).unwrap_err(),
        GameError::invalid(
            Action::Abandon,
            RoundState::GameOver,
            Reason::NothingToAbandon
        )
    );
}

#[test]
fn new_round_resets_and_reshuffles_past_penetration() {
    let mut table = table_with(
        TableOptions::default().with_decks(1),
        &[
            spade(Rank::Ace),
            spade(Rank::Nine),
            spade(Rank::King),
            spade(Rank::Seven),
        ],
    );
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();
    assert!(table.needs_reshuffle());

    assert!(table.new_round().unwrap());
    assert_eq!(table.state(), RoundState::Betting);
    assert_eq!(table.round().bet(), 0);
    assert!(table.round().result().is_none());
    assert!(table.round().hands().is_empty());
    assert_eq!(table.cards_remaining(), DECK_SIZE);
}

#[test]
fn shoe_persists_across_rounds_below_penetration() {
    let mut table = Table::new(no_insurance(), 11).unwrap();
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 10).unwrap();
    table.start(&mut account).unwrap();
    if table.state() == RoundState::PlayerTurn {
        table.stand(&mut account).unwrap();
    }
    let remaining = table.cards_remaining();
    assert!(remaining < 312);

    assert!(!table.new_round().unwrap());
    assert_eq!(table.cards_remaining(), remaining);
}

#[test]
fn snapshot_round_trips_through_json() {
    let draws = [
        spade(Rank::Five),
        spade(Rank::Nine),
        spade(Rank::Six),
        spade(Rank::Eight),
        spade(Rank::Four),
        spade(Rank::Three),
    ];
    let mut table = table_with(no_insurance(), &draws);
    let mut account = PlayerAccount::new(1000);

    table.place_bet(&mut account, 100).unwrap();
    table.start(&mut account).unwrap();

    let snapshot = table.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: RoundSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, snapshot);

    let mut resumed = Table::resume(no_insurance(), 99, restored);
    assert_eq!(resumed.state(), RoundState::PlayerTurn);
    assert_eq!(resumed.round().bet(), 100);
    assert_eq!(resumed.cards_remaining(), 2);
    assert_eq!(resumed.hit(&mut account).unwrap(), spade(Rank::Four));
    assert_eq!(table.hit(&mut account.clone()).unwrap(), spade(Rank::Four));
}
