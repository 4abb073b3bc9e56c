//! Terminal blackjack on top of [`bjtable::Session`].
//!
//! Run with `RUST_LOG=bjtable=debug` to watch the engine's logs.

use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use bjtable::{
    BankrollOptions, Card, DealerHand, EventLog, Hand, HandSlot, HandStatus, MemoryStore,
    Notification, RoundState, Seat, Session, Suit, TableEvent, TableOptions,
};
use tracing_subscriber::EnvFilter;

type Cli<'a> = Session<&'a MemoryStore, &'a EventLog>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    println!("Blackjack (type 'q' to quit)");

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let store = MemoryStore::new();
    let log = EventLog::new();

    let mut session = match Session::open(
        "player",
        &store,
        &log,
        TableOptions::default(),
        BankrollOptions::default(),
        now,
    ) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("cannot open table: {err}");
            return;
        }
    };

    let _ = session.claim_daily_bonus(now);
    print_notifications(&log);

    play(&mut session, &log);
    print_achievements(&session);
}

fn play(session: &mut Cli<'_>, log: &EventLog) {
    loop {
        let balance = session.balance();
        if balance == 0 {
            println!("You are out of chips. Game over.");
            break;
        }

        let Some(bet) = prompt_u64(&format!("Bet amount (1-{balance}, 0 to quit): ")) else {
            break;
        };
        if bet == 0 {
            println!("Goodbye.");
            break;
        }

        if session.place_bet(bet).is_err() || session.start().is_err() {
            print_notifications(log);
            let _ = session.abandon();
            log.take();
            continue;
        }
        print_notifications(log);

        if session.state() == RoundState::InsurancePending {
            let take = matches!(prompt_line("Take insurance? (y/n): ").as_str(), "y" | "yes");
            let _ = session.resolve_insurance(take);
            print_notifications(log);
        }

        while session.state() == RoundState::PlayerTurn {
            print_table(session);
            println!("{}", format_actions(session));

            let _ = match prompt_line("Action: ").as_str() {
                "h" | "hit" => session.hit().map(drop),
                "s" | "stand" => session.stand().map(drop),
                "d" | "double" => session.double_down().map(drop),
                "p" | "split" => session.split(),
                "q" | "quit" => return,
                _ => {
                    println!("Unknown action.");
                    continue;
                }
            };
            print_notifications(log);
        }

        if session.state() == RoundState::GameOver {
            print_table(session);
            if let Some(result) = session.table().round().result() {
                println!("Payout: {} (net {})", result.total_payout, result.net);
                if let Some(insurance) = result.insurance {
                    println!("Insurance payout: {}", insurance.payout);
                }
            }
            if let Ok(true) = session.new_round() {
                println!("Shoe reshuffled.");
            }
            log.take();
        }
    }
}

fn print_achievements(session: &Cli<'_>) {
    println!("\nAchievements:");
    let tracker = session.tracker();
    for (rule, progress) in tracker.rules().iter().zip(tracker.achievements()) {
        let mark = if progress.unlocked { "x" } else { " " };
        println!(
            "  [{mark}] {} ({}/{}) - {}",
            rule.name, progress.progress, progress.target, rule.description
        );
    }
}

fn print_notifications(log: &EventLog) {
    for notification in log.take() {
        match notification {
            Notification::Table(TableEvent::CardDealt { seat, card }) => {
                let who = match seat {
                    Seat::Dealer => "Dealer".to_string(),
                    Seat::Player(slot) => format!("{slot:?} hand"),
                };
                let card = card.map_or_else(|| "??".to_string(), |c| format_card(&c));
                println!("  {who} <- {card}");
            }
            Notification::Table(TableEvent::HoleRevealed { card }) => {
                println!("  Dealer reveals {}", format_card(&card));
            }
            Notification::Table(TableEvent::InsuranceOffered) => {
                println!("Dealer shows an Ace. Insurance offered.");
            }
            Notification::Table(TableEvent::Reshuffled { remaining }) => {
                println!("Shoe reshuffled ({remaining} cards).");
            }
            Notification::Table(_) => {}
            Notification::AchievementUnlocked(rule) => {
                println!("{}", colorize(&format!("Achievement unlocked: {}", rule.name), "33"));
            }
            Notification::Rejected(err) => println!("Not allowed: {err}"),
            Notification::PersistenceFailed(err) => println!("Save failed: {err}"),
            Notification::DailyBonus { amount } => println!("Daily bonus: +{amount} chips"),
            Notification::BonusUnavailable(err) => println!("{err}"),
        }
    }
}

fn prompt_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    input.trim().to_lowercase()
}

fn prompt_u64(prompt: &str) -> Option<u64> {
    loop {
        let input = prompt_line(prompt);
        if input == "q" || input == "quit" {
            return None;
        }
        match input.parse::<u64>() {
            Ok(value) => return Some(value),
            Err(_) => println!("Please enter a number."),
        }
    }
}

fn print_table(session: &Cli<'_>) {
    let table = session.table();
    println!(
        "\nShoe: {} cards remaining ({} decks)",
        table.cards_remaining(),
        table.shoe().deck_count()
    );

    let dealer = table.round().dealer();
    println!(
        "Dealer: {} (value {})",
        format_dealer(dealer),
        dealer.visible_value()
    );

    let active = table.round().active();
    for (index, hand) in table.round().hands().iter().enumerate() {
        let slot = if index == 0 { HandSlot::Main } else { HandSlot::Split };
        let marker = if slot == active { "*" } else { " " };
        println!(
            "{marker} Hand {index}: {} | value {} | bet {} | {:?}",
            format_hand(hand),
            hand.value(),
            hand.bet(),
            hand.status()
        );
    }
    println!("Balance: {}\n", session.balance());
}

fn format_actions(session: &Cli<'_>) -> String {
    let round = session.table().round();
    let options = session.table().options();
    let Some(hand) = round.hand(round.active()) else {
        return String::new();
    };

    let active = hand.status() == HandStatus::Active;
    let funds = session.balance() >= hand.bet();
    let double = active
        && funds
        && hand.len() == 2
        && (!hand.is_from_split() || options.double_after_split);
    let split = active && funds && round.split_hand().is_none() && hand.can_split();

    let parts = [
        format_action("hit", "h", active),
        format_action("stand", "s", active),
        format_action("double", "d", double),
        format_action("split", "p", split),
    ];
    format!("Actions: {}", parts.join(" "))
}

fn format_action(label: &str, key: &str, allowed: bool) -> String {
    let text = format!("[{key}]{label}");
    if allowed {
        colorize(&text, "32")
    } else {
        colorize(&text, "90")
    }
}

fn colorize(text: &str, code: &str) -> String {
    format!("\u{1b}[{code}m{text}\u{1b}[0m")
}

fn format_dealer(dealer: &DealerHand) -> String {
    if dealer.is_empty() {
        return "(no cards)".to_string();
    }
    dealer
        .table_view()
        .iter()
        .map(|dealt| dealt.visible().map_or_else(|| "??".to_string(), |c| format_card(&c)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_hand(hand: &Hand) -> String {
    if hand.is_empty() {
        return "(empty)".to_string();
    }
    hand.cards()
        .iter()
        .map(format_card)
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_card(card: &Card) -> String {
    let color_code = match card.suit() {
        Suit::Hearts | Suit::Diamonds => "31",
        Suit::Clubs => "32",
        Suit::Spades => "34",
    };
    colorize(&card.to_string(), color_code)
}
