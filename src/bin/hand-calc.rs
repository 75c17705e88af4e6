use banluck::{Action, Card, Rank, Rules, Solver, SolverResult, Suit};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "hand-calc",
    about = "Optimal-play calculator for Chinese New Year blackjack"
)]
struct Args {
    /// Player cards, comma or space separated (e.g. "AS,KH" or "10S 6H")
    #[arg(long)]
    player: Option<String>,

    /// Dealer upcard (e.g. 10C)
    #[arg(long)]
    dealer: Option<String>,

    /// Print a strategy chart instead of solving one hand: hard or soft
    #[arg(long)]
    chart: Option<String>,

    /// Offer the hit comparison even on a starting natural
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    naturals_playable: bool,

    /// Action reported on an exact stand/hit EV tie: stand or hit
    #[arg(long, default_value = "stand")]
    tie_break: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let rules = Rules {
        naturals_auto_stand: !args.naturals_playable,
        tie_break: parse_tie_break(&args.tie_break),
        ..Rules::default()
    };
    let mut solver = Solver::new(rules);

    if let Some(kind) = &args.chart {
        print_chart(&mut solver, kind);
        return;
    }

    let (player, dealer) = match (&args.player, &args.dealer) {
        (Some(player), Some(dealer)) => (player, dealer),
        _ => {
            eprintln!("Provide --player and --dealer, or --chart hard|soft");
            std::process::exit(1);
        }
    };

    let player_cards = parse_cards(player);
    let upcard = parse_card(dealer).unwrap_or_else(|e| {
        eprintln!("Invalid dealer card: {e}");
        std::process::exit(1);
    });

    eprintln!("Calculating...");
    match solver.solve(&player_cards, upcard) {
        Ok(result) => print_result(&result, solver.rules()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_result(result: &SolverResult, rules: &Rules) {
    let totals: Vec<String> = result.possible_totals.iter().map(u16::to_string).collect();
    let hand: Vec<String> = result.player.iter().map(Card::to_string).collect();

    println!("Player hand:   {}", hand.join(" "));
    println!("Upcard:        {}", result.upcard);
    println!("Totals:        {}", totals.join("/"));
    println!(
        "Best total:    {}{}",
        result.best_total,
        if result.bust { " (bust)" } else { "" }
    );
    println!("Special hand:  {}", result.special.label());
    println!("Multiplier:    {}x", result.payout_multiplier);
    println!("EV(stand):     {:+.4}", result.stand_ev);
    match result.hit_ev {
        Some(hit) => println!("EV(hit):       {hit:+.4}"),
        None => println!("EV(hit):       not offered"),
    }
    println!(
        "Action:        {}",
        match result.action {
            Action::Stand => "STAND",
            Action::Hit => "HIT",
        }
    );
    println!(
        "Best EV:       {:+.4} per unit ({:+.2} at the ${} stake)",
        result.best_ev,
        result.best_ev * rules.base_stake,
        rules.base_stake
    );
}

/// Chart columns; the four ten-value upcards play identically, so one
/// column stands in for all of them.
const UPCARD_RANKS: [Rank; 10] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Ace,
];

fn print_chart(solver: &mut Solver, kind: &str) {
    eprintln!("Calculating strategy chart...");
    println!("H = hit, S = stand");
    println!("Hand  |  2  3  4  5  6  7  8  9 10  A");
    println!("------+------------------------------");

    match kind {
        "hard" => {
            for total in (5..=17u16).rev() {
                print_chart_row(solver, &format!("{total:>4} "), &hard_hand(total));
            }
        }
        "soft" => {
            for kicker in 2..=9u16 {
                let cards = [
                    Card::new(Rank::Ace, Suit::Spades),
                    Card::new(pip(kicker), Suit::Hearts),
                ];
                print_chart_row(solver, &format!(" A,{kicker} "), &cards);
            }
        }
        _ => {
            eprintln!("Unknown chart '{kind}'. Available: hard, soft");
            std::process::exit(1);
        }
    }
}

fn print_chart_row(solver: &mut Solver, label: &str, cards: &[Card]) {
    let mut row = String::new();
    for rank in UPCARD_RANKS {
        let upcard = Card::new(rank, Suit::Clubs);
        let letter = match solver.solve(cards, upcard) {
            Ok(result) => match result.action {
                Action::Hit => 'H',
                Action::Stand => 'S',
            },
            Err(e) => {
                eprintln!("Error on {label} vs {upcard}: {e}");
                std::process::exit(1);
            }
        };
        row.push_str(&format!("  {letter}"));
    }
    println!("{label} |{row}");
}

/// Two cards without an ace summing to the given hard total.
fn hard_hand(total: u16) -> [Card; 2] {
    let (first, second) = if total <= 11 {
        (2, total - 2)
    } else {
        (10, total - 10)
    };
    [
        Card::new(pip(first), Suit::Spades),
        Card::new(pip(second), Suit::Hearts),
    ]
}

fn pip(value: u16) -> Rank {
    match value {
        2 => Rank::Two,
        3 => Rank::Three,
        4 => Rank::Four,
        5 => Rank::Five,
        6 => Rank::Six,
        7 => Rank::Seven,
        8 => Rank::Eight,
        9 => Rank::Nine,
        10 => Rank::Ten,
        _ => {
            eprintln!("No pip card with value {value}");
            std::process::exit(1);
        }
    }
}

fn parse_cards(input: &str) -> Vec<Card> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            parse_card(token).unwrap_or_else(|e| {
                eprintln!("Invalid card '{token}': {e}");
                std::process::exit(1);
            })
        })
        .collect()
}

/// Card notation is rank then suit initial: AS, 10C, KH.
fn parse_card(input: &str) -> Result<Card, String> {
    let token = input.trim().to_uppercase();
    if token.len() < 2 {
        return Err("expected <rank><suit>, e.g. AS or 10C".to_string());
    }

    let (rank_part, suit_part) = token.split_at(token.len() - 1);
    let suit = match suit_part {
        "S" => Suit::Spades,
        "H" => Suit::Hearts,
        "D" => Suit::Diamonds,
        "C" => Suit::Clubs,
        other => return Err(format!("unknown suit '{other}', use S, H, D or C")),
    };
    let rank = match rank_part {
        "A" => Rank::Ace,
        "2" => Rank::Two,
        "3" => Rank::Three,
        "4" => Rank::Four,
        "5" => Rank::Five,
        "6" => Rank::Six,
        "7" => Rank::Seven,
        "8" => Rank::Eight,
        "9" => Rank::Nine,
        "10" | "T" => Rank::Ten,
        "J" => Rank::Jack,
        "Q" => Rank::Queen,
        "K" => Rank::King,
        other => return Err(format!("unknown rank '{other}', use A, 2-10, J, Q or K")),
    };

    Ok(Card::new(rank, suit))
}

fn parse_tie_break(input: &str) -> Action {
    match input.to_lowercase().as_str() {
        "stand" => Action::Stand,
        "hit" => Action::Hit,
        other => {
            eprintln!("Invalid tie break '{other}'. Options: stand, hit");
            std::process::exit(1);
        }
    }
}
