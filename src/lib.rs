mod card;
mod deck;
mod error;
mod hand;
mod rules;
mod solver;

pub use card::{Card, Rank, Suit};
pub use deck::Deck;
pub use error::SolverError;
pub use hand::{
    best_total, compare_hands, possible_totals, Hand, HandOutcome, SpecialHand, MAX_HAND_CARDS,
};
pub use rules::{Action, Rules};
pub use solver::{solve_hand, DealerOutcomes, Solver, SolverResult};
