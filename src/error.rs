use crate::card::Card;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverError {
    #[error("hand must hold 1 to 5 cards, got {0}")]
    HandSize(usize),
    #[error("duplicate card: {0}")]
    DuplicateCard(Card),
    #[error("hit is not legal: {0}")]
    IllegalHit(&'static str),
}
