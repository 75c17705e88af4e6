use crate::card::{Card, Rank};
use crate::error::SolverError;
use serde::{Deserialize, Serialize};

const COPIES_PER_RANK: u8 = 4;

/// Remaining-card composition of a single 52-card deck, bucketed by rank.
/// Suits are erased: every draw the solver enumerates (dealer hits, player
/// hits) depends on ranks only, while suit identity matters solely for the
/// cards already on the table.
///
/// `Deck` is a small `Copy` value, so each recursive branch works on its own
/// snapshot and sibling branches never observe each other's removals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deck {
    counts: [u8; 13],
    total: u8,
}

impl Deck {
    pub fn full() -> Self {
        Deck {
            counts: [COPIES_PER_RANK; 13],
            total: 52,
        }
    }

    /// Full deck minus the given known cards. A duplicate (rank, suit) pair
    /// is rejected: one physical card cannot be dealt twice, and the solver
    /// must never enumerate it as drawable.
    pub fn excluding(known: &[Card]) -> Result<Self, SolverError> {
        let mut seen = [[false; 4]; 13];
        let mut deck = Deck::full();
        for &card in known {
            let slot = &mut seen[card.rank.index()][card.suit.index()];
            if *slot {
                return Err(SolverError::DuplicateCard(card));
            }
            *slot = true;
            deck = deck.removing(card.rank);
        }
        Ok(deck)
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    pub fn count(&self, rank: Rank) -> u8 {
        self.counts[rank.index()]
    }

    /// Copy of the deck with one card of the given rank removed.
    pub fn removing(&self, rank: Rank) -> Self {
        let mut deck = *self;
        debug_assert!(deck.counts[rank.index()] > 0, "deck underflow on {rank:?}");
        deck.counts[rank.index()] -= 1;
        deck.total -= 1;
        deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    #[test]
    fn test_full_deck_composition() {
        let deck = Deck::full();
        assert_eq!(deck.total(), 52);
        for rank in Rank::ALL {
            assert_eq!(deck.count(rank), 4);
        }
    }

    #[test]
    fn test_excluding_removes_known_cards() {
        let known = [
            Card::new(Rank::Ace, Suit::Spades),
            Card::new(Rank::Ace, Suit::Hearts),
            Card::new(Rank::King, Suit::Clubs),
        ];
        let deck = Deck::excluding(&known).unwrap();
        assert_eq!(deck.total(), 49);
        assert_eq!(deck.count(Rank::Ace), 2);
        assert_eq!(deck.count(Rank::King), 3);
        assert_eq!(deck.count(Rank::Seven), 4);
    }

    #[test]
    fn test_excluding_rejects_duplicate() {
        let dup = Card::new(Rank::Queen, Suit::Diamonds);
        let known = [Card::new(Rank::Two, Suit::Spades), dup, dup];
        assert_eq!(
            Deck::excluding(&known),
            Err(SolverError::DuplicateCard(dup))
        );
    }

    #[test]
    fn test_same_rank_different_suit_is_fine() {
        let known = [
            Card::new(Rank::Seven, Suit::Spades),
            Card::new(Rank::Seven, Suit::Hearts),
            Card::new(Rank::Seven, Suit::Clubs),
            Card::new(Rank::Seven, Suit::Diamonds),
        ];
        let deck = Deck::excluding(&known).unwrap();
        assert_eq!(deck.count(Rank::Seven), 0);
    }

    #[test]
    fn test_removing_is_copy_on_branch() {
        let deck = Deck::full();
        let branch = deck.removing(Rank::Five);
        assert_eq!(deck.count(Rank::Five), 4);
        assert_eq!(branch.count(Rank::Five), 3);
        assert_eq!(branch.total(), 51);
    }
}
