use crate::card::{Card, Rank};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A fifth card locks the hand: 5-Card Charlie if it survives, and no
/// further hitting either way.
pub const MAX_HAND_CARDS: usize = 5;

/// Candidate values for each ace at the given hand size. The table narrows
/// as cards are drawn and is re-read at every valuation.
fn ace_candidates(num_cards: usize) -> &'static [u16] {
    match num_cards {
        2 => &[1, 10, 11],
        3 => &[1, 10],
        _ => &[1],
    }
}

/// Every total a hand can claim under the ace table: one candidate total per
/// combination of per-ace choices, deduplicated, ascending.
pub fn possible_totals(num_cards: usize, aces: u8, non_ace_total: u16) -> Vec<u16> {
    let mut totals = vec![non_ace_total];
    for _ in 0..aces {
        let mut expanded = Vec::with_capacity(totals.len() * 3);
        for &total in &totals {
            for &ace in ace_candidates(num_cards) {
                expanded.push(total + ace);
            }
        }
        totals = expanded;
    }
    totals.sort_unstable();
    totals.dedup();
    totals
}

/// Best claimable total: the highest that stays at or under 21, or the
/// lowest of all (a bust) when none does.
pub fn best_total(totals: &[u16]) -> u16 {
    let mut best_live = None;
    let mut lowest = u16::MAX;
    for &total in totals {
        if total <= 21 {
            best_live = Some(best_live.map_or(total, |b: u16| b.max(total)));
        }
        lowest = lowest.min(total);
    }
    best_live.unwrap_or(lowest)
}

/// Mutually exclusive special-hand classes, in payout priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialHand {
    None,
    BanBan,
    Blackjack,
    SuitedBlackjack,
    TripleSevens,
    FiveCardCharlie,
}

impl SpecialHand {
    /// Multiplier applied to the stake on an outright win. A push returns
    /// the stake untouched and a loss forfeits it, whatever the class.
    pub fn multiplier(self) -> f64 {
        match self {
            SpecialHand::BanBan | SpecialHand::SuitedBlackjack => 3.0,
            SpecialHand::TripleSevens => 7.0,
            SpecialHand::Blackjack | SpecialHand::FiveCardCharlie => 2.0,
            SpecialHand::None => 1.0,
        }
    }

    /// True for the two-card (and triple-seven) hands that the house locks
    /// to an immediate stand when `Rules::naturals_auto_stand` is set.
    pub fn is_natural(self) -> bool {
        matches!(
            self,
            SpecialHand::BanBan
                | SpecialHand::Blackjack
                | SpecialHand::SuitedBlackjack
                | SpecialHand::TripleSevens
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            SpecialHand::None => "None",
            SpecialHand::BanBan => "Ban Ban",
            SpecialHand::Blackjack => "Blackjack",
            SpecialHand::SuitedBlackjack => "Suited Blackjack",
            SpecialHand::TripleSevens => "Triple 7s",
            SpecialHand::FiveCardCharlie => "5-Card Charlie",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOutcome {
    Win,
    Lose,
    Push,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new(cards: Vec<Card>) -> Self {
        Hand { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn ace_count(&self) -> u8 {
        self.cards.iter().filter(|c| c.rank.is_ace()).count() as u8
    }

    fn non_ace_total(&self) -> u16 {
        self.cards.iter().map(|c| c.rank.base_value()).sum()
    }

    pub fn possible_totals(&self) -> Vec<u16> {
        possible_totals(self.cards.len(), self.ace_count(), self.non_ace_total())
    }

    pub fn best_total(&self) -> u16 {
        best_total(&self.possible_totals())
    }

    /// Every claimable total exceeds 21.
    pub fn is_bust(&self) -> bool {
        self.best_total() > 21
    }

    pub fn is_ban_ban(&self) -> bool {
        self.cards.len() == 2 && self.cards.iter().all(|c| c.rank.is_ace())
    }

    pub fn is_triple_sevens(&self) -> bool {
        self.cards.len() == 3 && self.cards.iter().all(|c| c.rank == Rank::Seven)
    }

    pub fn is_five_card_charlie(&self) -> bool {
        self.cards.len() == MAX_HAND_CARDS && !self.is_bust()
    }

    /// Classification in priority order; Ban Ban outranks the blackjacks,
    /// which outrank the charlie.
    pub fn special(&self) -> SpecialHand {
        if self.is_ban_ban() {
            return SpecialHand::BanBan;
        }
        if self.is_triple_sevens() {
            return SpecialHand::TripleSevens;
        }
        if self.cards.len() == 2 {
            let has_ace = self.cards.iter().any(|c| c.rank.is_ace());
            let has_ten = self.cards.iter().any(|c| c.rank.is_ten_value());
            if has_ace && has_ten {
                return if self.cards[0].suit == self.cards[1].suit {
                    SpecialHand::SuitedBlackjack
                } else {
                    SpecialHand::Blackjack
                };
            }
        }
        if self.is_five_card_charlie() {
            return SpecialHand::FiveCardCharlie;
        }
        SpecialHand::None
    }

    pub fn payout_multiplier(&self) -> f64 {
        self.special().multiplier()
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{card}")?;
        }
        Ok(())
    }
}

/// Compare finalized hands. A busted player has already lost before the
/// dealer acts; a busted dealer then loses; otherwise the higher best total
/// wins and equal totals push regardless of special status.
pub fn compare_hands(player: &Hand, dealer: &Hand) -> HandOutcome {
    if player.is_bust() {
        return HandOutcome::Lose;
    }
    if dealer.is_bust() {
        return HandOutcome::Win;
    }
    match player.best_total().cmp(&dealer.best_total()) {
        Ordering::Greater => HandOutcome::Win,
        Ordering::Less => HandOutcome::Lose,
        Ordering::Equal => HandOutcome::Push,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    fn hand(cards: &[(Rank, Suit)]) -> Hand {
        Hand::new(cards.iter().map(|&(r, s)| card(r, s)).collect())
    }

    #[test]
    fn test_two_card_ace_is_one_ten_or_eleven() {
        let h = hand(&[(Rank::Ace, Suit::Spades), (Rank::Five, Suit::Hearts)]);
        assert_eq!(h.possible_totals(), vec![6, 15, 16]);
        assert_eq!(h.best_total(), 16);
    }

    #[test]
    fn test_three_card_ace_is_one_or_ten() {
        let h = hand(&[
            (Rank::Ace, Suit::Spades),
            (Rank::Five, Suit::Hearts),
            (Rank::Three, Suit::Clubs),
        ]);
        assert_eq!(h.possible_totals(), vec![9, 18]);
        assert_eq!(h.best_total(), 18);
    }

    #[test]
    fn test_four_card_ace_is_one_only() {
        let h = hand(&[
            (Rank::Ace, Suit::Spades),
            (Rank::Five, Suit::Hearts),
            (Rank::Three, Suit::Clubs),
            (Rank::Four, Suit::Diamonds),
        ]);
        assert_eq!(h.possible_totals(), vec![13]);
    }

    #[test]
    fn test_double_ace_combinations() {
        let h = hand(&[(Rank::Ace, Suit::Spades), (Rank::Ace, Suit::Hearts)]);
        assert_eq!(h.possible_totals(), vec![2, 11, 12, 20, 21, 22]);
        assert_eq!(h.best_total(), 21);
    }

    #[test]
    fn test_triple_ace_three_card_combinations() {
        // Three aces at three cards: each ace is 1 or 10.
        let h = hand(&[
            (Rank::Ace, Suit::Spades),
            (Rank::Ace, Suit::Hearts),
            (Rank::Ace, Suit::Clubs),
        ]);
        assert_eq!(h.possible_totals(), vec![3, 12, 21, 30]);
        assert_eq!(h.best_total(), 21);
    }

    #[test]
    fn test_ace_interpretation_narrows_as_cards_arrive() {
        let mut h = hand(&[(Rank::Ace, Suit::Spades), (Rank::Nine, Suit::Hearts)]);
        assert_eq!(h.best_total(), 20);

        h.add_card(card(Rank::Nine, Suit::Clubs));
        assert_eq!(h.best_total(), 19);

        h.add_card(card(Rank::Two, Suit::Diamonds));
        assert_eq!(h.best_total(), 21);
        assert_eq!(h.len(), 4);
        assert!(!h.is_empty());
    }

    #[test]
    fn test_best_total_prefers_highest_under_21() {
        let h = hand(&[(Rank::Ace, Suit::Spades), (Rank::Nine, Suit::Hearts)]);
        assert_eq!(h.best_total(), 20);
    }

    #[test]
    fn test_bust_reports_lowest_total() {
        let h = hand(&[
            (Rank::King, Suit::Spades),
            (Rank::Queen, Suit::Hearts),
            (Rank::Five, Suit::Clubs),
        ]);
        assert!(h.is_bust());
        assert_eq!(h.best_total(), 25);
    }

    #[test]
    fn test_ace_saves_four_card_hand() {
        let h = hand(&[
            (Rank::Ace, Suit::Spades),
            (Rank::Nine, Suit::Hearts),
            (Rank::Nine, Suit::Clubs),
            (Rank::Two, Suit::Diamonds),
        ]);
        assert!(!h.is_bust());
        assert_eq!(h.best_total(), 21);
    }

    #[test]
    fn test_ban_ban() {
        let h = hand(&[(Rank::Ace, Suit::Spades), (Rank::Ace, Suit::Hearts)]);
        assert_eq!(h.special(), SpecialHand::BanBan);
        assert_eq!(h.payout_multiplier(), 3.0);
    }

    #[test]
    fn test_suited_blackjack() {
        let h = hand(&[(Rank::Ace, Suit::Hearts), (Rank::Queen, Suit::Hearts)]);
        assert_eq!(h.special(), SpecialHand::SuitedBlackjack);
        assert_eq!(h.payout_multiplier(), 3.0);
    }

    #[test]
    fn test_offsuit_blackjack() {
        let h = hand(&[(Rank::Ace, Suit::Spades), (Rank::King, Suit::Hearts)]);
        assert_eq!(h.special(), SpecialHand::Blackjack);
        assert_eq!(h.payout_multiplier(), 2.0);
    }

    #[test]
    fn test_triple_sevens() {
        let h = hand(&[
            (Rank::Seven, Suit::Spades),
            (Rank::Seven, Suit::Hearts),
            (Rank::Seven, Suit::Clubs),
        ]);
        assert_eq!(h.special(), SpecialHand::TripleSevens);
        assert_eq!(h.payout_multiplier(), 7.0);
    }

    #[test]
    fn test_five_card_charlie() {
        let h = hand(&[
            (Rank::Two, Suit::Spades),
            (Rank::Three, Suit::Hearts),
            (Rank::Four, Suit::Clubs),
            (Rank::Five, Suit::Diamonds),
            (Rank::Six, Suit::Spades),
        ]);
        assert_eq!(h.special(), SpecialHand::FiveCardCharlie);
        assert_eq!(h.payout_multiplier(), 2.0);
    }

    #[test]
    fn test_busted_five_cards_is_not_charlie() {
        let h = hand(&[
            (Rank::King, Suit::Spades),
            (Rank::Queen, Suit::Hearts),
            (Rank::Nine, Suit::Clubs),
            (Rank::Five, Suit::Diamonds),
            (Rank::Six, Suit::Spades),
        ]);
        assert!(h.is_bust());
        assert_eq!(h.special(), SpecialHand::None);
    }

    #[test]
    fn test_plain_twenty_is_no_special() {
        let h = hand(&[(Rank::King, Suit::Spades), (Rank::Queen, Suit::Hearts)]);
        assert_eq!(h.special(), SpecialHand::None);
        assert_eq!(h.payout_multiplier(), 1.0);
    }

    #[test]
    fn test_compare_player_wins() {
        let p = hand(&[(Rank::King, Suit::Spades), (Rank::Nine, Suit::Hearts)]);
        let d = hand(&[(Rank::Ten, Suit::Clubs), (Rank::Eight, Suit::Diamonds)]);
        assert_eq!(compare_hands(&p, &d), HandOutcome::Win);
    }

    #[test]
    fn test_compare_push_on_equal_totals() {
        let p = hand(&[(Rank::King, Suit::Spades), (Rank::Nine, Suit::Hearts)]);
        let d = hand(&[(Rank::Ten, Suit::Clubs), (Rank::Nine, Suit::Diamonds)]);
        assert_eq!(compare_hands(&p, &d), HandOutcome::Push);
    }

    #[test]
    fn test_compare_player_bust_loses_even_if_dealer_busts() {
        let p = hand(&[
            (Rank::King, Suit::Spades),
            (Rank::Queen, Suit::Hearts),
            (Rank::Five, Suit::Clubs),
        ]);
        let d = hand(&[
            (Rank::King, Suit::Clubs),
            (Rank::Queen, Suit::Diamonds),
            (Rank::Five, Suit::Diamonds),
        ]);
        assert_eq!(compare_hands(&p, &d), HandOutcome::Lose);
    }

    #[test]
    fn test_compare_dealer_bust() {
        let p = hand(&[(Rank::Ten, Suit::Spades), (Rank::Nine, Suit::Hearts)]);
        let d = hand(&[
            (Rank::King, Suit::Clubs),
            (Rank::Queen, Suit::Diamonds),
            (Rank::Five, Suit::Diamonds),
        ]);
        assert_eq!(compare_hands(&p, &d), HandOutcome::Win);
    }
}
