use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank};
use crate::deck::Deck;
use crate::error::SolverError;
use crate::hand::{best_total, possible_totals, Hand, SpecialHand, MAX_HAND_CARDS};
use crate::rules::{Action, Rules};

/// Unit payoff when a hand forfeits its stake.
const LOSS: f64 = -1.0;

/// Rank-bucket view of a hand in flight. Card identities are erased: the
/// ace table keys on card count and the payout on the sevens count, and
/// both are carried here, so two hands with equal state are interchangeable
/// from this point of the recursion on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct HandState {
    cards: u8,
    aces: u8,
    sevens: u8,
    non_ace_total: u16,
}

impl HandState {
    fn of(hand: &Hand) -> Self {
        let mut state = HandState {
            cards: 0,
            aces: 0,
            sevens: 0,
            non_ace_total: 0,
        };
        for card in hand.cards() {
            state = state.with_draw(card.rank);
        }
        state
    }

    fn from_upcard(card: Card) -> Self {
        HandState {
            cards: 0,
            aces: 0,
            sevens: 0,
            non_ace_total: 0,
        }
        .with_draw(card.rank)
    }

    fn with_draw(self, rank: Rank) -> Self {
        HandState {
            cards: self.cards + 1,
            aces: self.aces + u8::from(rank.is_ace()),
            sevens: self.sevens + u8::from(rank == Rank::Seven),
            non_ace_total: self.non_ace_total + rank.base_value(),
        }
    }

    fn best_total(&self) -> u16 {
        best_total(&possible_totals(
            self.cards as usize,
            self.aces,
            self.non_ace_total,
        ))
    }

    fn is_bust(&self) -> bool {
        self.best_total() > 21
    }

    /// Win multiplier a drawn-out hand would claim on standing. The facade
    /// classifies a starting hand from its actual cards; this covers hands
    /// completed during the recursion, where only ranks are known. A
    /// blackjack drawn onto a one-card hand is priced at the off-suit 2x,
    /// since the drawn card's suit is not enumerated.
    fn drawn_multiplier(&self) -> f64 {
        if self.cards == 2 {
            if self.aces == 2 {
                return SpecialHand::BanBan.multiplier();
            }
            if self.aces == 1 && self.non_ace_total == 10 {
                return SpecialHand::Blackjack.multiplier();
            }
            return 1.0;
        }
        if self.cards == 3 && self.sevens == 3 {
            SpecialHand::TripleSevens.multiplier()
        } else if self.cards as usize == MAX_HAND_CARDS && !self.is_bust() {
            SpecialHand::FiveCardCharlie.multiplier()
        } else {
            1.0
        }
    }
}

/// Exact distribution over finalized dealer hands, folded down to what
/// payoffs depend on: bust mass plus mass per final standing total.
/// Distinct hands on the same total are payoff-equivalent to every
/// consumer, so nothing is lost in the aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DealerOutcomes {
    /// Probability that every total the dealer can claim exceeds 21.
    pub bust: f64,
    stand: [f64; 22],
}

impl DealerOutcomes {
    fn empty() -> Self {
        DealerOutcomes {
            bust: 0.0,
            stand: [0.0; 22],
        }
    }

    fn busted() -> Self {
        DealerOutcomes {
            bust: 1.0,
            ..DealerOutcomes::empty()
        }
    }

    fn standing(total: u16) -> Self {
        let mut outcomes = DealerOutcomes::empty();
        outcomes.stand[total as usize] = 1.0;
        outcomes
    }

    fn accumulate(&mut self, sub: &DealerOutcomes, p: f64) {
        self.bust += p * sub.bust;
        for (slot, mass) in self.stand.iter_mut().zip(sub.stand.iter()) {
            *slot += p * mass;
        }
    }

    /// Probability that the dealer finalizes standing on exactly `total`.
    pub fn stand_probability(&self, total: u16) -> f64 {
        self.stand.get(total as usize).copied().unwrap_or(0.0)
    }

    /// Total probability mass; 1.0 up to floating error for any reachable
    /// composition.
    pub fn mass(&self) -> f64 {
        self.bust + self.stand.iter().sum::<f64>()
    }
}

/// Everything one hand evaluation produces. Built fresh per call; EVs are
/// per unit staked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub player: Vec<Card>,
    pub upcard: Card,
    /// Ascending, deduplicated claimable totals under the ace table.
    pub possible_totals: Vec<u16>,
    pub best_total: u16,
    pub bust: bool,
    pub special: SpecialHand,
    pub payout_multiplier: f64,
    pub stand_ev: f64,
    /// Absent when hitting is not offered: busted hand, five-card cap, or
    /// an auto-standing natural.
    pub hit_ev: Option<f64>,
    pub action: Action,
    pub best_ev: f64,
}

/// Composition-exact solver for one rule set.
///
/// Dealer distributions and hit continuations are memoized across calls.
/// Every cached value is a pure function of its key, so results are
/// bit-identical whether or not the caches are warm.
pub struct Solver {
    rules: Rules,
    dealer_cache: HashMap<(Deck, HandState), DealerOutcomes>,
    hit_cache: HashMap<(Deck, HandState, HandState), f64>,
}

impl Solver {
    pub fn new(rules: Rules) -> Self {
        Solver {
            rules,
            dealer_cache: HashMap::new(),
            hit_cache: HashMap::new(),
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Evaluate one decision point: the player's cards against the dealer's
    /// upcard, with everything else still in the deck.
    ///
    /// Input validation runs before any recursion; a busted hand resolves
    /// to an immediate loss without simulating the dealer at all.
    pub fn solve(
        &mut self,
        player_cards: &[Card],
        upcard: Card,
    ) -> Result<SolverResult, SolverError> {
        let (hand, deck) = self.prepared(player_cards, upcard)?;

        let possible = hand.possible_totals();
        let best = best_total(&possible);
        let bust = best > 21;
        let special = hand.special();
        let multiplier = special.multiplier();

        let state = HandState::of(&hand);
        let dealer = HandState::from_upcard(upcard);

        let (stand_ev, hit_ev) = if bust {
            (LOSS, None)
        } else {
            let stand = self.stand_ev(state, multiplier, deck, dealer);
            let locked = (self.rules.naturals_auto_stand && special.is_natural())
                || hand.len() >= MAX_HAND_CARDS;
            let hit = if locked {
                None
            } else {
                Some(self.hit_ev(state, deck, dealer))
            };
            (stand, hit)
        };

        let action = match hit_ev {
            Some(hit) if hit > stand_ev => Action::Hit,
            Some(hit) if hit == stand_ev => self.rules.tie_break,
            _ => Action::Stand,
        };
        let best_ev = hit_ev.map_or(stand_ev, |hit| hit.max(stand_ev));

        log::debug!(
            "solved {hand} vs {upcard}: {action:?} (stand {stand_ev:.4}, hit {hit_ev:?})"
        );

        Ok(SolverResult {
            player: player_cards.to_vec(),
            upcard,
            possible_totals: possible,
            best_total: best,
            bust,
            special,
            payout_multiplier: multiplier,
            stand_ev,
            hit_ev,
            action,
            best_ev,
        })
    }

    /// EV of standing with the given hand, validated like `solve`.
    pub fn stand_ev_of(
        &mut self,
        player_cards: &[Card],
        upcard: Card,
    ) -> Result<f64, SolverError> {
        let (hand, deck) = self.prepared(player_cards, upcard)?;
        if hand.is_bust() {
            return Ok(LOSS);
        }
        let state = HandState::of(&hand);
        let dealer = HandState::from_upcard(upcard);
        Ok(self.stand_ev(state, hand.special().multiplier(), deck, dealer))
    }

    /// EV of hitting with the given hand. Requesting it at the five-card
    /// cap or on a busted hand is an illegal action, not a number.
    pub fn hit_ev_of(&mut self, player_cards: &[Card], upcard: Card) -> Result<f64, SolverError> {
        let (hand, deck) = self.prepared(player_cards, upcard)?;
        if hand.is_bust() {
            return Err(SolverError::IllegalHit("hand is busted"));
        }
        if hand.len() >= MAX_HAND_CARDS {
            return Err(SolverError::IllegalHit("hand already holds five cards"));
        }
        let state = HandState::of(&hand);
        let dealer = HandState::from_upcard(upcard);
        Ok(self.hit_ev(state, deck, dealer))
    }

    /// Exact dealer-outcome distribution after removing the known cards
    /// (the player's hand plus the upcard) from a full deck.
    pub fn dealer_distribution(
        &mut self,
        player_cards: &[Card],
        upcard: Card,
    ) -> Result<DealerOutcomes, SolverError> {
        let (_, deck) = self.prepared(player_cards, upcard)?;
        Ok(self.dealer_outcomes(deck, HandState::from_upcard(upcard)))
    }

    fn prepared(
        &self,
        player_cards: &[Card],
        upcard: Card,
    ) -> Result<(Hand, Deck), SolverError> {
        if player_cards.is_empty() || player_cards.len() > MAX_HAND_CARDS {
            return Err(SolverError::HandSize(player_cards.len()));
        }
        let mut known = player_cards.to_vec();
        known.push(upcard);
        let deck = Deck::excluding(&known)?;
        Ok((Hand::new(player_cards.to_vec()), deck))
    }

    // ── Dealer distribution ──

    /// The dealer plays blind: hit while the best total is below
    /// `dealer_stand_min`, stand otherwise, with the five-card cap and an
    /// exhausted deck both forcing a stand. Each draw is weighted by its
    /// remaining count over the remaining total.
    fn dealer_outcomes(&mut self, deck: Deck, dealer: HandState) -> DealerOutcomes {
        let key = (deck, dealer);
        if let Some(&cached) = self.dealer_cache.get(&key) {
            return cached;
        }

        let best = dealer.best_total();
        let result = if best > 21 {
            DealerOutcomes::busted()
        } else if best >= self.rules.dealer_stand_min
            || dealer.cards as usize >= MAX_HAND_CARDS
            || deck.total() == 0
        {
            DealerOutcomes::standing(best)
        } else {
            let mut outcomes = DealerOutcomes::empty();
            let total = deck.total() as f64;
            for rank in Rank::ALL {
                let remaining = deck.count(rank);
                if remaining == 0 {
                    continue;
                }
                let p = remaining as f64 / total;
                let sub = self.dealer_outcomes(deck.removing(rank), dealer.with_draw(rank));
                outcomes.accumulate(&sub, p);
            }
            debug_assert!(
                (outcomes.mass() - 1.0).abs() < 1e-9,
                "dealer outcome mass {}",
                outcomes.mass()
            );
            outcomes
        };

        self.dealer_cache.insert(key, result);
        result
    }

    // ── Expected values ──

    /// EV of standing now: fold the dealer distribution against the
    /// player's best total, paying `multiplier` units on a win, forfeiting
    /// the unit stake on a loss, even money back on a push.
    fn stand_ev(
        &mut self,
        state: HandState,
        multiplier: f64,
        deck: Deck,
        dealer: HandState,
    ) -> f64 {
        let player_total = state.best_total();
        let outcomes = self.dealer_outcomes(deck, dealer);

        let mut ev = outcomes.bust * multiplier;
        for dealer_total in 0..=21u16 {
            let p = outcomes.stand_probability(dealer_total);
            if p == 0.0 {
                continue;
            }
            if player_total > dealer_total {
                ev += p * multiplier;
            } else if player_total < dealer_total {
                ev += p * LOSS;
            }
        }
        ev
    }

    /// EV of hitting now: branch over every drawable rank at its exact
    /// probability. A bust forfeits the stake at that branch's weight; a
    /// live hand continues with the better of standing and hitting again.
    fn hit_ev(&mut self, state: HandState, deck: Deck, dealer: HandState) -> f64 {
        let key = (deck, state, dealer);
        if let Some(&cached) = self.hit_cache.get(&key) {
            return cached;
        }

        let total = deck.total() as f64;
        if deck.total() == 0 {
            return LOSS;
        }

        let mut ev = 0.0;
        for rank in Rank::ALL {
            let remaining = deck.count(rank);
            if remaining == 0 {
                continue;
            }
            let p = remaining as f64 / total;
            let next = state.with_draw(rank);
            let next_deck = deck.removing(rank);
            if next.is_bust() {
                ev += p * LOSS;
            } else {
                let stand = self.stand_ev(next, next.drawn_multiplier(), next_deck, dealer);
                let best = if (next.cards as usize) < MAX_HAND_CARDS {
                    stand.max(self.hit_ev(next, next_deck, dealer))
                } else {
                    stand
                };
                ev += p * best;
            }
        }

        self.hit_cache.insert(key, ev);
        ev
    }
}

/// One-shot evaluation under the default house rules. Pure: identical
/// inputs produce bit-identical results.
pub fn solve_hand(player_cards: &[Card], upcard: Card) -> Result<SolverResult, SolverError> {
    Solver::new(Rules::default()).solve(player_cards, upcard)
}
