use serde::{Deserialize, Serialize};

/// Player decision at a solve point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Stand,
    Hit,
}

/// Policy knobs for the fixed house variant. The ace table and the
/// special-hand payout table are the variant itself and are not
/// configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Dealer hits while its best total is below this, then stands.
    pub dealer_stand_min: u16,

    /// Dollars staked per hand. EVs are computed per unit stake; this only
    /// scales them for display.
    pub base_stake: f64,

    /// Resolve a starting Ban Ban, Blackjack or Triple 7s to an immediate
    /// stand instead of offering the hit comparison.
    pub naturals_auto_stand: bool,

    /// Action reported when the stand and hit EVs are exactly equal.
    pub tie_break: Action,
}

impl Default for Rules {
    /// House rules: $2 single-deck, dealer stands at 17, naturals stand.
    fn default() -> Self {
        Rules {
            dealer_stand_min: 17,
            base_stake: 2.0,
            naturals_auto_stand: true,
            tie_break: Action::Stand,
        }
    }
}

impl Rules {
    /// Variant that still offers the hit comparison on a starting natural.
    pub fn naturals_playable() -> Self {
        Rules {
            naturals_auto_stand: false,
            ..Rules::default()
        }
    }
}
