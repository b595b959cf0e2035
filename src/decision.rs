use serde::{Deserialize, Serialize};

use crate::cards::Rank;
use crate::error::{SeatError, SeatResult};
use crate::game::Position;

const TRASH_HANDS: [&str; 8] = ["72", "82", "83", "92", "93", "J2", "T2", "J3"];
const OVERSIZED_BET: f64 = 0.7;
const CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Fold,
    Call,
    Raise,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advice {
    pub decision: Decision,
    pub reasoning: String,
    pub confidence: f64,
}

/// Two ranks in hand shorthand (`AK`, `72`, `T9`), higher rank first.
/// A trailing `s` / `o` for suitedness is accepted and ignored.
pub fn normalize_hand(hand: &str) -> SeatResult<String> {
    let hand = hand.trim();
    let core = hand.strip_suffix(['s', 'o']).unwrap_or(hand);
    let ranks: Vec<char> = core.chars().collect();
    let [a, b] = ranks.as_slice() else {
        return Err(SeatError::validation(format!(
            "hand '{hand}' must be two ranks such as 'AK' or '72'"
        )));
    };
    let a = Rank::from_letter(a.to_ascii_uppercase())?;
    let b = Rank::from_letter(b.to_ascii_uppercase())?;
    let (high, low) = if a >= b { (a, b) } else { (b, a) };
    Ok(format!("{high}{low}"))
}

/// Rough preflop-style advice: junk folds, late position raises, oversized
/// bets fold, everything else calls.
pub fn advise(hand: &str, position: &str, pot: u64, bet: u64) -> SeatResult<Advice> {
    let hand = normalize_hand(hand)?;
    let position = Position::parse_label(position).ok_or_else(|| {
        SeatError::validation(format!(
            "unknown position '{position}' (expected BTN, SB, BB, UTG, MP, HJ, CO, ...)"
        ))
    })?;

    let (decision, reasoning) = if TRASH_HANDS.contains(&hand.as_str()) {
        (Decision::Fold, "Garbage hand, not worth playing")
    } else if position.is_late() {
        (Decision::Raise, "Good position, apply pressure")
    } else if bet as f64 > pot as f64 * OVERSIZED_BET {
        (Decision::Fold, "Bet too large relative to pot")
    } else {
        (Decision::Call, "Decent spot, see what develops")
    };

    Ok(Advice {
        decision,
        reasoning: reasoning.to_string(),
        confidence: CONFIDENCE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hands_normalise_high_card_first() {
        assert_eq!(normalize_hand("27").unwrap(), "72");
        assert_eq!(normalize_hand("kAs").unwrap(), "AK");
        assert!(normalize_hand("AKQ").is_err());
        assert!(normalize_hand("A1").is_err());
    }

    #[test]
    fn junk_folds_even_on_the_button() {
        let advice = advise("72o", "BTN", 30, 10).unwrap();
        assert_eq!(advice.decision, Decision::Fold);
    }

    #[test]
    fn late_position_raises_and_big_bets_fold() {
        assert_eq!(advise("AQ", "co", 30, 10).unwrap().decision, Decision::Raise);
        assert_eq!(advise("AQ", "UTG", 30, 25).unwrap().decision, Decision::Fold);
        assert_eq!(advise("AQ", "UTG", 30, 10).unwrap().decision, Decision::Call);
        assert!(advise("AQ", "dealer", 30, 10).is_err());
    }
}
