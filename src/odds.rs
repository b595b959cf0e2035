use serde::{Deserialize, Serialize};

use crate::error::{SeatError, SeatResult};
use crate::game::Street;

/// Unseen cards after the flop: 52 minus two hole cards and three board cards.
pub const MAX_OUTS: u32 = 47;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EquitySource {
    Outs,
    Simulation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Call,
    Fold,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OddsReport {
    pub pot: u64,
    pub bet: u64,
    pub call_ratio: f64,
    pub pot_odds_pct: f64,
    pub equity_pct: Option<f64>,
    pub equity_source: Option<EquitySource>,
    pub recommendation: Option<Recommendation>,
}

/// Share of the final pot the caller contributes: `bet / (pot + bet)`.
pub fn call_ratio(pot: u64, bet: u64) -> SeatResult<f64> {
    if pot == 0 && bet == 0 {
        return Err(SeatError::validation(
            "pot odds are undefined when both pot and bet are 0",
        ));
    }
    Ok(bet as f64 / (pot + bet) as f64)
}

/// Rule of four and two: outs x 4 with two cards to come, outs x 2 with one.
pub fn outs_equity(outs: u32, street: Street) -> SeatResult<f64> {
    if outs > MAX_OUTS {
        return Err(SeatError::validation(format!(
            "outs must be at most {MAX_OUTS}, got {outs}"
        )));
    }
    let multiplier = match street {
        Street::Flop => 4,
        Street::Turn => 2,
        Street::Preflop | Street::River => {
            return Err(SeatError::validation(format!(
                "outs only apply on the flop or turn, not {}",
                street_name(street)
            )));
        }
    };
    Ok(f64::from((outs * multiplier).min(100)))
}

fn street_name(street: Street) -> &'static str {
    match street {
        Street::Preflop => "preflop",
        Street::Flop => "flop",
        Street::Turn => "turn",
        Street::River => "river",
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl OddsReport {
    pub fn new(pot: u64, bet: u64) -> SeatResult<Self> {
        let call_ratio = call_ratio(pot, bet)?;
        Ok(Self {
            pot,
            bet,
            call_ratio,
            pot_odds_pct: round2(call_ratio * 100.0),
            equity_pct: None,
            equity_source: None,
            recommendation: None,
        })
    }

    /// Attach an equity estimate (percent) and derive the call/fold advice.
    pub fn with_equity(mut self, equity_pct: f64, source: EquitySource) -> Self {
        let equity_pct = round2(equity_pct.clamp(0.0, 100.0));
        self.recommendation = Some(if equity_pct >= self.call_ratio * 100.0 {
            Recommendation::Call
        } else {
            Recommendation::Fold
        });
        self.equity_pct = Some(equity_pct);
        self.equity_source = Some(source);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_bet_over_final_pot() {
        let ratio = call_ratio(20, 15).unwrap();
        assert!((ratio - 15.0 / 35.0).abs() < 1e-12);
        assert_eq!(call_ratio(0, 10).unwrap(), 1.0);
    }

    #[test]
    fn empty_pot_and_bet_is_rejected() {
        assert!(matches!(call_ratio(0, 0), Err(SeatError::Validation(_))));
    }

    #[test]
    fn outs_multiplier_depends_on_street() {
        assert_eq!(outs_equity(9, Street::Flop).unwrap(), 36.0);
        assert_eq!(outs_equity(9, Street::Turn).unwrap(), 18.0);
        assert_eq!(outs_equity(30, Street::Flop).unwrap(), 100.0);
        assert!(outs_equity(9, Street::River).is_err());
        assert!(outs_equity(9, Street::Preflop).is_err());
        assert!(outs_equity(48, Street::Flop).is_err());
    }

    #[test]
    fn recommendation_compares_equity_to_price() {
        let report = OddsReport::new(100, 50).unwrap();
        assert_eq!(report.pot_odds_pct, 33.33);
        let call = report.clone().with_equity(36.0, EquitySource::Outs);
        assert_eq!(call.recommendation, Some(Recommendation::Call));
        let fold = report.with_equity(18.0, EquitySource::Outs);
        assert_eq!(fold.recommendation, Some(Recommendation::Fold));
    }
}
