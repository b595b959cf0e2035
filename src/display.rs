use owo_colors::OwoColorize;

use crate::game::{GameSummary, Street};
use crate::odds::{OddsReport, Recommendation};
use crate::talk::TrashTalk;

fn street_label(street: Street) -> &'static str {
    match street {
        Street::Preflop => "Preflop",
        Street::Flop => "Flop",
        Street::Turn => "Turn",
        Street::River => "River",
    }
}

fn board(summary: &GameSummary) -> String {
    if summary.community_cards.is_empty() {
        "--".to_string()
    } else {
        summary
            .community_cards
            .iter()
            .map(|card| card.pretty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn seats(summary: &GameSummary) -> String {
    summary
        .players
        .iter()
        .map(|player| format!("{} {} ({})", player.position.label(), player.name, player.stack))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Table overview. There is no hole-card line to print: the summary has none.
pub fn render_summary(summary: &GameSummary, no_color: bool) -> String {
    if summary.players.is_empty() {
        return "No game in progress".to_string();
    }
    let to_act = summary.to_act.as_deref().unwrap_or("--");
    if no_color {
        format!(
            "Hand {} | {} | Board {} | Pot {} | To act {} | Seats: {}",
            summary.hand_number,
            street_label(summary.street),
            board(summary),
            summary.pot,
            to_act,
            seats(summary)
        )
    } else {
        format!(
            "{} {} {} {} {} {} {} {} {} {}",
            "Hand".bold().cyan(),
            summary.hand_number,
            street_label(summary.street).bold().white(),
            "Board".bold().white(),
            board(summary).bold().blue(),
            "Pot".bold().white(),
            summary.pot.bold().yellow(),
            "To act".bold().white(),
            to_act.bold().green(),
            seats(summary)
        )
    }
}

pub fn render_odds(report: &OddsReport, no_color: bool) -> String {
    let equity = report
        .equity_pct
        .map(|equity| format!("{equity:.2}%"))
        .unwrap_or_else(|| "--".to_string());
    let advice = match report.recommendation {
        Some(Recommendation::Call) => "call",
        Some(Recommendation::Fold) => "fold",
        None => "--",
    };
    if no_color {
        format!(
            "Pot odds: call {} into {} = {:.4} ({:.2}%) | Equity {} | Advice {}",
            report.bet, report.pot, report.call_ratio, report.pot_odds_pct, equity, advice
        )
    } else {
        format!(
            "{} call {} into {} = {:.4} ({:.2}%) {} {} {} {}",
            "Pot odds".bold().magenta(),
            report.bet,
            report.pot,
            report.call_ratio,
            report.pot_odds_pct,
            "Equity".bold().white(),
            equity.bold().yellow(),
            "Advice".bold().white(),
            advice.bold().green()
        )
    }
}

pub fn render_talk(talk: &TrashTalk, no_color: bool) -> String {
    if no_color {
        talk.trash_talk.clone()
    } else {
        talk.trash_talk.italic().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;

    #[test]
    fn empty_table_has_a_plain_message() {
        let summary = GameState::default().summary();
        assert_eq!(render_summary(&summary, true), "No game in progress");
    }

    #[test]
    fn plain_odds_line_is_stable() {
        let report = OddsReport::new(20, 15).unwrap();
        assert_eq!(
            render_odds(&report, true),
            "Pot odds: call 15 into 20 = 0.4286 (42.86%) | Equity -- | Advice --"
        );
    }
}
