use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::SeatError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    PreDecision,
    FoldingTrash,
    Calling,
    Raising,
    WinningPot,
    LosingHand,
    OpponentBadCall,
}

impl Situation {
    pub const ALL: [Situation; 7] = [
        Situation::PreDecision,
        Situation::FoldingTrash,
        Situation::Calling,
        Situation::Raising,
        Situation::WinningPot,
        Situation::LosingHand,
        Situation::OpponentBadCall,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Situation::PreDecision => "pre_decision",
            Situation::FoldingTrash => "folding_trash",
            Situation::Calling => "calling",
            Situation::Raising => "raising",
            Situation::WinningPot => "winning_pot",
            Situation::LosingHand => "losing_hand",
            Situation::OpponentBadCall => "opponent_bad_call",
        }
    }

    pub fn phrases(self) -> &'static [&'static str] {
        match self {
            Situation::PreDecision => &[
                "Let me think about this one",
                "Interesting spot we got here",
                "Someone's feeling confident",
            ],
            Situation::FoldingTrash => &[
                "Even AI knows when to quit",
                "Not worth my processing power",
                "Saving my chips for real hands",
            ],
            Situation::Calling => &[
                "Let's see what you got",
                "I'll pay to watch this play out",
                "Curiosity gets the best of me",
            ],
            Situation::Raising => &[
                "Time to apply some pressure",
                "Let's make this interesting",
                "Hope you brought your checkbook",
            ],
            Situation::WinningPot => &[
                "Calculations always win",
                "Thanks for the donation",
                "Math beats luck every time",
            ],
            Situation::LosingHand => &[
                "Even algorithms have bad beats",
                "Nice hand",
                "You got me that time",
            ],
            Situation::OpponentBadCall => &[
                "Bold strategy",
                "Interesting odds calculation there",
                "Hope that works out for you",
            ],
        }
    }
}

impl FromStr for Situation {
    type Err = SeatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Situation::ALL
            .into_iter()
            .find(|situation| situation.tag() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Situation::ALL.iter().map(|s| s.tag()).collect();
                SeatError::validation(format!(
                    "unknown situation '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrashTalk {
    pub trash_talk: String,
    pub situation: Situation,
    pub target: Option<String>,
}

/// Pick a line for `situation`, addressed to `target` when given.
pub fn trash_talk<R: Rng + ?Sized>(
    rng: &mut R,
    situation: Situation,
    target: Option<&str>,
) -> TrashTalk {
    let line = situation
        .phrases()
        .choose(rng)
        .copied()
        .unwrap_or("Nice hand");
    let target = target
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let trash_talk = match &target {
        Some(name) => format!("{name}, {}{}", lowercase_first(line), punctuation(line)),
        None => format!("{line}{}", punctuation(line)),
    };
    TrashTalk {
        trash_talk,
        situation,
        target,
    }
}

fn lowercase_first(line: &str) -> String {
    // "I" and "I'll" stay capitalised.
    if line.starts_with("I ") || line.starts_with("I'") {
        return line.to_string();
    }
    let mut chars = line.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn punctuation(line: &str) -> &'static str {
    if line.ends_with(['.', '!', '?']) { "" } else { "." }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn every_situation_has_phrases() {
        for situation in Situation::ALL {
            assert_eq!(situation.phrases().len(), 3, "{situation:?}");
            assert_eq!(situation.tag().parse::<Situation>().unwrap(), situation);
        }
    }

    #[test]
    fn unknown_situation_is_a_validation_error() {
        assert!(matches!(
            "gloating".parse::<Situation>(),
            Err(SeatError::Validation(_))
        ));
    }

    #[test]
    fn target_prefixes_the_line() {
        let mut rng = StdRng::seed_from_u64(3);
        let line = trash_talk(&mut rng, Situation::WinningPot, Some("Bob"));
        assert!(line.trash_talk.starts_with("Bob, "), "{}", line.trash_talk);
        assert_eq!(line.target.as_deref(), Some("Bob"));
    }
}
