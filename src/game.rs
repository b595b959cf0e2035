use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use uuid::Uuid;

use crate::cards::Card;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    #[default]
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    /// Street implied by the number of community cards, if that count is legal.
    pub fn from_board_len(len: usize) -> Option<Self> {
        match len {
            0 => Some(Street::Preflop),
            3 => Some(Street::Flop),
            4 => Some(Street::Turn),
            5 => Some(Street::River),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    Button,
    SmallBlind,
    BigBlind,
    #[default]
    Other,
}

/// Table position label relative to the button.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Position {
    #[serde(rename = "BTN")]
    Button,
    #[serde(rename = "SB")]
    SmallBlind,
    #[serde(rename = "BB")]
    BigBlind,
    #[serde(rename = "UTG")]
    UnderTheGun,
    #[serde(rename = "UTG+1")]
    UnderTheGun1,
    #[serde(rename = "UTG+2")]
    UnderTheGun2,
    #[serde(rename = "MP")]
    Middle,
    #[serde(rename = "MP+1")]
    Middle1,
    #[serde(rename = "HJ")]
    Hijack,
    #[serde(rename = "CO")]
    Cutoff,
}

impl Position {
    pub fn label(self) -> &'static str {
        match self {
            Position::Button => "BTN",
            Position::SmallBlind => "SB",
            Position::BigBlind => "BB",
            Position::UnderTheGun => "UTG",
            Position::UnderTheGun1 => "UTG+1",
            Position::UnderTheGun2 => "UTG+2",
            Position::Middle => "MP",
            Position::Middle1 => "MP+1",
            Position::Hijack => "HJ",
            Position::Cutoff => "CO",
        }
    }

    pub fn parse_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_uppercase();
        [
            Position::Button,
            Position::SmallBlind,
            Position::BigBlind,
            Position::UnderTheGun,
            Position::UnderTheGun1,
            Position::UnderTheGun2,
            Position::Middle,
            Position::Middle1,
            Position::Hijack,
            Position::Cutoff,
        ]
        .into_iter()
        .find(|position| position.label() == label)
    }

    /// Position of `seat` at a table of `seats` players with the button on `button`.
    ///
    /// The two seats after the button are the blinds. With five or more players the
    /// seat before the button is the cutoff, and the seats in between fill from
    /// under the gun towards the hijack.
    pub fn for_seat(seat: usize, button: usize, seats: usize) -> Self {
        let offset = (seat + seats - button % seats) % seats;
        match offset {
            0 => return Position::Button,
            1 => return Position::SmallBlind,
            2 => return Position::BigBlind,
            _ => {}
        }
        if seats >= 5 && offset == seats - 1 {
            return Position::Cutoff;
        }

        let middle: &[Position] = match seats {
            0..=6 => &[Position::UnderTheGun, Position::Middle],
            7 => &[Position::UnderTheGun, Position::Middle, Position::Hijack],
            8 => &[
                Position::UnderTheGun,
                Position::UnderTheGun1,
                Position::Middle,
                Position::Hijack,
            ],
            9 => &[
                Position::UnderTheGun,
                Position::UnderTheGun1,
                Position::Middle,
                Position::Middle1,
                Position::Hijack,
            ],
            _ => &[
                Position::UnderTheGun,
                Position::UnderTheGun1,
                Position::UnderTheGun2,
                Position::Middle,
                Position::Middle1,
                Position::Hijack,
            ],
        };
        middle
            .get(offset - 3)
            .copied()
            .unwrap_or(Position::Middle)
    }

    pub fn seat(self) -> Seat {
        match self {
            Position::Button => Seat::Button,
            Position::SmallBlind => Seat::SmallBlind,
            Position::BigBlind => Seat::BigBlind,
            _ => Seat::Other,
        }
    }

    pub fn is_late(self) -> bool {
        matches!(self, Position::Button | Position::Cutoff)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    pub stack: u64,
    pub seat: Seat,
    pub position: Position,
    #[serde(default)]
    pub tendencies: Vec<String>,
}

/// The agent's two private cards.
///
/// Only ever written to the session file; `Debug` is redacted so the cards cannot
/// leak through logs.
#[serde_as]
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HoleCards(#[serde_as(as = "[DisplayFromStr; 2]")] pub [Card; 2]);

impl Debug for HoleCards {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("HoleCards(<hidden>)")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HandPhase {
    #[default]
    HandStart,
    CardsCaptured,
    StateUpdated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CaptureRecord {
    pub count: u32,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

/// Full session snapshot as stored in `current_game.json`.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GameState {
    pub session_id: Uuid,
    pub hand_number: u32,
    pub pot: u64,
    pub street: Street,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub community_cards: Vec<Card>,
    pub players: Vec<Player>,
    pub button_seat: usize,
    pub to_act: Option<String>,
    pub last_action: Option<String>,
    pub action_history: Vec<String>,
    pub phase: HandPhase,
    pub capture: CaptureRecord,
    pub hole_cards: Option<HoleCards>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            hand_number: 0,
            pot: 0,
            street: Street::Preflop,
            community_cards: Vec::new(),
            players: Vec::new(),
            button_seat: 0,
            to_act: None,
            last_action: None,
            action_history: Vec::new(),
            phase: HandPhase::HandStart,
            capture: CaptureRecord::default(),
            hole_cards: None,
        }
    }
}

impl GameState {
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.name == name)
    }

    /// Recompute every seat and position from seat order and the button.
    pub fn assign_positions(&mut self) {
        let seats = self.players.len();
        if seats == 0 {
            return;
        }
        self.button_seat %= seats;
        for (index, player) in self.players.iter_mut().enumerate() {
            player.position = Position::for_seat(index, self.button_seat, seats);
            player.seat = player.position.seat();
        }
    }

    /// Clear everything scoped to a single hand.
    pub fn reset_hand(&mut self) {
        self.pot = 0;
        self.street = Street::Preflop;
        self.community_cards.clear();
        self.to_act = None;
        self.last_action = None;
        self.action_history.clear();
        self.phase = HandPhase::HandStart;
        self.capture = CaptureRecord::default();
        self.hole_cards = None;
    }

    /// Externally visible view of the state. Hole cards have no field here.
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            session_id: self.session_id,
            hand_number: self.hand_number,
            pot: self.pot,
            street: self.street,
            community_cards: self.community_cards.clone(),
            players: self.players.clone(),
            button: self
                .players
                .get(self.button_seat)
                .map(|player| player.name.clone()),
            to_act: self.to_act.clone(),
            last_action: self.last_action.clone(),
            actions_this_hand: self.action_history.len(),
            phase: self.phase,
            hole_cards_recorded: self.hole_cards.is_some(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSummary {
    pub session_id: Uuid,
    pub hand_number: u32,
    pub pot: u64,
    pub street: Street,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub community_cards: Vec<Card>,
    pub players: Vec<Player>,
    pub button: Option<String>,
    pub to_act: Option<String>,
    pub last_action: Option<String>,
    pub actions_this_hand: usize,
    pub phase: HandPhase,
    pub hole_cards_recorded: bool,
}

/// Long-lived record of what an opponent has shown across sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PlayerStats {
    pub sessions: u32,
    pub hands_observed: u32,
    pub folds: u32,
    pub checks: u32,
    pub calls: u32,
    pub bets: u32,
    pub raises: u32,
    pub all_ins: u32,
    pub tendencies: Vec<String>,
}

impl PlayerStats {
    pub fn record(&mut self, action: PlayerAction) {
        let counter = match action {
            PlayerAction::Fold => &mut self.folds,
            PlayerAction::Check => &mut self.checks,
            PlayerAction::Call => &mut self.calls,
            PlayerAction::Bet => &mut self.bets,
            PlayerAction::Raise => &mut self.raises,
            PlayerAction::AllIn => &mut self.all_ins,
        };
        *counter += 1;
    }

    pub fn note(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() && !self.tendencies.iter().any(|existing| existing == tag) {
            self.tendencies.push(tag.to_string());
        }
    }

    /// Share of voluntary actions that were bets or raises.
    pub fn aggression(&self) -> Option<f64> {
        let aggressive = self.bets + self.raises + self.all_ins;
        let total = aggressive + self.calls + self.checks + self.folds;
        (total > 0).then(|| aggressive as f64 / total as f64)
    }
}

pub type StatsBook = BTreeMap<String, PlayerStats>;
