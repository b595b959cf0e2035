use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::cards::Card;
use crate::error::{SeatError, SeatResult};
use crate::game::{
    GameState, HandPhase, HoleCards, MAX_PLAYERS, MIN_PLAYERS, Player, PlayerAction, Position,
    Seat, StatsBook, Street,
};

pub const GAME_FILE: &str = "current_game.json";
pub const STATS_FILE: &str = "player_stats.json";

/// One seat as supplied to `setup_game`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlayerSetup {
    pub name: String,
    #[serde(alias = "chips")]
    pub stack: i64,
    #[serde(default)]
    pub seat: Seat,
}

impl PlayerSetup {
    pub fn new(name: impl Into<String>, stack: i64, seat: Seat) -> Self {
        Self {
            name: name.into(),
            stack,
            seat,
        }
    }
}

/// Partial change to the current hand. Absent fields are left alone.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StateUpdate {
    pub pot: Option<i64>,
    pub last_action: Option<String>,
    #[serde_as(as = "Option<Vec<DisplayFromStr>>")]
    pub community_cards: Option<Vec<Card>>,
    pub to_act: Option<String>,
    #[serde(default)]
    pub chip_updates: BTreeMap<String, i64>,
    #[serde(default)]
    pub player_actions: BTreeMap<String, PlayerAction>,
    /// Free-text tendency tags, kept across sessions.
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
    #[serde(default)]
    pub action_history: Vec<String>,
}

/// JSON-file backed session state. Owns nothing in memory: every operation is a
/// whole-document read, modify, write.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn open(dir: impl Into<PathBuf>) -> SeatResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| SeatError::persistence(&dir, err))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn game_path(&self) -> PathBuf {
        self.dir.join(GAME_FILE)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.dir.join(STATS_FILE)
    }

    /// Current game, or an empty one when the file is absent or unusable.
    pub fn load(&self) -> GameState {
        read_json(&self.game_path()).unwrap_or_default()
    }

    pub fn save(&self, state: &GameState) -> SeatResult<()> {
        write_json(&self.game_path(), state)
    }

    pub fn load_stats(&self) -> StatsBook {
        read_json(&self.stats_path()).unwrap_or_default()
    }

    pub fn save_stats(&self, stats: &StatsBook) -> SeatResult<()> {
        write_json(&self.stats_path(), stats)
    }

    /// Replace the session with a fresh table. Hand number starts at 0.
    pub fn setup(&self, seats: &[PlayerSetup]) -> SeatResult<GameState> {
        validate_setup(seats)?;
        let mut stats = self.load_stats();

        let players = seats
            .iter()
            .map(|setup| {
                let name = setup.name.trim().to_string();
                let record = stats.entry(name.clone()).or_default();
                record.sessions += 1;
                Player {
                    name,
                    stack: setup.stack.unsigned_abs(),
                    seat: setup.seat,
                    position: Position::Button,
                    tendencies: record.tendencies.clone(),
                }
            })
            .collect();

        let mut state = GameState {
            players,
            button_seat: seats
                .iter()
                .position(|setup| setup.seat == Seat::Button)
                .unwrap_or(0),
            ..GameState::default()
        };
        state.assign_positions();
        check_blind_labels(seats, &state)?;

        self.save(&state)?;
        self.save_stats(&stats)?;
        info!(
            session = %state.session_id,
            players = state.players.len(),
            "game set up"
        );
        Ok(state)
    }

    /// Start the next hand: bump the counter, clear the board, move the button
    /// one seat.
    pub fn new_hand(&self) -> SeatResult<GameState> {
        let mut state = self.load();
        require_table(&state)?;
        let finished = state.hand_number > 0;

        state.button_seat = (state.button_seat + 1) % state.players.len();
        state.hand_number += 1;
        state.reset_hand();
        state.assign_positions();
        self.save(&state)?;

        // Credit the finished hand only after the new one is saved.
        if finished {
            let mut stats = self.load_stats();
            for player in &state.players {
                stats.entry(player.name.clone()).or_default().hands_observed += 1;
            }
            self.save_stats(&stats)?;
        }

        info!(
            hand = state.hand_number,
            button = state.players[state.button_seat].name.as_str(),
            "new hand"
        );
        Ok(state)
    }

    /// Merge `update` into the current hand. Nothing is written unless every
    /// field validates.
    pub fn update(&self, update: &StateUpdate) -> SeatResult<GameState> {
        let mut state = self.load();
        require_table(&state)?;
        let mut stats = self.load_stats();
        let stats_changed = apply_update(&mut state, &mut stats, update)?;

        self.save(&state)?;
        if stats_changed {
            self.save_stats(&stats)?;
        }
        debug!(pot = state.pot, street = ?state.street, "state updated");
        Ok(state)
    }

    pub fn record_hole_cards(&self, cards: [Card; 2]) -> SeatResult<()> {
        let mut state = self.load();
        require_table(&state)?;
        if cards[0] == cards[1] {
            return Err(SeatError::validation("hole cards must be two different cards"));
        }
        if cards.iter().any(|card| state.community_cards.contains(card)) {
            return Err(SeatError::validation(
                "hole cards cannot also be community cards",
            ));
        }
        state.hole_cards = Some(HoleCards(cards));
        self.save(&state)?;
        info!(hand = state.hand_number, "hole cards recorded");
        Ok(())
    }

    /// Fails unless `setup` has seated a table.
    pub fn ensure_table(&self) -> SeatResult<()> {
        require_table(&self.load())
    }

    /// Note a fresh capture for this hand and return how many were taken.
    pub fn record_capture(&self, image_path: &Path) -> SeatResult<u32> {
        let mut state = self.load();
        require_table(&state)?;
        state.capture.count += 1;
        state.capture.image_path = Some(image_path.display().to_string());
        state.phase = HandPhase::CardsCaptured;
        self.save(&state)?;
        Ok(state.capture.count)
    }
}

fn require_table(state: &GameState) -> SeatResult<()> {
    if state.players.is_empty() {
        return Err(SeatError::validation(
            "no game in progress; call setup_game first",
        ));
    }
    Ok(())
}

fn validate_setup(seats: &[PlayerSetup]) -> SeatResult<()> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&seats.len()) {
        return Err(SeatError::validation(format!(
            "a table needs {MIN_PLAYERS} to {MAX_PLAYERS} players, got {}",
            seats.len()
        )));
    }

    let mut names = HashSet::new();
    for setup in seats {
        let name = setup.name.trim();
        if name.is_empty() {
            return Err(SeatError::validation("player names must not be empty"));
        }
        if !names.insert(name) {
            return Err(SeatError::validation(format!(
                "duplicate player name '{name}'"
            )));
        }
        if setup.stack < 0 {
            return Err(SeatError::validation(format!(
                "player '{name}' has a negative stack ({})",
                setup.stack
            )));
        }
    }

    for seat in [Seat::Button, Seat::SmallBlind, Seat::BigBlind] {
        if seats.iter().filter(|setup| setup.seat == seat).count() > 1 {
            return Err(SeatError::validation(format!(
                "more than one player in the {seat:?} seat"
            )));
        }
    }
    Ok(())
}

/// Blind labels given at setup must agree with the seats derived from the button.
fn check_blind_labels(seats: &[PlayerSetup], state: &GameState) -> SeatResult<()> {
    for (setup, player) in seats.iter().zip(&state.players) {
        if matches!(setup.seat, Seat::SmallBlind | Seat::BigBlind) && setup.seat != player.seat {
            return Err(SeatError::validation(format!(
                "player '{}' is labeled {:?} but sits in the {:?} seat for this button",
                player.name, setup.seat, player.seat
            )));
        }
    }
    Ok(())
}

fn known_player<'a>(state: &GameState, name: &'a str) -> SeatResult<&'a str> {
    if state.player(name).is_none() {
        return Err(SeatError::validation(format!(
            "unknown player '{name}'"
        )));
    }
    Ok(name)
}

/// Returns whether the long-lived stats changed.
fn apply_update(
    state: &mut GameState,
    stats: &mut StatsBook,
    update: &StateUpdate,
) -> SeatResult<bool> {
    if let Some(pot) = update.pot {
        if pot < 0 {
            return Err(SeatError::validation(format!("pot cannot be negative ({pot})")));
        }
        let pot = pot.unsigned_abs();
        if pot < state.pot {
            return Err(SeatError::validation(format!(
                "pot cannot shrink within a hand ({} -> {pot}); start a new hand instead",
                state.pot
            )));
        }
        state.pot = pot;
    }

    if let Some(board) = &update.community_cards {
        let street = Street::from_board_len(board.len()).ok_or_else(|| {
            SeatError::validation(format!(
                "a board holds 0, 3, 4 or 5 cards, got {}",
                board.len()
            ))
        })?;
        if !board.starts_with(&state.community_cards) {
            return Err(SeatError::validation(
                "community cards already dealt this hand cannot change or be removed",
            ));
        }
        let unique: HashSet<&Card> = board.iter().collect();
        if unique.len() != board.len() {
            return Err(SeatError::validation("community cards contain a duplicate"));
        }
        if let Some(hole) = &state.hole_cards {
            if hole.0.iter().any(|card| unique.contains(card)) {
                return Err(SeatError::validation(
                    "community cards cannot include a recorded hole card",
                ));
            }
        }
        state.community_cards = board.clone();
        state.street = street;
    }

    if let Some(name) = &update.to_act {
        state.to_act = Some(known_player(state, name)?.to_string());
    }

    for (name, stack) in &update.chip_updates {
        known_player(state, name)?;
        if *stack < 0 {
            return Err(SeatError::validation(format!(
                "player '{name}' cannot have a negative stack ({stack})"
            )));
        }
        if let Some(player) = state.player_mut(name) {
            player.stack = stack.unsigned_abs();
        }
    }

    let mut stats_changed = false;
    for (name, action) in &update.player_actions {
        known_player(state, name)?;
        stats.entry(name.clone()).or_default().record(*action);
        state.action_history.push(format!("{name} {}", action_label(*action)));
        stats_changed = true;
    }

    for (name, note) in &update.notes {
        known_player(state, name)?;
        stats.entry(name.clone()).or_default().note(note);
        if let Some(player) = state.player_mut(name) {
            let tag = note.trim();
            if !tag.is_empty() && !player.tendencies.iter().any(|existing| existing == tag) {
                player.tendencies.push(tag.to_string());
            }
        }
        stats_changed = true;
    }

    state
        .action_history
        .extend(update.action_history.iter().cloned());
    if let Some(action) = &update.last_action {
        state.last_action = Some(action.clone());
    }
    state.phase = HandPhase::StateUpdated;
    Ok(stats_changed)
}

fn action_label(action: PlayerAction) -> &'static str {
    match action {
        PlayerAction::Fold => "folds",
        PlayerAction::Check => "checks",
        PlayerAction::Call => "calls",
        PlayerAction::Bet => "bets",
        PlayerAction::Raise => "raises",
        PlayerAction::AllIn => "goes all in",
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no saved file, starting fresh");
            return None;
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unreadable file, starting fresh");
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "malformed file, starting fresh");
            None
        }
    }
}

/// Write to a sibling temp file and rename it into place.
fn write_json<T: Serialize>(path: &Path, value: &T) -> SeatResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let json = serde_json::to_vec_pretty(value)
        .map_err(|err| SeatError::persistence(path, io::Error::other(err)))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|err| SeatError::persistence(path, err))?;
    file.write_all(&json)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|err| SeatError::persistence(path, err))?;
    file.persist(path)
        .map_err(|err| SeatError::persistence(path, err.error))?;
    debug!(path = %path.display(), bytes = json.len(), "saved");
    Ok(())
}
