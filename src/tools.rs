use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::capture::CardCapture;
use crate::cards::Card;
use crate::config::SeatConfig;
use crate::decision::{Advice, advise};
use crate::equity::simulate_equity;
use crate::error::{SeatError, SeatResult};
use crate::exec::CommandRunner;
use crate::game::{GameSummary, Street};
use crate::odds::{EquitySource, OddsReport, outs_equity};
use crate::store::{PlayerSetup, SessionStore, StateUpdate};
use crate::talk::{Situation, TrashTalk, trash_talk};
use crate::voice::Voice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    SetupGame,
    NewHand,
    CaptureCards,
    RecordHoleCards,
    UpdateGameState,
    PokerOdds,
    PokerDecision,
    PokerSpeak,
    PokerTrashTalk,
    GameState,
}

impl Tool {
    pub const ALL: [Tool; 10] = [
        Tool::SetupGame,
        Tool::NewHand,
        Tool::CaptureCards,
        Tool::RecordHoleCards,
        Tool::UpdateGameState,
        Tool::PokerOdds,
        Tool::PokerDecision,
        Tool::PokerSpeak,
        Tool::PokerTrashTalk,
        Tool::GameState,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::SetupGame => "setup_game",
            Tool::NewHand => "new_hand",
            Tool::CaptureCards => "capture_cards",
            Tool::RecordHoleCards => "record_hole_cards",
            Tool::UpdateGameState => "update_game_state",
            Tool::PokerOdds => "poker_odds",
            Tool::PokerDecision => "poker_decision",
            Tool::PokerSpeak => "poker_speak",
            Tool::PokerTrashTalk => "poker_trash_talk",
            Tool::GameState => "game_state",
        }
    }
}

impl FromStr for Tool {
    type Err = SeatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| SeatError::validation(format!("unknown tool '{s}'")))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetupArgs {
    players: Vec<PlayerSetup>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HoleCardArgs {
    cards: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OddsArgs {
    pub pot: i64,
    pub bet: i64,
    #[serde(default)]
    pub outs: Option<u32>,
    /// Defaults to the street of the current hand.
    #[serde(default)]
    pub street: Option<Street>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DecisionArgs {
    hand: String,
    position: String,
    pot: i64,
    bet: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpeakArgs {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TrashTalkArgs {
    situation: String,
    #[serde(default)]
    target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureStatus {
    pub status: String,
    pub device: String,
    pub image_path: PathBuf,
    pub captures_this_hand: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Acknowledged {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One line of the request protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl From<&SeatError> for ErrorBody {
    fn from(err: &SeatError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ToolResponse {
    pub fn failure(tool: Option<String>, err: &SeatError) -> Self {
        Self {
            tool,
            result: None,
            error: Some(err.into()),
        }
    }
}

fn decode<T: DeserializeOwned>(tool: Tool, arguments: Value) -> SeatResult<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|err| {
        SeatError::validation(format!("invalid arguments for {}: {err}", tool.name()))
    })
}

fn non_negative(field: &str, value: i64) -> SeatResult<u64> {
    u64::try_from(value)
        .map_err(|_| SeatError::validation(format!("{field} cannot be negative ({value})")))
}

fn to_value<T: Serialize>(value: &T) -> SeatResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| SeatError::validation(format!("cannot encode response: {err}")))
}

/// The named operations offered to the agent. Every result is built from
/// `GameSummary` or tool-specific reports, none of which can hold hole cards.
pub struct ToolBox {
    store: SessionStore,
    capture: CardCapture,
    voice: Voice,
    rng: StdRng,
    mc_samples: u32,
}

impl ToolBox {
    pub fn new(store: SessionStore, capture: CardCapture, voice: Voice, config: &SeatConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            capture,
            voice,
            rng,
            mc_samples: config.odds.mc_samples,
        }
    }

    /// Wire the adapters from configuration, all sharing one process runner.
    pub fn from_config(
        store: SessionStore,
        config: &SeatConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let capture = CardCapture::new(config.capture.clone(), runner.clone());
        let voice = Voice::new(config.voice.clone(), runner);
        Self::new(store, capture, voice, config)
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn setup_game(&mut self, players: &[PlayerSetup]) -> SeatResult<GameSummary> {
        Ok(self.store.setup(players)?.summary())
    }

    pub fn new_hand(&mut self) -> SeatResult<GameSummary> {
        Ok(self.store.new_hand()?.summary())
    }

    /// Repeated captures within a hand overwrite the previous image.
    pub fn capture_cards(&mut self) -> SeatResult<CaptureStatus> {
        self.store.ensure_table()?;
        let report = self.capture.capture()?;
        let captures_this_hand = self.store.record_capture(&report.image_path)?;
        Ok(CaptureStatus {
            status: "captured".to_string(),
            device: report.device,
            image_path: report.image_path,
            captures_this_hand,
        })
    }

    pub fn record_hole_cards<S: AsRef<str>>(&mut self, tokens: &[S]) -> SeatResult<Acknowledged> {
        let [first, second] = tokens else {
            return Err(SeatError::validation(format!(
                "exactly 2 hole cards are required, got {}",
                tokens.len()
            )));
        };
        // Parse errors name only the slot, never the token.
        let parse = |slot: usize, token: &S| {
            token.as_ref().parse::<Card>().map_err(|_| {
                SeatError::validation(format!("hole card {slot} is not a valid card token"))
            })
        };
        self.store.record_hole_cards([parse(1, first)?, parse(2, second)?])?;
        Ok(Acknowledged {
            status: "recorded".to_string(),
            text: None,
        })
    }

    pub fn update_game_state(&mut self, update: &StateUpdate) -> SeatResult<GameSummary> {
        Ok(self.store.update(update)?.summary())
    }

    pub fn poker_odds(&mut self, args: &OddsArgs) -> SeatResult<OddsReport> {
        let pot = non_negative("pot", args.pot)?;
        let bet = non_negative("bet", args.bet)?;
        let report = OddsReport::new(pot, bet)?;
        let state = self.store.load();

        if let Some(outs) = args.outs {
            let street = args.street.unwrap_or(state.street);
            return Ok(report.with_equity(outs_equity(outs, street)?, EquitySource::Outs));
        }

        match state.hole_cards {
            Some(hole) => {
                let opponents = state.players.len().saturating_sub(1).max(1);
                let equity = simulate_equity(
                    &hole.0,
                    &state.community_cards,
                    opponents,
                    self.mc_samples,
                    &mut self.rng,
                );
                debug!(opponents, samples = self.mc_samples, "equity simulated");
                Ok(report.with_equity(equity * 100.0, EquitySource::Simulation))
            }
            None => Ok(report),
        }
    }

    pub fn poker_decision(&mut self, hand: &str, position: &str, pot: i64, bet: i64) -> SeatResult<Advice> {
        advise(
            hand,
            position,
            non_negative("pot", pot)?,
            non_negative("bet", bet)?,
        )
    }

    pub fn poker_speak(&mut self, text: &str) -> SeatResult<Acknowledged> {
        self.voice.speak(text)?;
        Ok(Acknowledged {
            status: "spoken".to_string(),
            text: Some(text.trim().to_string()),
        })
    }

    pub fn poker_trash_talk(&mut self, situation: &str, target: Option<&str>) -> SeatResult<TrashTalk> {
        let situation: Situation = situation.parse()?;
        Ok(trash_talk(&mut self.rng, situation, target))
    }

    pub fn game_state(&self) -> GameSummary {
        self.store.load().summary()
    }

    /// Decode `arguments` for `tool`, run it and encode the result.
    pub fn call(&mut self, tool: &str, arguments: Value) -> SeatResult<Value> {
        let tool: Tool = tool.parse()?;
        match tool {
            Tool::SetupGame => {
                let args: SetupArgs = decode(tool, arguments)?;
                to_value(&self.setup_game(&args.players)?)
            }
            Tool::NewHand => {
                let _: NoArgs = decode(tool, arguments)?;
                to_value(&self.new_hand()?)
            }
            Tool::CaptureCards => {
                let _: NoArgs = decode(tool, arguments)?;
                to_value(&self.capture_cards()?)
            }
            Tool::RecordHoleCards => {
                // serde messages can echo the offending value.
                let args: HoleCardArgs = decode(tool, arguments).map_err(|_| {
                    SeatError::validation(
                        "invalid arguments for record_hole_cards: expected {\"cards\": [two card tokens]}",
                    )
                })?;
                to_value(&self.record_hole_cards(&args.cards)?)
            }
            Tool::UpdateGameState => {
                let update: StateUpdate = decode(tool, arguments)?;
                to_value(&self.update_game_state(&update)?)
            }
            Tool::PokerOdds => {
                let args: OddsArgs = decode(tool, arguments)?;
                to_value(&self.poker_odds(&args)?)
            }
            Tool::PokerDecision => {
                let args: DecisionArgs = decode(tool, arguments)?;
                to_value(&self.poker_decision(&args.hand, &args.position, args.pot, args.bet)?)
            }
            Tool::PokerSpeak => {
                let args: SpeakArgs = decode(tool, arguments)?;
                to_value(&self.poker_speak(&args.text)?)
            }
            Tool::PokerTrashTalk => {
                let args: TrashTalkArgs = decode(tool, arguments)?;
                to_value(&self.poker_trash_talk(&args.situation, args.target.as_deref())?)
            }
            Tool::GameState => {
                let _: NoArgs = decode(tool, arguments)?;
                to_value(&self.game_state())
            }
        }
    }

    /// Run one protocol request, folding any failure into the response envelope.
    pub fn handle(&mut self, request: ToolRequest) -> ToolResponse {
        info!(tool = request.tool.as_str(), "tool call");
        match self.call(&request.tool, request.arguments) {
            Ok(result) => ToolResponse {
                tool: Some(request.tool),
                result: Some(result),
                error: None,
            },
            Err(err) => {
                warn!(tool = request.tool.as_str(), kind = err.kind(), error = %err, "tool failed");
                ToolResponse::failure(Some(request.tool), &err)
            }
        }
    }
}
