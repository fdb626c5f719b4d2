use super::*;
use ludo_core::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Game lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Playing,
    Finished,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Phase::Waiting => write!(f, "waiting"),
            Phase::Playing => write!(f, "playing"),
            Phase::Finished => write!(f, "finished"),
        }
    }
}

/// A seated player as projected to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: Color,
    pub name: String,
    pub color: String,
    pub label: String,
    pub is_host: bool,
    pub is_current: bool,
    pub is_ai: bool,
    pub difficulty: Option<Difficulty>,
    pub profile_id: Option<uuid::Uuid>,
    pub avatar: Option<String>,
    pub wins: Option<u32>,
    pub games: Option<u32>,
    pub is_guest: bool,
}

/// A token as projected to clients: status, raw step offset, and the
/// resolved board spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenView {
    pub id: String,
    pub status: TokenStatus,
    pub steps: Option<Step>,
    pub position: Spot,
}

/// Turn state as projected to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnView {
    pub dice: Option<DiceValue>,
    pub awaiting_move: bool,
    pub available_moves: Vec<Move>,
    pub last_roll: Option<LastRoll>,
}

/// Full serializable snapshot of a room. Pure projection: building one
/// never mutates the engine, and two snapshots taken without an
/// intervening mutation compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub room_id: String,
    pub phase: Phase,
    pub players: Vec<PlayerView>,
    pub current_player: Option<Color>,
    pub turn: TurnView,
    pub tokens: BTreeMap<Color, Vec<TokenView>>,
    pub last_event: Option<Event>,
    pub history: Vec<HistoryEntry>,
    pub winner: Option<Color>,
    pub max_players: usize,
    pub available_seats: usize,
    pub available_colors: Vec<Color>,
}

/// One participant of a completed game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub player: Color,
    pub profile_id: Option<uuid::Uuid>,
}

/// One-shot outcome snapshot captured when a game finishes, awaiting
/// hand-off to the statistics collaborator via [`Engine::consume_results`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner: Color,
    pub participants: Vec<Participant>,
}
