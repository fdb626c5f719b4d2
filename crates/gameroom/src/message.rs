use ludo_core::*;
use ludo_engine::GameState;
use ludo_engine::Phase;
use serde::Deserialize;
use serde::Serialize;

/// Errors raised while decoding client messages.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    InvalidCommand(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCommand(s) => write!(f, "invalid command: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Player actions as delivered by the transport collaborator.
/// The connection they arrive on identifies the player; commands after
/// `Join` are implicitly scoped to that connection's room.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    Join { room: String, name: Option<String> },
    AddAi { difficulty: Option<String> },
    Start,
    Roll,
    Move { token: TokenIndex },
    RequestState,
    Leave,
}

impl ClientCommand {
    pub fn decode(s: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(s).map_err(|_| ProtocolError::InvalidCommand(s.to_string()))
    }
}

/// Condensed seat listing for the room summary broadcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatSummary {
    pub id: Color,
    pub name: String,
    pub is_ai: bool,
}

/// The lightweight half of each broadcast cycle: phase, seats, host, and
/// seat availability. The heavy half is the full [`GameState`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSummary {
    pub id: String,
    pub phase: Phase,
    pub host: Option<Color>,
    pub players: Vec<SeatSummary>,
    pub available_seats: usize,
}

impl RoomSummary {
    pub fn of(state: &GameState) -> Self {
        Self {
            id: state.room_id.clone(),
            phase: state.phase,
            host: state.players.iter().find(|p| p.is_host).map(|p| p.id),
            players: state
                .players
                .iter()
                .map(|p| SeatSummary {
                    id: p.id,
                    name: p.name.clone(),
                    is_ai: p.is_ai,
                })
                .collect(),
            available_seats: state.available_seats,
        }
    }
}

/// Messages sent from server to clients over the transport.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Join acknowledgment with the allocated seat.
    Joined { room: String, player: Color },
    /// Lightweight room summary, broadcast on every mutation cycle.
    Room { room: RoomSummary },
    /// Full state snapshot, broadcast on every mutation cycle.
    State { state: GameState },
    /// Acknowledgment error for a rejected action.
    Error { message: String },
}

impl ServerMessage {
    pub fn joined(room: &str, player: Color) -> Self {
        Self::Joined {
            room: room.to_string(),
            player,
        }
    }
    pub fn room(summary: RoomSummary) -> Self {
        Self::Room { room: summary }
    }
    pub fn state(state: GameState) -> Self {
        Self::State { state }
    }
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::error!("[protocol] serialize failed: {}", e);
            r#"{"type":"error","message":"internal serialization failure"}"#.to_string()
        })
    }
}
