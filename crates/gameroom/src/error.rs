use ludo_engine::GameError;

/// Failures surfaced by the coordination layer.
///
/// Translated into an acknowledgment error for the requesting connection;
/// never retried, never broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// The referenced room does not exist (or the id normalized to empty).
    RoomMissing,
    /// The same profile is already seated in this room from another session.
    AlreadyInRoom,
    /// The requesting connection holds no seat in the room.
    NotSeated,
    /// The engine rejected the operation.
    Game(GameError),
    /// The backing store failed; the action did not take effect.
    Store(String),
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomMissing => write!(f, "Room missing"),
            Self::AlreadyInRoom => {
                write!(f, "You are already in this room from another session")
            }
            Self::NotSeated => write!(f, "You are not seated in this room"),
            Self::Game(e) => write!(f, "{}", e),
            Self::Store(e) => write!(f, "Storage failure: {}", e),
        }
    }
}

impl std::error::Error for RoomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Game(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GameError> for RoomError {
    fn from(e: GameError) -> Self {
        Self::Game(e)
    }
}

impl From<anyhow::Error> for RoomError {
    fn from(e: anyhow::Error) -> Self {
        Self::Store(e.to_string())
    }
}
