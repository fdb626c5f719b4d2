/// Precondition violations raised by engine operations.
///
/// Every variant is a caller-input or turn-order mistake, never a transient
/// condition: retrying the same call yields the same error. Operations fail
/// atomically, before any state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// All four color slots are taken.
    RoomFull,
    /// Guarded but unreachable given the 4-slot/4-config symmetry.
    NoColorsAvailable,
    /// AI seats cannot be added while a match is in progress.
    GameInProgress,
    /// `start` called outside the waiting phase.
    AlreadyPlaying,
    /// `start` called with fewer than two seats filled.
    NotEnoughPlayers,
    /// `start` called by a seat other than the host.
    NotHost,
    /// Gameplay operation outside the playing phase.
    NotPlaying,
    /// Operation by a player other than the current one.
    NotYourTurn,
    /// A roll is already pending resolution.
    MoveAlreadyPending,
    /// Move attempted with no roll pending.
    DiceNotRolled,
    /// The chosen token has no entry in the legal-move set.
    IllegalMove,
    /// Forced end requested on an already finished game.
    AlreadyFinished,
    /// Forced end requested with no one seated.
    NoPlayers,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomFull => write!(f, "Room is full"),
            Self::NoColorsAvailable => write!(f, "No colors available"),
            Self::GameInProgress => write!(f, "Cannot add AI during an active game"),
            Self::AlreadyPlaying => write!(f, "Game already started"),
            Self::NotEnoughPlayers => write!(f, "Need at least two players to start"),
            Self::NotHost => write!(f, "Only the host can start the game"),
            Self::NotPlaying => write!(f, "Game not in progress"),
            Self::NotYourTurn => write!(f, "It is not this player's turn"),
            Self::MoveAlreadyPending => write!(f, "Must complete move before rolling again"),
            Self::DiceNotRolled => write!(f, "Must roll dice before moving"),
            Self::IllegalMove => write!(f, "Invalid move for selected token"),
            Self::AlreadyFinished => write!(f, "Game already finished"),
            Self::NoPlayers => write!(f, "No players available to declare winner"),
        }
    }
}

impl std::error::Error for GameError {}
