//! Core type aliases, board constants, and shared DTOs for the ludo server.
//!
//! Every other crate in the workspace builds on the vocabulary defined here:
//! the four fixed color slots, the 52+6 board dimensions, and the opaque
//! profile reference supplied by the auth collaborator.

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Index of a token within its owner's fixed 4-slot array.
pub type TokenIndex = usize;
/// Offset along a player's path, 0..=FINISH_STEP.
pub type Step = usize;
/// Face value of a die roll, 1..=6.
pub type DiceValue = u8;
/// Opaque connection identifier supplied by the transport layer.
pub type ConnectionId = String;

// ============================================================================
// BOARD PARAMETERS
// ============================================================================
/// Squares on the shared ring every token traverses.
pub const TRACK_LENGTH: usize = 52;
/// Squares in each player's private home stretch, including the goal.
pub const HOME_STEPS: usize = 6;
/// Inclusive path index of the goal square. Must be reached exactly.
pub const FINISH_STEP: Step = TRACK_LENGTH + HOME_STEPS - 1;
/// Tokens per player.
pub const TOKENS_PER_PLAYER: usize = 4;
/// Seats per room, one per color slot.
pub const MAX_PLAYERS: usize = 4;
/// Ring indices where no capture can occur regardless of occupancy.
pub const SAFE_SQUARES: [usize; 8] = [0, 8, 13, 21, 26, 34, 39, 47];

// ============================================================================
// RUNTIME PARAMETERS
// ============================================================================
/// Maximum retained history entries per room.
pub const HISTORY_CAP: usize = 50;
/// History entries exposed in state snapshots.
pub const HISTORY_TAIL: usize = 10;
/// Iteration cap when draining consecutive AI turns.
pub const MAX_AI_TURNS: usize = 40;
/// Sliding expiry for replicated room blobs, in seconds.
pub const ROOM_TTL_SECS: u64 = 3600;

// ============================================================================
// COLOR SLOTS
// ============================================================================
/// One of the four fixed identity slots a room can allocate.
///
/// The slot doubles as the player identifier for the lifetime of a seat.
/// Declaration order is allocation order: a joining player always takes the
/// lowest unclaimed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
}

impl Color {
    pub const ALL: [Color; MAX_PLAYERS] = [Color::Red, Color::Blue, Color::Yellow, Color::Green];
    /// Ring index where this color's path begins.
    pub fn start_offset(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Blue => 13,
            Color::Yellow => 26,
            Color::Green => 39,
        }
    }
    /// Human-readable slot name, also the default display name.
    pub fn label(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Blue => "Blue",
            Color::Yellow => "Yellow",
            Color::Green => "Green",
        }
    }
    /// Hex color existing clients render with. Part of the wire contract.
    pub fn hex(self) -> &'static str {
        match self {
            Color::Red => "#ef4444",
            Color::Blue => "#3b82f6",
            Color::Yellow => "#facc15",
            Color::Green => "#22c55e",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Blue => write!(f, "blue"),
            Color::Yellow => write!(f, "yellow"),
            Color::Green => write!(f, "green"),
        }
    }
}

// ============================================================================
// AI DIFFICULTY
// ============================================================================
/// Strength tier for automated players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parses a client-supplied tier. Unknown values normalize to Easy
    /// rather than erroring, matching the deployed client contract.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label().to_lowercase())
    }
}

// ============================================================================
// EXTERNAL PROFILE REFERENCE
// ============================================================================
/// Opaque profile handed over by the auth collaborator at join time.
/// The engine carries it through to seating and to the pending result
/// without interpreting its internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: uuid::Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub wins: Option<u32>,
    pub games: Option<u32>,
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Milliseconds since the Unix epoch, used for all timestamps.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", now_millis())).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn slot_order_is_allocation_order() {
        assert_eq!(Color::ALL[0], Color::Red);
        assert_eq!(Color::ALL[3], Color::Green);
    }
    #[test]
    fn start_offsets_are_quarter_turns() {
        assert_eq!(Color::Red.start_offset(), 0);
        assert_eq!(Color::Blue.start_offset(), 13);
        assert_eq!(Color::Yellow.start_offset(), 26);
        assert_eq!(Color::Green.start_offset(), 39);
    }
    #[test]
    fn finish_step_is_last_path_index() {
        assert_eq!(FINISH_STEP, 57);
    }
    #[test]
    fn unknown_difficulty_normalizes_to_easy() {
        assert_eq!(Difficulty::normalize("hard"), Difficulty::Hard);
        assert_eq!(Difficulty::normalize("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::normalize("impossible"), Difficulty::Easy);
        assert_eq!(Difficulty::normalize(""), Difficulty::Easy);
    }
}
