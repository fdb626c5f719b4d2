use super::*;
use ludo_core::*;
use serde::Deserialize;
use serde::Serialize;

/// The last mutation the board saw, carried in every state snapshot so
/// clients can animate it. Replaced wholesale on each roll and move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Dice {
        player: Color,
        value: DiceValue,
        moves: Vec<MovePreview>,
        at: u64,
    },
    Move {
        player: Color,
        token: String,
        from: Spot,
        to: Spot,
        dice: DiceValue,
        captured: Vec<Capture>,
        extra_turn: bool,
        at: u64,
    },
}

/// A legal move advertised alongside a dice event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovePreview {
    pub token: String,
    pub kind: MoveKind,
}

/// An opposing token bounced back to base by a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub player: Color,
    pub token: String,
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::Dice { player, value, moves, .. } => {
                write!(f, "{} rolled {} ({} moves)", player, value, moves.len())
            }
            Event::Move {
                player,
                token,
                captured,
                extra_turn,
                ..
            } => {
                write!(f, "{} moved {}", player, token)?;
                if !captured.is_empty() {
                    write!(f, ", captured {}", captured.len())?;
                }
                if *extra_turn {
                    write!(f, ", plays again")?;
                }
                Ok(())
            }
        }
    }
}
