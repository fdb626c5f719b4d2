use super::*;
use ludo_core::*;
use serde::Deserialize;
use serde::Serialize;

/// How a legal move changes its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// Base token entering the board at path index 0. Requires a six.
    Enter,
    /// Active token advancing along its path.
    Advance,
    /// Advance landing exactly on the goal square.
    Finish,
}

/// One legal move for the current dice value.
///
/// Identity is the token's index within its owner's fixed 4-slot array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub token_index: TokenIndex,
    pub kind: MoveKind,
    pub target: Square,
    pub steps: Step,
}

/// The most recent roll, retained across turn resets for UI replay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastRoll {
    pub player: Color,
    pub value: DiceValue,
    pub at: u64,
}

/// Dice and pending-move state for the turn in progress.
///
/// Exactly one per room, owned solely by the engine and replaced wholesale
/// on every roll, move, and skip. `awaiting_move` is true iff at least one
/// legal move exists for the current roll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    pub dice: Option<DiceValue>,
    pub available_moves: Vec<Move>,
    pub awaiting_move: bool,
    pub last_roll: Option<LastRoll>,
}

impl TurnState {
    /// A cleared turn state that keeps the previous roll for replay.
    pub fn reset(last_roll: Option<LastRoll>) -> Self {
        Self {
            last_roll,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn reset_keeps_last_roll() {
        let roll = LastRoll {
            player: Color::Red,
            value: 4,
            at: 1,
        };
        let state = TurnState::reset(Some(roll));
        assert_eq!(state.dice, None);
        assert!(!state.awaiting_move);
        assert!(state.available_moves.is_empty());
        assert_eq!(state.last_roll, Some(roll));
    }
}
