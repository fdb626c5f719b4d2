use ludo_core::*;
use ludo_engine::*;
use rand::prelude::*;

/// A move-selection strategy for one automated player.
///
/// Total over any non-empty legal-move list: `None` only on empty input,
/// which callers must treat as "must roll or skip" rather than a choice.
pub trait Policy: Send + Sync {
    fn select(&self, game: &Engine, player: Color, moves: &[Move]) -> Option<Move>;
}

/// Weak tier: uniform-random choice among legal moves.
pub struct Random;

/// Medium tier: prefer finishing, else capturing, else random.
pub struct Greedy;

/// Strong tier: score every move with a fixed heuristic and pick the best.
/// Small random jitter breaks exact ties non-deterministically.
pub struct Heuristic;

/// The policy for a difficulty tier.
pub fn policy_for(difficulty: Difficulty) -> &'static dyn Policy {
    match difficulty {
        Difficulty::Easy => &Random,
        Difficulty::Medium => &Greedy,
        Difficulty::Hard => &Heuristic,
    }
}

/// True if the move lands on an unguarded ring square currently holding at
/// least one opposing active token.
pub fn is_capture(game: &Engine, player: Color, mov: &Move) -> bool {
    match mov.target.track_index() {
        Some(ring) => !is_safe(ring) && !game.opponents_on_track(player, ring).is_empty(),
        None => false,
    }
}

impl Policy for Random {
    fn select(&self, _: &Engine, _: Color, moves: &[Move]) -> Option<Move> {
        moves.choose(&mut rand::rng()).copied()
    }
}

impl Policy for Greedy {
    fn select(&self, game: &Engine, player: Color, moves: &[Move]) -> Option<Move> {
        let finishing: Vec<Move> = moves
            .iter()
            .filter(|m| m.kind == MoveKind::Finish)
            .copied()
            .collect();
        if let Some(mov) = finishing.choose(&mut rand::rng()) {
            return Some(*mov);
        }
        let capturing: Vec<Move> = moves
            .iter()
            .filter(|m| is_capture(game, player, m))
            .copied()
            .collect();
        if let Some(mov) = capturing.choose(&mut rand::rng()) {
            return Some(*mov);
        }
        Random.select(game, player, moves)
    }
}

// Weights tuned so capture and finish always dominate raw progress.
const FINISH_BONUS: f64 = 150.0;
const ENTER_BONUS: f64 = 20.0;
const SAFE_BONUS: f64 = 8.0;
const CAPTURE_BONUS: f64 = 60.0;
const PROGRESS_WEIGHT: f64 = 3.0;
const POSITION_WEIGHT: f64 = 0.5;
const HOME_RUN_WEIGHT: f64 = 5.0;

impl Heuristic {
    fn score(game: &Engine, player: Color, mov: &Move) -> f64 {
        let mut score = rand::random_range(0.0..0.01);
        if mov.kind == MoveKind::Finish {
            score += FINISH_BONUS;
        }
        if mov.kind == MoveKind::Enter {
            score += ENTER_BONUS;
        }
        if let Some(ring) = mov.target.track_index() {
            if is_safe(ring) {
                score += SAFE_BONUS;
            }
            if is_capture(game, player, mov) {
                score += CAPTURE_BONUS;
            }
        }
        let previous = game
            .tokens_of(player)
            .get(mov.token_index)
            .and_then(|t| t.steps)
            .map(|s| s as f64)
            .unwrap_or(-1.0);
        let next = match mov.kind {
            MoveKind::Enter => 0.0,
            _ => mov.steps as f64,
        };
        score += (next - previous) * PROGRESS_WEIGHT;
        score += next * POSITION_WEIGHT;
        let to_finish = FINISH_STEP as f64 - next;
        if to_finish <= HOME_STEPS as f64 {
            score += (HOME_STEPS as f64 - to_finish) * HOME_RUN_WEIGHT;
        }
        score
    }
}

impl Policy for Heuristic {
    fn select(&self, game: &Engine, player: Color, moves: &[Move]) -> Option<Move> {
        moves
            .iter()
            .map(|m| (Self::score(game, player, m), m))
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, m)| *m)
    }
}
