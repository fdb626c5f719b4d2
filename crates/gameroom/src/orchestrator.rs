use ludo_core::*;
use ludo_engine::*;

/// One step taken while draining AI turns, returned for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiAction {
    Roll { player: Color, value: DiceValue },
    Move { player: Color, token_index: TokenIndex },
    Skip { player: Color },
}

/// Drives consecutive AI turns to completion with the room's default dice.
pub fn run_ai_turns(engine: &mut Engine) -> Vec<AiAction> {
    run_ai_turns_with(engine, || rand::random_range(1..=6))
}

/// Drives consecutive AI turns with an injected dice source.
///
/// Loops while the current player is AI and the game is in progress, up to
/// [`MAX_AI_TURNS`] iterations so a logic error can never spin forever.
/// Each iteration rolls if no roll is pending, otherwise applies the move
/// chosen by the seat's difficulty policy. A pending roll with an empty
/// move list cannot arise from `roll` itself; it is force-skipped
/// defensively rather than trusted to resolve.
pub fn run_ai_turns_with<F>(engine: &mut Engine, mut dice: F) -> Vec<AiAction>
where
    F: FnMut() -> DiceValue,
{
    let mut actions = Vec::new();
    for _ in 0..MAX_AI_TURNS {
        let Some(action) = step(engine, &mut dice) else {
            break;
        };
        actions.push(action);
        if engine.phase() != Phase::Playing {
            break;
        }
    }
    actions
}

fn step<F>(engine: &mut Engine, dice: &mut F) -> Option<AiAction>
where
    F: FnMut() -> DiceValue,
{
    if engine.phase() != Phase::Playing {
        return None;
    }
    let current = engine.current_player()?;
    if !current.is_ai {
        return None;
    }
    let player = current.id;
    let difficulty = current.difficulty.unwrap_or(Difficulty::Easy);
    if !engine.turn().awaiting_move {
        let value = match engine.roll_with(player, dice()) {
            Ok(value) => value,
            Err(e) => {
                log::error!("[room {}] ai roll rejected: {}", engine.room_id(), e);
                return None;
            }
        };
        return Some(AiAction::Roll { player, value });
    }
    let moves = engine.turn().available_moves.clone();
    if moves.is_empty() {
        // awaiting a move with nothing to play; clear the stuck turn
        if let Err(e) = engine.skip_turn(player) {
            log::error!("[room {}] ai skip rejected: {}", engine.room_id(), e);
            return None;
        }
        return Some(AiAction::Skip { player });
    }
    let chosen = ludo_ai::policy_for(difficulty)
        .select(engine, player, &moves)
        .unwrap_or(moves[0]);
    if let Err(e) = engine.apply_move(player, chosen.token_index) {
        log::error!("[room {}] ai move rejected: {}", engine.room_id(), e);
        return None;
    }
    Some(AiAction::Move {
        player,
        token_index: chosen.token_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_human_and_ai() -> (Engine, Color, Color) {
        let mut engine = Engine::new("orchestrated");
        let human = engine
            .add_player(Identity {
                connection: Some("conn-h".to_string()),
                ..Identity::default()
            })
            .unwrap()
            .id;
        let ai = engine.add_ai(Difficulty::Easy).unwrap().id;
        engine.start(human).unwrap();
        (engine, human, ai)
    }

    #[test]
    fn idle_when_current_player_is_human() {
        let (mut engine, human, _) = room_with_human_and_ai();
        assert_eq!(engine.current_player().map(|p| p.id), Some(human));
        assert!(run_ai_turns(&mut engine).is_empty());
    }
    #[test]
    fn idle_when_not_playing() {
        let mut engine = Engine::new("idle");
        engine.add_ai(Difficulty::Easy).unwrap();
        assert!(run_ai_turns(&mut engine).is_empty());
    }
    #[test]
    fn no_move_roll_yields_single_roll_action() {
        let (mut engine, human, ai) = room_with_human_and_ai();
        // human's no-move roll hands the turn to the AI
        engine.roll_with(human, 3).unwrap();
        assert_eq!(engine.current_player().map(|p| p.id), Some(ai));
        let actions = run_ai_turns_with(&mut engine, || 3);
        assert_eq!(actions, vec![AiAction::Roll { player: ai, value: 3 }]);
        // turn came back to the human
        assert_eq!(engine.current_player().map(|p| p.id), Some(human));
    }
    #[test]
    fn six_rolls_enter_move_and_keep_the_turn_until_a_non_six() {
        let (mut engine, human, ai) = room_with_human_and_ai();
        engine.roll_with(human, 3).unwrap();
        let mut values = [6u8, 2].into_iter();
        let actions = run_ai_turns_with(&mut engine, || values.next().unwrap_or(1));
        // 6 enters (bonus turn), then a 2 advances and yields
        assert_eq!(actions.len(), 4);
        assert!(matches!(actions[0], AiAction::Roll { value: 6, .. }));
        assert!(matches!(actions[1], AiAction::Move { .. }));
        assert!(matches!(actions[2], AiAction::Roll { value: 2, .. }));
        assert!(matches!(actions[3], AiAction::Move { .. }));
        assert_eq!(engine.current_player().map(|p| p.id), Some(human));
        assert!(engine.tokens_of(ai).iter().any(|t| t.steps == Some(2)));
    }
    #[test]
    fn drain_is_bounded_even_with_endless_sixes() {
        let mut engine = Engine::new("ai-only");
        engine
            .add_player(Identity {
                connection: Some("conn-h".to_string()),
                ..Identity::default()
            })
            .unwrap();
        let host = engine.host().unwrap().id;
        engine.add_ai(Difficulty::Hard).unwrap();
        engine.start(host).unwrap();
        engine.roll_with(host, 3).unwrap();
        let actions = run_ai_turns_with(&mut engine, || 6);
        assert_eq!(actions.len(), MAX_AI_TURNS);
    }
    #[test]
    fn two_ai_seats_pass_the_turn_between_them() {
        let mut engine = Engine::new("ai-pair");
        engine
            .add_player(Identity {
                connection: Some("conn-h".to_string()),
                ..Identity::default()
            })
            .unwrap();
        let host = engine.host().unwrap().id;
        engine.add_ai(Difficulty::Easy).unwrap();
        engine.add_ai(Difficulty::Medium).unwrap();
        engine.start(host).unwrap();
        engine.roll_with(host, 3).unwrap();
        // both AIs roll a non-six with all tokens based: two skipping rolls
        let actions = run_ai_turns_with(&mut engine, || 4);
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|a| matches!(a, AiAction::Roll { value: 4, .. })));
        assert_eq!(engine.current_player().map(|p| p.id), Some(host));
    }
}
