use super::*;
use ludo_core::*;
use rand::prelude::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Authoritative state machine for one room.
///
/// Owns the seats, token sets, paths, turn pointer, dice state, and history.
/// All mutation goes through the typed operations below; each either fully
/// succeeds or fails with a [`GameError`] before touching anything, so a
/// failed call leaves the room exactly as it was.
///
/// The whole engine serializes with serde, which is what the replicated
/// room store writes through to its keyed blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    room_id: String,
    players: Vec<Player>,
    tokens: BTreeMap<Color, Vec<Token>>,
    paths: BTreeMap<Color, Vec<Square>>,
    turn_index: usize,
    phase: Phase,
    turn: TurnState,
    last_event: Option<Event>,
    history: History,
    winner: Option<Color>,
    created_at: u64,
    pending: Option<GameResult>,
}

impl Engine {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            players: Vec::new(),
            tokens: BTreeMap::new(),
            paths: BTreeMap::new(),
            turn_index: 0,
            phase: Phase::Waiting,
            turn: TurnState::default(),
            last_event: None,
            history: History::default(),
            winner: None,
            created_at: now_millis(),
            pending: None,
        }
    }
    pub fn room_id(&self) -> &str {
        &self.room_id
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn created_at(&self) -> u64 {
        self.created_at
    }
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn player(&self, id: Color) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
    /// Seat 0 in join order.
    pub fn host(&self) -> Option<&Player> {
        self.players.first()
    }
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn_index)
    }
    pub fn turn(&self) -> &TurnState {
        &self.turn
    }
    /// Color slots not yet claimed, in allocation order.
    pub fn available_colors(&self) -> Vec<Color> {
        Color::ALL
            .into_iter()
            .filter(|c| self.players.iter().all(|p| p.id != *c))
            .collect()
    }
    /// A player's fixed 4-slot token array.
    pub fn tokens_of(&self, player: Color) -> &[Token] {
        self.tokens.get(&player).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Seating operations. Humans may join in any phase; AI only outside a
/// running match.
impl Engine {
    pub fn add_player(&mut self, identity: Identity) -> Result<Player, GameError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::RoomFull);
        }
        let color = self
            .available_colors()
            .first()
            .copied()
            .ok_or(GameError::NoColorsAvailable)?;
        let player = Player::human(color, identity);
        log::debug!("[room {}] seating {} as {}", self.room_id, player.name, color);
        self.seat(player.clone());
        Ok(player)
    }
    pub fn add_ai(&mut self, difficulty: Difficulty) -> Result<Player, GameError> {
        if self.phase == Phase::Playing {
            return Err(GameError::GameInProgress);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::RoomFull);
        }
        let color = self
            .available_colors()
            .first()
            .copied()
            .ok_or(GameError::NoColorsAvailable)?;
        let player = Player::ai(color, difficulty, self.ai_name(difficulty));
        log::debug!("[room {}] seating {} as {}", self.room_id, player.name, color);
        self.seat(player.clone());
        Ok(player)
    }
    /// Removes the seat bound to a connection, freeing its color for reuse.
    /// Falling under two players mid-match abandons the game back to
    /// waiting; an emptied room resets entirely so it can be rejoined.
    pub fn remove_player(&mut self, connection: &str) -> Option<Player> {
        let index = self
            .players
            .iter()
            .position(|p| p.connection.as_deref() == Some(connection))?;
        let removed = self.players.remove(index);
        self.tokens.remove(&removed.id);
        self.paths.remove(&removed.id);
        if index < self.turn_index {
            self.turn_index -= 1;
        } else if index == self.turn_index {
            // their turn passes to the next seat, along with a clean slate
            self.turn = TurnState::reset(self.turn.last_roll);
        }
        if self.turn_index >= self.players.len() {
            self.turn_index = 0;
        }
        if self.players.len() < 2 && self.phase == Phase::Playing {
            log::info!("[room {}] too few players, abandoning match", self.room_id);
            self.phase = Phase::Waiting;
            self.turn = TurnState::reset(self.turn.last_roll);
        }
        if self.players.is_empty() {
            self.phase = Phase::Waiting;
            self.turn = TurnState::default();
            self.winner = None;
            self.pending = None;
        }
        Some(removed)
    }
    fn seat(&mut self, player: Player) {
        self.tokens.insert(player.id, Token::rack(player.id));
        self.paths.insert(player.id, build_path(player.id.start_offset()));
        self.players.push(player);
    }
    /// Display name for an AI seat, numbered when the tier repeats.
    fn ai_name(&self, difficulty: Difficulty) -> String {
        let base = format!("AI ({})", difficulty.label());
        let duplicates = self
            .players
            .iter()
            .filter(|p| p.is_ai && p.difficulty == Some(difficulty))
            .count();
        match duplicates {
            0 => base,
            n => format!("{} #{}", base, n + 1),
        }
    }
}

/// Game lifecycle.
impl Engine {
    /// Starts the match. Host-only, needs two seats, only from waiting.
    pub fn start(&mut self, requesting: Color) -> Result<(), GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::AlreadyPlaying);
        }
        if self.players.len() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }
        if self.host().map(|p| p.id) != Some(requesting) {
            return Err(GameError::NotHost);
        }
        let seated: Vec<Color> = self.players.iter().map(|p| p.id).collect();
        for color in seated {
            self.tokens.insert(color, Token::rack(color));
        }
        self.winner = None;
        self.pending = None;
        self.last_event = None;
        self.history.clear();
        self.phase = Phase::Playing;
        self.turn_index = 0;
        self.turn = TurnState::default();
        self.history.record(HistoryKind::System {
            message: "Game started".to_string(),
        });
        log::info!(
            "[room {}] game started with {} players",
            self.room_id,
            self.players.len()
        );
        Ok(())
    }
    /// Ends the match immediately with a uniformly random winner. Used by
    /// the diagnostics endpoint; records a pending result like a real win.
    pub fn force_end(&mut self) -> Result<Color, GameError> {
        if self.phase == Phase::Finished {
            return Err(GameError::AlreadyFinished);
        }
        let winner = self
            .players
            .choose(&mut rand::rng())
            .map(|p| (p.id, p.name.clone()))
            .ok_or(GameError::NoPlayers)?;
        self.phase = Phase::Finished;
        self.winner = Some(winner.0);
        self.pending = Some(self.result_snapshot(winner.0));
        self.history.record(HistoryKind::System {
            message: format!("{} declared winner", winner.1),
        });
        Ok(winner.0)
    }
    /// Returns and clears the pending result. At most one `Some` per win.
    pub fn consume_results(&mut self) -> Option<GameResult> {
        self.pending.take()
    }
    fn result_snapshot(&self, winner: Color) -> GameResult {
        GameResult {
            winner,
            participants: self
                .players
                .iter()
                .map(|p| Participant {
                    player: p.id,
                    profile_id: p.profile_id(),
                })
                .collect(),
        }
    }
}

/// Dice and movement.
impl Engine {
    /// Rolls a uniform die for the current player. A roll with no legal
    /// moves is a valid outcome, not an error: the turn silently advances.
    pub fn roll(&mut self, player: Color) -> Result<DiceValue, GameError> {
        self.roll_with(player, rand::random_range(1..=6))
    }
    /// Deterministic roll entry point, shared by [`Engine::roll`], replay,
    /// and tests that pin the dice.
    pub fn roll_with(&mut self, player: Color, value: DiceValue) -> Result<DiceValue, GameError> {
        debug_assert!((1..=6).contains(&value));
        if self.phase != Phase::Playing {
            return Err(GameError::NotPlaying);
        }
        if self.current_player().map(|p| p.id) != Some(player) {
            return Err(GameError::NotYourTurn);
        }
        if self.turn.awaiting_move {
            return Err(GameError::MoveAlreadyPending);
        }
        let at = now_millis();
        let moves = self.available_moves(player, value);
        let last_roll = Some(LastRoll { player, value, at });
        self.last_event = Some(Event::Dice {
            player,
            value,
            moves: moves
                .iter()
                .map(|m| MovePreview {
                    token: self.tokens_of(player)[m.token_index].id.clone(),
                    kind: m.kind,
                })
                .collect(),
            at,
        });
        if moves.is_empty() {
            log::debug!("[room {}] {} rolled {}, no moves", self.room_id, player, value);
            self.history.record(HistoryKind::Dice {
                player,
                value,
                detail: "No moves available".to_string(),
            });
            self.advance_turn();
            self.turn = TurnState::reset(last_roll);
        } else {
            log::debug!(
                "[room {}] {} rolled {}, {} moves",
                self.room_id,
                player,
                value,
                moves.len()
            );
            self.history.record(HistoryKind::Dice {
                player,
                value,
                detail: "Awaiting move".to_string(),
            });
            self.turn = TurnState {
                dice: Some(value),
                available_moves: moves,
                awaiting_move: true,
                last_roll,
            };
        }
        Ok(value)
    }
    /// Legal moves for a player and dice value. Pure query; `roll_with`
    /// uses it to populate the turn state.
    ///
    /// Base tokens move only on a six; active tokens move iff they would
    /// not overshoot the goal. Overshoots are simply not offered, never
    /// clamped.
    pub fn available_moves(&self, player: Color, dice: DiceValue) -> Vec<Move> {
        let (Some(tokens), Some(path)) = (self.tokens.get(&player), self.paths.get(&player))
        else {
            return Vec::new();
        };
        let mut moves = Vec::new();
        for (token_index, token) in tokens.iter().enumerate() {
            match token.status {
                TokenStatus::Finished => continue,
                TokenStatus::Base => {
                    if dice == 6 {
                        moves.push(Move {
                            token_index,
                            kind: MoveKind::Enter,
                            target: path[0],
                            steps: 0,
                        });
                    }
                }
                TokenStatus::Active => {
                    let steps = token.steps.unwrap_or(0) + dice as Step;
                    if steps > FINISH_STEP {
                        continue;
                    }
                    moves.push(Move {
                        token_index,
                        kind: if steps == FINISH_STEP {
                            MoveKind::Finish
                        } else {
                            MoveKind::Advance
                        },
                        target: path[steps],
                        steps,
                    });
                }
            }
        }
        moves
    }
    /// Applies one of the pending legal moves, resolving captures, the
    /// six-grants-another-turn rule, and win detection.
    pub fn apply_move(&mut self, player: Color, token_index: TokenIndex) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::NotPlaying);
        }
        if self.current_player().map(|p| p.id) != Some(player) {
            return Err(GameError::NotYourTurn);
        }
        let (Some(dice), true) = (self.turn.dice, self.turn.awaiting_move) else {
            return Err(GameError::DiceNotRolled);
        };
        let mov = self
            .turn
            .available_moves
            .iter()
            .find(|m| m.token_index == token_index)
            .copied()
            .ok_or(GameError::IllegalMove)?;
        let from = self.spot(player, token_index);
        let token_id = {
            let token = self
                .tokens
                .get_mut(&player)
                .and_then(|rack| rack.get_mut(token_index))
                .ok_or(GameError::IllegalMove)?;
            match token.status {
                TokenStatus::Base => {
                    token.status = TokenStatus::Active;
                    token.steps = Some(0);
                }
                _ => {
                    token.steps = Some(mov.steps);
                    if mov.kind == MoveKind::Finish {
                        token.status = TokenStatus::Finished;
                    }
                }
            }
            token.id.clone()
        };
        let to = self.spot(player, token_index);
        let captured = self.resolve_captures(player, &to);
        if mov.kind == MoveKind::Finish {
            self.history.record(HistoryKind::Finish {
                player,
                token: token_id.clone(),
            });
        }
        let extra_turn = dice == 6;
        self.last_event = Some(Event::Move {
            player,
            token: token_id,
            from,
            to,
            dice,
            captured,
            extra_turn,
            at: now_millis(),
        });
        self.turn = TurnState::reset(self.turn.last_roll);
        if self.all_finished(player) {
            self.phase = Phase::Finished;
            self.winner = Some(player);
            self.history.record(HistoryKind::Win { player });
            self.pending = Some(self.result_snapshot(player));
            log::info!("[room {}] {} wins", self.room_id, player);
        } else if !extra_turn {
            self.advance_turn();
        } else {
            self.history.record(HistoryKind::Bonus {
                player,
                detail: "Rolled a six and received another turn".to_string(),
            });
        }
        Ok(())
    }
    /// Defensive fallback for orchestration: clears a pending roll and
    /// advances the turn. Not reachable through normal `roll` behavior,
    /// which auto-advances no-move rolls itself.
    pub fn skip_turn(&mut self, player: Color) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::NotPlaying);
        }
        if self.current_player().map(|p| p.id) != Some(player) {
            return Err(GameError::NotYourTurn);
        }
        self.turn = TurnState::reset(self.turn.last_roll);
        self.advance_turn();
        Ok(())
    }
    fn advance_turn(&mut self) {
        if self.players.is_empty() {
            self.turn_index = 0;
        } else {
            self.turn_index = (self.turn_index + 1) % self.players.len();
        }
    }
    fn all_finished(&self, player: Color) -> bool {
        let rack = self.tokens_of(player);
        !rack.is_empty() && rack.iter().all(|t| t.status == TokenStatus::Finished)
    }
    /// Bounces every opposing active token on an unsafe destination ring
    /// square. All co-occupants are captured; none are mutually exclusive.
    fn resolve_captures(&mut self, player: Color, to: &Spot) -> Vec<Capture> {
        let Some(ring) = to.track_index() else {
            return Vec::new();
        };
        if is_safe(ring) {
            return Vec::new();
        }
        let mut captured = Vec::new();
        for (victim, token_index) in self.opponents_on_track(player, ring) {
            let Some(token) = self
                .tokens
                .get_mut(&victim)
                .and_then(|rack| rack.get_mut(token_index))
            else {
                continue;
            };
            token.bounce();
            let token_id = token.id.clone();
            captured.push(Capture {
                player: victim,
                token: token_id.clone(),
            });
            self.history.record(HistoryKind::Capture {
                player,
                victim,
                token: token_id,
                location: ring,
            });
        }
        captured
    }
}

/// Queries shared with the AI layer.
impl Engine {
    /// Resolved board position of one token.
    pub fn spot(&self, player: Color, token_index: TokenIndex) -> Spot {
        let Some(token) = self.tokens_of(player).get(token_index) else {
            return Spot::Base;
        };
        match token.status {
            TokenStatus::Base => Spot::Base,
            TokenStatus::Finished => Spot::Goal { index: FINISH_STEP },
            TokenStatus::Active => {
                let square = token
                    .steps
                    .and_then(|s| self.paths.get(&player).and_then(|p| p.get(s)));
                match square {
                    Some(Square::Track(index)) => Spot::Track { index: *index },
                    Some(Square::Home(index)) => Spot::Home { index: *index },
                    None => Spot::Base,
                }
            }
        }
    }
    /// Opposing active tokens sitting on a shared ring square.
    pub fn opponents_on_track(&self, player: Color, ring: usize) -> Vec<(Color, TokenIndex)> {
        let mut opponents = Vec::new();
        for other in self.players.iter().filter(|p| p.id != player) {
            for (token_index, token) in self.tokens_of(other.id).iter().enumerate() {
                if token.status != TokenStatus::Active {
                    continue;
                }
                if self.spot(other.id, token_index).track_index() == Some(ring) {
                    opponents.push((other.id, token_index));
                }
            }
        }
        opponents
    }
}

/// State projection.
impl Engine {
    /// Full serializable snapshot for broadcast. Never mutates.
    pub fn state(&self) -> GameState {
        let host = self.host().map(|p| p.id);
        let current = self.current_player().map(|p| p.id);
        GameState {
            room_id: self.room_id.clone(),
            phase: self.phase,
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    id: p.id,
                    name: p.name.clone(),
                    color: p.id.hex().to_string(),
                    label: p.id.label().to_string(),
                    is_host: host == Some(p.id),
                    is_current: current == Some(p.id),
                    is_ai: p.is_ai,
                    difficulty: p.difficulty,
                    profile_id: p.profile_id(),
                    avatar: p.profile.as_ref().and_then(|pr| pr.avatar.clone()),
                    wins: p.profile.as_ref().and_then(|pr| pr.wins),
                    games: p.profile.as_ref().and_then(|pr| pr.games),
                    is_guest: p.is_guest,
                })
                .collect(),
            current_player: current,
            turn: TurnView {
                dice: self.turn.dice,
                awaiting_move: self.turn.awaiting_move,
                available_moves: self.turn.available_moves.clone(),
                last_roll: self.turn.last_roll,
            },
            tokens: self
                .players
                .iter()
                .map(|p| {
                    let rack = self
                        .tokens_of(p.id)
                        .iter()
                        .enumerate()
                        .map(|(i, t)| TokenView {
                            id: t.id.clone(),
                            status: t.status,
                            steps: t.steps,
                            position: self.spot(p.id, i),
                        })
                        .collect();
                    (p.id, rack)
                })
                .collect(),
            last_event: self.last_event.clone(),
            history: self.history.tail().to_vec(),
            winner: self.winner,
            max_players: MAX_PLAYERS,
            available_seats: MAX_PLAYERS - self.players.len(),
            available_colors: self.available_colors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(engine: &mut Engine, connection: &str) -> Player {
        engine
            .add_player(Identity {
                connection: Some(connection.to_string()),
                name: Some(connection.to_string()),
                ..Identity::default()
            })
            .expect("seat available")
    }
    fn two_player_game() -> (Engine, Color, Color) {
        let mut engine = Engine::new("test");
        let a = join(&mut engine, "conn-a").id;
        let b = join(&mut engine, "conn-b").id;
        engine.start(a).expect("host starts");
        (engine, a, b)
    }
    /// Places a token directly, for scenario setup.
    fn place(engine: &mut Engine, player: Color, token_index: usize, steps: Step) {
        let token = engine
            .tokens
            .get_mut(&player)
            .and_then(|rack| rack.get_mut(token_index))
            .expect("token exists");
        token.status = TokenStatus::Active;
        token.steps = Some(steps);
    }
    fn finish_all_but(engine: &mut Engine, player: Color, token_index: usize) {
        for i in (0..TOKENS_PER_PLAYER).filter(|i| *i != token_index) {
            let token = engine
                .tokens
                .get_mut(&player)
                .and_then(|rack| rack.get_mut(i))
                .expect("token exists");
            token.status = TokenStatus::Finished;
            token.steps = Some(FINISH_STEP);
        }
    }

    #[test]
    fn fresh_two_player_start() {
        let (engine, a, _) = two_player_game();
        assert_eq!(engine.phase(), Phase::Playing);
        assert_eq!(engine.current_player().map(|p| p.id), Some(a));
        let all_base = Color::ALL
            .iter()
            .flat_map(|c| engine.tokens_of(*c))
            .all(|t| t.status == TokenStatus::Base && t.steps.is_none());
        assert!(all_base);
    }
    #[test]
    fn seats_allocate_lowest_slot_and_fill_up() {
        let mut engine = Engine::new("test");
        assert_eq!(join(&mut engine, "c1").id, Color::Red);
        assert_eq!(join(&mut engine, "c2").id, Color::Blue);
        assert_eq!(join(&mut engine, "c3").id, Color::Yellow);
        assert_eq!(join(&mut engine, "c4").id, Color::Green);
        let err = engine.add_player(Identity::default());
        assert_eq!(err, Err(GameError::RoomFull));
    }
    #[test]
    fn freed_color_is_reused() {
        let mut engine = Engine::new("test");
        join(&mut engine, "c1");
        join(&mut engine, "c2");
        engine.remove_player("c1");
        assert_eq!(join(&mut engine, "c3").id, Color::Red);
    }
    #[test]
    fn ai_names_number_duplicates() {
        let mut engine = Engine::new("test");
        assert_eq!(engine.add_ai(Difficulty::Hard).unwrap().name, "AI (Hard)");
        assert_eq!(engine.add_ai(Difficulty::Hard).unwrap().name, "AI (Hard) #2");
        assert_eq!(engine.add_ai(Difficulty::Easy).unwrap().name, "AI (Easy)");
    }
    #[test]
    fn ai_cannot_join_mid_match() {
        let (mut engine, _, _) = two_player_game();
        assert_eq!(engine.add_ai(Difficulty::Easy), Err(GameError::GameInProgress));
    }
    #[test]
    fn start_preconditions() {
        let mut engine = Engine::new("test");
        let a = join(&mut engine, "c1").id;
        assert_eq!(engine.start(a), Err(GameError::NotEnoughPlayers));
        let b = join(&mut engine, "c2").id;
        assert_eq!(engine.start(b), Err(GameError::NotHost));
        engine.start(a).unwrap();
        assert_eq!(engine.start(a), Err(GameError::AlreadyPlaying));
    }
    #[test]
    fn base_tokens_need_a_six() {
        let (mut engine, a, _) = two_player_game();
        for dice in 1..=5u8 {
            assert!(engine.available_moves(a, dice).is_empty());
        }
        let moves = engine.available_moves(a, 6);
        assert_eq!(moves.len(), TOKENS_PER_PLAYER);
        assert!(moves.iter().all(|m| m.kind == MoveKind::Enter));
    }
    #[test]
    fn rolled_six_awaits_enter_moves() {
        let (mut engine, a, _) = two_player_game();
        engine.roll_with(a, 6).unwrap();
        assert!(engine.turn().awaiting_move);
        assert_eq!(engine.turn().available_moves.len(), 4);
        assert_eq!(engine.current_player().map(|p| p.id), Some(a));
    }
    #[test]
    fn no_move_roll_skips_turn_silently() {
        let (mut engine, a, b) = two_player_game();
        let value = engine.roll_with(a, 3).unwrap();
        assert_eq!(value, 3);
        assert!(!engine.turn().awaiting_move);
        assert_eq!(engine.current_player().map(|p| p.id), Some(b));
        // last roll retained for replay
        assert_eq!(engine.turn().last_roll.map(|r| r.value), Some(3));
    }
    #[test]
    fn roll_precondition_errors() {
        let (mut engine, a, b) = two_player_game();
        assert_eq!(engine.roll_with(b, 4), Err(GameError::NotYourTurn));
        engine.roll_with(a, 6).unwrap();
        assert_eq!(engine.roll_with(a, 2), Err(GameError::MoveAlreadyPending));
        let mut waiting = Engine::new("idle");
        let c = join(&mut waiting, "c1").id;
        assert_eq!(waiting.roll_with(c, 4), Err(GameError::NotPlaying));
    }
    #[test]
    fn move_precondition_errors() {
        let (mut engine, a, _) = two_player_game();
        assert_eq!(engine.apply_move(a, 0), Err(GameError::DiceNotRolled));
        engine.roll_with(a, 6).unwrap();
        assert_eq!(engine.apply_move(a, 9), Err(GameError::IllegalMove));
    }
    #[test]
    fn six_enters_and_grants_bonus_turn() {
        let (mut engine, a, _) = two_player_game();
        engine.roll_with(a, 6).unwrap();
        engine.apply_move(a, 0).unwrap();
        let token = &engine.tokens_of(a)[0];
        assert_eq!(token.status, TokenStatus::Active);
        assert_eq!(token.steps, Some(0));
        // bonus turn: pointer unchanged, dice cleared
        assert_eq!(engine.current_player().map(|p| p.id), Some(a));
        assert_eq!(engine.turn().dice, None);
        assert!(!engine.turn().awaiting_move);
    }
    #[test]
    fn non_six_move_advances_turn() {
        let (mut engine, a, b) = two_player_game();
        place(&mut engine, a, 0, 0);
        engine.roll_with(a, 3).unwrap();
        engine.apply_move(a, 0).unwrap();
        assert_eq!(engine.tokens_of(a)[0].steps, Some(3));
        assert_eq!(engine.current_player().map(|p| p.id), Some(b));
    }
    #[test]
    fn overshooting_moves_are_not_offered() {
        let (mut engine, a, _) = two_player_game();
        place(&mut engine, a, 0, FINISH_STEP - 2);
        assert!(engine.available_moves(a, 3).is_empty());
        let moves = engine.available_moves(a, 2);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].kind, MoveKind::Finish);
    }
    #[test]
    fn exact_finish_wins_when_last_token() {
        let (mut engine, a, _) = two_player_game();
        finish_all_but(&mut engine, a, 0);
        place(&mut engine, a, 0, FINISH_STEP - 3);
        engine.roll_with(a, 3).unwrap();
        let moves = &engine.turn().available_moves;
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].kind, MoveKind::Finish);
        engine.apply_move(a, 0).unwrap();
        assert_eq!(engine.tokens_of(a)[0].status, TokenStatus::Finished);
        assert_eq!(engine.phase(), Phase::Finished);
        assert_eq!(engine.winner(), Some(a));
        let result = engine.consume_results().expect("pending result");
        assert_eq!(result.winner, a);
        assert_eq!(result.participants.len(), 2);
        // one-shot: a second consume sees nothing
        assert!(engine.consume_results().is_none());
    }
    #[test]
    fn capture_bounces_all_cohabitants_on_unsafe_square() {
        let (mut engine, a, b) = two_player_game();
        // red ring index 5 is blue path step 44: (13 + 44) % 52 = 5
        place(&mut engine, b, 1, 44);
        place(&mut engine, b, 2, 44);
        place(&mut engine, a, 0, 2);
        engine.roll_with(a, 3).unwrap();
        engine.apply_move(a, 0).unwrap();
        for i in [1, 2] {
            let victim = &engine.tokens_of(b)[i];
            assert_eq!(victim.status, TokenStatus::Base);
            assert_eq!(victim.steps, None);
        }
        match engine.state().last_event {
            Some(Event::Move { captured, .. }) => assert_eq!(captured.len(), 2),
            other => panic!("expected move event, got {:?}", other),
        }
    }
    #[test]
    fn no_capture_on_safe_square() {
        let (mut engine, a, b) = two_player_game();
        // red ring index 8 is safe; blue reaches it at step 47
        place(&mut engine, b, 0, 47);
        place(&mut engine, a, 0, 5);
        engine.roll_with(a, 3).unwrap();
        engine.apply_move(a, 0).unwrap();
        assert_eq!(engine.tokens_of(b)[0].status, TokenStatus::Active);
        assert_eq!(engine.tokens_of(b)[0].steps, Some(47));
    }
    #[test]
    fn own_tokens_are_never_captured() {
        let (mut engine, a, _) = two_player_game();
        place(&mut engine, a, 0, 2);
        place(&mut engine, a, 1, 5);
        engine.roll_with(a, 3).unwrap();
        engine.apply_move(a, 0).unwrap();
        assert_eq!(engine.tokens_of(a)[1].status, TokenStatus::Active);
    }
    #[test]
    fn home_stretch_is_private() {
        let (mut engine, a, b) = two_player_game();
        place(&mut engine, b, 0, 53);
        place(&mut engine, a, 0, 50);
        engine.roll_with(a, 3).unwrap();
        engine.apply_move(a, 0).unwrap();
        // both sit at "step 53" of their own paths, no interaction
        assert_eq!(engine.tokens_of(b)[0].status, TokenStatus::Active);
    }
    #[test]
    fn state_projection_is_idempotent() {
        let (mut engine, a, _) = two_player_game();
        engine.roll_with(a, 6).unwrap();
        assert_eq!(engine.state(), engine.state());
    }
    #[test]
    fn state_snapshot_shape() {
        let (engine, a, _) = two_player_game();
        let state = engine.state();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.available_seats, 2);
        assert_eq!(state.available_colors, vec![Color::Yellow, Color::Green]);
        assert!(state.players[0].is_host);
        assert!(state.players[0].is_current);
        assert_eq!(state.current_player, Some(a));
        assert_eq!(state.tokens.len(), 2);
    }
    #[test]
    fn removing_player_mid_match_abandons_game() {
        let (mut engine, _, _) = two_player_game();
        let removed = engine.remove_player("conn-b").expect("seated");
        assert_eq!(removed.id, Color::Blue);
        assert_eq!(engine.phase(), Phase::Waiting);
        assert!(!engine.turn().awaiting_move);
    }
    #[test]
    fn removing_current_player_clears_their_pending_roll() {
        let mut engine = Engine::new("test");
        let a = join(&mut engine, "conn-a").id;
        let b = join(&mut engine, "conn-b").id;
        join(&mut engine, "conn-c");
        engine.start(a).unwrap();
        engine.roll_with(a, 6).unwrap();
        assert!(engine.turn().awaiting_move);
        engine.remove_player("conn-a").expect("seated");
        assert_eq!(engine.phase(), Phase::Playing);
        assert_eq!(engine.current_player().map(|p| p.id), Some(b));
        assert!(!engine.turn().awaiting_move);
        // the next seat rolls fresh dice, unencumbered by the stale turn
        engine.roll_with(b, 6).unwrap();
        assert!(engine.turn().awaiting_move);
    }
    #[test]
    fn removing_an_earlier_seat_keeps_the_current_player() {
        let mut engine = Engine::new("test");
        let a = join(&mut engine, "conn-a").id;
        let b = join(&mut engine, "conn-b").id;
        let c = join(&mut engine, "conn-c").id;
        engine.start(a).unwrap();
        engine.roll_with(a, 3).unwrap(); // no moves, turn passes to b
        engine.roll_with(b, 3).unwrap(); // no moves, turn passes to c
        assert_eq!(engine.current_player().map(|p| p.id), Some(c));
        engine.remove_player("conn-a").expect("seated");
        assert_eq!(engine.current_player().map(|p| p.id), Some(c));
    }
    #[test]
    fn emptied_room_fully_resets() {
        let (mut engine, _, _) = two_player_game();
        engine.force_end().unwrap();
        engine.remove_player("conn-a");
        engine.remove_player("conn-b");
        assert_eq!(engine.phase(), Phase::Waiting);
        assert_eq!(engine.winner(), None);
        assert!(engine.consume_results().is_none());
    }
    #[test]
    fn remove_unknown_connection_is_none() {
        let mut engine = Engine::new("test");
        assert!(engine.remove_player("ghost").is_none());
    }
    #[test]
    fn force_end_records_pending_result_once() {
        let (mut engine, _, _) = two_player_game();
        let winner = engine.force_end().unwrap();
        assert_eq!(engine.phase(), Phase::Finished);
        assert_eq!(engine.winner(), Some(winner));
        assert_eq!(engine.force_end(), Err(GameError::AlreadyFinished));
        assert_eq!(engine.consume_results().map(|r| r.winner), Some(winner));
        assert!(engine.consume_results().is_none());
    }
    #[test]
    fn engine_round_trips_through_serde() {
        let (mut engine, a, _) = two_player_game();
        engine.roll_with(a, 6).unwrap();
        engine.apply_move(a, 0).unwrap();
        let blob = serde_json::to_string(&engine).expect("serialize");
        let revived: Engine = serde_json::from_str(&blob).expect("deserialize");
        assert_eq!(revived.state(), engine.state());
    }
    #[test]
    fn dice_history_records_both_outcomes() {
        let (mut engine, a, b) = two_player_game();
        engine.roll_with(a, 3).unwrap();
        engine.roll_with(b, 6).unwrap();
        let state = engine.state();
        let details: Vec<_> = state
            .history
            .iter()
            .filter_map(|e| match &e.kind {
                HistoryKind::Dice { detail, .. } => Some(detail.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(details, vec!["No moves available", "Awaiting move"]);
    }
}
