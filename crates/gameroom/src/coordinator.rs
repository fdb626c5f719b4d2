use crate::AiAction;
use crate::ClientCommand;
use crate::MemoryStore;
use crate::ResultsSink;
use crate::Room;
use crate::RoomError;
use crate::RoomInfo;
use crate::RoomStore;
use crate::RoomSummary;
use crate::ServerMessage;
use crate::normalize_room_id;
use crate::results::LogSink;
use crate::run_ai_turns;
use ludo_core::*;
use ludo_engine::Engine;
use ludo_engine::GameError;
use ludo_engine::GameResult;
use ludo_engine::GameState;
use ludo_engine::Identity;
use std::sync::Arc;

/// Everything a mutation produced: the snapshot to broadcast, the summary,
/// and the AI steps taken inside the same critical section (for replay
/// pacing by the transport).
#[derive(Debug)]
pub struct Outcome {
    pub room_id: String,
    pub state: GameState,
    pub summary: RoomSummary,
    pub ai_actions: Vec<AiAction>,
}

/// The single entry point for player actions.
///
/// Every mutating operation follows the same cycle: resolve the room, take
/// its lock, apply the engine operation, drain AI turns, hand any finished
/// result to the sink, release the lock, persist. Errors before the engine
/// call leave the room untouched; engine rejections are reported to the
/// requester only.
pub struct Coordinator {
    store: Arc<dyn RoomStore>,
    sink: Arc<dyn ResultsSink>,
}

impl Coordinator {
    pub fn new(store: Arc<dyn RoomStore>, sink: Arc<dyn ResultsSink>) -> Self {
        Self { store, sink }
    }
    /// Single-process coordinator with log-only results.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(LogSink))
    }

    /// Seats a player in the (possibly new) room and binds their connection.
    ///
    /// A signed-in profile already seated from a different connection is
    /// rejected; the same connection re-joining gets its existing seat back.
    pub async fn join(
        &self,
        connection: &str,
        room: &str,
        identity: Identity,
    ) -> Result<(Color, Outcome), RoomError> {
        let id = normalize_room_id(room).ok_or(RoomError::RoomMissing)?;
        let room = self.store.get_or_create(&id).await?;
        let mut engine = room.lock().await;
        if let Some(profile) = identity.profile.as_ref() {
            if let Some(seated) = engine
                .players()
                .iter()
                .find(|p| p.profile_id() == Some(profile.id))
            {
                if seated.connection.as_deref() != Some(connection) {
                    return Err(RoomError::AlreadyInRoom);
                }
                let color = seated.id;
                let state = engine.state();
                drop(engine);
                self.store.bind_connection(connection, &id).await?;
                return Ok((color, self.conclude(&room, state, None, Vec::new()).await?));
            }
        }
        let identity = Identity {
            connection: Some(connection.to_string()),
            ..identity
        };
        let player = engine.add_player(identity)?;
        log::info!("[room {}] {} joined as {}", id, player.name, player.id);
        let state = engine.state();
        drop(engine);
        self.store.bind_connection(connection, &id).await?;
        let outcome = self.conclude(&room, state, None, Vec::new()).await?;
        Ok((player.id, outcome))
    }

    /// Adds an AI seat; an unrecognized difficulty string falls back to easy.
    pub async fn add_ai(
        &self,
        connection: &str,
        difficulty: Option<&str>,
    ) -> Result<Outcome, RoomError> {
        let tier = Difficulty::normalize(difficulty.unwrap_or_default());
        self.mutate(connection, |engine, _| {
            engine.add_ai(tier).map(|_| ())
        })
        .await
    }

    /// Starts the match on behalf of the requesting connection (host only).
    pub async fn start(&self, connection: &str) -> Result<Outcome, RoomError> {
        self.mutate(connection, |engine, seat| engine.start(seat)).await
    }

    /// Rolls the dice for the requesting connection's seat.
    pub async fn roll(&self, connection: &str) -> Result<Outcome, RoomError> {
        self.mutate(connection, |engine, seat| engine.roll(seat).map(|_| ()))
            .await
    }

    /// Plays the pending roll onto one of the seat's tokens.
    pub async fn move_token(
        &self,
        connection: &str,
        token: TokenIndex,
    ) -> Result<Outcome, RoomError> {
        self.mutate(connection, |engine, seat| engine.apply_move(seat, token))
            .await
    }

    /// Read-only snapshot for the requesting connection's room.
    pub async fn request_state(&self, connection: &str) -> Result<GameState, RoomError> {
        let room = self.room_of(connection).await?;
        let engine = room.lock().await;
        Ok(engine.state())
    }

    /// Handles a connection going away: unseats it, tears the room down when
    /// no humans remain, otherwise lets any now-current AI play on.
    pub async fn disconnect(&self, connection: &str) -> Result<Option<Outcome>, RoomError> {
        let Some(departure) = self.store.remove_connection(connection).await? else {
            return Ok(None);
        };
        let room = departure.room;
        let mut engine = room.lock().await;
        let Some(removed) = engine.remove_player(connection) else {
            return Ok(None);
        };
        log::info!("[room {}] {} left", room.id(), removed.name);
        if engine.players().iter().all(|p| p.is_ai) {
            drop(engine);
            self.store.remove_room(room.id()).await?;
            return Ok(None);
        }
        let ai_actions = run_ai_turns(&mut engine);
        let result = engine.consume_results();
        let state = engine.state();
        drop(engine);
        Ok(Some(self.conclude(&room, state, result, ai_actions).await?))
    }

    /// Diagnostics: declare a random winner immediately.
    pub async fn force_end(&self, room: &str) -> Result<Outcome, RoomError> {
        let id = normalize_room_id(room).ok_or(RoomError::RoomMissing)?;
        let room = self.store.room(&id).await?.ok_or(RoomError::RoomMissing)?;
        let mut engine = room.lock().await;
        engine.force_end()?;
        let result = engine.consume_results();
        let state = engine.state();
        drop(engine);
        self.conclude(&room, state, result, Vec::new()).await
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomInfo>, RoomError> {
        Ok(self.store.list_rooms().await?)
    }

    /// Drains in-flight store writes before the process exits.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        Ok(self.store.flush().await?)
    }

    /// Decodes and executes one wire command, mapping the outcome to the
    /// messages owed back to the transport (ack first, broadcasts after).
    pub async fn handle(&self, connection: &str, command: ClientCommand) -> Vec<ServerMessage> {
        match self.dispatch(connection, command).await {
            Ok(messages) => messages,
            Err(e) => vec![ServerMessage::error(e)],
        }
    }

    async fn dispatch(
        &self,
        connection: &str,
        command: ClientCommand,
    ) -> Result<Vec<ServerMessage>, RoomError> {
        match command {
            ClientCommand::Join { room, name } => {
                let identity = Identity {
                    name,
                    is_guest: true,
                    ..Identity::default()
                };
                let (color, outcome) = self.join(connection, &room, identity).await?;
                Ok(vec![
                    ServerMessage::joined(&outcome.room_id, color),
                    ServerMessage::room(outcome.summary),
                    ServerMessage::state(outcome.state),
                ])
            }
            ClientCommand::AddAi { difficulty } => {
                let outcome = self.add_ai(connection, difficulty.as_deref()).await?;
                Ok(Self::broadcast(outcome))
            }
            ClientCommand::Start => Ok(Self::broadcast(self.start(connection).await?)),
            ClientCommand::Roll => Ok(Self::broadcast(self.roll(connection).await?)),
            ClientCommand::Move { token } => {
                Ok(Self::broadcast(self.move_token(connection, token).await?))
            }
            ClientCommand::RequestState => {
                let state = self.request_state(connection).await?;
                Ok(vec![ServerMessage::state(state)])
            }
            ClientCommand::Leave => Ok(self
                .disconnect(connection)
                .await?
                .map(Self::broadcast)
                .unwrap_or_default()),
        }
    }

    fn broadcast(outcome: Outcome) -> Vec<ServerMessage> {
        vec![
            ServerMessage::room(outcome.summary),
            ServerMessage::state(outcome.state),
        ]
    }

    async fn room_of(&self, connection: &str) -> Result<Arc<Room>, RoomError> {
        self.store
            .room_by_connection(connection)
            .await?
            .ok_or(RoomError::RoomMissing)
    }

    /// The shared mutation cycle: lock, apply, drain AI, snapshot, persist.
    async fn mutate<F>(&self, connection: &str, operation: F) -> Result<Outcome, RoomError>
    where
        F: FnOnce(&mut Engine, Color) -> Result<(), GameError>,
    {
        let room = self.room_of(connection).await?;
        let mut engine = room.lock().await;
        let seat = engine
            .players()
            .iter()
            .find(|p| p.connection.as_deref() == Some(connection))
            .map(|p| p.id)
            .ok_or(RoomError::NotSeated)?;
        operation(&mut engine, seat)?;
        let ai_actions = run_ai_turns(&mut engine);
        let result = engine.consume_results();
        let state = engine.state();
        drop(engine);
        self.conclude(&room, state, result, ai_actions).await
    }

    async fn conclude(
        &self,
        room: &Arc<Room>,
        state: GameState,
        result: Option<GameResult>,
        ai_actions: Vec<AiAction>,
    ) -> Result<Outcome, RoomError> {
        if let Some(result) = result {
            self.sink.publish(&result).await;
        }
        self.store.persist(room).await?;
        Ok(Outcome {
            room_id: room.id().to_string(),
            summary: RoomSummary::of(&state),
            state,
            ai_actions,
        })
    }
}
