use ludo_core::*;
use ludo_engine::Engine;
use ludo_engine::Phase;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::sync::MutexGuard;

/// One live room: an engine behind its mutation-serializing mutex.
///
/// The lock is the room's concurrency contract: every mutation, including
/// the AI turns it triggers, runs under one acquisition, so a human action
/// and its AI follow-up are observed as a single atomic step. Different
/// rooms share nothing and proceed in parallel.
#[derive(Debug)]
pub struct Room {
    id: String,
    created_at: u64,
    engine: Mutex<Engine>,
}

impl Room {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            created_at: now_millis(),
            engine: Mutex::new(Engine::new(id)),
        }
    }
    /// Rebuilds a room around an engine recovered from the shared store.
    pub fn rehydrate(id: &str, created_at: u64, engine: Engine) -> Self {
        Self {
            id: id.to_string(),
            created_at,
            engine: Mutex::new(engine),
        }
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn created_at(&self) -> u64 {
        self.created_at
    }
    /// Acquires the room's mutation lock.
    pub async fn lock(&self) -> MutexGuard<'_, Engine> {
        self.engine.lock().await
    }
}

/// Diagnostics row for `list_rooms`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomInfo {
    pub id: String,
    pub players: usize,
    pub phase: Phase,
    pub created_at: u64,
}

/// Serialized form of a full room, as written to the shared store.
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomBlob {
    pub id: String,
    pub created_at: u64,
    pub game: Engine,
}

impl RoomBlob {
    pub async fn of(room: &Room) -> Self {
        Self {
            id: room.id().to_string(),
            created_at: room.created_at(),
            game: room.lock().await.clone(),
        }
    }
}
