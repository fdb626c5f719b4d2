mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis::RedisStore;

use crate::Room;
use crate::RoomInfo;
use ludo_core::ConnectionId;
use std::sync::Arc;

/// Canonicalizes a client-supplied room id: trimmed, lowercased, and
/// rejected outright when nothing remains. Every lookup and every storage
/// key goes through this, so "  Lobby " and "lobby" are the same room.
pub fn normalize_room_id(raw: &str) -> Option<String> {
    let id = raw.trim().to_lowercase();
    if id.is_empty() { None } else { Some(id) }
}

/// A connection's exit from its room, as resolved by the store.
#[derive(Debug, Clone)]
pub struct Departure {
    pub room: Arc<Room>,
    pub connection: ConnectionId,
}

/// Registry of live rooms and the connection-to-room binding.
///
/// Implementations own the room map; callers own the mutation discipline
/// (lock the returned [`Room`] before touching its engine). `persist` and
/// `flush` are replication hooks: [`MemoryStore`] ignores them, the redis
/// store mirrors the room to the shared keyspace.
#[async_trait::async_trait]
pub trait RoomStore: Send + Sync {
    /// Resolves a room by normalized id, creating it if absent.
    async fn get_or_create(&self, id: &str) -> anyhow::Result<Arc<Room>>;
    /// Resolves a room by normalized id.
    async fn room(&self, id: &str) -> anyhow::Result<Option<Arc<Room>>>;
    /// Resolves the room a connection is bound to, if any.
    async fn room_by_connection(&self, connection: &str) -> anyhow::Result<Option<Arc<Room>>>;
    /// Binds a connection to a room so later commands can omit the id.
    async fn bind_connection(&self, connection: &str, room_id: &str) -> anyhow::Result<()>;
    /// Unbinds a connection, reporting which room it departed.
    async fn remove_connection(&self, connection: &str) -> anyhow::Result<Option<Departure>>;
    /// Drops a room from the registry (and the shared keyspace).
    async fn remove_room(&self, id: &str) -> anyhow::Result<()>;
    /// Diagnostics listing of known rooms.
    async fn list_rooms(&self) -> anyhow::Result<Vec<RoomInfo>>;
    /// Mirrors the room's current state to the backing store.
    async fn persist(&self, room: &Room) -> anyhow::Result<()>;
    /// Awaits completion of any in-flight replication writes.
    async fn flush(&self) -> anyhow::Result<()>;
}
