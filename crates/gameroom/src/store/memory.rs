use crate::Departure;
use crate::Room;
use crate::RoomInfo;
use crate::RoomStore;
use ludo_core::ConnectionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Single-process room registry. The default when no shared store is
/// configured; rooms live exactly as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
    connections: RwLock<HashMap<ConnectionId, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RoomStore for MemoryStore {
    async fn get_or_create(&self, id: &str) -> anyhow::Result<Arc<Room>> {
        let mut rooms = self.rooms.write().await;
        Ok(rooms
            .entry(id.to_string())
            .or_insert_with(|| {
                log::info!("[store] created room {}", id);
                Arc::new(Room::new(id))
            })
            .clone())
    }
    async fn room(&self, id: &str) -> anyhow::Result<Option<Arc<Room>>> {
        Ok(self.rooms.read().await.get(id).cloned())
    }
    async fn room_by_connection(&self, connection: &str) -> anyhow::Result<Option<Arc<Room>>> {
        let id = match self.connections.read().await.get(connection) {
            Some(id) => id.clone(),
            None => return Ok(None),
        };
        self.room(&id).await
    }
    async fn bind_connection(&self, connection: &str, room_id: &str) -> anyhow::Result<()> {
        self.connections
            .write()
            .await
            .insert(connection.to_string(), room_id.to_string());
        Ok(())
    }
    async fn remove_connection(&self, connection: &str) -> anyhow::Result<Option<Departure>> {
        let id = match self.connections.write().await.remove(connection) {
            Some(id) => id,
            None => return Ok(None),
        };
        Ok(self.room(&id).await?.map(|room| Departure {
            room,
            connection: connection.to_string(),
        }))
    }
    async fn remove_room(&self, id: &str) -> anyhow::Result<()> {
        if self.rooms.write().await.remove(id).is_some() {
            log::info!("[store] removed room {}", id);
        }
        Ok(())
    }
    async fn list_rooms(&self) -> anyhow::Result<Vec<RoomInfo>> {
        let rooms = self
            .rooms
            .read()
            .await
            .values()
            .cloned()
            .collect::<Vec<_>>();
        let mut infos = Vec::with_capacity(rooms.len());
        for room in rooms {
            let engine = room.lock().await;
            infos.push(RoomInfo {
                id: room.id().to_string(),
                players: engine.players().len(),
                phase: engine.phase(),
                created_at: room.created_at(),
            });
        }
        infos.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(infos)
    }
    async fn persist(&self, _room: &Room) -> anyhow::Result<()> {
        Ok(())
    }
    async fn flush(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_returns_the_same_room() {
        let store = MemoryStore::new();
        let a = store.get_or_create("lobby").await.unwrap();
        let b = store.get_or_create("lobby").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(store.room("lobby").await.unwrap().is_some());
        assert!(store.room("other").await.unwrap().is_none());
    }
    #[tokio::test]
    async fn connections_bind_and_depart() {
        let store = MemoryStore::new();
        store.get_or_create("lobby").await.unwrap();
        store.bind_connection("conn-1", "lobby").await.unwrap();
        let by_conn = store.room_by_connection("conn-1").await.unwrap();
        assert_eq!(by_conn.map(|r| r.id().to_string()), Some("lobby".to_string()));
        let departure = store.remove_connection("conn-1").await.unwrap().unwrap();
        assert_eq!(departure.room.id(), "lobby");
        assert_eq!(departure.connection, "conn-1");
        assert!(store.room_by_connection("conn-1").await.unwrap().is_none());
        assert!(store.remove_connection("conn-1").await.unwrap().is_none());
    }
    #[tokio::test]
    async fn listing_reflects_removal() {
        let store = MemoryStore::new();
        store.get_or_create("a").await.unwrap();
        store.get_or_create("b").await.unwrap();
        assert_eq!(store.list_rooms().await.unwrap().len(), 2);
        store.remove_room("a").await.unwrap();
        let infos = store.list_rooms().await.unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, "b");
        assert_eq!(infos[0].players, 0);
    }
}
