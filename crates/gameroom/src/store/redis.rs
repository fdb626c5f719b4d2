use crate::Departure;
use crate::Room;
use crate::RoomBlob;
use crate::RoomInfo;
use crate::RoomStore;
use ludo_core::ConnectionId;
use ludo_core::ROOM_TTL_SECS;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::RwLock;
use tokio::task::JoinSet;

const ROOM_INDEX: &str = "room_index";
const SOCKET_MAP: &str = "socket_to_room";

fn room_key(id: &str) -> String {
    format!("room:{}", id)
}

/// Redis-replicated room registry.
///
/// Hot rooms live in the local cache; the redis keyspace is the source of
/// truth across processes and restarts. Every `persist` rewrites the full
/// room blob with a fresh TTL, so an abandoned room ages out on its own.
/// Writes are fire-and-forget tasks tracked in a join set; `flush` drains
/// them before shutdown.
pub struct RedisStore {
    conn: MultiplexedConnection,
    rooms: RwLock<HashMap<String, Arc<Room>>>,
    connections: RwLock<HashMap<ConnectionId, String>>,
    writes: WriteSet,
}

/// Tracker for fire-and-forget replication writes.
///
/// Completed tasks are reaped on every insertion, so the set only ever
/// holds writes still in flight; `drain` awaits the remainder at shutdown.
#[derive(Default)]
struct WriteSet {
    tasks: Mutex<JoinSet<()>>,
}

impl WriteSet {
    async fn track<F>(&self, write: F)
    where
        F: Future<Output = redis::RedisResult<()>> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            if let Err(e) = write.await {
                log::error!("[store] redis write failed: {}", e);
            }
        });
    }
    #[cfg(test)]
    async fn reap(&self) {
        let mut tasks = self.tasks.lock().await;
        while tasks.try_join_next().is_some() {}
    }
    async fn drain(&self) {
        let mut tasks = self.tasks.lock().await;
        while tasks.join_next().await.is_some() {}
    }
    #[cfg(test)]
    async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }
}

impl RedisStore {
    /// Connects and pings, failing fast on an unreachable server.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;
        log::info!("[store] redis connected at {}", url);
        Ok(Self {
            conn,
            rooms: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
            writes: WriteSet::default(),
        })
    }

    /// Recovers a room from its stored blob, caching it on success.
    async fn rehydrate(&self, id: &str) -> anyhow::Result<Option<Arc<Room>>> {
        let mut conn = self.conn.clone();
        let raw = conn.get::<String, Option<String>>(room_key(id)).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let blob = match serde_json::from_str::<RoomBlob>(&raw) {
            Ok(blob) => blob,
            Err(e) => {
                log::warn!("[store] discarding unreadable blob for room {}: {}", id, e);
                return Ok(None);
            }
        };
        log::info!("[store] rehydrated room {} from redis", id);
        let room = Arc::new(Room::rehydrate(id, blob.created_at, blob.game));
        self.rooms
            .write()
            .await
            .insert(id.to_string(), room.clone());
        Ok(Some(room))
    }

    async fn spawn_write<F>(&self, write: F)
    where
        F: Future<Output = redis::RedisResult<()>> + Send + 'static,
    {
        self.writes.track(write).await;
    }
}

#[async_trait::async_trait]
impl RoomStore for RedisStore {
    async fn get_or_create(&self, id: &str) -> anyhow::Result<Arc<Room>> {
        if let Some(room) = self.room(id).await? {
            return Ok(room);
        }
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
        if let Some(room) = self.rooms.read().await.get(id) {
            return Ok(Some(room.clone()));
        }
        self.rehydrate(id).await
    }
    async fn room_by_connection(&self, connection: &str) -> anyhow::Result<Option<Arc<Room>>> {
        let cached = self.connections.read().await.get(connection).cloned();
        if let Some(id) = cached {
            return self.room(&id).await;
        }
        let mut conn = self.conn.clone();
        let id = conn
            .hget::<&str, &str, Option<String>>(SOCKET_MAP, connection)
            .await?;
        match id {
            Some(id) => self.room(&id).await,
            None => Ok(None),
        }
    }
    async fn bind_connection(&self, connection: &str, room_id: &str) -> anyhow::Result<()> {
        self.connections
            .write()
            .await
            .insert(connection.to_string(), room_id.to_string());
        let mut conn = self.conn.clone();
        let connection = connection.to_string();
        let room_id = room_id.to_string();
        self.spawn_write(async move {
            conn.hset::<&str, String, String, ()>(SOCKET_MAP, connection, room_id)
                .await
        })
        .await;
        Ok(())
    }
    async fn remove_connection(&self, connection: &str) -> anyhow::Result<Option<Departure>> {
        let cached = self.connections.write().await.remove(connection);
        let id = match cached {
            Some(id) => Some(id),
            None => {
                let mut conn = self.conn.clone();
                conn.hget::<&str, &str, Option<String>>(SOCKET_MAP, connection)
                    .await?
            }
        };
        let mut conn = self.conn.clone();
        let field = connection.to_string();
        self.spawn_write(async move { conn.hdel::<&str, String, ()>(SOCKET_MAP, field).await })
            .await;
        let Some(id) = id else {
            return Ok(None);
        };
        Ok(self.room(&id).await?.map(|room| Departure {
            room,
            connection: connection.to_string(),
        }))
    }
    async fn remove_room(&self, id: &str) -> anyhow::Result<()> {
        self.rooms.write().await.remove(id);
        let mut conn = self.conn.clone();
        let key = room_key(id);
        let member = id.to_string();
        self.spawn_write(async move {
            conn.del::<String, ()>(key).await?;
            conn.zrem::<&str, String, ()>(ROOM_INDEX, member).await
        })
        .await;
        log::info!("[store] removed room {}", id);
        Ok(())
    }
    async fn list_rooms(&self) -> anyhow::Result<Vec<RoomInfo>> {
        let mut conn = self.conn.clone();
        let ids = conn.zrange::<&str, Vec<String>>(ROOM_INDEX, 0, -1).await?;
        let mut infos = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(room) = self.room(&id).await? else {
                // blob aged out via TTL; drop the stale index member too
                let mut conn = self.conn.clone();
                self.spawn_write(async move {
                    conn.zrem::<&str, String, ()>(ROOM_INDEX, id).await
                })
                .await;
                continue;
            };
            let engine = room.lock().await;
            infos.push(RoomInfo {
                id: room.id().to_string(),
                players: engine.players().len(),
                phase: engine.phase(),
                created_at: room.created_at(),
            });
        }
        Ok(infos)
    }
    async fn persist(&self, room: &Room) -> anyhow::Result<()> {
        let blob = RoomBlob::of(room).await;
        let raw = serde_json::to_string(&blob)?;
        let mut conn = self.conn.clone();
        let key = room_key(room.id());
        let member = room.id().to_string();
        // index is scored by last write, so the freshest rooms sort last
        let score = ludo_core::now_millis() as f64;
        self.spawn_write(async move {
            conn.set::<String, String, ()>(key.clone(), raw).await?;
            conn.expire::<String, ()>(key, ROOM_TTL_SECS as i64).await?;
            conn.zadd::<&str, String, f64, ()>(ROOM_INDEX, member, score)
                .await
        })
        .await;
        Ok(())
    }
    async fn flush(&self) -> anyhow::Result<()> {
        self.writes.drain().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_set_reaps_completed_tasks_without_drain() {
        let writes = WriteSet::default();
        let (release, gate) = tokio::sync::watch::channel(false);
        for _ in 0..10 {
            let mut gate = gate.clone();
            writes
                .track(async move {
                    while !*gate.borrow_and_update() {
                        if gate.changed().await.is_err() {
                            break;
                        }
                    }
                    Ok(())
                })
                .await;
        }
        // in-flight writes are all retained
        assert_eq!(writes.len().await, 10);
        release.send(true).expect("receivers alive");
        // reaping alone clears them once they complete
        while writes.len().await > 0 {
            tokio::task::yield_now().await;
            writes.reap().await;
        }
    }
    #[tokio::test]
    async fn drain_leaves_the_set_empty_and_usable() {
        let writes = WriteSet::default();
        for _ in 0..10 {
            writes.track(async { Ok(()) }).await;
        }
        writes.drain().await;
        assert_eq!(writes.len().await, 0);
        writes.track(async { Ok(()) }).await;
        assert_eq!(writes.len().await, 1);
    }
}
