//! Registry of live rooms, keyed by room code.
//!
//! The registry only maps codes to actor handles; game state never lives
//! here. A background sweep task evicts rooms whose actor exited and rooms
//! that outlived the creation-based TTL.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};

use crate::game::constants::{MAX_BUY_IN, ROOM_TTL, SWEEP_INTERVAL};
use crate::game::entities::Chips;

use super::actor::{RoomActor, RoomHandle};
use super::code;

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("buy-in must be between 1 and {MAX_BUY_IN} chips")]
    InvalidBuyIn,
    #[error("malformed room code")]
    InvalidCode,
    #[error("no such room")]
    NotFound,
    #[error("could not allocate a unique room code")]
    CodesExhausted,
}

struct RoomEntry {
    handle: RoomHandle,
    created_at: Instant,
}

/// Shared room registry. Cheap to clone; all clones see the same rooms.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<RwLock<HashMap<String, RoomEntry>>>,
}

impl RoomRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a room, spawn its actor, and hand back the handle. Retries on
    /// the (unlikely) code collision.
    pub async fn create_room(&self, buy_in: Chips) -> Result<RoomHandle, RoomError> {
        if buy_in == 0 || buy_in > MAX_BUY_IN {
            return Err(RoomError::InvalidBuyIn);
        }

        let mut rooms = self.rooms.write().await;
        for _ in 0..16 {
            let room_code = code::generate();
            if rooms.contains_key(&room_code) {
                continue;
            }
            let (actor, handle) = RoomActor::new(room_code.clone(), buy_in);
            tokio::spawn(actor.run());
            rooms.insert(
                room_code,
                RoomEntry {
                    handle: handle.clone(),
                    created_at: Instant::now(),
                },
            );
            log::info!("created room {} (buy-in {buy_in})", handle.code());
            return Ok(handle);
        }
        // 32^5 codes; hitting 16 collisions in a row means something is
        // deeply wrong.
        Err(RoomError::CodesExhausted)
    }

    /// Look a room up by code, any casing.
    pub async fn get(&self, raw_code: &str) -> Result<RoomHandle, RoomError> {
        let room_code = code::normalize(raw_code);
        if !code::is_valid(&room_code) {
            return Err(RoomError::InvalidCode);
        }
        let rooms = self.rooms.read().await;
        match rooms.get(&room_code) {
            Some(entry) if !entry.handle.is_closed() => Ok(entry.handle.clone()),
            _ => Err(RoomError::NotFound),
        }
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }

    /// One eviction pass: ask expired rooms to close, then drop every entry
    /// whose actor is gone.
    pub async fn sweep(&self) {
        let expired: Vec<RoomHandle> = {
            let rooms = self.rooms.read().await;
            rooms
                .values()
                .filter(|entry| entry.created_at.elapsed() >= ROOM_TTL)
                .map(|entry| entry.handle.clone())
                .collect()
        };
        for handle in expired {
            log::info!("room {} hit its TTL, closing", handle.code());
            let _ = handle.close().await;
        }

        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|_, entry| {
            !entry.handle.is_closed() && entry.created_at.elapsed() < ROOM_TTL
        });
        let evicted = before - rooms.len();
        if evicted > 0 {
            log::info!("swept {evicted} room(s), {} remain", rooms.len());
        }
    }

    /// Spawn the periodic sweep task. Abort the returned handle on
    /// shutdown.
    #[must_use]
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                registry.sweep().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn test_create_and_lookup_any_casing() {
        let registry = RoomRegistry::new();
        let handle = registry.create_room(100).await.unwrap();
        let room_code = handle.code().to_string();

        let found = registry.get(&room_code).await.unwrap();
        assert_eq!(found.code(), room_code);
        let found = registry.get(&room_code.to_lowercase()).await.unwrap();
        assert_eq!(found.code(), room_code);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_out_of_range_buy_in_rejected() {
        let registry = RoomRegistry::new();
        assert!(matches!(
            registry.create_room(0).await,
            Err(RoomError::InvalidBuyIn)
        ));
        assert!(matches!(
            registry.create_room(u64::MAX).await,
            Err(RoomError::InvalidBuyIn)
        ));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_bad_codes_rejected_before_lookup() {
        let registry = RoomRegistry::new();
        assert!(matches!(
            registry.get("AB").await,
            Err(RoomError::InvalidCode)
        ));
        assert!(matches!(
            registry.get("AB0CD").await,
            Err(RoomError::InvalidCode)
        ));
        assert!(matches!(
            registry.get("ABCDE").await,
            Err(RoomError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_sweep_drops_closed_rooms() {
        let registry = RoomRegistry::new();
        let handle = registry.create_room(100).await.unwrap();
        handle.close().await.unwrap();
        sleep(Duration::from_millis(50)).await;

        registry.sweep().await;
        assert!(registry.is_empty().await);
        assert!(matches!(
            registry.get(handle.code()).await,
            Err(RoomError::NotFound)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_closes_rooms_past_ttl() {
        let registry = RoomRegistry::new();
        let handle = registry.create_room(100).await.unwrap();

        tokio::time::sleep(ROOM_TTL + Duration::from_secs(1)).await;
        registry.sweep().await;
        // Entry is gone and the close request reached the actor.
        assert!(registry.is_empty().await);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_closed());
    }
}
