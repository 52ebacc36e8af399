//! Room service
//!
//! Entry point for every room operation. Mutations run as
//! load → one manager call → compare-and-swap save, and the whole cycle is
//! repeated against a fresh snapshot when another writer committed first.
//! Reads go straight to the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngExt;

use crate::{
    config::RoomConfig,
    models::{CreateRoomRequest, Member, NowPlaying, ReportedPlayback, Room, RoomId, SourceId, UserId},
    repository::RoomStore,
    service::{MembershipManager, PlaybackCoordinator, QueueManager},
    validation::validate_room_name,
    Error, Result,
};

#[derive(Clone)]
pub struct RoomService {
    store: Arc<dyn RoomStore>,
    config: RoomConfig,
    membership: MembershipManager,
    queue: QueueManager,
    playback: PlaybackCoordinator,
}

impl std::fmt::Debug for RoomService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomService")
            .field("config", &self.config)
            .finish()
    }
}

impl RoomService {
    const MAX_BACKOFF_EXPONENT: u32 = 6;

    #[must_use]
    pub fn new(store: Arc<dyn RoomStore>, config: RoomConfig) -> Self {
        Self {
            membership: MembershipManager::new(&config),
            queue: QueueManager::new(&config),
            playback: PlaybackCoordinator::new(),
            store,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    // ==================== Reads ====================

    /// Rooms the user belongs to or created
    pub async fn list_rooms(&self, user_id: &UserId) -> Result<Vec<Room>> {
        self.store.list_for_user(user_id).await
    }

    pub async fn get_room(&self, room_id: &RoomId) -> Result<Room> {
        self.store.load(room_id).await
    }

    /// Members in join order
    pub async fn list_members(&self, room_id: &RoomId) -> Result<Vec<Member>> {
        Ok(self.store.load(room_id).await?.members)
    }

    pub async fn get_playback(&self, room_id: &RoomId) -> Result<Option<NowPlaying>> {
        Ok(self.store.load(room_id).await?.current_track)
    }

    // ==================== Mutations ====================

    /// Create a room owned by `user_id`
    pub async fn create_room(&self, user_id: &UserId, request: CreateRoomRequest) -> Result<Room> {
        let name = validate_room_name(&request.name)?;
        if request.max_members == Some(0) {
            return Err(Error::InvalidInput("max_members must be at least 1".to_string()));
        }

        let room = Room::new(name, user_id.clone(), request.max_members, Utc::now());
        let created = self.store.create(room).await?;

        tracing::info!(
            room_id = %created.id,
            user_id = %user_id,
            "Room created"
        );
        Ok(created)
    }

    pub async fn join_room(&self, user_id: &UserId, room_id: &RoomId) -> Result<Room> {
        self.mutate(room_id, "join", |room, now| self.membership.join(room, user_id, now))
            .await
    }

    pub async fn leave_room(&self, user_id: &UserId, room_id: &RoomId) -> Result<Room> {
        self.mutate(room_id, "leave", |room, _| self.membership.leave(room, user_id))
            .await
    }

    pub async fn transfer_ownership(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        new_owner: &UserId,
    ) -> Result<Room> {
        self.mutate(room_id, "transfer_ownership", |room, _| {
            self.membership.transfer_ownership(room, user_id, new_owner)
        })
        .await
    }

    /// Enqueue `source_id` at the end of the room's queue
    pub async fn update_queue(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        source_id: &SourceId,
    ) -> Result<Room> {
        self.mutate(room_id, "enqueue", |room, now| {
            self.queue.enqueue(room, user_id, source_id, now)
        })
        .await
    }

    pub async fn remove_track(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        source_id: &SourceId,
    ) -> Result<Room> {
        self.mutate(room_id, "remove_track", |room, _| {
            self.queue.remove(room, user_id, source_id)
        })
        .await
    }

    pub async fn reorder_track(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        source_id: &SourceId,
        to_index: usize,
    ) -> Result<Room> {
        self.mutate(room_id, "reorder_track", |room, _| {
            self.queue.reorder(room, user_id, source_id, to_index)
        })
        .await
    }

    pub async fn advance_playback(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
        reported: &ReportedPlayback,
    ) -> Result<Room> {
        self.mutate(room_id, "advance", |room, now| {
            self.playback.advance(room, user_id, reported, now)
        })
        .await
    }

    /// Run one logical operation with optimistic concurrency.
    ///
    /// `apply` is re-run against each fresh snapshot, so it must be a pure
    /// function of the room it is given. A candidate equal to its snapshot is
    /// returned without a save and does not bump the version.
    async fn mutate<F>(&self, room_id: &RoomId, operation: &'static str, apply: F) -> Result<Room>
    where
        F: Fn(&Room, DateTime<Utc>) -> Result<Room>,
    {
        let max_attempts = self.config.max_save_attempts.max(1);

        for attempt in 0..max_attempts {
            let snapshot = self.store.load(room_id).await?;
            let candidate = apply(&snapshot, Utc::now())?;

            if candidate == snapshot {
                return Ok(snapshot);
            }

            match self.store.save(candidate, snapshot.version).await {
                Ok(saved) => {
                    tracing::info!(
                        room_id = %room_id,
                        operation,
                        version = saved.version,
                        attempt = attempt + 1,
                        "Room updated"
                    );
                    return Ok(saved);
                }
                Err(Error::VersionConflict) if attempt + 1 < max_attempts => {
                    let delay = self.backoff_delay(attempt);
                    tracing::debug!(
                        room_id = %room_id,
                        operation,
                        attempt = attempt + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Room version conflict, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(Error::VersionConflict) => {
                    tracing::warn!(
                        room_id = %room_id,
                        operation,
                        attempts = max_attempts,
                        "Room version conflict, retries exhausted"
                    );
                    return Err(Error::VersionConflict);
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::VersionConflict)
    }

    /// Exponential backoff with jitter: base * 2^attempt + random(0..base),
    /// with the exponent capped at `MAX_BACKOFF_EXPONENT`
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.retry_backoff_base_ms;
        if base == 0 {
            return Duration::ZERO;
        }
        let backoff = base.saturating_mul(1 << attempt.min(Self::MAX_BACKOFF_EXPONENT));
        let jitter = rand::rng().random_range(0..base);
        Duration::from_millis(backoff + jitter)
    }
}
