//! Room persistence
//!
//! `RoomStore` is the only persistence boundary of the room core. Stores hold
//! whole `Room` aggregates and enforce compare-and-swap by version; they do no
//! business validation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::{
    models::{Room, RoomId, UserId},
    Result,
};

pub use memory::MemoryRoomStore;
pub use postgres::PgRoomStore;

/// Versioned storage for room aggregates
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Insert a new room and return it with version 1.
    ///
    /// Fails with `AlreadyExists` if the id is taken.
    async fn create(&self, room: Room) -> Result<Room>;

    /// Latest persisted snapshot, with its version in `Room::version`.
    async fn load(&self, room_id: &RoomId) -> Result<Room>;

    /// Persist `room` only if the stored version still equals `expected_version`.
    ///
    /// Returns the stored room with `version = expected_version + 1`, or
    /// `VersionConflict` when another writer got there first.
    async fn save(&self, room: Room, expected_version: i64) -> Result<Room>;

    /// Rooms the user currently belongs to or created, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Room>>;
}
