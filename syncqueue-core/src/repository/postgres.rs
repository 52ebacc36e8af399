use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};

use super::RoomStore;
use crate::{
    models::{Member, NowPlaying, Room, RoomId, Track, UserId},
    Error, Result,
};

/// Schema migrations for the `rooms` table
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../migrations");

const ROOM_COLUMNS: &str = "id, name, created_by, owner_id, status, members, queue, current_track,
     max_members, version, created_at, updated_at";

/// Postgres room store.
///
/// One row per aggregate; membership, queue and now-playing live in JSONB
/// columns so a whole room is swapped in a single conditional UPDATE.
#[derive(Clone)]
pub struct PgRoomStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgRoomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgRoomStore").finish()
    }
}

impl PgRoomStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, room_id: &RoomId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM rooms WHERE id = $1")
            .bind(room_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    fn row_to_room(row: &PgRow) -> Result<Room> {
        let status: String = row.try_get("status")?;
        let members: Json<Vec<Member>> = row.try_get("members")?;
        let queue: Json<Vec<Track>> = row.try_get("queue")?;
        let current_track: Option<Json<NowPlaying>> = row.try_get("current_track")?;
        let max_members: Option<i32> = row.try_get("max_members")?;

        Ok(Room {
            id: RoomId::from_string(row.try_get("id")?),
            name: row.try_get("name")?,
            created_by: UserId::from_string(row.try_get("created_by")?),
            owner_id: UserId::from_string(row.try_get("owner_id")?),
            status: status.parse()?,
            members: members.0,
            queue: queue.0,
            current_track: current_track.map(|c| c.0),
            max_members: max_members
                .map(usize::try_from)
                .transpose()
                .map_err(|_| Error::Internal("Negative max_members in storage".to_string()))?,
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn max_members_column(room: &Room) -> Result<Option<i32>> {
        room.max_members
            .map(i32::try_from)
            .transpose()
            .map_err(|_| Error::InvalidInput("max_members out of range".to_string()))
    }
}

#[async_trait]
impl RoomStore for PgRoomStore {
    async fn create(&self, room: Room) -> Result<Room> {
        let query = format!(
            "INSERT INTO rooms (id, name, created_by, owner_id, status, members, queue, current_track,
                                max_members, version, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1, $10, $11)
             RETURNING {ROOM_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(room.id.as_str())
            .bind(&room.name)
            .bind(room.created_by.as_str())
            .bind(room.owner_id.as_str())
            .bind(room.status.as_str())
            .bind(Json(&room.members))
            .bind(Json(&room.queue))
            .bind(room.current_track.as_ref().map(Json))
            .bind(Self::max_members_column(&room)?)
            .bind(room.created_at)
            .bind(room.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Self::row_to_room(&row)
    }

    async fn load(&self, room_id: &RoomId) -> Result<Room> {
        let query = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(room_id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::RoomNotFound)?;

        Self::row_to_room(&row)
    }

    async fn save(&self, room: Room, expected_version: i64) -> Result<Room> {
        let query = format!(
            "UPDATE rooms
             SET name = $2, owner_id = $3, status = $4, members = $5, queue = $6,
                 current_track = $7, max_members = $8, updated_at = $9, version = version + 1
             WHERE id = $1 AND version = $10
             RETURNING {ROOM_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(room.id.as_str())
            .bind(&room.name)
            .bind(room.owner_id.as_str())
            .bind(room.status.as_str())
            .bind(Json(&room.members))
            .bind(Json(&room.queue))
            .bind(room.current_track.as_ref().map(Json))
            .bind(Self::max_members_column(&room)?)
            .bind(Utc::now())
            .bind(expected_version)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_room(&row),
            None if self.exists(&room.id).await? => Err(Error::VersionConflict),
            None => Err(Error::RoomNotFound),
        }
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Room>> {
        let query = format!(
            "SELECT {ROOM_COLUMNS} FROM rooms
             WHERE created_by = $1 OR members @> $2
             ORDER BY created_at DESC"
        );
        let membership = json!([{ "user_id": user_id.as_str() }]);

        let rows = sqlx::query(&query)
            .bind(user_id.as_str())
            .bind(membership)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_room).collect()
    }
}
