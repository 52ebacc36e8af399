//! Test helpers and fixtures for syncqueue-core unit tests

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::config::RoomConfig;
use crate::models::{Member, NowPlaying, Room, RoomId, RoomStatus, SourceId, Track, UserId};

/// Create a test user ID
pub fn test_user_id(id: &str) -> UserId {
    UserId::from_string(id.to_string())
}

/// Generate a random room ID for testing
pub fn random_room_id() -> RoomId {
    RoomId::new()
}

/// Fixed instant so join/add timestamps are deterministic
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().unwrap_or_else(Utc::now)
}

/// Room limits with no backoff so retry tests run instantly
pub fn test_room_config() -> RoomConfig {
    RoomConfig {
        max_members: 4,
        max_queue_len: 8,
        max_save_attempts: 3,
        retry_backoff_base_ms: 0,
    }
}

/// Test fixture builder for Room
///
/// Members join one second apart in the order they are added, starting at
/// `t0()` with the owner.
pub struct RoomFixture {
    id: RoomId,
    name: String,
    owner: UserId,
    participants: Vec<UserId>,
    queued: Vec<(SourceId, Option<UserId>)>,
    playing: Option<SourceId>,
    max_members: Option<usize>,
    version: i64,
    closed: bool,
}

impl RoomFixture {
    pub fn new() -> Self {
        Self {
            id: random_room_id(),
            name: "Test Room".to_string(),
            owner: test_user_id("owner"),
            participants: Vec::new(),
            queued: Vec::new(),
            playing: None,
            max_members: None,
            version: 1,
            closed: false,
        }
    }

    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_participant(mut self, user: UserId) -> Self {
        self.participants.push(user);
        self
    }

    /// Queue a track requested by the owner
    pub fn with_queued(mut self, source_id: &str) -> Self {
        self.queued.push((SourceId::from(source_id), None));
        self
    }

    pub fn with_queued_by(mut self, source_id: &str, requested_by: UserId) -> Self {
        self.queued.push((SourceId::from(source_id), Some(requested_by)));
        self
    }

    pub fn with_playing(mut self, source_id: &str) -> Self {
        self.playing = Some(SourceId::from(source_id));
        self
    }

    pub fn with_max_members(mut self, max_members: usize) -> Self {
        self.max_members = Some(max_members);
        self
    }

    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    /// Build the room as it looks after its last member left: no members,
    /// `owner_id` still naming the last owner, queue and playback kept.
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn build(self) -> Room {
        let start = t0();
        let mut members = vec![Member::owner(self.owner.clone(), start)];
        let status = if self.closed {
            RoomStatus::Closed
        } else {
            RoomStatus::Active
        };
        for (i, user) in self.participants.into_iter().enumerate() {
            let offset = i64::try_from(i + 1).unwrap_or(i64::MAX);
            members.push(Member::participant(user, start + Duration::seconds(offset)));
        }

        let queue = self
            .queued
            .into_iter()
            .map(|(source_id, by)| {
                Track::new(source_id, by.unwrap_or_else(|| self.owner.clone()), start)
            })
            .collect();

        let current_track = self.playing.map(|source_id| {
            NowPlaying::start(Track::new(source_id, self.owner.clone(), start), start)
        });

        Room {
            id: self.id,
            name: self.name,
            created_by: self.owner.clone(),
            owner_id: self.owner,
            status,
            members: if self.closed { Vec::new() } else { members },
            queue,
            current_track,
            max_members: self.max_members,
            version: self.version,
            created_at: start,
            updated_at: start,
        }
    }
}

impl Default for RoomFixture {
    fn default() -> Self {
        Self::new()
    }
}
