use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::id::{RoomId, SourceId, UserId};
use super::member::Member;
use super::track::{NowPlaying, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Active,
    /// Terminal: the last member left. Kept for history.
    Closed,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::str::FromStr for RoomStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            _ => Err(crate::Error::InvalidInput(format!("Invalid RoomStatus: {s}"))),
        }
    }
}

/// Playback state of an active room, driven only by `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// Room aggregate: membership, pending queue and now-playing pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub created_by: UserId,
    pub owner_id: UserId,
    pub status: RoomStatus,
    /// Insertion order is join order
    pub members: Vec<Member>,
    pub queue: Vec<Track>,
    pub current_track: Option<NowPlaying>,
    /// Per-room capacity; `None` falls back to the configured default
    pub max_members: Option<usize>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// A fresh room whose creator is its only member and owner.
    ///
    /// Version 0 means "not persisted yet"; the store assigns 1 on create.
    pub fn new(name: String, created_by: UserId, max_members: Option<usize>, now: DateTime<Utc>) -> Self {
        Self {
            id: RoomId::new(),
            name,
            owner_id: created_by.clone(),
            members: vec![Member::owner(created_by.clone(), now)],
            created_by,
            status: RoomStatus::Active,
            queue: Vec::new(),
            current_track: None,
            max_members,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    pub fn member(&self, user_id: &UserId) -> Option<&Member> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }

    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.member(user_id).is_some()
    }

    /// Owner authority requires current membership, so a closed room has no owner.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id && self.is_member(user_id)
    }

    pub fn queue_position(&self, source_id: &SourceId) -> Option<usize> {
        self.queue.iter().position(|t| &t.source_id == source_id)
    }

    pub fn current_source_id(&self) -> Option<&SourceId> {
        self.current_track.as_ref().map(NowPlaying::source_id)
    }

    pub fn playback_state(&self) -> PlaybackState {
        if self.current_track.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn capacity(&self, default_max_members: usize) -> usize {
        self.max_members.unwrap_or(default_max_members)
    }

    /// Verify the aggregate invariants, returning the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen_users = HashSet::new();
        for member in &self.members {
            if !seen_users.insert(&member.user_id) {
                return Err(format!("duplicate member {}", member.user_id));
            }
        }

        if self.members.is_empty() {
            if !self.is_closed() {
                return Err("active room has no members".to_string());
            }
        } else {
            if self.is_closed() {
                return Err("closed room still has members".to_string());
            }
            let owners: Vec<_> = self.members.iter().filter(|m| m.is_owner()).collect();
            if owners.len() != 1 {
                return Err(format!("expected one owner, found {}", owners.len()));
            }
            if owners[0].user_id != self.owner_id {
                return Err(format!(
                    "owner_id {} does not match owner member {}",
                    self.owner_id, owners[0].user_id
                ));
            }
        }

        let mut seen_sources = HashSet::new();
        for track in &self.queue {
            if !seen_sources.insert(&track.source_id) {
                return Err(format!("duplicate pending track {}", track.source_id));
            }
        }

        Ok(())
    }
}

/// Input for room creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub max_members: Option<usize>,
}

impl CreateRoomRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_members: None,
        }
    }
}
