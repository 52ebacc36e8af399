use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Role of a member inside a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Controls playback and may reorder or prune the queue
    Owner,
    Participant,
}

impl MemberRole {
    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
    pub role: MemberRole,
}

impl Member {
    pub fn owner(user_id: UserId, joined_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            joined_at,
            role: MemberRole::Owner,
        }
    }

    pub fn participant(user_id: UserId, joined_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            joined_at,
            role: MemberRole::Participant,
        }
    }

    pub fn is_owner(&self) -> bool {
        self.role.is_owner()
    }
}
