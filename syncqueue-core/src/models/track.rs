use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::id::{SourceId, UserId};

/// A queued item. Never edited after creation; only moved or promoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub source_id: SourceId,
    pub requested_by: UserId,
    pub added_at: DateTime<Utc>,
}

impl Track {
    pub fn new(source_id: SourceId, requested_by: UserId, added_at: DateTime<Utc>) -> Self {
        Self {
            source_id,
            requested_by,
            added_at,
        }
    }
}

/// The track currently playing in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub track: Track,
    pub started_at: DateTime<Utc>,
}

impl NowPlaying {
    pub fn start(track: Track, started_at: DateTime<Utc>) -> Self {
        Self { track, started_at }
    }

    pub fn source_id(&self) -> &SourceId {
        &self.track.source_id
    }

    pub fn marker(&self) -> PlayMarker {
        PlayMarker {
            source_id: self.track.source_id.clone(),
            started_at: self.started_at,
        }
    }

    /// Playback offset at `now`, clamped at zero for clock skew
    pub fn position_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }
}

/// Identifies one play of a track. The same source can be played more than
/// once, so the start time is part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayMarker {
    pub source_id: SourceId,
    pub started_at: DateTime<Utc>,
}

impl std::fmt::Display for PlayMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.source_id, self.started_at.to_rfc3339())
    }
}

/// What a client believes is playing when it asks to advance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedPlayback {
    pub current: Option<PlayMarker>,
}

impl ReportedPlayback {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn playing(source_id: impl Into<SourceId>, started_at: DateTime<Utc>) -> Self {
        Self {
            current: Some(PlayMarker {
                source_id: source_id.into(),
                started_at,
            }),
        }
    }

    /// The report a client holding `now_playing` would send
    pub fn seen(now_playing: Option<&NowPlaying>) -> Self {
        Self {
            current: now_playing.map(NowPlaying::marker),
        }
    }

    /// Whether this report describes exactly the given play
    pub fn matches(&self, now_playing: Option<&NowPlaying>) -> bool {
        self.current == now_playing.map(NowPlaying::marker)
    }
}
