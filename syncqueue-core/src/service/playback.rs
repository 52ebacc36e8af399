//! Playback coordination
//!
//! `advance` is the only writer of `Room::current_track`. It consumes the queue
//! head and publishes it as current in one transition, so no snapshot ever
//! shows a track that has left the queue without becoming current.

use chrono::{DateTime, Duration, Utc};

use crate::{
    models::{NowPlaying, ReportedPlayback, Room, Track, UserId},
    Error, Result,
};

#[derive(Debug, Clone, Default)]
pub struct PlaybackCoordinator;

impl PlaybackCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Move playback to the next queued track, or to idle when the queue is empty.
    ///
    /// `reported` is the play the caller believes is current, source and start
    /// time together. A mismatch means the caller missed a more recent advance
    /// and is rejected as stale, even when the newer play is of the same source.
    pub fn advance(
        &self,
        room: &Room,
        user_id: &UserId,
        reported: &ReportedPlayback,
        now: DateTime<Utc>,
    ) -> Result<Room> {
        if room.is_closed() {
            return Err(Error::RoomClosed);
        }
        if !room.is_owner(user_id) {
            return Err(Error::NotAuthorized("Only the room owner can advance playback".to_string()));
        }
        if !reported.matches(room.current_track.as_ref()) {
            return Err(Error::StaleState {
                reported: reported.current.as_ref().map(ToString::to_string),
                current: room.current_track.as_ref().map(|p| p.marker().to_string()),
            });
        }

        // Start times must differ between consecutive plays, or a report of
        // the previous play of the same source would still match.
        let started_at = match &room.current_track {
            Some(playing) if now <= playing.started_at => {
                playing.started_at + Duration::microseconds(1)
            }
            _ => now,
        };

        let mut next = room.clone();
        next.current_track = if next.queue.is_empty() {
            None
        } else {
            let head = next.queue.remove(0);
            Some(NowPlaying::start(head, started_at))
        };
        Ok(next)
    }

    /// The track `advance` would promote, if any
    #[must_use]
    pub fn next_track<'a>(&self, room: &'a Room) -> Option<&'a Track> {
        room.queue.first()
    }
}
