//! Authenticated entry point
//!
//! Resolves the caller's identity through an injected `Authenticator`, parses
//! raw identifiers, then hands typed values to `RoomService`. The room core
//! itself never sees credentials.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    models::{CreateRoomRequest, Member, ReportedPlayback, Room, UserId},
    service::RoomService,
    validation::{parse_room_id, parse_source_id},
    Error, Result,
};

/// Resolves a credential (e.g. a bearer token) to the acting user
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credential: &str) -> Result<UserId>;
}

/// Fixed token table, for local runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenAuthenticator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, user_id: UserId) -> Self {
        self.tokens.insert(token.into(), user_id);
        self
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, credential: &str) -> Result<UserId> {
        let token = credential.strip_prefix("Bearer ").unwrap_or(credential).trim();
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| Error::Authentication("Invalid or expired token".to_string()))
    }
}

#[derive(Clone)]
pub struct RoomGateway {
    rooms: RoomService,
    authenticator: Arc<dyn Authenticator>,
}

impl std::fmt::Debug for RoomGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomGateway").finish()
    }
}

impl RoomGateway {
    pub fn new(rooms: RoomService, authenticator: Arc<dyn Authenticator>) -> Self {
        Self { rooms, authenticator }
    }

    pub async fn list_rooms(&self, credential: &str) -> Result<Vec<Room>> {
        let user_id = self.authenticator.authenticate(credential).await?;
        self.rooms.list_rooms(&user_id).await
    }

    pub async fn create_room(&self, credential: &str, request: CreateRoomRequest) -> Result<Room> {
        let user_id = self.authenticator.authenticate(credential).await?;
        self.rooms.create_room(&user_id, request).await
    }

    pub async fn get_room(&self, credential: &str, room_id: &str) -> Result<Room> {
        self.authenticator.authenticate(credential).await?;
        let room_id = parse_room_id(room_id)?;
        self.rooms.get_room(&room_id).await
    }

    pub async fn list_members(&self, credential: &str, room_id: &str) -> Result<Vec<Member>> {
        self.authenticator.authenticate(credential).await?;
        let room_id = parse_room_id(room_id)?;
        self.rooms.list_members(&room_id).await
    }

    pub async fn join_room(&self, credential: &str, room_id: &str) -> Result<Room> {
        let user_id = self.authenticator.authenticate(credential).await?;
        let room_id = parse_room_id(room_id)?;
        self.rooms.join_room(&user_id, &room_id).await
    }

    pub async fn leave_room(&self, credential: &str, room_id: &str) -> Result<Room> {
        let user_id = self.authenticator.authenticate(credential).await?;
        let room_id = parse_room_id(room_id)?;
        self.rooms.leave_room(&user_id, &room_id).await
    }

    pub async fn update_queue(&self, credential: &str, room_id: &str, source_id: &str) -> Result<Room> {
        let user_id = self.authenticator.authenticate(credential).await?;
        let room_id = parse_room_id(room_id)?;
        let source_id = parse_source_id(source_id)?;
        self.rooms.update_queue(&room_id, &user_id, &source_id).await
    }

    /// `reported_current` is the play the client shows: its source id and the
    /// `started_at` it received with it. `None` means the client shows idle.
    pub async fn advance_playback(
        &self,
        credential: &str,
        room_id: &str,
        reported_current: Option<(&str, DateTime<Utc>)>,
    ) -> Result<Room> {
        let user_id = self.authenticator.authenticate(credential).await?;
        let room_id = parse_room_id(room_id)?;
        let reported = match reported_current {
            Some((source_id, started_at)) => {
                ReportedPlayback::playing(parse_source_id(source_id)?, started_at)
            }
            None => ReportedPlayback::idle(),
        };
        self.rooms.advance_playback(&room_id, &user_id, &reported).await
    }
}
