//! Scripted room session
//!
//! Drives two users through the gateway: create, join, enqueue, advance,
//! a rejected advance from a participant, then an owner handoff by leaving.

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use syncqueue_core::{
    models::{generate_id, CreateRoomRequest, Room, UserId},
    service::{RoomGateway, RoomService, StaticTokenAuthenticator},
    Error,
};

const HOST_TOKEN: &str = "smoke-host";
const GUEST_TOKEN: &str = "smoke-guest";

pub async fn run(rooms: RoomService) -> Result<Room> {
    let host = UserId::from(format!("host-{}", generate_id()));
    let guest = UserId::from(format!("guest-{}", generate_id()));
    let auth = StaticTokenAuthenticator::new()
        .with_token(HOST_TOKEN, host.clone())
        .with_token(GUEST_TOKEN, guest.clone());
    let gateway = RoomGateway::new(rooms, Arc::new(auth));

    let room = gateway
        .create_room(HOST_TOKEN, CreateRoomRequest::named("smoke test"))
        .await?;
    let room_id = room.id.to_string();
    info!(room_id = %room_id, "Room created");

    gateway.join_room(GUEST_TOKEN, &room_id).await?;
    for source in ["intro", "main", "outro"] {
        gateway.update_queue(GUEST_TOKEN, &room_id, source).await?;
    }

    let room = gateway.advance_playback(HOST_TOKEN, &room_id, None).await?;
    info!(current = ?room.current_source_id(), queued = room.queue.len(), "Advanced");
    let Some(intro) = room.current_track.as_ref().map(|p| p.marker()) else {
        bail!("advance did not start the first queued track");
    };
    let shown = Some((intro.source_id.as_str(), intro.started_at));

    match gateway.advance_playback(GUEST_TOKEN, &room_id, shown).await {
        Err(Error::NotAuthorized(_)) => info!("Participant advance rejected"),
        Ok(_) => bail!("participant was allowed to advance playback"),
        Err(e) => return Err(e.into()),
    }

    match gateway.advance_playback(HOST_TOKEN, &room_id, None).await {
        Err(Error::StaleState { .. }) => info!("Stale advance rejected"),
        Ok(_) => bail!("stale advance was accepted"),
        Err(e) => return Err(e.into()),
    }

    gateway.advance_playback(HOST_TOKEN, &room_id, shown).await?;

    let room = gateway.leave_room(HOST_TOKEN, &room_id).await?;
    if room.owner_id != guest {
        bail!("ownership did not pass to {guest}");
    }
    if let Err(reason) = room.check_invariants() {
        bail!("room invariants violated: {reason}");
    }

    info!(
        room_id = %room_id,
        owner = %room.owner_id,
        version = room.version,
        "Smoke session finished"
    );
    Ok(room)
}
