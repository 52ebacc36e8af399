//! End-to-end room flows through `RoomService` on the in-memory store
//!
//! Run with: cargo test --test room_service_tests

use std::sync::Arc;

use syncqueue_core::{
    config::RoomConfig,
    models::{CreateRoomRequest, PlaybackState, ReportedPlayback, Room, SourceId, UserId},
    repository::MemoryRoomStore,
    service::RoomService,
    Error,
};

fn service() -> RoomService {
    let config = RoomConfig {
        max_members: 3,
        retry_backoff_base_ms: 0,
        ..RoomConfig::default()
    };
    RoomService::new(Arc::new(MemoryRoomStore::new()), config)
}

fn user(id: &str) -> UserId {
    UserId::from(id)
}

async fn room_with_members(service: &RoomService, owner: &UserId, others: &[&UserId]) -> Room {
    let mut room = service
        .create_room(owner, CreateRoomRequest::named("listening party"))
        .await
        .unwrap();
    for member in others {
        room = service.join_room(member, &room.id).await.unwrap();
    }
    room
}

#[tokio::test]
async fn test_join_twice_is_idempotent() {
    let service = service();
    let (alice, bob) = (user("alice"), user("bob"));
    let room = room_with_members(&service, &alice, &[&bob]).await;

    let again = service.join_room(&bob, &room.id).await.unwrap();

    assert_eq!(again.members, room.members);
    assert_eq!(again.version, room.version);
}

#[tokio::test]
async fn test_every_mutation_bumps_version() {
    let service = service();
    let (alice, bob) = (user("alice"), user("bob"));
    let room = room_with_members(&service, &alice, &[]).await;
    assert_eq!(room.version, 1);

    let room = service.join_room(&bob, &room.id).await.unwrap();
    assert_eq!(room.version, 2);
    let room = service
        .update_queue(&room.id, &bob, &SourceId::from("a"))
        .await
        .unwrap();
    assert_eq!(room.version, 3);
    let room = service
        .advance_playback(&room.id, &alice, &ReportedPlayback::idle())
        .await
        .unwrap();
    assert_eq!(room.version, 4);
}

#[tokio::test]
async fn test_room_full() {
    let service = service();
    let (a, b, c, d) = (user("a"), user("b"), user("c"), user("d"));
    let room = room_with_members(&service, &a, &[&b, &c]).await;

    let err = service.join_room(&d, &room.id).await.unwrap_err();
    assert!(matches!(err, Error::RoomFull));
}

#[tokio::test]
async fn test_owner_succession_follows_join_order() {
    let service = service();
    let (first, second, third) = (user("first"), user("second"), user("third"));
    let room = room_with_members(&service, &first, &[&second, &third]).await;

    let room = service.leave_room(&first, &room.id).await.unwrap();

    assert_eq!(room.owner_id, second);
    assert!(room.member(&second).unwrap().is_owner());
    assert_eq!(room.members.len(), 2);
    assert!(room.check_invariants().is_ok());
}

#[tokio::test]
async fn test_last_member_leaving_closes_room() {
    let service = service();
    let (alice, bob) = (user("alice"), user("bob"));
    let room = room_with_members(&service, &alice, &[&bob]).await;

    service.leave_room(&alice, &room.id).await.unwrap();
    let room = service.leave_room(&bob, &room.id).await.unwrap();
    assert!(room.is_closed());

    let err = service.join_room(&alice, &room.id).await.unwrap_err();
    assert!(matches!(err, Error::RoomClosed));

    let err = service
        .update_queue(&room.id, &bob, &SourceId::from("late"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RoomClosed));

    // Closed rooms stay readable.
    let history = service.get_room(&room.id).await.unwrap();
    assert!(history.is_closed());
    assert!(service.list_members(&room.id).await.unwrap().is_empty());
    assert!(service.list_rooms(&alice).await.unwrap().iter().any(|r| r.id == room.id));
}

#[tokio::test]
async fn test_advance_moves_single_track_to_current() {
    let service = service();
    let (alice, bob) = (user("alice"), user("bob"));
    let room = room_with_members(&service, &alice, &[&bob]).await;
    service
        .update_queue(&room.id, &bob, &SourceId::from("T"))
        .await
        .unwrap();

    let room = service
        .advance_playback(&room.id, &alice, &ReportedPlayback::idle())
        .await
        .unwrap();

    assert!(room.queue.is_empty());
    assert_eq!(room.current_source_id().unwrap().as_str(), "T");
    assert_eq!(room.current_track.as_ref().unwrap().track.requested_by, bob);
    assert_eq!(room.playback_state(), PlaybackState::Playing);

    let playing = service.get_playback(&room.id).await.unwrap().unwrap();
    assert_eq!(playing.source_id().as_str(), "T");
}

#[tokio::test]
async fn test_non_owner_advance_changes_nothing() {
    let service = service();
    let (alice, bob) = (user("alice"), user("bob"));
    let room = room_with_members(&service, &alice, &[&bob]).await;
    let before = service
        .update_queue(&room.id, &bob, &SourceId::from("T"))
        .await
        .unwrap();

    let err = service
        .advance_playback(&room.id, &bob, &ReportedPlayback::idle())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthorized(_)));

    let after = service.get_room(&room.id).await.unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_stale_advance_changes_nothing() {
    let service = service();
    let alice = user("alice");
    let room = room_with_members(&service, &alice, &[]).await;
    for source in ["one", "two"] {
        service
            .update_queue(&room.id, &alice, &SourceId::from(source))
            .await
            .unwrap();
    }
    let before = service
        .advance_playback(&room.id, &alice, &ReportedPlayback::idle())
        .await
        .unwrap();

    // A lagging client still believes nothing is playing.
    let err = service
        .advance_playback(&room.id, &alice, &ReportedPlayback::idle())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StaleState { .. }));
    assert_eq!(service.get_room(&room.id).await.unwrap(), before);

    let room = service
        .advance_playback(&room.id, &alice, &ReportedPlayback::seen(before.current_track.as_ref()))
        .await
        .unwrap();
    assert_eq!(room.current_source_id().unwrap().as_str(), "two");
}

#[tokio::test]
async fn test_queue_editing() {
    let service = service();
    let (alice, bob, carol) = (user("alice"), user("bob"), user("carol"));
    let room = room_with_members(&service, &alice, &[&bob, &carol]).await;
    for (who, source) in [(&bob, "b1"), (&carol, "c1"), (&bob, "b2")] {
        service
            .update_queue(&room.id, who, &SourceId::from(source))
            .await
            .unwrap();
    }

    let err = service
        .update_queue(&room.id, &carol, &SourceId::from("b1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateTrack(_)));

    let err = service
        .remove_track(&room.id, &carol, &SourceId::from("b1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthorized(_)));

    service
        .remove_track(&room.id, &bob, &SourceId::from("b1"))
        .await
        .unwrap();
    let room = service
        .reorder_track(&room.id, &alice, &SourceId::from("b2"), 0)
        .await
        .unwrap();

    let order: Vec<_> = room.queue.iter().map(|t| t.source_id.as_str()).collect();
    assert_eq!(order, vec!["b2", "c1"]);
}

#[tokio::test]
async fn test_transfer_ownership_moves_playback_control() {
    let service = service();
    let (alice, bob) = (user("alice"), user("bob"));
    let room = room_with_members(&service, &alice, &[&bob]).await;

    service.transfer_ownership(&room.id, &alice, &bob).await.unwrap();

    let err = service
        .advance_playback(&room.id, &alice, &ReportedPlayback::idle())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthorized(_)));
    service
        .advance_playback(&room.id, &bob, &ReportedPlayback::idle())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_lagging_view_of_requeued_source_is_stale() {
    let service = service();
    let (alice, bob) = (user("alice"), user("bob"));
    let room = room_with_members(&service, &alice, &[&bob]).await;
    let x = SourceId::from("x");

    service.update_queue(&room.id, &bob, &x).await.unwrap();
    let first = service
        .advance_playback(&room.id, &alice, &ReportedPlayback::idle())
        .await
        .unwrap();
    // Bob's client stops refreshing here.
    let lagging = ReportedPlayback::seen(first.current_track.as_ref());

    service.update_queue(&room.id, &bob, &x).await.unwrap();
    let replay = service
        .advance_playback(&room.id, &alice, &ReportedPlayback::seen(first.current_track.as_ref()))
        .await
        .unwrap();
    assert_eq!(replay.current_source_id(), Some(&x));

    let err = service
        .advance_playback(&room.id, &alice, &lagging)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StaleState { .. }));
    assert_eq!(service.get_room(&room.id).await.unwrap(), replay);
}
