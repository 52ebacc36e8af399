//! Membership rules
//!
//! Join, leave and ownership transfer over a room snapshot. Every operation
//! returns a new candidate room and leaves the input untouched, so a rejected
//! request never produces a partially edited aggregate.

use chrono::{DateTime, Utc};

use crate::{
    config::RoomConfig,
    models::{Member, MemberRole, Room, RoomStatus, UserId},
    Error, Result,
};

#[derive(Debug, Clone)]
pub struct MembershipManager {
    default_capacity: usize,
}

impl MembershipManager {
    #[must_use]
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            default_capacity: config.max_members,
        }
    }

    /// Add `user_id` as a participant.
    ///
    /// Joining a room one already belongs to returns the room unchanged.
    pub fn join(&self, room: &Room, user_id: &UserId, now: DateTime<Utc>) -> Result<Room> {
        if room.is_member(user_id) {
            return Ok(room.clone());
        }
        if room.is_closed() {
            return Err(Error::RoomClosed);
        }
        if room.members.len() >= room.capacity(self.default_capacity) {
            return Err(Error::RoomFull);
        }

        let mut next = room.clone();
        next.members.push(Member::participant(user_id.clone(), now));
        Ok(next)
    }

    /// Remove `user_id`, handing ownership on or closing the room as needed.
    ///
    /// The successor of a departing owner is the remaining member with the
    /// earliest `joined_at`; ties go to whoever appears first in join order.
    pub fn leave(&self, room: &Room, user_id: &UserId) -> Result<Room> {
        let index = room
            .members
            .iter()
            .position(|m| &m.user_id == user_id)
            .ok_or(Error::NotMember)?;

        let mut next = room.clone();
        let departed = next.members.remove(index);

        if departed.is_owner() {
            match next.members.iter_mut().min_by_key(|m| m.joined_at) {
                Some(successor) => {
                    successor.role = MemberRole::Owner;
                    next.owner_id = successor.user_id.clone();
                    tracing::debug!(
                        room_id = %room.id,
                        from = %departed.user_id,
                        to = %next.owner_id,
                        "Ownership passed on"
                    );
                }
                None => {
                    next.status = RoomStatus::Closed;
                    tracing::debug!(room_id = %room.id, "Last member left, room closed");
                }
            }
        }

        Ok(next)
    }

    /// Hand ownership to another current member. Owner only.
    pub fn transfer_ownership(&self, room: &Room, actor: &UserId, new_owner: &UserId) -> Result<Room> {
        if room.is_closed() {
            return Err(Error::RoomClosed);
        }
        if !room.is_owner(actor) {
            return Err(Error::NotAuthorized("Only the room owner can transfer ownership".to_string()));
        }
        if !room.is_member(new_owner) {
            return Err(Error::NotMember);
        }
        if actor == new_owner {
            return Ok(room.clone());
        }

        let mut next = room.clone();
        for member in &mut next.members {
            member.role = if &member.user_id == new_owner {
                MemberRole::Owner
            } else {
                MemberRole::Participant
            };
        }
        next.owner_id = new_owner.clone();
        Ok(next)
    }
}
