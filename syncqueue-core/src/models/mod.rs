pub mod id;
pub mod member;
pub mod room;
pub mod track;

pub use id::{generate_id, RoomId, SourceId, UserId};
pub use member::{Member, MemberRole};
pub use room::{CreateRoomRequest, PlaybackState, Room, RoomStatus};
pub use track::{NowPlaying, PlayMarker, ReportedPlayback, Track};
