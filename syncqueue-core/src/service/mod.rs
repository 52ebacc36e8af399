pub mod gateway;
pub mod membership;
pub mod playback;
pub mod queue;
pub mod room;

pub use gateway::{Authenticator, RoomGateway, StaticTokenAuthenticator};
pub use membership::MembershipManager;
pub use playback::PlaybackCoordinator;
pub use queue::QueueManager;
pub use room::RoomService;
