//! Room lifecycle: codes, actor, messages, and the shared registry.

pub mod actor;
pub mod code;
pub mod messages;
pub mod registry;

pub use actor::{RoomActor, RoomGone, RoomHandle};
pub use messages::{JoinReply, RoomMessage, RoomReply, TimerEvent};
pub use registry::{RoomError, RoomRegistry};
