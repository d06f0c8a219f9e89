//! Room actor message types.

use tokio::sync::{mpsc, oneshot};

use crate::game::entities::{Action, Chips, SessionId};
use crate::view::RoomSnapshot;

/// Messages that can be sent to a `RoomActor`.
#[derive(Debug)]
pub enum RoomMessage {
    /// Join (or rejoin) the room. Seats the player if a seat is open,
    /// reclaims a disconnected seat on a matching reconnect key, and falls
    /// back to spectating when the table is full.
    Join {
        session_id: SessionId,
        name: String,
        external_key: String,
        response: oneshot::Sender<JoinReply>,
    },

    /// Leave on purpose. Mid-hand this forfeits.
    Leave {
        session_id: SessionId,
        response: oneshot::Sender<RoomReply>,
    },

    /// Betting action for the seat bound to this session.
    TakeAction {
        session_id: SessionId,
        action: Action,
        response: oneshot::Sender<RoomReply>,
    },

    /// Spectator side wager on one of the seated players, by seat index.
    SideWager {
        bettor_key: String,
        bettor_name: String,
        on_player: usize,
        amount: Chips,
        response: oneshot::Sender<RoomReply>,
    },

    /// Start the next hand after settlement.
    Rematch {
        session_id: SessionId,
        response: oneshot::Sender<RoomReply>,
    },

    /// One-off snapshot projected for this session.
    GetSnapshot {
        session_id: SessionId,
        response: oneshot::Sender<RoomSnapshot>,
    },

    /// Subscribe to per-recipient state snapshots.
    Subscribe {
        session_id: SessionId,
        sender: mpsc::Sender<RoomSnapshot>,
    },

    /// Unsubscribe from state snapshots.
    Unsubscribe { session_id: SessionId },

    /// The session's socket dropped; starts the reconnect grace clock for
    /// seated players.
    Disconnect { session_id: SessionId },

    /// Internal: a scheduled transition fired.
    Timer(TimerEvent),

    /// Shut the room down (registry sweep or admin).
    Close,
}

/// Delayed transitions posted back into the room's own inbox. Each carries
/// the hand number it was armed for so a stale timer cannot touch a later
/// hand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimerEvent {
    Deal { hand_no: u64 },
    FastForward { hand_no: u64 },
    Showdown { hand_no: u64 },
    Settle { hand_no: u64 },
    GraceExpired { session_id: SessionId },
}

/// Reply to a join request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinReply {
    /// Took an open seat.
    Seated { seat: usize },
    /// Reclaimed a disconnected seat via the reconnect key.
    Reclaimed { seat: usize },
    /// Table full; the session watches as a spectator.
    Spectating,
}

/// Reply to room operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoomReply {
    /// The operation changed room state.
    Applied,
    /// Silently rejected: out of turn, wrong phase, or bad amount. State is
    /// untouched and nothing was broadcast.
    Ignored,
    /// The session holds no seat in this room.
    NotInRoom,
}

impl JoinReply {
    /// Seat index, if the session ended up seated.
    pub fn seat(&self) -> Option<usize> {
        match self {
            JoinReply::Seated { seat } | JoinReply::Reclaimed { seat } => Some(*seat),
            JoinReply::Spectating => None,
        }
    }
}
