//! Tunables shared across the engine and room lifecycle.

use std::time::Duration;

/// Maximum number of seated players in a room. Heads-up only.
pub const MAX_PLAYERS: usize = 2;

/// Cards dealt to each player.
pub const HOLE_CARDS: usize = 2;

/// Community card slots. Always allocated up front; reveal flags control
/// visibility per phase.
pub const COMMUNITY_CARDS: usize = 5;

/// Small blind as a percentage of the buy-in: `max(1, buy_in * 2 / 100)`.
pub const SMALL_BLIND_PCT: u64 = 2;

/// Largest accepted buy-in. Keeps blind math and pot sums far away from
/// `u64` overflow.
pub const MAX_BUY_IN: u64 = 1_000_000_000;

/// Room codes use a fixed length drawn from an alphabet that excludes
/// visually ambiguous characters (I, O, 0, 1).
pub const ROOM_CODE_LENGTH: usize = 5;
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Pause between the second player joining and the deal, so clients can
/// render the seat transition.
pub const DEAL_DELAY: Duration = Duration::from_secs(2);

/// Cadence for auto-advancing phases when both players are all-in.
pub const FAST_FORWARD_DELAY: Duration = Duration::from_millis(1500);

/// Pause after the river closes before hands are evaluated.
pub const SHOWDOWN_DELAY: Duration = Duration::from_millis(1500);

/// Pause between showdown and settlement, during which hands stay revealed.
pub const SETTLE_DELAY: Duration = Duration::from_secs(3);

/// How long a disconnected player may reconnect before forfeiting.
pub const RECONNECT_GRACE: Duration = Duration::from_secs(60);

/// Rooms are destroyed this long after creation, regardless of activity.
pub const ROOM_TTL: Duration = Duration::from_secs(60 * 60);

/// How often the registry sweeps for expired and abandoned rooms.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Display names longer than this are truncated on the way in.
pub const MAX_NAME_LENGTH: usize = 24;
