//! # Heads-Up Poker
//!
//! An authoritative real-time server core for two-player Texas Hold'em
//! rooms. Clients send intents; every rule lives here, and clients only
//! ever see state that has been redacted for them.
//!
//! ## Architecture
//!
//! Each room is an actor: a single task owning its [`game::state::RoomState`]
//! outright, fed through an inbox of [`room::RoomMessage`]s. Timed
//! transitions (deal pacing, all-in fast-forward, showdown reveal,
//! settlement, reconnect grace) are sleep tasks that post timer events back
//! into the same inbox, re-validated against the live hand before they act.
//!
//! A hand moves through the phases `Waiting`, `Preflop`, `Flop`, `Turn`,
//! `River`, `Showdown`, and `Settled`; the only backwards edge is the
//! explicit rematch out of `Settled`.
//!
//! ## Core Modules
//!
//! - [`game`]: entities, the betting engine, and the 7-card hand evaluator
//! - [`room`]: room actor, message protocol, codes, and the registry
//! - [`view`]: per-recipient redaction of room state
//!
//! ## Example
//!
//! ```no_run
//! use heads_up_poker::RoomRegistry;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = RoomRegistry::new();
//! let room = registry.create_room(1_000).await?;
//! println!("share this code: {}", room.code());
//! # Ok(())
//! # }
//! ```

/// Core game logic: entities, betting engine, hand evaluator.
pub mod game;
pub use game::{
    constants,
    engine::{self, Followup},
    entities::{self, Action, Card, Chips, Phase, PlayerName, Seat, SessionId, Suit, Value},
    eval::{self, Category, HandStrength},
    state::RoomState,
};

/// Room lifecycle: actor, messages, codes, registry.
pub mod room;
pub use room::{JoinReply, RoomError, RoomGone, RoomHandle, RoomRegistry, RoomReply};

/// Per-recipient state redaction.
pub mod view;
pub use view::{CardView, RoomSnapshot, SeatView};
