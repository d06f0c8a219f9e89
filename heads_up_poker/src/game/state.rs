//! Mutable per-room state. One `RoomState` is owned by exactly one room
//! actor; nothing outside that actor ever touches it.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use super::constants::{COMMUNITY_CARDS, MAX_PLAYERS};
use super::entities::{Chips, CommunityCard, Deck, Phase, Seat, SessionId, PoolEntry};
use super::eval::HandStrength;

/// Everything a room knows. Invariants:
/// - `players.len() <= 2`
/// - at most one seat holds the turn at a time
/// - mid-hand, `pot` equals the sum of all seats' `total_bet`
/// - `community` always has exactly 5 slots, revealed or not
#[derive(Debug)]
pub struct RoomState {
    pub code: String,
    pub buy_in: Chips,
    pub phase: Phase,
    pub players: Vec<Seat>,
    /// Deck of cards. Instantiated once and reshuffled each deal.
    pub deck: Deck,
    pub community: [CommunityCard; COMMUNITY_CARDS],
    pub pot: Chips,
    pub current_bet: Chips,
    pub dealer_idx: usize,
    pub turn_idx: Option<usize>,
    /// Seat index of the winner. Stays `None` on an exact showdown tie.
    pub winner: Option<usize>,
    pub winner_hand: Option<HandStrength>,
    /// Spectator side-wager ledger. Observational only.
    pub betting_pool: Vec<PoolEntry>,
    /// Human-readable description of the most recent action.
    pub last_action: Option<String>,
    pub created_at: Instant,
    pub created_at_utc: DateTime<Utc>,
    /// Monotonic hand counter, bumped on each deal. Timer messages carry
    /// the hand they were armed for so stale ones can be dropped.
    pub hand_no: u64,
}

impl RoomState {
    #[must_use]
    pub fn new(code: String, buy_in: Chips) -> Self {
        Self {
            code,
            buy_in,
            phase: Phase::Waiting,
            players: Vec::with_capacity(MAX_PLAYERS),
            deck: Deck::default(),
            community: [CommunityCard::default(); COMMUNITY_CARDS],
            pot: 0,
            current_bet: 0,
            dealer_idx: 0,
            turn_idx: None,
            winner: None,
            winner_hand: None,
            betting_pool: Vec::new(),
            last_action: None,
            created_at: Instant::now(),
            created_at_utc: Utc::now(),
            hand_no: 0,
        }
    }

    #[must_use]
    pub fn seat_of(&self, session: SessionId) -> Option<usize> {
        self.players.iter().position(|p| p.session == session)
    }

    #[must_use]
    pub fn seat_by_key(&self, external_key: &str) -> Option<usize> {
        self.players
            .iter()
            .position(|p| p.external_key == external_key)
    }

    /// The other seat, valid once both players are present.
    #[must_use]
    pub fn opponent_of(&self, idx: usize) -> usize {
        1 - idx
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Cards visible to the evaluator: every community card the current
    /// phase has unlocked.
    #[must_use]
    pub fn revealed_community(&self) -> Vec<super::entities::Card> {
        self.community
            .iter()
            .filter(|c| c.revealed)
            .map(|c| c.card)
            .collect()
    }

    /// Pot conservation check, valid from deal until settlement pays out.
    #[must_use]
    pub fn pot_matches_bets(&self) -> bool {
        self.pot == self.players.iter().map(|p| p.total_bet).sum::<Chips>()
    }

    #[must_use]
    pub fn all_disconnected(&self) -> bool {
        !self.players.is_empty() && self.players.iter().all(|p| !p.is_connected)
    }
}
