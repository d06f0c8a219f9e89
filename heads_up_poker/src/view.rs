//! Per-recipient redaction of room state.
//!
//! The actor holds one authoritative [`RoomState`]; every outbound update is
//! projected through [`snapshot`] for a specific viewer so that hidden cards
//! never cross the wire. Hole cards are only ever serialized for their owner,
//! or for everyone once the hand reaches a real showdown.

use serde::Serialize;

use crate::game::entities::{Card, Chips, Phase, PoolEntry, Seat};
use crate::game::eval::HandStrength;
use crate::game::state::RoomState;

/// A card slot as one recipient is allowed to see it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardView {
    Hidden,
    Shown(Card),
}

/// One seat, redacted for the recipient.
#[derive(Clone, Debug, Serialize)]
pub struct SeatView {
    pub name: String,
    pub balance: Chips,
    pub round_bet: Chips,
    pub total_bet: Chips,
    pub is_connected: bool,
    pub has_folded: bool,
    pub is_all_in: bool,
    pub is_dealer: bool,
    pub is_turn: bool,
    /// `None` before the deal; both slots `Hidden` for everyone but the owner.
    pub hole: Option<[CardView; 2]>,
    /// Present only once the hand was evaluated at showdown.
    pub hand_result: Option<HandStrength>,
}

/// The full room as one recipient sees it.
#[derive(Clone, Debug, Serialize)]
pub struct RoomSnapshot {
    pub code: String,
    pub phase: Phase,
    pub buy_in: Chips,
    pub pot: Chips,
    pub current_bet: Chips,
    pub hand_no: u64,
    pub players: Vec<SeatView>,
    /// Always five slots; unrevealed streets stay `Hidden`.
    pub community: [CardView; 5],
    /// Seat index of the recipient, `None` for spectators.
    pub you: Option<usize>,
    /// True once hole cards are face-up for the whole room (showdown reached
    /// evaluation). A hand folded away never flips this.
    pub hands_revealed: bool,
    pub winner: Option<usize>,
    pub winner_hand: Option<HandStrength>,
    pub last_action: Option<String>,
    pub side_wagers: Vec<PoolEntry>,
}

/// Whether this seat's hole cards are face-up for the whole room. A hand
/// folded (or forfeited) before evaluation is never exposed.
fn hand_is_public(phase: Phase, seat: &Seat) -> bool {
    matches!(phase, Phase::Showdown | Phase::Settled) && seat.hand_result.is_some()
}

fn project_seat(state: &RoomState, idx: usize, viewer: Option<usize>) -> SeatView {
    let seat = &state.players[idx];
    let visible = viewer == Some(idx) || hand_is_public(state.phase, seat);
    let hole = seat.hole.map(|cards| {
        if visible {
            [CardView::Shown(cards[0]), CardView::Shown(cards[1])]
        } else {
            [CardView::Hidden, CardView::Hidden]
        }
    });
    SeatView {
        name: seat.name.to_string(),
        balance: seat.balance,
        round_bet: seat.round_bet,
        total_bet: seat.total_bet,
        is_connected: seat.is_connected,
        has_folded: seat.has_folded,
        is_all_in: seat.is_all_in,
        is_dealer: idx == state.dealer_idx,
        is_turn: state.turn_idx == Some(idx),
        hole,
        hand_result: if visible { seat.hand_result.clone() } else { None },
    }
}

/// Project the room for one recipient. `viewer` is the recipient's seat
/// index, or `None` for a spectator.
#[must_use]
pub fn snapshot(state: &RoomState, viewer: Option<usize>) -> RoomSnapshot {
    let mut community = [CardView::Hidden; 5];
    for (slot, out) in state.community.iter().zip(community.iter_mut()) {
        if slot.revealed {
            *out = CardView::Shown(slot.card);
        }
    }

    RoomSnapshot {
        code: state.code.clone(),
        phase: state.phase,
        buy_in: state.buy_in,
        pot: state.pot,
        current_bet: state.current_bet,
        hand_no: state.hand_no,
        players: (0..state.players.len())
            .map(|idx| project_seat(state, idx, viewer))
            .collect(),
        community,
        you: viewer,
        hands_revealed: state
            .players
            .iter()
            .any(|seat| hand_is_public(state.phase, seat)),
        winner: state.winner,
        winner_hand: state.winner_hand.clone(),
        last_action: state.last_action.clone(),
        side_wagers: state.betting_pool.clone(),
    }
}
