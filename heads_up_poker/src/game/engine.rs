//! Per-hand betting state machine.
//!
//! Every operation here mutates a [`RoomState`] atomically within one call:
//! balance debit, round-bet update, and pot credit always happen together.
//! Invalid actions (out of turn, wrong phase, bad amount) are silent no-ops
//! by contract: state is unchanged and the caller sends no notification.
//!
//! Operations never sleep. Where the game needs pacing (deal delay, street
//! auto-advance, showdown reveal, settlement), they return [`Followup`]
//! requests and the room actor arms the timers.

use log::debug;

use super::constants;
use super::entities::{Action, Chips, Phase};
use super::eval;
use super::state::RoomState;

/// Delayed transitions the actor schedules on the engine's behalf. Each
/// timer re-validates the room's phase (and hand number) when it fires.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Followup {
    /// Deal a fresh hand after the join/rematch pacing delay.
    Deal,
    /// Auto-advance the next street; both players are locked in all-in.
    FastForward,
    /// Evaluate hands after the post-river pause.
    Showdown,
    /// Pay out and settle after the reveal pause.
    Settle,
}

/// What applying an inbound operation did.
#[derive(Debug, Default)]
pub struct Outcome {
    /// False for silent no-ops; the actor skips the broadcast entirely.
    pub changed: bool,
    pub followups: Vec<Followup>,
}

impl Outcome {
    fn noop() -> Self {
        Self::default()
    }

    fn changed() -> Self {
        Self {
            changed: true,
            followups: Vec::new(),
        }
    }

    fn with(followup: Followup) -> Self {
        Self {
            changed: true,
            followups: vec![followup],
        }
    }
}

#[must_use]
pub fn small_blind(buy_in: Chips) -> Chips {
    (buy_in.saturating_mul(constants::SMALL_BLIND_PCT) / 100).max(1)
}

/// Deal a fresh hand. Valid only in `Waiting` with both seats filled;
/// anything else is a stale timer and a no-op.
pub fn deal(state: &mut RoomState) -> Outcome {
    if state.phase != Phase::Waiting || !state.is_full() {
        return Outcome::noop();
    }

    state.hand_no += 1;
    state.deck.shuffle();
    state.pot = 0;
    state.winner = None;
    state.winner_hand = None;

    for seat in &mut state.players {
        let hole = [state.deck.deal_card(), state.deck.deal_card()];
        seat.round_bet = 0;
        seat.total_bet = 0;
        seat.hole = Some(hole);
        seat.has_folded = false;
        seat.is_all_in = false;
        seat.has_acted = false;
        seat.hand_result = None;
    }
    for slot in &mut state.community {
        slot.card = state.deck.deal_card();
        slot.revealed = false;
    }

    let sb = small_blind(state.buy_in);
    let bb = sb * 2;
    let dealer = state.dealer_idx;
    let other = state.opponent_of(dealer);
    post_blind(state, dealer, sb);
    post_blind(state, other, bb);
    state.current_bet = bb;
    // Heads-up preflop: the dealer posts the small blind and acts first.
    state.turn_idx = Some(dealer);
    state.phase = Phase::Preflop;
    state.last_action = Some(format!(
        "hand #{} dealt, blinds {sb}/{bb}",
        state.hand_no
    ));

    debug!(
        "room {}: dealt hand #{} (blinds {sb}/{bb})",
        state.code, state.hand_no
    );

    // Tiny stacks can be all-in from the blinds alone. Nobody is left to
    // act, so run the board out on the timer cadence.
    if state.players.iter().all(|p| p.is_all_in) {
        state.turn_idx = None;
        return Outcome::with(Followup::FastForward);
    }
    Outcome::changed()
}

fn post_blind(state: &mut RoomState, idx: usize, amount: Chips) {
    let seat = &mut state.players[idx];
    let paid = amount.min(seat.balance);
    seat.balance -= paid;
    seat.round_bet += paid;
    seat.total_bet += paid;
    if seat.balance == 0 {
        seat.is_all_in = true;
    }
    state.pot += paid;
}

/// Apply a betting action for the seat at `idx`.
pub fn apply_action(state: &mut RoomState, idx: usize, action: Action) -> Outcome {
    if !state.phase.betting_active() || state.turn_idx != Some(idx) {
        return Outcome::noop();
    }
    if state.players[idx].has_folded {
        return Outcome::noop();
    }

    let outcome = match action {
        Action::Fold => fold(state, idx),
        Action::Check => check(state, idx),
        Action::Call => call(state, idx),
        Action::Raise(amount) => raise(state, idx, amount),
        Action::AllIn => all_in(state, idx),
    };

    if outcome.changed {
        debug_assert!(
            state.pot_matches_bets(),
            "pot diverged from committed bets"
        );
    }
    outcome
}

fn fold(state: &mut RoomState, idx: usize) -> Outcome {
    state.players[idx].has_folded = true;
    let opponent = state.opponent_of(idx);
    state.winner = Some(opponent);
    state.turn_idx = None;
    state.phase = Phase::Showdown;
    // Run the board out face-up for display only; no evaluation happens.
    for slot in &mut state.community {
        slot.revealed = true;
    }
    state.last_action = Some(format!("{} folds", state.players[idx].name));
    Outcome::with(Followup::Settle)
}

fn check(state: &mut RoomState, idx: usize) -> Outcome {
    if state.current_bet > state.players[idx].round_bet {
        return Outcome::noop();
    }
    state.players[idx].has_acted = true;
    state.last_action = Some(format!("{} checks", state.players[idx].name));
    after_action(state, idx)
}

fn call(state: &mut RoomState, idx: usize) -> Outcome {
    let owed = {
        let seat = &state.players[idx];
        if state.current_bet <= seat.round_bet {
            return Outcome::noop();
        }
        state.current_bet - seat.round_bet
    };
    let seat = &mut state.players[idx];
    // A short stack calls for whatever it has left and is all-in.
    let paid = owed.min(seat.balance);
    seat.balance -= paid;
    seat.round_bet += paid;
    seat.total_bet += paid;
    seat.has_acted = true;
    if seat.balance == 0 {
        seat.is_all_in = true;
    }
    state.pot += paid;
    state.last_action = Some(format!("{} calls {paid}", state.players[idx].name));
    after_action(state, idx)
}

fn raise(state: &mut RoomState, idx: usize, amount: Chips) -> Outcome {
    let cost = {
        let seat = &state.players[idx];
        if amount <= state.current_bet {
            return Outcome::noop();
        }
        let cost = amount - seat.round_bet;
        if cost > seat.balance {
            return Outcome::noop();
        }
        cost
    };
    let seat = &mut state.players[idx];
    seat.balance -= cost;
    seat.round_bet = amount;
    seat.total_bet += cost;
    seat.has_acted = true;
    if seat.balance == 0 {
        seat.is_all_in = true;
    }
    state.pot += cost;
    state.current_bet = amount;
    // A raise reopens the action.
    let opponent = state.opponent_of(idx);
    state.players[opponent].has_acted = false;
    state.last_action = Some(format!("{} raises to {amount}", state.players[idx].name));
    after_action(state, idx)
}

fn all_in(state: &mut RoomState, idx: usize) -> Outcome {
    if state.players[idx].balance == 0 {
        return Outcome::noop();
    }
    let seat = &mut state.players[idx];
    let committed = seat.balance;
    seat.round_bet += committed;
    seat.total_bet += committed;
    seat.balance = 0;
    seat.is_all_in = true;
    seat.has_acted = true;
    state.pot += committed;
    let new_bet = state.players[idx].round_bet;
    if new_bet > state.current_bet {
        state.current_bet = new_bet;
        let opponent = state.opponent_of(idx);
        state.players[opponent].has_acted = false;
    }
    state.last_action = Some(format!("{} goes all-in", state.players[idx].name));
    after_action(state, idx)
}

/// Shared epilogue for every non-fold action: either the betting round is
/// complete and the hand moves forward, or the turn passes across.
fn after_action(state: &mut RoomState, idx: usize) -> Outcome {
    if round_complete(state) {
        close_round(state)
    } else {
        state.turn_idx = Some(state.opponent_of(idx));
        Outcome::changed()
    }
}

/// A betting round closes once every non-folded player has acted (or is
/// all-in) and the round bets are level, or the short side is all-in.
fn round_complete(state: &RoomState) -> bool {
    let a = &state.players[0];
    let b = &state.players[1];
    let everyone_done = state
        .players
        .iter()
        .all(|p| p.has_folded || p.is_all_in || p.has_acted);
    if !everyone_done {
        return false;
    }
    if a.round_bet == b.round_bet {
        return true;
    }
    let short = if a.round_bet < b.round_bet { a } else { b };
    short.is_all_in
}

fn close_round(state: &mut RoomState) -> Outcome {
    for seat in &mut state.players {
        seat.round_bet = 0;
        seat.has_acted = false;
    }
    state.current_bet = 0;

    if state.phase == Phase::River {
        state.turn_idx = None;
        return Outcome::with(Followup::Showdown);
    }
    // With at most one live bettor left there is nothing to bet on the
    // remaining streets: run them out on a timer cadence instead.
    if state.players.iter().filter(|p| p.is_live()).count() <= 1 {
        state.turn_idx = None;
        return Outcome::with(Followup::FastForward);
    }

    let mut outcome = advance_street(state);
    outcome.changed = true;
    outcome
}

/// Reveal the next tranche of community cards and move to the next street.
/// Called both from normal round closure and from fast-forward timers.
pub fn advance_street(state: &mut RoomState) -> Outcome {
    let Some(next) = state.phase.next_street() else {
        return Outcome::noop();
    };
    state.phase = next;
    for slot in state.community.iter_mut().take(next.revealed_community()) {
        slot.revealed = true;
    }

    if state.players.iter().filter(|p| p.is_live()).count() <= 1 {
        state.turn_idx = None;
        let followup = if next == Phase::River {
            Followup::Showdown
        } else {
            Followup::FastForward
        };
        return Outcome::with(followup);
    }

    // Post-flop, the non-dealer acts first.
    state.turn_idx = Some(state.opponent_of(state.dealer_idx));
    Outcome::changed()
}

/// Evaluate both hands after the river. The strictly better hand wins; an
/// exact tie leaves `winner` unset.
pub fn begin_showdown(state: &mut RoomState) -> Outcome {
    if state.phase != Phase::River {
        return Outcome::noop();
    }
    for slot in &mut state.community {
        slot.revealed = true;
    }

    let board = state.revealed_community();
    for seat in &mut state.players {
        if let Some(hole) = seat.hole {
            let mut cards = board.clone();
            cards.extend_from_slice(&hole);
            seat.hand_result = Some(eval::evaluate(&cards));
        }
    }

    let (a, b) = (&state.players[0], &state.players[1]);
    state.winner = match (&a.hand_result, &b.hand_result) {
        (Some(ra), Some(rb)) => match ra.compare(rb) {
            std::cmp::Ordering::Greater => Some(0),
            std::cmp::Ordering::Less => Some(1),
            std::cmp::Ordering::Equal => None,
        },
        _ => None,
    };
    state.winner_hand = state
        .winner
        .and_then(|w| state.players[w].hand_result.clone());
    state.last_action = Some(match state.winner {
        Some(w) => format!(
            "{} wins the showdown with {}",
            state.players[w].name,
            state.winner_hand.as_ref().map(ToString::to_string).unwrap_or_default(),
        ),
        None => "showdown is an exact tie".to_string(),
    });
    state.turn_idx = None;
    state.phase = Phase::Showdown;
    Outcome::with(Followup::Settle)
}

/// Pay out the pot and settle the hand. On an exact showdown tie the pot
/// splits evenly with the odd chip going to the non-dealer.
pub fn settle(state: &mut RoomState) -> Outcome {
    if state.phase != Phase::Showdown {
        return Outcome::noop();
    }
    match state.winner {
        Some(w) => {
            state.players[w].balance += state.pot;
            state.last_action = Some(format!(
                "{} wins the pot of {}",
                state.players[w].name, state.pot
            ));
        }
        None => {
            let dealer_share = state.pot / 2;
            let dealer = state.dealer_idx;
            let other = state.opponent_of(dealer);
            state.players[dealer].balance += dealer_share;
            state.players[other].balance += state.pot - dealer_share;
            state.last_action = Some(format!("split pot of {}", state.pot));
        }
    }
    state.turn_idx = None;
    state.phase = Phase::Settled;
    Outcome::changed()
}

/// A disconnected player ran out their grace period: the hand (if any) is
/// ruled a forfeit and the opponent takes the pot.
pub fn forfeit(state: &mut RoomState, idx: usize) -> Outcome {
    if state.phase == Phase::Settled || state.players.len() < 2 {
        return Outcome::noop();
    }
    let opponent = state.opponent_of(idx);
    state.winner = Some(opponent);
    state.winner_hand = None;
    state.players[opponent].balance += state.pot;
    state.turn_idx = None;
    state.phase = Phase::Settled;
    state.last_action = Some(format!(
        "{} forfeits, {} wins",
        state.players[idx].name, state.players[opponent].name
    ));
    Outcome::changed()
}

/// Reset for a fresh hand. Valid only once the previous hand settled.
pub fn rematch(state: &mut RoomState) -> Outcome {
    if state.phase != Phase::Settled {
        return Outcome::noop();
    }
    let buy_in = state.buy_in;
    for seat in &mut state.players {
        seat.reset_for_hand(buy_in);
    }
    for slot in &mut state.community {
        *slot = Default::default();
    }
    state.pot = 0;
    state.current_bet = 0;
    state.winner = None;
    state.winner_hand = None;
    state.turn_idx = None;
    // Button swaps every hand.
    state.dealer_idx = state.opponent_of(state.dealer_idx);
    state.phase = Phase::Waiting;
    state.last_action = Some("rematch".to_string());
    Outcome::with(Followup::Deal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{PlayerName, Seat};
    use uuid::Uuid;

    fn two_player_room(buy_in: Chips) -> RoomState {
        let mut state = RoomState::new("TESTR".into(), buy_in);
        state.players.push(Seat::new(
            Uuid::new_v4(),
            PlayerName::new("alice"),
            "key-a".into(),
            buy_in,
        ));
        state.players.push(Seat::new(
            Uuid::new_v4(),
            PlayerName::new("bob"),
            "key-b".into(),
            buy_in,
        ));
        state
    }

    fn dealt_room(buy_in: Chips) -> RoomState {
        let mut state = two_player_room(buy_in);
        let outcome = deal(&mut state);
        assert!(outcome.changed);
        state
    }

    #[test]
    fn test_deal_blinds_and_turn() {
        // buy_in=100 -> sb=2, bb=4; pot=6; dealer (small blind) acts first.
        let state = dealt_room(100);
        assert_eq!(state.phase, Phase::Preflop);
        assert_eq!(state.pot, 6);
        assert_eq!(state.current_bet, 4);
        assert_eq!(state.turn_idx, Some(state.dealer_idx));
        assert_eq!(state.players[state.dealer_idx].round_bet, 2);
        assert_eq!(state.players[1 - state.dealer_idx].round_bet, 4);
        assert!(state.pot_matches_bets());
    }

    #[test]
    fn test_small_blind_floor() {
        assert_eq!(small_blind(100), 2);
        assert_eq!(small_blind(1000), 20);
        assert_eq!(small_blind(10), 1); // floor(0.2) clamped to 1
        assert_eq!(small_blind(149), 2); // floor(2.98)
    }

    #[test]
    fn test_small_blind_saturates_on_huge_buy_in() {
        // The registry caps buy-ins well below this, but the blind math
        // itself must not overflow either.
        assert_eq!(small_blind(u64::MAX), u64::MAX / 100);
    }

    #[test]
    fn test_blinds_all_in_runs_board_out() {
        // buy_in=1: both blinds put their whole stack in; nobody can act.
        let mut state = two_player_room(1);
        let outcome = deal(&mut state);
        assert!(outcome.changed);
        assert_eq!(outcome.followups, vec![Followup::FastForward]);
        assert_eq!(state.turn_idx, None);
        assert!(state.players.iter().all(|p| p.is_all_in));
        assert_eq!(state.pot, 2);

        // The fast-forward cadence walks the streets to showdown.
        assert_eq!(advance_street(&mut state).followups, vec![Followup::FastForward]);
        assert_eq!(state.phase, Phase::Flop);
        assert_eq!(advance_street(&mut state).followups, vec![Followup::FastForward]);
        assert_eq!(advance_street(&mut state).followups, vec![Followup::Showdown]);
        assert_eq!(state.phase, Phase::River);
    }

    #[test]
    fn test_deal_gives_everyone_cards() {
        let state = dealt_room(100);
        for seat in &state.players {
            assert!(seat.hole.is_some());
        }
        assert!(state.community.iter().all(|c| !c.revealed));
        assert_eq!(state.deck.remaining(), 52 - 4 - 5);
    }

    #[test]
    fn test_deal_requires_two_players() {
        let mut state = RoomState::new("TESTR".into(), 100);
        state.players.push(Seat::new(
            Uuid::new_v4(),
            PlayerName::new("solo"),
            "k".into(),
            100,
        ));
        assert!(!deal(&mut state).changed);
        assert_eq!(state.phase, Phase::Waiting);
    }

    #[test]
    fn test_out_of_turn_action_is_silent_noop() {
        let mut state = dealt_room(100);
        let not_turn = 1 - state.turn_idx.unwrap();
        let pot = state.pot;
        let outcome = apply_action(&mut state, not_turn, Action::Call);
        assert!(!outcome.changed);
        assert_eq!(state.pot, pot);
        assert_eq!(state.turn_idx, Some(1 - not_turn));
    }

    #[test]
    fn test_invalid_check_is_silent_noop() {
        // Preflop small blind faces a bigger bet; check must not slide by.
        let mut state = dealt_room(100);
        let sb = state.turn_idx.unwrap();
        let outcome = apply_action(&mut state, sb, Action::Check);
        assert!(!outcome.changed);
        assert_eq!(state.turn_idx, Some(sb));
        assert_eq!(state.phase, Phase::Preflop);
    }

    #[test]
    fn test_limp_gives_big_blind_the_option() {
        let mut state = dealt_room(100);
        let sb = state.turn_idx.unwrap();
        let bb = 1 - sb;

        let outcome = apply_action(&mut state, sb, Action::Call);
        assert!(outcome.changed);
        // Bets are level but the big blind has not acted: round stays open.
        assert_eq!(state.phase, Phase::Preflop);
        assert_eq!(state.turn_idx, Some(bb));

        let outcome = apply_action(&mut state, bb, Action::Check);
        assert!(outcome.changed);
        assert_eq!(state.phase, Phase::Flop);
        assert_eq!(state.community.iter().filter(|c| c.revealed).count(), 3);
        // Post-flop the non-dealer acts first.
        assert_eq!(state.turn_idx, Some(1 - state.dealer_idx));
        assert_eq!(state.current_bet, 0);
    }

    #[test]
    fn test_raise_reopens_action() {
        let mut state = dealt_room(100);
        let sb = state.turn_idx.unwrap();
        let bb = 1 - sb;

        assert!(apply_action(&mut state, sb, Action::Raise(12)).changed);
        assert_eq!(state.current_bet, 12);
        assert!(!state.players[bb].has_acted);
        assert_eq!(state.turn_idx, Some(bb));

        assert!(apply_action(&mut state, bb, Action::Call).changed);
        assert_eq!(state.phase, Phase::Flop);
        assert_eq!(state.pot, 24);
        assert!(state.pot_matches_bets());
    }

    #[test]
    fn test_raise_beyond_balance_is_noop() {
        let mut state = dealt_room(100);
        let sb = state.turn_idx.unwrap();
        let outcome = apply_action(&mut state, sb, Action::Raise(500));
        assert!(!outcome.changed);
        assert_eq!(state.current_bet, 4);
    }

    #[test]
    fn test_raise_not_above_current_bet_is_noop() {
        let mut state = dealt_room(100);
        let sb = state.turn_idx.unwrap();
        assert!(!apply_action(&mut state, sb, Action::Raise(4)).changed);
        assert!(!apply_action(&mut state, sb, Action::Raise(3)).changed);
    }

    #[test]
    fn test_fold_ends_hand_without_streets() {
        let mut state = dealt_room(100);
        let sb = state.turn_idx.unwrap();
        let outcome = apply_action(&mut state, sb, Action::Fold);
        assert!(outcome.changed);
        assert_eq!(outcome.followups, vec![Followup::Settle]);
        assert_eq!(state.phase, Phase::Showdown);
        assert_eq!(state.winner, Some(1 - sb));
        assert!(state.community.iter().all(|c| c.revealed));
        assert!(state.turn_idx.is_none());

        let outcome = settle(&mut state);
        assert!(outcome.changed);
        assert_eq!(state.phase, Phase::Settled);
        // Loser paid the small blind, winner recouped everything.
        assert_eq!(state.players[1 - sb].balance, 102);
        assert_eq!(state.players[sb].balance, 98);
    }

    #[test]
    fn test_double_all_in_fast_forwards() {
        let mut state = dealt_room(100);
        let sb = state.turn_idx.unwrap();
        let bb = 1 - sb;

        assert!(apply_action(&mut state, sb, Action::AllIn).changed);
        let outcome = apply_action(&mut state, bb, Action::AllIn);
        assert!(outcome.changed);
        assert_eq!(outcome.followups, vec![Followup::FastForward]);
        assert_eq!(state.phase, Phase::Preflop);
        assert!(state.turn_idx.is_none());
        assert_eq!(state.pot, 200);

        // Timers drive the rest of the board with no player input.
        let outcome = advance_street(&mut state);
        assert_eq!(state.phase, Phase::Flop);
        assert_eq!(outcome.followups, vec![Followup::FastForward]);
        let outcome = advance_street(&mut state);
        assert_eq!(state.phase, Phase::Turn);
        assert_eq!(outcome.followups, vec![Followup::FastForward]);
        let outcome = advance_street(&mut state);
        assert_eq!(state.phase, Phase::River);
        assert_eq!(outcome.followups, vec![Followup::Showdown]);

        let outcome = begin_showdown(&mut state);
        assert_eq!(outcome.followups, vec![Followup::Settle]);
        assert_eq!(state.phase, Phase::Showdown);
        for seat in &state.players {
            assert!(seat.hand_result.is_some());
        }

        assert!(settle(&mut state).changed);
        assert_eq!(state.phase, Phase::Settled);
        let total: Chips = state.players.iter().map(|p| p.balance).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn test_all_in_call_fast_forwards_with_unequal_stacks() {
        let mut state = dealt_room(100);
        let sb = state.turn_idx.unwrap();
        let bb = 1 - sb;
        state.players[sb].balance = 48; // short stack under the table max

        assert!(apply_action(&mut state, sb, Action::AllIn).changed);
        let outcome = apply_action(&mut state, bb, Action::Call);
        assert!(outcome.changed);
        assert_eq!(outcome.followups, vec![Followup::FastForward]);
        assert!(state.pot_matches_bets());
    }

    #[test]
    fn test_short_stack_call_goes_all_in() {
        let mut state = dealt_room(100);
        let sb = state.turn_idx.unwrap();
        let bb = 1 - sb;

        assert!(apply_action(&mut state, sb, Action::Raise(90)).changed);
        state.players[bb].balance = 30;
        assert!(apply_action(&mut state, bb, Action::Call).changed);
        assert!(state.players[bb].is_all_in);
        assert_eq!(state.players[bb].balance, 0);
        assert!(state.pot_matches_bets());
    }

    #[test]
    fn test_stale_timer_transitions_are_noops() {
        let mut state = dealt_room(100);
        // Room already advanced past the phase these timers expected.
        assert!(!deal(&mut state).changed);
        assert!(!begin_showdown(&mut state).changed);
        assert!(!settle(&mut state).changed);
        assert!(!rematch(&mut state).changed);
        assert_eq!(state.phase, Phase::Preflop);
    }

    #[test]
    fn test_rematch_swaps_dealer_and_resets() {
        let mut state = dealt_room(100);
        let dealer = state.dealer_idx;
        let sb = state.turn_idx.unwrap();
        apply_action(&mut state, sb, Action::Fold);
        settle(&mut state);

        let outcome = rematch(&mut state);
        assert!(outcome.changed);
        assert_eq!(outcome.followups, vec![Followup::Deal]);
        assert_eq!(state.phase, Phase::Waiting);
        assert_eq!(state.dealer_idx, 1 - dealer);
        assert_eq!(state.pot, 0);
        for seat in &state.players {
            assert_eq!(seat.balance, 100);
            assert!(seat.hole.is_none());
            assert!(!seat.has_folded);
        }
        assert!(state.community.iter().all(|c| !c.revealed));
    }

    #[test]
    fn test_forfeit_awards_pot_to_opponent() {
        let mut state = dealt_room(100);
        let idx = state.turn_idx.unwrap();
        let opponent = 1 - idx;
        let outcome = forfeit(&mut state, idx);
        assert!(outcome.changed);
        assert_eq!(state.phase, Phase::Settled);
        assert_eq!(state.winner, Some(opponent));
        let total: Chips = state.players.iter().map(|p| p.balance).sum();
        assert_eq!(total, 200);
    }

    #[test]
    fn test_tie_splits_pot_with_odd_chip_to_non_dealer() {
        let mut state = dealt_room(100);
        state.phase = Phase::Showdown;
        state.winner = None;
        state.pot = 7;
        let dealer = state.dealer_idx;
        let other = 1 - dealer;
        let (dealer_before, other_before) =
            (state.players[dealer].balance, state.players[other].balance);

        assert!(settle(&mut state).changed);
        assert_eq!(state.players[dealer].balance, dealer_before + 3);
        assert_eq!(state.players[other].balance, other_before + 4);
    }

    #[test]
    fn test_pot_conservation_through_betting() {
        let mut state = dealt_room(1000);
        let sb = state.turn_idx.unwrap();
        let bb = 1 - sb;

        apply_action(&mut state, sb, Action::Raise(60));
        assert!(state.pot_matches_bets());
        apply_action(&mut state, bb, Action::Raise(180));
        assert!(state.pot_matches_bets());
        apply_action(&mut state, sb, Action::Call);
        assert!(state.pot_matches_bets());
        assert_eq!(state.phase, Phase::Flop);
        assert_eq!(state.pot, 360);
    }
}
