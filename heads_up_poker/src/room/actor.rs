//! Room actor implementation with async message handling.
//!
//! Each room is a single task that owns its [`RoomState`] outright. All
//! mutation flows through the inbox, so there is no lock anywhere near game
//! state. Delayed transitions (deal pacing, street fast-forward, showdown
//! reveal, settlement, reconnect grace) are fire-and-forget sleep tasks that
//! post a [`TimerEvent`] back into the same inbox; the event is re-validated
//! against the current hand before it is allowed to touch anything.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, Duration};

use crate::game::constants::{
    DEAL_DELAY, FAST_FORWARD_DELAY, RECONNECT_GRACE, SETTLE_DELAY, SHOWDOWN_DELAY,
};
use crate::game::engine::{self, Followup};
use crate::game::entities::{Action, Chips, Phase, PlayerName, PoolEntry, Seat, SessionId};
use crate::game::state::RoomState;
use crate::view::{self, RoomSnapshot};

use super::messages::{JoinReply, RoomMessage, RoomReply, TimerEvent};

const INBOX_CAPACITY: usize = 100;

/// Room actor handle for sending messages.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    code: String,
}

impl RoomHandle {
    pub fn new(sender: mpsc::Sender<RoomMessage>, code: String) -> Self {
        Self { sender, code }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// True once the actor has exited and drained its inbox.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, message: RoomMessage) -> Result<(), RoomGone> {
        self.sender.send(message).await.map_err(|_| RoomGone)
    }

    pub async fn join(
        &self,
        session_id: SessionId,
        name: String,
        external_key: String,
    ) -> Result<JoinReply, RoomGone> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::Join {
            session_id,
            name,
            external_key,
            response,
        })
        .await?;
        rx.await.map_err(|_| RoomGone)
    }

    pub async fn leave(&self, session_id: SessionId) -> Result<RoomReply, RoomGone> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::Leave {
            session_id,
            response,
        })
        .await?;
        rx.await.map_err(|_| RoomGone)
    }

    pub async fn take_action(
        &self,
        session_id: SessionId,
        action: Action,
    ) -> Result<RoomReply, RoomGone> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::TakeAction {
            session_id,
            action,
            response,
        })
        .await?;
        rx.await.map_err(|_| RoomGone)
    }

    pub async fn side_wager(
        &self,
        bettor_key: String,
        bettor_name: String,
        on_player: usize,
        amount: Chips,
    ) -> Result<RoomReply, RoomGone> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::SideWager {
            bettor_key,
            bettor_name,
            on_player,
            amount,
            response,
        })
        .await?;
        rx.await.map_err(|_| RoomGone)
    }

    pub async fn rematch(&self, session_id: SessionId) -> Result<RoomReply, RoomGone> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::Rematch {
            session_id,
            response,
        })
        .await?;
        rx.await.map_err(|_| RoomGone)
    }

    pub async fn snapshot(&self, session_id: SessionId) -> Result<RoomSnapshot, RoomGone> {
        let (response, rx) = oneshot::channel();
        self.send(RoomMessage::GetSnapshot {
            session_id,
            response,
        })
        .await?;
        rx.await.map_err(|_| RoomGone)
    }

    pub async fn subscribe(
        &self,
        session_id: SessionId,
        sender: mpsc::Sender<RoomSnapshot>,
    ) -> Result<(), RoomGone> {
        self.send(RoomMessage::Subscribe { session_id, sender }).await
    }

    pub async fn unsubscribe(&self, session_id: SessionId) -> Result<(), RoomGone> {
        self.send(RoomMessage::Unsubscribe { session_id }).await
    }

    pub async fn disconnect(&self, session_id: SessionId) -> Result<(), RoomGone> {
        self.send(RoomMessage::Disconnect { session_id }).await
    }

    pub async fn close(&self) -> Result<(), RoomGone> {
        self.send(RoomMessage::Close).await
    }
}

/// The room actor has exited; its handle is dead.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("room is closed")]
pub struct RoomGone;

/// Room actor owning a single heads-up table.
pub struct RoomActor {
    state: RoomState,
    inbox: mpsc::Receiver<RoomMessage>,
    /// Clone of the inbox sender, handed to timer tasks.
    self_sender: mpsc::Sender<RoomMessage>,
    subscribers: HashMap<SessionId, mpsc::Sender<RoomSnapshot>>,
    is_closed: bool,
}

impl RoomActor {
    #[must_use]
    pub fn new(code: String, buy_in: Chips) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let handle = RoomHandle::new(sender.clone(), code.clone());
        let actor = Self {
            state: RoomState::new(code, buy_in),
            inbox,
            self_sender: sender,
            subscribers: HashMap::new(),
            is_closed: false,
        };
        (actor, handle)
    }

    /// Run the room actor event loop until the room closes.
    pub async fn run(mut self) {
        log::info!("room {} open (buy-in {})", self.state.code, self.state.buy_in);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
            if self.is_closed {
                break;
            }
        }

        log::info!("room {} closed", self.state.code);
    }

    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join {
                session_id,
                name,
                external_key,
                response,
            } => {
                let reply = self.handle_join(session_id, name, external_key);
                let _ = response.send(reply);
            }

            RoomMessage::Leave {
                session_id,
                response,
            } => {
                let reply = self.handle_leave(session_id);
                let _ = response.send(reply);
            }

            RoomMessage::TakeAction {
                session_id,
                action,
                response,
            } => {
                let reply = self.handle_action(session_id, action);
                let _ = response.send(reply);
            }

            RoomMessage::SideWager {
                bettor_key,
                bettor_name,
                on_player,
                amount,
                response,
            } => {
                let reply = self.handle_side_wager(bettor_key, bettor_name, on_player, amount);
                let _ = response.send(reply);
            }

            RoomMessage::Rematch {
                session_id,
                response,
            } => {
                let reply = self.handle_rematch(session_id);
                let _ = response.send(reply);
            }

            RoomMessage::GetSnapshot {
                session_id,
                response,
            } => {
                let viewer = self.state.seat_of(session_id);
                let _ = response.send(view::snapshot(&self.state, viewer));
            }

            RoomMessage::Subscribe { session_id, sender } => {
                // Send the current state immediately so late subscribers
                // are not blank until the next broadcast.
                let viewer = self.state.seat_of(session_id);
                let _ = sender.try_send(view::snapshot(&self.state, viewer));
                self.subscribers.insert(session_id, sender);
                log::debug!("room {}: session {session_id} subscribed", self.state.code);
            }

            RoomMessage::Unsubscribe { session_id } => {
                self.subscribers.remove(&session_id);
                log::debug!("room {}: session {session_id} unsubscribed", self.state.code);
            }

            RoomMessage::Disconnect { session_id } => {
                self.handle_disconnect(session_id);
            }

            RoomMessage::Timer(event) => {
                self.handle_timer(event);
            }

            RoomMessage::Close => {
                self.is_closed = true;
            }
        }
    }

    /// Broadcast the current state, redacted per recipient, to every
    /// subscriber. Dead subscribers are dropped on the way.
    fn broadcast(&mut self) {
        let state = &self.state;
        self.subscribers.retain(|session_id, sender| {
            let viewer = state.seat_of(*session_id);
            match sender.try_send(view::snapshot(state, viewer)) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "room {}: subscriber {session_id} channel full, dropping update",
                        state.code
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    fn schedule(&self, followups: Vec<Followup>) {
        for followup in followups {
            let hand_no = self.state.hand_no;
            let (delay, event) = match followup {
                Followup::Deal => (DEAL_DELAY, TimerEvent::Deal { hand_no }),
                Followup::FastForward => (FAST_FORWARD_DELAY, TimerEvent::FastForward { hand_no }),
                Followup::Showdown => (SHOWDOWN_DELAY, TimerEvent::Showdown { hand_no }),
                Followup::Settle => (SETTLE_DELAY, TimerEvent::Settle { hand_no }),
            };
            self.schedule_timer(delay, event);
        }
    }

    fn schedule_timer(&self, delay: Duration, event: TimerEvent) {
        let sender = self.self_sender.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = sender.send(RoomMessage::Timer(event)).await;
        });
    }

    fn handle_join(
        &mut self,
        session_id: SessionId,
        name: String,
        external_key: String,
    ) -> JoinReply {
        // A matching reconnect key reclaims a disconnected seat, cards and
        // stack intact.
        if let Some(seat_idx) = self.state.seat_by_key(&external_key) {
            let seat = &mut self.state.players[seat_idx];
            if !seat.is_connected {
                seat.session = session_id;
                seat.is_connected = true;
                log::info!(
                    "room {}: {} reclaimed seat {seat_idx}",
                    self.state.code,
                    seat.name
                );
                self.state.last_action =
                    Some(format!("{} reconnected", self.state.players[seat_idx].name));
                self.broadcast();
                return JoinReply::Reclaimed { seat: seat_idx };
            }
            // Key collision with a live seat: treat as a fresh visitor.
        }

        if !self.state.is_full() {
            let seat_idx = self.state.players.len();
            self.state.players.push(Seat::new(
                session_id,
                PlayerName::new(&name),
                external_key,
                self.state.buy_in,
            ));
            log::info!(
                "room {}: {} seated at {seat_idx}",
                self.state.code,
                self.state.players[seat_idx].name
            );
            if self.state.is_full() && self.state.phase == Phase::Waiting {
                self.schedule(vec![Followup::Deal]);
            }
            self.broadcast();
            return JoinReply::Seated { seat: seat_idx };
        }

        JoinReply::Spectating
    }

    fn handle_leave(&mut self, session_id: SessionId) -> RoomReply {
        let Some(seat_idx) = self.state.seat_of(session_id) else {
            return RoomReply::NotInRoom;
        };

        if self.state.phase == Phase::Waiting && self.state.players.len() < 2 {
            // No opponent yet; free the seat entirely.
            self.state.players.remove(seat_idx);
            self.broadcast();
            return RoomReply::Applied;
        }

        // Walking out mid-hand is an immediate forfeit, no grace.
        self.state.players[seat_idx].is_connected = false;
        let outcome = engine::forfeit(&mut self.state, seat_idx);
        self.broadcast();
        if self.state.all_disconnected() {
            self.is_closed = true;
        }
        if outcome.changed {
            RoomReply::Applied
        } else {
            RoomReply::Ignored
        }
    }

    fn handle_action(&mut self, session_id: SessionId, action: Action) -> RoomReply {
        let Some(seat_idx) = self.state.seat_of(session_id) else {
            return RoomReply::NotInRoom;
        };
        let outcome = engine::apply_action(&mut self.state, seat_idx, action);
        if !outcome.changed {
            // Silent rejection: no state change, no broadcast.
            return RoomReply::Ignored;
        }
        self.broadcast();
        self.schedule(outcome.followups);
        RoomReply::Applied
    }

    fn handle_side_wager(
        &mut self,
        bettor_key: String,
        bettor_name: String,
        on_player: usize,
        amount: Chips,
    ) -> RoomReply {
        if amount == 0
            || on_player >= self.state.players.len()
            || !self.state.phase.betting_active()
        {
            return RoomReply::Ignored;
        }
        self.state.betting_pool.push(PoolEntry {
            bettor_key,
            bettor_name: PlayerName::new(&bettor_name),
            on_player,
            amount,
            at: Utc::now(),
        });
        self.broadcast();
        RoomReply::Applied
    }

    fn handle_rematch(&mut self, session_id: SessionId) -> RoomReply {
        if self.state.seat_of(session_id).is_none() {
            return RoomReply::NotInRoom;
        }
        let outcome = engine::rematch(&mut self.state);
        if !outcome.changed {
            return RoomReply::Ignored;
        }
        self.state.betting_pool.clear();
        self.broadcast();
        self.schedule(outcome.followups);
        RoomReply::Applied
    }

    fn handle_disconnect(&mut self, session_id: SessionId) {
        self.subscribers.remove(&session_id);
        let Some(seat_idx) = self.state.seat_of(session_id) else {
            return;
        };
        self.state.players[seat_idx].is_connected = false;
        log::info!(
            "room {}: {} disconnected, grace clock running",
            self.state.code,
            self.state.players[seat_idx].name
        );
        self.broadcast();
        self.schedule_timer(RECONNECT_GRACE, TimerEvent::GraceExpired { session_id });
    }

    fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Deal { hand_no }
            | TimerEvent::FastForward { hand_no }
            | TimerEvent::Showdown { hand_no }
            | TimerEvent::Settle { hand_no }
                if hand_no != self.state.hand_no =>
            {
                log::debug!(
                    "room {}: dropping stale timer {event:?} (hand is #{})",
                    self.state.code,
                    self.state.hand_no
                );
            }

            TimerEvent::Deal { .. } => {
                let outcome = engine::deal(&mut self.state);
                if outcome.changed {
                    self.broadcast();
                    self.schedule(outcome.followups);
                }
            }

            TimerEvent::FastForward { .. } => {
                let outcome = engine::advance_street(&mut self.state);
                if outcome.changed {
                    self.broadcast();
                    self.schedule(outcome.followups);
                }
            }

            TimerEvent::Showdown { .. } => {
                let outcome = engine::begin_showdown(&mut self.state);
                if outcome.changed {
                    self.broadcast();
                    self.schedule(outcome.followups);
                }
            }

            TimerEvent::Settle { .. } => {
                let outcome = engine::settle(&mut self.state);
                if outcome.changed {
                    self.broadcast();
                }
            }

            TimerEvent::GraceExpired { session_id } => {
                let Some(seat_idx) = self.state.seat_of(session_id) else {
                    return;
                };
                if self.state.players[seat_idx].is_connected {
                    // Reclaimed in time.
                    return;
                }
                log::info!(
                    "room {}: {} ran out the reconnect grace period",
                    self.state.code,
                    self.state.players[seat_idx].name
                );
                let outcome = engine::forfeit(&mut self.state, seat_idx);
                if outcome.changed {
                    self.broadcast();
                }
                if self.state.all_disconnected() {
                    self.is_closed = true;
                }
            }
        }
    }
}
