use chrono::{DateTime, Utc};
use rand::{seq::SliceRandom, thread_rng};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

use super::constants;

/// Opaque per-connection identity assigned by the gateway.
pub type SessionId = Uuid;

/// Type alias for chip amounts. Buy-ins, blinds, bets, and pots are all
/// whole chips.
pub type Chips = u64;

/// Placeholder for card values. Ace is high (14) except inside the wheel.
pub type Value = u8;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// A card is a tuple of a value (2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A",
            13 => "K",
            12 => "Q",
            11 => "J",
            v => &v.to_string(),
        };
        write!(f, "{value}{}", self.1)
    }
}

/// A full 52-card deck. Instantiated once per room and reshuffled each deal.
#[derive(Debug)]
pub struct Deck {
    cards: [Card; 52],
    pub deck_idx: usize,
}

impl Deck {
    pub fn deal_card(&mut self) -> Card {
        let card = self.cards[self.deck_idx];
        self.deck_idx += 1;
        card
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut thread_rng());
        self.deck_idx = 0;
    }

    pub fn remaining(&self) -> usize {
        52 - self.deck_idx
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = [Card(2, Suit::Club); 52];
        for (i, value) in (2u8..=14u8).enumerate() {
            for (j, suit) in Suit::ALL.into_iter().enumerate() {
                cards[4 * i + j] = Card(value, suit);
            }
        }
        Self { cards, deck_idx: 0 }
    }
}

/// A community card slot. The reveal flag is global: once a phase unlocks
/// the slot, every recipient sees the same card.
#[derive(Clone, Copy, Debug)]
pub struct CommunityCard {
    pub card: Card,
    pub revealed: bool,
}

impl Default for CommunityCard {
    fn default() -> Self {
        // Placeholder until the deal replaces it; never visible while
        // `revealed` is false.
        Self {
            card: Card(2, Suit::Club),
            revealed: false,
        }
    }
}

/// Betting state machine phases. Transitions are monotonic within a hand;
/// the only backwards edge is the explicit rematch reset out of `Settled`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Settled,
}

impl Phase {
    /// Number of community cards this phase has unlocked.
    #[must_use]
    pub fn revealed_community(self) -> usize {
        match self {
            Self::Waiting | Self::Preflop => 0,
            Self::Flop => 3,
            Self::Turn => 4,
            Self::River => 5,
            Self::Showdown | Self::Settled => 5,
        }
    }

    /// Whether betting actions are accepted in this phase.
    #[must_use]
    pub fn betting_active(self) -> bool {
        matches!(self, Self::Preflop | Self::Flop | Self::Turn | Self::River)
    }

    #[must_use]
    pub fn next_street(self) -> Option<Phase> {
        match self {
            Self::Preflop => Some(Self::Flop),
            Self::Flop => Some(Self::Turn),
            Self::Turn => Some(Self::River),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
            Self::Settled => "settled",
        };
        write!(f, "{repr}")
    }
}

/// A betting action submitted by a player.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise(Chips),
    AllIn,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folds",
            Self::Check => "checks",
            Self::Call => "calls",
            Self::Raise(amount) => &format!("raises to {amount}"),
            Self::AllIn => "goes all-in",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: &str) -> Self {
        let mut name: String = s
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        name.truncate(constants::MAX_NAME_LENGTH);
        Self(name)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for PlayerName {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// A seated player. Seats are reset (not destroyed) on rematch and removed
/// only when their room is destroyed.
#[derive(Clone, Debug)]
pub struct Seat {
    pub session: SessionId,
    pub name: PlayerName,
    /// Opaque settlement identifier. Carried through untouched; never
    /// validated by this engine.
    pub external_key: String,
    pub balance: Chips,
    /// Bet committed this betting round.
    pub round_bet: Chips,
    /// Bet committed this hand.
    pub total_bet: Chips,
    pub hole: Option<[Card; 2]>,
    pub has_folded: bool,
    pub is_all_in: bool,
    pub is_connected: bool,
    pub has_acted: bool,
    /// Populated only after a showdown evaluation.
    pub hand_result: Option<super::eval::HandStrength>,
}

impl Seat {
    #[must_use]
    pub fn new(session: SessionId, name: PlayerName, external_key: String, balance: Chips) -> Self {
        Self {
            session,
            name,
            external_key,
            balance,
            round_bet: 0,
            total_bet: 0,
            hole: None,
            has_folded: false,
            is_all_in: false,
            is_connected: true,
            has_acted: false,
            hand_result: None,
        }
    }

    /// Clear per-hand state ahead of a fresh deal.
    pub fn reset_for_hand(&mut self, balance: Chips) {
        self.balance = balance;
        self.round_bet = 0;
        self.total_bet = 0;
        self.hole = None;
        self.has_folded = false;
        self.is_all_in = false;
        self.has_acted = false;
        self.hand_result = None;
    }

    /// Whether this seat still has moves to make in the hand.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.has_folded && !self.is_all_in
    }
}

/// A spectator side-wager ledger entry. Purely observational bookkeeping;
/// nothing is debited from any balance.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PoolEntry {
    pub bettor_key: String,
    pub bettor_name: PlayerName,
    /// Seat index (0 or 1) the wager backs.
    pub on_player: usize,
    pub amount: Chips,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_has_52_unique_cards() {
        let mut deck = Deck::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..52 {
            seen.insert(deck.deal_card());
        }
        assert_eq!(seen.len(), 52);
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn test_deck_shuffle_resets_index() {
        let mut deck = Deck::default();
        deck.deal_card();
        deck.deal_card();
        assert_eq!(deck.deck_idx, 2);
        deck.shuffle();
        assert_eq!(deck.deck_idx, 0);
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn test_deck_values_in_range() {
        let mut deck = Deck::default();
        for _ in 0..52 {
            let card = deck.deal_card();
            assert!((2..=14).contains(&card.0));
        }
    }

    #[test]
    fn test_card_display_face_cards() {
        assert_eq!(Card(14, Suit::Spade).to_string(), "A♠");
        assert_eq!(Card(13, Suit::Heart).to_string(), "K♥");
        assert_eq!(Card(12, Suit::Diamond).to_string(), "Q♦");
        assert_eq!(Card(11, Suit::Club).to_string(), "J♣");
        assert_eq!(Card(10, Suit::Club).to_string(), "10♣");
    }

    #[test]
    fn test_phase_community_tranches() {
        assert_eq!(Phase::Preflop.revealed_community(), 0);
        assert_eq!(Phase::Flop.revealed_community(), 3);
        assert_eq!(Phase::Turn.revealed_community(), 4);
        assert_eq!(Phase::River.revealed_community(), 5);
        assert_eq!(Phase::Showdown.revealed_community(), 5);
    }

    #[test]
    fn test_phase_betting_active() {
        assert!(!Phase::Waiting.betting_active());
        assert!(Phase::Preflop.betting_active());
        assert!(Phase::River.betting_active());
        assert!(!Phase::Showdown.betting_active());
        assert!(!Phase::Settled.betting_active());
    }

    #[test]
    fn test_phase_next_street() {
        assert_eq!(Phase::Preflop.next_street(), Some(Phase::Flop));
        assert_eq!(Phase::Flop.next_street(), Some(Phase::Turn));
        assert_eq!(Phase::Turn.next_street(), Some(Phase::River));
        assert_eq!(Phase::River.next_street(), None);
        assert_eq!(Phase::Settled.next_street(), None);
    }

    #[test]
    fn test_player_name_sanitizes_whitespace() {
        let name = PlayerName::new("alice bob\tc");
        assert_eq!(name.as_str(), "alice_bob_c");
    }

    #[test]
    fn test_player_name_truncates() {
        let long = "x".repeat(100);
        let name = PlayerName::new(&long);
        assert_eq!(name.as_str().len(), constants::MAX_NAME_LENGTH);
    }

    #[test]
    fn test_seat_reset_for_hand() {
        let mut seat = Seat::new(
            Uuid::new_v4(),
            PlayerName::new("alice"),
            "key".into(),
            100,
        );
        seat.round_bet = 10;
        seat.total_bet = 30;
        seat.hole = Some([Card(14, Suit::Spade), Card(13, Suit::Spade)]);
        seat.has_folded = true;
        seat.is_all_in = true;
        seat.has_acted = true;

        seat.reset_for_hand(250);

        assert_eq!(seat.balance, 250);
        assert_eq!(seat.round_bet, 0);
        assert_eq!(seat.total_bet, 0);
        assert!(seat.hole.is_none());
        assert!(!seat.has_folded);
        assert!(!seat.is_all_in);
        assert!(!seat.has_acted);
        assert!(seat.hand_result.is_none());
    }

    #[test]
    fn test_seat_is_live() {
        let mut seat = Seat::new(Uuid::new_v4(), PlayerName::new("bob"), "k".into(), 50);
        assert!(seat.is_live());
        seat.is_all_in = true;
        assert!(!seat.is_live());
        seat.is_all_in = false;
        seat.has_folded = true;
        assert!(!seat.is_live());
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Fold.to_string(), "folds");
        assert_eq!(Action::Check.to_string(), "checks");
        assert_eq!(Action::Call.to_string(), "calls");
        assert_eq!(Action::Raise(40).to_string(), "raises to 40");
        assert_eq!(Action::AllIn.to_string(), "goes all-in");
    }

    #[test]
    fn test_action_serde_round_trip() {
        let json = serde_json::to_string(&Action::Raise(25)).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Action::Raise(25));
    }
}
