//! Hand evaluator: scores up to 7 cards into a ranked category plus an
//! ordered kicker sequence.
//!
//! The evaluator is a pure function. It is deterministic and invariant to
//! the input ordering of the cards, and always selects the best 5 cards
//! from everything available (hole cards plus revealed community cards).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::entities::{Card, Suit, Value};

/// Hand categories, low to high. Derived `Ord` follows declaration order.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "High Card",
            Self::OnePair => "One Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
            Self::RoyalFlush => "Royal Flush",
        };
        write!(f, "{repr}")
    }
}

/// The evaluated strength of a best-5-of-7 hand.
///
/// Kickers are ordered high to low and padded with zeros, so comparing two
/// strengths is category first, then the kicker arrays position by
/// position. Full equality through all positions is a tie.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandStrength {
    pub category: Category,
    pub kickers: [Value; 5],
}

impl HandStrength {
    #[must_use]
    pub fn compare(&self, other: &HandStrength) -> Ordering {
        match self.category.cmp(&other.category) {
            Ordering::Equal => self.kickers.cmp(&other.kickers),
            ord => ord,
        }
    }
}

impl fmt::Display for HandStrength {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

/// Score the best 5-card hand available from `cards` (2 to 7 cards).
#[must_use]
pub fn evaluate(cards: &[Card]) -> HandStrength {
    let mut value_counts = [0u8; 15];
    let mut suit_counts = [0u8; 4];
    let mut by_suit: [Vec<Value>; 4] = [vec![], vec![], vec![], vec![]];
    for &card in cards {
        value_counts[card.0 as usize] += 1;
        let s = suit_index(card.1);
        suit_counts[s] += 1;
        by_suit[s].push(card.0);
    }

    let flush_suit = suit_counts.iter().position(|&count| count >= 5);

    // Straight flush / royal flush first.
    if let Some(s) = flush_suit {
        let mut suited = by_suit[s].clone();
        suited.sort_unstable_by(|a, b| b.cmp(a));
        suited.dedup();
        if let Some(high) = straight_high(&suited) {
            let category = if high == 14 {
                Category::RoyalFlush
            } else {
                Category::StraightFlush
            };
            return HandStrength {
                category,
                kickers: [high, 0, 0, 0, 0],
            };
        }
    }

    if let Some((quad, kicker)) = find_quads(&value_counts) {
        return HandStrength {
            category: Category::FourOfAKind,
            kickers: [quad, kicker, 0, 0, 0],
        };
    }

    if let Some((trips, pair)) = find_full_house(&value_counts) {
        return HandStrength {
            category: Category::FullHouse,
            kickers: [trips, pair, 0, 0, 0],
        };
    }

    if let Some(s) = flush_suit {
        let mut suited = by_suit[s].clone();
        suited.sort_unstable_by(|a, b| b.cmp(a));
        let mut kickers = [0; 5];
        kickers.copy_from_slice(&suited[..5]);
        return HandStrength {
            category: Category::Flush,
            kickers,
        };
    }

    let mut distinct: Vec<Value> = (2..=14).rev().filter(|&v| value_counts[v as usize] > 0).collect();
    if let Some(high) = straight_high(&distinct) {
        return HandStrength {
            category: Category::Straight,
            kickers: [high, 0, 0, 0, 0],
        };
    }

    let (trip_values, pair_values) = classify_multiples(&value_counts);

    if let Some(&t) = trip_values.first() {
        distinct.retain(|&v| v != t);
        let mut kickers = [t, 0, 0, 0, 0];
        for (slot, &v) in kickers[1..3].iter_mut().zip(distinct.iter()) {
            *slot = v;
        }
        return HandStrength {
            category: Category::ThreeOfAKind,
            kickers,
        };
    }

    if pair_values.len() >= 2 {
        let (high, low) = (pair_values[0], pair_values[1]);
        distinct.retain(|&v| v != high && v != low);
        let mut kickers = [high, low, 0, 0, 0];
        if let Some(&v) = distinct.first() {
            kickers[2] = v;
        }
        return HandStrength {
            category: Category::TwoPair,
            kickers,
        };
    }

    if let Some(&p) = pair_values.first() {
        distinct.retain(|&v| v != p);
        let mut kickers = [p, 0, 0, 0, 0];
        for (slot, &v) in kickers[1..4].iter_mut().zip(distinct.iter()) {
            *slot = v;
        }
        return HandStrength {
            category: Category::OnePair,
            kickers,
        };
    }

    let mut kickers = [0; 5];
    for (slot, &v) in kickers.iter_mut().zip(distinct.iter()) {
        *slot = v;
    }
    HandStrength {
        category: Category::HighCard,
        kickers,
    }
}

fn suit_index(suit: Suit) -> usize {
    match suit {
        Suit::Club => 0,
        Suit::Spade => 1,
        Suit::Diamond => 2,
        Suit::Heart => 3,
    }
}

/// Find the highest straight in a descending list of distinct values,
/// falling back to an explicit wheel (A-2-3-4-5) check.
fn straight_high(distinct_desc: &[Value]) -> Option<Value> {
    let mut run = 1;
    for window in distinct_desc.windows(2) {
        if window[0] == window[1] + 1 {
            run += 1;
            if run >= 5 {
                return Some(window[1] + 4);
            }
        } else {
            run = 1;
        }
    }
    // Wheel: ace plays low.
    let has = |v: Value| distinct_desc.contains(&v);
    if has(14) && has(5) && has(4) && has(3) && has(2) {
        return Some(5);
    }
    None
}

fn find_quads(value_counts: &[u8; 15]) -> Option<(Value, Value)> {
    let quad = (2..=14).rev().find(|&v| value_counts[v as usize] == 4)?;
    let kicker = (2..=14)
        .rev()
        .find(|&v| v != quad && value_counts[v as usize] > 0)
        .unwrap_or(0);
    Some((quad, kicker))
}

fn find_full_house(value_counts: &[u8; 15]) -> Option<(Value, Value)> {
    let mut trips = (2..=14).rev().filter(|&v| value_counts[v as usize] == 3);
    let top_trips = trips.next()?;
    // A second set of trips plays as the pair; otherwise the best pair does.
    let pair = trips
        .next()
        .or_else(|| (2..=14).rev().find(|&v| value_counts[v as usize] == 2))?;
    Some((top_trips, pair))
}

/// Split counted values into trips and pairs, each descending.
fn classify_multiples(value_counts: &[u8; 15]) -> (Vec<Value>, Vec<Value>) {
    let mut trips = vec![];
    let mut pairs = vec![];
    for v in (2..=14).rev() {
        match value_counts[v as usize] {
            3 => trips.push(v),
            2 => pairs.push(v),
            _ => {}
        }
    }
    (trips, pairs)
}
