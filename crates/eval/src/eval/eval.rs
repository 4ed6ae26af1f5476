// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Hand value and category types.
use serde::{Deserialize, Serialize};
use std::fmt;

use showdown_cards::{Card, Rank};

use super::ranks::{RankCounts, highest, straight_top};

/// A poker hand category from the weakest to the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandRank {
    /// No pair.
    HighCard = 0,
    /// Two cards of the same rank.
    OnePair,
    /// Two different pairs.
    TwoPair,
    /// Three cards of the same rank.
    ThreeOfAKind,
    /// Five ranks in sequence.
    Straight,
    /// Five cards of the same suit.
    Flush,
    /// Three of a kind and a pair.
    FullHouse,
    /// Four cards of the same rank.
    FourOfAKind,
    /// A straight in one suit.
    StraightFlush,
    /// An ace high straight flush.
    RoyalFlush,
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HandRank::HighCard => "High Card",
            HandRank::OnePair => "One Pair",
            HandRank::TwoPair => "Two Pair",
            HandRank::ThreeOfAKind => "Three of a Kind",
            HandRank::Straight => "Straight",
            HandRank::Flush => "Flush",
            HandRank::FullHouse => "Full House",
            HandRank::FourOfAKind => "Four of a Kind",
            HandRank::StraightFlush => "Straight Flush",
            HandRank::RoyalFlush => "Royal Flush",
        };

        write!(f, "{label}")
    }
}

/// The value of a hand.
///
/// Values compare by category first and then by the category defining ranks,
/// see the module documentation for the reduced kicker rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandValue {
    rank: HandRank,
    primary: Rank,
    secondary: Option<Rank>,
}

impl HandValue {
    /// Evaluates a hand of 2 to 7 cards.
    ///
    /// Panics if the number of cards is out of range.
    pub fn eval(cards: &[Card]) -> Self {
        assert!((2..=7).contains(&cards.len()), "2 <= cards <= 7");

        let rc = RankCounts::new(cards);

        if let Some(flush) = rc.flush_mask() {
            match straight_top(flush) {
                Some(Rank::Ace) => return Self::new(HandRank::RoyalFlush, Rank::Ace),
                Some(top) => return Self::new(HandRank::StraightFlush, top),
                None => {}
            }
        }

        if let Some(quads) = rc.ranks_with_count(4).next() {
            return Self::new(HandRank::FourOfAKind, quads);
        }

        let trips = rc.ranks_with_count(3).collect::<Vec<_>>();
        let pairs = rc.ranks_with_count(2).collect::<Vec<_>>();

        if let Some(&top_trips) = trips.first() {
            // With two trips the lower one plays as the pair.
            let pair = match (trips.get(1), pairs.first()) {
                (Some(&t), Some(&p)) => Some(t.max(p)),
                (t, p) => t.or(p).copied(),
            };

            if let Some(pair) = pair {
                return Self::with_secondary(HandRank::FullHouse, top_trips, pair);
            }
        }

        if let Some(flush) = rc.flush_mask() {
            return Self::new(HandRank::Flush, highest(flush));
        }

        let ranks = rc.ranks_mask();
        if let Some(top) = straight_top(ranks) {
            return Self::new(HandRank::Straight, top);
        }

        if let Some(&top_trips) = trips.first() {
            return Self::new(HandRank::ThreeOfAKind, top_trips);
        }

        match pairs.as_slice() {
            [high, low, ..] => Self::with_secondary(HandRank::TwoPair, *high, *low),
            [pair] => Self::new(HandRank::OnePair, *pair),
            [] => Self::new(HandRank::HighCard, highest(ranks)),
        }
    }

    /// The hand category.
    pub fn rank(&self) -> HandRank {
        self.rank
    }

    /// The rank that decides ties within the category.
    pub fn primary(&self) -> Rank {
        self.primary
    }

    /// The second deciding rank for two pair and full house hands.
    pub fn secondary(&self) -> Option<Rank> {
        self.secondary
    }

    fn new(rank: HandRank, primary: Rank) -> Self {
        Self {
            rank,
            primary,
            secondary: None,
        }
    }

    fn with_secondary(rank: HandRank, primary: Rank, secondary: Rank) -> Self {
        Self {
            rank,
            primary,
            secondary: Some(secondary),
        }
    }
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.rank, self.secondary) {
            (HandRank::RoyalFlush, _) => write!(f, "{}", self.rank),
            (_, Some(secondary)) => write!(f, "{}, {} and {}", self.rank, self.primary, secondary),
            (_, None) => write!(f, "{}, {}", self.rank, self.primary),
        }
    }
}
