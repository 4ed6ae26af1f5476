// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Showdown Poker hand evaluator.
//!
//! Evaluates hands of 2 to 7 cards (hole cards plus the community cards dealt
//! so far) and returns a [HandValue] made of one of ten [HandRank] categories
//! and the rank(s) that decide ties within the category:
//!
//! ```
//! # use showdown_eval::*;
//! let cards = ["AS", "KS", "QS", "JS", "TS", "2H", "3D"]
//!     .iter()
//!     .map(|c| c.parse::<Card>().unwrap())
//!     .collect::<Vec<_>>();
//!
//! let royal = HandValue::eval(&cards);
//! assert_eq!(royal.rank(), HandRank::RoyalFlush);
//!
//! let low = HandValue::eval(&cards[5..]);
//! assert_eq!(low.rank(), HandRank::HighCard);
//! assert!(royal > low);
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
pub mod eval;
pub use eval::{HandRank, HandValue};

// Reexport cards types.
pub use showdown_cards::{Card, Deck, DeckError, Rank, Suit};
