// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Poker hand evaluator.
//!
//! The evaluator builds a rank frequency table and a ranks bitmask for each
//! suit, then picks the highest category the cards support, an ace can play
//! low for the A-2-3-4-5 straight.
//!
//! Ties within a category are decided on the defining ranks only (the quads
//! rank, the trips and pair ranks of a full house, the top card of a straight
//! and so on), remaining kickers are not compared so two hands with the same
//! category and defining ranks split the pot.
pub mod eval;
pub use eval::{HandRank, HandValue};

mod ranks;
