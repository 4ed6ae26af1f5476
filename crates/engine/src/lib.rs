// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Showdown Texas Hold'em round engine.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod error;
pub use error::ActionError;
pub mod games;
pub use games::GamesPool;
pub mod simulation;
pub mod table;
pub use table::{BettingState, HandState, State, Table, TableConfig, TableMessage};
