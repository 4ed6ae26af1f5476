// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Showdown Poker core types shared by the engine and its collaborators.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod message;
pub mod poker;
pub mod policy;
