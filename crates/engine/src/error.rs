// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Player action errors.
use thiserror::Error;

use showdown_core::{
    message::PlayerAction,
    poker::{Chips, PlayerId},
};

/// Reasons a player action is rejected, a rejected action leaves the game
/// state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// There is no betting street open.
    #[error("No hand in progress")]
    NoHandInProgress,
    /// The player is not seated at the table.
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),
    /// Another player holds the turn.
    #[error("Player {0} doesn't have the turn")]
    NotYourTurn(PlayerId),
    /// The player has folded this hand.
    #[error("Player {0} has folded")]
    PlayerFolded(PlayerId),
    /// The player has no chips left to bet.
    #[error("Player {0} is all-in")]
    PlayerAllIn(PlayerId),
    /// A check with chips owed to the pot.
    #[error("Cannot check with {owed} chips to call")]
    CannotCheck {
        /// The chips the player has to call.
        owed: Chips,
    },
    /// A raise that doesn't exceed the current bet.
    #[error("Raise to {amount} must be above the current bet {current_bet}")]
    RaiseTooSmall {
        /// The requested street total.
        amount: Chips,
        /// The current bet.
        current_bet: Chips,
    },
    /// A raise above the player stack.
    #[error("Raise to {amount} exceeds the available {available} chips")]
    NotEnoughChips {
        /// The requested street total.
        amount: Chips,
        /// The player stack plus the street commitment.
        available: Chips,
    },
    /// An action players cannot submit.
    #[error("Invalid action {0:?}")]
    InvalidAction(PlayerAction),
    /// The table task has stopped.
    #[error("Table closed")]
    TableClosed,
}
