// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Decision policy types.
//!
//! A policy is a pure decision function the engine calls when the turn reaches
//! a seat that is played by a [Strategy], it only sees what that seat would
//! see at the table and returns one action.
use crate::{
    message::PlayerAction,
    poker::{Card, Chips, HandValue, Street},
};

/// The seat position relative to the button and the blinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// The seat has the button.
    pub is_button: bool,
    /// The seat posted the small blind.
    pub is_small_blind: bool,
    /// The seat posted the big blind.
    pub is_big_blind: bool,
}

/// What a seat knows when it has to act.
#[derive(Debug, Clone)]
pub struct DecisionContext {
    /// The seat hole cards.
    pub hole_cards: [Card; 2],
    /// The community cards.
    pub board: Vec<Card>,
    /// The value of the hole cards with the board.
    pub hand_strength: HandValue,
    /// The chips in the pot.
    pub pot: Chips,
    /// The seat chips.
    pub stack: Chips,
    /// The current street.
    pub street: Street,
    /// The seat position.
    pub position: Position,
    /// The highest street commitment.
    pub current_bet: Chips,
    /// The seat street commitment.
    pub committed: Chips,
    /// The hand big blind.
    pub big_blind: Chips,
    /// The legal actions for this seat.
    pub legal_actions: Vec<PlayerAction>,
}

impl DecisionContext {
    /// The chips the seat has to pay to call.
    pub fn to_call(&self) -> Chips {
        (self.current_bet - self.committed).min(self.stack)
    }

    /// Checks if an action is legal for this seat.
    pub fn can(&self, action: PlayerAction) -> bool {
        self.legal_actions.contains(&action)
    }

    /// The largest raise total for this seat.
    pub fn max_raise(&self) -> Chips {
        self.stack + self.committed
    }
}

/// A Poker decision policy.
pub trait Strategy: Send + 'static {
    /// Returns an action and the raise total for raise actions.
    fn decide(&mut self, ctx: &DecisionContext) -> (PlayerAction, Chips);
}

impl<F> Strategy for F
where
    F: FnMut(&DecisionContext) -> (PlayerAction, Chips) + Send + 'static,
{
    fn decide(&mut self, ctx: &DecisionContext) -> (PlayerAction, Chips) {
        self(ctx)
    }
}

/// A passive strategy that checks when it can and calls otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOrCheck;

impl Strategy for CallOrCheck {
    fn decide(&mut self, ctx: &DecisionContext) -> (PlayerAction, Chips) {
        if ctx.can(PlayerAction::Check) {
            (PlayerAction::Check, Chips::ZERO)
        } else if ctx.can(PlayerAction::Call) {
            (PlayerAction::Call, Chips::ZERO)
        } else {
            (PlayerAction::Fold, Chips::ZERO)
        }
    }
}
