// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Type definitions for messages between the engine and its collaborators.
use serde::{Deserialize, Serialize};

use crate::poker::{Card, Chips, GameId, HandValue, PlayerCards, PlayerId, Street};

/// Message sent by the engine to the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    /// A player joined the game.
    PlayerJoined {
        /// The player id.
        player_id: PlayerId,
        /// The player seat.
        seat: usize,
        /// The player chips.
        chips: Chips,
    },
    /// A player left the game.
    PlayerLeft(PlayerId),
    /// The game waits for more players before dealing a new hand.
    WaitingForPlayers {
        /// Players with chips at the table.
        seated: usize,
        /// Players needed to start a hand.
        needed: usize,
    },
    /// Tell players to prepare for a new hand.
    StartHand {
        /// The hand sequence number.
        hand: u64,
        /// The player with the button.
        button: PlayerId,
    },
    /// A game state update.
    GameUpdate(GameSnapshot),
    /// Request action from a player.
    ActionRequest(ActionRequest),
    /// The hand has ended.
    EndHand {
        /// The players that won chips in this hand.
        payoffs: Vec<HandPayoff>,
        /// The final board.
        board: Vec<Card>,
    },
}

impl Message {
    /// Returns the version of this message that can be sent to `viewer`.
    pub fn visible_to(&self, viewer: &PlayerId) -> Message {
        match self {
            Message::GameUpdate(snapshot) => Message::GameUpdate(snapshot.visible_to(viewer)),
            msg => msg.clone(),
        }
    }

    /// Returns the version of this message that can be sent to spectators.
    pub fn public(&self) -> Message {
        match self {
            Message::GameUpdate(snapshot) => Message::GameUpdate(snapshot.public()),
            msg => msg.clone(),
        }
    }
}

/// A player action intent delivered by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionIntent {
    /// The player submitting the action.
    pub player_id: PlayerId,
    /// The action.
    pub action: PlayerAction,
    /// The total street commitment for a raise, ignored for other actions.
    pub amount: Chips,
}

impl ActionIntent {
    /// Creates an intent for an action that doesn't need an amount.
    pub fn new(player_id: impl Into<PlayerId>, action: PlayerAction) -> Self {
        Self {
            player_id: player_id.into(),
            action,
            amount: Chips::ZERO,
        }
    }

    /// Creates a raise intent to the given total street commitment.
    pub fn raise(player_id: impl Into<PlayerId>, amount: Chips) -> Self {
        Self {
            player_id: player_id.into(),
            action: PlayerAction::Raise,
            amount,
        }
    }
}

/// A Player action.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// No action.
    None,
    /// Player pays small blind.
    SmallBlind,
    /// Player pays big blind.
    BigBlind,
    /// Player calls.
    Call,
    /// Player checks.
    Check,
    /// Player raises.
    Raise,
    /// Player folds.
    Fold,
}

impl PlayerAction {
    /// The action label.
    pub fn label(&self) -> &'static str {
        match self {
            PlayerAction::SmallBlind => "SB",
            PlayerAction::BigBlind => "BB",
            PlayerAction::Call => "CALL",
            PlayerAction::Check => "CHECK",
            PlayerAction::Raise => "RAISE",
            PlayerAction::Fold => "FOLD",
            PlayerAction::None => "",
        }
    }

    /// Checks if this is an action a player chose, blinds are forced.
    pub fn is_voluntary(&self) -> bool {
        matches!(
            self,
            PlayerAction::Call | PlayerAction::Check | PlayerAction::Raise | PlayerAction::Fold
        )
    }
}

/// An action request for the player holding the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// The player that should respond with an action.
    pub player_id: PlayerId,
    /// The legal actions.
    pub actions: Vec<PlayerAction>,
    /// The highest street commitment.
    pub current_bet: Chips,
    /// The chips the player has to pay to call.
    pub to_call: Chips,
    /// The hand big blind.
    pub big_blind: Chips,
}

impl ActionRequest {
    /// Check if a call action is in the request.
    pub fn can_call(&self) -> bool {
        self.check_action(PlayerAction::Call)
    }

    /// Check if a check action is in the request.
    pub fn can_check(&self) -> bool {
        self.check_action(PlayerAction::Check)
    }

    /// Check if a raise action is in the request.
    pub fn can_raise(&self) -> bool {
        self.check_action(PlayerAction::Raise)
    }

    fn check_action(&self, action: PlayerAction) -> bool {
        self.actions.iter().any(|a| a == &action)
    }
}

/// A player update details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    /// The player id.
    pub player_id: PlayerId,
    /// The player seat.
    pub seat: usize,
    /// The player chips.
    pub chips: Chips,
    /// The player current street bet.
    pub bet: Chips,
    /// The last player action.
    pub action: PlayerAction,
    /// The player cards.
    pub cards: PlayerCards,
    /// The player has the button.
    pub has_button: bool,
    /// The player is active in the hand.
    pub is_active: bool,
    /// The player is active with no chips left.
    pub is_all_in: bool,
    /// The player holds the turn.
    pub has_turn: bool,
}

/// A snapshot of the authoritative game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// The game id.
    pub game_id: GameId,
    /// The current street.
    pub street: Street,
    /// The chips in the pot including the current street bets.
    pub pot: Chips,
    /// The highest street commitment.
    pub current_bet: Chips,
    /// The hand big blind.
    pub big_blind: Chips,
    /// The community cards.
    pub board: Vec<Card>,
    /// The players in seat order.
    pub players: Vec<PlayerUpdate>,
}

impl GameSnapshot {
    /// Returns a copy of this snapshot where only the `viewer` hole cards are
    /// visible, cards revealed at showdown stay visible to everybody.
    pub fn visible_to(&self, viewer: &PlayerId) -> GameSnapshot {
        self.cover_cards(|player_id| player_id != viewer)
    }

    /// Returns a copy of this snapshot where all hole cards are covered until
    /// showdown.
    pub fn public(&self) -> GameSnapshot {
        self.cover_cards(|_| true)
    }

    fn cover_cards<F>(&self, covered: F) -> GameSnapshot
    where
        F: Fn(&PlayerId) -> bool,
    {
        let mut snapshot = self.clone();
        if snapshot.street != Street::Showdown {
            for player in &mut snapshot.players {
                if covered(&player.player_id) {
                    player.cards = player.cards.covered();
                }
            }
        }

        snapshot
    }

    /// Returns the player holding the turn.
    pub fn turn(&self) -> Option<&PlayerUpdate> {
        self.players.iter().find(|p| p.has_turn)
    }

    /// Returns a player update.
    pub fn player(&self, player_id: &PlayerId) -> Option<&PlayerUpdate> {
        self.players.iter().find(|p| &p.player_id == player_id)
    }
}

/// The chips a player won at the end of a hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandPayoff {
    /// The winning player.
    pub player_id: PlayerId,
    /// The chips won.
    pub chips: Chips,
    /// The winning hand value, none if all other players folded.
    pub hand: Option<HandValue>,
}
