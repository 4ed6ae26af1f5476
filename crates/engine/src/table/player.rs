// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Table player types.
use showdown_core::{
    message::PlayerAction,
    poker::{Chips, PlayerCards, PlayerId},
};

/// A table player state.
#[derive(Debug)]
pub struct Player {
    /// The player id.
    pub player_id: PlayerId,
    /// The player seat number.
    pub seat: usize,
    /// This player chips.
    pub chips: Chips,
    /// The player commitment for the current street.
    pub bet: Chips,
    /// The last player action.
    pub action: PlayerAction,
    /// This player private cards.
    pub hole_cards: PlayerCards,
    /// This player is active in the hand.
    pub is_active: bool,
    /// The player has the button.
    pub has_button: bool,
}

impl Player {
    /// Creates a new player.
    pub fn new(player_id: PlayerId, seat: usize, chips: Chips) -> Self {
        Self {
            player_id,
            seat,
            chips,
            bet: Chips::ZERO,
            action: PlayerAction::None,
            hole_cards: PlayerCards::None,
            is_active: false,
            has_button: false,
        }
    }

    /// The player is in the hand with no chips left.
    pub fn is_all_in(&self) -> bool {
        self.is_active && self.chips.is_zero()
    }

    /// The player is in the hand and can still bet.
    pub fn can_act(&self) -> bool {
        self.is_active && !self.chips.is_zero()
    }

    /// Raises this player street commitment to `total`, capped by the player
    /// chips, and returns the chips paid.
    pub fn commit(&mut self, action: PlayerAction, total: Chips) -> Chips {
        let paid = (total - self.bet).min(self.chips);
        self.bet += paid;
        self.chips -= paid;
        self.action = action;
        paid
    }

    /// Sets this player in fold state.
    pub fn fold(&mut self) {
        self.is_active = false;
        self.action = PlayerAction::Fold;
        self.hole_cards = PlayerCards::None;
    }

    /// Reset state for a new hand.
    fn start_hand(&mut self) {
        self.is_active = !self.chips.is_zero();
        self.has_button = false;
        self.bet = Chips::ZERO;
        self.action = PlayerAction::None;
        self.hole_cards = PlayerCards::None;
    }

    /// Reset state for a new street.
    fn start_round(&mut self) {
        self.bet = Chips::ZERO;
        if self.is_active {
            self.action = PlayerAction::None;
        }
    }
}

/// The table players state.
///
/// Players are kept in seat order, the turn pointer is the index of the only
/// player that can act.
#[derive(Debug, Default)]
pub struct PlayersState {
    players: Vec<Player>,
    active_player: Option<usize>,
    button: Option<usize>,
}

impl PlayersState {
    /// Adds a player to the table in seat order.
    pub fn join(&mut self, player: Player) {
        let pos = self
            .players
            .iter()
            .position(|p| p.seat > player.seat)
            .unwrap_or(self.players.len());
        self.players.insert(pos, player);

        if let Some(button) = self.button.as_mut() {
            if pos <= *button {
                *button += 1;
            }
        }
    }

    /// Removes a player from the table, players must leave between hands.
    pub fn leave(&mut self, player_id: &PlayerId) -> Option<Player> {
        let pos = self.position(player_id)?;
        let player = self.players.remove(pos);

        // Move the button back so that the next hand rotates it to the seat
        // after the one that left.
        let count = self.players.len();
        self.button = match self.button {
            _ if count == 0 => None,
            Some(button) if pos < button => Some(button - 1),
            Some(button) if pos == button => Some((button + count - 1) % count),
            button => button,
        };
        self.active_player = None;

        Some(player)
    }

    /// Returns total number of players.
    pub fn count(&self) -> usize {
        self.players.len()
    }

    /// Returns the number of active players.
    pub fn count_active(&self) -> usize {
        self.players.iter().filter(|p| p.is_active).count()
    }

    /// Returns the number of active players who can still bet.
    pub fn count_can_act(&self) -> usize {
        self.players.iter().filter(|p| p.can_act()).count()
    }

    /// Returns the number of player who have chips.
    pub fn count_with_chips(&self) -> usize {
        self.players.iter().filter(|p| !p.chips.is_zero()).count()
    }

    /// Returns the index of a player.
    pub fn position(&self, player_id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.player_id == player_id)
    }

    /// Returns the player at the given index.
    pub fn get(&self, idx: usize) -> Option<&Player> {
        self.players.get(idx)
    }

    /// Returns the mutable player at the given index.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Player> {
        self.players.get_mut(idx)
    }

    /// The index of the player holding the turn.
    pub fn turn(&self) -> Option<usize> {
        self.active_player
    }

    /// Gives the turn to the player at `idx`, none closes the turn.
    pub fn set_turn(&mut self, idx: Option<usize>) {
        self.active_player = idx.filter(|&idx| idx < self.players.len());
    }

    /// Returns the player holding the turn.
    pub fn active_player(&mut self) -> Option<&mut Player> {
        self.active_player
            .and_then(|idx| self.players.get_mut(idx))
            .filter(|p| p.is_active)
    }

    /// The index of the player with the button.
    pub fn button(&self) -> Option<usize> {
        self.button
    }

    /// Returns the first player after `idx` in seat order, wrapping around,
    /// that matches the predicate.
    pub fn next_after<P>(&self, idx: usize, pred: P) -> Option<usize>
    where
        P: Fn(&Player) -> bool,
    {
        let count = self.players.len();
        (1..=count)
            .map(|offset| (idx + offset) % count)
            .find(|&pos| pred(&self.players[pos]))
    }

    /// Active players indices in seat order starting after the button.
    pub fn active_from_button(&self) -> Vec<usize> {
        let Some(button) = self.button else {
            return Vec::default();
        };

        let count = self.players.len();
        (1..=count)
            .map(|offset| (button + offset) % count)
            .filter(|&pos| self.players[pos].is_active)
            .collect()
    }

    /// Returns an iterator to all players.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Returns a mutable iterator to all players.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    /// Passes the turn to the next player who can bet.
    pub fn activate_next_player(&mut self) {
        self.active_player = self
            .active_player
            .and_then(|idx| self.next_after(idx, Player::can_act));
    }

    /// Set state for a new hand and moves the button.
    ///
    /// Returns false if there are fewer than 2 players with chips.
    pub fn start_hand(&mut self) -> bool {
        for player in &mut self.players {
            player.start_hand();
        }

        self.active_player = None;
        if self.count_active() < 2 {
            return false;
        }

        let button = match self.button {
            Some(button) if button < self.players.len() => {
                self.next_after(button, |p| p.is_active)
            }
            _ => self.players.iter().position(|p| p.is_active),
        };

        if let Some(player) = button.and_then(|idx| self.players.get_mut(idx)) {
            player.has_button = true;
        }

        self.button = button;
        true
    }

    /// Starts a new street, the first player after the button who can bet
    /// gets the turn.
    pub fn start_round(&mut self) {
        for player in &mut self.players {
            player.start_round();
        }

        self.active_player = self
            .button
            .and_then(|button| self.next_after(button, Player::can_act));
    }

    /// The hand has ended disable any active player.
    pub fn end_hand(&mut self) {
        self.active_player = None;
        for player in &mut self.players {
            player.bet = Chips::ZERO;
            player.action = PlayerAction::None;
        }
    }

    /// Removes players that run out of chips and returns their ids.
    pub fn remove_with_no_chips(&mut self) -> Vec<PlayerId> {
        let broke = self
            .players
            .iter()
            .filter(|p| p.chips.is_zero())
            .map(|p| p.player_id.clone())
            .collect::<Vec<_>>();

        for player_id in &broke {
            self.leave(player_id);
        }

        broke
    }
}
