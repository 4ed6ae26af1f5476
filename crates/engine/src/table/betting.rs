// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Betting street types.
use showdown_core::{
    message::PlayerAction,
    poker::{Chips, Street},
};

use crate::error::ActionError;

use super::{
    player::{Player, PlayersState},
    pot::Pot,
};

/// The state of a betting street.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BettingState {
    /// Pre-flop, blinds posted and nobody raised yet.
    #[default]
    AwaitingSmallBlind,
    /// Pre-flop, everybody called or folded and the big blind has the option.
    AwaitingBigBlindResponse,
    /// Players act in rotation until every bet is matched.
    OpenAction,
    /// The street is closed.
    StreetComplete,
}

/// The blinds posted at the start of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blinds {
    /// Index of the small blind player.
    pub small_blind: usize,
    /// Index of the big blind player.
    pub big_blind: usize,
}

/// A betting street.
#[derive(Debug, Default)]
pub struct BettingRound {
    street: Street,
    state: BettingState,
    current_bet: Chips,
    big_blind: Option<usize>,
}

impl BettingRound {
    /// Opens the pre-flop street posting the blinds.
    ///
    /// The small blind is the first active player after the button and the
    /// big blind the one after it, the first player to act is the one after
    /// the big blind that can bet, with two players that is the small blind.
    pub fn preflop(
        players: &mut PlayersState,
        pot: &mut Pot,
        big_blind: Chips,
    ) -> Option<(Self, Blinds)> {
        let button = players.button()?;
        let sb_idx = players.next_after(button, |p| p.is_active)?;
        let bb_idx = players.next_after(sb_idx, |p| p.is_active)?;

        let small_blind = big_blind / 2;
        for (idx, action, amount) in [
            (sb_idx, PlayerAction::SmallBlind, small_blind),
            (bb_idx, PlayerAction::BigBlind, big_blind),
        ] {
            if let Some(player) = players.get_mut(idx) {
                pot.add(player.commit(action, amount));
            }
        }

        let current_bet = players.iter().map(|p| p.bet).max().unwrap_or_default();
        players.set_turn(players.next_after(bb_idx, Player::can_act));

        let mut round = Self {
            street: Street::PreFlop,
            state: BettingState::AwaitingSmallBlind,
            current_bet,
            big_blind: Some(bb_idx),
        };
        round.update_state(players, PlayerAction::None);

        let blinds = Blinds {
            small_blind: sb_idx,
            big_blind: bb_idx,
        };
        Some((round, blinds))
    }

    /// Opens a post-flop street, the turn goes to the first player after the
    /// button that can bet.
    pub fn post_flop(street: Street, players: &mut PlayersState) -> Self {
        players.start_round();

        let mut round = Self {
            street,
            state: BettingState::OpenAction,
            current_bet: Chips::ZERO,
            big_blind: None,
        };
        round.update_state(players, PlayerAction::None);
        round
    }

    /// A closed street used when the hand reaches showdown.
    pub fn showdown() -> Self {
        Self {
            street: Street::Showdown,
            state: BettingState::StreetComplete,
            current_bet: Chips::ZERO,
            big_blind: None,
        }
    }

    /// The street this round bets on.
    pub fn street(&self) -> Street {
        self.street
    }

    /// The round state.
    pub fn state(&self) -> BettingState {
        self.state
    }

    /// The highest street commitment.
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    /// Checks if the street is closed.
    pub fn is_complete(&self) -> bool {
        self.state == BettingState::StreetComplete
    }

    /// The legal actions for a player.
    pub fn legal_actions(&self, player: &Player) -> Vec<PlayerAction> {
        if self.is_complete() || !player.can_act() {
            return Vec::default();
        }

        let mut actions = vec![PlayerAction::Fold];

        if player.bet == self.current_bet {
            actions.push(PlayerAction::Check);
        }

        if player.bet < self.current_bet {
            actions.push(PlayerAction::Call);
        }

        if player.chips + player.bet > self.current_bet {
            actions.push(PlayerAction::Raise);
        }

        actions
    }

    /// Validates and applies an action for the player holding the turn.
    ///
    /// On error neither the players nor the pot are changed. For raises the
    /// amount is the player total commitment for the street.
    pub fn apply(
        &mut self,
        players: &mut PlayersState,
        pot: &mut Pot,
        action: PlayerAction,
        amount: Chips,
    ) -> Result<(), ActionError> {
        if self.is_complete() {
            return Err(ActionError::NoHandInProgress);
        }

        let current_bet = self.current_bet;
        let Some(player) = players.active_player() else {
            return Err(ActionError::NoHandInProgress);
        };

        match action {
            PlayerAction::Fold | PlayerAction::Call => {}
            PlayerAction::Check if player.bet != current_bet => {
                return Err(ActionError::CannotCheck {
                    owed: (current_bet - player.bet).min(player.chips),
                });
            }
            PlayerAction::Check => {}
            PlayerAction::Raise if amount <= current_bet => {
                return Err(ActionError::RaiseTooSmall {
                    amount,
                    current_bet,
                });
            }
            PlayerAction::Raise if amount > player.chips + player.bet => {
                return Err(ActionError::NotEnoughChips {
                    amount,
                    available: player.chips + player.bet,
                });
            }
            PlayerAction::Raise => {}
            PlayerAction::None | PlayerAction::SmallBlind | PlayerAction::BigBlind => {
                return Err(ActionError::InvalidAction(action));
            }
        }

        match action {
            PlayerAction::Fold => player.fold(),
            PlayerAction::Check => player.action = PlayerAction::Check,
            PlayerAction::Call => pot.add(player.commit(PlayerAction::Call, current_bet)),
            PlayerAction::Raise => {
                pot.add(player.commit(PlayerAction::Raise, amount));
                self.current_bet = amount;
            }
            _ => {}
        }

        self.update_state(players, action);
        Ok(())
    }

    /// Folds a player that leaves the table, the turn moves on if the player
    /// was holding it.
    pub fn fold_player(&mut self, players: &mut PlayersState, idx: usize) {
        let Some(player) = players.get_mut(idx).filter(|p| p.is_active) else {
            return;
        };

        player.fold();

        if players.turn() == Some(idx) {
            self.update_state(players, PlayerAction::Fold);
        } else if self.is_round_complete(players) {
            self.close(players);
        }
    }

    /// Closes the street.
    pub fn close(&mut self, players: &mut PlayersState) {
        self.state = BettingState::StreetComplete;
        players.set_turn(None);
    }

    /// Checks if every player that can still bet has acted and matched the
    /// current bet.
    fn is_round_complete(&self, players: &PlayersState) -> bool {
        if players.count_active() < 2 {
            return true;
        }

        // A player that didn't match the current bet and is not all-in has to act.
        if players
            .iter()
            .any(|p| p.can_act() && p.bet < self.current_bet)
        {
            return false;
        }

        // Only one player has chips all others are all in.
        if players.count_can_act() < 2 {
            return true;
        }

        players
            .iter()
            .filter(|p| p.can_act())
            .all(|p| p.action.is_voluntary())
    }

    fn update_state(&mut self, players: &mut PlayersState, last_action: PlayerAction) {
        if self.is_round_complete(players) {
            self.close(players);
            return;
        }

        if last_action != PlayerAction::None {
            players.activate_next_player();
        }

        self.state = match self.state {
            BettingState::AwaitingSmallBlind | BettingState::AwaitingBigBlindResponse
                if last_action != PlayerAction::Raise =>
            {
                let bb_to_act = players.turn().is_some_and(|idx| {
                    Some(idx) == self.big_blind
                        && players
                            .get(idx)
                            .is_some_and(|p| p.action == PlayerAction::BigBlind)
                });

                if bb_to_act {
                    BettingState::AwaitingBigBlindResponse
                } else {
                    BettingState::AwaitingSmallBlind
                }
            }
            _ => BettingState::OpenAction,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showdown_core::poker::PlayerId;

    fn table(chips: &[u32]) -> (PlayersState, Pot, BettingRound) {
        let mut players = PlayersState::default();
        for (seat, c) in chips.iter().enumerate() {
            let id = PlayerId::new(format!("p{seat}"));
            players.join(Player::new(id, seat, Chips::new(*c)));
        }

        players.start_hand();

        let mut pot = Pot::default();
        let (round, _) = BettingRound::preflop(&mut players, &mut pot, Chips::new(20)).unwrap();
        (players, pot, round)
    }

    fn act(
        players: &mut PlayersState,
        pot: &mut Pot,
        round: &mut BettingRound,
        action: PlayerAction,
        amount: u32,
    ) -> Result<(), ActionError> {
        round.apply(players, pot, action, Chips::new(amount))
    }

    fn stacks(players: &PlayersState) -> Vec<u32> {
        players.iter().map(|p| p.chips.amount()).collect()
    }

    #[test]
    fn heads_up_blinds() {
        let (players, pot, round) = table(&[1_000, 1_000]);

        // The button is the big blind, the other player posts the small blind
        // and acts first.
        assert_eq!(players.button(), Some(0));
        assert_eq!(stacks(&players), vec![980, 990]);
        assert_eq!(pot.chips(), Chips::new(30));
        assert_eq!(round.current_bet(), Chips::new(20));
        assert_eq!(players.turn(), Some(1));
        assert_eq!(round.state(), BettingState::AwaitingSmallBlind);
    }

    #[test]
    fn small_blind_call_big_blind_check() {
        let (mut players, mut pot, mut round) = table(&[1_000, 1_000]);

        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        assert_eq!(pot.chips(), Chips::new(40));
        assert_eq!(players.turn(), Some(0));
        assert_eq!(round.state(), BettingState::AwaitingBigBlindResponse);

        act(&mut players, &mut pot, &mut round, PlayerAction::Check, 0).unwrap();
        assert_eq!(round.state(), BettingState::StreetComplete);
        assert_eq!(players.turn(), None);
        assert_eq!(pot.chips(), Chips::new(40));
    }

    #[test]
    fn big_blind_option_raise_reopens_action() {
        let (mut players, mut pot, mut round) = table(&[1_000, 1_000]);

        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        act(&mut players, &mut pot, &mut round, PlayerAction::Raise, 60).unwrap();
        assert_eq!(round.state(), BettingState::OpenAction);
        assert_eq!(round.current_bet(), Chips::new(60));
        assert_eq!(players.turn(), Some(1));

        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        assert!(round.is_complete());
        assert_eq!(pot.chips(), Chips::new(120));
    }

    #[test]
    fn three_players_rotation() {
        let (mut players, mut pot, mut round) = table(&[1_000, 1_000, 1_000]);

        // Button 0, small blind 1, big blind 2, the button acts first.
        assert_eq!(players.turn(), Some(0));

        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        assert_eq!(round.state(), BettingState::AwaitingSmallBlind);
        assert_eq!(players.turn(), Some(1));

        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        assert_eq!(round.state(), BettingState::AwaitingBigBlindResponse);
        assert_eq!(players.turn(), Some(2));

        act(&mut players, &mut pot, &mut round, PlayerAction::Check, 0).unwrap();
        assert!(round.is_complete());
        assert_eq!(pot.chips(), Chips::new(60));
    }

    #[test]
    fn raise_requires_other_players_to_act_again() {
        let (mut players, mut pot, mut round) = table(&[1_000, 1_000, 1_000]);

        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        act(&mut players, &mut pot, &mut round, PlayerAction::Raise, 100).unwrap();
        assert_eq!(round.state(), BettingState::OpenAction);

        // Big blind calls, the button that called before has to act again.
        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        assert!(!round.is_complete());
        assert_eq!(players.turn(), Some(0));

        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        assert!(round.is_complete());
        assert_eq!(pot.chips(), Chips::new(300));
    }

    #[test]
    fn rejected_actions_leave_state_unchanged() {
        let (mut players, mut pot, mut round) = table(&[1_000, 1_000]);

        let err = act(&mut players, &mut pot, &mut round, PlayerAction::Check, 0);
        assert_eq!(err, Err(ActionError::CannotCheck { owed: Chips::new(10) }));

        let err = act(&mut players, &mut pot, &mut round, PlayerAction::Raise, 20);
        assert!(matches!(err, Err(ActionError::RaiseTooSmall { .. })));

        let err = act(&mut players, &mut pot, &mut round, PlayerAction::Raise, 1_001);
        assert_eq!(
            err,
            Err(ActionError::NotEnoughChips {
                amount: Chips::new(1_001),
                available: Chips::new(1_000)
            })
        );

        let err = act(&mut players, &mut pot, &mut round, PlayerAction::BigBlind, 0);
        assert!(matches!(err, Err(ActionError::InvalidAction(_))));

        assert_eq!(stacks(&players), vec![980, 990]);
        assert_eq!(pot.chips(), Chips::new(30));
        assert_eq!(players.turn(), Some(1));
        assert_eq!(round.state(), BettingState::AwaitingSmallBlind);
    }

    #[test]
    fn call_capped_by_stack_is_all_in() {
        let (mut players, mut pot, mut round) = table(&[1_000, 50]);

        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        act(&mut players, &mut pot, &mut round, PlayerAction::Raise, 500).unwrap();

        // The short stack can only call with what is left.
        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        assert!(players.get(1).unwrap().is_all_in());
        assert!(round.is_complete());
        assert_eq!(pot.chips(), Chips::new(550));
        assert_eq!(stacks(&players), vec![500, 0]);
    }

    #[test]
    fn all_in_raise_is_allowed() {
        let (mut players, mut pot, mut round) = table(&[1_000, 1_000]);

        act(&mut players, &mut pot, &mut round, PlayerAction::Raise, 1_000).unwrap();
        assert!(players.get(1).unwrap().is_all_in());
        assert_eq!(players.turn(), Some(0));

        act(&mut players, &mut pot, &mut round, PlayerAction::Fold, 0).unwrap();
        assert!(round.is_complete());
        assert_eq!(players.count_active(), 1);
    }

    #[test]
    fn post_flop_street() {
        let (mut players, mut pot, mut round) = table(&[1_000, 1_000, 1_000]);
        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        act(&mut players, &mut pot, &mut round, PlayerAction::Fold, 0).unwrap();
        act(&mut players, &mut pot, &mut round, PlayerAction::Check, 0).unwrap();

        let mut round = BettingRound::post_flop(Street::Flop, &mut players);
        assert_eq!(round.state(), BettingState::OpenAction);
        assert_eq!(round.current_bet(), Chips::ZERO);

        // Small blind folded, the big blind is first after the button.
        assert_eq!(players.turn(), Some(2));
        assert!(players.iter().all(|p| p.bet.is_zero()));

        act(&mut players, &mut pot, &mut round, PlayerAction::Check, 0).unwrap();
        act(&mut players, &mut pot, &mut round, PlayerAction::Check, 0).unwrap();
        assert!(round.is_complete());
        assert_eq!(pot.chips(), Chips::new(50));
    }

    #[test]
    fn street_without_betting_players_is_complete() {
        let (mut players, mut pot, mut round) = table(&[1_000, 100]);
        act(&mut players, &mut pot, &mut round, PlayerAction::Raise, 100).unwrap();
        act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0).unwrap();
        assert!(round.is_complete());

        let round = BettingRound::post_flop(Street::Flop, &mut players);
        assert!(round.is_complete());
        assert_eq!(players.turn(), None);
    }

    #[test]
    fn leaving_player_out_of_turn() {
        let (mut players, mut pot, mut round) = table(&[1_000, 1_000, 1_000]);

        // The big blind leaves while the button holds the turn.
        round.fold_player(&mut players, 2);
        assert_eq!(players.turn(), Some(0));
        assert!(!round.is_complete());

        // The button leaves while holding the turn, one player is left.
        round.fold_player(&mut players, 0);
        assert!(round.is_complete());
        assert_eq!(players.count_active(), 1);
        assert_eq!(pot.chips(), Chips::new(30));

        let err = act(&mut players, &mut pot, &mut round, PlayerAction::Call, 0);
        assert_eq!(err, Err(ActionError::NoHandInProgress));
    }

    #[test]
    fn legal_actions() {
        let (players, _, round) = table(&[1_000, 1_000]);

        let sb = players.get(1).unwrap();
        assert_eq!(
            round.legal_actions(sb),
            vec![PlayerAction::Fold, PlayerAction::Call, PlayerAction::Raise]
        );

        let bb = players.get(0).unwrap();
        assert_eq!(
            round.legal_actions(bb),
            vec![PlayerAction::Fold, PlayerAction::Check, PlayerAction::Raise]
        );
    }
}
