// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Game state types.
use ahash::AHashMap;
use anyhow::{Result, bail};
use log::{debug, error, info, warn};
use rand::{SeedableRng, rngs::StdRng};
use std::fmt;

use showdown_core::{
    message::{
        ActionIntent, ActionRequest, GameSnapshot, HandPayoff, Message, PlayerAction,
        PlayerUpdate,
    },
    poker::{Card, Chips, Deck, GameId, HandValue, PlayerCards, PlayerId, Street},
    policy::{DecisionContext, Position, Strategy},
};

use crate::error::ActionError;

use super::{
    TableConfig,
    betting::{BettingRound, BettingState, Blinds},
    player::{Player, PlayersState},
    pot::Pot,
};

/// The hand state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandState {
    /// The table is waiting for players to join before starting a hand.
    WaitForPlayers,
    /// Start the hand, deal cards and collect blinds.
    StartHand,
    /// Handle preflop betting.
    PreflopBetting,
    /// Handle flop betting.
    FlopBetting,
    /// Handle turn betting.
    TurnBetting,
    /// Handle river betting.
    RiverBetting,
    /// Showdown.
    Showdown,
    /// The hand has ended.
    EndHand,
}

impl HandState {
    /// Checks if a betting street is open.
    pub fn is_betting(&self) -> bool {
        matches!(
            self,
            HandState::PreflopBetting
                | HandState::FlopBetting
                | HandState::TurnBetting
                | HandState::RiverBetting
        )
    }
}

/// The seats played by a strategy.
#[derive(Default)]
struct Strategies(AHashMap<PlayerId, Box<dyn Strategy>>);

impl fmt::Debug for Strategies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// The authoritative state of a game.
///
/// All the state changes are appended as messages to an outbox that the
/// driver empties with [State::drain_messages].
#[derive(Debug)]
pub struct State {
    game_id: GameId,
    config: TableConfig,
    hand_state: HandState,
    hand_count: u64,
    players: PlayersState,
    waiting: Vec<Player>,
    leaving: Vec<PlayerId>,
    strategies: Strategies,
    deck: Deck,
    board: Vec<Card>,
    pot: Pot,
    betting: BettingRound,
    blinds: Option<Blinds>,
    rng: StdRng,
    messages: Vec<Message>,
}

impl State {
    /// Create a new state, the deck is shuffled with the configuration seed if
    /// there is one.
    pub fn new(game_id: GameId, config: TableConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self::with_rng(game_id, config, rng)
    }

    /// Create a new state with user initialized randomness.
    pub fn with_rng(game_id: GameId, config: TableConfig, mut rng: StdRng) -> Self {
        Self {
            game_id,
            config,
            hand_state: HandState::WaitForPlayers,
            hand_count: 0,
            players: PlayersState::default(),
            waiting: Vec::default(),
            leaving: Vec::default(),
            strategies: Strategies::default(),
            deck: Deck::new_and_shuffled(&mut rng),
            board: Vec::default(),
            pot: Pot::default(),
            betting: BettingRound::default(),
            blinds: None,
            rng,
            messages: Vec::default(),
        }
    }

    /// The game id.
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// The hand state.
    pub fn hand_state(&self) -> HandState {
        self.hand_state
    }

    /// The state of the current betting street.
    pub fn betting_state(&self) -> BettingState {
        self.betting.state()
    }

    /// The number of hands dealt.
    pub fn hand_count(&self) -> u64 {
        self.hand_count
    }

    /// Checks if a hand is being played.
    pub fn is_hand_in_progress(&self) -> bool {
        self.hand_state.is_betting()
    }

    /// Number of seated players, including those waiting for the next hand.
    pub fn count_players(&self) -> usize {
        self.players.count() + self.waiting.len()
    }

    /// A player joins the game.
    ///
    /// Players that join while a hand is in progress are dealt in from the
    /// next hand.
    pub fn join(&mut self, player_id: PlayerId, chips: Chips) -> Result<()> {
        if chips.is_zero() {
            bail!("Player {player_id} has no chips");
        }

        if self
            .players
            .iter()
            .chain(self.waiting.iter())
            .any(|p| p.player_id == player_id)
        {
            bail!("Player {player_id} has already joined");
        }

        let Some(seat) = (0..self.config.seats).find(|seat| {
            self.players
                .iter()
                .chain(self.waiting.iter())
                .all(|p| p.seat != *seat)
        }) else {
            bail!("Table full");
        };

        self.messages.push(Message::PlayerJoined {
            player_id: player_id.clone(),
            seat,
            chips,
        });

        info!(
            "Player {player_id} joined game {} seat {seat} with {chips} chips",
            self.game_id
        );

        let player = Player::new(player_id, seat, chips);
        if self.is_hand_in_progress() {
            self.waiting.push(player);
        } else {
            self.players.join(player);
        }

        if self.hand_state == HandState::WaitForPlayers {
            let seated = self.players.count_with_chips();
            if seated < self.config.min_players {
                self.messages.push(Message::WaitingForPlayers {
                    seated,
                    needed: self.config.min_players,
                });
            }
        }

        Ok(())
    }

    /// A seat played by a strategy joins the game.
    pub fn join_with_strategy(
        &mut self,
        player_id: PlayerId,
        chips: Chips,
        strategy: Box<dyn Strategy>,
    ) -> Result<()> {
        self.join(player_id.clone(), chips)?;
        self.strategies.0.insert(player_id, strategy);
        Ok(())
    }

    /// A player leaves the game.
    ///
    /// A player that leaves during a hand folds and is removed from the table
    /// when the hand ends. Returns false if the player is not seated.
    pub fn leave(&mut self, player_id: &PlayerId) -> bool {
        if let Some(pos) = self.waiting.iter().position(|p| &p.player_id == player_id) {
            self.waiting.remove(pos);
            self.remove_player(player_id);
            return true;
        }

        let Some(idx) = self.players.position(player_id) else {
            return false;
        };

        if !self.is_hand_in_progress() {
            self.remove_player(player_id);
            return true;
        }

        if !self.leaving.contains(player_id) {
            info!("Player {player_id} left game {} during a hand", self.game_id);

            self.leaving.push(player_id.clone());
            self.betting.fold_player(&mut self.players, idx);
            self.action_update();
        }

        true
    }

    /// Handles an action from a player.
    ///
    /// The action is accepted only from the player holding the turn, a
    /// rejected action doesn't change the state.
    pub fn action(&mut self, intent: &ActionIntent) -> Result<(), ActionError> {
        if let Err(e) = self.check_turn(&intent.player_id) {
            warn!("Game {} rejected {:?}: {e}", self.game_id, intent);
            return Err(e);
        }

        let res = self.betting.apply(
            &mut self.players,
            &mut self.pot,
            intent.action,
            intent.amount,
        );

        if let Err(e) = res {
            warn!("Game {} rejected {:?}: {e}", self.game_id, intent);
            return Err(e);
        }

        debug!(
            "Game {} player {} {} {}",
            self.game_id,
            intent.player_id,
            intent.action.label(),
            intent.amount
        );

        self.action_update();
        Ok(())
    }

    /// Plays check if legal or fold for the player holding the turn.
    pub fn timeout_action(&mut self) {
        if !self.is_hand_in_progress() {
            return;
        }

        let Some(player) = self.players.turn().and_then(|idx| self.players.get(idx)) else {
            return;
        };

        info!(
            "Game {} player {} timed out",
            self.game_id, player.player_id
        );

        if self.apply_fallback() {
            self.action_update();
        }
    }

    /// The legal actions for a player, empty if the player doesn't hold the
    /// turn.
    pub fn legal_actions(&self, player_id: &PlayerId) -> Vec<PlayerAction> {
        match self.players.turn().and_then(|idx| self.players.get(idx)) {
            Some(player) if &player.player_id == player_id => self.betting.legal_actions(player),
            _ => Vec::default(),
        }
    }

    /// Returns the pending messages.
    pub fn drain_messages(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    /// Returns a snapshot of the game with all players cards.
    pub fn snapshot(&self) -> GameSnapshot {
        let turn = self.players.turn();
        let players = self
            .players
            .iter()
            .enumerate()
            .map(|(idx, p)| PlayerUpdate {
                player_id: p.player_id.clone(),
                seat: p.seat,
                chips: p.chips,
                bet: p.bet,
                action: p.action,
                cards: p.hole_cards,
                has_button: p.has_button,
                is_active: p.is_active,
                is_all_in: p.is_all_in(),
                has_turn: turn == Some(idx),
            })
            .collect();

        GameSnapshot {
            game_id: self.game_id,
            street: self.betting.street(),
            pot: self.pot.chips(),
            current_bet: self.betting.current_bet(),
            big_blind: self.config.big_blind,
            board: self.board.clone(),
            players,
        }
    }

    /// Starts a new hand.
    ///
    /// If there are not enough players with chips the game waits for more
    /// players to join.
    pub fn start_hand(&mut self) {
        if self.is_hand_in_progress() {
            warn!("Game {} hand {} in progress", self.game_id, self.hand_count);
            return;
        }

        self.seat_waiting();

        let with_chips = self.players.count_with_chips();
        if with_chips < self.config.min_players {
            self.enter_wait_for_players(with_chips);
            return;
        }

        self.hand_state = HandState::StartHand;
        self.deck.shuffle(&mut self.rng);

        // Hole cards for each player and the board.
        let needed = 2 * with_chips + Street::River.board_cards();
        if needed > self.deck.count() {
            error!(
                "Game {} cannot deal {needed} cards from a {} cards deck",
                self.game_id,
                self.deck.count()
            );
            self.enter_wait_for_players(with_chips);
            return;
        }

        if !self.players.start_hand() {
            self.enter_wait_for_players(with_chips);
            return;
        }

        self.hand_count += 1;
        self.board.clear();
        self.pot = Pot::default();

        for player in self.players.iter_mut().filter(|p| p.is_active) {
            match self.deck.deal(2).as_deref() {
                Ok(&[c1, c2]) => player.hole_cards = PlayerCards::Cards(c1, c2),
                Ok(cards) => error!("Game {} dealt {} hole cards", self.game_id, cards.len()),
                Err(e) => error!("Game {} {e}", self.game_id),
            }
        }

        let Some((betting, blinds)) =
            BettingRound::preflop(&mut self.players, &mut self.pot, self.config.big_blind)
        else {
            error!("Game {} cannot post blinds", self.game_id);
            self.enter_wait_for_players(with_chips);
            return;
        };

        self.betting = betting;
        self.blinds = Some(blinds);

        let button = self
            .players
            .button()
            .and_then(|idx| self.players.get(idx))
            .map(|p| p.player_id.clone())
            .unwrap_or_else(|| PlayerId::new(""));

        info!(
            "Game {} hand {} started, button {button}",
            self.game_id, self.hand_count
        );

        self.messages.push(Message::StartHand {
            hand: self.hand_count,
            button,
        });

        self.hand_state = HandState::PreflopBetting;
        self.action_update();
    }

    fn enter_wait_for_players(&mut self, seated: usize) {
        if self.hand_state != HandState::WaitForPlayers {
            info!(
                "Game {} waiting for players {seated}/{}",
                self.game_id, self.config.min_players
            );

            self.hand_state = HandState::WaitForPlayers;
            self.messages.push(Message::WaitingForPlayers {
                seated,
                needed: self.config.min_players,
            });
        }
    }

    /// Checks that a player can act.
    fn check_turn(&self, player_id: &PlayerId) -> Result<(), ActionError> {
        if !self.is_hand_in_progress() {
            return Err(ActionError::NoHandInProgress);
        }

        let Some(idx) = self.players.position(player_id) else {
            return Err(ActionError::UnknownPlayer(player_id.clone()));
        };

        match self.players.get(idx) {
            Some(player) if !player.is_active => {
                Err(ActionError::PlayerFolded(player_id.clone()))
            }
            Some(player) if player.is_all_in() => Err(ActionError::PlayerAllIn(player_id.clone())),
            _ if self.players.turn() != Some(idx) => {
                Err(ActionError::NotYourTurn(player_id.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Moves the hand forward after an action until a remote player has to act
    /// or the hand ends.
    fn action_update(&mut self) {
        loop {
            if self.players.count_active() < 2 {
                self.enter_end_hand_uncontested();
                return;
            }

            if self.betting.is_complete() {
                self.next_round();
                if !self.is_hand_in_progress() {
                    return;
                }

                continue;
            }

            self.request_action();
            if !self.play_strategy() {
                return;
            }
        }
    }

    fn next_round(&mut self) {
        match self.hand_state {
            HandState::PreflopBetting => self.enter_deal_street(Street::Flop),
            HandState::FlopBetting => self.enter_deal_street(Street::Turn),
            HandState::TurnBetting => self.enter_deal_street(Street::River),
            HandState::RiverBetting => self.enter_showdown(),
            _ => {}
        }
    }

    fn enter_deal_street(&mut self, street: Street) {
        let count = street.board_cards() - self.board.len();
        match self.deck.deal(count) {
            Ok(cards) => self.board.extend(cards),
            Err(e) => error!("Game {} {e}", self.game_id),
        }

        self.hand_state = match street {
            Street::Flop => HandState::FlopBetting,
            Street::Turn => HandState::TurnBetting,
            _ => HandState::RiverBetting,
        };

        self.betting = BettingRound::post_flop(street, &mut self.players);

        let board = self
            .board
            .iter()
            .map(Card::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        info!("Game {} {street} [{board}] pot {}", self.game_id, self.pot.chips());
    }

    fn enter_showdown(&mut self) {
        self.hand_state = HandState::Showdown;
        self.betting = BettingRound::showdown();

        // Active hands in seat order from the seat after the button.
        let hands = self
            .players
            .active_from_button()
            .into_iter()
            .filter_map(|idx| match self.players.get(idx)?.hole_cards {
                PlayerCards::Cards(c1, c2) => {
                    let mut cards = vec![c1, c2];
                    cards.extend_from_slice(&self.board);
                    Some((idx, HandValue::eval(&cards)))
                }
                _ => None,
            })
            .collect::<Vec<_>>();

        let best = hands.iter().map(|(_, hv)| *hv).max();
        let winners = hands
            .into_iter()
            .filter(|(_, hv)| Some(*hv) == best)
            .collect::<Vec<_>>();

        let shares = self.pot.split(winners.len());
        let mut payoffs = Vec::with_capacity(winners.len());
        for ((idx, hv), chips) in winners.into_iter().zip(shares) {
            if let Some(player) = self.players.get_mut(idx) {
                player.chips += chips;

                info!(
                    "Game {} player {} wins {chips} with {hv}",
                    self.game_id, player.player_id
                );

                payoffs.push(HandPayoff {
                    player_id: player.player_id.clone(),
                    chips,
                    hand: Some(hv),
                });
            }
        }

        if !self.pot.chips().is_zero() {
            error!(
                "Game {} showdown without winners, {} chips left",
                self.game_id,
                self.pot.chips()
            );
        }

        self.enter_end_hand(payoffs);
    }

    /// All other players folded, the last active player gets the pot.
    fn enter_end_hand_uncontested(&mut self) {
        let mut payoffs = Vec::default();

        let survivor = self.players.iter_mut().find(|p| p.is_active);
        if let Some(player) = survivor {
            let chips = self.pot.award();
            player.chips += chips;

            info!(
                "Game {} player {} wins {chips} uncontested",
                self.game_id, player.player_id
            );

            payoffs.push(HandPayoff {
                player_id: player.player_id.clone(),
                chips,
                hand: None,
            });
        }

        self.betting.close(&mut self.players);
        self.enter_end_hand(payoffs);
    }

    fn enter_end_hand(&mut self, payoffs: Vec<HandPayoff>) {
        self.hand_state = HandState::EndHand;

        self.push_game_update();
        self.players.end_hand();

        self.messages.push(Message::EndHand {
            payoffs,
            board: self.board.clone(),
        });

        // Remove players that left during the hand or run out of chips.
        for player_id in std::mem::take(&mut self.leaving) {
            self.remove_player(&player_id);
        }

        for player_id in self.players.remove_with_no_chips() {
            info!("Player {player_id} run out of chips");
            self.strategies.0.remove(&player_id);
            self.messages.push(Message::PlayerLeft(player_id));
        }

        self.blinds = None;
        self.seat_waiting();
    }

    fn seat_waiting(&mut self) {
        for player in std::mem::take(&mut self.waiting) {
            self.players.join(player);
        }
    }

    fn remove_player(&mut self, player_id: &PlayerId) {
        self.players.leave(player_id);
        self.strategies.0.remove(player_id);
        self.messages.push(Message::PlayerLeft(player_id.clone()));

        info!("Player {player_id} left game {}", self.game_id);
    }

    /// Request action to the active player.
    fn request_action(&mut self) {
        self.push_game_update();

        if let Some(player) = self.players.turn().and_then(|idx| self.players.get(idx)) {
            let current_bet = self.betting.current_bet();
            let msg = Message::ActionRequest(ActionRequest {
                player_id: player.player_id.clone(),
                actions: self.betting.legal_actions(player),
                current_bet,
                to_call: (current_bet - player.bet).min(player.chips),
                big_blind: self.config.big_blind,
            });

            self.messages.push(msg);
        }
    }

    /// Plays the turn if the player holding it is played by a strategy.
    ///
    /// Returns false if the turn is for a remote player.
    fn play_strategy(&mut self) -> bool {
        let Some(idx) = self.players.turn() else {
            return false;
        };

        let Some(player_id) = self.players.get(idx).map(|p| p.player_id.clone()) else {
            return false;
        };

        if !self.strategies.0.contains_key(&player_id) {
            return false;
        }

        let Some(ctx) = self.decision_context(idx) else {
            return false;
        };

        let Some(strategy) = self.strategies.0.get_mut(&player_id) else {
            return false;
        };

        let (action, amount) = strategy.decide(&ctx);
        match self
            .betting
            .apply(&mut self.players, &mut self.pot, action, amount)
        {
            Ok(()) => {
                debug!(
                    "Game {} player {player_id} {} {amount}",
                    self.game_id,
                    action.label()
                );
                true
            }
            Err(e) => {
                warn!(
                    "Game {} strategy for {player_id} played {action:?} {amount}: {e}",
                    self.game_id
                );
                self.apply_fallback()
            }
        }
    }

    /// Checks if possible or folds for the player holding the turn.
    fn apply_fallback(&mut self) -> bool {
        let Some(player) = self.players.turn().and_then(|idx| self.players.get(idx)) else {
            return false;
        };

        let action = if self.betting.legal_actions(player).contains(&PlayerAction::Check) {
            PlayerAction::Check
        } else {
            PlayerAction::Fold
        };

        let res = self
            .betting
            .apply(&mut self.players, &mut self.pot, action, Chips::ZERO);
        if let Err(e) = res {
            error!("Game {} fallback {action:?} failed: {e}", self.game_id);
            return false;
        }

        true
    }

    fn decision_context(&self, idx: usize) -> Option<DecisionContext> {
        let player = self.players.get(idx)?;
        let PlayerCards::Cards(c1, c2) = player.hole_cards else {
            return None;
        };

        let mut cards = vec![c1, c2];
        cards.extend_from_slice(&self.board);

        let position = Position {
            is_button: player.has_button,
            is_small_blind: self.blinds.is_some_and(|b| b.small_blind == idx),
            is_big_blind: self.blinds.is_some_and(|b| b.big_blind == idx),
        };

        Some(DecisionContext {
            hole_cards: [c1, c2],
            board: self.board.clone(),
            hand_strength: HandValue::eval(&cards),
            pot: self.pot.chips(),
            stack: player.chips,
            street: self.betting.street(),
            position,
            current_bet: self.betting.current_bet(),
            committed: player.bet,
            big_blind: self.config.big_blind,
            legal_actions: self.betting.legal_actions(player),
        })
    }

    fn push_game_update(&mut self) {
        let snapshot = self.snapshot();
        self.messages.push(Message::GameUpdate(snapshot));
    }
}
