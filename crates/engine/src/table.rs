// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Table types.
use ahash::AHashMap;
use anyhow::{Result, bail};
use log::{error, info};
use std::time::{Duration, Instant};
use tokio::{
    sync::{mpsc, oneshot},
    time,
};

use showdown_core::{
    message::{ActionIntent, GameSnapshot, Message},
    poker::{Chips, GameId, PlayerId},
    policy::Strategy,
};

use crate::error::ActionError;

mod betting;
mod player;
mod pot;
mod state;

pub use betting::BettingState;
pub use state::{HandState, State};

/// The table configuration.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Number of seats.
    pub seats: usize,
    /// Players with chips needed to deal a hand.
    pub min_players: usize,
    /// The big blind, the small blind is half of it.
    pub big_blind: Chips,
    /// Time between the end of a hand and the start of the next one.
    pub new_hand_delay: Duration,
    /// Seed for shuffling the deck, if none the deck is shuffled with OS
    /// randomness.
    pub seed: Option<u64>,
}

impl TableConfig {
    /// The maximum number of seats at a table.
    pub const MAX_SEATS: usize = 8;

    /// Checks the configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(2..=Self::MAX_SEATS).contains(&self.seats) {
            bail!("Seats must be between 2 and {}", Self::MAX_SEATS);
        }

        if self.min_players < 2 || self.min_players > self.seats {
            bail!("Min players must be between 2 and {}", self.seats);
        }

        if self.big_blind < Chips::new(2) {
            bail!("Big blind must be at least 2 chips");
        }

        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            seats: 6,
            min_players: 2,
            big_blind: Chips::new(20),
            new_hand_delay: Duration::from_secs(3),
            seed: None,
        }
    }
}

/// Table state shared by all players who joined the table.
#[derive(Debug)]
pub struct Table {
    /// This table game id.
    game_id: GameId,
    /// Channel for sending commands.
    commands_tx: mpsc::Sender<TableCommand>,
}

/// A message sent to player connections.
#[derive(Debug)]
pub enum TableMessage {
    /// Sends a message to a client.
    Send(Message),
    /// The receiver left the table.
    PlayerLeft,
    /// Close a client connection.
    Close,
}

/// How a seat is played.
enum Seat {
    /// A remote player that gets messages on a channel.
    Remote(mpsc::Sender<TableMessage>),
    /// A seat played by a strategy.
    Strategy(Box<dyn Strategy>),
}

/// Command for the table task.
enum TableCommand {
    /// Join this table.
    Join {
        player_id: PlayerId,
        chips: Chips,
        seat: Seat,
        resp_tx: oneshot::Sender<Result<()>>,
    },
    /// Leave this table.
    Leave(PlayerId),
    /// Handle a player action.
    Action {
        intent: ActionIntent,
        resp_tx: oneshot::Sender<Result<(), ActionError>>,
    },
    /// The player holding the turn timed out.
    Timeout,
    /// Start a new hand.
    StartHand,
    /// Get a game snapshot.
    Snapshot(oneshot::Sender<GameSnapshot>),
    /// Watch this table.
    Watch(mpsc::Sender<TableMessage>),
    /// Stop the table task.
    Close,
}

impl Table {
    /// Creates a new table that manages players and game state.
    ///
    /// Must be called from a tokio runtime.
    pub fn new(config: TableConfig) -> Result<Self> {
        config.validate()?;

        let game_id = GameId::new_id();
        let (commands_tx, commands_rx) = mpsc::channel(128);

        let mut task = TableTask {
            new_hand_delay: config.new_hand_delay,
            state: State::new(game_id, config),
            connections: AHashMap::default(),
            watchers: Vec::default(),
            next_hand_at: None,
            commands_rx,
        };

        tokio::spawn(async move {
            task.run().await;
            info!("Table task for game {game_id} stopped");
        });

        Ok(Self {
            game_id,
            commands_tx,
        })
    }

    /// This table game id.
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// A remote player joins this table.
    ///
    /// Returns error if the table is full or the player has already joined.
    pub async fn join(
        &self,
        player_id: &PlayerId,
        chips: Chips,
        table_tx: mpsc::Sender<TableMessage>,
    ) -> Result<()> {
        self.join_seat(player_id, chips, Seat::Remote(table_tx))
            .await
    }

    /// A seat played by a strategy joins this table.
    pub async fn join_with_strategy(
        &self,
        player_id: &PlayerId,
        chips: Chips,
        strategy: Box<dyn Strategy>,
    ) -> Result<()> {
        self.join_seat(player_id, chips, Seat::Strategy(strategy))
            .await
    }

    async fn join_seat(&self, player_id: &PlayerId, chips: Chips, seat: Seat) -> Result<()> {
        let (resp_tx, resp_rx) = oneshot::channel();

        let cmd = TableCommand::Join {
            player_id: player_id.clone(),
            chips,
            seat,
            resp_tx,
        };

        if self.commands_tx.send(cmd).await.is_err() {
            bail!("Table closed");
        }

        resp_rx.await?
    }

    /// A player leaves the table.
    pub async fn leave(&self, player_id: &PlayerId) {
        let _ = self
            .commands_tx
            .send(TableCommand::Leave(player_id.clone()))
            .await;
    }

    /// Handle an action from a player.
    pub async fn action(&self, intent: ActionIntent) -> Result<(), ActionError> {
        let (resp_tx, resp_rx) = oneshot::channel();

        self.commands_tx
            .send(TableCommand::Action { intent, resp_tx })
            .await
            .map_err(|_| ActionError::TableClosed)?;

        resp_rx.await.map_err(|_| ActionError::TableClosed)?
    }

    /// Plays check or fold for the player holding the turn.
    pub async fn timeout(&self) {
        let _ = self.commands_tx.send(TableCommand::Timeout).await;
    }

    /// Starts a new hand if there is no hand in progress.
    pub async fn start_hand(&self) {
        let _ = self.commands_tx.send(TableCommand::StartHand).await;
    }

    /// Returns a snapshot of the game with all players cards.
    pub async fn snapshot(&self) -> Result<GameSnapshot> {
        let (resp_tx, resp_rx) = oneshot::channel();

        if self
            .commands_tx
            .send(TableCommand::Snapshot(resp_tx))
            .await
            .is_err()
        {
            bail!("Table closed");
        }

        Ok(resp_rx.await?)
    }

    /// Receives the table messages as a spectator.
    pub async fn watch(&self, table_tx: mpsc::Sender<TableMessage>) {
        let _ = self.commands_tx.send(TableCommand::Watch(table_tx)).await;
    }

    /// Stops the table task and closes all connections.
    pub async fn close(&self) {
        let _ = self.commands_tx.send(TableCommand::Close).await;
    }
}

struct TableTask {
    /// The game state.
    state: State,
    /// Delay before starting a new hand.
    new_hand_delay: Duration,
    /// Remote players connections.
    connections: AHashMap<PlayerId, mpsc::Sender<TableMessage>>,
    /// Spectators connections.
    watchers: Vec<mpsc::Sender<TableMessage>>,
    /// When the next hand starts.
    next_hand_at: Option<Instant>,
    /// Channel for receiving table commands.
    commands_rx: mpsc::Receiver<TableCommand>,
}

impl TableTask {
    const TICK: Duration = Duration::from_millis(100);

    async fn run(&mut self) {
        let mut ticks = time::interval(Self::TICK);

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    self.tick();
                }
                res = self.commands_rx.recv() => match res {
                    Some(TableCommand::Close) | None => break,
                    Some(cmd) => self.command(cmd).await,
                },
            }

            self.dispatch().await;
        }

        for tx in self.connections.values().chain(self.watchers.iter()) {
            let _ = tx.send(TableMessage::Close).await;
        }
    }

    fn tick(&mut self) {
        if self.state.is_hand_in_progress() {
            self.next_hand_at = None;
            return;
        }

        match self.next_hand_at {
            None => self.next_hand_at = Some(Instant::now() + self.new_hand_delay),
            Some(at) if Instant::now() >= at => {
                self.next_hand_at = None;
                self.state.start_hand();
            }
            Some(_) => {}
        }
    }

    async fn command(&mut self, cmd: TableCommand) {
        match cmd {
            TableCommand::Join {
                player_id,
                chips,
                seat,
                resp_tx,
            } => {
                let res = match seat {
                    Seat::Remote(table_tx) => {
                        let res = self.state.join(player_id.clone(), chips);
                        if res.is_ok() {
                            // Tell the new player who is at the table.
                            let snapshot = self.state.snapshot().visible_to(&player_id);
                            let msg = TableMessage::Send(Message::GameUpdate(snapshot));
                            let _ = table_tx.send(msg).await;

                            self.connections.insert(player_id, table_tx);
                        }
                        res
                    }
                    Seat::Strategy(strategy) => {
                        self.state.join_with_strategy(player_id, chips, strategy)
                    }
                };

                let _ = resp_tx.send(res);
            }
            TableCommand::Leave(player_id) => {
                if let Some(table_tx) = self.connections.remove(&player_id) {
                    let _ = table_tx.send(TableMessage::PlayerLeft).await;
                }

                self.state.leave(&player_id);
            }
            TableCommand::Action { intent, resp_tx } => {
                let res = self.state.action(&intent);
                let _ = resp_tx.send(res);
            }
            TableCommand::Timeout => self.state.timeout_action(),
            TableCommand::StartHand => self.state.start_hand(),
            TableCommand::Snapshot(resp_tx) => {
                let _ = resp_tx.send(self.state.snapshot());
            }
            TableCommand::Watch(table_tx) => self.watchers.push(table_tx),
            TableCommand::Close => {}
        }
    }

    /// Sends the state messages to connections, players whose connection
    /// dropped leave the table.
    async fn dispatch(&mut self) {
        loop {
            let messages = self.state.drain_messages();
            if messages.is_empty() {
                break;
            }

            let mut disconnected = Vec::new();
            for msg in messages {
                for (player_id, table_tx) in &self.connections {
                    let msg = TableMessage::Send(msg.visible_to(player_id));
                    if table_tx.send(msg).await.is_err() {
                        disconnected.push(player_id.clone());
                    }
                }

                for table_tx in &self.watchers {
                    let _ = table_tx.send(TableMessage::Send(msg.public())).await;
                }

                // Players that left the table don't get messages anymore.
                if let Message::PlayerLeft(player_id) = &msg {
                    if let Some(table_tx) = self.connections.remove(player_id) {
                        let _ = table_tx.send(TableMessage::PlayerLeft).await;
                    }
                }
            }

            self.watchers.retain(|tx| !tx.is_closed());

            for player_id in disconnected {
                if self.connections.remove(&player_id).is_some() {
                    error!(
                        "Player {player_id} connection to game {} dropped",
                        self.state.game_id()
                    );
                    self.state.leave(&player_id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showdown_core::{message::PlayerAction, policy::CallOrCheck};

    fn config() -> TableConfig {
        TableConfig {
            new_hand_delay: Duration::from_secs(3600),
            seed: Some(11),
            ..TableConfig::default()
        }
    }

    async fn recv(rx: &mut mpsc::Receiver<TableMessage>) -> TableMessage {
        time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    async fn next_message<F>(rx: &mut mpsc::Receiver<TableMessage>, f: F) -> Message
    where
        F: Fn(&Message) -> bool,
    {
        loop {
            if let TableMessage::Send(msg) = recv(rx).await {
                if f(&msg) {
                    return msg;
                }
            }
        }
    }

    async fn next_request(rx: &mut mpsc::Receiver<TableMessage>) -> PlayerId {
        let msg = next_message(rx, |msg| matches!(msg, Message::ActionRequest(_))).await;
        match msg {
            Message::ActionRequest(req) => req.player_id,
            _ => unreachable!(),
        }
    }

    #[test]
    fn config_validation() {
        assert!(TableConfig::default().validate().is_ok());

        let config = TableConfig {
            seats: 9,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TableConfig {
            seats: 3,
            min_players: 4,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TableConfig {
            big_blind: Chips::new(1),
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn table_serializes_actions() {
        let table = Table::new(config()).unwrap();
        let alice = PlayerId::new("alice");
        let bob = PlayerId::new("bob");

        let (tx1, mut rx1) = mpsc::channel(128);
        let (tx2, mut rx2) = mpsc::channel(128);
        table.join(&alice, Chips::new(1_000), tx1).await.unwrap();
        table.join(&bob, Chips::new(1_000), tx2.clone()).await.unwrap();
        assert!(table.join(&bob, Chips::new(1_000), tx2).await.is_err());

        table.start_hand().await;
        assert_eq!(next_request(&mut rx1).await, bob);
        assert_eq!(next_request(&mut rx2).await, bob);

        // Alice doesn't have the turn.
        let res = table
            .action(ActionIntent::new(alice.clone(), PlayerAction::Check))
            .await;
        assert_eq!(res, Err(ActionError::NotYourTurn(alice.clone())));

        table
            .action(ActionIntent::new(bob.clone(), PlayerAction::Call))
            .await
            .unwrap();
        assert_eq!(next_request(&mut rx2).await, alice);

        // Bob action is stale.
        let res = table
            .action(ActionIntent::new(bob.clone(), PlayerAction::Call))
            .await;
        assert_eq!(res, Err(ActionError::NotYourTurn(bob.clone())));

        table
            .action(ActionIntent::new(alice.clone(), PlayerAction::Check))
            .await
            .unwrap();

        let snapshot = table.snapshot().await.unwrap();
        assert_eq!(snapshot.board.len(), 3);
        assert_eq!(snapshot.pot, Chips::new(40));
        assert_eq!(snapshot.turn().map(|p| p.player_id.clone()), Some(bob));
    }

    #[tokio::test]
    async fn remote_player_against_strategy() {
        let table = Table::new(config()).unwrap();
        let alice = PlayerId::new("alice");

        let (tx, mut rx) = mpsc::channel(128);
        table.join(&alice, Chips::new(1_000), tx).await.unwrap();
        table
            .join_with_strategy(&PlayerId::new("bot"), Chips::new(1_000), Box::new(CallOrCheck))
            .await
            .unwrap();

        table.start_hand().await;

        loop {
            let msg = next_message(&mut rx, |msg| {
                matches!(msg, Message::ActionRequest(_) | Message::EndHand { .. })
            })
            .await;

            match msg {
                Message::ActionRequest(req) if req.player_id == alice => {
                    let action = if req.can_check() {
                        PlayerAction::Check
                    } else {
                        PlayerAction::Call
                    };

                    table
                        .action(ActionIntent::new(alice.clone(), action))
                        .await
                        .unwrap();
                }
                Message::EndHand { board, .. } => {
                    assert_eq!(board.len(), 5);
                    break;
                }
                _ => {}
            }
        }

        let snapshot = table.snapshot().await.unwrap();
        let chips = snapshot.players.iter().map(|p| p.chips).sum::<Chips>();
        assert_eq!(chips, Chips::new(2_000));
    }

    #[tokio::test]
    async fn spectators_see_covered_cards() {
        let table = Table::new(config()).unwrap();
        let (tx, mut rx) = mpsc::channel(128);
        table.watch(tx).await;

        for id in ["alice", "bob"] {
            table
                .join_with_strategy(&PlayerId::new(id), Chips::new(1_000), Box::new(CallOrCheck))
                .await
                .unwrap();
        }

        table.start_hand().await;

        let msg = next_message(&mut rx, |msg| matches!(msg, Message::GameUpdate(_))).await;
        let Message::GameUpdate(snapshot) = msg else {
            panic!("Unexpected message {msg:?}");
        };

        assert!(
            snapshot
                .players
                .iter()
                .all(|p| !matches!(p.cards, showdown_core::poker::PlayerCards::Cards(..)))
        );
    }

    #[tokio::test]
    async fn dropped_connection_leaves_table() {
        let table = Table::new(config()).unwrap();
        let alice = PlayerId::new("alice");
        let bob = PlayerId::new("bob");

        let (tx1, mut rx1) = mpsc::channel(128);
        let (tx2, rx2) = mpsc::channel(128);
        table.join(&alice, Chips::new(1_000), tx1).await.unwrap();
        table.join(&bob, Chips::new(1_000), tx2).await.unwrap();

        // Wait for the join messages to be delivered before dropping Bob.
        table.snapshot().await.unwrap();
        drop(rx2);

        // Bob connection is gone, he folds and Alice wins the blinds.
        table.start_hand().await;
        next_message(&mut rx1, |msg| matches!(msg, Message::EndHand { .. })).await;

        let msg = next_message(&mut rx1, |msg| matches!(msg, Message::PlayerLeft(_))).await;
        assert!(matches!(msg, Message::PlayerLeft(id) if id == bob));

        let snapshot = table.snapshot().await.unwrap();
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].chips, Chips::new(1_010));
    }

    #[tokio::test]
    async fn closed_table_rejects_actions() {
        let table = Table::new(config()).unwrap();
        let alice = PlayerId::new("alice");

        let (tx, mut rx) = mpsc::channel(128);
        table.join(&alice, Chips::new(1_000), tx).await.unwrap();
        table.close().await;

        loop {
            if matches!(recv(&mut rx).await, TableMessage::Close) {
                break;
            }
        }

        let res = table
            .action(ActionIntent::new(alice, PlayerAction::Check))
            .await;
        assert_eq!(res, Err(ActionError::TableClosed));
        assert!(table.snapshot().await.is_err());
    }
}
