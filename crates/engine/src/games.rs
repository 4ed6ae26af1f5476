// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Games pool.
use ahash::AHashMap;
use anyhow::Result;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

use showdown_core::poker::GameId;

use crate::table::{Table, TableConfig};

/// The games running in a process, each game has its own table task and
/// games don't share any state.
#[derive(Debug, Clone, Default)]
pub struct GamesPool(Arc<Mutex<Shared>>);

#[derive(Debug, Default)]
struct Shared {
    tables: AHashMap<GameId, Arc<Table>>,
}

impl GamesPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new game table.
    ///
    /// Must be called from a tokio runtime.
    pub fn create(&self, config: TableConfig) -> Result<Arc<Table>> {
        let table = Arc::new(Table::new(config)?);
        let game_id = table.game_id();

        self.0.lock().tables.insert(game_id, table.clone());
        info!("Game {game_id} created");

        Ok(table)
    }

    /// Returns a game table.
    pub fn get(&self, game_id: GameId) -> Option<Arc<Table>> {
        self.0.lock().tables.get(&game_id).cloned()
    }

    /// Removes a game and stops its table task.
    ///
    /// Returns false if there is no game with this id.
    pub async fn destroy(&self, game_id: GameId) -> bool {
        let table = self.0.lock().tables.remove(&game_id);
        match table {
            Some(table) => {
                table.close().await;
                info!("Game {game_id} destroyed");
                true
            }
            None => false,
        }
    }

    /// The number of games.
    pub fn len(&self) -> usize {
        self.0.lock().tables.len()
    }

    /// Checks if there are no games.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ids of all games.
    pub fn ids(&self) -> Vec<GameId> {
        let mut ids = self.0.lock().tables.keys().copied().collect::<Vec<_>>();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showdown_core::{
        message::{ActionIntent, PlayerAction},
        poker::{Chips, PlayerId},
    };
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn config() -> TableConfig {
        TableConfig {
            new_hand_delay: Duration::from_secs(3600),
            ..TableConfig::default()
        }
    }

    #[tokio::test]
    async fn games_pool_lifecycle() {
        let pool = GamesPool::new();
        assert!(pool.is_empty());

        let t1 = pool.create(config()).unwrap();
        let t2 = pool.create(config()).unwrap();
        assert_ne!(t1.game_id(), t2.game_id());
        assert_eq!(pool.len(), 2);

        let mut ids = vec![t1.game_id(), t2.game_id()];
        ids.sort();
        assert_eq!(pool.ids(), ids);

        let t = pool.get(t1.game_id()).unwrap();
        assert_eq!(t.game_id(), t1.game_id());

        assert!(pool.destroy(t1.game_id()).await);
        assert!(!pool.destroy(t1.game_id()).await);
        assert!(pool.get(t1.game_id()).is_none());
        assert_eq!(pool.ids(), vec![t2.game_id()]);

        // The destroyed game task stops.
        let res = t1
            .action(ActionIntent::new("alice", PlayerAction::Check))
            .await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn games_are_independent() {
        let pool = GamesPool::new();
        let t1 = pool.create(config()).unwrap();
        let t2 = pool.create(config()).unwrap();

        let alice = PlayerId::new("alice");
        let (tx, _rx) = mpsc::channel(64);
        t1.join(&alice, Chips::new(1_000), tx.clone()).await.unwrap();

        // The same player can join another game.
        t2.join(&alice, Chips::new(1_000), tx).await.unwrap();

        pool.destroy(t1.game_id()).await;
        assert_eq!(t2.snapshot().await.unwrap().players.len(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let pool = GamesPool::new();
        let config = TableConfig {
            seats: 1,
            ..TableConfig::default()
        };

        assert!(pool.create(config).is_err());
        assert!(pool.is_empty());
    }
}
