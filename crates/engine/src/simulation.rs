// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Table simulation with strategy seats.
use anyhow::{Result, bail};
use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;
use tokio::sync::mpsc;

use showdown_core::{
    message::{Message, PlayerAction},
    poker::{Chips, HandRank, PlayerId},
    policy::{CallOrCheck, DecisionContext, Strategy},
};

use crate::{
    games::GamesPool,
    table::{TableConfig, TableMessage},
};

/// Simulation configuration.
#[derive(Debug)]
pub struct Config {
    /// Number of players at the table.
    pub players: u8,
    /// Number of hands to play.
    pub hands: u32,
    /// Chips for each player.
    pub chips: u32,
    /// The big blind.
    pub big_blind: u32,
    /// Seed for the deck and the strategies.
    pub seed: Option<u64>,
}

static NICKNAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Mike",
];

/// A strategy that bets with the strength of its hand.
struct HandStrength {
    rng: StdRng,
}

impl Strategy for HandStrength {
    fn decide(&mut self, ctx: &DecisionContext) -> (PlayerAction, Chips) {
        let rank = ctx.hand_strength.rank();
        let bluff = self.rng.random_bool(0.05);

        if (rank >= HandRank::TwoPair || bluff) && ctx.can(PlayerAction::Raise) {
            let bet = ctx.pot.max(ctx.big_blind);
            let amount = (ctx.current_bet + bet).min(ctx.max_raise());
            return (PlayerAction::Raise, amount);
        }

        if ctx.can(PlayerAction::Check) {
            (PlayerAction::Check, Chips::ZERO)
        } else if rank >= HandRank::OnePair || ctx.to_call() <= ctx.big_blind {
            (PlayerAction::Call, Chips::ZERO)
        } else {
            (PlayerAction::Fold, Chips::ZERO)
        }
    }
}

/// Plays a game with strategy seats and returns the final stacks.
pub async fn run(config: Config) -> Result<Vec<(PlayerId, Chips)>> {
    let pool = GamesPool::new();
    let table = pool.create(TableConfig {
        seats: config.players as usize,
        min_players: 2,
        big_blind: Chips::new(config.big_blind),
        new_hand_delay: Duration::ZERO,
        seed: config.seed,
    })?;

    let (table_tx, mut table_rx) = mpsc::channel(1024);
    table.watch(table_tx).await;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    for idx in 0..config.players as usize {
        let player_id = PlayerId::new(NICKNAMES[idx % NICKNAMES.len()]);

        // Alternate passive and hand strength seats.
        let strategy: Box<dyn Strategy> = if idx % 2 == 0 {
            Box::new(HandStrength {
                rng: StdRng::seed_from_u64(rng.random()),
            })
        } else {
            Box::new(CallOrCheck)
        };

        table
            .join_with_strategy(&player_id, Chips::new(config.chips), strategy)
            .await?;
    }

    info!(
        "Game {} started with {} players",
        table.game_id(),
        config.players
    );

    table.start_hand().await;

    let mut hands = 0;
    while let Some(msg) = table_rx.recv().await {
        match msg {
            TableMessage::Send(Message::EndHand { payoffs, .. }) => {
                hands += 1;
                for payoff in payoffs {
                    match payoff.hand {
                        Some(hand) => info!(
                            "Hand {hands}: {} wins {} with {hand}",
                            payoff.player_id, payoff.chips
                        ),
                        None => {
                            info!("Hand {hands}: {} wins {}", payoff.player_id, payoff.chips)
                        }
                    }
                }

                if hands == config.hands {
                    break;
                }
            }
            TableMessage::Send(Message::WaitingForPlayers { .. }) if hands > 0 => {
                info!("Game over after {hands} hands");
                break;
            }
            TableMessage::Send(_) => {}
            TableMessage::PlayerLeft | TableMessage::Close => break,
        }
    }

    let snapshot = table.snapshot().await?;
    pool.destroy(table.game_id()).await;

    let stacks = snapshot
        .players
        .iter()
        .map(|p| (p.player_id.clone(), p.chips))
        .collect::<Vec<_>>();

    let total = stacks.iter().map(|(_, chips)| *chips).sum::<Chips>() + snapshot.pot;
    let expected = Chips::new(config.chips.saturating_mul(config.players as u32));
    if total != expected {
        bail!("Chips mismatch {total} expected {expected}");
    }

    for (player_id, chips) in &stacks {
        info!("{player_id}: {chips}");
    }

    Ok(stacks)
}
