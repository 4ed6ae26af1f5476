// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0
use clap::Parser;
use log::{error, info};
use showdown_engine::simulation;
use tokio::signal;

#[derive(Debug, Parser)]
struct Cli {
    /// Number of players at the table.
    #[clap(long, short, default_value_t = 4, value_parser = clap::value_parser!(u8).range(2..=8))]
    players: u8,
    /// Number of hands to play.
    #[clap(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    hands: u32,
    /// Chips for each player.
    #[clap(long, short, default_value_t = 1_000, value_parser = clap::value_parser!(u32).range(1..))]
    chips: u32,
    /// The big blind, must be at least 2.
    #[clap(long, short, default_value_t = 20, value_parser = clap::value_parser!(u32).range(2..))]
    big_blind: u32,
    /// Seed for the deck and the strategies.
    #[clap(long, short)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = simulation::Config {
        players: cli.players,
        hands: cli.hands,
        chips: cli.chips,
        big_blind: cli.big_blind,
        seed: cli.seed,
    };

    tokio::select! {
        res = simulation::run(config) => {
            if let Err(e) = res {
                error!("{e}");
            }
        }
        _ = signal::ctrl_c() => {
            info!("Simulation interrupted");
        }
    }
}
