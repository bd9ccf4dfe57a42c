pub mod commands;
pub mod config;
pub mod error;
pub mod health;
pub mod ledger;
pub mod store;
pub mod tasks;
pub mod utils;

use std::sync::Arc;

/// Shared data accessible across all Poise commands.
pub struct Data {
    pub ledger: Arc<ledger::Ledger>,
    pub config: config::Config,
}

/// Poise context alias used throughout the bot.
pub type Context<'a> = poise::Context<'a, Data, error::Error>;
