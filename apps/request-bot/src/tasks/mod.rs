use crate::config::Config;
use crate::ledger::Ledger;
use serenity::all::Context as SerenityContext;
use std::sync::Arc;
use std::time::Duration;

pub mod remind;
pub mod sweep;

/// How often the maturation sweeper scans the ledger.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// How often voters are reminded to vote.
pub const REMINDER_INTERVAL: Duration = Duration::from_secs(24 * 3600);

/// Spawn the periodic background jobs.
///
/// Each loop's first tick completes immediately: the sweeper clears any
/// backlog accumulated while the bot was offline before settling into its
/// interval, and the first reminder goes out at startup.
pub fn spawn_all(ctx: SerenityContext, config: Config, ledger: Arc<Ledger>) {
    {
        let ctx = ctx.clone();
        let config = config.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                sweep::run(&ctx, &config, &ledger).await;
            }
        });
    }

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REMINDER_INTERVAL);
        loop {
            ticker.tick().await;
            remind::run(&ctx, &config).await;
        }
    });
}
