use poise::serenity_prelude as serenity;
use request_bot::commands;
use request_bot::config::Config;
use request_bot::ledger::Ledger;
use request_bot::store::Store;
use request_bot::{health, tasks, Data};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "request_bot=info".parse().unwrap()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(version = %config.bot_version, "Configuration loaded");

    if config.artist_roles.is_empty() {
        warn!("No ARTIST_ROLES configured — vote reminders will not mention any role groups");
    } else {
        info!(groups = config.artist_roles.len(), "Artist role groups configured");
    }

    let ledger = Arc::new(Ledger::open(Store::new(&config.store_path)));
    info!(
        pending = ledger.len().await,
        store = %config.store_path.display(),
        "Request ledger ready"
    );

    tokio::spawn(health::serve(config.health_port));

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let token = config.discord_token.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::request::request()],
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            let embed = request_bot::utils::embeds::error_embed()
                                .title("Error")
                                .description(error.user_message());
                            let _ = ctx
                                .send(poise::CreateReply::default().embed(embed).ephemeral(true))
                                .await;
                            tracing::error!(
                                command = ctx.command().name,
                                error = %error,
                                "Command error"
                            );
                        }
                        other => {
                            if let Err(e) = poise::builtins::on_error(other).await {
                                tracing::error!(error = %e, "Error handling error");
                            }
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(bot = %ready.user.name, guilds = ready.guilds.len(), "Bot is ready!");

                // Register slash commands (guild-specific if GUILD_ID set, otherwise global)
                if let Some(guild_id) = config.guild_id {
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                        .await?;
                    info!(guild_id = %guild_id, "Slash commands registered to guild");
                } else {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!("Slash commands registered globally");
                }

                ctx.set_activity(Some(serenity::ActivityData::watching("the request queue")));

                tasks::spawn_all(ctx.clone(), config.clone(), ledger.clone());

                Ok(Data { ledger, config })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Failed to create Discord client");

    // Graceful shutdown on SIGINT/SIGTERM
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping bot...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!(error = %why, "Client error");
    }
    info!("Bot has shut down cleanly");
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
