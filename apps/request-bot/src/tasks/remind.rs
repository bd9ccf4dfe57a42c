//! Periodic vote reminder. Stateless: mentions every configured artist role
//! group in the request channel and never touches the ledger.

use crate::config::Config;
use serenity::all::{Context as SerenityContext, CreateMessage, Mentionable, RoleId};
use tracing::{debug, info, warn};

pub async fn run(ctx: &SerenityContext, config: &Config) {
    if config.artist_roles.is_empty() {
        debug!("No artist role groups configured, skipping vote reminder");
        return;
    }

    let content = reminder_line(&config.artist_roles);
    match config
        .request_channel_id
        .send_message(&ctx.http, CreateMessage::new().content(content))
        .await
    {
        Ok(_) => info!("Vote reminder posted"),
        Err(e) => warn!(error = %e, "Failed to post vote reminder"),
    }
}

fn reminder_line(roles: &[(String, RoleId)]) -> String {
    let mentions: Vec<String> = roles
        .iter()
        .map(|(_, role_id)| role_id.mention().to_string())
        .collect();
    format!("Vote reminder! {}", mentions.join(" "))
}
