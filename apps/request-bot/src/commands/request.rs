use crate::ledger::{epoch_secs, Request};
use crate::tasks::sweep::VOTE_EMOJI;
use crate::utils::embeds;
use crate::Context;
use serenity::all::{CreateMessage, Mentionable, ReactionType};
use tracing::info;

type Error = crate::error::Error;

/// Submit a new request for the community to vote on.
#[poise::command(slash_command)]
pub async fn request(
    ctx: Context<'_>,
    #[description = "Artist name"] artist: String,
    #[description = "Name of the request"] name: String,
    #[description = "Spotify, YouTube, SoundCloud link"] link: String,
) -> Result<(), Error> {
    let config = &ctx.data().config;
    let http = &ctx.serenity_context().http;

    let channel_id = config.request_channel_id;
    channel_id
        .to_channel(http)
        .await
        .map_err(|_| Error::ChannelUnavailable(channel_id))?;

    // Artist names are categorized case-insensitively into role groups; the
    // display form is preserved in the posted message and the ledger.
    let role_group = config.role_for(&artist);

    // The vote message must exist before the ledger entry, so a stored
    // message_id always points at a real message. If anything past the send
    // fails, the orphaned message is acceptable collateral.
    let content = format!(
        "**{name}** ({artist})\n{link}\nVote by reacting {VOTE_EMOJI}\nRequested by {}",
        ctx.author().mention()
    );
    let message = channel_id
        .send_message(http, CreateMessage::new().content(content))
        .await?;
    message
        .react(http, ReactionType::Unicode(VOTE_EMOJI.to_string()))
        .await?;

    let request = Request {
        artist,
        name,
        link,
        message_id: message.id.get(),
        created_at: epoch_secs(),
        requested_by: ctx.author().tag(),
    };
    ctx.data().ledger.append(request.clone()).await;

    info!(
        message_id = %message.id,
        artist = %request.artist,
        requested_by = %request.requested_by,
        role_group = ?role_group,
        "Request recorded"
    );

    let embed = embeds::success_embed()
        .title("Request added")
        .description(format!("{} ({})", request.name, request.artist));
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}
