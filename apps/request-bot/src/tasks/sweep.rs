//! Maturation sweeper: resolves vote tallies for requests past the voting
//! window, removes them from the ledger, and reports a leaderboard to the
//! admin channel.

use crate::config::Config;
use crate::ledger::{epoch_secs, Ledger, Request};
use crate::utils::embeds;
use serenity::all::{
    ChannelId, Context as SerenityContext, CreateMessage, MessageId, ReactionType,
};
use serenity::http::HttpError;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// The single reaction affordance voters use.
pub const VOTE_EMOJI: &str = "👍";

/// How long a request stays open for voting before it is resolved.
const MATURITY_WINDOW_SECS: u64 = 48 * 3600;

/// Upper bound on a single tally fetch; a timeout counts as a transient
/// failure and the request is retried on the next sweep.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const LEADERBOARD_SIZE: usize = 5;

/// A resolved vote count for a matured request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub artist: String,
    pub name: String,
    pub link: String,
    pub votes: u64,
}

/// Result of one tally-resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyOutcome {
    /// The vote message was fetched. `None` means the vote reaction was
    /// removed entirely; the request resolves with no tally since retrying
    /// cannot bring the affordance back.
    Fetched(Option<u64>),
    /// The vote message no longer exists; retried on the next sweep.
    NotFound,
    /// Network or API failure; retried on the next sweep.
    TransientError,
}

/// Run one sweep over the ledger.
pub async fn run(ctx: &SerenityContext, config: &Config, ledger: &Ledger) {
    let now = epoch_secs();
    let eligible = mature(now, ledger.snapshot().await);
    if eligible.is_empty() {
        debug!("No matured requests, skipping sweep");
        return;
    }

    for channel_id in [config.request_channel_id, config.admin_channel_id] {
        if let Err(e) = channel_id.to_channel(&ctx.http).await {
            warn!(channel_id = %channel_id, error = %e, "Channel unavailable, skipping sweep");
            return;
        }
    }

    let mut processed: Vec<u64> = Vec::new();
    let mut tallies: Vec<Tally> = Vec::new();
    for request in &eligible {
        let outcome = fetch_tally(ctx, config.request_channel_id, request.message_id).await;
        if outcome == TallyOutcome::Fetched(None) {
            warn!(
                message_id = request.message_id,
                "Vote reaction missing, resolving request with no tally"
            );
        }
        apply_outcome(request, outcome, &mut processed, &mut tallies);
    }

    if !processed.is_empty() {
        let removed = ledger.remove(&processed).await;
        debug!(removed, "Matured requests removed from ledger");
        report(ctx, config.admin_channel_id, tallies).await;
    }

    info!(
        processed = processed.len(),
        eligible = eligible.len(),
        "Sweep complete"
    );
}

/// Requests whose age has reached the maturity window. Age exactly equal to
/// the window is eligible.
fn mature(now: u64, requests: Vec<Request>) -> Vec<Request> {
    requests
        .into_iter()
        .filter(|r| now.saturating_sub(r.created_at) >= MATURITY_WINDOW_SECS)
        .collect()
}

async fn fetch_tally(
    ctx: &SerenityContext,
    channel_id: ChannelId,
    message_id: u64,
) -> TallyOutcome {
    let fetch = channel_id.message(&ctx.http, MessageId::from(message_id));
    let message = match tokio::time::timeout(FETCH_TIMEOUT, fetch).await {
        Ok(Ok(message)) => message,
        Ok(Err(e)) => return classify_fetch_error(message_id, e),
        Err(_) => {
            warn!(message_id, "Timed out fetching vote message, will retry next sweep");
            return TallyOutcome::TransientError;
        }
    };

    let count = message
        .reactions
        .iter()
        .find(|r| matches!(&r.reaction_type, ReactionType::Unicode(emoji) if emoji == VOTE_EMOJI))
        .map(|r| r.count);
    TallyOutcome::Fetched(count.map(corrected_votes))
}

/// The bot's own auto-reaction placed at submission time is not a vote.
fn corrected_votes(reaction_count: u64) -> u64 {
    reaction_count.saturating_sub(1)
}

fn classify_fetch_error(message_id: u64, err: serenity::Error) -> TallyOutcome {
    match &err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp))
            if resp.status_code.as_u16() == 404 =>
        {
            warn!(message_id, "Vote message no longer exists, will retry next sweep");
            TallyOutcome::NotFound
        }
        _ => {
            warn!(message_id, error = %err, "Failed to fetch vote message, will retry next sweep");
            TallyOutcome::TransientError
        }
    }
}

/// Retry-vs-resolve policy: only fetched requests are processed out of the
/// ledger; missing messages and transient failures stay eligible for the
/// next sweep.
fn apply_outcome(
    request: &Request,
    outcome: TallyOutcome,
    processed: &mut Vec<u64>,
    tallies: &mut Vec<Tally>,
) {
    match outcome {
        TallyOutcome::Fetched(Some(votes)) => {
            tallies.push(Tally {
                artist: request.artist.clone(),
                name: request.name.clone(),
                link: request.link.clone(),
                votes,
            });
            processed.push(request.message_id);
        }
        TallyOutcome::Fetched(None) => processed.push(request.message_id),
        TallyOutcome::NotFound | TallyOutcome::TransientError => {}
    }
}

/// Rank by votes descending; the stable sort keeps submission order among
/// equal vote counts.
fn leaderboard(mut tallies: Vec<Tally>) -> Vec<Tally> {
    tallies.sort_by(|a, b| b.votes.cmp(&a.votes));
    tallies.truncate(LEADERBOARD_SIZE);
    tallies
}

fn format_report(top: &[Tally]) -> String {
    top.iter()
        .map(|t| format!("**{}** ({}): {} - {} votes", t.name, t.artist, t.link, t.votes))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn report(ctx: &SerenityContext, admin_channel_id: ChannelId, tallies: Vec<Tally>) {
    let message = if tallies.is_empty() {
        CreateMessage::new().embed(
            embeds::warning_embed()
                .title("No votes found")
                .description("No votes found for processed requests."),
        )
    } else {
        CreateMessage::new().embed(
            embeds::brand_embed()
                .title("Top 5 Requests (48h period)")
                .description(format_report(&leaderboard(tallies))),
        )
    };

    if let Err(e) = admin_channel_id.send_message(&ctx.http, message).await {
        error!(error = %e, "Failed to send leaderboard report");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message_id: u64, created_at: u64) -> Request {
        Request {
            artist: "Carti".into(),
            name: format!("Song {message_id}"),
            link: "http://x".into(),
            message_id,
            created_at,
            requested_by: "user#0".into(),
        }
    }

    fn tally(name: &str, votes: u64) -> Tally {
        Tally {
            artist: "Carti".into(),
            name: name.into(),
            link: "http://x".into(),
            votes,
        }
    }

    #[test]
    fn age_exactly_at_window_is_eligible() {
        let now = 1_700_000_000;
        let requests = vec![
            request(1, now - MATURITY_WINDOW_SECS),
            request(2, now - MATURITY_WINDOW_SECS + 1),
        ];
        let eligible = mature(now, requests);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].message_id, 1);
    }

    #[test]
    fn future_created_at_is_not_eligible() {
        let now = 1_700_000_000;
        assert!(mature(now, vec![request(1, now + 60)]).is_empty());
    }

    #[test]
    fn bot_reaction_is_subtracted_from_the_tally() {
        assert_eq!(corrected_votes(1), 0);
        assert_eq!(corrected_votes(6), 5);
        assert_eq!(corrected_votes(0), 0);
    }

    #[test]
    fn fetched_tally_is_processed_and_ranked() {
        let mut processed = Vec::new();
        let mut tallies = Vec::new();
        apply_outcome(
            &request(1, 0),
            TallyOutcome::Fetched(Some(3)),
            &mut processed,
            &mut tallies,
        );
        assert_eq!(processed, vec![1]);
        assert_eq!(tallies[0].votes, 3);
    }

    #[test]
    fn missing_affordance_is_processed_without_a_tally() {
        let mut processed = Vec::new();
        let mut tallies = Vec::new();
        apply_outcome(
            &request(1, 0),
            TallyOutcome::Fetched(None),
            &mut processed,
            &mut tallies,
        );
        assert_eq!(processed, vec![1]);
        assert!(tallies.is_empty());
    }

    #[test]
    fn fetch_failures_leave_the_request_eligible() {
        let mut processed = Vec::new();
        let mut tallies = Vec::new();
        apply_outcome(&request(1, 0), TallyOutcome::NotFound, &mut processed, &mut tallies);
        apply_outcome(
            &request(2, 0),
            TallyOutcome::TransientError,
            &mut processed,
            &mut tallies,
        );
        assert!(processed.is_empty());
        assert!(tallies.is_empty());
    }

    #[test]
    fn leaderboard_orders_by_votes_with_stable_tie_break() {
        let ranked = leaderboard(vec![
            tally("A", 3),
            tally("B", 5),
            tally("C", 5),
            tally("D", 1),
        ]);
        let names: Vec<&str> = ranked.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn leaderboard_keeps_at_most_five_entries() {
        let tallies: Vec<Tally> = (0..8).map(|i| tally(&format!("T{i}"), i)).collect();
        assert_eq!(leaderboard(tallies).len(), LEADERBOARD_SIZE);
    }

    #[test]
    fn report_lines_include_name_artist_link_and_votes() {
        let text = format_report(&[tally("Song X", 4)]);
        assert_eq!(text, "**Song X** (Carti): http://x - 4 votes");
    }
}
