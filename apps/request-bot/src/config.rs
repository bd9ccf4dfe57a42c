use crate::error::Error;
use serenity::all::{ChannelId, GuildId, RoleId};
use std::path::PathBuf;

/// Role-map key acting as the catch-all group for unrecognized artists.
const FALLBACK_ARTIST: &str = "other";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub request_channel_id: ChannelId,
    pub admin_channel_id: ChannelId,
    /// Artist name (lowercased) to role group, in configuration order.
    pub artist_roles: Vec<(String, RoleId)>,
    pub guild_id: Option<GuildId>,
    pub store_path: PathBuf,
    pub health_port: u16,
    pub bot_version: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DISCORD_TOKEN` — Bot token from Discord Developer Portal
    /// - `REQUEST_CHANNEL_ID` — Channel where requests are posted for voting
    /// - `ADMIN_CHANNEL_ID` — Channel that receives the leaderboard reports
    ///
    /// Optional:
    /// - `ARTIST_ROLES` — Comma-separated `artist=role_id` pairs; the `other`
    ///   entry is the fallback group for unrecognized artists
    /// - `GUILD_ID` — Register slash commands to a single guild
    /// - `STORE_PATH` — Ledger file path (default "requests.json")
    /// - `HEALTH_PORT` — Keep-alive endpoint port (default 5000)
    pub fn from_env() -> Result<Self, Error> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .map_err(|_| Error::Config("DISCORD_TOKEN environment variable is required".into()))?;

        let request_channel_id = parse_required_id::<ChannelId>("REQUEST_CHANNEL_ID")?;
        let admin_channel_id = parse_required_id::<ChannelId>("ADMIN_CHANNEL_ID")?;

        let artist_roles = match std::env::var("ARTIST_ROLES") {
            Ok(raw) if !raw.is_empty() => parse_role_map(&raw)?,
            _ => Vec::new(),
        };

        let guild_id = parse_optional_id::<GuildId>("GUILD_ID")?;

        let store_path = std::env::var("STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("requests.json"));

        let health_port = match std::env::var("HEALTH_PORT") {
            Ok(val) if !val.is_empty() => val
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("Invalid HEALTH_PORT: '{val}'")))?,
            _ => 5000,
        };

        Ok(Self {
            discord_token,
            request_channel_id,
            admin_channel_id,
            artist_roles,
            guild_id,
            store_path,
            health_port,
            bot_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Resolve the role group for an artist name, case-insensitively.
    ///
    /// Falls back to the `other` group when the artist is unrecognized, and
    /// to `None` when no role map is configured at all.
    pub fn role_for(&self, artist: &str) -> Option<RoleId> {
        let needle = artist.to_lowercase();
        self.artist_roles
            .iter()
            .find(|(name, _)| *name == needle)
            .or_else(|| self.artist_roles.iter().find(|(name, _)| name == FALLBACK_ARTIST))
            .map(|(_, id)| *id)
    }
}

/// Parse `artist=role_id` pairs. Keys are lowercased so lookups are
/// display-independent; pair order is preserved for reminder mentions.
fn parse_role_map(raw: &str) -> Result<Vec<(String, RoleId)>, Error> {
    raw.split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            let (artist, id) = pair
                .split_once('=')
                .ok_or_else(|| Error::Config(format!("Invalid ARTIST_ROLES entry: '{pair}'")))?;
            let id = id
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::Config(format!("Invalid role ID in ARTIST_ROLES: '{pair}'")))?;
            Ok((artist.trim().to_lowercase(), RoleId::from(id)))
        })
        .collect()
}

fn parse_required_id<T>(var: &str) -> Result<T, Error>
where
    T: From<u64>,
{
    let val = std::env::var(var)
        .map_err(|_| Error::Config(format!("{var} environment variable is required")))?;
    val.trim()
        .parse::<u64>()
        .map(T::from)
        .map_err(|_| Error::Config(format!("Invalid ID for {var}: '{val}'")))
}

fn parse_optional_id<T>(var: &str) -> Result<Option<T>, Error>
where
    T: From<u64>,
{
    match std::env::var(var) {
        Ok(val) if !val.is_empty() => {
            let id = val
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::Config(format!("Invalid ID for {var}: '{val}'")))?;
            Ok(Some(T::from(id)))
        }
        _ => Ok(None),
    }
}
