use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::models::{AdminClaim, ClubId};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub discord_token: String,
    pub guild_id: Option<u64>,
    pub admin_club: Option<ClubId>,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} not defined"));
        Ok(Config {
            database_url: required("DATABASE_URL")?,
            discord_token: required("DISCORD_TOKEN")?,
            guild_id: parse_optional(&lookup, "DISCORD_GUILD_ID")?,
            admin_club: parse_optional(&lookup, "BRACKET_ADMIN_CLUB")?,
            max_connections: parse_optional(&lookup, "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        })
    }

    /// Discord moderators administer every tournament, or only their club's
    /// when the deployment belongs to a club.
    pub fn admin_claim(&self, actor: impl Into<String>) -> AdminClaim {
        match self.admin_club {
            Some(club) => AdminClaim::club(actor, club),
            None => AdminClaim::global(actor),
        }
    }
}

fn parse_optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            value
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a number, got '{value}'"))
        })
        .transpose()
}
