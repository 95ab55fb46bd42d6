//! HTTP loader for the episode list.
//!
//! One GET per load attempt, no retries. Any failure (transport, status,
//! payload) comes back as a [`LoadError`]; callers decide what to show.

use crate::config::Config;
use crate::error::LoadError;
use crate::types::Episode;
use log::{debug, info};
use std::time::Duration;

/// Identifies one load attempt. Tokens increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(pub u64);

/// Build the HTTP client used for every load.
pub fn build_client(config: &Config) -> Result<reqwest::Client, LoadError> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch and decode the episode list from `url`.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> Result<(), episode_explorer::error::LoadError> {
/// use episode_explorer::config::{Config, DEFAULT_API_URL};
/// use episode_explorer::loader::{build_client, fetch_episodes};
///
/// let client = build_client(&Config::new())?;
/// let episodes = fetch_episodes(&client, DEFAULT_API_URL).await?;
/// println!("{} episodes", episodes.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_episodes(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<Episode>, LoadError> {
    debug!("Fetching episodes from {}", url);

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    debug!("Received {} bytes", body.len());

    let episodes = parse_episodes(&body)?;
    info!("Loaded {} episodes", episodes.len());
    Ok(episodes)
}

/// Decode a response body into episodes.
///
/// The body must be a JSON array whose every element carries a numeric
/// `rank` and a text `title`.
pub fn parse_episodes(body: &[u8]) -> Result<Vec<Episode>, LoadError> {
    let episodes: Vec<Episode> = serde_json::from_slice(body)?;
    Ok(episodes)
}
