use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, StatusCode};

use crate::config::ViewerConfig;
use crate::domain::GameState;
use crate::server::{Command, GameServer};

/// Path of the state document relative to the base URL.
pub const STATE_PATH: &str = "/game_state.json";

/// [`GameServer`] speaking plain HTTP to the game backend.
pub struct HttpGameServer {
    client: Client,
    base_url: String,
}

impl HttpGameServer {
    pub fn new(config: &ViewerConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .no_proxy()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the state document with a cache-busting timestamp.
    pub fn state_url(&self) -> String {
        format!("{}{}?_={}", self.base_url, STATE_PATH, cache_buster())
    }

    fn command_url(&self, command: Command) -> String {
        format!("{}{}", self.base_url, command.path())
    }

    async fn send_command(&self, command: Command) -> anyhow::Result<()> {
        let url = self.command_url(command);
        log::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{} request failed: {}", command, e))?;
        ensure_success(response.status(), command.path())
    }
}

fn cache_buster() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

fn ensure_success(status: StatusCode, path: &str) -> anyhow::Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} returned {}", path, status))
    }
}

#[async_trait::async_trait]
impl GameServer for HttpGameServer {
    async fn fetch_state(&self) -> anyhow::Result<GameState> {
        let url = self.state_url();
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch game state: {}", e))?;
        ensure_success(response.status(), STATE_PATH)?;
        response
            .json::<GameState>()
            .await
            .map_err(|e| anyhow::anyhow!("Malformed game state: {}", e))
    }

    async fn step(&self) -> anyhow::Result<()> {
        self.send_command(Command::Step).await
    }

    async fn reset(&self) -> anyhow::Result<()> {
        self.send_command(Command::Reset).await
    }
}
