use std::path::Path;
use std::sync::Mutex;

use tokio::time::{sleep, Duration};

use crate::domain::GameState;
use crate::server::{Command, GameServer};

/// In-process [`GameServer`] that replays a fixed list of frames.
///
/// `step` advances to the next frame and stays on the last one; `reset`
/// rewinds to the first. Used for offline replays and tests.
pub struct ScriptedServer {
    script: Mutex<Script>,
    latency: Duration,
}

#[derive(Default)]
struct Script {
    frames: Vec<GameState>,
    position: usize,
    steps: usize,
    resets: usize,
    fetches: usize,
    failing_fetches: usize,
    failing_commands: usize,
}

impl ScriptedServer {
    pub fn new(frames: Vec<GameState>) -> Self {
        Self {
            script: Mutex::new(Script {
                frames,
                ..Script::default()
            }),
            latency: Duration::ZERO,
        }
    }

    /// Parse a JSON array of game states.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let frames: Vec<GameState> = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Invalid replay frames: {}", e))?;
        if frames.is_empty() {
            return Err(anyhow::anyhow!("Replay contains no frames"));
        }
        Ok(Self::new(frames))
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        Self::from_json(&json)
    }

    /// Delay every request by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next `count` state reads fail.
    pub fn fail_next_fetches(&self, count: usize) {
        self.lock().failing_fetches = count;
    }

    /// Make the next `count` step/reset commands fail.
    pub fn fail_next_commands(&self, count: usize) {
        self.lock().failing_commands = count;
    }

    /// Index of the frame currently served.
    pub fn position(&self) -> usize {
        self.lock().position
    }

    pub fn steps(&self) -> usize {
        self.lock().steps
    }

    pub fn resets(&self) -> usize {
        self.lock().resets
    }

    pub fn fetches(&self) -> usize {
        self.lock().fetches
    }

    pub fn frame_count(&self) -> usize {
        self.lock().frames.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A poisoned script only means a test thread panicked mid-update.
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }

    fn apply(&self, command: Command) -> anyhow::Result<()> {
        let mut script = self.lock();
        if script.failing_commands > 0 {
            script.failing_commands -= 1;
            return Err(anyhow::anyhow!("{} rejected by scripted server", command));
        }
        match command {
            Command::Step => {
                let last = script.frames.len().saturating_sub(1);
                script.position = (script.position + 1).min(last);
                script.steps += 1;
            }
            Command::Reset => {
                script.position = 0;
                script.resets += 1;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl GameServer for ScriptedServer {
    async fn fetch_state(&self) -> anyhow::Result<GameState> {
        self.simulate_latency().await;
        let mut script = self.lock();
        if script.failing_fetches > 0 {
            script.failing_fetches -= 1;
            return Err(anyhow::anyhow!("Connection refused"));
        }
        let frame = script
            .frames
            .get(script.position)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Replay contains no frames"))?;
        script.fetches += 1;
        Ok(frame)
    }

    async fn step(&self) -> anyhow::Result<()> {
        self.simulate_latency().await;
        self.apply(Command::Step)
    }

    async fn reset(&self) -> anyhow::Result<()> {
        self.simulate_latency().await;
        self.apply(Command::Reset)
    }
}
