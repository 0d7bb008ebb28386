use crate::domain::GameState;

/// The backend that owns the game and its rules.
///
/// Implementations only move data; interpreting the state is left to the
/// [`Visualizer`](crate::Visualizer).
#[async_trait::async_trait]
pub trait GameServer: Send + Sync {
    /// Read the current game state.
    async fn fetch_state(&self) -> anyhow::Result<GameState>;
    /// Advance the game by one turn.
    async fn step(&self) -> anyhow::Result<()>;
    /// Start a fresh game.
    async fn reset(&self) -> anyhow::Result<()>;
}

/// Commands that mutate server-side state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Step,
    Reset,
}

impl Command {
    pub fn path(self) -> &'static str {
        match self {
            Command::Step => "/step",
            Command::Reset => "/reset",
        }
    }
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Command::Step => write!(f, "step"),
            Command::Reset => write!(f, "reset"),
        }
    }
}

pub mod http;
pub mod in_memory;
