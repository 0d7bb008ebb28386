//! Wire model for the game state served by the backend.

use serde::{Deserialize, Deserializer, Serialize};

/// Progress bar bound used when the server does not report a usable budget.
pub const FALLBACK_TURN_BOUND: u64 = 100;

/// A rendered board: rows of single-character cell codes.
pub type Board = Vec<Vec<char>>;

/// Snapshot of the game as reported by `GET /game_state.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(deserialize_with = "deserialize_board", serialize_with = "serialize_board")]
    pub board: Board,
    #[serde(default, deserialize_with = "deserialize_turn")]
    pub turn: u64,
    #[serde(default)]
    pub max_steps: Option<i64>,
    #[serde(default)]
    pub player1_tanks: Option<i64>,
    #[serde(default)]
    pub player2_tanks: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub game_over: bool,
    #[serde(default)]
    pub winner: Option<String>,
}

impl GameState {
    /// Upper bound of the turn progress bar.
    ///
    /// `maxSteps - 1` when that is positive, otherwise [`FALLBACK_TURN_BOUND`].
    pub fn turn_bound(&self) -> u64 {
        match self.max_steps.and_then(|max| max.checked_sub(1)) {
            Some(bound) if bound > 0 => bound as u64,
            _ => FALLBACK_TURN_BOUND,
        }
    }

    /// The last turn index as the server labels it (`maxSteps - 1`).
    pub fn last_turn_label(&self) -> Option<i64> {
        self.max_steps.map(|max| max.saturating_sub(1))
    }

    /// Winner text to show, only once the game is over.
    pub fn decided_winner(&self) -> Option<&str> {
        if !self.game_over {
            return None;
        }
        self.winner.as_deref().filter(|w| !w.is_empty())
    }

    /// Cell code at column `x`, row `y`.
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        self.board.get(y).and_then(|row| row.get(x)).copied()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireRow {
    Cells(Vec<String>),
    Line(String),
}

fn cell_from_str(s: &str) -> char {
    s.chars().next().unwrap_or(' ')
}

fn deserialize_board<'de, D>(deserializer: D) -> Result<Board, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Option::<Vec<WireRow>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(rows
        .into_iter()
        .map(|row| match row {
            WireRow::Cells(cells) => cells.iter().map(|c| cell_from_str(c)).collect(),
            WireRow::Line(line) => line.chars().collect(),
        })
        .collect())
}

fn serialize_board<S>(board: &Board, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rows: Vec<Vec<String>> = board
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    rows.serialize(serializer)
}

fn deserialize_turn<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let turn = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
    Ok(turn.max(0) as u64)
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
