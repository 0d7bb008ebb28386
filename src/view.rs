//! Retained view of the last rendered game state.
//!
//! [`View::render`] rebuilds every element from a [`GameState`] and diffs the
//! board against the previous one so that changed cells pulse briefly. The
//! terminal front end only ever reads from a `View`.

use tokio::time::{Duration, Instant};

use crate::cell::CellKind;
use crate::domain::{Board, GameState};

/// One board position as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub code: char,
    pub kind: CellKind,
    /// Set when the cell changed on the render that produced it.
    pub pulse_until: Option<Instant>,
}

impl CellView {
    /// Whether the change highlight is still showing at `now`.
    pub fn is_pulsing(&self, now: Instant) -> bool {
        self.pulse_until.is_some_and(|until| now < until)
    }
}

/// Heads-up display with the tank count of each side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hud {
    pub player1_tanks: Option<i64>,
    pub player2_tanks: Option<i64>,
}

impl Hud {
    /// One display line per player; missing counts show as `?`.
    pub fn lines(&self) -> [String; 2] {
        [
            format!("🟦 Player 1 Tanks: {}", count_or_unknown(self.player1_tanks)),
            format!("🟩 Player 2 Tanks: {}", count_or_unknown(self.player2_tanks)),
        ]
    }
}

fn count_or_unknown(count: Option<i64>) -> String {
    count.map_or_else(|| "?".to_string(), |c| c.to_string())
}

/// Turn label and progress bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnBar {
    pub turn: u64,
    /// Progress upper bound; never zero.
    pub bound: u64,
    pub label: String,
}

impl TurnBar {
    fn from_state(state: &GameState) -> Self {
        let last = state
            .last_turn_label()
            .map_or_else(|| "?".to_string(), |t| t.to_string());
        Self {
            turn: state.turn,
            bound: state.turn_bound(),
            label: format!("Turn {} / {}", state.turn, last),
        }
    }

    /// Progress value clamped into `[0, bound]`.
    pub fn value(&self) -> u64 {
        self.turn.min(self.bound)
    }

    /// Fill fraction in `[0, 1]` for a gauge.
    pub fn ratio(&self) -> f64 {
        self.value() as f64 / self.bound as f64
    }
}

/// What a single render changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// `(x, y)` positions flagged as changed, row-major.
    pub changed: Vec<(usize, usize)>,
    /// Winner when the rendered state is a decided game.
    pub winner: Option<String>,
}

impl RenderSummary {
    /// The rendered state carried a winner.
    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }
}

/// Everything currently on screen, plus the board it was built from.
///
/// Starts empty: no board, no turn bar, no banner. Only [`View::render`]
/// changes it, so a failed fetch leaves the last render in place.
#[derive(Debug, Default)]
pub struct View {
    board: Vec<Vec<CellView>>,
    previous_board: Board,
    hud: Hud,
    turn_bar: Option<TurnBar>,
    banner: Option<String>,
    renders: u64,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the view with `state`, pulsing cells that differ from the
    /// previously rendered board for `flash`.
    pub fn render(&mut self, state: &GameState, now: Instant, flash: Duration) -> RenderSummary {
        let mut changed = Vec::new();
        let pulse_until = now + flash;

        self.board = state
            .board
            .iter()
            .enumerate()
            .map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(|(x, &code)| {
                        let previous = self.previous_board.get(y).and_then(|r| r.get(x));
                        let pulse = if previous != Some(&code) {
                            changed.push((x, y));
                            Some(pulse_until)
                        } else {
                            None
                        };
                        CellView {
                            code,
                            kind: CellKind::from_code(code),
                            pulse_until: pulse,
                        }
                    })
                    .collect()
            })
            .collect();

        self.hud = Hud {
            player1_tanks: state.player1_tanks,
            player2_tanks: state.player2_tanks,
        };
        self.turn_bar = Some(TurnBar::from_state(state));

        let winner = state.decided_winner().map(str::to_string);
        self.banner = winner.as_ref().map(|w| format!("🏆 {}", w));

        self.previous_board = state.board.clone();
        self.renders += 1;

        RenderSummary { changed, winner }
    }

    /// Displayed cells, row-major.
    pub fn board(&self) -> &[Vec<CellView>] {
        &self.board
    }

    /// Raw codes of the last render, the baseline for the next diff.
    pub fn previous_board(&self) -> &Board {
        &self.previous_board
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    /// `None` until the first successful render.
    pub fn turn_bar(&self) -> Option<&TurnBar> {
        self.turn_bar.as_ref()
    }

    /// Winner banner text, present only for a decided game.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Number of successful renders so far.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// Positions whose highlight is still showing at `now`.
    pub fn pulsing_cells(&self, now: Instant) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for (y, row) in self.board.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if cell.is_pulsing(now) {
                    cells.push((x, y));
                }
            }
        }
        cells
    }
}
