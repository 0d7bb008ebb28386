//! Drawing the view and reading control keys.

use std::fmt::Write as _;

use crate::cell::KNOWN_KINDS;
use crate::view::View;

/// Control actions a viewer can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Step,
    ToggleAutoPlay,
    Refresh,
    Quit,
}

/// Label of the auto-play control for the current setting.
pub fn auto_play_label(auto_playing: bool) -> &'static str {
    if auto_playing {
        "⏹ Stop"
    } else {
        "▶ Auto"
    }
}

/// Board cell as two terminal columns; emoji glyphs are already double width.
fn cell_text(glyph: &str) -> &str {
    if glyph.is_empty() {
        "  "
    } else {
        glyph
    }
}

/// One line per known cell kind: glyph and tooltip.
pub fn legend_lines() -> Vec<String> {
    KNOWN_KINDS
        .iter()
        .map(|kind| format!("{} {}", cell_text(kind.glyph()), kind.title()))
        .collect()
}

/// Plain-text rendering of the view, used by `snapshot` and non-interactive output.
pub fn render_text(view: &View) -> String {
    let mut out = String::new();
    if let Some(bar) = view.turn_bar() {
        let filled = (bar.ratio() * 20.0).round() as usize;
        let _ = writeln!(
            out,
            "{}  [{}{}]",
            bar.label,
            "#".repeat(filled),
            ".".repeat(20 - filled)
        );
    }
    for row in view.board() {
        let line: String = row.iter().map(|c| cell_text(c.kind.glyph())).collect();
        let _ = writeln!(out, "{}", line);
    }
    for line in view.hud().lines() {
        let _ = writeln!(out, "{}", line);
    }
    if let Some(banner) = view.banner() {
        let _ = writeln!(out, "{}", banner);
    }
    out
}

#[cfg(feature = "tui")]
pub use terminal::{cleanup_terminal, run, setup_terminal};

#[cfg(feature = "tui")]
mod terminal {
    use std::io;
    use std::sync::Arc;

    use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
    use ratatui::{
        backend::CrosstermBackend,
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Gauge, Paragraph},
        Frame, Terminal,
    };
    use tokio::sync::mpsc;
    use tokio::time::{interval, Duration, Instant};

    use super::{auto_play_label, cell_text, legend_lines, UserAction};
    use crate::cell::CellKind;
    use crate::controller::Visualizer;
    use crate::logging::{recent_logs, set_stderr_mirror};
    use crate::view::View;

    type Term = Terminal<CrosstermBackend<io::Stdout>>;

    const REDRAW_PERIOD: Duration = Duration::from_millis(50);
    const LOG_LINES: usize = 4;

    pub fn setup_terminal() -> anyhow::Result<Term> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    pub fn cleanup_terminal() -> anyhow::Result<()> {
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
        Ok(())
    }

    /// Own the terminal until the user quits. Timers are stopped on exit.
    pub async fn run(visualizer: Arc<Visualizer>) -> anyhow::Result<()> {
        let mut terminal = setup_terminal()?;
        set_stderr_mirror(false);
        let result = event_loop(&mut terminal, &visualizer).await;
        visualizer.shutdown();
        let cleanup = cleanup_terminal();
        set_stderr_mirror(true);
        result.and(cleanup)
    }

    async fn event_loop(terminal: &mut Term, visualizer: &Arc<Visualizer>) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let input = tokio::task::spawn_blocking(move || read_input(tx));
        let mut redraw = interval(REDRAW_PERIOD);

        loop {
            tokio::select! {
                _ = redraw.tick() => draw(terminal, visualizer)?,
                action = rx.recv() => match action {
                    Some(UserAction::Quit) | None => break,
                    Some(UserAction::ToggleAutoPlay) => {
                        visualizer.toggle_auto_play();
                    }
                    Some(UserAction::Step) => {
                        let visualizer = Arc::clone(visualizer);
                        tokio::spawn(async move {
                            let _ = visualizer.step().await;
                        });
                    }
                    Some(UserAction::Refresh) => {
                        let visualizer = Arc::clone(visualizer);
                        tokio::spawn(async move {
                            let _ = visualizer.refresh().await;
                        });
                    }
                },
            }
        }

        drop(rx);
        input.await??;
        Ok(())
    }

    fn read_input(tx: mpsc::UnboundedSender<UserAction>) -> anyhow::Result<()> {
        while !tx.is_closed() {
            if let Some(action) = handle_input()? {
                if tx.send(action).is_err() {
                    break;
                }
            }
        }
        Ok(())
    }

    pub fn handle_input() -> anyhow::Result<Option<UserAction>> {
        if event::poll(REDRAW_PERIOD)? {
            if let Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) = event::read()?
            {
                let action = match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => UserAction::Quit,
                    KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Char(' ') => {
                        UserAction::Step
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') => UserAction::ToggleAutoPlay,
                    KeyCode::Char('r') | KeyCode::Char('R') => UserAction::Refresh,
                    _ => return Ok(None),
                };
                return Ok(Some(action));
            }
        }
        Ok(None)
    }

    fn draw(terminal: &mut Term, visualizer: &Visualizer) -> anyhow::Result<()> {
        let auto_playing = visualizer.is_auto_playing();
        let logs = recent_logs(LOG_LINES);
        let now = Instant::now();
        visualizer.with_view(|view| {
            terminal
                .draw(|f| draw_frame(f, view, auto_playing, &logs, now))
                .map(|_| ())
        })?;
        Ok(())
    }

    fn draw_frame(f: &mut Frame, view: &View, auto_playing: bool, logs: &[String], now: Instant) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(LOG_LINES as u16 + 2),
            ])
            .split(f.area());

        let label = view
            .turn_bar()
            .map(|bar| bar.label.clone())
            .unwrap_or_else(|| "Waiting for game state...".to_string());
        f.render_widget(
            Paragraph::new(label)
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::BOLD)),
            rows[0],
        );

        let ratio = view.turn_bar().map_or(0.0, |bar| bar.ratio());
        f.render_widget(
            Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("Progress"))
                .gauge_style(Style::default().fg(Color::Cyan))
                .ratio(ratio),
            rows[1],
        );

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(rows[2]);

        let board: Vec<Line> = view
            .board()
            .iter()
            .map(|row| {
                Line::from(
                    row.iter()
                        .map(|cell| {
                            let mut style = cell_style(cell.kind);
                            if cell.is_pulsing(now) {
                                style = style.add_modifier(Modifier::REVERSED);
                            }
                            Span::styled(cell_text(cell.kind.glyph()).to_string(), style)
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        f.render_widget(
            Paragraph::new(board)
                .block(Block::default().borders(Borders::ALL).title("Board"))
                .alignment(Alignment::Center),
            middle[0],
        );

        let mut hud: Vec<Line> = view
            .hud()
            .lines()
            .into_iter()
            .map(Line::from)
            .collect();
        hud.push(Line::from(""));
        hud.extend(legend_lines().into_iter().map(Line::from));
        f.render_widget(
            Paragraph::new(hud).block(Block::default().borders(Borders::ALL).title("Game Stats")),
            middle[1],
        );

        f.render_widget(
            Paragraph::new(view.banner().unwrap_or_default().to_string())
                .alignment(Alignment::Center)
                .style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
                .block(Block::default().borders(Borders::ALL)),
            rows[3],
        );

        let controls = format!(
            "[s] ⏭ Step   [a] {}   [r] Refresh   [q] Quit",
            auto_play_label(auto_playing)
        );
        f.render_widget(
            Paragraph::new(controls)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Cyan))
                .block(Block::default().borders(Borders::ALL).title("Controls")),
            rows[4],
        );

        let log_lines: Vec<Line> = logs.iter().map(|l| Line::from(l.as_str())).collect();
        f.render_widget(
            Paragraph::new(log_lines)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("Log")),
            rows[5],
        );
    }

    fn cell_style(kind: CellKind) -> Style {
        let color = match kind {
            CellKind::Tank1 => Color::Blue,
            CellKind::Tank2 => Color::Green,
            CellKind::Wall => Color::Gray,
            CellKind::DamagedWall => Color::Red,
            CellKind::Mine => Color::Magenta,
            CellKind::Shell => Color::Yellow,
            CellKind::Empty => Color::Reset,
            CellKind::Unknown(_) => Color::LightRed,
        };
        Style::default().fg(color)
    }
}
