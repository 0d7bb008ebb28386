//! The visualizer loop: fetch, render, step, auto-play and restart.
//!
//! A [`Visualizer`] owns everything the loop mutates. Step, refresh and
//! restart cycles all run under one single-flight lock so two renders can
//! never interleave; a manual or timed trigger that arrives while a cycle is
//! outstanding is dropped and reported as [`Cycle::Skipped`].

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

use crate::config::ViewerConfig;
use crate::domain::GameState;
use crate::server::{Command, GameServer};
use crate::view::{RenderSummary, View};

/// Outcome of a triggered cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    Rendered(RenderSummary),
    /// Another cycle was in flight; nothing was sent.
    Skipped,
}

impl Cycle {
    /// True when the trigger was dropped by the single-flight lock.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Cycle::Skipped)
    }

    pub fn summary(&self) -> Option<&RenderSummary> {
        match self {
            Cycle::Rendered(summary) => Some(summary),
            Cycle::Skipped => None,
        }
    }
}

/// Transient failures of a cycle. None of them stop the loop.
#[derive(Debug)]
pub enum CycleError {
    /// The state read failed: network error, non-2xx status or bad JSON.
    Fetch(anyhow::Error),
    /// A step or reset command was rejected or never arrived.
    Command {
        command: Command,
        source: anyhow::Error,
    },
}

impl core::fmt::Display for CycleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CycleError::Fetch(e) => write!(f, "Error fetching game state: {:#}", e),
            CycleError::Command { command, source } => {
                write!(f, "Error sending {} command: {:#}", command, source)
            }
        }
    }
}

impl std::error::Error for CycleError {}

#[derive(Default)]
struct Timers {
    auto_playing: bool,
    step_timer: Option<JoinHandle<()>>,
    restart: Option<JoinHandle<()>>,
    poller: Option<JoinHandle<()>>,
}

impl Timers {
    fn cancel_auto_play(&mut self) {
        if let Some(timer) = self.step_timer.take() {
            timer.abort();
        }
        if let Some(restart) = self.restart.take() {
            restart.abort();
        }
    }

    fn restart_pending(&self) -> bool {
        self.restart.as_ref().is_some_and(|h| !h.is_finished())
    }
}

/// Controller for one mounted view of a remote game.
///
/// Owns the view (and with it the previously rendered board), the auto-play
/// flag, the step timer, a pending restart and the passive poller. Created
/// with [`Visualizer::new`] or [`Visualizer::mount`]; [`Visualizer::shutdown`]
/// or dropping the last handle stops every timer.
pub struct Visualizer {
    server: Arc<dyn GameServer>,
    config: ViewerConfig,
    view: Mutex<View>,
    timers: Mutex<Timers>,
    flight: tokio::sync::Mutex<()>,
}

impl Visualizer {
    /// Create an idle controller with an empty view. Nothing is fetched and
    /// no timer runs until a cycle or auto-play is triggered.
    pub fn new(server: Arc<dyn GameServer>, config: ViewerConfig) -> Arc<Self> {
        Arc::new(Self {
            server,
            config,
            view: Mutex::new(View::new()),
            timers: Mutex::new(Timers::default()),
            flight: tokio::sync::Mutex::new(()),
        })
    }

    /// Construct, render the initial state and start passive polling if
    /// configured. A failed first fetch is logged and otherwise ignored.
    pub async fn mount(server: Arc<dyn GameServer>, config: ViewerConfig) -> Arc<Self> {
        let visualizer = Self::new(server, config);
        let _ = visualizer.refresh().await;
        visualizer.start_polling();
        visualizer
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Run `f` against the current view.
    pub fn with_view<R>(&self, f: impl FnOnce(&View) -> R) -> R {
        f(&self.view())
    }

    /// Current auto-play setting.
    pub fn is_auto_playing(&self) -> bool {
        self.timers().auto_playing
    }

    /// Whether the recurring step timer is currently scheduled.
    pub fn step_timer_active(&self) -> bool {
        self.timers()
            .step_timer
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Whether a game-over restart is waiting out its delay or running.
    pub fn restart_pending(&self) -> bool {
        self.timers().restart_pending()
    }

    /// Read the current state and render it. Not guarded; callers that may
    /// overlap go through [`refresh`](Self::refresh) or [`step`](Self::step).
    pub async fn fetch_and_render(self: &Arc<Self>) -> Result<RenderSummary, CycleError> {
        match self.server.fetch_state().await {
            Ok(state) => Ok(self.render(&state)),
            Err(e) => {
                let err = CycleError::Fetch(e);
                log::warn!("{}", err);
                Err(err)
            }
        }
    }

    /// Update the view from `state` and react to a decided game.
    pub fn render(self: &Arc<Self>, state: &GameState) -> RenderSummary {
        let summary = self
            .view()
            .render(state, Instant::now(), self.config.flash_duration);
        log::trace!(
            "Rendered turn {} ({} cells changed)",
            state.turn,
            summary.changed.len()
        );
        if summary.is_decided() {
            self.on_game_over(summary.winner.as_deref().unwrap_or_default());
        }
        summary
    }

    /// Fetch and render unless another cycle is outstanding.
    pub async fn refresh(self: &Arc<Self>) -> Result<Cycle, CycleError> {
        let Ok(_flight) = self.flight.try_lock() else {
            log::debug!("Refresh skipped: a cycle is already in flight");
            return Ok(Cycle::Skipped);
        };
        self.fetch_and_render().await.map(Cycle::Rendered)
    }

    /// Advance the game one turn, then fetch and render.
    pub async fn step(self: &Arc<Self>) -> Result<Cycle, CycleError> {
        let Ok(_flight) = self.flight.try_lock() else {
            log::debug!("Step skipped: a cycle is already in flight");
            return Ok(Cycle::Skipped);
        };
        self.send(Command::Step).await?;
        self.fetch_and_render().await.map(Cycle::Rendered)
    }

    /// Flip auto-play and return the new setting.
    ///
    /// Turning it on replaces any existing step timer; turning it off cancels
    /// the timer and a pending restart.
    pub fn toggle_auto_play(self: &Arc<Self>) -> bool {
        let mut timers = self.timers();
        timers.auto_playing = !timers.auto_playing;
        timers.cancel_auto_play();
        if timers.auto_playing {
            timers.step_timer = Some(self.spawn_step_timer());
            log::info!("Auto-play on ({:?} per step)", self.config.step_period);
        } else {
            log::info!("Auto-play off");
        }
        timers.auto_playing
    }

    /// Begin refreshing every `refresh_interval`, replacing a running poller.
    pub fn start_polling(self: &Arc<Self>) {
        let Some(period) = self.config.refresh_interval else {
            return;
        };
        let this = Arc::downgrade(self);
        let poller = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(visualizer) = this.upgrade() else {
                    break;
                };
                let _ = visualizer.refresh().await;
            }
        });
        if let Some(previous) = self.timers().poller.replace(poller) {
            previous.abort();
        }
    }

    /// Stop every timer. The view keeps its last contents.
    pub fn shutdown(&self) {
        let mut timers = self.timers();
        timers.auto_playing = false;
        timers.cancel_auto_play();
        if let Some(poller) = timers.poller.take() {
            poller.abort();
        }
    }

    fn spawn_step_timer(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::downgrade(self);
        let period = self.config.step_period;
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(visualizer) = this.upgrade() else {
                    break;
                };
                let _ = visualizer.step().await;
            }
        })
    }

    fn on_game_over(self: &Arc<Self>, winner: &str) {
        let mut timers = self.timers();
        if !timers.auto_playing || timers.restart_pending() {
            return;
        }
        log::info!(
            "{} wins; restarting in {:?}",
            winner,
            self.config.restart_delay
        );
        // May abort the task running this render; it stops at its next await.
        if let Some(timer) = timers.step_timer.take() {
            timer.abort();
        }
        let this = Arc::downgrade(self);
        timers.restart = Some(tokio::spawn(restart_sequence(this)));
    }

    async fn send(&self, command: Command) -> Result<(), CycleError> {
        let result = match command {
            Command::Step => self.server.step().await,
            Command::Reset => self.server.reset().await,
        };
        result.map_err(|source| {
            let err = CycleError::Command { command, source };
            log::warn!("{}", err);
            err
        })
    }

    fn view(&self) -> MutexGuard<'_, View> {
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn timers(&self) -> MutexGuard<'_, Timers> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Visualizer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Wait out the pause, reset the game, render it once and resume stepping.
async fn restart_sequence(this: Weak<Visualizer>) {
    let Some(delay) = this.upgrade().map(|v| v.config.restart_delay) else {
        return;
    };
    sleep(delay).await;
    let Some(visualizer) = this.upgrade() else {
        return;
    };
    {
        // Queue behind an outstanding manual cycle instead of dropping the reset.
        let _flight = visualizer.flight.lock().await;
        if visualizer.send(Command::Reset).await.is_ok() {
            log::info!("Game reset");
        }
        let _ = visualizer.fetch_and_render().await;
    }
    let mut timers = visualizer.timers();
    if timers.auto_playing {
        if let Some(stale) = timers.step_timer.take() {
            stale.abort();
        }
        timers.step_timer = Some(visualizer.spawn_step_timer());
    }
}
