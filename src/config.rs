use tokio::time::Duration;

/// Server the viewer talks to when none is given.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Period of the auto-play step timer.
pub const DEFAULT_STEP_PERIOD: Duration = Duration::from_millis(800);
/// Pause between a decided game and the automatic reset.
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_millis(2000);
/// How long a changed cell stays highlighted.
pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_millis(300);
/// Passive refresh period while idle.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(1000);
/// Timeout applied to every request made to the game server.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Timing and endpoint settings for a [`Visualizer`](crate::Visualizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub base_url: String,
    pub step_period: Duration,
    pub restart_delay: Duration,
    pub flash_duration: Duration,
    /// `None` disables passive polling; the view then only refreshes after
    /// a control action.
    pub refresh_interval: Option<Duration>,
    pub request_timeout: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            step_period: DEFAULT_STEP_PERIOD,
            restart_delay: DEFAULT_RESTART_DELAY,
            flash_duration: DEFAULT_FLASH_DURATION,
            refresh_interval: Some(DEFAULT_REFRESH_INTERVAL),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ViewerConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_step_period(mut self, period: Duration) -> Self {
        self.step_period = period;
        self
    }

    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    pub fn with_flash_duration(mut self, flash: Duration) -> Self {
        self.flash_duration = flash;
        self
    }

    pub fn with_refresh_interval(mut self, interval: Option<Duration>) -> Self {
        self.refresh_interval = interval.filter(|i| !i.is_zero());
        self
    }

    /// Reject settings that would make the timers spin.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.step_period.is_zero() {
            return Err(anyhow::anyhow!("step period must be greater than zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(anyhow::anyhow!("request timeout must be greater than zero"));
        }
        if self.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("base URL must not be empty"));
        }
        Ok(())
    }
}
