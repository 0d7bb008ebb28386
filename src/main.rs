use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::time::Duration;

use tankview::{
    init_logging, render_text, GameServer, HttpGameServer, ScriptedServer, ViewerConfig,
    Visualizer, DEFAULT_BASE_URL,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a live game served over HTTP.
    Watch {
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        url: String,
        #[command(flatten)]
        timing: Timing,
    },
    /// Replay a recorded game from a JSON array of game states.
    Replay {
        frames: PathBuf,
        #[command(flatten)]
        timing: Timing,
    },
    /// Fetch the current state once and print it.
    Snapshot {
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        url: String,
        #[arg(long, default_value_t = 5000, help = "Request timeout in milliseconds")]
        timeout_ms: u64,
    },
}

#[derive(Args)]
struct Timing {
    #[arg(long, default_value_t = 800, help = "Auto-play step period in milliseconds")]
    step_ms: u64,
    #[arg(long, default_value_t = 2000, help = "Pause before restarting a finished game")]
    restart_ms: u64,
    #[arg(long, default_value_t = 300, help = "How long changed cells stay highlighted")]
    flash_ms: u64,
    #[arg(long, default_value_t = 1000, help = "Passive refresh period, 0 disables it")]
    refresh_ms: u64,
    #[arg(long, default_value_t = 5000, help = "Request timeout in milliseconds")]
    timeout_ms: u64,
    #[arg(long, help = "Start with auto-play on")]
    auto: bool,
}

impl Timing {
    fn config(&self, base_url: &str) -> ViewerConfig {
        let mut config = ViewerConfig::default()
            .with_base_url(base_url)
            .with_step_period(Duration::from_millis(self.step_ms))
            .with_restart_delay(Duration::from_millis(self.restart_ms))
            .with_flash_duration(Duration::from_millis(self.flash_ms))
            .with_refresh_interval(Some(Duration::from_millis(self.refresh_ms)));
        config.request_timeout = Duration::from_millis(self.timeout_ms);
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { url, timing } => {
            let config = timing.config(&url);
            config.validate()?;
            let server = Arc::new(HttpGameServer::new(&config)?);
            log::info!("Watching {}", server.base_url());
            watch(server, config, timing.auto).await
        }
        Commands::Replay { frames, timing } => {
            let config = timing.config(DEFAULT_BASE_URL);
            config.validate()?;
            let server = Arc::new(ScriptedServer::from_file(&frames)?);
            log::info!(
                "Replaying {} frames from {}",
                server.frame_count(),
                frames.display()
            );
            watch(server, config, timing.auto).await
        }
        Commands::Snapshot { url, timeout_ms } => {
            let mut config = ViewerConfig::default()
                .with_base_url(url)
                .with_refresh_interval(None);
            config.request_timeout = Duration::from_millis(timeout_ms);
            config.validate()?;
            let server = Arc::new(HttpGameServer::new(&config)?);
            let visualizer = Visualizer::new(server, config);
            visualizer.refresh().await?;
            print!("{}", visualizer.with_view(render_text));
            Ok(())
        }
    }
}

async fn watch(server: Arc<dyn GameServer>, config: ViewerConfig, auto: bool) -> anyhow::Result<()> {
    let visualizer = Visualizer::mount(server, config).await;
    if auto {
        visualizer.toggle_auto_play();
    }
    run_front_end(visualizer).await
}

#[cfg(feature = "tui")]
async fn run_front_end(visualizer: Arc<Visualizer>) -> anyhow::Result<()> {
    tankview::ui::run(visualizer).await
}

/// Without a terminal UI, print every new render until the process is stopped.
#[cfg(not(feature = "tui"))]
async fn run_front_end(visualizer: Arc<Visualizer>) -> anyhow::Result<()> {
    let mut printed = 0;
    loop {
        let (renders, text) = visualizer.with_view(|view| (view.renders(), render_text(view)));
        if renders != printed {
            println!("{}", text);
            printed = renders;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
