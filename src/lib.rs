mod cell;
mod config;
mod controller;
mod domain;
mod logging;
pub mod server;
pub mod ui;
mod view;

pub use cell::*;
pub use config::*;
pub use controller::*;
pub use domain::*;
pub use logging::{init_logging, recent_logs, set_stderr_mirror, LOG_TAIL_CAPACITY};
pub use server::http::HttpGameServer;
pub use server::in_memory::ScriptedServer;
pub use server::{Command, GameServer};
pub use ui::{auto_play_label, legend_lines, render_text, UserAction};
pub use view::*;
