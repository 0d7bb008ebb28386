use std::collections::VecDeque;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use log::{self, LevelFilter, Metadata, Record};

/// Number of recent log lines kept for display.
pub const LOG_TAIL_CAPACITY: usize = 64;

struct TailLogger {
    tail: Mutex<VecDeque<String>>,
    mirror: AtomicBool,
}

impl log::Log for TailLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("{} - {}", record.level(), record.args());
        if self.mirror.load(Ordering::Relaxed) {
            eprintln!("{}", line);
        }
        let mut tail = self.tail.lock().unwrap_or_else(|e| e.into_inner());
        if tail.len() == LOG_TAIL_CAPACITY {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    fn flush(&self) {}
}

static LOGGER: TailLogger = TailLogger {
    tail: Mutex::new(VecDeque::new()),
    mirror: AtomicBool::new(true),
};

/// Initialize logging with a level taken from the `TANKVIEW_LOG` environment variable.
/// Defaults to `info` if the variable is not set or invalid.
pub fn init_logging() {
    let level = env::var("TANKVIEW_LOG")
        .ok()
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(LevelFilter::Info);
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(level));
}

/// Stop or resume echoing log lines to stderr. The terminal UI turns this
/// off while it owns the screen.
pub fn set_stderr_mirror(enabled: bool) {
    LOGGER.mirror.store(enabled, Ordering::Relaxed);
}

/// The last `count` log lines, oldest first.
pub fn recent_logs(count: usize) -> Vec<String> {
    let tail = LOGGER.tail.lock().unwrap_or_else(|e| e.into_inner());
    let skip = tail.len().saturating_sub(count);
    tail.iter().skip(skip).cloned().collect()
}
