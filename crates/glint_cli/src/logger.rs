use anyhow::{Context, Result};
use glint_renderer::Progress;
use log::LevelFilter;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

/// Initialize the logger with the specified level, optionally writing to a file.
///
/// `RUST_LOG` is still honored for per-module filters.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Logger already initialized")?;
    Ok(())
}

/// Logs render progress each time another tenth of the image is done.
#[derive(Debug, Default)]
pub struct LogProgress {
    last_decile: AtomicU32,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for LogProgress {
    fn report(&self, percent: f32) {
        let decile = (percent / 10.0).clamp(0.0, 10.0) as u32;
        // Reports can arrive out of order from worker threads
        if self.last_decile.fetch_max(decile, Ordering::Relaxed) < decile {
            log::info!("{}% done", decile * 10);
        }
    }
}
