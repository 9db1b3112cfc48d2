//! Command-line options.

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// Log levels accepted by `--log-level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Render a scene of spheres to an image.
///
/// Values given here override the scene file, which overrides the built-in
/// defaults.
#[derive(Debug, Parser)]
#[command(name = "glint", version, about = "A small Monte Carlo path tracer for sphere scenes")]
pub struct Args {
    /// Scene description (JSON); the built-in demo scene is used when omitted
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Output image (.png or .ppm)
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Bounce bound (a path scatters at most depth + 1 times)
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Seed for the random source
    #[arg(long)]
    pub seed: Option<u64>,

    /// Tile edge length for parallel rendering
    #[arg(long)]
    pub bucket_size: Option<u32>,

    /// Render on a single thread
    #[arg(long)]
    pub serial: bool,

    /// Log progress every 10%
    #[arg(long)]
    pub progress: bool,

    /// Logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["glint"]).unwrap();

        assert_eq!(args.output, PathBuf::from("output.png"));
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(args.scene.is_none());
        assert!(args.samples.is_none());
        assert!(!args.serial);
    }

    #[test]
    fn test_overrides_parse() {
        let args = Args::try_parse_from([
            "glint", "--width", "320", "--height", "180", "-s", "8", "-d", "4", "--seed", "42",
            "--serial", "--log-level", "debug", "-o", "out.ppm",
        ])
        .unwrap();

        assert_eq!(args.width, Some(320));
        assert_eq!(args.height, Some(180));
        assert_eq!(args.samples, Some(8));
        assert_eq!(args.depth, Some(4));
        assert_eq!(args.seed, Some(42));
        assert!(args.serial);
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
        assert_eq!(args.output, PathBuf::from("out.ppm"));
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Args::try_parse_from(["glint", "--log-level", "loud"]).is_err());
    }
}
