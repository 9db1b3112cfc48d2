mod cli;
mod logger;
mod output;
mod scene_file;

use anyhow::Result;
use clap::Parser;
use cli::Args;
use glint_renderer::{render, render_parallel, NoProgress, Progress};
use logger::{init_logger, LogProgress};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scene_file::SceneFile;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into(), args.log_file.as_deref())?;

    log::info!("Starting Glint {}", env!("CARGO_PKG_VERSION"));

    // Reject unsupported output paths before rendering
    output::format_for_path(&args.output)?;

    let scene_file = match &args.scene {
        Some(path) => SceneFile::load(path)?,
        None => {
            log::info!("No scene file given, using the demo scene");
            SceneFile::default()
        }
    };
    let setup = scene_file.into_setup(&args)?;

    let log_progress = LogProgress::new();
    let progress: &dyn Progress = if args.progress { &log_progress } else { &NoProgress };

    let image = if args.serial {
        let mut rng = StdRng::seed_from_u64(setup.config.seed);
        render(&setup.camera, &setup.scene, &setup.config, &mut rng, progress)?
    } else {
        render_parallel(&setup.camera, &setup.scene, &setup.config, progress)?
    };

    output::save_image(&image, &args.output)?;
    Ok(())
}
