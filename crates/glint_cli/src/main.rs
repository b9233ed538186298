use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glint_core::{load_scene, Scene};
use glint_renderer::{render, render_sequential, save_image, RenderConfig};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "glint")]
#[command(about = "A Whitted-style ray tracer with mirror reflections and hard shadows")]
struct Args {
    /// JSON scene file (renders the built-in reference scene when omitted)
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value = "1024")]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "768")]
    height: u32,

    /// Output file path (.ppm is written as binary PPM, other extensions by format)
    #[arg(short, long, default_value = "output.ppm")]
    output: PathBuf,

    /// Worker threads for parallel rendering
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Render on the calling thread, pixel by pixel
    #[arg(long)]
    sequential: bool,
}

fn load_scene_file(path: &Path) -> Result<(Scene, RenderConfig)> {
    load_scene(path).with_context(|| format!("Failed to load scene file {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    log::info!("Starting glint");

    let (scene, mut config) = match &args.scene {
        Some(path) => load_scene_file(path)?,
        None => {
            log::info!("No scene file given, using the reference scene");
            (Scene::reference(), RenderConfig::default())
        }
    };

    if args.threads.is_some() {
        config.threads = args.threads;
    }

    let result = if args.sequential {
        render_sequential(&scene, args.width, args.height, &config)
    } else {
        render(&scene, args.width, args.height, &config)
    };
    let output = result.context("Render failed")?;

    save_image(&args.output, &output.image)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    Ok(())
}
