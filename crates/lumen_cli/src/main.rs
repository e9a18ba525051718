//! Command-line renderer.
//!
//! Usage: lumen <scene.json> <output.png> <width> <height>

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use lumen_renderer::{RenderConfig, Renderer};
use lumen_scene::load_scene;

struct Args {
    scene: PathBuf,
    output: PathBuf,
    width: u32,
    height: u32,
}

fn parse_args() -> Result<Args> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 4 {
        bail!(
            "usage: lumen <scene_file> <output_file> <width> <height>\n\
             example: lumen scene.json output.png 800 600"
        );
    }

    let width: u32 = args[2]
        .parse()
        .with_context(|| format!("invalid width: {}", args[2]))?;
    let height: u32 = args[3]
        .parse()
        .with_context(|| format!("invalid height: {}", args[3]))?;

    let mut output = PathBuf::from(&args[1]);
    if output.extension().is_none() {
        output.set_extension("png");
    }

    Ok(Args {
        scene: PathBuf::from(&args[0]),
        output,
        width,
        height,
    })
}

fn run() -> Result<()> {
    let args = parse_args()?;

    let scene = load_scene(&args.scene)
        .with_context(|| format!("failed to load scene {}", args.scene.display()))?;
    log::info!("loaded scene '{}' from {}", scene.name, args.scene.display());

    let renderer = Renderer::new(RenderConfig::default());
    let outcome = renderer
        .render(&scene, args.width, args.height)
        .context("render failed")?;

    let rgba = outcome.image.to_rgba();
    image::save_buffer(
        &args.output,
        &rgba,
        args.width,
        args.height,
        image::ColorType::Rgba8,
    )
    .with_context(|| format!("failed to write {}", args.output.display()))?;

    let stats = renderer.stats();
    log::info!(
        "wrote {} ({} rays in {:.2}s, {:.0} rays/s)",
        args.output.display(),
        stats.rays,
        stats.elapsed_secs,
        stats.rays_per_sec
    );

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
