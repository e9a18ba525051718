//! Minimal render without the CLI: builds a scene in code, renders it
//! and prints the stats.
//!
//! Run with: cargo run --release --example simple_render

use lumen_renderer::{RenderConfig, Renderer};
use lumen_scene::parse_scene;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let scene = parse_scene(
        r#"{
            "name": "three spheres",
            "camera": { "position": [0, 2, 6], "lookAt": [0, 0.5, 0], "fov": 50 },
            "objects": [
                {
                    "type": "plane",
                    "point": [0, 0, 0],
                    "normal": [0, 1, 0],
                    "material": { "type": "lambertian", "color": [0.5, 0.5, 0.5] }
                },
                {
                    "type": "sphere",
                    "position": [-2, 1, 0],
                    "radius": 1.0,
                    "material": { "type": "lambertian", "color": [0.7, 0.3, 0.3] }
                },
                {
                    "type": "sphere",
                    "position": [0, 1, 0],
                    "radius": 1.0,
                    "material": { "type": "metal", "color": [0.9, 0.9, 0.9], "roughness": 0.05 }
                },
                {
                    "type": "sphere",
                    "position": [2, 1, 0],
                    "radius": 1.0,
                    "material": { "type": "dielectric", "refractionIndex": 1.5 }
                }
            ],
            "lights": [
                { "position": [5, 10, 5], "color": [1, 1, 1], "intensity": 150 }
            ]
        }"#,
    )?;

    let config = RenderConfig {
        samples_per_pixel: 25,
        max_depth: 10,
        ..RenderConfig::default()
    };

    let renderer = Renderer::new(config);
    let outcome = renderer.render(&scene, 400, 225)?;

    let stats = renderer.stats();
    println!(
        "rendered {}x{} in {:.2}s",
        outcome.image.width(),
        outcome.image.height(),
        stats.elapsed_secs
    );
    println!(
        "  {} rays ({:.0}/s), {} shadow rays, {} tiles",
        stats.rays, stats.rays_per_sec, stats.shadow_rays, outcome.total_tiles
    );

    // Sample the center pixel so the example has visible output even
    // without writing a file.
    let center = outcome.image.get(200, 112);
    println!("  center pixel radiance: {center}");

    Ok(())
}
