//! Render facade: configuration, image buffer and the tile pipeline.

use lumen_scene::SceneDesc;
use thiserror::Error;

use crate::integrator::Integrator;
use crate::material::Color;
use crate::pool::{self, CancelToken};
use crate::scene::build_world;
use crate::stats::{RenderStats, StatsSnapshot};
use crate::tile::{generate_tiles, TileResult};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 32;

/// Errors that can abort a render before or during setup.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),
    #[error("scene contains no renderable objects")]
    EmptyScene,
    #[error("invalid scene object: {0}")]
    InvalidObject(String),
}

/// Render settings.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Monte Carlo samples per pixel
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Tile edge length in pixels
    pub tile_size: u32,
    /// Number of worker threads
    pub workers: usize,
    /// Average perturbed shadow rays for penumbra edges
    pub soft_shadows: bool,
    /// Shadow rays per soft-shadow estimate
    pub soft_shadow_samples: u32,
    /// Base ambient strength for diffuse surfaces
    pub ambient: f32,
    /// Radiance for rays that leave the scene
    pub background: Color,
    /// Use a vertical sky gradient instead of the flat background
    pub sky_gradient: bool,
    /// Master seed; fixed seed gives bit-identical output for any
    /// worker count
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            tile_size: DEFAULT_TILE_SIZE,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            soft_shadows: true,
            soft_shadow_samples: 16,
            ambient: 0.1,
            background: Color::ZERO,
            sky_gradient: false,
            seed: 42,
        }
    }
}

impl RenderConfig {
    /// Check the configuration against an output resolution.
    pub fn validate(&self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image dimensions must be positive, got {width}x{height}"
            )));
        }
        if self.tile_size == 0 {
            return Err(RenderError::InvalidConfig(
                "tile size must be positive".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(RenderError::InvalidConfig(
                "worker count must be positive".to_string(),
            ));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples per pixel must be positive".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(RenderError::InvalidConfig(
                "max depth must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Linear radiance image. Stays linear; tone mapping happens only on
/// the way out through `to_rgba`.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a buffer filled with `fill`.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a finished tile into the buffer at its offset.
    pub fn write_tile(&mut self, result: &TileResult) {
        let tile = result.tile;
        for local_y in 0..tile.height {
            for local_x in 0..tile.width {
                let color = result.pixels[(local_y * tile.width + local_x) as usize];
                self.set(tile.x + local_x, tile.y + local_y, color);
            }
        }
    }

    /// Tone-map to 8-bit RGBA: exposure, gamma 2.2, clamp.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            for channel in [pixel.x, pixel.y, pixel.z] {
                let exposed = 1.0 - (-channel.max(0.0)).exp();
                let gamma = exposed.powf(1.0 / 2.2);
                out.push((gamma.clamp(0.0, 1.0) * 255.0) as u8);
            }
            out.push(255);
        }
        out
    }
}

/// Result of a render, successful or cancelled.
pub struct RenderOutcome {
    /// Linear radiance buffer; on cancellation, unrendered tiles keep
    /// the background fill
    pub image: ImageBuffer,
    /// Whether the render was cancelled before completing
    pub cancelled: bool,
    pub completed_tiles: usize,
    pub total_tiles: usize,
}

/// Tile-parallel renderer.
pub struct Renderer {
    config: RenderConfig,
    stats: RenderStats,
    cancel: CancelToken,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            stats: RenderStats::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Token that cancels this renderer's in-flight render.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Snapshot of the render counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Render a scene description to a linear radiance buffer.
    pub fn render(
        &self,
        desc: &SceneDesc,
        width: u32,
        height: u32,
    ) -> Result<RenderOutcome, RenderError> {
        self.config.validate(width, height)?;
        let scene = build_world(desc)?;

        let mut camera = scene.camera.clone().with_resolution(width, height);
        camera.initialize();

        let tiles = generate_tiles(width, height, self.config.tile_size);
        self.stats.set_total_tiles(tiles.len());

        log::info!(
            "rendering {}x{} ({} tiles, {} workers, {} spp)",
            width,
            height,
            tiles.len(),
            self.config.workers,
            self.config.samples_per_pixel
        );

        let mut buffer = ImageBuffer::new(width, height, self.config.background);
        let integrator =
            Integrator::new(&scene.world, &scene.lights, &self.config, &self.stats);

        pool::render_tiles(
            &tiles,
            &camera,
            &integrator,
            self.config.workers,
            self.config.seed,
            &self.cancel,
            |result| {
                buffer.write_tile(&result);
                self.stats.record_tile_completed();
            },
        );

        let completed = self.stats.completed_tiles();
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            log::info!("render cancelled after {}/{} tiles", completed, tiles.len());
        } else {
            let snap = self.stats.snapshot();
            log::info!(
                "render finished: {} rays in {:.2}s ({:.0} rays/s)",
                snap.rays,
                snap.elapsed_secs,
                snap.rays_per_sec
            );
        }

        Ok(RenderOutcome {
            image: buffer,
            cancelled,
            completed_tiles: completed,
            total_tiles: tiles.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Vec3;
    use lumen_scene::parse_scene;

    const SCENE: &str = r#"{
        "camera": { "position": [0, 0, 5], "lookAt": [0, 0, 0], "fov": 60 },
        "objects": [
            {
                "type": "sphere",
                "position": [0, 0, 0],
                "radius": 1.0,
                "material": { "type": "lambertian", "color": [0.7, 0.3, 0.3] }
            },
            {
                "type": "plane",
                "point": [0, -1, 0],
                "normal": [0, 1, 0],
                "material": { "type": "lambertian", "color": [0.5, 0.5, 0.5] }
            }
        ],
        "lights": [
            { "position": [5, 10, 5], "color": [1, 1, 1], "intensity": 100 }
        ]
    }"#;

    fn fast_config(workers: usize) -> RenderConfig {
        RenderConfig {
            samples_per_pixel: 2,
            max_depth: 4,
            tile_size: 16,
            workers,
            soft_shadows: false,
            seed: 7,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let config = RenderConfig::default();
        assert!(config.validate(0, 100).is_err());
        assert!(config.validate(100, 0).is_err());
        assert!(config.validate(100, 100).is_ok());

        let mut config = RenderConfig::default();
        config.tile_size = 0;
        assert!(config.validate(100, 100).is_err());

        let mut config = RenderConfig::default();
        config.workers = 0;
        assert!(config.validate(100, 100).is_err());
    }

    #[test]
    fn test_render_completes_all_tiles() {
        let desc = parse_scene(SCENE).unwrap();
        let renderer = Renderer::new(fast_config(2));
        let outcome = renderer.render(&desc, 48, 32).unwrap();

        assert!(!outcome.cancelled);
        assert_eq!(outcome.completed_tiles, outcome.total_tiles);
        assert_eq!(outcome.image.width(), 48);
        assert_eq!(outcome.image.height(), 32);

        let stats = renderer.stats();
        assert_eq!(stats.pixels, 48 * 32);
        assert!(stats.rays > 0);
    }

    #[test]
    fn test_deterministic_across_worker_counts() {
        let desc = parse_scene(SCENE).unwrap();

        let render_with = |workers: usize| {
            Renderer::new(fast_config(workers))
                .render(&desc, 40, 24)
                .unwrap()
        };

        let one = render_with(1);
        let two = render_with(2);
        let four = render_with(4);

        for y in 0..24 {
            for x in 0..40 {
                let p = one.image.get(x, y);
                assert_eq!(p, two.image.get(x, y), "mismatch at ({x}, {y})");
                assert_eq!(p, four.image.get(x, y), "mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_cancelled_render_is_consistent() {
        let desc = parse_scene(SCENE).unwrap();
        let renderer = Renderer::new(fast_config(2));
        renderer.cancel_token().cancel();

        let outcome = renderer.render(&desc, 64, 64).unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.completed_tiles, 0);
        // Untouched pixels keep the background fill.
        assert_eq!(outcome.image.get(0, 0), Vec3::ZERO);
    }

    #[test]
    fn test_image_buffer_roundtrip() {
        let mut buffer = ImageBuffer::new(4, 4, Color::ZERO);
        buffer.set(2, 1, Color::new(1.0, 0.5, 0.25));
        assert_eq!(buffer.get(2, 1), Color::new(1.0, 0.5, 0.25));
        assert_eq!(buffer.get(0, 0), Color::ZERO);
    }

    #[test]
    fn test_to_rgba_maps_extremes() {
        let mut buffer = ImageBuffer::new(2, 1, Color::ZERO);
        buffer.set(1, 0, Color::splat(100.0));
        let rgba = buffer.to_rgba();
        assert_eq!(rgba.len(), 8);
        // Black stays black, huge radiance saturates near white.
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert!(rgba[4] > 250);
        assert_eq!(rgba[7], 255);
    }
}
