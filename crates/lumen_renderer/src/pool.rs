//! Fixed-size worker pool over a bounded tile queue.
//!
//! Scoped threads pull tiles from a bounded channel and push finished
//! tiles into a bounded result channel that the caller drains. Both
//! queues have capacity `2 * workers`, so a stalled consumer applies
//! backpressure to the producer instead of letting results pile up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::camera::Camera;
use crate::integrator::Integrator;
use crate::tile::{render_tile, Tile, TileResult};

/// Shared cancellation flag. Cloning shares the same flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Render `tiles` on `workers` threads, invoking `on_result` on the
/// calling thread for each finished tile, in completion order.
///
/// Every tile is rendered at most once. On cancellation the producer
/// stops feeding the queue and workers drain what is already queued
/// without rendering it; tiles already completed still reach
/// `on_result`, so the caller's buffer never holds a partial tile.
pub(crate) fn render_tiles<F>(
    tiles: &[Tile],
    camera: &Camera,
    integrator: &Integrator<'_>,
    workers: usize,
    master_seed: u64,
    cancel: &CancelToken,
    mut on_result: F,
) where
    F: FnMut(TileResult),
{
    let queue_capacity = 2 * workers;
    let (job_tx, job_rx) = sync_channel::<Tile>(queue_capacity);
    let (result_tx, result_rx) = sync_channel::<TileResult>(queue_capacity);

    // mpsc receivers are single-consumer; the mutex turns the job
    // queue into a shared work source.
    let job_rx = Arc::new(Mutex::new(job_rx));

    thread::scope(|scope| {
        // Producer: feeds the bounded queue, backing off when full so
        // cancellation is noticed even against a stalled pool.
        scope.spawn(move || {
            'feed: for &tile in tiles {
                if cancel.is_cancelled() {
                    break;
                }
                let mut pending = tile;
                loop {
                    match job_tx.try_send(pending) {
                        Ok(()) => break,
                        Err(TrySendError::Full(t)) => {
                            if cancel.is_cancelled() {
                                break 'feed;
                            }
                            pending = t;
                            thread::sleep(Duration::from_millis(1));
                        }
                        Err(TrySendError::Disconnected(_)) => break 'feed,
                    }
                }
            }
            // job_tx drops here, closing the queue
        });

        for _ in 0..workers {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                loop {
                    let tile = {
                        let guard = match job_rx.lock() {
                            Ok(guard) => guard,
                            Err(_) => break,
                        };
                        match guard.recv() {
                            Ok(tile) => tile,
                            Err(_) => break,
                        }
                        // guard drops here so other workers can pull
                        // while this one renders
                    };

                    if cancel.is_cancelled() {
                        continue;
                    }

                    let result = render_tile(tile, camera, integrator, master_seed);
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });
        }

        // The workers hold clones; dropping ours lets the result
        // stream end when the last worker exits.
        drop(result_tx);

        for result in result_rx.iter() {
            on_result(result);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RenderConfig;
    use crate::scene::build_world;
    use crate::stats::RenderStats;
    use crate::tile::generate_tiles;
    use lumen_scene::parse_scene;
    use std::collections::HashSet;

    fn tiny_scene() -> crate::scene::BuiltScene {
        build_world(
            &parse_scene(
                r#"{
                    "camera": { "position": [0, 0, 5], "lookAt": [0, 0, 0] },
                    "objects": [
                        {
                            "type": "sphere",
                            "position": [0, 0, 0],
                            "radius": 1.0,
                            "material": { "type": "lambertian", "color": [0.5, 0.5, 0.5] }
                        }
                    ],
                    "lights": [
                        { "position": [0, 10, 0], "color": [1, 1, 1], "intensity": 50 }
                    ]
                }"#,
            )
            .unwrap(),
        )
        .unwrap()
    }

    fn tiny_config() -> RenderConfig {
        RenderConfig {
            samples_per_pixel: 1,
            max_depth: 2,
            soft_shadows: false,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_every_tile_rendered_exactly_once() {
        let scene = tiny_scene();
        let mut camera = scene.camera.clone().with_resolution(64, 48);
        camera.initialize();
        let config = tiny_config();
        let stats = RenderStats::new();
        let integrator = Integrator::new(&scene.world, &scene.lights, &config, &stats);

        let tiles = generate_tiles(64, 48, 16);
        let expected = tiles.len();
        let cancel = CancelToken::new();

        let mut seen = HashSet::new();
        render_tiles(&tiles, &camera, &integrator, 4, 42, &cancel, |result| {
            assert!(seen.insert(result.tile.index), "tile delivered twice");
            assert_eq!(
                result.pixels.len(),
                result.tile.pixel_count() as usize
            );
        });
        assert_eq!(seen.len(), expected);
    }

    #[test]
    fn test_single_worker_works() {
        let scene = tiny_scene();
        let mut camera = scene.camera.clone().with_resolution(32, 32);
        camera.initialize();
        let config = tiny_config();
        let stats = RenderStats::new();
        let integrator = Integrator::new(&scene.world, &scene.lights, &config, &stats);

        let tiles = generate_tiles(32, 32, 16);
        let cancel = CancelToken::new();

        let mut count = 0;
        render_tiles(&tiles, &camera, &integrator, 1, 42, &cancel, |_| count += 1);
        assert_eq!(count, 4);
    }

    #[test]
    fn test_pre_cancelled_renders_nothing() {
        let scene = tiny_scene();
        let mut camera = scene.camera.clone().with_resolution(64, 64);
        camera.initialize();
        let config = tiny_config();
        let stats = RenderStats::new();
        let integrator = Integrator::new(&scene.world, &scene.lights, &config, &stats);

        let tiles = generate_tiles(64, 64, 16);
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut count = 0;
        render_tiles(&tiles, &camera, &integrator, 2, 42, &cancel, |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
