//! Render statistics shared across worker threads.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Counters updated by workers during a render. All relaxed atomics;
/// the numbers feed logs and progress reporting, not control flow.
pub struct RenderStats {
    rays: AtomicU64,
    shadow_rays: AtomicU64,
    pixels: AtomicU64,
    degenerate_samples: AtomicU64,
    completed_tiles: AtomicUsize,
    total_tiles: AtomicUsize,
    started: Instant,
}

impl RenderStats {
    pub fn new() -> Self {
        Self {
            rays: AtomicU64::new(0),
            shadow_rays: AtomicU64::new(0),
            pixels: AtomicU64::new(0),
            degenerate_samples: AtomicU64::new(0),
            completed_tiles: AtomicUsize::new(0),
            total_tiles: AtomicUsize::new(0),
            started: Instant::now(),
        }
    }

    #[inline]
    pub fn record_ray(&self) {
        self.rays.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_shadow_ray(&self) {
        self.shadow_rays.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_pixel(&self) {
        self.pixels.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_degenerate_sample(&self) {
        self.degenerate_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tile_completed(&self) {
        self.completed_tiles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_total_tiles(&self, total: usize) {
        self.total_tiles.store(total, Ordering::Relaxed);
    }

    pub fn completed_tiles(&self) -> usize {
        self.completed_tiles.load(Ordering::Relaxed)
    }

    /// Take a consistent-enough snapshot for reporting.
    pub fn snapshot(&self) -> StatsSnapshot {
        let elapsed = self.started.elapsed().as_secs_f64();
        let rays = self.rays.load(Ordering::Relaxed);
        let pixels = self.pixels.load(Ordering::Relaxed);

        StatsSnapshot {
            rays,
            shadow_rays: self.shadow_rays.load(Ordering::Relaxed),
            pixels,
            degenerate_samples: self.degenerate_samples.load(Ordering::Relaxed),
            completed_tiles: self.completed_tiles.load(Ordering::Relaxed),
            total_tiles: self.total_tiles.load(Ordering::Relaxed),
            elapsed_secs: elapsed,
            rays_per_sec: if elapsed > 0.0 { rays as f64 / elapsed } else { 0.0 },
            pixels_per_sec: if elapsed > 0.0 { pixels as f64 / elapsed } else { 0.0 },
        }
    }
}

impl Default for RenderStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Copy)]
pub struct StatsSnapshot {
    pub rays: u64,
    pub shadow_rays: u64,
    pub pixels: u64,
    pub degenerate_samples: u64,
    pub completed_tiles: usize,
    pub total_tiles: usize,
    pub elapsed_secs: f64,
    pub rays_per_sec: f64,
    pub pixels_per_sec: f64,
}
