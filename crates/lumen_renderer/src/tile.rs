//! Tile generation and per-tile rendering.
//!
//! The image is divided into rectangular tiles that workers render
//! independently. Tiles are ordered center-out, the pattern production
//! renderers use so the interesting part of the image lands first.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::Camera;
use crate::integrator::Integrator;
use crate::material::Color;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    /// X coordinate of the tile's top-left corner
    pub x: u32,
    /// Y coordinate of the tile's top-left corner
    pub y: u32,
    /// Width of the tile in pixels
    pub width: u32,
    /// Height of the tile in pixels
    pub height: u32,
    /// Index of this tile in the render order
    pub index: usize,
}

impl Tile {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Total number of pixels in this tile.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Deterministic per-tile RNG seed derived from the master seed.
    ///
    /// Seeding by tile index rather than by worker makes the rendered
    /// image bit-identical for any worker count.
    pub fn rng(&self, master_seed: u64) -> StdRng {
        let mixed = master_seed ^ (self.index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        StdRng::seed_from_u64(mixed)
    }
}

/// Result of rendering a tile.
#[derive(Debug, Clone)]
pub struct TileResult {
    /// The tile that was rendered
    pub tile: Tile,
    /// Pixel colors in row-major order within the tile
    pub pixels: Vec<Color>,
}

/// Generate tiles covering a `width` x `height` image, sorted
/// center-out. Edge tiles are clipped so the cover is exact.
pub fn generate_tiles(width: u32, height: u32, tile_size: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let tw = tile_size.min(width - x);
            let th = tile_size.min(height - y);
            tiles.push(Tile::new(x, y, tw, th, 0));
            x += tile_size;
        }
        y += tile_size;
    }

    sort_center_out(&mut tiles, width, height);

    // Indices follow the final render order
    for (i, tile) in tiles.iter_mut().enumerate() {
        tile.index = i;
    }

    tiles
}

/// Sort tiles by distance of their center from the image center.
fn sort_center_out(tiles: &mut [Tile], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    tiles.sort_by(|a, b| {
        let a_dist = (a.x as f32 + a.width as f32 / 2.0 - center_x).powi(2)
            + (a.y as f32 + a.height as f32 / 2.0 - center_y).powi(2);
        let b_dist = (b.x as f32 + b.width as f32 / 2.0 - center_x).powi(2)
            + (b.y as f32 + b.height as f32 / 2.0 - center_y).powi(2);
        a_dist.partial_cmp(&b_dist).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render a single tile with its own deterministic generator.
///
/// Pixels come back in row-major order within the tile.
pub fn render_tile(
    tile: Tile,
    camera: &Camera,
    integrator: &Integrator<'_>,
    master_seed: u64,
) -> TileResult {
    let mut rng = tile.rng(master_seed);
    let mut pixels = Vec::with_capacity(tile.pixel_count() as usize);

    for local_y in 0..tile.height {
        for local_x in 0..tile.width {
            let color =
                integrator.render_pixel(camera, tile.x + local_x, tile.y + local_y, &mut rng);
            pixels.push(color);
        }
    }

    TileResult { tile, pixels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_tiles_exact_fit() {
        let tiles = generate_tiles(128, 128, 32);
        assert_eq!(tiles.len(), 16); // 4x4 grid

        let total_pixels: u32 = tiles.iter().map(|t| t.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_tiles_partial_fit() {
        let tiles = generate_tiles(100, 70, 32);
        assert_eq!(tiles.len(), 4 * 3); // remainders clipped, not dropped

        let total_pixels: u32 = tiles.iter().map(|t| t.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 70);
    }

    #[test]
    fn test_tiles_cover_every_pixel_once() {
        let tiles = generate_tiles(75, 53, 16);
        let mut seen = HashSet::new();
        for tile in &tiles {
            for dy in 0..tile.height {
                for dx in 0..tile.width {
                    assert!(
                        seen.insert((tile.x + dx, tile.y + dy)),
                        "pixel covered twice"
                    );
                }
            }
        }
        assert_eq!(seen.len(), 75 * 53);
    }

    #[test]
    fn test_center_out_order() {
        let tiles = generate_tiles(96, 96, 32);
        assert_eq!(tiles.len(), 9); // 3x3 grid

        // First tile is the center one, indices follow render order
        assert_eq!(tiles[0].x, 32);
        assert_eq!(tiles[0].y, 32);
        for (i, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.index, i);
        }
    }

    #[test]
    fn test_tile_smaller_than_size() {
        let tiles = generate_tiles(10, 10, 32);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].width, 10);
        assert_eq!(tiles[0].height, 10);
    }

    #[test]
    fn test_tile_rng_depends_on_index_and_seed() {
        use rand::RngCore;
        let a = Tile::new(0, 0, 8, 8, 0);
        let b = Tile::new(8, 0, 8, 8, 1);

        let mut r0 = a.rng(42);
        let mut r1 = b.rng(42);
        let mut r2 = a.rng(42);
        let mut r3 = a.rng(43);

        let x0 = r0.next_u64();
        assert_ne!(x0, r1.next_u64());
        assert_eq!(x0, r2.next_u64());
        assert_ne!(x0, r3.next_u64());
    }
}
