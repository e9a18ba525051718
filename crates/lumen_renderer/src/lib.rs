//! Lumen - CPU path tracing core.
//!
//! A tile-parallel Monte Carlo path tracer: a fixed pool of worker
//! threads pulls image tiles from a bounded queue, integrates radiance
//! per pixel over a BVH-accelerated scene, and an aggregator assembles
//! the tile results into the final linear-radiance image buffer.

mod bvh;
mod camera;
mod hittable;
mod integrator;
mod material;
mod mesh;
mod plane;
mod pool;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod stats;
mod tile;
mod triangle;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use integrator::Integrator;
pub use material::{
    Clearcoat, Color, Dielectric, DiffuseLight, Lambertian, Material, Metal, ScatterResult,
};
pub use mesh::Mesh;
pub use plane::Plane;
pub use pool::CancelToken;
pub use renderer::{
    ImageBuffer, RenderConfig, RenderError, RenderOutcome, Renderer, DEFAULT_TILE_SIZE,
};
pub use scene::{build_world, BuiltScene, Light, World};
pub use sphere::Sphere;
pub use stats::{RenderStats, StatsSnapshot};
pub use tile::{generate_tiles, Tile, TileResult};
pub use triangle::Triangle;

/// Re-export math types used throughout the public API.
pub use lumen_math::{Aabb, Interval, Ray, Vec3};
