//! Radiance integrator.
//!
//! Recursive Monte Carlo path tracing with an explicit direct-lighting
//! term for point lights. The direct and indirect contributions are
//! blended by weights that fall linearly with the material's metallic
//! parameter: a mirror gets most of its energy from the reflected path,
//! a diffuse surface from the light loop.

use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

use crate::camera::Camera;
use crate::hittable::{HitRecord, Hittable};
use crate::material::Color;
use crate::renderer::RenderConfig;
use crate::sampling::random_in_unit_sphere;
use crate::scene::{Light, World};
use crate::stats::RenderStats;

/// Self-intersection guard for secondary and shadow rays.
const RAY_EPSILON: f32 = 1e-3;

/// Weight of the direct-lighting term for a given metallic value.
/// Diffuse (m=0) keeps all of it, a mirror (m=1) keeps 0.15.
#[inline]
fn direct_weight(metallic: f32) -> f32 {
    1.0 - 0.85 * metallic
}

/// Weight of the recursive reflection term. Rises to 0.85 for mirrors.
#[inline]
fn indirect_weight(metallic: f32) -> f32 {
    1.0 - 0.15 * metallic
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Per-render integrator state: borrows the world, lights, config and
/// shared counters for the duration of one render.
pub struct Integrator<'a> {
    world: &'a World,
    lights: &'a [Light],
    config: &'a RenderConfig,
    stats: &'a RenderStats,
}

impl<'a> Integrator<'a> {
    pub fn new(
        world: &'a World,
        lights: &'a [Light],
        config: &'a RenderConfig,
        stats: &'a RenderStats,
    ) -> Self {
        Self {
            world,
            lights,
            config,
            stats,
        }
    }

    /// Average `samples_per_pixel` jittered camera rays through (x, y).
    pub fn render_pixel(&self, camera: &Camera, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
        let mut color = Color::ZERO;
        for _ in 0..self.config.samples_per_pixel {
            let ray = camera.get_ray(x, y, rng);
            let sample = self.trace_ray(&ray, 0, rng);

            // A bad sample poisons the whole pixel average, so drop it.
            if sample.is_finite() {
                color += sample;
            } else {
                self.stats.record_degenerate_sample();
                log::debug!("non-finite radiance at pixel ({x}, {y}), sample dropped");
            }
        }
        self.stats.record_pixel();
        color / self.config.samples_per_pixel as f32
    }

    /// Trace one ray recursively. `depth` counts up from zero.
    pub fn trace_ray(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        if depth >= self.config.max_depth {
            return Color::ZERO;
        }

        if !ray.is_valid() {
            self.stats.record_degenerate_sample();
            log::debug!("degenerate ray {:?}, returning zero", ray.direction);
            return Color::ZERO;
        }

        self.stats.record_ray();

        let mut rec = HitRecord::default();
        if !self
            .world
            .hit(ray, Interval::new(RAY_EPSILON, f32::INFINITY), &mut rec)
        {
            return self.background(ray.direction);
        }

        let emitted = rec.material.emitted();
        let direct = self.direct_lighting(&rec, rng);

        let scatter = match rec.material.scatter(ray, &rec, rng) {
            Some(s) => s,
            // Absorbed: emitters and grazing metal end the path here.
            None => return emitted + direct,
        };

        let indirect = self.trace_ray(&scatter.scattered, depth + 1, rng);

        let m = rec.material.metallic();
        emitted
            + direct * direct_weight(m)
            + scatter.attenuation * indirect * indirect_weight(m)
    }

    /// Ambient plus the per-light Lambertian and Blinn-Phong terms.
    fn direct_lighting(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> Color {
        let albedo = rec.material.albedo();
        let metallic = rec.material.metallic();

        // Metals pick up less ambient and diffuse energy.
        let ambient_strength = lerp(self.config.ambient, self.config.ambient * 0.5, metallic);
        let mut total = Color::splat(ambient_strength);

        for light in self.lights {
            let to_light = light.position - rec.p;
            let distance = to_light.length();
            if distance < RAY_EPSILON {
                continue;
            }
            let light_dir = to_light / distance;

            let visibility = self.shadow_factor(rec.p, light_dir, distance, rng);
            if visibility <= 0.0 {
                continue;
            }

            let cos_theta = rec.normal.dot(light_dir).max(0.0);
            let intensity = cos_theta * light.intensity / (distance * distance);

            let diffuse_strength = lerp(0.25, 0.05, metallic);
            total += albedo * (diffuse_strength * intensity * visibility);

            if metallic > 0.5 {
                // Camera sits at the origin in the original shading
                // model; the view direction comes straight from the
                // hit point.
                let view_dir = (-rec.p).normalize();
                let half_dir = (light_dir + view_dir).normalize();
                let specular_power = lerp(32.0, 64.0, metallic);
                let specular = rec.normal.dot(half_dir).max(0.0).powf(specular_power);
                total += light.color * (specular * intensity * visibility * metallic * 3.0);
            }
        }

        total
    }

    /// Visibility of a light from `point` in [0, 1].
    ///
    /// A hard occlusion test runs first: if the direct path to the
    /// light is blocked the point is fully shadowed. Otherwise, when
    /// soft shadows are on, visibility is the surviving fraction of
    /// perturbed shadow rays, which softens penumbra edges.
    fn shadow_factor(
        &self,
        point: Vec3,
        light_dir: Vec3,
        light_distance: f32,
        rng: &mut dyn RngCore,
    ) -> f32 {
        let mut rec = HitRecord::default();
        let interval = Interval::new(RAY_EPSILON, light_distance);

        self.stats.record_shadow_ray();
        if self
            .world
            .hit(&Ray::new(point, light_dir), interval, &mut rec)
        {
            return 0.0;
        }

        if !self.config.soft_shadows || self.config.soft_shadow_samples == 0 {
            return 1.0;
        }

        let samples = self.config.soft_shadow_samples;
        let mut unoccluded = 0u32;
        for _ in 0..samples {
            let jittered = (light_dir + random_in_unit_sphere(rng) * 0.1).normalize();
            self.stats.record_shadow_ray();
            if !self
                .world
                .hit(&Ray::new(point, jittered), interval, &mut rec)
            {
                unoccluded += 1;
            }
        }

        unoccluded as f32 / samples as f32
    }

    /// Radiance for rays that leave the scene.
    fn background(&self, direction: Vec3) -> Color {
        if self.config.sky_gradient {
            let unit = direction.normalize_or_zero();
            let t = 0.5 * (unit.y + 1.0);
            Color::ONE * (1.0 - t) + Color::new(0.5, 0.7, 1.0) * t
        } else {
            self.config.background
        }
    }
}
