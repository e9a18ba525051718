//! Material capability consumed by the integrator.
//!
//! The set of materials is closed: diffuse, metal, dielectric, emissive
//! and the clearcoat composite. Scenes hold them behind `Arc<dyn
//! Material>` so primitives of any kind can share one instance; all
//! materials are stateless with respect to render state and safe for
//! concurrent read-only use.

use std::sync::Arc;

use lumen_math::{Ray, Vec3};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, random_in_unit_sphere, random_unit_vector, reflect, refract};

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// Outcome of a successful scatter: the continuation ray and the color
/// attenuation it carries.
pub struct ScatterResult {
    pub scattered: Ray,
    pub attenuation: Color,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed (pure emitters, grazing
    /// metal). Randomness comes from the caller's generator so renders
    /// stay reproducible.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;

    /// Light emitted by this material. Most materials emit nothing.
    fn emitted(&self) -> Color {
        Color::ZERO
    }

    /// Base color used by the direct-lighting term.
    fn albedo(&self) -> Color {
        Color::ZERO
    }

    /// Metallic parameter in [0, 1]; drives the direct/indirect blend
    /// and the specular highlight in direct lighting.
    fn metallic(&self) -> f32 {
        0.0
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        // Scatter in a random direction on the hemisphere around the normal
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            scattered: Ray::new(rec.p, scatter_direction),
            attenuation: self.albedo,
        })
    }

    fn albedo(&self) -> Color {
        self.albedo
    }
}

/// Metal (specular) material with a Fresnel-tinted attenuation.
pub struct Metal {
    albedo: Color,
    roughness: f32,
    metallic: f32,
    ior: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `roughness`: 0.0 = perfect mirror, 1.0 = very rough
    /// - `metallic`: 0.0 = dielectric-like, 1.0 = pure reflector
    pub fn new(albedo: Color, roughness: f32, metallic: f32) -> Self {
        Self {
            albedo,
            roughness: roughness.clamp(0.0, 1.0),
            metallic: metallic.clamp(0.0, 1.0),
            ior: 1.5,
        }
    }

    /// Schlick approximation of the Fresnel reflectance at this angle.
    fn fresnel(&self, cos_theta: f32) -> Color {
        let f0 = ((self.ior - 1.0) / (self.ior + 1.0)).powi(2);
        let schlick = f0 + (1.0 - f0) * (1.0 - cos_theta).powi(5);
        Color::splat(schlick)
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let unit_direction = ray_in.direction.normalize();
        let mut reflected = reflect(unit_direction, rec.normal);

        if self.roughness > 0.001 {
            reflected = (reflected + self.roughness * random_in_unit_sphere(rng)).normalize();
        }

        // Only scatter when the reflected ray leaves the surface
        if reflected.dot(rec.normal) <= 0.0 {
            return None;
        }

        // Blend the base color toward the Fresnel reflectance; stronger
        // for more metallic surfaces.
        let cos_theta = unit_direction.dot(rec.normal).abs();
        let fresnel = self.fresnel(cos_theta);
        let strength = 0.6 + 0.4 * self.metallic;
        let attenuation = (self.albedo * (1.0 - strength) + fresnel * strength)
            .clamp(Vec3::ZERO, Vec3::ONE);

        Some(ScatterResult {
            scattered: Ray::new(rec.p, reflected),
            attenuation,
        })
    }

    fn albedo(&self) -> Color {
        self.albedo
    }

    fn metallic(&self) -> f32 {
        self.metallic
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    /// Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    ior: f32,
    tint: Color,
}

impl Dielectric {
    pub fn new(ior: f32) -> Self {
        Self {
            ior,
            tint: Color::ONE,
        }
    }

    /// Colored glass: attenuation picks up the tint on every bounce.
    pub fn with_tint(ior: f32, tint: Color) -> Self {
        Self { ior, tint }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction.normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction =
            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
                reflect(unit_direction, rec.normal)
            } else {
                refract(unit_direction, rec.normal, refraction_ratio)
            };

        Some(ScatterResult {
            scattered: Ray::new(rec.p, direction),
            attenuation: self.tint,
        })
    }

    fn albedo(&self) -> Color {
        self.tint
    }
}

/// Diffuse light emitter.
pub struct DiffuseLight {
    emit: Color,
}

impl DiffuseLight {
    pub fn new(emit: Color) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self) -> Color {
        self.emit
    }
}

/// Composite material: a specular coat layered over a base material.
///
/// The coat contributes a Schlick-weighted mirror lobe blended with the
/// base scatter by `strength`.
pub struct Clearcoat {
    base: Arc<dyn Material>,
    strength: f32,
    roughness: f32,
    ior: f32,
}

impl Clearcoat {
    pub fn new(base: Arc<dyn Material>, strength: f32, roughness: f32) -> Self {
        Self {
            base,
            strength: strength.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            ior: 1.5,
        }
    }
}

impl Material for Clearcoat {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let base = self.base.scatter(ray_in, rec, rng)?;

        let unit_direction = ray_in.direction.normalize();
        let mut reflected = reflect(unit_direction, rec.normal);
        if self.roughness > 0.0 {
            reflected = (reflected + self.roughness * random_in_unit_sphere(rng)).normalize();
        }

        let cos_theta = unit_direction.dot(rec.normal).abs();
        let f0 = ((self.ior - 1.0) / (self.ior + 1.0)).powi(2);
        let schlick = f0 + (1.0 - f0) * (1.0 - cos_theta).powi(5);
        let coat_attenuation = Color::splat(schlick);

        // Blend the coat into the base attenuation; follow the coat's
        // mirror direction when it dominates, otherwise the base lobe.
        let attenuation = base.attenuation * (1.0 - self.strength) + coat_attenuation * self.strength;
        let scattered = if gen_f32(rng) < self.strength && reflected.dot(rec.normal) > 0.0 {
            Ray::new(rec.p, reflected)
        } else {
            base.scattered
        };

        Some(ScatterResult {
            scattered,
            attenuation,
        })
    }

    fn albedo(&self) -> Color {
        self.base.albedo()
    }

    fn metallic(&self) -> f32 {
        // The coat makes the surface behave more like a reflector.
        self.base.metallic().max(self.strength * 0.5)
    }
}
