//! Random sampling helpers shared by the camera, materials and
//! soft-shadow code. All of them take `&mut dyn RngCore` so callers can
//! thread a per-tile deterministic generator through trait objects.

use lumen_math::Vec3;
use rand::RngCore;

/// Uniform f32 in [0, 1) from the top 24 bits of the generator.
#[inline]
pub(crate) fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Uniform point inside the unit sphere, by rejection sampling.
pub(crate) fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        if v.length_squared() < 1.0 {
            return v;
        }
    }
}

/// Uniform direction on the unit sphere.
pub(crate) fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = random_in_unit_sphere(rng);
        let len_sq = v.length_squared();
        if len_sq > 1e-6 {
            return v / len_sq.sqrt();
        }
    }
}

/// Reflect a vector about a normal.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a vector through a surface with the given IOR ratio.
#[inline]
pub(crate) fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gen_f32_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let x = gen_f32(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_random_unit_vector_is_unit() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        let n = Vec3::Y;
        assert_eq!(reflect(v, n), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_refract_straight_through() {
        // Normal incidence with matched IOR passes straight through.
        let v = Vec3::new(0.0, -1.0, 0.0);
        let refracted = refract(v, Vec3::Y, 1.0);
        assert!((refracted - v).length() < 1e-6);
    }
}
