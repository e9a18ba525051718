//! Infinite plane primitive.
//!
//! Planes are unbounded so they never enter the BVH; the scene keeps
//! them in a separate linear list alongside the tree.

use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;

/// An infinite plane through `point` with the given normal.
pub struct Plane {
    point: Vec3,
    normal: Vec3,
    material: Arc<dyn Material>,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3, material: Arc<dyn Material>) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            material,
        }
    }
}

impl Hittable for Plane {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let denom = self.normal.dot(ray.direction);

        // Ray parallel to the plane
        if denom.abs() < 1e-8 {
            return false;
        }

        let t = (self.point - ray.origin).dot(self.normal) / denom;
        if !ray_t.surrounds(t) {
            return false;
        }

        rec.t = t;
        rec.p = ray.at(t);
        rec.material = self.material.as_ref();
        rec.set_face_normal(ray, self.normal);

        true
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }
}
