//! Triangle mesh built from a soup of triangles.
//!
//! Small meshes (cubes from scene files) are scanned linearly; the mesh
//! as a whole still participates in the scene BVH through its bounding
//! box.

use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;
use crate::triangle::Triangle;

/// A collection of triangles sharing one bounding box.
pub struct Mesh {
    triangles: Vec<Triangle>,
    bbox: Aabb,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let bbox = triangles
            .iter()
            .fold(Aabb::EMPTY, |acc, t| Aabb::surrounding(&acc, &t.bounding_box()));
        Self { triangles, bbox }
    }

    /// Axis-aligned cuboid centered at `center`, as 12 triangles with
    /// outward-facing winding.
    pub fn cuboid(center: Vec3, size: Vec3, material: Arc<dyn Material>) -> Self {
        let h = size * 0.5;
        let min = center - h;
        let max = center + h;

        // The 8 corners, indexed by (x, y, z) bit pattern
        let p = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
        ];

        // Two triangles per face, counter-clockwise seen from outside
        const FACES: [[usize; 6]; 6] = [
            [4, 5, 7, 4, 7, 6], // +Z
            [1, 0, 2, 1, 2, 3], // -Z
            [5, 1, 3, 5, 3, 7], // +X
            [0, 4, 6, 0, 6, 2], // -X
            [6, 7, 3, 6, 3, 2], // +Y
            [0, 1, 5, 0, 5, 4], // -Y
        ];

        let mut triangles = Vec::with_capacity(12);
        for face in FACES {
            triangles.push(Triangle::new(p[face[0]], p[face[1]], p[face[2]], material.clone()));
            triangles.push(Triangle::new(p[face[3]], p[face[4]], p[face[5]], material.clone()));
        }

        Self::new(triangles)
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl Hittable for Mesh {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        if !self.bbox.hit(ray, ray_t) {
            return false;
        }

        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for triangle in &self.triangles {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if triangle.hit(ray, interval, rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
