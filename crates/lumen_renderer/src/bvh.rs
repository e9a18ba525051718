//! Bounding volume hierarchy over the scene's bounded primitives.
//!
//! Built top-down by median split: primitives are sorted by bounding
//! box centroid along the longest axis of the current group's centroid
//! bounds, so the split axis always matches the sort axis. Traversal
//! tightens the interval with the left child's hit before descending
//! into the right child, and must return exactly the hits a linear
//! scan over the same primitives would.

use lumen_math::{Aabb, Interval, Ray};
use rayon::slice::ParallelSliceMut;

use crate::hittable::{HitRecord, Hittable};

/// Sorting large groups dominates build time, so hand those to rayon.
const PARALLEL_SORT_THRESHOLD: usize = 1024;

/// A node in the bounding volume hierarchy.
pub enum BvhNode {
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    Leaf {
        object: Box<dyn Hittable>,
        bbox: Aabb,
    },
    Empty,
}

impl BvhNode {
    /// Build a BVH from a list of bounded objects.
    pub fn build(mut objects: Vec<Box<dyn Hittable>>) -> Self {
        if objects.is_empty() {
            return BvhNode::Empty;
        }
        Self::build_recursive(&mut objects)
    }

    fn build_recursive(objects: &mut Vec<Box<dyn Hittable>>) -> Self {
        if objects.len() == 1 {
            let object = match objects.pop() {
                Some(o) => o,
                None => return BvhNode::Empty,
            };
            let bbox = object.bounding_box();
            return BvhNode::Leaf { object, bbox };
        }

        // Pick the split axis from the spread of centroids, not the
        // union of the boxes; large overlapping primitives would
        // otherwise skew the choice.
        let centroid_bounds = objects.iter().fold(Aabb::EMPTY, |acc, o| {
            let c = o.bounding_box().centroid();
            Aabb::surrounding(&acc, &Aabb::from_points(c, c))
        });
        let axis = centroid_bounds.longest_axis();

        let key = |o: &Box<dyn Hittable>| {
            let c = o.bounding_box().centroid();
            match axis {
                0 => c.x,
                1 => c.y,
                _ => c.z,
            }
        };
        let cmp = |a: &Box<dyn Hittable>, b: &Box<dyn Hittable>| {
            key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal)
        };

        if objects.len() >= PARALLEL_SORT_THRESHOLD {
            objects.par_sort_unstable_by(cmp);
        } else {
            objects.sort_unstable_by(cmp);
        }

        let mut right_objects = objects.split_off(objects.len() / 2);
        let left = Box::new(Self::build_recursive(objects));
        let right = Box::new(Self::build_recursive(&mut right_objects));
        let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());

        BvhNode::Branch { left, right, bbox }
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            BvhNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
            BvhNode::Leaf { .. } => 1,
            BvhNode::Empty => 0,
        }
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match self {
            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = left.hit(ray, ray_t, rec);
                // If the left side hit, the right side only matters if
                // it can produce something closer.
                let right_t = Interval::new(ray_t.min, if hit_left { rec.t } else { ray_t.max });
                let hit_right = right.hit(ray, right_t, rec);

                hit_left || hit_right
            }
            BvhNode::Leaf { object, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }
                object.hit(ray, ray_t, rec)
            }
            BvhNode::Empty => false,
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } => *bbox,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Empty => Aabb::EMPTY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::HittableList;
    use crate::material::Lambertian;
    use crate::sphere::Sphere;
    use crate::Color;
    use lumen_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn random_spheres(count: usize, seed: u64) -> Vec<(Vec3, f32)> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let center = Vec3::new(
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                );
                (center, rng.gen_range(0.1..2.0))
            })
            .collect()
    }

    fn build_both(spheres: &[(Vec3, f32)]) -> (BvhNode, HittableList) {
        let mat: Arc<dyn crate::Material> = Arc::new(Lambertian::new(Color::splat(0.5)));
        let mut boxed: Vec<Box<dyn Hittable>> = Vec::new();
        let mut list = HittableList::new();
        for &(center, radius) in spheres {
            boxed.push(Box::new(Sphere::new(center, radius, mat.clone())));
            list.add(Box::new(Sphere::new(center, radius, mat.clone())));
        }
        (BvhNode::build(boxed), list)
    }

    #[test]
    fn test_empty_bvh_misses_everything() {
        let bvh = BvhNode::build(Vec::new());
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let mut rec = HitRecord::default();
        assert!(!bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert_eq!(bvh.leaf_count(), 0);
    }

    #[test]
    fn test_single_object_becomes_leaf() {
        let mat = Arc::new(Lambertian::new(Color::splat(0.5)));
        let sphere: Box<dyn Hittable> = Box::new(Sphere::new(Vec3::ZERO, 1.0, mat));
        let bvh = BvhNode::build(vec![sphere]);
        assert_eq!(bvh.leaf_count(), 1);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_leaf_count_matches_input() {
        let spheres = random_spheres(257, 42);
        let (bvh, _) = build_both(&spheres);
        assert_eq!(bvh.leaf_count(), 257);
    }

    #[test]
    fn test_equivalence_with_linear_scan() {
        let spheres = random_spheres(1000, 7);
        let (bvh, list) = build_both(&spheres);

        let mut rng = StdRng::seed_from_u64(99);
        let mut hits = 0;
        for _ in 0..10_000 {
            let origin = Vec3::new(
                rng.gen_range(-80.0..80.0),
                rng.gen_range(-80.0..80.0),
                rng.gen_range(-80.0..80.0),
            );
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if direction.length_squared() < 1e-6 {
                continue;
            }
            let ray = Ray::new(origin, direction.normalize());
            let interval = Interval::new(0.001, f32::INFINITY);

            let mut bvh_rec = HitRecord::default();
            let mut list_rec = HitRecord::default();
            let bvh_hit = bvh.hit(&ray, interval, &mut bvh_rec);
            let list_hit = list.hit(&ray, interval, &mut list_rec);

            assert_eq!(bvh_hit, list_hit);
            if bvh_hit {
                hits += 1;
                assert!(
                    (bvh_rec.t - list_rec.t).abs() < 1e-4,
                    "t mismatch: bvh {} vs linear {}",
                    bvh_rec.t,
                    list_rec.t
                );
            }
        }
        // The scene is dense enough that a silent all-miss run would
        // make this test vacuous.
        assert!(hits > 100);
    }

    #[test]
    fn test_coincident_centroids_build_fine() {
        // Concentric spheres have identical centroids; the sort must
        // not panic and every leaf must survive.
        let mat: Arc<dyn crate::Material> = Arc::new(Lambertian::new(Color::splat(0.5)));
        let objects: Vec<Box<dyn Hittable>> = (1..=8)
            .map(|i| {
                Box::new(Sphere::new(Vec3::ZERO, i as f32, mat.clone())) as Box<dyn Hittable>
            })
            .collect();
        let bvh = BvhNode::build(objects);
        assert_eq!(bvh.leaf_count(), 8);

        let ray = Ray::new(Vec3::new(0.0, 0.0, -20.0), Vec3::Z);
        let mut rec = HitRecord::default();
        assert!(bvh.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        // Nearest surface is the outermost sphere at t = 12.
        assert!((rec.t - 12.0).abs() < 1e-4);
    }
}
