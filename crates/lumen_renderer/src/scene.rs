//! World construction from a scene description.
//!
//! Bounded primitives go into the BVH; infinite planes cannot be
//! bounded so they live in a separate linear list, and `World` presents
//! both behind one `Hittable`.

use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};
use lumen_scene::{vec3, MaterialDesc, ObjectDesc, SceneDesc};

use crate::bvh::BvhNode;
use crate::camera::Camera;
use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::material::{
    Clearcoat, Color, Dielectric, DiffuseLight, Lambertian, Material, Metal,
};
use crate::mesh::Mesh;
use crate::plane::Plane;
use crate::renderer::RenderError;
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/// A point light sampled by the direct-lighting term.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
}

/// The renderable world: a BVH over bounded primitives plus a linear
/// list of unbounded ones.
pub struct World {
    bvh: BvhNode,
    unbounded: HittableList,
}

impl World {
    pub fn new(bvh: BvhNode, unbounded: HittableList) -> Self {
        Self { bvh, unbounded }
    }

    pub fn object_count(&self) -> usize {
        self.bvh.leaf_count() + self.unbounded.len()
    }
}

impl Hittable for World {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let hit_bvh = self.bvh.hit(ray, ray_t, rec);
        let plane_t = Interval::new(ray_t.min, if hit_bvh { rec.t } else { ray_t.max });
        let hit_unbounded = self.unbounded.hit(ray, plane_t, rec);
        hit_bvh || hit_unbounded
    }

    fn bounding_box(&self) -> Aabb {
        if self.unbounded.is_empty() {
            self.bvh.bounding_box()
        } else {
            Aabb::UNIVERSE
        }
    }
}

/// A scene ready to render: world geometry, camera and lights.
pub struct BuiltScene {
    pub world: World,
    pub camera: Camera,
    pub lights: Vec<Light>,
}

/// Instantiate materials and geometry from a parsed scene description.
///
/// The camera comes back uninitialized; the renderer applies the output
/// resolution and calls `initialize` itself. Degenerate triangles are
/// dropped with a warning rather than failing the whole scene.
pub fn build_world(desc: &SceneDesc) -> Result<BuiltScene, RenderError> {
    if desc.objects.is_empty() {
        return Err(RenderError::EmptyScene);
    }

    let mut bounded: Vec<Box<dyn Hittable>> = Vec::new();
    let mut unbounded = HittableList::new();

    for object in &desc.objects {
        match object {
            ObjectDesc::Sphere {
                position,
                radius,
                material,
            } => {
                if *radius <= 0.0 {
                    return Err(RenderError::InvalidObject(format!(
                        "sphere radius must be positive, got {radius}"
                    )));
                }
                bounded.push(Box::new(Sphere::new(
                    vec3(*position),
                    *radius,
                    build_material(material),
                )));
            }
            ObjectDesc::Plane {
                point,
                normal,
                material,
            } => {
                let n = vec3(*normal);
                if n.length_squared() < 1e-12 {
                    return Err(RenderError::InvalidObject(
                        "plane normal must be non-zero".to_string(),
                    ));
                }
                unbounded.add(Box::new(Plane::new(vec3(*point), n, build_material(material))));
            }
            ObjectDesc::Cube {
                position,
                size,
                material,
            } => {
                let s = vec3(*size);
                if s.min_element() <= 0.0 {
                    return Err(RenderError::InvalidObject(format!(
                        "cube size must be positive, got {s:?}"
                    )));
                }
                bounded.push(Box::new(Mesh::cuboid(
                    vec3(*position),
                    s,
                    build_material(material),
                )));
            }
            ObjectDesc::Triangle { vertices, material } => {
                let triangle = Triangle::new(
                    vec3(vertices[0]),
                    vec3(vertices[1]),
                    vec3(vertices[2]),
                    build_material(material),
                );
                if triangle.is_degenerate() {
                    log::warn!("skipping degenerate triangle {vertices:?}");
                    continue;
                }
                bounded.push(Box::new(triangle));
            }
        }
    }

    if bounded.is_empty() && unbounded.is_empty() {
        return Err(RenderError::EmptyScene);
    }

    log::debug!(
        "built world: {} bounded objects in BVH, {} unbounded",
        bounded.len(),
        unbounded.len()
    );

    let camera = Camera::new()
        .with_position(
            vec3(desc.camera.position),
            vec3(desc.camera.look_at),
            vec3(desc.camera.up),
        )
        .with_vfov(desc.camera.fov);

    let lights = desc
        .lights
        .iter()
        .map(|l| Light {
            position: vec3(l.position),
            color: vec3(l.color),
            intensity: l.intensity,
        })
        .collect();

    Ok(BuiltScene {
        world: World::new(BvhNode::build(bounded), unbounded),
        camera,
        lights,
    })
}

/// Build a material instance from its description.
pub fn build_material(desc: &MaterialDesc) -> Arc<dyn Material> {
    match desc {
        MaterialDesc::Lambertian { color } => Arc::new(Lambertian::new(vec3(*color))),
        MaterialDesc::Metal {
            color,
            roughness,
            metallic,
        } => Arc::new(Metal::new(vec3(*color), *roughness, *metallic)),
        MaterialDesc::Dielectric { ior, tint } => {
            Arc::new(Dielectric::with_tint(*ior, vec3(*tint)))
        }
        MaterialDesc::DiffuseLight { color } => Arc::new(DiffuseLight::new(vec3(*color))),
        MaterialDesc::Clearcoat {
            base,
            strength,
            roughness,
        } => Arc::new(Clearcoat::new(build_material(base), *strength, *roughness)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_scene::parse_scene;

    fn demo_scene() -> SceneDesc {
        parse_scene(
            r#"{
                "name": "test",
                "camera": { "position": [0, 1, 5], "lookAt": [0, 0, 0] },
                "objects": [
                    {
                        "type": "sphere",
                        "position": [0, 0, 0],
                        "radius": 1.0,
                        "material": { "type": "lambertian", "color": [0.7, 0.3, 0.3] }
                    },
                    {
                        "type": "plane",
                        "point": [0, -1, 0],
                        "normal": [0, 1, 0],
                        "material": { "type": "lambertian", "color": [0.5, 0.5, 0.5] }
                    },
                    {
                        "type": "cube",
                        "position": [3, 0, 0],
                        "size": [1, 1, 1],
                        "material": { "type": "metal", "color": [0.9, 0.9, 0.9] }
                    }
                ],
                "lights": [
                    { "position": [5, 10, 5], "color": [1, 1, 1], "intensity": 50 }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_build_demo_scene() {
        let scene = build_world(&demo_scene()).unwrap();
        // Sphere + 12 cube triangles in the BVH, plane outside it.
        assert_eq!(scene.world.object_count(), 3);
        assert_eq!(scene.lights.len(), 1);
    }

    #[test]
    fn test_world_hit_prefers_nearest() {
        let scene = build_world(&demo_scene()).unwrap();
        // Straight down from above the sphere: sphere at t=4, plane at t=6.
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), -Vec3::Y);
        let mut rec = HitRecord::default();
        assert!(scene
            .world
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 4.0).abs() < 1e-4);

        // Off to the side, only the plane is there.
        let ray = Ray::new(Vec3::new(-5.0, 5.0, 0.0), -Vec3::Y);
        assert!(scene
            .world
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_scene_rejected() {
        let desc = parse_scene(
            r#"{ "camera": { "position": [0, 0, 0], "lookAt": [0, 0, -1] } }"#,
        )
        .unwrap();
        assert!(matches!(build_world(&desc), Err(RenderError::EmptyScene)));
    }

    #[test]
    fn test_invalid_sphere_rejected() {
        let desc = parse_scene(
            r#"{
                "camera": { "position": [0, 0, 0], "lookAt": [0, 0, -1] },
                "objects": [
                    {
                        "type": "sphere",
                        "position": [0, 0, 0],
                        "radius": -1.0,
                        "material": { "type": "lambertian", "color": [1, 1, 1] }
                    }
                ]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            build_world(&desc),
            Err(RenderError::InvalidObject(_))
        ));
    }

    #[test]
    fn test_degenerate_triangle_skipped() {
        let desc = parse_scene(
            r#"{
                "camera": { "position": [0, 0, 0], "lookAt": [0, 0, -1] },
                "objects": [
                    {
                        "type": "triangle",
                        "vertices": [[0, 0, 0], [1, 0, 0], [2, 0, 0]],
                        "material": { "type": "lambertian", "color": [1, 1, 1] }
                    },
                    {
                        "type": "sphere",
                        "position": [0, 0, -3],
                        "radius": 1.0,
                        "material": { "type": "lambertian", "color": [1, 1, 1] }
                    }
                ]
            }"#,
        )
        .unwrap();
        let scene = build_world(&desc).unwrap();
        assert_eq!(scene.world.object_count(), 1);
    }
}
