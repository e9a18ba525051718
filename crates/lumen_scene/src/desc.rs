use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

/// Convert a JSON `[x, y, z]` triple into a vector.
#[inline]
pub fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::from_array(v)
}

/// A complete scene: camera, objects and lights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDesc {
    #[serde(default)]
    pub name: String,
    pub camera: CameraDesc,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
    #[serde(default)]
    pub lights: Vec<LightDesc>,
}

/// Pinhole camera placement and field of view.
///
/// Aspect ratio is derived from the render resolution, not stored here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraDesc {
    pub position: [f32; 3],
    #[serde(rename = "lookAt")]
    pub look_at: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    #[serde(default = "default_fov")]
    pub fov: f32,
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_fov() -> f32 {
    60.0
}

/// A renderable object, tagged by `type` in JSON.
///
/// Cubes expand into a triangle mesh at world-build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectDesc {
    Sphere {
        position: [f32; 3],
        radius: f32,
        material: MaterialDesc,
    },
    Plane {
        point: [f32; 3],
        normal: [f32; 3],
        material: MaterialDesc,
    },
    Cube {
        position: [f32; 3],
        size: [f32; 3],
        material: MaterialDesc,
    },
    Triangle {
        vertices: [[f32; 3]; 3],
        material: MaterialDesc,
    },
}

/// Surface material, tagged by `type` in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MaterialDesc {
    Lambertian {
        color: [f32; 3],
    },
    Metal {
        color: [f32; 3],
        #[serde(default)]
        roughness: f32,
        #[serde(default = "default_metallic")]
        metallic: f32,
    },
    Dielectric {
        #[serde(rename = "refractionIndex", default = "default_ior")]
        ior: f32,
        #[serde(default = "default_tint")]
        tint: [f32; 3],
    },
    #[serde(rename = "light")]
    DiffuseLight {
        color: [f32; 3],
    },
    Clearcoat {
        base: Box<MaterialDesc>,
        #[serde(default = "default_coat_strength")]
        strength: f32,
        #[serde(default)]
        roughness: f32,
    },
}

fn default_metallic() -> f32 {
    1.0
}

fn default_ior() -> f32 {
    1.5
}

fn default_tint() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_coat_strength() -> f32 {
    0.5
}

/// A point light source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LightDesc {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}
