use std::path::Path;

use cgmath::{Matrix4 as Mat4, Vector3 as Vec3};

use crate::model::{self, Mesh};
use crate::primitives;
use crate::vertex::Material;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialSource {
    Fixed(Material),
    /// 面板上可编辑的兔子材质
    Bunny,
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: &'static str,
    /// `Scene::meshes` 的下标
    pub mesh: usize,
    pub translation: Vec3<f32>,
    pub scale: Vec3<f32>,
    pub material: MaterialSource,
}

impl SceneObject {
    pub fn model_matrix(&self) -> Mat4<f32> {
        Mat4::from_translation(self.translation)
            * Mat4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub objects: Vec<SceneObject>,
}

const CUBE: usize = 0;
const CYLINDER: usize = 1;
const TORUS: usize = 2;
const BUNNY: usize = 3;

/// 内置的低面数兔子，`--bunny` 可以换成别的模型
const BUNNY_OBJ: &str = include_str!("../models/bunny.obj");

fn fallback_sphere() -> Mesh {
    primitives::sphere(32, 16)
}

impl Scene {
    /// 固定的五个物体：地面、立方体、圆柱、圆环、兔子
    pub fn new(bunny: Mesh) -> Self {
        let meshes = vec![
            primitives::cube(),
            primitives::cylinder(32),
            primitives::torus(48, 24),
            bunny,
        ];

        let objects = vec![
            SceneObject {
                name: "ground",
                mesh: CUBE,
                translation: Vec3::new(0.0, -0.25, 0.0),
                scale: Vec3::new(10.0, 0.5, 10.0),
                material: MaterialSource::Fixed(Material::ground()),
            },
            SceneObject {
                name: "cube",
                mesh: CUBE,
                translation: Vec3::new(-2.5, 1.0, -2.5),
                scale: Vec3::new(2.0, 2.0, 2.0),
                material: MaterialSource::Fixed(Material::cube()),
            },
            SceneObject {
                name: "cylinder",
                mesh: CYLINDER,
                translation: Vec3::new(2.5, 1.0, -2.5),
                scale: Vec3::new(2.0, 2.0, 2.0),
                material: MaterialSource::Fixed(Material::cylinder()),
            },
            SceneObject {
                name: "torus",
                mesh: TORUS,
                translation: Vec3::new(-2.5, 0.4, 2.5),
                scale: Vec3::new(2.0, 2.0, 2.0),
                material: MaterialSource::Fixed(Material::torus()),
            },
            SceneObject {
                name: "bunny",
                mesh: BUNNY,
                translation: Vec3::new(2.5, 1.0, 2.5),
                scale: Vec3::new(2.0, 2.0, 2.0),
                material: MaterialSource::Bunny,
            },
        ];

        Self { meshes, objects }
    }

    /// 没有指定路径时用内置兔子；指定的文件读不了时用球体代替，不会中断程序
    pub fn load(bunny_path: Option<&Path>) -> Self {
        let loaded = match bunny_path {
            Some(path) => model::load_obj(path),
            None => model::load_obj_str("bunny", BUNNY_OBJ),
        };
        let bunny = match loaded {
            Ok(mut mesh) => {
                mesh.normalize_to_unit_box();
                mesh
            }
            Err(err) => {
                tracing::warn!("{err}，改用球体代替兔子");
                fallback_sphere()
            }
        };
        Self::new(bunny)
    }

    pub fn triangle_count(&self) -> usize {
        self.objects
            .iter()
            .map(|o| self.meshes[o.mesh].triangles.len())
            .sum()
    }
}
