use cgmath::{InnerSpace, Vector2 as Vec2, Vector3 as Vec3, Vector4 as Vec4, Zero};
use serde::{Deserialize, Serialize};

/// 模型空间中的顶点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: Vec3<f32>,
    pub normal: Vec3<f32>,
}

impl Vertex {
    pub fn new(pos: Vec3<f32>, normal: Vec3<f32>) -> Self {
        Self { pos, normal }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Vertex {
            pos: Vec3::zero(),
            normal: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// 逆时针为正面
    pub fn face_normal(&self) -> Vec3<f32> {
        let edge1 = self.vertices[1].pos - self.vertices[0].pos;
        let edge2 = self.vertices[2].pos - self.vertices[0].pos;
        let n = edge1.cross(edge2);
        if n.magnitude2() > 0.0 { n.normalize() } else { n }
    }
}

/// 顶点着色之后、裁剪之前的顶点
#[derive(Debug, Clone, Copy)]
pub struct ClipSpaceVertex {
    pub position: Vec4<f32>,
    /// 相机空间坐标
    pub view_pos: Vec3<f32>,
    /// 相机空间法线
    pub normal: Vec3<f32>,
    /// Gouraud 模式下逐顶点计算好的颜色
    pub color: Vec3<f32>,
}

impl ClipSpaceVertex {
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position + (other.position - self.position) * t,
            view_pos: self.view_pos + (other.view_pos - self.view_pos) * t,
            normal: self.normal + (other.normal - self.normal) * t,
            color: self.color + (other.color - self.color) * t,
        }
    }
}

/// 光栅化阶段的屏幕空间点
#[derive(Debug, Clone, Copy)]
pub struct RasterPoint {
    pub pos: Vec2<f32>,
    /// [0, 1] 的深度
    pub z: f32,
    /// 1/w，用于透视校正插值
    pub inv_w: f32,
    pub view_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub color: Vec3<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct RasterTriangle {
    pub vertices: [RasterPoint; 3],
}

/// Phong 材质，分量都在 [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub ka: Vec3<f32>,
    pub kd: Vec3<f32>,
    pub ks: Vec3<f32>,
    pub shininess: f32,
}

impl Material {
    pub fn new(ka: [f32; 3], kd: [f32; 3], ks: [f32; 3], shininess: f32) -> Self {
        Self {
            ka: ka.into(),
            kd: kd.into(),
            ks: ks.into(),
            shininess,
        }
    }

    pub fn ground() -> Self {
        Self::new([0.3, 0.2, 0.15], [0.6, 0.5, 0.4], [0.1, 0.1, 0.1], 10.0)
    }

    pub fn cube() -> Self {
        Self::new([0.2, 0.1, 0.1], [0.8, 0.4, 0.4], [0.5, 0.5, 0.5], 100.0)
    }

    pub fn cylinder() -> Self {
        Self::new([0.05, 0.15, 0.125], [0.2, 0.6, 0.5], [0.6, 0.6, 0.6], 80.0)
    }

    pub fn torus() -> Self {
        Self::new([0.075, 0.175, 0.075], [0.3, 0.7, 0.3], [0.4, 0.4, 0.4], 60.0)
    }
}

/// 面板上可编辑的材质，颜色用 0~255 表示
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditableMaterial {
    pub ka: [f32; 3],
    pub kd: [f32; 3],
    pub ks: [f32; 3],
    pub shininess: f32,
}

impl Default for EditableMaterial {
    fn default() -> Self {
        Self {
            ka: [50.0, 25.0, 25.0],
            kd: [230.0, 150.0, 150.0],
            ks: [255.0, 255.0, 255.0],
            shininess: 100.0,
        }
    }
}

impl EditableMaterial {
    pub const MIN_SHININESS: f32 = 1.0;
    pub const MAX_SHININESS: f32 = 500.0;

    pub fn to_material(&self) -> Material {
        Material {
            ka: rgb255(self.ka),
            kd: rgb255(self.kd),
            ks: rgb255(self.ks),
            shininess: self.shininess.clamp(Self::MIN_SHININESS, Self::MAX_SHININESS),
        }
    }
}

/// 0~255 颜色转换到 [0, 1]
pub fn rgb255(c: [f32; 3]) -> Vec3<f32> {
    Vec3::new(c[0] / 255.0, c[1] / 255.0, c[2] / 255.0)
}
