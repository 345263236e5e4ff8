use cgmath::{InnerSpace, Vector3 as Vec3};

use crate::light::LightUniforms;
use crate::vertex::Material;

/// 插值之后的片元数据，坐标和法线都在相机空间
#[derive(Debug, Clone, Copy)]
pub struct FragmentData {
    pub view_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    /// 顶点颜色插值结果
    pub color: Vec3<f32>,
}

// 定义 Shader 的通用行为
pub trait FragmentShader: Sync {
    // 输入插值后的片元数据，输出最终的颜色 (0.0 ~ 1.0 范围的 Vec3)
    fn shade(&self, data: &FragmentData) -> Vec3<f32>;
}

/// 经典冯模型，逐像素计算光照
pub struct PhongShader<'a> {
    pub lights: &'a LightUniforms,
    pub material: &'a Material,
}

impl FragmentShader for PhongShader<'_> {
    fn shade(&self, data: &FragmentData) -> Vec3<f32> {
        self.lights.illuminate(data.view_pos, data.normal, self.material)
    }
}

/// 顶点阶段已经算好颜色，直接输出
pub struct GouraudShader;

impl FragmentShader for GouraudShader {
    fn shade(&self, data: &FragmentData) -> Vec3<f32> {
        data.color
    }
}

pub struct NormalDebugShader;

impl FragmentShader for NormalDebugShader {
    fn shade(&self, data: &FragmentData) -> Vec3<f32> {
        let n = if data.normal.magnitude2() > 0.0 {
            data.normal.normalize()
        } else {
            data.normal
        };
        (n + Vec3::new(1.0, 1.0, 1.0)) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{Matrix4 as Mat4, SquareMatrix, Zero};

    fn fragment(normal: Vec3<f32>) -> FragmentData {
        FragmentData {
            view_pos: Vec3::new(0.0, 0.0, -3.0),
            normal,
            color: Vec3::new(0.2, 0.4, 0.6),
        }
    }

    #[test]
    fn normal_shader_maps_unit_normal_to_color() {
        let c = NormalDebugShader.shade(&fragment(Vec3::new(0.0, 0.0, 2.0)));
        assert_relative_eq!(c, Vec3::new(0.5, 0.5, 1.0));
    }

    #[test]
    fn gouraud_shader_passes_color_through() {
        let c = GouraudShader.shade(&fragment(Vec3::unit_y()));
        assert_relative_eq!(c, Vec3::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn phong_shader_without_lights_gives_global_ambient() {
        let lights = LightUniforms::new(&[], [255.0, 255.0, 255.0], &Mat4::identity());
        let material = Material::new([0.1, 0.2, 0.3], [1.0; 3], [1.0; 3], 10.0);
        let shader = PhongShader {
            lights: &lights,
            material: &material,
        };
        let c = shader.shade(&fragment(Vec3::unit_z()));
        assert_relative_eq!(c, Vec3::new(0.1, 0.2, 0.3));
        assert!(c != Vec3::zero());
    }
}
