use crate::light::LightUniforms;
use crate::vertex::{ClipSpaceVertex, Material, Triangle};
use cgmath::{InnerSpace, Matrix3 as Mat3, Matrix4 as Mat4, Zero};

pub struct VertexShaderUniforms<'a> {
    pub model_view: &'a Mat4<f32>,
    pub projection: &'a Mat4<f32>,
    pub normal_matrix: &'a Mat3<f32>,
}

pub trait VertexShader: Sync {
    // 接收一个模型空间的三角形和uniforms
    // 返回一个裁剪空间的三角形
    fn shade_triangle(
        &self,
        triangle: &Triangle,
        uniforms: &VertexShaderUniforms,
    ) -> [ClipSpaceVertex; 3];
}

/// 只做坐标变换，光照留给片元阶段
pub struct DefaultVertexShader;

impl VertexShader for DefaultVertexShader {
    fn shade_triangle(
        &self,
        triangle: &Triangle,
        uniforms: &VertexShaderUniforms,
    ) -> [ClipSpaceVertex; 3] {
        triangle.vertices.map(|v| {
            let view_pos = *uniforms.model_view * v.pos.extend(1.0);
            let normal = *uniforms.normal_matrix * v.normal;
            ClipSpaceVertex {
                position: *uniforms.projection * view_pos,
                view_pos: view_pos.truncate(),
                normal: if normal.magnitude2() > 0.0 {
                    normal.normalize()
                } else {
                    normal
                },
                color: cgmath::Vector3::zero(),
            }
        })
    }
}

/// Gouraud：逐顶点计算光照，颜色交给光栅化插值
pub struct GouraudVertexShader<'a> {
    pub lights: &'a LightUniforms,
    pub material: &'a Material,
}

impl VertexShader for GouraudVertexShader<'_> {
    fn shade_triangle(
        &self,
        triangle: &Triangle,
        uniforms: &VertexShaderUniforms,
    ) -> [ClipSpaceVertex; 3] {
        DefaultVertexShader
            .shade_triangle(triangle, uniforms)
            .map(|mut v| {
                v.color = self.lights.illuminate(v.view_pos, v.normal, self.material);
                v
            })
    }
}
