pub mod clip;
pub mod fragment_shader;
pub mod vertex_shader;

use std::ops::AddAssign;

use cgmath::{InnerSpace, Matrix, Matrix3 as Mat3, Matrix4 as Mat4, SquareMatrix};
use cgmath::{Vector2 as Vec2, Vector3 as Vec3};
use rayon::prelude::*;

use crate::config::{RenderOptions, ShadingModel, ViewerSettings};
use crate::framebuffer::{FrameBuffer, pack_color};
use crate::light::LightUniforms;
use crate::model::Mesh;
use crate::rasterizer;
use crate::scene::{MaterialSource, Scene};
use crate::vertex::{ClipSpaceVertex, Material, RasterPoint, RasterTriangle};

use self::clip::{Clipper, DepthClipper};
use self::fragment_shader::{
    FragmentData, FragmentShader, GouraudShader, NormalDebugShader, PhongShader,
};
use self::vertex_shader::{
    DefaultVertexShader, GouraudVertexShader, VertexShader, VertexShaderUniforms,
};

pub const BLACK: u32 = 0xFF000000;

pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// 一帧的统计信息
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub triangles: usize,
    pub culled: usize,
    /// 近/远平面裁剪后完全消失的三角形
    pub clipped: usize,
    pub rasterized: usize,
}

impl AddAssign for FrameStats {
    fn add_assign(&mut self, rhs: Self) {
        self.triangles += rhs.triangles;
        self.culled += rhs.culled;
        self.clipped += rhs.clipped;
        self.rasterized += rhs.rasterized;
    }
}

/// 一次绘制用到的矩阵和材质
pub struct DrawCall<'a> {
    pub mesh: &'a Mesh,
    pub model_view: Mat4<f32>,
    pub projection: Mat4<f32>,
    pub material: Material,
}

pub struct Renderer {
    pub(crate) framebuffer: FrameBuffer,
    pub(crate) viewport: Viewport,
}

/// 模型视图矩阵左上 3x3 的逆转置
pub fn normal_matrix(model_view: &Mat4<f32>) -> Mat3<f32> {
    let upper = Mat3::from_cols(
        model_view.x.truncate(),
        model_view.y.truncate(),
        model_view.z.truncate(),
    );
    upper.invert().map(|inv| inv.transpose()).unwrap_or(upper)
}

impl Renderer {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            framebuffer: FrameBuffer::new(w, h),
            viewport: Viewport {
                x: 0,
                y: 0,
                w: w as i32,
                h: h as i32,
            },
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.framebuffer.resize(w, h);
        self.viewport.w = w as i32;
        self.viewport.h = h as i32;
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// 每帧的固定流程：清屏、算矩阵、上传光源，然后依次画每个物体
    pub fn render_scene(&mut self, scene: &Scene, settings: &ViewerSettings) -> FrameStats {
        self.framebuffer.clear(BLACK);

        let view = settings.camera.get_view_mat();
        let projection = *settings.camera.get_frustum().get_mat();
        let lights = LightUniforms::new(&settings.lights, settings.options.global_ambient, &view);
        let bunny_material = settings.bunny_material.to_material();

        let mut stats = FrameStats::default();
        for object in &scene.objects {
            let material = match object.material {
                MaterialSource::Fixed(material) => material,
                MaterialSource::Bunny => bunny_material,
            };
            let mesh = &scene.meshes[object.mesh];
            let call = DrawCall {
                mesh,
                model_view: view * object.model_matrix(),
                projection,
                material,
            };
            let object_stats = self.draw(&call, &lights, &settings.options);
            tracing::trace!(object = object.name, mesh = %mesh.name, ?object_stats);
            stats += object_stats;
        }
        tracing::trace!(?stats, "帧渲染完成");
        stats
    }

    //完整渲染管线
    pub fn draw(
        &mut self,
        call: &DrawCall,
        lights: &LightUniforms,
        options: &RenderOptions,
    ) -> FrameStats {
        let normal_matrix = normal_matrix(&call.model_view);
        let uniforms = VertexShaderUniforms {
            model_view: &call.model_view,
            projection: &call.projection,
            normal_matrix: &normal_matrix,
        };

        // 初始化本次渲染所使用的模块
        let vertex_shader: Box<dyn VertexShader + '_> = match options.shading_model {
            ShadingModel::Gouraud => Box::new(GouraudVertexShader {
                lights,
                material: &call.material,
            }),
            ShadingModel::Phong => Box::new(DefaultVertexShader),
        };
        let fragment_shader: Box<dyn FragmentShader + '_> = if options.normals {
            Box::new(NormalDebugShader)
        } else {
            match options.shading_model {
                ShadingModel::Phong => Box::new(PhongShader {
                    lights,
                    material: &call.material,
                }),
                ShadingModel::Gouraud => Box::new(GouraudShader),
            }
        };
        let clipper = DepthClipper;

        // 管线阶段 1: 顶点着色，三角形之间互不依赖
        let shaded: Vec<[ClipSpaceVertex; 3]> = call
            .mesh
            .triangles
            .par_iter()
            .map(|triangle| vertex_shader.shade_triangle(triangle, &uniforms))
            .collect();

        let mut stats = FrameStats {
            triangles: shaded.len(),
            ..Default::default()
        };

        for clip_space_triangle in &shaded {
            // 管线阶段 2: 背面剔除（线框模式下不剔除）
            let cull = options.backface_culling && !options.wireframe;
            if cull && is_back_facing(clip_space_triangle) {
                stats.culled += 1;
                continue;
            }

            // 线框只沿原来的三条边裁剪，不拆多边形
            if options.wireframe {
                let mut drawn = false;
                for i in 0..3 {
                    let a = &clip_space_triangle[i];
                    let b = &clip_space_triangle[(i + 1) % 3];
                    if let Some([p, q]) = clipper.clip_line(a, b) {
                        let (p, q) = (self.viewport_point(&p), self.viewport_point(&q));
                        self.rasterize_line(&p, &q, &*fragment_shader, options.depth_test);
                        drawn = true;
                    }
                }
                if drawn {
                    stats.rasterized += 1;
                } else {
                    stats.clipped += 1;
                }
                continue;
            }

            // 管线阶段 3: 裁剪
            let clipped_triangles = clipper.clip_triangle(clip_space_triangle);
            if clipped_triangles.is_empty() {
                stats.clipped += 1;
                continue;
            }

            for clipped in clipped_triangles {
                // 阶段 4: 屏幕映射
                let raster_triangle = self.viewport_transform(&clipped);

                // 阶段 5: 光栅化和像素着色
                self.rasterize_triangle(&raster_triangle, &*fragment_shader, options.depth_test);
                stats.rasterized += 1;
            }
        }
        stats
    }

    //视口变换
    fn viewport_transform(&self, clip_triangle: &[ClipSpaceVertex; 3]) -> RasterTriangle {
        RasterTriangle {
            vertices: clip_triangle.map(|clip_v| self.viewport_point(&clip_v)),
        }
    }

    fn viewport_point(&self, clip_v: &ClipSpaceVertex) -> RasterPoint {
        // 1. 透视除法
        let inv_w = 1.0 / clip_v.position.w;
        let ndc_pos = clip_v.position * inv_w;

        // 转换到屏幕空间，y 轴向下
        let (vw, vh) = (self.viewport.w as f32, self.viewport.h as f32);
        let screen_x = (ndc_pos.x + 1.0) * 0.5 * vw + self.viewport.x as f32;
        let screen_y = vh - (ndc_pos.y + 1.0) * 0.5 * vh + self.viewport.y as f32;

        RasterPoint {
            pos: Vec2::new(screen_x, screen_y),
            z: (ndc_pos.z + 1.0) * 0.5,
            inv_w,
            view_pos: clip_v.view_pos,
            normal: clip_v.normal,
            color: clip_v.color,
        }
    }

    // 进行光栅化
    pub fn rasterize_triangle(
        &mut self,
        triangle: &RasterTriangle,
        shader: &dyn FragmentShader,
        depth_test: bool,
    ) {
        let points = &triangle.vertices;
        let screen = [points[0].pos, points[1].pos, points[2].pos];
        let Some((min_x, min_y, max_x, max_y)) =
            rasterizer::get_box(&screen, self.framebuffer.width, self.framebuffer.height)
        else {
            return;
        };
        // 退化三角形
        if rasterizer::get_barycentric_coords(&screen, &screen[0]).is_none() {
            return;
        }

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(bary) = rasterizer::get_barycentric_coords(&screen, &p) else {
                    continue;
                };
                if !rasterizer::is_inside(&bary) {
                    continue;
                }

                let depth = rasterizer::interpolate_depth(points, bary);
                if depth_test && !self.framebuffer.depth_passes(x, y, depth) {
                    continue;
                }

                // 插值所有属性
                let weights = rasterizer::perspective_weights(points, bary);
                let fragment_data = FragmentData {
                    view_pos: rasterizer::interpolate_vec3(
                        [points[0].view_pos, points[1].view_pos, points[2].view_pos],
                        weights,
                    ),
                    normal: rasterizer::interpolate_vec3(
                        [points[0].normal, points[1].normal, points[2].normal],
                        weights,
                    ),
                    color: rasterizer::interpolate_vec3(
                        [points[0].color, points[1].color, points[2].color],
                        weights,
                    ),
                };

                let color = pack_color(shader.shade(&fragment_data));
                self.framebuffer.put_pixel(x, y, color, depth, depth_test);
            }
        }
    }

    fn rasterize_line(
        &mut self,
        a: &RasterPoint,
        b: &RasterPoint,
        shader: &dyn FragmentShader,
        depth_test: bool,
    ) {
        // 先裁到屏幕内，避免近平面附近的超长线段
        let Some((t0, t1)) = rasterizer::clip_segment_to_rect(
            a.pos,
            b.pos,
            self.framebuffer.width,
            self.framebuffer.height,
        ) else {
            return;
        };
        let start = rasterizer::lerp_raster_point(a, b, t0);
        let end = rasterizer::lerp_raster_point(a, b, t1);

        let pixels = rasterizer::line_pixels(
            start.pos.x.round() as i32,
            start.pos.y.round() as i32,
            end.pos.x.round() as i32,
            end.pos.y.round() as i32,
        );
        let steps = pixels.len().saturating_sub(1).max(1) as f32;
        for (i, (x, y)) in pixels.into_iter().enumerate() {
            if x < 0 || y < 0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            let p = rasterizer::lerp_raster_point(&start, &end, i as f32 / steps);
            if depth_test && !self.framebuffer.depth_passes(x, y, p.z) {
                continue;
            }
            let fragment_data = FragmentData {
                view_pos: p.view_pos,
                normal: p.normal,
                color: p.color,
            };
            let color = pack_color(shader.shade(&fragment_data));
            self.framebuffer.put_pixel(x, y, color, p.z, depth_test);
        }
    }
}

/// 相机空间里判断背面：逆时针为正面，相机在原点
fn is_back_facing(triangle: &[ClipSpaceVertex; 3]) -> bool {
    let p0 = triangle[0].view_pos;
    let p1 = triangle[1].view_pos;
    let p2 = triangle[2].view_pos;
    let normal: Vec3<f32> = (p1 - p0).cross(p2 - p0);
    normal.dot(p0) >= 0.0
}
