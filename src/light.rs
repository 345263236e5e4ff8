use cgmath::{ElementWise, InnerSpace, Matrix4 as Mat4, Vector3 as Vec3, Vector4 as Vec4, Zero};
use serde::{Deserialize, Serialize};

use crate::vertex::{Material, rgb255};

/// 着色器一次最多处理的光源数
pub const MAX_LIGHTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightKind {
    Point,
    Directional,
    Spotlight,
}

impl LightKind {
    pub const ALL: [LightKind; 3] = [
        LightKind::Point,
        LightKind::Directional,
        LightKind::Spotlight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LightKind::Point => "Point",
            LightKind::Directional => "Directional",
            LightKind::Spotlight => "Spotlight",
        }
    }
}

/// 世界坐标系下的光源，颜色用 0~255 表示
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub enabled: bool,
    pub kind: LightKind,
    /// 方向光时表示指向光源的方向
    pub position: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub axis: [f32; 3],
    /// 角度制
    pub aperture: f32,
    pub cutoff: f32,
}

impl Light {
    pub const MIN_APERTURE: f32 = 1.0;
    pub const MAX_APERTURE: f32 = 90.0;
    pub const MIN_CUTOFF: f32 = 0.1;
    pub const MAX_CUTOFF: f32 = 50.0;

    /// 默认的三盏灯：聚光灯、点光源、方向光，只有聚光灯是开着的
    pub fn default_set() -> Vec<Light> {
        vec![
            Light {
                enabled: true,
                kind: LightKind::Spotlight,
                position: [0.0, 8.0, 0.0],
                ambient: [150.0, 150.0, 150.0],
                diffuse: [220.0, 220.0, 220.0],
                specular: [255.0, 255.0, 255.0],
                axis: [0.0, -1.0, 0.0],
                aperture: 50.0,
                cutoff: 8.0,
            },
            Light {
                enabled: false,
                kind: LightKind::Point,
                position: [-5.0, 5.0, 5.0],
                ambient: [20.0, 20.0, 20.0],
                diffuse: [200.0, 200.0, 255.0],
                specular: [255.0, 255.0, 255.0],
                axis: [0.0, -1.0, 0.0],
                aperture: 30.0,
                cutoff: 5.0,
            },
            Light {
                enabled: false,
                kind: LightKind::Directional,
                position: [0.0, -1.0, 0.0],
                ambient: [150.0, 150.0, 150.0],
                diffuse: [200.0, 200.0, 200.0],
                specular: [150.0, 150.0, 150.0],
                axis: [0.0, -1.0, 0.0],
                aperture: 30.0,
                cutoff: 5.0,
            },
        ]
    }

    /// 把光源从世界坐标变换到相机坐标
    pub fn to_camera_space(&self, view: &Mat4<f32>) -> CameraLight {
        let [x, y, z] = self.position;
        let w = match self.kind {
            LightKind::Directional => 0.0,
            _ => 1.0,
        };
        let position = view * Vec4::new(x, y, z, w);
        let axis = (view * Vec3::from(self.axis).extend(0.0)).truncate();

        CameraLight {
            enabled: self.enabled,
            kind: self.kind,
            position,
            axis,
            aperture: self.aperture.to_radians(),
            cutoff: self.cutoff,
            ambient: rgb255(self.ambient),
            diffuse: rgb255(self.diffuse),
            specular: rgb255(self.specular),
        }
    }
}

/// 相机坐标系下、颜色已归一化的光源
#[derive(Debug, Clone, Copy)]
pub struct CameraLight {
    pub enabled: bool,
    pub kind: LightKind,
    pub position: Vec4<f32>,
    pub axis: Vec3<f32>,
    /// 弧度
    pub aperture: f32,
    pub cutoff: f32,
    pub ambient: Vec3<f32>,
    pub diffuse: Vec3<f32>,
    pub specular: Vec3<f32>,
}

/// 一帧里所有物体共用的光照参数
#[derive(Debug, Clone)]
pub struct LightUniforms {
    pub lights: Vec<CameraLight>,
    pub global_ambient: Vec3<f32>,
}

impl LightUniforms {
    pub fn new(lights: &[Light], global_ambient: [f32; 3], view: &Mat4<f32>) -> Self {
        if lights.len() > MAX_LIGHTS {
            tracing::warn!(
                "光源数量 {} 超过上限 {}，多余的将被忽略",
                lights.len(),
                MAX_LIGHTS
            );
        }
        Self {
            lights: lights
                .iter()
                .take(MAX_LIGHTS)
                .map(|light| light.to_camera_space(view))
                .collect(),
            global_ambient: rgb255(global_ambient),
        }
    }

    /// 相机空间里的 Phong 光照，pos/normal 都在相机空间
    pub fn illuminate(&self, pos: Vec3<f32>, normal: Vec3<f32>, material: &Material) -> Vec3<f32> {
        let n = if normal.magnitude2() > 0.0 {
            normal.normalize()
        } else {
            normal
        };
        // 相机在原点
        let v = if pos.magnitude2() > 0.0 {
            (-pos).normalize()
        } else {
            Vec3::unit_z()
        };

        let mut color = self.global_ambient.mul_element_wise(material.ka);

        for light in self.lights.iter().filter(|l| l.enabled) {
            let to_light = match light.kind {
                LightKind::Directional => light.position.truncate(),
                _ => light.position.truncate() - pos,
            };
            if to_light.magnitude2() == 0.0 {
                continue;
            }
            let l = to_light.normalize();

            let ambient = light.ambient.mul_element_wise(material.ka);

            let spot = match light.kind {
                LightKind::Spotlight => spot_factor(light, l),
                _ => 1.0,
            };

            let diff = n.dot(l).max(0.0);
            let diffuse = light.diffuse.mul_element_wise(material.kd) * diff;

            let specular = if diff > 0.0 {
                let r = reflect(-l, n);
                let spec = r.dot(v).max(0.0).powf(material.shininess);
                light.specular.mul_element_wise(material.ks) * spec
            } else {
                Vec3::zero()
            };

            color += ambient + (diffuse + specular) * spot;
        }

        Vec3::new(
            color.x.clamp(0.0, 1.0),
            color.y.clamp(0.0, 1.0),
            color.z.clamp(0.0, 1.0),
        )
    }
}

/// 聚光灯衰减：光锥外为 0，光锥内为 cos^cutoff
fn spot_factor(light: &CameraLight, l: Vec3<f32>) -> f32 {
    if light.axis.magnitude2() == 0.0 {
        return 0.0;
    }
    let cos_angle = (-l).dot(light.axis.normalize());
    if cos_angle < light.aperture.cos() {
        0.0
    } else {
        cos_angle.max(0.0).powf(light.cutoff)
    }
}

fn reflect(i: Vec3<f32>, n: Vec3<f32>) -> Vec3<f32> {
    i - n * (2.0 * n.dot(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use cgmath::{EuclideanSpace, Point3, SquareMatrix};

    fn white_light(kind: LightKind, position: [f32; 3]) -> Light {
        Light {
            enabled: true,
            kind,
            position,
            ambient: [0.0; 3],
            diffuse: [255.0; 3],
            specular: [0.0; 3],
            axis: [0.0, -1.0, 0.0],
            aperture: 30.0,
            cutoff: 1.0,
        }
    }

    fn diffuse_only() -> Material {
        Material::new([0.0; 3], [1.0; 3], [0.0; 3], 1.0)
    }

    #[test]
    fn default_set_has_only_spotlight_enabled() {
        let lights = Light::default_set();
        assert_eq!(lights.len(), 3);
        assert!(lights[0].enabled && lights[0].kind == LightKind::Spotlight);
        assert!(!lights[1].enabled);
        assert_eq!(lights[2].kind, LightKind::Directional);
    }

    #[test]
    fn positional_light_uses_w_one_and_directional_uses_w_zero() {
        let view = Mat4::look_at_rh(
            Point3::new(0.0, 0.0, 10.0),
            Point3::origin(),
            Vec3::unit_y(),
        );
        let point = white_light(LightKind::Point, [1.0, 2.0, 3.0]).to_camera_space(&view);
        assert_relative_eq!(point.position, Vec4::new(1.0, 2.0, -7.0, 1.0), epsilon = 1e-5);

        let dir = white_light(LightKind::Directional, [1.0, 2.0, 3.0]).to_camera_space(&view);
        assert_relative_eq!(dir.position, Vec4::new(1.0, 2.0, 3.0, 0.0), epsilon = 1e-5);
        // 轴是方向向量，不受平移影响
        assert_relative_eq!(dir.axis, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(dir.aperture, 30f32.to_radians());
        assert_relative_eq!(dir.diffuse, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn lights_beyond_limit_are_dropped() {
        let lights = vec![white_light(LightKind::Point, [0.0; 3]); MAX_LIGHTS + 3];
        let uniforms = LightUniforms::new(&lights, [0.0; 3], &Mat4::identity());
        assert_eq!(uniforms.lights.len(), MAX_LIGHTS);
    }

    #[test]
    fn global_ambient_only_when_all_lights_disabled() {
        let mut light = white_light(LightKind::Point, [0.0, 5.0, 0.0]);
        light.enabled = false;
        let uniforms = LightUniforms::new(&[light], [255.0, 0.0, 0.0], &Mat4::identity());
        let material = Material::new([0.5; 3], [1.0; 3], [1.0; 3], 10.0);
        let color = uniforms.illuminate(Vec3::new(0.0, 0.0, -5.0), Vec3::unit_y(), &material);
        assert_relative_eq!(color, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn diffuse_follows_lambert_cosine() {
        let light = white_light(LightKind::Directional, [0.0, 1.0, 1.0]);
        let uniforms = LightUniforms::new(&[light], [0.0; 3], &Mat4::identity());
        let color = uniforms.illuminate(Vec3::new(0.0, 0.0, -5.0), Vec3::unit_y(), &diffuse_only());
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(color, Vec3::new(expected, expected, expected), epsilon = 1e-5);
    }

    #[test]
    fn surface_facing_away_gets_no_diffuse_or_specular() {
        let mut light = white_light(LightKind::Point, [0.0, -5.0, -5.0]);
        light.specular = [255.0; 3];
        let uniforms = LightUniforms::new(&[light], [0.0; 3], &Mat4::identity());
        let material = Material::new([0.0; 3], [1.0; 3], [1.0; 3], 1.0);
        let color = uniforms.illuminate(Vec3::new(0.0, 0.0, -5.0), Vec3::unit_y(), &material);
        assert_relative_eq!(color, Vec3::zero());
    }

    #[test]
    fn specular_peaks_along_mirror_direction() {
        let mut light = white_light(LightKind::Point, [0.0, 0.0, 0.0]);
        light.diffuse = [0.0; 3];
        light.specular = [255.0; 3];
        let uniforms = LightUniforms::new(&[light], [0.0; 3], &Mat4::identity());
        let material = Material::new([0.0; 3], [0.0; 3], [1.0; 3], 50.0);
        // 光源和相机重合，法线正对相机
        let color = uniforms.illuminate(Vec3::new(0.0, 0.0, -5.0), Vec3::unit_z(), &material);
        assert_relative_eq!(color, Vec3::new(1.0, 1.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn spotlight_is_dark_outside_its_cone() {
        let light = white_light(LightKind::Spotlight, [0.0, 8.0, 0.0]);
        let uniforms = LightUniforms::new(&[light], [0.0; 3], &Mat4::identity());
        let inside = uniforms.illuminate(Vec3::zero(), Vec3::unit_y(), &diffuse_only());
        assert_relative_eq!(inside.x, 1.0, epsilon = 1e-5);

        let far_away = Vec3::new(8.0, 0.0, 0.0);
        let outside = uniforms.illuminate(far_away, Vec3::unit_y(), &diffuse_only());
        assert_abs_diff_eq!(outside, Vec3::zero());
    }

    #[test]
    fn spotlight_falls_off_with_cutoff_exponent() {
        let mut light = white_light(LightKind::Spotlight, [0.0, 1.0, 0.0]);
        light.aperture = 60.0;
        light.cutoff = 2.0;
        let uniforms = LightUniforms::new(&[light], [0.0; 3], &Mat4::identity());
        // 45 度偏离轴
        let p = Vec3::new(1.0, 0.0, 0.0);
        let color = uniforms.illuminate(p, Vec3::unit_y(), &diffuse_only());
        let cos45 = std::f32::consts::FRAC_1_SQRT_2;
        // spot = cos^2, lambert = cos45
        assert_relative_eq!(color.x, cos45 * cos45 * cos45, epsilon = 1e-5);
    }
}
