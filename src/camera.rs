use cgmath::{
    Deg, EuclideanSpace, InnerSpace, Matrix4 as Mat4, Point3, SquareMatrix, Vector3 as Vec3, Zero,
};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub struct Frustum {
    mat: Mat4<f32>,
}

impl Frustum {
    /// OpenGL 风格的透视矩阵，裁剪空间 z 在 [-w, w]
    #[rustfmt::skip]
    pub fn new(near: f32, aspect: f32, far: f32, fovy: f32) -> Self {
        let tan_half_fovy = (fovy / 2.0).tan();
        let a = 1.0 / (aspect * tan_half_fovy);
        let b = 1.0 / tan_half_fovy;
        let c = -(far + near) / (far - near);
        let d = -2.0 * far * near / (far - near);

        // projection
        let mat = Mat4::new(
            a,    0.0,   0.0,   0.0,
            0.0,  b,     0.0,   0.0,
            0.0,  0.0,   c,    -1.0,
            0.0,  0.0,   d,     0.0,
        );

        Self { mat }
    }

    pub fn get_mat(&self) -> &Mat4<f32> {
        &self.mat
    }
}

/// 环绕相机，参数都可以在面板里直接改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub eye: Vec3<f32>,
    pub at: Vec3<f32>,
    pub up: Vec3<f32>,
    /// 角度制
    pub fovy: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 5.0, 10.0),
            at: Vec3::zero(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fovy: 45.0,
            aspect: 1.0,
            near: 0.1,
            far: 20.0,
        }
    }
}

impl Camera {
    pub const MIN_FOVY: f32 = 1.0;
    pub const MAX_FOVY: f32 = 179.0;
    /// 滚轮缩放时 fovy 的上限比面板更小
    pub const MAX_ZOOM_FOVY: f32 = 100.0;
    pub const MIN_CLIP: f32 = 0.1;
    pub const MAX_CLIP: f32 = 20.0;
    /// near 和 far 之间至少保持的距离
    pub const CLIP_GAP: f32 = 0.5;

    pub fn get_view_mat(&self) -> Mat4<f32> {
        Mat4::look_at_rh(Point3::from_vec(self.eye), Point3::from_vec(self.at), self.up)
    }

    pub fn get_frustum(&self) -> Frustum {
        Frustum::new(self.near, self.aspect, self.far, self.fovy.to_radians())
    }

    pub fn set_aspect(&mut self, width: usize, height: usize) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn set_fovy(&mut self, fovy: f32) {
        self.fovy = fovy.clamp(Self::MIN_FOVY, Self::MAX_FOVY);
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near.clamp(Self::MIN_CLIP, Self::MAX_CLIP).min(self.far - Self::CLIP_GAP);
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far.clamp(Self::MIN_CLIP, Self::MAX_CLIP).max(self.near + Self::CLIP_GAP);
    }

    /// 把反序列化得到的参数拉回合法范围，近平面优先保留
    pub fn sanitize(&mut self) {
        self.set_fovy(self.fovy);
        self.near = self.near.clamp(Self::MIN_CLIP, Self::MAX_CLIP - Self::CLIP_GAP);
        self.set_far(self.far);
    }

    /// 无修饰键滚轮：改变视场角
    pub fn zoom(&mut self, delta_y: f32) {
        let factor = 1.0 - delta_y / 1000.0;
        self.fovy = (self.fovy * factor).clamp(Self::MIN_FOVY, Self::MAX_ZOOM_FOVY);
    }

    /// 沿视线方向前后移动，`move_target` 为真时 at 一起移动
    pub fn dolly(&mut self, delta_y: f32, move_target: bool) {
        let dir = self.at - self.eye;
        if dir.magnitude2() == 0.0 {
            return;
        }
        let offset = dir.normalize() * (delta_y / 1000.0);
        self.eye += offset;
        if move_target {
            self.at += offset;
        }
    }

    /// 鼠标拖动的轨迹球旋转，dx/dy 为像素位移
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let angle = 0.5 * (dx * dx + dy * dy).sqrt();
        // 相机空间的旋转轴
        let axis = Vec3::new(-dy, -dx, 0.0).normalize();
        let rotation = Mat4::from_axis_angle(axis, Deg(angle));

        let view = self.get_view_mat();
        let Some(inv_view) = view.invert() else {
            return;
        };
        // 先变到相机空间，旋转，再变回世界空间
        let world_rotation = inv_view * rotation * view;

        let eye_at = world_rotation * (self.eye - self.at).extend(0.0);
        let new_up = world_rotation * self.up.extend(0.0);

        self.eye = self.at + eye_at.truncate();
        self.up = new_up.truncate();
    }

    pub fn reset(&mut self) {
        let aspect = self.aspect;
        *self = Camera {
            aspect,
            ..Default::default()
        };
    }
}
