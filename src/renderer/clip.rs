use crate::vertex::ClipSpaceVertex;

pub trait Clipper {
    // 接收一个裁剪空间的三角形
    // 返回裁剪后产生的零个、一个或多个三角形
    fn clip_triangle(&self, triangle: &[ClipSpaceVertex; 3]) -> Vec<[ClipSpaceVertex; 3]>;

    // 线框模式下按线段裁剪，完全在外侧时返回 None
    fn clip_line(
        &self,
        a: &ClipSpaceVertex,
        b: &ClipSpaceVertex,
    ) -> Option<[ClipSpaceVertex; 2]>;
}

/// 对近平面和远平面做 Sutherland-Hodgman 裁剪
/// 左右上下交给光栅化阶段的包围盒处理
pub struct DepthClipper;

/// 平面的有向距离，>= 0 表示在内侧
type PlaneDistance = fn(&ClipSpaceVertex) -> f32;

// near: z >= -w
fn near_distance(v: &ClipSpaceVertex) -> f32 {
    v.position.z + v.position.w
}

// far: z <= w
fn far_distance(v: &ClipSpaceVertex) -> f32 {
    v.position.w - v.position.z
}

const PLANES: [PlaneDistance; 2] = [near_distance, far_distance];

impl Clipper for DepthClipper {
    fn clip_triangle(&self, triangle: &[ClipSpaceVertex; 3]) -> Vec<[ClipSpaceVertex; 3]> {
        let all_inside = triangle
            .iter()
            .all(|v| PLANES.iter().all(|plane| plane(v) >= 0.0));
        if all_inside {
            return vec![*triangle];
        }

        let mut polygon: Vec<ClipSpaceVertex> = triangle.to_vec();
        for plane in PLANES {
            polygon = clip_polygon(&polygon, plane);
            if polygon.len() < 3 {
                return vec![];
            }
        }

        // 扇形重新拆成三角形
        (1..polygon.len() - 1)
            .map(|i| [polygon[0], polygon[i], polygon[i + 1]])
            .collect()
    }

    fn clip_line(
        &self,
        a: &ClipSpaceVertex,
        b: &ClipSpaceVertex,
    ) -> Option<[ClipSpaceVertex; 2]> {
        // 参数形式：只收缩 [t0, t1]，不会产生新的边
        let (mut t0, mut t1) = (0.0f32, 1.0f32);
        for plane in PLANES {
            let d_a = plane(a);
            let d_b = plane(b);
            match (d_a >= 0.0, d_b >= 0.0) {
                (true, true) => {}
                (false, false) => return None,
                (true, false) => t1 = t1.min(d_a / (d_a - d_b)),
                (false, true) => t0 = t0.max(d_a / (d_a - d_b)),
            }
            if t0 > t1 {
                return None;
            }
        }
        Some([a.lerp(b, t0), a.lerp(b, t1)])
    }
}

fn clip_polygon(polygon: &[ClipSpaceVertex], plane: PlaneDistance) -> Vec<ClipSpaceVertex> {
    let mut output = Vec::with_capacity(polygon.len() + 1);
    for i in 0..polygon.len() {
        let current = &polygon[i];
        let next = &polygon[(i + 1) % polygon.len()];
        let d_current = plane(current);
        let d_next = plane(next);

        if d_current >= 0.0 {
            output.push(*current);
        }
        // 跨过平面时插入交点
        if (d_current >= 0.0) != (d_next >= 0.0) {
            let t = d_current / (d_current - d_next);
            output.push(current.lerp(next, t));
        }
    }
    output
}
