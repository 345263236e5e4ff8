use crate::vertex::RasterPoint;
use cgmath::{Vector2 as Vec2, Vector3 as Vec3};

/// 有向面积的两倍，逆时针（y 轴向下时为顺时针）为正
pub fn edge_function(a: Vec2<f32>, b: Vec2<f32>, p: Vec2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// 返回三个顶点各自的重心权重，三角形退化时返回 None
pub fn get_barycentric_coords(vertices: &[Vec2<f32>; 3], p: &Vec2<f32>) -> Option<[f32; 3]> {
    let area = edge_function(vertices[0], vertices[1], vertices[2]);
    if area.abs() < 1e-8 {
        return None;
    }
    let w0 = edge_function(vertices[1], vertices[2], *p) / area;
    let w1 = edge_function(vertices[2], vertices[0], *p) / area;
    let w2 = 1.0 - w0 - w1;
    Some([w0, w1, w2])
}

pub fn is_inside(bary: &[f32; 3]) -> bool {
    bary.iter().all(|&b| b >= 0.0)
}

/// 包围盒，裁剪到 [0, width) x [0, height)，完全在屏幕外时返回 None
pub fn get_box(
    vertices: &[Vec2<f32>; 3],
    width: usize,
    height: usize,
) -> Option<(usize, usize, usize, usize)> {
    let min_x = vertices.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
    let max_x = vertices.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = vertices.iter().map(|v| v.y).fold(f32::INFINITY, f32::min);
    let max_y = vertices.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);

    if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_x < 0.0 || max_y < 0.0 || min_x >= width as f32 || min_y >= height as f32 {
        return None;
    }

    let x0 = min_x.floor().max(0.0) as usize;
    let y0 = min_y.floor().max(0.0) as usize;
    let x1 = (max_x.ceil() as usize).min(width.saturating_sub(1));
    let y1 = (max_y.ceil() as usize).min(height.saturating_sub(1));
    Some((x0, y0, x1, y1))
}

/// 深度在屏幕空间里是线性的
pub fn interpolate_depth(points: &[RasterPoint; 3], bary: [f32; 3]) -> f32 {
    points[0].z * bary[0] + points[1].z * bary[1] + points[2].z * bary[2]
}

/// 透视校正后的权重：b_i / w_i 再归一化
pub fn perspective_weights(points: &[RasterPoint; 3], bary: [f32; 3]) -> [f32; 3] {
    let w = [
        bary[0] * points[0].inv_w,
        bary[1] * points[1].inv_w,
        bary[2] * points[2].inv_w,
    ];
    let sum = w[0] + w[1] + w[2];
    if sum.abs() < f32::EPSILON {
        return bary;
    }
    [w[0] / sum, w[1] / sum, w[2] / sum]
}

pub fn interpolate_vec3(values: [Vec3<f32>; 3], weights: [f32; 3]) -> Vec3<f32> {
    values[0] * weights[0] + values[1] * weights[1] + values[2] * weights[2]
}

/// 两点之间做透视校正的插值，用于线框模式
pub fn lerp_raster_point(a: &RasterPoint, b: &RasterPoint, t: f32) -> RasterPoint {
    let inv_w = a.inv_w + (b.inv_w - a.inv_w) * t;
    let (wa, wb) = if inv_w.abs() < f32::EPSILON {
        (1.0 - t, t)
    } else {
        (a.inv_w * (1.0 - t) / inv_w, b.inv_w * t / inv_w)
    };
    RasterPoint {
        pos: a.pos + (b.pos - a.pos) * t,
        z: a.z + (b.z - a.z) * t,
        inv_w,
        view_pos: a.view_pos * wa + b.view_pos * wb,
        normal: a.normal * wa + b.normal * wb,
        color: a.color * wa + b.color * wb,
    }
}

/// Liang-Barsky 裁剪，返回线段落在屏幕矩形内的参数区间 [t0, t1]
pub fn clip_segment_to_rect(
    a: Vec2<f32>,
    b: Vec2<f32>,
    width: usize,
    height: usize,
) -> Option<(f32, f32)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    let max_x = width as f32 - 1.0;
    let max_y = height as f32 - 1.0;

    let edges = [
        (-d.x, a.x),
        (d.x, max_x - a.x),
        (-d.y, a.y),
        (d.y, max_y - a.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// 布雷森汉姆算法，返回线段经过的像素
pub fn line_pixels(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let mut x0 = x0;
    let mut y0 = y0;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let mut pixels = Vec::with_capacity((dx.max(dy) + 1) as usize);
    loop {
        pixels.push((x0, y0));

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
    pixels
}
