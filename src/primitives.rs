use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3 as Vec3};

use crate::model::Mesh;
use crate::vertex::{Triangle, Vertex};

/// 边长为 1、中心在原点的立方体
pub fn cube() -> Mesh {
    // (法线, 面上的两个切向量) 保证 u x v = n，逆时针为正面
    let faces: [(Vec3<f32>, Vec3<f32>, Vec3<f32>); 6] = [
        (Vec3::unit_x(), -Vec3::unit_z(), Vec3::unit_y()),
        (-Vec3::unit_x(), Vec3::unit_z(), Vec3::unit_y()),
        (Vec3::unit_y(), Vec3::unit_x(), -Vec3::unit_z()),
        (-Vec3::unit_y(), Vec3::unit_x(), Vec3::unit_z()),
        (Vec3::unit_z(), Vec3::unit_x(), Vec3::unit_y()),
        (-Vec3::unit_z(), -Vec3::unit_x(), Vec3::unit_y()),
    ];

    let mut triangles = Vec::with_capacity(12);
    for (n, u, v) in faces {
        let center = n * 0.5;
        let corner = |su: f32, sv: f32| Vertex::new(center + u * (0.5 * su) + v * (0.5 * sv), n);
        let v0 = corner(-1.0, -1.0);
        let v1 = corner(1.0, -1.0);
        let v2 = corner(1.0, 1.0);
        let v3 = corner(-1.0, 1.0);
        triangles.push(Triangle::new(v0, v1, v2));
        triangles.push(Triangle::new(v2, v3, v0));
    }
    Mesh::new("cube", triangles)
}

/// 半径 0.5、高 1 的圆柱，带上下底面
pub fn cylinder(segments: usize) -> Mesh {
    let segments = segments.max(3);
    let radius = 0.5;
    let half = 0.5;
    let mut triangles = Vec::with_capacity(segments * 4);

    let ring = |i: usize| {
        let theta = 2.0 * PI * i as f32 / segments as f32;
        (theta.cos(), theta.sin())
    };

    for i in 0..segments {
        let (c0, s0) = ring(i);
        let (c1, s1) = ring(i + 1);
        let n0 = Vec3::new(c0, 0.0, -s0);
        let n1 = Vec3::new(c1, 0.0, -s1);
        let b0 = Vertex::new(Vec3::new(radius * c0, -half, -radius * s0), n0);
        let b1 = Vertex::new(Vec3::new(radius * c1, -half, -radius * s1), n1);
        let t0 = Vertex::new(Vec3::new(radius * c0, half, -radius * s0), n0);
        let t1 = Vertex::new(Vec3::new(radius * c1, half, -radius * s1), n1);

        // 侧面
        triangles.push(Triangle::new(b0, b1, t1));
        triangles.push(Triangle::new(t1, t0, b0));

        // 顶面
        let up = Vec3::unit_y();
        triangles.push(Triangle::new(
            Vertex::new(Vec3::new(0.0, half, 0.0), up),
            Vertex::new(t0.pos, up),
            Vertex::new(t1.pos, up),
        ));

        // 底面
        let down = -Vec3::unit_y();
        triangles.push(Triangle::new(
            Vertex::new(Vec3::new(0.0, -half, 0.0), down),
            Vertex::new(b1.pos, down),
            Vertex::new(b0.pos, down),
        ));
    }
    Mesh::new("cylinder", triangles)
}

/// 主半径 0.3、管半径 0.2 的圆环，轴为 y
pub fn torus(major_segments: usize, minor_segments: usize) -> Mesh {
    let major_segments = major_segments.max(3);
    let minor_segments = minor_segments.max(3);
    let major_radius = 0.3;
    let minor_radius = 0.2;

    let vertex = |i: usize, j: usize| {
        let u = 2.0 * PI * i as f32 / major_segments as f32;
        let v = 2.0 * PI * j as f32 / minor_segments as f32;
        // 管截面中心
        let center = Vec3::new(u.cos(), 0.0, -u.sin()) * major_radius;
        let normal = Vec3::new(v.cos() * u.cos(), v.sin(), -v.cos() * u.sin());
        Vertex::new(center + normal * minor_radius, normal)
    };

    let mut triangles = Vec::with_capacity(major_segments * minor_segments * 2);
    for i in 0..major_segments {
        for j in 0..minor_segments {
            let v00 = vertex(i, j);
            let v10 = vertex(i + 1, j);
            let v11 = vertex(i + 1, j + 1);
            let v01 = vertex(i, j + 1);
            triangles.push(Triangle::new(v00, v10, v11));
            triangles.push(Triangle::new(v11, v01, v00));
        }
    }
    Mesh::new("torus", triangles)
}

/// 半径 0.5 的经纬球，兔子模型缺失时用它代替
pub fn sphere(slices: usize, stacks: usize) -> Mesh {
    let slices = slices.max(3);
    let stacks = stacks.max(2);
    let radius = 0.5;

    let vertex = |i: usize, j: usize| {
        let phi = PI * j as f32 / stacks as f32;
        let theta = 2.0 * PI * i as f32 / slices as f32;
        let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), -phi.sin() * theta.sin());
        Vertex::new(normal * radius, normal.normalize())
    };

    let mut triangles = Vec::with_capacity(slices * stacks * 2);
    for j in 0..stacks {
        for i in 0..slices {
            let v00 = vertex(i, j);
            let v10 = vertex(i + 1, j);
            let v11 = vertex(i + 1, j + 1);
            let v01 = vertex(i, j + 1);
            // 两极处退化的三角形直接跳过
            if j + 1 != stacks {
                triangles.push(Triangle::new(v00, v01, v11));
            }
            if j != 0 {
                triangles.push(Triangle::new(v11, v10, v00));
            }
        }
    }
    Mesh::new("sphere", triangles)
}
