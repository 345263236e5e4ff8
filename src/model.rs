use crate::error::{Result, ViewerError};
use crate::vertex::{Triangle, Vertex};
use cgmath::{InnerSpace, Vector3 as Vec3, Zero};
use obj::{Obj, ObjData};
use std::path::Path;

/// 一组三角形，模型空间
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, triangles: Vec<Triangle>) -> Self {
        Self {
            name: name.into(),
            triangles,
        }
    }

    /// 包围盒 (min, max)
    pub fn bounds(&self) -> (Vec3<f32>, Vec3<f32>) {
        let mut min = Vec3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Vec3::new(f32::MIN, f32::MIN, f32::MIN);
        for v in self.triangles.iter().flat_map(|t| t.vertices.iter()) {
            min = Vec3::new(min.x.min(v.pos.x), min.y.min(v.pos.y), min.z.min(v.pos.z));
            max = Vec3::new(max.x.max(v.pos.x), max.y.max(v.pos.y), max.z.max(v.pos.z));
        }
        (min, max)
    }

    /// 平移缩放到以原点为中心、最长边为 1 的包围盒里
    pub fn normalize_to_unit_box(&mut self) {
        if self.triangles.is_empty() {
            return;
        }
        let (min, max) = self.bounds();
        let center = (min + max) * 0.5;
        let extent = max - min;
        let longest = extent.x.max(extent.y).max(extent.z);
        if longest <= 0.0 {
            return;
        }
        let scale = 1.0 / longest;
        for tri in &mut self.triangles {
            for v in &mut tri.vertices {
                v.pos = (v.pos - center) * scale;
            }
        }
    }
}

pub fn load_obj(path: &Path) -> Result<Mesh> {
    let obj = Obj::load(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "obj".to_string());
    let mesh = mesh_from_obj_data(&name, &obj.data);
    if mesh.triangles.is_empty() {
        return Err(ViewerError::EmptyMesh(path.to_path_buf()));
    }
    tracing::info!(
        "已加载模型 {}，三角形数量：{}",
        path.display(),
        mesh.triangles.len()
    );
    Ok(mesh)
}

/// 从内存中的 OBJ 文本读取，用于编译进程序的模型
pub fn load_obj_str(name: &str, src: &str) -> Result<Mesh> {
    let data = ObjData::load_buf(src.as_bytes())?;
    let mesh = mesh_from_obj_data(name, &data);
    if mesh.triangles.is_empty() {
        return Err(ViewerError::EmptyMesh(name.into()));
    }
    tracing::debug!("内置模型 {name}，三角形数量：{}", mesh.triangles.len());
    Ok(mesh)
}

/// 多边形按扇形拆成三角形；文件没有法线时用相邻面法线的平均值
pub fn mesh_from_obj_data(name: &str, data: &ObjData) -> Mesh {
    let positions: Vec<Vec3<f32>> = data
        .position
        .iter()
        .map(|pos| Vec3::new(pos[0], pos[1], pos[2]))
        .collect();
    let file_normals: Vec<Vec3<f32>> = data
        .normal
        .iter()
        .map(|n| Vec3::new(n[0], n[1], n[2]))
        .collect();

    // 每个三角形存 (位置索引, 法线索引)
    let mut faces: Vec<[(usize, Option<usize>); 3]> = Vec::new();
    for object in &data.objects {
        for group in &object.groups {
            for poly in &group.polys {
                let indices: Vec<(usize, Option<usize>)> = poly
                    .0
                    .iter()
                    .filter(|idx| idx.0 < positions.len())
                    .map(|idx| (idx.0, idx.2.filter(|&n| n < file_normals.len())))
                    .collect();
                for k in 1..indices.len().saturating_sub(1) {
                    faces.push([indices[0], indices[k], indices[k + 1]]);
                }
            }
        }
    }

    // 计算每个顶点的法线（平均相邻面的法线）
    let mut smooth = vec![Vec3::zero(); positions.len()];
    for face in &faces {
        let v0 = positions[face[0].0];
        let v1 = positions[face[1].0];
        let v2 = positions[face[2].0];
        let face_normal = (v1 - v0).cross(v2 - v0);
        for &(idx, _) in face {
            smooth[idx] += face_normal;
        }
    }
    for n in &mut smooth {
        if n.magnitude2() > 0.0 {
            *n = n.normalize();
        }
    }

    let triangles = faces
        .iter()
        .map(|face| {
            let vertices = face.map(|(pi, ni)| {
                let normal = ni.map(|n| file_normals[n]).unwrap_or(smooth[pi]);
                Vertex::new(positions[pi], normal)
            });
            let mut tri = Triangle::new(vertices[0], vertices[1], vertices[2]);
            // 相邻面法线互相抵消时退回到面法线
            let flat = tri.face_normal();
            for v in &mut tri.vertices {
                if v.normal.magnitude2() == 0.0 {
                    v.normal = flat;
                }
            }
            tri
        })
        .collect();

    Mesh::new(name, triangles)
}
