use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::error::{Result, ViewerError};
use crate::light::Light;
use crate::vertex::EditableMaterial;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingModel {
    Phong,
    Gouraud,
}

impl ShadingModel {
    pub fn name(self) -> &'static str {
        match self {
            ShadingModel::Phong => "Phong",
            ShadingModel::Gouraud => "Gouraud",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ShadingModel::Phong => ShadingModel::Gouraud,
            ShadingModel::Gouraud => ShadingModel::Phong,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub wireframe: bool,
    /// 把法线当作颜色输出
    pub normals: bool,
    pub backface_culling: bool,
    pub depth_test: bool,
    pub shading_model: ShadingModel,
    /// 0~255
    pub global_ambient: [f32; 3],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wireframe: false,
            normals: false,
            backface_culling: true,
            depth_test: true,
            shading_model: ShadingModel::Phong,
            global_ambient: [30.0, 30.0, 30.0],
        }
    }
}

/// 面板能改到的全部状态，也是 json 配置文件的内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub camera: Camera,
    pub options: RenderOptions,
    pub lights: Vec<Light>,
    pub bunny_material: EditableMaterial,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            options: RenderOptions::default(),
            lights: Light::default_set(),
            bunny_material: EditableMaterial::default(),
        }
    }
}

impl ViewerSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| ViewerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: ViewerSettings =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ViewerError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        settings.camera.sanitize();
        tracing::info!("成功读取配置 {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| ViewerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|source| {
            ViewerError::Config {
                path: path.to_path_buf(),
                source,
            }
        })?;
        tracing::info!("配置已保存到 {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;
    use std::io::Write;

    #[test]
    fn defaults_match_initial_panel_state() {
        let settings = ViewerSettings::default();
        assert!(settings.options.backface_culling);
        assert!(settings.options.depth_test);
        assert!(!settings.options.wireframe);
        assert_eq!(settings.options.shading_model, ShadingModel::Phong);
        assert_eq!(settings.options.global_ambient, [30.0; 3]);
        assert_eq!(settings.lights.len(), 3);
    }

    #[test]
    fn save_then_load_preserves_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");

        let mut settings = ViewerSettings::default();
        settings.options.shading_model = ShadingModel::Gouraud;
        settings.lights[1].enabled = true;
        settings.camera.set_fovy(60.0);
        settings.save(&path).unwrap();

        let loaded = ViewerSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"{{ "options": {{ "wireframe": true }}, "camera": {{ "fovy": 30.0 }} }}"#
        )
        .unwrap();
        drop(file);

        let loaded = ViewerSettings::load(&path).unwrap();
        assert!(loaded.options.wireframe);
        assert!(loaded.options.depth_test);
        assert_eq!(loaded.camera.fovy, 30.0);
        assert_eq!(loaded.camera.far, 20.0);
        assert_eq!(loaded.lights[0].kind, LightKind::Spotlight);
    }

    #[test]
    fn out_of_range_camera_is_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camera.json");
        std::fs::write(&path, r#"{ "camera": { "fovy": 0.0, "near": 15.0, "far": 5.0 } }"#)
            .unwrap();

        let camera = ViewerSettings::load(&path).unwrap().camera;
        assert_eq!(camera.fovy, Camera::MIN_FOVY);
        assert_eq!(camera.near, 15.0);
        assert!(camera.far - camera.near >= Camera::CLIP_GAP);
        assert!(camera.far <= Camera::MAX_CLIP);
    }

    #[test]
    fn malformed_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = ViewerSettings::load(&path).unwrap_err();
        assert!(matches!(err, ViewerError::Config { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn missing_config_is_io_error() {
        let err = ViewerSettings::load(Path::new("no/such/scene.json")).unwrap_err();
        assert!(matches!(err, ViewerError::Io { .. }));
    }
}
