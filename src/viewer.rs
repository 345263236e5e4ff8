use std::path::PathBuf;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::config::ViewerSettings;
use crate::error::Result;
use crate::input::{self, DragState, Modifiers};
use crate::panel::Panel;
use crate::renderer::{FrameStats, Renderer};
use crate::scene::Scene;

/// 按住 Shift 时面板调整的倍数
const FAST_STEPS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleWireframe,
    ToggleNormals,
    ToggleCulling,
    ToggleDepthTest,
    ToggleShading,
    ToggleLight(usize),
    ResetCamera,
    Screenshot,
    SaveSettings,
    DumpPanel,
    SelectNext,
    SelectPrev,
    Adjust(i32),
    Activate,
    Quit,
}

pub fn command_for_key(key: Key, shift: bool) -> Option<Command> {
    let steps = if shift { FAST_STEPS } else { 1 };
    let cmd = match key {
        Key::W => Command::ToggleWireframe,
        Key::N => Command::ToggleNormals,
        Key::B => Command::ToggleCulling,
        Key::D => Command::ToggleDepthTest,
        Key::G => Command::ToggleShading,
        Key::Key1 => Command::ToggleLight(0),
        Key::Key2 => Command::ToggleLight(1),
        Key::Key3 => Command::ToggleLight(2),
        Key::R => Command::ResetCamera,
        Key::P => Command::Screenshot,
        Key::S => Command::SaveSettings,
        Key::H => Command::DumpPanel,
        Key::Down => Command::SelectNext,
        Key::Up => Command::SelectPrev,
        Key::Right => Command::Adjust(steps),
        Key::Left => Command::Adjust(-steps),
        Key::Space | Key::Enter => Command::Activate,
        Key::Escape => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

pub struct Viewer {
    scene: Scene,
    settings: ViewerSettings,
    settings_path: PathBuf,
    panel: Panel,
    renderer: Renderer,
    drag: DragState,
    pub screenshot_dir: PathBuf,
    screenshot_count: usize,
    last_stats: FrameStats,
}

impl Viewer {
    pub fn new(
        scene: Scene,
        mut settings: ViewerSettings,
        settings_path: PathBuf,
        width: usize,
        height: usize,
    ) -> Self {
        settings.camera.set_aspect(width, height);
        let panel = Panel::new(settings.lights.len());
        Self {
            scene,
            settings,
            settings_path,
            panel,
            renderer: Renderer::new(width, height),
            drag: DragState::default(),
            screenshot_dir: PathBuf::from("."),
            screenshot_count: 0,
            last_stats: FrameStats::default(),
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn render_frame(&mut self) -> FrameStats {
        self.last_stats = self.renderer.render_scene(&self.scene, &self.settings);
        self.last_stats
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width == 0 || height == 0 {
            return;
        }
        let fb = self.renderer.framebuffer();
        if fb.width == width && fb.height == height {
            return;
        }
        tracing::debug!("窗口大小变为 {width}x{height}");
        self.renderer.resize(width, height);
        self.settings.camera.set_aspect(width, height);
    }

    /// 返回 false 表示退出
    pub fn apply(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::ToggleWireframe => self.settings.options.wireframe ^= true,
            Command::ToggleNormals => self.settings.options.normals ^= true,
            Command::ToggleCulling => self.settings.options.backface_culling ^= true,
            Command::ToggleDepthTest => self.settings.options.depth_test ^= true,
            Command::ToggleShading => {
                let options = &mut self.settings.options;
                options.shading_model = options.shading_model.toggled();
            }
            Command::ToggleLight(i) => {
                if let Some(light) = self.settings.lights.get_mut(i) {
                    light.enabled = !light.enabled;
                    tracing::info!("Light{} {}", i + 1, if light.enabled { "开" } else { "关" });
                }
            }
            Command::ResetCamera => self.settings.camera.reset(),
            Command::Screenshot => self.save_screenshot(),
            Command::SaveSettings => {
                if let Err(err) = self.settings.save(&self.settings_path) {
                    tracing::error!("{err}");
                }
            }
            Command::DumpPanel => {
                self.panel.dump(&self.settings);
                tracing::info!(
                    "三角形：{}，剔除：{}，裁掉：{}，光栅化：{}",
                    self.last_stats.triangles,
                    self.last_stats.culled,
                    self.last_stats.clipped,
                    self.last_stats.rasterized
                );
            }
            Command::SelectNext => self.panel.select_next(),
            Command::SelectPrev => self.panel.select_prev(),
            Command::Adjust(steps) => self.panel.adjust(&mut self.settings, steps),
            Command::Activate => self.panel.activate(&mut self.settings),
            Command::Quit => return false,
        }
        true
    }

    fn save_screenshot(&mut self) {
        let path = self
            .screenshot_dir
            .join(format!("screenshot_{:03}.png", self.screenshot_count));
        match self.renderer.framebuffer().save_to_image(&path) {
            Ok(()) => {
                self.screenshot_count += 1;
                tracing::info!("截图已保存到 {}", path.display());
            }
            Err(err) => tracing::error!("截图保存失败 {}: {err}", path.display()),
        }
    }

    pub fn title(&self) -> String {
        self.panel.title(self.settings())
    }

    /// 打开窗口，直到关闭或者按下 Esc
    pub fn run(mut self) -> Result<()> {
        let (width, height) = {
            let fb = self.renderer.framebuffer();
            (fb.width, fb.height)
        };
        let mut window = Window::new(
            "scene-viewer",
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(60);
        let mut title = String::new();

        while window.is_open() {
            let (w, h) = window.get_size();
            self.resize(w, h);

            let mods = Modifiers {
                shift: window.is_key_down(Key::LeftShift) || window.is_key_down(Key::RightShift),
                ctrl: window.is_key_down(Key::LeftCtrl) || window.is_key_down(Key::RightCtrl),
                alt: window.is_key_down(Key::LeftAlt) || window.is_key_down(Key::RightAlt),
                meta: window.is_key_down(Key::LeftSuper) || window.is_key_down(Key::RightSuper),
            };

            let mut running = true;
            for key in window.get_keys_pressed(KeyRepeat::Yes) {
                if let Some(cmd) = command_for_key(key, mods.shift) {
                    running &= self.apply(cmd);
                }
            }
            if !running {
                break;
            }

            // 鼠标拖动旋转
            let pressed = window.get_mouse_down(MouseButton::Left);
            if let Some((dx, dy)) = self.drag.update(window.get_mouse_pos(MouseMode::Pass), pressed)
            {
                self.settings.camera.orbit(dx, dy);
            }

            if let Some((_, scroll_y)) = window.get_scroll_wheel() {
                input::apply_wheel(&mut self.settings.camera, input::wheel_action(scroll_y, mods));
            }

            self.render_frame();

            let new_title = self.title();
            if new_title != title {
                window.set_title(&new_title);
                title = new_title;
            }

            let fb = self.renderer.framebuffer();
            window.update_with_buffer(&fb.data, fb.width, fb.height)?;
        }

        tracing::info!("窗口已关闭");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShadingModel;
    use crate::primitives;

    fn viewer(dir: &std::path::Path) -> Viewer {
        let mut viewer = Viewer::new(
            Scene::new(primitives::sphere(8, 4)),
            ViewerSettings::default(),
            dir.join("settings.json"),
            32,
            24,
        );
        viewer.screenshot_dir = dir.to_path_buf();
        viewer
    }

    #[test]
    fn shortcuts_map_to_commands() {
        assert_eq!(command_for_key(Key::W, false), Some(Command::ToggleWireframe));
        assert_eq!(command_for_key(Key::Key2, false), Some(Command::ToggleLight(1)));
        assert_eq!(command_for_key(Key::Right, true), Some(Command::Adjust(FAST_STEPS)));
        assert_eq!(command_for_key(Key::Left, false), Some(Command::Adjust(-1)));
        assert_eq!(command_for_key(Key::Z, false), None);
    }

    #[test]
    fn toggles_change_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = viewer(dir.path());
        assert!(viewer.apply(Command::ToggleShading));
        assert!(viewer.apply(Command::ToggleLight(2)));
        assert!(viewer.apply(Command::ToggleLight(7)));
        assert_eq!(viewer.settings().options.shading_model, ShadingModel::Gouraud);
        assert!(viewer.settings().lights[2].enabled);
        assert!(!viewer.apply(Command::Quit));
    }

    #[test]
    fn resize_updates_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = viewer(dir.path());
        viewer.resize(200, 100);
        assert_eq!(viewer.settings().camera.aspect, 2.0);
        assert_eq!(viewer.renderer.framebuffer().data.len(), 200 * 100);
        viewer.resize(0, 100);
        assert_eq!(viewer.settings().camera.aspect, 2.0);
    }

    #[test]
    fn reset_restores_camera_but_keeps_aspect() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = viewer(dir.path());
        viewer.settings.camera.orbit(40.0, 10.0);
        viewer.apply(Command::ResetCamera);
        assert_eq!(viewer.settings().camera.eye, crate::camera::Camera::default().eye);
        assert_eq!(viewer.settings().camera.aspect, 32.0 / 24.0);
    }

    #[test]
    fn save_and_screenshot_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = viewer(dir.path());
        viewer.render_frame();
        viewer.apply(Command::Screenshot);
        viewer.apply(Command::Screenshot);
        viewer.apply(Command::SaveSettings);
        assert!(dir.path().join("screenshot_000.png").exists());
        assert!(dir.path().join("screenshot_001.png").exists());

        let saved = ViewerSettings::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(&saved, viewer.settings());
    }

    #[test]
    fn panel_commands_reach_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut viewer = viewer(dir.path());
        // 第一项是着色模型
        viewer.apply(Command::Activate);
        assert_eq!(viewer.settings().options.shading_model, ShadingModel::Gouraud);
        viewer.apply(Command::SelectNext);
        viewer.apply(Command::Adjust(-FAST_STEPS));
        assert_eq!(viewer.settings().options.global_ambient[0], 0.0);
        assert!(viewer.title().contains("Global Ambient/r = 0"));
    }
}
