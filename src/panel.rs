use crate::camera::Camera;
use crate::config::ViewerSettings;
use crate::light::{Light, LightKind};
use crate::vertex::EditableMaterial;

/// 面板上一个控件绑定的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    ShadingModel,
    GlobalAmbient(usize),
    Wireframe,
    Normals,
    BackfaceCulling,
    DepthTest,
    Fovy,
    Near,
    Far,
    Eye(usize),
    At(usize),
    Up(usize),
    LightEnabled(usize),
    LightKind(usize),
    LightPosition(usize, usize),
    LightAmbient(usize, usize),
    LightDiffuse(usize, usize),
    LightSpecular(usize, usize),
    LightAxis(usize, usize),
    LightAperture(usize),
    LightCutoff(usize),
    Ka(usize),
    Kd(usize),
    Ks(usize),
    Shininess,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Toggle,
    Choice,
    Number { min: f32, max: f32, step: f32 },
}

/// 0~255 的颜色通道
const CHANNEL: ControlKind = ControlKind::Number {
    min: 0.0,
    max: 255.0,
    step: 5.0,
};

/// eye/at/up 没有范围限制
const FREE_COORD: ControlKind = ControlKind::Number {
    min: f32::MIN,
    max: f32::MAX,
    step: 0.05,
};

const XYZ: [&str; 3] = ["x", "y", "z"];
const RGB: [&str; 3] = ["r", "g", "b"];

impl Target {
    pub fn kind(self) -> ControlKind {
        use ControlKind::Number;
        match self {
            Target::Wireframe
            | Target::Normals
            | Target::BackfaceCulling
            | Target::DepthTest
            | Target::LightEnabled(_) => ControlKind::Toggle,
            Target::ShadingModel | Target::LightKind(_) => ControlKind::Choice,
            Target::GlobalAmbient(_)
            | Target::LightAmbient(..)
            | Target::LightDiffuse(..)
            | Target::LightSpecular(..)
            | Target::Ka(_)
            | Target::Kd(_)
            | Target::Ks(_) => CHANNEL,
            Target::Eye(_) | Target::At(_) | Target::Up(_) => FREE_COORD,
            Target::Fovy => Number {
                min: Camera::MIN_FOVY,
                max: Camera::MAX_FOVY,
                step: 1.0,
            },
            Target::Near | Target::Far => Number {
                min: Camera::MIN_CLIP,
                max: Camera::MAX_CLIP,
                step: 0.01,
            },
            Target::LightPosition(..) => Number {
                min: -10.0,
                max: 10.0,
                step: 0.1,
            },
            Target::LightAxis(..) => Number {
                min: -1.0,
                max: 1.0,
                step: 0.1,
            },
            Target::LightAperture(_) => Number {
                min: Light::MIN_APERTURE,
                max: Light::MAX_APERTURE,
                step: 1.0,
            },
            Target::LightCutoff(_) => Number {
                min: Light::MIN_CUTOFF,
                max: Light::MAX_CUTOFF,
                step: 0.1,
            },
            Target::Shininess => Number {
                min: EditableMaterial::MIN_SHININESS,
                max: EditableMaterial::MAX_SHININESS,
                step: 1.0,
            },
        }
    }

    fn flag(self, s: &ViewerSettings) -> Option<bool> {
        match self {
            Target::Wireframe => Some(s.options.wireframe),
            Target::Normals => Some(s.options.normals),
            Target::BackfaceCulling => Some(s.options.backface_culling),
            Target::DepthTest => Some(s.options.depth_test),
            Target::LightEnabled(i) => s.lights.get(i).map(|l| l.enabled),
            _ => None,
        }
    }

    fn flag_mut(self, s: &mut ViewerSettings) -> Option<&mut bool> {
        match self {
            Target::Wireframe => Some(&mut s.options.wireframe),
            Target::Normals => Some(&mut s.options.normals),
            Target::BackfaceCulling => Some(&mut s.options.backface_culling),
            Target::DepthTest => Some(&mut s.options.depth_test),
            Target::LightEnabled(i) => s.lights.get_mut(i).map(|l| &mut l.enabled),
            _ => None,
        }
    }

    fn number(self, s: &ViewerSettings) -> Option<f32> {
        match self {
            Target::GlobalAmbient(c) => Some(s.options.global_ambient[c]),
            Target::Fovy => Some(s.camera.fovy),
            Target::Near => Some(s.camera.near),
            Target::Far => Some(s.camera.far),
            Target::Eye(c) => Some(s.camera.eye[c]),
            Target::At(c) => Some(s.camera.at[c]),
            Target::Up(c) => Some(s.camera.up[c]),
            Target::LightPosition(i, c) => s.lights.get(i).map(|l| l.position[c]),
            Target::LightAmbient(i, c) => s.lights.get(i).map(|l| l.ambient[c]),
            Target::LightDiffuse(i, c) => s.lights.get(i).map(|l| l.diffuse[c]),
            Target::LightSpecular(i, c) => s.lights.get(i).map(|l| l.specular[c]),
            Target::LightAxis(i, c) => s.lights.get(i).map(|l| l.axis[c]),
            Target::LightAperture(i) => s.lights.get(i).map(|l| l.aperture),
            Target::LightCutoff(i) => s.lights.get(i).map(|l| l.cutoff),
            Target::Ka(c) => Some(s.bunny_material.ka[c]),
            Target::Kd(c) => Some(s.bunny_material.kd[c]),
            Target::Ks(c) => Some(s.bunny_material.ks[c]),
            Target::Shininess => Some(s.bunny_material.shininess),
            _ => None,
        }
    }

    /// 普通的数值参数，fovy/near/far 走相机自己的 setter
    fn number_mut(self, s: &mut ViewerSettings) -> Option<&mut f32> {
        match self {
            Target::GlobalAmbient(c) => Some(&mut s.options.global_ambient[c]),
            Target::Eye(c) => Some(&mut s.camera.eye[c]),
            Target::At(c) => Some(&mut s.camera.at[c]),
            Target::Up(c) => Some(&mut s.camera.up[c]),
            Target::LightPosition(i, c) => s.lights.get_mut(i).map(|l| &mut l.position[c]),
            Target::LightAmbient(i, c) => s.lights.get_mut(i).map(|l| &mut l.ambient[c]),
            Target::LightDiffuse(i, c) => s.lights.get_mut(i).map(|l| &mut l.diffuse[c]),
            Target::LightSpecular(i, c) => s.lights.get_mut(i).map(|l| &mut l.specular[c]),
            Target::LightAxis(i, c) => s.lights.get_mut(i).map(|l| &mut l.axis[c]),
            Target::LightAperture(i) => s.lights.get_mut(i).map(|l| &mut l.aperture),
            Target::LightCutoff(i) => s.lights.get_mut(i).map(|l| &mut l.cutoff),
            Target::Ka(c) => Some(&mut s.bunny_material.ka[c]),
            Target::Kd(c) => Some(&mut s.bunny_material.kd[c]),
            Target::Ks(c) => Some(&mut s.bunny_material.ks[c]),
            Target::Shininess => Some(&mut s.bunny_material.shininess),
            _ => None,
        }
    }

    fn set_number(self, s: &mut ViewerSettings, value: f32) {
        match self {
            Target::Fovy => s.camera.set_fovy(value),
            Target::Near => s.camera.set_near(value),
            Target::Far => s.camera.set_far(value),
            _ => {
                if let Some(slot) = self.number_mut(s) {
                    *slot = value;
                }
            }
        }
    }

    /// 在可选项之间循环，`forward` 为假时反向
    fn cycle(self, s: &mut ViewerSettings, forward: bool) {
        match self {
            Target::ShadingModel => s.options.shading_model = s.options.shading_model.toggled(),
            Target::LightKind(i) => {
                if let Some(light) = s.lights.get_mut(i) {
                    let all = LightKind::ALL;
                    let idx = all.iter().position(|&k| k == light.kind).unwrap_or(0);
                    let next = if forward {
                        (idx + 1) % all.len()
                    } else {
                        (idx + all.len() - 1) % all.len()
                    };
                    light.kind = all[next];
                }
            }
            _ => {}
        }
    }

    fn choice_name(self, s: &ViewerSettings) -> Option<&'static str> {
        match self {
            Target::ShadingModel => Some(s.options.shading_model.name()),
            Target::LightKind(i) => s.lights.get(i).map(|l| l.kind.name()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Control {
    /// 形如 `lights/Light1/position/x`
    pub path: String,
    pub target: Target,
}

/// 键盘操作的参数面板，当前选中项显示在窗口标题上
pub struct Panel {
    controls: Vec<Control>,
    selected: usize,
}

impl Panel {
    pub fn new(light_count: usize) -> Self {
        let mut controls = Vec::new();
        let mut add = |path: String, target: Target| controls.push(Control { path, target });

        add("options/Shading Model".into(), Target::ShadingModel);
        for (c, name) in RGB.iter().enumerate() {
            add(format!("options/Global Ambient/{name}"), Target::GlobalAmbient(c));
        }
        add("options/wireframe".into(), Target::Wireframe);
        add("options/normals".into(), Target::Normals);
        add("options/backface culling".into(), Target::BackfaceCulling);
        add("options/depth test".into(), Target::DepthTest);

        add("camera/fovy".into(), Target::Fovy);
        add("camera/near".into(), Target::Near);
        add("camera/far".into(), Target::Far);
        for (c, axis) in XYZ.iter().enumerate() {
            add(format!("camera/eye/{axis}"), Target::Eye(c));
        }
        for (c, axis) in XYZ.iter().enumerate() {
            add(format!("camera/at/{axis}"), Target::At(c));
        }
        for (c, axis) in XYZ.iter().enumerate() {
            add(format!("camera/up/{axis}"), Target::Up(c));
        }

        for i in 0..light_count {
            let folder = format!("lights/Light{}", i + 1);
            add(format!("{folder}/enabled"), Target::LightEnabled(i));
            add(format!("{folder}/type"), Target::LightKind(i));
            for (c, axis) in XYZ.iter().enumerate() {
                add(format!("{folder}/position/{axis}"), Target::LightPosition(i, c));
            }
            for (c, ch) in RGB.iter().enumerate() {
                add(format!("{folder}/intensities/ambient/{ch}"), Target::LightAmbient(i, c));
            }
            for (c, ch) in RGB.iter().enumerate() {
                add(format!("{folder}/intensities/diffuse/{ch}"), Target::LightDiffuse(i, c));
            }
            for (c, ch) in RGB.iter().enumerate() {
                add(format!("{folder}/intensities/specular/{ch}"), Target::LightSpecular(i, c));
            }
            for (c, axis) in XYZ.iter().enumerate() {
                add(format!("{folder}/axis/{axis}"), Target::LightAxis(i, c));
            }
            add(format!("{folder}/aperture"), Target::LightAperture(i));
            add(format!("{folder}/cutoff"), Target::LightCutoff(i));
        }

        for (c, ch) in RGB.iter().enumerate() {
            add(format!("material/Ka/{ch}"), Target::Ka(c));
        }
        for (c, ch) in RGB.iter().enumerate() {
            add(format!("material/Kd/{ch}"), Target::Kd(c));
        }
        for (c, ch) in RGB.iter().enumerate() {
            add(format!("material/Ks/{ch}"), Target::Ks(c));
        }
        add("material/shininess".into(), Target::Shininess);

        Self {
            controls,
            selected: 0,
        }
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn selected(&self) -> &Control {
        &self.controls[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.controls.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + self.controls.len() - 1) % self.controls.len();
    }

    /// 左右键：数值按步长增减，开关和选项同样生效
    pub fn adjust(&self, settings: &mut ViewerSettings, steps: i32) {
        if steps == 0 {
            return;
        }
        let target = self.selected().target;
        match target.kind() {
            ControlKind::Toggle => {
                if let Some(flag) = target.flag_mut(settings) {
                    *flag = !*flag;
                }
            }
            ControlKind::Choice => target.cycle(settings, steps > 0),
            ControlKind::Number { min, max, step } => {
                if let Some(value) = target.number(settings) {
                    let next = (value + step * steps as f32).clamp(min, max);
                    target.set_number(settings, next);
                }
            }
        }
    }

    /// 空格/回车：切换开关或切到下一个选项
    pub fn activate(&self, settings: &mut ViewerSettings) {
        let target = self.selected().target;
        match target.kind() {
            ControlKind::Toggle | ControlKind::Choice => self.adjust(settings, 1),
            ControlKind::Number { .. } => {}
        }
    }

    pub fn value_text(&self, settings: &ViewerSettings, target: Target) -> String {
        match target.kind() {
            ControlKind::Toggle => match target.flag(settings) {
                Some(true) => "on".to_string(),
                Some(false) => "off".to_string(),
                None => "-".to_string(),
            },
            ControlKind::Choice => target.choice_name(settings).unwrap_or("-").to_string(),
            ControlKind::Number { step, .. } => match target.number(settings) {
                Some(v) if step >= 1.0 => format!("{v:.0}"),
                Some(v) if step >= 0.1 => format!("{v:.1}"),
                Some(v) => format!("{v:.2}"),
                None => "-".to_string(),
            },
        }
    }

    pub fn title(&self, settings: &ViewerSettings) -> String {
        let control = self.selected();
        format!(
            "scene-viewer | {} = {} | Up/Down 选择 Left/Right 调整 H 帮助",
            control.path,
            self.value_text(settings, control.target)
        )
    }

    /// 把所有参数打印到日志里
    pub fn dump(&self, settings: &ViewerSettings) {
        for (i, control) in self.controls().iter().enumerate() {
            let marker = if i == self.selected { ">" } else { " " };
            tracing::info!(
                "{marker} {} = {}",
                control.path,
                self.value_text(settings, control.target)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShadingModel;
    use approx::assert_relative_eq;

    fn select(panel: &mut Panel, path: &str) {
        let idx = panel
            .controls()
            .iter()
            .position(|c| c.path == path)
            .unwrap_or_else(|| panic!("no control {path}"));
        while panel.selected().path != panel.controls()[idx].path {
            panel.select_next();
        }
    }

    #[test]
    fn every_folder_is_present() {
        let panel = Panel::new(3);
        // options 8, camera 12, 每盏灯 19, material 10
        assert_eq!(panel.controls().len(), 8 + 12 + 3 * 19 + 10);
        for folder in ["options/", "camera/", "lights/Light3/", "material/"] {
            assert!(panel.controls().iter().any(|c| c.path.starts_with(folder)));
        }
    }

    #[test]
    fn selection_wraps_around() {
        let mut panel = Panel::new(1);
        panel.select_prev();
        assert_eq!(panel.selected().path, "material/shininess");
        panel.select_next();
        assert_eq!(panel.selected().path, "options/Shading Model");
    }

    #[test]
    fn fovy_is_clamped() {
        let mut settings = ViewerSettings::default();
        let mut panel = Panel::new(settings.lights.len());
        select(&mut panel, "camera/fovy");
        panel.adjust(&mut settings, 1000);
        assert_relative_eq!(settings.camera.fovy, Camera::MAX_FOVY);
        panel.adjust(&mut settings, -10);
        assert_relative_eq!(settings.camera.fovy, Camera::MAX_FOVY - 10.0);
    }

    #[test]
    fn near_cannot_pass_far() {
        let mut settings = ViewerSettings::default();
        let mut panel = Panel::new(settings.lights.len());
        select(&mut panel, "camera/near");
        panel.adjust(&mut settings, 5000);
        assert_relative_eq!(settings.camera.near, settings.camera.far - Camera::CLIP_GAP);

        select(&mut panel, "camera/far");
        panel.adjust(&mut settings, -5000);
        assert_relative_eq!(settings.camera.far, settings.camera.near + Camera::CLIP_GAP);
    }

    #[test]
    fn toggles_and_choices() {
        let mut settings = ViewerSettings::default();
        let mut panel = Panel::new(settings.lights.len());

        select(&mut panel, "options/wireframe");
        panel.activate(&mut settings);
        assert!(settings.options.wireframe);
        assert_eq!(panel.value_text(&settings, Target::Wireframe), "on");

        select(&mut panel, "options/Shading Model");
        panel.activate(&mut settings);
        assert_eq!(settings.options.shading_model, ShadingModel::Gouraud);

        select(&mut panel, "lights/Light2/type");
        let before = settings.lights[1].kind;
        panel.adjust(&mut settings, 1);
        assert_ne!(settings.lights[1].kind, before);
        panel.adjust(&mut settings, -1);
        assert_eq!(settings.lights[1].kind, before);
    }

    #[test]
    fn channels_stay_in_byte_range() {
        let mut settings = ViewerSettings::default();
        let mut panel = Panel::new(settings.lights.len());
        select(&mut panel, "material/Ks/g");
        panel.adjust(&mut settings, 3);
        assert_relative_eq!(settings.bunny_material.ks[1], 255.0);

        select(&mut panel, "material/Ka/r");
        panel.adjust(&mut settings, -100);
        assert_relative_eq!(settings.bunny_material.ka[0], 0.0);
    }

    #[test]
    fn numbers_ignore_activate() {
        let mut settings = ViewerSettings::default();
        let mut panel = Panel::new(settings.lights.len());
        select(&mut panel, "lights/Light1/cutoff");
        let before = settings.clone();
        panel.activate(&mut settings);
        assert_eq!(settings, before);
    }

    #[test]
    fn title_shows_selected_value() {
        let mut settings = ViewerSettings::default();
        let mut panel = Panel::new(settings.lights.len());
        select(&mut panel, "camera/eye/y");
        panel.adjust(&mut settings, 2);
        let title = panel.title(&settings);
        assert!(title.contains("camera/eye/y = 5.10"), "{title}");
    }
}
