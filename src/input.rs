use crate::camera::Camera;

/// minifb 每格滚轮大约是 1.0，换算成浏览器 wheel 事件的 deltaY
pub const WHEEL_TO_DELTA_Y: f32 = 100.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Super / Command
    pub meta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelAction {
    Zoom(f32),
    Dolly { delta_y: f32, move_target: bool },
    Ignore,
}

/// `scroll_y` 为 minifb 的滚轮值，向上滚为正
pub fn wheel_action(scroll_y: f32, mods: Modifiers) -> WheelAction {
    let delta_y = -scroll_y * WHEEL_TO_DELTA_Y;
    if delta_y == 0.0 {
        return WheelAction::Ignore;
    }
    if mods.ctrl || mods.meta {
        // ctrl 同时移动 at，只按 meta 时只移动 eye
        WheelAction::Dolly {
            delta_y,
            move_target: mods.ctrl,
        }
    } else if mods.alt {
        WheelAction::Ignore
    } else {
        WheelAction::Zoom(delta_y)
    }
}

pub fn apply_wheel(camera: &mut Camera, action: WheelAction) {
    match action {
        WheelAction::Zoom(delta_y) => camera.zoom(delta_y),
        WheelAction::Dolly {
            delta_y,
            move_target,
        } => camera.dolly(delta_y, move_target),
        WheelAction::Ignore => {}
    }
}

/// 记录左键拖动的上一帧位置
#[derive(Debug, Default)]
pub struct DragState {
    last: Option<(f32, f32)>,
}

impl DragState {
    /// 每帧调用一次，返回本帧的像素位移
    pub fn update(&mut self, pos: Option<(f32, f32)>, pressed: bool) -> Option<(f32, f32)> {
        let (Some(pos), true) = (pos, pressed) else {
            self.last = None;
            return None;
        };
        let Some(last) = self.last.replace(pos) else {
            return None;
        };
        let delta = (pos.0 - last.0, pos.1 - last.1);
        (delta != (0.0, 0.0)).then_some(delta)
    }
}
