use crate::world::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Jump,
    Throw,
    Pause,
    Quit,
}

const ACTION_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Jump,
        InputAction::Throw,
        InputAction::Pause,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Jump => 4,
            InputAction::Throw => 5,
            InputAction::Pause => 6,
            InputAction::Quit => 7,
        }
    }
}

/// Drag gesture released this frame, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flick {
    pub start_px: Vec2,
    pub delta_px: Vec2,
}

/// Everything the runtime reads from input devices for one frame.
#[derive(Debug, Clone, Copy)]
pub struct InputSnapshot {
    quit_requested: bool,
    down: ActionStates,
    pressed: ActionStates,
    tilt: Vec2,
    tap_px: Option<Vec2>,
    flick: Option<Flick>,
    window_width: u32,
    window_height: u32,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            quit_requested: false,
            down: ActionStates::default(),
            pressed: ActionStates::default(),
            tilt: Vec2::ZERO,
            tap_px: None,
            flick: None,
            window_width: 1280,
            window_height: 720,
        }
    }
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down.is_down(action)
    }

    /// Went down this frame.
    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    /// Accelerometer-style signal in m/s^2, y-down.
    pub fn tilt(&self) -> Vec2 {
        self.tilt
    }

    pub fn tap_px(&self) -> Option<Vec2> {
        self.tap_px
    }

    pub fn flick(&self) -> Option<Flick> {
        self.flick
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Maps a pixel position into `[0, 1]` screen space.
    pub fn normalize_px(&self, px: Vec2) -> Vec2 {
        Vec2::new(
            px.x / self.window_width.max(1) as f32,
            px.y / self.window_height.max(1) as f32,
        )
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.down.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.down.set(action, true);
        self.pressed.set(action, true);
        self
    }

    /// Records the press edge without holding the action down, for a key that was
    /// released again before the tick sampled it.
    pub fn with_action_edge(mut self, action: InputAction) -> Self {
        self.pressed.set(action, true);
        self
    }

    pub fn with_tilt(mut self, tilt: Vec2) -> Self {
        self.tilt = tilt;
        self
    }

    pub fn with_tap_px(mut self, tap_px: Option<Vec2>) -> Self {
        self.tap_px = tap_px;
        self
    }

    pub fn with_flick(mut self, flick: Option<Flick>) -> Self {
        self.flick = flick;
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_implies_down() {
        let input = InputSnapshot::empty().with_action_pressed(InputAction::Jump);
        assert!(input.is_down(InputAction::Jump));
        assert!(input.was_pressed(InputAction::Jump));
        assert!(!input.was_pressed(InputAction::Throw));
    }

    #[test]
    fn edge_alone_is_not_down() {
        let input = InputSnapshot::empty().with_action_edge(InputAction::Throw);
        assert!(input.was_pressed(InputAction::Throw));
        assert!(!input.is_down(InputAction::Throw));
    }

    #[test]
    fn pixels_normalize_against_window() {
        let input = InputSnapshot::empty().with_window_size(200, 100);
        assert_eq!(input.normalize_px(Vec2::new(50.0, 75.0)), Vec2::new(0.25, 0.75));
    }
}
