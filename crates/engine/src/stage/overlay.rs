use std::fmt;
use std::rc::Rc;

use super::StageCommand;
use crate::app::{InputAction, InputSnapshot};
use crate::level::Level;
use crate::world::Vec2;

pub type OverlayBuilder = Rc<dyn Fn(&mut Overlay, &mut Level)>;
pub type ControlAction = Rc<dyn Fn(&mut Level) -> StageCommand>;
pub type TextSource = Rc<dyn Fn(&Level) -> String>;

/// Rectangle in normalized screen space, `[0, 1]` on both axes, y-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl OverlayRect {
    pub const FULL_SCREEN: OverlayRect = OverlayRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

pub struct TapControl {
    pub rect: OverlayRect,
    pub image: String,
    action: ControlAction,
}

#[derive(Clone)]
pub enum OverlayText {
    Static(String),
    Dynamic(TextSource),
}

pub struct TextLine {
    pub x: f32,
    pub y: f32,
    pub text: OverlayText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTrigger {
    /// Fires on the frame the key goes down.
    Pressed,
    /// Fires every frame while the key is held.
    Held,
}

struct KeyBinding {
    action: InputAction,
    trigger: KeyTrigger,
    callback: ControlAction,
}

/// Screen-space layer of tap controls, text and key bindings.
#[derive(Default)]
pub struct Overlay {
    controls: Vec<TapControl>,
    texts: Vec<TextLine>,
    keys: Vec<KeyBinding>,
    dim: bool,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tap_control(
        &mut self,
        rect: OverlayRect,
        image: &str,
        action: impl Fn(&mut Level) -> StageCommand + 'static,
    ) {
        self.controls.push(TapControl {
            rect,
            image: image.to_string(),
            action: Rc::new(action),
        });
    }

    /// A control covering the whole screen.
    pub fn tap_anywhere(&mut self, action: impl Fn(&mut Level) -> StageCommand + 'static) {
        self.add_tap_control(OverlayRect::FULL_SCREEN, "", action);
    }

    pub fn add_text(&mut self, x: f32, y: f32, text: impl Into<String>) {
        self.texts.push(TextLine {
            x,
            y,
            text: OverlayText::Static(text.into()),
        });
    }

    pub fn add_dynamic_text(&mut self, x: f32, y: f32, source: impl Fn(&Level) -> String + 'static) {
        self.texts.push(TextLine {
            x,
            y,
            text: OverlayText::Dynamic(Rc::new(source)),
        });
    }

    pub fn bind_key(
        &mut self,
        action: InputAction,
        trigger: KeyTrigger,
        callback: impl Fn(&mut Level) -> StageCommand + 'static,
    ) {
        self.keys.push(KeyBinding {
            action,
            trigger,
            callback: Rc::new(callback),
        });
    }

    pub fn set_dim(&mut self, dim: bool) {
        self.dim = dim;
    }

    pub fn is_dim(&self) -> bool {
        self.dim
    }

    pub fn controls(&self) -> &[TapControl] {
        &self.controls
    }

    pub fn texts(&self) -> &[TextLine] {
        &self.texts
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty() && self.texts.is_empty() && self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.controls.clear();
        self.texts.clear();
        self.keys.clear();
        self.dim = false;
    }

    /// Topmost control under a normalized point; later controls sit above earlier ones.
    pub(crate) fn tap_action(&self, point: Vec2) -> Option<ControlAction> {
        self.controls
            .iter()
            .rev()
            .find(|control| control.rect.contains(point))
            .map(|control| Rc::clone(&control.action))
    }

    pub(crate) fn key_actions(&self, input: &InputSnapshot) -> Vec<ControlAction> {
        self.keys
            .iter()
            .filter(|binding| match binding.trigger {
                KeyTrigger::Pressed => input.was_pressed(binding.action),
                KeyTrigger::Held => input.is_down(binding.action),
            })
            .map(|binding| Rc::clone(&binding.callback))
            .collect()
    }

    pub fn render_texts(&self, level: &Level) -> Vec<String> {
        self.texts
            .iter()
            .map(|line| match &line.text {
                OverlayText::Static(text) => text.clone(),
                OverlayText::Dynamic(source) => source(level),
            })
            .collect()
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("controls", &self.controls.len())
            .field("texts", &self.texts.len())
            .field("keys", &self.keys.len())
            .field("dim", &self.dim)
            .finish()
    }
}
