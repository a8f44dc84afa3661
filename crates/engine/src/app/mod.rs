mod audio;
mod input;
mod loop_runner;
mod rendering;

pub use audio::{LogSpeaker, Speaker};
pub use input::{Flick, InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig, KEY_TILT};
pub use rendering::{
    pixels_per_meter, screen_to_world, world_to_screen, world_to_screen_px, Renderer, Viewport,
};

#[cfg(test)]
pub(crate) use audio::recording;
