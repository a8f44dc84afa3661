mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{
    pixels_per_meter, screen_to_world, world_to_screen, world_to_screen_px, Viewport,
};
