use crate::world::{Camera, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Screen pixels per world meter at the camera's current zoom.
pub fn pixels_per_meter(camera: &Camera, viewport: Viewport) -> f32 {
    let visible = camera.visible_size();
    if visible.x <= 0.0 {
        return 1.0;
    }
    viewport.width as f32 / visible.x
}

/// Both spaces are y-down; the camera position sits at the viewport center.
pub fn world_to_screen(world: Vec2, camera: &Camera, viewport: Viewport) -> Vec2 {
    let scale = pixels_per_meter(camera, viewport);
    Vec2::new(
        (world.x - camera.position.x) * scale + viewport.width as f32 * 0.5,
        (world.y - camera.position.y) * scale + viewport.height as f32 * 0.5,
    )
}

pub fn world_to_screen_px(world: Vec2, camera: &Camera, viewport: Viewport) -> (i32, i32) {
    let screen = world_to_screen(world, camera, viewport);
    (screen.x.round() as i32, screen.y.round() as i32)
}

pub fn screen_to_world(screen_px: Vec2, camera: &Camera, viewport: Viewport) -> Vec2 {
    let scale = pixels_per_meter(camera, viewport);
    Vec2::new(
        (screen_px.x - viewport.width as f32 * 0.5) / scale + camera.position.x,
        (screen_px.y - viewport.height as f32 * 0.5) / scale + camera.position.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_center_maps_to_viewport_center() {
        let camera = Camera::default();
        let viewport = Viewport::new(1600, 900);
        assert_eq!(
            world_to_screen_px(camera.position, &camera, viewport),
            (800, 450)
        );
    }

    #[test]
    fn default_view_spans_sixteen_meters() {
        let camera = Camera::default();
        let viewport = Viewport::new(1600, 900);
        assert_eq!(pixels_per_meter(&camera, viewport), 100.0);
        assert_eq!(world_to_screen_px(Vec2::new(1.0, 2.0), &camera, viewport), (100, 200));
    }

    #[test]
    fn zoom_scales_around_camera() {
        let mut camera = Camera::default();
        camera.set_zoom(2.0);
        let viewport = Viewport::new(1600, 900);
        let world = screen_to_world(Vec2::new(1000.0, 450.0), &camera, viewport);
        assert_eq!(world, Vec2::new(9.0, 4.5));
    }
}
