use super::actor::ActorId;
use super::geometry::Vec2;

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.25;
pub const CAMERA_ZOOM_MAX: f32 = 4.0;
pub const DEFAULT_VIEW_WIDTH: f32 = 16.0;
pub const DEFAULT_VIEW_HEIGHT: f32 = 9.0;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// World point at the center of the screen.
    pub position: Vec2,
    zoom: f32,
    view_size: Vec2,
    bounds: Option<Vec2>,
    chase: Option<ActorId>,
}

impl Default for Camera {
    fn default() -> Self {
        let view_size = Vec2::new(DEFAULT_VIEW_WIDTH, DEFAULT_VIEW_HEIGHT);
        Self {
            position: view_size * 0.5,
            zoom: CAMERA_ZOOM_DEFAULT,
            view_size,
            bounds: None,
            chase: None,
        }
    }
}

impl Camera {
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
        self.position = self.clamped(self.position);
    }

    /// Meters visible at zoom 1.
    pub fn view_size(&self) -> Vec2 {
        self.view_size
    }

    pub fn set_view_size(&mut self, width: f32, height: f32) {
        self.view_size = Vec2::new(width.max(1.0), height.max(1.0));
    }

    pub fn visible_size(&self) -> Vec2 {
        self.view_size * (1.0 / self.zoom)
    }

    /// Keeps the view inside `[0, width] x [0, height]`.
    pub fn set_bounds(&mut self, width: f32, height: f32) {
        self.bounds = Some(Vec2::new(width, height));
        self.position = self.clamped(self.position);
    }

    pub fn bounds(&self) -> Option<Vec2> {
        self.bounds
    }

    pub fn set_chase(&mut self, target: Option<ActorId>) {
        self.chase = target;
    }

    pub fn chase_target(&self) -> Option<ActorId> {
        self.chase
    }

    pub fn center_on(&mut self, point: Vec2) {
        self.position = self.clamped(point);
    }

    fn clamped(&self, point: Vec2) -> Vec2 {
        let Some(bounds) = self.bounds else {
            return point;
        };
        let half = self.visible_size() * 0.5;
        Vec2::new(
            clamp_axis(point.x, half.x, bounds.x),
            clamp_axis(point.y, half.y, bounds.y),
        )
    }
}

fn clamp_axis(value: f32, half_view: f32, extent: f32) -> f32 {
    if extent <= half_view * 2.0 {
        extent * 0.5
    } else {
        value.clamp(half_view, extent - half_view)
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() || zoom <= 0.0 {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_starts_at_world_origin() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec2::new(8.0, 4.5));
    }

    #[test]
    fn bounds_keep_view_inside_level() {
        let mut camera = Camera::default();
        camera.set_bounds(48.0, 9.0);
        camera.center_on(Vec2::new(1.0, 1.0));
        assert_eq!(camera.position, Vec2::new(8.0, 4.5));
        camera.center_on(Vec2::new(47.0, 8.0));
        assert_eq!(camera.position, Vec2::new(40.0, 4.5));
        camera.center_on(Vec2::new(20.0, 2.0));
        assert_eq!(camera.position, Vec2::new(20.0, 4.5));
    }

    #[test]
    fn zoom_is_clamped_and_shrinks_view() {
        let mut camera = Camera::default();
        camera.set_zoom(100.0);
        assert_eq!(camera.zoom(), CAMERA_ZOOM_MAX);
        camera.set_zoom(f32::NAN);
        assert_eq!(camera.zoom(), CAMERA_ZOOM_DEFAULT);
        camera.set_zoom(2.0);
        assert_eq!(camera.visible_size(), Vec2::new(8.0, 4.5));
    }
}
