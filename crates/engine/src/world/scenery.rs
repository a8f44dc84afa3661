//! Decoration that never touches physics: pictures on the z planes, parallax
//! layers behind or in front of the actors, and the clear color.

use super::actor::clamp_z;
use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PictureId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    /// Top-left corner in meters.
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
    pub image: String,
    pub visible: bool,
    pub(crate) z: i8,
    pub(crate) spawn_order: u64,
}

impl Picture {
    pub fn z(&self) -> i8 {
        self.z
    }

    pub fn spawn_order(&self) -> u64 {
        self.spawn_order
    }

    pub fn center(&self) -> Vec2 {
        self.origin + Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerMotion {
    /// Fraction of the camera's travel: 0 stays put in the world, 1 sticks to the
    /// screen, negative runs against the camera.
    Camera(f32),
    /// Meters per second across the screen, independent of the camera.
    Auto(f32),
}

/// An image tiled endlessly along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallaxLayer {
    pub origin: Vec2,
    pub width: f32,
    pub height: f32,
    pub image: String,
    pub axis: LayerAxis,
    pub motion: LayerMotion,
    drift: f32,
}

impl ParallaxLayer {
    pub fn horizontal(x: f32, y: f32, width: f32, height: f32, image: &str) -> Self {
        Self::new(x, y, width, height, image, LayerAxis::Horizontal)
    }

    pub fn vertical(x: f32, y: f32, width: f32, height: f32, image: &str) -> Self {
        Self::new(x, y, width, height, image, LayerAxis::Vertical)
    }

    fn new(x: f32, y: f32, width: f32, height: f32, image: &str, axis: LayerAxis) -> Self {
        Self {
            origin: Vec2::new(x, y),
            width: width.max(f32::EPSILON),
            height: height.max(f32::EPSILON),
            image: image.to_string(),
            axis,
            motion: LayerMotion::Camera(0.0),
            drift: 0.0,
        }
    }

    pub fn camera_speed(mut self, speed: f32) -> Self {
        self.motion = LayerMotion::Camera(speed);
        self
    }

    pub fn auto_velocity(mut self, velocity: f32) -> Self {
        self.motion = LayerMotion::Auto(velocity);
        self
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        if let LayerMotion::Auto(velocity) = self.motion {
            self.drift = (self.drift + velocity * dt).rem_euclid(self.tile_length());
        }
    }

    fn tile_length(&self) -> f32 {
        match self.axis {
            LayerAxis::Horizontal => self.width,
            LayerAxis::Vertical => self.height,
        }
    }

    fn along(&self, point: Vec2) -> f32 {
        match self.axis {
            LayerAxis::Horizontal => point.x,
            LayerAxis::Vertical => point.y,
        }
    }

    /// How far the layer has slid along its axis for this camera position.
    pub fn offset(&self, camera: Vec2) -> f32 {
        match self.motion {
            LayerMotion::Camera(speed) => self.along(camera) * speed,
            LayerMotion::Auto(_) => self.along(camera) + self.drift,
        }
    }

    /// Top-left corners of the tiles covering `[view_min, view_max]` along the axis.
    pub fn tile_origins(&self, camera: Vec2, view_min: f32, view_max: f32) -> Vec<Vec2> {
        let length = self.tile_length();
        let start = self.along(self.origin) + self.offset(camera);
        let first = ((view_min - start) / length).floor() as i64;
        let last = ((view_max - start) / length).ceil() as i64;
        (first..last)
            .map(|index| {
                let shift = start + index as f32 * length;
                match self.axis {
                    LayerAxis::Horizontal => Vec2::new(shift, self.origin.y),
                    LayerAxis::Vertical => Vec2::new(self.origin.x, shift),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scenery {
    pictures: Vec<Picture>,
    next_picture: u32,
    pub background: Vec<ParallaxLayer>,
    pub foreground: Vec<ParallaxLayer>,
    /// `None` keeps the renderer's default clear color.
    pub background_color: Option<[u8; 3]>,
}

impl Scenery {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn add_picture(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: &str,
        z: i32,
        spawn_order: u64,
    ) -> PictureId {
        let id = PictureId(self.next_picture);
        self.next_picture = self.next_picture.saturating_add(1);
        self.pictures.push(Picture {
            origin: Vec2::new(x, y),
            width,
            height,
            image: image.to_string(),
            visible: true,
            z: clamp_z(z),
            spawn_order,
        });
        id
    }

    pub fn pictures(&self) -> &[Picture] {
        &self.pictures
    }

    pub fn picture_mut(&mut self, id: PictureId) -> Option<&mut Picture> {
        self.pictures.get_mut(id.0 as usize)
    }

    /// Takes `0xRRGGBB`.
    pub fn set_background_color(&mut self, rgb: u32) {
        self.background_color = Some([
            ((rgb >> 16) & 0xff) as u8,
            ((rgb >> 8) & 0xff) as u8,
            (rgb & 0xff) as u8,
        ]);
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        for layer in self.background.iter_mut().chain(self.foreground.iter_mut()) {
            layer.advance(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_splits_into_channels() {
        let mut scenery = Scenery::default();
        scenery.set_background_color(0x17B4FF);
        assert_eq!(scenery.background_color, Some([0x17, 0xB4, 0xFF]));
    }

    #[test]
    fn pictures_clamp_z_and_toggle_visibility() {
        let mut scenery = Scenery::default();
        let id = scenery.add_picture(0.0, 0.0, 16.0, 9.0, "noise.png", -5, 3);
        assert_eq!(scenery.pictures()[0].z(), -2);
        assert_eq!(scenery.pictures()[0].center(), Vec2::new(8.0, 4.5));

        scenery.picture_mut(id).expect("picture").visible = false;
        assert!(!scenery.pictures()[0].visible);
        assert!(scenery.picture_mut(PictureId(9)).is_none());
    }

    #[test]
    fn camera_layer_slides_by_speed_fraction() {
        let layer = ParallaxLayer::horizontal(0.0, 0.0, 16.0, 9.0, "mid.png").camera_speed(0.5);
        assert_eq!(layer.offset(Vec2::new(20.0, 7.0)), 10.0);

        let still = ParallaxLayer::vertical(0.0, 0.0, 16.0, 9.0, "back.png");
        assert_eq!(still.offset(Vec2::new(20.0, 7.0)), 0.0);
    }

    #[test]
    fn tiles_cover_the_visible_span() {
        let layer = ParallaxLayer::horizontal(0.0, 1.0, 4.0, 2.0, "front.png").camera_speed(0.5);
        let tiles = layer.tile_origins(Vec2::new(10.0, 0.0), 2.0, 18.0);
        assert_eq!(tiles.first(), Some(&Vec2::new(1.0, 1.0)));
        assert_eq!(tiles.last(), Some(&Vec2::new(17.0, 1.0)));
        assert_eq!(tiles.len(), 5);
    }

    #[test]
    fn auto_layer_drifts_and_wraps() {
        let mut scenery = Scenery::default();
        scenery
            .background
            .push(ParallaxLayer::horizontal(0.0, 0.0, 4.0, 2.0, "clouds.png").auto_velocity(3.0));
        scenery.advance(1.0);
        assert_eq!(scenery.background[0].offset(Vec2::ZERO), 3.0);
        scenery.advance(1.0);
        assert_eq!(scenery.background[0].offset(Vec2::ZERO), 2.0);
        assert_eq!(scenery.background[0].offset(Vec2::new(5.0, 0.0)), 7.0);
    }
}
