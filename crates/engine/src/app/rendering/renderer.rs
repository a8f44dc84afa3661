use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::stage::{Overlay, OverlayRect, Stage};
use crate::world::{Actor, Camera, LayerAxis, ParallaxLayer, Picture, RoleKind, Vec2, World};

use super::transform::{pixels_per_meter, world_to_screen_px};
use super::Viewport;

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const GRID_CELL_WORLD: f32 = 1.0;
const GRID_MAJOR_EVERY: i32 = 5;
const GRID_MINOR_COLOR: [u8; 4] = [35, 39, 46, 255];
const GRID_MAJOR_COLOR: [u8; 4] = [52, 58, 70, 255];
const HUD_CONTROL_COLOR: [u8; 4] = [200, 200, 220, 255];
const MODAL_CONTROL_COLOR: [u8; 4] = [255, 210, 70, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drawable {
    Actor(usize),
    Picture(usize),
}

/// Software renderer: colored actor silhouettes over a meter grid, with overlay
/// controls outlined on top.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    draw_order: Vec<Drawable>,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport::new(size.width, size.height),
            draw_order: Vec::new(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport::new(width, height);
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render_stage(&mut self, stage: &Stage) -> Result<(), Error> {
        let viewport = self.viewport;
        if viewport.width == 0 || viewport.height == 0 {
            return Ok(());
        }

        let world = &stage.level().world;
        let camera = world.camera();
        let frame = self.pixels.frame_mut();
        let clear = clear_color(world);
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&clear);
        }
        draw_world_grid(frame, viewport, camera);
        for layer in &world.scenery().background {
            draw_layer(frame, viewport, camera, layer);
        }

        collect_draw_order(world, &mut self.draw_order);
        for drawable in self.draw_order.iter().copied() {
            match drawable {
                Drawable::Actor(index) => {
                    draw_actor(frame, viewport, camera, &world.actors()[index])
                }
                Drawable::Picture(index) => {
                    draw_picture(frame, viewport, camera, &world.scenery().pictures()[index])
                }
            }
        }
        for layer in &world.scenery().foreground {
            draw_layer(frame, viewport, camera, layer);
        }

        draw_overlay_controls(frame, viewport, &stage.level().hud, HUD_CONTROL_COLOR);
        if let Some(modal) = stage.modal() {
            if modal.is_dim() {
                dim_frame(frame);
            }
            draw_overlay_controls(frame, viewport, modal, MODAL_CONTROL_COLOR);
        }

        self.pixels.render()
    }
}

fn clear_color(world: &World) -> [u8; 4] {
    match world.scenery().background_color {
        Some([r, g, b]) => [r, g, b, 255],
        None => CLEAR_COLOR,
    }
}

/// Visible actors and pictures, back to front by (z, spawn order).
fn collect_draw_order(world: &World, out: &mut Vec<Drawable>) {
    out.clear();
    let actors = world.actors();
    let pictures = world.scenery().pictures();
    out.extend(
        actors
            .iter()
            .enumerate()
            .filter(|(_, actor)| actor.is_enabled() && actor.appearance.visible)
            .map(|(index, _)| Drawable::Actor(index)),
    );
    out.extend(
        pictures
            .iter()
            .enumerate()
            .filter(|(_, picture)| picture.visible)
            .map(|(index, _)| Drawable::Picture(index)),
    );
    out.sort_by_key(|drawable| match *drawable {
        Drawable::Actor(index) => (actors[index].z(), actors[index].spawn_order()),
        Drawable::Picture(index) => (pictures[index].z(), pictures[index].spawn_order()),
    });
}

fn draw_picture(frame: &mut [u8], viewport: Viewport, camera: &Camera, picture: &Picture) {
    let far = picture.origin + Vec2::new(picture.width, picture.height);
    let (x0, y0) = world_to_screen_px(picture.origin, camera, viewport);
    let (x1, y1) = world_to_screen_px(far, camera, viewport);
    let color = color_for_image(&picture.image);
    fill_rect_clipped(frame, viewport, x0, y0, x1, y1, color);
}

/// Layer tiles are outlined so they never hide what sits behind them.
fn draw_layer(frame: &mut [u8], viewport: Viewport, camera: &Camera, layer: &ParallaxLayer) {
    let half = camera.visible_size() * 0.5;
    let (view_min, view_max) = match layer.axis {
        LayerAxis::Horizontal => (camera.position.x - half.x, camera.position.x + half.x),
        LayerAxis::Vertical => (camera.position.y - half.y, camera.position.y + half.y),
    };
    let color = color_for_image(&layer.image);
    for origin in layer.tile_origins(camera.position, view_min, view_max) {
        let far = origin + Vec2::new(layer.width, layer.height);
        let (x0, y0) = world_to_screen_px(origin, camera, viewport);
        let (x1, y1) = world_to_screen_px(far, camera, viewport);
        draw_rect_outline(frame, viewport, x0, y0, x1, y1, color);
    }
}

fn draw_actor(frame: &mut [u8], viewport: Viewport, camera: &Camera, actor: &Actor) {
    let aabb = actor.body.aabb();
    let (x0, y0) = world_to_screen_px(aabb.min, camera, viewport);
    let (x1, y1) = world_to_screen_px(aabb.max, camera, viewport);
    let color = color_for_actor(&actor.appearance.image, actor.role.kind());

    if actor.body.shape().is_circle() {
        let (cx, cy) = world_to_screen_px(actor.body.position(), camera, viewport);
        fill_circle_clipped(frame, viewport, cx, cy, (x1 - x0) / 2, color);
    } else {
        fill_rect_clipped(frame, viewport, x0, y0, x1, y1, color);
    }
}

/// Stable color per image name.
fn color_for_image(image: &str) -> [u8; 4] {
    let hash = image.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ byte as u32).wrapping_mul(0x0100_0193)
    });
    [
        (hash & 0xff) as u8,
        ((hash >> 8) & 0xff) as u8,
        ((hash >> 16) & 0xff) as u8,
        255,
    ]
}

/// Image color tinted so roles stay distinguishable.
fn color_for_actor(image: &str, kind: RoleKind) -> [u8; 4] {
    let base = color_for_image(image);
    let tint: [u8; 3] = match kind {
        RoleKind::Hero => [80, 200, 255],
        RoleKind::Enemy => [255, 80, 80],
        RoleKind::Obstacle => [150, 150, 150],
        RoleKind::Destination => [90, 230, 120],
        RoleKind::Goodie => [255, 220, 60],
        RoleKind::Projectile => [240, 240, 240],
    };
    [
        ((base[0] as u16 + tint[0] as u16 * 3) / 4) as u8,
        ((base[1] as u16 + tint[1] as u16 * 3) / 4) as u8,
        ((base[2] as u16 + tint[2] as u16 * 3) / 4) as u8,
        255,
    ]
}

fn draw_overlay_controls(frame: &mut [u8], viewport: Viewport, overlay: &Overlay, color: [u8; 4]) {
    for control in overlay.controls() {
        if control.rect == OverlayRect::FULL_SCREEN {
            continue;
        }
        let (x0, y0, x1, y1) = overlay_rect_px(control.rect, viewport);
        draw_rect_outline(frame, viewport, x0, y0, x1, y1, color);
    }
}

fn overlay_rect_px(rect: OverlayRect, viewport: Viewport) -> (i32, i32, i32, i32) {
    let width = viewport.width as f32;
    let height = viewport.height as f32;
    (
        (rect.x * width).round() as i32,
        (rect.y * height).round() as i32,
        ((rect.x + rect.width) * width).round() as i32,
        ((rect.y + rect.height) * height).round() as i32,
    )
}

fn dim_frame(frame: &mut [u8]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk[0] /= 2;
        chunk[1] /= 2;
        chunk[2] /= 2;
    }
}

fn draw_world_grid(frame: &mut [u8], viewport: Viewport, camera: &Camera) {
    let scale = pixels_per_meter(camera, viewport);
    let (ix_start, ix_end, iy_start, iy_end) =
        visible_grid_index_bounds(camera.position, viewport, scale);

    for ix in ix_start..=ix_end {
        let world_x = ix as f32 * GRID_CELL_WORLD;
        let (screen_x, _) =
            world_to_screen_px(Vec2::new(world_x, camera.position.y), camera, viewport);
        draw_vertical_line_clipped(frame, viewport, screen_x, grid_color(ix));
    }

    for iy in iy_start..=iy_end {
        let world_y = iy as f32 * GRID_CELL_WORLD;
        let (_, screen_y) =
            world_to_screen_px(Vec2::new(camera.position.x, world_y), camera, viewport);
        draw_horizontal_line_clipped(frame, viewport, screen_y, grid_color(iy));
    }
}

fn grid_color(index: i32) -> [u8; 4] {
    if index.rem_euclid(GRID_MAJOR_EVERY) == 0 {
        GRID_MAJOR_COLOR
    } else {
        GRID_MINOR_COLOR
    }
}

fn visible_grid_index_bounds(
    camera_pos: Vec2,
    viewport: Viewport,
    pixels_per_meter: f32,
) -> (i32, i32, i32, i32) {
    let half_w_world = viewport.width as f32 / (2.0 * pixels_per_meter);
    let half_h_world = viewport.height as f32 / (2.0 * pixels_per_meter);
    let min_x = camera_pos.x - half_w_world;
    let max_x = camera_pos.x + half_w_world;
    let min_y = camera_pos.y - half_h_world;
    let max_y = camera_pos.y + half_h_world;

    let ix_start = (min_x / GRID_CELL_WORLD).floor() as i32 - 1;
    let ix_end = (max_x / GRID_CELL_WORLD).ceil() as i32 + 1;
    let iy_start = (min_y / GRID_CELL_WORLD).floor() as i32 - 1;
    let iy_end = (max_y / GRID_CELL_WORLD).ceil() as i32 + 1;
    (ix_start, ix_end, iy_start, iy_end)
}

fn draw_vertical_line_clipped(frame: &mut [u8], viewport: Viewport, x: i32, color: [u8; 4]) {
    if x < 0 || x >= viewport.width as i32 {
        return;
    }
    for y in 0..viewport.height as i32 {
        write_pixel_rgba_clipped(frame, viewport, x, y, color);
    }
}

fn draw_horizontal_line_clipped(frame: &mut [u8], viewport: Viewport, y: i32, color: [u8; 4]) {
    if y < 0 || y >= viewport.height as i32 {
        return;
    }
    for x in 0..viewport.width as i32 {
        write_pixel_rgba_clipped(frame, viewport, x, y, color);
    }
}

fn fill_rect_clipped(
    frame: &mut [u8],
    viewport: Viewport,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: [u8; 4],
) {
    let left = x0.min(x1).max(0);
    let right = x0.max(x1).min(viewport.width as i32 - 1);
    let top = y0.min(y1).max(0);
    let bottom = y0.max(y1).min(viewport.height as i32 - 1);
    for y in top..=bottom {
        for x in left..=right {
            write_pixel_rgba_clipped(frame, viewport, x, y, color);
        }
    }
}

fn fill_circle_clipped(
    frame: &mut [u8],
    viewport: Viewport,
    cx: i32,
    cy: i32,
    radius: i32,
    color: [u8; 4],
) {
    let radius = radius.max(1);
    let radius_sq = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius_sq {
                write_pixel_rgba_clipped(frame, viewport, cx + dx, cy + dy, color);
            }
        }
    }
}

fn draw_rect_outline(
    frame: &mut [u8],
    viewport: Viewport,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: [u8; 4],
) {
    for x in x0..=x1 {
        write_pixel_rgba_clipped(frame, viewport, x, y0, color);
        write_pixel_rgba_clipped(frame, viewport, x, y1, color);
    }
    for y in y0..=y1 {
        write_pixel_rgba_clipped(frame, viewport, x0, y, color);
        write_pixel_rgba_clipped(frame, viewport, x1, y, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], viewport: Viewport, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= viewport.width as i32 || y >= viewport.height as i32 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y
        .checked_mul(viewport.width as usize)
        .and_then(|row| row.checked_add(x))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}
