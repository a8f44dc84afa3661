use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::stage::{NavAction, Stage, StageCommand};
use crate::world::Vec2;
use crate::StartupError;

use super::input::ActionStates;
use super::{Flick, InputAction, InputSnapshot, Renderer};

/// Tilt produced by a held arrow key, in m/s^2.
pub const KEY_TILT: f32 = 5.0;
/// Pointer travel below this many pixels is a tap, not a flick.
const FLICK_MIN_TRAVEL_PX: f32 = 8.0;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Arcade".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `stage` at a fixed tick rate until the user quits.
pub fn run_app(config: LoopConfig, mut stage: Stage) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let size = window.inner_size();
    let mut input_collector = InputCollector::new(size.width, size.height);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        level = stage.level_index(),
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut frame_stats = FrameStats::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_physical_key(event.physical_key, event.state);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        match stage.update(fixed_dt_seconds, &input_snapshot) {
                            StageCommand::Navigate(NavAction::Exit) => {
                                info!(reason = "stage_exit", "shutdown_requested");
                                window_target.exit();
                            }
                            StageCommand::Navigate(NavAction::Chooser) => {
                                info!(completed = stage.level_index(), "level_sequence_finished");
                                stage.build_level(1);
                            }
                            _ => {}
                        }
                        frame_stats.record_tick();
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    if let Err(error) = renderer.render_stage(&stage) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = format!("{} | {}", config.window_title, stage.title());
                    if last_applied_title.as_deref() != Some(next_title.as_str()) {
                        window.set_title(&next_title);
                        last_applied_title = Some(next_title);
                    }
                    frame_stats.record_frame(raw_frame_dt);

                    if let Some(snapshot) = frame_stats.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            actor_count = stage.level().world.actor_count(),
                            level = stage.level_index(),
                            state = stage.state().as_str(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!(level = stage.level_index(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Accumulates device events between ticks and hands out one snapshot per tick.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    pressed_edges: ActionStates,
    cursor_position_px: Option<Vec2>,
    drag_start_px: Option<Vec2>,
    pending_tap_px: Option<Vec2>,
    pending_flick: Option<Flick>,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        let Some(action) = action_for_key(key) else {
            return;
        };
        let is_pressed = state == ElementState::Pressed;
        if is_pressed && !self.action_states.is_down(action) {
            self.pressed_edges.set(action, true);
        }
        self.action_states.set(action, is_pressed);
        if action == InputAction::Quit && is_pressed {
            self.mark_quit_requested();
        }
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2::new(x, y));
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
        self.drag_start_px = None;
    }

    /// A left press-release is a tap when the pointer barely moved, a flick otherwise.
    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if self.drag_start_px.is_none() {
                    self.drag_start_px = self.cursor_position_px;
                }
            }
            ElementState::Released => {
                let (Some(start_px), Some(end_px)) =
                    (self.drag_start_px.take(), self.cursor_position_px)
                else {
                    return;
                };
                let delta_px = end_px - start_px;
                if delta_px.length() < FLICK_MIN_TRAVEL_PX {
                    self.pending_tap_px = Some(start_px);
                } else {
                    self.pending_flick = Some(Flick { start_px, delta_px });
                }
            }
        }
    }

    fn tilt(&self) -> Vec2 {
        let axis = |negative: InputAction, positive: InputAction| {
            let mut value = 0.0;
            if self.action_states.is_down(negative) {
                value -= KEY_TILT;
            }
            if self.action_states.is_down(positive) {
                value += KEY_TILT;
            }
            value
        };
        Vec2::new(
            axis(InputAction::MoveLeft, InputAction::MoveRight),
            axis(InputAction::MoveUp, InputAction::MoveDown),
        )
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let mut snapshot = InputSnapshot::empty()
            .with_quit_requested(self.quit_requested)
            .with_tilt(self.tilt())
            .with_tap_px(self.pending_tap_px.take())
            .with_flick(self.pending_flick.take())
            .with_window_size(self.window_width, self.window_height);
        for action in InputAction::ALL {
            if self.pressed_edges.is_down(action) {
                snapshot = snapshot.with_action_edge(action);
            }
            snapshot = snapshot.with_action_down(action, self.action_states.is_down(action));
        }
        self.pressed_edges = ActionStates::default();
        snapshot
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveUp),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveDown),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::Space => Some(InputAction::Jump),
        KeyCode::KeyF => Some(InputAction::Throw),
        KeyCode::KeyP => Some(InputAction::Pause),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct FrameStatsSnapshot {
    fps: f32,
    tps: f32,
    frame_time_ms: f32,
}

#[derive(Debug)]
struct FrameStats {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    frame_time_sum: Duration,
}

impl FrameStats {
    fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    fn starting_at(interval_start: Instant, interval: Duration) -> Self {
        Self {
            interval_start,
            interval,
            frames: 0,
            ticks: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    fn maybe_snapshot(&mut self, now: Instant) -> Option<FrameStatsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };
        let snapshot = FrameStatsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
        };

        self.interval_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.frame_time_sum = Duration::ZERO;
        Some(snapshot)
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}
