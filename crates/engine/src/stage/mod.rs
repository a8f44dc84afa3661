mod overlay;

use std::fmt;
use std::mem;
use std::rc::Rc;

use tracing::{debug, info};

use crate::app::{screen_to_world, InputSnapshot, Speaker, Viewport};
use crate::level::Level;
use crate::score::{FactStore, Outcome};
use crate::world::Movement;

pub use overlay::{
    ControlAction, KeyTrigger, Overlay, OverlayBuilder, OverlayRect, OverlayText, TapControl,
    TextLine, TextSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Building,
    Welcome,
    Playing,
    Paused,
    Won,
    Lost,
}

impl StageState {
    pub fn as_str(self) -> &'static str {
        match self {
            StageState::Building => "building",
            StageState::Welcome => "welcome",
            StageState::Playing => "playing",
            StageState::Paused => "paused",
            StageState::Won => "won",
            StageState::Lost => "lost",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    NextLevel,
    RepeatLevel,
    Chooser,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageCommand {
    None,
    DismissOverlay,
    Navigate(NavAction),
}

/// Builds levels by 1-based index.
pub trait LevelBuilder {
    fn build(&self, index: u32, level: &mut Level);

    fn level_count(&self) -> u32 {
        u32::MAX
    }
}

impl<F> LevelBuilder for F
where
    F: Fn(u32, &mut Level),
{
    fn build(&self, index: u32, level: &mut Level) {
        self(index, level)
    }
}

/// Owns the current level and the modal overlay, and drives transitions between them.
pub struct Stage {
    builder: Box<dyn LevelBuilder>,
    state: StageState,
    level: Level,
    modal: Option<Overlay>,
    speaker: Rc<dyn Speaker>,
    music_playing: bool,
}

impl Stage {
    pub fn new(
        builder: impl LevelBuilder + 'static,
        facts: FactStore,
        speaker: Rc<dyn Speaker>,
        start_index: u32,
    ) -> Self {
        let mut stage = Self {
            builder: Box::new(builder),
            state: StageState::Building,
            level: Level::new(start_index, facts, Rc::clone(&speaker)),
            modal: None,
            speaker,
            music_playing: false,
        };
        stage.build_level(start_index);
        stage
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn modal(&self) -> Option<&Overlay> {
        self.modal.as_ref()
    }

    pub fn level_index(&self) -> u32 {
        self.level.index()
    }

    pub fn level_count(&self) -> u32 {
        self.builder.level_count()
    }

    /// Discards the current level and builds `index` from scratch. Only session
    /// and game facts carry over.
    pub fn build_level(&mut self, index: u32) {
        let index = index.clamp(1, self.builder.level_count().max(1));
        self.modal = None;
        self.set_state(StageState::Building);

        let placeholder = Level::new(index, FactStore::in_memory(), Rc::clone(&self.speaker));
        let mut facts = mem::replace(&mut self.level, placeholder).into_facts();
        facts.clear_level();
        self.level = Level::new(index, facts, Rc::clone(&self.speaker));
        self.builder.build(index, &mut self.level);
        info!(
            level = index,
            actors = self.level.world.actor_count(),
            timers = self.level.world.timer().len(),
            "level_built"
        );

        match self.level.take_welcome_builder() {
            Some(builder) => self.show_modal(builder, StageState::Welcome),
            None => self.set_state(StageState::Playing),
        }
    }

    /// Advances one fixed step. Returns navigation the stage cannot handle itself.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot) -> StageCommand {
        let command = match self.state {
            StageState::Building => StageCommand::None,
            StageState::Playing => self.update_playing(dt, input),
            StageState::Welcome | StageState::Paused | StageState::Won | StageState::Lost => {
                self.route_modal_input(input)
            }
        };
        self.apply(command)
    }

    pub fn dismiss_overlay(&mut self) -> StageCommand {
        match self.state {
            StageState::Welcome | StageState::Paused => {
                self.modal = None;
                self.set_state(StageState::Playing);
                StageCommand::None
            }
            StageState::Won => self.navigate(NavAction::NextLevel),
            StageState::Lost => self.navigate(NavAction::RepeatLevel),
            StageState::Building | StageState::Playing => StageCommand::None,
        }
    }

    pub fn navigate(&mut self, action: NavAction) -> StageCommand {
        info!(action = ?action, level = self.level.index(), "stage_navigate");
        match action {
            NavAction::NextLevel => {
                let next = self.level.index().saturating_add(1);
                if next > self.builder.level_count() {
                    self.stop_music();
                    return StageCommand::Navigate(NavAction::Chooser);
                }
                self.build_level(next);
                StageCommand::None
            }
            NavAction::RepeatLevel => {
                self.build_level(self.level.index());
                StageCommand::None
            }
            NavAction::Chooser | NavAction::Exit => {
                self.stop_music();
                StageCommand::Navigate(action)
            }
        }
    }

    /// Window title text: level number followed by overlay text lines.
    pub fn title(&self) -> String {
        let mut parts = vec![format!("Level {}", self.level.index())];
        parts.extend(self.level.hud.render_texts(&self.level));
        if let Some(modal) = self.modal.as_ref() {
            parts.extend(modal.render_texts(&self.level));
        }
        parts.retain(|part| !part.is_empty());
        parts.join(" | ")
    }

    fn apply(&mut self, command: StageCommand) -> StageCommand {
        match command {
            StageCommand::None => StageCommand::None,
            StageCommand::DismissOverlay => self.dismiss_overlay(),
            StageCommand::Navigate(action) => self.navigate(action),
        }
    }

    fn update_playing(&mut self, dt: f32, input: &InputSnapshot) -> StageCommand {
        if let Some(builder) = self.level.take_pause_builder() {
            self.show_modal(builder, StageState::Paused);
            return StageCommand::None;
        }

        let command = self.route_playing_input(input);
        if command != StageCommand::None {
            return command;
        }

        self.level.tick(dt, input.tilt());
        match self.level.score.outcome() {
            Outcome::Playing => StageCommand::None,
            outcome => self.finish(outcome),
        }
    }

    fn finish(&mut self, outcome: Outcome) -> StageCommand {
        let (state, default_action) = match outcome {
            Outcome::Won => (StageState::Won, NavAction::NextLevel),
            Outcome::Lost | Outcome::Playing => (StageState::Lost, NavAction::RepeatLevel),
        };
        match self.level.outcome_builder(outcome) {
            Some(builder) => {
                self.show_modal(builder, state);
                StageCommand::None
            }
            None => {
                self.set_state(state);
                StageCommand::Navigate(default_action)
            }
        }
    }

    fn route_playing_input(&mut self, input: &InputSnapshot) -> StageCommand {
        for action in self.level.hud.key_actions(input) {
            let command = action(&mut self.level);
            if command != StageCommand::None {
                return command;
            }
        }

        let viewport = {
            let (width, height) = input.window_size();
            Viewport::new(width, height)
        };
        if let Some(tap_px) = input.tap_px() {
            if let Some(action) = self.level.hud.tap_action(input.normalize_px(tap_px)) {
                return action(&mut self.level);
            }
            let point = screen_to_world(tap_px, self.level.world.camera(), viewport);
            if let Some(id) = self.level.world.pick_topmost_at(point, true) {
                let callback = self
                    .level
                    .world
                    .actor(id)
                    .and_then(|actor| actor.on_tap.clone());
                if let Some(callback) = callback {
                    debug!(actor = id.0, "actor_tapped");
                    callback(&mut self.level, id);
                }
            }
        }

        if let Some(flick) = input.flick() {
            let camera = self.level.world.camera();
            let start = screen_to_world(flick.start_px, camera, viewport);
            let end = screen_to_world(flick.start_px + flick.delta_px, camera, viewport);
            let target = self
                .level
                .world
                .pick_topmost_at(start, false)
                .filter(|id| {
                    self.level
                        .world
                        .actor(*id)
                        .is_some_and(|actor| matches!(actor.movement, Movement::Flick { .. }))
                });
            if let Some(id) = target {
                self.level.world.flick(id, end - start);
            }
        }
        StageCommand::None
    }

    fn route_modal_input(&mut self, input: &InputSnapshot) -> StageCommand {
        let Some(modal) = self.modal.as_ref() else {
            return StageCommand::None;
        };
        let mut actions = modal.key_actions(input);
        if let Some(tap_px) = input.tap_px() {
            actions.extend(modal.tap_action(input.normalize_px(tap_px)));
        }
        for action in actions {
            let command = action(&mut self.level);
            if command != StageCommand::None {
                return command;
            }
        }
        StageCommand::None
    }

    fn show_modal(&mut self, builder: OverlayBuilder, state: StageState) {
        let mut overlay = Overlay::new();
        builder(&mut overlay, &mut self.level);
        self.modal = Some(overlay);
        self.set_state(state);
    }

    fn set_state(&mut self, next: StageState) {
        if self.state != next {
            info!(
                from = self.state.as_str(),
                to = next.as_str(),
                level = self.level.index(),
                "stage_transition"
            );
        }
        self.state = next;
        if next == StageState::Playing {
            self.start_music();
        } else {
            self.stop_music();
        }
    }

    fn start_music(&mut self) {
        if self.music_playing {
            return;
        }
        if let Some(music) = self.level.music() {
            self.speaker.play_music(music);
            self.music_playing = true;
        }
    }

    fn stop_music(&mut self) {
        if self.music_playing {
            self.speaker.stop_music();
            self.music_playing = false;
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("state", &self.state)
            .field("level", &self.level)
            .field("modal", &self.modal)
            .finish_non_exhaustive()
    }
}
