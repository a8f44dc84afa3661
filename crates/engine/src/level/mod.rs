mod collision;

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::app::{LogSpeaker, Speaker};
use crate::score::{FactStore, Outcome, Score};
use crate::stage::{Overlay, OverlayBuilder};
use crate::world::{
    ActorId, BodyKind, Destination, Enemy, Goodie, Hero, Obstacle, ParallaxLayer, PictureId,
    ProjectileConfig, Role, ShapeKind, TimerId, Vec2, World,
};

use collision::defeat_enemy;

/// One playable build of a level: the world, its score and its overlay slots.
pub struct Level {
    pub world: World,
    pub score: Score,
    /// Persistent overlay drawn over the world while playing.
    pub hud: Overlay,
    index: u32,
    speaker: Rc<dyn Speaker>,
    music: Option<String>,
    welcome: Option<OverlayBuilder>,
    win: Option<OverlayBuilder>,
    lose: Option<OverlayBuilder>,
    pause: Option<OverlayBuilder>,
}

impl Level {
    pub fn new(index: u32, facts: FactStore, speaker: Rc<dyn Speaker>) -> Self {
        Self {
            world: World::new(),
            score: Score::new(facts),
            hud: Overlay::new(),
            index,
            speaker,
            music: None,
            welcome: None,
            win: None,
            lose: None,
            pause: None,
        }
    }

    /// Level with in-memory facts and a logging speaker.
    pub fn standalone(index: u32) -> Self {
        Self::new(index, FactStore::in_memory(), Rc::new(LogSpeaker))
    }

    /// 1-based position of this level in the game.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn make_hero(
        &mut self,
        shape: ShapeKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: &str,
    ) -> ActorId {
        let id = self.world.spawn(
            &shape,
            BodyKind::Dynamic,
            x,
            y,
            width,
            height,
            image,
            Role::Hero(Hero::default()),
        );
        self.score.note_hero_created();
        id
    }

    pub fn make_enemy(
        &mut self,
        shape: ShapeKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: &str,
    ) -> ActorId {
        let id = self.world.spawn(
            &shape,
            BodyKind::Static,
            x,
            y,
            width,
            height,
            image,
            Role::Enemy(Enemy::default()),
        );
        self.score.note_enemy_created();
        id
    }

    pub fn make_obstacle(
        &mut self,
        shape: ShapeKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: &str,
    ) -> ActorId {
        self.world.spawn(
            &shape,
            BodyKind::Static,
            x,
            y,
            width,
            height,
            image,
            Role::Obstacle(Obstacle::default()),
        )
    }

    pub fn make_destination(
        &mut self,
        shape: ShapeKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: &str,
    ) -> ActorId {
        let id = self.world.spawn(
            &shape,
            BodyKind::Static,
            x,
            y,
            width,
            height,
            image,
            Role::Destination(Destination::default()),
        );
        self.set_sensor(id);
        id
    }

    pub fn make_goodie(
        &mut self,
        shape: ShapeKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: &str,
    ) -> ActorId {
        let id = self.world.spawn(
            &shape,
            BodyKind::Static,
            x,
            y,
            width,
            height,
            image,
            Role::Goodie(Goodie {
                score: [1, 0, 0, 0],
                on_collect: None,
            }),
        );
        self.set_sensor(id);
        id
    }

    fn set_sensor(&mut self, id: ActorId) {
        if let Some(body) = self.world.body_mut(id) {
            body.set_sensor(true);
        }
    }

    /// Four one-meter walls just outside the rectangle `(x0, y0)..(x1, y1)`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_bounding_box(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        image: &str,
        density: f32,
        elasticity: f32,
        friction: f32,
    ) -> [ActorId; 4] {
        let width = (x1 - x0).abs();
        let height = (y1 - y0).abs();
        let walls = [
            self.make_obstacle(ShapeKind::Box, x0 - 1.0, y1, width + 2.0, 1.0, image),
            self.make_obstacle(ShapeKind::Box, x0 - 1.0, y0 - 1.0, width + 2.0, 1.0, image),
            self.make_obstacle(ShapeKind::Box, x0 - 1.0, y0 - 1.0, 1.0, height + 2.0, image),
            self.make_obstacle(ShapeKind::Box, x1, y0 - 1.0, 1.0, height + 2.0, image),
        ];
        for wall in walls {
            if let Some(body) = self.world.body_mut(wall) {
                body.set_physics(density, elasticity, friction);
            }
        }
        walls
    }

    pub fn remove_actor(&mut self, id: ActorId) -> bool {
        self.world.remove_actor(id)
    }

    pub fn set_hero_strength(&mut self, hero: ActorId, strength: i32) {
        let changed = match self.world.hero_mut(hero) {
            Some(state) if !state.defeated && state.strength != strength => {
                state.strength = strength;
                true
            }
            _ => false,
        };
        if changed {
            self.notify_strength_change(hero);
        }
    }

    pub(crate) fn notify_strength_change(&mut self, hero: ActorId) {
        let callback = self
            .world
            .hero(hero)
            .and_then(|state| state.on_strength_change.clone());
        if let Some(callback) = callback {
            callback(self, hero);
        }
    }

    pub fn make_invincible(&mut self, hero: ActorId, seconds: f32) {
        if let Some(state) = self.world.hero_mut(hero) {
            state.invincible_remaining = state.invincible_remaining.max(seconds);
        }
    }

    /// Defeats an enemy as if a hero had beaten it.
    pub fn defeat_enemy(&mut self, enemy: ActorId) {
        defeat_enemy(self, enemy);
    }

    pub fn set_on_tap(&mut self, id: ActorId, action: impl Fn(&mut Level, ActorId) + 'static) {
        if let Some(actor) = self.world.actor_mut(id) {
            actor.on_tap = Some(Rc::new(action));
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn configure_projectiles(
        &mut self,
        capacity: usize,
        width: f32,
        height: f32,
        image: &str,
        strength: i32,
        z: i32,
        is_circle: bool,
    ) {
        self.world
            .configure_projectiles(capacity, width, height, image, strength, z, is_circle);
    }

    pub fn throw_projectile(
        &mut self,
        source: ActorId,
        offset_x: f32,
        offset_y: f32,
        velocity_x: f32,
        velocity_y: f32,
    ) -> Option<ActorId> {
        let thrown =
            self.world
                .throw_projectile(source, offset_x, offset_y, velocity_x, velocity_y)?;
        self.play_pool_sound(|config| config.throw_sound.clone());
        Some(thrown)
    }

    pub fn throw_projectile_at(
        &mut self,
        source: ActorId,
        offset_x: f32,
        offset_y: f32,
        target_x: f32,
        target_y: f32,
    ) -> Option<ActorId> {
        let thrown =
            self.world
                .throw_projectile_at(source, offset_x, offset_y, target_x, target_y)?;
        self.play_pool_sound(|config| config.throw_sound.clone());
        Some(thrown)
    }

    /// Returns a projectile to its pool with the disappear sound.
    pub(crate) fn retire_projectile(&mut self, projectile: ActorId) {
        if self.world.remove_actor(projectile) {
            self.play_pool_sound(|config| config.disappear_sound.clone());
        }
    }

    fn play_pool_sound(&self, pick: impl FnOnce(&ProjectileConfig) -> Option<String>) {
        let sound = self
            .world
            .projectile_pool()
            .and_then(|pool| pick(&pool.config));
        if let Some(sound) = sound {
            self.play_sound(&sound);
        }
    }

    pub fn add_timer(
        &mut self,
        interval: f32,
        repeat: bool,
        action: impl Fn(&mut Level) + 'static,
    ) -> TimerId {
        self.world.timer_mut().add(interval, repeat, Rc::new(action))
    }

    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.world.timer_mut().cancel(id)
    }

    pub fn enable_tilt(&mut self, x_max: f32, y_max: f32) {
        self.world.enable_tilt(x_max, y_max);
    }

    pub fn reset_gravity(&mut self, x: f32, y: f32) {
        self.world.reset_gravity(x, y);
    }

    pub fn set_camera_bounds(&mut self, width: f32, height: f32) {
        self.world.camera_mut().set_bounds(width, height);
    }

    pub fn set_camera_chase(&mut self, target: Option<ActorId>) {
        self.world.camera_mut().set_chase(target);
        self.world.follow_camera();
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.world.camera_mut().set_zoom(zoom);
    }

    /// Decoration on plane `z` (-2..=2); never collides.
    pub fn draw_picture(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: &str,
        z: i32,
    ) -> PictureId {
        self.world.add_picture(x, y, width, height, image, z)
    }

    pub fn set_picture_visible(&mut self, id: PictureId, visible: bool) -> bool {
        match self.world.scenery_mut().picture_mut(id) {
            Some(picture) => {
                picture.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn add_background_layer(&mut self, layer: ParallaxLayer) {
        self.world.scenery_mut().background.push(layer);
    }

    pub fn add_foreground_layer(&mut self, layer: ParallaxLayer) {
        self.world.scenery_mut().foreground.push(layer);
    }

    pub fn set_background_color(&mut self, rgb: u32) {
        self.world.scenery_mut().set_background_color(rgb);
    }

    pub fn set_welcome_builder(&mut self, builder: impl Fn(&mut Overlay, &mut Level) + 'static) {
        self.welcome = Some(Rc::new(builder));
    }

    pub fn set_win_builder(&mut self, builder: impl Fn(&mut Overlay, &mut Level) + 'static) {
        self.win = Some(Rc::new(builder));
    }

    pub fn set_lose_builder(&mut self, builder: impl Fn(&mut Overlay, &mut Level) + 'static) {
        self.lose = Some(Rc::new(builder));
    }

    /// Requests a pause; the stage shows it on its next update.
    pub fn set_pause_builder(&mut self, builder: impl Fn(&mut Overlay, &mut Level) + 'static) {
        self.pause = Some(Rc::new(builder));
    }

    pub fn has_pause_builder(&self) -> bool {
        self.pause.is_some()
    }

    pub(crate) fn take_welcome_builder(&mut self) -> Option<OverlayBuilder> {
        self.welcome.take()
    }

    pub(crate) fn take_pause_builder(&mut self) -> Option<OverlayBuilder> {
        self.pause.take()
    }

    pub(crate) fn outcome_builder(&self, outcome: Outcome) -> Option<OverlayBuilder> {
        match outcome {
            Outcome::Won => self.win.clone(),
            Outcome::Lost => self.lose.clone(),
            Outcome::Playing => None,
        }
    }

    pub fn set_music(&mut self, name: &str) {
        self.music = Some(name.to_string());
    }

    pub fn music(&self) -> Option<&str> {
        self.music.as_deref()
    }

    pub fn play_sound(&self, name: &str) {
        self.speaker.play_sound(name);
    }

    /// One fixed simulation step while the level is playing.
    pub(crate) fn tick(&mut self, dt: f32, tilt: Vec2) {
        let contacts = self.world.step(dt, tilt);
        if !contacts.is_empty() {
            debug!(count = contacts.len(), "contacts_reported");
        }
        collision::dispatch(self, &contacts);

        self.score.tick_countdowns(dt);
        self.score.evaluate();

        if self.score.outcome() == Outcome::Playing {
            for action in self.world.timer_mut().advance(dt) {
                action(self);
            }
            self.score.evaluate();
        }

        self.world.apply_pending();
        self.world.follow_camera();
    }

    /// Hands the fact store to the next build.
    pub(crate) fn into_facts(self) -> FactStore {
        self.score.into_facts()
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Level")
            .field("index", &self.index)
            .field("actors", &self.world.actor_count())
            .field("outcome", &self.score.outcome())
            .finish_non_exhaustive()
    }
}
