mod actor;
mod body;
mod camera;
mod geometry;
mod movement;
mod physics;
mod projectile;
mod role;
mod scenery;
mod timer;

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use tracing::{debug, info};

pub use actor::{Actor, ActorId, Appearance, Extra, Z_MAX, Z_MIN};
pub use body::{BodyKind, Material, RigidBody};
pub use camera::{
    Camera, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN, DEFAULT_VIEW_HEIGHT,
    DEFAULT_VIEW_WIDTH,
};
pub use geometry::{Aabb, Shape, ShapeKind, Vec2};
pub use movement::{ChaseAxis, Movement, Route, RouteFollower};
pub use physics::{ArcadeSolver, Contact, ContactPhase, PhysicsSolver, Side, SolverBody};
pub use projectile::{ProjectileConfig, ProjectilePool, DEFAULT_PROJECTILE_RANGE};
pub use role::{
    ActorCallback, ArrivalGate, CollisionCallback, Destination, Enemy, Goodie, Hero, Obstacle,
    Projectile, Role, RoleKind, SpeedBoost, DEFAULT_ENEMY_DAMAGE, DEFAULT_HERO_STRENGTH,
};
pub use scenery::{LayerAxis, LayerMotion, ParallaxLayer, Picture, PictureId, Scenery};
pub use timer::{Timer, TimerAction, TimerId};

use movement::{MovementContext, MovementStatus};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltConfig {
    pub max: Vec2,
    /// Tilt sets velocity directly instead of pushing with a force.
    pub as_velocity: bool,
    pub multiplier: f32,
}

/// Live actors plus everything that simulates them.
pub struct World {
    actors: Vec<Actor>,
    next_id: u64,
    next_spawn_order: u64,
    pending_removals: Vec<ActorId>,
    solver: Box<dyn PhysicsSolver>,
    gravity: Vec2,
    camera: Camera,
    timer: Timer,
    pool: Option<ProjectilePool>,
    tilt: Option<TiltConfig>,
    extras: HashMap<ActorId, Extra>,
    scenery: Scenery,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_solver(Box::new(ArcadeSolver::new()))
    }

    pub fn with_solver(solver: Box<dyn PhysicsSolver>) -> Self {
        Self {
            actors: Vec::new(),
            next_id: 0,
            next_spawn_order: 0,
            pending_removals: Vec::new(),
            solver,
            gravity: Vec2::ZERO,
            camera: Camera::default(),
            timer: Timer::default(),
            pool: None,
            tilt: None,
            extras: HashMap::new(),
            scenery: Scenery::default(),
        }
    }

    /// `x, y` is the top-left corner of the `w x h` footprint.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        &mut self,
        shape: &ShapeKind,
        kind: BodyKind,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: &str,
        role: Role,
    ) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let spawn_order = self.take_spawn_order();

        let center = Vec2::new(x + width * 0.5, y + height * 0.5);
        self.actors.push(Actor {
            id,
            body: RigidBody::new(shape.to_shape(width, height), kind, center),
            role,
            movement: Movement::Inert,
            appearance: Appearance::new(image, width, height),
            on_tap: None,
            z: 0,
            enabled: true,
            spawn_order,
        });
        id
    }

    fn take_spawn_order(&mut self) -> u64 {
        let order = self.next_spawn_order;
        self.next_spawn_order = self.next_spawn_order.saturating_add(1);
        order
    }

    /// A picture on plane `z`; it shares draw order with actors on the same plane.
    pub fn add_picture(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: &str,
        z: i32,
    ) -> PictureId {
        let spawn_order = self.take_spawn_order();
        self.scenery
            .add_picture(x, y, width, height, image, z, spawn_order)
    }

    pub fn scenery(&self) -> &Scenery {
        &self.scenery
    }

    pub fn scenery_mut(&mut self) -> &mut Scenery {
        &mut self.scenery
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.id == id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|actor| actor.id == id)
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn enabled_actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(|actor| actor.enabled)
    }

    pub fn count_enabled(&self, kind: RoleKind) -> usize {
        self.enabled_actors()
            .filter(|actor| actor.role.kind() == kind)
            .count()
    }

    pub fn is_enabled(&self, id: ActorId) -> bool {
        self.actor(id).is_some_and(|actor| actor.enabled)
    }

    pub fn position(&self, id: ActorId) -> Option<Vec2> {
        self.actor(id).map(|actor| actor.body.position())
    }

    fn enabled_position(&self, id: ActorId) -> Option<Vec2> {
        self.actor(id)
            .filter(|actor| actor.enabled)
            .map(|actor| actor.body.position())
    }

    pub fn role_kind(&self, id: ActorId) -> Option<RoleKind> {
        self.actor(id).map(|actor| actor.role.kind())
    }

    pub fn set_role(&mut self, id: ActorId, role: Role) -> bool {
        match self.actor_mut(id) {
            Some(actor) => {
                actor.role = role;
                true
            }
            None => false,
        }
    }

    pub fn hero(&self, id: ActorId) -> Option<&Hero> {
        match self.actor(id).map(|actor| &actor.role) {
            Some(Role::Hero(hero)) => Some(hero),
            _ => None,
        }
    }

    pub fn hero_mut(&mut self, id: ActorId) -> Option<&mut Hero> {
        match self.actor_mut(id).map(|actor| &mut actor.role) {
            Some(Role::Hero(hero)) => Some(hero),
            _ => None,
        }
    }

    pub fn enemy(&self, id: ActorId) -> Option<&Enemy> {
        match self.actor(id).map(|actor| &actor.role) {
            Some(Role::Enemy(enemy)) => Some(enemy),
            _ => None,
        }
    }

    pub fn enemy_mut(&mut self, id: ActorId) -> Option<&mut Enemy> {
        match self.actor_mut(id).map(|actor| &mut actor.role) {
            Some(Role::Enemy(enemy)) => Some(enemy),
            _ => None,
        }
    }

    pub fn obstacle(&self, id: ActorId) -> Option<&Obstacle> {
        match self.actor(id).map(|actor| &actor.role) {
            Some(Role::Obstacle(obstacle)) => Some(obstacle),
            _ => None,
        }
    }

    pub fn obstacle_mut(&mut self, id: ActorId) -> Option<&mut Obstacle> {
        match self.actor_mut(id).map(|actor| &mut actor.role) {
            Some(Role::Obstacle(obstacle)) => Some(obstacle),
            _ => None,
        }
    }

    pub fn destination(&self, id: ActorId) -> Option<&Destination> {
        match self.actor(id).map(|actor| &actor.role) {
            Some(Role::Destination(destination)) => Some(destination),
            _ => None,
        }
    }

    pub fn destination_mut(&mut self, id: ActorId) -> Option<&mut Destination> {
        match self.actor_mut(id).map(|actor| &mut actor.role) {
            Some(Role::Destination(destination)) => Some(destination),
            _ => None,
        }
    }

    pub fn goodie_mut(&mut self, id: ActorId) -> Option<&mut Goodie> {
        match self.actor_mut(id).map(|actor| &mut actor.role) {
            Some(Role::Goodie(goodie)) => Some(goodie),
            _ => None,
        }
    }

    pub fn projectile(&self, id: ActorId) -> Option<&Projectile> {
        match self.actor(id).map(|actor| &actor.role) {
            Some(Role::Projectile(projectile)) => Some(projectile),
            _ => None,
        }
    }

    pub fn body_mut(&mut self, id: ActorId) -> Option<&mut RigidBody> {
        self.actor_mut(id).map(|actor| &mut actor.body)
    }

    /// Disables the actor now; it is reclaimed after the current tick.
    /// Pool projectiles go back to their pool instead.
    pub fn remove_actor(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actors.iter_mut().find(|actor| actor.id == id) else {
            return false;
        };
        if !actor.enabled {
            return false;
        }
        if let Role::Projectile(projectile) = &actor.role {
            let slot = projectile.slot;
            self.release_projectile_slot(id, slot);
            return true;
        }
        actor.enabled = false;
        actor.body.set_velocity(Vec2::ZERO);
        self.solver.forget(id);
        self.pending_removals.push(id);
        true
    }

    pub(crate) fn apply_pending(&mut self) {
        if self.pending_removals.is_empty() {
            return;
        }
        self.pending_removals.sort();
        self.pending_removals.dedup();
        let pending = &self.pending_removals;
        self.actors
            .retain(|actor| pending.binary_search(&actor.id).is_err());
        for id in self.pending_removals.drain(..) {
            self.extras.remove(&id);
        }
    }

    pub fn set_movement(&mut self, id: ActorId, mut movement: Movement) -> bool {
        let Some(actor) = self.actor_mut(id) else {
            return false;
        };
        if actor.body.kind() == BodyKind::Static {
            if let Some(kind) = movement.kind_for_static_body() {
                actor.body.set_kind(kind);
            }
        }
        movement.attach(&mut actor.body);
        actor.movement = movement;
        true
    }

    /// Manual control of the horizontal velocity; `None` hands the axis back to physics.
    pub fn update_x_velocity(&mut self, id: ActorId, velocity: Option<f32>) -> bool {
        self.update_manual_velocity(id, |x, _| *x = velocity)
    }

    pub fn update_y_velocity(&mut self, id: ActorId, velocity: Option<f32>) -> bool {
        self.update_manual_velocity(id, |_, y| *y = velocity)
    }

    fn update_manual_velocity(
        &mut self,
        id: ActorId,
        update: impl FnOnce(&mut Option<f32>, &mut Option<f32>),
    ) -> bool {
        let Some(actor) = self.actor_mut(id) else {
            return false;
        };
        if !matches!(actor.movement, Movement::Manual { .. }) {
            if actor.body.kind() == BodyKind::Static {
                actor.body.set_kind(BodyKind::Kinematic);
            }
            actor.movement = Movement::Manual { x: None, y: None };
        }
        if let Movement::Manual { x, y } = &mut actor.movement {
            update(x, y);
        }
        true
    }

    /// Pins the actor at its current offset from the camera center.
    pub fn hover(&mut self, id: ActorId) -> bool {
        let camera_center = self.camera.position;
        let Some(actor) = self.actor_mut(id) else {
            return false;
        };
        let anchor = actor.body.position() - camera_center;
        actor.body.set_kind(BodyKind::Kinematic);
        actor.movement = Movement::Hover { anchor };
        true
    }

    pub fn release_hover(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actor_mut(id) else {
            return false;
        };
        if !matches!(actor.movement, Movement::Hover { .. }) {
            return false;
        }
        actor.movement = Movement::Inert;
        actor.body.set_kind(BodyKind::Dynamic);
        true
    }

    /// Launches a flickable actor with `drag * multiplier`.
    pub fn flick(&mut self, id: ActorId, drag: Vec2) -> bool {
        let Some(actor) = self.actor_mut(id) else {
            return false;
        };
        let Movement::Flick { multiplier } = actor.movement else {
            return false;
        };
        if actor.body.kind() != BodyKind::Dynamic {
            actor.body.set_kind(BodyKind::Dynamic);
        }
        actor.body.set_velocity(drag * multiplier);
        true
    }

    pub fn jump(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.actor_mut(id) else {
            return false;
        };
        let Role::Hero(hero) = &mut actor.role else {
            return false;
        };
        if !actor.enabled || (hero.in_air && !hero.multi_jump) {
            return false;
        }
        hero.in_air = true;
        actor.body.add_velocity(hero.jump_impulse);
        true
    }

    pub fn crawl_on(&mut self, id: ActorId) -> bool {
        self.set_crawl(id, true)
    }

    pub fn crawl_off(&mut self, id: ActorId) -> bool {
        self.set_crawl(id, false)
    }

    fn set_crawl(&mut self, id: ActorId, crawling: bool) -> bool {
        let Some(actor) = self.actor_mut(id) else {
            return false;
        };
        let Role::Hero(hero) = &mut actor.role else {
            return false;
        };
        hero.crawling = crawling;
        actor
            .body
            .set_rotation(if crawling { -FRAC_PI_2 } else { 0.0 });
        true
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn reset_gravity(&mut self, x: f32, y: f32) {
        self.gravity = Vec2::new(x, y);
    }

    pub fn enable_tilt(&mut self, x_max: f32, y_max: f32) {
        self.tilt = Some(TiltConfig {
            max: Vec2::new(x_max.abs(), y_max.abs()),
            as_velocity: false,
            multiplier: 1.0,
        });
    }

    pub fn tilt(&self) -> Option<TiltConfig> {
        self.tilt
    }

    pub fn set_tilt_as_velocity(&mut self, as_velocity: bool) {
        if let Some(tilt) = self.tilt.as_mut() {
            tilt.as_velocity = as_velocity;
        }
    }

    pub fn set_tilt_multiplier(&mut self, multiplier: f32) {
        if let Some(tilt) = self.tilt.as_mut() {
            tilt.multiplier = multiplier;
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    pub fn set_extra(&mut self, id: ActorId, extra: Extra) {
        self.extras.insert(id, extra);
    }

    pub fn extra(&self, id: ActorId) -> Option<&Extra> {
        self.extras.get(&id)
    }

    pub fn take_extra(&mut self, id: ActorId) -> Option<Extra> {
        self.extras.remove(&id)
    }

    /// Topmost enabled, visible actor whose bounds contain `point`.
    pub fn pick_topmost_at(&self, point: Vec2, tappable_only: bool) -> Option<ActorId> {
        let mut best: Option<((i8, u64), ActorId)> = None;
        for actor in self.enabled_actors() {
            if !actor.appearance.visible || (tappable_only && actor.on_tap.is_none()) {
                continue;
            }
            let body = &actor.body;
            if !body.shape().contains_point(body.position(), body.rotation(), point) {
                continue;
            }
            let rank = (actor.z, actor.spawn_order);
            match best {
                Some((best_rank, _)) if best_rank >= rank => {}
                _ => best = Some((rank, actor.id)),
            }
        }
        best.map(|(_, id)| id)
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
        if let Some(previous) = self.pool.take() {
            for id in previous.slot_actors() {
                if let Some(actor) = self.actors.iter_mut().find(|actor| actor.id == *id) {
                    actor.enabled = false;
                }
                self.pending_removals.push(*id);
            }
        }

        let shape = if is_circle {
            ShapeKind::Circle
        } else {
            ShapeKind::Box
        };
        let mut slots = Vec::with_capacity(capacity);
        for slot in 0..capacity {
            let id = self.spawn(
                &shape,
                BodyKind::Dynamic,
                0.0,
                0.0,
                width,
                height,
                image,
                Role::Projectile(Projectile {
                    strength,
                    disappear_on_collision: true,
                    range_remaining: 0.0,
                    last_position: Vec2::ZERO,
                    slot,
                }),
            );
            if let Some(actor) = self.actor_mut(id) {
                actor.enabled = false;
                actor.set_z(z);
                actor.body.set_sensor(true);
                actor.body.set_gravity_scale(0.0);
            }
            slots.push(id);
        }

        info!(capacity, strength, "projectiles_configured");
        self.pool = Some(ProjectilePool::new(
            slots,
            ProjectileConfig {
                strength,
                ..ProjectileConfig::default()
            },
        ));
    }

    pub fn projectile_pool(&self) -> Option<&ProjectilePool> {
        self.pool.as_ref()
    }

    pub fn projectile_pool_mut(&mut self) -> Option<&mut ProjectilePool> {
        self.pool.as_mut()
    }

    /// Throws from `source` + offset with a raw velocity.
    pub fn throw_projectile(
        &mut self,
        source: ActorId,
        offset_x: f32,
        offset_y: f32,
        velocity_x: f32,
        velocity_y: f32,
    ) -> Option<ActorId> {
        let origin = self.enabled_position(source)?;
        self.launch_projectile(
            origin + Vec2::new(offset_x, offset_y),
            Vec2::new(velocity_x, velocity_y),
        )
    }

    /// Throws from `source` + offset toward a world point.
    pub fn throw_projectile_at(
        &mut self,
        source: ActorId,
        offset_x: f32,
        offset_y: f32,
        target_x: f32,
        target_y: f32,
    ) -> Option<ActorId> {
        let origin = self.enabled_position(source)?;
        let config = self.pool.as_ref().map(|pool| pool.config.clone());
        let Some(config) = config else {
            debug!(reason = "not_configured", "projectile_throw_ignored");
            return None;
        };
        let start = origin + Vec2::new(offset_x, offset_y);
        let aim = Vec2::new(target_x, target_y) - start;
        let velocity = match config.fixed_speed {
            Some(speed) => aim.normalized_or_zero() * speed,
            None => aim * config.multiplier,
        };
        self.launch_projectile(start, velocity)
    }

    fn launch_projectile(&mut self, start: Vec2, velocity: Vec2) -> Option<ActorId> {
        let Some(pool) = self.pool.as_mut() else {
            debug!(reason = "not_configured", "projectile_throw_ignored");
            return None;
        };
        let Some(slot) = pool.acquire() else {
            debug!(
                reason = "pool_unavailable",
                remaining = ?pool.remaining(),
                in_flight = pool.in_flight(),
                "projectile_throw_ignored"
            );
            return None;
        };
        pool.mark_launched(slot);
        let config = pool.config.clone();
        let id = pool.slot_actor(slot)?;

        self.solver.forget(id);
        let actor = self.actor_mut(id)?;
        actor.enabled = true;
        actor.body.set_position(start);
        actor.body.set_absolute_velocity(velocity);
        actor.body.set_sensor(config.sensor);
        actor
            .body
            .set_gravity_scale(if config.gravity { 1.0 } else { 0.0 });
        if config.rotate_to_direction && velocity != Vec2::ZERO {
            actor.body.set_rotation(velocity.y.atan2(velocity.x));
        }
        if let Role::Projectile(projectile) = &mut actor.role {
            projectile.strength = config.strength;
            projectile.disappear_on_collision = config.disappear_on_collision;
            projectile.range_remaining = config.range;
            projectile.last_position = start;
        }
        Some(id)
    }

    fn release_projectile_slot(&mut self, id: ActorId, slot: usize) {
        if let Some(actor) = self.actors.iter_mut().find(|actor| actor.id == id) {
            actor.enabled = false;
            actor.body.set_absolute_velocity(Vec2::ZERO);
        }
        if let Some(pool) = self.pool.as_mut() {
            pool.release(slot);
        }
        self.solver.forget(id);
    }

    /// Movement, integration and contact detection for one fixed step.
    pub(crate) fn step(&mut self, dt: f32, tilt_input: Vec2) -> Vec<Contact> {
        self.run_movements(dt, tilt_input);
        self.tick_hero_effects(dt);

        let gravity = self.gravity;
        let mut bodies = self
            .actors
            .iter_mut()
            .filter(|actor| actor.enabled)
            .map(|actor| SolverBody {
                id: actor.id,
                one_sided: actor.role.one_sided(),
                body: &mut actor.body,
            })
            .collect::<Vec<_>>();
        let contacts = self.solver.step(&mut bodies, gravity, dt);
        drop(bodies);

        self.track_projectile_range();
        self.scenery.advance(dt);
        contacts
    }

    fn run_movements(&mut self, dt: f32, tilt_input: Vec2) {
        let tilt = self.tilt.map(|config| {
            let scaled = tilt_input * config.multiplier;
            Vec2::new(
                scaled.x.clamp(-config.max.x, config.max.x),
                scaled.y.clamp(-config.max.y, config.max.y),
            )
        });
        let tilt_as_velocity = self.tilt.is_some_and(|config| config.as_velocity);
        let camera_center = self.camera.position;

        for index in 0..self.actors.len() {
            if !self.actors[index].enabled || self.actors[index].movement.is_inert() {
                continue;
            }
            let chase_target = self.actors[index]
                .movement
                .chase_target()
                .and_then(|target| self.enabled_position(target));
            let ctx = MovementContext {
                tilt,
                tilt_as_velocity,
                camera_center,
                chase_target,
                dt,
            };
            let actor = &mut self.actors[index];
            if actor.movement.apply(&mut actor.body, &ctx) == MovementStatus::Finished {
                actor.movement = Movement::Inert;
            }
        }
    }

    fn tick_hero_effects(&mut self, dt: f32) {
        for actor in self.actors.iter_mut().filter(|actor| actor.enabled) {
            let Role::Hero(hero) = &mut actor.role else {
                continue;
            };
            hero.invincible_remaining = (hero.invincible_remaining - dt).max(0.0);
            if let Some(boost) = hero.active_boost.as_mut() {
                if boost.duration < 0.0 {
                    continue;
                }
                boost.duration -= dt;
                if boost.duration <= 0.0 {
                    actor.body.add_velocity(-boost.delta);
                    hero.active_boost = None;
                }
            }
        }
    }

    fn track_projectile_range(&mut self) {
        let mut spent = Vec::new();
        for actor in self.actors.iter_mut().filter(|actor| actor.enabled) {
            let Role::Projectile(projectile) = &mut actor.role else {
                continue;
            };
            let position = actor.body.position();
            projectile.range_remaining -= position.distance(projectile.last_position);
            projectile.last_position = position;
            if projectile.range_remaining <= 0.0 {
                spent.push((actor.id, projectile.slot));
            }
        }
        for (id, slot) in spent {
            self.release_projectile_slot(id, slot);
        }
    }

    pub(crate) fn follow_camera(&mut self) {
        if let Some(position) = self
            .camera
            .chase_target()
            .and_then(|target| self.enabled_position(target))
        {
            self.camera.center_on(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero_at(world: &mut World, x: f32, y: f32) -> ActorId {
        world.spawn(
            &ShapeKind::Circle,
            BodyKind::Dynamic,
            x,
            y,
            1.0,
            1.0,
            "hero",
            Role::Hero(Hero::default()),
        )
    }

    fn wall_at(world: &mut World, x: f32, y: f32) -> ActorId {
        world.spawn(
            &ShapeKind::Box,
            BodyKind::Static,
            x,
            y,
            1.0,
            1.0,
            "wall",
            Role::Obstacle(Obstacle::default()),
        )
    }

    #[test]
    fn spawn_uses_top_left_corner_and_unique_ids() {
        let mut world = World::new();
        let a = hero_at(&mut world, 2.0, 3.0);
        let b = hero_at(&mut world, 2.0, 3.0);
        assert_ne!(a, b);
        assert_eq!(world.position(a), Some(Vec2::new(2.5, 3.5)));
    }

    #[test]
    fn removed_actor_is_disabled_then_reclaimed() {
        let mut world = World::new();
        let id = hero_at(&mut world, 0.0, 0.0);
        world.set_extra(id, Extra::Int(4));

        assert!(world.remove_actor(id));
        assert!(!world.is_enabled(id));
        assert!(world.actor(id).is_some());
        assert!(!world.remove_actor(id));

        world.apply_pending();
        assert!(world.actor(id).is_none());
        assert!(world.extra(id).is_none());
    }

    #[test]
    fn removed_ids_are_never_reused() {
        let mut world = World::new();
        let first = hero_at(&mut world, 0.0, 0.0);
        world.remove_actor(first);
        world.apply_pending();
        let second = hero_at(&mut world, 0.0, 0.0);
        assert_ne!(first, second);
    }

    #[test]
    fn movement_promotes_static_bodies() {
        let mut world = World::new();
        let wall = wall_at(&mut world, 0.0, 0.0);
        world.set_movement(wall, Movement::route(Route::new().to(0.0, 0.0).to(4.0, 0.0), 1.0, false));
        let body = &world.actor(wall).expect("wall").body;
        assert_eq!(body.kind(), BodyKind::Kinematic);
        assert_eq!(body.position(), Vec2::ZERO);
    }

    #[test]
    fn finished_route_becomes_inert() {
        let mut world = World::new();
        let wall = wall_at(&mut world, 0.0, 0.0);
        world.set_movement(wall, Movement::route(Route::new().to(0.0, 0.0).to(1.0, 0.0), 4.0, false));
        for _ in 0..3 {
            world.step(0.25, Vec2::ZERO);
        }
        let actor = world.actor(wall).expect("wall");
        assert!(actor.movement.is_inert());
        assert_eq!(actor.body.position(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn chase_follows_target_position() {
        let mut world = World::new();
        let hero = hero_at(&mut world, 9.5, -0.5);
        let chaser = wall_at(&mut world, -0.5, -0.5);
        world.set_movement(chaser, Movement::chase(hero, 2.0));
        world.step(0.5, Vec2::ZERO);
        assert_eq!(world.position(chaser), Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn tilt_input_is_clamped_to_world_max() {
        let mut world = World::new();
        world.enable_tilt(2.0, 2.0);
        world.set_tilt_as_velocity(true);
        let hero = hero_at(&mut world, 0.0, 0.0);
        world.set_movement(hero, Movement::Tilt);
        world.step(0.5, Vec2::new(10.0, -1.0));
        let velocity = world.actor(hero).expect("hero").body.velocity();
        assert_eq!(velocity, Vec2::new(2.0, -1.0));
    }

    #[test]
    fn jump_requires_landing_unless_multi_jump() {
        let mut world = World::new();
        let hero = hero_at(&mut world, 0.0, 0.0);
        world.hero_mut(hero).expect("hero").jump_impulse = Vec2::new(0.0, -5.0);

        assert!(world.jump(hero));
        assert!(!world.jump(hero));
        world.hero_mut(hero).expect("hero").multi_jump = true;
        assert!(world.jump(hero));
        assert_eq!(
            world.actor(hero).expect("hero").body.velocity(),
            Vec2::new(0.0, -10.0)
        );
    }

    #[test]
    fn hover_holds_offset_until_released() {
        let mut world = World::new();
        world.reset_gravity(0.0, 10.0);
        let hero = hero_at(&mut world, 2.5, 2.5);
        assert!(world.hover(hero));
        world.camera_mut().position = Vec2::new(10.0, 4.5);
        world.step(0.25, Vec2::ZERO);
        assert_eq!(world.position(hero), Some(Vec2::new(5.0, 3.0)));

        assert!(world.release_hover(hero));
        world.step(0.25, Vec2::ZERO);
        assert!(world.position(hero).expect("hero").y > 3.0);
    }

    #[test]
    fn flick_only_applies_to_flick_movement() {
        let mut world = World::new();
        let hero = hero_at(&mut world, 0.0, 0.0);
        assert!(!world.flick(hero, Vec2::new(1.0, 0.0)));
        world.set_movement(hero, Movement::Flick { multiplier: 3.0 });
        assert!(world.flick(hero, Vec2::new(1.0, -1.0)));
        assert_eq!(
            world.actor(hero).expect("hero").body.velocity(),
            Vec2::new(3.0, -3.0)
        );
    }

    #[test]
    fn throw_before_configure_is_a_no_op() {
        let mut world = World::new();
        let hero = hero_at(&mut world, 0.0, 0.0);
        assert_eq!(world.throw_projectile(hero, 0.0, 0.0, 1.0, 0.0), None);
        assert_eq!(world.throw_projectile_at(hero, 0.0, 0.0, 4.0, 0.0), None);
    }

    #[test]
    fn pool_never_exceeds_capacity() {
        let mut world = World::new();
        let hero = hero_at(&mut world, 0.0, 0.0);
        world.configure_projectiles(3, 0.2, 0.2, "bullet", 1, 0, true);
        world
            .projectile_pool_mut()
            .expect("pool")
            .set_remaining(Some(3));

        let thrown = (0..5)
            .filter_map(|_| world.throw_projectile(hero, 0.0, 0.0, 5.0, 0.0))
            .count();
        assert_eq!(thrown, 3);
        assert_eq!(world.count_enabled(RoleKind::Projectile), 3);
        assert_eq!(world.projectile_pool().expect("pool").remaining(), Some(0));
    }

    #[test]
    fn projectile_range_returns_slot_without_contact() {
        let mut world = World::new();
        let hero = hero_at(&mut world, 0.0, 0.0);
        world.configure_projectiles(1, 0.2, 0.2, "bullet", 1, 0, true);
        world.projectile_pool_mut().expect("pool").config.range = 1.0;

        let projectile = world
            .throw_projectile(hero, 5.0, 0.0, 4.0, 0.0)
            .expect("thrown");
        world.step(0.125, Vec2::ZERO);
        assert!(world.is_enabled(projectile));
        world.step(0.25, Vec2::ZERO);
        assert!(!world.is_enabled(projectile));
        assert_eq!(world.projectile_pool().expect("pool").in_flight(), 0);

        world.apply_pending();
        assert!(world.actor(projectile).is_some());
    }

    #[test]
    fn aimed_throw_uses_fixed_speed() {
        let mut world = World::new();
        let hero = hero_at(&mut world, -0.5, -0.5);
        world.configure_projectiles(2, 0.2, 0.2, "bullet", 1, 0, true);
        world.projectile_pool_mut().expect("pool").config.fixed_speed = Some(10.0);
        let projectile = world
            .throw_projectile_at(hero, 0.0, 0.0, 0.0, 3.0)
            .expect("thrown");
        assert_eq!(
            world.actor(projectile).expect("projectile").body.velocity(),
            Vec2::new(0.0, 10.0)
        );
    }

    #[test]
    fn pick_prefers_higher_z_then_later_spawn() {
        let mut world = World::new();
        let low = wall_at(&mut world, 0.0, 0.0);
        let high = wall_at(&mut world, 0.0, 0.0);
        let top = wall_at(&mut world, 0.0, 0.0);
        world.actor_mut(low).expect("low").set_z(2);
        world.actor_mut(top).expect("top").appearance.visible = false;

        assert_eq!(world.pick_topmost_at(Vec2::new(0.5, 0.5), false), Some(low));
        world.actor_mut(low).expect("low").set_z(0);
        assert_eq!(world.pick_topmost_at(Vec2::new(0.5, 0.5), false), Some(high));
        assert_eq!(world.pick_topmost_at(Vec2::new(0.5, 0.5), true), None);
    }

    #[test]
    fn camera_chases_enabled_target() {
        let mut world = World::new();
        let hero = hero_at(&mut world, 19.5, 2.5);
        world.camera_mut().set_chase(Some(hero));
        world.follow_camera();
        assert_eq!(world.camera().position, Vec2::new(20.0, 3.0));
    }

    #[test]
    fn manual_velocity_pins_one_axis_and_leaves_the_other_to_gravity() {
        let mut world = World::new();
        world.reset_gravity(0.0, 10.0);
        let hero = hero_at(&mut world, 0.0, 0.0);
        assert!(world.update_x_velocity(hero, Some(3.0)));

        world.step(0.5, Vec2::ZERO);
        assert_eq!(world.actor(hero).expect("hero").body.velocity(), Vec2::new(3.0, 5.0));
        world.step(0.5, Vec2::ZERO);
        assert_eq!(world.actor(hero).expect("hero").body.velocity(), Vec2::new(3.0, 10.0));

        assert!(world.update_y_velocity(hero, Some(-1.0)));
        world.step(0.5, Vec2::ZERO);
        assert_eq!(world.actor(hero).expect("hero").body.velocity(), Vec2::new(3.0, 4.0));
        assert!(!world.update_x_velocity(ActorId(99), Some(1.0)));
    }

    #[test]
    fn manual_velocity_moves_static_bodies_kinematically() {
        let mut world = World::new();
        let wall = wall_at(&mut world, 0.0, 0.0);
        world.update_x_velocity(wall, Some(2.0));
        world.update_y_velocity(wall, Some(-4.0));

        world.step(0.25, Vec2::ZERO);

        let body = &world.actor(wall).expect("wall").body;
        assert_eq!(body.kind(), BodyKind::Kinematic);
        assert_eq!(body.position(), Vec2::new(1.0, -0.5));
    }

    #[test]
    fn set_role_swaps_the_role_accessors() {
        let mut world = World::new();
        let id = hero_at(&mut world, 0.0, 0.0);
        assert!(world.set_role(id, Role::Enemy(Enemy::default())));
        assert_eq!(world.role_kind(id), Some(RoleKind::Enemy));
        assert!(world.hero(id).is_none());
        assert_eq!(world.enemy(id).expect("enemy").damage, DEFAULT_ENEMY_DAMAGE);
        assert!(!world.set_role(ActorId(99), Role::Obstacle(Obstacle::default())));
    }

    #[test]
    fn taken_extra_is_gone() {
        let mut world = World::new();
        let id = hero_at(&mut world, 0.0, 0.0);
        world.set_extra(id, Extra::Text("key".into()));
        assert_eq!(world.take_extra(id), Some(Extra::Text("key".into())));
        assert!(world.extra(id).is_none());
        assert_eq!(world.take_extra(id), None);
    }

    #[test]
    fn tilt_multiplier_scales_before_clamping() {
        let mut world = World::new();
        world.enable_tilt(2.0, 2.0);
        world.set_tilt_as_velocity(true);
        world.set_tilt_multiplier(0.5);
        let hero = hero_at(&mut world, 0.0, 0.0);
        world.set_movement(hero, Movement::Tilt);
        world.step(0.5, Vec2::new(2.0, -10.0));
        let velocity = world.actor(hero).expect("hero").body.velocity();
        assert_eq!(velocity, Vec2::new(1.0, -2.0));
    }

    #[test]
    fn pictures_share_spawn_order_with_actors() {
        let mut world = World::new();
        let before = hero_at(&mut world, 0.0, 0.0);
        let picture = world.add_picture(0.0, 0.0, 16.0, 9.0, "noise.png", -1);
        let after = hero_at(&mut world, 0.0, 0.0);

        let order = world.scenery().pictures()[picture.0 as usize].spawn_order();
        assert!(world.actor(before).expect("before").spawn_order() < order);
        assert!(order < world.actor(after).expect("after").spawn_order());
        assert_eq!(world.actor_count(), 2);
        assert_eq!(world.pick_topmost_at(Vec2::new(8.0, 4.5), false), None);
    }

    #[test]
    fn step_drifts_auto_layers() {
        let mut world = World::new();
        world
            .scenery_mut()
            .foreground
            .push(ParallaxLayer::vertical(0.0, 0.0, 4.0, 8.0, "rain.png").auto_velocity(2.0));
        world.step(0.5, Vec2::ZERO);
        assert_eq!(world.scenery().foreground[0].offset(Vec2::ZERO), 1.0);
    }
}
