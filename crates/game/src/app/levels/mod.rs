mod enemies;
mod platform;
mod screens;
mod tilt;

use arcade_engine::world::{Destination, Enemy, Hero, Obstacle, RigidBody};
use arcade_engine::{ActorId, Level, LevelBuilder, Movement, ShapeKind, Vec2};
use tracing::{debug, warn};

type LevelScript = fn(&mut Level);

const LEVELS: &[(&str, LevelScript)] = &[
    ("reach_destination", tilt::reach_destination),
    ("bounded_world", tilt::bounded_world),
    ("two_destinations", tilt::two_destinations),
    ("shared_destination", tilt::shared_destination),
    ("avoid_the_enemy", enemies::avoid_the_enemy),
    ("patrolling_enemies", enemies::patrolling_enemies),
    ("goodie_hunt", tilt::goodie_hunt),
    ("pads_and_boosts", tilt::pads_and_boosts),
    ("hero_strength", enemies::hero_strength),
    ("gated_destination", tilt::gated_destination),
    ("projectile_defense", enemies::projectile_defense),
    ("jump_and_stomp", platform::jump_and_stomp),
    ("flick_to_goal", platform::flick_to_goal),
    ("chained_crossings", platform::chained_crossings),
    ("survive", enemies::survive),
];

/// The demo game: a fixed sequence of level scripts sharing one camera view.
pub(crate) struct DemoLevels {
    view: Vec2,
}

impl DemoLevels {
    pub(crate) fn new(view_width: f32, aspect: f32) -> Self {
        Self {
            view: Vec2::new(view_width, view_width * aspect),
        }
    }
}

impl LevelBuilder for DemoLevels {
    fn build(&self, index: u32, level: &mut Level) {
        let camera = level.world.camera_mut();
        camera.set_view_size(self.view.x, self.view.y);
        camera.center_on(self.view * 0.5);

        let slot = (index as usize).saturating_sub(1);
        let Some((name, script)) = LEVELS.get(slot) else {
            warn!(index, "level_script_missing");
            return;
        };
        debug!(index, level = name, "level_script_running");
        script(level);
    }

    fn level_count(&self) -> u32 {
        LEVELS.len() as u32
    }
}

/// Tilt-driven hero with a top-left corner at `(x, y)`.
fn tilt_hero(level: &mut Level, x: f32, y: f32) -> ActorId {
    let hero = level.make_hero(ShapeKind::Circle, x, y, 0.75, 0.75, "greenball.png");
    with_body(level, hero, |body| body.set_physics(5.0, 0.0, 0.6));
    level.world.set_movement(hero, Movement::Tilt);
    hero
}

fn with_body(level: &mut Level, id: ActorId, edit: impl FnOnce(&mut RigidBody)) {
    if let Some(body) = level.world.body_mut(id) {
        edit(body);
    }
}

fn with_hero(level: &mut Level, id: ActorId, edit: impl FnOnce(&mut Hero)) {
    if let Some(hero) = level.world.hero_mut(id) {
        edit(hero);
    }
}

fn with_enemy(level: &mut Level, id: ActorId, edit: impl FnOnce(&mut Enemy)) {
    if let Some(enemy) = level.world.enemy_mut(id) {
        edit(enemy);
    }
}

fn with_obstacle(level: &mut Level, id: ActorId, edit: impl FnOnce(&mut Obstacle)) {
    if let Some(obstacle) = level.world.obstacle_mut(id) {
        edit(obstacle);
    }
}

fn with_destination(level: &mut Level, id: ActorId, edit: impl FnOnce(&mut Destination)) {
    if let Some(destination) = level.world.destination_mut(id) {
        edit(destination);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use arcade_engine::{
        FactStore, InputSnapshot, LogSpeaker, RoleKind, Stage, StageState, Vec2,
    };

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn stage_at(index: u32) -> Stage {
        Stage::new(
            DemoLevels::new(16.0, 9.0 / 16.0),
            FactStore::in_memory(),
            Rc::new(LogSpeaker),
            index,
        )
    }

    #[test]
    fn level_count_matches_script_table() {
        let levels = DemoLevels::new(16.0, 0.5625);
        assert_eq!(levels.level_count(), LEVELS.len() as u32);
    }

    #[test]
    fn every_level_builds_with_a_hero_and_a_victory_rule() {
        for index in 1..=LEVELS.len() as u32 {
            let stage = stage_at(index);
            let level = stage.level();

            assert_eq!(level.index(), index, "level {index}");
            assert!(
                level.world.count_enabled(RoleKind::Hero) >= 1,
                "level {index} has no hero"
            );
            assert!(level.score.victory().is_some(), "level {index} has no victory rule");
            assert_eq!(level.world.camera().view_size(), Vec2::new(16.0, 9.0));
        }
    }

    #[test]
    fn every_level_survives_two_seconds_of_play() {
        let input = InputSnapshot::empty().with_tilt(Vec2::new(5.0, 2.0));
        for index in 1..=LEVELS.len() as u32 {
            let mut stage = stage_at(index);
            if stage.state() == StageState::Welcome {
                stage.dismiss_overlay();
            }
            assert_eq!(stage.state(), StageState::Playing, "level {index}");

            for _ in 0..120 {
                stage.update(DT, &input);
            }
            assert_ne!(stage.state(), StageState::Building, "level {index}");
        }
    }

    #[test]
    fn out_of_range_index_clamps_to_last_level() {
        let stage = stage_at(99);
        assert_eq!(stage.level_index(), LEVELS.len() as u32);
    }

    #[test]
    fn welcome_screens_wait_for_dismissal() {
        let mut stage = stage_at(2);
        assert_eq!(stage.state(), StageState::Welcome);

        stage.update(DT, &InputSnapshot::empty());
        assert_eq!(stage.state(), StageState::Welcome);

        stage.update(
            DT,
            &InputSnapshot::empty().with_action_pressed(arcade_engine::InputAction::Jump),
        );
        assert_eq!(stage.state(), StageState::Playing);
    }
}
