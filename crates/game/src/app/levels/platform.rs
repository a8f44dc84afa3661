//! Side-view levels with gravity, plus the flick and crossing puzzles.

use std::rc::Rc;

use arcade_engine::world::{ParallaxLayer, Side};
use arcade_engine::{
    ActorId, InputAction, KeyTrigger, Level, Movement, ShapeKind, StageCommand, Vec2,
};

use super::enemies::parse_count;
use super::screens::{lose_message, welcome_message, win_message};
use super::{tilt_hero, with_body, with_enemy, with_hero, with_obstacle};

const CROSSINGS_FACT: &str = "crossings";

pub(super) fn jump_and_stomp(level: &mut Level) {
    level.reset_gravity(0.0, 10.0);
    level.enable_tilt(10.0, 0.0);
    level.set_camera_bounds(32.0, 9.0);
    level.draw_bounding_box(0.0, 0.0, 32.0, 9.0, "", 1.0, 0.0, 1.0);
    scrolling_backdrop(level);

    let hero = tilt_hero(level, 1.0, 7.0);
    with_hero(level, hero, |hero| {
        hero.jump_impulse = Vec2::new(0.0, -8.0);
        hero.multi_jump = false;
    });
    level.set_camera_chase(Some(hero));
    level
        .hud
        .bind_key(InputAction::Jump, KeyTrigger::Pressed, move |level| {
            level.world.jump(hero);
            StageCommand::None
        });

    for x in [8.0, 16.0] {
        let ledge = level.make_obstacle(ShapeKind::Box, x, 6.0, 3.0, 0.25, "greenball.png");
        with_obstacle(level, ledge, |obstacle| obstacle.one_sided = Some(Side::Top));
    }
    for x in [12.0, 22.0] {
        let walker = level.make_enemy(ShapeKind::Box, x, 8.25, 0.75, 0.75, "redball.png");
        with_enemy(level, walker, |enemy| enemy.defeat_by_jump = true);
    }

    level.make_destination(ShapeKind::Circle, 30.0, 7.5, 1.0, 1.0, "mustardball.png");
    level.score.set_victory_destination(1);

    welcome_message(level, "Space jumps. Land on enemies to defeat them");
    lose_message(level, "Try Again");
    win_message(level, "Great Job");
}

fn scrolling_backdrop(level: &mut Level) {
    level.set_background_color(0x17B4FF);
    level.add_background_layer(
        ParallaxLayer::horizontal(0.0, 0.0, 32.0, 9.0, "back.png").camera_speed(0.5),
    );
    level.add_background_layer(
        ParallaxLayer::horizontal(0.0, 1.0, 16.0, 2.8, "front.png").camera_speed(-0.5),
    );
    level.add_background_layer(
        ParallaxLayer::horizontal(0.0, 0.5, 12.0, 1.5, "clouds.png").auto_velocity(0.75),
    );
    level.add_foreground_layer(
        ParallaxLayer::horizontal(0.0, 8.5, 8.0, 0.5, "grass.png").camera_speed(0.2),
    );
    // noise sits under the actors so movement shows against it
    for x in [0.0, 16.0] {
        level.draw_picture(x, 0.0, 16.0, 9.0, "noise.png", -1);
    }
}

pub(super) fn flick_to_goal(level: &mut Level) {
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.5, 0.2);
    let hero = level.make_hero(ShapeKind::Circle, 2.0, 7.0, 0.75, 0.75, "greenball.png");
    with_body(level, hero, |body| body.set_physics(1.0, 0.5, 0.2));
    level
        .world
        .set_movement(hero, Movement::Flick { multiplier: 2.0 });

    let wall = level.make_obstacle(ShapeKind::Box, 8.0, 3.0, 0.5, 6.0, "purpleball.png");
    with_body(level, wall, |body| body.set_physics(1.0, 0.8, 0.0));
    level.make_destination(ShapeKind::Circle, 14.0, 7.0, 0.75, 0.75, "mustardball.png");
    level.score.set_victory_destination(1);
    level.score.set_lose_countdown(30.0);
    level.hud.add_dynamic_text(0.02, 0.9, |level| {
        format!("{:.0}s", level.score.lose_countdown().unwrap_or(0.0))
    });

    welcome_message(level, "Drag from the hero and release to flick it over the wall");
    lose_message(level, "Time Up");
    win_message(level, "Great Job");
}

pub(super) fn chained_crossings(level: &mut Level) {
    level.enable_tilt(5.0, 0.0);
    level.world.set_tilt_as_velocity(true);
    level.set_camera_bounds(64.0, 9.0);
    level.draw_bounding_box(0.0, 0.0, 64.0, 9.0, "", 1.0, 0.0, 1.0);

    let hero = tilt_hero(level, 2.0, 4.0);
    level.set_camera_chase(Some(hero));
    level.score.set_victory_destination(1);

    let first = level.make_obstacle(ShapeKind::Box, 14.0, 0.0, 1.0, 9.0, "purpleball.png");
    with_body(level, first, |body| body.set_sensor(true));
    with_obstacle(level, first, |obstacle| {
        obstacle.on_hero_collision = Some(Rc::new(first_crossing));
    });
    level
        .hud
        .add_dynamic_text(0.02, 0.9, |level| format!("{} Goodies", level.score.goodies(1)));

    welcome_message(level, "Each wall you cross reveals the next one");
    win_message(level, "Great Job");
}

fn crossing_wall(level: &mut Level, x: f32) -> ActorId {
    let wall = level.make_obstacle(ShapeKind::Box, x, 0.0, 1.0, 9.0, "purpleball.png");
    with_body(level, wall, |body| body.set_sensor(true));
    with_obstacle(level, wall, |obstacle| {
        obstacle.on_hero_collision = Some(Rc::new(later_crossing));
    });
    wall
}

fn first_crossing(level: &mut Level, wall: ActorId, _hero: ActorId) {
    level.remove_actor(wall);
    level.make_goodie(ShapeKind::Circle, 18.0, 4.0, 0.5, 0.5, "blueball.png");
    crossing_wall(level, 30.0);
}

fn later_crossing(level: &mut Level, wall: ActorId, _hero: ActorId) {
    let crossings = parse_count(level.score.level_fact(CROSSINGS_FACT, "0"));
    level.remove_actor(wall);
    match crossings {
        0 => {
            level.make_goodie(ShapeKind::Circle, 36.0, 4.0, 0.5, 0.5, "blueball.png");
            crossing_wall(level, 46.0);
        }
        1 => {
            level.make_goodie(ShapeKind::Circle, 50.0, 4.0, 0.5, 0.5, "blueball.png");
            crossing_wall(level, 58.0);
        }
        _ => {
            level.make_destination(ShapeKind::Circle, 62.0, 4.0, 0.75, 0.75, "mustardball.png");
            level.set_pause_builder(|overlay, _| {
                overlay.set_dim(true);
                overlay.add_text(0.5, 0.5, "The destination is now open");
                overlay.tap_anywhere(|_| StageCommand::DismissOverlay);
            });
        }
    }
    level
        .score
        .set_level_fact(CROSSINGS_FACT, &(crossings + 1).to_string());
}

#[cfg(test)]
mod tests {
    use arcade_engine::RoleKind;

    use super::*;

    #[test]
    fn crossings_reveal_goodies_then_destination() {
        let mut level = Level::standalone(14);
        let hero = tilt_hero(&mut level, 2.0, 4.0);
        let mut wall = crossing_wall(&mut level, 30.0);

        for expected_goodies in [1, 2] {
            later_crossing(&mut level, wall, hero);
            assert!(!level.world.is_enabled(wall));
            assert_eq!(level.world.count_enabled(RoleKind::Goodie), expected_goodies);
            wall = level
                .world
                .enabled_actors()
                .filter(|actor| actor.role.kind() == RoleKind::Obstacle)
                .map(|actor| actor.id())
                .last()
                .expect("next wall");
        }
        assert_eq!(level.world.count_enabled(RoleKind::Destination), 0);

        later_crossing(&mut level, wall, hero);
        assert_eq!(level.world.count_enabled(RoleKind::Destination), 1);
        assert_eq!(level.score.level_fact(CROSSINGS_FACT, "0"), "3");
        assert!(level.has_pause_builder());
    }

    #[test]
    fn jump_level_hero_has_an_upward_impulse() {
        let mut level = Level::standalone(12);
        jump_and_stomp(&mut level);
        let hero = level
            .world
            .enabled_actors()
            .find(|actor| actor.role.kind() == RoleKind::Hero)
            .map(|actor| actor.id())
            .expect("hero");

        assert!(level.world.hero(hero).expect("hero").jump_impulse.y < 0.0);
        assert_eq!(level.world.gravity(), Vec2::new(0.0, 10.0));
    }

    #[test]
    fn jump_level_paints_a_scrolling_backdrop() {
        let mut level = Level::standalone(12);
        jump_and_stomp(&mut level);
        let scenery = level.world.scenery();

        assert_eq!(scenery.background_color, Some([0x17, 0xB4, 0xFF]));
        assert_eq!(scenery.background.len(), 3);
        assert_eq!(scenery.foreground.len(), 1);
        assert!(scenery.pictures().iter().all(|picture| picture.z() == -1));
    }
}
