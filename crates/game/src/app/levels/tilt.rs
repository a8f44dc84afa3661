//! Tilt-controlled levels: reach destinations, collect goodies, use pads.

use std::rc::Rc;

use arcade_engine::world::SpeedBoost;
use arcade_engine::{Level, ShapeKind, Vec2};

use super::screens::{lose_message, pause_button, welcome_message, win_message};
use super::{tilt_hero, with_body, with_destination, with_obstacle};

pub(super) fn reach_destination(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    tilt_hero(level, 2.0, 3.0);
    level.make_destination(ShapeKind::Circle, 15.0, 8.0, 0.75, 0.75, "mustardball.png");
    level.score.set_victory_destination(1);
    win_message(level, "Great Job");
}

pub(super) fn bounded_world(level: &mut Level) {
    reach_destination(level);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 0.9);
    welcome_message(level, "Reach the destination to win this level");
}

pub(super) fn two_destinations(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 0.9);
    tilt_hero(level, 4.0, 7.0);
    tilt_hero(level, 6.0, 7.0);
    level.make_destination(ShapeKind::Circle, 15.0, 1.0, 0.75, 0.75, "mustardball.png");
    level.make_destination(ShapeKind::Circle, 15.0, 7.0, 0.75, 0.75, "mustardball.png");
    level.score.set_victory_destination(2);
    welcome_message(
        level,
        "Each destination can hold one hero. Both heroes must arrive to win",
    );
    win_message(level, "Great Job");
}

pub(super) fn shared_destination(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 1.0);
    tilt_hero(level, 4.0, 7.0);
    tilt_hero(level, 6.0, 7.0);
    let destination =
        level.make_destination(ShapeKind::Circle, 15.0, 1.0, 0.75, 0.75, "mustardball.png");
    with_destination(level, destination, |destination| {
        destination.capacity = 2;
        destination.arrival_sound = Some("hipitch.ogg".to_string());
    });
    level.score.set_victory_destination(2);
    welcome_message(level, "All heroes must reach the destination");
    win_message(level, "Great Job");
}

pub(super) fn goodie_hunt(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    level.world.set_tilt_as_velocity(true);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 1.0);
    tilt_hero(level, 15.0, 8.0);
    for index in 0..5 {
        let offset = index as f32;
        let (x, y) = (offset + 1.0, offset + 2.0);
        level.make_goodie(ShapeKind::Circle, x, y, 0.25, 0.25, "blueball.png");
    }
    level.score.set_victory_goodies(5, 0, 0, 0);
    level.score.set_lose_countdown(15.0);

    level
        .hud
        .add_dynamic_text(0.02, 0.9, |level| format!("{}/5 Goodies", level.score.goodies(1)));
    level.hud.add_dynamic_text(0.02, 0.8, |level| {
        format!("{:.0}s", level.score.lose_countdown().unwrap_or(0.0))
    });
    pause_button(level);

    welcome_message(level, "Collect all blue balls to win. Press P to pause");
    lose_message(level, "Time Up");
    win_message(level, "Great Job");
}

pub(super) fn pads_and_boosts(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 1.0);
    tilt_hero(level, 3.0, 3.0);
    level.make_destination(ShapeKind::Circle, 15.0, 8.0, 0.75, 0.75, "mustardball.png");
    level.score.set_victory_destination(1);

    for (x, shape, factor) in [
        (5.0, ShapeKind::Circle, -10.0),
        (7.0, ShapeKind::Circle, 5.0),
        (9.0, ShapeKind::Box, 0.2),
    ] {
        let pad = level.make_obstacle(shape, x, 3.0, 0.75, 0.75, "purpleball.png");
        with_body(level, pad, |body| body.set_sensor(true));
        with_obstacle(level, pad, |obstacle| obstacle.pad = Some(factor));
    }

    for (x, boost) in [
        (5.0, Vec2::new(5.0, 0.0)),
        (8.0, Vec2::new(-2.0, 0.0)),
        (11.0, Vec2::new(3.0, 0.0)),
    ] {
        let strip = level.make_obstacle(ShapeKind::Box, x, 6.0, 1.0, 0.25, "purpleball.png");
        with_body(level, strip, |body| body.set_sensor(true));
        with_obstacle(level, strip, |obstacle| {
            obstacle.speed_boost = Some(SpeedBoost {
                delta: boost,
                duration: 2.0,
            });
        });
    }

    welcome_message(level, "Pads bounce, speed up or slow down the hero");
    win_message(level, "Great Job");
}

pub(super) fn gated_destination(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 1.0);
    tilt_hero(level, 2.0, 4.0);
    for (x, y) in [(5.0, 2.0), (8.0, 6.0), (11.0, 2.0)] {
        level.make_goodie(ShapeKind::Circle, x, y, 0.5, 0.5, "blueball.png");
    }
    let destination =
        level.make_destination(ShapeKind::Circle, 14.0, 4.0, 0.75, 0.75, "mustardball.png");
    with_destination(level, destination, |destination| {
        destination.on_attempt_arrival =
            Some(Rc::new(|level: &Level| level.score.goodies(1) >= 3));
    });
    level.score.set_victory_destination(1);
    level
        .hud
        .add_dynamic_text(0.02, 0.9, |level| format!("{}/3 Goodies", level.score.goodies(1)));

    welcome_message(level, "The destination opens once all three goodies are collected");
    win_message(level, "Great Job");
}
