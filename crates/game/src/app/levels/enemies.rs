use std::rc::Rc;

use arcade_engine::{
    ActorId, InputAction, KeyTrigger, Level, Movement, Route, ShapeKind, StageCommand,
};

use super::screens::{lose_message, welcome_message, win_message};
use super::{tilt_hero, with_enemy, with_hero};

const BEST_SURVIVAL_FACT: &str = "best_survival";

pub(super) fn avoid_the_enemy(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 1.0);
    tilt_hero(level, 2.0, 3.0);
    level.make_destination(ShapeKind::Circle, 15.0, 8.0, 0.75, 0.75, "mustardball.png");
    level.make_enemy(ShapeKind::Circle, 12.0, 5.0, 0.75, 0.75, "redball.png");
    level.score.set_victory_destination(1);

    welcome_message(level, "Avoid the enemy and reach the destination");
    lose_message(level, "Try Again");
    win_message(level, "Great Job");
}

pub(super) fn patrolling_enemies(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 1.0);
    tilt_hero(level, 2.0, 3.0);
    level.make_destination(ShapeKind::Circle, 15.0, 8.0, 0.75, 0.75, "mustardball.png");
    level.score.set_victory_destination(1);

    let sweeper = level.make_enemy(ShapeKind::Circle, 14.0, 8.0, 0.5, 0.5, "redball.png");
    let route = Route::new().to(14.0, 8.25).to(10.0, 0.25).to(14.0, 8.25);
    level.world.set_movement(sweeper, Movement::route(route, 4.0, true));

    let pacer = level.make_enemy(ShapeKind::Box, 6.0, 1.0, 0.5, 0.5, "redball.png");
    let route = Route::new().to(6.25, 1.25).to(6.25, 7.75);
    level.world.set_movement(pacer, Movement::route(route, 3.0, true));

    welcome_message(level, "Enemies follow fixed routes. Time your run");
    lose_message(level, "Try Again");
    win_message(level, "Great Job");
}

pub(super) fn hero_strength(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 1.0);
    let hero = tilt_hero(level, 1.0, 4.0);
    level.set_hero_strength(hero, 4);
    level.make_destination(ShapeKind::Circle, 15.0, 4.0, 0.75, 0.75, "mustardball.png");
    level.score.set_victory_destination(1);

    for (y, damage) in [(1.0, 1), (4.0, 3), (7.0, 2)] {
        let enemy = level.make_enemy(ShapeKind::Circle, 8.0, y, 0.75, 0.75, "redball.png");
        with_enemy(level, enemy, |enemy| enemy.damage = damage);
    }
    let shielded = level.make_enemy(ShapeKind::Box, 12.0, 2.0, 0.75, 0.75, "redball.png");
    with_enemy(level, shielded, |enemy| enemy.resist_invincibility = true);

    let star = level.make_goodie(ShapeKind::Circle, 4.0, 7.0, 0.5, 0.5, "blueball.png");
    if let Some(goodie) = level.world.goodie_mut(star) {
        goodie.on_collect = Some(Rc::new(|level: &mut Level, _: ActorId, hero: ActorId| {
            level.make_invincible(hero, 8.0);
        }));
    }

    level.hud.add_dynamic_text(0.02, 0.9, move |level| {
        let strength = level.world.hero(hero).map_or(0, |hero| hero.strength());
        format!("Strength {strength}")
    });

    welcome_message(level, "Enemies weaken the hero. The blue ball grants invincibility");
    lose_message(level, "Out of Strength");
    win_message(level, "Great Job");
}

pub(super) fn projectile_defense(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 1.0);
    let hero = tilt_hero(level, 2.0, 4.0);
    level.configure_projectiles(3, 0.25, 0.25, "greyball.png", 2, 0, true);
    if let Some(pool) = level.world.projectile_pool_mut() {
        pool.config.throw_sound = Some("fwapfwap.ogg".to_string());
        pool.config.disappear_sound = Some("slowdown.ogg".to_string());
    }

    let chaser = level.make_enemy(ShapeKind::Circle, 14.0, 4.0, 0.75, 0.75, "redball.png");
    level.world.set_movement(chaser, Movement::chase(hero, 1.5));
    let guard = level.make_enemy(ShapeKind::Circle, 14.0, 1.0, 0.75, 0.75, "redball.png");
    with_enemy(level, guard, |enemy| enemy.damage = 4);
    level.score.set_victory_enemy_count(None);

    level
        .hud
        .bind_key(InputAction::Throw, KeyTrigger::Pressed, move |level| {
            level.throw_projectile(hero, 0.5, 0.0, 10.0, 0.0);
            StageCommand::None
        });
    level.set_on_tap(guard, move |level, guard| {
        if let Some(target) = level.world.position(guard) {
            level.throw_projectile_at(hero, 0.0, 0.0, target.x, target.y);
        }
    });

    welcome_message(level, "Press F to throw, or tap an enemy to aim. Defeat every enemy");
    lose_message(level, "Try Again");
    win_message(level, "Great Job");
}

pub(super) fn survive(level: &mut Level) {
    level.enable_tilt(10.0, 10.0);
    level.world.set_tilt_as_velocity(true);
    level.draw_bounding_box(0.0, 0.0, 16.0, 9.0, "", 1.0, 0.3, 1.0);
    let hero = tilt_hero(level, 8.0, 4.0);
    with_hero(level, hero, |hero| hero.must_survive = true);
    level.score.set_victory_survive(20.0);

    for (x, y, speed) in [(1.0, 1.0, 1.0), (14.0, 7.0, 1.5), (14.0, 1.0, 0.75)] {
        let enemy = level.make_enemy(ShapeKind::Circle, x, y, 0.75, 0.75, "redball.png");
        level.world.set_movement(enemy, Movement::chase(hero, speed));
    }

    level.add_timer(1.0, true, record_survival_second);

    level.hud.add_dynamic_text(0.02, 0.9, |level| {
        format!("{:.0}s left", level.score.survive_remaining().unwrap_or(0.0))
    });
    level.hud.add_dynamic_text(0.02, 0.8, |level| {
        format!("Best {}s", level.score.game_fact(BEST_SURVIVAL_FACT, "0"))
    });

    welcome_message(level, "Stay alive for 20 seconds");
    lose_message(level, "Caught");
    win_message(level, "You Survived");
}

fn record_survival_second(level: &mut Level) {
    let seconds = parse_count(level.score.level_fact("seconds", "0")) + 1;
    level.score.set_level_fact("seconds", &seconds.to_string());
    if seconds > parse_count(level.score.game_fact(BEST_SURVIVAL_FACT, "0")) {
        level
            .score
            .set_game_fact(BEST_SURVIVAL_FACT, &seconds.to_string());
    }
}

pub(super) fn parse_count(value: &str) -> u32 {
    value.parse().unwrap_or(0)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survival_seconds_raise_the_best_record() {
        let mut level = Level::standalone(15);
        for _ in 0..3 {
            record_survival_second(&mut level);
        }
        assert_eq!(level.score.level_fact("seconds", "0"), "3");
        assert_eq!(level.score.game_fact(BEST_SURVIVAL_FACT, "0"), "3");
    }

    #[test]
    fn survival_seconds_keep_a_better_record() {
        let mut level = Level::standalone(15);
        level.score.set_game_fact(BEST_SURVIVAL_FACT, "12");
        record_survival_second(&mut level);
        assert_eq!(level.score.game_fact(BEST_SURVIVAL_FACT, "0"), "12");
    }

    #[test]
    fn unparsable_counts_read_as_zero() {
        assert_eq!(parse_count("not a number"), 0);
        assert_eq!(parse_count("41"), 41);
    }
}
