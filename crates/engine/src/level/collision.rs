use tracing::debug;

use super::Level;
use crate::score::Outcome;
use crate::world::{ActorId, Contact, ContactPhase, Role, RoleKind, Vec2};

/// Dispatch order within a pair: the lower rank acts on the higher.
fn rank(kind: RoleKind) -> u8 {
    match kind {
        RoleKind::Hero => 0,
        RoleKind::Projectile => 1,
        RoleKind::Enemy => 2,
        RoleKind::Obstacle => 3,
        RoleKind::Destination => 4,
        RoleKind::Goodie => 5,
    }
}

struct Side {
    id: ActorId,
    kind: RoleKind,
    /// Velocity before the solver responded to this contact.
    velocity: Vec2,
}

/// Turns solver contacts into role side effects, in report order.
pub(crate) fn dispatch(level: &mut Level, contacts: &[Contact]) {
    for contact in contacts {
        if level.score.outcome() != Outcome::Playing {
            break;
        }
        let Some((first, second)) = ordered_pair(level, contact) else {
            continue;
        };
        if contact.phase == ContactPhase::Persist
            && !(first.kind == RoleKind::Hero && second.kind == RoleKind::Destination)
        {
            continue;
        }

        match (first.kind, second.kind) {
            (RoleKind::Hero, RoleKind::Enemy) => hero_meets_enemy(level, &first, second.id),
            (RoleKind::Hero, RoleKind::Obstacle) => hero_meets_obstacle(level, first.id, second.id),
            (RoleKind::Hero, RoleKind::Destination) => {
                hero_meets_destination(level, first.id, second.id)
            }
            (RoleKind::Hero, RoleKind::Goodie) => hero_meets_goodie(level, first.id, second.id),
            (RoleKind::Projectile, RoleKind::Enemy) => {
                projectile_meets_enemy(level, first.id, second.id)
            }
            (RoleKind::Projectile, RoleKind::Obstacle) => {
                projectile_meets_obstacle(level, first.id, second.id)
            }
            (RoleKind::Projectile, RoleKind::Projectile) => {
                projectile_meets_projectile(level, first.id, second.id)
            }
            (RoleKind::Enemy, RoleKind::Obstacle) => enemy_meets_obstacle(level, first.id, second.id),
            _ => {}
        }
    }
}

fn ordered_pair(level: &Level, contact: &Contact) -> Option<(Side, Side)> {
    if !level.world.is_enabled(contact.a) || !level.world.is_enabled(contact.b) {
        return None;
    }
    let a = Side {
        id: contact.a,
        kind: level.world.role_kind(contact.a)?,
        velocity: contact.velocity_a,
    };
    let b = Side {
        id: contact.b,
        kind: level.world.role_kind(contact.b)?,
        velocity: contact.velocity_b,
    };
    if rank(a.kind) <= rank(b.kind) {
        Some((a, b))
    } else {
        Some((b, a))
    }
}

fn hero_meets_enemy(level: &mut Level, hero: &Side, enemy: ActorId) {
    let Some(state) = level.world.hero(hero.id) else {
        return;
    };
    if state.defeated {
        return;
    }
    let crawling = state.crawling;
    let invincible = state.is_invincible();
    let Some(foe) = level.world.enemy(enemy).filter(|foe| !foe.defeated).cloned() else {
        return;
    };

    if (foe.defeat_by_crawl && crawling) || (foe.defeat_by_jump && hero.velocity.y > 0.0) {
        defeat_enemy(level, enemy);
        return;
    }
    if invincible && !foe.immune_to_invincibility {
        if !foe.resist_invincibility {
            defeat_enemy(level, enemy);
        }
        return;
    }
    if foe.disappear_on_touch {
        defeat_enemy(level, enemy);
        return;
    }

    let remaining = {
        let Some(state) = level.world.hero_mut(hero.id) else {
            return;
        };
        state.strength = (state.strength - foe.damage).max(0);
        state.strength
    };
    if remaining <= 0 {
        defeat_hero(level, hero.id, enemy);
    } else {
        level.notify_strength_change(hero.id);
        defeat_enemy(level, enemy);
    }
}

fn defeat_hero(level: &mut Level, hero: ActorId, enemy: ActorId) {
    let must_survive = {
        let Some(state) = level.world.hero_mut(hero) else {
            return;
        };
        if state.defeated {
            return;
        }
        state.defeated = true;
        state.must_survive
    };
    level.world.remove_actor(hero);
    level.score.note_hero_defeated(must_survive);
    debug!(hero = hero.0, enemy = enemy.0, must_survive, "hero_defeated");

    let callback = level
        .world
        .enemy(enemy)
        .and_then(|foe| foe.on_defeat_hero.clone());
    if let Some(callback) = callback {
        callback(level, enemy, hero);
    }
    level.score.evaluate();
}

/// Marks the enemy defeated once, removes it and runs its defeat callback.
pub(crate) fn defeat_enemy(level: &mut Level, enemy: ActorId) {
    let callback = {
        let Some(foe) = level.world.enemy_mut(enemy) else {
            return;
        };
        if foe.defeated {
            return;
        }
        foe.defeated = true;
        foe.on_defeated.clone()
    };
    level.world.remove_actor(enemy);
    level.score.note_enemy_defeated();
    debug!(enemy = enemy.0, "enemy_defeated");
    if let Some(callback) = callback {
        callback(level, enemy);
    }
    level.score.evaluate();
}

fn hero_meets_obstacle(level: &mut Level, hero: ActorId, obstacle: ActorId) {
    let Some(block) = level.world.obstacle(obstacle).cloned() else {
        return;
    };
    if let Some(callback) = block.on_hero_collision {
        callback(level, obstacle, hero);
        return;
    }

    let Some(actor) = level.world.actor_mut(hero) else {
        return;
    };
    let Role::Hero(state) = &mut actor.role else {
        return;
    };
    if block.jump_reset {
        state.in_air = false;
    }
    if let Some(factor) = block.pad {
        let velocity = actor.body.velocity();
        actor.body.set_velocity(velocity * factor);
    }
    if let Some(boost) = block.speed_boost {
        if state.active_boost.is_none() {
            actor.body.add_velocity(boost.delta);
            state.active_boost = Some(boost);
        }
    }
}

fn enemy_meets_obstacle(level: &mut Level, enemy: ActorId, obstacle: ActorId) {
    let callback = level
        .world
        .obstacle(obstacle)
        .and_then(|block| block.on_enemy_collision.clone());
    if let Some(callback) = callback {
        callback(level, obstacle, enemy);
    }
}

fn hero_meets_destination(level: &mut Level, hero: ActorId, destination: ActorId) {
    if level.world.hero(hero).map_or(true, |state| state.defeated) {
        return;
    }
    let Some(target) = level.world.destination(destination) else {
        return;
    };
    if !target.has_room() {
        return;
    }
    let gate = target.on_attempt_arrival.clone();
    let sound = target.arrival_sound.clone();
    if let Some(gate) = gate {
        if !gate(level) {
            return;
        }
    }

    if let Some(target) = level.world.destination_mut(destination) {
        target.occupancy += 1;
    }
    if let Some(sound) = sound {
        level.play_sound(&sound);
    }
    level.score.note_arrival();
    level.world.remove_actor(hero);
    debug!(hero = hero.0, destination = destination.0, "hero_arrived");
    level.score.evaluate();
}

fn hero_meets_goodie(level: &mut Level, hero: ActorId, goodie: ActorId) {
    let Some(prize) = level.world.goodie_mut(goodie) else {
        return;
    };
    let vector = prize.score;
    let callback = prize.on_collect.clone();

    level.score.add_goodie_vector(vector);
    level.world.remove_actor(goodie);
    debug!(hero = hero.0, goodie = goodie.0, "goodie_collected");
    if let Some(callback) = callback {
        callback(level, goodie, hero);
    }
    level.score.evaluate();
}

fn projectile_meets_enemy(level: &mut Level, projectile: ActorId, enemy: ActorId) {
    let Some(shot) = level.world.projectile(projectile) else {
        return;
    };
    let strength = shot.strength;
    let disappear = shot.disappear_on_collision;

    let defeated = match level.world.enemy_mut(enemy) {
        Some(foe) if !foe.defeated => {
            foe.damage -= strength;
            foe.damage <= 0
        }
        _ => return,
    };
    if defeated {
        defeat_enemy(level, enemy);
    }
    if disappear {
        level.retire_projectile(projectile);
    }
}

fn projectile_meets_obstacle(level: &mut Level, projectile: ActorId, obstacle: ActorId) {
    let callback = level
        .world
        .obstacle(obstacle)
        .and_then(|block| block.on_projectile_collision.clone());
    if let Some(callback) = callback {
        callback(level, obstacle, projectile);
        return;
    }
    if level
        .world
        .projectile(projectile)
        .is_some_and(|shot| shot.disappear_on_collision)
    {
        level.retire_projectile(projectile);
    }
}

fn projectile_meets_projectile(level: &mut Level, first: ActorId, second: ActorId) {
    let collisions_ok = level
        .world
        .projectile_pool()
        .is_some_and(|pool| pool.config.collisions_ok);
    if collisions_ok {
        return;
    }
    level.retire_projectile(first);
    level.retire_projectile(second);
}
