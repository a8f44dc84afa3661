use std::fmt;
use std::rc::Rc;

use crate::level::Level;

use super::actor::ActorId;
use super::geometry::Vec2;
use super::physics::Side;

pub const DEFAULT_HERO_STRENGTH: i32 = 1;
pub const DEFAULT_ENEMY_DAMAGE: i32 = 2;

/// Runs with the actor that owns the callback.
pub type ActorCallback = Rc<dyn Fn(&mut Level, ActorId)>;
/// Runs with the owning actor first and the counterpart second.
pub type CollisionCallback = Rc<dyn Fn(&mut Level, ActorId, ActorId)>;
pub type ArrivalGate = Rc<dyn Fn(&Level) -> bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Hero,
    Enemy,
    Obstacle,
    Destination,
    Goodie,
    Projectile,
}

impl RoleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleKind::Hero => "hero",
            RoleKind::Enemy => "enemy",
            RoleKind::Obstacle => "obstacle",
            RoleKind::Destination => "destination",
            RoleKind::Goodie => "goodie",
            RoleKind::Projectile => "projectile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBoost {
    pub delta: Vec2,
    /// Seconds; negative keeps the boost forever.
    pub duration: f32,
}

#[derive(Clone)]
pub struct Hero {
    pub(crate) strength: i32,
    pub invincible_remaining: f32,
    pub must_survive: bool,
    pub on_strength_change: Option<ActorCallback>,
    pub jump_impulse: Vec2,
    pub multi_jump: bool,
    pub(crate) in_air: bool,
    pub(crate) crawling: bool,
    pub(crate) defeated: bool,
    pub(crate) active_boost: Option<SpeedBoost>,
}

impl Default for Hero {
    fn default() -> Self {
        Self {
            strength: DEFAULT_HERO_STRENGTH,
            invincible_remaining: 0.0,
            must_survive: false,
            on_strength_change: None,
            jump_impulse: Vec2::ZERO,
            multi_jump: false,
            in_air: false,
            crawling: false,
            defeated: false,
            active_boost: None,
        }
    }
}

impl Hero {
    pub fn strength(&self) -> i32 {
        self.strength
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_remaining > 0.0
    }

    pub fn is_crawling(&self) -> bool {
        self.crawling
    }

    pub fn is_in_air(&self) -> bool {
        self.in_air
    }
}

#[derive(Clone)]
pub struct Enemy {
    pub damage: i32,
    pub defeat_by_jump: bool,
    pub defeat_by_crawl: bool,
    pub immune_to_invincibility: bool,
    pub resist_invincibility: bool,
    /// Touching a hero removes the enemy without any damage exchange.
    pub disappear_on_touch: bool,
    pub on_defeated: Option<ActorCallback>,
    /// Runs with the enemy and the hero it just defeated.
    pub on_defeat_hero: Option<CollisionCallback>,
    pub(crate) defeated: bool,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            damage: DEFAULT_ENEMY_DAMAGE,
            defeat_by_jump: false,
            defeat_by_crawl: false,
            immune_to_invincibility: false,
            resist_invincibility: false,
            disappear_on_touch: false,
            on_defeated: None,
            on_defeat_hero: None,
            defeated: false,
        }
    }
}

impl Enemy {
    pub fn is_defeated(&self) -> bool {
        self.defeated
    }
}

#[derive(Clone)]
pub struct Obstacle {
    pub on_hero_collision: Option<CollisionCallback>,
    pub on_enemy_collision: Option<CollisionCallback>,
    pub on_projectile_collision: Option<CollisionCallback>,
    /// Multiplies the velocity of a touching hero.
    pub pad: Option<f32>,
    pub speed_boost: Option<SpeedBoost>,
    pub one_sided: Option<Side>,
    /// Touching this obstacle lets a hero jump again.
    pub jump_reset: bool,
}

impl Default for Obstacle {
    fn default() -> Self {
        Self {
            on_hero_collision: None,
            on_enemy_collision: None,
            on_projectile_collision: None,
            pad: None,
            speed_boost: None,
            one_sided: None,
            jump_reset: true,
        }
    }
}

#[derive(Clone)]
pub struct Destination {
    pub capacity: u32,
    pub(crate) occupancy: u32,
    pub on_attempt_arrival: Option<ArrivalGate>,
    pub arrival_sound: Option<String>,
}

impl Default for Destination {
    fn default() -> Self {
        Self {
            capacity: 1,
            occupancy: 0,
            on_attempt_arrival: None,
            arrival_sound: None,
        }
    }
}

impl Destination {
    pub fn occupancy(&self) -> u32 {
        self.occupancy
    }

    pub fn has_room(&self) -> bool {
        self.occupancy < self.capacity.max(1)
    }
}

#[derive(Clone, Default)]
pub struct Goodie {
    pub score: [i32; 4],
    /// Runs with the goodie and the collecting hero, after the score is added.
    pub on_collect: Option<CollisionCallback>,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub strength: i32,
    pub disappear_on_collision: bool,
    pub range_remaining: f32,
    pub(crate) last_position: Vec2,
    pub(crate) slot: usize,
}

impl Projectile {
    pub fn slot(&self) -> usize {
        self.slot
    }
}

#[derive(Clone)]
pub enum Role {
    Hero(Hero),
    Enemy(Enemy),
    Obstacle(Obstacle),
    Destination(Destination),
    Goodie(Goodie),
    Projectile(Projectile),
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Hero(_) => RoleKind::Hero,
            Role::Enemy(_) => RoleKind::Enemy,
            Role::Obstacle(_) => RoleKind::Obstacle,
            Role::Destination(_) => RoleKind::Destination,
            Role::Goodie(_) => RoleKind::Goodie,
            Role::Projectile(_) => RoleKind::Projectile,
        }
    }

    pub(crate) fn one_sided(&self) -> Option<Side> {
        match self {
            Role::Obstacle(obstacle) => obstacle.one_sided,
            _ => None,
        }
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Hero(hero) => f
                .debug_struct("Hero")
                .field("strength", &hero.strength)
                .field("defeated", &hero.defeated)
                .finish_non_exhaustive(),
            Role::Enemy(enemy) => f
                .debug_struct("Enemy")
                .field("damage", &enemy.damage)
                .field("defeated", &enemy.defeated)
                .finish_non_exhaustive(),
            Role::Destination(destination) => f
                .debug_struct("Destination")
                .field("capacity", &destination.capacity)
                .field("occupancy", &destination.occupancy)
                .finish_non_exhaustive(),
            Role::Goodie(goodie) => f.debug_struct("Goodie").field("score", &goodie.score).finish(),
            Role::Projectile(projectile) => fmt::Debug::fmt(projectile, f),
            Role::Obstacle(obstacle) => f
                .debug_struct("Obstacle")
                .field("one_sided", &obstacle.one_sided)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_level_expectations() {
        let hero = Hero::default();
        assert_eq!(hero.strength(), 1);
        assert!(!hero.is_defeated());
        assert_eq!(Enemy::default().damage, 2);
        assert_eq!(Destination::default().capacity, 1);
        assert!(Obstacle::default().jump_reset);
    }

    #[test]
    fn destination_room_respects_capacity() {
        let mut destination = Destination {
            capacity: 2,
            ..Destination::default()
        };
        assert!(destination.has_room());
        destination.occupancy = 2;
        assert!(!destination.has_room());
    }

    #[test]
    fn only_obstacles_are_one_sided() {
        let obstacle = Role::Obstacle(Obstacle {
            one_sided: Some(Side::Top),
            ..Obstacle::default()
        });
        assert_eq!(obstacle.one_sided(), Some(Side::Top));
        assert_eq!(Role::Goodie(Goodie::default()).one_sided(), None);
        assert_eq!(obstacle.kind().as_str(), "obstacle");
    }
}
