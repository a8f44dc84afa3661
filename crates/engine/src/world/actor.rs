use super::body::RigidBody;
use super::movement::Movement;
use super::role::{ActorCallback, Role};

pub const Z_MIN: i8 = -2;
pub const Z_MAX: i8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub image: String,
    pub width: f32,
    pub height: f32,
    pub visible: bool,
}

impl Appearance {
    pub fn new(image: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            image: image.into(),
            width,
            height,
            visible: true,
        }
    }
}

/// Level-script bookkeeping attached to an actor.
#[derive(Debug, Clone, PartialEq)]
pub enum Extra {
    Int(i64),
    Float(f64),
    Text(String),
    Flag(bool),
}

impl Extra {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Extra::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Extra::Float(value) => Some(*value),
            Extra::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Extra::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Extra::Flag(value) => Some(*value),
            _ => None,
        }
    }
}

pub struct Actor {
    pub(crate) id: ActorId,
    pub body: RigidBody,
    pub role: Role,
    pub movement: Movement,
    pub appearance: Appearance,
    pub on_tap: Option<ActorCallback>,
    pub(crate) z: i8,
    pub(crate) enabled: bool,
    pub(crate) spawn_order: u64,
}

impl Actor {
    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn z(&self) -> i8 {
        self.z
    }

    pub fn set_z(&mut self, z: i32) {
        self.z = clamp_z(z);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn spawn_order(&self) -> u64 {
        self.spawn_order
    }
}

impl std::fmt::Debug for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("position", &self.body.position())
            .field("z", &self.z)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

pub(crate) fn clamp_z(z: i32) -> i8 {
    z.clamp(i32::from(Z_MIN), i32::from(Z_MAX)) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_is_clamped_to_five_planes() {
        assert_eq!(clamp_z(-7), -2);
        assert_eq!(clamp_z(1), 1);
        assert_eq!(clamp_z(99), 2);
    }

    #[test]
    fn extra_accessors_match_variant() {
        assert_eq!(Extra::Int(3).as_int(), Some(3));
        assert_eq!(Extra::Int(3).as_float(), Some(3.0));
        assert_eq!(Extra::Text("a".into()).as_text(), Some("a"));
        assert_eq!(Extra::Flag(true).as_int(), None);
        assert_eq!(Extra::Flag(true).as_flag(), Some(true));
    }
}
