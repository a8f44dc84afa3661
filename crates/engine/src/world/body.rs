use super::geometry::{Aabb, Shape, Vec2};

const MIN_MASS: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves; ignores velocity, forces and gravity.
    Static,
    /// Moves by velocity only; unaffected by gravity or contacts.
    Kinematic,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub density: f32,
    pub elasticity: f32,
    pub friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            elasticity: 0.0,
            friction: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RigidBody {
    shape: Shape,
    kind: BodyKind,
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    angular_velocity: f32,
    rotation_fixed: bool,
    sensor: bool,
    material: Material,
    gravity_scale: f32,
    pending_force: Vec2,
    pending_impulse: Vec2,
    pass_through_group: Option<u32>,
}

impl RigidBody {
    pub fn new(shape: Shape, kind: BodyKind, position: Vec2) -> Self {
        Self {
            shape,
            kind,
            position,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            rotation_fixed: false,
            sensor: false,
            material: Material::default(),
            gravity_scale: 1.0,
            pending_force: Vec2::ZERO,
            pending_impulse: Vec2::ZERO,
            pass_through_group: None,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: BodyKind) {
        self.kind = kind;
        if kind == BodyKind::Static {
            self.velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        if self.kind != BodyKind::Static {
            self.velocity = velocity;
        }
    }

    pub fn add_velocity(&mut self, delta: Vec2) {
        self.set_velocity(self.velocity + delta);
    }

    /// Sets velocity and drops any force or impulse queued for this step.
    pub fn set_absolute_velocity(&mut self, velocity: Vec2) {
        self.pending_force = Vec2::ZERO;
        self.pending_impulse = Vec2::ZERO;
        self.set_velocity(velocity);
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.pending_force += force;
    }

    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.pending_impulse += impulse;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = radians;
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, radians_per_second: f32) {
        if self.kind != BodyKind::Static {
            self.angular_velocity = radians_per_second;
        }
    }

    pub fn set_rotation_fixed(&mut self, fixed: bool) {
        self.rotation_fixed = fixed;
        if fixed {
            self.angular_velocity = 0.0;
        }
    }

    pub fn is_rotation_fixed(&self) -> bool {
        self.rotation_fixed
    }

    pub fn set_sensor(&mut self, sensor: bool) {
        self.sensor = sensor;
    }

    pub fn is_sensor(&self) -> bool {
        self.sensor
    }

    pub fn set_physics(&mut self, density: f32, elasticity: f32, friction: f32) {
        self.material = Material {
            density: density.max(0.0),
            elasticity: elasticity.clamp(0.0, 1.0),
            friction: friction.max(0.0),
        };
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    pub fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    /// Bodies sharing a group never collide with each other.
    pub fn set_pass_through_group(&mut self, group: Option<u32>) {
        self.pass_through_group = group;
    }

    pub fn pass_through_group(&self) -> Option<u32> {
        self.pass_through_group
    }

    pub fn mass(&self) -> f32 {
        (self.material.density * self.shape.area()).max(MIN_MASS)
    }

    pub fn inverse_mass(&self) -> f32 {
        match self.kind {
            BodyKind::Dynamic => 1.0 / self.mass(),
            BodyKind::Static | BodyKind::Kinematic => 0.0,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.shape.half_extents())
    }

    pub(crate) fn integrate(&mut self, gravity: Vec2, dt: f32) {
        match self.kind {
            BodyKind::Static => {}
            BodyKind::Kinematic => {
                self.position += self.velocity * dt;
            }
            BodyKind::Dynamic => {
                let inverse_mass = self.inverse_mass();
                let acceleration = gravity * self.gravity_scale + self.pending_force * inverse_mass;
                self.velocity += acceleration * dt + self.pending_impulse * inverse_mass;
                self.position += self.velocity * dt;
            }
        }
        if !self.rotation_fixed && self.kind != BodyKind::Static {
            self.rotation += self.angular_velocity * dt;
        }
        self.pending_force = Vec2::ZERO;
        self.pending_impulse = Vec2::ZERO;
    }

    /// Moves by a positional correction; only the solver calls this.
    pub(crate) fn nudge(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub(crate) fn set_velocity_unchecked(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }
}
