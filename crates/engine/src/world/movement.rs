use super::actor::ActorId;
use super::body::{BodyKind, RigidBody};
use super::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaseAxis {
    Both,
    XOnly,
    YOnly,
}

/// Ordered waypoints, built with `Route::new().to(x, y).to(x, y)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    points: Vec<Vec2>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, x: f32, y: f32) -> Self {
        self.points.push(Vec2::new(x, y));
        self
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteFollower {
    route: Route,
    speed: f32,
    looping: bool,
    next: usize,
}

impl RouteFollower {
    pub fn next_waypoint(&self) -> Option<Vec2> {
        self.route.points.get(self.next).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Movement {
    #[default]
    Inert,
    /// Axes left as `None` stay under physics control.
    Manual {
        x: Option<f32>,
        y: Option<f32>,
    },
    Tilt,
    Route(RouteFollower),
    Chase {
        target: ActorId,
        speed: f32,
        axis: ChaseAxis,
    },
    Flick {
        multiplier: f32,
    },
    /// Offset from the camera center, held until released.
    Hover {
        anchor: Vec2,
    },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MovementContext {
    pub(crate) tilt: Option<Vec2>,
    pub(crate) tilt_as_velocity: bool,
    pub(crate) camera_center: Vec2,
    pub(crate) chase_target: Option<Vec2>,
    pub(crate) dt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MovementStatus {
    Active,
    Finished,
}

impl Movement {
    pub fn route(route: Route, speed: f32, looping: bool) -> Self {
        Movement::Route(RouteFollower {
            route,
            speed: speed.abs(),
            looping,
            next: 0,
        })
    }

    pub fn chase(target: ActorId, speed: f32) -> Self {
        Movement::Chase {
            target,
            speed: speed.abs(),
            axis: ChaseAxis::Both,
        }
    }

    pub fn is_inert(&self) -> bool {
        matches!(self, Movement::Inert)
    }

    /// Body kind a static body must switch to before this movement can drive it.
    pub(crate) fn kind_for_static_body(&self) -> Option<BodyKind> {
        match self {
            Movement::Inert => None,
            Movement::Manual { .. }
            | Movement::Route(_)
            | Movement::Chase { .. }
            | Movement::Hover { .. } => Some(BodyKind::Kinematic),
            Movement::Tilt | Movement::Flick { .. } => Some(BodyKind::Dynamic),
        }
    }

    /// Called once when the movement is attached to a body.
    pub(crate) fn attach(&mut self, body: &mut RigidBody) {
        if let Movement::Route(follower) = self {
            if let Some(first) = follower.route.points.first() {
                body.set_position(*first);
                follower.next = 1;
            }
        }
    }

    pub(crate) fn chase_target(&self) -> Option<ActorId> {
        match self {
            Movement::Chase { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub(crate) fn apply(&mut self, body: &mut RigidBody, ctx: &MovementContext) -> MovementStatus {
        match self {
            Movement::Inert | Movement::Flick { .. } => {}
            Movement::Manual { x, y } => {
                let current = body.velocity();
                body.set_velocity(Vec2::new(x.unwrap_or(current.x), y.unwrap_or(current.y)));
            }
            Movement::Tilt => {
                if let Some(tilt) = ctx.tilt {
                    if ctx.tilt_as_velocity {
                        body.set_velocity(tilt);
                    } else {
                        let mass = body.mass();
                        body.apply_force(tilt * mass);
                    }
                }
            }
            Movement::Route(follower) => return advance_route(follower, body, ctx.dt),
            Movement::Chase { speed, axis, .. } => {
                let current = body.velocity();
                let desired = match ctx.chase_target {
                    Some(target) => chase_velocity(body.position(), target, *speed, *axis),
                    None => Vec2::ZERO,
                };
                let velocity = match axis {
                    ChaseAxis::Both => desired,
                    ChaseAxis::XOnly => Vec2::new(desired.x, current.y),
                    ChaseAxis::YOnly => Vec2::new(current.x, desired.y),
                };
                body.set_velocity(velocity);
            }
            Movement::Hover { anchor } => {
                body.set_position(ctx.camera_center + *anchor);
                body.set_velocity(Vec2::ZERO);
            }
        }
        MovementStatus::Active
    }
}

fn advance_route(follower: &mut RouteFollower, body: &mut RigidBody, dt: f32) -> MovementStatus {
    let count = follower.route.points.len();
    if count == 0 {
        body.set_velocity(Vec2::ZERO);
        return MovementStatus::Finished;
    }
    if follower.next >= count {
        if follower.looping {
            follower.next = 0;
        } else {
            body.set_velocity(Vec2::ZERO);
            return MovementStatus::Finished;
        }
    }

    let target = follower.route.points[follower.next];
    let offset = target - body.position();
    let distance = offset.length();
    if distance <= follower.speed * dt && dt > 0.0 {
        // Land exactly on the waypoint this step.
        body.set_velocity(offset * (1.0 / dt));
        follower.next += 1;
    } else {
        body.set_velocity(offset.normalized_or_zero() * follower.speed);
    }
    MovementStatus::Active
}

fn chase_velocity(position: Vec2, target: Vec2, speed: f32, axis: ChaseAxis) -> Vec2 {
    let offset = target - position;
    match axis {
        ChaseAxis::Both => offset.normalized_or_zero() * speed,
        ChaseAxis::XOnly => Vec2::new(axis_speed(offset.x, speed), 0.0),
        ChaseAxis::YOnly => Vec2::new(0.0, axis_speed(offset.y, speed)),
    }
}

fn axis_speed(offset: f32, speed: f32) -> f32 {
    if offset.abs() <= f32::EPSILON {
        0.0
    } else {
        offset.signum() * speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geometry::Shape;

    fn body(kind: BodyKind) -> RigidBody {
        RigidBody::new(Shape::Circle { radius: 0.5 }, kind, Vec2::ZERO)
    }

    fn ctx(dt: f32) -> MovementContext {
        MovementContext {
            tilt: None,
            tilt_as_velocity: false,
            camera_center: Vec2::ZERO,
            chase_target: None,
            dt,
        }
    }

    fn run_steps(movement: &mut Movement, body: &mut RigidBody, steps: usize) -> MovementStatus {
        let mut status = MovementStatus::Active;
        for _ in 0..steps {
            status = movement.apply(body, &ctx(0.5));
            body.integrate(Vec2::ZERO, 0.5);
        }
        status
    }

    #[test]
    fn one_shot_route_stops_at_last_waypoint() {
        let mut body = body(BodyKind::Kinematic);
        let mut movement = Movement::route(Route::new().to(0.0, 0.0).to(2.0, 0.0), 2.0, false);
        movement.attach(&mut body);

        assert_eq!(run_steps(&mut movement, &mut body, 2), MovementStatus::Active);
        assert_eq!(body.position(), Vec2::new(2.0, 0.0));
        assert_eq!(run_steps(&mut movement, &mut body, 1), MovementStatus::Finished);
        assert_eq!(body.velocity(), Vec2::ZERO);
    }

    #[test]
    fn looping_route_heads_back_to_start() {
        let mut body = body(BodyKind::Kinematic);
        let mut movement = Movement::route(Route::new().to(0.0, 0.0).to(1.0, 0.0), 2.0, true);
        movement.attach(&mut body);

        run_steps(&mut movement, &mut body, 1);
        assert_eq!(body.position(), Vec2::new(1.0, 0.0));
        let status = run_steps(&mut movement, &mut body, 1);
        assert_eq!(status, MovementStatus::Active);
        assert_eq!(body.position(), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn attach_places_body_on_first_waypoint() {
        let mut body = body(BodyKind::Kinematic);
        let mut movement = Movement::route(Route::new().to(3.0, 4.0).to(5.0, 4.0), 1.0, false);
        movement.attach(&mut body);
        assert_eq!(body.position(), Vec2::new(3.0, 4.0));
        if let Movement::Route(follower) = &movement {
            assert_eq!(follower.next_waypoint(), Some(Vec2::new(5.0, 4.0)));
        }
    }

    #[test]
    fn chase_on_one_axis_keeps_other_velocity() {
        let mut body = body(BodyKind::Dynamic);
        body.set_velocity(Vec2::new(0.0, 3.0));
        let mut movement = Movement::Chase {
            target: ActorId(9),
            speed: 2.0,
            axis: ChaseAxis::XOnly,
        };
        let mut context = ctx(0.5);
        context.chase_target = Some(Vec2::new(-4.0, 10.0));
        movement.apply(&mut body, &context);
        assert_eq!(body.velocity(), Vec2::new(-2.0, 3.0));
    }

    #[test]
    fn tilt_modes_write_force_or_velocity() {
        let mut context = ctx(0.5);
        context.tilt = Some(Vec2::new(4.0, 0.0));

        let mut forced = body(BodyKind::Dynamic);
        Movement::Tilt.apply(&mut forced, &context);
        forced.integrate(Vec2::ZERO, 0.5);
        assert!((forced.velocity().x - 2.0).abs() < 0.0001);

        context.tilt_as_velocity = true;
        let mut direct = body(BodyKind::Dynamic);
        Movement::Tilt.apply(&mut direct, &context);
        assert_eq!(direct.velocity(), Vec2::new(4.0, 0.0));
    }

    #[test]
    fn hover_pins_to_camera_offset() {
        let mut body = body(BodyKind::Kinematic);
        let mut movement = Movement::Hover {
            anchor: Vec2::new(1.0, -1.0),
        };
        let mut context = ctx(0.5);
        context.camera_center = Vec2::new(10.0, 5.0);
        movement.apply(&mut body, &context);
        assert_eq!(body.position(), Vec2::new(11.0, 4.0));
    }
}
