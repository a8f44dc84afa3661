use std::collections::HashSet;

use super::actor::ActorId;
use super::body::{BodyKind, RigidBody};
use super::geometry::{Shape, Vec2};

const PENETRATION_SLOP: f32 = 0.01;
const CORRECTION_PERCENT: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Begin,
    Persist,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: ActorId,
    pub b: ActorId,
    /// Unit normal pointing from `a` toward `b`.
    pub normal: Vec2,
    pub phase: ContactPhase,
    /// Velocities before the solver responded to this contact.
    pub velocity_a: Vec2,
    pub velocity_b: Vec2,
}

impl Contact {
    pub fn involves(&self, id: ActorId) -> bool {
        self.a == id || self.b == id
    }
}

/// The one face of an obstacle that stays solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub fn outward_normal(self) -> Vec2 {
        match self {
            Side::Top => Vec2::new(0.0, -1.0),
            Side::Right => Vec2::new(1.0, 0.0),
            Side::Bottom => Vec2::new(0.0, 1.0),
            Side::Left => Vec2::new(-1.0, 0.0),
        }
    }
}

pub struct SolverBody<'a> {
    pub id: ActorId,
    pub body: &'a mut RigidBody,
    pub one_sided: Option<Side>,
}

/// Integrates bodies and reports contacts for one fixed step.
pub trait PhysicsSolver {
    fn step(&mut self, bodies: &mut [SolverBody<'_>], gravity: Vec2, dt: f32) -> Vec<Contact>;

    /// Drops any contact bookkeeping for a body leaving the simulation.
    fn forget(&mut self, _id: ActorId) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Manifold {
    normal: Vec2,
    depth: f32,
}

/// Impulse solver for circles, axis-aligned boxes and convex polygons.
#[derive(Debug, Default)]
pub struct ArcadeSolver {
    touching: HashSet<(ActorId, ActorId)>,
}

impl ArcadeSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touching_pair_count(&self) -> usize {
        self.touching.len()
    }
}

impl PhysicsSolver for ArcadeSolver {
    fn step(&mut self, bodies: &mut [SolverBody<'_>], gravity: Vec2, dt: f32) -> Vec<Contact> {
        for entry in bodies.iter_mut() {
            entry.body.integrate(gravity, dt);
        }

        let mut contacts = Vec::new();
        let mut touching_now = HashSet::new();
        for second_index in 1..bodies.len() {
            let (head, tail) = bodies.split_at_mut(second_index);
            let second = &mut tail[0];
            for first in head.iter_mut() {
                if !should_test(first.body, second.body) {
                    continue;
                }
                let Some(manifold) = collide(first.body, second.body) else {
                    continue;
                };
                let key = pair_key(first.id, second.id);
                let was_touching = self.touching.contains(&key);
                if !was_touching && !one_sided_admits(first, second) {
                    continue;
                }
                touching_now.insert(key);

                contacts.push(Contact {
                    a: first.id,
                    b: second.id,
                    normal: manifold.normal,
                    phase: if was_touching {
                        ContactPhase::Persist
                    } else {
                        ContactPhase::Begin
                    },
                    velocity_a: first.body.velocity(),
                    velocity_b: second.body.velocity(),
                });

                if !first.body.is_sensor() && !second.body.is_sensor() {
                    resolve(first.body, second.body, manifold);
                }
            }
        }
        self.touching = touching_now;
        contacts
    }

    fn forget(&mut self, id: ActorId) {
        self.touching.retain(|(a, b)| *a != id && *b != id);
    }
}

fn pair_key(a: ActorId, b: ActorId) -> (ActorId, ActorId) {
    if a.0 <= b.0 {
        (a, b)
    } else {
        (b, a)
    }
}

fn should_test(a: &RigidBody, b: &RigidBody) -> bool {
    if let (Some(group_a), Some(group_b)) = (a.pass_through_group(), b.pass_through_group()) {
        if group_a == group_b {
            return false;
        }
    }
    let any_dynamic = a.kind() == BodyKind::Dynamic || b.kind() == BodyKind::Dynamic;
    let sensor_pair = (a.is_sensor() || b.is_sensor())
        && !(a.kind() == BodyKind::Static && b.kind() == BodyKind::Static);
    any_dynamic || sensor_pair
}

fn one_sided_admits(first: &SolverBody<'_>, second: &SolverBody<'_>) -> bool {
    let admits = |side: Option<Side>, obstacle: &RigidBody, mover: &RigidBody| match side {
        Some(side) => {
            let relative = mover.velocity() - obstacle.velocity();
            relative.dot(side.outward_normal()) < 0.0
        }
        None => true,
    };
    admits(first.one_sided, first.body, second.body)
        && admits(second.one_sided, second.body, first.body)
}

fn collide(a: &RigidBody, b: &RigidBody) -> Option<Manifold> {
    let pa = a.position();
    let pb = b.position();
    match (a.shape(), b.shape()) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(pa, *ra, pb, *rb)
        }
        (Shape::Circle { radius }, Shape::Box { .. }) => {
            circle_box(pa, *radius, pb, b.shape().half_extents()).map(Manifold::flipped)
        }
        (Shape::Box { .. }, Shape::Circle { radius }) => {
            circle_box(pb, *radius, pa, a.shape().half_extents())
        }
        (Shape::Box { .. }, Shape::Box { .. }) => {
            box_box(pa, a.shape().half_extents(), pb, b.shape().half_extents())
        }
        (Shape::Circle { radius }, polygon) => {
            circle_polygon(pa, *radius, &polygon.outline(pb, b.rotation())).map(Manifold::flipped)
        }
        (polygon, Shape::Circle { radius }) => {
            circle_polygon(pb, *radius, &polygon.outline(pa, a.rotation()))
        }
        (first, second) => polygon_polygon(
            &first.outline(pa, a.rotation()),
            &second.outline(pb, b.rotation()),
        ),
    }
}

impl Manifold {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

/// Separating-axis test between two convex outlines. Normal points from `a` toward `b`.
fn polygon_polygon(a: &[Vec2], b: &[Vec2]) -> Option<Manifold> {
    let mut best: Option<Manifold> = None;
    for axis in edge_normals(a).chain(edge_normals(b)) {
        let (min_a, max_a) = project(a, axis);
        let (min_b, max_b) = project(b, axis);
        let overlap = (max_a - min_b).min(max_b - min_a);
        if overlap <= 0.0 {
            return None;
        }
        if best.map_or(true, |current| overlap < current.depth) {
            best = Some(Manifold {
                normal: axis,
                depth: overlap,
            });
        }
    }
    best.map(|manifold| facing(manifold, centroid(b) - centroid(a)))
}

/// Normal points from the polygon toward the circle.
fn circle_polygon(center: Vec2, radius: f32, polygon: &[Vec2]) -> Option<Manifold> {
    let nearest = polygon
        .iter()
        .copied()
        .min_by(|l, r| l.distance(center).total_cmp(&r.distance(center)))?;
    let vertex_axis = (center - nearest).normalized_or_zero();

    let mut best: Option<Manifold> = None;
    let axes = edge_normals(polygon).chain((vertex_axis != Vec2::ZERO).then_some(vertex_axis));
    for axis in axes {
        let (min_p, max_p) = project(polygon, axis);
        let projected = center.dot(axis);
        let overlap = (max_p - (projected - radius)).min((projected + radius) - min_p);
        if overlap <= 0.0 {
            return None;
        }
        if best.map_or(true, |current| overlap < current.depth) {
            best = Some(Manifold {
                normal: axis,
                depth: overlap,
            });
        }
    }
    best.map(|manifold| facing(manifold, center - centroid(polygon)))
}

fn edge_normals(points: &[Vec2]) -> impl Iterator<Item = Vec2> + '_ {
    (0..points.len()).filter_map(move |index| {
        let edge = points[(index + 1) % points.len()] - points[index];
        let normal = Vec2::new(edge.y, -edge.x).normalized_or_zero();
        (normal != Vec2::ZERO).then_some(normal)
    })
}

fn project(points: &[Vec2], axis: Vec2) -> (f32, f32) {
    points.iter().fold((f32::MAX, f32::MIN), |(low, high), point| {
        let along = point.dot(axis);
        (low.min(along), high.max(along))
    })
}

fn centroid(points: &[Vec2]) -> Vec2 {
    let sum = points.iter().fold(Vec2::ZERO, |acc, point| acc + *point);
    sum * (1.0 / points.len().max(1) as f32)
}

fn facing(manifold: Manifold, direction: Vec2) -> Manifold {
    if manifold.normal.dot(direction) < 0.0 {
        manifold.flipped()
    } else {
        manifold
    }
}

fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<Manifold> {
    let delta = pb - pa;
    let distance = delta.length();
    let reach = ra + rb;
    if distance >= reach {
        return None;
    }
    let normal = if distance > f32::EPSILON {
        delta * (1.0 / distance)
    } else {
        Vec2::new(0.0, 1.0)
    };
    Some(Manifold {
        normal,
        depth: reach - distance,
    })
}

/// Normal points from the box toward the circle.
fn circle_box(center: Vec2, radius: f32, box_center: Vec2, half: Vec2) -> Option<Manifold> {
    let local = center - box_center;
    let closest = Vec2::new(
        local.x.clamp(-half.x, half.x),
        local.y.clamp(-half.y, half.y),
    );
    if local != closest {
        let delta = local - closest;
        let distance = delta.length();
        if distance >= radius {
            return None;
        }
        return Some(Manifold {
            normal: delta * (1.0 / distance.max(f32::EPSILON)),
            depth: radius - distance,
        });
    }

    let overlap_x = half.x - local.x.abs();
    let overlap_y = half.y - local.y.abs();
    if overlap_x < overlap_y {
        Some(Manifold {
            normal: Vec2::new(sign(local.x), 0.0),
            depth: radius + overlap_x,
        })
    } else {
        Some(Manifold {
            normal: Vec2::new(0.0, sign(local.y)),
            depth: radius + overlap_y,
        })
    }
}

fn box_box(pa: Vec2, ha: Vec2, pb: Vec2, hb: Vec2) -> Option<Manifold> {
    let delta = pb - pa;
    let overlap_x = ha.x + hb.x - delta.x.abs();
    let overlap_y = ha.y + hb.y - delta.y.abs();
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return None;
    }
    if overlap_x < overlap_y {
        Some(Manifold {
            normal: Vec2::new(sign(delta.x), 0.0),
            depth: overlap_x,
        })
    } else {
        Some(Manifold {
            normal: Vec2::new(0.0, sign(delta.y)),
            depth: overlap_y,
        })
    }
}

fn sign(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn resolve(a: &mut RigidBody, b: &mut RigidBody, manifold: Manifold) {
    let inverse_a = a.inverse_mass();
    let inverse_b = b.inverse_mass();
    let inverse_total = inverse_a + inverse_b;
    if inverse_total <= 0.0 {
        return;
    }
    let normal = manifold.normal;

    let correction =
        normal * ((manifold.depth - PENETRATION_SLOP).max(0.0) * CORRECTION_PERCENT / inverse_total);
    a.nudge(-(correction * inverse_a));
    b.nudge(correction * inverse_b);

    let relative = b.velocity() - a.velocity();
    let closing_speed = relative.dot(normal);
    if closing_speed > 0.0 {
        return;
    }
    let restitution = a.material().elasticity.max(b.material().elasticity);
    let normal_impulse = -(1.0 + restitution) * closing_speed / inverse_total;
    let impulse = normal * normal_impulse;
    a.set_velocity_unchecked(a.velocity() - impulse * inverse_a);
    b.set_velocity_unchecked(b.velocity() + impulse * inverse_b);

    let relative = b.velocity() - a.velocity();
    let tangent = (relative - normal * relative.dot(normal)).normalized_or_zero();
    if tangent == Vec2::ZERO {
        return;
    }
    let friction = (a.material().friction * b.material().friction).sqrt();
    let limit = normal_impulse * friction;
    let tangent_impulse = (-relative.dot(tangent) / inverse_total).clamp(-limit, limit);
    let friction_impulse = tangent * tangent_impulse;
    a.set_velocity_unchecked(a.velocity() - friction_impulse * inverse_a);
    b.set_velocity_unchecked(b.velocity() + friction_impulse * inverse_b);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> RigidBody {
        RigidBody::new(
            Shape::Box {
                half_width: 5.0,
                half_height: 0.5,
            },
            BodyKind::Static,
            Vec2::new(0.0, 5.0),
        )
    }

    fn ball(y: f32) -> RigidBody {
        RigidBody::new(Shape::Circle { radius: 0.5 }, BodyKind::Dynamic, Vec2::new(0.0, y))
    }

    fn step_pair(
        solver: &mut ArcadeSolver,
        first: &mut RigidBody,
        second: &mut RigidBody,
        one_sided: Option<Side>,
        gravity: Vec2,
    ) -> Vec<Contact> {
        let mut bodies = vec![
            SolverBody {
                id: ActorId(1),
                body: first,
                one_sided,
            },
            SolverBody {
                id: ActorId(2),
                body: second,
                one_sided: None,
            },
        ];
        solver.step(&mut bodies, gravity, 0.25)
    }

    #[test]
    fn resting_ball_reports_begin_then_persist() {
        let mut solver = ArcadeSolver::new();
        let mut ground = floor();
        let mut body = ball(4.1);
        let gravity = Vec2::new(0.0, 10.0);

        let first = step_pair(&mut solver, &mut ground, &mut body, None, gravity);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].phase, ContactPhase::Begin);
        assert_eq!(first[0].normal, Vec2::new(0.0, -1.0));

        let second = step_pair(&mut solver, &mut ground, &mut body, None, gravity);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].phase, ContactPhase::Persist);
        assert!(body.position().y < 4.6);
        assert!(body.velocity().y <= 0.0001);
    }

    #[test]
    fn sensor_contact_is_reported_without_response() {
        let mut solver = ArcadeSolver::new();
        let mut ground = floor();
        ground.set_sensor(true);
        let mut body = ball(4.5);
        body.set_velocity(Vec2::new(0.0, 2.0));

        let contacts = step_pair(&mut solver, &mut ground, &mut body, None, Vec2::ZERO);
        assert_eq!(contacts.len(), 1);
        assert_eq!(body.velocity(), Vec2::new(0.0, 2.0));
        assert_eq!(body.position(), Vec2::new(0.0, 5.0));
    }

    #[test]
    fn one_sided_top_lets_rising_body_through() {
        let mut solver = ArcadeSolver::new();
        let mut platform = floor();
        let mut body = ball(5.5);
        body.set_velocity(Vec2::new(0.0, -2.0));

        let contacts = step_pair(
            &mut solver,
            &mut platform,
            &mut body,
            Some(Side::Top),
            Vec2::ZERO,
        );
        assert!(contacts.is_empty());
        assert_eq!(body.velocity(), Vec2::new(0.0, -2.0));
    }

    #[test]
    fn one_sided_top_catches_falling_body() {
        let mut solver = ArcadeSolver::new();
        let mut platform = floor();
        let mut body = ball(3.8);
        body.set_velocity(Vec2::new(0.0, 2.0));

        let contacts = step_pair(
            &mut solver,
            &mut platform,
            &mut body,
            Some(Side::Top),
            Vec2::ZERO,
        );
        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].velocity_b.y > 0.0);
        assert!(body.velocity().y <= 0.0001);
    }

    #[test]
    fn static_pairs_and_pass_through_groups_are_skipped() {
        let mut solver = ArcadeSolver::new();
        let mut a = floor();
        let mut b = floor();
        assert!(step_pair(&mut solver, &mut a, &mut b, None, Vec2::ZERO).is_empty());

        let mut c = ball(0.0);
        let mut d = ball(0.2);
        c.set_pass_through_group(Some(7));
        d.set_pass_through_group(Some(7));
        assert!(step_pair(&mut solver, &mut c, &mut d, None, Vec2::ZERO).is_empty());
    }

    #[test]
    fn elastic_ball_bounces() {
        let mut solver = ArcadeSolver::new();
        let mut ground = floor();
        let mut body = ball(3.6);
        body.set_physics(1.0, 1.0, 0.0);
        body.set_velocity(Vec2::new(0.0, 4.0));

        step_pair(&mut solver, &mut ground, &mut body, None, Vec2::ZERO);
        assert!(body.velocity().y < -3.9);
    }

    #[test]
    fn forget_clears_touching_pairs() {
        let mut solver = ArcadeSolver::new();
        let mut ground = floor();
        let mut body = ball(4.1);
        step_pair(&mut solver, &mut ground, &mut body, None, Vec2::ZERO);
        assert_eq!(solver.touching_pair_count(), 1);
        solver.forget(ActorId(2));
        assert_eq!(solver.touching_pair_count(), 0);
    }

    fn triangle() -> RigidBody {
        let points = vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(0.0, 1.0),
        ];
        RigidBody::new(Shape::Polygon { points }, BodyKind::Static, Vec2::ZERO)
    }

    #[test]
    fn box_slides_through_empty_corner_of_triangle_bounds() {
        let mut solver = ArcadeSolver::new();
        let mut wedge = triangle();
        let mut hero = RigidBody::new(
            Shape::Box {
                half_width: 0.1,
                half_height: 0.1,
            },
            BodyKind::Dynamic,
            Vec2::new(-0.8, 0.85),
        );
        hero.set_velocity(Vec2::new(1.0, 0.0));

        let contacts = step_pair(&mut solver, &mut wedge, &mut hero, None, Vec2::ZERO);
        assert!(contacts.is_empty());
        assert_eq!(hero.velocity(), Vec2::new(1.0, 0.0));
        assert!((hero.position().x + 0.55).abs() < 1e-5);
    }

    #[test]
    fn circle_beside_slanted_edge_does_not_touch() {
        let wedge = triangle();
        let circle = RigidBody::new(
            Shape::Circle { radius: 0.2 },
            BodyKind::Dynamic,
            Vec2::new(0.8, 0.7),
        );
        assert!(collide(&circle, &wedge).is_none());
        assert!(collide(&wedge, &circle).is_none());
    }

    #[test]
    fn circle_on_slanted_edge_is_pushed_along_its_normal() {
        let wedge = triangle();
        let circle = RigidBody::new(
            Shape::Circle { radius: 0.5 },
            BodyKind::Dynamic,
            Vec2::new(0.8, 0.4),
        );
        let manifold = collide(&wedge, &circle).expect("touching");
        let expected = Vec2::new(2.0, 1.0).normalized_or_zero();
        assert!((manifold.normal - expected).length() < 1e-4);
        assert!(manifold.depth > 0.0);
    }

    #[test]
    fn box_overlapping_triangle_base_gets_base_normal() {
        let wedge = triangle();
        let block = RigidBody::new(
            Shape::Box {
                half_width: 0.5,
                half_height: 0.3,
            },
            BodyKind::Dynamic,
            Vec2::new(0.0, -1.2),
        );
        let manifold = collide(&wedge, &block).expect("overlapping");
        assert!((manifold.normal - Vec2::new(0.0, -1.0)).length() < 1e-4);
        assert!((manifold.depth - 0.1).abs() < 1e-4);
    }
}
