use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// World coordinates are meters with +y pointing down the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    pub fn normalized_or_zero(self) -> Vec2 {
        let length = self.length();
        if length <= f32::EPSILON {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / length, self.y / length)
        }
    }

    /// Rotates 90 degrees; used as the contact tangent.
    pub fn perpendicular(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Collision outline, centered on the body position.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Box { half_width: f32, half_height: f32 },
    /// Vertices relative to the body center.
    Polygon { points: Vec<Vec2> },
}

impl Shape {
    pub fn area(&self) -> f32 {
        match self {
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
            Shape::Box {
                half_width,
                half_height,
            } => 4.0 * half_width * half_height,
            Shape::Polygon { points } => polygon_area(points),
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        match self {
            Shape::Circle { radius } => Vec2::new(*radius, *radius),
            Shape::Box {
                half_width,
                half_height,
            } => Vec2::new(*half_width, *half_height),
            Shape::Polygon { points } => points.iter().fold(Vec2::ZERO, |acc, point| {
                Vec2::new(acc.x.max(point.x.abs()), acc.y.max(point.y.abs()))
            }),
        }
    }

    pub fn is_circle(&self) -> bool {
        matches!(self, Shape::Circle { .. })
    }

    /// World-space corners; empty for circles. Boxes stay axis-aligned, polygons turn
    /// with `rotation`.
    pub fn outline(&self, center: Vec2, rotation: f32) -> Vec<Vec2> {
        match self {
            Shape::Circle { .. } => Vec::new(),
            Shape::Box {
                half_width,
                half_height,
            } => vec![
                center + Vec2::new(-half_width, -half_height),
                center + Vec2::new(*half_width, -half_height),
                center + Vec2::new(*half_width, *half_height),
                center + Vec2::new(-half_width, *half_height),
            ],
            Shape::Polygon { points } => {
                let (sin, cos) = rotation.sin_cos();
                points
                    .iter()
                    .map(|point| {
                        let turned = Vec2::new(
                            point.x * cos - point.y * sin,
                            point.x * sin + point.y * cos,
                        );
                        center + turned
                    })
                    .collect()
            }
        }
    }

    /// Point test against the true outline; polygons are treated as convex.
    pub fn contains_point(&self, center: Vec2, rotation: f32, point: Vec2) -> bool {
        match self {
            Shape::Circle { radius } => point.distance(center) <= *radius,
            Shape::Box { .. } => Aabb::from_center(center, self.half_extents()).contains(point),
            Shape::Polygon { .. } => {
                let corners = self.outline(center, rotation);
                let mut winding = 0.0_f32;
                for (index, current) in corners.iter().enumerate() {
                    let next = corners[(index + 1) % corners.len()];
                    let cross = (next - *current).x * (point - *current).y
                        - (next - *current).y * (point - *current).x;
                    if cross != 0.0 {
                        if winding != 0.0 && cross.signum() != winding {
                            return false;
                        }
                        winding = cross.signum();
                    }
                }
                true
            }
        }
    }
}

fn polygon_area(points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (index, current) in points.iter().enumerate() {
        let next = points[(index + 1) % points.len()];
        twice_area += current.x * next.y - next.x * current.y;
    }
    (twice_area * 0.5).abs()
}

/// Outline requested by level code; sized from the factory's width and height.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Circle,
    Box,
    /// Flat `x0, y0, x1, y1, ...` list relative to the actor center.
    Polygon(Vec<f32>),
}

impl ShapeKind {
    pub(crate) fn to_shape(&self, width: f32, height: f32) -> Shape {
        match self {
            ShapeKind::Circle => Shape::Circle {
                radius: width.max(height) * 0.5,
            },
            ShapeKind::Box => Shape::Box {
                half_width: width * 0.5,
                half_height: height * 0.5,
            },
            ShapeKind::Polygon(coords) => {
                let points = coords
                    .chunks_exact(2)
                    .map(|pair| Vec2::new(pair[0], pair[1]))
                    .collect::<Vec<_>>();
                if points.len() < 3 {
                    Shape::Box {
                        half_width: width * 0.5,
                        half_height: height * 0.5,
                    }
                } else {
                    Shape::Polygon { points }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_radius_uses_larger_dimension() {
        let shape = ShapeKind::Circle.to_shape(2.0, 3.0);
        assert_eq!(shape, Shape::Circle { radius: 1.5 });
    }

    #[test]
    fn polygon_with_too_few_points_falls_back_to_box() {
        let shape = ShapeKind::Polygon(vec![0.0, 0.0, 1.0, 1.0]).to_shape(2.0, 4.0);
        assert_eq!(
            shape,
            Shape::Box {
                half_width: 1.0,
                half_height: 2.0
            }
        );
    }

    #[test]
    fn polygon_area_and_extents_follow_vertices() {
        let shape = ShapeKind::Polygon(vec![-1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0])
            .to_shape(2.0, 2.0);
        assert!((shape.area() - 4.0).abs() < 0.0001);
        assert_eq!(shape.half_extents(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn polygon_outline_turns_with_rotation() {
        let shape = Shape::Polygon {
            points: vec![Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(-1.0, 0.0)],
        };
        let corners = shape.outline(Vec2::new(5.0, 5.0), std::f32::consts::FRAC_PI_2);
        assert!((corners[0] - Vec2::new(5.0, 6.0)).length() < 0.0001);
        assert!((corners[1] - Vec2::new(4.0, 5.0)).length() < 0.0001);
    }

    #[test]
    fn triangle_excludes_its_empty_bounding_box_corner() {
        let triangle = Shape::Polygon {
            points: vec![Vec2::new(-1.0, -1.0), Vec2::new(1.0, -1.0), Vec2::new(0.0, 1.0)],
        };
        assert!(triangle.contains_point(Vec2::ZERO, 0.0, Vec2::new(0.0, 0.5)));
        assert!(!triangle.contains_point(Vec2::ZERO, 0.0, Vec2::new(0.9, 0.9)));
        let bounds = Aabb::from_center(Vec2::ZERO, triangle.half_extents());
        assert!(bounds.contains(Vec2::new(0.9, 0.9)));
    }

    #[test]
    fn normalized_zero_vector_stays_zero() {
        assert_eq!(Vec2::ZERO.normalized_or_zero(), Vec2::ZERO);
        let unit = Vec2::new(3.0, 4.0).normalized_or_zero();
        assert!((unit.length() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn aabb_overlap_excludes_touching_edges() {
        let a = Aabb::from_center(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Aabb::from_center(Vec2::new(2.0, 0.0), Vec2::new(1.0, 1.0));
        let c = Aabb::from_center(Vec2::new(1.5, 0.5), Vec2::new(1.0, 1.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(a.contains(Vec2::new(1.0, -1.0)));
    }
}
