//! Points and rigid transforms.
//!
//! A [`Point`] is a location in 3-space together with the radius of the cell
//! membrane there. Segment trees only ever copy points around or push them
//! through an [`Isometry`]; everything else about them is opaque to the
//! surgery code.

use std::{cmp::Ordering, fmt::Display, ops::Mul};

use cgmath::{InnerSpace, One, Quaternion, Rad, Rotation3, Vector3, Zero};

/// A 3-D sample point with a radius.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64, radius: f64) -> Self {
        Point { x, y, z, radius }
    }

    fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    fn with_position(self, v: Vector3<f64>) -> Self {
        Point {
            x: v.x,
            y: v.y,
            z: v.z,
            radius: self.radius,
        }
    }

    /// Total lexicographic order over `(x, y, z, radius)` using
    /// [`f64::total_cmp`].
    pub fn total_cmp(&self, other: &Point) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.z.total_cmp(&other.z))
            .then_with(|| self.radius.total_cmp(&other.radius))
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(point {} {} {} {})", self.x, self.y, self.z, self.radius)
    }
}

/// A rigid motion of space. Only locations move; radii are preserved.
pub trait Isometry {
    fn apply(&self, point: Point) -> Point;
}

impl<F: Fn(Point) -> Point> Isometry for F {
    fn apply(&self, point: Point) -> Point {
        self(point)
    }
}

/// Rotation about the origin followed by a translation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigidTransform {
    rotation: Quaternion<f64>,
    translation: Vector3<f64>,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    pub fn identity() -> Self {
        RigidTransform {
            rotation: Quaternion::one(),
            translation: Vector3::zero(),
        }
    }

    pub fn translate(x: f64, y: f64, z: f64) -> Self {
        RigidTransform {
            rotation: Quaternion::one(),
            translation: Vector3::new(x, y, z),
        }
    }

    /// Rotation by `theta` radians about the axis `(x, y, z)`, right-handed.
    ///
    /// The axis does not need to be normalised. A zero axis gives the identity.
    pub fn rotate(theta: f64, x: f64, y: f64, z: f64) -> Self {
        let axis = Vector3::new(x, y, z);
        if axis.magnitude2() == 0.0 {
            return Self::identity();
        }
        RigidTransform {
            rotation: Quaternion::from_axis_angle(axis.normalize(), Rad(theta)),
            translation: Vector3::zero(),
        }
    }
}

impl Isometry for RigidTransform {
    fn apply(&self, point: Point) -> Point {
        point.with_position(self.rotation * point.position() + self.translation)
    }
}

/// `a * b` applies `b` first, then `a`.
impl Mul for RigidTransform {
    type Output = RigidTransform;

    fn mul(self, rhs: RigidTransform) -> RigidTransform {
        RigidTransform {
            rotation: self.rotation * rhs.rotation,
            translation: self.rotation * rhs.translation + self.translation,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn close(a: Point, b: Point) -> bool {
        [a.x - b.x, a.y - b.y, a.z - b.z, a.radius - b.radius]
            .iter()
            .all(|d| d.abs() < 1e-12)
    }

    #[test]
    fn translation_moves_location_only() {
        let p = Point::new(1.0, 2.0, 3.0, 0.5);
        let q = RigidTransform::translate(1.0, -2.0, 0.5).apply(p);
        assert_eq!(q, Point::new(2.0, 0.0, 3.5, 0.5));
    }

    #[test]
    fn quarter_turn_about_z() {
        let p = Point::new(1.0, 0.0, 0.0, 2.0);
        let q = RigidTransform::rotate(FRAC_PI_2, 0.0, 0.0, 3.0).apply(p);
        assert!(close(q, Point::new(0.0, 1.0, 0.0, 2.0)), "{q}");
    }

    #[test]
    fn composition_applies_right_first() {
        let p = Point::new(1.0, 0.0, 0.0, 1.0);
        let r = RigidTransform::rotate(FRAC_PI_2, 0.0, 0.0, 1.0);
        let t = RigidTransform::translate(1.0, 0.0, 0.0);

        // translate, then rotate
        assert!(close((r * t).apply(p), Point::new(0.0, 2.0, 0.0, 1.0)));
        // rotate, then translate
        assert!(close((t * r).apply(p), Point::new(1.0, 1.0, 0.0, 1.0)));
        assert!(close((r * t).apply(p), r.apply(t.apply(p))));
    }

    #[test]
    fn zero_axis_is_identity() {
        let p = Point::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(RigidTransform::rotate(1.0, 0.0, 0.0, 0.0).apply(p), p);
        assert_eq!(RigidTransform::default().apply(p), p);
    }

    #[test]
    fn closures_are_isometries() {
        let lift = |p: Point| Point::new(p.x, p.y, p.z + 1.0, p.radius);
        assert_eq!(
            lift.apply(Point::new(0.0, 0.0, 0.0, 1.0)),
            Point::new(0.0, 0.0, 1.0, 1.0)
        );
    }

    #[test]
    fn point_order_and_render() {
        let a = Point::new(0.0, 0.0, 0.0, 1.0);
        let b = Point::new(3.0, 4.0, 0.0, 3.0);
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert_eq!(a.to_string(), "(point 0 0 0 1)");
    }
}
