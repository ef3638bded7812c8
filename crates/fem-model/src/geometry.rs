//! 3D point and vector helpers.
//!
//! Coordinates travel as plain `[f64; 3]` through the entity model; the
//! arithmetic is delegated to `nalgebra`.

use nalgebra::{Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

pub type Point = [f64; 3];

/// Coordinates closer than this are treated as identical by direction tests.
pub const EPSILON: f64 = 1e-12;

/// Mirror plane, named by the two axes it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    /// Index of the coordinate normal to the plane.
    pub fn normal_axis(self) -> usize {
        match self {
            Plane::XY => 2,
            Plane::XZ => 1,
            Plane::YZ => 0,
        }
    }
}

pub fn to_vector(p: Point) -> Vector3<f64> {
    Vector3::new(p[0], p[1], p[2])
}

pub fn from_vector(v: &Vector3<f64>) -> Point {
    [v.x, v.y, v.z]
}

pub fn add(a: Point, b: Point) -> Point {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: Point, b: Point) -> Point {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(a: Point, factor: f64) -> Point {
    [a[0] * factor, a[1] * factor, a[2] * factor]
}

pub fn dot(a: Point, b: Point) -> f64 {
    to_vector(a).dot(&to_vector(b))
}

pub fn cross(a: Point, b: Point) -> Point {
    from_vector(&to_vector(a).cross(&to_vector(b)))
}

pub fn norm(a: Point) -> f64 {
    to_vector(a).norm()
}

pub fn distance(a: Point, b: Point) -> f64 {
    norm(sub(a, b))
}

pub fn midpoint(a: Point, b: Point) -> Point {
    scale(add(a, b), 0.5)
}

/// Unit vector along `a`, or `None` for a (near) zero vector.
pub fn normalize(a: Point) -> Option<Point> {
    let v = to_vector(a);
    let n = v.norm();
    if n <= EPSILON {
        None
    } else {
        Some(from_vector(&(v / n)))
    }
}

pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return [0.0; 3];
    }
    let sum = points.iter().fold([0.0; 3], |acc, p| add(acc, *p));
    scale(sum, 1.0 / points.len() as f64)
}

/// `true` when the two directions are parallel or anti-parallel.
pub fn parallel(a: Point, b: Point) -> bool {
    let scale_ref = norm(a) * norm(b);
    scale_ref <= EPSILON || norm(cross(a, b)) <= 1e-9 * scale_ref
}

/// Rotates `point` by `angle` radians about the line through `origin` along `axis`.
pub fn rotate_about_axis(point: Point, origin: Point, axis: Point, angle: f64) -> Point {
    let Some(axis) = normalize(axis) else {
        return point;
    };
    let rotation = Rotation3::from_axis_angle(&Unit::new_unchecked(to_vector(axis)), angle);
    let local = to_vector(sub(point, origin));
    add(from_vector(&(rotation * local)), origin)
}

/// Reflects `point` through `plane` (which passes through the origin).
pub fn mirror(point: Point, plane: Plane) -> Point {
    let mut out = point;
    out[plane.normal_axis()] = -out[plane.normal_axis()];
    out
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: Point,
    pub max: Point,
}

impl Extent {
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut extent = Extent {
            min: first,
            max: first,
        };
        for p in iter {
            for axis in 0..3 {
                extent.min[axis] = extent.min[axis].min(p[axis]);
                extent.max[axis] = extent.max[axis].max(p[axis]);
            }
        }
        Some(extent)
    }

    pub fn size(&self) -> Point {
        sub(self.max, self.min)
    }

    pub fn center(&self) -> Point {
        midpoint(self.min, self.max)
    }
}
