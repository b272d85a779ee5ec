#![warn(missing_docs)]

//! Math types for the mantle B-rep kernel.
//!
//! Thin wrappers around nalgebra plus the small set of geometric
//! helpers the topology layer leans on: tolerances, axis-aligned
//! boxes, plane equations, and point/line/polygon measurements.

use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// A 4x4 homogeneous transformation matrix.
pub type Mat4 = Matrix4<f64>;

/// Apply a homogeneous transform to a point, dividing by `w`.
///
/// A `w` of zero leaves the affine part untouched, so plain
/// model-to-view matrices behave as expected.
pub fn transform_point(m: &Mat4, p: &Point3) -> Point3 {
    let v = m * Vector4::new(p.x, p.y, p.z, 1.0);
    if v.w.abs() > f64::EPSILON {
        Point3::new(v.x / v.w, v.y / v.w, v.z / v.w)
    } else {
        Point3::new(v.x, v.y, v.z)
    }
}

/// Tolerances for geometric comparisons.
///
/// Every distance-sensitive query takes one of these explicitly;
/// there is no global default in effect anywhere in the kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Two points closer than this are the same point (model units).
    pub dist: f64,
    /// `dist` squared, kept alongside so hot loops skip the multiply.
    pub dist_sq: f64,
    /// Unit-vector dot products below this are perpendicular.
    pub perp: f64,
    /// Unit-vector dot products above this are parallel.
    pub para: f64,
}

impl Tolerance {
    /// Conventional modeling tolerances: 0.0005 distance, 1e-6 perpendicular.
    pub const DEFAULT: Self = Self {
        dist: 0.0005,
        dist_sq: 0.0005 * 0.0005,
        perp: 1e-6,
        para: 1.0 - 1e-6,
    };

    /// Build a tolerance from its two independent knobs.
    pub fn new(dist: f64, perp: f64) -> Self {
        Self {
            dist,
            dist_sq: dist * dist,
            perp,
            para: 1.0 - perp,
        }
    }

    /// Check if two points are coincident within the distance tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm_squared() <= self.dist_sq
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb {
    /// The empty box: +inf mins, -inf maxes. Expanding by any point fixes it.
    pub const EMPTY: Self = Self {
        min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    /// True if no point has been folded in yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Grow the box to contain `p`.
    pub fn expand(&mut self, p: &Point3) {
        for i in 0..3 {
            if p[i] < self.min[i] {
                self.min[i] = p[i];
            }
            if p[i] > self.max[i] {
                self.max[i] = p[i];
            }
        }
    }

    /// Smallest box containing both operands.
    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        if !other.is_empty() {
            out.expand(&other.min);
            out.expand(&other.max);
        }
        out
    }

    /// Thicken any axis whose extent is below `dist` by `dist / 2` per side.
    ///
    /// Planar and linear geometry gets a zero-thickness box otherwise,
    /// which makes box-overlap culling useless along that axis.
    pub fn pad_thin_axes(&mut self, dist: f64) {
        if self.is_empty() {
            return;
        }
        let half = dist * 0.5;
        for i in 0..3 {
            if self.max[i] - self.min[i] < dist {
                self.min[i] -= half;
                self.max[i] += half;
            }
        }
    }
}

/// A plane in `normal . p = d` form, `normal` unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneEq {
    /// Unit plane normal.
    pub normal: Vec3,
    /// Signed distance of the plane from the origin along `normal`.
    pub d: f64,
}

impl PlaneEq {
    /// Plane through `p` with the given (not necessarily unit) normal.
    ///
    /// Returns `None` for a zero-length normal.
    pub fn from_point_and_normal(p: &Point3, normal: &Vec3) -> Option<Self> {
        let n2 = normal.norm_squared();
        if n2 <= f64::EPSILON {
            return None;
        }
        let n = normal / n2.sqrt();
        Some(Self {
            normal: n,
            d: n.dot(&p.coords),
        })
    }

    /// Signed distance from `p` to the plane (positive on the normal side).
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.d
    }

    /// The same plane facing the other way.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }
}

/// Squared distance from `p` to the infinite line through `origin`
/// along `dir`. `dir` need not be unit length; a degenerate `dir`
/// degrades to the point-to-point distance.
pub fn dist_sq_point_to_line(p: &Point3, origin: &Point3, dir: &Vec3) -> f64 {
    let f = p - origin;
    let dir_sq = dir.norm_squared();
    if dir_sq <= f64::EPSILON {
        return f.norm_squared();
    }
    let t = f.dot(dir);
    (f.norm_squared() - t * t / dir_sq).max(0.0)
}

/// Squared distance from `p` to the 2D segment `a..b`.
pub fn dist_sq_point_to_seg2(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let ab_sq = ab.norm_squared();
    if ab_sq <= f64::EPSILON {
        return (p - a).norm_squared();
    }
    let t = ((p - a).dot(&ab) / ab_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm_squared()
}

/// Area vector of a closed polygon by the Newell sum.
///
/// The magnitude is the enclosed area and the direction is the plane
/// normal for counterclockwise vertex order. Translation invariant,
/// robust against mildly non-planar input.
pub fn polygon_area_vector(points: &[Point3]) -> Vec3 {
    let mut sum = Vec3::zeros();
    let n = points.len();
    if n < 3 {
        return sum;
    }
    for i in 0..n {
        let a = &points[i].coords;
        let b = &points[(i + 1) % n].coords;
        sum += a.cross(b);
    }
    sum * 0.5
}

/// Counterclockwise angle of `vec` measured from `xvec` toward `yvec`,
/// in `[0, 2*pi)`. The basis vectors should be orthonormal; `vec` need
/// not be unit length.
pub fn angle_measure(vec: &Vec3, xvec: &Vec3, yvec: &Vec3) -> f64 {
    let ang = vec.dot(yvec).atan2(vec.dot(xvec));
    if ang < 0.0 {
        ang + std::f64::consts::TAU
    } else {
        ang
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_tolerance_derived_fields() {
        let tol = Tolerance::new(0.01, 1e-5);
        assert_relative_eq!(tol.dist_sq, 1e-4);
        assert_relative_eq!(tol.para, 1.0 - 1e-5);
        assert!(tol.points_equal(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(0.009, 0.0, 0.0)
        ));
        assert!(!tol.points_equal(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(0.011, 0.0, 0.0)
        ));
    }

    #[test]
    fn test_aabb_expand_union() {
        let mut a = Aabb::EMPTY;
        assert!(a.is_empty());
        a.expand(&Point3::new(1.0, 2.0, 3.0));
        a.expand(&Point3::new(-1.0, 0.0, 5.0));
        assert!(!a.is_empty());
        assert_relative_eq!(a.min.x, -1.0);
        assert_relative_eq!(a.max.z, 5.0);

        let mut b = Aabb::EMPTY;
        b.expand(&Point3::new(10.0, 0.0, 0.0));
        let u = a.union(&b);
        assert_relative_eq!(u.max.x, 10.0);
        let u2 = a.union(&Aabb::EMPTY);
        assert_eq!(u2, a);
    }

    #[test]
    fn test_aabb_pad_thin_axes() {
        let mut bb = Aabb::EMPTY;
        bb.expand(&Point3::new(0.0, 0.0, 0.0));
        bb.expand(&Point3::new(1.0, 1.0, 0.0));
        bb.pad_thin_axes(0.001);
        // z was flat, x and y were not
        assert_relative_eq!(bb.min.z, -0.0005);
        assert_relative_eq!(bb.max.z, 0.0005);
        assert_relative_eq!(bb.min.x, 0.0);
        assert_relative_eq!(bb.max.x, 1.0);
    }

    #[test]
    fn test_plane_signed_distance() {
        let pl = PlaneEq::from_point_and_normal(&Point3::new(0.0, 0.0, 2.0), &Vec3::new(0.0, 0.0, 3.0))
            .unwrap();
        assert_relative_eq!(pl.normal.z, 1.0);
        assert_relative_eq!(pl.d, 2.0);
        assert_relative_eq!(pl.signed_distance(&Point3::new(5.0, 5.0, 3.0)), 1.0);
        assert_relative_eq!(pl.flipped().signed_distance(&Point3::new(5.0, 5.0, 3.0)), -1.0);
        assert!(PlaneEq::from_point_and_normal(&Point3::origin(), &Vec3::zeros()).is_none());
    }

    #[test]
    fn test_dist_sq_point_to_line() {
        // non-unit direction must not change the answer
        let d = dist_sq_point_to_line(
            &Point3::new(0.0, 2.0, 0.0),
            &Point3::new(-3.0, 0.0, 0.0),
            &Vec3::new(10.0, 0.0, 0.0),
        );
        assert_relative_eq!(d, 4.0);
        let d0 = dist_sq_point_to_line(
            &Point3::new(1.0, 1.0, 0.0),
            &Point3::origin(),
            &Vec3::zeros(),
        );
        assert_relative_eq!(d0, 2.0);
    }

    #[test]
    fn test_dist_sq_point_to_seg2() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        assert_relative_eq!(dist_sq_point_to_seg2(&Point2::new(1.0, 1.0), &a, &b), 1.0);
        // beyond the endpoint clamps to it
        assert_relative_eq!(dist_sq_point_to_seg2(&Point2::new(3.0, 0.0), &a, &b), 1.0);
        assert_relative_eq!(dist_sq_point_to_seg2(&Point2::new(1.0, 0.0), &a, &a), 1.0);
    }

    #[test]
    fn test_polygon_area_vector_square() {
        let ccw = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let n = polygon_area_vector(&ccw);
        assert_relative_eq!(n.norm(), 1.0);
        assert!(n.z > 0.0);

        let mut cw = ccw;
        cw.reverse();
        assert!(polygon_area_vector(&cw).z < 0.0);

        // translation away from the origin leaves the sum unchanged
        let moved: Vec<Point3> = ccw
            .iter()
            .map(|p| p + Vec3::new(100.0, -40.0, 7.0))
            .collect();
        let nm = polygon_area_vector(&moved);
        assert_relative_eq!(nm.x, n.x, epsilon = 1e-9);
        assert_relative_eq!(nm.z, n.z, epsilon = 1e-9);
    }

    #[test]
    fn test_angle_measure_quadrants() {
        let x = Vec3::x();
        let y = Vec3::y();
        assert_relative_eq!(angle_measure(&Vec3::new(1.0, 0.0, 0.0), &x, &y), 0.0);
        assert_relative_eq!(angle_measure(&Vec3::new(0.0, 2.0, 0.0), &x, &y), FRAC_PI_2);
        assert_relative_eq!(angle_measure(&Vec3::new(-1.0, 0.0, 0.0), &x, &y), PI);
        assert_relative_eq!(
            angle_measure(&Vec3::new(0.0, -1.0, 0.0), &x, &y),
            3.0 * FRAC_PI_2
        );
    }

    #[test]
    fn test_transform_point_projection() {
        let t = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let p = transform_point(&t, &Point3::origin());
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.z, 3.0);
    }
}
