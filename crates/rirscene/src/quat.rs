//! Quaternion algebra for 3D point rotation.
//!
//! Purpose
//! - Rotate microphone and source offsets by an axis-angle pair using
//!   `q · (0, p) · q*`.
//! - Keep the Hamilton product explicit: the product is evaluated through a
//!   fixed basis table that turns the right operand into a 4×4 multiplication
//!   matrix, so `q1 · q2 = q1ᵀ M(q2)`.
//!
//! Conventions
//! - Components are stored scalar-first `(w, x, y, z)`.
//! - Only unit quaternions are used as rotation operators; `from_axis_angle`
//!   is the single constructor for those and normalizes the axis itself.
//! - A zero axis is an error (`SceneError::DegenerateRotationAxis`).

use crate::error::{SceneError, SceneResult};
use nalgebra::{Matrix4, Vector3, Vector4};
use rand::Rng;
use rand_distr::StandardNormal;
use std::ops::Mul;

/// Axes shorter than this are treated as zero.
pub const AXIS_EPS: f64 = 1e-12;

/// Basis table: `M(q)[i][j] = Σ_k BASIS[i][j][k] · q_k`.
const BASIS: [[[f64; 4]; 4]; 4] = [
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ],
    [
        [0.0, -1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, -1.0],
        [0.0, 0.0, 1.0, 0.0],
    ],
    [
        [0.0, 0.0, -1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0, 0.0],
        [0.0, -1.0, 0.0, 0.0],
    ],
    [
        [0.0, 0.0, 0.0, -1.0],
        [0.0, 0.0, -1.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0, 0.0],
    ],
];

/// Quaternion `w + xi + yj + zk`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    #[inline]
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Pure quaternion `(0, p)` representing a point.
    #[inline]
    pub fn pure(p: Vector3<f64>) -> Self {
        Self::new(0.0, p.x, p.y, p.z)
    }

    /// Unit rotation quaternion `(cos(θ/2), sin(θ/2)·axis/‖axis‖)`.
    pub fn from_axis_angle(axis: Vector3<f64>, angle: f64) -> SceneResult<Self> {
        if !axis.iter().all(|c| c.is_finite()) {
            return Err(SceneError::DegenerateRotationAxis);
        }
        let axis = axis
            .try_normalize(AXIS_EPS)
            .ok_or(SceneError::DegenerateRotationAxis)?;
        let (s, c) = (angle / 2.0).sin_cos();
        Ok(Self::new(c, s * axis.x, s * axis.y, s * axis.z))
    }

    #[inline]
    pub fn as_vector4(&self) -> Vector4<f64> {
        Vector4::new(self.w, self.x, self.y, self.z)
    }

    #[inline]
    pub fn from_vector4(v: Vector4<f64>) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    /// Vector (imaginary) part.
    #[inline]
    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn norm_squared(&self) -> f64 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// `q* = w − xi − yj − zk`.
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Right-multiplication matrix of `self` built from `BASIS`.
    fn mul_matrix(&self) -> Matrix4<f64> {
        let q = self.as_vector4();
        Matrix4::from_fn(|i, j| {
            let row = &BASIS[i][j];
            row[0] * q[0] + row[1] * q[1] + row[2] * q[2] + row[3] * q[3]
        })
    }

    /// Hamilton product `self · rhs`.
    pub fn multiply(&self, rhs: &Self) -> Self {
        // Row vector times matrix, written as Mᵀ · v.
        Self::from_vector4(rhs.mul_matrix().transpose() * self.as_vector4())
    }

    /// Rotate `p` by this (unit) quaternion: vector part of `q · (0,p) · q*`.
    #[inline]
    pub fn rotate_vector(&self, p: Vector3<f64>) -> Vector3<f64> {
        self.multiply(&Self::pure(p).multiply(&self.conjugate()))
            .vector()
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;
    #[inline]
    fn mul(self, rhs: Quaternion) -> Quaternion {
        self.multiply(&rhs)
    }
}

/// Free-function form of the Hamilton product; order matters.
#[inline]
pub fn multiply(q1: &Quaternion, q2: &Quaternion) -> Quaternion {
    q1.multiply(q2)
}

#[inline]
pub fn conjugate(q: &Quaternion) -> Quaternion {
    q.conjugate()
}

/// Rotate `point` by `angle` (radians) about `axis`.
pub fn rotate(angle: f64, axis: Vector3<f64>, point: Vector3<f64>) -> SceneResult<Vector3<f64>> {
    Ok(Quaternion::from_axis_angle(axis, angle)?.rotate_vector(point))
}

/// Isotropic random unit axis: standard-normal components, then normalized.
///
/// Uniform components would bias the axis toward the cube diagonals.
pub fn random_rotation_axis<R: Rng>(rng: &mut R) -> Vector3<f64> {
    loop {
        let v = Vector3::new(
            rng.sample::<f64, _>(StandardNormal),
            rng.sample::<f64, _>(StandardNormal),
            rng.sample::<f64, _>(StandardNormal),
        );
        if let Some(axis) = v.try_normalize(AXIS_EPS) {
            return axis;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    const EPS: f64 = 1e-12;

    #[test]
    fn basis_table_matches_hamilton_units() {
        let i = Quaternion::new(0.0, 1.0, 0.0, 0.0);
        let j = Quaternion::new(0.0, 0.0, 1.0, 0.0);
        let k = Quaternion::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(i * j, k);
        assert_eq!(j * k, i);
        assert_eq!(k * i, j);
        assert_eq!(j * i, Quaternion::new(0.0, 0.0, 0.0, -1.0));
        assert_eq!(i * i, Quaternion::new(-1.0, 0.0, 0.0, 0.0));
        assert_eq!(i * j * k, Quaternion::new(-1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn multiply_matches_closed_form() {
        let a = Quaternion::new(1.0, 2.0, 3.0, 4.0);
        let b = Quaternion::new(-0.5, 0.25, 2.0, -1.0);
        let expected = Quaternion::new(
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        );
        let got = multiply(&a, &b);
        assert!((got.as_vector4() - expected.as_vector4()).norm() < EPS);
        // non-commutative
        assert!((multiply(&b, &a).as_vector4() - got.as_vector4()).norm() > 1e-3);
    }

    #[test]
    fn quarter_turn_about_z() {
        let p = rotate(FRAC_PI_2, vector![0.0, 0.0, 1.0], vector![1.0, 0.0, 0.0]).unwrap();
        assert!((p - vector![0.0, 1.0, 0.0]).norm() < EPS);
        // Axis need not be unit length.
        let q = rotate(FRAC_PI_2, vector![0.0, 0.0, 5.0], vector![1.0, 0.0, 0.0]).unwrap();
        assert!((q - p).norm() < EPS);
    }

    #[test]
    fn zero_angle_is_identity() {
        let p = vector![0.3, -1.2, 2.5];
        let r = rotate(0.0, vector![1.0, 1.0, 0.0], p).unwrap();
        assert!((r - p).norm() < EPS);
    }

    #[test]
    fn zero_axis_is_an_error() {
        let err = rotate(PI, Vector3::zeros(), vector![1.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(err, SceneError::DegenerateRotationAxis);
        assert!(Quaternion::from_axis_angle(vector![f64::NAN, 0.0, 1.0], 1.0).is_err());
    }

    #[test]
    fn rotation_quaternion_is_unit() {
        let q = Quaternion::from_axis_angle(vector![3.0, -2.0, 0.5], 1.234).unwrap();
        assert!((q.norm() - 1.0).abs() < EPS);
    }

    #[test]
    fn random_axes_are_unit_and_isotropic() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let mut mean = Vector3::zeros();
        let mut diag_hits = 0usize;
        for _ in 0..n {
            let a = random_rotation_axis(&mut rng);
            assert!((a.norm() - 1.0).abs() < 1e-12);
            mean += a;
            // Fraction of axes within ~25° of any cube diagonal.
            let d = (a.x.abs() + a.y.abs() + a.z.abs()) / 3f64.sqrt();
            if d > 0.9 {
                diag_hits += 1;
            }
        }
        mean /= n as f64;
        assert!(mean.norm() < 0.03, "mean {mean:?}");
        // Area of 8 caps with cos(angle) > 0.9 is 8·2π(1−0.9)/4π = 0.4.
        let frac = diag_hits as f64 / n as f64;
        assert!((frac - 0.4).abs() < 0.03, "diagonal fraction {frac}");
    }

    fn axis_strategy() -> impl Strategy<Value = Vector3<f64>> {
        (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
            .prop_map(|(x, y, z)| Vector3::new(x, y, z))
            .prop_filter("non-degenerate axis", |v| v.norm() > 1e-3)
    }

    fn point_strategy() -> impl Strategy<Value = Vector3<f64>> {
        (-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0).prop_map(|(x, y, z)| Vector3::new(x, y, z))
    }

    proptest! {
        #[test]
        fn rotation_preserves_norm(axis in axis_strategy(), p in point_strategy(), angle in -10.0f64..10.0) {
            let r = rotate(angle, axis, p).unwrap();
            prop_assert!((r.norm() - p.norm()).abs() < 1e-9);
        }

        #[test]
        fn rotation_is_two_pi_periodic(axis in axis_strategy(), p in point_strategy(), angle in -10.0f64..10.0) {
            let a = rotate(angle, axis, p).unwrap();
            let b = rotate(angle + TAU, axis, p).unwrap();
            prop_assert!((a - b).norm() < 1e-9);
        }

        #[test]
        fn product_with_conjugate_is_norm_squared(w in -5.0f64..5.0, x in -5.0f64..5.0, y in -5.0f64..5.0, z in -5.0f64..5.0) {
            let q = Quaternion::new(w, x, y, z);
            let r = q * q.conjugate();
            prop_assert!(r.vector().norm() < 1e-9);
            prop_assert!((r.w - q.norm_squared()).abs() < 1e-9);
        }

        #[test]
        fn rotation_is_inverted_by_negative_angle(axis in axis_strategy(), p in point_strategy(), angle in -10.0f64..10.0) {
            let r = rotate(angle, axis, p).unwrap();
            let back = rotate(-angle, axis, r).unwrap();
            prop_assert!((back - p).norm() < 1e-9);
        }
    }
}
