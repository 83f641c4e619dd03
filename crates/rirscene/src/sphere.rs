//! Near-uniform azimuth/elevation sampling on the sphere and hemisphere.
//!
//! Model
//! - Geometric family: deterministic banded spiral (Habets & Gannot, "Comments
//!   on generating sensor signals in isotropic noise fields", 2010). Heights
//!   `h_k` are evenly spaced in `[-1, 1]`, which gives equal-area bands; the
//!   azimuth advances by `3.6 / sqrt(n (1 − h_k²))` per step.
//! - Stochastic family: isotropic random unit vectors. Drawing azimuth and
//!   elevation uniformly would cluster points at the poles.
//!
//! Angle conventions
//! - Azimuth in `[-π, π)` (geometric) or `(-π, π]` (stochastic), elevation in
//!   `[-π/2, π/2]`.
//! - The geometric sampler keeps the reference quirks: zero increment at the
//!   first and last index, last azimuth forced to the reference value.

use crate::error::{SceneError, SceneResult};
use crate::quat::Quaternion;
use nalgebra::Vector3;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Spiral step constant from the reference algorithm.
const SPIRAL_STEP: f64 = 3.6;

/// A direction given as (azimuth, elevation) in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    pub azimuth: f64,
    pub elevation: f64,
}

impl Direction {
    #[inline]
    pub fn new(azimuth: f64, elevation: f64) -> Self {
        Self { azimuth, elevation }
    }

    /// Azimuth/elevation of a non-zero vector (x toward azimuth 0, z up).
    pub fn from_vector(v: Vector3<f64>) -> Self {
        let n = v.norm();
        let elevation = (v.z / n).clamp(-1.0, 1.0).asin();
        let azimuth = v.y.atan2(v.x);
        Self { azimuth, elevation }
    }
}

/// `n` spiral samples covering the full sphere; index order runs from the
/// north pole (`elevation = π/2`) to the south pole (`elevation = −π/2`).
pub fn sample_sphere_geometric(n: usize) -> SceneResult<Vec<Direction>> {
    if n < 2 {
        return Err(SceneError::invalid(format!(
            "geometric sphere sampling needs at least 2 points, got {n}"
        )));
    }
    let nf = n as f64;
    let mut out = Vec::with_capacity(n);
    let mut acc = 0.0f64;
    for k in 0..n {
        let h = -1.0 + 2.0 * (k as f64) / (nf - 1.0);
        let increment = if k == 0 || k == n - 1 {
            0.0
        } else {
            SPIRAL_STEP / (nf * (1.0 - h * h)).sqrt()
        };
        acc += increment.rem_euclid(TAU);
        let azimuth = if k == n - 1 { 0.0 } else { acc.rem_euclid(TAU) };
        let elevation = h.clamp(-1.0, 1.0).acos();
        out.push(Direction::new(azimuth - PI, elevation - FRAC_PI_2));
    }
    Ok(out)
}

/// About `n` spiral samples on the upper half: sample `2n` points and keep
/// those with non-negative elevation.
pub fn sample_hemisphere_geometric(n: usize) -> SceneResult<Vec<Direction>> {
    let doubled = n.checked_mul(2).ok_or_else(|| {
        SceneError::invalid(format!("hemisphere sample count {n} is too large"))
    })?;
    let full = sample_sphere_geometric(doubled)?;
    Ok(full.into_iter().filter(|d| d.elevation >= 0.0).collect())
}

fn isotropic_unit_vector<R: Rng>(rng: &mut R) -> Vector3<f64> {
    loop {
        let v = Vector3::new(
            rng.sample::<f64, _>(StandardNormal),
            rng.sample::<f64, _>(StandardNormal),
            rng.sample::<f64, _>(StandardNormal),
        );
        if let Some(u) = v.try_normalize(1e-12) {
            return u;
        }
    }
}

/// One uniformly distributed direction on the sphere.
pub fn sample_sphere_stochastic<R: Rng>(rng: &mut R) -> Direction {
    Direction::from_vector(isotropic_unit_vector(rng))
}

/// One uniformly distributed direction on the upper hemisphere.
pub fn sample_hemisphere_stochastic<R: Rng>(rng: &mut R) -> Direction {
    let d = sample_sphere_stochastic(rng);
    Direction::new(d.azimuth, d.elevation.abs())
}

/// Archimedes' method: uniform height `z ∈ [-1, 1]` and uniform angle.
pub fn sample_sphere_stochastic_cylindrical<R: Rng>(rng: &mut R) -> Direction {
    let theta = rng.gen::<f64>() * TAU;
    let z = rng.gen::<f64>() * 2.0 - 1.0;
    let r = (1.0 - z * z).max(0.0).sqrt();
    Direction::from_vector(Vector3::new(r * theta.cos(), r * theta.sin(), z))
}

/// Rotate `start` by `elevation` about `elevation_axis`, then by `azimuth`
/// about `+z`.
pub fn direction_vector(
    start: Vector3<f64>,
    azimuth: f64,
    elevation: f64,
    elevation_axis: Vector3<f64>,
) -> SceneResult<Vector3<f64>> {
    let tilt = Quaternion::from_axis_angle(elevation_axis, elevation)?;
    let turn = Quaternion::from_axis_angle(Vector3::z(), azimuth)?;
    Ok(turn.rotate_vector(tilt.rotate_vector(start)))
}
