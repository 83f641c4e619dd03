//! Microphone array layouts relative to the array center.
//!
//! Purpose
//! - Build the base (unrotated) offset vectors for the three supported
//!   topologies. The center is the origin of the returned coordinates.
//! - Order is part of the contract: the first and last offsets define the
//!   array axis used by the DOA post-condition.
//!
//! Topologies
//! - `Linear` (ULA): `n` mics on the x axis with spacing `d`, centered.
//! - `Circular` (CUA): `n` mics equally spaced on a circle of radius `r` in
//!   the xy plane.
//! - `Spherical` (SUA): exact platonic layout for 4/6/8/12/20 mics,
//!   otherwise the geometric spiral mapped onto the sphere of radius `r`.

use crate::error::{SceneError, SceneResult};
use crate::platonic::PlatonicSolid;
use crate::sphere::{
    direction_vector, sample_hemisphere_geometric, sample_sphere_geometric, Direction,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

/// Closed set of supported array shapes.
///
/// Serialized as its tag; deserialized through `FromStr`, so config files
/// accept the same spellings as the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ArrayTopology {
    #[serde(rename = "ULA")]
    Linear,
    #[serde(rename = "CUA")]
    Circular,
    #[serde(rename = "SUA")]
    Spherical,
}

impl ArrayTopology {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Linear => "ULA",
            Self::Circular => "CUA",
            Self::Spherical => "SUA",
        }
    }

    /// Base offsets; `size` is the spacing for `Linear`, the radius otherwise.
    pub fn offsets(self, size: f64, num_mics: usize) -> SceneResult<Vec<Vector3<f64>>> {
        match self {
            Self::Linear => linear(size, num_mics),
            Self::Circular => circular(size, num_mics),
            Self::Spherical => spherical(size, num_mics),
        }
    }

    /// Directions of arrival to cover for this topology.
    ///
    /// A line array only resolves the angle to its axis, so it gets `count`
    /// azimuths over `[0, π]` at zero elevation. A planar array cannot tell
    /// up from down and gets the upper hemisphere; a spherical array the full
    /// sphere.
    pub fn doa_grid(self, count: usize) -> SceneResult<Vec<Direction>> {
        match self {
            Self::Linear => {
                if count < 2 {
                    return Err(SceneError::invalid(format!(
                        "linear DOA grid needs at least 2 directions, got {count}"
                    )));
                }
                let delta = PI / (count - 1) as f64;
                Ok((0..count)
                    .map(|k| Direction::new(k as f64 * delta, 0.0))
                    .collect())
            }
            Self::Circular => sample_hemisphere_geometric(count),
            Self::Spherical => sample_sphere_geometric(count),
        }
    }
}

impl fmt::Display for ArrayTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ArrayTopology {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ula" | "linear" => Ok(Self::Linear),
            "cua" | "circular" => Ok(Self::Circular),
            "sua" | "spherical" => Ok(Self::Spherical),
            other => Err(SceneError::invalid(format!("unknown array type '{other}'"))),
        }
    }
}

impl TryFrom<String> for ArrayTopology {
    type Error = SceneError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

fn check_params(size: f64, num_mics: usize, what: &str) -> SceneResult<()> {
    if num_mics == 0 {
        return Err(SceneError::invalid("array needs at least one microphone"));
    }
    if !size.is_finite() || size <= 0.0 {
        return Err(SceneError::invalid(format!(
            "{what} must be finite and positive, got {size}"
        )));
    }
    Ok(())
}

/// Uniform linear array along x, symmetric about the origin.
pub fn linear(spacing: f64, num_mics: usize) -> SceneResult<Vec<Vector3<f64>>> {
    check_params(spacing, num_mics, "spacing")?;
    let center = (num_mics - 1) as f64 * spacing / 2.0;
    Ok((0..num_mics)
        .map(|i| Vector3::new(i as f64 * spacing - center, 0.0, 0.0))
        .collect())
}

/// Uniform circular array in the xy plane.
pub fn circular(radius: f64, num_mics: usize) -> SceneResult<Vec<Vector3<f64>>> {
    check_params(radius, num_mics, "radius")?;
    let step = TAU / num_mics as f64;
    Ok((0..num_mics)
        .map(|k| {
            let (s, c) = (k as f64 * step).sin_cos();
            Vector3::new(radius * c, radius * s, 0.0)
        })
        .collect())
}

/// Uniform spherical array: platonic layout when available, spiral otherwise.
pub fn spherical(radius: f64, num_mics: usize) -> SceneResult<Vec<Vector3<f64>>> {
    check_params(radius, num_mics, "radius")?;
    if let Some(solid) = PlatonicSolid::from_vertex_count(num_mics) {
        return Ok(solid.calc_coordinates(radius));
    }
    sample_sphere_geometric(num_mics)?
        .into_iter()
        .map(|d| {
            direction_vector(Vector3::x(), d.azimuth, d.elevation, Vector3::y())
                .map(|v| v * radius)
        })
        .collect()
}
