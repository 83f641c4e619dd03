//! Room, sampler configuration and the validated scene record.

use crate::error::{SceneError, SceneResult};
use nalgebra::Vector3;

/// Default angular tolerance of the DOA post-condition (radians).
pub const DOA_TOLERANCE: f64 = 1e-2;

/// Axis-aligned shoebox room `[0, length] × [0, width] × [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Room {
    dims: Vector3<f64>,
}

impl Room {
    pub fn new(length: f64, width: f64, height: f64) -> SceneResult<Self> {
        let dims = Vector3::new(length, width, height);
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(SceneError::InvalidRoomGeometry {
                dims: [length, width, height],
                wall_clearance: 0.0,
            });
        }
        Ok(Self { dims })
    }

    pub fn from_dims(dims: [f64; 3]) -> SceneResult<Self> {
        Self::new(dims[0], dims[1], dims[2])
    }

    #[inline]
    pub fn dims(&self) -> Vector3<f64> {
        self.dims
    }

    #[inline]
    pub fn as_array(&self) -> [f64; 3] {
        [self.dims.x, self.dims.y, self.dims.z]
    }

    /// True if every coordinate lies in `[wdist, dim − wdist]`.
    #[inline]
    pub fn contains_with_clearance(&self, p: &Vector3<f64>, wdist: f64) -> bool {
        (0..3).all(|i| p[i] >= wdist && p[i] <= self.dims[i] - wdist)
    }
}

/// Rejection-sampler settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneCfg {
    /// Minimum distance of every mic and the source to every wall.
    pub wall_clearance: f64,
    /// Candidates drawn before giving up with `PlacementTimeout`.
    pub max_attempts: usize,
    /// Run the DOA post-condition after sampling and log mismatches.
    pub verify_doa: bool,
}

impl Default for SceneCfg {
    fn default() -> Self {
        Self {
            wall_clearance: 1.0,
            max_attempts: 10_000,
            verify_doa: false,
        }
    }
}

impl SceneCfg {
    pub fn validate(&self) -> SceneResult<()> {
        if !self.wall_clearance.is_finite() || self.wall_clearance < 0.0 {
            return Err(SceneError::invalid(format!(
                "wall clearance must be finite and >= 0, got {}",
                self.wall_clearance
            )));
        }
        if self.max_attempts == 0 {
            return Err(SceneError::invalid("max_attempts must be > 0"));
        }
        Ok(())
    }
}

/// Global rotation applied to the array and source offsets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    /// Unit axis.
    pub axis: Vector3<f64>,
    /// Angle in `[0, 2π)`.
    pub angle: f64,
}

/// A validated placement.
///
/// Invariants:
/// - every entry of `mics` and `source` satisfies the wall clearance used to
///   sample it;
/// - `source_direction` is the unit, unrotated source offset (array frame).
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub room: Room,
    pub center: Vector3<f64>,
    pub rotation: Rotation,
    pub mics: Vec<Vector3<f64>>,
    pub source: Vector3<f64>,
    pub source_direction: Vector3<f64>,
    /// Number of candidates drawn, including the accepted one.
    pub attempts: usize,
}

impl Scene {
    /// Source position relative to the array center, in room coordinates.
    #[inline]
    pub fn rotated_source_offset(&self) -> Vector3<f64> {
        self.source - self.center
    }

    /// Microphone positions relative to the array center, in room coordinates.
    pub fn mic_offsets(&self) -> Vec<Vector3<f64>> {
        self.mics.iter().map(|m| m - self.center).collect()
    }

    /// Angle between the first→last microphone axis and the source offset.
    pub fn doa_angle(&self) -> SceneResult<f64> {
        let (first, last) = match (self.mics.first(), self.mics.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(SceneError::invalid("scene has no microphones")),
        };
        let axis = (last - first)
            .try_normalize(1e-12)
            .ok_or_else(|| SceneError::invalid("first and last microphone coincide"))?;
        let src = self
            .rotated_source_offset()
            .try_normalize(1e-12)
            .ok_or_else(|| SceneError::invalid("source coincides with array center"))?;
        Ok(axis.dot(&src).clamp(-1.0, 1.0).acos())
    }

    /// DOA post-condition: measured angle must match `expected` within `tol`.
    pub fn check_doa(&self, expected: f64, tol: f64) -> SceneResult<f64> {
        let measured = self.doa_angle()?;
        if (measured - expected).abs() > tol {
            return Err(SceneError::DoaMismatch { expected, measured });
        }
        Ok(measured)
    }
}
