//! Rejection sampling of array and source placements inside a room.
//!
//! Model
//! - Draw an array center uniformly in the room shrunk by the wall clearance,
//!   draw an isotropic rotation (normal axis, uniform angle), rotate the base
//!   offsets and the source offset, translate, and keep the candidate only if
//!   every point respects the clearance.
//! - The loop is bounded by `SceneCfg::max_attempts`; exhaustion is reported
//!   as `SceneError::PlacementTimeout`.
//! - Rooms that cannot contain any point at the requested clearance are
//!   rejected when the sampler is built, before any draw.

mod types;

pub use types::{Room, Rotation, Scene, SceneCfg, DOA_TOLERANCE};

use crate::error::{SceneError, SceneResult};
use crate::quat::{random_rotation_axis, Quaternion};
use crate::sphere::{direction_vector, Direction};
use nalgebra::Vector3;
use rand::Rng;
use std::f64::consts::TAU;

/// Source offset for a requested DOA: `(1,0,0)` tilted by `elevation` about
/// `−y` (positive elevation points up), turned by `azimuth` about `+z`, and
/// scaled to `distance`.
pub fn source_offset(distance: f64, azimuth: f64, elevation: f64) -> SceneResult<Vector3<f64>> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(SceneError::invalid(format!(
            "source-array distance must be finite and positive, got {distance}"
        )));
    }
    Ok(direction_vector(Vector3::x(), azimuth, elevation, -Vector3::y())? * distance)
}

/// Placement sampler for one room and clearance.
#[derive(Clone, Debug)]
pub struct SceneSampler {
    room: Room,
    cfg: SceneCfg,
    extent: Vector3<f64>,
}

impl SceneSampler {
    pub fn new(room: Room, cfg: SceneCfg) -> SceneResult<Self> {
        cfg.validate()?;
        let extent = room.dims().map(|d| d - 2.0 * cfg.wall_clearance);
        if extent.iter().any(|e| *e <= 0.0) {
            return Err(SceneError::InvalidRoomGeometry {
                dims: room.as_array(),
                wall_clearance: cfg.wall_clearance,
            });
        }
        Ok(Self { room, cfg, extent })
    }

    #[inline]
    pub fn room(&self) -> &Room {
        &self.room
    }

    #[inline]
    pub fn cfg(&self) -> &SceneCfg {
        &self.cfg
    }

    /// Uniform point in the shrunken room.
    fn sample_center<R: Rng>(&self, rng: &mut R) -> Vector3<f64> {
        let w = self.cfg.wall_clearance;
        Vector3::new(
            w + rng.gen::<f64>() * self.extent.x,
            w + rng.gen::<f64>() * self.extent.y,
            w + rng.gen::<f64>() * self.extent.z,
        )
    }

    /// Draw candidates until one satisfies the wall clearance.
    pub fn sample<R: Rng>(
        &self,
        offsets: &[Vector3<f64>],
        source_offset: Vector3<f64>,
        rng: &mut R,
    ) -> SceneResult<Scene> {
        if offsets.is_empty() {
            return Err(SceneError::invalid("array offsets are empty"));
        }
        let source_direction = source_offset
            .try_normalize(1e-12)
            .ok_or_else(|| SceneError::invalid("source offset must be non-zero"))?;
        let w = self.cfg.wall_clearance;

        for attempt in 1..=self.cfg.max_attempts {
            let center = self.sample_center(rng);
            let axis = random_rotation_axis(rng);
            let angle = rng.gen::<f64>() * TAU;
            let q = Quaternion::from_axis_angle(axis, angle)?;

            let source = center + q.rotate_vector(source_offset);
            if !self.room.contains_with_clearance(&source, w) {
                tracing::trace!(attempt, "source outside clearance");
                continue;
            }
            let mics: Vec<Vector3<f64>> = offsets
                .iter()
                .map(|o| center + q.rotate_vector(*o))
                .collect();
            if !mics
                .iter()
                .all(|m| self.room.contains_with_clearance(m, w))
            {
                tracing::trace!(attempt, "microphone outside clearance");
                continue;
            }

            tracing::debug!(attempts = attempt, "placement accepted");
            return Ok(Scene {
                room: self.room,
                center,
                rotation: Rotation { axis, angle },
                mics,
                source,
                source_direction,
                attempts: attempt,
            });
        }
        Err(SceneError::PlacementTimeout {
            attempts: self.cfg.max_attempts,
        })
    }

    /// Sample a scene for a requested direction of arrival.
    ///
    /// With `verify_doa` set, the DOA post-condition is evaluated against the
    /// requested azimuth and a mismatch is logged; the scene is returned
    /// either way.
    pub fn sample_doa<R: Rng>(
        &self,
        offsets: &[Vector3<f64>],
        distance: f64,
        direction: Direction,
        rng: &mut R,
    ) -> SceneResult<Scene> {
        let src = source_offset(distance, direction.azimuth, direction.elevation)?;
        let scene = self.sample(offsets, src, rng)?;
        if self.cfg.verify_doa {
            if let Err(err) = scene.check_doa(direction.azimuth, DOA_TOLERANCE) {
                tracing::warn!(
                    azimuth = direction.azimuth,
                    elevation = direction.elevation,
                    %err,
                    "DOA post-condition failed"
                );
            }
        }
        Ok(scene)
    }
}
