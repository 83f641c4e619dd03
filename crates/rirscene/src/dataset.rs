//! One generation request: a DOA grid turned into validated scenes.
//!
//! Purpose
//! - Combine the array builder, the per-topology DOA grid and the scene
//!   sampler for a single (room, array, distance) configuration.
//! - Make every scene replayable on its own: scene `i` draws from an RNG
//!   seeded by the replay token `(seed, i)`, so regenerating one DOA does not
//!   require replaying the others.
//! - Optionally run the external simulator and assemble the output record
//!   (stacked responses, array size, per-direction unit vectors).

use crate::array::ArrayTopology;
use crate::error::{SceneError, SceneResult};
use crate::response::{generate_responses, AcousticParams, ImpulseResponseSimulator};
use crate::scene::{Room, Scene, SceneCfg, SceneSampler};
use crate::sphere::Direction;
use nalgebra::{DMatrix, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Replay token `(seed, index)` for one DOA scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn to_std_rng(self) -> StdRng {
        // SplitMix64 finalizer.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Static parameters of one request.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub room: Room,
    pub topology: ArrayTopology,
    pub num_mics: usize,
    /// Inter-mic spacing (ULA) or radius (CUA, SUA), meters.
    pub size: f64,
    /// Source to array-center distance, meters.
    pub source_distance: f64,
    /// Requested number of DOA grid points.
    pub doa_count: usize,
    pub scene: SceneCfg,
}

impl GenerationRequest {
    /// Scalar preconditions, checked before any geometry is built.
    pub fn validate(&self) -> SceneResult<()> {
        if self.num_mics == 0 {
            return Err(SceneError::invalid("num_mics must be > 0"));
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(SceneError::invalid(format!(
                "array size must be finite and positive, got {}",
                self.size
            )));
        }
        if !self.source_distance.is_finite() || self.source_distance <= 0.0 {
            return Err(SceneError::invalid(format!(
                "source distance must be finite and positive, got {}",
                self.source_distance
            )));
        }
        if self.doa_count == 0 {
            return Err(SceneError::invalid("doa_count must be > 0"));
        }
        self.scene.validate()
    }
}

/// Request with offsets, grid and sampler resolved once.
#[derive(Clone, Debug)]
pub struct ScenePlan {
    request: GenerationRequest,
    offsets: Vec<Vector3<f64>>,
    grid: Vec<Direction>,
    sampler: SceneSampler,
}

/// A scene together with the DOA it was sampled for.
#[derive(Clone, Debug, PartialEq)]
pub struct DoaScene {
    pub index: usize,
    pub direction: Direction,
    pub replay: ReplayToken,
    pub scene: Scene,
}

impl ScenePlan {
    pub fn new(request: GenerationRequest) -> SceneResult<Self> {
        request.validate()?;
        let offsets = request.topology.offsets(request.size, request.num_mics)?;
        let grid = request.topology.doa_grid(request.doa_count)?;
        let sampler = SceneSampler::new(request.room, request.scene)?;
        Ok(Self {
            request,
            offsets,
            grid,
            sampler,
        })
    }

    #[inline]
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// Base (unrotated) microphone offsets.
    #[inline]
    pub fn offsets(&self) -> &[Vector3<f64>] {
        &self.offsets
    }

    #[inline]
    pub fn grid(&self) -> &[Direction] {
        &self.grid
    }

    /// Sample (or resample) the scene behind `replay`.
    pub fn scene(&self, replay: ReplayToken) -> SceneResult<DoaScene> {
        let index = usize::try_from(replay.index)
            .ok()
            .filter(|i| *i < self.grid.len())
            .ok_or_else(|| {
                SceneError::invalid(format!(
                    "DOA index {} out of range (grid has {} points)",
                    replay.index,
                    self.grid.len()
                ))
            })?;
        let direction = self.grid[index];
        let mut rng = replay.to_std_rng();
        let scene = self.sampler.sample_doa(
            &self.offsets,
            self.request.source_distance,
            direction,
            &mut rng,
        )?;
        tracing::info!(
            index,
            azimuth = direction.azimuth,
            elevation = direction.elevation,
            attempts = scene.attempts,
            "scene sampled"
        );
        Ok(DoaScene {
            index,
            direction,
            replay,
            scene,
        })
    }

    /// One scene per grid point, in grid order.
    pub fn scenes(&self, seed: u64) -> SceneResult<Vec<DoaScene>> {
        (0..self.grid.len())
            .map(|i| {
                self.scene(ReplayToken {
                    seed,
                    index: i as u64,
                })
            })
            .collect()
    }
}

/// Sample every DOA scene of `request`.
pub fn generate_scenes(request: GenerationRequest, seed: u64) -> SceneResult<Vec<DoaScene>> {
    ScenePlan::new(request)?.scenes(seed)
}

/// Rebuild a single scene from its replay token.
pub fn regenerate_scene(request: GenerationRequest, replay: ReplayToken) -> SceneResult<DoaScene> {
    ScenePlan::new(request)?.scene(replay)
}

/// Output record handed to the persistence layer.
#[derive(Clone, Debug, PartialEq)]
pub struct RirRecord {
    /// Full-order responses, one `samples × mics` matrix per DOA.
    pub rir: Vec<DMatrix<f64>>,
    /// Direct-path responses, same layout.
    pub direct_rir: Vec<DMatrix<f64>>,
    /// Array spacing or radius.
    pub dist: f64,
    /// Unit source directions (array frame), one per DOA.
    pub vecs: Vec<Vector3<f64>>,
}

/// Sample every DOA scene and run the simulator on each.
pub fn generate_record<S: ImpulseResponseSimulator + ?Sized>(
    request: GenerationRequest,
    params: &AcousticParams,
    sim: &S,
    seed: u64,
) -> SceneResult<RirRecord> {
    params.validate()?;
    let dist = request.size;
    let scenes = generate_scenes(request, seed)?;
    let mut record = RirRecord {
        rir: Vec::with_capacity(scenes.len()),
        direct_rir: Vec::with_capacity(scenes.len()),
        dist,
        vecs: Vec::with_capacity(scenes.len()),
    };
    for doa in &scenes {
        let set = generate_responses(sim, &doa.scene, params)?;
        record.rir.push(set.full);
        record.direct_rir.push(set.direct);
        record.vecs.push(doa.scene.source_direction);
    }
    Ok(record)
}
