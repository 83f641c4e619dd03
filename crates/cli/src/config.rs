use anyhow::{ensure, Context, Result};
use rirscene::array::ArrayTopology;
use rirscene::dataset::GenerationRequest;
use rirscene::scene::{Room, SceneCfg};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// JSON configuration for one generation run.
///
/// Field names follow the parameter files used by the dataset scripts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationCfg {
    /// Room dimensions `[x, y, z]` in meters.
    pub room: [f64; 3],
    /// `ULA`, `CUA` or `SUA`.
    pub array_type: ArrayTopology,
    pub num_mics: usize,
    /// Inter-mic spacing (ULA) or radius (CUA, SUA).
    pub dmic: f64,
    pub source_array_dist: f64,
    #[serde(default = "default_wdist")]
    pub wdist: f64,
    #[serde(default = "default_doa_count")]
    pub doa_count: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default)]
    pub verify_doa: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_wdist() -> f64 {
    SceneCfg::default().wall_clearance
}

fn default_doa_count() -> usize {
    37
}

fn default_max_attempts() -> usize {
    SceneCfg::default().max_attempts
}

impl GenerationCfg {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let cfg: Self = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        ensure!(cfg.num_mics > 0, "num_mics must be > 0");
        Ok(cfg)
    }

    pub fn to_request(&self) -> Result<GenerationRequest> {
        let room = Room::from_dims(self.room).context("room dimensions")?;
        Ok(GenerationRequest {
            room,
            topology: self.array_type,
            num_mics: self.num_mics,
            size: self.dmic,
            source_distance: self.source_array_dist,
            doa_count: self.doa_count,
            scene: SceneCfg {
                wall_clearance: self.wdist,
                max_attempts: self.max_attempts,
                verify_doa: self.verify_doa,
            },
        })
    }
}
