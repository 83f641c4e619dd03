use crate::config::GenerationCfg;
use anyhow::{bail, Context, Result};
use polars::prelude::*;
use rirscene::dataset::{DoaScene, ReplayToken};
use rirscene::prelude::Vector3;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

#[inline]
fn arr3(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// One scene as written to the manifest.
#[derive(Debug, Serialize)]
pub struct SceneEntry {
    pub index: usize,
    pub azimuth: f64,
    pub elevation: f64,
    pub replay: ReplayToken,
    pub attempts: usize,
    pub center: [f64; 3],
    pub rotation_axis: [f64; 3],
    pub rotation_angle: f64,
    pub mics: Vec<[f64; 3]>,
    pub source: [f64; 3],
    pub source_direction: [f64; 3],
}

impl From<&DoaScene> for SceneEntry {
    fn from(d: &DoaScene) -> Self {
        let s = &d.scene;
        Self {
            index: d.index,
            azimuth: d.direction.azimuth,
            elevation: d.direction.elevation,
            replay: d.replay,
            attempts: s.attempts,
            center: arr3(&s.center),
            rotation_axis: arr3(&s.rotation.axis),
            rotation_angle: s.rotation.angle,
            mics: s.mics.iter().map(arr3).collect(),
            source: arr3(&s.source),
            source_direction: arr3(&s.source_direction),
        }
    }
}

/// Scene manifest: configuration, seed and every sampled scene.
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub version: &'static str,
    pub seed: u64,
    pub config: &'a GenerationCfg,
    pub scenes: Vec<SceneEntry>,
}

impl<'a> Manifest<'a> {
    pub fn new(config: &'a GenerationCfg, seed: u64, scenes: &[DoaScene]) -> Self {
        Self {
            version: rirscene::VERSION,
            seed,
            config,
            scenes: scenes.iter().map(SceneEntry::from).collect(),
        }
    }
}

pub fn write_manifest(path: &Path, manifest: &Manifest<'_>) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_vec_pretty(manifest)?)
        .with_context(|| format!("writing {}", path.display()))
}

/// Flat per-microphone table: one row per (DOA, mic).
pub fn scene_table(scenes: &[DoaScene]) -> PolarsResult<DataFrame> {
    let rows: usize = scenes.iter().map(|d| d.scene.mics.len()).sum();
    let mut doa_index = Vec::with_capacity(rows);
    let mut mic_index = Vec::with_capacity(rows);
    let mut azimuth = Vec::with_capacity(rows);
    let mut elevation = Vec::with_capacity(rows);
    let (mut mic_x, mut mic_y, mut mic_z) = (
        Vec::with_capacity(rows),
        Vec::with_capacity(rows),
        Vec::with_capacity(rows),
    );
    let (mut src_x, mut src_y, mut src_z) = (
        Vec::with_capacity(rows),
        Vec::with_capacity(rows),
        Vec::with_capacity(rows),
    );
    for d in scenes {
        for (m, mic) in d.scene.mics.iter().enumerate() {
            doa_index.push(d.index as u32);
            mic_index.push(m as u32);
            azimuth.push(d.direction.azimuth);
            elevation.push(d.direction.elevation);
            mic_x.push(mic.x);
            mic_y.push(mic.y);
            mic_z.push(mic.z);
            src_x.push(d.scene.source.x);
            src_y.push(d.scene.source.y);
            src_z.push(d.scene.source.z);
        }
    }
    df!(
        "doa_index" => doa_index,
        "mic_index" => mic_index,
        "azimuth" => azimuth,
        "elevation" => elevation,
        "mic_x" => mic_x,
        "mic_y" => mic_y,
        "mic_z" => mic_z,
        "src_x" => src_x,
        "src_y" => src_y,
        "src_z" => src_z,
    )
}

/// Write the scene table as CSV or Parquet, chosen by extension.
pub fn write_table(path: &Path, scenes: &[DoaScene]) -> Result<()> {
    let mut df = scene_table(scenes)?;
    ensure_parent(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match ext.as_deref() {
        Some("csv") => CsvWriter::new(&mut file).finish(&mut df)?,
        Some("parquet") => {
            ParquetWriter::new(&mut file).finish(&mut df)?;
        }
        _ => bail!(
            "unsupported table extension for {} (use .csv or .parquet)",
            path.display()
        ),
    }
    tracing::info!(rows = df.height(), path = %path.display(), "table written");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating dir {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rirscene::array::ArrayTopology;
    use rirscene::dataset::generate_scenes;
    use tempfile::tempdir;

    fn cfg() -> GenerationCfg {
        GenerationCfg {
            room: [5.0, 7.0, 3.0],
            array_type: ArrayTopology::Linear,
            num_mics: 4,
            dmic: 0.08,
            source_array_dist: 1.2,
            wdist: 1.0,
            doa_count: 5,
            max_attempts: 10_000,
            verify_doa: false,
            seed: Some(3),
        }
    }

    #[test]
    fn table_has_one_row_per_mic() {
        let scenes = generate_scenes(cfg().to_request().unwrap(), 3).unwrap();
        let df = scene_table(&scenes).unwrap();
        assert_eq!(df.height(), 20);
        assert_eq!(df.width(), 10);
    }

    #[test]
    fn manifest_and_csv_are_written() {
        let dir = tempdir().unwrap();
        let cfg = cfg();
        let scenes = generate_scenes(cfg.to_request().unwrap(), 3).unwrap();
        let manifest_path = dir.path().join("out/scenes.json");
        write_manifest(&manifest_path, &Manifest::new(&cfg, 3, &scenes)).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(&fs::read(&manifest_path).unwrap()).unwrap();
        assert_eq!(parsed["seed"], 3);
        assert_eq!(parsed["config"]["array_type"], "ULA");
        assert_eq!(parsed["scenes"].as_array().unwrap().len(), 5);
        assert_eq!(parsed["scenes"][0]["mics"].as_array().unwrap().len(), 4);

        let csv_path = dir.path().join("out/scenes.csv");
        write_table(&csv_path, &scenes).unwrap();
        let text = fs::read_to_string(&csv_path).unwrap();
        assert!(text.starts_with("doa_index,mic_index,azimuth"));
        assert_eq!(text.lines().count(), 21);
    }

    #[test]
    fn unknown_table_extension_fails() {
        let dir = tempdir().unwrap();
        let scenes = generate_scenes(cfg().to_request().unwrap(), 3).unwrap();
        assert!(write_table(&dir.path().join("scenes.xlsx"), &scenes).is_err());
    }
}
