//! Sweep the DOA grid of one array and print where each scene landed.
//!
//! Usage:
//!   cargo run -p rirscene --example doa_sweep -- ULA
//!   cargo run -p rirscene --example doa_sweep -- SUA
//!
//! A toy direct-path simulator (single delayed impulse) stands in for a real
//! image-source generator so the response shapes can be checked too.

use rirscene::prelude::*;

fn toy_simulator(r: &SimRequest) -> SceneResult<Vec<f64>> {
    let mut out = vec![0.0; r.sample_count];
    let delay = (r.receiver - r.source).norm() / r.speed_of_sound * r.sample_rate;
    let k = delay.round() as usize;
    if k < out.len() {
        out[k] = 1.0;
    }
    Ok(out)
}

fn main() -> SceneResult<()> {
    let topology: ArrayTopology = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ULA".to_string())
        .parse()?;
    let request = GenerationRequest {
        room: Room::new(5.0, 7.0, 3.0)?,
        topology,
        num_mics: 4,
        size: 0.08,
        source_distance: 1.2,
        doa_count: 9,
        scene: SceneCfg::default(),
    };
    let plan = ScenePlan::new(request.clone())?;
    for doa in plan.scenes(2024)? {
        let s = &doa.scene;
        println!(
            "doa {:>2}: az={:+.3} el={:+.3} attempts={:>3} center=({:.2}, {:.2}, {:.2}) doa_angle={:.4}",
            doa.index,
            doa.direction.azimuth,
            doa.direction.elevation,
            s.attempts,
            s.center.x,
            s.center.y,
            s.center.z,
            s.doa_angle()?,
        );
    }

    let params = AcousticParams {
        reverberation_time: 0.05,
        ..AcousticParams::default()
    };
    let record = generate_record(request, &params, &toy_simulator, 2024)?;
    println!(
        "record: {} DOAs, response shape {:?}, dist={}",
        record.rir.len(),
        record.rir.first().map(|m| m.shape()),
        record.dist
    );
    Ok(())
}
