//! Per-microphone impulse responses from an external simulator.
//!
//! The simulator itself (image-source synthesis) lives outside this crate and
//! is reached through `ImpulseResponseSimulator`. For every microphone of a
//! validated scene it is called twice: once for the full reflection order and
//! once for the direct path only. Responses are stacked column-wise, so the
//! microphone axis is the trailing one.

use crate::error::{SceneError, SceneResult};
use crate::scene::Scene;
use nalgebra::{DMatrix, DVector, Vector3};

/// Reflection order passed to the simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReflectionOrder {
    /// Every reflection the simulator can produce.
    All,
    /// Line-of-sight component only.
    Direct,
}

impl ReflectionOrder {
    /// Integer form used by image-source simulators (`-1` = unlimited).
    pub fn as_order(self) -> i32 {
        match self {
            Self::All => -1,
            Self::Direct => 0,
        }
    }
}

/// Physical and sampling parameters shared by all calls of one request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcousticParams {
    /// Speed of sound in m/s.
    pub speed_of_sound: f64,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// T60 in seconds.
    pub reverberation_time: f64,
}

impl Default for AcousticParams {
    fn default() -> Self {
        Self {
            speed_of_sound: 343.0,
            sample_rate: 16_000.0,
            reverberation_time: 0.38,
        }
    }
}

impl AcousticParams {
    pub fn validate(&self) -> SceneResult<()> {
        for (name, v) in [
            ("speed_of_sound", self.speed_of_sound),
            ("sample_rate", self.sample_rate),
            ("reverberation_time", self.reverberation_time),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SceneError::invalid(format!(
                    "{name} must be finite and positive, got {v}"
                )));
            }
        }
        if self.sample_count() == 0 {
            return Err(SceneError::invalid(
                "reverberation_time * sample_rate rounds down to zero samples",
            ));
        }
        Ok(())
    }

    /// Response length: `T60 · rate`, truncated.
    #[inline]
    pub fn sample_count(&self) -> usize {
        (self.reverberation_time * self.sample_rate) as usize
    }
}

/// One simulator call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimRequest {
    pub speed_of_sound: f64,
    pub sample_rate: f64,
    pub receiver: Vector3<f64>,
    pub source: Vector3<f64>,
    pub room: Vector3<f64>,
    pub reverberation_time: f64,
    pub sample_count: usize,
    pub order: ReflectionOrder,
}

/// External impulse-response generator.
pub trait ImpulseResponseSimulator {
    /// Must return exactly `request.sample_count` samples.
    fn generate(&self, request: &SimRequest) -> SceneResult<Vec<f64>>;
}

impl<F> ImpulseResponseSimulator for F
where
    F: Fn(&SimRequest) -> SceneResult<Vec<f64>>,
{
    fn generate(&self, request: &SimRequest) -> SceneResult<Vec<f64>> {
        self(request)
    }
}

/// Full-order and direct-path responses, `sample_count × num_mics` each.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseSet {
    pub full: DMatrix<f64>,
    pub direct: DMatrix<f64>,
}

impl ResponseSet {
    #[inline]
    pub fn num_mics(&self) -> usize {
        self.full.ncols()
    }

    #[inline]
    pub fn sample_count(&self) -> usize {
        self.full.nrows()
    }
}

fn call<S: ImpulseResponseSimulator + ?Sized>(
    sim: &S,
    request: &SimRequest,
) -> SceneResult<DVector<f64>> {
    let samples = sim.generate(request)?;
    if samples.len() != request.sample_count {
        return Err(SceneError::SimulatorOutput {
            expected: request.sample_count,
            actual: samples.len(),
        });
    }
    Ok(DVector::from_vec(samples))
}

/// Run the simulator for every microphone of `scene`, in array order.
pub fn generate_responses<S: ImpulseResponseSimulator + ?Sized>(
    sim: &S,
    scene: &Scene,
    params: &AcousticParams,
) -> SceneResult<ResponseSet> {
    params.validate()?;
    if scene.mics.is_empty() {
        return Err(SceneError::invalid("scene has no microphones"));
    }
    let sample_count = params.sample_count();
    let mut full = Vec::with_capacity(scene.mics.len());
    let mut direct = Vec::with_capacity(scene.mics.len());
    for (idx, mic) in scene.mics.iter().enumerate() {
        let mut request = SimRequest {
            speed_of_sound: params.speed_of_sound,
            sample_rate: params.sample_rate,
            receiver: *mic,
            source: scene.source,
            room: scene.room.dims(),
            reverberation_time: params.reverberation_time,
            sample_count,
            order: ReflectionOrder::All,
        };
        full.push(call(sim, &request)?);
        request.order = ReflectionOrder::Direct;
        direct.push(call(sim, &request)?);
        tracing::trace!(mic = idx, sample_count, "responses generated");
    }
    Ok(ResponseSet {
        full: DMatrix::from_columns(&full),
        direct: DMatrix::from_columns(&direct),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::linear;
    use crate::scene::{source_offset, Room, SceneCfg, SceneSampler};
    use rand::{rngs::StdRng, SeedableRng};
    use std::cell::RefCell;

    /// Records every request and answers with a decaying spike at the
    /// direct-path delay.
    struct RecordingSim {
        calls: RefCell<Vec<SimRequest>>,
    }

    impl ImpulseResponseSimulator for RecordingSim {
        fn generate(&self, request: &SimRequest) -> SceneResult<Vec<f64>> {
            self.calls.borrow_mut().push(*request);
            let dist = (request.receiver - request.source).norm();
            let delay = (dist / request.speed_of_sound * request.sample_rate) as usize;
            let mut out = vec![0.0; request.sample_count];
            if delay < out.len() {
                out[delay] = 1.0 / dist;
            }
            if request.order == ReflectionOrder::All {
                for (i, v) in out.iter_mut().enumerate().skip(delay + 1) {
                    *v += 1e-3 * (-(i as f64) / 400.0).exp();
                }
            }
            Ok(out)
        }
    }

    fn scene() -> Scene {
        let sampler =
            SceneSampler::new(Room::new(5.0, 7.0, 3.0).unwrap(), SceneCfg::default()).unwrap();
        let offs = linear(0.08, 4).unwrap();
        let src = source_offset(1.2, 0.0, 0.0).unwrap();
        sampler
            .sample(&offs, src, &mut StdRng::seed_from_u64(10))
            .unwrap()
    }

    #[test]
    fn two_calls_per_mic_in_array_order() {
        let scene = scene();
        let sim = RecordingSim {
            calls: RefCell::new(Vec::new()),
        };
        let params = AcousticParams {
            reverberation_time: 0.2,
            ..AcousticParams::default()
        };
        let set = generate_responses(&sim, &scene, &params).unwrap();
        assert_eq!(set.num_mics(), 4);
        assert_eq!(set.sample_count(), 3200);
        assert_eq!(set.direct.shape(), (3200, 4));

        let calls = sim.calls.borrow();
        assert_eq!(calls.len(), 8);
        for (i, pair) in calls.chunks(2).enumerate() {
            assert_eq!(pair[0].order.as_order(), -1);
            assert_eq!(pair[1].order.as_order(), 0);
            assert_eq!(pair[0].receiver, scene.mics[i]);
            assert_eq!(pair[1].receiver, scene.mics[i]);
            assert_eq!(pair[0].source, scene.source);
            assert_eq!(pair[0].room, Vector3::new(5.0, 7.0, 3.0));
            assert_eq!(pair[0].sample_count, 3200);
        }
        // Column i is microphone i; direct path carries no tail.
        for i in 0..4 {
            let tail_full: f64 = set.full.column(i).iter().skip(2000).sum();
            let tail_direct: f64 = set.direct.column(i).iter().skip(2000).sum();
            assert!(tail_full > 0.0);
            assert_eq!(tail_direct, 0.0);
        }
    }

    #[test]
    fn closures_act_as_simulators() {
        let scene = scene();
        let params = AcousticParams {
            sample_rate: 8_000.0,
            reverberation_time: 0.01,
            ..AcousticParams::default()
        };
        let sim = |r: &SimRequest| -> SceneResult<Vec<f64>> { Ok(vec![r.order.as_order() as f64; r.sample_count]) };
        let set = generate_responses(&sim, &scene, &params).unwrap();
        assert_eq!(set.full.shape(), (80, 4));
        assert!(set.full.iter().all(|v| *v == -1.0));
        assert!(set.direct.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn wrong_length_is_reported() {
        let scene = scene();
        let sim = |_: &SimRequest| -> SceneResult<Vec<f64>> { Ok(vec![0.0; 3]) };
        let err = generate_responses(&sim, &scene, &AcousticParams::default()).unwrap_err();
        assert_eq!(
            err,
            SceneError::SimulatorOutput {
                expected: 6080,
                actual: 3
            }
        );
    }

    #[test]
    fn simulator_errors_propagate() {
        let scene = scene();
        let sim = |_: &SimRequest| -> SceneResult<Vec<f64>> {
            Err(SceneError::Simulator("backend unavailable".into()))
        };
        assert!(matches!(
            generate_responses(&sim, &scene, &AcousticParams::default()),
            Err(SceneError::Simulator(_))
        ));
    }

    #[test]
    fn params_are_validated() {
        let scene = scene();
        let sim = |r: &SimRequest| -> SceneResult<Vec<f64>> { Ok(vec![0.0; r.sample_count]) };
        let bad = AcousticParams {
            reverberation_time: 0.0,
            ..AcousticParams::default()
        };
        assert!(generate_responses(&sim, &scene, &bad).is_err());
        let tiny = AcousticParams {
            reverberation_time: 1e-6,
            ..AcousticParams::default()
        };
        assert!(generate_responses(&sim, &scene, &tiny).is_err());
    }

    #[test]
    fn scene_without_mics_is_an_error() {
        let mut scene = scene();
        scene.mics.clear();
        let calls = RefCell::new(0usize);
        let sim = |r: &SimRequest| -> SceneResult<Vec<f64>> {
            *calls.borrow_mut() += 1;
            Ok(vec![0.0; r.sample_count])
        };
        assert!(matches!(
            generate_responses(&sim, &scene, &AcousticParams::default()),
            Err(SceneError::InvalidConfiguration(_))
        ));
        assert_eq!(*calls.borrow(), 0);
    }
}
