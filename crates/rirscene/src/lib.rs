//! Randomized acoustic-scene geometry for room-impulse-response datasets.
//!
//! A microphone array (linear, circular or spherical) and a sound source at a
//! requested direction of arrival are placed inside a shoebox room by
//! rejection sampling: uniform array center, isotropic random rotation,
//! wall-clearance check. The validated scene is what an external
//! image-source simulator consumes.
//!
//! Layout (leaves first)
//! - `quat`: quaternion product, conjugate, axis-angle rotation, random axes.
//! - `sphere`: spiral and stochastic sphere/hemisphere sampling.
//! - `platonic`: exact vertex sets for 4/6/8/12/20 microphones.
//! - `array`: array topologies and their DOA grids.
//! - `scene`: room, sampler, validated scene, DOA post-condition.
//! - `response`: simulator trait and per-microphone response collection.
//! - `dataset`: one generation request end to end, with replay tokens.
//!
//! Randomness is always passed in explicitly; seed a `StdRng` for
//! reproducible output.

pub mod array;
pub mod dataset;
pub mod error;
pub mod platonic;
pub mod quat;
pub mod response;
pub mod scene;
pub mod sphere;

pub use error::{SceneError, SceneResult};

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for callers.
pub mod prelude {
    pub use crate::array::{circular, linear, spherical, ArrayTopology};
    pub use crate::dataset::{
        generate_record, generate_scenes, regenerate_scene, DoaScene, GenerationRequest,
        ReplayToken, RirRecord, ScenePlan,
    };
    pub use crate::error::{SceneError, SceneResult};
    pub use crate::platonic::{is_platonic_number, PlatonicSolid};
    pub use crate::quat::{random_rotation_axis, rotate, Quaternion};
    pub use crate::response::{
        generate_responses, AcousticParams, ImpulseResponseSimulator, ReflectionOrder,
        ResponseSet, SimRequest,
    };
    pub use crate::scene::{
        source_offset, Room, Rotation, Scene, SceneCfg, SceneSampler, DOA_TOLERANCE,
    };
    pub use crate::sphere::{
        sample_hemisphere_geometric, sample_hemisphere_stochastic, sample_sphere_geometric,
        sample_sphere_stochastic, sample_sphere_stochastic_cylindrical, Direction,
    };
    pub use nalgebra::Vector3;
}
