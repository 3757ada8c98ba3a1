//! Simulation core of the lander viewer: the scripted flight, camera rigs,
//! exhaust particles and the per-frame sequencing that ties them together.
//!
//! Nothing here talks to the GPU or the window. The viewer feeds in a frame
//! delta and [`Controls`], and receives a [`FrameOutput`] of transforms.

pub mod camera_rig;
pub mod exhaust;
pub mod frame;
pub mod path;
pub mod scene;

pub use camera_rig::*;
pub use exhaust::*;
pub use frame::*;
pub use path::*;
pub use scene::*;
