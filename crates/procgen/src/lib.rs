//! Procedural generation for the lander scene: terrain, pads, the vehicle and
//! the exhaust glow sprite. Everything here is CPU data; the renderer uploads it.

pub mod glow;
pub mod mesh;
pub mod pad;
pub mod terrain;
pub mod vehicle;

pub use glow::*;
pub use mesh::*;
pub use pad::*;
pub use terrain::*;
pub use vehicle::*;
