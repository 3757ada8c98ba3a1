//! wgpu rendering for the lander viewer: lit meshes, additive exhaust and a flat UI overlay.

pub mod camera;
pub mod lighting;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod texture;
pub mod vertex;

pub use camera::*;
pub use lighting::*;
pub use mesh::*;
pub use pipeline::*;
pub use renderer::*;
pub use texture::*;
pub use vertex::*;
