//! Boids flocking for a decorative 3D bird swarm.
//!
//! A [`Flock`] owns its [`Agent`]s and a [`Boundary`] box. The host calls
//! [`Flock::tick`] once per animation frame and reads positions and orientations back
//! for drawing; rendering itself lives outside this crate.

pub mod boundary;
pub mod engine;
pub mod error;
pub mod flock;

pub mod algorithms {
    pub mod flocking;
}

pub mod models {
    pub mod agent;
}

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use algorithms::flocking::AgentParams;
pub use boundary::{Boundary, BoundaryConfig};
pub use engine::Engine;
pub use error::FlockError;
pub use flock::{AgentSnapshot, Flock, FlockConfig, UpdateOrder};
pub use models::agent::{Agent, Neighbor};
