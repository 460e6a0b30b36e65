mod component;
mod render;
mod simulation;
mod state;

pub use component::ForceGraphCanvas;
pub use render::{Frame, Primitive, build_frame};
pub use simulation::{Particle, Simulation};
pub use state::ForceGraphState;
