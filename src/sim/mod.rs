//! Pure simulation module
//!
//! All gameplay logic lives here. This module has no rendering or platform
//! dependencies:
//! - Variable timestep supplied by the caller
//! - Seeded RNG only
//! - Stable iteration order (particles by pool slot)

pub mod court;
pub mod object;
pub mod particles;
pub mod state;

pub use court::{Controls, Court, CourtConfig, CourtEvent};
pub use object::{BallObject, GameObject, aabb_overlap};
pub use particles::{Particle, ParticlePool};
pub use state::{GameState, Player, Scoreboard};
