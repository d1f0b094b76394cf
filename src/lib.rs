//! Pong FX - two-player Pong with particles, bitmap text and post-processing
//!
//! Core modules:
//! - `sim`: Pure simulation (objects, collisions, particles, game state machine)
//! - `renderer`: wgpu render paths (sprites, particles, text, post-processing)
//! - `resources`: Named shader program registry
//! - `input`: Keyboard state with edge detection
//! - `game`: Glue between simulation, input and renderers
//! - `settings`: Data-driven configuration
//! - `clock`: Frame timing

pub mod clock;
pub mod game;
pub mod input;
pub mod renderer;
pub mod resources;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Window dimensions
    pub const WINDOW_WIDTH: u32 = 800;
    pub const WINDOW_HEIGHT: u32 = 600;

    /// First player to reach this score wins
    pub const MAX_SCORE: u32 = 10;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 20.0;
    pub const PADDLE_HEIGHT: f32 = 100.0;
    /// Paddle speed in pixels/s
    pub const PADDLE_VELOCITY: f32 = 500.0;
    /// Gap between a paddle and its side of the court
    pub const PADDLE_MARGIN: f32 = 10.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    pub const BALL_VELOCITY_X: f32 = 450.0;
    pub const BALL_VELOCITY_Y: f32 = 300.0;

    /// Particle pool size
    pub const PARTICLE_COUNT: usize = 50;
    /// Particles spawned per frame behind the ball
    pub const PARTICLES_PER_FRAME: usize = 1;
    /// Rendered particle quad size in pixels
    pub const PARTICLE_SCALE: f32 = 10.0;

    /// Screen shake duration after a paddle hit (seconds)
    pub const SHAKE_DURATION: f32 = 0.1;

    /// Scene clear color
    pub const CLEAR_COLOR: [f64; 3] = [0.2, 0.2, 0.2];
}
