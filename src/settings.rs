//! Game settings
//!
//! Loaded once at startup from an optional JSON file. Every field has a
//! default, so a partial file only overrides what it names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Post-processing toggles exposed for debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EffectSettings {
    /// Invert and flip the composited scene
    pub confuse: bool,
    /// Edge-detect and swirl the composited scene
    pub chaos: bool,
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Window ===
    pub width: u32,
    pub height: u32,
    pub title: String,

    // === Rules ===
    /// Score that ends a match
    pub winning_score: u32,
    pub paddle_size: [f32; 2],
    pub paddle_velocity: f32,
    pub ball_radius: f32,
    pub ball_velocity: [f32; 2],

    // === Rendering ===
    /// Multisample count for the offscreen scene target
    pub msaa_samples: u32,
    pub particle_count: usize,
    /// Directory holding the `.vert.wgsl` / `.frag.wgsl` programs
    pub shader_dir: PathBuf,
    pub font_path: PathBuf,
    /// Glyph rasterization size in pixels
    pub font_size: f32,
    pub effects: EffectSettings,

    /// Seed for particle jitter
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
            title: "Pong".to_string(),

            winning_score: MAX_SCORE,
            paddle_size: [PADDLE_WIDTH, PADDLE_HEIGHT],
            paddle_velocity: PADDLE_VELOCITY,
            ball_radius: BALL_RADIUS,
            ball_velocity: [BALL_VELOCITY_X, BALL_VELOCITY_Y],

            msaa_samples: 4,
            particle_count: PARTICLE_COUNT,
            shader_dir: PathBuf::from("shaders"),
            font_path: PathBuf::from("assets/fonts/DejaVuSans-Bold.ttf"),
            font_size: 48.0,
            effects: EffectSettings::default(),

            seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults on any failure
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Malformed settings {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read settings {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Path of a named program stage, e.g. `shader_path("sprite", "vert")`
    pub fn shader_path(&self, name: &str, stage: &str) -> PathBuf {
        self.shader_dir.join(format!("{name}.{stage}.wgsl"))
    }
}
