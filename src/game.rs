//! Game: glue between the court simulation, input and the render paths
//!
//! Frame order is `process_input` -> `update` -> `draw`. The court never
//! sees the GPU; the renderers never see the rules.

use glam::Vec3;

use crate::consts::PARTICLE_SCALE;
use crate::input::{Key, KeyboardState};
use crate::renderer::texture::{disc_pixels, glow_pixels};
use crate::renderer::{
    FontError, Gpu, ParticleRenderer, PostProcessor, SpriteRenderer, TextRenderer, Texture2D,
    TextureError, TextureOptions, screen_projection,
};
use crate::resources::{ResourceError, ResourceManager};
use crate::settings::Settings;
use crate::sim::{Controls, Court, CourtConfig, CourtEvent, GameState, Player, Scoreboard};

/// Programs loaded at startup, by name
pub const PROGRAMS: [&str; 4] = ["sprite", "particle", "post_processing", "text"];

const BALL_TEXTURE_SIZE: u32 = 64;
const PARTICLE_TEXTURE_SIZE: u32 = 32;
const TEXT_COLOR: Vec3 = Vec3::ONE;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("failed to load font: {0}")]
    Font(#[from] FontError),
    #[error("failed to create texture: {0}")]
    Texture(#[from] TextureError),
}

/// One line of overlay text
#[derive(Debug, Clone, PartialEq)]
pub struct HudLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

/// Overlay text for the current phase: the score always, plus the start
/// prompt outside a match and the result after one
pub fn hud_lines(
    state: GameState,
    score: &Scoreboard,
    winner: Option<Player>,
    width: f32,
    height: f32,
) -> Vec<HudLine> {
    let mut lines = vec![HudLine {
        text: score.to_string(),
        x: width / 2.0 - 50.0,
        y: 50.0,
        scale: 1.0,
    }];

    if matches!(state, GameState::Menu | GameState::Win) {
        lines.push(HudLine {
            text: "Press ENTER to start".to_string(),
            x: 290.0,
            y: height / 2.0 - 20.0,
            scale: 0.5,
        });
    }

    if let (GameState::Win, Some(winner)) = (state, winner) {
        lines.push(HudLine {
            text: format!("{winner} Won!"),
            x: 330.0,
            y: height / 2.0 - 50.0,
            scale: 0.5,
        });
    }

    lines
}

/// Map held keys to this frame's court controls; confirm is an edge
pub fn controls_from_keys(keys: &KeyboardState) -> Controls {
    Controls {
        confirm: keys.just_pressed(Key::Enter),
        p1_up: keys.is_down(Key::W),
        p1_down: keys.is_down(Key::S),
        p2_up: keys.is_down(Key::Up),
        p2_down: keys.is_down(Key::Down),
    }
}

pub struct Game {
    pub court: Court,
    resources: ResourceManager,
    sprites: SpriteRenderer,
    particles: ParticleRenderer,
    text: TextRenderer,
    post: PostProcessor,
    /// 1x1 white, tinted per draw
    solid: Texture2D,
    ball: Texture2D,
}

impl Game {
    /// Load every program, texture and the font. Any failure here is fatal.
    pub fn new(gpu: &Gpu, settings: &Settings) -> Result<Self, GameError> {
        let mut resources = ResourceManager::new();
        for name in PROGRAMS {
            resources.load_shader(
                gpu.device(),
                &settings.shader_path(name, "vert"),
                &settings.shader_path(name, "frag"),
                name,
            )?;
        }

        let projection = screen_projection(settings.width as f32, settings.height as f32);
        let sprite_program = resources.get_shader("sprite")?;
        sprite_program.set_mat4("projection", &projection);
        let particle_program = resources.get_shader("particle")?;
        particle_program.set_mat4("projection", &projection);
        particle_program.set_float("scale", PARTICLE_SCALE);
        let text_program = resources.get_shader("text")?;
        text_program.set_mat4("projection", &projection);

        let size = gpu.size();
        let mut post = PostProcessor::new(
            gpu,
            resources.get_shader("post_processing")?,
            size.width,
            size.height,
            settings.msaa_samples,
        )?;
        post.effects.confuse = settings.effects.confuse;
        post.effects.chaos = settings.effects.chaos;
        let sample_count = post.sample_count();

        let solid = Texture2D::generate(
            gpu,
            "solid",
            1,
            1,
            Some(&[255, 255, 255, 255][..]),
            TextureOptions::default(),
        )?;
        let ball = radial_texture(gpu, "ball", BALL_TEXTURE_SIZE, disc_pixels)?;
        let glow = radial_texture(gpu, "particle", PARTICLE_TEXTURE_SIZE, glow_pixels)?;

        let sprites = SpriteRenderer::new(gpu, sprite_program, sample_count);
        let particles = ParticleRenderer::new(gpu, particle_program, glow, sample_count);
        let mut text = TextRenderer::new(gpu, text_program);
        text.load_font(gpu, &settings.font_path, settings.font_size)?;

        log::info!("Game ready with {} shader programs", resources.len());

        Ok(Self {
            court: Court::new(CourtConfig::from(settings)),
            resources,
            sprites,
            particles,
            text,
            post,
            solid,
            ball,
        })
    }

    pub fn process_input(&mut self, keys: &KeyboardState, dt: f32) -> Option<CourtEvent> {
        self.court.process_input(&controls_from_keys(keys), dt)
    }

    pub fn update(&mut self, dt: f32) -> Vec<CourtEvent> {
        let events = self.court.update(dt);
        self.post.effects.shake = self.court.shaking();
        events
    }

    /// Render one frame: scene into the post-processor, composite onto the
    /// surface, then the text overlay on top
    pub fn draw(&self, gpu: &Gpu, time: f32) -> Result<(), wgpu::SurfaceError> {
        self.resources.begin_frame();
        self.text.begin_frame();

        let mut frame = gpu.begin_frame()?;
        let queue = gpu.queue();

        let mut pass = self.post.begin_render(&mut frame.encoder);
        self.draw_scene(queue, &mut pass);
        self.post.end_render(pass);

        self.post.render(queue, &mut frame.encoder, &frame.view, time);

        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("hud_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let config = self.court.config();
            let lines = hud_lines(
                self.court.state,
                &self.court.score,
                self.court.winner(),
                config.width,
                config.height,
            );
            for line in &lines {
                self.text.render_text(
                    queue,
                    &mut pass,
                    &line.text,
                    line.x,
                    line.y,
                    line.scale,
                    TEXT_COLOR,
                );
            }
        }

        gpu.submit(frame);
        Ok(())
    }

    /// Paddles, then particles, then the ball on top
    fn draw_scene(&self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>) {
        for paddle in [&self.court.left, &self.court.right] {
            self.sprites.draw(
                queue,
                pass,
                &self.solid,
                paddle.position,
                paddle.size,
                paddle.rotation,
                paddle.color,
            );
        }

        self.particles.draw(queue, pass, &self.court.particles);

        let ball = &self.court.ball.object;
        self.sprites.draw(
            queue,
            pass,
            &self.ball,
            ball.position,
            ball.size,
            ball.rotation,
            ball.color,
        );
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.resources.clear();
    }
}

fn radial_texture(
    gpu: &Gpu,
    label: &str,
    size: u32,
    pixels: fn(u32) -> Vec<u8>,
) -> Result<Texture2D, TextureError> {
    Texture2D::generate(
        gpu,
        label,
        size,
        size,
        Some(pixels(size).as_slice()),
        TextureOptions::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[HudLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_active_shows_only_the_score() {
        let score = Scoreboard { left: 3, right: 7 };
        let lines = hud_lines(GameState::Active, &score, None, 800.0, 600.0);
        assert_eq!(texts(&lines), ["3 : 7"]);
        assert_eq!((lines[0].x, lines[0].y, lines[0].scale), (350.0, 50.0, 1.0));
    }

    #[test]
    fn test_menu_adds_the_prompt() {
        let lines = hud_lines(GameState::Menu, &Scoreboard::default(), None, 800.0, 600.0);
        assert_eq!(texts(&lines), ["0 : 0", "Press ENTER to start"]);
        assert_eq!((lines[1].x, lines[1].y, lines[1].scale), (290.0, 280.0, 0.5));
    }

    #[test]
    fn test_win_names_the_winner() {
        let score = Scoreboard { left: 10, right: 4 };
        let lines = hud_lines(GameState::Win, &score, Some(Player::One), 800.0, 600.0);
        assert_eq!(
            texts(&lines),
            ["10 : 4", "Press ENTER to start", "Player 1 Won!"]
        );
        assert_eq!((lines[2].x, lines[2].y), (330.0, 250.0));
    }

    #[test]
    fn test_win_without_winner_has_no_result_line() {
        let lines = hud_lines(GameState::Win, &Scoreboard::default(), None, 800.0, 600.0);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_confirm_is_an_edge() {
        let mut keys = KeyboardState::new();
        keys.set(Key::Enter, true);
        keys.set(Key::W, true);
        keys.set(Key::Down, true);

        let controls = controls_from_keys(&keys);
        assert!(controls.confirm);
        assert!(controls.p1_up && controls.p2_down);
        assert!(!controls.p1_down && !controls.p2_up);

        keys.end_frame();
        let held = controls_from_keys(&keys);
        assert!(!held.confirm);
        assert!(held.p1_up);
    }

    #[test]
    fn test_held_enter_starts_one_match_only() {
        let mut court = Court::new(CourtConfig::default());
        let mut keys = KeyboardState::new();
        keys.set(Key::Enter, true);

        let event = court.process_input(&controls_from_keys(&keys), 0.016);
        assert_eq!(event, Some(CourtEvent::Started));
        keys.end_frame();

        // Force a finished match while Enter is still held
        court.state = GameState::Win;
        let event = court.process_input(&controls_from_keys(&keys), 0.016);
        assert_eq!(event, None);
        assert_eq!(court.state, GameState::Win);
    }

    #[test]
    fn test_program_names_have_shipped_sources() {
        let settings = Settings::default();
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
        for name in PROGRAMS {
            for stage in ["vert", "frag"] {
                let path = root.join(settings.shader_path(name, stage));
                assert!(path.exists(), "missing {}", path.display());
            }
        }
    }

    #[test]
    fn test_ball_sprite_uses_object_box() {
        use glam::Vec2;

        let court = Court::new(CourtConfig::default());
        let ball = court.ball.object;
        assert_eq!(ball.size, Vec2::splat(court.config().ball_radius * 2.0));
    }
}
