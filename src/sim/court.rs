//! Per-frame court simulation
//!
//! `Court` owns every gameplay entity and advances them with a variable
//! timestep. It is free of rendering and platform code: input arrives as a
//! `Controls` snapshot and noteworthy moments leave as `CourtEvent`s.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::object::{BallObject, GameObject};
use super::particles::ParticlePool;
use super::state::{GameState, Player, Scoreboard};
use crate::consts::*;
use crate::settings::Settings;

/// Court geometry and rules
#[derive(Debug, Clone, PartialEq)]
pub struct CourtConfig {
    pub width: f32,
    pub height: f32,
    pub winning_score: u32,
    pub paddle_size: Vec2,
    pub paddle_velocity: f32,
    pub ball_radius: f32,
    pub ball_velocity: Vec2,
    pub particle_count: usize,
    pub seed: u64,
}

impl Default for CourtConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for CourtConfig {
    fn from(s: &Settings) -> Self {
        Self {
            width: s.width as f32,
            height: s.height as f32,
            winning_score: s.winning_score,
            paddle_size: Vec2::from(s.paddle_size),
            paddle_velocity: s.paddle_velocity,
            ball_radius: s.ball_radius,
            ball_velocity: Vec2::from(s.ball_velocity),
            particle_count: s.particle_count,
            seed: s.seed,
        }
    }
}

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    /// Confirm was pressed this frame (edge, not level)
    pub confirm: bool,
    pub p1_up: bool,
    pub p1_down: bool,
    pub p2_up: bool,
    pub p2_down: bool,
}

/// Things that happened during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourtEvent {
    /// Menu -> Active
    Started,
    /// Win -> Menu
    ReturnedToMenu,
    PaddleHit(Player),
    Scored(Player),
    /// Active -> Win
    Won(Player),
}

pub struct Court {
    config: CourtConfig,
    pub state: GameState,
    pub left: GameObject,
    pub right: GameObject,
    pub ball: BallObject,
    pub score: Scoreboard,
    /// Remaining screen shake (seconds)
    pub shake_timer: f32,
    pub particles: ParticlePool,
    rng: Pcg32,
}

impl Court {
    pub fn new(config: CourtConfig) -> Self {
        let left = GameObject::new(Vec2::ZERO, config.paddle_size);
        let right = GameObject::new(Vec2::ZERO, config.paddle_size);
        let ball = BallObject::new(Vec2::ZERO, config.ball_radius, config.ball_velocity);
        let particles = ParticlePool::new(config.particle_count);
        let rng = Pcg32::seed_from_u64(config.seed);

        let mut court = Self {
            config,
            state: GameState::Menu,
            left,
            right,
            ball,
            score: Scoreboard::default(),
            shake_timer: 0.0,
            particles,
            rng,
        };
        court.reset();
        court
    }

    pub fn config(&self) -> &CourtConfig {
        &self.config
    }

    /// Scores to zero, paddles and ball back to their serve positions
    pub fn reset(&mut self) {
        let c = &self.config;
        let paddle_y = c.height / 2.0 - c.paddle_size.y / 2.0;
        self.left.reset(Vec2::new(PADDLE_MARGIN, paddle_y));
        self.right
            .reset(Vec2::new(c.width - c.paddle_size.x - PADDLE_MARGIN, paddle_y));
        let serve = self.serve_position();
        self.ball.reset(serve, self.config.ball_velocity);
        self.score.reset();
        self.shake_timer = 0.0;
    }

    fn serve_position(&self) -> Vec2 {
        Vec2::new(self.config.width / 2.0, self.config.height / 2.0) - self.config.ball_radius
    }

    /// Apply one frame of input: state transitions on confirm, paddle motion
    /// while a match is running
    pub fn process_input(&mut self, controls: &Controls, dt: f32) -> Option<CourtEvent> {
        match self.state {
            GameState::Menu if controls.confirm => {
                self.reset();
                self.state = GameState::Active;
                log::info!("Match started");
                Some(CourtEvent::Started)
            }
            GameState::Win if controls.confirm => {
                self.state = GameState::Menu;
                Some(CourtEvent::ReturnedToMenu)
            }
            GameState::Active => {
                let step = self.config.paddle_velocity * dt;
                let max_y = self.config.height - self.config.paddle_size.y;
                move_paddle(&mut self.left, controls.p1_up, controls.p1_down, step, max_y);
                move_paddle(&mut self.right, controls.p2_up, controls.p2_down, step, max_y);
                None
            }
            _ => None,
        }
    }

    /// Advance the simulation. Does nothing outside `Active`.
    pub fn update(&mut self, dt: f32) -> Vec<CourtEvent> {
        let mut events = Vec::new();
        if self.state != GameState::Active {
            return events;
        }

        self.ball.move_within(dt, self.config.height);

        if let Some(player) = self.paddle_contact() {
            events.push(CourtEvent::PaddleHit(player));
        }

        let offset = Vec2::splat(self.ball.radius);
        self.particles
            .update(dt, &self.ball.object, PARTICLES_PER_FRAME, offset, &mut self.rng);

        if self.shake_timer > 0.0 {
            self.shake_timer = (self.shake_timer - dt).max(0.0);
        }

        if let Some(scorer) = self.exit_side() {
            self.score.award(scorer);
            let dir = match scorer {
                Player::One => 1.0,
                Player::Two => -1.0,
            };
            let serve = self.serve_position();
            self.ball.reset(serve, self.config.ball_velocity * dir);
            log::debug!("{scorer} scored ({})", self.score);
            events.push(CourtEvent::Scored(scorer));
        }

        if let Some(winner) = self.score.winner(self.config.winning_score) {
            self.state = GameState::Win;
            self.shake_timer = 0.0;
            log::info!("{winner} won {}", self.score);
            events.push(CourtEvent::Won(winner));
        }

        events
    }

    /// Ball-paddle contact sends the ball away from the paddle it touched
    fn paddle_contact(&mut self) -> Option<Player> {
        let hit = if self.ball.check_collision(&self.left) {
            self.ball.object.velocity.x = self.ball.object.velocity.x.abs();
            Player::One
        } else if self.ball.check_collision(&self.right) {
            self.ball.object.velocity.x = -self.ball.object.velocity.x.abs();
            Player::Two
        } else {
            return None;
        };
        self.shake_timer = SHAKE_DURATION;
        Some(hit)
    }

    /// The player who scores if the ball left the court this frame
    fn exit_side(&self) -> Option<Player> {
        let pos = self.ball.position();
        if pos.x <= 0.0 {
            Some(Player::Two)
        } else if pos.x + self.ball.size().x >= self.config.width {
            Some(Player::One)
        } else {
            None
        }
    }

    pub fn shaking(&self) -> bool {
        self.shake_timer > 0.0
    }

    /// Player who ended the last match, while in `Win`
    pub fn winner(&self) -> Option<Player> {
        match self.state {
            GameState::Win => self.score.winner(self.config.winning_score),
            _ => None,
        }
    }
}

fn move_paddle(paddle: &mut GameObject, up: bool, down: bool, step: f32, max_y: f32) {
    if up {
        paddle.position.y -= step;
    }
    if down {
        paddle.position.y += step;
    }
    paddle.position.y = paddle.position.y.clamp(0.0, max_y.max(0.0));
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn confirm() -> Controls {
        Controls {
            confirm: true,
            ..Default::default()
        }
    }

    fn active_court() -> Court {
        let mut court = Court::new(CourtConfig::default());
        court.process_input(&confirm(), DT);
        assert_eq!(court.state, GameState::Active);
        court
    }

    #[test]
    fn test_initial_layout() {
        let court = Court::new(CourtConfig::default());
        assert_eq!(court.state, GameState::Menu);
        assert_eq!(court.left.position, Vec2::new(10.0, 250.0));
        assert_eq!(court.right.position, Vec2::new(770.0, 250.0));
        assert_eq!(court.ball.position(), Vec2::new(390.0, 290.0));
        assert_eq!(court.ball.velocity(), Vec2::new(450.0, 300.0));
    }

    #[test]
    fn test_menu_ignores_update() {
        let mut court = Court::new(CourtConfig::default());
        let before = court.ball.position();
        assert!(court.update(DT).is_empty());
        assert_eq!(court.ball.position(), before);
    }

    #[test]
    fn test_confirm_starts_match_and_resets() {
        let mut court = Court::new(CourtConfig::default());
        court.score = Scoreboard { left: 4, right: 7 };
        court.left.position.y = 0.0;
        assert_eq!(court.process_input(&confirm(), DT), Some(CourtEvent::Started));
        assert_eq!(court.score, Scoreboard::default());
        assert_eq!(court.left.position.y, 250.0);
    }

    #[test]
    fn test_confirm_in_active_is_ignored() {
        let mut court = active_court();
        assert_eq!(court.process_input(&confirm(), DT), None);
        assert_eq!(court.state, GameState::Active);
    }

    #[test]
    fn test_paddles_move_and_clamp() {
        let mut court = active_court();
        let up = Controls {
            p1_up: true,
            p2_down: true,
            ..Default::default()
        };
        court.process_input(&up, 0.1);
        assert_eq!(court.left.position.y, 200.0);
        assert_eq!(court.right.position.y, 300.0);

        // A long frame would overshoot; the clamp stops exactly at the edge
        court.process_input(&up, 10.0);
        assert_eq!(court.left.position.y, 0.0);
        assert_eq!(court.right.position.y, 500.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut court = active_court();
        let both = Controls {
            p1_up: true,
            p1_down: true,
            ..Default::default()
        };
        court.process_input(&both, 0.1);
        assert_eq!(court.left.position.y, 250.0);
    }

    #[test]
    fn test_paddle_hit_flips_ball_and_shakes() {
        let mut court = active_court();
        // Ball heading left, about to touch the left paddle
        court
            .ball
            .reset(Vec2::new(31.0, 280.0), Vec2::new(-450.0, 0.0));
        let events = court.update(DT);
        assert!(events.contains(&CourtEvent::PaddleHit(Player::One)));
        assert!(court.ball.velocity().x > 0.0);
        assert!(court.shaking());

        // Still overlapping: another contact must not send it back
        assert!(court.ball.check_collision(&court.left));
        court.update(DT);
        assert!(court.ball.velocity().x > 0.0);
    }

    #[test]
    fn test_right_paddle_sends_ball_left() {
        let mut court = active_court();
        court
            .ball
            .reset(Vec2::new(752.0, 280.0), Vec2::new(450.0, 0.0));
        let events = court.update(DT);
        assert!(events.contains(&CourtEvent::PaddleHit(Player::Two)));
        assert!(court.ball.velocity().x < 0.0);
    }

    #[test]
    fn test_shake_expires() {
        let mut court = active_court();
        court.shake_timer = SHAKE_DURATION;
        for _ in 0..10 {
            court.update(DT);
        }
        assert!(!court.shaking());
        assert_eq!(court.shake_timer, 0.0);
    }

    #[test]
    fn test_left_exit_scores_for_right_player() {
        let mut court = active_court();
        court.ball.reset(Vec2::new(1.0, 20.0), Vec2::new(-450.0, 0.0));
        let events = court.update(DT);
        assert_eq!(events, vec![CourtEvent::Scored(Player::Two)]);
        assert_eq!(court.score, Scoreboard { left: 0, right: 1 });
        assert_eq!(court.ball.position(), Vec2::new(390.0, 290.0));
        assert_eq!(court.ball.velocity(), Vec2::new(-450.0, -300.0));
    }

    #[test]
    fn test_right_exit_scores_for_left_player() {
        let mut court = active_court();
        court.ball.reset(Vec2::new(779.0, 20.0), Vec2::new(450.0, 0.0));
        let events = court.update(DT);
        assert_eq!(events, vec![CourtEvent::Scored(Player::One)]);
        assert_eq!(court.score, Scoreboard { left: 1, right: 0 });
        assert_eq!(court.ball.velocity(), Vec2::new(450.0, 300.0));
    }

    #[test]
    fn test_win_is_entered_once_and_confirm_returns_to_menu() {
        let mut court = active_court();
        court.score.left = 9;
        court.ball.reset(Vec2::new(779.0, 20.0), Vec2::new(450.0, 0.0));
        let events = court.update(DT);
        assert!(events.contains(&CourtEvent::Won(Player::One)));
        assert_eq!(court.state, GameState::Win);
        assert_eq!(court.winner(), Some(Player::One));

        // Frozen until confirm
        assert!(court.update(DT).is_empty());
        assert_eq!(court.score.left, 10);

        assert_eq!(
            court.process_input(&confirm(), DT),
            Some(CourtEvent::ReturnedToMenu)
        );
        assert_eq!(court.state, GameState::Menu);
        assert_eq!(court.winner(), None);
    }

    #[test]
    fn test_overshooting_the_winning_score_wins_once() {
        let mut court = active_court();
        court.score.left = 12;
        court.ball.reset(Vec2::new(779.0, 20.0), Vec2::new(450.0, 0.0));

        let mut won = 0;
        for _ in 0..10 {
            won += court
                .update(DT)
                .iter()
                .filter(|e| matches!(e, CourtEvent::Won(_)))
                .count();
        }
        assert_eq!(won, 1);
        assert_eq!(court.state, GameState::Win);
        assert_eq!(court.winner(), Some(Player::One));
        assert_eq!(court.score.left, 13);
    }

    #[test]
    fn test_particles_trail_the_ball() {
        let mut court = active_court();
        for _ in 0..5 {
            court.update(DT);
        }
        assert_eq!(court.particles.live_count(), 5);
    }

    #[test]
    fn test_determinism() {
        let mut a = active_court();
        let mut b = active_court();
        let inputs = [
            Controls {
                p1_up: true,
                ..Default::default()
            },
            Controls::default(),
            Controls {
                p2_down: true,
                ..Default::default()
            },
        ];
        for _ in 0..120 {
            for input in &inputs {
                a.process_input(input, DT);
                b.process_input(input, DT);
                a.update(DT);
                b.update(DT);
            }
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.ball, b.ball);
        let pa: Vec<_> = a.particles.iter().copied().collect();
        let pb: Vec<_> = b.particles.iter().copied().collect();
        assert_eq!(pa, pb);
    }
}
