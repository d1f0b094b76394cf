//! Fixed-size particle pool trailing an emitter
//!
//! Slots are recycled in place; the pool never grows. When no slot is free
//! the first slot is overwritten.

use glam::{Vec2, Vec4};
use rand::Rng;

use super::object::GameObject;

/// Maximum positional jitter applied on spawn, per axis
pub const SPAWN_JITTER: f32 = 0.5;
/// Lifetime of a freshly spawned particle (seconds)
pub const PARTICLE_LIFE: f32 = 1.0;
/// Alpha lost per second
pub const FADE_RATE: f32 = 2.5;
/// Fraction of the emitter velocity a particle inherits
pub const VELOCITY_SHARE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: Vec4,
    pub life: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            color: Vec4::ONE,
            life: 0.0,
        }
    }
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    /// Where the next free-slot search starts
    last_used: usize,
}

impl ParticlePool {
    pub fn new(count: usize) -> Self {
        Self {
            particles: vec![Particle::default(); count],
            last_used: 0,
        }
    }

    /// Spawn `count` particles at the emitter, then age every live particle
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        emitter: &GameObject,
        count: usize,
        offset: Vec2,
        rng: &mut R,
    ) {
        for _ in 0..count {
            self.spawn(emitter, offset, rng);
        }
        self.step(dt);
    }

    /// Respawn one slot from the emitter's current state
    pub fn spawn<R: Rng>(&mut self, emitter: &GameObject, offset: Vec2, rng: &mut R) {
        let Some(slot) = self.first_unused() else {
            return;
        };

        let jitter = Vec2::new(
            rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER),
            rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER),
        );
        let gray = 0.5 + rng.random_range(0.0..0.5);

        self.particles[slot] = Particle {
            position: emitter.position + jitter + offset,
            velocity: emitter.velocity * VELOCITY_SHARE,
            color: Vec4::new(gray, gray, gray, 1.0),
            life: PARTICLE_LIFE,
        };
    }

    /// Age every particle; live ones drift against their velocity and fade
    pub fn step(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.life -= dt;
            if p.is_alive() {
                p.position -= p.velocity * dt;
                p.color.w = (p.color.w - FADE_RATE * dt).max(0.0);
            }
        }
    }

    /// Free slot search: from the hint to the end, then from the start up to
    /// the hint. Falls back to slot 0 when the pool is saturated.
    fn first_unused(&mut self) -> Option<usize> {
        if self.particles.is_empty() {
            return None;
        }
        let len = self.particles.len();
        let start = self.last_used.min(len - 1);
        let found = (start..len)
            .chain(0..start)
            .find(|&i| !self.particles[i].is_alive());

        match found {
            Some(i) => {
                self.last_used = i;
                Some(i)
            }
            None => {
                log::trace!("Particle pool saturated, overwriting slot 0");
                self.last_used = 0;
                Some(0)
            }
        }
    }

    /// All slots in pool order, dead ones included
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn live(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn emitter() -> GameObject {
        let mut obj = GameObject::new(Vec2::new(100.0, 200.0), Vec2::splat(20.0));
        obj.velocity = Vec2::new(450.0, 300.0);
        obj
    }

    #[test]
    fn test_spawn_inherits_emitter_state() {
        let mut pool = ParticlePool::new(4);
        let mut rng = Pcg32::seed_from_u64(1);
        let offset = Vec2::splat(10.0);
        pool.spawn(&emitter(), offset, &mut rng);

        let p = pool.iter().next().unwrap();
        assert_eq!(p.life, PARTICLE_LIFE);
        assert_eq!(p.velocity, Vec2::new(45.0, 30.0));
        assert_eq!(p.color.w, 1.0);
        assert!(p.color.x >= 0.5 && p.color.x < 1.0);
        assert_eq!(p.color.x, p.color.y);
        let expected = Vec2::new(110.0, 210.0);
        assert!((p.position - expected).abs().max_element() <= SPAWN_JITTER);
    }

    #[test]
    fn test_step_moves_against_velocity_and_fades() {
        let mut pool = ParticlePool::new(1);
        let mut rng = Pcg32::seed_from_u64(2);
        pool.spawn(&emitter(), Vec2::ZERO, &mut rng);
        let before = *pool.iter().next().unwrap();

        pool.step(0.1);
        let after = *pool.iter().next().unwrap();
        assert!((after.life - 0.9).abs() < 1e-6);
        assert!((after.position - (before.position - before.velocity * 0.1)).length() < 1e-4);
        assert!((after.color.w - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_dead_particles_do_not_move() {
        let mut pool = ParticlePool::new(1);
        let mut rng = Pcg32::seed_from_u64(3);
        pool.spawn(&emitter(), Vec2::ZERO, &mut rng);
        pool.step(1.5);
        let dead = *pool.iter().next().unwrap();
        assert!(!dead.is_alive());

        pool.step(0.5);
        assert_eq!(pool.iter().next().unwrap().position, dead.position);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_spawning_fewer_than_pool_size() {
        let mut pool = ParticlePool::new(10);
        let mut rng = Pcg32::seed_from_u64(10);
        let e = emitter();
        for _ in 0..4 {
            pool.spawn(&e, Vec2::ZERO, &mut rng);
        }
        let fresh = pool.iter().filter(|p| p.life == PARTICLE_LIFE).count();
        let idle = pool.iter().filter(|p| p.life <= 0.0).count();
        assert_eq!(fresh, 4);
        assert_eq!(idle, 6);
    }

    #[test]
    fn test_saturated_pool_overwrites_slot_zero() {
        let mut pool = ParticlePool::new(3);
        let mut rng = Pcg32::seed_from_u64(4);
        let e = emitter();
        for _ in 0..3 {
            pool.spawn(&e, Vec2::ZERO, &mut rng);
        }
        assert_eq!(pool.live_count(), 3);

        // Age the occupants so the overwritten slot is recognisable
        pool.step(0.5);
        pool.spawn(&e, Vec2::ZERO, &mut rng);
        let lives: Vec<f32> = pool.iter().map(|p| p.life).collect();
        assert_eq!(lives[0], PARTICLE_LIFE);
        assert!((lives[1] - 0.5).abs() < 1e-6);
        assert!((lives[2] - 0.5).abs() < 1e-6);
        assert_eq!(pool.last_used, 0);
    }

    #[test]
    fn test_search_starts_at_hint_and_wraps() {
        let mut pool = ParticlePool::new(4);
        let mut rng = Pcg32::seed_from_u64(5);
        let e = emitter();
        for _ in 0..4 {
            pool.spawn(&e, Vec2::ZERO, &mut rng);
        }
        // Free slot 1 only
        pool.particles[1].life = 0.0;
        pool.last_used = 3;
        pool.spawn(&e, Vec2::ZERO, &mut rng);
        assert_eq!(pool.last_used, 1);
        assert!(pool.particles[1].is_alive());
    }

    #[test]
    fn test_update_spawns_then_steps() {
        let mut pool = ParticlePool::new(50);
        let mut rng = Pcg32::seed_from_u64(6);
        pool.update(0.016, &emitter(), 1, Vec2::splat(10.0), &mut rng);
        assert_eq!(pool.live_count(), 1);
        let p = pool.live().next().unwrap();
        assert!((p.life - (1.0 - 0.016)).abs() < 1e-6);
    }

    #[test]
    fn test_empty_pool_is_inert() {
        let mut pool = ParticlePool::new(0);
        let mut rng = Pcg32::seed_from_u64(7);
        pool.update(0.016, &emitter(), 3, Vec2::ZERO, &mut rng);
        assert!(pool.is_empty());
    }

    proptest! {
        #[test]
        fn prop_pool_size_is_fixed(
            size in 1usize..64,
            frames in 1usize..200,
            spawn in 0usize..4,
            seed in any::<u64>(),
        ) {
            let mut pool = ParticlePool::new(size);
            let mut rng = Pcg32::seed_from_u64(seed);
            let e = emitter();
            for _ in 0..frames {
                pool.update(1.0 / 60.0, &e, spawn, Vec2::ZERO, &mut rng);
                prop_assert_eq!(pool.len(), size);
                prop_assert!(pool.live_count() <= size);
                prop_assert!(pool.last_used < size);
            }
        }

        #[test]
        fn prop_alpha_never_negative(dt in 0.0f32..0.5, steps in 1usize..20) {
            let mut pool = ParticlePool::new(1);
            let mut rng = Pcg32::seed_from_u64(9);
            pool.spawn(&emitter(), Vec2::ZERO, &mut rng);
            for _ in 0..steps {
                pool.step(dt);
            }
            prop_assert!(pool.iter().all(|p| p.color.w >= 0.0));
        }
    }
}
