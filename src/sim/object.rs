//! Court entities: axis-aligned boxes and the ball
//!
//! Positions are top-left corners in screen pixels (y grows downward).

use glam::{Vec2, Vec3};

/// An axis-aligned rectangle with motion and a tint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameObject {
    pub position: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub color: Vec3,
    /// Rotation in radians about the top-left corner
    pub rotation: f32,
}

impl GameObject {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            velocity: Vec2::ZERO,
            color: Vec3::ONE,
            rotation: 0.0,
        }
    }

    pub fn reset(&mut self, position: Vec2) {
        self.position = position;
    }

    /// AABB overlap test; touching edges count as a hit
    pub fn check_collision(&self, other: &GameObject) -> bool {
        aabb_overlap(self.position, self.size, other.position, other.size)
    }
}

/// Inclusive overlap of two boxes on both axes
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    let overlap_x = a_pos.x + a_size.x >= b_pos.x && b_pos.x + b_size.x >= a_pos.x;
    let overlap_y = a_pos.y + a_size.y >= b_pos.y && b_pos.y + b_size.y >= a_pos.y;
    overlap_x && overlap_y
}

/// The ball: a square box of side `2 * radius` that bounces off the top and
/// bottom of the court
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallObject {
    pub object: GameObject,
    pub radius: f32,
    /// A stuck ball ignores `move_within`
    pub stuck: bool,
}

impl BallObject {
    pub fn new(position: Vec2, radius: f32, velocity: Vec2) -> Self {
        let mut object = GameObject::new(position, Vec2::splat(radius * 2.0));
        object.velocity = velocity;
        Self {
            object,
            radius,
            stuck: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.object.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.object.velocity
    }

    pub fn size(&self) -> Vec2 {
        self.object.size
    }

    /// Integrate one step and reflect off the top/bottom edges.
    ///
    /// The ball is clamped back inside so it never ends a step past an edge.
    /// Left/right exits are left for the caller to score.
    pub fn move_within(&mut self, dt: f32, height: f32) -> Vec2 {
        if self.stuck {
            return self.object.position;
        }

        let obj = &mut self.object;
        obj.position += obj.velocity * dt;

        if obj.position.y <= 0.0 {
            obj.velocity.y = -obj.velocity.y;
            obj.position.y = 0.0;
        } else if obj.position.y + obj.size.y >= height {
            obj.velocity.y = -obj.velocity.y;
            obj.position.y = height - obj.size.y;
        }

        obj.position
    }

    pub fn reset(&mut self, position: Vec2, velocity: Vec2) {
        self.object.position = position;
        self.object.velocity = velocity;
    }

    pub fn check_collision(&self, other: &GameObject) -> bool {
        self.object.check_collision(other)
    }
}
