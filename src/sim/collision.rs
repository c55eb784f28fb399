//! Collision detection and response primitives
//!
//! Brick-breaker heuristics, not a general solver: balls are tested by their
//! centre (bricks) or as a box (paddle), everything else is axis-aligned.

use std::f32::consts::FRAC_PI_3;

use glam::Vec2;

/// Which boundary a ball touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Top,
}

/// Result of a wall check
#[derive(Debug, Clone)]
pub struct WallContact {
    pub wall: Wall,
    /// Position pushed back inside the playfield
    pub pos: Vec2,
    /// Reflected velocity (same magnitude)
    pub vel: Vec2,
}

/// Check a ball against the left, right and top walls.
///
/// The reflected component always points back into the playfield, so a ball
/// that is still overlapping a wall on the next tick is not flipped twice.
pub fn wall_collision(pos: Vec2, vel: Vec2, radius: f32, width: f32) -> Option<WallContact> {
    if pos.x - radius < 0.0 {
        return Some(WallContact {
            wall: Wall::Left,
            pos: Vec2::new(radius, pos.y),
            vel: Vec2::new(vel.x.abs(), vel.y),
        });
    }
    if pos.x + radius > width {
        return Some(WallContact {
            wall: Wall::Right,
            pos: Vec2::new(width - radius, pos.y),
            vel: Vec2::new(-vel.x.abs(), vel.y),
        });
    }
    if pos.y - radius < 0.0 {
        return Some(WallContact {
            wall: Wall::Top,
            pos: Vec2::new(pos.x, radius),
            vel: Vec2::new(vel.x, vel.y.abs()),
        });
    }
    None
}

/// Strict overlap of a ball against the paddle rectangle: the centre must be
/// horizontally inside, the ball's vertical extent must cross the paddle.
pub fn ball_paddle_overlap(
    ball_pos: Vec2,
    radius: f32,
    paddle_pos: Vec2,
    paddle_size: Vec2,
) -> bool {
    ball_pos.x > paddle_pos.x
        && ball_pos.x < paddle_pos.x + paddle_size.x
        && ball_pos.y + radius > paddle_pos.y
        && ball_pos.y - radius < paddle_pos.y + paddle_size.y
}

/// Outgoing velocity after a paddle hit.
///
/// `hit_pos` is 0 at the paddle's left edge and 1 at its right edge; it maps
/// onto a ±60° fan around straight up.
pub fn paddle_bounce(ball_x: f32, paddle_x: f32, paddle_width: f32, speed: f32) -> Vec2 {
    let hit_pos = ((ball_x - paddle_x) / paddle_width).clamp(0.0, 1.0);
    let angle = (hit_pos - 0.5) * FRAC_PI_3;
    launch_velocity(angle, speed)
}

/// Velocity for an angle measured from straight up (positive = right)
#[inline]
pub fn launch_velocity(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(speed * angle.sin(), -speed * angle.cos())
}

/// Rescale a velocity to a new magnitude, keeping its direction
#[inline]
pub fn rescale(vel: Vec2, new_speed: f32) -> Vec2 {
    let current = vel.length();
    if current <= f32::EPSILON {
        vel
    } else {
        vel * (new_speed / current)
    }
}

/// Overlap of two axis-aligned rectangles given as (top-left, size)
pub fn rects_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}

/// Ball has fully left the bottom of the playfield
#[inline]
pub fn ball_below(pos: Vec2, radius: f32, height: f32) -> bool {
    pos.y - radius > height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_reflection_points_inward() {
        let contact = wall_collision(Vec2::new(795.0, 300.0), Vec2::new(200.0, -100.0), 8.0, 800.0)
            .expect("right wall");
        assert_eq!(contact.wall, Wall::Right);
        assert!(contact.vel.x < 0.0);
        assert_eq!(contact.pos.x, 792.0);

        // Already heading inward: stays inward
        let contact = wall_collision(Vec2::new(3.0, 300.0), Vec2::new(50.0, 10.0), 8.0, 800.0)
            .expect("left wall");
        assert!(contact.vel.x > 0.0);
    }

    #[test]
    fn test_top_wall() {
        let contact =
            wall_collision(Vec2::new(400.0, 4.0), Vec2::new(0.0, -300.0), 8.0, 800.0).unwrap();
        assert_eq!(contact.wall, Wall::Top);
        assert_eq!(contact.vel, Vec2::new(0.0, 300.0));
    }

    #[test]
    fn test_no_wall_in_open_space() {
        assert!(wall_collision(Vec2::new(400.0, 300.0), Vec2::new(1.0, 1.0), 8.0, 800.0).is_none());
    }

    #[test]
    fn test_paddle_bounce_center_goes_straight_up() {
        let vel = paddle_bounce(150.0, 100.0, 100.0, 300.0);
        assert!(vel.x.abs() < 0.001);
        assert!((vel.y + 300.0).abs() < 0.001);
    }

    #[test]
    fn test_paddle_bounce_edges_fan_out() {
        let left = paddle_bounce(100.0, 100.0, 100.0, 300.0);
        let right = paddle_bounce(200.0, 100.0, 100.0, 300.0);
        assert!(left.x < 0.0 && right.x > 0.0);
        // 30 degrees off vertical at each edge
        assert!((right.x - 150.0).abs() < 0.01);
        assert!((left.length() - 300.0).abs() < 0.01);
    }

    #[test]
    fn test_paddle_overlap_is_strict() {
        let paddle_pos = Vec2::new(100.0, 500.0);
        let size = Vec2::new(100.0, 15.0);
        assert!(ball_paddle_overlap(Vec2::new(150.0, 495.0), 8.0, paddle_pos, size));
        assert!(!ball_paddle_overlap(Vec2::new(100.0, 495.0), 8.0, paddle_pos, size));
        assert!(!ball_paddle_overlap(Vec2::new(150.0, 480.0), 8.0, paddle_pos, size));
    }

    #[test]
    fn test_rescale_keeps_direction() {
        let vel = Vec2::new(3.0, -4.0);
        let scaled = rescale(vel, 10.0);
        assert!((scaled.length() - 10.0).abs() < 0.001);
        assert!((scaled.normalize() - vel.normalize()).length() < 0.001);
        assert_eq!(rescale(Vec2::ZERO, 10.0), Vec2::ZERO);
    }

    #[test]
    fn test_rects_overlap() {
        let size = Vec2::splat(10.0);
        assert!(rects_overlap(Vec2::ZERO, size, Vec2::splat(5.0), size));
        assert!(!rects_overlap(Vec2::ZERO, size, Vec2::new(10.0, 0.0), size));
    }
}
