//! Brick grid: generation, hit resolution and moving-brick motion
//!
//! Bricks live in a row-major grid. Behaviour by type goes through one
//! resolution function (`BrickKind::resolve_hit`) instead of type checks
//! scattered across the physics code.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::layout::Layout;

/// Row colors, top to bottom
pub const ROW_COLORS: [u32; 8] = [
    0xFF0000, 0xFF4500, 0xFFA500, 0xFFD700, 0xFFFF00, 0xADFF2F, 0x00FF00, 0x00CED1,
];
pub const HARD_COLOR: u32 = 0x9E9E9E;
pub const HARD_CRACKED_COLOR: u32 = 0xC8C8C8;
pub const BOMB_COLOR: u32 = 0xFF1744;
pub const MOVING_COLOR: u32 = 0x7C4DFF;

/// Moving brick speed range (pixels/second)
const MOVING_SPEED_MIN: f32 = 40.0;
const MOVING_SPEED_MAX: f32 = 80.0;

/// Brick behaviour, tagged with its per-type state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BrickKind {
    /// Hole in the grid; never rendered, hit or counted
    Empty,
    Normal,
    Hard { hits_left: u8 },
    Bomb,
    Moving { direction: f32, speed: f32 },
}

/// Plain type tag for events and scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickType {
    Normal,
    Hard,
    Bomb,
    Moving,
}

/// Result of one hit on an active brick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Brick survives with this many hits left
    Damaged { hits_left: u8 },
    Destroyed,
    /// Destroyed, and its 3x3 neighbourhood must be cleared
    Detonated,
}

impl BrickKind {
    /// Apply one hit. The single dispatch point for type-specific behaviour.
    pub fn resolve_hit(&mut self) -> HitOutcome {
        match self {
            BrickKind::Hard { hits_left } => {
                *hits_left = hits_left.saturating_sub(1);
                if *hits_left == 0 {
                    HitOutcome::Destroyed
                } else {
                    HitOutcome::Damaged {
                        hits_left: *hits_left,
                    }
                }
            }
            BrickKind::Bomb => HitOutcome::Detonated,
            BrickKind::Normal | BrickKind::Moving { .. } | BrickKind::Empty => {
                HitOutcome::Destroyed
            }
        }
    }

    pub fn brick_type(&self) -> Option<BrickType> {
        match self {
            BrickKind::Empty => None,
            BrickKind::Normal => Some(BrickType::Normal),
            BrickKind::Hard { .. } => Some(BrickType::Hard),
            BrickKind::Bomb => Some(BrickType::Bomb),
            BrickKind::Moving { .. } => Some(BrickType::Moving),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickStatus {
    Active,
    Destroyed,
}

/// A single grid cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub row: usize,
    pub col: usize,
    pub kind: BrickKind,
    pub status: BrickStatus,
    /// Top-left corner
    pub pos: Vec2,
}

impl Brick {
    pub fn is_active(&self) -> bool {
        self.status == BrickStatus::Active && self.kind != BrickKind::Empty
    }

    /// Strict point-in-rect test against this brick
    pub fn contains(&self, point: Vec2, layout: &Layout) -> bool {
        point.x > self.pos.x
            && point.x < self.pos.x + layout.brick_width
            && point.y > self.pos.y
            && point.y < self.pos.y + layout.brick_height
    }

    pub fn center(&self, layout: &Layout) -> Vec2 {
        self.pos + Vec2::new(layout.brick_width / 2.0, layout.brick_height / 2.0)
    }

    pub fn color(&self) -> u32 {
        match self.kind {
            BrickKind::Hard { hits_left } if hits_left <= 1 => HARD_CRACKED_COLOR,
            BrickKind::Hard { .. } => HARD_COLOR,
            BrickKind::Bomb => BOMB_COLOR,
            BrickKind::Moving { .. } => MOVING_COLOR,
            BrickKind::Normal | BrickKind::Empty => ROW_COLORS[self.row % ROW_COLORS.len()],
        }
    }
}

/// Row-major brick grid for one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrickGrid {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<Brick>,
    /// Non-empty bricks (level-clear denominator)
    total: usize,
    /// Bricks destroyed this level; never decreases
    destroyed: usize,
}

impl BrickGrid {
    /// Build a grid from explicit kinds (row-major). Used by tests and by
    /// `generate`.
    pub fn from_kinds(layout: &Layout, kinds: &[BrickKind]) -> Self {
        let mut cells = Vec::with_capacity(layout.rows * layout.cols);
        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let kind = kinds
                    .get(row * layout.cols + col)
                    .copied()
                    .unwrap_or(BrickKind::Empty);
                let (x, y) = layout.cell_origin(row, col);
                let status = if kind == BrickKind::Empty {
                    BrickStatus::Destroyed
                } else {
                    BrickStatus::Active
                };
                cells.push(Brick {
                    row,
                    col,
                    kind,
                    status,
                    pos: Vec2::new(x, y),
                });
            }
        }
        let total = cells.iter().filter(|b| b.kind != BrickKind::Empty).count();
        Self {
            rows: layout.rows,
            cols: layout.cols,
            cells,
            total,
            destroyed: 0,
        }
    }

    /// Generate a level's grid from a seeded RNG
    pub fn generate<R: Rng>(level: u32, layout: &Layout, rng: &mut R) -> Self {
        let empty_chance = match level {
            0..=4 => 0.0,
            5..=6 => 0.05,
            _ => 0.10,
        };
        let special_chance = (0.15 + level.saturating_sub(1) as f64 * 0.05).min(0.4);
        let hard_hits = (2 + level / 3).min(3) as u8;

        let mut kinds = Vec::with_capacity(layout.rows * layout.cols);
        for _ in 0..layout.rows * layout.cols {
            if empty_chance > 0.0 && rng.random_bool(empty_chance) {
                kinds.push(BrickKind::Empty);
                continue;
            }
            let kind = if rng.random_bool(special_chance) {
                match rng.random_range(0..3) {
                    0 => BrickKind::Hard {
                        hits_left: hard_hits,
                    },
                    1 => BrickKind::Bomb,
                    _ => BrickKind::Moving {
                        direction: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
                        speed: rng.random_range(MOVING_SPEED_MIN..MOVING_SPEED_MAX),
                    },
                }
            } else {
                BrickKind::Normal
            };
            kinds.push(kind);
        }

        let grid = Self::from_kinds(layout, &kinds);
        log::debug!(
            "Level {} grid: {}x{}, {} bricks",
            level,
            grid.rows,
            grid.cols,
            grid.total
        );
        grid
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    pub fn remaining(&self) -> usize {
        self.total - self.destroyed
    }

    pub fn is_cleared(&self) -> bool {
        self.total > 0 && self.destroyed >= self.total
    }

    /// Bounds-checked cell access
    pub fn get(&self, row: usize, col: usize) -> Option<&Brick> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Brick> {
        if row < self.rows && col < self.cols {
            self.cells.get_mut(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Brick> {
        self.cells.iter()
    }

    pub fn active(&self) -> impl Iterator<Item = &Brick> {
        self.cells.iter().filter(|b| b.is_active())
    }

    /// First active brick (row-major) strictly containing the point
    pub fn hit_test(&self, point: Vec2, layout: &Layout) -> Option<(usize, usize)> {
        self.active()
            .find(|b| b.contains(point, layout))
            .map(|b| (b.row, b.col))
    }

    /// Hit an active brick. Returns `None` for out-of-range or inactive cells.
    pub fn hit(&mut self, row: usize, col: usize) -> Option<HitOutcome> {
        let brick = self.get_mut(row, col)?;
        if !brick.is_active() {
            return None;
        }
        let outcome = brick.kind.resolve_hit();
        if !matches!(outcome, HitOutcome::Damaged { .. }) {
            brick.status = BrickStatus::Destroyed;
            self.destroyed += 1;
        }
        Some(outcome)
    }

    /// Destroy an active brick outright (area clear). No chaining.
    pub fn destroy(&mut self, row: usize, col: usize) -> bool {
        match self.get_mut(row, col) {
            Some(brick) if brick.is_active() => {
                brick.status = BrickStatus::Destroyed;
                self.destroyed += 1;
                true
            }
            _ => false,
        }
    }

    /// Active cells with Chebyshev distance 1, clamped to the grid
    pub fn neighbors(&self, row: usize, col: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(8);
        let row_range = row.saturating_sub(1)..=(row + 1).min(self.rows.saturating_sub(1));
        for r in row_range {
            let col_range = col.saturating_sub(1)..=(col + 1).min(self.cols.saturating_sub(1));
            for c in col_range {
                if (r, c) == (row, col) {
                    continue;
                }
                if self.get(r, c).is_some_and(|b| b.is_active()) {
                    out.push((r, c));
                }
            }
        }
        out
    }

    /// Advance moving bricks, reflecting at the grid's horizontal bounds
    pub fn update_moving(&mut self, layout: &Layout, dt: f32) {
        let (min_x, max_x) = layout.x_bounds();
        for brick in self.cells.iter_mut() {
            if brick.status != BrickStatus::Active {
                continue;
            }
            if let BrickKind::Moving { direction, speed } = &mut brick.kind {
                brick.pos.x += *direction * *speed * dt;
                if brick.pos.x <= min_x {
                    brick.pos.x = min_x;
                    *direction = 1.0;
                } else if brick.pos.x >= max_x {
                    brick.pos.x = max_x;
                    *direction = -1.0;
                }
            }
        }
    }

    /// Re-derive positions after a viewport change
    pub fn apply_layout(&mut self, layout: &Layout) {
        let (min_x, max_x) = layout.x_bounds();
        for brick in self.cells.iter_mut() {
            let (x, y) = layout.cell_origin(brick.row, brick.col);
            brick.pos.y = y;
            brick.pos.x = match brick.kind {
                BrickKind::Moving { .. } => brick.pos.x.clamp(min_x, max_x),
                _ => x,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::layout::compute_layout;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn layout_5x5() -> Layout {
        Layout {
            rows: 5,
            cols: 5,
            brick_width: 50.0,
            brick_height: 20.0,
            padding: 5.0,
            offset_left: 20.0,
            offset_top: 80.0,
        }
    }

    #[test]
    fn test_generation_is_reproducible() {
        let layout = compute_layout(8, 800.0, 600.0);
        let a = BrickGrid::generate(8, &layout, &mut Pcg32::seed_from_u64(7));
        let b = BrickGrid::generate(8, &layout, &mut Pcg32::seed_from_u64(7));
        let kinds_a: Vec<_> = a.iter().map(|b| b.kind).collect();
        let kinds_b: Vec<_> = b.iter().map(|b| b.kind).collect();
        assert_eq!(kinds_a, kinds_b);
        assert_eq!(a.total(), b.total());
    }

    #[test]
    fn test_early_levels_have_no_holes() {
        let layout = compute_layout(1, 800.0, 600.0);
        let grid = BrickGrid::generate(1, &layout, &mut Pcg32::seed_from_u64(3));
        assert_eq!(grid.total(), 32);
        assert!(grid.iter().all(|b| b.kind != BrickKind::Empty));
    }

    #[test]
    fn test_total_excludes_empty_cells() {
        let layout = compute_layout(9, 800.0, 600.0);
        let grid = BrickGrid::generate(9, &layout, &mut Pcg32::seed_from_u64(11));
        let non_empty = grid.iter().filter(|b| b.kind != BrickKind::Empty).count();
        assert_eq!(grid.total(), non_empty);
        assert!(grid.total() <= 120);
    }

    #[test]
    fn test_hard_hits_scale_with_level() {
        let layout = compute_layout(9, 800.0, 600.0);
        let grid = BrickGrid::generate(9, &layout, &mut Pcg32::seed_from_u64(5));
        for brick in grid.iter() {
            if let BrickKind::Hard { hits_left } = brick.kind {
                assert_eq!(hits_left, 3);
            }
        }
    }

    #[test]
    fn test_hard_brick_takes_two_hits() {
        let layout = layout_5x5();
        let mut kinds = vec![BrickKind::Normal; 25];
        kinds[0] = BrickKind::Hard { hits_left: 2 };
        let mut grid = BrickGrid::from_kinds(&layout, &kinds);

        assert_eq!(grid.hit(0, 0), Some(HitOutcome::Damaged { hits_left: 1 }));
        assert_eq!(grid.destroyed(), 0);
        assert_eq!(grid.hit(0, 0), Some(HitOutcome::Destroyed));
        assert_eq!(grid.destroyed(), 1);
        // Destroyed bricks stay destroyed
        assert_eq!(grid.hit(0, 0), None);
        assert_eq!(grid.destroyed(), 1);
    }

    #[test]
    fn test_out_of_range_hit_is_ignored() {
        let layout = layout_5x5();
        let mut grid = BrickGrid::from_kinds(&layout, &[BrickKind::Normal; 25]);
        assert_eq!(grid.hit(9, 9), None);
        assert!(!grid.destroy(5, 0));
    }

    #[test]
    fn test_neighbors_are_clamped() {
        let layout = layout_5x5();
        let grid = BrickGrid::from_kinds(&layout, &[BrickKind::Normal; 25]);
        assert_eq!(grid.neighbors(0, 0).len(), 3);
        assert_eq!(grid.neighbors(2, 2).len(), 8);
        assert_eq!(grid.neighbors(4, 2).len(), 5);
    }

    #[test]
    fn test_hit_test_is_strict() {
        let layout = layout_5x5();
        let grid = BrickGrid::from_kinds(&layout, &[BrickKind::Normal; 25]);
        // Brick (0,0) spans x 20..70, y 80..100
        assert_eq!(grid.hit_test(Vec2::new(30.0, 90.0), &layout), Some((0, 0)));
        assert_eq!(grid.hit_test(Vec2::new(20.0, 90.0), &layout), None);
        // Padding gap between columns
        assert_eq!(grid.hit_test(Vec2::new(72.0, 90.0), &layout), None);
    }

    #[test]
    fn test_moving_brick_reflects_at_bounds() {
        let layout = layout_5x5();
        let mut kinds = vec![BrickKind::Empty; 25];
        kinds[4] = BrickKind::Moving {
            direction: 1.0,
            speed: 60.0,
        };
        let mut grid = BrickGrid::from_kinds(&layout, &kinds);
        let (_, max_x) = layout.x_bounds();

        grid.update_moving(&layout, 1.0);
        let brick = grid.get(0, 4).unwrap();
        assert_eq!(brick.pos.x, max_x);
        assert!(matches!(brick.kind, BrickKind::Moving { direction, .. } if direction < 0.0));
    }

    #[test]
    fn test_apply_layout_moves_fixed_bricks() {
        let layout = layout_5x5();
        let mut grid = BrickGrid::from_kinds(&layout, &[BrickKind::Normal; 25]);
        let wider = Layout {
            brick_width: 80.0,
            ..layout
        };
        grid.apply_layout(&wider);
        assert_eq!(grid.get(0, 1).unwrap().pos.x, 20.0 + 85.0);
    }
}
