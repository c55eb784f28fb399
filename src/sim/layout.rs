//! Brick grid layout
//!
//! Grid dimensions are a step function of the level; brick size follows the
//! viewport. Pure and deterministic so a resize can re-derive it at any time.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Grid geometry for one level at one viewport size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub rows: usize,
    pub cols: usize,
    pub brick_width: f32,
    pub brick_height: f32,
    pub padding: f32,
    pub offset_left: f32,
    pub offset_top: f32,
}

impl Layout {
    /// Top-left corner of the cell at (row, col)
    pub fn cell_origin(&self, row: usize, col: usize) -> (f32, f32) {
        (
            self.offset_left + col as f32 * (self.brick_width + self.padding),
            self.offset_top + row as f32 * (self.brick_height + self.padding),
        )
    }

    /// Total grid width including inner padding
    pub fn grid_width(&self) -> f32 {
        self.cols as f32 * self.brick_width + (self.cols.saturating_sub(1)) as f32 * self.padding
    }

    /// Horizontal range a brick's left edge may occupy
    pub fn x_bounds(&self) -> (f32, f32) {
        let min = self.offset_left;
        let max = self.offset_left + self.grid_width() - self.brick_width;
        (min, max.max(min))
    }
}

/// Rows x cols for a level
pub fn grid_dimensions(level: u32) -> (usize, usize) {
    match level {
        0..=2 => (4, 8),
        3..=4 => (5, 10),
        5..=6 => (6, 12),
        _ => (8, 15),
    }
}

/// Brick height multiplier; shrinks as rows are added
fn height_multiplier(level: u32) -> f32 {
    match level {
        0..=2 => 1.5,
        3..=4 => 1.3,
        5..=6 => 1.15,
        _ => 1.0,
    }
}

/// Compute the grid layout for a level and viewport
pub fn compute_layout(level: u32, viewport_width: f32, _viewport_height: f32) -> Layout {
    let (rows, cols) = grid_dimensions(level);
    let total_padding = (cols - 1) as f32 * BRICK_PADDING;
    let available = viewport_width - BRICK_MARGIN - total_padding;
    let brick_width = (available / cols as f32).floor().max(1.0);
    let brick_height = (BRICK_BASE_HEIGHT * height_multiplier(level)).floor();

    Layout {
        rows,
        cols,
        brick_width,
        brick_height,
        padding: BRICK_PADDING,
        offset_left: BRICK_MARGIN / 2.0,
        offset_top: BRICK_OFFSET_TOP,
    }
}
