//! Visual cell state of one device's LED matrix.

use crate::layout::Dimensions;
use crate::models::Color;

/// Per-device grid of cell colors, stored in visual row-major order.
///
/// A cell is considered active iff its color is not black; the paint and
/// load paths derive the glow state from this rather than tracking it
/// separately.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    dimensions: Dimensions,
    cells: Vec<Color>,
}

impl Matrix {
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            dimensions,
            cells: vec![Default::default(); dimensions.led_count()],
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.dimensions.height && col < self.dimensions.width);
        row * self.dimensions.width + col
    }

    pub fn get(&self, row: usize, col: usize) -> Color {
        self.cells[self.offset(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, color: Color) {
        let offset = self.offset(row, col);
        self.cells[offset] = color;
    }

    pub fn active(&self, row: usize, col: usize) -> bool {
        self.get(row, col) != Color::new(0, 0, 0)
    }

    /// Reset every cell to black
    pub fn clear(&mut self) {
        self.cells.fill(Default::default());
    }
}
