//! LED addressing math and the layout document codec.
//!
//! The boards are wired as a single continuous strip snaking through the
//! columns ("serpentine" wiring): even-numbered columns run bottom-to-top in
//! hardware order, odd-numbered columns top-to-bottom. The visual grid puts
//! row 0 at the top while wire index 0 sits at the physical bottom-left, so
//! the row is mirrored on upward columns.

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

use crate::matrix::Matrix;
use crate::models::{Color, Rgb};

/// Grid dimensions of one board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

impl Dimensions {
    /// Dimensions of the PCIe board family
    pub const PCIE_BOARD: Self = Self {
        width: 22,
        height: 8,
    };

    /// Total number of LEDs on the board
    pub fn led_count(self) -> usize {
        self.width * self.height
    }

    /// Convert a visual grid coordinate to the position of the LED in the
    /// physical wiring order.
    ///
    /// For fixed dimensions this is a bijection from the grid onto
    /// `[0, width * height)`.
    pub fn wire_index(self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.height && col < self.width);

        // Even columns run upwards in hardware order, so the visual row
        // (top-based) is mirrored to the physical row (bottom-based).
        if col % 2 == 0 {
            let adjusted_row = self.height - 1 - row;
            col * self.height + adjusted_row
        } else {
            col * self.height + row
        }
    }

    /// Inverse of [`wire_index`](Self::wire_index): recover the visual grid
    /// coordinate of a wire position.
    pub fn grid_position(self, index: usize) -> (usize, usize) {
        debug_assert!(index < self.led_count());

        let col = index / self.height;
        let offset = index % self.height;

        if col % 2 == 0 {
            (self.height - 1 - offset, col)
        } else {
            (offset, col)
        }
    }

    /// Iterate over all grid coordinates in visual row-major order
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        let Self { width, height } = self;
        (0..height).flat_map(move |row| (0..width).map(move |col| (row, col)))
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::PCIE_BOARD
    }
}

#[derive(Debug, Clone, Error)]
pub enum LayoutError {
    #[error("invalid layout document ({actual} values for {width} x {height} x 3 = {expected})")]
    InvalidLength {
        actual: usize,
        width: usize,
        height: usize,
        expected: usize,
    },
}

/// Persisted snapshot of one device's full matrix.
///
/// The document is a flat sequence of exactly `3 * width * height` values,
/// one `[g, r, b]` triple per LED, ordered by wire index. Green-first
/// matches the WS2812 wire order the backend keeps its hardware buffer in;
/// the same order is used on save and load so the codec round-trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDocument {
    dimensions: Dimensions,
    values: Vec<u8>,
}

impl LayoutDocument {
    /// Collect the current color of every cell into a document
    pub fn snapshot(matrix: &Matrix) -> Self {
        let dimensions = matrix.dimensions();
        let mut values = vec![0u8; dimensions.led_count() * 3];

        for (row, col) in dimensions.cells() {
            let (r, g, b) = matrix.get(row, col).into_components();
            let base = dimensions.wire_index(row, col) * 3;
            values[base] = g;
            values[base + 1] = r;
            values[base + 2] = b;
        }

        Self { dimensions, values }
    }

    /// Wrap a raw value sequence, rejecting documents of the wrong length
    pub fn from_values(dimensions: Dimensions, values: Vec<u8>) -> Result<Self, LayoutError> {
        let expected = dimensions.led_count() * 3;

        if values.len() != expected {
            return Err(LayoutError::InvalidLength {
                actual: values.len(),
                width: dimensions.width,
                height: dimensions.height,
                expected,
            });
        }

        Ok(Self { dimensions, values })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Decode the color stored for the given wire index
    pub fn color_at(&self, index: usize) -> Color {
        let base = index * 3;
        Color::new(
            self.values[base + 1],
            self.values[base],
            self.values[base + 2],
        )
    }

    /// Color triples in wire order, as the `update led buffer` command
    /// expects them
    pub fn wire_colors(&self) -> Vec<Rgb> {
        self.values
            .chunks_exact(3)
            .map(|grb| Rgb {
                r: grb[1],
                g: grb[0],
                b: grb[2],
            })
            .collect()
    }

    /// Restore every visual cell from the document
    pub fn apply_to(&self, matrix: &mut Matrix) {
        for (row, col) in self.dimensions.cells() {
            let index = self.dimensions.wire_index(row, col);
            matrix.set(row, col, self.color_at(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_index_examples() {
        let dimensions = Dimensions::PCIE_BOARD;

        // Bottom row of the first (even, upward) column is wire index 0
        assert_eq!(0, dimensions.wire_index(7, 0));
        // Top row of the second (odd, downward) column
        assert_eq!(8, dimensions.wire_index(0, 1));
        // Top-left visual cell maps to the top of the first column
        assert_eq!(7, dimensions.wire_index(0, 0));
        // Last wire index is the bottom of the last (odd) column
        assert_eq!(175, dimensions.wire_index(7, 21));
    }

    #[test]
    fn test_wire_index_bijection() {
        let dimensions = Dimensions::PCIE_BOARD;
        let mut seen = vec![false; dimensions.led_count()];

        for (row, col) in dimensions.cells() {
            let index = dimensions.wire_index(row, col);
            assert!(index < dimensions.led_count());
            assert!(!seen[index], "wire index {} mapped twice", index);
            seen[index] = true;
        }

        assert!(seen.iter().all(|&hit| hit));
    }

    #[test]
    fn test_grid_position_inverse() {
        let dimensions = Dimensions::PCIE_BOARD;

        for (row, col) in dimensions.cells() {
            let index = dimensions.wire_index(row, col);
            assert_eq!((row, col), dimensions.grid_position(index));
        }

        for index in 0..dimensions.led_count() {
            let (row, col) = dimensions.grid_position(index);
            assert_eq!(index, dimensions.wire_index(row, col));
        }
    }

    #[test]
    fn test_bijection_other_dimensions() {
        for &dimensions in &[
            Dimensions {
                width: 1,
                height: 1,
            },
            Dimensions {
                width: 5,
                height: 3,
            },
            Dimensions {
                width: 8,
                height: 22,
            },
        ] {
            let mut seen = vec![false; dimensions.led_count()];

            for (row, col) in dimensions.cells() {
                let index = dimensions.wire_index(row, col);
                assert!(!seen[index]);
                seen[index] = true;
                assert_eq!((row, col), dimensions.grid_position(index));
            }
        }
    }

    #[test]
    fn test_document_channel_order() {
        let dimensions = Dimensions::PCIE_BOARD;
        let mut matrix = Matrix::new(dimensions);
        matrix.set(7, 0, Color::new(1, 2, 3));

        let document = LayoutDocument::snapshot(&matrix);

        // Wire index 0, stored green-first
        assert_eq!(&[2, 1, 3], &document.values()[..3]);
        assert_eq!(Color::new(1, 2, 3), document.color_at(0));
        assert_eq!(Rgb { r: 1, g: 2, b: 3 }, document.wire_colors()[0]);
    }

    #[test]
    fn test_document_round_trip() {
        use rand::RngExt;

        let dimensions = Dimensions::PCIE_BOARD;
        let mut rng = rand::rng();
        let mut matrix = Matrix::new(dimensions);

        for (row, col) in dimensions.cells() {
            if rng.random::<bool>() {
                matrix.set(
                    row,
                    col,
                    Color::new(rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>()),
                );
            }
        }

        let document = LayoutDocument::snapshot(&matrix);
        let reparsed =
            LayoutDocument::from_values(dimensions, document.values().to_vec()).unwrap();

        let mut restored = Matrix::new(dimensions);
        reparsed.apply_to(&mut restored);

        for (row, col) in dimensions.cells() {
            assert_eq!(matrix.get(row, col), restored.get(row, col));
            assert_eq!(matrix.active(row, col), restored.active(row, col));
        }
    }

    #[test]
    fn test_document_rejects_wrong_length() {
        let dimensions = Dimensions::PCIE_BOARD;

        for &len in &[0, 1, 175 * 3, 176 * 3 + 1] {
            let result = LayoutDocument::from_values(dimensions, vec![0u8; len]);
            match result {
                Err(LayoutError::InvalidLength {
                    actual, expected, ..
                }) => {
                    assert_eq!(len, actual);
                    assert_eq!(176 * 3, expected);
                }
                Ok(_) => panic!("document of length {} accepted", len),
            }
        }
    }
}
