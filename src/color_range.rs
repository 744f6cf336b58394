/*
 *  color_range.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Threshold table mapping a power reading to a color bucket
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use thiserror::Error;

use crate::palette::NamedColor;

/// Pick the color bucket for `value`.
///
/// Boundaries are scanned in ascending order; the first boundary strictly
/// greater than `value` at index `i` selects `colors[i - 1]`. A value at or
/// above the last boundary lands in the top bucket.
///
/// A value below every boundary matches at index 0 and wraps to the *last*
/// color. That is almost certainly an upstream accident, but deployed
/// threshold tables rely on it, so it is kept as-is.
///
/// Callers guarantee `boundaries.len() == colors.len()` and non-empty.
pub fn color_for<C: Copy>(value: f64, boundaries: &[f64], colors: &[C]) -> C {
    let last = colors.len() - 1;
    boundaries
        .iter()
        .position(|&b| value < b)
        .map(|i| if i == 0 { colors[last] } else { colors[i - 1] })
        .unwrap_or(colors[last])
}

#[derive(Debug, Error, PartialEq)]
pub enum ColorRangeError {
    #[error("power ranges must not be empty")]
    Empty,
    #[error("{boundaries} power ranges but {colors} power colors")]
    LengthMismatch { boundaries: usize, colors: usize },
    #[error("power ranges must be strictly ascending (index {index})")]
    NotAscending { index: usize },
}

/// Lower bounds of the power buckets, in watts
pub const DEFAULT_POWER_RANGES: [f64; 4] = [0.0, 80.0, 130.0, 200.0];

pub const DEFAULT_POWER_COLORS: [NamedColor; 4] =
    [NamedColor::Red, NamedColor::Orange, NamedColor::Yellow, NamedColor::Green];

/// Validated threshold/color table
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRanges {
    boundaries: Vec<f64>,
    colors: Vec<NamedColor>,
}

impl ColorRanges {
    pub fn new(boundaries: Vec<f64>, colors: Vec<NamedColor>) -> Result<Self, ColorRangeError> {
        if boundaries.is_empty() {
            return Err(ColorRangeError::Empty);
        }
        if boundaries.len() != colors.len() {
            return Err(ColorRangeError::LengthMismatch {
                boundaries: boundaries.len(),
                colors: colors.len(),
            });
        }
        if let Some(index) = boundaries.windows(2).position(|w| !(w[0] < w[1])) {
            return Err(ColorRangeError::NotAscending { index: index + 1 });
        }
        Ok(Self { boundaries, colors })
    }

    pub fn color_for(&self, value: f64) -> NamedColor {
        color_for(value, &self.boundaries, &self.colors)
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn colors(&self) -> &[NamedColor] {
        &self.colors
    }
}

impl Default for ColorRanges {
    fn default() -> Self {
        Self {
            boundaries: DEFAULT_POWER_RANGES.to_vec(),
            colors: DEFAULT_POWER_COLORS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use NamedColor::*;

    const BOUNDS: [f64; 4] = [0.0, 80.0, 130.0, 200.0];
    const COLORS: [NamedColor; 4] = [Red, Orange, Yellow, Green];

    #[test]
    fn test_buckets() {
        assert_eq!(color_for(50.0, &BOUNDS, &COLORS), Red);
        assert_eq!(color_for(80.0, &BOUNDS, &COLORS), Orange);
        assert_eq!(color_for(199.0, &BOUNDS, &COLORS), Yellow);
        assert_eq!(color_for(250.0, &BOUNDS, &COLORS), Green);
    }

    #[test]
    fn test_boundary_values_open_above() {
        assert_eq!(color_for(0.0, &BOUNDS, &COLORS), Red);
        assert_eq!(color_for(129.999, &BOUNDS, &COLORS), Orange);
        assert_eq!(color_for(130.0, &BOUNDS, &COLORS), Yellow);
        assert_eq!(color_for(200.0, &BOUNDS, &COLORS), Green);
    }

    #[test]
    fn test_below_minimum_wraps_to_last() {
        assert_eq!(color_for(-5.0, &BOUNDS, &COLORS), Green);
        assert_eq!(color_for(f64::MIN, &BOUNDS, &COLORS), Green);
    }

    #[test]
    fn test_single_bucket() {
        assert_eq!(color_for(10.0, &[0.0], &[Blue]), Blue);
        assert_eq!(color_for(-10.0, &[0.0], &[Blue]), Blue);
    }

    #[test]
    fn test_table_validation() {
        assert_eq!(ColorRanges::new(vec![], vec![]), Err(ColorRangeError::Empty));
        assert_eq!(
            ColorRanges::new(vec![0.0, 10.0], vec![Red]),
            Err(ColorRangeError::LengthMismatch { boundaries: 2, colors: 1 })
        );
        assert_eq!(
            ColorRanges::new(vec![0.0, 10.0, 10.0], vec![Red, Orange, Green]),
            Err(ColorRangeError::NotAscending { index: 2 })
        );
        let table = ColorRanges::new(BOUNDS.to_vec(), COLORS.to_vec()).unwrap();
        assert_eq!(table.color_for(100.0), Orange);
        assert_eq!(table.color_for(-1.0), Green);
    }
}
