/*
 *  palette.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Named theme colors and their RGB values
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

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Palette entry, referenced by name from the configuration file
///
/// Colors are defined once here and resolved to concrete pixels only when a
/// view is drawn, so threshold tables stay readable in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    White,
    Black,
    Blue,
    Green,
    Red,
    Yellow,
    Orange,
}

impl NamedColor {
    /// Every palette entry, in palette index order
    pub const ALL: [NamedColor; 7] = [
        NamedColor::White,
        NamedColor::Black,
        NamedColor::Blue,
        NamedColor::Green,
        NamedColor::Red,
        NamedColor::Yellow,
        NamedColor::Orange,
    ];

    /// Convert to a 24-bit pixel color
    pub fn to_rgb(&self) -> Rgb888 {
        match self {
            NamedColor::White => Rgb888::WHITE,
            NamedColor::Black => Rgb888::BLACK,
            NamedColor::Blue => Rgb888::BLUE,
            NamedColor::Green => Rgb888::GREEN,
            NamedColor::Red => Rgb888::RED,
            NamedColor::Yellow => Rgb888::YELLOW,
            // 0xFFA500
            NamedColor::Orange => Rgb888::new(0xFF, 0xA5, 0x00),
        }
    }

    /// Packed 0xRRGGBB value
    pub fn to_hex(&self) -> u32 {
        let c = self.to_rgb();
        ((c.r() as u32) << 16) | ((c.g() as u32) << 8) | c.b() as u32
    }

    /// Lowercase name as used in config files
    pub fn name(&self) -> &'static str {
        match self {
            NamedColor::White => "white",
            NamedColor::Black => "black",
            NamedColor::Blue => "blue",
            NamedColor::Green => "green",
            NamedColor::Red => "red",
            NamedColor::Yellow => "yellow",
            NamedColor::Orange => "orange",
        }
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<NamedColor> for Rgb888 {
    fn from(color: NamedColor) -> Self {
        color.to_rgb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_values() {
        assert_eq!(NamedColor::White.to_hex(), 0xFFFFFF);
        assert_eq!(NamedColor::Black.to_hex(), 0x000000);
        assert_eq!(NamedColor::Blue.to_hex(), 0x0000FF);
        assert_eq!(NamedColor::Green.to_hex(), 0x00FF00);
        assert_eq!(NamedColor::Red.to_hex(), 0xFF0000);
        assert_eq!(NamedColor::Yellow.to_hex(), 0xFFFF00);
        assert_eq!(NamedColor::Orange.to_hex(), 0xFFA500);
    }

    #[test]
    fn test_yaml_names() {
        let colors: Vec<NamedColor> = serde_yaml::from_str("[red, orange, yellow, green]").unwrap();
        assert_eq!(
            colors,
            vec![NamedColor::Red, NamedColor::Orange, NamedColor::Yellow, NamedColor::Green]
        );
        for c in NamedColor::ALL {
            assert_eq!(serde_yaml::to_string(&c).unwrap().trim(), c.name());
        }
    }
}
