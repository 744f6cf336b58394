/*
 *  fonts.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Font selection by name
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

use embedded_graphics::mono_font::{ascii, MonoFont};
use std::fmt;
use profont::{
    PROFONT_10_POINT, PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT,
    PROFONT_7_POINT, PROFONT_9_POINT,
};

pub const LARGE_DEFAULT: &str = "profont24";
pub const SMALL_DEFAULT: &str = "profont18";
pub const ERROR_DEFAULT: &str = "6x10";

const FONTS: &[(&str, &MonoFont<'static>)] = &[
    ("4x6", &ascii::FONT_4X6),
    ("5x8", &ascii::FONT_5X8),
    ("6x10", &ascii::FONT_6X10),
    ("6x13", &ascii::FONT_6X13),
    ("7x13", &ascii::FONT_7X13),
    ("8x13", &ascii::FONT_8X13),
    ("9x15", &ascii::FONT_9X15),
    ("9x18", &ascii::FONT_9X18),
    ("9x18_bold", &ascii::FONT_9X18_BOLD),
    ("10x20", &ascii::FONT_10X20),
    ("profont7", &PROFONT_7_POINT),
    ("profont9", &PROFONT_9_POINT),
    ("profont10", &PROFONT_10_POINT),
    ("profont12", &PROFONT_12_POINT),
    ("profont14", &PROFONT_14_POINT),
    ("profont18", &PROFONT_18_POINT),
    ("profont24", &PROFONT_24_POINT),
];

/// A font together with the name it was selected by
#[derive(Clone, Copy)]
pub struct FontRef {
    name: &'static str,
    font: &'static MonoFont<'static>,
}

impl FontRef {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn font(&self) -> &'static MonoFont<'static> {
        self.font
    }

    /// Glyph cell height in pixels
    pub fn height(&self) -> u32 {
        self.font.character_size.height
    }
}

impl fmt::Debug for FontRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FontRef({})", self.name)
    }
}

impl PartialEq for FontRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Look a font up by its config name (case-insensitive)
pub fn by_name(name: &str) -> Option<FontRef> {
    let name = name.trim();
    FONTS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(name, font)| FontRef { name, font })
}

pub fn default_large() -> FontRef {
    FontRef { name: LARGE_DEFAULT, font: &PROFONT_24_POINT }
}

pub fn default_small() -> FontRef {
    FontRef { name: SMALL_DEFAULT, font: &PROFONT_18_POINT }
}

pub fn default_error() -> FontRef {
    FontRef { name: ERROR_DEFAULT, font: &ascii::FONT_6X10 }
}

pub fn names() -> impl Iterator<Item = &'static str> {
    FONTS.iter().map(|(n, _)| *n)
}
