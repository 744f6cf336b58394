/*
 *  lib.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Solar inverter power gauge for small displays
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

pub mod color_range;
pub mod config;
pub mod controller;
pub mod fault;
pub mod fonts;
pub mod gauge;
pub mod inverter;
pub mod palette;
pub mod reading;
pub mod source;
pub mod surface;

pub use controller::{Controller, CycleOutcome};
pub use fault::{Fault, FaultKind};
pub use gauge::{GaugeError, GaugeRenderer, GaugeStyle};
pub use reading::Reading;
pub use source::DataSource;
pub use surface::{DisplaySurface, FrameBufferSurface};
