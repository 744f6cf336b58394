/*
 *  source/mock.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock source cycling through configured power values
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

use log::debug;

use super::DataSource;
use crate::inverter::TransportError;
use crate::reading::Reading;

/// Replays a fixed list of power values, stamped with the wall clock
///
/// Useful without hardware: the gauge walks through every color bucket.
#[derive(Debug, Clone)]
pub struct MockSource {
    values: Vec<f64>,
    cursor: usize,
}

impl MockSource {
    /// `None` for an empty list
    pub fn new(values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self { values, cursor: 0 })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl DataSource for MockSource {
    fn produce_reading(&mut self) -> Result<Reading, TransportError> {
        let value = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        let reading = Reading::now(value);
        debug!("mock reading {}", reading);
        Ok(reading)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
