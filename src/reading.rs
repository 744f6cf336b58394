/*
 *  reading.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  One poll cycle's power value and gateway timestamp
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

use chrono::{Local, NaiveDateTime};
use std::fmt;

/// Layout of every timestamp the gateway reports and the mock source stamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current power production in watts plus the time the gateway took it
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub current_power: f64,
    pub timestamp: NaiveDateTime,
}

impl Reading {
    pub fn new(current_power: f64, timestamp: NaiveDateTime) -> Self {
        Self { current_power, timestamp }
    }

    /// Reading stamped with the local wall clock
    pub fn now(current_power: f64) -> Self {
        Self::new(current_power, Local::now().naive_local())
    }

    /// Build from the textual `YYYY-MM-DD HH:MM:SS` form
    pub fn parse(current_power: f64, timestamp: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self::new(current_power, parse_timestamp(timestamp)?))
    }

    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// `HH:MM` portion of the timestamp, date and seconds dropped
    pub fn time_of_day(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }

    pub fn power_text(&self) -> String {
        format!("{}W", self.current_power)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.power_text(), self.timestamp_text())
    }
}

pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
}
