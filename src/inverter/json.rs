/*
 *  inverter/json.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Reader for gateway bridges that publish one JSON snapshot per connection
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
use std::io::{BufRead, BufReader, ErrorKind};

use super::{InverterReader, ReaderTarget, Snapshot, SocketPool, TransportError};

/// Reads `{"current_power": .., "timestamp": ".."}` lines from the gateway
///
/// Every `snapshot()` dials a fresh connection and reads exactly one line,
/// so a stale or half-open socket never outlives a poll cycle.
#[derive(Debug, Clone)]
pub struct JsonSnapshotReader<P: SocketPool> {
    address: String,
    port: u16,
    pool: P,
    debug: bool,
}

impl<P: SocketPool> JsonSnapshotReader<P> {
    pub fn new(address: impl Into<String>, pool: P, port: u16, debug: bool) -> Self {
        Self {
            address: address.into(),
            port,
            pool,
            debug,
        }
    }

    /// Matches the `ReaderFactory` signature
    pub fn create(target: &ReaderTarget, pool: P) -> Result<Self, TransportError> {
        Ok(Self::new(target.address.clone(), pool, target.port, target.debug))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl<P: SocketPool> InverterReader for JsonSnapshotReader<P> {
    fn snapshot(&mut self) -> Result<Snapshot, TransportError> {
        let stream = self.pool.open(&self.address, self.port)?;
        let mut reader = BufReader::new(stream);
        let mut line = String::new();

        let n = reader.read_line(&mut line).map_err(|e| match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => {
                TransportError::Timeout(format!("{}:{}", self.address, self.port))
            }
            _ => TransportError::Io(e),
        })?;
        if n == 0 || line.trim().is_empty() {
            return Err(TransportError::Closed);
        }

        if self.debug {
            debug!("gateway {}:{} sent {}", self.address, self.port, line.trim_end());
        }

        Ok(serde_json::from_str(line.trim())?)
    }
}
