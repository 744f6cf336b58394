/*
 *  inverter/mod.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Contracts for the network transport and the inverter gateway reader
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

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Read;
use thiserror::Error;

use crate::reading::{parse_timestamp, Reading};

pub mod host;
pub mod json;

pub use host::{HostNetwork, HostPool};
pub use json::JsonSnapshotReader;

/// Default gateway port of the inverter ECU
pub const DEFAULT_REMOTE_PORT: u16 = 8899;

/// Anything that goes wrong between us and the inverter gateway
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network layer could not be brought up
    #[error("network unavailable: {0}")]
    Connect(String),

    /// Remote address did not resolve to anything we can dial
    #[error("cannot resolve {0}")]
    Resolve(String),

    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// Gateway closed the socket before sending a snapshot
    #[error("connection closed before a snapshot arrived")]
    Closed,

    #[error("malformed snapshot")]
    Decode(#[from] serde_json::Error),

    #[error("malformed snapshot timestamp")]
    Timestamp(#[from] chrono::ParseError),
}

/// Socket factory handed to the reader; cheap to clone
pub trait SocketPool: Clone + Send {
    type Stream: Read + Send;

    /// Open a blocking stream to `address:port`
    fn open(&self, address: &str, port: u16) -> Result<Self::Stream, TransportError>;
}

/// Lower-level link (radio, interface) that must be up before sockets work
pub trait NetworkTransport: Send {
    type Pool: SocketPool;

    fn is_connected(&self) -> bool;

    /// Bring the link up; only called while `is_connected()` is false
    fn connect(&mut self) -> Result<(), TransportError>;

    fn pool(&self) -> Self::Pool;
}

/// Gateway handle; every call performs fresh protocol I/O
pub trait InverterReader: Send {
    fn snapshot(&mut self) -> Result<Snapshot, TransportError>;
}

/// Where the reader should dial, plus the debug flag it is built with
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderTarget {
    pub address: String,
    pub port: u16,
    pub debug: bool,
}

/// Constructs the reader handle bound to a target and a socket pool
pub trait ReaderFactory<P: SocketPool>: Send {
    type Reader: InverterReader;

    fn create(&self, target: &ReaderTarget, pool: P) -> Result<Self::Reader, TransportError>;
}

impl<P, R, F> ReaderFactory<P> for F
where
    P: SocketPool,
    R: InverterReader,
    F: Fn(&ReaderTarget, P) -> Result<R, TransportError> + Send,
{
    type Reader = R;

    fn create(&self, target: &ReaderTarget, pool: P) -> Result<R, TransportError> {
        self(target, pool)
    }
}

/// Gateway state as reported by the reader
///
/// Only `current_power` and `timestamp` are consumed; anything else the
/// gateway sends is kept for debug logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(deserialize_with = "deserialize_power")]
    pub current_power: f64,
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn new(current_power: f64, timestamp: impl Into<String>) -> Self {
        Self {
            current_power,
            timestamp: timestamp.into(),
            extra: BTreeMap::new(),
        }
    }
}

impl TryFrom<Snapshot> for Reading {
    type Error = TransportError;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        let timestamp = parse_timestamp(&snapshot.timestamp)?;
        Ok(Reading::new(snapshot.current_power, timestamp))
    }
}

/// Accepts `123`, `123.4` or `"123"`; gateways are not consistent about quoting
fn deserialize_power<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let v = Value::deserialize(deserializer)?;
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|p: &f64| p.is_finite())
        .ok_or_else(|| D::Error::custom(format!("current_power is not a number: {}", v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lenient_power() {
        let s: Snapshot =
            serde_json::from_str(r#"{"current_power":"512","timestamp":"2024-03-01 14:05:09"}"#).unwrap();
        assert_eq!(s.current_power, 512.0);

        let s: Snapshot = serde_json::from_str(
            r#"{"current_power":87.5,"timestamp":"2024-03-01 14:05:09","today_energy":3.2}"#,
        )
        .unwrap();
        assert_eq!(s.current_power, 87.5);
        assert_eq!(s.extra.get("today_energy"), Some(&serde_json::json!(3.2)));
    }

    #[test]
    fn test_snapshot_rejects_garbage_power() {
        let r: Result<Snapshot, _> =
            serde_json::from_str(r#"{"current_power":"lots","timestamp":"2024-03-01 14:05:09"}"#);
        assert!(r.is_err());
        let r: Result<Snapshot, _> = serde_json::from_str(r#"{"timestamp":"2024-03-01 14:05:09"}"#);
        assert!(r.is_err());
    }

    #[test]
    fn test_snapshot_to_reading() {
        let reading = Reading::try_from(Snapshot::new(300.0, "2024-03-01 14:05:09")).unwrap();
        assert_eq!(reading.current_power, 300.0);
        assert_eq!(reading.time_of_day(), "14:05");

        let err = Reading::try_from(Snapshot::new(300.0, "yesterday")).unwrap_err();
        assert!(matches!(err, TransportError::Timestamp(_)));
    }
}
