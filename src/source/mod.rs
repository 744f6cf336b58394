/*
 *  source/mod.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Data sources producing one reading per poll cycle
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

use log::info;

use crate::config::{AppConfig, ConfigError};
use crate::inverter::{HostNetwork, HostPool, JsonSnapshotReader, ReaderTarget, TransportError};
use crate::reading::Reading;

pub mod live;
pub mod mock;

pub use live::LiveSource;
pub use mock::MockSource;

/// Produces the reading for the current poll cycle
///
/// Errors are handed back untouched; retrying is the caller's business.
pub trait DataSource: Send {
    fn produce_reading(&mut self) -> Result<Reading, TransportError>;

    /// Short label for log lines
    fn name(&self) -> &str;
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn produce_reading(&mut self) -> Result<Reading, TransportError> {
        (**self).produce_reading()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

pub type HostReaderFactory =
    fn(&ReaderTarget, HostPool) -> Result<JsonSnapshotReader<HostPool>, TransportError>;

pub type HostLiveSource = LiveSource<HostNetwork, HostReaderFactory>;

/// Pick the source once at startup from the mock switch
pub fn from_config(cfg: &AppConfig) -> Result<Box<dyn DataSource>, ConfigError> {
    if cfg.mock {
        let source = MockSource::new(cfg.mock_values.clone()).ok_or_else(|| {
            ConfigError::Validation("mock mode needs at least one mock value".into())
        })?;
        info!("using mock source with {} values", cfg.mock_values.len());
        return Ok(Box::new(source));
    }

    let address = cfg.remote_address.clone().ok_or_else(|| {
        ConfigError::Validation("remote_address is required unless mock mode is on".into())
    })?;
    let target = ReaderTarget {
        address,
        port: cfg.remote_port,
        debug: cfg.debug,
    };
    info!("using live source, gateway {}:{}", target.address, target.port);

    let pool = HostPool {
        connect_timeout: cfg.connect_timeout,
        read_timeout: cfg.read_timeout,
    };
    let factory: HostReaderFactory = JsonSnapshotReader::create;
    let source: HostLiveSource = LiveSource::new(HostNetwork::new(pool), factory, target);
    Ok(Box::new(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_switch_selects_mock() {
        let cfg = AppConfig {
            mock: true,
            mock_values: vec![1.0, 2.0],
            ..AppConfig::default()
        };
        let mut source = from_config(&cfg).unwrap();
        assert_eq!(source.name(), "mock");
        assert_eq!(source.produce_reading().unwrap().current_power, 1.0);
    }

    #[test]
    fn test_live_requires_address() {
        let cfg = AppConfig {
            mock: false,
            remote_address: None,
            ..AppConfig::default()
        };
        assert!(matches!(from_config(&cfg), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_live_is_lazy() {
        // building the live source must not touch the network
        let cfg = AppConfig {
            mock: false,
            remote_address: Some("192.0.2.1".into()),
            ..AppConfig::default()
        };
        let source = from_config(&cfg).unwrap();
        assert_eq!(source.name(), "live");
    }
}
