/*
 *  source/live.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Live source backed by the inverter gateway reader
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

use log::{debug, info};

use super::DataSource;
use crate::inverter::{InverterReader, NetworkTransport, ReaderFactory, ReaderTarget, TransportError};
use crate::reading::Reading;

/// Reader handle, built on first use
#[derive(Debug)]
pub enum ReaderHandle<R> {
    Uninitialized,
    Ready(R),
}

impl<R> ReaderHandle<R> {
    pub fn is_ready(&self) -> bool {
        matches!(self, ReaderHandle::Ready(_))
    }

    fn get_or_try_init<E>(&mut self, init: impl FnOnce() -> Result<R, E>) -> Result<&mut R, E> {
        if let ReaderHandle::Uninitialized = self {
            *self = ReaderHandle::Ready(init()?);
        }
        match self {
            ReaderHandle::Ready(reader) => Ok(reader),
            ReaderHandle::Uninitialized => unreachable!("reader handle initialized above"),
        }
    }
}

/// Polls the gateway through a lazily constructed reader
///
/// The first call brings the transport up (if needed) and builds the reader.
/// A failure on the way leaves the handle uninitialized, so the next cycle
/// starts over. Faults are never retried or masked here.
pub struct LiveSource<T, F>
where
    T: NetworkTransport,
    F: ReaderFactory<T::Pool>,
{
    transport: T,
    factory: F,
    target: ReaderTarget,
    handle: ReaderHandle<F::Reader>,
}

impl<T, F> LiveSource<T, F>
where
    T: NetworkTransport,
    F: ReaderFactory<T::Pool>,
{
    pub fn new(transport: T, factory: F, target: ReaderTarget) -> Self {
        Self {
            transport,
            factory,
            target,
            handle: ReaderHandle::Uninitialized,
        }
    }

    pub fn handle(&self) -> &ReaderHandle<F::Reader> {
        &self.handle
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn create_reader(transport: &mut T, factory: &F, target: &ReaderTarget) -> Result<F::Reader, TransportError> {
        if !transport.is_connected() {
            info!("bringing network up");
            transport.connect()?;
        }
        debug!("creating inverter reader for {}:{}", target.address, target.port);
        factory.create(target, transport.pool())
    }
}

impl<T, F> DataSource for LiveSource<T, F>
where
    T: NetworkTransport,
    F: ReaderFactory<T::Pool>,
{
    fn produce_reading(&mut self) -> Result<Reading, TransportError> {
        let Self { transport, factory, target, handle } = self;
        let reader = handle.get_or_try_init(|| Self::create_reader(transport, factory, target))?;

        debug!("reading gateway data...");
        let snapshot = reader.snapshot()?;
        debug!("gateway snapshot {:?}", snapshot);

        Reading::try_from(snapshot)
    }

    fn name(&self) -> &str {
        "live"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inverter::{Snapshot, SocketPool};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Counters {
        connects: usize,
        creates: usize,
        snapshots: usize,
    }

    #[derive(Clone)]
    struct NullPool;

    impl SocketPool for NullPool {
        type Stream = Cursor<Vec<u8>>;

        fn open(&self, _address: &str, _port: u16) -> Result<Self::Stream, TransportError> {
            Ok(Cursor::new(Vec::new()))
        }
    }

    struct FakeTransport {
        connected: bool,
        fail_connect: bool,
        counters: Arc<Mutex<Counters>>,
    }

    impl NetworkTransport for FakeTransport {
        type Pool = NullPool;

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn connect(&mut self) -> Result<(), TransportError> {
            self.counters.lock().unwrap().connects += 1;
            if self.fail_connect {
                return Err(TransportError::Connect("no carrier".into()));
            }
            self.connected = true;
            Ok(())
        }

        fn pool(&self) -> NullPool {
            NullPool
        }
    }

    struct FakeReader {
        script: Vec<Result<Snapshot, TransportError>>,
        counters: Arc<Mutex<Counters>>,
    }

    impl InverterReader for FakeReader {
        fn snapshot(&mut self) -> Result<Snapshot, TransportError> {
            self.counters.lock().unwrap().snapshots += 1;
            self.script.remove(0)
        }
    }

    fn source(
        connected: bool,
        fail_connect: bool,
        script: Vec<Result<Snapshot, TransportError>>,
    ) -> (impl DataSource, Arc<Mutex<Counters>>) {
        let counters = Arc::new(Mutex::new(Counters::default()));
        let transport = FakeTransport {
            connected,
            fail_connect,
            counters: counters.clone(),
        };
        let script = Mutex::new(Some(script));
        let factory_counters = counters.clone();
        let factory = move |target: &ReaderTarget, _pool: NullPool| -> Result<FakeReader, TransportError> {
            assert_eq!(target.address, "10.0.0.7");
            factory_counters.lock().unwrap().creates += 1;
            Ok(FakeReader {
                script: script.lock().unwrap().take().unwrap_or_default(),
                counters: factory_counters.clone(),
            })
        };
        let target = ReaderTarget {
            address: "10.0.0.7".into(),
            port: 8899,
            debug: true,
        };
        (LiveSource::new(transport, factory, target), counters)
    }

    #[test]
    fn test_lazy_connect_and_create_once() {
        let (mut src, counters) = source(
            false,
            false,
            vec![
                Ok(Snapshot::new(100.0, "2024-03-01 14:05:09")),
                Ok(Snapshot::new(200.0, "2024-03-01 14:06:09")),
            ],
        );
        assert_eq!(counters.lock().unwrap().creates, 0);

        assert_eq!(src.produce_reading().unwrap().current_power, 100.0);
        let r = src.produce_reading().unwrap();
        assert_eq!(r.current_power, 200.0);
        assert_eq!(r.time_of_day(), "14:06");

        let c = counters.lock().unwrap();
        assert_eq!(c.connects, 1);
        assert_eq!(c.creates, 1);
        assert_eq!(c.snapshots, 2);
    }

    #[test]
    fn test_skips_connect_when_already_up() {
        let (mut src, counters) = source(true, false, vec![Ok(Snapshot::new(1.0, "2024-03-01 14:05:09"))]);
        src.produce_reading().unwrap();
        assert_eq!(counters.lock().unwrap().connects, 0);
    }

    #[test]
    fn test_reader_fault_propagates_without_retry() {
        let (mut src, counters) = source(
            true,
            false,
            vec![
                Err(TransportError::Closed),
                Ok(Snapshot::new(5.0, "2024-03-01 14:05:09")),
            ],
        );
        assert!(matches!(src.produce_reading(), Err(TransportError::Closed)));
        assert_eq!(counters.lock().unwrap().snapshots, 1);
        // next cycle proceeds normally on the same handle
        assert_eq!(src.produce_reading().unwrap().current_power, 5.0);
        assert_eq!(counters.lock().unwrap().creates, 1);
    }

    #[test]
    fn test_failed_connect_leaves_handle_uninitialized() {
        let counters = Arc::new(Mutex::new(Counters::default()));
        let transport = FakeTransport {
            connected: false,
            fail_connect: true,
            counters: counters.clone(),
        };
        let factory = |_: &ReaderTarget, _: NullPool| -> Result<FakeReader, TransportError> {
            panic!("reader must not be built without a network");
        };
        let target = ReaderTarget {
            address: "10.0.0.7".into(),
            port: 8899,
            debug: false,
        };
        let mut src = LiveSource::new(transport, factory, target);

        assert!(matches!(src.produce_reading(), Err(TransportError::Connect(_))));
        assert!(!src.handle().is_ready());
        assert!(matches!(src.produce_reading(), Err(TransportError::Connect(_))));
        assert_eq!(counters.lock().unwrap().connects, 2);
    }

    #[test]
    fn test_bad_timestamp_is_transport_fault() {
        let (mut src, _) = source(true, false, vec![Ok(Snapshot::new(1.0, "soon"))]);
        assert!(matches!(src.produce_reading(), Err(TransportError::Timestamp(_))));
    }
}
