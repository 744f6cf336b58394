/*
 *  inverter/host.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host network transport over std::net
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

use local_ip_address::local_ip;
use log::{debug, info};
use std::net::{IpAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::{NetworkTransport, SocketPool, TransportError};

/// Blocking TCP socket factory with per-socket timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostPool {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for HostPool {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
        }
    }
}

impl SocketPool for HostPool {
    type Stream = TcpStream;

    fn open(&self, address: &str, port: u16) -> Result<TcpStream, TransportError> {
        let addrs = (address, port)
            .to_socket_addrs()
            .map_err(|_| TransportError::Resolve(format!("{}:{}", address, port)))?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.read_timeout))?;
                    debug!("connected to {}", addr);
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }

        match last_err {
            Some(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                Err(TransportError::Timeout(format!("{}:{}", address, port)))
            }
            Some(e) => Err(TransportError::Io(e)),
            None => Err(TransportError::Resolve(format!("{}:{}", address, port))),
        }
    }
}

/// Host networking: the OS owns the interface, "connecting" means having a
/// routable local address
#[derive(Debug, Default)]
pub struct HostNetwork {
    pool: HostPool,
    local_addr: Option<IpAddr>,
}

impl HostNetwork {
    pub fn new(pool: HostPool) -> Self {
        Self { pool, local_addr: None }
    }

    pub fn local_addr(&self) -> Option<IpAddr> {
        self.local_addr
    }
}

impl NetworkTransport for HostNetwork {
    type Pool = HostPool;

    fn is_connected(&self) -> bool {
        self.local_addr.is_some()
    }

    fn connect(&mut self) -> Result<(), TransportError> {
        let ip = local_ip().map_err(|e| TransportError::Connect(e.to_string()))?;
        info!("network up, local address {}", ip);
        self.local_addr = Some(ip);
        Ok(())
    }

    fn pool(&self) -> HostPool {
        self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_open_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            sock.write_all(b"hello\n").unwrap();
        });

        let mut stream = HostPool::default().open("127.0.0.1", port).unwrap();
        let mut buf = String::new();
        stream.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "hello\n");
        server.join().unwrap();
    }

    #[test]
    fn test_open_refused() {
        // bind then drop to get a port nobody listens on
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let err = HostPool::default().open("127.0.0.1", port).unwrap_err();
        assert!(matches!(err, TransportError::Io(_) | TransportError::Timeout(_)));
    }

    #[test]
    fn test_not_connected_until_connect() {
        let net = HostNetwork::default();
        assert!(!net.is_connected());
        assert_eq!(net.local_addr(), None);
    }
}
