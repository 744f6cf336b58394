/*
 *  fault.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cycle faults as plain values, ready for the log and the error panel
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

use std::error::Error;
use std::fmt;

use crate::gauge::GaugeError;
use crate::inverter::TransportError;
use crate::surface::DisplayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Socket, link or decode trouble talking to the gateway
    Transport,
    /// Renderer used out of order
    Precondition,
    Display,
    Other,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FaultKind::Transport => "TransportError",
            FaultKind::Precondition => "PreconditionViolation",
            FaultKind::Display => "DisplayError",
            FaultKind::Other => "Error",
        };
        f.write_str(s)
    }
}

/// A failed poll cycle, captured so it can outlive the error that caused it
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
    pub causes: Vec<String>,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Capture `err` and its `source()` chain
    ///
    /// A cause whose text is already part of the line above it is skipped,
    /// thiserror messages often embed their source.
    pub fn from_error(kind: FaultKind, err: &(dyn Error + 'static)) -> Self {
        let mut fault = Self::new(kind, err.to_string());
        let mut above = fault.message.clone();
        let mut next = err.source();
        while let Some(cause) = next {
            let text = cause.to_string();
            if !above.contains(&text) {
                fault.causes.push(text.clone());
            }
            above = text;
            next = cause.source();
        }
        fault
    }

    /// Diagnostic trace, one entry per line, innermost cause last
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(1 + self.causes.len());
        lines.push(format!("{}: {}", self.kind, self.message));
        lines.extend(self.causes.iter().map(|c| format!("caused by: {}", c)));
        lines
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

impl From<&TransportError> for Fault {
    fn from(err: &TransportError) -> Self {
        Fault::from_error(FaultKind::Transport, err)
    }
}

impl From<TransportError> for Fault {
    fn from(err: TransportError) -> Self {
        Fault::from(&err)
    }
}

impl From<GaugeError> for Fault {
    fn from(err: GaugeError) -> Self {
        Fault::from_error(FaultKind::Precondition, &err)
    }
}

impl From<&DisplayError> for Fault {
    fn from(err: &DisplayError) -> Self {
        Fault::from_error(FaultKind::Display, err)
    }
}

impl From<DisplayError> for Fault {
    fn from(err: DisplayError) -> Self {
        Fault::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_lines_single() {
        let f = Fault::new(FaultKind::Other, "boom");
        assert_eq!(f.lines(), vec!["Error: boom".to_string()]);
        assert_eq!(f.to_string(), "Error: boom");
    }

    #[test]
    fn test_transport_chain() {
        let err = TransportError::Decode(serde_json::from_str::<u32>("x").unwrap_err());
        let f = Fault::from(&err);
        assert_eq!(f.kind, FaultKind::Transport);
        assert_eq!(f.message, "malformed snapshot");
        assert_eq!(f.causes.len(), 1);

        let lines = f.lines();
        assert_eq!(lines[0], "TransportError: malformed snapshot");
        assert!(lines[1].starts_with("caused by: "));
    }

    #[test]
    fn test_embedded_source_not_repeated() {
        let err = TransportError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        let f = Fault::from(err);
        assert_eq!(f.message, "socket error: refused");
        assert!(f.causes.is_empty());
    }

    #[test]
    fn test_precondition_kind() {
        let f = Fault::from(GaugeError::NotCreated);
        assert_eq!(f.kind, FaultKind::Precondition);
        assert!(f.lines()[0].starts_with("PreconditionViolation: "));
    }
}
