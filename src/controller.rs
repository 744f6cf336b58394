/*
 *  controller.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Poll cycle: acquire, update, present, sleep
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

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::fault::Fault;
use crate::gauge::GaugeRenderer;
use crate::source::DataSource;
use crate::surface::{DisplaySurface, Frame};

/// Longest uninterrupted nap between stop flag checks
const STOP_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Gauge presented with this many watts
    Rendered(f64),
    /// Cycle failed; `shown` tells whether the error panel reached the panel
    Faulted { shown: bool },
}

pub struct Controller<S, D>
where
    S: DataSource,
    D: DisplaySurface,
{
    source: S,
    renderer: GaugeRenderer,
    surface: D,
    interval: Duration,
    cycles: u64,
}

impl<S, D> Controller<S, D>
where
    S: DataSource,
    D: DisplaySurface,
{
    pub fn new(source: S, renderer: GaugeRenderer, surface: D, interval: Duration) -> Self {
        Self {
            source,
            renderer,
            surface,
            interval,
            cycles: 0,
        }
    }

    pub fn renderer(&self) -> &GaugeRenderer {
        &self.renderer
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Build the gauge for the panel we own
    pub fn start(&mut self) {
        let (w, h) = self.surface.dimensions();
        self.renderer.create(w, h);
    }

    /// One poll: any fault is logged, shown if possible, and dropped
    pub fn cycle(&mut self) -> CycleOutcome {
        self.cycles += 1;
        match self.try_cycle() {
            Ok(power) => CycleOutcome::Rendered(power),
            Err(fault) => {
                let shown = match self.renderer.handle_fault(&fault) {
                    Some(panel) => match self.surface.present(Frame::Error(&panel)) {
                        Ok(()) => true,
                        Err(e) => {
                            warn!("error panel not shown: {}", e);
                            false
                        }
                    },
                    None => false,
                };
                CycleOutcome::Faulted { shown }
            }
        }
    }

    fn try_cycle(&mut self) -> Result<f64, Fault> {
        let reading = self.source.produce_reading()?;
        debug!("cycle {} {} reading {}", self.cycles, self.source.name(), reading);
        let view = self.renderer.update(&reading)?;
        self.surface.present(Frame::Gauge(view))?;
        Ok(reading.current_power)
    }

    pub fn shutdown(&mut self) {
        info!("shutting down after {} cycles", self.cycles);
        self.renderer.clear();
    }

    /// Cycle every `interval` until `stop` is raised
    pub fn run(&mut self, stop: &AtomicBool) {
        self.start();
        while !stop.load(Ordering::Relaxed) {
            self.cycle();
            self.nap(stop);
        }
        self.shutdown();
    }

    fn nap(&self, stop: &AtomicBool) {
        let until = Instant::now() + self.interval;
        loop {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            let left = until.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return;
            }
            thread::sleep(left.min(STOP_POLL));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauge::GaugeStyle;
    use crate::inverter::TransportError;
    use crate::reading::Reading;
    use crate::source::MockSource;
    use crate::surface::FrameBufferSurface;
    use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
    use std::sync::Arc;

    /// Fails on the listed call numbers (1-based), otherwise 100 W
    struct FlakySource {
        calls: usize,
        fail_on: Vec<usize>,
    }

    impl DataSource for FlakySource {
        fn produce_reading(&mut self) -> Result<Reading, TransportError> {
            self.calls += 1;
            if self.fail_on.contains(&self.calls) {
                return Err(TransportError::Closed);
            }
            Ok(Reading::parse(100.0 * self.calls as f64, "2024-03-01 14:05:09").unwrap())
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn controller<S: DataSource>(source: S) -> Controller<S, FrameBufferSurface> {
        Controller::new(
            source,
            GaugeRenderer::new(GaugeStyle::default()),
            FrameBufferSurface::new(240, 240),
            Duration::from_millis(1),
        )
    }

    #[test]
    fn test_cycle_renders() {
        let mut c = controller(MockSource::new(vec![150.0]).unwrap());
        c.start();
        assert_eq!(c.cycle(), CycleOutcome::Rendered(150.0));
        assert_eq!(c.surface().flush_count(), 1);
        assert!(c.surface().count(Rgb888::YELLOW) > 0);
    }

    #[test]
    fn test_fault_is_cycle_scoped() {
        let mut c = controller(FlakySource { calls: 0, fail_on: vec![2] });
        c.start();
        assert_eq!(c.cycle(), CycleOutcome::Rendered(100.0));
        let before = c.renderer().view().cloned();

        assert_eq!(c.cycle(), CycleOutcome::Faulted { shown: true });
        // gauge state untouched, error panel on screen
        assert_eq!(c.renderer().view().cloned(), before);
        assert_eq!(c.surface().count(Rgb888::GREEN), 0);
        assert!(c.surface().count(Rgb888::RED) > 0);

        assert_eq!(c.cycle(), CycleOutcome::Rendered(300.0));
        assert_eq!(c.surface().flush_count(), 3);
    }

    #[test]
    fn test_fault_before_start_is_not_shown() {
        let mut c = controller(FlakySource { calls: 0, fail_on: vec![1] });
        assert_eq!(c.cycle(), CycleOutcome::Faulted { shown: false });
        assert_eq!(c.surface().flush_count(), 0);
    }

    #[test]
    fn test_cycle_without_start_is_precondition_fault() {
        let mut c = controller(MockSource::new(vec![10.0]).unwrap());
        assert_eq!(c.cycle(), CycleOutcome::Faulted { shown: false });
        assert!(!c.renderer().is_active());
    }

    #[test]
    fn test_shutdown_clears() {
        let mut c = controller(MockSource::new(vec![10.0]).unwrap());
        c.start();
        c.cycle();
        c.shutdown();
        assert!(!c.renderer().is_active());
    }

    #[test]
    fn test_run_stops_on_flag() {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = thread::spawn(move || {
            let mut c = controller(MockSource::new(vec![10.0, 20.0]).unwrap());
            c.run(&flag);
            (c.cycles(), c.renderer().is_active())
        });
        thread::sleep(Duration::from_millis(50));
        stop.store(true, Ordering::Relaxed);
        let (cycles, active) = handle.join().unwrap();
        assert!(cycles >= 1);
        assert!(!active);
    }

    #[test]
    fn test_nap_returns_promptly_when_stopped() {
        let mut c = controller(MockSource::new(vec![10.0]).unwrap());
        c.interval = Duration::from_secs(60);
        let stop = AtomicBool::new(true);
        let t = Instant::now();
        c.nap(&stop);
        assert!(t.elapsed() < Duration::from_secs(1));
    }
}
