/*
 *  main.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Polls the inverter gateway and keeps the power gauge current
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

use anyhow::Context;
use env_logger::Env;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::signal::unix::{signal, SignalKind};

use solmon::config;
use solmon::source;
use solmon::{Controller, FrameBufferSurface, GaugeRenderer};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived
async fn signal_handler() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let started = Instant::now();
    let (cfg, _cli) = config::load().context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(if cfg.debug {"debug"} else {"info"}))
        .format_timestamp_secs()
        .init();

    info!("{} - sun in, watts out", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let source = source::from_config(&cfg).context("selecting data source")?;

    let mut surface = FrameBufferSurface::new(cfg.display.width, cfg.display.height);
    if let Some(path) = &cfg.display.snapshot {
        info!("writing frames to {}", path.display());
        surface = surface.with_snapshot(path);
    }
    let renderer = GaugeRenderer::new(cfg.gauge.clone());
    let mut controller = Controller::new(source, renderer, surface, cfg.interval);

    if cfg.debug {
        info!("startup: {:.3}s", started.elapsed().as_secs_f64());
    }

    // the poll loop blocks on sockets, keep it off the async workers
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    let mut worker = tokio::task::spawn_blocking(move || controller.run(&flag));

    tokio::select! {
        waited = signal_handler() => {
            stop.store(true, Ordering::Relaxed);
            worker.await.context("poll loop panicked")?;
            waited.context("installing signal handlers")?;
        }
        ended = &mut worker => {
            ended.context("poll loop panicked")?;
        }
    }

    info!("{} stopped", env!("CARGO_PKG_NAME"));
    Ok(())
}
