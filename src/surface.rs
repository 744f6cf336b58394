/*
 *  surface.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display surface contract and an in-memory RGB framebuffer surface
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

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::gauge::{ErrorView, GaugeView};

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("cannot write snapshot {}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What to put on the panel this cycle
#[derive(Debug, Clone, Copy)]
pub enum Frame<'a> {
    Gauge(&'a GaugeView),
    Error(&'a ErrorView),
}

impl Frame<'_> {
    pub fn background(&self) -> Rgb888 {
        match self {
            Frame::Gauge(view) => view.background_color.to_rgb(),
            Frame::Error(view) => view.background_color.to_rgb(),
        }
    }
}

impl Drawable for Frame<'_> {
    type Color = Rgb888;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        match self {
            Frame::Gauge(view) => view.draw(target),
            Frame::Error(view) => view.draw(target),
        }
    }
}

/// A panel the controller can present frames on
///
/// Size is read once when the gauge is created.
pub trait DisplaySurface: DrawTarget<Color = Rgb888, Error = DisplayError> {
    fn dimensions(&self) -> (u32, u32) {
        let size = self.bounding_box().size;
        (size.width, size.height)
    }

    /// Push the drawn frame out to the device
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Clear to the frame background, draw, flush
    fn present(&mut self, frame: Frame<'_>) -> Result<(), DisplayError>
    where
        Self: Sized,
    {
        self.clear(frame.background())?;
        frame.draw(self)?;
        self.flush()
    }
}

/// Runtime-sized RGB framebuffer
///
/// Stands in for a panel on the host; when a snapshot path is set every
/// flush writes the frame out as a binary PPM.
#[derive(Debug, Clone)]
pub struct FrameBufferSurface {
    buf: Vec<Rgb888>,
    w: usize,
    h: usize,
    snapshot: Option<PathBuf>,
    flushes: usize,
}

impl FrameBufferSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self {
            buf: vec![Rgb888::BLACK; w * h],
            w,
            h,
            snapshot: None,
            flushes: 0,
        }
    }

    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(path.into());
        self
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        self.idx(Point::new(x as i32, y as i32)).map(|i| self.buf[i])
    }

    /// Number of pixels currently set to `color`
    pub fn count(&self, color: Rgb888) -> usize {
        self.buf.iter().filter(|&&c| c == color).count()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn as_slice(&self) -> &[Rgb888] {
        &self.buf
    }

    /// Binary PPM (P6), rows top to bottom
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.w, self.h)?;
        let mut row = Vec::with_capacity(self.w * 3);
        for line in self.buf.chunks(self.w.max(1)) {
            row.clear();
            for c in line {
                row.extend_from_slice(&[c.r(), c.g(), c.b()]);
            }
            out.write_all(&row)?;
        }
        out.flush()
    }

    fn save_snapshot(&self, path: &Path) -> io::Result<()> {
        // write aside, then swap in, so a viewer never sees half a frame
        let tmp = path.with_extension("ppm.part");
        self.write_ppm(BufWriter::new(File::create(&tmp)?))?;
        fs::rename(&tmp, path)
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl OriginDimensions for FrameBufferSurface {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl DrawTarget for FrameBufferSurface {
    type Color = Rgb888;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let (x0, x1) = (area.top_left.x as usize, bottom_right.x as usize);
        for y in area.top_left.y as usize..=bottom_right.y as usize {
            let base = y * self.w;
            self.buf[base + x0..=base + x1].fill(color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }
}

impl DisplaySurface for FrameBufferSurface {
    fn flush(&mut self) -> Result<(), DisplayError> {
        self.flushes += 1;
        if let Some(path) = &self.snapshot {
            self.save_snapshot(path).map_err(|source| DisplayError::Snapshot {
                path: path.clone(),
                source,
            })?;
            debug!("frame {} written to {}", self.flushes, path.display());
        }
        Ok(())
    }
}
