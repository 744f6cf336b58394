/*
 *  gauge/mod.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Power gauge renderer: owns the view, maps readings onto it
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

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use log::{debug, error};
use thiserror::Error;

use crate::color_range::ColorRanges;
use crate::fault::Fault;
use crate::fonts::{self, FontRef};
use crate::palette::NamedColor;
use crate::reading::Reading;

pub mod geometry;
pub mod view;

pub use geometry::{sweep_angle, sweep_direction};
pub use view::{Anchor, ArcNode, ErrorView, GaugeView, LabelNode};

pub const DEFAULT_POWER_MAX: f64 = 1000.0;
pub const DEFAULT_MAX_ANGLE: f64 = 270.0;
pub const DEFAULT_ARC_WIDTH: u32 = 10;
pub const DEFAULT_ARC_SEGMENTS: u32 = 60;
pub const DEFAULT_MARGIN: u32 = 5;
pub const DEFAULT_PADDING: u32 = 10;

const FAULT_RULE_WIDTH: usize = 60;

#[derive(Debug, Error, PartialEq)]
pub enum GaugeError {
    #[error("gauge updated before it was created")]
    NotCreated,
}

/// Static look of the gauge, fixed at startup
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeStyle {
    pub power_max: f64,
    pub ranges: ColorRanges,
    pub max_angle: f64,
    pub arc_width: u32,
    pub arc_segments: u32,
    pub margin: u32,
    pub padding: u32,
    pub foreground: NamedColor,
    pub background: NamedColor,
    /// Label color before the first reading arrives, also the error text
    pub label_color: NamedColor,
    pub large_font: FontRef,
    pub small_font: FontRef,
    pub error_font: FontRef,
}

impl Default for GaugeStyle {
    fn default() -> Self {
        Self {
            power_max: DEFAULT_POWER_MAX,
            ranges: ColorRanges::default(),
            max_angle: DEFAULT_MAX_ANGLE,
            arc_width: DEFAULT_ARC_WIDTH,
            arc_segments: DEFAULT_ARC_SEGMENTS,
            margin: DEFAULT_MARGIN,
            padding: DEFAULT_PADDING,
            foreground: NamedColor::White,
            background: NamedColor::Black,
            label_color: NamedColor::Red,
            large_font: fonts::default_large(),
            small_font: fonts::default_small(),
            error_font: fonts::default_error(),
        }
    }
}

/// Everything one reading changes on screen
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeState {
    pub power_text: String,
    pub power_color: NamedColor,
    pub time_text: String,
    pub time_color: NamedColor,
    pub arc_angle: f64,
    pub arc_direction: f64,
}

impl GaugeState {
    pub fn derive(reading: &Reading, style: &GaugeStyle) -> Self {
        let color = style.ranges.color_for(reading.current_power);
        let arc_angle = sweep_angle(reading.current_power, style.power_max, style.max_angle);
        Self {
            power_text: reading.power_text(),
            power_color: color,
            time_text: reading.time_of_day(),
            time_color: color,
            arc_angle,
            arc_direction: sweep_direction(arc_angle, style.max_angle),
        }
    }
}

/// Gauge lifecycle: Empty until `create`, Active until `clear`
pub struct GaugeRenderer {
    style: GaugeStyle,
    view: Option<GaugeView>,
    /// Panel size seen by the last `create`; kept across `clear`
    surface: Option<Size>,
}

impl GaugeRenderer {
    pub fn new(style: GaugeStyle) -> Self {
        Self {
            style,
            view: None,
            surface: None,
        }
    }

    pub fn style(&self) -> &GaugeStyle {
        &self.style
    }

    pub fn view(&self) -> Option<&GaugeView> {
        self.view.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.view.is_some()
    }

    /// Build the view for a `width` x `height` panel; no-op while one exists
    pub fn create(&mut self, width: u32, height: u32) {
        if self.view.is_some() {
            return;
        }
        debug!("creating gauge for {}x{}", width, height);
        self.surface = Some(Size::new(width, height));
        self.view = Some(self.layout(width, height));
    }

    fn layout(&self, width: u32, height: u32) -> GaugeView {
        let s = &self.style;
        let (w2, h2) = (width / 2, height / 2);
        let center = Point::new(w2 as i32, h2 as i32);
        let time_y = h2 + s.large_font.height() / 2 + s.padding;

        GaugeView {
            background_color: s.background,
            background: ArcNode {
                center,
                radius: w2.min(h2).saturating_sub(s.margin),
                width: s.arc_width,
                angle: s.max_angle,
                direction: 90.0,
                segments: s.arc_segments,
                outline: s.foreground,
                fill: s.background,
            },
            power_label: LabelNode {
                text: "0W".into(),
                color: s.label_color,
                font: s.large_font,
                anchor: Anchor::Center,
                position: center,
            },
            time_label: LabelNode {
                text: "00:00".into(),
                color: s.label_color,
                font: s.small_font,
                anchor: Anchor::TopCenter,
                position: Point::new(w2 as i32, time_y as i32),
            },
            dynamic_arc: None,
        }
    }

    /// Map `reading` onto the view and hand it back for presenting
    pub fn update(&mut self, reading: &Reading) -> Result<&GaugeView, GaugeError> {
        let state = GaugeState::derive(reading, &self.style);
        let margin = self.style.margin;
        let view = self.view.as_mut().ok_or(GaugeError::NotCreated)?;
        debug!(
            "gauge {} at {} angle {:.1} direction {:.1}",
            state.power_text, state.time_text, state.arc_angle, state.arc_direction
        );

        view.power_label.text = state.power_text;
        view.power_label.color = state.power_color;
        view.time_label.text = state.time_text;
        view.time_label.color = state.time_color;

        // half the margin off each edge keeps the band centred in the ring
        let ring = &view.background;
        let inset = margin / 2;
        view.dynamic_arc = Some(ArcNode {
            center: ring.center,
            radius: ring.radius.saturating_sub(inset),
            width: ring.width.saturating_sub(2 * inset).max(1),
            angle: state.arc_angle,
            direction: state.arc_direction,
            segments: ring.segments,
            outline: state.power_color,
            fill: state.power_color,
        });
        Ok(view)
    }

    /// Drop the view; the next `create` starts from scratch
    pub fn clear(&mut self) {
        if let Some(view) = self.view.take() {
            debug!("clearing gauge, {} nodes", view.node_count());
            drop(view);
        }
    }

    /// Log the fault, and build an error panel once a panel size is known
    pub fn handle_fault(&self, fault: &Fault) -> Option<ErrorView> {
        let rule = "-".repeat(FAULT_RULE_WIDTH);
        let lines = fault.lines();
        error!("{}", rule);
        for line in &lines {
            error!("{}", line);
        }
        error!("{}", rule);

        let size = self.surface?;
        Some(ErrorView {
            background_color: self.style.background,
            text: lines.join("\n"),
            color: self.style.label_color,
            font: self.style.error_font,
            bounds: Rectangle::new(Point::zero(), size),
        })
    }
}
