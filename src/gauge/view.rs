/*
 *  gauge/view.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Drawable nodes of the gauge and the error panel
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

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Polyline, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, LineHeight, Text, TextStyleBuilder};
use embedded_text::alignment::{HorizontalAlignment, VerticalAlignment};
use embedded_text::style::TextBoxStyleBuilder;
use embedded_text::TextBox;

use super::geometry::{arc_points, polar_point};
use crate::fonts::FontRef;
use crate::palette::NamedColor;

/// Thick arc band, `width` pixels inward from `radius`
#[derive(Debug, Clone, PartialEq)]
pub struct ArcNode {
    pub center: Point,
    pub radius: u32,
    pub width: u32,
    pub angle: f64,
    pub direction: f64,
    pub segments: u32,
    pub outline: NamedColor,
    pub fill: NamedColor,
}

impl ArcNode {
    fn edge(&self, radius: u32) -> Vec<Point> {
        arc_points(self.center, radius as f32, self.angle, self.direction, self.segments)
    }
}

impl Drawable for ArcNode {
    type Color = Rgb888;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if self.angle <= 0.0 || self.radius == 0 || self.width == 0 {
            return Ok(());
        }
        let width = self.width.min(self.radius);
        let mid = self.radius as f32 - width as f32 / 2.0;

        let band = arc_points(self.center, mid, self.angle, self.direction, self.segments);
        Polyline::new(&band)
            .into_styled(PrimitiveStyle::with_stroke(self.fill.to_rgb(), width))
            .draw(target)?;

        if self.outline == self.fill {
            return Ok(());
        }

        let style = PrimitiveStyle::with_stroke(self.outline.to_rgb(), 1);
        let inner = self.radius - width;
        Polyline::new(&self.edge(self.radius)).into_styled(style).draw(target)?;
        Polyline::new(&self.edge(inner)).into_styled(style).draw(target)?;

        // end caps
        let half = self.angle / 2.0;
        for deg in [self.direction + half, self.direction - half] {
            let p_in = polar_point(self.center, inner as f32, deg);
            let p_out = polar_point(self.center, self.radius as f32, deg);
            Line::new(p_in, p_out).into_styled(style).draw(target)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    TopCenter,
    TopLeft,
}

impl Anchor {
    fn alignment(self) -> (Alignment, Baseline) {
        match self {
            Anchor::Center => (Alignment::Center, Baseline::Middle),
            Anchor::TopCenter => (Alignment::Center, Baseline::Top),
            Anchor::TopLeft => (Alignment::Left, Baseline::Top),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelNode {
    pub text: String,
    pub color: NamedColor,
    pub font: FontRef,
    pub anchor: Anchor,
    pub position: Point,
}

impl Drawable for LabelNode {
    type Color = Rgb888;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let (alignment, baseline) = self.anchor.alignment();
        let text_style = TextStyleBuilder::new().alignment(alignment).baseline(baseline).build();
        let character_style = MonoTextStyle::new(self.font.font(), self.color.to_rgb());
        Text::with_text_style(&self.text, self.position, character_style, text_style).draw(target)?;
        Ok(())
    }
}

/// The gauge, one named slot per node
///
/// Drawn back to front: ring, dynamic arc, power, time.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeView {
    pub background_color: NamedColor,
    pub background: ArcNode,
    pub power_label: LabelNode,
    pub time_label: LabelNode,
    /// Empty until the first reading
    pub dynamic_arc: Option<ArcNode>,
}

impl GaugeView {
    pub fn node_count(&self) -> usize {
        3 + self.dynamic_arc.is_some() as usize
    }
}

impl Drawable for GaugeView {
    type Color = Rgb888;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        self.background.draw(target)?;
        if let Some(arc) = &self.dynamic_arc {
            arc.draw(target)?;
        }
        self.power_label.draw(target)?;
        self.time_label.draw(target)
    }
}

/// Single text panel replacing the gauge for one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorView {
    pub background_color: NamedColor,
    pub text: String,
    pub color: NamedColor,
    pub font: FontRef,
    pub bounds: Rectangle,
}

impl Drawable for ErrorView {
    type Color = Rgb888;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let character_style = MonoTextStyle::new(self.font.font(), self.color.to_rgb());
        let textbox_style = TextBoxStyleBuilder::new()
            .alignment(HorizontalAlignment::Left)
            .vertical_alignment(VerticalAlignment::Top)
            .line_height(LineHeight::Percent(120))
            .build();
        TextBox::with_textbox_style(&self.text, self.bounds, character_style, textbox_style)
            .draw(target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts;
    use crate::surface::FrameBufferSurface;
    use embedded_graphics::pixelcolor::RgbColor;

    fn ring(outline: NamedColor, fill: NamedColor, angle: f64) -> ArcNode {
        ArcNode {
            center: Point::new(60, 60),
            radius: 50,
            width: 10,
            angle,
            direction: 90.0,
            segments: 60,
            outline,
            fill,
        }
    }

    #[test]
    fn test_ring_draws_outline_only_on_black() {
        let mut fb = FrameBufferSurface::new(120, 120);
        ring(NamedColor::White, NamedColor::Black, 270.0).draw(&mut fb).unwrap();
        assert!(fb.count(Rgb888::WHITE) > 0);
        // band interior at the top stays background
        assert_eq!(fb.pixel(60, 15), Some(Rgb888::BLACK));
        assert_eq!(fb.pixel(60, 10), Some(Rgb888::WHITE));
    }

    #[test]
    fn test_band_is_filled() {
        let mut fb = FrameBufferSurface::new(120, 120);
        ring(NamedColor::Green, NamedColor::Green, 270.0).draw(&mut fb).unwrap();
        assert_eq!(fb.pixel(60, 15), Some(Rgb888::GREEN));
        // open bottom of the gauge
        assert_eq!(fb.pixel(60, 105), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_zero_sweep_draws_nothing() {
        let mut fb = FrameBufferSurface::new(120, 120);
        ring(NamedColor::Green, NamedColor::Green, 0.0).draw(&mut fb).unwrap();
        assert_eq!(fb.count(Rgb888::BLACK), 120 * 120);
    }

    #[test]
    fn test_label_and_panel_draw() {
        let mut fb = FrameBufferSurface::new(120, 120);
        LabelNode {
            text: "500W".into(),
            color: NamedColor::Yellow,
            font: fonts::default_large(),
            anchor: Anchor::Center,
            position: Point::new(60, 60),
        }
        .draw(&mut fb)
        .unwrap();
        assert!(fb.count(Rgb888::YELLOW) > 0);

        let mut fb = FrameBufferSurface::new(120, 120);
        ErrorView {
            background_color: NamedColor::Black,
            text: "TransportError: socket error\ncaused by: refused".into(),
            color: NamedColor::White,
            font: fonts::default_error(),
            bounds: Rectangle::new(Point::zero(), Size::new(120, 120)),
        }
        .draw(&mut fb)
        .unwrap();
        assert!(fb.count(Rgb888::WHITE) > 0);
        // top-left anchored
        let lit_top = (0..20).any(|y| (0..120).any(|x| fb.pixel(x, y) == Some(Rgb888::WHITE)));
        assert!(lit_top);
    }
}
