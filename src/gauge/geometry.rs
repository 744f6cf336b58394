/*
 *  gauge/geometry.rs
 *
 *  solmon - sun in, watts out
 *  (c) 2020-26 Stuart Hunter
 *
 *  Arc sweep math
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

//! Angles are in degrees, counter-clockwise from 3 o'clock (y up), and an
//! arc is described by its sweep `angle` and the `direction` it is centered
//! on. Conversion to screen space (y down) happens in [`polar_point`].

use embedded_graphics::prelude::Point;

/// Sweep for `power` on a gauge whose full scale `power_max` spans `max_angle`
///
/// Not clamped: power above `power_max` sweeps past `max_angle`.
#[inline]
pub fn sweep_angle(power: f64, power_max: f64, max_angle: f64) -> f64 {
    power / power_max * max_angle
}

/// Center direction that pins the start of the sweep to the left end of the
/// gauge, so the arc grows clockwise from there
#[inline]
pub fn sweep_direction(angle: f64, max_angle: f64) -> f64 {
    (90.0 + max_angle / 2.0) - angle / 2.0
}

/// Screen point at `radius` from `center` along `deg`
#[inline]
pub fn polar_point(center: Point, radius: f32, deg: f64) -> Point {
    let rad = deg.to_radians() as f32;
    let (s, c) = (rad.sin(), rad.cos());
    Point::new(
        center.x + (c * radius).round() as i32,
        center.y - (s * radius).round() as i32,
    )
}

/// `segments + 1` points along the arc, from its counter-clockwise end
/// round to its clockwise end
pub fn arc_points(center: Point, radius: f32, angle: f64, direction: f64, segments: u32) -> Vec<Point> {
    let segments = segments.max(1);
    let start = direction + angle / 2.0;
    let step = angle / segments as f64;
    (0..=segments)
        .map(|i| polar_point(center, radius, start - step * i as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_scale() {
        let angle = sweep_angle(500.0, 1000.0, 270.0);
        assert_eq!(angle, 135.0);
        assert_eq!(sweep_direction(angle, 270.0), 157.5);
    }

    #[test]
    fn test_full_scale_is_centered_on_top() {
        let angle = sweep_angle(1000.0, 1000.0, 270.0);
        assert_eq!(angle, 270.0);
        assert_eq!(sweep_direction(angle, 270.0), 90.0);
        // empty gauge sits at the lower left
        assert_eq!(sweep_direction(0.0, 270.0), 225.0);
    }

    #[test]
    fn test_no_clamping() {
        assert_eq!(sweep_angle(2000.0, 1000.0, 270.0), 540.0);
    }

    #[test]
    fn test_start_is_fixed() {
        // every sweep starts at direction + angle / 2 == 225 degrees
        for power in [0.0, 100.0, 500.0, 1000.0] {
            let angle = sweep_angle(power, 1000.0, 270.0);
            assert_eq!(sweep_direction(angle, 270.0) + angle / 2.0, 225.0);
        }
    }

    #[test]
    fn test_polar_point_screen_axes() {
        let c = Point::new(100, 100);
        assert_eq!(polar_point(c, 10.0, 0.0), Point::new(110, 100));
        assert_eq!(polar_point(c, 10.0, 90.0), Point::new(100, 90));
        assert_eq!(polar_point(c, 10.0, 180.0), Point::new(90, 100));
        assert_eq!(polar_point(c, 10.0, 270.0), Point::new(100, 110));
    }

    #[test]
    fn test_arc_points_run_clockwise() {
        let c = Point::new(50, 50);
        let pts = arc_points(c, 20.0, 180.0, 90.0, 2);
        assert_eq!(pts, vec![Point::new(30, 50), Point::new(50, 30), Point::new(70, 50)]);
        assert_eq!(arc_points(c, 20.0, 90.0, 90.0, 0).len(), 2);
    }
}
