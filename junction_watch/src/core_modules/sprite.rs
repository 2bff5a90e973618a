// THEORY:
// A `Sprite` is one of the rectangles driving across the camera feed. It has a
// fixed axis and a fixed speed and never interacts with anything. The only
// rule is wrap-around: once a sprite has fully left the far edge (plus a small
// margin) it re-enters from the near edge, so coordinates stay bounded no
// matter how long the feed runs.

use image::Rgb;

/// How far past the far edge a sprite travels before it wraps.
pub const WRAP_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub id: u32,
    /// Top-left corner in canvas pixels.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Rgb<u8>,
    /// Pixels per step.
    pub speed: f32,
    pub axis: Axis,
}

impl Sprite {
    /// Moves one step along the axis and wraps past `canvas_width`/`canvas_height`.
    pub fn advance(&mut self, canvas_width: f32, canvas_height: f32) {
        match self.axis {
            Axis::Horizontal => {
                self.x += self.speed;
                if self.x > canvas_width + WRAP_MARGIN {
                    self.x = -self.width;
                }
            }
            Axis::Vertical => {
                self.y += self.speed;
                if self.y > canvas_height + WRAP_MARGIN {
                    self.y = -self.height;
                }
            }
        }
    }
}

const fn hex(rgb: u32) -> Rgb<u8> {
    Rgb([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8])
}

/// The five vehicles the feed starts with.
pub fn default_fleet() -> Vec<Sprite> {
    let fleet: [(f32, f32, f32, f32, u32, f32, Axis); 5] = [
        (50.0, 180.0, 40.0, 20.0, 0x3B82F6, 1.0, Axis::Horizontal),
        (200.0, 160.0, 35.0, 18.0, 0xEF4444, 0.8, Axis::Horizontal),
        (300.0, 50.0, 20.0, 40.0, 0x10B981, 1.2, Axis::Vertical),
        (320.0, 250.0, 20.0, 40.0, 0xF59E0B, 0.9, Axis::Vertical),
        (150.0, 200.0, 45.0, 22.0, 0x8B5CF6, 0.7, Axis::Horizontal),
    ];
    fleet.iter()
        .enumerate()
        .map(|(i, &(x, y, width, height, color, speed, axis))| Sprite {
            id: i as u32 + 1,
            x,
            y,
            width,
            height,
            color: hex(color),
            speed,
            axis,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(axis: Axis) -> Sprite {
        Sprite {
            id: 1,
            x: 0.0,
            y: 0.0,
            width: 40.0,
            height: 20.0,
            color: Rgb([255, 0, 0]),
            speed: 3.0,
            axis,
        }
    }

    #[test]
    fn moves_only_along_its_axis() {
        let mut s = car(Axis::Horizontal);
        s.advance(640.0, 360.0);
        assert_eq!((s.x, s.y), (3.0, 0.0));

        let mut s = car(Axis::Vertical);
        s.advance(640.0, 360.0);
        assert_eq!((s.x, s.y), (0.0, 3.0));
    }

    #[test]
    fn wraps_to_the_opposite_edge() {
        let mut s = car(Axis::Horizontal);
        s.x = 640.0 + WRAP_MARGIN - 1.0;
        s.advance(640.0, 360.0);
        assert_eq!(s.x, -40.0);

        let mut s = car(Axis::Vertical);
        s.y = 360.0 + WRAP_MARGIN;
        s.advance(640.0, 360.0);
        assert_eq!(s.y, -20.0);
    }

    #[test]
    fn coordinates_stay_bounded_over_long_runs() {
        let mut fleet = default_fleet();
        for _ in 0..100_000 {
            for s in &mut fleet {
                s.advance(640.0, 360.0);
                assert!(s.x >= -s.width && s.x <= 640.0 + WRAP_MARGIN + s.speed);
                assert!(s.y >= -s.height && s.y <= 360.0 + WRAP_MARGIN + s.speed);
            }
        }
    }

    #[test]
    fn default_fleet_colors() {
        let fleet = default_fleet();
        assert_eq!(fleet.len(), 5);
        assert_eq!(fleet[0].color, Rgb([0x3B, 0x82, 0xF6]));
        assert_eq!(fleet[2].axis, Axis::Vertical);
    }
}
