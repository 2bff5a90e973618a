// THEORY:
// The `CameraFeed` is the decorative "live camera" panel. It owns a small fleet
// of sprites, advances them one step per display refresh, and rasterizes a
// frame: a dark backdrop, a crossroads with dashed centre lines, a traffic
// light, the vehicles with a green "DETECTED" box around each, and a status
// overlay. No detection happens; every sprite is always "detected".
//
// Key principles:
// 1.  **Step and render are separate**: `step` mutates sprite positions,
//     `render` is a pure function of the current state plus a clock label. The
//     async monitor decides how often each runs.
// 2.  **Pause is a state, not a loop**: while paused `step` is a no-op, so
//     repeated renders of a paused feed are identical apart from the clock.
// 3.  **Fixed paint order**: background, roads, light, vehicles and boxes,
//     overlay. Later layers always cover earlier ones.

use crate::core_modules::sprite::{Axis, Sprite, default_fleet};
use crate::core_modules::utils::glyphs::glyphs::{GLYPH_HEIGHT, draw_text};
use crate::core_modules::utils::raster::raster::{
    blend_rect, dashed_hline, dashed_vline, fill_circle, fill_rect, stroke_rect,
};
use image::{Rgb, RgbImage};
use serde::Serialize;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 360;

const BACKGROUND: Rgb<u8> = Rgb([0x1F, 0x29, 0x37]);
const ROAD: Rgb<u8> = Rgb([0x37, 0x41, 0x51]);
const LANE_MARK: Rgb<u8> = Rgb([0xFB, 0xBF, 0x24]);
const POLE: Rgb<u8> = Rgb([0x6B, 0x72, 0x80]);
const LAMP_RED: Rgb<u8> = Rgb([0xEF, 0x44, 0x44]);
const DETECTION: Rgb<u8> = Rgb([0x10, 0xB9, 0x81]);
const OVERLAY_TEXT: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);

// Crossroads geometry in canvas pixels.
const HORIZONTAL_ROAD_Y: i32 = 150;
const VERTICAL_ROAD_X: i32 = 280;
const ROAD_WIDTH: u32 = 100;

/// Screen-space box drawn around one sprite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionBox {
    pub id: u32,
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
    pub label: &'static str,
}

/// Per-frame metadata published next to the encoded frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedMeta {
    pub frame_index: u64,
    pub playing: bool,
    pub detected_count: usize,
    pub boxes: Vec<DetectionBox>,
}

/// The animated camera panel.
#[derive(Debug, Clone)]
pub struct CameraFeed {
    width: u32,
    height: u32,
    sprites: Vec<Sprite>,
    playing: bool,
    /// Number of steps taken while playing.
    frame_index: u64,
}

impl CameraFeed {
    /// A 640x360 feed with the default fleet, playing.
    pub fn new() -> Self {
        Self::with_sprites(DEFAULT_WIDTH, DEFAULT_HEIGHT, default_fleet())
    }

    pub fn with_sprites(width: u32, height: u32, sprites: Vec<Sprite>) -> Self {
        Self { width: width.max(1), height: height.max(1), sprites, playing: true, frame_index: 0 }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Flips play/pause and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Every sprite on screen counts as detected.
    pub fn detected_count(&self) -> usize {
        self.sprites.len()
    }

    /// Advances every sprite once. Returns `false` when paused.
    pub fn step(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        let (w, h) = (self.width as f32, self.height as f32);
        for sprite in &mut self.sprites {
            sprite.advance(w, h);
        }
        self.frame_index += 1;
        true
    }

    pub fn meta(&self) -> FeedMeta {
        FeedMeta {
            frame_index: self.frame_index,
            playing: self.playing,
            detected_count: self.detected_count(),
            boxes: self.sprites.iter().map(detection_box).collect(),
        }
    }

    /// Rasterizes the current state. `time_label` is printed in the overlay.
    pub fn render(&self, time_label: &str) -> RgbImage {
        let mut frame = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        self.draw_roads(&mut frame);
        draw_traffic_light(&mut frame);
        for sprite in &self.sprites {
            draw_vehicle(&mut frame, sprite);
            draw_detection(&mut frame, sprite);
        }
        self.draw_overlay(&mut frame, time_label);
        frame
    }

    fn draw_roads(&self, frame: &mut RgbImage) {
        fill_rect(frame, 0, HORIZONTAL_ROAD_Y, self.width, ROAD_WIDTH, ROAD);
        fill_rect(frame, VERTICAL_ROAD_X, 0, ROAD_WIDTH, self.height, ROAD);

        let half = (ROAD_WIDTH / 2) as i32;
        dashed_hline(frame, HORIZONTAL_ROAD_Y + half, 2, 10, 10, LANE_MARK);
        dashed_vline(frame, VERTICAL_ROAD_X + half, 2, 10, 10, LANE_MARK);
    }

    fn draw_overlay(&self, frame: &mut RgbImage, time_label: &str) {
        blend_rect(frame, 10, 10, 200, 80, Rgb([0, 0, 0]), 0.7);

        let lines = [
            (30, "AI TRAFFIC MONITORING".to_string()),
            (50, format!("VEHICLES DETECTED: {}", self.detected_count())),
            (70, "STATUS: ACTIVE".to_string()),
            (85, format!("TIME: {time_label}")),
        ];
        // Offsets are text baselines; glyphs are placed above them.
        for (baseline, text) in lines {
            draw_text(frame, 20, baseline - GLYPH_HEIGHT as i32, &text, OVERLAY_TEXT, 1);
        }
    }
}

impl Default for CameraFeed {
    fn default() -> Self {
        Self::new()
    }
}

fn rect_of(sprite: &Sprite) -> (i32, i32, u32, u32) {
    (
        sprite.x.round() as i32,
        sprite.y.round() as i32,
        sprite.width.round().max(1.0) as u32,
        sprite.height.round().max(1.0) as u32,
    )
}

fn detection_box(sprite: &Sprite) -> DetectionBox {
    let (x, y, w, h) = rect_of(sprite);
    DetectionBox { id: sprite.id, x0: x - 2, y0: y - 2, x1: x + w as i32 + 2, y1: y + h as i32 + 2, label: "DETECTED" }
}

fn draw_traffic_light(frame: &mut RgbImage) {
    fill_rect(frame, 270, 140, 5, 30, POLE);
    fill_rect(frame, 260, 130, 25, 15, BACKGROUND);
    fill_circle(frame, 267, 135, 3, LAMP_RED);
    fill_circle(frame, 275, 135, 3, DETECTION);
}

fn draw_vehicle(frame: &mut RgbImage, sprite: &Sprite) {
    let (x, y, w, h) = rect_of(sprite);
    fill_rect(frame, x, y, w, h, sprite.color);

    // Window inset, longer along the direction of travel.
    let (ix, iy) = match sprite.axis {
        Axis::Horizontal => (5, 3),
        Axis::Vertical => (3, 5),
    };
    fill_rect(
        frame,
        x + ix,
        y + iy,
        w.saturating_sub(2 * ix as u32),
        h.saturating_sub(2 * iy as u32),
        BACKGROUND,
    );
}

fn draw_detection(frame: &mut RgbImage, sprite: &Sprite) {
    let b = detection_box(sprite);
    stroke_rect(frame, b.x0, b.y0, (b.x1 - b.x0) as u32, (b.y1 - b.y0) as u32, 2, DETECTION);
    draw_text(frame, b.x0 + 2, b.y0 + 2 - 5 - GLYPH_HEIGHT as i32, b.label, DETECTION, 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(axis: Axis) -> CameraFeed {
        let sprite = Sprite {
            id: 9,
            x: 400.0,
            y: 280.0,
            width: 40.0,
            height: 20.0,
            color: Rgb([0x3B, 0x82, 0xF6]),
            speed: 2.0,
            axis,
        };
        CameraFeed::with_sprites(DEFAULT_WIDTH, DEFAULT_HEIGHT, vec![sprite])
    }

    #[test]
    fn paused_feed_does_not_move() {
        let mut feed = CameraFeed::new();
        let before = feed.sprites().to_vec();
        feed.set_playing(false);
        assert!(!feed.step());
        assert_eq!(feed.sprites(), before.as_slice());
        assert_eq!(feed.frame_index(), 0);

        assert!(feed.toggle());
        assert!(feed.step());
        assert_ne!(feed.sprites(), before.as_slice());
        assert_eq!(feed.frame_index(), 1);
    }

    #[test]
    fn renders_backdrop_roads_and_vehicle() {
        let feed = single(Axis::Horizontal);
        let frame = feed.render("12:00:00");
        assert_eq!((frame.width(), frame.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));

        // Plain background away from every layer.
        assert_eq!(*frame.get_pixel(600, 20), BACKGROUND);
        // Horizontal road band, clear of the dashed centre line.
        assert_eq!(*frame.get_pixel(600, 160), ROAD);
        // Vertical road band below the crossing.
        assert_eq!(*frame.get_pixel(290, 340), ROAD);
        // Vehicle body edge and window.
        assert_eq!(*frame.get_pixel(401, 281), Rgb([0x3B, 0x82, 0xF6]));
        assert_eq!(*frame.get_pixel(420, 290), BACKGROUND);
        // Detection outline just outside the body.
        assert_eq!(*frame.get_pixel(398, 290), DETECTION);
    }

    #[test]
    fn overlay_darkens_the_corner() {
        let frame = CameraFeed::new().render("00:00:00");
        let p = frame.get_pixel(205, 85).0;
        assert!(p[0] < BACKGROUND.0[0] && p[2] < BACKGROUND.0[2]);
    }

    #[test]
    fn meta_reports_one_box_per_sprite() {
        let feed = CameraFeed::new();
        let meta = feed.meta();
        assert_eq!(meta.detected_count, 5);
        assert_eq!(meta.boxes.len(), 5);
        let first = &meta.boxes[0];
        assert_eq!((first.x0, first.y0, first.x1, first.y1), (48, 178, 92, 202));
        assert!(meta.playing);
    }

    #[test]
    fn long_run_keeps_sprites_on_a_bounded_track() {
        let mut feed = single(Axis::Vertical);
        for _ in 0..10_000 {
            feed.step();
        }
        let s = &feed.sprites()[0];
        assert!(s.y >= -s.height && s.y <= DEFAULT_HEIGHT as f32 + 52.0);
        assert_eq!(s.x, 400.0);
    }
}
