//! Falling-character ("matrix rain") background.
//!
//! The field is a row of [`ColumnStream`]s, one per glyph-wide column of the
//! canvas. Each frame paints a translucent overlay over the previous frame
//! (which leaves fading trails), draws one random glyph at the head of every
//! stream, and moves every head down one cell. Heads that have fallen past the
//! bottom edge restart at the top with a small per-frame probability, so the
//! columns drift out of phase with each other.
//!
//! Drawing goes through [`RainSurface`] and frame pacing through
//! [`FrameScheduler`], so everything here runs on the host in tests. The
//! browser implementations live in [`canvas`].

pub mod canvas;
mod driver;

use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::config::RainSettings;

pub use driver::{FrameScheduler, RainAnimation};

/// Drawing primitives the rain needs from its host.
pub trait RainSurface {
    /// Fill the whole `width` x `height` area with a (translucent) colour.
    fn paint_overlay(&mut self, color: &str, width: f64, height: f64);
    /// Set fill colour and font for the glyphs drawn after this call.
    fn set_glyph_style(&mut self, color: &str, font: &str);
    fn draw_glyph(&mut self, glyph: char, x: f64, y: f64);
}

/// Fall state of one canvas column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnStream {
    position: u32,
    column_index: u32,
}

impl ColumnStream {
    /// Head row, in cells from the top.
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn column_index(&self) -> u32 {
        self.column_index
    }
}

/// Number of whole cells that fit in `extent` pixels. Zero cell size yields zero.
pub fn cells_in(extent: u32, cell_size: u32) -> u32 {
    extent.checked_div(cell_size).unwrap_or(0)
}

/// Convert a host-reported pixel size into a canvas dimension. NaN,
/// infinite and negative values collapse to zero.
pub fn pixel_extent(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.floor().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// The set of column streams plus everything needed to advance and draw them.
#[derive(Debug)]
pub struct RainField<R: Rng = ChaCha8Rng> {
    streams: Vec<ColumnStream>,
    width: u32,
    height: u32,
    cell_size: u32,
    glyphs: Vec<char>,
    reset_probability: f64,
    overlay_color: String,
    glyph_color: String,
    font: String,
    rng: R,
}

impl<R: Rng> RainField<R> {
    /// Lay out `floor(width / cell_size)` streams (none when `height` is 0),
    /// each starting at a uniformly
    /// random row in `[0, floor(height / cell_size))`.
    pub fn start(width: u32, height: u32, settings: &RainSettings, rng: R) -> Self {
        let reset_probability = if settings.reset_probability.is_nan() {
            0.0
        } else {
            settings.reset_probability.clamp(0.0, 1.0)
        };
        let mut field = Self {
            streams: Vec::new(),
            width: 0,
            height: 0,
            cell_size: settings.cell_size,
            glyphs: settings.alphabet.chars().collect(),
            reset_probability,
            overlay_color: settings.overlay_color.clone(),
            glyph_color: settings.glyph_color.clone(),
            font: settings.font(),
            rng,
        };
        field.resize(width, height);
        field
    }

    /// Grow or truncate the stream list to match the new width. Retained
    /// streams keep their position; new ones get a random row within the new
    /// height. A zero-height canvas holds no streams.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let target = if height == 0 {
            0
        } else {
            cells_in(width, self.cell_size) as usize
        };
        if target <= self.streams.len() {
            self.streams.truncate(target);
            return;
        }
        let rows = cells_in(height, self.cell_size);
        for column_index in self.streams.len()..target {
            let position = if rows == 0 {
                0
            } else {
                self.rng.gen_range(0..rows)
            };
            self.streams.push(ColumnStream {
                position,
                column_index: column_index as u32,
            });
        }
    }

    /// Draw one frame and advance every stream by one row.
    pub fn render_frame<S: RainSurface + ?Sized>(&mut self, surface: &mut S) {
        surface.paint_overlay(&self.overlay_color, self.width as f64, self.height as f64);
        surface.set_glyph_style(&self.glyph_color, &self.font);

        let cell = self.cell_size as f64;
        let bottom = self.height as u64;
        let cell_size = self.cell_size as u64;
        let Self {
            streams,
            glyphs,
            rng,
            reset_probability,
            ..
        } = self;

        for stream in streams.iter_mut() {
            if let Some(&glyph) = glyphs.choose(&mut *rng) {
                surface.draw_glyph(
                    glyph,
                    stream.column_index as f64 * cell,
                    stream.position as f64 * cell,
                );
            }
            stream.position = stream.position.saturating_add(1);
            if stream.position as u64 * cell_size > bottom && rng.gen_bool(*reset_probability) {
                stream.position = 0;
            }
        }
    }

    pub fn streams(&self) -> &[ColumnStream] {
        &self.streams
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Recorder {
        overlays: Vec<(String, f64, f64)>,
        glyphs: Vec<(char, f64, f64)>,
    }

    impl RainSurface for Recorder {
        fn paint_overlay(&mut self, color: &str, width: f64, height: f64) {
            self.overlays.push((color.to_string(), width, height));
        }
        fn set_glyph_style(&mut self, _color: &str, _font: &str) {}
        fn draw_glyph(&mut self, glyph: char, x: f64, y: f64) {
            self.glyphs.push((glyph, x, y));
        }
    }

    fn settings(cell: u32) -> RainSettings {
        RainSettings {
            cell_size: cell,
            ..RainSettings::default()
        }
    }

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_cells_in_guards_zero_cell() {
        assert_eq!(cells_in(140, 14), 10);
        assert_eq!(cells_in(139, 14), 9);
        assert_eq!(cells_in(140, 0), 0);
        assert_eq!(cells_in(0, 14), 0);
    }

    #[test]
    fn test_pixel_extent_clamps_bad_values() {
        assert_eq!(pixel_extent(1024.7), 1024);
        assert_eq!(pixel_extent(-3.0), 0);
        assert_eq!(pixel_extent(f64::NAN), 0);
        assert_eq!(pixel_extent(f64::INFINITY), 0);
    }

    #[test]
    fn test_start_assigns_sequential_columns() {
        let field = RainField::start(70, 140, &settings(14), rng(1));
        let cols: Vec<u32> = field.streams().iter().map(|s| s.column_index()).collect();
        assert_eq!(cols, vec![0, 1, 2, 3, 4]);
        assert!(field.streams().iter().all(|s| s.position() < 10));
    }

    #[test]
    fn test_short_canvas_starts_all_at_top() {
        let field = RainField::start(140, 10, &settings(14), rng(2));
        assert_eq!(field.len(), 10);
        assert!(field.streams().iter().all(|s| s.position() == 0));
    }

    #[test]
    fn test_zero_height_has_no_streams() {
        let mut field = RainField::start(140, 0, &settings(14), rng(9));
        assert!(field.is_empty());
        field.resize(140, 280);
        assert_eq!(field.len(), 10);
        field.resize(140, 0);
        assert!(field.is_empty());
    }

    #[test]
    fn test_zero_width_is_inert() {
        let mut field = RainField::start(0, 280, &settings(14), rng(3));
        assert!(field.is_empty());
        let mut rec = Recorder::default();
        field.render_frame(&mut rec);
        assert_eq!(rec.overlays.len(), 1);
        assert!(rec.glyphs.is_empty());
    }

    #[test]
    fn test_frame_draws_at_cell_coordinates() {
        let mut field = RainField::start(42, 1000, &settings(14), rng(4));
        let before: Vec<u32> = field.streams().iter().map(|s| s.position()).collect();
        let mut rec = Recorder::default();
        field.render_frame(&mut rec);

        assert_eq!(
            rec.overlays,
            vec![("rgba(10, 10, 26, 0.05)".to_string(), 42.0, 1000.0)]
        );
        assert_eq!(rec.glyphs.len(), 3);
        for (i, (glyph, x, y)) in rec.glyphs.iter().enumerate() {
            assert!(*glyph == '0' || *glyph == '1');
            assert_eq!(*x, i as f64 * 14.0);
            assert_eq!(*y, before[i] as f64 * 14.0);
        }
    }

    #[test]
    fn test_certain_reset_past_bottom() {
        let cfg = RainSettings {
            reset_probability: 1.0,
            ..settings(10)
        };
        // Height 10 gives one row, so every stream starts at 0 and crosses
        // the bottom edge on its first step.
        let mut field = RainField::start(50, 10, &cfg, rng(5));
        let mut rec = Recorder::default();
        field.render_frame(&mut rec);
        // position 1 * 10 == height is not past the edge yet
        assert!(field.streams().iter().all(|s| s.position() == 1));
        field.render_frame(&mut rec);
        assert!(field.streams().iter().all(|s| s.position() == 0));
    }

    #[test]
    fn test_zero_probability_never_resets() {
        let cfg = RainSettings {
            reset_probability: 0.0,
            ..settings(10)
        };
        let mut field = RainField::start(30, 20, &cfg, rng(6));
        let mut rec = Recorder::default();
        let start: Vec<u32> = field.streams().iter().map(|s| s.position()).collect();
        for _ in 0..50 {
            field.render_frame(&mut rec);
        }
        for (s, p0) in field.streams().iter().zip(start) {
            assert_eq!(s.position(), p0 + 50);
        }
    }

    #[test]
    fn test_nan_probability_treated_as_zero() {
        let cfg = RainSettings {
            reset_probability: f64::NAN,
            ..settings(10)
        };
        let mut field = RainField::start(10, 10, &cfg, rng(7));
        let mut rec = Recorder::default();
        for _ in 0..5 {
            field.render_frame(&mut rec);
        }
        assert_eq!(field.streams()[0].position(), 5);
    }

    #[test]
    fn test_resize_updates_overlay_extent() {
        let mut field = RainField::start(28, 28, &settings(14), rng(8));
        field.resize(56, 70);
        let mut rec = Recorder::default();
        field.render_frame(&mut rec);
        assert_eq!(rec.overlays[0].1, 56.0);
        assert_eq!(rec.overlays[0].2, 70.0);
        assert_eq!(field.len(), 4);
        assert_eq!(field.streams()[3].column_index(), 3);
    }
}
