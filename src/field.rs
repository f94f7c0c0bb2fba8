use rand::Rng;

/// Size of a single glyph, in CSS pixels.
///
/// This is both the horizontal stride between columns and the vertical step a
/// column cursor advances per tick, so glyphs land on a uniform grid.
pub const GLYPH_SIZE: f64 = 14.0;

/// Once a cursor is past the bottom edge, it resets to the top only when a
/// uniform draw exceeds this threshold (~2.5% chance per tick).
///
/// The probabilistic reset staggers column lifetimes without per-column timers.
const RESET_THRESHOLD: f64 = 0.975;

/// The falling-glyph cursors, one per column of the surface.
///
/// The field owns all recurring state of the backdrop: the surface dimensions
/// and one vertical cursor per column. It is deliberately free of any web API
/// so the layout and advance rules can be tested natively.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnField {
    /// Vertical cursor position of each column, left to right.
    cursors: Vec<f64>,
    /// Surface width in pixels.
    width: u32,
    /// Surface height in pixels.
    height: u32,
}

impl ColumnField {
    /// Constructs a new [`ColumnField`] for a surface of the given size.
    ///
    /// Allocates `floor(width / GLYPH_SIZE)` columns, each starting at a
    /// uniformly random height in `[0, height)`.
    pub fn new<R: Rng>(width: u32, height: u32, rng: &mut R) -> Self {
        let mut field = Self {
            cursors: Vec::new(),
            width,
            height,
        };
        field.resize(width, height, rng);
        field
    }

    /// Relayouts the field for a new surface size.
    ///
    /// This is destructive: the column count is recomputed and every cursor is
    /// re-randomized. Prior positions never survive a resize.
    pub fn resize<R: Rng>(&mut self, width: u32, height: u32, rng: &mut R) {
        let column_count = (f64::from(width) / GLYPH_SIZE) as usize;
        let height_px = f64::from(height);
        self.width = width;
        self.height = height;
        self.cursors.clear();
        for _ in 0..column_count {
            let cursor = if height_px > 0.0 {
                rng.random_range(0.0..height_px)
            } else {
                0.0
            };
            self.cursors.push(cursor);
        }
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.cursors.len()
    }

    /// Returns the surface width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the surface height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the `(x, y)` draw position of every column, in index order.
    pub fn positions(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.cursors
            .iter()
            .enumerate()
            .map(|(index, cursor)| (index as f64 * GLYPH_SIZE, *cursor))
    }

    /// Advances every column by one tick.
    ///
    /// Each cursor either moves down by exactly [`GLYPH_SIZE`] or, once past
    /// the bottom edge, is probabilistically reset to the top.
    pub fn advance<R: Rng>(&mut self, rng: &mut R) {
        let height = f64::from(self.height);
        for cursor in &mut self.cursors {
            *cursor = advance_cursor(*cursor, height, rng.random());
        }
    }
}

/// Computes the next position of a single column cursor.
///
/// `reset_draw` is a uniform sample in `[0, 1)`: a cursor past the bottom edge
/// resets to `0.0` when the draw exceeds [`RESET_THRESHOLD`], and advances by
/// [`GLYPH_SIZE`] otherwise.
fn advance_cursor(cursor: f64, height: f64, reset_draw: f64) -> f64 {
    if cursor > height && reset_draw > RESET_THRESHOLD {
        0.0
    } else {
        cursor + GLYPH_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(0xfa11)
    }

    #[test]
    fn test_column_count_is_floor_of_width() {
        let mut rng = rng();
        assert_eq!(ColumnField::new(1400, 800, &mut rng).column_count(), 100);
        assert_eq!(ColumnField::new(1407, 800, &mut rng).column_count(), 100);
        assert_eq!(ColumnField::new(13, 800, &mut rng).column_count(), 0);
        assert_eq!(ColumnField::new(0, 800, &mut rng).column_count(), 0);
    }

    #[test]
    fn test_initial_cursors_within_surface() {
        let mut rng = rng();
        let field = ColumnField::new(1400, 800, &mut rng);
        for (_, y) in field.positions() {
            assert!((0.0..800.0).contains(&y));
        }
    }

    #[test]
    fn test_positions_follow_column_stride() {
        let mut rng = rng();
        let field = ColumnField::new(140, 100, &mut rng);
        let xs: Vec<f64> = field.positions().map(|(x, _)| x).collect();
        assert_eq!(xs, vec![0.0, 14.0, 28.0, 42.0, 56.0, 70.0, 84.0, 98.0, 112.0, 126.0]);
    }

    #[test]
    fn test_advance_steps_or_resets() {
        let mut rng = rng();
        let mut field = ColumnField::new(1400, 800, &mut rng);
        for _ in 0..200 {
            let before: Vec<f64> = field.positions().map(|(_, y)| y).collect();
            field.advance(&mut rng);
            for ((_, after), before) in field.positions().zip(before) {
                assert!(
                    after == before + GLYPH_SIZE || after == 0.0,
                    "cursor moved from {before} to {after}"
                );
            }
        }
    }

    #[test]
    fn test_cursors_eventually_reset() {
        let mut rng = rng();
        let mut field = ColumnField::new(140, 100, &mut rng);
        let mut resets = 0;
        for _ in 0..2000 {
            field.advance(&mut rng);
            resets += field.positions().filter(|(_, y)| *y == 0.0).count();
        }
        // With a ~2.5% reset chance per overflow tick, 2000 ticks across ten
        // columns cannot plausibly pass without a single reset.
        assert!(resets > 0);
    }

    #[test]
    fn test_resize_replaces_all_state() {
        let mut rng = rng();
        let mut field = ColumnField::new(1400, 800, &mut rng);
        field.resize(2800, 600, &mut rng);
        assert_eq!(field.column_count(), 200);
        assert_eq!(field.width(), 2800);
        assert_eq!(field.height(), 600);
        for (_, y) in field.positions() {
            assert!((0.0..600.0).contains(&y));
        }
    }

    #[test]
    fn test_reset_only_past_bottom_edge() {
        // Just past the bottom: a draw above the threshold resets, anything
        // else keeps falling.
        assert_eq!(advance_cursor(805.0, 800.0, 0.99), 0.0);
        assert_eq!(advance_cursor(805.0, 800.0, 0.5), 819.0);
        // Above the bottom edge the draw is irrelevant.
        assert_eq!(advance_cursor(100.0, 800.0, 0.99), 114.0);
        assert_eq!(advance_cursor(800.0, 800.0, 0.99), 814.0);
    }
}
