use rand::Rng;

/// The fixed alphabet glyphs are sampled from.
///
/// Letters, digits, symbols, plus the brand string of the host site. Sampling
/// is uniform over byte positions, so characters repeated by the brand string
/// carry proportionally more weight.
pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%^&*(){}[]|;:,.<>?/\\~`CTF.PLACE";

/// Fill color of the fade overlay painted over the full surface every tick.
///
/// The low alpha is what produces the trail effect: prior frames are never
/// cleared, only progressively darkened.
pub const FADE_FILL: &str = "rgba(10, 10, 15, 0.05)";

/// Primary glyph color, also used as the glow (shadow) color.
pub const PRIMARY_COLOR: &str = "#00ff88";

/// Secondary "glitch" highlight color.
pub const GLITCH_COLOR: &str = "#00ccff";

/// Probability that a glyph is drawn in the glitch color.
pub const GLITCH_PROBABILITY: f64 = 0.02;

/// Range of the per-glyph alpha applied to the primary color.
const ALPHA_RANGE: std::ops::Range<f64> = 0.5..1.0;

/// Samples one glyph uniformly at random from [`ALPHABET`].
pub fn sample_glyph<R: Rng>(rng: &mut R) -> char {
    let bytes = ALPHABET.as_bytes();
    // The alphabet is ASCII only, so byte indexing is safe.
    bytes[rng.random_range(0..bytes.len())] as char
}

/// The fill style of a single glyph.
///
/// Re-sampled for every glyph on every tick; there is no smoothing between
/// frames.
#[derive(Debug, Clone, PartialEq)]
pub enum GlyphFill {
    /// Primary color with the given alpha.
    Primary(f64),
    /// Glitch highlight, drawn at full opacity.
    Glitch,
}

impl GlyphFill {
    /// Samples the fill style for one glyph.
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        if rng.random::<f64>() < GLITCH_PROBABILITY {
            GlyphFill::Glitch
        } else {
            GlyphFill::Primary(rng.random_range(ALPHA_RANGE))
        }
    }

    /// Returns the CSS color of this fill.
    pub fn as_css(&self) -> String {
        match self {
            GlyphFill::Primary(alpha) => format!("rgba(0, 255, 136, {alpha})"),
            GlyphFill::Glitch => GLITCH_COLOR.to_string(),
        }
    }
}
