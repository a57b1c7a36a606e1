//! The escape-time color table.  Escaped pixels are colored by their
//! iteration count modulo the table size; the table is a walk around
//! the HSL hue wheel at full saturation and half lightness.

/// Number of entries in the table.
pub const PALETTE_SIZE: usize = 256;

/// An opaque RGB triple.
pub type Rgb = [u8; 3];

/// A fixed, immutable table of 256 colors.  Build it once and share it;
/// it is never mutated after construction.
#[derive(Clone)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
}

impl Palette {
    /// Builds the table.  Entry `i` is the color for hue `i` degrees;
    /// the index is used as the hue directly, so the table covers
    /// hues 0 through 255 and stops short of the magentas.
    pub fn build() -> Palette {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for (hue, color) in colors.iter_mut().enumerate() {
            *color = hsl_to_rgb(hue as f64, 100.0, 50.0);
        }
        Palette { colors }
    }

    /// The color for an escape count.  Wraps around the table.
    #[inline]
    pub fn color(&self, iteration: u32) -> Rgb {
        self.colors[iteration as usize % PALETTE_SIZE]
    }

    /// The raw table, in index order.
    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::build()
    }
}

impl PartialEq for Palette {
    fn eq(&self, other: &Palette) -> bool {
        self.colors[..] == other.colors[..]
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Palette")
            .field("first", &self.colors[0])
            .field("last", &self.colors[PALETTE_SIZE - 1])
            .finish()
    }
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Hue in degrees, saturation and lightness in percent.
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let (h, s, l) = (h / 360.0, s / 100.0, l / 100.0);

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };

    [to_byte(r), to_byte(g), to_byte(b)]
}

#[inline]
fn to_byte(channel: f64) -> u8 {
    num::clamp((channel * 255.0).round(), 0.0, 255.0) as u8
}
