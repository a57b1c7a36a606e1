//! Horizontal bands of rows: how an image is split among workers, and
//! how one band is rendered on its own.

use itertools::iproduct;
use std::ops::Range;

use crate::escape::{escape_time, is_interior};
use crate::palette::Palette;
use crate::planes::{Pixel, PlaneMapper};
use crate::view::RenderRequest;

/// Opaque black, for points inside the set.
pub const INTERIOR: [u8; 4] = [0, 0, 0, 255];

/// A half-open range of image rows, `row_start..row_end`.  May be empty
/// when there are more workers than rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Band {
    /// First row of the band.
    pub row_start: usize,
    /// One past the last row of the band.
    pub row_end: usize,
}

impl Band {
    /// A band covering `row_start..row_end`.
    pub fn new(row_start: usize, row_end: usize) -> Band {
        Band { row_start, row_end }
    }

    /// Number of rows in the band.
    pub fn len(&self) -> usize {
        self.row_end.saturating_sub(self.row_start)
    }

    /// True for a band with no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The rows, as a range.
    pub fn rows(&self) -> Range<usize> {
        self.row_start..self.row_end
    }

    /// Byte range of this band inside a full RGBA image of `width` columns.
    pub fn byte_range(&self, width: usize) -> Range<usize> {
        self.row_start * width * 4..self.row_end * width * 4
    }
}

/// Splits `0..height` into exactly `workers` bands of
/// `ceil(height / workers)` rows each, the trailing ones clamped (and
/// possibly empty).  The bands cover every row exactly once, in order.
/// Zero workers yields no bands.
pub fn partition(height: usize, workers: usize) -> Vec<Band> {
    if workers == 0 {
        return vec![];
    }
    let rows_per_band = (height + workers - 1) / workers;
    (0..workers)
        .map(|i| {
            let start = (i * rows_per_band).min(height);
            let end = (start + rows_per_band).min(height);
            Band::new(start, end)
        })
        .collect()
}

/// Renders the rows of `band` into `out`, which must hold exactly
/// `band.len() * width * 4` bytes.  Row 0 of `out` is `band.row_start`.
pub fn render_band_into(band: &Band, request: &RenderRequest, palette: &Palette, out: &mut [u8]) {
    debug_assert_eq!(out.len(), band.len() * request.width * 4);
    let plane = PlaneMapper::for_request(request);
    let limit = request.max_iterations;

    for (y, x) in iproduct!(band.rows(), 0..request.width) {
        let c = plane.pixel_to_point(&Pixel(x, y));
        let iteration = escape_time(c, limit);
        let offset = ((y - band.row_start) * request.width + x) * 4;
        let pixel = &mut out[offset..offset + 4];
        if is_interior(iteration, limit) {
            pixel.copy_from_slice(&INTERIOR);
        } else {
            let [r, g, b] = palette.color(iteration);
            pixel.copy_from_slice(&[r, g, b, 255]);
        }
    }
}

/// Renders one band into a freshly allocated buffer of
/// `band.len() * width * 4` bytes.  This is the unit of work a worker
/// performs.
pub fn render_band(band: &Band, request: &RenderRequest, palette: &Palette) -> Vec<u8> {
    let mut out = vec![0u8; band.len() * request.width * 4];
    render_band_into(band, request, palette, &mut out);
    out
}

/// Copies a finished band into its rows of the full image.
pub fn merge_band(image: &mut [u8], width: usize, band: &Band, pixels: &[u8]) {
    image[band.byte_range(width)].copy_from_slice(pixels);
}
