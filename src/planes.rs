//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and the square of the complex plane selected by a view.
use num::Complex;

use crate::view::{RenderRequest, ViewState};

/// Describes the x, y of a pixel in the image, column first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Which image dimension the vertical step is divided by.
///
/// The band routine this engine reproduces divides the imaginary span
/// by the image *width*, so non-square images come out stretched.
/// `ImageHeight` gives square pixels instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum YStep {
    /// `dy = (y_max - y_min) / width`.
    ImageWidth,
    /// `dy = (y_max - y_min) / height`.
    ImageHeight,
}

impl Default for YStep {
    fn default() -> Self {
        YStep::ImageWidth
    }
}

/// Maps pixels of a `width` x `height` image onto the complex plane.
/// The lower corner of the view sits at pixel 0,0; larger row numbers
/// move toward larger imaginary parts.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneMapper {
    /// Corner with the smallest real and imaginary parts.
    pub min: Complex<f64>,
    /// Corner with the largest real and imaginary parts.
    pub max: Complex<f64>,
    // The complex distance covered by one pixel along x and y.
    step: (f64, f64),
}

impl PlaneMapper {
    /// Builds the mapping for a view rendered at the given size.  Any
    /// positive zoom is accepted; the caller is expected to have
    /// rejected zero-sized images.
    pub fn new(view: &ViewState, width: usize, height: usize, y_step: YStep) -> PlaneMapper {
        let half = 2.0 / view.zoom;
        let min = Complex::new(view.center_x - half, view.center_y - half);
        let max = Complex::new(view.center_x + half, view.center_y + half);

        let dx = (max.re - min.re) / (width as f64);
        let dy = match y_step {
            YStep::ImageWidth => (max.im - min.im) / (width as f64),
            YStep::ImageHeight => (max.im - min.im) / (height as f64),
        };

        PlaneMapper {
            min,
            max,
            step: (dx, dy),
        }
    }

    /// The mapping for a request.
    pub fn for_request(request: &RenderRequest) -> PlaneMapper {
        PlaneMapper::new(&request.view, request.width, request.height, request.y_step)
    }

    /// The complex distance covered by one pixel, along x and along y.
    pub fn step(&self) -> (f64, f64) {
        self.step
    }

    /// Given a pixel on the integral plane, return the point of the
    /// complex plane that pixel samples.
    #[inline]
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.min.re + (pixel.0 as f64) * self.step.0,
            self.min.im + (pixel.1 as f64) * self.step.1,
        )
    }

    /// Click-to-center: the view that puts the clicked pixel in the
    /// middle of the next render, keeping the zoom.
    pub fn recenter(&self, view: &ViewState, pixel: &Pixel) -> ViewState {
        let center = self.pixel_to_point(pixel);
        ViewState::new(center.re, center.im, view.zoom)
    }
}
