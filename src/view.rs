//! The immutable inputs to a render: where we are looking in the
//! complex plane, and what the image should look like.

use crate::error::RenderError;
use crate::planes::YStep;

/// Where the viewport sits in the complex plane.  The visible square
/// has a half-width of `2.0 / zoom` around the center.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewState {
    /// Real part of the center.
    pub center_x: f64,
    /// Imaginary part of the center.
    pub center_y: f64,
    /// Magnification; 1.0 shows the square from -2 to 2 around the center.
    pub zoom: f64,
}

impl ViewState {
    /// A view at the given center and zoom.
    pub fn new(center_x: f64, center_y: f64, zoom: f64) -> ViewState {
        ViewState {
            center_x,
            center_y,
            zoom,
        }
    }
}

impl Default for ViewState {
    /// The whole set, slightly left of the origin.
    fn default() -> Self {
        ViewState::new(-0.5, 0.0, 1.0)
    }
}

/// A snapshot of everything a renderer needs.  Built fresh for every
/// render and never shared mutably.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderRequest {
    /// The view to render.
    pub view: ViewState,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Iteration cap; points that survive this many steps are interior.
    pub max_iterations: u32,
    /// Which image axis divides the vertical step.
    pub y_step: YStep,
}

impl RenderRequest {
    /// A request using the default vertical step.
    pub fn new(view: ViewState, width: usize, height: usize, max_iterations: u32) -> RenderRequest {
        RenderRequest {
            view,
            width,
            height,
            max_iterations,
            y_step: YStep::default(),
        }
    }

    /// The same request with a different vertical step.
    pub fn with_y_step(self, y_step: YStep) -> RenderRequest {
        RenderRequest { y_step, ..self }
    }

    /// Length in bytes of the RGBA buffer this request produces.
    pub fn buffer_len(&self) -> usize {
        self.width * self.height * 4
    }

    /// Checks the preconditions every renderer relies on.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_iterations == 0 {
            return Err(RenderError::InvalidIterationCap);
        }
        if !(self.view.zoom.is_finite() && self.view.zoom > 0.0) {
            return Err(RenderError::InvalidZoom(self.view.zoom));
        }
        Ok(())
    }
}
