// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single-threaded renderer.  It renders the whole image as one
//! band on the calling thread, through exactly the same per-pixel code
//! the workers use, which makes it the reference the parallel
//! schedulers are checked against.

use log::info;
use std::sync::Arc;
use std::time::Instant;

use crate::band::{render_band, Band};
use crate::error::RenderError;
use crate::frame::Frame;
use crate::palette::Palette;
use crate::view::RenderRequest;
use crate::Renderer;

/// Renders on the calling thread, no concurrency at all.
pub struct SequentialRenderer {
    palette: Arc<Palette>,
}

impl SequentialRenderer {
    /// A renderer drawing with the given palette.
    pub fn new(palette: Arc<Palette>) -> SequentialRenderer {
        SequentialRenderer { palette }
    }
}

impl Renderer for SequentialRenderer {
    fn render(&self, request: &RenderRequest) -> Result<Frame, RenderError> {
        request.validate()?;
        let started = Instant::now();
        let pixels = render_band(&Band::new(0, request.height), request, &self.palette);
        let frame = Frame {
            width: request.width,
            height: request.height,
            pixels,
            elapsed: started.elapsed(),
        };
        info!("sequential render complete in {:.1} ms", frame.elapsed_ms());
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewState;

    fn renderer() -> SequentialRenderer {
        SequentialRenderer::new(Arc::new(Palette::build()))
    }

    #[test]
    fn scenario_corner_is_colored_and_center_is_black() {
        let request = RenderRequest::new(ViewState::new(-0.5, 0.0, 1.0), 4, 4, 50);
        let frame = renderer().render(&request).unwrap();
        assert_eq!(frame.pixels.len(), 4 * 4 * 4);

        // Pixel 0,0 samples -2.5-2i, which escapes on the first step.
        let corner = frame.pixel(0, 0);
        assert_ne!(&corner[..3], &[0, 0, 0]);
        assert_eq!(corner[3], 255);
        assert_eq!(corner, [255, 4, 0, 255]);

        // Pixel 2,2 samples -0.5+0i, deep in the main cardioid.
        assert_eq!(frame.pixel(2, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn rerendering_is_idempotent() {
        let request = RenderRequest::new(ViewState::new(-0.7, 0.3, 4.0), 31, 17, 200);
        let renderer = renderer();
        assert_eq!(
            renderer.render(&request).unwrap().pixels,
            renderer.render(&request).unwrap().pixels
        );
    }

    #[test]
    fn every_pixel_is_opaque() {
        let request = RenderRequest::new(ViewState::default(), 20, 10, 80);
        let frame = renderer().render(&request).unwrap();
        assert!(frame.pixels.chunks(4).all(|p| p[3] == 255));
    }

    #[test]
    fn cap_of_one_is_all_black() {
        // Every orbit takes its first step from zero, so every point
        // reaches a cap of one.
        let request = RenderRequest::new(ViewState::default(), 8, 8, 1);
        let frame = renderer().render(&request).unwrap();
        assert!(frame.pixels.chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn invalid_request_is_refused() {
        let request = RenderRequest::new(ViewState::default(), 8, 8, 0);
        assert_eq!(
            renderer().render(&request).unwrap_err(),
            RenderError::InvalidIterationCap
        );
    }
}
