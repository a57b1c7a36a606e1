//! The one error type shared by every renderer.  All of these are
//! local precondition or lifecycle failures; nothing here is retried
//! by the library.

use failure::Fail;
use std::time::Duration;

/// Everything that can stop a render from producing a frame.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum RenderError {
    /// The image has no area.
    #[fail(display = "Image dimensions must be positive, got {}x{}", width, height)]
    InvalidDimensions {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
    },

    /// An iteration cap of zero was handed to a renderer.
    #[fail(display = "Iteration cap must be at least 1")]
    InvalidIterationCap,

    /// The zoom factor was zero, negative, or not a number.
    #[fail(display = "Zoom must be a positive, finite number, got {}", _0)]
    InvalidZoom(f64),

    /// The pool has been stopped, or a worker went away mid-render.
    #[fail(display = "No worker available to take the render")]
    WorkerUnavailable,

    /// The caller gave up waiting for the bands to come back.
    #[fail(display = "Render did not complete within {:?}", waited)]
    RenderTimeout {
        /// How long the caller waited.
        waited: Duration,
    },

    /// A newer render was dispatched before this one finished; its
    /// result was discarded.
    #[fail(display = "Render {} was superseded by a newer request", generation)]
    Superseded {
        /// The generation of the discarded render.
        generation: u64,
    },
}
