#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot explorer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which the orbit of zero under `z -> z^2 + c` stays bounded.
//! The usual picture colors each pixel by how many steps its orbit
//! takes to leave the disc of radius two (its "escape time"), and
//! paints the points that never leave, up to some iteration cap,
//! black.
//!
//! Every pixel is independent of every other, so the image splits
//! cleanly into horizontal bands of rows.  This crate renders those
//! bands either one after another on the calling thread
//! ([`SequentialRenderer`]) or on a pool of long-lived workers
//! ([`ParallelRenderer`]), and assembles them into one RGBA frame.
//! Both produce the same bytes for the same request.  The
//! [`Explorer`] wraps a renderer in the state an interactive viewer
//! needs: pan by click, zoom in and out, and change the iteration cap.

extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;

pub mod band;
pub mod config;
pub mod error;
pub mod escape;
pub mod explorer;
pub mod frame;
pub mod palette;
pub mod parallel;
pub mod planes;
pub mod pool;
pub mod sequential;
pub mod view;

pub use config::Config;
pub use error::RenderError;
pub use explorer::Explorer;
pub use frame::Frame;
pub use palette::Palette;
pub use parallel::{render_scoped, ParallelRenderer, PendingRender};
pub use planes::{Pixel, PlaneMapper, YStep};
pub use sequential::SequentialRenderer;
pub use view::{RenderRequest, ViewState};

/// Anything that turns a request into a finished frame.
pub trait Renderer {
    /// Renders the whole image, returning only once every row is done.
    fn render(&self, request: &RenderRequest) -> Result<Frame, RenderError>;
}
