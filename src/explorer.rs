//! The interactive session.  The explorer holds the mutable state a
//! viewer needs (where we are, how hard to iterate, serial or
//! parallel) and turns it into a fresh, immutable request for every
//! render.  Nothing it owns is reachable from the workers.

use log::debug;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{
    default_workers, Config, DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS, MIN_ZOOM,
    ZOOM_FACTOR,
};
use crate::error::RenderError;
use crate::frame::Frame;
use crate::palette::Palette;
use crate::parallel::{ParallelRenderer, PendingRender};
use crate::planes::{Pixel, PlaneMapper, YStep};
use crate::sequential::SequentialRenderer;
use crate::view::{RenderRequest, ViewState};
use crate::Renderer;

/// A pan/zoom session over the Mandelbrot set.
pub struct Explorer {
    view: ViewState,
    max_iterations: u32,
    width: usize,
    height: usize,
    y_step: YStep,
    worker_count: usize,
    sequential: SequentialRenderer,
    parallel: ParallelRenderer,
}

impl Explorer {
    /// Builds the session, starting the pool when the config asks for
    /// parallel rendering.
    pub fn new(config: Config) -> Result<Explorer, RenderError> {
        let palette = Arc::new(Palette::build());
        let mut parallel = ParallelRenderer::new(palette.clone());
        parallel.set_timeout(config.timeout);
        let worker_count = config.workers.unwrap_or_else(default_workers);
        if config.workers.is_some() {
            parallel.start(worker_count)?;
        }
        let mut explorer = Explorer {
            view: config.view,
            max_iterations: MIN_ITERATIONS,
            width: config.width,
            height: config.height,
            y_step: config.y_step,
            worker_count,
            sequential: SequentialRenderer::new(palette),
            parallel,
        };
        explorer.set_max_iterations(config.max_iterations);
        Ok(explorer)
    }

    /// The current view.
    pub fn view(&self) -> ViewState {
        self.view
    }

    /// The current iteration cap.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// True when renders go through the worker pool.
    pub fn is_parallel(&self) -> bool {
        self.parallel.is_running()
    }

    /// Workers a render will use: the pool size, or 1 when sequential.
    pub fn active_workers(&self) -> usize {
        if self.is_parallel() {
            self.parallel.workers()
        } else {
            1
        }
    }

    /// The request the next render will use.
    pub fn request(&self) -> RenderRequest {
        RenderRequest::new(self.view, self.width, self.height, self.max_iterations)
            .with_y_step(self.y_step)
    }

    /// Changes the image size.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Zooms in one step around the current center.
    pub fn zoom_in(&mut self) {
        self.view.zoom *= ZOOM_FACTOR;
    }

    /// Zooms out one step, never below the minimum zoom.
    pub fn zoom_out(&mut self) {
        self.view.zoom = (self.view.zoom / ZOOM_FACTOR).max(MIN_ZOOM);
    }

    /// Sets the iteration cap, clamped to the accepted range.
    pub fn set_max_iterations(&mut self, iterations: u32) {
        self.max_iterations = num::clamp(iterations, MIN_ITERATIONS, MAX_ITERATIONS);
    }

    /// Back to the initial view of the whole set.
    pub fn reset(&mut self) {
        self.view = ViewState::default();
        self.max_iterations = DEFAULT_ITERATIONS;
    }

    /// Recenters the view on the point under pixel `x`, `y` of the
    /// current image, keeping the zoom.
    pub fn click(&mut self, x: usize, y: usize) {
        let plane = PlaneMapper::for_request(&self.request());
        self.view = plane.recenter(&self.view, &Pixel(x, y));
        debug!(
            "recentered on {}{:+}i",
            self.view.center_x, self.view.center_y
        );
    }

    /// Switches between pooled and sequential rendering.  Turning the
    /// pool off joins every worker; turning it on starts a fresh pool.
    pub fn set_parallel(&mut self, parallel: bool) -> Result<(), RenderError> {
        if parallel == self.is_parallel() {
            return Ok(());
        }
        if parallel {
            self.parallel.start(self.worker_count)
        } else {
            self.parallel.stop();
            Ok(())
        }
    }

    /// Changes the pool size.  A running pool is torn down and rebuilt.
    pub fn set_workers(&mut self, workers: usize) -> Result<(), RenderError> {
        if workers == 0 {
            return Err(RenderError::WorkerUnavailable);
        }
        self.worker_count = workers;
        if self.is_parallel() {
            self.parallel.start(workers)?;
        }
        Ok(())
    }

    /// Bounds how long a parallel render may take.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.parallel.set_timeout(timeout);
    }

    /// Renders the current state with whichever renderer is active.
    pub fn render(&self) -> Result<Frame, RenderError> {
        let request = self.request();
        if self.is_parallel() {
            self.parallel.render(&request)
        } else {
            self.sequential.render(&request)
        }
    }

    /// Starts a parallel render of the current state without waiting.
    /// Fails with `WorkerUnavailable` in sequential mode.
    pub fn dispatch(&self) -> Result<PendingRender, RenderError> {
        self.parallel.dispatch(&self.request())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explorer(workers: Option<usize>) -> Explorer {
        Explorer::new(Config {
            width: 16,
            height: 16,
            workers,
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn zoom_steps_and_floor() {
        let mut explorer = explorer(None);
        explorer.zoom_in();
        assert_eq!(explorer.view().zoom, 1.5);
        for _ in 0..20 {
            explorer.zoom_out();
        }
        assert_eq!(explorer.view().zoom, MIN_ZOOM);
    }

    #[test]
    fn iterations_are_clamped() {
        let mut explorer = explorer(None);
        explorer.set_max_iterations(0);
        assert_eq!(explorer.max_iterations(), 1);
        explorer.set_max_iterations(5_000_000);
        assert_eq!(explorer.max_iterations(), 1_000_000);
        explorer.set_max_iterations(250);
        assert_eq!(explorer.max_iterations(), 250);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut explorer = explorer(None);
        explorer.zoom_in();
        explorer.click(1, 1);
        explorer.set_max_iterations(9);
        explorer.reset();
        assert_eq!(explorer.view(), ViewState::new(-0.5, 0.0, 1.0));
        assert_eq!(explorer.max_iterations(), 100);
    }

    #[test]
    fn click_uses_pre_click_mapping() {
        let mut explorer = explorer(None);
        let before = PlaneMapper::for_request(&explorer.request());
        let expected = before.pixel_to_point(&Pixel(3, 12));
        explorer.click(3, 12);
        assert_eq!(explorer.view().center_x, expected.re);
        assert_eq!(explorer.view().center_y, expected.im);
        assert_eq!(explorer.view().zoom, 1.0);
    }

    #[test]
    fn clicking_the_center_pixel_keeps_the_view() {
        let mut explorer = explorer(None);
        explorer.click(8, 8);
        assert_eq!(explorer.view(), ViewState::new(-0.5, 0.0, 1.0));
    }

    #[test]
    fn mode_toggle_starts_and_stops_the_pool() {
        let mut explorer = explorer(Some(3));
        assert!(explorer.is_parallel());
        assert_eq!(explorer.active_workers(), 3);
        let parallel = explorer.render().unwrap();

        explorer.set_parallel(false).unwrap();
        assert!(!explorer.is_parallel());
        assert_eq!(explorer.active_workers(), 1);
        assert!(explorer.dispatch().is_err());
        let sequential = explorer.render().unwrap();
        assert_eq!(parallel.pixels, sequential.pixels);

        explorer.set_parallel(true).unwrap();
        assert_eq!(explorer.active_workers(), 3);
    }

    #[test]
    fn resizing_the_pool() {
        let mut explorer = explorer(Some(2));
        explorer.set_workers(5).unwrap();
        assert_eq!(explorer.active_workers(), 5);
        assert!(explorer.set_workers(0).is_err());
        assert_eq!(explorer.active_workers(), 5);
    }
}
