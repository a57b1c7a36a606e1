//! Startup settings for an [`Explorer`](../explorer/struct.Explorer.html),
//! and the limits the explorer clamps user input to.

use std::time::Duration;

use crate::planes::YStep;
use crate::view::ViewState;

/// Default image edge, in pixels.
pub const DEFAULT_SIZE: usize = 600;
/// Iteration cap at startup and after a reset.
pub const DEFAULT_ITERATIONS: u32 = 100;
/// Smallest iteration cap the explorer accepts.
pub const MIN_ITERATIONS: u32 = 1;
/// Largest iteration cap the explorer accepts.
pub const MAX_ITERATIONS: u32 = 1_000_000;
/// Zoom never drops below this.
pub const MIN_ZOOM: f64 = 0.1;
/// Each zoom step multiplies or divides by this.
pub const ZOOM_FACTOR: f64 = 1.5;
/// Worker count when the hardware does not report one.
pub const FALLBACK_WORKERS: usize = 4;

/// How many workers to run by default: one per logical CPU.
pub fn default_workers() -> usize {
    match num_cpus::get() {
        0 => FALLBACK_WORKERS,
        n => n,
    }
}

/// Everything needed to set up an explorer.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Initial view.
    pub view: ViewState,
    /// Initial iteration cap.
    pub max_iterations: u32,
    /// Worker count for parallel mode; `None` renders sequentially.
    pub workers: Option<usize>,
    /// Which axis divides the vertical step.
    pub y_step: YStep,
    /// Give up on a parallel render after this long.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            view: ViewState::default(),
            max_iterations: DEFAULT_ITERATIONS,
            workers: Some(default_workers()),
            y_step: YStep::default(),
            timeout: None,
        }
    }
}
