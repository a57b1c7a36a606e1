// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The band-parallel scheduler.  An image is cut into one band of rows
//! per worker; each band goes to a long-lived worker, and the finished
//! bands are copied into the output as they come back.  The frame is
//! released only after the last band has arrived.
//!
//! Every dispatch is tagged with a generation number.  Starting a new
//! render makes all older ones stale: workers skip their remaining
//! bands, and a stale render resolves to `Superseded` rather than
//! handing back an image of a view the caller has already left.

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, TryRecvError};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::band::{merge_band, partition, render_band_into};
use crate::error::RenderError;
use crate::frame::Frame;
use crate::palette::Palette;
use crate::pool::{BandJob, BandReply, WorkerPool};
use crate::view::RenderRequest;
use crate::Renderer;

/// Owns the worker pool and the generation counter.
pub struct ParallelRenderer {
    pool: Option<WorkerPool>,
    palette: Arc<Palette>,
    latest: Arc<AtomicU64>,
    timeout: Option<Duration>,
}

impl ParallelRenderer {
    /// A scheduler with no workers yet; call [`start`](#method.start)
    /// before rendering.
    pub fn new(palette: Arc<Palette>) -> ParallelRenderer {
        ParallelRenderer {
            pool: None,
            palette,
            latest: Arc::new(AtomicU64::new(0)),
            timeout: None,
        }
    }

    /// A scheduler with `workers` running workers.
    pub fn with_workers(
        palette: Arc<Palette>,
        workers: usize,
    ) -> Result<ParallelRenderer, RenderError> {
        let mut renderer = ParallelRenderer::new(palette);
        renderer.start(workers)?;
        Ok(renderer)
    }

    /// (Re)creates the pool with `workers` workers.  Any existing
    /// workers are stopped and joined first.
    pub fn start(&mut self, workers: usize) -> Result<(), RenderError> {
        self.stop();
        self.pool = Some(WorkerPool::start(
            workers,
            self.palette.clone(),
            self.latest.clone(),
        )?);
        Ok(())
    }

    /// Stops and joins every worker.  Renders still in flight become
    /// stale and resolve to `Superseded`.
    pub fn stop(&mut self) {
        if let Some(mut pool) = self.pool.take() {
            // Anything still queued is now stale.
            self.latest.fetch_add(1, Ordering::AcqRel);
            pool.stop();
        }
    }

    /// True while a pool is running.
    pub fn is_running(&self) -> bool {
        self.pool.is_some()
    }

    /// Number of running workers; zero when stopped.
    pub fn workers(&self) -> usize {
        self.pool.as_ref().map_or(0, WorkerPool::size)
    }

    /// Bounds how long [`Renderer::render`] waits for the bands.
    /// `None` waits forever.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Generation of the most recent dispatch.
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Sends every non-empty band of `request` to its worker and returns
    /// without waiting.  Older renders become stale.
    ///
    /// A stopped pool, or one with a dead worker, is refused before a
    /// generation is taken, so the previous render stays current.  A
    /// worker that dies between that check and its submit still fails
    /// the dispatch with `WorkerUnavailable`; by then the generation is
    /// spent and any bands already sent are skipped or discarded.
    pub fn dispatch(&self, request: &RenderRequest) -> Result<PendingRender, RenderError> {
        request.validate()?;
        let pool = self
            .pool
            .as_ref()
            .filter(|pool| pool.size() > 0 && pool.is_healthy())
            .ok_or(RenderError::WorkerUnavailable)?;
        let started = Instant::now();
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;

        let (reply, replies) = unbounded::<BandReply>();
        let mut outstanding = 0;
        for (index, band) in partition(request.height, pool.size()).into_iter().enumerate() {
            if band.is_empty() {
                continue;
            }
            pool.submit(
                index,
                BandJob {
                    generation,
                    band,
                    request: *request,
                    reply: reply.clone(),
                },
            )?;
            outstanding += 1;
        }
        debug!(
            "dispatched render {} ({}x{}, {} iterations) as {} bands",
            generation, request.width, request.height, request.max_iterations, outstanding
        );

        Ok(PendingRender {
            generation,
            width: request.width,
            height: request.height,
            image: vec![0u8; request.buffer_len()],
            outstanding,
            replies,
            latest: self.latest.clone(),
            started,
            spent: false,
        })
    }
}

impl Renderer for ParallelRenderer {
    fn render(&self, request: &RenderRequest) -> Result<Frame, RenderError> {
        let pending = self.dispatch(request)?;
        match self.timeout {
            Some(timeout) => pending.wait_timeout(timeout),
            None => pending.wait(),
        }
    }
}

impl Drop for ParallelRenderer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A dispatched render whose bands are still coming back.  The image
/// being assembled is private until every band has been merged.
#[derive(Debug)]
pub struct PendingRender {
    generation: u64,
    width: usize,
    height: usize,
    image: Vec<u8>,
    outstanding: usize,
    replies: Receiver<BandReply>,
    latest: Arc<AtomicU64>,
    started: Instant,
    spent: bool,
}

impl PendingRender {
    /// The generation this render was tagged with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bands not yet merged.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Blocks until every band is back.
    pub fn wait(mut self) -> Result<Frame, RenderError> {
        while self.outstanding > 0 {
            let reply = self
                .replies
                .recv()
                .map_err(|_| RenderError::WorkerUnavailable)?;
            self.accept(reply)?;
        }
        self.finish()
    }

    /// Like [`wait`](#method.wait), but gives up with `RenderTimeout`
    /// once `timeout` has passed since this call.
    pub fn wait_timeout(mut self, timeout: Duration) -> Result<Frame, RenderError> {
        let deadline = Instant::now() + timeout;
        while self.outstanding > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let reply = self.replies.recv_timeout(remaining).map_err(|e| match e {
                RecvTimeoutError::Timeout => RenderError::RenderTimeout { waited: timeout },
                RecvTimeoutError::Disconnected => RenderError::WorkerUnavailable,
            })?;
            self.accept(reply)?;
        }
        self.finish()
    }

    /// Merges whatever bands have arrived without blocking.  Returns
    /// `None` while bands are outstanding and `Some` exactly once, when
    /// the render resolves; after that the handle is spent and keeps
    /// returning `None`.
    pub fn poll(&mut self) -> Option<Result<Frame, RenderError>> {
        if self.spent {
            return None;
        }
        while self.outstanding > 0 {
            let outcome = match self.replies.try_recv() {
                Ok(reply) => self.accept(reply),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Err(RenderError::WorkerUnavailable),
            };
            if let Err(e) = outcome {
                self.spent = true;
                return Some(Err(e));
            }
        }
        Some(self.finish())
    }

    fn accept(&mut self, reply: BandReply) -> Result<(), RenderError> {
        match reply.pixels {
            Some(pixels) => {
                merge_band(&mut self.image, self.width, &reply.band, &pixels);
                self.outstanding -= 1;
                Ok(())
            }
            None => Err(self.superseded()),
        }
    }

    fn finish(&mut self) -> Result<Frame, RenderError> {
        self.spent = true;
        if self.latest.load(Ordering::Acquire) != self.generation {
            return Err(self.superseded());
        }
        let frame = Frame {
            width: self.width,
            height: self.height,
            pixels: std::mem::replace(&mut self.image, Vec::new()),
            elapsed: self.started.elapsed(),
        };
        info!(
            "render {} complete in {:.1} ms",
            self.generation,
            frame.elapsed_ms()
        );
        Ok(frame)
    }

    fn superseded(&self) -> RenderError {
        warn!("discarding stale render {}", self.generation);
        RenderError::Superseded {
            generation: self.generation,
        }
    }
}

/// Spawn-per-render variant: one scoped thread per band, each writing
/// straight into its own disjoint slice of the output.  Produces the
/// same bytes as the pooled scheduler; no generations, no pool.
pub fn render_scoped(
    request: &RenderRequest,
    palette: &Palette,
    threads: usize,
) -> Result<Frame, RenderError> {
    request.validate()?;
    if threads == 0 {
        return Err(RenderError::WorkerUnavailable);
    }
    let started = Instant::now();
    let mut image = vec![0u8; request.buffer_len()];
    let request = *request;

    {
        let bands: Vec<_> = partition(request.height, threads)
            .into_iter()
            .filter(|band| !band.is_empty())
            .collect();
        let band_bytes = bands[0].len() * request.width * 4;
        let regions: Vec<&mut [u8]> = image.chunks_mut(band_bytes).collect();
        crossbeam::scope(|spawner| {
            for (band, region) in bands.into_iter().zip(regions) {
                spawner.spawn(move |_| {
                    render_band_into(&band, &request, palette, region);
                });
            }
        })
        .map_err(|_| RenderError::WorkerUnavailable)?;
    }

    Ok(Frame {
        width: request.width,
        height: request.height,
        pixels: image,
        elapsed: started.elapsed(),
    })
}
