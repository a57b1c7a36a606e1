//! Long-lived band workers.  Each worker is a thread with its own job
//! channel; jobs carry a reply channel on which the rendered band goes
//! back.  Workers share nothing mutable with the coordinator: the
//! palette is read-only and each band buffer is handed over whole.

use crossbeam::channel::{unbounded, Sender};
use log::{debug, trace, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::band::{render_band, Band};
use crate::error::RenderError;
use crate::palette::Palette;
use crate::view::RenderRequest;

/// One band of one render, as sent to a worker.
#[derive(Debug)]
pub struct BandJob {
    /// The render this band belongs to.
    pub generation: u64,
    /// Rows to render.
    pub band: Band,
    /// The full request; the band only selects rows of it.
    pub request: RenderRequest,
    /// Where to send the finished band.
    pub reply: Sender<BandReply>,
}

/// A worker's answer to a [`BandJob`].
#[derive(Debug)]
pub struct BandReply {
    /// The render this band belongs to.
    pub generation: u64,
    /// Rows covered by `pixels`.
    pub band: Band,
    /// The band's RGBA bytes, or `None` when the worker skipped the job
    /// because a newer render had already been dispatched.
    pub pixels: Option<Vec<u8>>,
}

struct Worker {
    jobs: Sender<BandJob>,
    handle: JoinHandle<()>,
    alive: Arc<AtomicBool>,
}

/// Cleared when the worker thread exits, unwinding included.
struct Heartbeat(Arc<AtomicBool>);

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A fixed-size set of band workers.  Dropping the pool closes every
/// job channel and joins every thread.
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Spawns `size` workers.  `latest` is the generation of the newest
    /// dispatched render; workers use it to skip stale jobs.
    pub fn start(
        size: usize,
        palette: Arc<Palette>,
        latest: Arc<AtomicU64>,
    ) -> Result<WorkerPool, RenderError> {
        if size == 0 {
            return Err(RenderError::WorkerUnavailable);
        }
        let mut pool = WorkerPool {
            workers: Vec::with_capacity(size),
        };
        for id in 0..size {
            let (jobs, inbox) = unbounded::<BandJob>();
            let palette = palette.clone();
            let latest = latest.clone();
            let alive = Arc::new(AtomicBool::new(true));
            let heartbeat = Heartbeat(alive.clone());
            let handle = thread::Builder::new()
                .name(format!("mandelbrot-worker-{}", id))
                .spawn(move || {
                    let _heartbeat = heartbeat;
                    for job in inbox.iter() {
                        let stale = job.generation < latest.load(Ordering::Acquire);
                        let pixels = if stale {
                            None
                        } else {
                            Some(render_band(&job.band, &job.request, &palette))
                        };
                        trace!(
                            "worker {} finished rows {:?} of render {}{}",
                            id,
                            job.band.rows(),
                            job.generation,
                            if stale { " (skipped)" } else { "" }
                        );
                        // The render may have been abandoned; nobody to tell.
                        let _ = job.reply.send(BandReply {
                            generation: job.generation,
                            band: job.band,
                            pixels,
                        });
                    }
                })
                .map_err(|_| RenderError::WorkerUnavailable)?;
            pool.workers.push(Worker {
                jobs,
                handle,
                alive,
            });
        }
        debug!("started {} band workers", size);
        Ok(pool)
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// True when every worker thread is still running.  A worker only
    /// exits early by panicking.
    pub fn is_healthy(&self) -> bool {
        self.workers
            .iter()
            .all(|worker| worker.alive.load(Ordering::Acquire))
    }

    #[cfg(test)]
    pub(crate) fn mark_dead(&self, index: usize) {
        self.workers[index].alive.store(false, Ordering::Release);
    }

    /// Hands a job to worker `index`.
    pub fn submit(&self, index: usize, job: BandJob) -> Result<(), RenderError> {
        let worker = self
            .workers
            .get(index)
            .ok_or(RenderError::WorkerUnavailable)?;
        worker
            .jobs
            .send(job)
            .map_err(|_| RenderError::WorkerUnavailable)
    }

    /// Closes the job channels and waits for every worker to exit.
    /// Workers finish the job in hand first.
    pub fn stop(&mut self) {
        let size = self.workers.len();
        for (id, worker) in self.workers.drain(..).enumerate() {
            let Worker { jobs, handle, .. } = worker;
            drop(jobs);
            reap(id, handle);
        }
        if size > 0 {
            debug!("stopped {} band workers", size);
        }
    }
}

/// Joins a worker thread, reporting whether it exited cleanly.
fn reap(id: usize, handle: JoinHandle<()>) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            warn!("band worker {} panicked", id);
            false
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop();
    }
}
