//! Fixed-size worker pool for CPU bound pricing tasks.

use std::io;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Raised when work is submitted after the queue has been closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("worker pool is no longer accepting work")]
pub struct PoolClosed;

/// How a call to [`WorkerPool::shutdown`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every worker finished its queue and was joined.
    Drained,
    /// The grace period elapsed; queued jobs were cancelled and busy workers detached.
    Forced { abandoned: usize },
    /// The pool had already been shut down.
    AlreadyStopped,
}

pub struct WorkerPool {
    jobs: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    exited: Receiver<usize>,
    cancelled: Arc<AtomicBool>,
    size: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl WorkerPool {
    /// Spawns `size` named worker threads (at least one) sharing an unbounded job queue.
    pub fn new(size: usize) -> io::Result<Self> {
        let size = size.max(1);
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job>();
        let (exit_tx, exit_rx) = crossbeam_channel::bounded::<usize>(size);
        let cancelled = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            let jobs = job_rx.clone();
            let exited = exit_tx.clone();
            let cancelled = cancelled.clone();
            let handle = thread::Builder::new()
                .name(format!("prediction-worker-{index}"))
                .spawn(move || {
                    for job in jobs.iter() {
                        if cancelled.load(Ordering::Acquire) {
                            continue;
                        }
                        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                            warn!(worker = index, "job panicked; worker continues");
                        }
                    }
                    let _ = exited.send(index);
                })?;
            workers.push(handle);
        }

        Ok(Self {
            jobs: Mutex::new(Some(job_tx)),
            workers: Mutex::new(workers),
            exited: exit_rx,
            cancelled,
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Jobs waiting for a free worker.
    pub fn queued(&self) -> usize {
        lock(&self.jobs).as_ref().map_or(0, |jobs| jobs.len())
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.jobs).is_none()
    }

    /// Queues `job`; never blocks on a saturated pool.
    pub fn submit<F>(&self, job: F) -> Result<(), PoolClosed>
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = lock(&self.jobs);
        let jobs = guard.as_ref().ok_or(PoolClosed)?;
        jobs.send(Box::new(job)).map_err(|_| PoolClosed)
    }

    /// Closes the queue, then waits up to `grace` for workers to drain it.
    ///
    /// Past the deadline the remaining queue is discarded and busy workers are detached;
    /// their in-flight job runs to completion on its own thread.
    pub fn shutdown(&self, grace: Duration) -> ShutdownOutcome {
        let Some(jobs) = lock(&self.jobs).take() else {
            return ShutdownOutcome::AlreadyStopped;
        };
        drop(jobs);

        let workers = mem::take(&mut *lock(&self.workers));
        let deadline = Instant::now() + grace;
        let mut finished = 0;
        while finished < workers.len() {
            match self.exited.recv_deadline(deadline) {
                Ok(index) => {
                    debug!(worker = index, "worker drained");
                    finished += 1;
                }
                Err(_) => break,
            }
        }

        if finished < workers.len() {
            self.cancelled.store(true, Ordering::Release);
            let abandoned = workers.len() - finished;
            warn!(abandoned, ?grace, "workers still busy after grace period; detaching");
            return ShutdownOutcome::Forced { abandoned };
        }

        for worker in workers {
            let _ = worker.join();
        }
        ShutdownOutcome::Drained
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the queue lets idle workers exit once the backlog is done.
        lock(&self.jobs).take();
    }
}
