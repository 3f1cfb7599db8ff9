use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use crossbeam_channel::{bounded, unbounded};
use log::debug;
use crate::Result;

pub trait ParallelProcessor {
    /// A dedicated pool so callers never fight over rayon's global one.
    fn build_thread_pool(workers: usize, name: &'static str) -> Result<rayon::ThreadPool> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |i| format!("{}-{}", name, i))
            .build()?;
        debug!("Built {} pool with {} threads", name, pool.current_num_threads());
        Ok(pool)
    }

    fn get_progress_counter() -> AtomicUsize {
        AtomicUsize::new(0)
    }
}

/// Runs `work` over `jobs` on `workers` threads and hands every result to
/// `on_complete` on the calling thread, in completion order.
///
/// A feeder thread pushes jobs through a bounded submission channel; workers
/// push results through a completion channel only this function reads, so
/// `on_complete` never needs to synchronise. Once `cancel` is set no further
/// jobs are submitted or started. Returns how many jobs completed.
pub fn run_bounded<J, R, W, C>(
    jobs: Vec<J>,
    workers: usize,
    cancel: &AtomicBool,
    work: W,
    mut on_complete: C,
) -> Result<usize>
where
    J: Send,
    R: Send,
    W: Fn(J) -> R + Sync,
    C: FnMut(R),
{
    let workers = workers.max(1);
    let (job_tx, job_rx) = bounded::<J>(workers * 2);
    let (done_tx, done_rx) = unbounded::<R>();
    let work = &work;

    thread::scope(|s| -> Result<usize> {
        thread::Builder::new()
            .name("feeder".into())
            .spawn_scoped(s, move || {
                for job in jobs {
                    if cancel.load(Ordering::SeqCst) || job_tx.send(job).is_err() {
                        break;
                    }
                }
            })?;

        for i in 0..workers {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn_scoped(s, move || {
                    for job in job_rx.iter() {
                        if cancel.load(Ordering::SeqCst) {
                            break;
                        }
                        if done_tx.send(work(job)).is_err() {
                            break;
                        }
                    }
                })?;
        }
        // Only workers hold senders now; the loop below ends when they all exit
        drop(job_rx);
        drop(done_tx);

        let mut completed = 0;
        for result in done_rx.iter() {
            completed += 1;
            on_complete(result);
        }
        Ok(completed)
    })
}

/// Runs `f`, turning a panic into `Err` with the panic message.
pub fn catch_panic<T>(f: impl FnOnce() -> T) -> std::result::Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "worker panicked".to_string()
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
    /// Items per second so far.
    pub rate: f64,
    pub eta: Option<Duration>,
}

pub struct ProgressTracker {
    total: usize,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self, processed: usize) -> Progress {
        Self::estimate(processed, self.total, self.elapsed())
    }

    pub fn estimate(processed: usize, total: usize, elapsed: Duration) -> Progress {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > f64::EPSILON {
            processed as f64 / secs
        } else {
            0.0
        };
        let eta = if rate > 0.0 {
            let remaining = total.saturating_sub(processed) as f64;
            Some(Duration::from_secs_f64(remaining / rate))
        } else {
            None
        };
        Progress { processed, total, rate, eta }
    }
}
