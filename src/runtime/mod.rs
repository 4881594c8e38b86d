//! Serial work queue
//!
//! Producers (UI callbacks, controller polling, timers) only enqueue [`Job`]s.
//! A single tokio task drains the queue and owns every action, so action state
//! is never touched from two places at once.

mod session;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::debug;

use crate::action::{ActionId, ActionTimer};
use crate::dispatch::{Engine, PriorityTier};
use crate::input::LogicalKey;
use crate::keymap::Keymap;
use crate::touch::ScreenBounds;

pub use session::{Collaborators, Session, SessionError};

/// A unit of work for the serial queue
#[derive(Debug)]
pub enum Job {
    /// Replace the live action set
    Build(Box<Keymap>),
    /// Invalidate and drop every action
    Clear,
    /// New screen bounds; rebuilds the last keymap
    Resize(ScreenBounds),
    /// Boolean key edge
    Key { key: LogicalKey, pressed: bool },
    /// Vector event resolved by the producer to a tier slot
    Vector {
        tier: PriorityTier,
        index: usize,
        key: LogicalKey,
        x: f32,
        y: f32,
    },
    /// Absolute analog stick position for a camera-bound stick
    Stick { key: LogicalKey, x: f32, y: f32 },
    InvalidateAll,
    InvalidateNonButton,
    Timer(TimerJob),
    /// Resolves once every earlier job has run
    Barrier(oneshot::Sender<()>),
    /// Invalidate everything and stop the worker
    Shutdown,
}

/// Timer callbacks delivered back through the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerJob {
    /// Timer armed by an action during build `generation`
    Action {
        generation: u64,
        action: ActionId,
        timer: ActionTimer,
    },
    /// Analog stick poll tick
    StickPoll { key: LogicalKey, epoch: u32 },
}

/// Producer side of the work queue
#[derive(Debug, Clone)]
pub struct WorkQueue {
    sender: mpsc::UnboundedSender<Job>,
}

impl WorkQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Job>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Enqueues a job, returning false once the worker has stopped
    pub fn send(&self, job: Job) -> bool {
        self.sender.send(job).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Arms timers that report back through the work queue
#[derive(Debug, Clone)]
pub struct Scheduler {
    queue: WorkQueue,
    generation: u64,
}

impl Scheduler {
    pub fn new(queue: WorkQueue) -> Self {
        Self {
            queue,
            generation: 0,
        }
    }

    /// Build generation stamped onto action timers
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Timer job for an action of the current build
    pub fn action_timer(&self, action: ActionId, timer: ActionTimer) -> TimerJob {
        TimerJob::Action {
            generation: self.generation,
            action,
            timer,
        }
    }

    /// Delivers `job` once after `delay`
    pub fn after(&self, delay: Duration, job: TimerJob) {
        let queue = self.queue.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            queue.send(Job::Timer(job));
        });
    }

    /// Delivers `job` every `period` until `alive` is cleared
    ///
    /// The first tick fires one period from now. The loop also ends when the
    /// queue has shut down.
    pub fn every(&self, period: Duration, job: TimerJob, alive: Arc<AtomicBool>) {
        let queue = self.queue.clone();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !alive.load(Ordering::Acquire) {
                    break;
                }
                if !queue.send(Job::Timer(job)) {
                    break;
                }
            }
            debug!(?job, "repeating timer stopped");
        });
    }
}

/// Drains the queue until shutdown or until every producer is gone
pub(crate) async fn run_worker(mut engine: Engine, mut jobs: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = jobs.recv().await {
        if matches!(job, Job::Shutdown) {
            engine.handle(Job::InvalidateAll);
            break;
        }
        engine.handle(job);
    }
    debug!("work queue stopped");
}
