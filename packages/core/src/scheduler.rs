//! "Next tick" scheduling.
//!
//! State containers never flush synchronously. They hand a [`Task`] to a [`Scheduler`], and the
//! host decides when a tick happens: an explicit run loop ([`TickQueue`]) or a channel drained by
//! an async executor ([`ChannelScheduler`]).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::StreamExt;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Defers a task to a later tick.
pub trait Scheduler {
    fn schedule(&self, task: Task);
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }
}

/// A manually driven run loop.
///
/// Each call to [`TickQueue::run_tick`] is one turn of the loop: it runs the tasks that were
/// queued before the turn started. Anything scheduled while the turn runs waits for the next one.
#[derive(Clone, Default)]
pub struct TickQueue {
    queue: Rc<RefCell<VecDeque<Task>>>,
}

impl TickQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one tick. Returns the number of tasks that ran.
    pub fn run_tick(&self) -> usize {
        let batch: Vec<Task> = self.queue.borrow_mut().drain(..).collect();
        let ran = batch.len();
        for task in batch {
            task();
        }
        ran
    }

    /// Run ticks until nothing is queued. Returns the number of ticks.
    pub fn run_until_idle(&self) -> usize {
        let mut ticks = 0;
        while self.run_tick() > 0 {
            ticks += 1;
        }
        ticks
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl Scheduler for TickQueue {
    fn schedule(&self, task: Task) {
        self.queue.borrow_mut().push_back(task);
    }
}

/// A scheduler backed by an unbounded channel.
///
/// Tasks are executed by the paired [`TaskLoop`], typically spawned on a local executor.
#[derive(Clone)]
pub struct ChannelScheduler {
    sender: UnboundedSender<Task>,
}

/// The receiving end of a [`ChannelScheduler`].
pub struct TaskLoop {
    receiver: UnboundedReceiver<Task>,
}

impl ChannelScheduler {
    pub fn new() -> (Self, TaskLoop) {
        let (sender, receiver) = unbounded();
        (Self { sender }, TaskLoop { receiver })
    }
}

impl Scheduler for ChannelScheduler {
    fn schedule(&self, task: Task) {
        if self.sender.unbounded_send(task).is_err() {
            tracing::warn!("ChannelScheduler: task loop is gone, dropping task");
        }
    }
}

impl TaskLoop {
    /// Execute tasks as they arrive until every scheduler handle is dropped.
    pub async fn run(mut self) {
        while let Some(task) = self.receiver.next().await {
            task();
        }
    }

    /// Execute the tasks that are already queued, without waiting. Returns how many ran.
    pub fn run_ready(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}
