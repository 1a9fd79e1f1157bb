//! The reactive state container.
//!
//! A [`State`] owns a value and the callbacks interested in it. Writes are visible to [`State::get`]
//! right away, but subscribers only hear about them on the next tick, so any number of synchronous
//! writes produce a single notification. If the state
//! is mounted, every flush also diffs the render tree found in the value against the last one it
//! rendered and patches the DOM.

use std::any::Any;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use crate::innerlude::*;

/// Finds the render tree inside a state value, if it carries one.
pub type TreeSelector<T> = fn(&T) -> Option<&VNode>;

/// A [`TreeSelector`] for states whose value is the tree itself.
pub fn select_root(node: &VNode) -> Option<&VNode> {
    Some(node)
}

/// A write to a [`State`]: either a replacement value or a function of the current one.
pub enum Update<T> {
    Value(T),
    Map(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Update<T> {
    pub fn map(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Update::Map(Box::new(f))
    }

    fn apply(self, current: &T) -> T {
        match self {
            Update::Value(value) => value,
            Update::Map(f) => f(current),
        }
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Update::Value(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlushStatus {
    Idle,
    Flushing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

type Subscriber<T> = Rc<dyn Fn(&T)>;

struct StateInner<T> {
    value: T,
    /// Written before the tick, committed by the next flush.
    staged: Option<T>,
    /// Written during a flush, staged once it completes. Newest wins.
    pending: Option<T>,
    status: FlushStatus,
    flush_scheduled: bool,
    chained_flushes: usize,
    subscribers: Vec<(SubscriberId, Subscriber<T>)>,
    next_subscriber: usize,
    mount_point: Option<NodeId>,
    select: Option<TreeSelector<T>>,
    last_tree: Option<VNode>,
}

impl<T> StateInner<T> {
    fn base(&self, policy: UpdatePolicy) -> &T {
        match policy {
            UpdatePolicy::Overwrite => &self.value,
            UpdatePolicy::Compose => self.latest(),
        }
    }

    fn latest(&self) -> &T {
        self.pending
            .as_ref()
            .or(self.staged.as_ref())
            .unwrap_or(&self.value)
    }

    fn is_subscribed(&self, id: SubscriberId) -> bool {
        self.subscribers.iter().any(|(sub, _)| *sub == id)
    }
}

/// A reactive value.
///
/// `State` is a cheap handle: clones share the same value, subscribers and mount.
pub struct State<T: 'static> {
    inner: Rc<RefCell<StateInner<T>>>,
    runtime: Runtime,
}

impl<T: 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T: Debug + 'static> Debug for State<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("State")
            .field("value", &inner.value)
            .field("status", &inner.status)
            .field("subscribers", &inner.subscribers.len())
            .field("mount_point", &inner.mount_point)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> State<T> {
    pub fn new(initial: T, runtime: Runtime) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StateInner {
                value: initial,
                staged: None,
                pending: None,
                status: FlushStatus::Idle,
                flush_scheduled: false,
                chained_flushes: 0,
                subscribers: Vec::new(),
                next_subscriber: 0,
                mount_point: None,
                select: None,
                last_tree: None,
            })),
            runtime,
        }
    }

    /// The newest value, including writes that have not been flushed yet.
    pub fn get(&self) -> T {
        self.inner.borrow().latest().clone()
    }

    /// Borrow the newest value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(self.inner.borrow().latest())
    }

    /// Write a value or an updater. The write is observed on the next flush.
    pub fn set(&self, update: impl Into<Update<T>>) {
        let update = update.into();
        self.write(move |current| update.apply(current));
    }

    /// Write the result of `f`, without boxing it.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.write(f);
    }

    fn write(&self, compute: impl FnOnce(&T) -> T) {
        let policy = self.runtime.config.update_policy;
        // The updater runs without a borrow held so it may read the state itself.
        let base = self.inner.borrow().base(policy).clone();
        let next = compute(&base);

        {
            let mut inner = self.inner.borrow_mut();
            if next == *inner.latest() {
                return;
            }

            if inner.status == FlushStatus::Flushing {
                inner.pending = Some(next);
                return;
            }

            inner.staged = Some(next);
            if inner.flush_scheduled {
                return;
            }
            inner.flush_scheduled = true;
            inner.chained_flushes = 0;
        }

        self.schedule_flush();
    }

    /// Register a callback that runs on every flush, in registration order.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription<T> {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriberId(inner.next_subscriber);
        inner.next_subscriber += 1;
        inner.subscribers.push((id, Rc::new(callback)));
        Subscription {
            id,
            state: Rc::downgrade(&self.inner),
        }
    }

    /// Bind the state to a mount point and render the current tree into it.
    ///
    /// The mount point is emptied first. If the value does not carry a tree yet nothing is
    /// rendered, and later flushes will not render either until the state is mounted again.
    pub fn mount(&self, mount_point: NodeId, select: TreeSelector<T>) {
        let tree = {
            let mut inner = self.inner.borrow_mut();
            inner.mount_point = Some(mount_point);
            inner.select = Some(select);
            inner.last_tree = select(&inner.value).cloned();
            inner.last_tree.clone()
        };

        let Some(tree) = tree else {
            tracing::debug!("State::mount: value carries no render tree, nothing mounted");
            return;
        };

        let mut dom = self.runtime.dom.borrow_mut();
        if let Err(err) = dom.discard_children(mount_point) {
            tracing::error!("State::mount: could not clear {mount_point:?}: {err}");
        }
        let created = create_dom_node(&mut *dom, &tree);
        if let Err(err) = dom.append_child(mount_point, created) {
            tracing::error!("State::mount: could not mount into {mount_point:?}: {err}");
            dom.reclaim(created);
            return;
        }
        release_fragment(&mut *dom, &tree, created);
    }

    /// Drop every subscriber, the mount and any unflushed write. The handle stays usable.
    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.clear();
        inner.last_tree = None;
        inner.mount_point = None;
        inner.select = None;
        inner.pending = None;
        inner.staged = None;
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    pub fn is_flushing(&self) -> bool {
        self.inner.borrow().status == FlushStatus::Flushing
    }

    pub fn mount_point(&self) -> Option<NodeId> {
        self.inner.borrow().mount_point
    }

    /// The snapshot of the last rendered tree.
    pub fn rendered_tree(&self) -> Option<VNode> {
        self.inner.borrow().last_tree.clone()
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    fn schedule_flush(&self) {
        let state = Rc::downgrade(&self.inner);
        let runtime = self.runtime.clone();
        self.runtime.scheduler.schedule(Box::new(move || {
            if let Some(inner) = state.upgrade() {
                State { inner, runtime }.flush();
            }
        }));
    }

    fn flush(&self) {
        let (value, subscribers) = {
            let mut inner = self.inner.borrow_mut();
            inner.flush_scheduled = false;
            if let Some(staged) = inner.staged.take() {
                inner.value = staged;
            }
            inner.status = FlushStatus::Flushing;
            (inner.value.clone(), inner.subscribers.clone())
        };

        tracing::debug!(subscribers = subscribers.len(), "flushing state");

        for (id, callback) in subscribers {
            // a subscriber removed earlier in this flush must not run
            if !self.inner.borrow().is_subscribed(id) {
                continue;
            }
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(&value))) {
                tracing::error!(
                    "Panic in state subscriber {id:?}: {}",
                    panic_message(panic.as_ref())
                );
            }
        }

        self.render(&value);

        let follow_up = {
            let mut inner = self.inner.borrow_mut();
            inner.status = FlushStatus::Idle;
            match inner.pending.take() {
                Some(_) if inner.chained_flushes >= self.runtime.config.flush_budget => {
                    tracing::error!(
                        "State: dropping a write made during flush, {} chained flushes exceeded the budget",
                        inner.chained_flushes
                    );
                    inner.chained_flushes = 0;
                    false
                }
                Some(next) => {
                    inner.staged = Some(next);
                    inner.flush_scheduled = true;
                    inner.chained_flushes += 1;
                    true
                }
                None => {
                    inner.chained_flushes = 0;
                    false
                }
            }
        };

        if follow_up {
            self.schedule_flush();
        }
    }

    fn render(&self, value: &T) {
        let (mount_point, old_tree, new_tree) = {
            let mut inner = self.inner.borrow_mut();
            let (Some(mount_point), Some(select)) = (inner.mount_point, inner.select) else {
                return;
            };
            let Some(new_tree) = select(value) else {
                return;
            };
            let Some(old_tree) = inner.last_tree.take() else {
                return;
            };
            (mount_point, old_tree, new_tree)
        };

        let patched = catch_unwind(AssertUnwindSafe(|| {
            let mut dom = self.runtime.dom.borrow_mut();
            diff(&mut *dom, mount_point, Some(new_tree), Some(&old_tree), 0);
        }));
        if let Err(panic) = patched {
            tracing::error!(
                "Panic while patching {mount_point:?}: {}",
                panic_message(panic.as_ref())
            );
        }

        self.inner.borrow_mut().last_tree = Some(new_tree.clone());
    }
}

/// The handle returned by [`State::subscribe`].
///
/// Dropping it keeps the callback registered; call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription<T> {
    id: SubscriberId,
    state: Weak<RefCell<StateInner<T>>>,
}

impl<T> Subscription<T> {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove exactly this callback. It will not run on any later flush.
    pub fn unsubscribe(self) {
        if let Some(state) = self.state.upgrade() {
            state
                .borrow_mut()
                .subscribers
                .retain(|(id, _)| *id != self.id);
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
