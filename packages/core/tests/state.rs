//! Batching, notification and rendering behaviour of `State`.

use std::cell::RefCell;
use std::rc::Rc;

use mintkit_core::{
    select_root, Config, Dom, NodeId, Props, Runtime, State, Subscription, TickQueue, Update,
    UpdatePolicy, VNode,
};
use mintkit_headless::{new_document, Document, Mutation::*};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, PartialEq)]
struct Count {
    count: i32,
}

struct Harness {
    document: Rc<RefCell<Document>>,
    scheduler: TickQueue,
    runtime: Runtime,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(Config::default())
    }

    fn with_config(config: Config) -> Self {
        let (document, dom) = new_document();
        document.borrow_mut().set_recording(true);
        let scheduler = TickQueue::new();
        let runtime = Runtime::new(dom, scheduler.clone()).with_config(config);
        Self {
            document,
            scheduler,
            runtime,
        }
    }

    /// A `div` under the body to mount into.
    fn mount_point(&self) -> NodeId {
        let mut doc = self.document.borrow_mut();
        let body = doc.body();
        let root = doc.create_element("div").unwrap();
        doc.append_child(body, root).unwrap();
        doc.clear_mutations();
        root
    }

    fn html(&self, node: NodeId) -> String {
        self.document.borrow().inner_html(node)
    }
}

/// Record every value a state notifies with.
fn record<T: Clone + PartialEq + 'static>(state: &State<T>) -> Rc<RefCell<Vec<T>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    state.subscribe(move |value: &T| sink.borrow_mut().push(value.clone()));
    seen
}

#[test]
fn writes_in_one_tick_notify_once() {
    let h = Harness::new();
    let state = h.runtime.create_state(0);
    let seen = record(&state);

    state.set(1);
    state.set(2);
    state.set(3);

    assert!(seen.borrow().is_empty());
    assert_eq!(state.get(), 3);
    assert_eq!(h.scheduler.pending(), 1);

    h.scheduler.run_tick();

    assert_eq!(*seen.borrow(), [3]);
    assert_eq!(state.get(), 3);
    assert!(h.scheduler.is_idle());
}

#[test]
fn updaters_overwrite_by_default() {
    let h = Harness::new();
    let state = h.runtime.create_state(Count { count: 0 });
    let seen = record(&state);

    for _ in 0..3 {
        state.update(|v| Count { count: v.count + 1 });
    }
    h.scheduler.run_tick();

    assert_eq!(*seen.borrow(), [Count { count: 1 }]);
}

#[test]
fn updaters_compose_when_configured() {
    let h = Harness::with_config(Config::new().with_update_policy(UpdatePolicy::Compose));
    let state = h.runtime.create_state(Count { count: 0 });
    let seen = record(&state);

    for _ in 0..3 {
        state.update(|v| Count { count: v.count + 1 });
    }
    h.scheduler.run_tick();

    assert_eq!(*seen.borrow(), [Count { count: 3 }]);
}

#[test]
fn reads_see_writes_before_the_flush() {
    let h = Harness::new();
    let state = h.runtime.create_state(0);
    let seen = record(&state);

    state.set(5);
    assert_eq!(state.get(), 5);
    assert_eq!(state.with(|v| v * 2), 10);

    // overwrite updaters still start from the flushed value
    state.update(|v| v + 1);
    assert_eq!(state.get(), 1);
    assert!(seen.borrow().is_empty());

    h.scheduler.run_tick();
    assert_eq!(*seen.borrow(), [1]);
    assert_eq!(state.get(), 1);
}

#[test]
fn composed_reads_see_every_write() {
    let h = Harness::with_config(Config::new().with_update_policy(UpdatePolicy::Compose));
    let state = h.runtime.create_state(0);
    let seen = record(&state);

    state.set(5);
    assert_eq!(state.get(), 5);
    state.update(|v| v + 1);
    assert_eq!(state.get(), 6);
    assert!(seen.borrow().is_empty());

    h.scheduler.run_tick();
    assert_eq!(*seen.borrow(), [6]);
}

#[test]
fn boxed_updates_go_through_set() {
    let h = Harness::new();
    let state = h.runtime.create_state(10);

    state.set(Update::map(|v: &i32| v * 2));
    h.scheduler.run_tick();

    assert_eq!(state.get(), 20);
}

#[test]
fn writing_the_current_value_is_a_no_op() {
    let h = Harness::new();
    let state = h.runtime.create_state(5);
    let seen = record(&state);

    state.set(5);

    assert!(h.scheduler.is_idle());
    assert_eq!(h.scheduler.run_until_idle(), 0);
    assert!(seen.borrow().is_empty());
}

#[test]
fn a_panicking_subscriber_does_not_stop_the_rest() {
    let h = Harness::new();
    let state = h.runtime.create_state(0);
    state.subscribe(|_| panic!("subscriber failed"));
    let seen = record(&state);

    state.set(1);
    h.scheduler.run_tick();

    assert_eq!(*seen.borrow(), [1]);
    assert!(!state.is_flushing());

    state.set(2);
    h.scheduler.run_tick();
    assert_eq!(*seen.borrow(), [1, 2]);
}

#[test]
fn subscribers_run_in_registration_order() {
    let h = Harness::new();
    let state = h.runtime.create_state(0);
    let order = Rc::new(RefCell::new(Vec::new()));
    for name in ["first", "second", "third"] {
        let order = order.clone();
        state.subscribe(move |_| order.borrow_mut().push(name));
    }

    state.set(1);
    h.scheduler.run_tick();

    assert_eq!(*order.borrow(), ["first", "second", "third"]);
}

#[test]
fn unsubscribed_callbacks_never_run_again() {
    let h = Harness::new();
    let state = h.runtime.create_state(0);
    let kept = record(&state);
    let dropped = Rc::new(RefCell::new(Vec::new()));
    let subscription = {
        let dropped = dropped.clone();
        state.subscribe(move |v| dropped.borrow_mut().push(*v))
    };

    state.set(1);
    h.scheduler.run_tick();
    subscription.unsubscribe();
    state.set(2);
    h.scheduler.run_tick();

    assert_eq!(*dropped.borrow(), [1]);
    assert_eq!(*kept.borrow(), [1, 2]);
    assert_eq!(state.subscriber_count(), 1);
}

#[test]
fn unsubscribing_during_a_flush_skips_the_callback() {
    let h = Harness::new();
    let state = h.runtime.create_state(0);
    let later: Rc<RefCell<Option<Subscription<i32>>>> = Rc::new(RefCell::new(None));
    {
        let later = later.clone();
        state.subscribe(move |_| {
            if let Some(subscription) = later.borrow_mut().take() {
                subscription.unsubscribe();
            }
        });
    }
    let calls = Rc::new(RefCell::new(0));
    let subscription = {
        let calls = calls.clone();
        state.subscribe(move |_| *calls.borrow_mut() += 1)
    };
    *later.borrow_mut() = Some(subscription);

    state.set(1);
    h.scheduler.run_tick();

    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn writes_during_a_flush_schedule_one_more() {
    let h = Harness::new();
    let state = h.runtime.create_state(0);
    let seen = record(&state);
    {
        let handle = state.clone();
        state.subscribe(move |v| {
            if *v == 1 {
                handle.set(10);
                handle.set(11);
            }
        });
    }

    state.set(1);
    assert_eq!(h.scheduler.run_tick(), 1);
    assert_eq!(*seen.borrow(), [1]);
    assert_eq!(h.scheduler.pending(), 1);

    assert_eq!(h.scheduler.run_until_idle(), 1);
    assert_eq!(*seen.borrow(), [1, 11]);
}

#[test]
fn runaway_writes_stop_at_the_flush_budget() {
    let h = Harness::with_config(Config::new().with_flush_budget(3));
    let state = h.runtime.create_state(0);
    let seen = record(&state);
    {
        let handle = state.clone();
        state.subscribe(move |v| handle.set(v + 1));
    }

    state.set(1);
    h.scheduler.run_until_idle();

    assert_eq!(*seen.borrow(), [1, 2, 3, 4]);
    assert_eq!(state.get(), 4);
}

#[test]
fn clear_drops_subscribers_and_pending_writes() {
    let h = Harness::new();
    let state = h.runtime.create_state(0);
    let seen = record(&state);

    state.set(1);
    state.clear();
    h.scheduler.run_until_idle();

    assert!(seen.borrow().is_empty());
    assert_eq!(state.get(), 0);
    assert!(!state.has_subscribers());

    // the handle is still usable
    let again = record(&state);
    state.set(2);
    h.scheduler.run_tick();
    assert_eq!(*again.borrow(), [2]);
}

#[test]
fn mounting_renders_the_current_tree() {
    let h = Harness::new();
    let root = h.mount_point();
    let state = h.runtime.create_state(VNode::element("p", Props::new(), ["hi".into()]));

    state.mount(root, select_root);

    assert_eq!(state.mount_point(), Some(root));
    assert_eq!(h.html(root), "<p>hi</p>");
}

#[test]
fn mounting_replaces_existing_content() {
    let h = Harness::new();
    let root = h.mount_point();
    {
        let mut doc = h.document.borrow_mut();
        let stale = doc.create_text_node("loading");
        doc.append_child(root, stale).unwrap();
    }
    let state = h.runtime.create_state(VNode::text("ready"));

    state.mount(root, select_root);

    assert_eq!(h.html(root), "ready");
}

#[test]
fn flushes_patch_the_mounted_tree() {
    let h = Harness::new();
    let root = h.mount_point();
    let view = |n: i32| {
        VNode::element(
            "p",
            Props::new().attr("data-n", n),
            [VNode::text(format!("count {n}"))],
        )
    };
    let state = h.runtime.create_state(view(0));
    state.mount(root, select_root);
    h.document.borrow_mut().clear_mutations();

    state.set(view(1));
    h.scheduler.run_tick();

    let p = NodeId(4);
    assert_eq!(
        h.document.borrow_mut().take_mutations(),
        [
            SetAttribute {
                id: p,
                name: "data-n".into(),
                value: "1".into()
            },
            CreateTextNode {
                id: NodeId(6),
                text: "count 1".into()
            },
            ReplaceChild {
                parent: p,
                new: NodeId(6),
                old: NodeId(5)
            },
        ]
    );
    assert_eq!(state.rendered_tree(), Some(view(1)));
    assert_eq!(h.html(root), r#"<p data-n="1">count 1</p>"#);
}

#[derive(Clone, PartialEq)]
struct Page {
    title: String,
    body: Option<VNode>,
}

fn page_body(page: &Page) -> Option<&VNode> {
    page.body.as_ref()
}

#[test]
fn values_without_a_tree_do_not_render() {
    let h = Harness::new();
    let root = h.mount_point();
    let state = h.runtime.create_state(Page {
        title: "a".into(),
        body: Some(VNode::text("body")),
    });
    state.mount(root, page_body);
    h.document.borrow_mut().clear_mutations();

    state.set(Page {
        title: "b".into(),
        body: None,
    });
    h.scheduler.run_tick();

    assert!(h.document.borrow().mutations().is_empty());
    assert_eq!(h.html(root), "body");
    assert_eq!(state.with(|page| page.title.clone()), "b");
}

#[test]
fn cleared_states_stop_rendering() {
    let h = Harness::new();
    let root = h.mount_point();
    let state = h.runtime.create_state(VNode::text("one"));
    state.mount(root, select_root);

    state.clear();
    state.set(VNode::text("two"));
    h.scheduler.run_tick();

    assert_eq!(h.html(root), "one");
    assert_eq!(state.mount_point(), None);
    assert_eq!(state.rendered_tree(), None);
}

#[test]
fn subscribers_may_read_and_subscribe_during_a_flush() {
    let h = Harness::new();
    let state = h.runtime.create_state(0);
    let late = Rc::new(RefCell::new(Vec::new()));
    {
        let handle = state.clone();
        let late = late.clone();
        state.subscribe(move |v| {
            assert_eq!(handle.get(), *v);
            if *v == 1 {
                let late = late.clone();
                handle.subscribe(move |v| late.borrow_mut().push(*v));
            }
        });
    }

    state.set(1);
    h.scheduler.run_tick();
    assert!(late.borrow().is_empty());

    state.set(2);
    h.scheduler.run_tick();
    assert_eq!(*late.borrow(), [2]);
}

#[test]
fn dropped_states_cancel_their_flush() {
    let h = Harness::new();
    let state = h.runtime.create_state(0);
    state.set(1);
    drop(state);

    assert_eq!(h.scheduler.run_tick(), 1);
    assert!(h.scheduler.is_idle());
}
