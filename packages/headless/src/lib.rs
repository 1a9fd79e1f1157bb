#![doc = include_str!("../README.md")]

use std::cell::RefCell;
use std::rc::Rc;

use mintkit_core::{dom_handle, DomHandle, Event, NodeId};

mod document;
mod mutations;
mod selector;

pub use document::Document;
pub use mutations::Mutation;

/// Create a document and return it both typed and as a [`DomHandle`] for the runtime.
pub fn new_document() -> (Rc<RefCell<Document>>, DomHandle) {
    let document = Rc::new(RefCell::new(Document::new()));
    let handle: DomHandle = document.clone();
    (document, handle)
}

/// Wrap an existing document into a [`DomHandle`].
pub fn into_handle(document: Document) -> DomHandle {
    dom_handle(document)
}

/// Dispatch `event` on `target`, bubbling through its ancestors. Returns the number of listeners
/// that ran.
///
/// The document is not borrowed while the listeners run, so they are free to touch it.
pub fn dispatch_event(document: &RefCell<Document>, target: NodeId, event: &str) -> usize {
    let listeners = document.borrow().listeners_for(target, event);
    let event = Event::new(event, target);
    tracing::trace!("dispatching `{}` to {} listeners", event.name, listeners.len());
    for listener in &listeners {
        listener.call(&event);
    }
    listeners.len()
}
