#![doc = include_str!("../README.md")]

use mintkit_core::{Config, DomHandle, NodeId, Props, Result, Runtime, Scheduler, State, VNode};

#[cfg(feature = "logger")]
pub mod logger;

pub use mintkit_document as document;
#[cfg(feature = "headless")]
pub use mintkit_headless as headless;

pub use mintkit_core::{create_element, MintError};
pub use mintkit_document::parse_html;

pub mod prelude {
    pub use crate::Mint;
    pub use mintkit_core::prelude::*;
    pub use mintkit_core::{select_root, ChannelScheduler, TaskLoop};
}

/// The entry point of an application.
///
/// A `Mint` bundles the DOM and the scheduler every state needs, so it is the only thing an
/// application has to pass around. Cloning it is cheap.
#[derive(Clone)]
pub struct Mint {
    runtime: Runtime,
}

impl Mint {
    pub fn new(dom: DomHandle, scheduler: impl Scheduler + 'static) -> Self {
        Self {
            runtime: Runtime::new(dom, scheduler),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.runtime = self.runtime.with_config(config);
        self
    }

    pub fn create_element(
        &self,
        tag: &str,
        props: Props,
        children: impl IntoIterator<Item = VNode>,
    ) -> Result<VNode> {
        create_element(tag, props, children)
    }

    pub fn create_state<T: Clone + PartialEq + 'static>(&self, initial: T) -> State<T> {
        self.runtime.create_state(initial)
    }

    /// See [`mintkit_document::inject_css`].
    pub fn inject_css(&self, css: &str) -> Option<NodeId> {
        mintkit_document::inject_css(&mut *self.runtime.dom().borrow_mut(), css)
    }

    /// See [`mintkit_document::inject_html`].
    pub fn inject_html(&self, selector: &str, html: &str) -> Result<NodeId> {
        mintkit_document::inject_html(&mut *self.runtime.dom().borrow_mut(), selector, html)
    }

    /// See [`mintkit_document::inject_title`].
    pub fn inject_title(&self, title_html: &str) {
        mintkit_document::inject_title(&mut *self.runtime.dom().borrow_mut(), title_html)
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn dom(&self) -> &DomHandle {
        self.runtime.dom()
    }
}
