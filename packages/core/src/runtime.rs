use std::rc::Rc;

use crate::innerlude::*;

/// Everything a state container needs from its host: the DOM to render into, the scheduler that
/// decides when a tick happens, and the shared configuration.
///
/// A runtime is built once at application start and passed around explicitly. Cloning it is cheap
/// and every clone refers to the same DOM and scheduler.
#[derive(Clone)]
pub struct Runtime {
    pub(crate) dom: DomHandle,
    pub(crate) scheduler: Rc<dyn Scheduler>,
    pub(crate) config: Rc<Config>,
}

impl Runtime {
    pub fn new(dom: DomHandle, scheduler: impl Scheduler + 'static) -> Self {
        Self {
            dom,
            scheduler: Rc::new(scheduler),
            config: Rc::new(Config::default()),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Rc::new(config);
        self
    }

    /// Create a state container holding `initial`.
    pub fn create_state<T: Clone + PartialEq + 'static>(&self, initial: T) -> State<T> {
        State::new(initial, self.clone())
    }

    pub fn dom(&self) -> &DomHandle {
        &self.dom
    }

    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
