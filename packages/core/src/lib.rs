#![doc = include_str!("../README.md")]

mod config;
mod create;
mod diff;
mod dom;
mod error;
mod nodes;
mod props;
mod reconcile;
mod runtime;
mod scheduler;
mod state;

pub(crate) mod innerlude {
    pub use crate::config::*;
    pub use crate::create::*;
    pub use crate::diff::*;
    pub use crate::dom::*;
    pub use crate::error::*;
    pub use crate::nodes::*;
    pub use crate::props::*;
    pub use crate::reconcile::*;
    pub use crate::runtime::*;
    pub use crate::scheduler::*;
    pub use crate::state::*;
}

pub use crate::innerlude::{
    create_dom_node, create_element, diff, dom_handle, event_name, is_same_node_type,
    select_root, update_props, AttrValue, ChannelScheduler, Config, Dom, DomError, DomHandle,
    Event, Listener, MintError, NodeId, NodeKind, Prop, PropertyValue, Props, Result, Runtime,
    Scheduler, State, Style, SubscriberId, Subscription, Task, TaskLoop, TickQueue, TreeSelector,
    Update, UpdatePolicy, VElement, VNode, KEY_PROP, LISTENER_PREFIX,
};

/// The types most applications need.
pub mod prelude {
    pub use crate::innerlude::{
        create_element, AttrValue, Config, Dom, DomHandle, Event, Listener, MintError, NodeId,
        Props, Runtime, Scheduler, State, Style, Subscription, TickQueue, Update, UpdatePolicy,
        VNode,
    };
}
