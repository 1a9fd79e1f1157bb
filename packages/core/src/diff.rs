//! Reconcile two virtual trees against the live DOM.
//!
//! Children are matched by position. Keys only take part in the same-type test: a keyed list
//! whose order changed is not reordered, every slot whose key moved is replaced instead.

use std::cmp::max;

use crate::innerlude::*;

/// Patch the child at `index` of `parent` so it matches `new`, given that it was rendered from
/// `old`.
///
/// A missing `old` appends `new`, a missing `new` removes the child at `index`. Errors are logged
/// per node and never abort the rest of the tree.
pub fn diff(
    dom: &mut dyn Dom,
    parent: NodeId,
    new: Option<&VNode>,
    old: Option<&VNode>,
    index: usize,
) {
    if !dom.is_element(parent) {
        tracing::warn!("diff: {parent:?} is not a live element");
        return;
    }

    if let Err(err) = diff_node(dom, parent, new, old, index) {
        tracing::error!("diff: failed to reconcile child {index} of {parent:?}: {err}");
    }
}

fn diff_node(
    dom: &mut dyn Dom,
    parent: NodeId,
    new: Option<&VNode>,
    old: Option<&VNode>,
    index: usize,
) -> Result<(), DomError> {
    let (old, new) = match (old, new) {
        (None, None) => return Ok(()),
        (None, Some(new)) => {
            tracing::trace!("diff: appending {new:?} to {parent:?}");
            let created = create_dom_node(dom, new);
            if let Err(err) = dom.append_child(parent, created) {
                dom.reclaim(created);
                return Err(err);
            }
            release_fragment(dom, new, created);
            return Ok(());
        }
        (Some(_), None) => {
            tracing::trace!("diff: removing child {index} of {parent:?}");
            let Some(child) = dom.child_at(parent, index) else {
                return Ok(());
            };
            dom.remove_child(parent, child)?;
            dom.reclaim(child);
            return Ok(());
        }
        (Some(old), Some(new)) => (old, new),
    };

    if needs_replace(old, new) {
        tracing::trace!("diff: replacing child {index} of {parent:?} with {new:?}");
        let current = live_child(dom, parent, index)?;
        let created = create_dom_node(dom, new);
        if let Err(err) = dom.replace_child(parent, created, current) {
            dom.reclaim(created);
            return Err(err);
        }
        dom.reclaim(current);
        release_fragment(dom, new, created);
        return Ok(());
    }

    let (VNode::Element(old), VNode::Element(new)) = (old, new) else {
        if let (VNode::Fragment(_), VNode::Fragment(_)) = (old, new) {
            tracing::trace!("diff: fragments are not reconciled");
        }
        return Ok(());
    };

    let current = live_child(dom, parent, index)?;
    update_props(dom, current, Some(&old.props), Some(&new.props));

    let shared = old.children.len().min(new.children.len());
    for (i, (old_child, new_child)) in old.children.iter().zip(&new.children).enumerate() {
        diff(dom, current, Some(new_child), Some(old_child), i);
    }
    for (i, new_child) in new.children.iter().enumerate().skip(shared) {
        diff(dom, current, Some(new_child), None, i);
    }
    // trailing removals run back to front so each index still names the node it removes
    for i in (shared..max(old.children.len(), new.children.len())).rev() {
        if let Some(old_child) = old.children.get(i) {
            diff(dom, current, None, Some(old_child), i);
        }
    }

    Ok(())
}

fn needs_replace(old: &VNode, new: &VNode) -> bool {
    match (old, new) {
        (VNode::Text(a), VNode::Text(b)) => a != b,
        (VNode::Empty, VNode::Empty) | (VNode::Fragment(_), VNode::Fragment(_)) => false,
        _ => !is_same_node_type(old, new),
    }
}

fn live_child(dom: &dyn Dom, parent: NodeId, index: usize) -> Result<NodeId, DomError> {
    dom.child_at(parent, index)
        .ok_or(DomError::MissingChild { parent, index })
}
