use crate::innerlude::*;

/// Turn a virtual node into a real one.
///
/// The returned node is detached; the caller decides where it goes. Malformed elements and
/// elements the environment refuses to create are replaced by text placeholders instead of
/// failing the whole render.
pub fn create_dom_node(dom: &mut dyn Dom, node: &VNode) -> NodeId {
    match node {
        VNode::Empty => dom.create_text_node(""),
        VNode::Text(text) => dom.create_text_node(text),
        VNode::Fragment(children) => {
            let fragment = dom.create_fragment();
            append_children(dom, fragment, children);
            fragment
        }
        VNode::Element(el) if el.is_malformed() => {
            tracing::warn!("create_dom_node: malformed node without a tag: {el:?}");
            dom.create_text_node("")
        }
        VNode::Element(el) => match dom.create_element(&el.tag) {
            Ok(element) => {
                update_props(dom, element, None, Some(&el.props));
                append_children(dom, element, &el.children);
                element
            }
            Err(err) => {
                tracing::error!("create_dom_node: could not create `{}`: {err}", el.tag);
                dom.create_text_node(&format!("[Error: {}]", el.tag))
            }
        },
    }
}

fn append_children(dom: &mut dyn Dom, parent: NodeId, children: &[VNode]) {
    for child in children {
        let created = create_dom_node(dom, child);
        if let Err(err) = dom.append_child(parent, created) {
            tracing::error!("create_dom_node: could not append child to {parent:?}: {err}");
            dom.reclaim(created);
            continue;
        }
        release_fragment(dom, child, created);
    }
}

/// A fragment is empty once its children were inserted, and nothing refers to it anymore.
pub(crate) fn release_fragment(dom: &mut dyn Dom, node: &VNode, created: NodeId) {
    if matches!(node, VNode::Fragment(_)) {
        dom.reclaim(created);
    }
}
