use html_escape::decode_html_entities;
use html_parser::{Dom as HtmlDom, Node};
use mintkit_core::{create_dom_node, AttrValue, Dom, MintError, NodeId, Props, Result, VNode};

/// Parse an HTML string into virtual nodes.
///
/// Comments are dropped. Attributes without a value are treated as boolean `true`. Character
/// references in text and attribute values are decoded.
pub fn parse_html(html: &str) -> Result<Vec<VNode>> {
    if html.trim().is_empty() {
        return Ok(Vec::new());
    }

    let dom = HtmlDom::parse(html)
        .map_err(|err| MintError::InvalidArgument(format!("could not parse html: {err}")))?;

    Ok(dom.children.iter().filter_map(vnode_from_html).collect())
}

fn vnode_from_html(node: &Node) -> Option<VNode> {
    match node {
        Node::Text(text) => Some(VNode::text(decode_html_entities(text))),

        Node::Element(el) => {
            let mut props = Props::new();
            for (name, value) in &el.attributes {
                let value = match value {
                    Some(value) => AttrValue::from(&*decode_html_entities(value)),
                    None => AttrValue::Bool(true),
                };
                props = props.attr(name.as_str(), value);
            }

            // html_parser lifts these out of the attribute map
            if let Some(id) = &el.id {
                props = props.attr("id", &*decode_html_entities(id));
            }
            let class = decode_html_entities(&el.classes.join(" ")).into_owned();
            if !class.is_empty() {
                props = props.class(class);
            }

            let children = el.children.iter().filter_map(vnode_from_html);
            Some(VNode::element(el.name.to_ascii_lowercase(), props, children))
        }

        Node::Comment(_) => None,
    }
}

/// Replace the contents of the first element matching `selector` with `html`.
///
/// Returns the target element.
pub fn inject_html(dom: &mut dyn Dom, selector: &str, html: &str) -> Result<NodeId> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(MintError::InvalidArgument(
            "inject_html: selector must be a non-empty string".to_string(),
        ));
    }

    let root = dom.document_element();
    let Some(target) = dom.query_selector(root, selector) else {
        return Err(MintError::InvalidArgument(format!(
            "inject_html: no element matches selector `{selector}`"
        )));
    };

    if html.contains("<script") {
        tracing::warn!("inject_html: script tags detected in html for `{selector}`");
    }

    let nodes = parse_html(html)?;

    dom.discard_children(target)?;
    for node in &nodes {
        let created = create_dom_node(dom, node);
        dom.append_child(target, created)?;
    }

    tracing::debug!("inject_html: replaced contents of `{selector}` with {} nodes", nodes.len());
    Ok(target)
}
