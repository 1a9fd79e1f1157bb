use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{SecondsFormat, Utc};
use mintkit_core::{create_dom_node, Dom, DomError, NodeId};

use crate::parse_html;

/// Attribute holding the fingerprint of an injected stylesheet.
pub const CSS_HASH_ATTRIBUTE: &str = "data-css-hash";

/// Attribute holding the RFC 3339 time a stylesheet was injected.
pub const INJECTED_AT_ATTRIBUTE: &str = "data-injected-at";

const CSS_HASH_LEN: usize = 10;

/// The fingerprint used to deduplicate stylesheets: a prefix of the base64 encoded css.
pub fn css_hash(css: &str) -> String {
    STANDARD.encode(css).chars().take(CSS_HASH_LEN).collect()
}

/// Add a `<style>` element holding `css` to the head.
///
/// Stylesheets are deduplicated by [`css_hash`]: injecting the same css twice returns the element
/// created the first time. Returns `None` for empty css or if the document refused the edit.
pub fn inject_css(dom: &mut dyn Dom, css: &str) -> Option<NodeId> {
    if css.is_empty() {
        tracing::warn!("inject_css: empty css string provided");
        return None;
    }

    let hash = css_hash(css);
    let root = dom.document_element();
    if let Some(existing) =
        dom.query_selector(root, &format!("style[{CSS_HASH_ATTRIBUTE}=\"{hash}\"]"))
    {
        tracing::debug!("inject_css: css already injected, skipping");
        return Some(existing);
    }

    match append_style(dom, css, &hash) {
        Ok(style) => Some(style),
        Err(err) => {
            tracing::error!("inject_css: error injecting css: {err}");
            None
        }
    }
}

fn append_style(dom: &mut dyn Dom, css: &str, hash: &str) -> Result<NodeId, DomError> {
    let style = dom.create_element("style")?;
    let text = dom.create_text_node(css);
    dom.append_child(style, text)?;
    dom.set_attribute(style, CSS_HASH_ATTRIBUTE, hash)?;
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    dom.set_attribute(style, INJECTED_AT_ATTRIBUTE, &now)?;

    let head = ensure_head(dom)?;
    dom.append_child(head, style)?;
    Ok(style)
}

/// Replace the document title.
///
/// `title_html` should be a `<title>` element. Anything else is wrapped in one, with a warning.
pub fn inject_title(dom: &mut dyn Dom, title_html: &str) {
    let title = title_html.trim();
    if title.is_empty() {
        tracing::warn!("inject_title: empty title string provided");
        return;
    }

    if let Err(err) = replace_title(dom, title) {
        tracing::error!("inject_title: error injecting title: {err}");
    }
}

fn replace_title(dom: &mut dyn Dom, title: &str) -> mintkit_core::Result<()> {
    let head = ensure_head(dom)?;

    if let Some(existing) = dom.query_selector(head, "title") {
        if let Some(parent) = dom.parent(existing) {
            dom.remove_child(parent, existing)?;
            dom.reclaim(existing);
        }
    }

    let wrapped;
    let title = if title.starts_with("<title>") && title.ends_with("</title>") {
        title
    } else {
        tracing::warn!("inject_title: title string should be wrapped in <title> tags");
        wrapped = format!("<title>{title}</title>");
        &wrapped
    };

    for node in parse_html(title)? {
        let created = create_dom_node(dom, &node);
        dom.append_child(head, created)?;
    }

    if let Some(element) = dom.query_selector(head, "title") {
        tracing::debug!("inject_title: title updated to {:?}", dom.text_content(element));
    }
    Ok(())
}

/// The document head, created under the root element if the document has none.
pub fn ensure_head(dom: &mut dyn Dom) -> Result<NodeId, DomError> {
    if let Some(head) = dom.head() {
        return Ok(head);
    }
    let head = dom.create_element("head")?;
    let root = dom.document_element();
    dom.append_child(root, head)?;
    Ok(head)
}
