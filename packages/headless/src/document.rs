use std::collections::BTreeMap;

use mintkit_core::{Dom, DomError, Listener, NodeId, NodeKind, PropertyValue};
use slab::Slab;

use crate::mutations::Mutation;
use crate::selector::Selector;

#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    contents: NodeContents,
}

#[derive(Debug)]
enum NodeContents {
    Element(ElementData),
    Text(String),
    Fragment,
}

#[derive(Debug, Default)]
struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    has_style: bool,
    properties: BTreeMap<String, PropertyValue>,
    listeners: Vec<(String, Listener)>,
}

impl ElementData {
    fn style_text(&self) -> Option<String> {
        if !self.has_style && self.style.is_empty() {
            return None;
        }
        Some(
            self.style
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    fn set_style_text(&mut self, css: &str) {
        self.style.clear();
        self.has_style = true;
        for declaration in css.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                let (property, value) = (property.trim(), value.trim());
                if !property.is_empty() && !value.is_empty() {
                    self.style.insert(property.to_string(), value.to_string());
                }
            }
        }
    }
}

/// An in-memory DOM.
///
/// Nodes live in a slab and are addressed by [`NodeId`]. Detached nodes are kept alive so they can
/// be inserted again, until [`Dom::reclaim`] frees them and their slots are reused.
///
/// A document made with [`Document::recording`] appends every edit made through the [`Dom`] trait
/// to a log that tests can inspect with [`Document::take_mutations`]. [`Document::new`] keeps no
/// log.
#[derive(Debug)]
pub struct Document {
    nodes: Slab<NodeData>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    recording: bool,
    mutations: Vec<Mutation>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with an `<html>` root holding `<head>` and `<body>`.
    pub fn new() -> Self {
        let mut nodes = Slab::with_capacity(64);
        let element = |nodes: &mut Slab<NodeData>, tag: &str| {
            NodeId(nodes.insert(NodeData {
                parent: None,
                children: Vec::new(),
                contents: NodeContents::Element(ElementData {
                    tag: tag.to_string(),
                    ..Default::default()
                }),
            }))
        };
        let root = element(&mut nodes, "html");
        let head = element(&mut nodes, "head");
        let body = element(&mut nodes, "body");
        for child in [head, body] {
            nodes[child.0].parent = Some(root);
            nodes[root.0].children.push(child);
        }

        Self {
            nodes,
            root,
            head,
            body,
            recording: false,
            mutations: Vec::new(),
        }
    }

    /// Like [`Document::new`], with the mutation log switched on.
    pub fn recording() -> Self {
        let mut document = Self::new();
        document.recording = true;
        document
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Switch the mutation log on or off. Turning it off drops what was recorded.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
        if !recording {
            self.mutations = Vec::new();
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// How many nodes the document holds, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn record(&mut self, mutation: Mutation) {
        if self.recording {
            self.mutations.push(mutation);
        }
    }

    /// Every edit since the last call, oldest first.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn clear_mutations(&mut self) {
        self.mutations.clear();
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node.0)
    }

    /// The text of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.contents {
            NodeContents::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn property(&self, element: NodeId, name: &str) -> Option<&PropertyValue> {
        self.element(element).ok()?.properties.get(name)
    }

    pub fn style_property(&self, element: NodeId, property: &str) -> Option<&str> {
        self.element(element)
            .ok()?
            .style
            .get(property)
            .map(String::as_str)
    }

    /// The event names that have listeners on `element`, in attachment order.
    pub fn listened_events(&self, element: NodeId) -> Vec<String> {
        self.element(element)
            .map(|el| el.listeners.iter().map(|(event, _)| event.clone()).collect())
            .unwrap_or_default()
    }

    /// Every listener for `event` on `target` and its ancestors, innermost first.
    pub fn listeners_for(&self, target: NodeId, event: &str) -> Vec<Listener> {
        let mut found = Vec::new();
        let mut current = Some(target);
        while let Some(node) = current {
            if let Ok(el) = self.element(node) {
                found.extend(
                    el.listeners
                        .iter()
                        .filter(|(name, _)| name == event)
                        .map(|(_, listener)| listener.clone()),
                );
            }
            current = self.nodes.get(node.0).and_then(|n| n.parent);
        }
        found
    }

    /// Serialize a node and its descendants.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    /// Serialize the children of a node.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        match &data.contents {
            NodeContents::Text(text) => out.push_str(&escape_text(text)),
            NodeContents::Fragment => {
                for child in &data.children {
                    self.write_html(*child, out);
                }
            }
            NodeContents::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                let style = el.style_text();
                let mut attributes: Vec<(&str, &str)> = el
                    .attributes
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                if let Some(style) = style.as_deref() {
                    attributes.push(("style", style));
                    attributes.sort_by(|a, b| a.0.cmp(b.0));
                }
                for (name, value) in attributes {
                    out.push_str(&format!(" {name}=\"{}\"", escape_attribute(value)));
                }
                out.push('>');
                if is_void_element(&el.tag) {
                    return;
                }
                for child in &data.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", el.tag));
            }
        }
    }

    fn node(&self, node: NodeId) -> Result<&NodeData, DomError> {
        self.nodes.get(node.0).ok_or(DomError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut NodeData, DomError> {
        self.nodes.get_mut(node.0).ok_or(DomError::UnknownNode(node))
    }

    fn element(&self, node: NodeId) -> Result<&ElementData, DomError> {
        match &self.node(node)?.contents {
            NodeContents::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(node)),
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.node_mut(node)?.contents {
            NodeContents::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(node)),
        }
    }

    fn insert_node(&mut self, contents: NodeContents) -> NodeId {
        NodeId(self.nodes.insert(NodeData {
            parent: None,
            children: Vec::new(),
            contents,
        }))
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    /// Validate that `child` may go under `parent` and unlink it from wherever it is now.
    ///
    /// Fragments are never linked, their children are returned instead.
    fn take_for_insert(&mut self, parent: NodeId, child: NodeId) -> Result<Vec<NodeId>, DomError> {
        if matches!(self.node(parent)?.contents, NodeContents::Text(_)) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        if matches!(self.node(child)?.contents, NodeContents::Fragment) {
            let moved = std::mem::take(&mut self.node_mut(child)?.children);
            for node in &moved {
                self.node_mut(*node)?.parent = None;
            }
            return Ok(moved);
        }

        if let Some(old_parent) = self.node(child)?.parent {
            self.node_mut(old_parent)?.children.retain(|c| *c != child);
            self.node_mut(child)?.parent = None;
        }
        Ok(vec![child])
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> Result<usize, DomError> {
        self.node(parent)?
            .children
            .iter()
            .position(|c| *c == child)
            .ok_or(DomError::NotAChild { parent, child })
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let Ok(el) = self.element(node) else {
            return false;
        };
        if selector.tag.as_ref().is_some_and(|tag| *tag != el.tag) {
            return false;
        }
        if let Some(id) = &selector.id {
            if el.attributes.get("id") != Some(id) {
                return false;
            }
        }
        let classes = el.attributes.get("class").map(String::as_str).unwrap_or("");
        if !selector
            .classes
            .iter()
            .all(|class| classes.split_whitespace().any(|c| c == class))
        {
            return false;
        }
        selector.attributes.iter().all(|(name, expected)| {
            let actual = match name.as_str() {
                "style" => el.style_text(),
                _ => el.attributes.get(name).cloned(),
            };
            match (actual, expected) {
                (Some(actual), Some(expected)) => actual == *expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }

    fn find(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        if self.matches(node, selector) {
            return Some(node);
        }
        let data = self.nodes.get(node.0)?;
        data.children.iter().find_map(|child| self.find(*child, selector))
    }
}

impl Dom for Document {
    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        if !is_valid_tag_name(tag) {
            return Err(DomError::InvalidTagName(tag.to_string()));
        }
        let tag = tag.to_ascii_lowercase();
        let id = self.insert_node(NodeContents::Element(ElementData {
            tag: tag.clone(),
            ..Default::default()
        }));
        self.record(Mutation::CreateElement { id, tag });
        Ok(id)
    }

    fn create_text_node(&mut self, text: &str) -> NodeId {
        let id = self.insert_node(NodeContents::Text(text.to_string()));
        self.record(Mutation::CreateTextNode {
            id,
            text: text.to_string(),
        });
        id
    }

    fn create_fragment(&mut self) -> NodeId {
        let id = self.insert_node(NodeContents::Fragment);
        self.record(Mutation::CreateFragment { id });
        id
    }

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node.0).map(|data| match data.contents {
            NodeContents::Element(_) => NodeKind::Element,
            NodeContents::Text(_) => NodeKind::Text,
            NodeContents::Fragment => NodeKind::Fragment,
        })
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.element(node).ok().map(|el| el.tag.clone())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.nodes.get(parent.0)?.children.get(index).copied()
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let moved = self.take_for_insert(parent, child)?;
        for node in &moved {
            self.node_mut(*node)?.parent = Some(parent);
        }
        self.node_mut(parent)?.children.extend(moved);
        self.record(Mutation::AppendChild { parent, child });
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), DomError> {
        self.child_index(parent, old_child)?;
        if new_child == old_child {
            return Ok(());
        }
        let moved = self.take_for_insert(parent, new_child)?;
        // the index is looked up again, taking `new_child` out may have shifted it
        let index = self.child_index(parent, old_child)?;
        for node in &moved {
            self.node_mut(*node)?.parent = Some(parent);
        }
        let children = &mut self.node_mut(parent)?.children;
        children.remove(index);
        for (offset, node) in moved.into_iter().enumerate() {
            children.insert(index + offset, node);
        }
        self.node_mut(old_child)?.parent = None;
        self.record(Mutation::ReplaceChild {
            parent,
            new: new_child,
            old: old_child,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let index = self.child_index(parent, child)?;
        self.node_mut(parent)?.children.remove(index);
        self.node_mut(child)?.parent = None;
        self.record(Mutation::RemoveChild { parent, child });
        Ok(())
    }

    fn get_attribute(&self, element: NodeId, name: &str) -> Option<String> {
        let el = self.element(element).ok()?;
        match name {
            "style" => el.style_text(),
            _ => el.attributes.get(name).cloned(),
        }
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(element)?;
        match name {
            "style" => el.set_style_text(value),
            _ => {
                el.attributes.insert(name.to_string(), value.to_string());
            }
        }
        self.record(Mutation::SetAttribute {
            id: element,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, element: NodeId, name: &str) -> Result<(), DomError> {
        let el = self.element_mut(element)?;
        match name {
            "style" => {
                el.style.clear();
                el.has_style = false;
            }
            _ => {
                el.attributes.remove(name);
            }
        }
        self.record(Mutation::RemoveAttribute {
            id: element,
            name: name.to_string(),
        });
        Ok(())
    }

    fn set_class_name(&mut self, element: NodeId, class: &str) -> Result<(), DomError> {
        self.element_mut(element)?
            .attributes
            .insert("class".to_string(), class.to_string());
        self.record(Mutation::SetClassName {
            id: element,
            class: class.to_string(),
        });
        Ok(())
    }

    fn set_style_property(
        &mut self,
        element: NodeId,
        property: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let el = self.element_mut(element)?;
        if value.is_empty() {
            el.style.remove(property);
        } else {
            el.style.insert(property.to_string(), value.to_string());
            el.has_style = true;
        }
        self.record(Mutation::SetStyleProperty {
            id: element,
            property: property.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_property(
        &mut self,
        element: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), DomError> {
        self.element_mut(element)?
            .properties
            .insert(name.to_string(), value.clone());
        self.record(Mutation::SetProperty {
            id: element,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        element: NodeId,
        event: &str,
        listener: Listener,
    ) -> Result<(), DomError> {
        let el = self.element_mut(element)?;
        // the same handler registered twice for one event is only kept once
        if el
            .listeners
            .iter()
            .any(|(name, existing)| name == event && *existing == listener)
        {
            return Ok(());
        }
        el.listeners.push((event.to_string(), listener));
        self.record(Mutation::AddEventListener {
            id: element,
            event: event.to_string(),
        });
        Ok(())
    }

    fn remove_event_listener(
        &mut self,
        element: NodeId,
        event: &str,
        listener: &Listener,
    ) -> Result<(), DomError> {
        self.element_mut(element)?
            .listeners
            .retain(|(name, existing)| !(name == event && existing == listener));
        self.record(Mutation::RemoveEventListener {
            id: element,
            event: event.to_string(),
        });
        Ok(())
    }

    fn reclaim(&mut self, node: NodeId) {
        if [self.root, self.head, self.body].contains(&node) {
            return;
        }
        match self.nodes.get(node.0) {
            Some(data) if data.parent.is_none() => {}
            Some(_) => {
                tracing::warn!("reclaim: {node:?} is still attached");
                return;
            }
            None => return,
        }

        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(data) = self.nodes.try_remove(id.0) {
                stack.extend(data.children);
            }
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let Some(data) = self.nodes.get(node.0) else {
            return String::new();
        };
        match &data.contents {
            NodeContents::Text(text) => text.clone(),
            _ => data
                .children
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
        }
    }

    fn document_element(&self) -> NodeId {
        self.root
    }

    fn head(&self) -> Option<NodeId> {
        Some(self.head)
    }

    fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            tracing::warn!("query_selector: unsupported selector `{selector}`");
            return None;
        };
        self.find(root, &selector)
    }
}

fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
}

fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
