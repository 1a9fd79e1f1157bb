//! Typed element properties.
//!
//! Every entry of a [`Props`] map is classified once, when it is inserted, into one of the
//! [`Prop`] kinds. The reconciler dispatches on that kind instead of sniffing key names on
//! every render.

use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

use crate::NodeId;

/// The name under which the identity key is accepted by [`Props::attr`].
pub const KEY_PROP: &str = "key";

/// The prefix that marks a prop name as an event listener.
pub const LISTENER_PREFIX: &str = "on";

/// A DOM event delivered to a [`Listener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Lower-case event name, like `click`.
    pub name: String,
    /// The node the event was dispatched on.
    pub target: NodeId,
}

impl Event {
    pub fn new(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}

/// An event handler attached to an element.
///
/// Two listeners are equal only if they are the same handler, which is what lets the reconciler
/// skip re-attaching a handler that was carried over from the previous render.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&Event)>);

impl Listener {
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for Listener {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0))
    }
}

/// A plain attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl AttrValue {
    /// Loose truthiness, used when an attribute has to become a boolean property.
    pub fn truthy(&self) -> bool {
        match self {
            AttrValue::Text(text) => !text.is_empty(),
            AttrValue::Int(int) => *int != 0,
            AttrValue::Float(float) => *float != 0.0 && !float.is_nan(),
            AttrValue::Bool(b) => *b,
        }
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Text(text) => f.write_str(text),
            AttrValue::Int(int) => write!(f, "{int}"),
            AttrValue::Float(float) => write!(f, "{float}"),
            AttrValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Text(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

macro_rules! int_attr_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for AttrValue {
                fn from(value: $t) -> Self {
                    AttrValue::Int(value as i64)
                }
            }
        )*
    };
}

int_attr_value!(i8, i16, i32, i64, u8, u16, u32, usize, isize);

/// Inline style, either as raw css text or as individual properties.
#[derive(Debug, Clone, PartialEq)]
pub enum Style {
    Inline(String),
    Map(BTreeMap<String, String>),
}

/// A single classified prop.
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    /// A generic attribute set with `setAttribute`.
    Attr(AttrValue),
    /// An event handler. The event name is derived from the prop name.
    Listener(Listener),
    /// The element's class list.
    Class(String),
    Style(Style),
    /// The live `value` of text inputs.
    Value(String),
    /// The live `checked` state of checkable inputs.
    Checked(bool),
}

/// The props of one element: a map of classified entries plus the optional identity key.
///
/// The key is stored next to the map, so it never reaches the DOM.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    entries: BTreeMap<String, Prop>,
    key: Option<String>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity key used by the same-type test while diffing.
    pub fn key(mut self, key: impl Display) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// Insert a value by name, classifying it the way the DOM would treat it.
    ///
    /// `class`/`className`, `style`, `value`, `checked` and `key` get their dedicated kinds,
    /// anything else is a generic attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let name = name.into();
        let value = value.into();
        let prop = match name.as_str() {
            KEY_PROP => {
                self.key = Some(value.to_string());
                return self;
            }
            "class" | "className" => Prop::Class(value.to_string()),
            "style" => Prop::Style(Style::Inline(value.to_string())),
            "value" => Prop::Value(value.to_string()),
            "checked" => Prop::Checked(value.truthy()),
            _ => Prop::Attr(value),
        };
        self.entries.insert(name, prop);
        self
    }

    /// Attach a handler for `event`, stored under `on{event}`.
    pub fn on(mut self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
        self.entries.insert(
            format!("{LISTENER_PREFIX}{event}"),
            Prop::Listener(Listener::new(handler)),
        );
        self
    }

    /// Attach an existing listener under a full prop name like `onClick`.
    pub fn listener(mut self, name: impl Into<String>, listener: Listener) -> Self {
        self.entries.insert(name.into(), Prop::Listener(listener));
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.entries
            .insert("className".to_string(), Prop::Class(class.into()));
        self
    }

    pub fn style(mut self, css: impl Into<String>) -> Self {
        self.entries.insert(
            "style".to_string(),
            Prop::Style(Style::Inline(css.into())),
        );
        self
    }

    pub fn style_map<K, V>(mut self, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = properties
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.entries
            .insert("style".to_string(), Prop::Style(Style::Map(map)));
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.entries
            .insert("value".to_string(), Prop::Value(value.into()));
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.entries
            .insert("checked".to_string(), Prop::Checked(checked));
        self
    }

    /// Insert an already classified prop.
    pub fn insert(&mut self, name: impl Into<String>, prop: Prop) -> Option<Prop> {
        self.entries.insert(name.into(), prop)
    }

    pub fn remove(&mut self, name: &str) -> Option<Prop> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Prop> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn key_value(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Prop)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The DOM event name for a listener prop: prefix stripped, lower-cased.
pub fn event_name(prop_name: &str) -> String {
    prop_name
        .strip_prefix(LISTENER_PREFIX)
        .unwrap_or(prop_name)
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_classifies_special_names() {
        let props = Props::new()
            .attr("className", "a")
            .attr("style", "color: red")
            .attr("value", "typed")
            .attr("checked", 1)
            .attr("id", "main")
            .attr("key", 7);

        assert_eq!(props.get("className"), Some(&Prop::Class("a".into())));
        assert_eq!(
            props.get("style"),
            Some(&Prop::Style(Style::Inline("color: red".into())))
        );
        assert_eq!(props.get("value"), Some(&Prop::Value("typed".into())));
        assert_eq!(props.get("checked"), Some(&Prop::Checked(true)));
        assert_eq!(props.get("id"), Some(&Prop::Attr("main".into())));
        assert_eq!(props.key_value(), Some("7"));
        assert!(!props.contains("key"));
    }

    #[test]
    fn listeners_compare_by_identity() {
        let a = Listener::new(|_| {});
        let b = Listener::new(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn event_names_drop_the_prefix() {
        assert_eq!(event_name("onClick"), "click");
        assert_eq!(event_name("onmouseover"), "mouseover");
        assert_eq!(event_name("input"), "input");
    }

    #[test]
    fn truthiness_follows_the_dom() {
        assert!(!AttrValue::from("").truthy());
        assert!(AttrValue::from("no").truthy());
        assert!(!AttrValue::from(0).truthy());
        assert!(!AttrValue::Float(f64::NAN).truthy());
    }
}
