use std::collections::BTreeMap;

use crate::innerlude::*;

/// Apply the delta between `old` and `new` to a live element.
///
/// Missing props count as empty. A target that is not an element is skipped with a warning, and a
/// failed edit on one prop does not stop the others.
pub fn update_props(dom: &mut dyn Dom, element: NodeId, old: Option<&Props>, new: Option<&Props>) {
    if !dom.is_element(element) {
        tracing::warn!("update_props: {element:?} is not a live element");
        return;
    }

    let empty = Props::new();
    let old = old.unwrap_or(&empty);
    let new = new.unwrap_or(&empty);

    for (name, prop) in old.iter() {
        if new.contains(name) {
            continue;
        }
        if let Err(err) = remove_prop(dom, element, name, prop) {
            tracing::error!("update_props: failed to remove `{name}` from {element:?}: {err}");
        }
    }

    for (name, prop) in new.iter() {
        let previous = old.get(name);
        if previous == Some(prop) {
            continue;
        }
        if let Err(err) = set_prop(dom, element, name, previous, prop) {
            tracing::error!("update_props: failed to set `{name}` on {element:?}: {err}");
        }
    }
}

fn remove_prop(dom: &mut dyn Dom, element: NodeId, name: &str, prop: &Prop) -> Result<(), DomError> {
    match prop {
        Prop::Listener(listener) => dom.remove_event_listener(element, &event_name(name), listener),
        Prop::Class(_) => dom.set_class_name(element, ""),
        Prop::Style(Style::Map(properties)) => {
            for property in properties.keys() {
                dom.set_style_property(element, property, "")?;
            }
            Ok(())
        }
        Prop::Style(Style::Inline(_)) => dom.remove_attribute(element, name),
        Prop::Attr(_) | Prop::Value(_) | Prop::Checked(_) => dom.remove_attribute(element, name),
    }
}

fn set_prop(
    dom: &mut dyn Dom,
    element: NodeId,
    name: &str,
    previous: Option<&Prop>,
    prop: &Prop,
) -> Result<(), DomError> {
    match prop {
        Prop::Listener(listener) => {
            let event = event_name(name);
            if let Some(Prop::Listener(old)) = previous {
                dom.remove_event_listener(element, &event, old)?;
            }
            dom.add_event_listener(element, &event, listener.clone())
        }
        Prop::Class(class) => dom.set_class_name(element, class),
        Prop::Style(Style::Map(properties)) => {
            let empty = BTreeMap::new();
            let old = match previous {
                Some(Prop::Style(Style::Map(old))) => old,
                Some(Prop::Style(Style::Inline(_))) => {
                    dom.remove_attribute(element, name)?;
                    &empty
                }
                _ => &empty,
            };
            for property in old.keys().filter(|p| !properties.contains_key(*p)) {
                dom.set_style_property(element, property, "")?;
            }
            for (property, value) in properties {
                if old.get(property) != Some(value) {
                    dom.set_style_property(element, property, value)?;
                }
            }
            Ok(())
        }
        Prop::Style(Style::Inline(css)) => dom.set_attribute(element, name, css),
        Prop::Value(value) => match dom.tag_name(element).as_deref() {
            Some("input" | "textarea") => {
                dom.set_property(element, "value", PropertyValue::Text(value.clone()))
            }
            _ => dom.set_attribute(element, name, value),
        },
        Prop::Checked(checked) => match dom.tag_name(element).as_deref() {
            Some("input") => dom.set_property(element, "checked", PropertyValue::Bool(*checked)),
            _ => dom.set_attribute(element, name, &checked.to_string()),
        },
        Prop::Attr(value) => dom.set_attribute(element, name, &value.to_string()),
    }
}
