//! `update_props` applied to live elements.

use std::cell::Cell;
use std::rc::Rc;

use mintkit_core::{update_props, Dom, Listener, NodeId, PropertyValue, Props};
use mintkit_headless::{dispatch_event, Document, Mutation::*};
use pretty_assertions::assert_eq;

fn element(doc: &mut Document, tag: &str) -> NodeId {
    let el = doc.create_element(tag).unwrap();
    doc.clear_mutations();
    el
}

#[test]
fn only_the_delta_is_applied() {
    let mut doc = Document::recording();
    let input = element(&mut doc, "input");
    let first = Listener::new(|_| {});
    let second = Listener::new(|_| {});

    let old = Props::new()
        .attr("title", "a")
        .class("x")
        .style_map([("color", "red"), ("margin", "0")])
        .attr("data-gone", 1)
        .listener("onClick", first)
        .value("one")
        .checked(false);
    let new = Props::new()
        .attr("title", "b")
        .class("x")
        .style_map([("color", "blue"), ("margin", "0")])
        .listener("onClick", second)
        .value("two")
        .checked(true);

    update_props(&mut doc, input, None, Some(&old));
    doc.clear_mutations();
    update_props(&mut doc, input, Some(&old), Some(&new));

    assert_eq!(
        doc.take_mutations(),
        [
            RemoveAttribute {
                id: input,
                name: "data-gone".into()
            },
            SetProperty {
                id: input,
                name: "checked".into(),
                value: PropertyValue::Bool(true)
            },
            RemoveEventListener {
                id: input,
                event: "click".into()
            },
            AddEventListener {
                id: input,
                event: "click".into()
            },
            SetStyleProperty {
                id: input,
                property: "color".into(),
                value: "blue".into()
            },
            SetAttribute {
                id: input,
                name: "title".into(),
                value: "b".into()
            },
            SetProperty {
                id: input,
                name: "value".into(),
                value: PropertyValue::Text("two".into())
            },
        ]
    );
    assert_eq!(doc.listened_events(input), ["click"]);
}

#[test]
fn removed_props_are_cleared() {
    let mut doc = Document::new();
    let div = element(&mut doc, "div");
    let old = Props::new()
        .class("x")
        .style("color: red")
        .attr("hidden", true)
        .on("click", |_| {});

    update_props(&mut doc, div, None, Some(&old));
    update_props(&mut doc, div, Some(&old), None);

    assert_eq!(doc.get_attribute(div, "class").as_deref(), Some(""));
    assert_eq!(doc.get_attribute(div, "style"), None);
    assert_eq!(doc.get_attribute(div, "hidden"), None);
    assert!(doc.listened_events(div).is_empty());
}

#[test]
fn style_maps_are_diffed_per_property() {
    let mut doc = Document::recording();
    let div = element(&mut doc, "div");
    let old = Props::new().style_map([("color", "red"), ("margin", "0")]);
    let new = Props::new().style_map([("color", "red"), ("padding", "1px")]);

    update_props(&mut doc, div, None, Some(&old));
    doc.clear_mutations();
    update_props(&mut doc, div, Some(&old), Some(&new));

    assert_eq!(
        doc.take_mutations(),
        [
            SetStyleProperty {
                id: div,
                property: "margin".into(),
                value: String::new()
            },
            SetStyleProperty {
                id: div,
                property: "padding".into(),
                value: "1px".into()
            },
        ]
    );
    assert_eq!(
        doc.get_attribute(div, "style").as_deref(),
        Some("color: red; padding: 1px")
    );
}

#[test]
fn value_and_checked_are_attributes_off_inputs() {
    let mut doc = Document::new();
    let option = element(&mut doc, "option");

    update_props(
        &mut doc,
        option,
        None,
        Some(&Props::new().value("x").checked(true)),
    );

    assert_eq!(doc.get_attribute(option, "value").as_deref(), Some("x"));
    assert_eq!(doc.get_attribute(option, "checked").as_deref(), Some("true"));
    assert_eq!(doc.property(option, "value"), None);
}

#[test]
fn replaced_listeners_are_the_only_ones_that_fire() {
    let document = std::cell::RefCell::new(Document::new());
    let button = element(&mut document.borrow_mut(), "button");
    let hits = Rc::new(Cell::new((0, 0)));

    let old = {
        let hits = hits.clone();
        Props::new().on("click", move |_| hits.set((hits.get().0 + 1, hits.get().1)))
    };
    let new = {
        let hits = hits.clone();
        Props::new().on("click", move |_| hits.set((hits.get().0, hits.get().1 + 1)))
    };

    update_props(&mut *document.borrow_mut(), button, None, Some(&old));
    dispatch_event(&document, button, "click");
    update_props(&mut *document.borrow_mut(), button, Some(&old), Some(&new));
    dispatch_event(&document, button, "click");

    assert_eq!(hits.get(), (1, 1));
}

#[test]
fn text_nodes_are_ignored() {
    let mut doc = Document::recording();
    let text = doc.create_text_node("t");
    doc.clear_mutations();

    update_props(&mut doc, text, None, Some(&Props::new().attr("title", "x")));

    assert!(doc.take_mutations().is_empty());
}
