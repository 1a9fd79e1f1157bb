#![doc = include_str!("../README.md")]

mod head;
mod html;

pub use head::{css_hash, ensure_head, inject_css, inject_title, CSS_HASH_ATTRIBUTE, INJECTED_AT_ATTRIBUTE};
pub use html::{inject_html, parse_html};
