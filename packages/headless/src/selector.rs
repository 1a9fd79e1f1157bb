//! Compound selectors: `tag`, `#id`, `.class` and `[attr]` / `[attr=value]`, in any combination
//! without combinators.

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Selector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, Option<String>)>,
}

impl Selector {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = Selector::default();
        let mut rest = input;

        let tag_len = ident_len(rest);
        if tag_len > 0 {
            selector.tag = Some(rest[..tag_len].to_ascii_lowercase());
            rest = &rest[tag_len..];
        } else if let Some(after) = rest.strip_prefix('*') {
            rest = after;
        }

        while let Some(first) = rest.chars().next() {
            match first {
                '#' | '.' => {
                    let len = ident_len(&rest[1..]);
                    if len == 0 {
                        return None;
                    }
                    let name = rest[1..=len].to_string();
                    if first == '#' {
                        selector.id = Some(name);
                    } else {
                        selector.classes.push(name);
                    }
                    rest = &rest[len + 1..];
                }
                '[' => {
                    let end = rest.find(']')?;
                    let inner = &rest[1..end];
                    let attribute = match inner.split_once('=') {
                        Some((name, value)) => (
                            name.trim().to_string(),
                            Some(value.trim().trim_matches(['"', '\'']).to_string()),
                        ),
                        None => (inner.trim().to_string(), None),
                    };
                    if attribute.0.is_empty() {
                        return None;
                    }
                    selector.attributes.push(attribute);
                    rest = &rest[end + 1..];
                }
                _ => return None,
            }
        }

        Some(selector)
    }
}

fn ident_len(input: &str) -> usize {
    input
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(input.len())
}
