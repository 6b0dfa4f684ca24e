// Inline container serialization.
//
// Port of mdast-util-to-markdown/lib/util/container-phrasing.js.
// Serializes inline children flush together. Text is escaped knowing the
// characters emitted on both sides of it, so everything else is rendered
// first and text last.

use super::State;
use crate::mdast::Node;

/// Serialize a list of inline (phrasing) children.
///
/// `before` and `after` are the characters the parent emits around them
/// (`'\n'` at block level, the marker for emphasis, `[`/`]` for labels).
pub(crate) fn container_phrasing(
    state: &mut State,
    children: &[Node],
    before: Option<char>,
    after: Option<char>,
) -> String {
    let mut parts: Vec<Option<String>> = children
        .iter()
        .map(|child| match child {
            Node::Text(_) => None,
            _ => Some(super::handlers::handle(state, child)),
        })
        .collect();

    for (i, child) in children.iter().enumerate() {
        let Node::Text(text) = child else { continue };
        let prev = match i.checked_sub(1) {
            Some(p) => parts[p].as_deref().and_then(|s| s.chars().last()),
            None => before,
        };
        let next = match children.get(i + 1) {
            Some(Node::Text(next)) => next.value.chars().next(),
            Some(_) => parts[i + 1].as_deref().and_then(|s| s.chars().next()),
            None => after,
        };
        parts[i] = Some(super::escape::safe(state, &text.value, prev, next));
    }

    let mut parts: Vec<String> = parts.into_iter().map(Option::unwrap_or_default).collect();

    // Trim whitespace adjacent to hard breaks ("\\\n"):
    // trailing spaces before the break, leading spaces after it.
    for i in 0..parts.len() {
        if parts[i] == "\\\n" {
            if i > 0 {
                let prev = parts[i - 1].trim_end_matches(' ').to_string();
                parts[i - 1] = prev;
            }
            if i + 1 < parts.len() {
                let next = parts[i + 1].trim_start_matches(' ').to_string();
                parts[i + 1] = next;
            }
        }
    }

    parts.join("")
}
