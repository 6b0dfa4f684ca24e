// Markdown → MDAST compiler
//
// Parses Markdown with pulldown-cmark and folds the event stream into an
// MDAST tree through a `CompileContext` node stack, the way
// mdast-util-from-markdown folds micromark tokens.

mod context;
pub(crate) mod handlers;

pub use context::CompileContext;

use crate::mdast::Node;

/// Parse Markdown into an MDAST tree, without any autolink transform.
pub fn parse(markdown: &str) -> Node {
    handlers::compile(markdown)
}
