// Token → node adapters for autolinks the parser delimits itself.
//
// Port of the `fromMarkdown` half of mdast-util-gfm-autolink-literal. The
// parser reports a wrapper token around the autolink and one value token
// (http, www or email); the link node they produce has the same shape as the
// ones built by the pattern handlers.

use crate::from_markdown::CompileContext;
use crate::mdast::{Link, Node};

/// Kind of an autolink token reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Wrapper around a whole autolink.
    Literal,
    /// `local@server`.
    Email,
    /// `http://…` or `https://…`.
    Http,
    /// `www.…`, without a scheme.
    Www,
}

/// A token and the source text it spans.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub value: &'a str,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, value: &'a str) -> Self {
        Self { kind, value }
    }
}

/// Handle the start of `token`.
pub fn enter(ctx: &mut CompileContext, token: &Token<'_>) {
    match token.kind {
        TokenKind::Literal => ctx.enter(Node::Link(Link {
            url: String::new(),
            title: None,
            children: Vec::new(),
        })),
        // Value tokens only produce data, on exit.
        TokenKind::Email | TokenKind::Http | TokenKind::Www => {}
    }
}

/// Handle the end of `token`.
///
/// # Panics
///
/// When a value token or the wrapper ends while no link is open.
pub fn exit(ctx: &mut CompileContext, token: &Token<'_>) {
    match token.kind {
        TokenKind::Literal => ctx.exit_link(),
        TokenKind::Email => ctx.on_exit_autolink_email(token.value),
        TokenKind::Http => ctx.on_exit_autolink_protocol(token.value),
        TokenKind::Www => {
            // The grammar only delimits the text; the scheme is implied.
            ctx.on_exit_data(token.value);
            ctx.current_link_mut().url = format!("http://{}", token.value);
        }
    }
}
