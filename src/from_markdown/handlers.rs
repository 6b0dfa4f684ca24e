// Event handlers for the Markdown → MDAST compiler.
//
// One branch per pulldown-cmark event or tag. Handlers only drive the
// `CompileContext`; no string formatting happens here.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd};

use super::CompileContext;
use crate::autolink::tokens::{self, Token, TokenKind};
use crate::mdast::{self, Node, ReferenceKind};

/// Compile `markdown` into an MDAST root.
pub(crate) fn compile(markdown: &str) -> Node {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut events = Parser::new_ext(markdown, options).into_offset_iter();
    let mut state = State::new(markdown);

    for (event, range) in events.by_ref() {
        state.event(event, range);
    }

    let mut definitions: Vec<(Range<usize>, Node)> = events
        .reference_definitions()
        .iter()
        .map(|(label, def)| {
            let node = Node::Definition(mdast::Definition {
                identifier: normalize_identifier(label),
                label: Some(label.to_string()),
                url: def.dest.to_string(),
                title: def.title.as_ref().map(|t| t.to_string()),
            });
            (def.span.clone(), node)
        })
        .collect();
    definitions.sort_by_key(|(span, _)| span.start);
    #[cfg(feature = "tracing")]
    tracing::debug!(definitions = definitions.len(), "compiled markdown");
    for (_, definition) in definitions {
        state.ctx.append(definition);
    }

    state.ctx.finish()
}

struct State<'a> {
    ctx: CompileContext,
    source: &'a str,
    /// Nesting depth of open images; everything inside is alt text.
    image_depth: usize,
    /// Open angle-bracket autolink and the text collected for it so far.
    autolink: Option<(TokenKind, String)>,
}

impl<'a> State<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            ctx: CompileContext::new(),
            source,
            image_depth: 0,
            autolink: None,
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        if self.image_depth > 0 {
            self.image_event(event);
            return;
        }
        if self.autolink.is_some() {
            self.autolink_event(event);
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                let split = starts_with_escape(self.source, range.start)
                    && text.starts_with(['@', '.', ':']);
                self.ctx.push_text(&text, !split);
            }
            Event::Code(code) => self.ctx.append(Node::InlineCode(mdast::InlineCode {
                value: code.to_string(),
            })),
            Event::Html(html) => self.ctx.on_exit_data(&html),
            Event::InlineHtml(html) => self.ctx.append_inline_html(&html),
            Event::SoftBreak => self.ctx.on_exit_data("\n"),
            Event::HardBreak => self.ctx.append(Node::Break(mdast::Break)),
            Event::Rule => self.ctx.append(Node::ThematicBreak(mdast::ThematicBreak)),
            Event::TaskListMarker(checked) => self.ctx.set_checked(checked),
            // Not enabled in the parser options: keep the source as text.
            _ => self.ctx.on_exit_data(&self.source[range]),
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let node = match tag {
            Tag::Paragraph => Node::Paragraph(mdast::Paragraph {
                children: Vec::new(),
            }),
            Tag::Heading { level, .. } => Node::Heading(mdast::Heading {
                depth: level as u8,
                children: Vec::new(),
            }),
            Tag::BlockQuote(_) => Node::Blockquote(mdast::Blockquote {
                children: Vec::new(),
            }),
            Tag::CodeBlock(kind) => {
                let (lang, meta) = match kind {
                    CodeBlockKind::Fenced(info) => split_info(&info),
                    CodeBlockKind::Indented => (None, None),
                };
                Node::Code(mdast::Code {
                    value: String::new(),
                    lang,
                    meta,
                })
            }
            Tag::HtmlBlock => Node::Html(mdast::Html {
                value: String::new(),
            }),
            Tag::List(start) => Node::List(mdast::List {
                ordered: start.is_some(),
                start: start.map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
                spread: false,
                children: Vec::new(),
            }),
            Tag::Item => Node::ListItem(mdast::ListItem {
                spread: false,
                checked: None,
                children: Vec::new(),
            }),
            Tag::Emphasis => Node::Emphasis(mdast::Emphasis {
                children: Vec::new(),
            }),
            Tag::Strong => Node::Strong(mdast::Strong {
                children: Vec::new(),
            }),
            Tag::Strikethrough => Node::Delete(mdast::Delete {
                children: Vec::new(),
            }),
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            } => {
                let token = match link_type {
                    LinkType::Autolink => Some(TokenKind::Http),
                    LinkType::Email => Some(TokenKind::Email),
                    _ => None,
                };
                if let Some(kind) = token {
                    tokens::enter(&mut self.ctx, &Token::new(TokenKind::Literal, ""));
                    tokens::enter(&mut self.ctx, &Token::new(kind, ""));
                    self.autolink = Some((kind, String::new()));
                    return;
                }
                match reference_kind(link_type) {
                    Some(reference_kind) => Node::LinkReference(mdast::LinkReference {
                        identifier: normalize_identifier(&id),
                        label: Some(id.to_string()),
                        reference_kind,
                        children: Vec::new(),
                    }),
                    None => Node::Link(mdast::Link {
                        url: dest_url.to_string(),
                        title: non_empty(&title),
                        children: Vec::new(),
                    }),
                }
            }
            Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            } => {
                self.image_depth = 1;
                match reference_kind(link_type) {
                    Some(reference_kind) => Node::ImageReference(mdast::ImageReference {
                        identifier: normalize_identifier(&id),
                        label: Some(id.to_string()),
                        reference_kind,
                        alt: String::new(),
                    }),
                    None => Node::Image(mdast::Image {
                        url: dest_url.to_string(),
                        title: non_empty(&title),
                        alt: String::new(),
                    }),
                }
            }
            // Tables, footnotes, metadata and the like are not enabled.
            _ => return,
        };
        self.ctx.enter(node);
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::CodeBlock
            | TagEnd::HtmlBlock
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image => self.ctx.exit(),
            _ => {}
        }
    }

    /// Inside an image, all text is alt text and nested markup is flattened.
    fn image_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Image { .. }) => self.image_depth += 1,
            Event::End(TagEnd::Image) => {
                self.image_depth -= 1;
                if self.image_depth == 0 {
                    self.ctx.exit();
                }
            }
            Event::Text(text) | Event::Code(text) => self.ctx.on_exit_data(&text),
            Event::SoftBreak | Event::HardBreak => self.ctx.on_exit_data(" "),
            _ => {}
        }
    }

    /// Inside `<…>`, collect the text and hand it to the token converters.
    fn autolink_event(&mut self, event: Event<'_>) {
        match event {
            Event::Text(text) => {
                if let Some((_, value)) = self.autolink.as_mut() {
                    value.push_str(&text);
                }
            }
            Event::End(TagEnd::Link) => {
                if let Some((kind, value)) = self.autolink.take() {
                    tokens::exit(&mut self.ctx, &Token::new(kind, &value));
                    tokens::exit(&mut self.ctx, &Token::new(TokenKind::Literal, &value));
                }
            }
            _ => {}
        }
    }
}

fn reference_kind(link_type: LinkType) -> Option<ReferenceKind> {
    match link_type {
        LinkType::Reference => Some(ReferenceKind::Full),
        LinkType::Collapsed => Some(ReferenceKind::Collapsed),
        LinkType::Shortcut => Some(ReferenceKind::Shortcut),
        _ => None,
    }
}

/// Split a fence info string into language and meta.
fn split_info(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => (Some(lang.to_string()), non_empty(meta.trim())),
        None => (non_empty(info), None),
    }
}

/// Whether the byte at `offset` is backslash-escaped: preceded by an odd run
/// of backslashes.
///
/// An escaped `@`, `.` or `:` starts its own text node so it never joins an
/// autolink-shaped run. Other escapes merge with the surrounding text.
fn starts_with_escape(source: &str, offset: usize) -> bool {
    let backslashes = source.as_bytes()[..offset]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    backslashes % 2 == 1
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Case-fold and collapse whitespace, as reference labels are matched.
fn normalize_identifier(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdast::{Link, LinkReference, List, ListItem, Paragraph, Root};
    use pretty_assertions::assert_eq;

    fn blocks(markdown: &str) -> Vec<Node> {
        match compile(markdown) {
            Node::Root(Root { children }) => children,
            other => panic!("expected root, got {other:?}"),
        }
    }

    fn paragraph(children: Vec<Node>) -> Node {
        Node::Paragraph(Paragraph { children })
    }

    #[test]
    fn test_paragraph_text_is_merged() {
        assert_eq!(
            blocks("a_b *c d\ne"),
            vec![paragraph(vec![Node::text("a_b *c d\ne")])]
        );
    }

    #[test]
    fn test_escaped_character_starts_new_text() {
        assert_eq!(
            blocks("a\\@b.cd"),
            vec![paragraph(vec![Node::text("a"), Node::text("@b.cd")])]
        );
    }

    #[test]
    fn test_other_escapes_are_merged() {
        assert_eq!(
            blocks("a\\_b \\*c\\\\d"),
            vec![paragraph(vec![Node::text("a_b *c\\d")])]
        );
    }

    #[test]
    fn test_escaped_backslash_does_not_split() {
        assert_eq!(
            blocks("a\\\\@b.cd"),
            vec![paragraph(vec![Node::text("a\\@b.cd")])]
        );
    }

    #[test]
    fn test_starts_with_escape() {
        assert!(starts_with_escape("a\\@", 2));
        assert!(!starts_with_escape("a\\\\@", 3));
        assert!(starts_with_escape("\\\\\\.", 3));
        assert!(!starts_with_escape("a@", 1));
        assert!(!starts_with_escape("", 0));
    }

    #[test]
    fn test_angle_autolinks_use_token_converters() {
        assert_eq!(
            blocks("<http://a.bc/x> <a.b@c.de>"),
            vec![paragraph(vec![
                Node::link("http://a.bc/x", "http://a.bc/x"),
                Node::text(" "),
                Node::link("mailto:a.b@c.de", "a.b@c.de"),
            ])]
        );
    }

    #[test]
    fn test_inline_link_with_title() {
        assert_eq!(
            blocks("[x](http://a.bc \"t\")"),
            vec![paragraph(vec![Node::Link(Link {
                url: "http://a.bc".into(),
                title: Some("t".into()),
                children: vec![Node::text("x")],
            })])]
        );
    }

    #[test]
    fn test_reference_link_and_definition() {
        assert_eq!(
            blocks("[Docs][Ref]\n\n[ref]: http://a.bc"),
            vec![
                paragraph(vec![Node::LinkReference(LinkReference {
                    identifier: "ref".into(),
                    label: Some("Ref".into()),
                    reference_kind: ReferenceKind::Full,
                    children: vec![Node::text("Docs")],
                })]),
                Node::Definition(mdast::Definition {
                    identifier: "ref".into(),
                    label: Some("ref".into()),
                    url: "http://a.bc".into(),
                    title: None,
                }),
            ]
        );
    }

    #[test]
    fn test_tight_task_list() {
        assert_eq!(
            blocks("- [x] done\n- todo"),
            vec![Node::List(List {
                ordered: false,
                start: None,
                spread: false,
                children: vec![
                    Node::ListItem(ListItem {
                        spread: false,
                        checked: Some(true),
                        children: vec![paragraph(vec![Node::text("done")])],
                    }),
                    Node::ListItem(ListItem {
                        spread: false,
                        checked: None,
                        children: vec![paragraph(vec![Node::text("todo")])],
                    }),
                ],
            })]
        );
    }

    #[test]
    fn test_fenced_code_info() {
        match blocks("```rust title=x\nlet a;\n```").as_slice() {
            [Node::Code(code)] => {
                assert_eq!(code.lang.as_deref(), Some("rust"));
                assert_eq!(code.meta.as_deref(), Some("title=x"));
                assert_eq!(code.value, "let a;");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_image_alt_is_flattened() {
        match blocks("![a *b*](i.png)").as_slice() {
            [Node::Paragraph(p)] => match p.children.as_slice() {
                [Node::Image(image)] => {
                    assert_eq!(image.alt, "a b");
                    assert_eq!(image.url, "i.png");
                }
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_split_info() {
        assert_eq!(split_info("js"), (Some("js".into()), None));
        assert_eq!(split_info(""), (None, None));
        assert_eq!(split_info("js  a b"), (Some("js".into()), Some("a b".into())));
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("  Foo\n Bar "), "foo bar");
    }
}
