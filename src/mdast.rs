// MDAST node types — based on https://github.com/syntax-tree/mdast
//
// The subset of node types produced by the Markdown parser adapter and
// consumed by the autolink transform and the serializer. Each node is a
// variant of the `Node` enum. Parent nodes own their children.
// Leaf nodes hold a `value: String`.

/// How a reference (link or image) is written in Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `[text]` — identifier inferred from content.
    Shortcut,
    /// `[text][]` — explicit empty brackets.
    Collapsed,
    /// `[text][id]` — explicit identifier.
    Full,
}

// ---------------------------------------------------------------------------
// Node structs
// ---------------------------------------------------------------------------

/// Document root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub children: Vec<Node>,
}

/// Block quote (`> ...`).
#[derive(Debug, Clone, PartialEq)]
pub struct Blockquote {
    pub children: Vec<Node>,
}

/// Fenced or indented code block.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub value: String,
    pub lang: Option<String>,
    pub meta: Option<String>,
}

/// ATX or setext heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub depth: u8, // 1–6
    pub children: Vec<Node>,
}

/// Raw HTML, block or inline.
#[derive(Debug, Clone, PartialEq)]
pub struct Html {
    pub value: String,
}

/// Ordered or unordered list.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    pub start: Option<u32>,
    pub spread: bool,
    pub children: Vec<Node>,
}

/// Item inside a list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub spread: bool,
    pub checked: Option<bool>,
    pub children: Vec<Node>,
}

/// Thematic break (`***`, `---`, `___`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThematicBreak;

/// Link reference definition (`[label]: url "title"`).
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub identifier: String,
    pub label: Option<String>,
    pub url: String,
    pub title: Option<String>,
}

/// Paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub children: Vec<Node>,
}

/// Plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
}

/// Emphasis (`*text*` or `_text_`).
#[derive(Debug, Clone, PartialEq)]
pub struct Emphasis {
    pub children: Vec<Node>,
}

/// Strong emphasis (`**text**` or `__text__`).
#[derive(Debug, Clone, PartialEq)]
pub struct Strong {
    pub children: Vec<Node>,
}

/// Inline code (`` `code` ``).
#[derive(Debug, Clone, PartialEq)]
pub struct InlineCode {
    pub value: String,
}

/// Hard line break (`\` or two spaces at end of line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Break;

/// Hyperlink (`[text](url "title")`, `<url>`, or a recognized bare autolink).
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub url: String,
    pub title: Option<String>,
    pub children: Vec<Node>,
}

/// Image (`![alt](url "title")`).
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub url: String,
    pub title: Option<String>,
    pub alt: String,
}

/// Link via reference (`[text][id]`).
#[derive(Debug, Clone, PartialEq)]
pub struct LinkReference {
    pub identifier: String,
    pub label: Option<String>,
    pub reference_kind: ReferenceKind,
    pub children: Vec<Node>,
}

/// Image via reference (`![alt][id]`).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReference {
    pub identifier: String,
    pub label: Option<String>,
    pub reference_kind: ReferenceKind,
    pub alt: String,
}

/// Strikethrough (`~~text~~`).
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub children: Vec<Node>,
}

// ---------------------------------------------------------------------------
// Node enum
// ---------------------------------------------------------------------------

/// A node in the Markdown abstract syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Document
    Root(Root),

    // Flow (block) content
    Blockquote(Blockquote),
    Code(Code),
    Heading(Heading),
    Html(Html),
    List(List),
    ListItem(ListItem),
    ThematicBreak(ThematicBreak),
    Definition(Definition),
    Paragraph(Paragraph),

    // Phrasing (inline) content
    Break(Break),
    Delete(Delete),
    Emphasis(Emphasis),
    Image(Image),
    ImageReference(ImageReference),
    InlineCode(InlineCode),
    Link(Link),
    LinkReference(LinkReference),
    Strong(Strong),
    Text(Text),
}

/// The type tag of a [`Node`], without its payload.
///
/// Used wherever a set of node types has to be named, e.g. the skip list of
/// [`find_and_replace`](crate::find_replace::find_and_replace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Blockquote,
    Code,
    Heading,
    Html,
    List,
    ListItem,
    ThematicBreak,
    Definition,
    Paragraph,
    Break,
    Delete,
    Emphasis,
    Image,
    ImageReference,
    InlineCode,
    Link,
    LinkReference,
    Strong,
    Text,
}

impl Node {
    /// Build a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text {
            value: value.into(),
        })
    }

    /// Build a title-less link whose only child is a text node.
    pub fn link(url: impl Into<String>, display: impl Into<String>) -> Self {
        Node::Link(Link {
            url: url.into(),
            title: None,
            children: vec![Node::text(display)],
        })
    }

    /// The type tag of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Root(_) => NodeKind::Root,
            Node::Blockquote(_) => NodeKind::Blockquote,
            Node::Code(_) => NodeKind::Code,
            Node::Heading(_) => NodeKind::Heading,
            Node::Html(_) => NodeKind::Html,
            Node::List(_) => NodeKind::List,
            Node::ListItem(_) => NodeKind::ListItem,
            Node::ThematicBreak(_) => NodeKind::ThematicBreak,
            Node::Definition(_) => NodeKind::Definition,
            Node::Paragraph(_) => NodeKind::Paragraph,
            Node::Break(_) => NodeKind::Break,
            Node::Delete(_) => NodeKind::Delete,
            Node::Emphasis(_) => NodeKind::Emphasis,
            Node::Image(_) => NodeKind::Image,
            Node::ImageReference(_) => NodeKind::ImageReference,
            Node::InlineCode(_) => NodeKind::InlineCode,
            Node::Link(_) => NodeKind::Link,
            Node::LinkReference(_) => NodeKind::LinkReference,
            Node::Strong(_) => NodeKind::Strong,
            Node::Text(_) => NodeKind::Text,
        }
    }

    /// Returns a reference to this node's children, if it has any.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Root(n) => Some(&n.children),
            Node::Blockquote(n) => Some(&n.children),
            Node::Heading(n) => Some(&n.children),
            Node::List(n) => Some(&n.children),
            Node::ListItem(n) => Some(&n.children),
            Node::Paragraph(n) => Some(&n.children),
            Node::Emphasis(n) => Some(&n.children),
            Node::Strong(n) => Some(&n.children),
            Node::Delete(n) => Some(&n.children),
            Node::Link(n) => Some(&n.children),
            Node::LinkReference(n) => Some(&n.children),
            _ => None,
        }
    }

    /// Returns a mutable reference to this node's children, if it has any.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Root(n) => Some(&mut n.children),
            Node::Blockquote(n) => Some(&mut n.children),
            Node::Heading(n) => Some(&mut n.children),
            Node::List(n) => Some(&mut n.children),
            Node::ListItem(n) => Some(&mut n.children),
            Node::Paragraph(n) => Some(&mut n.children),
            Node::Emphasis(n) => Some(&mut n.children),
            Node::Strong(n) => Some(&mut n.children),
            Node::Delete(n) => Some(&mut n.children),
            Node::Link(n) => Some(&mut n.children),
            Node::LinkReference(n) => Some(&mut n.children),
            _ => None,
        }
    }

    /// Whether this node is phrasing (inline) content.
    ///
    /// `Html` counts as flow; inline HTML is appended as phrasing explicitly.
    pub fn is_phrasing(&self) -> bool {
        matches!(
            self,
            Node::Break(_)
                | Node::Delete(_)
                | Node::Emphasis(_)
                | Node::Image(_)
                | Node::ImageReference(_)
                | Node::InlineCode(_)
                | Node::Link(_)
                | Node::LinkReference(_)
                | Node::Strong(_)
                | Node::Text(_)
        )
    }

    /// Concatenated text content of this node and its descendants.
    ///
    /// Port of mdast-util-to-string: images contribute their alt text,
    /// breaks and other leaves contribute nothing.
    pub fn to_plain_string(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(n) => out.push_str(&n.value),
        Node::InlineCode(n) => out.push_str(&n.value),
        Node::Code(n) => out.push_str(&n.value),
        Node::Image(n) => out.push_str(&n.alt),
        Node::ImageReference(n) => out.push_str(&n.alt),
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    collect_text(child, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_phrasing() {
        let node = Node::text("hello");
        assert!(node.is_phrasing());
        assert_eq!(node.kind(), NodeKind::Text);
    }

    #[test]
    fn test_paragraph_is_not_phrasing() {
        let node = Node::Paragraph(Paragraph {
            children: vec![Node::text("hello")],
        });
        assert!(!node.is_phrasing());
        assert_eq!(node.kind(), NodeKind::Paragraph);
    }

    #[test]
    fn test_link_helper() {
        let node = Node::link("mailto:a@b.co", "a@b.co");
        match &node {
            Node::Link(link) => {
                assert_eq!(link.url, "mailto:a@b.co");
                assert_eq!(link.title, None);
                assert_eq!(link.children, vec![Node::text("a@b.co")]);
            }
            other => panic!("expected link, got {other:?}"),
        }
        assert_eq!(node.kind(), NodeKind::Link);
    }

    #[test]
    fn test_children_access() {
        let node = Node::Paragraph(Paragraph {
            children: vec![Node::text("hello")],
        });
        assert_eq!(node.children().unwrap().len(), 1);
    }

    #[test]
    fn test_leaf_has_no_children() {
        assert!(Node::text("hello").children().is_none());
    }

    #[test]
    fn test_to_plain_string() {
        let node = Node::Paragraph(Paragraph {
            children: vec![
                Node::text("see "),
                Node::Emphasis(Emphasis {
                    children: vec![Node::link("http://a.bc", "http://a.bc")],
                }),
                Node::Break(Break),
                Node::InlineCode(InlineCode { value: "x".into() }),
            ],
        });
        assert_eq!(node.to_plain_string(), "see http://a.bcx");
    }

    #[test]
    fn test_root_default() {
        let root = Root::default();
        assert!(root.children.is_empty());
    }
}
