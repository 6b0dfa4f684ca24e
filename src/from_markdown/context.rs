// Tree-building state for the Markdown → MDAST compiler.
//
// Port of the node stack in mdast-util-from-markdown: `enter` opens a node,
// `exit` closes the innermost one and appends it to its parent. Leaf data
// (text, code, alt text) goes to whatever node is open.

use crate::mdast::{self, Node, NodeKind};

struct Frame {
    node: Node,
    /// Opened by the compiler, not by the event stream (tight list items
    /// hold their inline content without a paragraph event).
    implicit: bool,
}

/// Node stack used while compiling a Markdown event stream into a tree.
pub struct CompileContext {
    stack: Vec<Frame>,
}

impl Default for CompileContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileContext {
    /// A context with an open, empty root.
    pub fn new() -> Self {
        Self {
            stack: vec![Frame {
                node: Node::Root(mdast::Root::default()),
                implicit: false,
            }],
        }
    }

    /// The innermost open node.
    pub fn current(&self) -> &Node {
        &self.top().node
    }

    /// Open `node`; following content goes into it until [`exit`](Self::exit).
    pub fn enter(&mut self, node: Node) {
        self.prepare(node.is_phrasing());
        if let (Node::Paragraph(_), Node::ListItem(item)) = (&node, &mut self.top_mut().node) {
            item.spread = true;
        }
        self.stack.push(Frame {
            node,
            implicit: false,
        });
    }

    /// Close the innermost node opened with [`enter`](Self::enter).
    pub fn exit(&mut self) {
        self.close_implicit();
        self.pop();
    }

    /// Close the innermost node, which must be a link.
    ///
    /// # Panics
    ///
    /// When something else is open, which means the event stream and the
    /// compiler are out of sync.
    pub fn exit_link(&mut self) {
        self.close_implicit();
        let kind = self.current().kind();
        assert!(kind == NodeKind::Link, "expected an open link, found {kind:?}");
        self.pop();
    }

    /// Append a complete node to the innermost open node.
    pub fn append(&mut self, node: Node) {
        self.append_as(node.is_phrasing(), node);
    }

    /// Append inline raw HTML (phrasing, unlike block HTML).
    pub fn append_inline_html(&mut self, value: &str) {
        self.append_as(
            true,
            Node::Html(mdast::Html {
                value: value.to_string(),
            }),
        );
    }

    /// Add character data to the innermost open node.
    ///
    /// Code and HTML collect it in their value, images in their alt text;
    /// anywhere else it becomes text, merged into a preceding text node.
    pub fn on_exit_data(&mut self, value: &str) {
        self.push_text(value, true);
    }

    /// Like [`on_exit_data`](Self::on_exit_data), but when `mergeable` is
    /// false a new text node is always started.
    pub fn push_text(&mut self, value: &str, mergeable: bool) {
        if value.is_empty() {
            return;
        }
        let data = match &mut self.top_mut().node {
            Node::Code(code) => Some(&mut code.value),
            Node::Html(html) => Some(&mut html.value),
            Node::Image(image) => Some(&mut image.alt),
            Node::ImageReference(image) => Some(&mut image.alt),
            _ => None,
        };
        if let Some(data) = data {
            data.push_str(value);
            return;
        }

        self.prepare(true);
        let Some(children) = self.top_mut().node.children_mut() else {
            return;
        };
        match children.last_mut() {
            Some(Node::Text(text)) if mergeable => text.value.push_str(value),
            _ => children.push(Node::text(value)),
        }
    }

    /// Text of a protocol autolink: the text is also the URL.
    pub fn on_exit_autolink_protocol(&mut self, value: &str) {
        self.on_exit_data(value);
        self.current_link_mut().url = value.to_string();
    }

    /// Text of an email autolink: the URL is the `mailto:` form.
    pub fn on_exit_autolink_email(&mut self, value: &str) {
        self.on_exit_data(value);
        self.current_link_mut().url = format!("mailto:{value}");
    }

    /// The innermost open node as a link.
    ///
    /// # Panics
    ///
    /// When the innermost open node is not a link.
    pub fn current_link_mut(&mut self) -> &mut mdast::Link {
        match &mut self.top_mut().node {
            Node::Link(link) => link,
            other => panic!("expected an open link, found {:?}", other.kind()),
        }
    }

    /// Mark the nearest open list item as a task item.
    pub fn set_checked(&mut self, checked: bool) {
        for frame in self.stack.iter_mut().rev() {
            if let Node::ListItem(item) = &mut frame.node {
                item.checked = Some(checked);
                return;
            }
        }
    }

    /// Close everything still open and return the root.
    pub fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.pop();
        }
        match self.stack.pop() {
            Some(frame) => frame.node,
            None => Node::Root(mdast::Root::default()),
        }
    }

    fn top(&self) -> &Frame {
        // The root frame is never popped before `finish`.
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn append_as(&mut self, phrasing: bool, node: Node) {
        self.prepare(phrasing);
        if let Some(children) = self.top_mut().node.children_mut() {
            children.push(node);
        }
    }

    /// Make the innermost open node a valid parent for content of the given
    /// kind: inline content in a list item gets an implicit paragraph, block
    /// content closes one.
    fn prepare(&mut self, phrasing: bool) {
        if phrasing {
            if matches!(self.top().node, Node::ListItem(_)) {
                self.stack.push(Frame {
                    node: Node::Paragraph(mdast::Paragraph {
                        children: Vec::new(),
                    }),
                    implicit: true,
                });
            }
        } else {
            self.close_implicit();
        }
    }

    fn close_implicit(&mut self) {
        while self.stack.len() > 1 && self.top().implicit {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(Frame { mut node, .. }) = self.stack.pop() else {
            return;
        };
        match &mut node {
            Node::Code(code) => trim_final_newline(&mut code.value),
            Node::Html(html) => trim_final_newline(&mut html.value),
            Node::List(list) => {
                list.spread = list
                    .children
                    .iter()
                    .any(|child| matches!(child, Node::ListItem(item) if item.spread));
            }
            _ => {}
        }
        if let Some(children) = self.top_mut().node.children_mut() {
            children.push(node);
        }
    }
}

fn trim_final_newline(value: &mut String) {
    if value.ends_with('\n') {
        value.pop();
        if value.ends_with('\r') {
            value.pop();
        }
    }
}
