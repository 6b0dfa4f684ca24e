// Find-and-replace over text nodes of an MDAST tree.
//
// Port of mdast-util-find-and-replace. Each (regex, handler) pair is applied
// to the whole tree in turn; a text node whose matches are accepted is split
// into the surrounding plain text and the handler's replacement nodes.
// Subtrees whose kind is on the ignore list are never entered.

use regex::{Captures, Regex};

use crate::mdast::{Node, NodeKind};

/// What a handler decided about one candidate match.
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement {
    /// Not a match after all: the text stays as it is and scanning resumes
    /// one character after the start of the candidate.
    NoMatch,
    /// Replace the matched span with these nodes.
    Nodes(Vec<Node>),
}

/// Read-only view of a single candidate match.
pub struct MatchContext<'a> {
    /// The full value of the text node being scanned.
    pub input: &'a str,
    /// Byte offset of the match in `input`.
    pub index: usize,
    /// Capture groups of the match; group 0 is the whole match.
    pub captures: &'a Captures<'a>,
}

impl<'a> MatchContext<'a> {
    /// The whole matched text.
    pub fn matched(&self) -> &'a str {
        self.captures.get(0).map_or("", |m| m.as_str())
    }

    /// Capture group `i`, if it participated in the match.
    pub fn group(&self, i: usize) -> Option<&'a str> {
        self.captures.get(i).map(|m| m.as_str())
    }

    /// The character immediately before the match, if any.
    pub fn previous_char(&self) -> Option<char> {
        self.input[..self.index].chars().next_back()
    }
}

/// Handler invoked for each candidate match of a pattern.
pub type Handler<'a> = Box<dyn Fn(&MatchContext<'_>) -> Replacement + Send + Sync + 'a>;

/// One entry of a pattern table.
pub struct FindReplace<'a> {
    pub find: &'a Regex,
    pub replace: Handler<'a>,
}

impl<'a> FindReplace<'a> {
    pub fn new(
        find: &'a Regex,
        replace: impl Fn(&MatchContext<'_>) -> Replacement + Send + Sync + 'a,
    ) -> Self {
        Self {
            find,
            replace: Box::new(replace),
        }
    }
}

/// Restartable, lazy sequence of captures over one haystack.
///
/// Unlike `Regex::captures_iter`, the scan position can be moved back after a
/// match was produced, which is how rejected candidates are retried one
/// character further along.
pub struct Matches<'r, 'h> {
    regex: &'r Regex,
    haystack: &'h str,
    at: usize,
}

impl<'r, 'h> Matches<'r, 'h> {
    pub fn new(regex: &'r Regex, haystack: &'h str) -> Self {
        Self {
            regex,
            haystack,
            at: 0,
        }
    }

    /// Resume scanning one character after byte offset `index`.
    pub fn resume_after(&mut self, index: usize) {
        self.at = next_boundary(self.haystack, index);
    }
}

impl<'h> Iterator for Matches<'_, 'h> {
    type Item = Captures<'h>;

    fn next(&mut self) -> Option<Captures<'h>> {
        if self.at > self.haystack.len() {
            return None;
        }
        let caps = self.regex.captures_at(self.haystack, self.at)?;
        let whole = caps.get(0)?;
        self.at = if whole.is_empty() {
            next_boundary(self.haystack, whole.end())
        } else {
            whole.end()
        };
        Some(caps)
    }
}

/// Byte offset of the character boundary after the one at `index`, or one
/// past the end when `index` is at the end.
fn next_boundary(s: &str, index: usize) -> usize {
    s[index..]
        .chars()
        .next()
        .map_or(s.len() + 1, |c| index + c.len_utf8())
}

/// Apply every pair, in order, to all text nodes of `tree` outside of
/// subtrees whose kind is in `ignore`.
pub fn find_and_replace(tree: &mut Node, pairs: &[FindReplace<'_>], ignore: &[NodeKind]) {
    for pair in pairs {
        visit(tree, pair, ignore);
    }
}

fn visit(node: &mut Node, pair: &FindReplace<'_>, ignore: &[NodeKind]) {
    if ignore.contains(&node.kind()) {
        return;
    }
    let Some(children) = node.children_mut() else {
        return;
    };

    let mut i = 0;
    while i < children.len() {
        let replaced = match &children[i] {
            Node::Text(text) => replace_text(&text.value, pair),
            _ => None,
        };
        match replaced {
            Some(nodes) => {
                // Skip over the replacement: handlers never see their own output.
                let count = nodes.len();
                children.splice(i..=i, nodes);
                i += count;
            }
            None => {
                visit(&mut children[i], pair, ignore);
                i += 1;
            }
        }
    }
}

/// Scan one text value. Returns `None` when nothing was replaced.
fn replace_text(value: &str, pair: &FindReplace<'_>) -> Option<Vec<Node>> {
    let mut nodes = Vec::new();
    let mut start = 0;
    let mut changed = false;
    let mut matches = Matches::new(pair.find, value);

    while let Some(caps) = matches.next() {
        let Some(whole) = caps.get(0) else {
            break;
        };
        let position = whole.start();
        let context = MatchContext {
            input: value,
            index: position,
            captures: &caps,
        };

        match (pair.replace)(&context) {
            Replacement::NoMatch => {
                #[cfg(feature = "tracing")]
                tracing::trace!(candidate = whole.as_str(), position, "rejected");
                matches.resume_after(position);
            }
            Replacement::Nodes(replacement) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(candidate = whole.as_str(), position, "replaced");
                if start != position {
                    nodes.push(Node::text(&value[start..position]));
                }
                nodes.extend(replacement);
                start = whole.end();
                changed = true;
            }
        }
    }

    if !changed {
        return None;
    }
    if start < value.len() {
        nodes.push(Node::text(&value[start..]));
    }
    Some(nodes)
}
