// Node type handlers for MDAST → Markdown serialization.
//
// One handler per MDAST node type. Each takes a State and Node, returns a String.

use super::escape::safe;
use super::phrasing::container_phrasing;
use super::{ConstructName, State};
use crate::mdast::{self, Node};

/// Dispatch to the appropriate handler for a node.
pub(crate) fn handle(state: &mut State, node: &Node) -> String {
    match node {
        Node::Root(n) => handle_root(state, n),
        Node::Paragraph(n) => handle_paragraph(state, n),
        Node::Heading(n) => handle_heading(state, n),
        Node::ThematicBreak(_) => handle_thematic_break(state),
        Node::Blockquote(n) => handle_blockquote(state, n),
        Node::List(n) => handle_list(state, n),
        Node::ListItem(n) => handle_list_item(state, n),
        Node::Code(n) => handle_code(state, n),
        Node::Html(n) => handle_html(n),
        Node::Definition(n) => handle_definition(state, n),
        Node::Text(n) => handle_text(state, n),
        Node::Emphasis(n) => handle_emphasis(state, n),
        Node::Strong(n) => handle_strong(state, n),
        Node::InlineCode(n) => handle_inline_code(n),
        Node::Break(_) => handle_break(),
        Node::Link(n) => handle_link(state, n),
        Node::Image(n) => handle_image(state, n),
        Node::LinkReference(n) => handle_link_reference(state, n),
        Node::ImageReference(n) => handle_image_reference(state, n),
        Node::Delete(n) => handle_delete(state, n),
    }
}

// ---------------------------------------------------------------------------
// Flow (block) handlers
// ---------------------------------------------------------------------------

fn handle_root(state: &mut State, node: &mdast::Root) -> String {
    super::flow::container_flow(state, &node.children)
}

fn handle_paragraph(state: &mut State, node: &mdast::Paragraph) -> String {
    state.enter(ConstructName::Paragraph);
    state.enter(ConstructName::Phrasing);
    let content = container_phrasing(state, &node.children, Some('\n'), Some('\n'));
    state.exit();
    state.exit();
    content
}

fn handle_heading(state: &mut State, node: &mdast::Heading) -> String {
    state.enter(ConstructName::Heading);
    state.enter(ConstructName::Phrasing);
    let content = container_phrasing(state, &node.children, Some(' '), Some('\n'));
    state.exit();
    state.exit();

    // Use setext for h1/h2 if: (a) setext style is configured, or (b) content
    // contains a newline (from Break nodes or text with preserved newlines).
    // ATX headings cannot span multiple lines, so setext is the only valid choice.
    let use_setext = node.depth <= 2
        && (matches!(state.options.heading_style, super::HeadingStyle::Setext)
            || content.contains('\n'));

    if use_setext {
        let marker = if node.depth == 1 { '=' } else { '-' };
        let line_len = content.lines().last().map_or(content.chars().count(), |l| l.chars().count());
        let underline_len = line_len.max(3);
        return format!(
            "{}\n{}",
            content,
            marker.to_string().repeat(underline_len)
        );
    }

    // ATX heading: replace hard breaks first, then bare newlines.
    // Order matters: reversing would corrupt "\\\n" (the \n would be replaced first).
    let content = content.replace("\\\n", " ").replace('\n', "&#xA;");
    let hashes = "#".repeat(node.depth as usize);
    if state.options.close_atx {
        format!("{} {} {}", hashes, content, hashes)
    } else {
        format!("{} {}", hashes, content)
    }
}

fn handle_thematic_break(state: &mut State) -> String {
    let marker = state.options.rule;
    let count = state.options.rule_repetition as usize;
    if state.options.rule_spaces {
        let parts: Vec<String> = std::iter::repeat(marker.to_string()).take(count).collect();
        parts.join(" ")
    } else {
        std::iter::repeat(marker).take(count).collect()
    }
}

fn handle_blockquote(state: &mut State, node: &mdast::Blockquote) -> String {
    let content = super::flow::container_flow(state, &node.children);
    content
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn handle_list(state: &mut State, node: &mdast::List) -> String {
    let mut result = Vec::new();
    let old_bullet = state.bullet_current;

    if !node.ordered {
        // Alternate bullets only when bullet_last_used == our preferred bullet.
        // bullet_last_used is set AFTER children are processed (matches JS behavior),
        // so it reflects the PREVIOUSLY completed sibling list's bullet.
        // Between non-list flow children, bullet_last_used is reset to None.
        let bullet = if state.bullet_last_used == Some(state.options.bullet) {
            // Use an alternate bullet to avoid ambiguity.
            if state.options.bullet == '*' { '-' } else { '*' }
        } else {
            state.options.bullet
        };
        state.bullet_current = Some(bullet);
        // bullet_last_used will be set AFTER processing children (below).
    }

    for (i, child) in node.children.iter().enumerate() {
        let prefix = if node.ordered {
            let number = if state.options.increment_list_marker {
                node.start.unwrap_or(1) + i as u32
            } else {
                node.start.unwrap_or(1)
            };
            format!("{}{}", number, state.options.bullet_ordered)
        } else {
            format!("{}", state.bullet_current.unwrap_or('*'))
        };

        let content = handle_list_item_with_parent(state, child, node);
        // Reset bullet_last_used after each list item to prevent state from
        // nested lists in one item leaking into sibling items' nested lists.
        state.bullet_last_used = None;
        let indent_width = prefix.len() + 1; // +1 for the space after bullet
        let indent = " ".repeat(indent_width);

        let mut lines: Vec<String> = content.lines().map(String::from).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }

        // Don't add trailing space if the first line is empty (empty list item).
        let first = if lines[0].is_empty() {
            prefix.clone()
        } else {
            format!("{} {}", prefix, lines[0])
        };
        let rest: Vec<String> = lines[1..]
            .iter()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", indent, line)
                }
            })
            .collect();

        let mut item = first;
        for line in rest {
            item.push('\n');
            item.push_str(&line);
        }
        result.push(item);
    }

    // Set bullet_last_used AFTER processing children (same as JS: `state.bulletLastUsed = bullet`).
    if !node.ordered {
        state.bullet_last_used = state.bullet_current;
    }
    state.bullet_current = old_bullet;

    let separator = if node.spread { "\n\n" } else { "\n" };
    result.join(separator)
}

/// Render a list item, respecting whether the parent list is spread.
fn handle_list_item_with_parent(state: &mut State, node: &Node, parent: &mdast::List) -> String {
    let spread = parent.spread || if let Node::ListItem(li) = node { li.spread } else { false };

    let content = if let Node::ListItem(li) = node {
        let mut content = super::flow::container_flow_tight(state, &li.children, spread);

        if let Some(checked) = li.checked {
            let checkbox = if checked { "[x]" } else { "[ ]" };
            if content.is_empty() {
                content = checkbox.to_string();
            } else {
                content = format!("{} {}", checkbox, content);
            }
        }
        content
    } else {
        handle(state, node)
    };

    content
}

fn handle_list_item(state: &mut State, node: &mdast::ListItem) -> String {
    // This is called directly (not via handle_list), so we don't know spread.
    // Default to the node's own spread setting.
    let mut content = super::flow::container_flow_tight(state, &node.children, node.spread);

    if let Some(checked) = node.checked {
        let checkbox = if checked { "[x]" } else { "[ ]" };
        if content.is_empty() {
            content = checkbox.to_string();
        } else {
            content = format!("{} {}", checkbox, content);
        }
    }

    content
}

fn handle_code(state: &mut State, node: &mdast::Code) -> String {
    let fence_char = state.options.fence;
    // Find minimum fence length that doesn't conflict with content.
    let content_max = node
        .value
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.chars().all(|c| c == fence_char) && trimmed.len() >= 3 {
                Some(trimmed.len())
            } else {
                None
            }
        })
        .max()
        .unwrap_or(0);
    let fence_len = (content_max + 1).max(3);
    let fence: String = std::iter::repeat(fence_char).take(fence_len).collect();

    let info = node.lang.as_deref().unwrap_or("");
    let meta = node
        .meta
        .as_ref()
        .map(|m| format!(" {}", m))
        .unwrap_or_default();

    if node.value.is_empty() {
        format!("{}{}{}\n{}", fence, info, meta, fence)
    } else {
        format!("{}{}{}\n{}\n{}", fence, info, meta, node.value, fence)
    }
}

fn handle_html(node: &mdast::Html) -> String {
    node.value.clone()
}

fn handle_definition(state: &mut State, node: &mdast::Definition) -> String {
    state.enter(ConstructName::Definition);
    let label = reference_label(state, node.label.as_deref(), &node.identifier);
    state.exit();
    format!("[{}]: {}{}", label, destination(&node.url), title(state, node.title.as_deref()))
}

// ---------------------------------------------------------------------------
// Phrasing (inline) handlers
// ---------------------------------------------------------------------------

/// Text outside any phrasing container (normally `container_phrasing`
/// escapes text itself, with the neighbouring characters known).
fn handle_text(state: &mut State, node: &mdast::Text) -> String {
    safe(state, &node.value, None, None)
}

fn handle_emphasis(state: &mut State, node: &mdast::Emphasis) -> String {
    let marker = state.options.emphasis;
    state.enter(ConstructName::Emphasis);
    let content = container_phrasing(state, &node.children, Some(marker), Some(marker));
    state.exit();
    format!("{}{}{}", marker, content, marker)
}

fn handle_strong(state: &mut State, node: &mdast::Strong) -> String {
    let marker = state.options.strong;
    state.enter(ConstructName::Strong);
    let content = container_phrasing(state, &node.children, Some(marker), Some(marker));
    state.exit();
    format!("{0}{0}{1}{0}{0}", marker, content)
}

fn handle_inline_code(node: &mdast::InlineCode) -> String {
    // Choose backtick count to avoid conflicts with content.
    let max_run = longest_backtick_run(&node.value);
    let ticks = "`".repeat(max_run + 1);

    let needs_space = node.value.starts_with('`')
        || node.value.ends_with('`')
        || (node.value.starts_with(' ') && node.value.ends_with(' ') && !node.value.trim().is_empty());

    if needs_space {
        format!("{} {} {}", ticks, node.value, ticks)
    } else {
        format!("{}{}{}", ticks, node.value, ticks)
    }
}

fn handle_break() -> String {
    "\\\n".to_string()
}

fn handle_link(state: &mut State, node: &mdast::Link) -> String {
    if format_link_as_autolink(state, node) {
        // Autolink content is literal: nothing inside `<…>` can be escaped.
        state.enter(ConstructName::Autolink);
        let content = format!("<{}>", plain_text(&node.children));
        state.exit();
        return content;
    }

    state.enter(ConstructName::Link);
    state.enter(ConstructName::Label);
    let content = container_phrasing(state, &node.children, Some('['), Some(']'));
    state.exit();
    let title = title(state, node.title.as_deref());
    state.exit();
    format!("[{}]({}{})", content, destination(&node.url), title)
}

/// Whether `node` can be written as `<url>` and read back unchanged.
/// Port of mdast-util-to-markdown/lib/util/format-link-as-autolink.js.
fn format_link_as_autolink(state: &State, node: &mdast::Link) -> bool {
    let raw = plain_text(&node.children);
    !state.options.resource_link
        && !node.url.is_empty()
        && node.title.is_none()
        && node.children.len() == 1
        && matches!(&node.children[0], Node::Text(_))
        && (raw == node.url || format!("mailto:{raw}") == node.url)
        && has_scheme(&node.url)
        && !node.url.chars().any(|c| c <= ' ' || c == '<' || c == '>' || c == '\x7f')
}

/// `scheme:` with a scheme of two or more characters.
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && scheme.len() >= 2
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

fn handle_image(state: &mut State, node: &mdast::Image) -> String {
    state.enter(ConstructName::Image);
    state.enter(ConstructName::Label);
    let alt = safe(state, &node.alt, Some('['), Some(']'));
    state.exit();
    let title = title(state, node.title.as_deref());
    state.exit();
    format!("![{}]({}{})", alt, destination(&node.url), title)
}

fn handle_link_reference(state: &mut State, node: &mdast::LinkReference) -> String {
    state.enter(ConstructName::Label);
    let content = container_phrasing(state, &node.children, Some('['), Some(']'));
    state.exit();
    let label = reference_label(state, node.label.as_deref(), &node.identifier);
    match node.reference_kind {
        mdast::ReferenceKind::Shortcut => format!("[{}]", content),
        mdast::ReferenceKind::Collapsed => format!("[{}][]", content),
        mdast::ReferenceKind::Full => format!("[{}][{}]", content, label),
    }
}

fn handle_image_reference(state: &mut State, node: &mdast::ImageReference) -> String {
    state.enter(ConstructName::Image);
    state.enter(ConstructName::Label);
    let alt = safe(state, &node.alt, Some('['), Some(']'));
    state.exit();
    let label = reference_label(state, node.label.as_deref(), &node.identifier);
    state.exit();
    match node.reference_kind {
        mdast::ReferenceKind::Shortcut => format!("![{}]", alt),
        mdast::ReferenceKind::Collapsed => format!("![{}][]", alt),
        mdast::ReferenceKind::Full => format!("![{}][{}]", alt, label),
    }
}

fn handle_delete(state: &mut State, node: &mdast::Delete) -> String {
    state.enter(ConstructName::Delete);
    let content = container_phrasing(state, &node.children, Some('~'), Some('~'));
    state.exit();
    format!("~~{}~~", content)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn plain_text(children: &[Node]) -> String {
    children.iter().map(Node::to_plain_string).collect()
}

/// The `[…]` identifier of a reference or definition.
fn reference_label(state: &mut State, label: Option<&str>, identifier: &str) -> String {
    state.enter(ConstructName::Reference);
    let value = safe(state, label.unwrap_or(identifier), Some('['), Some(']'));
    state.exit();
    value
}

/// A link destination, in `<…>` when it would not survive raw.
fn destination(url: &str) -> String {
    if url.is_empty() || url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        format!("<{}>", url.replace('<', "\\<").replace('>', "\\>"))
    } else {
        url.replace('(', "\\(").replace(')', "\\)")
    }
}

/// ` "title"`, or nothing.
fn title(state: &State, title: Option<&str>) -> String {
    let quote = state.options.quote;
    match title {
        Some(title) => {
            let escaped = title.replace(quote, &format!("\\{quote}"));
            format!(" {quote}{escaped}{quote}")
        }
        None => String::new(),
    }
}

/// Find the longest consecutive run of backticks in a string.
fn longest_backtick_run(s: &str) -> usize {
    let mut max = 0;
    let mut current = 0;
    for c in s.chars() {
        if c == '`' {
            current += 1;
            max = max.max(current);
        } else {
            current = 0;
        }
    }
    max
}
