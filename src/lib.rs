// mdast-autolink — autolink literals and federated mentions over an MDAST tree.
//
// Architecture:
//   Markdown string → pulldown-cmark events → from_markdown → MDAST
//     → autolink (find_replace over text nodes) → MDAST → stringify → Markdown
//
// Reference implementations:
//   - mdast-util-gfm-autolink-literal (transform): https://github.com/syntax-tree/mdast-util-gfm-autolink-literal
//   - mdast-util-find-and-replace (walker): https://github.com/syntax-tree/mdast-util-find-and-replace
//   - mdast-util-to-markdown (serializer): https://github.com/syntax-tree/mdast-util-to-markdown

mod error;
pub mod autolink;
pub mod find_replace;
pub mod from_markdown;
pub mod mdast;
mod stringify;

pub use autolink::AutolinkLiteral;
pub use error::AutolinkError;
pub use from_markdown::parse;
pub use stringify::{ConstructName, HeadingStyle, StringifyOptions, UnsafePattern};

/// Conversion options.
#[derive(Debug, Clone)]
pub struct Options {
    /// The autolink transform, bound to the connected instance.
    pub autolink: AutolinkLiteral,
    /// Serializer formatting options.
    pub stringify: StringifyOptions,
}

impl Options {
    /// Create options for the connected `instance` with default formatting.
    pub fn new(instance: impl Into<String>) -> Result<Self, AutolinkError> {
        Ok(Self {
            autolink: AutolinkLiteral::new(instance)?,
            stringify: StringifyOptions::default(),
        })
    }

    /// Set the heading style.
    pub fn with_heading_style(mut self, style: HeadingStyle) -> Self {
        self.stringify.heading_style = style;
        self
    }

    /// Set the unordered list bullet character.
    pub fn with_bullet(mut self, bullet: char) -> Self {
        self.stringify.bullet = bullet;
        self
    }

    /// Set the ordered list bullet character.
    pub fn with_bullet_ordered(mut self, bullet: char) -> Self {
        self.stringify.bullet_ordered = bullet;
        self
    }

    /// Set the emphasis marker character.
    pub fn with_emphasis(mut self, marker: char) -> Self {
        self.stringify.emphasis = marker;
        self
    }

    /// Set the strong marker character.
    pub fn with_strong(mut self, marker: char) -> Self {
        self.stringify.strong = marker;
        self
    }

    /// Set the fenced code block marker character.
    pub fn with_fence(mut self, fence: char) -> Self {
        self.stringify.fence = fence;
        self
    }

    /// Set the thematic break rule character.
    pub fn with_rule(mut self, rule: char) -> Self {
        self.stringify.rule = rule;
        self
    }

    /// Set the number of thematic break markers.
    pub fn with_rule_repetition(mut self, count: u8) -> Self {
        self.stringify.rule_repetition = count;
        self
    }

    /// Set whether to use spaces in thematic breaks.
    pub fn with_rule_spaces(mut self, spaces: bool) -> Self {
        self.stringify.rule_spaces = spaces;
        self
    }

    /// Set whether to close ATX headings with trailing hashes.
    pub fn with_close_atx(mut self, close: bool) -> Self {
        self.stringify.close_atx = close;
        self
    }

    /// Set whether to increment ordered list markers.
    pub fn with_increment_list_marker(mut self, increment: bool) -> Self {
        self.stringify.increment_list_marker = increment;
        self
    }

    /// Set the quote character for titles.
    pub fn with_quote(mut self, quote: char) -> Self {
        self.stringify.quote = quote;
        self
    }

    /// Set whether to always use resource links (never `<…>` autolinks).
    pub fn with_resource_link(mut self, resource: bool) -> Self {
        self.stringify.resource_link = resource;
        self
    }

    /// Set whether to escape text that would read back as an autolink literal.
    pub fn with_autolink_literal_escapes(mut self, escape: bool) -> Self {
        self.stringify.autolink_literal = escape;
        self
    }
}

/// Link every URL, email and mention in `markdown`, with default formatting.
///
/// # Examples
///
/// ```
/// let md = mdast_autolink::linkify("ask !rust@programming.dev", "lemmy.world").unwrap();
/// assert_eq!(
///     md,
///     "ask [!rust@programming.dev](https://lemmy.world/c/rust@programming.dev)\n"
/// );
/// ```
pub fn linkify(markdown: &str, instance: &str) -> Result<String, AutolinkError> {
    Ok(linkify_with(markdown, &Options::new(instance)?))
}

/// Link every URL, email and mention in `markdown` with custom options.
///
/// # Examples
///
/// ```
/// use mdast_autolink::{linkify_with, Options};
///
/// let options = Options::new("lemmy.world").unwrap().with_resource_link(true);
/// let md = linkify_with("see https://example.org", &options);
/// assert_eq!(md, "see [https://example.org](https://example.org)\n");
/// ```
pub fn linkify_with(markdown: &str, options: &Options) -> String {
    let tree = markdown_to_mdast(markdown, options);
    mdast_to_string(&tree, &options.stringify)
}

/// Parse Markdown and apply the autolink transform.
pub fn markdown_to_mdast(markdown: &str, options: &Options) -> mdast::Node {
    let mut tree = parse(markdown);
    options.autolink.transform(&mut tree);
    tree
}

/// Serialize an MDAST tree to a Markdown string.
pub fn mdast_to_string(node: &mdast::Node, options: &StringifyOptions) -> String {
    stringify::stringify(node, options)
}
