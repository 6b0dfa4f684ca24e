// Autolink literals: bare URLs, `www.` domains, emails and federated mentions.
//
// Extends mdast-util-gfm-autolink-literal with `!community@server`,
// `/c/community@server`, `@user@server` and `/u/user@server` mentions that
// resolve against a connected instance. Recognition happens on the text of an
// already parsed tree; `UNSAFE` tells the serializer which characters to
// escape so that a serialized tree parses back to the same links.

pub mod handlers;
pub mod tokens;
pub(crate) mod util;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AutolinkError;
use crate::find_replace::{find_and_replace, FindReplace};
use crate::mdast::{Node, NodeKind};
use crate::stringify::{ConstructName, UnsafePattern};
use handlers::{find_email, find_mention, find_url, Mention};

// `[:word:]` is the ASCII word class: non-ASCII letters never extend a link.
// No `(?i)`: Unicode case folding would let `ſ` and the Kelvin sign match.
const SERVER: &str = r"([-[:word:]]+(?:\.[-[:word:]]+)+)";

pub(crate) static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([Hh][Tt][Tt][Pp][Ss]?://|[Ww][Ww][Ww]\.)([-.[:word:]]+)([^ \t\r\n]*)")
        .expect("valid url pattern")
});

pub(crate) static COMMUNITY_ABSOLUTE: LazyLock<Regex> =
    LazyLock::new(|| mention_pattern(r"![[:word:]]+"));

pub(crate) static COMMUNITY_RELATIVE: LazyLock<Regex> =
    LazyLock::new(|| mention_pattern(r"/c/[[:word:]]+"));

pub(crate) static USER_ABSOLUTE: LazyLock<Regex> =
    LazyLock::new(|| mention_pattern(r"@[[:word:]]+"));

pub(crate) static USER_RELATIVE: LazyLock<Regex> =
    LazyLock::new(|| mention_pattern(r"/u/[[:word:]]+"));

pub(crate) static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| mention_pattern(r"[-.+[:word:]]+"));

fn mention_pattern(local: &str) -> Regex {
    Regex::new(&format!("({local})@{SERVER}")).expect("valid mention pattern")
}

/// Node kinds whose text is never scanned: already resolved links.
const IGNORE: &[NodeKind] = &[NodeKind::Link, NodeKind::LinkReference];

const IN_PHRASING: &[ConstructName] = &[ConstructName::Phrasing];
const NOT_IN_LINK: &[ConstructName] = &[
    ConstructName::Autolink,
    ConstructName::Link,
    ConstructName::Image,
    ConstructName::Label,
];

/// Characters the serializer must escape in plain text so that text which
/// was not a link does not turn into one when parsed again.
pub const UNSAFE: &[UnsafePattern] = &[
    // `a@b` could read as an email or mention.
    UnsafePattern {
        character: '@',
        before: Some(r"[+\-.[:word:]]"),
        after: Some(r"[\-.[:word:]]"),
        at_break: false,
        in_construct: IN_PHRASING,
        not_in_construct: NOT_IN_LINK,
    },
    // `www.x` could read as a domain.
    UnsafePattern {
        character: '.',
        before: Some(r"[Ww]"),
        after: Some(r"[\-.[:word:]]"),
        at_break: false,
        in_construct: IN_PHRASING,
        not_in_construct: NOT_IN_LINK,
    },
    // `http:/` and `https:/` could read as a protocol.
    UnsafePattern {
        character: ':',
        before: Some(r"[ps]"),
        after: Some(r"/"),
        at_break: false,
        in_construct: IN_PHRASING,
        not_in_construct: NOT_IN_LINK,
    },
];

/// The autolink transform, bound to a connected instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutolinkLiteral {
    instance: String,
}

impl AutolinkLiteral {
    /// Create the transform for `instance`, the host under which mentions
    /// are resolved (e.g. `"lemmy.world"`).
    pub fn new(instance: impl Into<String>) -> Result<Self, AutolinkError> {
        let instance = instance.into();
        if instance.trim().is_empty() {
            return Err(AutolinkError::EmptyInstance);
        }
        let reason = if instance.chars().any(char::is_whitespace) {
            Some("contains whitespace")
        } else if instance.contains('/') {
            Some("contains '/'")
        } else if instance.contains('@') {
            Some("contains '@'")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(AutolinkError::InvalidInstance { instance, reason });
        }
        Ok(Self { instance })
    }

    /// The connected instance.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// The ordered pattern table.
    ///
    /// Mentions come before the generic email pattern: every mention ends in
    /// something email-shaped.
    pub fn pattern_table(&self) -> Vec<FindReplace<'_>> {
        let instance = self.instance.as_str();
        vec![
            FindReplace::new(&URL, find_url),
            FindReplace::new(&COMMUNITY_ABSOLUTE, move |ctx| {
                find_mention(ctx, instance, Mention::Community, "!")
            }),
            FindReplace::new(&COMMUNITY_RELATIVE, move |ctx| {
                find_mention(ctx, instance, Mention::Community, "/c/")
            }),
            FindReplace::new(&USER_ABSOLUTE, move |ctx| {
                find_mention(ctx, instance, Mention::User, "@")
            }),
            FindReplace::new(&USER_RELATIVE, move |ctx| {
                find_mention(ctx, instance, Mention::User, "/u/")
            }),
            FindReplace::new(&EMAIL, find_email),
        ]
    }

    /// Turn every autolink literal in the text of `tree` into a link.
    ///
    /// Text inside links and link references is left alone.
    pub fn transform(&self, tree: &mut Node) {
        #[cfg(feature = "tracing")]
        tracing::debug!(instance = %self.instance, "autolink literal transform");
        find_and_replace(tree, &self.pattern_table(), IGNORE);
    }
}
