// Regression tests — every bug found becomes a test case here.
// Never delete a test from this file.

use mdast_autolink::mdast::{Link, Node, Paragraph, Root};
use mdast_autolink::{linkify, mdast_to_string, StringifyOptions};
use pretty_assertions::assert_eq;

fn linked(markdown: &str) -> String {
    linkify(markdown, "lemmy.world").unwrap()
}

/// Image alt text containing `]` must be escaped to prevent premature bracket
/// close in the `![alt](url)` syntax.
#[test]
fn image_alt_with_bracket() {
    assert_eq!(linked("![a\\]b](foo.png)"), "![a\\]b](foo.png)\n");
}

/// Image alt text containing `*` must be escaped to prevent accidental
/// emphasis in the `![alt](url)` syntax context.
#[test]
fn image_alt_with_asterisk() {
    assert_eq!(linked("![a\\*b](foo.png)"), "![a\\*b](foo.png)\n");
}

/// A `!` right before a link would turn the link into an image.
#[test]
fn bang_before_link_is_escaped() {
    let tree = Node::Root(Root {
        children: vec![Node::Paragraph(Paragraph {
            children: vec![
                Node::text("wow!"),
                Node::Link(Link {
                    url: "http://a.bc".into(),
                    title: None,
                    children: vec![Node::text("x")],
                }),
            ],
        })],
    });
    assert_eq!(
        mdast_to_string(&tree, &StringifyOptions::default()),
        "wow\\![x](http://a.bc)\n"
    );
}

/// A mention glued to a preceding word is not a mention, and its tail must
/// not be picked up as an email either.
#[test]
fn mention_glued_to_word_stays_text() {
    assert_eq!(
        linked("foo@alice@instance.tld"),
        "foo\\@alice\\@instance.tld\n"
    );
    assert_eq!(
        linked("foo\\@alice\\@instance.tld"),
        "foo\\@alice\\@instance.tld\n"
    );
}

/// A link whose text looks like a URL but points elsewhere keeps its label.
#[test]
fn url_shaped_label_with_other_destination() {
    assert_eq!(
        linked("[http://a.bc](http://x.yz)"),
        "[http://a.bc](http://x.yz)\n"
    );
}

/// The relative mention forms must not fire one character into a path.
#[test]
fn relative_mention_inside_path() {
    assert_eq!(linked("see foo/u/bob@server.tld"), "see foo/u/bob\\@server.tld\n");
}

/// Trailing `)` is only kept when it balances a `(` in the URL.
#[test]
fn unbalanced_closing_paren_is_trimmed() {
    assert_eq!(
        linked("(see https://example.org/a_(b))"),
        "(see <https://example.org/a_(b)>)\n"
    );
}

/// An escaped `_` inside a URL is part of the URL, not a cut point.
#[test]
fn escaped_underscore_inside_url() {
    assert_eq!(
        linked("see https://example.com/a\\_b now"),
        "see <https://example.com/a_b> now\n"
    );
}

/// An escaped `_` in the local part of an email keeps the whole address.
#[test]
fn escaped_underscore_inside_email() {
    assert_eq!(
        linked("mail foo\\_bar@example.com"),
        "mail <foo_bar@example.com>\n"
    );
}

/// `www.foo_bar.com` has an underscore in its second-to-last label, so it is
/// not a domain even when the underscore was escaped.
#[test]
fn escaped_underscore_does_not_cut_www_domain() {
    assert_eq!(linked("www.foo\\_bar.com"), "www\\.foo\\_bar.com\n");
}
