// Fixture tests — Markdown in, linked Markdown out.
//
// Each fixture directory contains:
//   input.md     — Markdown input
//   output.md    — expected Markdown output
//   options.json — optional: instance, resourceLink, autolinkLiteral, bullet
//
// These tests run the full pipeline: Markdown → MDAST → transform → Markdown.

mod common;

use pretty_assertions::assert_eq;

fn fixture_test(name: &str) {
    let f = common::load_fixture(name);
    let result = mdast_autolink::linkify_with(&f.input, &f.options);
    assert_eq!(result, f.expected_md, "fixture: {}", name);
}

/// Output fixtures are already linked: running them again changes nothing.
fn fixture_stable(name: &str) {
    let f = common::load_fixture(name);
    let again = mdast_autolink::linkify_with(&f.expected_md, &f.options);
    assert_eq!(again, f.expected_md, "fixture (second pass): {}", name);
}

#[test]
fn fixture_email_and_parenthesized_url() { fixture_test("email-and-parenthesized-url"); }

#[test]
fn fixture_mentions() { fixture_test("mentions"); }

#[test]
fn fixture_www_and_parens() { fixture_test("www-and-parens"); }

#[test]
fn fixture_escaped_literals() { fixture_test("escaped-literals"); }

#[test]
fn fixture_already_linked() { fixture_test("already-linked"); }

#[test]
fn fixture_lists_and_headings() { fixture_test("lists-and-headings"); }

#[test]
fn fixture_options() { fixture_test("options"); }

#[test]
fn fixture_code_untouched() { fixture_test("code-untouched"); }

#[test]
fn stable_email_and_parenthesized_url() { fixture_stable("email-and-parenthesized-url"); }

#[test]
fn stable_mentions() { fixture_stable("mentions"); }

#[test]
fn stable_escaped_literals() { fixture_stable("escaped-literals"); }

#[test]
fn stable_lists_and_headings() { fixture_stable("lists-and-headings"); }
