// Shared test helpers for mdast-autolink.

use std::fs;
use std::path::Path;

use mdast_autolink::Options;

/// Instance used when a fixture does not name one.
pub const DEFAULT_INSTANCE: &str = "lemmy.world";

/// A fixture's input Markdown, expected output, and options.
pub struct Fixture {
    pub input: String,
    pub expected_md: String,
    pub options: Options,
}

/// Load a test fixture's input Markdown, expected Markdown, and options.
///
/// Fixture directories contain `input.md`, `output.md`, and optionally `options.json`.
pub fn load_fixture(name: &str) -> Fixture {
    let base = Path::new(env!("CARGO_MANIFEST_DIR")).join("test-fixtures").join(name);
    let input = fs::read_to_string(base.join("input.md"))
        .unwrap_or_else(|_| panic!("Missing fixture: {}/input.md", name));
    let expected_md = fs::read_to_string(base.join("output.md"))
        .unwrap_or_else(|_| panic!("Missing fixture: {}/output.md", name));

    let json: serde_json::Value = fs::read_to_string(base.join("options.json"))
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::Value::Null);

    let instance = json.get("instance").and_then(|v| v.as_str()).unwrap_or(DEFAULT_INSTANCE);
    let mut options = Options::new(instance)
        .unwrap_or_else(|err| panic!("fixture {}: bad instance: {}", name, err));

    if let Some(b) = json.get("resourceLink").and_then(|v| v.as_bool()) {
        options = options.with_resource_link(b);
    }
    if let Some(b) = json.get("autolinkLiteral").and_then(|v| v.as_bool()) {
        options = options.with_autolink_literal_escapes(b);
    }
    if let Some(c) = json.get("bullet").and_then(|v| v.as_str()).and_then(|s| s.chars().next()) {
        options = options.with_bullet(c);
    }

    Fixture { input, expected_md, options }
}
