// Context-sensitive escaping for Markdown serialization.
//
// Port of mdast-util-to-markdown/lib/unsafe.js and lib/util/safe.js.
// Only escapes Markdown syntax characters when they would actually trigger
// a construct in the current context: the construct stack, the characters
// around them, and whether they sit at the start of a line.

use std::sync::LazyLock;

use regex::Regex;

use super::State;

/// Constructs the serializer can be inside of while emitting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructName {
    /// Inline content of a paragraph or heading.
    Phrasing,
    Paragraph,
    Heading,
    Emphasis,
    Strong,
    Delete,
    /// `<…>`; content is emitted raw.
    Autolink,
    /// `[label](url)`.
    Link,
    /// The `[…]` text part of a link, image or reference.
    Label,
    Image,
    /// The `[…]` identifier part of a reference or definition.
    Reference,
    Definition,
}

/// A character that must be escaped in some context.
///
/// `before` and `after` are regex character classes (or short expressions)
/// the neighbouring text must match. An `at_break` pattern only applies at
/// the start of a line, where `before` then describes everything between
/// the line start and the character.
#[derive(Debug, Clone, Copy)]
pub struct UnsafePattern {
    pub character: char,
    pub before: Option<&'static str>,
    pub after: Option<&'static str>,
    pub at_break: bool,
    /// Applies only when one of these is open (always, when empty).
    pub in_construct: &'static [ConstructName],
    /// Never applies when one of these is open.
    pub not_in_construct: &'static [ConstructName],
}

const PHRASING: &[ConstructName] = &[ConstructName::Phrasing];
const LABELS: &[ConstructName] = &[ConstructName::Label, ConstructName::Reference];
// Spans whose content is not parsed as phrasing.
const FULL_PHRASING_SPANS: &[ConstructName] = &[ConstructName::Autolink, ConstructName::Reference];
const ASCII_PUNCTUATION: &str = r"[!-/:-@\[-`{-~]";

const fn at_break(character: char, after: Option<&'static str>) -> UnsafePattern {
    UnsafePattern {
        character,
        before: None,
        after,
        at_break: true,
        in_construct: &[],
        not_in_construct: &[],
    }
}

const fn in_phrasing(
    character: char,
    before: Option<&'static str>,
    after: Option<&'static str>,
) -> UnsafePattern {
    UnsafePattern {
        character,
        before,
        after,
        at_break: false,
        in_construct: PHRASING,
        not_in_construct: FULL_PHRASING_SPANS,
    }
}

/// Rules of plain CommonMark plus strikethrough.
pub const BASE: &[UnsafePattern] = &[
    at_break('#', None),
    at_break('>', None),
    at_break('=', None),
    at_break('~', None),
    at_break('+', Some(r"[ \t\r\n]")),
    at_break('-', Some(r"[ \t\r\n-]")),
    at_break('*', Some(r"[ \t\r\n*]")),
    UnsafePattern {
        character: '.',
        before: Some(r"\d+"),
        after: Some(r"[ \t\r\n]"),
        at_break: true,
        in_construct: &[],
        not_in_construct: &[],
    },
    UnsafePattern {
        character: ')',
        before: Some(r"\d+"),
        after: Some(r"[ \t\r\n]"),
        at_break: true,
        in_construct: &[],
        not_in_construct: &[],
    },
    in_phrasing('\\', None, Some(ASCII_PUNCTUATION)),
    in_phrasing('\\', None, Some(r"[\r\n]")),
    in_phrasing('*', None, None),
    in_phrasing('_', None, None),
    in_phrasing('`', None, None),
    in_phrasing('~', None, None),
    in_phrasing('[', None, None),
    in_phrasing('!', None, Some(r"\[")),
    in_phrasing('<', None, Some(r"[!/?A-Za-z]")),
    in_phrasing('&', None, Some(r"[#A-Za-z]")),
    UnsafePattern {
        character: '[',
        before: None,
        after: None,
        at_break: false,
        in_construct: LABELS,
        not_in_construct: &[],
    },
    UnsafePattern {
        character: ']',
        before: None,
        after: None,
        at_break: false,
        in_construct: LABELS,
        not_in_construct: &[],
    },
];

struct Compiled {
    pattern: &'static UnsafePattern,
    before: Option<Regex>,
    after: Option<Regex>,
}

fn compile(patterns: &'static [UnsafePattern]) -> Vec<Compiled> {
    let anchored = |class: &str| Regex::new(&format!("^(?:{class})$")).expect("valid unsafe class");
    patterns
        .iter()
        .map(|pattern| Compiled {
            pattern,
            before: pattern.before.map(anchored),
            after: pattern.after.map(anchored),
        })
        .collect()
}

static BASE_COMPILED: LazyLock<Vec<Compiled>> = LazyLock::new(|| compile(BASE));
static AUTOLINK_COMPILED: LazyLock<Vec<Compiled>> =
    LazyLock::new(|| compile(crate::autolink::UNSAFE));

fn in_scope(stack: &[ConstructName], pattern: &UnsafePattern) -> bool {
    (pattern.in_construct.is_empty() || pattern.in_construct.iter().any(|c| stack.contains(c)))
        && !pattern.not_in_construct.iter().any(|c| stack.contains(c))
}

fn class_matches(regex: Option<&Regex>, value: Option<&str>) -> bool {
    match (regex, value) {
        (None, _) => true,
        (Some(regex), Some(value)) => regex.is_match(value),
        (Some(_), None) => false,
    }
}

/// Escape `value` so that it reads back as the same text.
///
/// `before` and `after` are the characters the caller will emit around it;
/// `None` (or `'\n'` for `before`) means a line boundary.
pub(crate) fn safe(
    state: &State,
    value: &str,
    before: Option<char>,
    after: Option<char>,
) -> String {
    let patterns: Vec<&Compiled> = BASE_COMPILED
        .iter()
        .chain(
            state
                .options
                .autolink_literal
                .then_some(AUTOLINK_COMPILED.iter())
                .into_iter()
                .flatten(),
        )
        .filter(|compiled| in_scope(&state.stack, compiled.pattern))
        .collect();
    if patterns.is_empty() {
        return value.to_string();
    }

    let chars: Vec<(usize, char)> = value.char_indices().collect();
    let mut result = String::with_capacity(value.len());
    // Byte offset where the current line starts, if the line starts inside
    // `value` or right before it.
    let mut line_start = matches!(before, None | Some('\n') | Some('\r')).then_some(0);

    for (i, &(offset, c)) in chars.iter().enumerate() {
        let prev = if i == 0 { before } else { Some(chars[i - 1].1) };
        let next = chars.get(i + 1).map(|&(_, c)| c).or(after);
        let prev_str = prev.map(String::from);
        let next_str = next.map(String::from);
        // Everything between the line start and here, minus indentation.
        let line_prefix = line_start.map(|start| value[start..offset].trim_start_matches([' ', '\t']));

        let unsafe_here = patterns.iter().any(|compiled| {
            if compiled.pattern.character != c {
                return false;
            }
            if !class_matches(compiled.after.as_ref(), next_str.as_deref()) {
                return false;
            }
            if compiled.pattern.at_break {
                match (line_prefix, compiled.before.as_ref()) {
                    (Some(prefix), Some(regex)) => regex.is_match(prefix),
                    (Some(prefix), None) => prefix.is_empty(),
                    (None, _) => false,
                }
            } else {
                class_matches(compiled.before.as_ref(), prev_str.as_deref())
            }
        });

        if unsafe_here {
            if c.is_ascii_punctuation() {
                result.push('\\');
                result.push(c);
            } else {
                result.push_str(&format!("&#x{:X};", c as u32));
            }
        } else {
            result.push(c);
        }

        if c == '\n' || c == '\r' {
            line_start = Some(offset + c.len_utf8());
        }
    }

    result
}
