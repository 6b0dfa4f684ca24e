// Validity checks shared by the autolink handlers.

use std::sync::LazyLock;

use regex::Regex;

/// Unicode punctuation and symbols (general categories P* and S*), which
/// include every ASCII punctuation character.
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{P}\p{S}]$").expect("valid punctuation class"));

/// Characters conventionally not part of a URL when they end it.
const TRAILING_PUNCTUATION: &[char] = &[
    '!', '"', '&', '\'', ')', ',', '.', ':', ';', '<', '>', '?', ']', '}',
];

/// Whether an autolink may start at byte offset `index` of `text`.
///
/// The previous character must be absent, whitespace or punctuation. With
/// `forbid_slash`, a preceding `/` is refused too, so that `/u/name@server`
/// is never picked up one character in as a plain email.
pub(crate) fn is_valid_start(text: &str, index: usize, forbid_slash: bool) -> bool {
    let Some(previous) = text[..index].chars().next_back() else {
        return true;
    };
    if forbid_slash && previous == '/' {
        return false;
    }
    previous.is_whitespace() || is_punctuation(previous)
}

pub(crate) fn is_punctuation(c: char) -> bool {
    let mut buf = [0u8; 4];
    PUNCTUATION.is_match(c.encode_utf8(&mut buf))
}

/// Whether `domain` looks enough like a host name to anchor a link.
pub(crate) fn is_correct_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return false;
    }
    labels[labels.len() - 2..].iter().all(|label| {
        !label.contains('_') && label.chars().any(|c| c.is_ascii_alphanumeric())
    })
}

/// Split trailing punctuation off a greedily matched URL.
///
/// Closing parens are given back to the URL while it has unbalanced opening
/// parens, so `…/Example_(disambiguation)` keeps its `)`.
pub(crate) fn split_trailing_punctuation(candidate: &str) -> (&str, Option<&str>) {
    let trail_len: usize = candidate
        .chars()
        .rev()
        .take_while(|c| TRAILING_PUNCTUATION.contains(c))
        .map(char::len_utf8)
        .sum();
    if trail_len == 0 {
        return (candidate, None);
    }

    let mut split = candidate.len() - trail_len;
    let opening = candidate[..split].matches('(').count();
    let mut closing = candidate[..split].matches(')').count();

    while opening > closing {
        let Some(paren) = candidate[split..].find(')') else {
            break;
        };
        split += paren + 1;
        closing += 1;
    }

    let (kept, trimmed) = candidate.split_at(split);
    (kept, (!trimmed.is_empty()).then_some(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_of_text_is_valid() {
        assert!(is_valid_start("http://a.bc", 0, false));
        assert!(is_valid_start("a@b.cd", 0, true));
    }

    #[test]
    fn test_start_after_whitespace_or_punctuation() {
        assert!(is_valid_start(" x", 1, false));
        assert!(is_valid_start("\u{3000}x", 3, false));
        assert!(is_valid_start("(x", 1, false));
        assert!(is_valid_start("«x", 2, false));
        assert!(is_valid_start("/x", 1, false));
    }

    #[test]
    fn test_start_after_word_character_is_invalid() {
        assert!(!is_valid_start("xhttp://a.bc", 1, false));
        assert!(!is_valid_start("9a@b.cd", 1, true));
        assert!(!is_valid_start("éa@b.cd", 2, true));
    }

    #[test]
    fn test_slash_forbidden_when_asked() {
        assert!(!is_valid_start("/u/a@b.cd", 3, true));
        assert!(is_valid_start("/u/a@b.cd", 3, false));
    }

    #[test]
    fn test_correct_domains() {
        assert!(is_correct_domain("example.org"));
        assert!(is_correct_domain("www.example.org"));
        assert!(is_correct_domain("my_host.example.org"));
        assert!(is_correct_domain("a-b.c9"));
    }

    #[test]
    fn test_incorrect_domains() {
        assert!(!is_correct_domain("localhost"));
        assert!(!is_correct_domain("a..b"));
        assert!(!is_correct_domain("example.org."));
        assert!(!is_correct_domain(".example.org"));
        assert!(!is_correct_domain("example.--"));
        assert!(!is_correct_domain("my_host.org"));
        assert!(!is_correct_domain("example.o_g"));
        assert!(!is_correct_domain("www."));
    }

    #[test]
    fn test_domain_check_is_stable() {
        for domain in ["example.org", "a..b", "x.y_z", ""] {
            assert_eq!(is_correct_domain(domain), is_correct_domain(domain));
        }
    }

    #[test]
    fn test_split_without_trailing_punctuation() {
        assert_eq!(split_trailing_punctuation("example.org/x"), ("example.org/x", None));
    }

    #[test]
    fn test_split_trims_sentence_punctuation() {
        assert_eq!(
            split_trailing_punctuation("example.org/x)."),
            ("example.org/x", Some(")."))
        );
        assert_eq!(
            split_trailing_punctuation("example.org?!\"'"),
            ("example.org", Some("?!\"'"))
        );
    }

    #[test]
    fn test_split_keeps_balanced_parens() {
        assert_eq!(
            split_trailing_punctuation("example.org/wiki/Example_(disambiguation)"),
            ("example.org/wiki/Example_(disambiguation)", None)
        );
        assert_eq!(
            split_trailing_punctuation("example.org/wiki/Example_(disambiguation)."),
            ("example.org/wiki/Example_(disambiguation)", Some("."))
        );
        assert_eq!(
            split_trailing_punctuation("example.org/a_(b_(c))),"),
            ("example.org/a_(b_(c))", Some("),"))
        );
    }

    #[test]
    fn test_split_gives_back_paren_after_other_punctuation() {
        assert_eq!(split_trailing_punctuation("example.org/(x.)"), ("example.org/(x.)", None));
    }

    #[test]
    fn test_split_all_punctuation() {
        assert_eq!(split_trailing_punctuation(")."), ("", Some(").")));
    }

    #[test]
    fn test_split_reconstructs_input() {
        for s in [
            "",
            "a",
            "a.b).",
            "(a.b)",
            "x(y)z)).",
            "((a)))",
            "a&lt;",
            "é.",
        ] {
            let (kept, trimmed) = split_trailing_punctuation(s);
            assert_eq!(format!("{kept}{}", trimmed.unwrap_or("")), s);
            assert!(kept.matches(')').count() <= kept.matches('(').count(), "{s:?}");
        }
    }
}
