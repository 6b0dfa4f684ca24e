// One handler per autolink pattern.
//
// Each handler receives the candidate match and either builds the link
// node(s) for it or answers `Replacement::NoMatch`, in which case the text is
// left alone and scanning continues one character later.

use super::util::{is_correct_domain, is_valid_start, split_trailing_punctuation};
use crate::find_replace::{MatchContext, Replacement};
use crate::mdast::Node;

/// What a federated mention refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mention {
    /// `!name@server` or `/c/name@server`.
    Community,
    /// `@name@server` or `/u/name@server`.
    User,
}

impl Mention {
    /// Path segment of the mention under the connected instance.
    pub fn path_segment(self) -> &'static str {
        match self {
            Mention::Community => "c",
            Mention::User => "u",
        }
    }
}

/// Bare `http(s)://` URL or `www.` domain.
///
/// Groups: 1 = protocol (or the `www.` prefix), 2 = domain, 3 = path.
pub(crate) fn find_url(ctx: &MatchContext<'_>) -> Replacement {
    let protocol = ctx.group(1).unwrap_or("");
    let domain = ctx.group(2).unwrap_or("");
    let path = ctx.group(3).unwrap_or("");

    if !is_valid_start(ctx.input, ctx.index, false) {
        return Replacement::NoMatch;
    }

    // `www.` has no scheme: it belongs to the domain, and the link gets an
    // implicit `http://` that the displayed text does not show.
    let (prefix, protocol, domain) = if protocol.starts_with(['w', 'W']) {
        ("http://", "", format!("{protocol}{domain}"))
    } else {
        ("", protocol, domain.to_string())
    };

    if !is_correct_domain(&domain) {
        return Replacement::NoMatch;
    }

    let candidate = format!("{domain}{path}");
    let (kept, trimmed) = split_trailing_punctuation(&candidate);
    if kept.is_empty() {
        return Replacement::NoMatch;
    }

    let mut nodes = vec![Node::link(
        format!("{prefix}{protocol}{kept}"),
        format!("{protocol}{kept}"),
    )];
    if let Some(trimmed) = trimmed {
        nodes.push(Node::text(trimmed));
    }
    Replacement::Nodes(nodes)
}

/// Community or user mention, absolute (`!`, `@`) or relative (`/c/`, `/u/`).
///
/// Groups: 1 = `prefix` + name, 2 = server. The link always points at the
/// connected instance; the displayed text is the source as written.
pub(crate) fn find_mention(
    ctx: &MatchContext<'_>,
    instance: &str,
    mention: Mention,
    prefix: &str,
) -> Replacement {
    let (Some(local), Some(server)) = (ctx.group(1), ctx.group(2)) else {
        return Replacement::NoMatch;
    };
    if !is_valid_start(ctx.input, ctx.index, true) || has_invalid_server_end(server) {
        return Replacement::NoMatch;
    }
    let Some(name) = local.strip_prefix(prefix) else {
        return Replacement::NoMatch;
    };

    let url = format!(
        "https://{instance}/{}/{name}@{server}",
        mention.path_segment()
    );
    Replacement::Nodes(vec![Node::link(url, ctx.matched())])
}

/// Bare `local@server` email address.
///
/// Groups: 1 = local part, 2 = server.
pub(crate) fn find_email(ctx: &MatchContext<'_>) -> Replacement {
    let (Some(local), Some(server)) = (ctx.group(1), ctx.group(2)) else {
        return Replacement::NoMatch;
    };
    if !is_valid_start(ctx.input, ctx.index, true) || has_invalid_server_end(server) {
        return Replacement::NoMatch;
    }
    // Suffix of a mention (`!c@…`, `@u@…`): the mention patterns own those,
    // even if the table is reordered.
    if matches!(ctx.previous_char(), Some('!' | '@')) {
        return Replacement::NoMatch;
    }

    Replacement::Nodes(vec![Node::link(
        format!("mailto:{local}@{server}"),
        format!("{local}@{server}"),
    )])
}

fn has_invalid_server_end(server: &str) -> bool {
    server.ends_with(|c: char| c == '-' || c == '_' || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autolink::{COMMUNITY_ABSOLUTE, EMAIL, URL, USER_ABSOLUTE, USER_RELATIVE};
    use regex::Regex;

    /// Run `handler` on the first match of `regex` in `input`.
    fn run(regex: &Regex, input: &str, handler: impl Fn(&MatchContext<'_>) -> Replacement) -> Replacement {
        let caps = regex.captures(input).expect("pattern should match");
        let ctx = MatchContext {
            input,
            index: caps.get(0).unwrap().start(),
            captures: &caps,
        };
        handler(&ctx)
    }

    fn nodes(replacement: Replacement) -> Vec<Node> {
        match replacement {
            Replacement::Nodes(nodes) => nodes,
            Replacement::NoMatch => panic!("expected a replacement"),
        }
    }

    #[test]
    fn test_url_with_protocol() {
        let result = nodes(run(&URL, "https://example.org/a?b=c", find_url));
        assert_eq!(
            result,
            vec![Node::link("https://example.org/a?b=c", "https://example.org/a?b=c")]
        );
    }

    #[test]
    fn test_www_gets_implicit_scheme() {
        let result = nodes(run(&URL, "WWW.Example.org/x", find_url));
        assert_eq!(result, vec![Node::link("http://WWW.Example.org/x", "WWW.Example.org/x")]);
    }

    #[test]
    fn test_url_trailing_punctuation_becomes_text() {
        let result = nodes(run(&URL, "http://example.org).", find_url));
        assert_eq!(
            result,
            vec![Node::link("http://example.org", "http://example.org"), Node::text(").")]
        );
    }

    #[test]
    fn test_url_after_letter_is_rejected() {
        assert_eq!(run(&URL, "xhttp://example.org", find_url), Replacement::NoMatch);
    }

    #[test]
    fn test_url_with_bad_domain_is_rejected() {
        assert_eq!(run(&URL, "http://localhost/x", find_url), Replacement::NoMatch);
        assert_eq!(run(&URL, "www.x_y.com", find_url), Replacement::NoMatch);
    }

    #[test]
    fn test_user_mention_absolute() {
        let result = nodes(run(&USER_ABSOLUTE, "@alice@instance.tld", |ctx| {
            find_mention(ctx, "lemmy.world", Mention::User, "@")
        }));
        assert_eq!(
            result,
            vec![Node::link("https://lemmy.world/u/alice@instance.tld", "@alice@instance.tld")]
        );
    }

    #[test]
    fn test_user_mention_relative_keeps_display() {
        let result = nodes(run(&USER_RELATIVE, "see /u/bob@server.tld", |ctx| {
            find_mention(ctx, "lemmy.world", Mention::User, "/u/")
        }));
        assert_eq!(
            result,
            vec![Node::link("https://lemmy.world/u/bob@server.tld", "/u/bob@server.tld")]
        );
    }

    #[test]
    fn test_community_mention() {
        let result = nodes(run(&COMMUNITY_ABSOLUTE, "!rust@programming.dev", |ctx| {
            find_mention(ctx, "lemmy.world", Mention::Community, "!")
        }));
        assert_eq!(
            result,
            vec![Node::link("https://lemmy.world/c/rust@programming.dev", "!rust@programming.dev")]
        );
    }

    #[test]
    fn test_mention_with_bad_server_end_is_rejected() {
        for input in ["@a@b.c1", "@a@b.c-", "@a@b.c_"] {
            let result = run(&USER_ABSOLUTE, input, |ctx| {
                find_mention(ctx, "lemmy.world", Mention::User, "@")
            });
            assert_eq!(result, Replacement::NoMatch, "{input}");
        }
    }

    #[test]
    fn test_mention_after_slash_is_rejected() {
        let result = run(&USER_ABSOLUTE, "x/@a@b.cd", |ctx| {
            find_mention(ctx, "lemmy.world", Mention::User, "@")
        });
        assert_eq!(result, Replacement::NoMatch);
    }

    #[test]
    fn test_email() {
        let result = nodes(run(&EMAIL, "a.b+c@example.com", find_email));
        assert_eq!(
            result,
            vec![Node::link("mailto:a.b+c@example.com", "a.b+c@example.com")]
        );
    }

    #[test]
    fn test_email_after_mention_prefix_is_rejected() {
        assert_eq!(run(&EMAIL, "@alice@instance.tld", find_email), Replacement::NoMatch);
        assert_eq!(run(&EMAIL, "!rust@instance.tld", find_email), Replacement::NoMatch);
    }

    #[test]
    fn test_email_after_slash_is_rejected() {
        assert_eq!(run(&EMAIL, "/u/bob@server.tld", find_email), Replacement::NoMatch);
    }

    #[test]
    fn test_email_with_numeric_tld_is_rejected() {
        assert_eq!(run(&EMAIL, "a@b.c1", find_email), Replacement::NoMatch);
    }

    #[test]
    fn test_mention_segments() {
        assert_eq!(Mention::Community.path_segment(), "c");
        assert_eq!(Mention::User.path_segment(), "u");
    }
}
