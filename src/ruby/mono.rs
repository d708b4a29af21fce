//! Mono-ruby: one `<rt>` per base character.
//!
//! Runs on rendered HTML. A group such as
//! `<ruby>漢字<rt>かん じ</rt></ruby>`, whose ruby text has exactly one
//! space-separated segment per base character, is rewritten to
//! `<ruby>漢<rt>かん</rt>字<rt>じ</rt></ruby>`. Every other group is left
//! as it is.

use memchr::memmem;
use smallvec::SmallVec;

use super::tags::{self, TagError};
use crate::escape::visible_char_count;
use crate::trace::trace_log;

const RUBY_OPEN: &str = "<ruby>";
const RUBY_CLOSE: &str = "</ruby>";
const RT_OPEN: &str = "<rt>";
const RT_CLOSE: &str = "</rt>";
const RP_OPEN: &str = "<rp>";
const RP_CLOSE: &str = "</rp>";

/// Apply mono-ruby redistribution to every ruby group in `html`.
///
/// # Example
/// ```
/// use furimark::ruby::apply_mono_ruby;
///
/// let html = "<p><ruby>漢字<rt>かん じ</rt></ruby></p>\n";
/// assert_eq!(
///     apply_mono_ruby(html),
///     "<p><ruby>漢<rt>かん</rt>字<rt>じ</rt></ruby></p>\n"
/// );
/// ```
pub fn apply_mono_ruby(html: &str) -> String {
    let bytes = html.as_bytes();
    let open_finder = memmem::Finder::new(RUBY_OPEN);
    let close_finder = memmem::Finder::new(RUBY_CLOSE);

    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut pos = 0;

    while let Some(start) = open_finder.find(&bytes[pos..]).map(|i| pos + i) {
        let content_start = start + RUBY_OPEN.len();
        let Some(end) = close_finder
            .find(&bytes[content_start..])
            .map(|i| content_start + i)
        else {
            break;
        };

        out.push_str(&html[pos..content_start]);
        let group = &html[content_start..end];
        match redistribute(group) {
            Ok(Some(units)) => out.push_str(&units),
            Ok(None) => out.push_str(group),
            Err(_err) => {
                trace_log!("mono-ruby: group left unchanged: {}", _err);
                out.push_str(group);
            }
        }
        pos = end;
    }

    out.push_str(&html[pos..]);
    out
}

/// A ruby group taken apart.
#[derive(Debug, PartialEq, Eq)]
struct Group<'a> {
    base: &'a str,
    ruby_text: &'a str,
    /// Contents of the `<rp>` elements around the `<rt>`, if any.
    parens: Option<(&'a str, &'a str)>,
}

/// Split the contents of one `<ruby>` element. `None` when the shape is
/// not one this module produces.
fn parse_group(group: &str) -> Option<Group<'_>> {
    let rt_at = group.find(RT_OPEN)?;
    let (mut base, after) = (&group[..rt_at], &group[rt_at + RT_OPEN.len()..]);
    let rt_end = after.find(RT_CLOSE)?;
    let ruby_text = &after[..rt_end];
    let tail = &after[rt_end + RT_CLOSE.len()..];

    let open_paren = match base.strip_suffix(RP_CLOSE) {
        Some(head) => {
            let rp_at = head.rfind(RP_OPEN)?;
            base = &head[..rp_at];
            Some(&head[rp_at + RP_OPEN.len()..])
        }
        None => None,
    };
    let close_paren = tail
        .strip_prefix(RP_OPEN)
        .and_then(|t| t.strip_suffix(RP_CLOSE));

    let parens = match (open_paren, close_paren, tail.is_empty()) {
        (Some(open), Some(close), _) => Some((open, close)),
        (None, None, true) => None,
        _ => return None,
    };

    Some(Group {
        base,
        ruby_text,
        parens,
    })
}

/// Rewritten group contents, or `Ok(None)` if the group does not qualify.
fn redistribute(group: &str) -> Result<Option<String>, TagError> {
    let Some(parsed) = parse_group(group) else {
        return Ok(None);
    };

    let ruby_text = tags::strip_tags(parsed.ruby_text);
    let segments: SmallVec<[&str; 8]> = ruby_text.split(' ').collect();
    let base_chars = visible_char_count(&tags::strip_tags(parsed.base));
    if segments.len() != base_chars || base_chars == 0 {
        return Ok(None);
    }

    let units = tags::split_units(parsed.base)?;
    if units.len() != segments.len() {
        return Ok(None);
    }

    let mut out = String::with_capacity(group.len() * 2);
    for (unit, segment) in units.iter().zip(segments.iter()) {
        out.push_str(unit);
        if let Some((open, _)) = parsed.parens {
            out.push_str(RP_OPEN);
            out.push_str(open);
            out.push_str(RP_CLOSE);
        }
        out.push_str(RT_OPEN);
        out.push_str(segment);
        out.push_str(RT_CLOSE);
        if let Some((_, close)) = parsed.parens {
            out.push_str(RP_OPEN);
            out.push_str(close);
            out.push_str(RP_CLOSE);
        }
    }
    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group() {
        assert_eq!(
            parse_group("漢字<rt>かん じ</rt>"),
            Some(Group {
                base: "漢字",
                ruby_text: "かん じ",
                parens: None
            })
        );
        assert_eq!(
            parse_group("漢字<rp>(</rp><rt>かん じ</rt><rp>)</rp>"),
            Some(Group {
                base: "漢字",
                ruby_text: "かん じ",
                parens: Some(("(", ")"))
            })
        );
        assert_eq!(parse_group("漢字"), None);
        assert_eq!(parse_group("漢字<rt>x</rt>junk"), None);
    }

    #[test]
    fn test_count_mismatch_is_unchanged() {
        let html = "<ruby>素晴らしい<rt>Wonderful</rt></ruby>";
        assert_eq!(apply_mono_ruby(html), html);
    }

    #[test]
    fn test_tags_around_base_characters() {
        let html = "<ruby><strong>漢字</strong><rt>かん じ</rt></ruby>";
        assert_eq!(
            apply_mono_ruby(html),
            "<ruby><strong>漢</strong><rt>かん</rt><strong>字</strong><rt>じ</rt></ruby>"
        );
    }

    #[test]
    fn test_ruby_text_markup_is_stripped() {
        let html = "<ruby>漢字<rt><em>かん</em> じ</rt></ruby>";
        assert_eq!(
            apply_mono_ruby(html),
            "<ruby>漢<rt>かん</rt>字<rt>じ</rt></ruby>"
        );
    }

    #[test]
    fn test_parentheses_are_repeated() {
        let html = "<ruby>漢字<rp>(</rp><rt>かん じ</rt><rp>)</rp></ruby>";
        assert_eq!(
            apply_mono_ruby(html),
            "<ruby>漢<rp>(</rp><rt>かん</rt><rp>)</rp>字<rp>(</rp><rt>じ</rt><rp>)</rp></ruby>"
        );
    }

    #[test]
    fn test_entities_count_once() {
        let html = "<ruby>A&amp;B<rt>えー あんど びー</rt></ruby>";
        assert_eq!(
            apply_mono_ruby(html),
            "<ruby>A<rt>えー</rt>&amp;<rt>あんど</rt>B<rt>びー</rt></ruby>"
        );
    }

    #[test]
    fn test_broken_markup_is_unchanged() {
        let html = "<ruby><em>漢字</b><rt>かん じ</rt></ruby>";
        assert_eq!(apply_mono_ruby(html), html);
        let html = "<ruby>漢<br>字<rt>かん じ</rt></ruby>";
        assert_eq!(apply_mono_ruby(html), html);
    }

    #[test]
    fn test_multiple_groups_and_surroundings() {
        let html = "<p>a<ruby>漢字<rt>かん じ</rt></ruby>b<ruby>字<rt>じ</rt></ruby><ruby>x";
        assert_eq!(
            apply_mono_ruby(html),
            "<p>a<ruby>漢<rt>かん</rt>字<rt>じ</rt></ruby>b<ruby>字<rt>じ</rt></ruby><ruby>x"
        );
    }

    #[test]
    fn test_empty_segments_count() {
        let html = "<ruby>漢字<rt>かん </rt></ruby>";
        assert_eq!(
            apply_mono_ruby(html),
            "<ruby>漢<rt>かん</rt>字<rt></rt></ruby>"
        );
    }
}
