//! Tag-aware splitting of rendered base text into single characters.
//!
//! `<strong>漢字</strong>` becomes `<strong>漢</strong>` and
//! `<strong>字</strong>`: every character is wrapped in the tags that were
//! open around it, outermost first. Entity references count as one
//! character.

use smallvec::SmallVec;
use thiserror::Error;

use crate::escape::entity_ref_len;
use crate::limits;

/// Why a fragment could not be split.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("unterminated tag at byte {offset}")]
    Unterminated { offset: usize },

    #[error("malformed tag at byte {offset}")]
    Malformed { offset: usize },

    #[error("closing tag </{found}> does not match <{expected}>")]
    Mismatched { expected: String, found: String },

    #[error("closing tag </{0}> has no opening tag")]
    UnexpectedClose(String),

    #[error("tag <{0}> is never closed")]
    Unclosed(String),

    #[error("self-closing or void tag <{0}> cannot wrap a character")]
    SelfClosing(String),

    #[error("tags nested deeper than {0}")]
    TooDeep(usize),
}

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// An opening tag still waiting for its closing tag.
struct OpenTag<'a> {
    name: &'a str,
    /// The opening tag as written, attributes included.
    markup: &'a str,
}

struct Tag<'a> {
    name: &'a str,
    closing: bool,
    self_closing: bool,
}

fn parse_tag(tag: &str, offset: usize) -> Result<Tag<'_>, TagError> {
    let inner = &tag[1..tag.len() - 1];
    let (closing, body) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name_len = body
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
        .count();
    if name_len == 0 || !body.as_bytes()[0].is_ascii_alphabetic() {
        return Err(TagError::Malformed { offset });
    }
    Ok(Tag {
        name: &body[..name_len],
        closing,
        self_closing: !closing && inner.trim_end().ends_with('/'),
    })
}

/// Split `markup` into one unit per visible character.
///
/// # Example
/// ```
/// use furimark::ruby::split_units;
///
/// let units = split_units("<em>漢字</em>&amp;").unwrap();
/// assert_eq!(units, ["<em>漢</em>", "<em>字</em>", "&amp;"]);
/// ```
pub fn split_units(markup: &str) -> Result<Vec<String>, TagError> {
    let bytes = markup.as_bytes();
    let mut stack: SmallVec<[OpenTag<'_>; 4]> = SmallVec::new();
    let mut units = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let unit_len = match bytes[pos] {
            b'<' => {
                let end = memchr::memchr(b'>', &bytes[pos..])
                    .map(|i| pos + i)
                    .ok_or(TagError::Unterminated { offset: pos })?;
                let markup_tag = &markup[pos..=end];
                let tag = parse_tag(markup_tag, pos)?;

                if tag.closing {
                    match stack.pop() {
                        Some(open) if open.name.eq_ignore_ascii_case(tag.name) => {}
                        Some(open) => {
                            return Err(TagError::Mismatched {
                                expected: open.name.to_string(),
                                found: tag.name.to_string(),
                            });
                        }
                        None => return Err(TagError::UnexpectedClose(tag.name.to_string())),
                    }
                } else if tag.self_closing
                    || VOID_ELEMENTS
                        .iter()
                        .any(|v| v.eq_ignore_ascii_case(tag.name))
                {
                    return Err(TagError::SelfClosing(tag.name.to_string()));
                } else {
                    if stack.len() >= limits::MAX_MONO_RUBY_TAG_DEPTH {
                        return Err(TagError::TooDeep(limits::MAX_MONO_RUBY_TAG_DEPTH));
                    }
                    stack.push(OpenTag {
                        name: tag.name,
                        markup: markup_tag,
                    });
                }
                pos = end + 1;
                continue;
            }
            b'&' => entity_ref_len(&markup[pos..]).unwrap_or(1),
            _ => markup[pos..].chars().next().map_or(1, char::len_utf8),
        };

        let text = &markup[pos..pos + unit_len];
        let mut unit = String::with_capacity(text.len() + stack.len() * 16);
        for open in &stack {
            unit.push_str(open.markup);
        }
        unit.push_str(text);
        for open in stack.iter().rev() {
            unit.push_str("</");
            unit.push_str(open.name);
            unit.push('>');
        }
        units.push(unit);
        pos += unit_len;
    }

    match stack.last() {
        Some(open) => Err(TagError::Unclosed(open.name.to_string())),
        None => Ok(units),
    }
}

/// Remove every tag from `markup`, keeping the text between them.
pub fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                // Not a tag after all.
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_characters() {
        assert_eq!(split_units("漢字").unwrap(), ["漢", "字"]);
        assert!(split_units("").unwrap().is_empty());
    }

    #[test]
    fn test_nested_tags_wrap_each_character() {
        let units = split_units("a<strong>b<em>cd</em></strong>").unwrap();
        assert_eq!(
            units,
            [
                "a",
                "<strong>b</strong>",
                "<strong><em>c</em></strong>",
                "<strong><em>d</em></strong>",
            ]
        );
    }

    #[test]
    fn test_attributes_are_kept() {
        let units = split_units("<span class=\"k\">漢字</span>").unwrap();
        assert_eq!(units[1], "<span class=\"k\">字</span>");
    }

    #[test]
    fn test_entities_are_single_units() {
        assert_eq!(split_units("&lt;&#x41;&").unwrap(), ["&lt;", "&#x41;", "&"]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            split_units("<em>a</strong>"),
            Err(TagError::Mismatched {
                expected: "em".into(),
                found: "strong".into()
            })
        );
        assert_eq!(split_units("a</em>"), Err(TagError::UnexpectedClose("em".into())));
        assert_eq!(split_units("<em>a"), Err(TagError::Unclosed("em".into())));
        assert_eq!(split_units("a<br>b"), Err(TagError::SelfClosing("br".into())));
        assert_eq!(split_units("a<x/>"), Err(TagError::SelfClosing("x".into())));
        assert_eq!(split_units("a<em"), Err(TagError::Unterminated { offset: 1 }));
        assert_eq!(split_units("<!-- c -->"), Err(TagError::Malformed { offset: 0 }));

        let deep = "<b>".repeat(limits::MAX_MONO_RUBY_TAG_DEPTH + 1);
        assert_eq!(
            split_units(&deep),
            Err(TagError::TooDeep(limits::MAX_MONO_RUBY_TAG_DEPTH))
        );
    }

    #[test]
    fn test_error_messages() {
        let err = TagError::Mismatched {
            expected: "em".into(),
            found: "b".into(),
        };
        assert_eq!(err.to_string(), "closing tag </b> does not match <em>");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<strong>かく</strong> <em>x</em>"), "かく x");
        assert_eq!(strip_tags("a < b"), "a < b");
    }
}
