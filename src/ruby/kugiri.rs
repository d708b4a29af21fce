//! Base-text shape rules ("kugiri").
//!
//! Each rule describes one way base text can be delimited in front of a
//! `《`. Rules are ordered by priority; at any scan position the first rule
//! that matches wins.

use super::{ANNOTATION_OPEN, OPEN_MARKER};

/// How a rule recognizes its base text.
#[derive(Clone, Copy)]
pub enum Shape {
    /// `｜` followed by the base text.
    Delimited,
    /// A run of characters: the first must satisfy `first`, the rest `rest`.
    Run {
        first: fn(char) -> bool,
        rest: fn(char) -> bool,
    },
}

/// One named base-text shape.
#[derive(Clone, Copy)]
pub struct ShapeRule {
    pub name: &'static str,
    pub priority: u32,
    pub shape: Shape,
}

impl ShapeRule {
    /// Whether this rule consumes an explicit `｜`.
    #[inline]
    pub fn is_explicit(&self) -> bool {
        matches!(self.shape, Shape::Delimited)
    }

    /// Byte length of the base text starting at the beginning of `text`,
    /// provided it ends exactly before a `《`.
    ///
    /// On failure returns `Err(end)`, where `end` is the byte offset at
    /// which the scan stopped. Any later start position before `end` stops
    /// at the same place, so callers can skip straight past it.
    pub fn base_len(&self, text: &str) -> Result<usize, usize> {
        match self.shape {
            Shape::Delimited => {
                let Some(body) = text.strip_prefix(OPEN_MARKER) else {
                    return Err(0);
                };
                let offset = OPEN_MARKER.len_utf8();
                let end = body
                    .find(|c| c == OPEN_MARKER || c == ANNOTATION_OPEN || c == '\n')
                    .unwrap_or(body.len());
                if end > 0
                    && body[end..].starts_with(ANNOTATION_OPEN)
                    && !escapes_marker(&body[..end])
                {
                    Ok(offset + end)
                } else {
                    Err(offset + end)
                }
            }
            Shape::Run { first, rest } => {
                let mut chars = text.char_indices();
                match chars.next() {
                    Some((_, c)) if first(c) => {}
                    Some((_, c)) => return Err(c.len_utf8()),
                    None => return Err(0),
                }
                let end = chars
                    .find(|&(_, c)| !rest(c))
                    .map_or(text.len(), |(i, _)| i);
                let run = &text[..end];
                if text[end..].starts_with(ANNOTATION_OPEN) && !escapes_marker(run) {
                    Ok(end)
                } else {
                    Err(end)
                }
            }
        }
    }
}

/// `\《` is an escaped marker, not the end of the base text; `\\《` is an
/// escaped backslash followed by a real one.
#[inline]
fn escapes_marker(run: &str) -> bool {
    run.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

impl std::fmt::Debug for ShapeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeRule")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish()
    }
}

/// All shape rules, highest priority first.
pub const SHAPE_RULES: [ShapeRule; 6] = [
    ShapeRule {
        name: "delimited",
        priority: 100,
        shape: Shape::Delimited,
    },
    ShapeRule {
        name: "kanji",
        priority: 99,
        shape: Shape::Run {
            first: is_ideographic,
            rest: is_kanji_rest,
        },
    },
    ShapeRule {
        name: "zenkaku_alphanum",
        priority: 98,
        shape: Shape::Run {
            first: is_zenkaku_alphanum,
            rest: is_zenkaku_alphanum,
        },
    },
    ShapeRule {
        name: "hankaku_alphanum",
        priority: 97,
        shape: Shape::Run {
            first: is_hankaku,
            rest: is_hankaku_rest,
        },
    },
    ShapeRule {
        name: "zenkaku_katakana",
        priority: 96,
        shape: Shape::Run {
            first: is_katakana,
            rest: is_katakana_rest,
        },
    },
    ShapeRule {
        name: "hiragana",
        priority: 95,
        shape: Shape::Run {
            first: is_hiragana_start,
            rest: is_hiragana_rest,
        },
    },
];

/// Unicode `Ideographic` property.
pub fn is_ideographic(c: char) -> bool {
    matches!(c,
        '\u{3006}' | '\u{3007}'
        | '\u{3021}'..='\u{3029}'
        | '\u{3038}'..='\u{303A}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FA6D}'
        | '\u{FA70}'..='\u{FAD9}'
        | '\u{16FE4}'
        | '\u{17000}'..='\u{18CD5}'
        | '\u{1B170}'..='\u{1B2FB}'
        | '\u{20000}'..='\u{2A6DF}'
        | '\u{2A700}'..='\u{2EBEF}'
        | '\u{2F800}'..='\u{2FA1D}'
        | '\u{30000}'..='\u{323AF}')
}

fn is_kanji_rest(c: char) -> bool {
    is_ideographic(c) || matches!(c, 'ヵ' | 'ヶ' | 'ゕ' | '々')
}

fn is_greek(c: char) -> bool {
    matches!(c, '\u{0370}'..='\u{03FF}' | '\u{1F00}'..='\u{1FFF}')
}

fn is_cyrillic(c: char) -> bool {
    matches!(c,
        '\u{0400}'..='\u{052F}'
        | '\u{1C80}'..='\u{1C8F}'
        | '\u{2DE0}'..='\u{2DFF}'
        | '\u{A640}'..='\u{A69F}')
}

/// Full-width Latin letters and digits, Greek, Cyrillic and a few
/// full-width punctuation marks used inside words.
pub fn is_zenkaku_alphanum(c: char) -> bool {
    matches!(c, 'Ａ'..='Ｚ' | 'ａ'..='ｚ' | '０'..='９' | '―' | '＆' | '’' | '，' | '．' | '－')
        || is_greek(c)
        || is_cyrillic(c)
}

/// ASCII, minus line breaks.
pub fn is_hankaku(c: char) -> bool {
    c.is_ascii() && c != '\n' && c != '\r'
}

fn is_hankaku_rest(c: char) -> bool {
    is_hankaku(c) || c == '…'
}

/// Katakana script, including the half-width forms.
pub fn is_katakana(c: char) -> bool {
    matches!(c,
        '\u{30A1}'..='\u{30FA}'
        | '\u{30FD}'..='\u{30FF}'
        | '\u{31F0}'..='\u{31FF}'
        | '\u{32D0}'..='\u{32FE}'
        | '\u{3300}'..='\u{3357}'
        | '\u{FF66}'..='\u{FF6F}'
        | '\u{FF71}'..='\u{FF9D}'
        | '\u{1AFF0}'..='\u{1B000}'
        | '\u{1B120}'..='\u{1B122}'
        | '\u{1B164}'..='\u{1B167}')
}

fn is_katakana_rest(c: char) -> bool {
    is_katakana(c)
        || matches!(c, 'ﾞ' | 'ﾟ' | '゛' | '゜' | '゠' | '-' | 'ー' | 'ｰ' | '・' | 'ヽ' | 'ヾ')
}

fn is_hiragana_start(c: char) -> bool {
    matches!(c, 'あ'..='ゖ')
}

/// Hiragana script.
pub fn is_hiragana(c: char) -> bool {
    matches!(c,
        '\u{3041}'..='\u{3096}'
        | '\u{309D}'..='\u{309F}'
        | '\u{1B001}'..='\u{1B11F}'
        | '\u{1B132}'
        | '\u{1B150}'..='\u{1B152}'
        | '\u{1F200}')
}

fn is_hiragana_rest(c: char) -> bool {
    is_hiragana(c) || matches!(c, 'ﾞ' | 'ﾟ' | '゛' | '゜' | '・' | 'ー' | 'ゝ' | 'ゞ')
}
