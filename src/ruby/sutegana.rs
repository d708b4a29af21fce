//! Small kana ("sutegana") normalization for ruby text.
//!
//! Ruby is typeset small already, so small kana inside it are often
//! written at full size (`しよう` for `しょう`). The walk over a ruby text
//! subtree also counts its visible characters.

use std::borrow::Cow;

use rustc_hash::FxHashSet;

use crate::tree::{NodeId, NodeKind, Tree};

/// Small kana and their full-size forms.
///
/// Small forms without a full-size counterpart that survives conversion
/// (ゕ, ゖ, ㇰ and the other small katakana extensions) are not listed.
pub const SUTEGANA: [(char, char); 22] = [
    ('ぁ', 'あ'),
    ('ぃ', 'い'),
    ('ぅ', 'う'),
    ('ぇ', 'え'),
    ('ぉ', 'お'),
    ('っ', 'つ'),
    ('ゃ', 'や'),
    ('ゅ', 'ゆ'),
    ('ょ', 'よ'),
    ('ゎ', 'わ'),
    ('ァ', 'ア'),
    ('ィ', 'イ'),
    ('ゥ', 'ウ'),
    ('ェ', 'エ'),
    ('ォ', 'オ'),
    ('ヵ', 'カ'),
    ('ヶ', 'ケ'),
    ('ッ', 'ツ'),
    ('ャ', 'ヤ'),
    ('ュ', 'ユ'),
    ('ョ', 'ヨ'),
    ('ヮ', 'ワ'),
];

#[inline]
fn full_size(c: char) -> Option<char> {
    SUTEGANA
        .iter()
        .find(|&&(small, _)| small == c)
        .map(|&(_, full)| full)
}

/// Replace every small kana in `text` with its full-size form.
///
/// # Example
/// ```
/// use furimark::ruby::normalize_small_kana;
///
/// assert_eq!(normalize_small_kana("かくちょう"), "かくちよう");
/// assert_eq!(normalize_small_kana("abc"), "abc");
/// ```
pub fn normalize_small_kana(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| full_size(c).is_some()) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().map(|c| full_size(c).unwrap_or(c)).collect())
}

/// Walk the subtree below `ruby_text` depth first, count the characters of
/// its text leaves and, when `enabled`, normalize their small kana.
///
/// Leaves already in `visited` are skipped, so walking a subtree again
/// neither rewrites nor counts anything twice. Returns the count of the
/// newly visited leaves; the caller decides where to keep it.
pub fn transliterate(
    tree: &mut Tree,
    ruby_text: NodeId,
    enabled: bool,
    visited: &mut FxHashSet<NodeId>,
) -> usize {
    let leaves: Vec<NodeId> = tree
        .descendants(ruby_text)
        .filter(|&id| tree.kind(id).literal().is_some())
        .collect();

    let mut total = 0;
    for id in leaves {
        if !visited.insert(id) {
            continue;
        }
        if let NodeKind::Text(s) | NodeKind::Code(s) = tree.kind_mut(id) {
            total += s.chars().count();
            if enabled {
                if let Cow::Owned(normalized) = normalize_small_kana(s) {
                    *s = normalized;
                }
            }
        }
    }
    total
}
