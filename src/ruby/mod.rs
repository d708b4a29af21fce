//! Japanese ruby (furigana) annotations.
//!
//! Input notation:
//!
//! - `｜base《ruby》` marks the base text explicitly.
//! - `漢字《かんじ》` lets the base text be found by its character class
//!   (see [`kugiri`]).
//! - `\｜`, `\《` and `\》` produce the literal marker.
//!
//! Recognition runs inside the inline scan loop; the pieces here are the
//! shape rules, the opener/closer matching helpers, the pairing procedure
//! that builds the [`Ruby`](crate::tree::NodeKind::Ruby) node, and the
//! post-render mono-ruby pass.

pub mod kugiri;
pub mod mono;
pub(crate) mod pairing;
pub(crate) mod parentheses;
pub(crate) mod parser;
pub mod sutegana;
pub mod tags;

pub use kugiri::{SHAPE_RULES, ShapeRule};
pub use mono::apply_mono_ruby;
pub use sutegana::normalize_small_kana;
pub use tags::{TagError, split_units};

/// Explicit base-text separator.
pub const OPEN_MARKER: char = '｜';
/// Starts the ruby text.
pub const ANNOTATION_OPEN: char = '《';
/// Ends the ruby text.
pub const ANNOTATION_CLOSE: char = '》';

/// Check if `c` is one of the three ruby markers.
#[inline]
pub fn is_marker(c: char) -> bool {
    matches!(c, OPEN_MARKER | ANNOTATION_OPEN | ANNOTATION_CLOSE)
}
