//! DoS prevention constants.
//!
//! These limits prevent pathological inputs from causing
//! quadratic or worse time complexity.

/// Maximum delimiter stack size per inline pass
pub const MAX_DELIMITER_STACK: usize = 4096;

/// Longest `*`/`_` run that still acts as a delimiter
/// Longer runs are treated as literal text
pub const MAX_EMPHASIS_RUN: usize = 64;

/// Maximum backtick run length for code spans (prevents O(n^2) matching)
/// Longer runs are treated as literal text
pub const MAX_CODE_SPAN_BACKTICKS: usize = 32;

/// Longest entity reference recognized, `&` and `;` included
pub const MAX_ENTITY_LEN: usize = 33;

/// Maximum tag nesting inside a ruby base during mono-ruby splitting
pub const MAX_MONO_RUBY_TAG_DEPTH: usize = 16;
