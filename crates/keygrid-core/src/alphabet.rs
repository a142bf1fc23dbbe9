#![forbid(unsafe_code)]

//! Validated key alphabets.

use crate::error::{Axis, GeometryError, Result};

/// An ordered set of distinct uppercase ASCII letters.
///
/// Used for both main-grid axes and the flat sub-grid alphabet. Input is
/// case-insensitive; characters are stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alphabet {
    axis: Axis,
    keys: Vec<char>,
}

impl Alphabet {
    /// Validate and normalize `keys`.
    ///
    /// # Errors
    ///
    /// Fails on an empty string, a non-letter, or a letter that appears
    /// twice (case-insensitively).
    pub fn new(axis: Axis, keys: &str) -> Result<Self> {
        let mut out: Vec<char> = Vec::with_capacity(keys.len());
        for ch in keys.chars() {
            if !ch.is_ascii_alphabetic() {
                return Err(GeometryError::NonAlphabetic { axis, ch });
            }
            let ch = ch.to_ascii_uppercase();
            if out.contains(&ch) {
                return Err(GeometryError::DuplicateKey { axis, ch });
            }
            out.push(ch);
        }
        if out.is_empty() {
            return Err(GeometryError::EmptyAlphabet { axis });
        }
        Ok(Self { axis, keys: out })
    }

    /// Which dimension this alphabet drives.
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Number of keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false for a constructed alphabet; kept for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key at position `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<char> {
        self.keys.get(index).copied()
    }

    /// Position of `ch` (case-insensitive).
    pub fn position(&self, ch: char) -> Option<usize> {
        let ch = ch.to_ascii_uppercase();
        self.keys.iter().position(|&k| k == ch)
    }

    /// Whether `ch` belongs to this alphabet (case-insensitive).
    #[inline]
    pub fn contains(&self, ch: char) -> bool {
        self.position(ch).is_some()
    }

    /// Keys in order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.keys.iter().copied()
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.keys.iter().try_for_each(|c| write!(f, "{c}"))
    }
}
