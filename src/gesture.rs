//! Gesture categories and model vocabularies.
//!
//! Different classifier model families predict different gesture vocabularies (a 7-class and a
//! 13-class family have shipped so far), so the vocabulary is configuration loaded alongside the
//! model rather than a fixed enum. Enumeration value 0 is reserved for [`Gesture::NONE`], which no
//! classifier output maps to; it marks hands for which no gesture could be determined.

use std::fmt;

use itertools::Itertools;

/// A gesture category in a [`GestureSet`]'s enumeration space.
///
/// Value 0 is the reserved [`Gesture::NONE`] sentinel; named gestures occupy values `1..=N`.
/// Resolving a gesture back to its name requires the [`GestureSet`] it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gesture(usize);

impl Gesture {
    /// The reserved "no gesture" sentinel.
    pub const NONE: Gesture = Gesture(0);

    /// Returns this gesture's enumeration value ([`Gesture::NONE`] is 0).
    pub fn value(self) -> usize {
        self.0
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// An ordered gesture vocabulary.
///
/// The vocabulary is a pure function of the classifier's output index space: output index `i`
/// names gesture `names[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureSet {
    names: Vec<String>,
}

impl GestureSet {
    /// Creates a vocabulary from an ordered list of gesture names.
    ///
    /// The order must match the classifier's output index space. [`Gesture::NONE`] is reserved
    /// implicitly and must not be part of the list.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The 7-gesture vocabulary of the basic hand model family.
    pub fn basic() -> Self {
        Self::new(["three", "peace", "fist", "palm", "four", "ok", "one"])
    }

    /// The 13-gesture vocabulary of the extended hand model family.
    pub fn extended() -> Self {
        Self::new([
            "three", "peace", "fist", "palm", "four", "ok", "one", "two_up", "stop", "like",
            "dislike", "call", "rock",
        ])
    }

    /// Returns the number of named gestures (excluding the reserved [`Gesture::NONE`]).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Maps a raw classifier output index to a gesture.
    ///
    /// Output index 0 maps to enumeration value 1, since value 0 is reserved for
    /// [`Gesture::NONE`]. Out-of-range indices degrade to [`Gesture::NONE`] instead of failing;
    /// a misbehaving classifier should read as "no gesture", not crash the consumer.
    pub fn map_index(&self, index: usize) -> Gesture {
        if index < self.names.len() {
            Gesture(index + 1)
        } else {
            log::warn!(
                "classifier produced out-of-range index {index} (vocabulary has {} gestures)",
                self.names.len(),
            );
            Gesture::NONE
        }
    }

    /// Returns a gesture's name, or `"none"` for [`Gesture::NONE`] and out-of-vocabulary values.
    pub fn name(&self, gesture: Gesture) -> &str {
        match gesture.0.checked_sub(1).and_then(|i| self.names.get(i)) {
            Some(name) => name,
            None => "none",
        }
    }

    /// Formats a frame result for display, e.g. `peace, fist`.
    pub fn format_frame(&self, gestures: &[Gesture]) -> String {
        gestures.iter().map(|&g| self.name(g)).join(", ")
    }
}

impl fmt::Display for GestureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names.iter().join(", "))
    }
}
