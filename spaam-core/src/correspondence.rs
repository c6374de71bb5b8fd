use crate::{ScreenPoint, WorldPoint};
use core::slice;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// One confirmed alignment between the tracked point and a displayed target.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CorrespondencePair {
    pub world: WorldPoint,
    pub screen: ScreenPoint,
}

impl CorrespondencePair {
    pub fn new(world: WorldPoint, screen: ScreenPoint) -> Self {
        Self { world, screen }
    }
}

/// All the alignments collected for one eye, in the order they were confirmed.
///
/// The set only grows. The first pair is significant: the sign of the recovered
/// projection is chosen so that this pair lies in front of the viewer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(Serialize, Deserialize),
    serde(transparent)
)]
pub struct CorrespondenceSet {
    pairs: Vec<CorrespondencePair>,
}

impl CorrespondenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pair: CorrespondencePair) {
        self.pairs.push(pair);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The earliest confirmed pair, if any.
    pub fn first(&self) -> Option<&CorrespondencePair> {
        self.pairs.first()
    }

    pub fn iter(&self) -> slice::Iter<'_, CorrespondencePair> {
        self.pairs.iter()
    }

    pub fn as_slice(&self) -> &[CorrespondencePair] {
        &self.pairs
    }
}

impl From<Vec<CorrespondencePair>> for CorrespondenceSet {
    fn from(pairs: Vec<CorrespondencePair>) -> Self {
        Self { pairs }
    }
}

impl FromIterator<CorrespondencePair> for CorrespondenceSet {
    fn from_iter<I: IntoIterator<Item = CorrespondencePair>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl Extend<CorrespondencePair> for CorrespondenceSet {
    fn extend<I: IntoIterator<Item = CorrespondencePair>>(&mut self, iter: I) {
        self.pairs.extend(iter);
    }
}

impl<'a> IntoIterator for &'a CorrespondenceSet {
    type Item = &'a CorrespondencePair;
    type IntoIter = slice::Iter<'a, CorrespondencePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl AsRef<[CorrespondencePair]> for CorrespondenceSet {
    fn as_ref(&self) -> &[CorrespondencePair] {
        self.as_slice()
    }
}
