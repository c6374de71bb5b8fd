use core::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};
use derive_more::Display;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// One side of a stereo see-through display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const ALL: [Eye; 2] = [Eye::Left, Eye::Right];

    pub fn name(self) -> &'static str {
        match self {
            Eye::Left => "Left",
            Eye::Right => "Right",
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "unknown eye {:?}, expected \"left\" or \"right\"", _0)]
pub struct ParseEyeError(pub String);

impl std::error::Error for ParseEyeError {}

impl FromStr for Eye {
    type Err = ParseEyeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Eye::Left),
            "right" | "r" => Ok(Eye::Right),
            _ => Err(ParseEyeError(s.to_owned())),
        }
    }
}

/// A value kept separately for each [`Eye`].
///
/// Nothing is ever shared between the two sides, so calibrating one eye can not
/// disturb the other.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PerEye<T> {
    pub left: T,
    pub right: T,
}

impl<T> PerEye<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn from_fn(mut f: impl FnMut(Eye) -> T) -> Self {
        Self {
            left: f(Eye::Left),
            right: f(Eye::Right),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Eye, &T)> {
        [(Eye::Left, &self.left), (Eye::Right, &self.right)].into_iter()
    }

    pub fn map<U>(self, mut f: impl FnMut(Eye, T) -> U) -> PerEye<U> {
        PerEye {
            left: f(Eye::Left, self.left),
            right: f(Eye::Right, self.right),
        }
    }
}

impl<T> Index<Eye> for PerEye<T> {
    type Output = T;

    fn index(&self, eye: Eye) -> &T {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Eye> for PerEye<T> {
    fn index_mut(&mut self, eye: Eye) -> &mut T {
        match eye {
            Eye::Left => &mut self.left,
            Eye::Right => &mut self.right,
        }
    }
}
