use super::GestureType::{self, *};
use crate::error::Error;
use std::{fmt, str::FromStr};

/// Which gestures a classifier is willing to evaluate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GestureSet {
    /// Hand, head, arm and armpit scrubbing.
    Tutorial,
    /// Head, armpit and butt scrubbing.
    Shower,
    All,
}

impl GestureSet {
    pub fn gestures(self) -> &'static [GestureType] {
        match self {
            Self::Tutorial => &[RubHands, ScrubHead, ScrubArms, ScrubArmpits],
            Self::Shower => &[ScrubHead, ScrubArmpits, ScrubButt],
            Self::All => &GestureType::ALL,
        }
    }

    pub fn contains(self, gesture: GestureType) -> bool {
        self.gestures().contains(&gesture)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Tutorial => "tutorial",
            Self::Shower => "shower",
            Self::All => "all",
        }
    }
}

impl Default for GestureSet {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for GestureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GestureSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tutorial" => Ok(Self::Tutorial),
            "shower" => Ok(Self::Shower),
            "all" => Ok(Self::All),
            _ => Err(Error::UnknownGestureSet(s.to_owned())),
        }
    }
}
