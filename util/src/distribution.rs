use std::{fmt, ops::RangeInclusive};

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An inclusive integer range that is sampled uniformly.
///
/// Serialized as a plain integer when the range is a single value and as a
/// `[min, max]` pair otherwise. A reversed pair is normalized so that `min`
/// is always the smaller end.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct IntRange {
    min: i32,
    max: i32,
}

impl IntRange {
    pub fn new(min: i32, max: i32) -> Self {
        IntRange {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn single(value: i32) -> Self {
        IntRange {
            min: value,
            max: value,
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_single(&self) -> bool {
        self.min == self.max
    }

    pub fn contains(&self, x: i32) -> bool {
        (self.min..=self.max).contains(&x)
    }

    /// Draw a value from the range. Single-value ranges don't touch the rng.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        if self.is_single() {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

impl Default for IntRange {
    fn default() -> Self {
        IntRange::single(0)
    }
}

impl From<i32> for IntRange {
    fn from(value: i32) -> Self {
        IntRange::single(value)
    }
}

impl From<RangeInclusive<i32>> for IntRange {
    fn from(range: RangeInclusive<i32>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..={}", self.min, self.max)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SerIntRange {
    Single(i32),
    Pair((i32, i32)),
    Wrapped((i32,)),
}

impl<'de> Deserialize<'de> for IntRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match SerIntRange::deserialize(deserializer)? {
            SerIntRange::Single(a) | SerIntRange::Wrapped((a,)) => {
                IntRange::single(a)
            }
            SerIntRange::Pair((a, b)) => IntRange::new(a, b),
        })
    }
}

impl Serialize for IntRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.is_single() {
            self.min.serialize(serializer)
        } else {
            (self.min, self.max).serialize(serializer)
        }
    }
}
