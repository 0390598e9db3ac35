use glam::{ivec2, IVec2};
use serde::Deserialize;

use crate::Mapping;

/// Chunk id that stands for placing nothing.
pub const NULL_CHUNK: &str = "null";

/// Reference to nested mapgens to run at a spot.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct NestedRef {
    pub chunks: Mapping,
    #[serde(default)]
    pub x_delta: Option<i32>,
    #[serde(default)]
    pub y_delta: Option<i32>,
}

impl NestedRef {
    pub fn new(chunks: Mapping) -> Self {
        NestedRef {
            chunks,
            x_delta: None,
            y_delta: None,
        }
    }

    /// Cell of the nested output to copy, `None` to splice all of it.
    pub fn sample_cell(&self) -> Option<IVec2> {
        if self.x_delta.is_none() && self.y_delta.is_none() {
            None
        } else {
            Some(ivec2(
                self.x_delta.unwrap_or(0),
                self.y_delta.unwrap_or(0),
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_nested() {
        let a: NestedRef = serde_json::from_str(
            r#"{"chunks": [["desk_3x2", 2], ["null", 1]]}"#,
        )
        .unwrap();
        assert_eq!(a.sample_cell(), None);

        let b: NestedRef = serde_json::from_str(
            r#"{"chunks": "car_park", "x_delta": 3}"#,
        )
        .unwrap();
        assert_eq!(b.sample_cell(), Some(ivec2(3, 0)));
    }
}
