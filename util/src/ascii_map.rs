use anyhow::bail;
use glam::{ivec2, IVec2};
use serde::{Deserialize, Serialize};

/// Rectangular grid of map symbols read from a list of text rows.
///
/// Unlike free-form text maps, every row must have exactly the same number
/// of characters. Whitespace is a regular symbol and nothing gets trimmed,
/// so a ragged row is an error instead of silently changing the layout.
#[derive(Clone, Default, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AsciiGrid {
    width: i32,
    height: i32,
    cells: Vec<char>,
}

impl AsciiGrid {
    pub fn new<S: AsRef<str>>(
        rows: impl IntoIterator<Item = S>,
    ) -> anyhow::Result<Self> {
        let mut width = None;
        let mut height = 0;
        let mut cells = Vec::new();

        for (y, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            let len = row.chars().count() as i32;
            match width {
                None => width = Some(len),
                Some(w) if w != len => {
                    bail!("row {y} is {len} characters wide, expected {w}")
                }
                _ => {}
            }
            cells.extend(row.chars());
            height += 1;
        }

        Ok(AsciiGrid {
            width: width.unwrap_or(0),
            height,
            cells,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn dim(&self) -> IVec2 {
        ivec2(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Symbol at the given position, `None` outside the grid.
    pub fn get(&self, p: impl Into<IVec2>) -> Option<char> {
        let p = p.into();
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        self.cells.get((p.y * self.width + p.x) as usize).copied()
    }

    /// Iterate positions and symbols in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, char)> + '_ {
        let w = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &c)| (ivec2(i as i32 % w, i as i32 / w), c))
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().collect())
    }
}

impl TryFrom<Vec<String>> for AsciiGrid {
    type Error = anyhow::Error;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        AsciiGrid::new(value)
    }
}

impl From<AsciiGrid> for Vec<String> {
    fn from(value: AsciiGrid) -> Self {
        value.rows().collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn grid_access() {
        let grid = AsciiGrid::new(["ab ", "cde"]).unwrap();
        assert_eq!(grid.dim(), ivec2(3, 2));
        assert_eq!(grid.get([0, 0]), Some('a'));
        assert_eq!(grid.get([2, 0]), Some(' '));
        assert_eq!(grid.get([2, 1]), Some('e'));
        assert_eq!(grid.get([3, 1]), None);
        assert_eq!(grid.get([-1, 0]), None);

        let cells: Vec<_> = grid.iter().collect();
        assert_eq!(cells[4], (ivec2(1, 1), 'd'));
        assert_eq!(grid.rows().collect::<Vec<_>>(), vec!["ab ", "cde"]);
    }

    #[test]
    fn ragged_rows() {
        assert!(AsciiGrid::new(["abc", "ab"]).is_err());
        assert!(serde_json::from_str::<AsciiGrid>(r#"["..", "..."]"#).is_err());
    }

    #[test]
    fn empty_grid() {
        let grid = AsciiGrid::new(Vec::<String>::new()).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.dim(), IVec2::ZERO);
        assert_eq!(grid.iter().count(), 0);
    }
}
