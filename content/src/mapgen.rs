use std::fmt;

use anyhow::{bail, Context as _};
use glam::{ivec2, IVec2};
use serde::Deserialize;
use util::{AsciiGrid, IndexMap, IndexSet};
use world::{OMT_SIZE, SUBMAP_SIZE};

use crate::{Legend, PaletteRef, Parameter, Placements};

/// What a mapgen is invoked for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MapgenKind {
    /// Generates whole overmap terrain tiles.
    Overmap,
    /// Invoked from another mapgen's nested mapping.
    Nested,
    /// Applied onto already generated submaps.
    Update,
}

impl fmt::Display for MapgenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapgenKind::Overmap => write!(f, "om_terrain"),
            MapgenKind::Nested => write!(f, "nested_mapgen_id"),
            MapgenKind::Update => write!(f, "update_mapgen_id"),
        }
    }
}

pub const DEFAULT_WEIGHT: i32 = 1000;

/// Largest accepted mapgen edge length in tiles.
pub const MAX_MAPGEN_SIZE: i32 = 16 * OMT_SIZE;

fn check_size(size: IVec2) -> anyhow::Result<()> {
    if size.x <= 0 || size.y <= 0 {
        bail!("bad size {}x{}", size.x, size.y);
    }
    if size.x > MAX_MAPGEN_SIZE || size.y > MAX_MAPGEN_SIZE {
        bail!(
            "size {}x{} is over the {MAX_MAPGEN_SIZE} tile limit",
            size.x,
            size.y
        );
    }
    Ok(())
}

/// Number of submaps needed to cover a length of tiles.
fn submap_span(len: i32) -> i32 {
    (len.max(0) as u32).div_ceil(SUBMAP_SIZE as u32) as i32
}

/// Parsed ASCII mapgen definition.
#[derive(Clone, PartialEq, Debug)]
pub struct Mapgen {
    pub id: String,
    pub kind: MapgenKind,
    /// Every name the mapgen is registered under, `id` included.
    pub aliases: Vec<String>,
    pub weight: i32,
    pub size: IVec2,
    pub rows: AsciiGrid,
    pub fill_terrain: Option<String>,
    pub legend: Legend,
    pub placements: Placements,
    pub palettes: Vec<PaletteRef>,
    pub parameters: IndexMap<String, Parameter>,
    pub flags: IndexSet<String>,
}

impl Mapgen {
    /// Empty mapgen of the given size, mostly for building test content.
    pub fn new(id: impl Into<String>, kind: MapgenKind, size: IVec2) -> Self {
        let id = id.into();
        Mapgen {
            aliases: vec![id.clone()],
            id,
            kind,
            weight: DEFAULT_WEIGHT,
            size,
            rows: Default::default(),
            fill_terrain: None,
            legend: Default::default(),
            placements: Default::default(),
            palettes: Default::default(),
            parameters: Default::default(),
            flags: Default::default(),
        }
    }

    /// Mapgen with a symbol grid, sized to fit it.
    pub fn from_rows<S: AsRef<str>>(
        id: impl Into<String>,
        kind: MapgenKind,
        rows: impl IntoIterator<Item = S>,
    ) -> anyhow::Result<Self> {
        let rows = AsciiGrid::new(rows)?;
        if rows.is_empty() {
            bail!("no rows");
        }
        check_size(rows.dim())?;
        let mut ret = Mapgen::new(id, kind, rows.dim());
        ret.rows = rows;
        Ok(ret)
    }

    pub fn width(&self) -> i32 {
        self.size.x
    }

    pub fn height(&self) -> i32 {
        self.size.y
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.cmpge(IVec2::ZERO).all() && p.cmplt(self.size).all()
    }

    /// Symbol at mapgen position, `None` outside the rows.
    pub fn symbol(&self, p: IVec2) -> Option<char> {
        self.rows.get(p)
    }

    /// Size of the mapgen in submaps, partial submaps rounded up.
    pub fn grid_dim(&self) -> IVec2 {
        ivec2(submap_span(self.size.x), submap_span(self.size.y))
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OmTerrain {
    Single(String),
    List(Vec<String>),
    Grid(Vec<Vec<String>>),
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct SerObject {
    fill_ter: Option<String>,
    rows: Vec<String>,
    mapgensize: Option<(i32, i32)>,
    palettes: Vec<PaletteRef>,
    parameters: IndexMap<String, Parameter>,
    flags: IndexSet<String>,
    #[serde(flatten)]
    legend: Legend,
    #[serde(flatten)]
    placements: Placements,
}

#[derive(Deserialize)]
struct SerMapgen {
    om_terrain: Option<OmTerrain>,
    nested_mapgen_id: Option<String>,
    update_mapgen_id: Option<String>,
    weight: Option<i32>,
    #[serde(default)]
    object: SerObject,
}

impl TryFrom<SerMapgen> for Mapgen {
    type Error = anyhow::Error;

    fn try_from(value: SerMapgen) -> Result<Self, Self::Error> {
        let (kind, aliases) = match (
            value.om_terrain,
            value.nested_mapgen_id,
            value.update_mapgen_id,
        ) {
            (Some(om), None, None) => (
                MapgenKind::Overmap,
                match om {
                    OmTerrain::Single(a) => vec![a],
                    OmTerrain::List(a) => a,
                    OmTerrain::Grid(a) => a.into_iter().flatten().collect(),
                },
            ),
            (None, Some(id), None) => (MapgenKind::Nested, vec![id]),
            (None, None, Some(id)) => (MapgenKind::Update, vec![id]),
            (None, None, None) => bail!("mapgen has no id"),
            _ => bail!("mapgen has more than one kind of id"),
        };
        let Some(id) = aliases.first().cloned() else {
            bail!("mapgen has an empty om_terrain list");
        };
        if id.is_empty() {
            bail!("mapgen has an empty id");
        }

        let obj = value.object;
        let rows = AsciiGrid::new(&obj.rows)
            .with_context(|| format!("mapgen {id}"))?;

        let size = match obj.mapgensize {
            Some((w, h)) => {
                if !rows.is_empty() && rows.dim() != ivec2(w, h) {
                    bail!(
                        "mapgen {id}: rows are {}x{}, mapgensize is {w}x{h}",
                        rows.width(),
                        rows.height()
                    );
                }
                ivec2(w, h)
            }
            None if !rows.is_empty() => rows.dim(),
            None => IVec2::splat(OMT_SIZE),
        };
        check_size(size).with_context(|| format!("mapgen {id}"))?;

        obj.legend
            .validate()
            .and_then(|_| obj.placements.validate())
            .with_context(|| format!("mapgen {id}"))?;

        Ok(Mapgen {
            id,
            kind,
            aliases,
            weight: value.weight.unwrap_or(DEFAULT_WEIGHT),
            size,
            rows,
            fill_terrain: obj.fill_ter,
            legend: obj.legend,
            placements: obj.placements,
            palettes: obj.palettes,
            parameters: obj.parameters,
            flags: obj.flags,
        })
    }
}

impl<'de> Deserialize<'de> for Mapgen {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        SerMapgen::deserialize(deserializer)?
            .try_into()
            .map_err(|e: anyhow::Error| serde::de::Error::custom(format!("{e:#}")))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Mapping;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> anyhow::Result<Mapgen> {
        Ok(serde_json::from_str(json)?)
    }

    #[test]
    fn parse_mapgen() {
        let m = parse(
            r####"{
                "type": "mapgen",
                "method": "json",
                "om_terrain": ["shed", "shed_2"],
                "weight": 250,
                "object": {
                    "fill_ter": "t_grass",
                    "rows": ["###", "#.#", "###"],
                    "palettes": ["wooden"],
                    "terrain": {"#": "t_wall_wood"},
                    "place_item": [{"item": "hammer", "x": 1, "y": 1}],
                    "flags": ["ERASE_ALL_BEFORE_PLACING_TERRAIN"]
                }
            }"####,
        )
        .unwrap();

        assert_eq!(m.id, "shed");
        assert_eq!(m.aliases, vec!["shed".to_string(), "shed_2".into()]);
        assert_eq!(m.kind, MapgenKind::Overmap);
        assert_eq!(m.weight, 250);
        assert_eq!(m.size, ivec2(3, 3));
        assert_eq!(m.symbol(ivec2(1, 1)), Some('.'));
        assert_eq!(m.fill_terrain.as_deref(), Some("t_grass"));
        assert_eq!(m.legend.terrain[&'#'], Mapping::single("t_wall_wood"));
        assert_eq!(m.placements.place_item.len(), 1);
        assert!(m.has_flag("ERASE_ALL_BEFORE_PLACING_TERRAIN"));
    }

    #[test]
    fn multi_tile_om_terrain() {
        let m = parse(
            r#"{
                "om_terrain": [["a_0", "a_1"], ["a_2", "a_3"]],
                "object": {"mapgensize": [48, 48], "fill_ter": "t_floor"}
            }"#,
        )
        .unwrap();
        assert_eq!(m.id, "a_0");
        assert_eq!(m.aliases.len(), 4);
        assert_eq!(m.grid_dim(), ivec2(4, 4));
        assert_eq!(m.weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn grid_dim_rounds_up_without_overflow() {
        let dim = |w, h| Mapgen::new("m", MapgenKind::Nested, ivec2(w, h)).grid_dim();
        assert_eq!(dim(1, 12), ivec2(1, 1));
        assert_eq!(dim(13, 24), ivec2(2, 2));
        assert_eq!(dim(i32::MAX, 1), ivec2(i32::MAX / SUBMAP_SIZE + 1, 1));
        assert_eq!(dim(-5, 0), ivec2(0, 0));
    }

    #[test]
    fn default_size() {
        let m = parse(
            r#"{"nested_mapgen_id": "n", "object": {"fill_ter": "t_dirt"}}"#,
        )
        .unwrap();
        assert_eq!(m.size, IVec2::splat(OMT_SIZE));
        assert_eq!(m.kind, MapgenKind::Nested);
    }

    #[test]
    fn validation_errors() {
        // Ragged row.
        assert!(parse(
            r#"{"om_terrain": "x", "object": {"rows": ["...", ".."]}}"#
        )
        .is_err());
        // Rows don't match the declared size.
        assert!(parse(
            r#"{"om_terrain": "x",
                "object": {"mapgensize": [4, 2], "rows": ["...", "..."]}}"#
        )
        .is_err());
        // Oversized.
        assert!(parse(
            r#"{"om_terrain": "x",
                "object": {"mapgensize": [2147483647, 1], "fill_ter": "t_floor"}}"#
        )
        .is_err());
        assert!(parse(
            r#"{"om_terrain": "x", "object": {"mapgensize": [24, 385]}}"#
        )
        .is_err());
        assert!(parse(
            r#"{"om_terrain": "x", "object": {"mapgensize": [384, 384]}}"#
        )
        .is_ok());
        // No id.
        assert!(parse(r#"{"object": {"rows": ["."]}}"#).is_err());
        // Two ids.
        assert!(parse(
            r#"{"om_terrain": "x", "nested_mapgen_id": "y", "object": {}}"#
        )
        .is_err());
        // Spawn with nothing to spawn.
        assert!(parse(
            r#"{"om_terrain": "x",
                "object": {"place_item": [{"x": 1, "y": 1}]}}"#
        )
        .is_err());
    }
}
