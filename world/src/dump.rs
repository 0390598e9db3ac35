use std::fmt;

use glam::ivec2;
use serde::Serialize;
use util::{HashMap, IndexMap};

use crate::{IdTable, Submap, SUBMAP_SIZE};

/// Text map rendering of a submap for inspecting generator output.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SubmapDump {
    pub map: String,
    pub legend: IndexMap<char, String>,
}

impl SubmapDump {
    pub fn new(submap: &Submap, names: &IdTable) -> Self {
        // XXX Assigns letters in order of first appearance, so the same
        // terrain can get a different letter in different submaps.
        const LEGEND_ALPHABET: &str = ".#ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                       abcdefghijklmnopqrstuvwxyz\
                                       0123456789\
                                       αβγδεζηθικλμξπρστφχψω\
                                       ΓΔΛΞΠΣΦΨΩ";

        let mut letters = LEGEND_ALPHABET.chars();
        let mut rev_legend: HashMap<String, char> = Default::default();
        let mut legend = IndexMap::default();

        let mut spawns = HashMap::default();
        for s in &submap.spawns {
            spawns.entry(s.pos).or_insert(&s.id);
        }

        let mut map = String::new();
        for y in 0..SUBMAP_SIZE {
            for x in 0..SUBMAP_SIZE {
                let p = ivec2(x, y);

                // Show the topmost thing on the tile.
                let name = if let Some(id) = spawns.get(&p) {
                    id.to_string()
                } else if let Some(item) = submap.items(p).first() {
                    item.id.clone()
                } else if !submap.furn(p).is_null() {
                    names.furniture_name(submap.furn(p)).to_owned()
                } else if !submap.trap(p).is_null() {
                    names.trap_name(submap.trap(p)).to_owned()
                } else {
                    names.terrain_name(submap.ter(p)).to_owned()
                };

                let c = if let Some(c) = rev_legend.get(&name) {
                    *c
                } else {
                    let c = letters.next().unwrap_or('?');
                    rev_legend.insert(name.clone(), c);
                    legend.insert(c, name);
                    c
                };

                map.push(c);
            }
            map.push('\n');
        }

        SubmapDump { map, legend }
    }
}

impl fmt::Display for SubmapDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.map)?;
        for (c, name) in &self.legend {
            writeln!(f, "  {c} {name}")?;
        }
        Ok(())
    }
}
