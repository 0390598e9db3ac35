use std::sync::{Arc, RwLock};

use rand::Rng;
use util::{HashMap, HashSet, IndexMap, WeightedList};
use world::IdTable;

use crate::{resolve, Legend, Mapgen, MapgenKind, Palette, Resolved};

/// Collects content definitions before freezing them into a `Registry`.
#[derive(Default, Debug)]
pub struct RegistryBuilder {
    mapgens: Vec<Mapgen>,
    palettes: IndexMap<String, Palette>,
}

impl RegistryBuilder {
    pub fn add_mapgen(&mut self, mapgen: Mapgen) {
        self.mapgens.push(mapgen);
    }

    /// Add a palette, replacing any earlier palette with the same id.
    pub fn add_palette(&mut self, palette: Palette) {
        if self.palettes.contains_key(&palette.id) {
            log::debug!("palette {} redefined", palette.id);
        }
        self.palettes.insert(palette.id.clone(), palette);
    }

    pub fn build(self) -> Registry {
        let mut ret = Registry {
            palettes: self.palettes,
            ..Default::default()
        };

        for mapgen in self.mapgens {
            let mapgen = Arc::new(mapgen);
            let table = match mapgen.kind {
                MapgenKind::Overmap => &mut ret.overmap,
                MapgenKind::Nested => &mut ret.nested,
                MapgenKind::Update => &mut ret.update,
            };
            for name in &mapgen.aliases {
                table.entry(name.clone()).or_default().push(mapgen.clone());
            }
        }

        ret
    }
}

type Table = IndexMap<String, Vec<Arc<Mapgen>>>;

/// Frozen collection of mapgens and palettes.
///
/// Several mapgens can share an id, generation picks between them by
/// weight.
#[derive(Default, Debug)]
pub struct Registry {
    overmap: Table,
    nested: Table,
    update: Table,
    palettes: IndexMap<String, Palette>,
    /// Parameterless resolutions keyed by mapgen allocation. The entry
    /// holds on to the mapgen so the address can't be reused while cached.
    resolved: RwLock<HashMap<usize, (Arc<Mapgen>, Arc<Resolved<'static>>)>>,
}

impl Registry {
    fn table(&self, kind: MapgenKind) -> &Table {
        match kind {
            MapgenKind::Overmap => &self.overmap,
            MapgenKind::Nested => &self.nested,
            MapgenKind::Update => &self.update,
        }
    }

    /// First mapgen registered under the id, overmap mapgens first.
    pub fn get_mapgen_by_id(&self, id: &str) -> Option<&Arc<Mapgen>> {
        [MapgenKind::Overmap, MapgenKind::Nested, MapgenKind::Update]
            .into_iter()
            .find_map(|kind| self.mapgens(kind, id).first())
    }

    /// All mapgens of a kind registered under the id.
    pub fn mapgens(&self, kind: MapgenKind, id: &str) -> &[Arc<Mapgen>] {
        self.table(kind).get(id).map_or(&[], |a| a.as_slice())
    }

    /// Pick one of the mapgens of the id in proportion to weight.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        kind: MapgenKind,
        id: &str,
        rng: &mut R,
    ) -> Option<&Arc<Mapgen>> {
        let candidates = self.mapgens(kind, id);
        if candidates.len() == 1 {
            return candidates.first();
        }
        let list: WeightedList<&Arc<Mapgen>> = candidates
            .iter()
            .map(|a| (a, a.weight.max(0) as u32))
            .collect();
        list.pick(rng).copied()
    }

    pub fn get_palette_by_id(&self, id: &str) -> Option<&Palette> {
        self.palettes.get(id)
    }

    pub fn ids(&self, kind: MapgenKind) -> impl Iterator<Item = &str> + '_ {
        self.table(kind).keys().map(|a| a.as_str())
    }

    /// Resolve a mapgen without parameters, remembering the result.
    pub fn resolved(&self, mapgen: &Arc<Mapgen>) -> Arc<Resolved<'static>> {
        let key = Arc::as_ptr(mapgen) as usize;
        if let Some(ret) = self.resolved.read().ok().and_then(|c| {
            c.get(&key)
                .filter(|(m, _)| Arc::ptr_eq(m, mapgen))
                .map(|(_, r)| r.clone())
        }) {
            return ret;
        }

        let ret = Arc::new(resolve(mapgen, self).into_owned());
        if let Ok(mut cache) = self.resolved.write() {
            cache.insert(key, (mapgen.clone(), ret.clone()));
        }
        ret
    }

    /// Name table with every terrain, furniture, trap and field name the
    /// content mentions.
    pub fn id_table(&self) -> IdTable {
        let mut ret = IdTable::default();

        for palette in self.palettes.values() {
            add_legend_names(&mut ret, &palette.legend);
        }

        let mut seen = HashSet::default();
        for mapgen in self
            .overmap
            .values()
            .chain(self.nested.values())
            .chain(self.update.values())
            .flatten()
        {
            // Mapgens with several aliases show up more than once.
            if !seen.insert(Arc::as_ptr(mapgen)) {
                continue;
            }

            add_legend_names(&mut ret, &mapgen.legend);
            if let Some(fill) = &mapgen.fill_terrain {
                ret.add_terrain(fill);
            }
            let p = &mapgen.placements;
            for a in &p.place_terrain {
                for name in a.rule.what.id.ids() {
                    ret.add_terrain(name);
                }
            }
            for a in &p.place_furniture {
                for name in a.rule.what.id.ids() {
                    ret.add_furniture(name);
                }
            }
            for a in &p.place_traps {
                for name in a.rule.what.id.ids() {
                    ret.add_trap(name);
                }
            }
            for a in &p.place_fields {
                ret.add_field(&a.rule.what.field);
            }
        }

        ret
    }
}

fn add_legend_names(table: &mut IdTable, legend: &Legend) {
    for name in legend.terrain.values().flat_map(|m| m.ids()) {
        table.add_terrain(name);
    }
    for name in legend.furniture.values().flat_map(|m| m.ids()) {
        table.add_furniture(name);
    }
    for name in legend.traps.values().flat_map(|m| m.ids()) {
        table.add_trap(name);
    }
    for rule in legend.fields.values().flat_map(|a| a.iter()) {
        table.add_field(&rule.what.field);
    }
}
