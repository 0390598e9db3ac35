use anyhow::bail;
use serde::Deserialize;
use util::IndexMap;

use crate::{FieldDef, Mapping, NestedRef, Rules, SpawnClass, SpawnDef};

/// Symbol mapping tables shared by mapgens and palettes.
#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Legend {
    pub terrain: IndexMap<char, Mapping>,
    pub furniture: IndexMap<char, Mapping>,
    pub traps: IndexMap<char, Mapping>,
    pub fields: IndexMap<char, Rules<FieldDef>>,
    pub item: IndexMap<char, Rules<SpawnDef>>,
    pub items: IndexMap<char, Rules<SpawnDef>>,
    pub monster: IndexMap<char, Rules<SpawnDef>>,
    pub monsters: IndexMap<char, Rules<SpawnDef>>,
    pub vehicles: IndexMap<char, Rules<SpawnDef>>,
    pub nested: IndexMap<char, NestedRef>,
}

fn merge_absent<V: Clone>(to: &mut IndexMap<char, V>, from: &IndexMap<char, V>) {
    for (c, v) in from {
        to.entry(*c).or_insert_with(|| v.clone());
    }
}

impl Legend {
    /// Add symbols from another legend that this one doesn't map yet.
    ///
    /// Each table is merged separately, so a symbol with furniture here can
    /// still pick up terrain from `other`.
    pub fn merge_absent(&mut self, other: &Legend) {
        merge_absent(&mut self.terrain, &other.terrain);
        merge_absent(&mut self.furniture, &other.furniture);
        merge_absent(&mut self.traps, &other.traps);
        merge_absent(&mut self.fields, &other.fields);
        merge_absent(&mut self.item, &other.item);
        merge_absent(&mut self.items, &other.items);
        merge_absent(&mut self.monster, &other.monster);
        merge_absent(&mut self.monsters, &other.monsters);
        merge_absent(&mut self.vehicles, &other.vehicles);
        merge_absent(&mut self.nested, &other.nested);
    }

    pub fn spawn_tables(
        &self,
    ) -> [(&IndexMap<char, Rules<SpawnDef>>, SpawnClass); 5] {
        [
            (&self.item, SpawnClass::Item),
            (&self.items, SpawnClass::ItemGroup),
            (&self.monster, SpawnClass::Monster),
            (&self.monsters, SpawnClass::MonsterGroup),
            (&self.vehicles, SpawnClass::Vehicle),
        ]
    }

    /// Whether any table maps the symbol.
    pub fn maps(&self, c: char) -> bool {
        self.terrain.contains_key(&c)
            || self.furniture.contains_key(&c)
            || self.traps.contains_key(&c)
            || self.fields.contains_key(&c)
            || self.nested.contains_key(&c)
            || self.spawn_tables().iter().any(|(t, _)| t.contains_key(&c))
    }

    pub fn is_empty(&self) -> bool {
        self == &Legend::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (table, _) in self.spawn_tables() {
            for (c, rules) in table {
                for rule in rules.iter() {
                    if let Err(e) = rule.what.validate() {
                        bail!("symbol {c:?}: {e}");
                    }
                }
            }
        }
        Ok(())
    }
}
