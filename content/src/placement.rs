use anyhow::bail;
use rand::Rng;
use serde::{Deserialize, Deserializer};
use serde_with::{formats::PreferMany, As, OneOrMany, Same};
use util::{IntRange, RngExt};
use world::SpawnKind;

use crate::{Mapping, NestedRef};

fn hundred() -> u32 {
    100
}

fn one() -> IntRange {
    IntRange::single(1)
}

/// Something with a percent chance to happen, repeated a number of times.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Rule<T> {
    #[serde(flatten)]
    pub what: T,
    #[serde(default = "hundred")]
    pub chance: u32,
    #[serde(default = "one", alias = "count")]
    pub repeat: IntRange,
}

impl<T> Rule<T> {
    pub fn new(what: T) -> Self {
        Rule {
            what,
            chance: 100,
            repeat: one(),
        }
    }

    /// Roll the number of times the rule fires.
    ///
    /// Every repetition gets its own chance roll.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let n = self.repeat.sample(rng).max(0);
        (0..n).filter(|_| rng.percent_chance(self.chance)).count()
    }
}

/// One or more rules for a symbol.
#[derive(Clone, PartialEq, Debug)]
pub struct Rules<T>(pub Vec<Rule<T>>);

impl<T> Default for Rules<T> {
    fn default() -> Self {
        Rules(Vec::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Rules<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Rules(
            As::<OneOrMany<Same, PreferMany>>::deserialize(deserializer)?,
        ))
    }
}

impl<T> std::ops::Deref for Rules<T> {
    type Target = [Rule<T>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rule at explicit mapgen coordinates.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Placed<T> {
    #[serde(flatten)]
    pub rule: Rule<T>,
    pub x: IntRange,
    pub y: IntRange,
}

impl<T> Placed<T> {
    pub fn at(what: T, x: impl Into<IntRange>, y: impl Into<IntRange>) -> Self {
        Placed {
            rule: Rule::new(what),
            x: x.into(),
            y: y.into(),
        }
    }
}

/// Which family of spawns a table or list produces.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SpawnClass {
    Item,
    ItemGroup,
    Monster,
    MonsterGroup,
    Vehicle,
    VendingMachine,
    Zone,
}

impl SpawnClass {
    /// The group variant of a class, used when a spawn names a `group`.
    fn grouped(self) -> SpawnClass {
        match self {
            SpawnClass::Item => SpawnClass::ItemGroup,
            SpawnClass::Monster => SpawnClass::MonsterGroup,
            a => a,
        }
    }
}

/// Item, monster, vehicle or zone spawn description.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct SpawnDef {
    #[serde(
        default,
        alias = "item",
        alias = "monster",
        alias = "vehicle",
        alias = "item_group",
        alias = "type"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    /// Stack size for single items.
    #[serde(default = "one")]
    pub amount: IntRange,
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Default for SpawnDef {
    fn default() -> Self {
        SpawnDef {
            id: None,
            group: None,
            amount: one(),
            rotation: 0,
            faction: None,
            name: None,
        }
    }
}

impl SpawnDef {
    pub fn new(id: impl Into<String>) -> Self {
        SpawnDef {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.id.is_none() && self.group.is_none() {
            bail!("spawn entry names nothing to spawn");
        }
        Ok(())
    }

    /// Turn the description into a concrete id and spawn kind.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        class: SpawnClass,
        rng: &mut R,
    ) -> Option<(&str, SpawnKind)> {
        let (id, class) = match (&self.group, &self.id) {
            (Some(group), _) => (group, class.grouped()),
            (None, Some(id)) => (id, class),
            (None, None) => return None,
        };

        let kind = match class {
            SpawnClass::Item => SpawnKind::Item {
                amount: self.amount.sample(rng).max(1),
            },
            SpawnClass::ItemGroup => SpawnKind::ItemGroup,
            SpawnClass::Monster => SpawnKind::Monster,
            SpawnClass::MonsterGroup => SpawnKind::MonsterGroup,
            SpawnClass::Vehicle => SpawnKind::Vehicle {
                rotation: self.rotation,
            },
            SpawnClass::VendingMachine => SpawnKind::VendingMachine,
            SpawnClass::Zone => SpawnKind::Zone {
                faction: self.faction.clone(),
                name: self.name.clone(),
            },
        };
        Some((id, kind))
    }
}

/// Field effect description.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct FieldDef {
    pub field: String,
    #[serde(default = "one")]
    pub intensity: IntRange,
    #[serde(default)]
    pub age: i32,
}

/// Terrain, furniture or trap written at explicit coordinates.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct TileDef {
    #[serde(alias = "ter", alias = "furn", alias = "trap")]
    pub id: Mapping,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct RadiationDef {
    pub amount: IntRange,
}

/// Coordinate-addressed placement lists of a mapgen.
#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Placements {
    pub place_terrain: Vec<Placed<TileDef>>,
    pub place_furniture: Vec<Placed<TileDef>>,
    pub place_traps: Vec<Placed<TileDef>>,
    pub place_fields: Vec<Placed<FieldDef>>,
    pub place_radiation: Vec<Placed<RadiationDef>>,
    pub place_nested: Vec<Placed<NestedRef>>,
    pub place_item: Vec<Placed<SpawnDef>>,
    pub place_items: Vec<Placed<SpawnDef>>,
    pub place_loot: Vec<Placed<SpawnDef>>,
    pub place_monster: Vec<Placed<SpawnDef>>,
    pub place_monsters: Vec<Placed<SpawnDef>>,
    pub place_vehicles: Vec<Placed<SpawnDef>>,
    pub place_vendingmachines: Vec<Placed<SpawnDef>>,
    pub place_zones: Vec<Placed<SpawnDef>>,
}

impl Placements {
    /// Spawn lists with their list tags and classes.
    pub fn spawn_lists(
        &self,
    ) -> [(&'static str, &[Placed<SpawnDef>], SpawnClass); 8] {
        [
            ("place_item", &self.place_item[..], SpawnClass::Item),
            ("place_items", &self.place_items[..], SpawnClass::ItemGroup),
            ("place_loot", &self.place_loot[..], SpawnClass::Item),
            ("place_monster", &self.place_monster[..], SpawnClass::Monster),
            ("place_monsters", &self.place_monsters[..], SpawnClass::MonsterGroup),
            ("place_vehicles", &self.place_vehicles[..], SpawnClass::Vehicle),
            (
                "place_vendingmachines",
                &self.place_vendingmachines[..],
                SpawnClass::VendingMachine,
            ),
            ("place_zones", &self.place_zones[..], SpawnClass::Zone),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self == &Placements::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (tag, list, _) in self.spawn_lists() {
            for (i, a) in list.iter().enumerate() {
                if let Err(e) = a.rule.what.validate() {
                    bail!("{tag}[{i}]: {e}");
                }
            }
        }
        Ok(())
    }
}
