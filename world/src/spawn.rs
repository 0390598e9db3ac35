use glam::IVec2;
use serde::{Deserialize, Serialize};

/// What a spawn entry materializes into.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnKind {
    /// A specific item, `amount` is the stack size.
    Item { amount: i32 },
    /// Roll an item group.
    ItemGroup,
    Monster,
    /// Roll a monster group.
    MonsterGroup,
    Vehicle { rotation: i32 },
    /// Vending machine stocked from an item group.
    VendingMachine,
    Zone {
        faction: Option<String>,
        name: Option<String>,
    },
}

/// Object to create when a submap first becomes active.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Spawn {
    /// Position in submap-local coordinates.
    pub pos: IVec2,
    /// Content id of the spawned thing, meaning depends on `kind`.
    pub id: String,
    pub kind: SpawnKind,
}

impl Spawn {
    pub fn new(pos: IVec2, id: impl Into<String>, kind: SpawnKind) -> Self {
        Spawn {
            pos,
            id: id.into(),
            kind,
        }
    }

    pub fn offset(mut self, d: IVec2) -> Self {
        self.pos += d;
        self
    }
}
