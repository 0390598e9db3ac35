use std::fmt;

use serde::{Deserialize, Serialize};
use util::IndexSet;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $null:literal) => {
        $(#[$meta])*
        #[derive(
            Copy,
            Clone,
            Default,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
            Debug,
            Serialize,
            Deserialize,
        )]
        pub struct $name(pub u16);

        impl $name {
            /// The reserved "nothing here" identifier.
            pub const NULL: $name = $name(0);
            pub const NULL_NAME: &'static str = $null;

            pub fn is_null(self) -> bool {
                self == Self::NULL
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

id_type!(
    /// Interned terrain type.
    TerId,
    "t_null"
);
id_type!(
    /// Interned furniture type, `NULL` means no furniture.
    FurnId,
    "f_null"
);
id_type!(
    /// Interned trap type, `NULL` means no trap.
    TrapId,
    "tr_null"
);
id_type!(
    /// Interned field effect type.
    FieldId,
    "fd_null"
);

/// Name to identifier resolution.
///
/// Implementations are expected to be populated at load time and treated as
/// read-only afterwards, generation only ever calls these through a shared
/// reference.
pub trait IdLookup {
    /// Terrain id for name, the null terrain if the name is unknown.
    fn terrain_id(&self, name: &str) -> TerId;

    fn furniture_id(&self, name: &str) -> Option<FurnId>;

    fn trap_id(&self, name: &str) -> Option<TrapId>;

    fn field_id(&self, name: &str) -> Option<FieldId>;
}

/// Interning name tables, a simple concrete `IdLookup`.
///
/// Index zero of every table is the null name of that kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdTable {
    terrain: IndexSet<String>,
    furniture: IndexSet<String>,
    traps: IndexSet<String>,
    fields: IndexSet<String>,
}

impl Default for IdTable {
    fn default() -> Self {
        let table = |null: &str| {
            let mut ret = IndexSet::default();
            ret.insert(null.to_owned());
            ret
        };

        IdTable {
            terrain: table(TerId::NULL_NAME),
            furniture: table(FurnId::NULL_NAME),
            traps: table(TrapId::NULL_NAME),
            fields: table(FieldId::NULL_NAME),
        }
    }
}

fn intern(table: &mut IndexSet<String>, name: &str) -> u16 {
    let idx = match table.get_index_of(name) {
        Some(idx) => idx,
        None => table.insert_full(name.to_owned()).0,
    };
    // Content with tens of thousands of distinct names is out of scope, but
    // don't wrap around into valid ids if it happens.
    u16::try_from(idx).unwrap_or_else(|_| {
        log::warn!("IdTable: id space exhausted at {name:?}");
        0
    })
}

fn lookup(table: &IndexSet<String>, name: &str) -> Option<u16> {
    table.get_index_of(name).and_then(|i| u16::try_from(i).ok())
}

impl IdTable {
    pub fn add_terrain(&mut self, name: &str) -> TerId {
        TerId(intern(&mut self.terrain, name))
    }

    pub fn add_furniture(&mut self, name: &str) -> FurnId {
        FurnId(intern(&mut self.furniture, name))
    }

    pub fn add_trap(&mut self, name: &str) -> TrapId {
        TrapId(intern(&mut self.traps, name))
    }

    pub fn add_field(&mut self, name: &str) -> FieldId {
        FieldId(intern(&mut self.fields, name))
    }

    pub fn terrain_name(&self, id: TerId) -> &str {
        self.terrain.get_index(id.0 as usize).map_or("?", |a| a.as_str())
    }

    pub fn furniture_name(&self, id: FurnId) -> &str {
        self.furniture.get_index(id.0 as usize).map_or("?", |a| a.as_str())
    }

    pub fn trap_name(&self, id: TrapId) -> &str {
        self.traps.get_index(id.0 as usize).map_or("?", |a| a.as_str())
    }

    pub fn field_name(&self, id: FieldId) -> &str {
        self.fields.get_index(id.0 as usize).map_or("?", |a| a.as_str())
    }
}

impl IdLookup for IdTable {
    fn terrain_id(&self, name: &str) -> TerId {
        lookup(&self.terrain, name).map_or(TerId::NULL, TerId)
    }

    fn furniture_id(&self, name: &str) -> Option<FurnId> {
        lookup(&self.furniture, name).map(FurnId)
    }

    fn trap_id(&self, name: &str) -> Option<TrapId> {
        lookup(&self.traps, name).map(TrapId)
    }

    fn field_id(&self, name: &str) -> Option<FieldId> {
        lookup(&self.fields, name).map(FieldId)
    }
}
