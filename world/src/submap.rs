use glam::IVec2;

use crate::{
    in_submap, Field, FieldId, FurnId, Item, OutOfBounds, Spawn, TerId,
    TileBuffer, TrapId,
};

#[derive(Clone, Eq, PartialEq, Debug)]
enum Storage {
    /// Every tile is this terrain and there's nothing else on the submap.
    Uniform(TerId),
    Tiles(TileBuffer),
}

/// A single generated chunk of the game world.
///
/// A submap that is all one terrain type doesn't allocate tile storage at
/// all. The first write that makes a difference demotes it into a full
/// `TileBuffer` with the uniform terrain in every cell.
///
/// Cloning is cheap, the tile storage is shared until written to.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Submap {
    storage: Storage,
    /// Objects to create when the submap is activated.
    pub spawns: Vec<Spawn>,
    field_count: usize,
    last_touched: u64,
}

impl Default for Submap {
    fn default() -> Self {
        Submap::uniform(TerId::NULL)
    }
}

impl Submap {
    pub fn uniform(ter: TerId) -> Self {
        Submap {
            storage: Storage::Uniform(ter),
            spawns: Default::default(),
            field_count: 0,
            last_touched: 0,
        }
    }

    /// The single terrain of a submap that is still on the uniform fast path.
    pub fn uniform_terrain(&self) -> Option<TerId> {
        match self.storage {
            Storage::Uniform(t) => Some(t),
            Storage::Tiles(_) => None,
        }
    }

    pub fn is_uniform(&self) -> bool {
        self.uniform_terrain().is_some()
    }

    pub fn tiles(&self) -> Option<&TileBuffer> {
        match &self.storage {
            Storage::Uniform(_) => None,
            Storage::Tiles(t) => Some(t),
        }
    }

    /// Cheap check for whether the submap needs per-tick field processing.
    pub fn field_count(&self) -> usize {
        self.field_count
    }

    pub fn last_touched(&self) -> u64 {
        self.last_touched
    }

    pub fn touch(&mut self, turn: u64) {
        self.last_touched = turn;
    }

    pub fn terrain(&self, p: IVec2) -> Result<TerId, OutOfBounds> {
        match &self.storage {
            Storage::Uniform(t) if in_submap(p) => Ok(*t),
            Storage::Uniform(_) => Err(OutOfBounds { pos: p }),
            Storage::Tiles(b) => b.terrain(p),
        }
    }

    pub fn ter(&self, p: IVec2) -> TerId {
        self.terrain(p).unwrap_or_default()
    }

    pub fn furn(&self, p: IVec2) -> FurnId {
        self.tiles().map_or(FurnId::NULL, |b| b.furn(p))
    }

    pub fn trap(&self, p: IVec2) -> TrapId {
        self.tiles().map_or(TrapId::NULL, |b| b.trap(p))
    }

    pub fn rad(&self, p: IVec2) -> i32 {
        self.tiles().map_or(0, |b| b.rad(p))
    }

    pub fn lum(&self, p: IVec2) -> u8 {
        self.tiles().map_or(0, |b| b.lum(p))
    }

    pub fn field(&self, p: IVec2, id: FieldId) -> Option<Field> {
        self.tiles().and_then(|b| b.field(p, id))
    }

    pub fn items(&self, p: IVec2) -> &[Item] {
        self.tiles().map_or(&[], |b| b.items(p))
    }

    /// Get the tile buffer for writing, demoting a uniform submap.
    fn tiles_mut(&mut self) -> &mut TileBuffer {
        if let Storage::Uniform(t) = self.storage {
            self.storage = Storage::Tiles(TileBuffer::filled(t));
        }
        match &mut self.storage {
            Storage::Tiles(b) => b,
            Storage::Uniform(_) => unreachable!("submap was just demoted"),
        }
    }

    pub fn set_ter(&mut self, p: IVec2, id: TerId) {
        if !in_submap(p) || self.uniform_terrain() == Some(id) {
            return;
        }
        self.tiles_mut().set_terrain(p, id);
    }

    pub fn set_furn(&mut self, p: IVec2, id: FurnId) {
        if !in_submap(p) || (self.is_uniform() && id.is_null()) {
            return;
        }
        self.tiles_mut().set_furniture(p, id);
    }

    pub fn set_trap(&mut self, p: IVec2, id: TrapId) {
        if !in_submap(p) || (self.is_uniform() && id.is_null()) {
            return;
        }
        self.tiles_mut().set_trap(p, id);
    }

    pub fn set_rad(&mut self, p: IVec2, amount: i32) {
        if !in_submap(p) || (self.is_uniform() && amount == 0) {
            return;
        }
        self.tiles_mut().set_radiation(p, amount);
    }

    pub fn set_lum(&mut self, p: IVec2, lum: i32) {
        if !in_submap(p) || (self.is_uniform() && lum <= 0) {
            return;
        }
        self.tiles_mut().set_luminance(p, lum);
    }

    pub fn set_field(&mut self, p: IVec2, field: Field) {
        if !in_submap(p) || (self.is_uniform() && !field.is_alive()) {
            return;
        }
        let count = {
            let tiles = self.tiles_mut();
            tiles.set_field(p, field);
            tiles.field_count()
        };
        self.field_count = count;
    }

    pub fn add_item(&mut self, p: IVec2, item: Item) {
        if !in_submap(p) || item.count <= 0 {
            return;
        }
        self.tiles_mut().add_item(p, item);
    }

    pub fn with_ter(&self, p: IVec2, id: TerId) -> Self {
        let mut ret = self.clone();
        ret.set_ter(p, id);
        ret
    }

    pub fn with_furn(&self, p: IVec2, id: FurnId) -> Self {
        let mut ret = self.clone();
        ret.set_furn(p, id);
        ret
    }

    pub fn with_field(&self, p: IVec2, field: Field) -> Self {
        let mut ret = self.clone();
        ret.set_field(p, field);
        ret
    }

    /// Return to the uniform representation if the tile storage has become
    /// plain terrain again.
    pub fn compact(&mut self) {
        if let Storage::Tiles(b) = &self.storage {
            if let Some(t) = b.plain_terrain() {
                self.storage = Storage::Uniform(t);
            }
        }
    }
}
