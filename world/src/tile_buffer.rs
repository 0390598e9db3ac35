use std::{collections::BTreeMap, sync::Arc};

use derive_more::{Display, Error};
use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::{in_submap, FieldId, FurnId, Layer, TerId, TrapId};

/// Read of a position outside `[0, SUBMAP_SIZE)²`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("position {pos} is outside the submap")]
pub struct OutOfBounds {
    pub pos: IVec2,
}

/// Field effect such as smoke or blood on a tile.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub intensity: i32,
    pub age: i32,
}

impl Field {
    pub fn new(id: FieldId, intensity: i32) -> Self {
        Field {
            id,
            intensity,
            age: 0,
        }
    }

    /// Dead fields are never stored.
    pub fn is_alive(&self) -> bool {
        self.intensity > 0 && !self.id.is_null()
    }
}

/// Item stack lying on a tile.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub count: i32,
}

type Key = [i32; 2];

fn key(p: IVec2) -> Key {
    p.to_array()
}

/// Structure-of-arrays tile storage for one submap.
///
/// Values behave like immutable data: the `with_*` methods return a new
/// buffer that shares all untouched storage with the receiver. The `set_*`
/// methods do the same copy-on-write update in place, and are cheap on a
/// buffer that isn't shared with anyone.
///
/// Out of bounds reads through the `Result` accessors give `OutOfBounds`,
/// the plain accessors give the null value of the layer. Out of bounds
/// writes are ignored.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TileBuffer {
    ter: Layer<TerId>,
    furn: Layer<FurnId>,
    rad: Layer<i32>,
    lum: Layer<u8>,
    traps: Arc<BTreeMap<Key, TrapId>>,
    fields: Arc<BTreeMap<(Key, FieldId), Field>>,
    items: Arc<BTreeMap<Key, Vec<Item>>>,
}

impl Default for TileBuffer {
    fn default() -> Self {
        TileBuffer::filled(TerId::NULL)
    }
}

impl TileBuffer {
    pub fn filled(ter: TerId) -> Self {
        TileBuffer {
            ter: Layer::filled(ter),
            furn: Layer::filled(FurnId::NULL),
            rad: Layer::filled(0),
            lum: Layer::filled(0),
            traps: Default::default(),
            fields: Default::default(),
            items: Default::default(),
        }
    }

    pub fn terrain(&self, p: IVec2) -> Result<TerId, OutOfBounds> {
        self.ter.get(p).ok_or(OutOfBounds { pos: p })
    }

    pub fn furniture(&self, p: IVec2) -> Result<FurnId, OutOfBounds> {
        self.furn.get(p).ok_or(OutOfBounds { pos: p })
    }

    pub fn radiation(&self, p: IVec2) -> Result<i32, OutOfBounds> {
        self.rad.get(p).ok_or(OutOfBounds { pos: p })
    }

    pub fn ter(&self, p: IVec2) -> TerId {
        self.ter.get(p).unwrap_or_default()
    }

    pub fn furn(&self, p: IVec2) -> FurnId {
        self.furn.get(p).unwrap_or_default()
    }

    pub fn rad(&self, p: IVec2) -> i32 {
        self.rad.get(p).unwrap_or_default()
    }

    pub fn lum(&self, p: IVec2) -> u8 {
        self.lum.get(p).unwrap_or_default()
    }

    pub fn trap(&self, p: IVec2) -> TrapId {
        self.traps.get(&key(p)).copied().unwrap_or_default()
    }

    pub fn field(&self, p: IVec2, id: FieldId) -> Option<Field> {
        self.fields.get(&(key(p), id)).copied()
    }

    pub fn fields_at(&self, p: IVec2) -> impl Iterator<Item = &Field> + '_ {
        let k = key(p);
        self.fields
            .range((k, FieldId(0))..=(k, FieldId(u16::MAX)))
            .map(|(_, f)| f)
    }

    /// Number of live fields in the buffer.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn items(&self, p: IVec2) -> &[Item] {
        self.items.get(&key(p)).map_or(&[], |a| a.as_slice())
    }

    pub fn terrain_layer(&self) -> &Layer<TerId> {
        &self.ter
    }

    pub fn furniture_layer(&self) -> &Layer<FurnId> {
        &self.furn
    }

    pub fn set_terrain(&mut self, p: IVec2, id: TerId) -> bool {
        self.ter.set(p, id)
    }

    pub fn set_furniture(&mut self, p: IVec2, id: FurnId) -> bool {
        self.furn.set(p, id)
    }

    pub fn set_radiation(&mut self, p: IVec2, amount: i32) -> bool {
        self.rad.set(p, amount)
    }

    /// Set luminance, clamped to `[0, 255]`.
    pub fn set_luminance(&mut self, p: IVec2, lum: i32) -> bool {
        self.lum.set(p, lum.clamp(0, 255) as u8)
    }

    pub fn set_trap(&mut self, p: IVec2, id: TrapId) -> bool {
        if !in_submap(p) || self.trap(p) == id {
            return false;
        }
        let traps = Arc::make_mut(&mut self.traps);
        if id.is_null() {
            traps.remove(&key(p));
        } else {
            traps.insert(key(p), id);
        }
        true
    }

    /// Write a field, dead fields remove the existing field of that type.
    pub fn set_field(&mut self, p: IVec2, field: Field) -> bool {
        if !in_submap(p) {
            return false;
        }
        let k = (key(p), field.id);
        if field.is_alive() {
            if self.fields.get(&k) == Some(&field) {
                return false;
            }
            Arc::make_mut(&mut self.fields).insert(k, field);
            true
        } else if self.fields.contains_key(&k) {
            Arc::make_mut(&mut self.fields).remove(&k);
            true
        } else {
            false
        }
    }

    pub fn add_item(&mut self, p: IVec2, item: Item) -> bool {
        if !in_submap(p) || item.count <= 0 {
            return false;
        }
        Arc::make_mut(&mut self.items)
            .entry(key(p))
            .or_default()
            .push(item);
        true
    }

    pub fn with_terrain(&self, p: IVec2, id: TerId) -> Self {
        let mut ret = self.clone();
        ret.set_terrain(p, id);
        ret
    }

    pub fn with_furniture(&self, p: IVec2, id: FurnId) -> Self {
        let mut ret = self.clone();
        ret.set_furniture(p, id);
        ret
    }

    pub fn with_radiation(&self, p: IVec2, amount: i32) -> Self {
        let mut ret = self.clone();
        ret.set_radiation(p, amount);
        ret
    }

    pub fn with_luminance(&self, p: IVec2, lum: i32) -> Self {
        let mut ret = self.clone();
        ret.set_luminance(p, lum);
        ret
    }

    pub fn with_trap(&self, p: IVec2, id: TrapId) -> Self {
        let mut ret = self.clone();
        ret.set_trap(p, id);
        ret
    }

    pub fn with_field(&self, p: IVec2, field: Field) -> Self {
        let mut ret = self.clone();
        ret.set_field(p, field);
        ret
    }

    pub fn with_item(&self, p: IVec2, item: Item) -> Self {
        let mut ret = self.clone();
        ret.add_item(p, item);
        ret
    }

    /// If the buffer is nothing but a single terrain type, return it.
    pub fn plain_terrain(&self) -> Option<TerId> {
        if !self.traps.is_empty()
            || !self.fields.is_empty()
            || !self.items.is_empty()
            || self.furn.uniform() != Some(FurnId::NULL)
            || self.rad.uniform() != Some(0)
            || self.lum.uniform() != Some(0)
        {
            return None;
        }
        self.ter.uniform()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use glam::ivec2;

    #[test]
    fn persistent_updates() {
        let a = TileBuffer::filled(TerId(1));
        let b = a.with_terrain(ivec2(2, 3), TerId(2));

        assert_eq!(a.ter(ivec2(2, 3)), TerId(1));
        assert_eq!(b.ter(ivec2(2, 3)), TerId(2));
        assert_eq!(b.ter(ivec2(3, 3)), TerId(1));
        assert!(b.terrain_layer().shares_row(a.terrain_layer(), 0));
        assert_eq!(a.furniture_layer(), b.furniture_layer());
    }

    #[test]
    fn bounds() {
        let a = TileBuffer::filled(TerId(1));
        let p = ivec2(12, 0);
        assert_eq!(a.terrain(p), Err(OutOfBounds { pos: p }));
        assert!(a.furniture(ivec2(0, -1)).is_err());
        assert!(a.radiation(ivec2(0, 40)).is_err());
        assert_eq!(a.ter(p), TerId::NULL);
        assert_eq!(a.terrain(ivec2(11, 11)), Ok(TerId(1)));

        // Writes out of bounds leave the value unchanged.
        assert_eq!(a.with_terrain(p, TerId(5)), a);
        assert_eq!(a.with_trap(p, TrapId(5)), a);
        assert_eq!(
            a.with_item(
                p,
                Item {
                    id: "rock".into(),
                    count: 1
                }
            ),
            a
        );
    }

    #[test]
    fn luminance_clamp() {
        let a = TileBuffer::default()
            .with_luminance(ivec2(0, 0), 999)
            .with_luminance(ivec2(1, 0), -5)
            .with_luminance(ivec2(2, 0), 100);
        assert_eq!(a.lum(ivec2(0, 0)), 255);
        assert_eq!(a.lum(ivec2(1, 0)), 0);
        assert_eq!(a.lum(ivec2(2, 0)), 100);
    }

    #[test]
    fn dead_fields_removed() {
        let smoke = FieldId(3);
        let p = ivec2(4, 4);
        let a = TileBuffer::default().with_field(p, Field::new(smoke, 2));
        assert_eq!(a.field_count(), 1);
        assert_eq!(a.field(p, smoke).map(|f| f.intensity), Some(2));
        assert_eq!(a.fields_at(p).count(), 1);

        let b = a.with_field(p, Field::new(smoke, 0));
        assert_eq!(b.field_count(), 0);
        assert_eq!(b.field(p, smoke), None);
        assert_eq!(a.field_count(), 1);

        // Writing a dead field where there is none is a no-op.
        let c = TileBuffer::default().with_field(p, Field::new(smoke, -1));
        assert_eq!(c.field_count(), 0);
    }

    #[test]
    fn plain_detection() {
        let a = TileBuffer::filled(TerId(4));
        assert_eq!(a.plain_terrain(), Some(TerId(4)));
        assert_eq!(a.with_trap(ivec2(1, 1), TrapId(1)).plain_terrain(), None);
        assert_eq!(a.with_radiation(ivec2(1, 1), 3).plain_terrain(), None);
        assert_eq!(
            a.with_trap(ivec2(1, 1), TrapId(1))
                .with_trap(ivec2(1, 1), TrapId::NULL)
                .plain_terrain(),
            Some(TerId(4))
        );
    }
}
