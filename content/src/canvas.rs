use glam::{ivec2, IVec2};
use world::{Field, FurnId, Item, Spawn, SpawnKind, Submap, TerId, TrapId};

use crate::MAX_MAPGEN_SIZE;

/// Half-open rectangle of mapgen positions.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Window {
    pub min: IVec2,
    pub max: IVec2,
}

impl Window {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Window { min, max }
    }

    pub fn sized(dim: IVec2) -> Self {
        Window::new(IVec2::ZERO, dim)
    }

    pub fn dim(&self) -> IVec2 {
        (self.max - self.min).max(IVec2::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.dim().cmpeq(IVec2::ZERO).any()
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.cmpge(self.min).all() && p.cmplt(self.max).all()
    }

    pub fn intersection(&self, other: &Window) -> Window {
        Window::new(self.min.max(other.min), self.max.min(other.max))
    }

    pub fn intersects(&self, other: &Window) -> bool {
        !self.intersection(other).is_empty()
    }

    pub fn offset(&self, d: IVec2) -> Window {
        Window::new(self.min + d, self.max + d)
    }

    /// Positions in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = IVec2> {
        let (min, dim) = (self.min, self.dim());
        (0..dim.y).flat_map(move |y| (0..dim.x).map(move |x| min + ivec2(x, y)))
    }
}

/// Surface that generated content is written on, addressed in mapgen
/// coordinates.
///
/// Writes outside `window` are dropped.
pub trait Canvas {
    fn window(&self) -> Window;

    fn set_ter(&mut self, p: IVec2, id: TerId);

    fn set_furn(&mut self, p: IVec2, id: FurnId);

    fn set_trap(&mut self, p: IVec2, id: TrapId);

    fn set_field(&mut self, p: IVec2, field: Field);

    fn set_rad(&mut self, p: IVec2, amount: i32);

    /// Add a spawn, its position is in mapgen coordinates.
    fn spawn(&mut self, spawn: Spawn);
}

/// Canvas over one submap-sized part of a mapgen.
pub struct ChunkCanvas {
    pub submap: Submap,
    /// Mapgen position of the submap's origin.
    origin: IVec2,
    window: Window,
}

impl ChunkCanvas {
    pub fn new(submap: Submap, origin: IVec2, window: Window) -> Self {
        ChunkCanvas {
            submap,
            origin,
            window,
        }
    }
}

impl Canvas for ChunkCanvas {
    fn window(&self) -> Window {
        self.window
    }

    fn set_ter(&mut self, p: IVec2, id: TerId) {
        if self.window.contains(p) {
            self.submap.set_ter(p - self.origin, id);
        }
    }

    fn set_furn(&mut self, p: IVec2, id: FurnId) {
        if self.window.contains(p) {
            self.submap.set_furn(p - self.origin, id);
        }
    }

    fn set_trap(&mut self, p: IVec2, id: TrapId) {
        if self.window.contains(p) {
            self.submap.set_trap(p - self.origin, id);
        }
    }

    fn set_field(&mut self, p: IVec2, field: Field) {
        if self.window.contains(p) {
            self.submap.set_field(p - self.origin, field);
        }
    }

    fn set_rad(&mut self, p: IVec2, amount: i32) {
        if self.window.contains(p) {
            self.submap.set_rad(p - self.origin, amount);
        }
    }

    fn spawn(&mut self, spawn: Spawn) {
        if !self.window.contains(spawn.pos) {
            return;
        }
        let spawn = spawn.offset(-self.origin);
        // Single items go straight onto the tile.
        if let SpawnKind::Item { amount } = spawn.kind {
            self.submap.add_item(
                spawn.pos,
                Item {
                    id: spawn.id,
                    count: amount,
                },
            );
        } else {
            self.submap.spawns.push(spawn);
        }
    }
}

#[derive(Clone, Default, Debug)]
struct Cell {
    ter: Option<TerId>,
    furn: Option<FurnId>,
    trap: Option<TrapId>,
    rad: Option<i32>,
    fields: Vec<Field>,
}

/// Sparse output of a nested mapgen, to be stamped onto its parent.
///
/// Only records what the nested mapgen actually wrote, cells it left alone
/// keep the parent's contents.
#[derive(Clone, Debug)]
pub struct Patch {
    window: Window,
    cells: Vec<Cell>,
    spawns: Vec<Spawn>,
}

impl Patch {
    /// Empty patch, at most `MAX_MAPGEN_SIZE` tiles along each edge.
    pub fn new(dim: IVec2) -> Self {
        let window = Window::sized(dim.min(IVec2::splat(MAX_MAPGEN_SIZE)));
        let dim = window.dim();
        Patch {
            window,
            cells: vec![Cell::default(); dim.x as usize * dim.y as usize],
            spawns: Vec::new(),
        }
    }

    pub fn dim(&self) -> IVec2 {
        self.window.dim()
    }

    fn cell(&self, p: IVec2) -> Option<&Cell> {
        if !self.window.contains(p) {
            return None;
        }
        self.cells.get((p.y * self.window.max.x + p.x) as usize)
    }

    fn cell_mut(&mut self, p: IVec2) -> Option<&mut Cell> {
        if !self.window.contains(p) {
            return None;
        }
        self.cells.get_mut((p.y * self.window.max.x + p.x) as usize)
    }

    /// Write the whole patch with its origin at `offset`.
    pub fn stamp(&self, canvas: &mut dyn Canvas, offset: IVec2) {
        let target = canvas.window();
        if !target.intersects(&self.window.offset(offset)) {
            return;
        }

        for p in self.window.iter() {
            let Some(cell) = self.cell(p) else {
                continue;
            };
            let q = p + offset;
            if !target.contains(q) {
                continue;
            }
            Self::write(cell, canvas, q);
            if let Some(a) = cell.trap {
                canvas.set_trap(q, a);
            }
            if let Some(a) = cell.rad {
                canvas.set_rad(q, a);
            }
            for &f in &cell.fields {
                canvas.set_field(q, f);
            }
        }

        for s in &self.spawns {
            canvas.spawn(s.clone().offset(offset));
        }
    }

    /// Copy the terrain and furniture of a single patch cell.
    pub fn stamp_cell(&self, from: IVec2, canvas: &mut dyn Canvas, to: IVec2) {
        if let Some(cell) = self.cell(from) {
            Self::write(cell, canvas, to);
        }
    }

    fn write(cell: &Cell, canvas: &mut dyn Canvas, p: IVec2) {
        if let Some(a) = cell.ter {
            canvas.set_ter(p, a);
        }
        if let Some(a) = cell.furn {
            canvas.set_furn(p, a);
        }
    }
}

impl Canvas for Patch {
    fn window(&self) -> Window {
        self.window
    }

    fn set_ter(&mut self, p: IVec2, id: TerId) {
        if let Some(c) = self.cell_mut(p) {
            c.ter = Some(id);
        }
    }

    fn set_furn(&mut self, p: IVec2, id: FurnId) {
        if let Some(c) = self.cell_mut(p) {
            c.furn = Some(id);
        }
    }

    fn set_trap(&mut self, p: IVec2, id: TrapId) {
        if let Some(c) = self.cell_mut(p) {
            c.trap = Some(id);
        }
    }

    fn set_field(&mut self, p: IVec2, field: Field) {
        if let Some(c) = self.cell_mut(p) {
            c.fields.retain(|f| f.id != field.id);
            c.fields.push(field);
        }
    }

    fn set_rad(&mut self, p: IVec2, amount: i32) {
        if let Some(c) = self.cell_mut(p) {
            c.rad = Some(amount);
        }
    }

    fn spawn(&mut self, spawn: Spawn) {
        if self.window.contains(spawn.pos) {
            self.spawns.push(spawn);
        }
    }
}
