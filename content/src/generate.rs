use std::sync::Arc;

use glam::{ivec2, IVec2};
use rand::Rng;
use util::{srng, GameRng};
use world::{
    Field, FieldId, FurnId, IdLookup, Location, Spawn, Submap, TerId, TrapId,
    SUBMAP_SIZE,
};

use crate::{
    resolve_with, Canvas, ChunkCanvas, Diagnostics, FieldDef, GenConfig, Mapgen,
    MapgenKind, NestedRef, Params, Patch, Placed, Registry, Resolved,
    Window, NULL_CHUNK,
};

/// Per-call generation inputs.
#[derive(Clone, Default, Debug)]
pub struct Context {
    /// Absolute position of the mapgen's top-left submap.
    pub position: Location,
    pub seed: u64,
    /// Nesting depth of the mapgen being generated.
    pub depth: u32,
    /// Explicit parameter values, overriding mapgen defaults.
    pub params: Params,
    /// Current turn, stamped on generated submaps.
    pub turn: u64,
}

impl Context {
    pub fn new(position: Location, seed: u64) -> Self {
        Context {
            position,
            seed,
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn at_turn(mut self, turn: u64) -> Self {
        self.turn = turn;
        self
    }
}

#[derive(Clone, Debug)]
pub struct SplitChunk {
    pub submap: Submap,
    /// Position of the submap in the mapgen's submap grid.
    pub grid: IVec2,
    /// Absolute position of the submap.
    pub position: Location,
}

/// Output of generating a mapgen larger than one submap.
#[derive(Clone, Debug)]
pub struct Split {
    /// Submaps in row-major grid order.
    pub chunks: Vec<SplitChunk>,
    pub grid_width: i32,
    pub grid_height: i32,
}

impl Split {
    pub fn get(&self, grid: IVec2) -> Option<&SplitChunk> {
        if grid.x < 0 || grid.x >= self.grid_width || grid.y < 0 {
            return None;
        }
        self.chunks.get((grid.y * self.grid_width + grid.x) as usize)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Mode {
    /// Every cell gets terrain, falling back to fill and null terrain.
    Fresh,
    /// Only write terrain where the mapgen says what it is.
    Overlay,
}

struct Env<'p> {
    seed: u64,
    depth: u32,
    params: &'p Params,
    mode: Mode,
}

/// Turns resolved mapgens into submaps.
///
/// Generation is a pure function of the resolved mapgen, the context and
/// the contents of the registry and the id lookup. Every random choice is
/// seeded from the context seed and the mapgen position or list entry it
/// concerns, so generating one submap of a large mapgen gives the same
/// result as generating all of them.
pub struct Generator<'a> {
    registry: &'a Registry,
    lookup: &'a dyn IdLookup,
    config: GenConfig,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a Registry, lookup: &'a dyn IdLookup) -> Self {
        Generator {
            registry,
            lookup,
            config: Default::default(),
        }
    }

    pub fn with_config(mut self, config: GenConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Generate the top-left submap of a mapgen.
    pub fn generate(&self, mapgen: &Resolved, ctx: &Context) -> Submap {
        self.generate_reporting(mapgen, ctx).0
    }

    pub fn generate_reporting(
        &self,
        mapgen: &Resolved,
        ctx: &Context,
    ) -> (Submap, Diagnostics) {
        self.generate_chunk_reporting(mapgen, ctx, IVec2::ZERO)
    }

    /// Generate the submap at a position of the mapgen's submap grid.
    pub fn generate_chunk(
        &self,
        mapgen: &Resolved,
        ctx: &Context,
        grid: IVec2,
    ) -> Submap {
        self.generate_chunk_reporting(mapgen, ctx, grid).0
    }

    pub fn generate_chunk_reporting(
        &self,
        mapgen: &Resolved,
        ctx: &Context,
        grid: IVec2,
    ) -> (Submap, Diagnostics) {
        let mut diag = resolve_gaps(mapgen);
        let ret = self.chunk(mapgen, ctx, grid, None, &mut diag);
        (ret, diag)
    }

    /// Generate every submap the mapgen covers.
    pub fn generate_multiple(&self, mapgen: &Resolved, ctx: &Context) -> Split {
        self.generate_multiple_reporting(mapgen, ctx).0
    }

    pub fn generate_multiple_reporting(
        &self,
        mapgen: &Resolved,
        ctx: &Context,
    ) -> (Split, Diagnostics) {
        let dim = mapgen.grid_dim();
        let mut diag = resolve_gaps(mapgen);
        let mut chunks = Vec::with_capacity((dim.x * dim.y) as usize);

        for gy in 0..dim.y {
            for gx in 0..dim.x {
                let grid = ivec2(gx, gy);
                let submap = self.chunk(mapgen, ctx, grid, None, &mut diag);
                chunks.push(SplitChunk {
                    submap,
                    grid,
                    position: ctx.position + (grid * SUBMAP_SIZE).extend(0),
                });
            }
        }

        let split = Split {
            chunks,
            grid_width: dim.x,
            grid_height: dim.y,
        };
        (split, diag)
    }

    /// Apply an update mapgen onto an existing submap.
    ///
    /// Cells the mapgen has no terrain for keep their old terrain.
    pub fn update(
        &self,
        mapgen: &Resolved,
        ctx: &Context,
        submap: &Submap,
    ) -> Submap {
        self.update_reporting(mapgen, ctx, submap).0
    }

    pub fn update_reporting(
        &self,
        mapgen: &Resolved,
        ctx: &Context,
        submap: &Submap,
    ) -> (Submap, Diagnostics) {
        let mut diag = resolve_gaps(mapgen);
        let ret = self.chunk(mapgen, ctx, IVec2::ZERO, Some(submap), &mut diag);
        (ret, diag)
    }

    /// Parameter values for generating a mapgen, with the defaults the
    /// context doesn't set drawn with the context seed.
    pub fn params_for(&self, mapgen: &Mapgen, ctx: &Context) -> Params {
        ctx.params.sample(
            &mapgen.parameters,
            &mut srng(&(ctx.seed, "parameters")),
            self.config.list_pick,
        )
    }

    /// Look up, resolve and generate a mapgen by id.
    ///
    /// When several mapgens share the id, one is picked by weight using the
    /// context seed.
    pub fn generate_id(
        &self,
        id: &str,
        ctx: &Context,
    ) -> Option<(Split, Diagnostics)> {
        let mapgen = self
            .registry
            .pick(MapgenKind::Overmap, id, &mut srng(&(ctx.seed, "mapgen")))
            .or_else(|| self.registry.get_mapgen_by_id(id))?;

        let params = self.params_for(mapgen, ctx);
        let resolved = resolve_with(mapgen, self.registry, &params);
        let ctx = Context {
            params,
            ..ctx.clone()
        };
        Some(self.generate_multiple_reporting(&resolved, &ctx))
    }

    fn chunk(
        &self,
        mapgen: &Mapgen,
        ctx: &Context,
        grid: IVec2,
        base: Option<&Submap>,
        diag: &mut Diagnostics,
    ) -> Submap {
        let params = self.params_for(mapgen, ctx);
        let origin = grid * SUBMAP_SIZE;
        let window = Window::new(origin, origin + IVec2::splat(SUBMAP_SIZE))
            .intersection(&Window::sized(mapgen.size));

        let (submap, mode) = match base {
            Some(submap) => (submap.clone(), Mode::Overlay),
            None => {
                let fill = match &mapgen.fill_terrain {
                    Some(name) => self.terrain(name, diag),
                    None => TerId::NULL,
                };
                (Submap::uniform(fill), Mode::Fresh)
            }
        };

        let mut canvas = ChunkCanvas::new(submap, origin, window);
        let env = Env {
            seed: ctx.seed,
            depth: ctx.depth,
            params: &params,
            mode,
        };
        self.paint(mapgen, &env, &mut canvas, diag);

        let mut ret = canvas.submap;
        ret.touch(ctx.turn);
        ret
    }

    /// Write the part of the mapgen that falls in the canvas window.
    fn paint(
        &self,
        mapgen: &Mapgen,
        env: &Env,
        canvas: &mut dyn Canvas,
        diag: &mut Diagnostics,
    ) {
        let area = canvas.window().intersection(&Window::sized(mapgen.size));
        let fill = mapgen
            .fill_terrain
            .as_deref()
            .map(|name| self.terrain(name, diag));

        for p in area.iter() {
            self.paint_cell(mapgen, p, fill, env, canvas, diag);
        }

        // Nested chunks go on top of the whole symbol layer. Anchors outside
        // the window can still reach into it.
        for (p, c) in mapgen.rows.iter() {
            if let Some(nested) = mapgen.legend.nested.get(&c) {
                let mut rng = srng(&(env.seed, "nested", p.x, p.y));
                self.place_nested(p, nested, env, canvas, diag, &mut rng);
            }
        }

        self.paint_lists(mapgen, env, canvas, diag);
    }

    fn paint_cell(
        &self,
        mapgen: &Mapgen,
        p: IVec2,
        fill: Option<TerId>,
        env: &Env,
        canvas: &mut dyn Canvas,
        diag: &mut Diagnostics,
    ) {
        let list_pick = self.config.list_pick;
        let legend = &mapgen.legend;
        let mut rng = srng(&(env.seed, p.x, p.y));
        let symbol = mapgen.symbol(p);

        let ter = symbol
            .and_then(|c| legend.terrain.get(&c))
            .and_then(|m| m.pick(&mut rng, list_pick, env.params))
            .map(|name| self.terrain(name, diag))
            .or(fill);
        match (ter, env.mode) {
            (Some(id), _) => canvas.set_ter(p, id),
            (None, Mode::Fresh) => canvas.set_ter(p, TerId::NULL),
            (None, Mode::Overlay) => {}
        }

        let Some(c) = symbol else {
            return;
        };
        if fill.is_none() && !legend.maps(c) {
            diag.unmapped_symbols.insert(c);
        }

        if let Some(name) = legend
            .furniture
            .get(&c)
            .and_then(|m| m.pick(&mut rng, list_pick, env.params))
        {
            if let Some(id) = self.furniture(name, diag) {
                canvas.set_furn(p, id);
            }
        }

        if let Some(name) = legend
            .traps
            .get(&c)
            .and_then(|m| m.pick(&mut rng, list_pick, env.params))
        {
            if let Some(id) = self.trap(name, diag) {
                canvas.set_trap(p, id);
            }
        }

        if let Some(rules) = legend.fields.get(&c) {
            for rule in rules.iter() {
                for _ in 0..rule.roll(&mut rng) {
                    if let Some(field) = self.field(&rule.what, &mut rng, diag) {
                        canvas.set_field(p, field);
                    }
                }
            }
        }

        for (table, class) in legend.spawn_tables() {
            let Some(rules) = table.get(&c) else {
                continue;
            };
            for rule in rules.iter() {
                for _ in 0..rule.roll(&mut rng) {
                    if let Some((id, kind)) = rule.what.resolve(class, &mut rng) {
                        canvas.spawn(Spawn::new(p, id, kind));
                    }
                }
            }
        }
    }

    fn paint_lists(
        &self,
        mapgen: &Mapgen,
        env: &Env,
        canvas: &mut dyn Canvas,
        diag: &mut Diagnostics,
    ) {
        let list_pick = self.config.list_pick;
        let lists = &mapgen.placements;
        let window = canvas.window();

        for (i, e) in lists.place_terrain.iter().enumerate() {
            for (p, mut rng) in occurrences(env.seed, "place_terrain", i, e) {
                if !window.contains(p) {
                    continue;
                }
                if let Some(name) =
                    e.rule.what.id.pick(&mut rng, list_pick, env.params)
                {
                    let id = self.terrain(name, diag);
                    canvas.set_ter(p, id);
                }
            }
        }

        for (i, e) in lists.place_furniture.iter().enumerate() {
            for (p, mut rng) in occurrences(env.seed, "place_furniture", i, e) {
                if !window.contains(p) {
                    continue;
                }
                if let Some(id) = e
                    .rule
                    .what
                    .id
                    .pick(&mut rng, list_pick, env.params)
                    .and_then(|name| self.furniture(name, diag))
                {
                    canvas.set_furn(p, id);
                }
            }
        }

        for (i, e) in lists.place_traps.iter().enumerate() {
            for (p, mut rng) in occurrences(env.seed, "place_traps", i, e) {
                if !window.contains(p) {
                    continue;
                }
                if let Some(id) = e
                    .rule
                    .what
                    .id
                    .pick(&mut rng, list_pick, env.params)
                    .and_then(|name| self.trap(name, diag))
                {
                    canvas.set_trap(p, id);
                }
            }
        }

        for (i, e) in lists.place_fields.iter().enumerate() {
            for (p, mut rng) in occurrences(env.seed, "place_fields", i, e) {
                if !window.contains(p) {
                    continue;
                }
                if let Some(field) = self.field(&e.rule.what, &mut rng, diag) {
                    canvas.set_field(p, field);
                }
            }
        }

        for (i, e) in lists.place_radiation.iter().enumerate() {
            for (p, mut rng) in occurrences(env.seed, "place_radiation", i, e) {
                if window.contains(p) {
                    canvas.set_rad(p, e.rule.what.amount.sample(&mut rng));
                }
            }
        }

        for (i, e) in lists.place_nested.iter().enumerate() {
            for (p, mut rng) in occurrences(env.seed, "place_nested", i, e) {
                self.place_nested(p, &e.rule.what, env, canvas, diag, &mut rng);
            }
        }

        for (tag, list, class) in lists.spawn_lists() {
            for (i, e) in list.iter().enumerate() {
                for (p, mut rng) in occurrences(env.seed, tag, i, e) {
                    if !window.contains(p) {
                        continue;
                    }
                    if let Some((id, kind)) = e.rule.what.resolve(class, &mut rng) {
                        canvas.spawn(Spawn::new(p, id, kind));
                    }
                }
            }
        }
    }

    /// Run a nested mapgen and write its output at `at`.
    fn place_nested(
        &self,
        at: IVec2,
        nested: &NestedRef,
        env: &Env,
        canvas: &mut dyn Canvas,
        diag: &mut Diagnostics,
        rng: &mut GameRng,
    ) {
        let Some(chunk) = nested.chunks.pick(rng, self.config.list_pick, env.params)
        else {
            return;
        };
        if chunk == NULL_CHUNK {
            return;
        }

        let Some(mapgen) = self.registry.pick(MapgenKind::Nested, chunk, rng)
        else {
            if diag.missing_chunks.insert(chunk.to_owned()) {
                log::debug!("nested mapgen {chunk} not found");
            }
            return;
        };
        let seed: u64 = rng.gen();

        let target = canvas.window();
        let cell = nested.sample_cell();
        let reaches = match cell {
            None => target.intersects(&Window::sized(mapgen.size).offset(at)),
            Some(_) => target.contains(at),
        };
        if !reaches {
            return;
        }

        if env.depth >= self.config.max_depth {
            log::debug!("nested mapgen {chunk} is too deep at {}", env.depth);
            diag.depth_limit_hits += 1;
            return;
        }

        let patch = self.nested_patch(mapgen, seed, env, diag);
        match cell {
            None => patch.stamp(canvas, at),
            Some(from) => patch.stamp_cell(from, canvas, at),
        }
    }

    fn nested_patch(
        &self,
        mapgen: &Arc<Mapgen>,
        seed: u64,
        env: &Env,
        diag: &mut Diagnostics,
    ) -> Patch {
        let params = env.params.sample(
            &mapgen.parameters,
            &mut srng(&(seed, "parameters")),
            self.config.list_pick,
        );

        let memo;
        let local;
        let resolved: &Resolved = if mapgen.parameters.is_empty() {
            memo = self.registry.resolved(mapgen);
            &memo
        } else {
            local = resolve_with(mapgen, self.registry, &params);
            &local
        };
        diag.merge(resolve_gaps(resolved));

        let mut patch = Patch::new(mapgen.size);
        let env = Env {
            seed,
            depth: env.depth + 1,
            params: &params,
            mode: Mode::Overlay,
        };
        self.paint(resolved, &env, &mut patch, diag);
        patch
    }

    fn terrain(&self, name: &str, diag: &mut Diagnostics) -> TerId {
        let id = self.lookup.terrain_id(name);
        if id.is_null()
            && name != TerId::NULL_NAME
            && !diag.unknown_terrain.contains(name)
        {
            log::debug!("unknown terrain {name}");
            diag.unknown_terrain.insert(name.to_owned());
        }
        id
    }

    fn furniture(&self, name: &str, diag: &mut Diagnostics) -> Option<FurnId> {
        let ret = self.lookup.furniture_id(name);
        if ret.is_none() && !diag.unknown_furniture.contains(name) {
            log::debug!("unknown furniture {name}");
            diag.unknown_furniture.insert(name.to_owned());
        }
        ret
    }

    fn trap(&self, name: &str, diag: &mut Diagnostics) -> Option<TrapId> {
        let ret = self.lookup.trap_id(name);
        if ret.is_none() && !diag.unknown_traps.contains(name) {
            log::debug!("unknown trap {name}");
            diag.unknown_traps.insert(name.to_owned());
        }
        ret
    }

    fn field(
        &self,
        def: &FieldDef,
        rng: &mut GameRng,
        diag: &mut Diagnostics,
    ) -> Option<Field> {
        let intensity = def.intensity.sample(rng);
        let Some(id) = self.lookup.field_id(&def.field) else {
            if diag.unknown_fields.insert(def.field.clone()) {
                log::debug!("unknown field {}", def.field);
            }
            return None;
        };
        (id != FieldId::NULL).then_some(Field {
            id,
            intensity,
            age: def.age,
        })
    }
}

fn resolve_gaps(mapgen: &Resolved) -> Diagnostics {
    Diagnostics {
        missing_palettes: mapgen.missing_palettes.iter().cloned().collect(),
        missing_params: mapgen.missing_params.iter().cloned().collect(),
        ..Default::default()
    }
}

/// Positions and rngs for the occurrences of a list entry that passed
/// their chance rolls.
fn occurrences<'e, T>(
    seed: u64,
    tag: &'static str,
    index: usize,
    entry: &'e Placed<T>,
) -> impl Iterator<Item = (IVec2, GameRng)> + 'e {
    let n = entry.rule.roll(&mut srng(&(seed, tag, index)));
    (0..n).map(move |k| {
        let mut rng = srng(&(seed, tag, index, k));
        let p = ivec2(entry.x.sample(&mut rng), entry.y.sample(&mut rng));
        (p, rng)
    })
}
