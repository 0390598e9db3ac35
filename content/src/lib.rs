//! Mapgen definitions and the generator that turns them into submaps.

mod canvas;
pub use canvas::{Canvas, ChunkCanvas, Patch, Window};

mod config;
pub use config::{GenConfig, ListPick};

mod diagnostics;
pub use diagnostics::Diagnostics;

mod generate;
pub use generate::{Context, Generator, Split, SplitChunk};

mod json;
pub use json::LoadReport;

mod legend;
pub use legend::Legend;

mod mapgen;
pub use mapgen::{Mapgen, MapgenKind, DEFAULT_WEIGHT, MAX_MAPGEN_SIZE};

mod mapping;
pub use mapping::{Choice, Mapping};

mod nested;
pub use nested::{NestedRef, NULL_CHUNK};

mod palette;
pub use palette::{Palette, PaletteRef};

mod params;
pub use params::{Parameter, Params};

mod placement;
pub use placement::{
    FieldDef, Placed, Placements, RadiationDef, Rule, Rules, SpawnClass,
    SpawnDef, TileDef,
};

mod registry;
pub use registry::{Registry, RegistryBuilder};

mod resolve;
pub use resolve::{resolve, resolve_with, Resolved};
