//! Storage side of submap generation: chunk-sized tile buffers, chunk
//! records and the identifiers that go in them.

mod coords;
pub use coords::{in_submap, Location, SubmapCoords};

mod dump;
pub use dump::SubmapDump;

mod ids;
pub use ids::{FieldId, FurnId, IdLookup, IdTable, TerId, TrapId};

mod layer;
pub use layer::Layer;

mod spawn;
pub use spawn::{Spawn, SpawnKind};

mod submap;
pub use submap::Submap;

mod tile_buffer;
pub use tile_buffer::{Field, Item, OutOfBounds, TileBuffer};

/// Edge length of a submap in tiles.
pub const SUBMAP_SIZE: i32 = 12;

/// Number of tiles in a submap.
pub const SUBMAP_AREA: usize = (SUBMAP_SIZE * SUBMAP_SIZE) as usize;

/// Edge length of an overmap tile, the default mapgen footprint.
pub const OMT_SIZE: i32 = 2 * SUBMAP_SIZE;
