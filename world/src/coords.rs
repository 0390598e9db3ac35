use glam::{ivec3, IVec2, IVec3};

use crate::SUBMAP_SIZE;

/// Absolute tile position in the game world.
pub type Location = IVec3;

/// Terminology:
///
/// - Submap lattice: A 2D grid at any z level with `SUBMAP_SIZE` sized cells
///   and a corner snapping to origin.
/// - Local position: The position of a tile inside its submap, always in
///   `[0, SUBMAP_SIZE)` on both axes, negative world coordinates included.
pub trait SubmapCoords {
    /// Lattice coordinates of the submap that contains this location.
    fn submap_pos(&self) -> IVec3;

    /// Position within the containing submap.
    fn local(&self) -> IVec2;

    /// Absolute location of the containing submap's top-left tile.
    fn submap_origin(&self) -> Location {
        let p = self.submap_pos();
        ivec3(p.x * SUBMAP_SIZE, p.y * SUBMAP_SIZE, p.z)
    }
}

impl SubmapCoords for Location {
    fn submap_pos(&self) -> IVec3 {
        ivec3(
            self.x.div_euclid(SUBMAP_SIZE),
            self.y.div_euclid(SUBMAP_SIZE),
            self.z,
        )
    }

    fn local(&self) -> IVec2 {
        self.truncate().rem_euclid(IVec2::splat(SUBMAP_SIZE))
    }
}

/// Is a local position inside submap bounds.
pub fn in_submap(p: IVec2) -> bool {
    (0..SUBMAP_SIZE).contains(&p.x) && (0..SUBMAP_SIZE).contains(&p.y)
}
