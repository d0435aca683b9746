//! Block positions, facings and the block states this content set places.

use homestead_core::{CropKind, RockKind, Wood};
use homestead_net::WirePos;
use serde::{Deserialize, Serialize};

/// Highest growth stage any crop reaches.
pub const MAX_CROP_STAGE: u8 = 7;

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn up(self) -> Self {
        self.add(0, 1, 0)
    }

    pub fn down(self) -> Self {
        self.add(0, -1, 0)
    }

    pub fn add(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn offset(self, facing: Facing) -> Self {
        let (dx, dy, dz) = facing.vector();
        self.add(dx, dy, dz)
    }

    /// Hash used to scope per-position random streams.
    pub fn hash_u64(self) -> u64 {
        let x = self.x as u32 as u64;
        let y = self.y as u32 as u64;
        let z = self.z as u32 as u64;
        x.wrapping_mul(0x9E37_79B1)
            ^ y.wrapping_mul(0x85EB_CA77).rotate_left(21)
            ^ z.wrapping_mul(0xC2B2_AE3D).rotate_left(42)
    }

    pub fn to_wire(self) -> WirePos {
        [self.x, self.y, self.z]
    }

    pub fn from_wire(pos: WirePos) -> Self {
        Self::new(pos[0], pos[1], pos[2])
    }
}

/// Block face / direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Facing {
    /// Every facing.
    pub const ALL: [Facing; 6] = [
        Facing::Down,
        Facing::Up,
        Facing::North,
        Facing::South,
        Facing::West,
        Facing::East,
    ];

    /// Horizontal facings in the order random picks index into.
    pub const HORIZONTALS: [Facing; 4] = [Facing::South, Facing::West, Facing::North, Facing::East];

    pub fn vector(self) -> (i32, i32, i32) {
        match self {
            Facing::Down => (0, -1, 0),
            Facing::Up => (0, 1, 0),
            Facing::North => (0, 0, -1),
            Facing::South => (0, 0, 1),
            Facing::West => (-1, 0, 0),
            Facing::East => (1, 0, 0),
        }
    }
}

/// Block state at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    Air,
    Dirt,
    Grass,
    Farmland,
    RawRock(RockKind),
    StoneAnvil(RockKind),
    Workbench(Wood),
    Barrel { wood: Wood, sealed: bool },
    FirePit { lit: bool },
    SpreadingCrop { crop: CropKind, stage: u8, wild: bool },
}

impl Block {
    pub fn is_air(self) -> bool {
        matches!(self, Block::Air)
    }

    /// Whether the top face is solid enough to stand things on.
    pub fn is_solid_top(self) -> bool {
        matches!(
            self,
            Block::Dirt
                | Block::Grass
                | Block::Farmland
                | Block::RawRock(_)
                | Block::StoneAnvil(_)
                | Block::Workbench(_)
                | Block::Barrel { .. }
        )
    }

    /// Whether a crop may grow on top of this block.
    pub fn can_sustain_plant(self) -> bool {
        matches!(self, Block::Dirt | Block::Grass | Block::Farmland)
    }

    /// Whether rain falling through this position is stopped here.
    pub fn blocks_rain(self) -> bool {
        !matches!(
            self,
            Block::Air | Block::FirePit { .. } | Block::SpreadingCrop { .. }
        )
    }

    /// Whether the block carries a block entity.
    pub fn has_block_entity(self) -> bool {
        matches!(
            self,
            Block::Barrel { .. } | Block::FirePit { .. } | Block::SpreadingCrop { .. }
        )
    }

    /// Spreading crop state packed as `stage | wild << 3`.
    pub fn crop_meta(self) -> Option<u8> {
        match self {
            Block::SpreadingCrop { stage, wild, .. } => Some(stage + if wild { 8 } else { 0 }),
            _ => None,
        }
    }

    /// Inverse of [`Block::crop_meta`].
    pub fn crop_from_meta(crop: CropKind, meta: u8) -> Block {
        Block::SpreadingCrop {
            crop,
            stage: meta & 7,
            wild: meta > 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_move_one_block() {
        let pos = BlockPos::new(0, 64, 0);
        assert_eq!(pos.offset(Facing::East), BlockPos::new(1, 64, 0));
        assert_eq!(pos.offset(Facing::North), BlockPos::new(0, 64, -1));
        assert_eq!(pos.up().down(), pos);
        for facing in Facing::HORIZONTALS {
            assert_eq!(pos.offset(facing).y, 64);
        }
    }

    #[test]
    fn wire_roundtrip() {
        let pos = BlockPos::new(-4, 70, 12);
        assert_eq!(BlockPos::from_wire(pos.to_wire()), pos);
    }

    #[test]
    fn crop_meta_packs_stage_and_wild() {
        let block = Block::SpreadingCrop {
            crop: CropKind::Pumpkin,
            stage: 5,
            wild: true,
        };
        assert_eq!(block.crop_meta(), Some(13));
        assert_eq!(Block::crop_from_meta(CropKind::Pumpkin, 13), block);
        assert_eq!(Block::Dirt.crop_meta(), None);
    }

    #[test]
    fn plants_need_soil() {
        assert!(Block::Farmland.can_sustain_plant());
        assert!(!Block::RawRock(RockKind::Granite).can_sustain_plant());
        assert!(!Block::Air.is_solid_top());
    }

    #[test]
    fn low_blocks_let_rain_through() {
        assert!(!Block::FirePit { lit: true }.blocks_rain());
        assert!(Block::Workbench(Wood::Oak).blocks_rain());
        assert!(Block::Barrel {
            wood: Wood::Pine,
            sealed: false
        }
        .blocks_rain());
    }
}
