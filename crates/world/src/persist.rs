//! Block-entity records and level snapshots.
//!
//! Block entities save to flat, versioned records. Every record field has a
//! default, so records written by older versions (or hand-edited JSON) load
//! with missing fields treated as empty.
//!
//! A whole level saves to a snapshot file: a fixed header (magic, version,
//! CRC32 of the payload, payload length) followed by a zstd-compressed bincode
//! payload.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use crc32fast::Hasher;
use homestead_core::{Calendar, FluidStack, ItemStack, RegistryKey, SimTick};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::barrel::Barrel;
use crate::block::{Block, BlockPos};
use crate::capability::BlockEntity;
use crate::crop::SpreadingCrop;
use crate::fire_pit::FirePit;
use crate::level::{Level, LevelSettings};
use crate::weather::Weather;

pub const BARREL_RECORD_VERSION: u16 = 1;
pub const CROP_RECORD_VERSION: u16 = 1;
pub const FIRE_PIT_RECORD_VERSION: u16 = 1;

/// Magic number for snapshot files ("HSLV" = homestead level).
const SNAPSHOT_MAGIC: u32 = 0x4853_4C56;

/// Current snapshot format version.
const SNAPSHOT_VERSION: u16 = 1;

const HEADER_LEN: usize = 14;

/// Saved barrel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarrelRecord {
    pub version: u16,
    pub tank: Option<FluidStack>,
    pub inventory: Vec<Option<ItemStack>>,
    pub sealed: bool,
    pub sealed_tick: u64,
    pub sealed_calendar_tick: u64,
    pub recipe: Option<RegistryKey>,
    pub tick_counter: u32,
}

/// Saved spreading crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropRecord {
    pub version: u16,
    pub max_growth_stage: u8,
    pub base_age: u8,
}

/// Saved fire pit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FirePitRecord {
    pub version: u16,
    pub temperature: f32,
    pub air_ticks: u32,
}

/// Any saved block entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityRecord {
    Barrel(BarrelRecord),
    SpreadingCrop(CropRecord),
    FirePit(FirePitRecord),
}

impl EntityRecord {
    pub fn from_entity(entity: &BlockEntity) -> Self {
        match entity {
            BlockEntity::Barrel(barrel) => EntityRecord::Barrel(barrel.to_record()),
            BlockEntity::SpreadingCrop(crop) => EntityRecord::SpreadingCrop(crop.to_record()),
            BlockEntity::FirePit(pit) => EntityRecord::FirePit(pit.to_record()),
        }
    }

    pub fn to_entity(&self) -> BlockEntity {
        match self {
            EntityRecord::Barrel(record) => BlockEntity::Barrel(Barrel::from_record(record)),
            EntityRecord::SpreadingCrop(record) => {
                BlockEntity::SpreadingCrop(SpreadingCrop::from_record(record))
            }
            EntityRecord::FirePit(record) => BlockEntity::FirePit(FirePit::from_record(record)),
        }
    }
}

/// Encode a record as JSON.
pub fn encode_record<T: Serialize>(record: &T) -> Result<String> {
    serde_json::to_string(record).context("Failed to encode record")
}

/// Decode a JSON record, falling back to the default record when the input
/// is unreadable.
pub fn decode_record_lenient<T: DeserializeOwned + Default>(text: &str) -> T {
    match serde_json::from_str(text) {
        Ok(record) => record,
        Err(err) => {
            warn!(%err, "unreadable record, using defaults");
            T::default()
        }
    }
}

/// Everything needed to rebuild a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub settings: LevelSettings,
    pub total_ticks: u64,
    pub calendar_ticks: u64,
    pub weather: Weather,
    pub blocks: Vec<(BlockPos, Block)>,
    pub entities: Vec<(BlockPos, EntityRecord)>,
}

impl Level {
    pub fn to_snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            settings: *self.settings(),
            total_ticks: self.calendar().total_time().0,
            calendar_ticks: self.calendar().calendar_time(),
            weather: *self.weather(),
            blocks: self.blocks().map(|(pos, block)| (*pos, *block)).collect(),
            entities: self
                .entities()
                .map(|(pos, entity)| (*pos, EntityRecord::from_entity(entity)))
                .collect(),
        }
    }

    /// Rebuild a level. Entities missing from the snapshot, or saved for a
    /// different kind of block, are recreated empty.
    pub fn from_snapshot(snapshot: &LevelSnapshot) -> Self {
        let blocks: BTreeMap<BlockPos, Block> = snapshot
            .blocks
            .iter()
            .filter(|(_, block)| !block.is_air())
            .copied()
            .collect();

        let mut entities = BTreeMap::new();
        for (pos, record) in &snapshot.entities {
            let block = blocks.get(pos).copied().unwrap_or(Block::Air);
            let entity = record.to_entity();
            if entity_matches(block, &entity) {
                entities.insert(*pos, entity);
            } else {
                warn!(?pos, ?block, "dropping block entity saved for another block");
            }
        }
        for (pos, block) in &blocks {
            if entities.contains_key(pos) {
                continue;
            }
            if let Some(entity) = default_entity(*block) {
                entities.insert(*pos, entity);
            }
        }

        Level::from_parts(
            snapshot.settings,
            Calendar::from_counters(SimTick(snapshot.total_ticks), snapshot.calendar_ticks),
            snapshot.weather,
            blocks,
            entities,
        )
    }
}

fn entity_matches(block: Block, entity: &BlockEntity) -> bool {
    matches!(
        (block, entity),
        (Block::Barrel { .. }, BlockEntity::Barrel(_))
            | (Block::SpreadingCrop { .. }, BlockEntity::SpreadingCrop(_))
            | (Block::FirePit { .. }, BlockEntity::FirePit(_))
    )
}

fn default_entity(block: Block) -> Option<BlockEntity> {
    match block {
        Block::Barrel { .. } => Some(BlockEntity::Barrel(Barrel::new())),
        Block::SpreadingCrop { stage, .. } => {
            Some(BlockEntity::SpreadingCrop(SpreadingCrop::on_placed(stage)))
        }
        Block::FirePit { .. } => Some(BlockEntity::FirePit(FirePit::new())),
        _ => None,
    }
}

/// Snapshot file header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SnapshotHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl SnapshotHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.extend_from_slice(&self.magic.to_le_bytes());
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.crc32.to_le_bytes());
        bytes.extend_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            anyhow::bail!("Snapshot header too short");
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != SNAPSHOT_MAGIC {
            anyhow::bail!(
                "Invalid snapshot magic: expected 0x{:08X}, got 0x{:08X}",
                SNAPSHOT_MAGIC,
                magic
            );
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != SNAPSHOT_VERSION {
            anyhow::bail!("Unsupported snapshot version {}", version);
        }
        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

/// Serialize a snapshot to file bytes.
pub fn encode_snapshot(snapshot: &LevelSnapshot) -> Result<Vec<u8>> {
    let serialized = bincode::serialize(snapshot).context("Failed to serialize snapshot")?;
    let compressed =
        zstd::encode_all(&serialized[..], 3).context("Failed to compress snapshot")?;

    let mut hasher = Hasher::new();
    hasher.update(&compressed);
    let header = SnapshotHeader::new(hasher.finalize(), compressed.len() as u32);

    let mut bytes = header.to_bytes();
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

/// Parse file bytes written by [`encode_snapshot`].
pub fn decode_snapshot(bytes: &[u8]) -> Result<LevelSnapshot> {
    let header = SnapshotHeader::from_bytes(bytes)?;
    let payload = bytes
        .get(HEADER_LEN..HEADER_LEN + header.payload_len as usize)
        .context("Snapshot payload truncated")?;

    let mut hasher = Hasher::new();
    hasher.update(payload);
    let computed_crc = hasher.finalize();
    if computed_crc != header.crc32 {
        anyhow::bail!(
            "CRC32 mismatch: expected {:08X}, got {:08X}",
            header.crc32,
            computed_crc
        );
    }

    let decompressed = zstd::decode_all(payload).context("Failed to decompress snapshot")?;
    bincode::deserialize(&decompressed).context("Failed to deserialize snapshot")
}

/// Write a level snapshot to `path`.
pub fn save_level(level: &Level, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
    }
    let bytes = encode_snapshot(&level.to_snapshot())?;
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create snapshot {}", path.display()))?;
    file.write_all(&bytes).context("Failed to write snapshot")?;
    Ok(())
}

/// Read a level snapshot from `path`.
pub fn load_level(path: &Path) -> Result<Level> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open snapshot {}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .context("Failed to read snapshot")?;
    let snapshot = decode_snapshot(&bytes)?;
    Ok(Level::from_snapshot(&snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestead_core::{FluidKind, ItemType, Wood};

    #[test]
    fn header_roundtrip() {
        let header = SnapshotHeader::new(0xDEAD_BEEF, 1234);
        let decoded = SnapshotHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = SnapshotHeader::new(0, 0).to_bytes();
        bytes[0] ^= 0xFF;
        assert!(SnapshotHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn barrel_record_uses_camel_case_keys() {
        let record = BarrelRecord {
            version: BARREL_RECORD_VERSION,
            tank: Some(FluidStack::new(FluidKind::Brine, 250)),
            inventory: vec![None, None, Some(ItemStack::new(ItemType::Salt, 2))],
            sealed: true,
            sealed_tick: 40,
            sealed_calendar_tick: 9040,
            recipe: Some(RegistryKey::homestead(&["pickling"])),
            tick_counter: 3,
        };
        let json = encode_record(&record).unwrap();
        assert!(json.contains("\"sealedCalendarTick\":9040"));
        assert!(json.contains("\"recipe\":\"homestead:pickling\""));
        assert_eq!(decode_record_lenient::<BarrelRecord>(&json), record);
    }

    #[test]
    fn missing_fields_load_as_empty() {
        let record: BarrelRecord = decode_record_lenient(r#"{"sealed":true}"#);
        assert!(record.sealed);
        assert_eq!(record.sealed_tick, 0);
        assert!(record.tank.is_none());
        assert!(record.recipe.is_none());

        let garbage: BarrelRecord = decode_record_lenient("not json");
        assert_eq!(garbage, BarrelRecord::default());
    }

    #[test]
    fn corrupted_payload_fails_crc() {
        let level = Level::new(LevelSettings::default());
        let mut bytes = encode_snapshot(&level.to_snapshot()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x55;
        assert!(decode_snapshot(&bytes).is_err());
    }

    #[test]
    fn snapshot_restores_missing_entities() {
        let pos = BlockPos::new(3, 64, 3);
        let snapshot = LevelSnapshot {
            settings: LevelSettings::default(),
            total_ticks: 10,
            calendar_ticks: 20,
            weather: Weather::new(),
            blocks: vec![(
                pos,
                Block::Barrel {
                    wood: Wood::Birch,
                    sealed: false,
                },
            )],
            entities: vec![(
                pos,
                EntityRecord::FirePit(FirePitRecord::default()),
            )],
        };
        let level = Level::from_snapshot(&snapshot);
        assert_eq!(level.barrel(pos), Some(&Barrel::new()));
        assert_eq!(level.now(), SimTick(10));
        assert_eq!(level.calendar().calendar_time(), 20);
    }
}
