//! Block-level simulation: barrels, spreading crops, fire pits and the level
//! that ticks them.

pub mod barrel;
pub mod barrel_recipe;
pub mod block;
pub mod capability;
pub mod content;
pub mod crop;
pub mod fire_pit;
pub mod fluid_transfer;
pub mod interaction;
pub mod level;
pub mod persist;
pub mod weather;

pub use barrel::{Barrel, BarrelEvent, BarrelItemTag, BarrelPhase, LockPolicy};
pub use barrel_recipe::{BarrelRecipe, BarrelRecipes, FluidIngredient, ItemIngredient};
pub use block::{Block, BlockPos, Facing};
pub use capability::{BlockEntity, FluidHandler, ItemHandler};
pub use content::{Content, ContentRegistry, RegistryError};
pub use crop::{GrowthStep, SpreadingCrop};
pub use fire_pit::FirePit;
pub use interaction::{Activation, BlockDrop, InteractionResult, Screen};
pub use level::{Level, LevelSettings};
pub use persist::{load_level, save_level, LevelSnapshot};
pub use weather::{Weather, WeatherChanged, WeatherSchedule, WeatherState};
