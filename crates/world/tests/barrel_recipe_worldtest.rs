//! Sealed barrel recipe worldtests.
//!
//! Drives barrels through seal, wait and completion the same way the level
//! does, checking the exact tick a recipe resolves on.

use homestead_core::{FluidKind, FluidStack, FoodType, ItemStack, ItemType, RegistryKey, SimTick};
use homestead_world::barrel::{BarrelTickEnv, SLOT_ITEM, TANK_CAPACITY};
use homestead_world::{
    Barrel, BarrelEvent, BarrelRecipe, BarrelRecipes, Block, BlockPos, Content, FluidIngredient,
    ItemIngredient, Level, LevelSettings,
};

fn pickling_recipes() -> BarrelRecipes {
    let mut recipes = BarrelRecipes::new();
    recipes
        .register(
            BarrelRecipe::timed(
                RegistryKey::homestead(&["pickling"]),
                FluidIngredient {
                    kind: FluidKind::FreshWater,
                    amount: 500,
                },
                Some(ItemIngredient {
                    item_type: ItemType::Food(FoodType::Wheat),
                    count: 1,
                }),
                20,
            )
            .with_output_fluid(FluidStack::new(FluidKind::Brine, 500))
            .with_output_item(ItemStack::new(ItemType::Food(FoodType::Pickle), 1)),
        )
        .unwrap();
    recipes
}

fn update(barrel: &mut Barrel, now: u64, recipes: &BarrelRecipes) {
    barrel.update(&BarrelTickEnv {
        now: SimTick(now),
        raining_above: false,
        recipes,
    });
}

#[test]
fn pickling_completes_after_its_duration() {
    let recipes = pickling_recipes();
    let mut barrel = Barrel::new();
    assert_eq!(barrel.tank().capacity(), TANK_CAPACITY);

    assert_eq!(
        barrel.fill(&FluidStack::new(FluidKind::FreshWater, 500), &recipes),
        500
    );
    let leftover = barrel.insert(
        SLOT_ITEM,
        ItemStack::new(ItemType::Food(FoodType::Wheat), 1),
        None,
        &recipes,
    );
    assert!(leftover.is_none());

    assert!(barrel.seal(SimTick::ZERO, 0, &recipes));
    assert_eq!(
        barrel.active_recipe(),
        Some(&RegistryKey::homestead(&["pickling"]))
    );
    barrel.drain_events();

    for now in 1..=20 {
        update(&mut barrel, now, &recipes);
        assert_eq!(
            barrel.fluid(),
            Some(&FluidStack::new(FluidKind::FreshWater, 500)),
            "fluid changed early at tick {now}"
        );
        assert!(barrel.active_recipe().is_some());
    }

    update(&mut barrel, 21, &recipes);
    assert_eq!(barrel.fluid(), Some(&FluidStack::new(FluidKind::Brine, 500)));
    assert_eq!(
        barrel.slot(SLOT_ITEM),
        Some(&ItemStack::new(ItemType::Food(FoodType::Pickle), 1))
    );
    assert!(barrel.active_recipe().is_none());
    assert!(barrel.is_sealed());
    assert!(barrel
        .drain_events()
        .contains(&BarrelEvent::RecipeCompleted(RegistryKey::homestead(&["pickling"]))));
}

#[test]
fn unsealing_early_keeps_inputs() {
    let recipes = pickling_recipes();
    let mut barrel = Barrel::new();
    barrel.fill(&FluidStack::new(FluidKind::FreshWater, 500), &recipes);
    barrel.insert(
        SLOT_ITEM,
        ItemStack::new(ItemType::Food(FoodType::Wheat), 1),
        None,
        &recipes,
    );
    barrel.seal(SimTick::ZERO, 0, &recipes);
    update(&mut barrel, 10, &recipes);

    assert!(barrel.unseal());
    update(&mut barrel, 30, &recipes);
    assert_eq!(
        barrel.fluid(),
        Some(&FluidStack::new(FluidKind::FreshWater, 500))
    );
    assert_eq!(
        barrel.slot(SLOT_ITEM),
        Some(&ItemStack::new(ItemType::Food(FoodType::Wheat), 1))
    );
}

#[test]
fn sealing_without_a_match_has_no_recipe() {
    let recipes = pickling_recipes();
    let mut barrel = Barrel::new();
    barrel.fill(&FluidStack::new(FluidKind::Milk, 500), &recipes);
    assert!(barrel.seal(SimTick(5), 0, &recipes));
    assert!(barrel.active_recipe().is_none());
    assert!(!barrel.seal(SimTick(6), 0, &recipes));
    assert_eq!(barrel.sealed_tick(), SimTick(5));
}

#[test]
fn level_publishes_seal_and_completion() {
    let content = Content::bootstrap().unwrap();
    let mut level = Level::new(LevelSettings::default());
    let ground = BlockPos::new(0, 63, 0);
    let pos = ground.up();
    level.set_block(ground, Block::Dirt);
    level.set_block(
        pos,
        Block::Barrel {
            wood: homestead_core::Wood::Pine,
            sealed: false,
        },
    );

    let barrel = level.barrel_mut(pos).unwrap();
    barrel.fill(
        &FluidStack::new(FluidKind::Milk, 1000),
        &content.barrel_recipes,
    );
    barrel.insert(
        SLOT_ITEM,
        ItemStack::new(ItemType::Salt, 1),
        None,
        &content.barrel_recipes,
    );
    level.drain_messages();

    assert!(level.seal_barrel(pos, &content.barrel_recipes));
    assert_eq!(
        level.block(pos),
        Block::Barrel {
            wood: homestead_core::Wood::Pine,
            sealed: true
        }
    );
    let messages = level.drain_messages();
    assert!(messages.iter().any(|envelope| matches!(
        envelope.payload,
        homestead_net::BlockEntityMessage::BarrelUpdate { .. }
    )));

    let recipe = level.barrel(pos).unwrap().active_recipe().cloned().unwrap();
    let duration = content.barrel_recipes.get(&recipe).unwrap().duration;
    for _ in 0..=duration {
        level.tick(&content);
    }
    let barrel = level.barrel(pos).unwrap();
    assert!(barrel.active_recipe().is_none());
    assert!(barrel.fluid().is_none());
    assert_eq!(
        barrel.slot(SLOT_ITEM),
        Some(&ItemStack::new(ItemType::Food(FoodType::Cheese), 1))
    );
}
