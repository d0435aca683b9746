//! Weather worldtest scenarios.
//!
//! Rain fills open barrels, leaves sealed or covered ones alone and puts out
//! exposed fire pits.

use homestead_core::{FluidKind, FluidStack, Wood};
use homestead_world::barrel::RAIN_FILL_AMOUNT;
use homestead_world::{
    Block, BlockPos, Content, Level, LevelSettings, WeatherSchedule, WeatherState,
};

fn barrel_at(level: &mut Level, pos: BlockPos) {
    level.set_block(pos.down(), Block::Dirt);
    level.set_block(
        pos,
        Block::Barrel {
            wood: Wood::Willow,
            sealed: false,
        },
    );
}

#[test]
fn rain_fills_only_exposed_open_barrels() {
    let content = Content::bootstrap().unwrap();
    let mut level = Level::new(LevelSettings::default());
    let open = BlockPos::new(0, 64, 0);
    let covered = BlockPos::new(2, 64, 0);
    let sealed = BlockPos::new(4, 64, 0);
    barrel_at(&mut level, open);
    barrel_at(&mut level, covered);
    barrel_at(&mut level, sealed);
    level.set_block(covered.up().up(), Block::Dirt);
    level.seal_barrel(sealed, &content.barrel_recipes);

    level.set_weather(WeatherState::Rain);
    for _ in 0..100 {
        level.tick(&content);
    }

    assert_eq!(
        level.barrel(open).unwrap().fluid(),
        Some(&FluidStack::new(FluidKind::FreshWater, RAIN_FILL_AMOUNT * 10))
    );
    assert!(level.barrel(covered).unwrap().fluid().is_none());
    assert!(level.barrel(sealed).unwrap().fluid().is_none());

    level.set_weather(WeatherState::Clear);
    for _ in 0..100 {
        level.tick(&content);
    }
    assert_eq!(
        level.barrel(open).unwrap().fluid().map(|f| f.amount),
        Some(RAIN_FILL_AMOUNT * 10)
    );
}

#[test]
fn scheduled_rain_puts_out_fire_pits() {
    let content = Content::bootstrap().unwrap();
    let mut level = Level::new(LevelSettings {
        seed: 9,
        random_tick_chance: 1,
        weather_schedule: Some(WeatherSchedule {
            clear_ticks: 40,
            rain_ticks: 40,
        }),
    });
    let pit = BlockPos::new(0, 64, 0);
    level.set_block(pit.down(), Block::Dirt);
    assert!(level.place_block(pit, Block::FirePit { lit: true }));
    assert!(level.blow_bellows(pit, BlockPos::new(1, 64, 0), 20));
    assert!(!level.blow_bellows(pit, BlockPos::new(0, 65, 0), 20));

    for _ in 0..39 {
        level.tick(&content);
    }
    assert_eq!(level.block(pit), Block::FirePit { lit: true });
    assert!(level.fire_pit(pit).unwrap().temperature() > 0.0);

    for _ in 0..5 {
        level.tick(&content);
    }
    assert!(level.weather().is_raining());
    assert_eq!(level.block(pit), Block::FirePit { lit: false });
}

#[test]
fn weather_is_identical_across_levels() {
    let content = Content::bootstrap().unwrap();
    let settings = LevelSettings {
        seed: 3,
        weather_schedule: Some(WeatherSchedule {
            clear_ticks: 17,
            rain_ticks: 5,
        }),
        ..LevelSettings::default()
    };
    let mut a = Level::new(settings);
    let mut b = Level::new(settings);
    for _ in 0..500 {
        a.tick(&content);
        b.tick(&content);
        assert_eq!(a.weather(), b.weather());
    }
}
