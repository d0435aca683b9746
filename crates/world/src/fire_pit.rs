//! Fire pit heat model.
//!
//! A lit pit climbs towards its burn temperature and cools back to ambient
//! when it goes out. Air pushed in by bellows raises the target temperature
//! for as long as the intake lasts; bellows only reach the pit from
//! [`BELLOWS_OFFSET`].

use serde::{Deserialize, Serialize};

use crate::persist::{FirePitRecord, FIRE_PIT_RECORD_VERSION};

/// Where bellows must sit relative to the pit to feed it.
pub const BELLOWS_OFFSET: (i32, i32, i32) = (1, 0, 0);

/// Temperature a lit pit settles at without extra air.
pub const BURN_TEMPERATURE: f32 = 600.0;
/// Hottest a pit can get.
pub const MAX_TEMPERATURE: f32 = 1200.0;
/// Longest air intake a pit can buffer, in ticks.
pub const MAX_AIR_TICKS: u32 = 600;

const AIR_BONUS: f32 = 400.0;
const HEAT_RATE: f32 = 5.0;
const COOL_RATE: f32 = 2.0;

/// Fire pit block entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FirePit {
    temperature: f32,
    air_ticks: u32,
}

impl FirePit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn air_ticks(&self) -> u32 {
        self.air_ticks
    }

    /// Whether bellows at `offset` from the pit can blow into it.
    pub fn can_intake_from(offset: (i32, i32, i32)) -> bool {
        offset == BELLOWS_OFFSET
    }

    /// Buffer `ticks` of forced air.
    pub fn on_air_intake(&mut self, ticks: u32) {
        self.air_ticks = self.air_ticks.saturating_add(ticks).min(MAX_AIR_TICKS);
    }

    pub fn target_temperature(&self, lit: bool) -> f32 {
        match (lit, self.air_ticks > 0) {
            (false, _) => 0.0,
            (true, false) => BURN_TEMPERATURE,
            (true, true) => (BURN_TEMPERATURE + AIR_BONUS).min(MAX_TEMPERATURE),
        }
    }

    /// Move one tick towards the target temperature.
    pub fn update(&mut self, lit: bool) {
        let target = self.target_temperature(lit);
        if self.temperature < target {
            self.temperature = (self.temperature + HEAT_RATE).min(target);
        } else if self.temperature > target {
            self.temperature = (self.temperature - COOL_RATE).max(target);
        }
        self.air_ticks = self.air_ticks.saturating_sub(1);
    }

    pub fn to_record(&self) -> FirePitRecord {
        FirePitRecord {
            version: FIRE_PIT_RECORD_VERSION,
            temperature: self.temperature,
            air_ticks: self.air_ticks,
        }
    }

    pub fn from_record(record: &FirePitRecord) -> Self {
        Self {
            temperature: record.temperature.clamp(0.0, MAX_TEMPERATURE),
            air_ticks: record.air_ticks.min(MAX_AIR_TICKS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_east_side_takes_air() {
        assert!(FirePit::can_intake_from((1, 0, 0)));
        assert!(!FirePit::can_intake_from((-1, 0, 0)));
        assert!(!FirePit::can_intake_from((0, 1, 0)));
    }

    #[test]
    fn lit_pit_heats_to_burn_temperature() {
        let mut pit = FirePit::new();
        for _ in 0..500 {
            pit.update(true);
        }
        assert_eq!(pit.temperature(), BURN_TEMPERATURE);
    }

    #[test]
    fn air_pushes_past_burn_temperature_then_decays() {
        let mut pit = FirePit::new();
        for _ in 0..200 {
            pit.update(true);
        }
        pit.on_air_intake(MAX_AIR_TICKS * 2);
        assert_eq!(pit.air_ticks(), MAX_AIR_TICKS);
        for _ in 0..100 {
            pit.update(true);
        }
        assert!(pit.temperature() > BURN_TEMPERATURE);

        for _ in 0..2000 {
            pit.update(true);
        }
        assert_eq!(pit.air_ticks(), 0);
        assert_eq!(pit.temperature(), BURN_TEMPERATURE);
    }

    #[test]
    fn oversized_air_intake_saturates() {
        let mut pit = FirePit::new();
        pit.on_air_intake(10);
        pit.on_air_intake(u32::MAX);
        assert_eq!(pit.air_ticks(), MAX_AIR_TICKS);
    }

    #[test]
    fn unlit_pit_cools() {
        let mut pit = FirePit::new();
        for _ in 0..200 {
            pit.update(true);
        }
        let hot = pit.temperature();
        pit.update(false);
        assert!(pit.temperature() < hot);
    }
}
