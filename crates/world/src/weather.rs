//! Deterministic weather.
//!
//! Weather is either set explicitly or driven by a fixed clear/rain schedule,
//! so replays of the same tick sequence always see the same rain.

use serde::{Deserialize, Serialize};

/// Current weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherState {
    #[default]
    Clear,
    Rain,
    Thunderstorm,
}

/// Alternating clear and rainy spells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSchedule {
    pub clear_ticks: u64,
    pub rain_ticks: u64,
}

/// Emitted when the weather changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherChanged {
    pub from: WeatherState,
    pub to: WeatherState,
}

/// Level-wide weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Weather {
    state: WeatherState,
    ticks_in_state: u64,
    schedule: Option<WeatherSchedule>,
}

impl Weather {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(schedule: WeatherSchedule) -> Self {
        Self {
            schedule: Some(schedule),
            ..Self::default()
        }
    }

    pub fn state(&self) -> WeatherState {
        self.state
    }

    pub fn schedule(&self) -> Option<WeatherSchedule> {
        self.schedule
    }

    pub fn is_raining(&self) -> bool {
        matches!(self.state, WeatherState::Rain | WeatherState::Thunderstorm)
    }

    /// Switch to `state`, restarting the current spell.
    pub fn set_state(&mut self, state: WeatherState) -> Option<WeatherChanged> {
        self.ticks_in_state = 0;
        if state == self.state {
            return None;
        }
        let from = std::mem::replace(&mut self.state, state);
        Some(WeatherChanged { from, to: state })
    }

    /// Advance one tick, following the schedule if there is one.
    pub fn tick(&mut self) -> Option<WeatherChanged> {
        self.ticks_in_state += 1;
        let schedule = self.schedule?;
        let (limit, next) = if self.is_raining() {
            (schedule.rain_ticks, WeatherState::Clear)
        } else {
            (schedule.clear_ticks, WeatherState::Rain)
        };
        if self.ticks_in_state < limit {
            return None;
        }
        self.set_state(next)
    }
}
