//! In-world calendar.
//!
//! Two counters advance together: the raw tick counter, which only ever moves
//! forward one tick at a time, and the calendar counter, which can additionally
//! jump (sleeping, time skips). Elapsed-duration checks use the raw counter;
//! dates shown to players come from the calendar counter.

use serde::{Deserialize, Serialize};

use crate::SimTick;

/// Ticks in one in-game day (20 minutes at 20 TPS).
pub const TICKS_PER_DAY: u64 = 24_000;
/// Ticks in one in-game hour.
pub const TICKS_PER_HOUR: u64 = 1_000;
/// Days in each month.
pub const DAYS_PER_MONTH: u64 = 8;
/// Months in each year.
pub const MONTHS_PER_YEAR: u64 = 12;
/// Year displayed for calendar tick 0.
pub const START_YEAR: u64 = 1000;

/// Calendar tick 0 is 06:00 on the first day.
const DAWN_OFFSET_TICKS: u64 = 6 * TICKS_PER_HOUR;

/// Month of the in-game year.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Month for a zero-based index, wrapping around the year.
    pub fn from_index(index: u64) -> Self {
        Self::ALL[(index % MONTHS_PER_YEAR) as usize]
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

/// World clock with a raw tick counter and a calendar counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Calendar {
    total: SimTick,
    calendar: u64,
}

impl Calendar {
    /// Calendar starting at tick 0 on both counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calendar resumed from saved counters.
    pub fn from_counters(total: SimTick, calendar: u64) -> Self {
        Self { total, calendar }
    }

    /// Advance both counters by one tick.
    pub fn advance(&mut self) {
        self.total = self.total.advance(1);
        self.calendar += 1;
    }

    /// Move the calendar forward without touching the raw tick counter.
    pub fn skip_calendar(&mut self, ticks: u64) {
        self.calendar += ticks;
    }

    /// Raw tick counter.
    pub fn total_time(&self) -> SimTick {
        self.total
    }

    /// Calendar tick counter.
    pub fn calendar_time(&self) -> u64 {
        self.calendar
    }

    /// Formatted date of the current calendar tick.
    pub fn now_display(&self) -> String {
        time_and_date(self.calendar)
    }
}

/// Format a calendar tick as `HH:MM Month D, YYYY`.
pub fn time_and_date(calendar_tick: u64) -> String {
    let shifted = calendar_tick + DAWN_OFFSET_TICKS;
    let days = shifted / TICKS_PER_DAY;
    let tick_in_day = shifted % TICKS_PER_DAY;

    let hour = tick_in_day / TICKS_PER_HOUR;
    let minute = (tick_in_day % TICKS_PER_HOUR) * 60 / TICKS_PER_HOUR;

    let month = Month::from_index(days / DAYS_PER_MONTH);
    let day = days % DAYS_PER_MONTH + 1;
    let year = START_YEAR + days / (DAYS_PER_MONTH * MONTHS_PER_YEAR);

    format!("{hour:02}:{minute:02} {} {day}, {year}", month.name())
}
