//! The fixed bell schedule: eight periods a day.

use chrono::NaiveTime;

/// Number of teaching periods in a day.
pub const PERIOD_COUNT: u8 = 8;

/// One period of the bell schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSlot {
    pub id: u8,
    start: (u32, u32),
    end: (u32, u32),
}

/// Periods 1 through 8 in order.
pub const PERIODS: [PeriodSlot; PERIOD_COUNT as usize] = [
    PeriodSlot::new(1, (9, 10), (9, 50)),
    PeriodSlot::new(2, (9, 50), (10, 40)),
    PeriodSlot::new(3, (11, 0), (11, 50)),
    PeriodSlot::new(4, (11, 50), (12, 40)),
    PeriodSlot::new(5, (13, 30), (14, 15)),
    PeriodSlot::new(6, (14, 15), (15, 0)),
    PeriodSlot::new(7, (15, 15), (16, 0)),
    PeriodSlot::new(8, (16, 0), (16, 45)),
];

/// Breaks printed under the grid.
pub const BREAKS: [&str; 3] = [
    "FN Break: 10.40 am - 11.00 am",
    "Lunch Break: 12.40 pm - 01.30 pm",
    "AN Break: 03.00 pm - 03.15 pm (Except Sat)",
];

/// The fixed slot before period 1 on every day.
pub const OPENING_SLOT: (&str, &str) = ("9:00 - 9:10", "Meditation & News Reading");

impl PeriodSlot {
    const fn new(id: u8, start: (u32, u32), end: (u32, u32)) -> Self {
        Self { id, start, end }
    }

    pub fn start(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.start.0, self.start.1, 0).unwrap_or(NaiveTime::MIN)
    }

    pub fn end(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.end.0, self.end.1, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Start as stored on entries, e.g. `09:10 AM`.
    pub fn start_label(&self) -> String {
        self.start().format("%I:%M %p").to_string()
    }

    /// End as stored on entries, e.g. `12:40 PM`.
    pub fn end_label(&self) -> String {
        self.end().format("%I:%M %p").to_string()
    }

    /// Compact range used in the grid header, e.g. `1.30 - 2.15`.
    pub fn header_label(&self) -> String {
        format!(
            "{} - {}",
            self.start().format("%-I.%M"),
            self.end().format("%-I.%M")
        )
    }
}

/// Looks up a period by its 1-based id.
pub fn period_slot(id: u8) -> Option<&'static PeriodSlot> {
    PERIODS.iter().find(|p| p.id == id)
}

/// Returns true if `id` names one of the eight periods.
pub fn is_valid_period(id: u8) -> bool {
    (1..=PERIOD_COUNT).contains(&id)
}

/// Display times for a class running from `start` to `end` inclusive.
///
/// A missing or earlier `end` falls back to the start period's end.
pub fn derived_times(start: u8, end: Option<u8>) -> Option<(String, String)> {
    let first = period_slot(start)?;
    let last = end
        .filter(|&e| e >= start)
        .and_then(period_slot)
        .unwrap_or(first);
    Some((first.start_label(), last.end_label()))
}
