//! Day × period grid layout for a timetable snapshot.
//!
//! Entries are indexed by day once; every lookup is then a linear scan over
//! that day's entries, which is plenty for the tens of entries a filter
//! returns. When two entries on one day overlap (the backend is supposed to
//! prevent this) the first one in input order wins.

use crate::types::{is_valid_period, Day, TimetableEntry, BREAKS, OPENING_SLOT, PERIODS, PERIOD_COUNT};

/// How many period columns an entry's cell spans.
///
/// Always at least 1; an end before the start is treated as a single period.
pub fn span_count(entry: &TimetableEntry) -> u8 {
    entry
        .end_period
        .saturating_sub(entry.period_number)
        .saturating_add(1)
        .max(1)
}

/// One rendered cell of a grid row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridCell<'a> {
    /// Nothing scheduled; editors may add a class here.
    Empty { day: Day, period: u8 },
    /// Merged cell for one entry, covering `span` columns from `period`.
    Occupied {
        entry: &'a TimetableEntry,
        period: u8,
        span: u8,
    },
}

impl GridCell<'_> {
    pub fn period(&self) -> u8 {
        match self {
            GridCell::Empty { period, .. } | GridCell::Occupied { period, .. } => *period,
        }
    }

    /// Number of period columns this cell takes up.
    pub fn colspan(&self) -> u8 {
        match self {
            GridCell::Empty { .. } => 1,
            GridCell::Occupied { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow<'a> {
    pub day: Day,
    pub cells: Vec<GridCell<'a>>,
}

/// A full week: one row per day, cells in period order, continuation cells
/// of multi-period entries omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout<'a> {
    pub rows: Vec<GridRow<'a>>,
}

/// Resolves which entry occupies each (day, period) cell.
#[derive(Debug, Clone)]
pub struct GridResolver<'a> {
    by_day: [Vec<&'a TimetableEntry>; 6],
}

impl<'a> GridResolver<'a> {
    pub fn new(entries: &'a [TimetableEntry]) -> Self {
        let mut by_day: [Vec<&'a TimetableEntry>; 6] = Default::default();
        for entry in entries {
            // An entry that starts off the grid has no cell to be drawn in.
            if is_valid_period(entry.period_number) {
                by_day[entry.day.index()].push(entry);
            }
        }
        Self { by_day }
    }

    /// The entry whose inclusive period range contains `period` on `day`.
    pub fn find_entry(&self, day: Day, period: u8) -> Option<&'a TimetableEntry> {
        if !is_valid_period(period) {
            return None;
        }
        self.by_day[day.index()]
            .iter()
            .copied()
            .find(|entry| entry.covers(period))
    }

    /// True if a merged cell starts at this position.
    pub fn is_span_start(&self, day: Day, period: u8) -> bool {
        self.find_entry(day, period)
            .is_some_and(|entry| entry.period_number == period)
    }

    /// True if this position continues an entry that started earlier and
    /// must not be rendered on its own.
    pub fn is_in_span(&self, day: Day, period: u8) -> bool {
        self.find_entry(day, period)
            .is_some_and(|entry| entry.period_number != period)
    }

    /// Cells for one day, left to right.
    pub fn row(&self, day: Day) -> GridRow<'a> {
        let mut cells = Vec::with_capacity(PERIOD_COUNT as usize);
        for period in 1..=PERIOD_COUNT {
            if self.is_in_span(day, period) {
                continue;
            }
            let cell = match self.find_entry(day, period) {
                Some(entry) => GridCell::Occupied {
                    entry,
                    period,
                    // Never run past the last column.
                    span: span_count(entry).min(PERIOD_COUNT - period + 1),
                },
                None => GridCell::Empty { day, period },
            };
            cells.push(cell);
        }
        GridRow { day, cells }
    }

    pub fn layout(&self) -> GridLayout<'a> {
        GridLayout {
            rows: Day::ALL.iter().map(|day| self.row(*day)).collect(),
        }
    }
}

const DAY_WIDTH: usize = 5;
const CELL_WIDTH: usize = 14;

impl GridLayout<'_> {
    pub fn row(&self, day: Day) -> Option<&GridRow<'_>> {
        self.rows.iter().find(|r| r.day == day)
    }

    /// Plain-text table: a period header, a time header, then one line per
    /// day with merged cells drawn once across their span.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("{:<w$}|", "Hours", w = DAY_WIDTH));
        for p in &PERIODS {
            out.push_str(&format!("{:^w$}|", p.id, w = CELL_WIDTH));
        }
        out.push('\n');

        out.push_str(&format!("{:<w$}|", "Day", w = DAY_WIDTH));
        for p in &PERIODS {
            out.push_str(&format!("{:^w$}|", p.header_label(), w = CELL_WIDTH));
        }
        out.push('\n');

        for row in &self.rows {
            out.push_str(&format!("{:<w$}|", row.day.short_label(), w = DAY_WIDTH));
            for cell in &row.cells {
                let width = CELL_WIDTH * cell.colspan() as usize + (cell.colspan() as usize - 1);
                let text = match cell {
                    GridCell::Empty { .. } => String::new(),
                    GridCell::Occupied { entry, .. } => {
                        format!("{} @ {}", entry.course_code, entry.venue)
                    }
                };
                out.push_str(&format!("{:<width$}|", truncate(&text, width)));
            }
            out.push('\n');
        }

        out.push_str(&format!("{} {}\n", OPENING_SLOT.0, OPENING_SLOT.1));
        for line in BREAKS {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        text.chars().take(width.saturating_sub(1)).chain(['~']).collect()
    }
}
