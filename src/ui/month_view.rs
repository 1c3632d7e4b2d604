use chrono::{Datelike, Days, Months, NaiveDate};

pub const DAYS_PER_WEEK: usize = 7;

/// A single cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DaySlot {
    /// Padding before day 1; selecting it moves to the previous month.
    PrevMonth,
    Day(u32),
    /// Padding after the last day; selecting it moves to the next month.
    NextMonth,
}

impl DaySlot {
    pub const PREV_MONTH_VALUE: u32 = 0;
    pub const NEXT_MONTH_VALUE: u32 = 32;

    /// Numeric form used by older clients: 0 before the month, 32 after it.
    pub fn legacy_value(self) -> u32 {
        match self {
            DaySlot::PrevMonth => Self::PREV_MONTH_VALUE,
            DaySlot::Day(day) => day,
            DaySlot::NextMonth => Self::NEXT_MONTH_VALUE,
        }
    }

    pub fn from_legacy(value: u32, days_in_month: u32) -> Self {
        match value {
            Self::PREV_MONTH_VALUE => DaySlot::PrevMonth,
            day if day <= days_in_month => DaySlot::Day(day),
            _ => DaySlot::NextMonth,
        }
    }

    pub fn day(self) -> Option<u32> {
        match self {
            DaySlot::Day(day) => Some(day),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Week {
    pub days: [DaySlot; DAYS_PER_WEEK],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Week>,
}

impl CalendarGrid {
    pub fn days(&self) -> impl Iterator<Item = u32> + '_ {
        self.weeks
            .iter()
            .flat_map(|week| week.days.iter())
            .filter_map(|slot| slot.day())
    }

    pub fn days_in_month(&self) -> u32 {
        self.days().count() as u32
    }

    /// Week index and Sunday-based column of `day`.
    pub fn position_of(&self, day: u32) -> Option<(usize, usize)> {
        self.weeks.iter().enumerate().find_map(|(row, week)| {
            week.days
                .iter()
                .position(|slot| *slot == DaySlot::Day(day))
                .map(|column| (row, column))
        })
    }

    pub fn legacy_weeks(&self) -> Vec<[u32; DAYS_PER_WEEK]> {
        self.weeks
            .iter()
            .map(|week| week.days.map(DaySlot::legacy_value))
            .collect()
    }
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Day 0 of the following month.
pub fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    first_day_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next_month| next_month.pred_opt())
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    last_day_of_month(date).map(|d| d.day()).unwrap_or(31)
}

/// Lays out the month containing `center` as Sunday-first weeks.
///
/// Only the year and month of `center` matter.
pub fn build_grid(center: NaiveDate) -> CalendarGrid {
    let year = center.year();
    let month = center.month();

    let first_day = first_day_of_month(center);
    let Some(last_day) = last_day_of_month(center) else {
        return CalendarGrid { year, month, weeks: Vec::new() };
    };

    let mut weeks = Vec::new();
    let mut slots = [DaySlot::PrevMonth; DAYS_PER_WEEK];
    let mut column = first_day.weekday().num_days_from_sunday() as usize;

    for day in 1..=last_day.day() {
        slots[column] = DaySlot::Day(day);
        column += 1;

        if column == DAYS_PER_WEEK {
            weeks.push(Week { days: slots });
            slots = [DaySlot::NextMonth; DAYS_PER_WEEK];
            column = 0;
        }
    }

    if column > 0 {
        for slot in slots.iter_mut().skip(column) {
            *slot = DaySlot::NextMonth;
        }
        weeks.push(Week { days: slots });
    }

    CalendarGrid { year, month, weeks }
}
