use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::meal_plan::MealPlanItem;

/// Bucket key for a calendar month. `month0` is 0-indexed (January = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month0: u32,
}

impl YearMonth {
    pub fn new(year: i32, month0: u32) -> Self {
        Self { year, month0 }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month0())
    }
}

/// Items grouped by month and then by day of month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealsByDate {
    months: BTreeMap<YearMonth, BTreeMap<u32, Vec<MealPlanItem>>>,
    /// Items dropped because their `scheduled` value could not be parsed.
    pub skipped: usize,
}

impl MealsByDate {
    pub fn day(&self, month: YearMonth, day: u32) -> &[MealPlanItem] {
        self.months
            .get(&month)
            .and_then(|days| days.get(&day))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn for_date(&self, date: NaiveDate) -> &[MealPlanItem] {
        self.day(YearMonth::of(date), date.day())
    }

    /// Days of `month` that have at least one item.
    pub fn busy_days(&self, month: YearMonth) -> Vec<u32> {
        self.months
            .get(&month)
            .map(|days| days.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.months
            .values()
            .flat_map(|days| days.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups `items` by the day they are scheduled on, each day ordered by
/// meal category and then title.
pub fn bucket_items(items: &[MealPlanItem]) -> MealsByDate {
    let mut index = MealsByDate::default();

    for item in items {
        let Some(scheduled) = item.scheduled_date() else {
            index.skipped += 1;
            continue;
        };

        index
            .months
            .entry(YearMonth::of(scheduled))
            .or_default()
            .entry(scheduled.day())
            .or_default()
            .push(item.clone());
    }

    for bucket in index.months.values_mut().flat_map(|days| days.values_mut()) {
        bucket.sort_by(|a, b| {
            a.meal
                .rank()
                .cmp(&b.meal.rank())
                .then_with(|| a.title.cmp(&b.title))
        });
    }

    if index.skipped > 0 {
        tracing::warn!("Skipped {} meal plan items with unparsable schedule", index.skipped);
    }

    index
}
