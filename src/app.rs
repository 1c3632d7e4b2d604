use chrono::{Datelike, Local, Months, NaiveDate};

use crate::meal_plan::MealPlanItem;
use crate::ui::meals_by_date::{bucket_items, MealsByDate, YearMonth};
use crate::ui::month_view::{build_grid, days_in_month, first_day_of_month, CalendarGrid, DaySlot};

/// How far ahead of the current month the calendar may be moved.
pub const MAX_MONTHS_AHEAD: i32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn step(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Calendar state for one meal plan view.
///
/// The value is owned by whoever drives the view; nothing here reads the
/// clock except [`MealCalendarViewModel::for_today`].
#[derive(Debug, Clone, PartialEq)]
pub struct MealCalendarViewModel {
    today: NaiveDate,
    center: NaiveDate,
    selected_day: u32,
    grid: CalendarGrid,
    meals: MealsByDate,
}

impl MealCalendarViewModel {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            center: today,
            selected_day: today.day(),
            grid: build_grid(today),
            meals: MealsByDate::default(),
        }
    }

    pub fn for_today() -> Self {
        Self::new(Local::now().date_naive())
    }

    /// Focuses the month of `date`, clamped into the navigable window.
    pub fn with_center(mut self, date: NaiveDate) -> Self {
        let offset = months_between(self.today, date).clamp(0, MAX_MONTHS_AHEAD);
        let Some(center) = month_at_offset(self.today, offset) else {
            return self;
        };

        self.center = if offset == 0 { self.today } else { center };
        self.grid = build_grid(self.center);
        self.selected_day = self.center.day();
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn center(&self) -> NaiveDate {
        self.center
    }

    pub fn selected_day(&self) -> u32 {
        self.selected_day
    }

    pub fn grid(&self) -> &CalendarGrid {
        &self.grid
    }

    pub fn meals(&self) -> &MealsByDate {
        &self.meals
    }

    /// Months from the current real month to the displayed one.
    pub fn month_offset(&self) -> i32 {
        months_between(self.today, self.center)
    }

    pub fn can_navigate(&self, direction: Direction) -> bool {
        let Some(new_center) = adjacent_month(self.center, direction) else {
            return false;
        };

        match direction {
            Direction::Forward => months_between(self.today, new_center) <= MAX_MONTHS_AHEAD,
            Direction::Backward => new_center >= first_day_of_month(self.today),
        }
    }

    /// Moves one month in `direction`. Returns `false` and leaves the view
    /// untouched when the move would leave the navigable window.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        if !self.can_navigate(direction) {
            tracing::debug!("Ignoring {:?} navigation from {}", direction, self.center);
            return false;
        }

        let Some(new_center) = adjacent_month(self.center, direction) else {
            return false;
        };

        self.center = new_center;
        self.grid = build_grid(new_center);
        self.selected_day = new_center.day();
        true
    }

    pub fn select_day(&mut self, slot: DaySlot) {
        match slot {
            DaySlot::PrevMonth => {
                self.navigate(Direction::Backward);
            }
            DaySlot::NextMonth => {
                self.navigate(Direction::Forward);
            }
            DaySlot::Day(day) => {
                if (1..=days_in_month(self.center)).contains(&day) {
                    self.selected_day = day;
                } else {
                    tracing::debug!("Ignoring selection of day {} in {}", day, self.month_title());
                }
            }
        }
    }

    /// Rebuilds the per-day index from a freshly loaded item list and
    /// returns how many items had to be skipped.
    pub fn load_meal_plan(&mut self, items: &[MealPlanItem]) -> usize {
        self.meals = bucket_items(items);
        tracing::info!(
            "Loaded {} meal plan items ({} skipped)",
            self.meals.len(),
            self.meals.skipped
        );
        self.meals.skipped
    }

    pub fn meal_items_by_day(&self, day: u32) -> &[MealPlanItem] {
        self.meals.day(YearMonth::of(self.center), day)
    }

    pub fn selected_items(&self) -> &[MealPlanItem] {
        self.meal_items_by_day(self.selected_day)
    }

    /// The displayed month combined with the selected day.
    pub fn selected_date(&self) -> NaiveDate {
        self.center.with_day(self.selected_day).unwrap_or(self.center)
    }

    pub fn month_title(&self) -> String {
        self.center.format("%B %Y").to_string()
    }
}

impl Default for MealCalendarViewModel {
    fn default() -> Self {
        Self::for_today()
    }
}

fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + to.month0() as i32 - from.month0() as i32
}

fn adjacent_month(center: NaiveDate, direction: Direction) -> Option<NaiveDate> {
    let first = first_day_of_month(center);
    match direction {
        Direction::Forward => first.checked_add_months(Months::new(1)),
        Direction::Backward => first.checked_sub_months(Months::new(1)),
    }
}

fn month_at_offset(today: NaiveDate, offset: i32) -> Option<NaiveDate> {
    first_day_of_month(today).checked_add_months(Months::new(offset.max(0) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meal_plan::MealCategory;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn item(id: &str, title: &str, meal: &str, scheduled: &str) -> MealPlanItem {
        MealPlanItem {
            id: id.to_string(),
            title: title.to_string(),
            meal: MealCategory::parse(meal),
            scheduled: scheduled.to_string(),
            recipe_id: None,
            added_by: None,
            created_at: None,
        }
    }

    fn view_at_offset(today: NaiveDate, offset: u32) -> MealCalendarViewModel {
        let mut view = MealCalendarViewModel::new(today);
        for _ in 0..offset {
            assert!(view.navigate(Direction::Forward));
        }
        view
    }

    #[test]
    fn new_view_centers_on_today() {
        let view = MealCalendarViewModel::new(date(2024, 3, 17));

        assert_eq!(view.center(), date(2024, 3, 17));
        assert_eq!(view.selected_day(), 17);
        assert_eq!(view.grid(), &build_grid(date(2024, 3, 1)));
        assert_eq!(view.month_offset(), 0);
    }

    #[test]
    fn cannot_navigate_into_the_past() {
        let mut view = MealCalendarViewModel::new(date(2024, 3, 17));

        assert!(!view.can_navigate(Direction::Backward));
        assert!(!view.navigate(Direction::Backward));
        assert_eq!(view.center(), date(2024, 3, 17));
    }

    #[test]
    fn backward_allowed_after_current_month() {
        let today = date(2024, 3, 17);
        for offset in 1..=12 {
            let view = view_at_offset(today, offset);
            assert!(view.can_navigate(Direction::Backward), "offset {offset}");
        }
    }

    #[test]
    fn forward_allowed_below_twelve_months() {
        let today = date(2024, 3, 17);
        for offset in 0..12 {
            let view = view_at_offset(today, offset);
            assert!(view.can_navigate(Direction::Forward), "offset {offset}");
        }
    }

    #[test]
    fn twelve_months_ahead_is_reachable_but_not_exceeded() {
        let mut view = view_at_offset(date(2024, 3, 17), 12);
        let grid_before = view.grid().clone();

        assert_eq!(view.center(), date(2025, 3, 1));
        assert!(!view.can_navigate(Direction::Forward));
        assert!(!view.navigate(Direction::Forward));
        assert_eq!(view.grid(), &grid_before);
        assert_eq!(view.center(), date(2025, 3, 1));
    }

    #[test]
    fn forward_bound_crosses_year_end() {
        let view = view_at_offset(date(2024, 12, 31), 12);

        assert_eq!(view.center(), date(2025, 12, 1));
        assert!(!view.can_navigate(Direction::Forward));
    }

    #[test]
    fn navigation_pins_day_to_first_of_month() {
        let mut view = MealCalendarViewModel::new(date(2024, 1, 31));

        view.navigate(Direction::Forward);

        assert_eq!(view.center(), date(2024, 2, 1));
        assert_eq!(view.selected_day(), 1);
        assert_eq!(view.grid().days_in_month(), 29);
    }

    #[test]
    fn navigating_back_to_current_month_uses_first_day() {
        let mut view = view_at_offset(date(2024, 3, 17), 1);

        assert!(view.navigate(Direction::Backward));
        assert_eq!(view.center(), date(2024, 3, 1));
        assert!(!view.can_navigate(Direction::Backward));
    }

    #[test]
    fn selecting_padding_slots_navigates() {
        let mut view = view_at_offset(date(2024, 3, 17), 1);

        view.select_day(DaySlot::NextMonth);
        assert_eq!(view.center(), date(2024, 5, 1));

        view.select_day(DaySlot::PrevMonth);
        view.select_day(DaySlot::PrevMonth);
        assert_eq!(view.center(), date(2024, 3, 1));

        view.select_day(DaySlot::PrevMonth);
        assert_eq!(view.center(), date(2024, 3, 1));
    }

    #[test]
    fn selecting_a_day_records_it() {
        let mut view = MealCalendarViewModel::new(date(2024, 2, 10));

        view.select_day(DaySlot::Day(29));
        assert_eq!(view.selected_day(), 29);
        assert_eq!(view.selected_date(), date(2024, 2, 29));

        view.select_day(DaySlot::Day(30));
        assert_eq!(view.selected_day(), 29);
    }

    #[test]
    fn loaded_items_are_looked_up_in_displayed_month() {
        let mut view = MealCalendarViewModel::new(date(2024, 3, 1));
        let items = vec![
            item("1", "B", "dinner", "2024-03-02"),
            item("2", "A", "breakfast", "2024-03-02"),
            item("3", "Roast", "dinner", "2024-04-02"),
            item("4", "Broken", "dinner", "someday"),
        ];

        let skipped = view.load_meal_plan(&items);

        assert_eq!(skipped, 1);
        let titles: Vec<&str> = view.meal_items_by_day(2).iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);

        view.navigate(Direction::Forward);
        let titles: Vec<&str> = view.meal_items_by_day(2).iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Roast"]);
    }

    #[test]
    fn reloading_replaces_the_index() {
        let mut view = MealCalendarViewModel::new(date(2024, 3, 2));
        view.load_meal_plan(&[item("1", "Soup", "lunch", "2024-03-02")]);

        view.load_meal_plan(&[item("2", "Salad", "lunch", "2024-03-03")]);

        assert!(view.selected_items().is_empty());
        assert_eq!(view.meals().len(), 1);
    }

    #[test]
    fn with_center_clamps_into_window() {
        let today = date(2024, 3, 17);

        let past = MealCalendarViewModel::new(today).with_center(date(2023, 6, 1));
        assert_eq!(past.center(), today);

        let future = MealCalendarViewModel::new(today).with_center(date(2030, 1, 1));
        assert_eq!(future.center(), date(2025, 3, 1));
        assert_eq!(future.month_offset(), MAX_MONTHS_AHEAD);

        let inside = MealCalendarViewModel::new(today).with_center(date(2024, 7, 20));
        assert_eq!(inside.center(), date(2024, 7, 1));
    }

    #[test]
    fn month_title_names_displayed_month() {
        let view = MealCalendarViewModel::new(date(2024, 3, 17));
        assert_eq!(view.month_title(), "March 2024");
    }

    #[test]
    fn direction_steps() {
        assert_eq!(Direction::Forward.step(), 1);
        assert_eq!(Direction::Backward.step(), -1);
    }
}
