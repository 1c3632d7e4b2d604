pub mod meal_plan;
pub mod input;
pub mod ui;
pub mod storage;
pub mod app;

pub use meal_plan::{MealCategory, MealPlan, MealPlanItem};
pub use app::{Direction, MealCalendarViewModel};
pub use ui::month_view::{CalendarGrid, DaySlot, Week};
pub use ui::meals_by_date::{MealsByDate, YearMonth};
