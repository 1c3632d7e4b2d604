pub mod month_view;
pub mod meals_by_date;
