use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanItem {
    pub id: String,
    pub title: String,
    pub meal: MealCategory,
    /// Timestamp exactly as delivered; see [`MealPlanItem::scheduled_date`].
    pub scheduled: String,
    #[serde(default)]
    pub recipe_id: Option<String>,
    #[serde(default)]
    pub added_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
    Other,
    Unrecognized(String),
}

impl MealCategory {
    pub const ALL: [MealCategory; 5] = [
        MealCategory::Breakfast,
        MealCategory::Lunch,
        MealCategory::Dinner,
        MealCategory::Snacks,
        MealCategory::Other,
    ];

    pub fn parse(label: &str) -> Self {
        match label {
            "breakfast" => MealCategory::Breakfast,
            "lunch" => MealCategory::Lunch,
            "dinner" => MealCategory::Dinner,
            "snacks" => MealCategory::Snacks,
            "other" => MealCategory::Other,
            _ => MealCategory::Unrecognized(label.to_string()),
        }
    }

    /// Display priority within a day. Unrecognized labels sort last.
    pub fn rank(&self) -> u8 {
        match self {
            MealCategory::Breakfast => 1,
            MealCategory::Lunch => 2,
            MealCategory::Dinner => 3,
            MealCategory::Snacks => 4,
            MealCategory::Other => 5,
            MealCategory::Unrecognized(_) => 6,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MealCategory::Breakfast => "breakfast",
            MealCategory::Lunch => "lunch",
            MealCategory::Dinner => "dinner",
            MealCategory::Snacks => "snacks",
            MealCategory::Other => "other",
            MealCategory::Unrecognized(label) => label,
        }
    }
}

impl From<String> for MealCategory {
    fn from(label: String) -> Self {
        MealCategory::parse(&label)
    }
}

impl From<MealCategory> for String {
    fn from(category: MealCategory) -> Self {
        category.label().to_string()
    }
}

impl MealPlanItem {
    /// Calendar day the item is assigned to, or `None` when `scheduled`
    /// is not a recognizable timestamp.
    ///
    /// RFC 3339 timestamps keep the day in their own offset, so
    /// `2024-03-02T23:30:00-05:00` lands on March 2nd.
    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        parse_scheduled(&self.scheduled)
    }
}

pub fn parse_scheduled(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.date());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
