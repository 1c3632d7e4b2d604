use serde::{Deserialize, Serialize};

use super::item::MealPlanItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<MealPlanItem>,
}

impl MealPlan {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn find_item(&self, item_id: &str) -> Option<&MealPlanItem> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_plan_has_no_items() {
        let plan = MealPlan::new("plan1", "Family dinners");
        assert!(plan.items.is_empty());
        assert_eq!(plan.title, "Family dinners");
    }

    #[test]
    fn parses_plan_document_with_items() {
        let json = r#"{
            "id": "plan1",
            "title": "Week plan",
            "items": [
                {"id": "a", "title": "Oatmeal", "meal": "breakfast", "scheduled": "2024-03-04T08:00:00Z"},
                {"id": "b", "title": "Tacos", "meal": "dinner", "scheduled": "2024-03-04", "recipe_id": "r1"}
            ]
        }"#;

        let plan: MealPlan = serde_json::from_str(json).unwrap();

        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.find_item("b").and_then(|i| i.recipe_id.as_deref()), Some("r1"));
        assert!(plan.find_item("missing").is_none());
    }
}
