use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};
use thiserror::Error;
use uuid::Uuid;

use crate::meal_plan::{MealCategory, MealPlan, MealPlanItem};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Meal plan not found: {0}")]
    PlanNotFound(String),
}

/// Fields supplied when scheduling a new item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMealPlanItem {
    pub title: String,
    pub meal: MealCategory,
    pub scheduled: String,
    pub recipe_id: Option<String>,
    pub added_by: Option<String>,
}

pub struct MealPlanStore {
    conn: Connection,
}

impl MealPlanStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &std::path::Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS meal_plans (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS meal_plan_items (
                id TEXT PRIMARY KEY,
                meal_plan_id TEXT NOT NULL REFERENCES meal_plans(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                meal TEXT NOT NULL,
                scheduled TEXT NOT NULL,
                recipe_id TEXT,
                added_by TEXT,
                created_at TEXT
            )",
            [],
        )?;

        Ok(())
    }

    pub fn create_plan(&self, title: &str) -> Result<MealPlan, StoreError> {
        let plan = MealPlan::new(Uuid::new_v4().to_string(), title);
        self.conn.execute(
            "INSERT INTO meal_plans (id, title) VALUES (?1, ?2)",
            rusqlite::params![&plan.id, &plan.title],
        )?;
        tracing::info!("Created meal plan {} ({})", plan.title, plan.id);
        Ok(plan)
    }

    /// Plans without their items, ordered by title.
    pub fn list_plans(&self) -> Result<Vec<MealPlan>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT id, title FROM meal_plans ORDER BY title, id")?;
        let plans = stmt
            .query_map([], |row| Ok(MealPlan::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(plans)
    }

    pub fn load_plan(&self, id: &str) -> Result<Option<MealPlan>, StoreError> {
        let title: Option<String> = self
            .conn
            .query_row("SELECT title FROM meal_plans WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;

        let Some(title) = title else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT id, title, meal, scheduled, recipe_id, added_by, created_at
             FROM meal_plan_items WHERE meal_plan_id = ?1 ORDER BY scheduled, id",
        )?;
        let items = stmt
            .query_map([id], |row| {
                let created_at: Option<String> = row.get(6)?;
                Ok(MealPlanItem {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    meal: MealCategory::parse(&row.get::<_, String>(2)?),
                    scheduled: row.get(3)?,
                    recipe_id: row.get(4)?,
                    added_by: row.get(5)?,
                    created_at: created_at
                        .and_then(|value| DateTime::parse_from_rfc3339(&value).ok())
                        .map(|value| value.with_timezone(&Utc)),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(Some(MealPlan { id: id.to_string(), title, items }))
    }

    pub fn add_item(&self, plan_id: &str, new_item: NewMealPlanItem) -> Result<MealPlanItem, StoreError> {
        if !self.plan_exists(plan_id)? {
            return Err(StoreError::PlanNotFound(plan_id.to_string()));
        }

        let item = MealPlanItem {
            id: Uuid::new_v4().to_string(),
            title: new_item.title,
            meal: new_item.meal,
            scheduled: new_item.scheduled,
            recipe_id: new_item.recipe_id,
            added_by: new_item.added_by,
            created_at: Some(Utc::now()),
        };
        self.store_item(plan_id, &item)?;
        tracing::info!("Added {} to meal plan {} on {}", item.title, plan_id, item.scheduled);

        Ok(item)
    }

    /// Returns whether an item was removed.
    pub fn remove_item(&self, plan_id: &str, item_id: &str) -> Result<bool, StoreError> {
        let removed = self.conn.execute(
            "DELETE FROM meal_plan_items WHERE meal_plan_id = ?1 AND id = ?2",
            [plan_id, item_id],
        )?;
        if removed > 0 {
            tracing::info!("Removed item {} from meal plan {}", item_id, plan_id);
        }
        Ok(removed > 0)
    }

    /// Inserts or replaces `plan` and all of its items.
    pub fn import_plan(&mut self, plan: &MealPlan) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO meal_plans (id, title) VALUES (?1, ?2)",
            rusqlite::params![&plan.id, &plan.title],
        )?;
        for item in &plan.items {
            insert_item(&tx, &plan.id, item)?;
        }
        tx.commit()?;

        tracing::info!("Imported meal plan {} with {} items", plan.id, plan.items.len());
        Ok(())
    }

    fn store_item(&self, plan_id: &str, item: &MealPlanItem) -> Result<(), StoreError> {
        insert_item(&self.conn, plan_id, item)?;
        Ok(())
    }

    fn plan_exists(&self, plan_id: &str) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM meal_plans WHERE id = ?1",
            [plan_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }
}

fn insert_item(conn: &Connection, plan_id: &str, item: &MealPlanItem) -> SqliteResult<usize> {
    conn.execute(
        "INSERT OR REPLACE INTO meal_plan_items
            (id, meal_plan_id, title, meal, scheduled, recipe_id, added_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            &item.id,
            plan_id,
            &item.title,
            item.meal.label(),
            &item.scheduled,
            &item.recipe_id,
            &item.added_by,
            item.created_at.map(|at| at.to_rfc3339()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_store() -> MealPlanStore {
        let conn = Connection::open_in_memory().unwrap();
        let store = MealPlanStore::new(conn);
        store.initialize().unwrap();
        store
    }

    fn new_item(title: &str, meal: MealCategory, scheduled: &str) -> NewMealPlanItem {
        NewMealPlanItem {
            title: title.to_string(),
            meal,
            scheduled: scheduled.to_string(),
            recipe_id: None,
            added_by: Some("sam".to_string()),
        }
    }

    #[test]
    fn creates_database_schema() {
        let store = create_test_store();

        assert!(store.table_exists("meal_plans"));
        assert!(store.table_exists("meal_plan_items"));
    }

    #[test]
    fn created_plan_loads_empty() {
        let store = create_test_store();
        let plan = store.create_plan("Weeknights").unwrap();

        let loaded = store.load_plan(&plan.id).unwrap();

        assert_eq!(loaded, Some(plan));
    }

    #[test]
    fn loads_nonexistent_plan_returns_none() {
        let store = create_test_store();
        assert_eq!(store.load_plan("nonexistent").unwrap(), None);
    }

    #[test]
    fn added_item_is_loaded_with_plan() {
        let store = create_test_store();
        let plan = store.create_plan("Weeknights").unwrap();

        let added = store
            .add_item(&plan.id, new_item("Tacos", MealCategory::Dinner, "2024-03-02"))
            .unwrap();
        let loaded = store.load_plan(&plan.id).unwrap().unwrap();

        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].id, added.id);
        assert_eq!(loaded.items[0].meal, MealCategory::Dinner);
        assert_eq!(loaded.items[0].added_by.as_deref(), Some("sam"));
        assert!(loaded.items[0].created_at.is_some());
    }

    #[test]
    fn adding_to_unknown_plan_fails() {
        let store = create_test_store();

        let result = store.add_item("missing", new_item("Tacos", MealCategory::Dinner, "2024-03-02"));

        assert!(matches!(result, Err(StoreError::PlanNotFound(id)) if id == "missing"));
    }

    #[test]
    fn removes_item_from_plan() {
        let store = create_test_store();
        let plan = store.create_plan("Weeknights").unwrap();
        let added = store
            .add_item(&plan.id, new_item("Tacos", MealCategory::Dinner, "2024-03-02"))
            .unwrap();

        assert!(store.remove_item(&plan.id, &added.id).unwrap());
        assert!(!store.remove_item(&plan.id, &added.id).unwrap());
        assert!(store.load_plan(&plan.id).unwrap().unwrap().items.is_empty());
    }

    #[test]
    fn import_keeps_unrecognized_meal_and_raw_schedule() {
        let mut store = create_test_store();
        let mut plan = MealPlan::new("plan-1", "Imported");
        plan.items.push(MealPlanItem {
            id: "a".to_string(),
            title: "Tea".to_string(),
            meal: MealCategory::parse("afternoon tea"),
            scheduled: "whenever".to_string(),
            recipe_id: Some("r1".to_string()),
            added_by: None,
            created_at: None,
        });

        store.import_plan(&plan).unwrap();
        let loaded = store.load_plan("plan-1").unwrap().unwrap();

        assert_eq!(loaded, plan);
    }

    #[test]
    fn importing_twice_replaces_rows() {
        let mut store = create_test_store();
        let mut plan = MealPlan::new("plan-1", "Imported");
        store.import_plan(&plan).unwrap();

        plan.title = "Renamed".to_string();
        store.import_plan(&plan).unwrap();

        let plans = store.list_plans().unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].title, "Renamed");
    }

    #[test]
    fn opens_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meals.db");

        let plan_id = {
            let store = MealPlanStore::open(&path).unwrap();
            store.create_plan("Persisted").unwrap().id
        };

        let reopened = MealPlanStore::open(&path).unwrap();
        assert!(reopened.load_plan(&plan_id).unwrap().is_some());
    }
}
